//! Provide various utility functions and constants.
//!
//! The utility objects in this submodule are not documented.
//! Use at your own risk.
#![allow(missing_docs)]

mod basic;
pub(crate) mod hash;

pub use basic::*;
