//! Execution layer for running computation graphs over homomorphically
//! encrypted values.
//!
//! The crate has two halves:
//! - the [kernel] dispatch table, which combines values that may each be a
//!   [Ciphertext] or a [Plaintext] and always produces the cheapest correct
//!   representation;
//! - the [InsertRelinearize] graph pass, which places relinearizations so that
//!   no ciphertext above the size bound reaches a ciphertext multiplication or
//!   a graph output.
//!
//! The encryption primitives come from an injected [Backend]. The crate ships
//! [TransparentEvaluator], an insecure backend that reproduces the observable
//! behaviour of an RLWE scheme (size growth, modulus levels, scale, noise
//! budget) so results can be checked end to end with the [Executor].
//!
//! ```rust
//! use hexec::*;
//! let parms = EncryptionParameters::new(SchemeType::CKKS)
//!     .set_poly_modulus_degree(8)
//!     .set_coeff_modulus_bits(&[40, 30, 40]);
//! let evaluator = TransparentEvaluator::new(HeContext::new(parms).unwrap());
//!
//! let mut f = Function::new();
//! let x = f.parameter(ElementType::I64, true);
//! let sq = f.multiply(x, x);
//! let quad = f.multiply(sq, sq);
//! f.result(quad);
//! InsertRelinearize::new().run_on_call_graph(&mut f).unwrap();
//!
//! let mut rng = rand::thread_rng();
//! let input = evaluator.encrypt(&evaluator.encode(&[3.0], ElementType::I64), &mut rng).unwrap();
//! let inputs = std::collections::HashMap::from([(x, input.into())]);
//! let results = Executor::new(&evaluator).call(&f, inputs).unwrap();
//! let output = evaluator.decrypt(results[0].1.as_cipher().unwrap()).unwrap();
//! assert_eq!(evaluator.decode(&output), vec![81.0]);
//! ```

mod backend;
mod context;
mod element_type;
mod encryption_parameters;
mod error;
mod evaluator;
mod executor;
mod text;
mod valcheck;
mod value;

pub mod graph;
pub mod kernel;
pub mod pass;
pub mod util;

pub use backend::Backend;
pub use context::{ContextData, ContextDataPointer, HeContext};
pub use element_type::ElementType;
pub use encryption_parameters::{EncryptionParameters, ParmsID, SchemeType, PARMS_ID_ZERO};
pub use error::{Error, ErrorKind, Result};
pub use evaluator::{NoiseModel, TransparentEvaluator};
pub use executor::Executor;
pub use graph::{Function, GraphRewrite, GraphView, NodeId, OpKind};
pub use pass::{CallGraphPass, InsertRelinearize, ValueState};
pub use text::{Ciphertext, Plaintext};
pub use valcheck::ValCheck;
pub use value::{EncryptedValue, ValueKind};
