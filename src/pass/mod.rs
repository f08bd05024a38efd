//! Graph passes run once per compilation, before execution.

use crate::{GraphRewrite, Result};

mod insert_relinearize;

pub use insert_relinearize::InsertRelinearize;

/// A transformation over a whole call graph.
pub trait CallGraphPass {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Runs the pass. Returns whether the graph was changed.
    ///
    /// On error the graph must be left exactly as it was.
    fn run_on_call_graph<G: GraphRewrite>(&mut self, graph: &mut G) -> Result<bool>;
}

/// What a pass knows about the value produced by a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ValueState {
    /// Encoded, never grows.
    Plain,
    /// Encrypted, with the number of polynomial components.
    Cipher { size: usize },
}

impl ValueState {

    pub fn is_cipher(&self) -> bool {
        matches!(self, ValueState::Cipher { .. })
    }

    /// Size of the ciphertext, zero for plaintexts.
    pub fn size(&self) -> usize {
        match self {
            ValueState::Plain => 0,
            ValueState::Cipher { size } => *size,
        }
    }

    /// Is this a ciphertext above `bound` components?
    pub fn is_oversized(&self, bound: usize) -> bool {
        self.size() > bound
    }
}
