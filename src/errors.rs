//! Library errors. Other modules `use crate::errors::*;` to get the `Error`, `ErrorKind`,
//! `Result` and `ResultExt` types that `error_chain!` creates.

use crate::cells::Axis;
use crate::units::{EdgesCount, NodesCount};
use error_chain::error_chain;
pub use error_chain::bail;

error_chain! {
    errors {
        InvalidDimension(axis: Axis, value: usize) {
            description("invalid lattice dimension")
            display("lattice {:?} dimension must be at least 1, got {}", axis, value)
        }
        LatticeTooLarge(nodes: NodesCount, edges: EdgesCount) {
            description("lattice too large for its graph index type")
            display("lattice of {} cells and {} walls does not fit the graph index type",
                    nodes.0, edges.0)
        }
    }
}
