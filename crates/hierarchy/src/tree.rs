//! Node storage for one browsing context.
//!
//! - `node` - per-node expansion state and paging cursor
//! - `arena` - id-indexed storage with explicit parent links

mod arena;
mod node;

pub use arena::{InsertSummary, NodeArena};
pub use node::{Node, NodeStatus};
