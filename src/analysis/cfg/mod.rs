//! Control Flow Graph (CFG) construction and dominator queries.
//!
//! This module computes, for one function, the post-order numbering of its blocks,
//! the recorded edge set (every branch except back edges, plus one forced edge from
//! each loop header to its merge block) and the immediate dominator of every reachable
//! block.
//!
//! # Key Components
//!
//! - [`ControlFlowGraph`] - Post-order, adjacency and dominator tree of one function
//! - [`DominatorIterator`] - Walks a block's dominator chain up to the entry
//!
//! # Edge Classification
//!
//! The depth-first walk classifies every branch it follows:
//!
//! - **Tree edge**: the target was unvisited; the edge is recorded once the target's
//!   visit completes
//! - **Crossing edge**: the target already finished; the edge is recorded
//! - **Back edge**: the target is still on the current path; the edge is dropped
//!
//! # Examples
//!
//! ```rust
//! use cfgscope::{analysis::ControlFlowGraph, ir::{Block, BlockId, Function}};
//!
//! let b = BlockId::new;
//! let function = Function::new(b(1))
//!     .with_block(b(1), Block::direct(b(2)))
//!     .with_block(b(2), Block::direct(b(3)))
//!     .with_block(b(3), Block::ret());
//!
//! let cfg = ControlFlowGraph::new(&function)?;
//! assert_eq!(cfg.post_order(), &[b(3), b(2), b(1)]);
//! assert_eq!(cfg.immediate_dominator(b(3)), Some(b(2)));
//! # Ok::<(), cfgscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`ControlFlowGraph`] is immutable after construction and can be shared across
//! threads whenever the borrowed IR view can.

mod graph;
mod loops;
mod postorder;

pub use graph::{ControlFlowGraph, DominatorIterator};
