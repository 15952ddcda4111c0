//! Control flow analysis for structured code emission.
//!
//! This module answers the question the code generator asks for every value that is
//! used outside the block defining it: *in which block can its declaration go so that
//! it is in scope at every use?* The answer is the nearest common dominator of all use
//! sites, adjusted for loop structure.
//!
//! # Architecture
//!
//! - [`cfg`] - Post-order traversal, recorded edges and immediate dominators
//! - [`DominatorAccumulator`] - Folds use sites into one declaration block
//! - [`CfgConfig`] - Construction options
//! - [`analyze_functions`] - Builds graphs for many functions in parallel
//!
//! # Usage
//!
//! ```rust
//! use cfgscope::{
//!     analysis::{ControlFlowGraph, DominatorAccumulator},
//!     ir::{Block, BlockId, Function},
//! };
//!
//! let b = BlockId::new;
//! let function = Function::new(b(1))
//!     .with_block(b(1), Block::direct(b(2)))
//!     .with_block(b(2), Block::direct(b(3)).with_loop_merge(b(4)))
//!     .with_block(b(3), Block::select(b(2), b(4)))
//!     .with_block(b(4), Block::ret());
//! let cfg = ControlFlowGraph::new(&function)?;
//!
//! // A value written in the loop body and read after the loop.
//! let mut accumulator = DominatorAccumulator::new(&cfg);
//! accumulator.add_block(b(3))?;
//! accumulator.add_block(b(4))?;
//! accumulator.lift_continue_block_dominator()?;
//! assert_eq!(accumulator.dominator(), Some(b(2)));
//! # Ok::<(), cfgscope::Error>(())
//! ```

mod batch;
pub mod cfg;
mod config;
mod dominator;

pub use batch::analyze_functions;
pub use cfg::{ControlFlowGraph, DominatorIterator};
pub use config::CfgConfig;
pub use dominator::DominatorAccumulator;
