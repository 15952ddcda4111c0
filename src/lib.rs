// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # cfgscope
//!
//! Control flow and dominance analysis for structured, SSA-style shader IR, built for
//! code generators that translate such IR into a high-level shading language.
//!
//! Emitting structured source from SSA form needs one question answered over and over:
//! a value is defined in one block and used in several others, so where must its
//! variable be declared to be visible at every use? `cfgscope` builds a control flow
//! graph for a function, numbers its blocks in post-order, computes immediate
//! dominators, and answers that question through [`analysis::DominatorAccumulator`].
//!
//! ## Features
//!
//! - **Post-order traversal** - Iterative depth-first walk with back edge classification
//! - **Immediate dominators** - Single pass in reverse post-order over forward edges
//! - **Structured loops** - Synthetic header to merge-block edges keep loop scopes intact
//! - **Loop lookup** - Nearest enclosing loop header of any block
//! - **Declaration points** - Nearest common dominator of a set of use sites
//! - **Parallel batches** - Independent functions analysed concurrently
//!
//! ## Quick Start
//!
//! ```rust
//! use cfgscope::prelude::*;
//!
//! let b = BlockId::new;
//!
//! //        1
//! //       / \
//! //      2   3
//! //       \ /
//! //        4
//! let function = Function::new(b(1))
//!     .with_block(b(1), Block::select(b(2), b(3)).with_selection_merge(b(4)))
//!     .with_block(b(2), Block::direct(b(4)))
//!     .with_block(b(3), Block::direct(b(4)))
//!     .with_block(b(4), Block::ret());
//!
//! let cfg = ControlFlowGraph::new(&function)?;
//! assert_eq!(cfg.immediate_dominator(b(4)), Some(b(1)));
//! assert_eq!(cfg.find_common_dominator(b(2), b(3))?, b(1));
//!
//! let mut accumulator = DominatorAccumulator::new(&cfg);
//! accumulator.add_blocks([b(2), b(3)])?;
//! accumulator.lift_continue_block_dominator()?;
//! assert_eq!(accumulator.dominator(), Some(b(1)));
//! # Ok::<(), cfgscope::Error>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`ir`] - The read-only view of blocks, terminators and merge information
//! - [`analysis`] - Control flow graph, dominators and declaration points
//! - [`utils`] - Graphviz output helpers
//! - [`prelude`] - Convenient re-exports
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], with [`Error`] describing whether a
//! query named a block outside the analysed region or whether the graph itself broke
//! one of its structural invariants.

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cfgscope::prelude::*;
///
/// let function = Function::new(BlockId::new(0)).with_block(BlockId::new(0), Block::ret());
/// let cfg = ControlFlowGraph::with_config(&function, CfgConfig::default())?;
/// assert_eq!(cfg.block_count(), 1);
/// # Ok::<(), cfgscope::Error>(())
/// ```
pub mod prelude;

pub mod analysis;
pub mod ir;
pub mod utils;

/// `cfgscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cfgscope` Error type
///
/// The error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use cfgscope::{analysis::ControlFlowGraph, ir::{Block, BlockId, Function}, Error};
///
/// let function = Function::new(BlockId::new(1)).with_block(BlockId::new(1), Block::ret());
/// let cfg = ControlFlowGraph::new(&function)?;
///
/// match cfg.find_common_dominator(BlockId::new(1), BlockId::new(7)) {
///     Ok(block) => println!("declare in {block}"),
///     Err(Error::UnreachableBlock(block)) => println!("{block} is dead code"),
///     Err(e) => println!("Error: {e}"),
/// }
/// # Ok::<(), cfgscope::Error>(())
/// ```
pub use error::Error;
