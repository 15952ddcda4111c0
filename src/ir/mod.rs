//! Read-only view of the intermediate representation.
//!
//! The control flow analysis treats the function body as externally owned data. This
//! module defines the minimal shape it reads: block identifiers, terminators, merge
//! information, and the [`BlockLookup`] capability that resolves identifiers to blocks.
//!
//! # Key Components
//!
//! - [`BlockId`] - Opaque identifier of a basic block
//! - [`Block`] - Terminator and merge information of one block
//! - [`Terminator`] / [`Merge`] - How a block ends and which construct it heads
//! - [`BlockLookup`] - Resolves identifiers to blocks for one function
//! - [`Function`] - An owned [`BlockLookup`] implementation

mod block;
mod function;

pub use block::{Block, BlockId, Merge, SwitchCase, Terminator};
pub use function::{BlockLookup, Function};
