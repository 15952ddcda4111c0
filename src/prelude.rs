//! # cfgscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the cfgscope library. Import this module to get quick access to the essential
//! types for building control flow graphs and querying dominance.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cfgscope operations
pub use crate::Error;

/// The result type used throughout cfgscope
pub use crate::Result;

// ================================================================================================
// IR View
// ================================================================================================

/// Block identifiers, blocks and their control flow
pub use crate::ir::{Block, BlockId, Merge, SwitchCase, Terminator};

/// Function-level block access
pub use crate::ir::{BlockLookup, Function};

// ================================================================================================
// Analysis
// ================================================================================================

/// Control flow graph with post-order and dominator queries
pub use crate::analysis::{ControlFlowGraph, DominatorIterator};

/// Declaration point search
pub use crate::analysis::DominatorAccumulator;

/// Construction options and batch analysis
pub use crate::analysis::{analyze_functions, CfgConfig};
