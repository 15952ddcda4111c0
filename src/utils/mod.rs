//! Shared helpers that are not specific to control flow analysis.

mod dot;

pub use dot::escape_dot;
pub(crate) use dot::DotWriter;
