//! Configuration for control flow graph construction.

/// Configuration for [`crate::analysis::ControlFlowGraph`] construction.
///
/// The defaults reproduce the behavior the code generator relies on for scoping
/// declarations. The other presets exist for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfgConfig {
    /// Record an edge from every reachable loop header to its merge block.
    ///
    /// Without this edge a value that is only used after a loop can resolve its
    /// declaration point to a block nested inside the loop body.
    pub synthesize_loop_merge_edges: bool,

    /// Maximum depth of the depth-first work stack (default: 65536)
    pub max_traversal_depth: usize,
}

impl Default for CfgConfig {
    fn default() -> Self {
        Self {
            synthesize_loop_merge_edges: true,
            max_traversal_depth: 65536,
        }
    }
}

impl CfgConfig {
    /// Creates a configuration that records only literal branch edges.
    ///
    /// **Warning**: Dominators computed this way are not safe for declaration
    /// placement around loops. Use for inspecting the raw branch structure only.
    #[must_use]
    pub fn literal() -> Self {
        Self {
            synthesize_loop_merge_edges: false,
            ..Self::default()
        }
    }

    /// Returns a copy of this configuration with a different traversal depth limit.
    #[must_use]
    pub fn with_max_traversal_depth(mut self, depth: usize) -> Self {
        self.max_traversal_depth = depth;
        self
    }
}
