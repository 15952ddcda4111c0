//! Parallel analysis of independent functions.

use rayon::prelude::*;

use crate::{
    analysis::{CfgConfig, ControlFlowGraph},
    ir::BlockLookup,
    Result,
};

/// Builds the control flow graph of every function in parallel.
///
/// Functions are independent: each graph borrows only its own function and no state
/// is shared between them. Results are returned in input order, and a failure in one
/// function does not affect the others.
///
/// # Examples
///
/// ```rust
/// use cfgscope::{
///     analysis::{analyze_functions, CfgConfig},
///     ir::{Block, BlockId, Function},
/// };
///
/// let b = BlockId::new;
/// let functions = vec![
///     Function::new(b(1)).with_block(b(1), Block::ret()),
///     Function::new(b(1)).with_block(b(1), Block::direct(b(2))),
/// ];
///
/// let results = analyze_functions(&functions, CfgConfig::default());
/// assert!(results[0].is_ok());
/// assert!(results[1].is_err());
/// ```
pub fn analyze_functions<F>(
    functions: &[F],
    config: CfgConfig,
) -> Vec<Result<ControlFlowGraph<'_, F>>>
where
    F: BlockLookup + Sync,
{
    let results: Vec<Result<ControlFlowGraph<'_, F>>> = functions
        .par_iter()
        .map(|function| ControlFlowGraph::with_config(function, config))
        .collect();

    let failed = results.iter().filter(|result| result.is_err()).count();
    if failed > 0 {
        log::debug!(
            "{failed} of {} functions failed control flow analysis",
            functions.len()
        );
    }

    results
}
