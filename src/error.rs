use thiserror::Error;

use crate::ir::BlockId;

macro_rules! invariant_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvariantViolation {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvariantViolation {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant describes a defect in the input IR or in the caller's use of the analysis.
/// None of them are transient: retrying the same query on the same graph yields the same
/// error. Callers are expected to fail the current compilation unit and move on.
///
/// # Error Categories
///
/// ## Query Errors
/// - [`Error::UnreachableBlock`] - Dominator query on a block with no dominator entry
/// - [`Error::UnvisitedBlock`] - Visit-order query on a block the traversal never reached
///
/// ## Input Errors
/// - [`Error::UnknownBlock`] - The IR view does not know a referenced block
/// - [`Error::RecursionLimit`] - Traversal depth exceeded the configured limit
///
/// ## Internal Errors
/// - [`Error::InvariantViolation`] - A structural invariant of the graph did not hold
///
/// # Examples
///
/// ```rust
/// use cfgscope::{analysis::ControlFlowGraph, ir::{Block, BlockId, Function}, Error};
///
/// let mut function = Function::new(BlockId::new(1));
/// function.insert(BlockId::new(1), Block::ret());
/// function.insert(BlockId::new(2), Block::ret());
///
/// let cfg = ControlFlowGraph::new(&function)?;
/// match cfg.find_common_dominator(BlockId::new(1), BlockId::new(2)) {
///     Err(Error::UnreachableBlock(block)) => assert_eq!(block, BlockId::new(2)),
///     other => panic!("unexpected result: {other:?}"),
/// }
/// # Ok::<(), cfgscope::Error>(())
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A dominator query was made for a block that has no immediate dominator.
    ///
    /// Blocks that are not reachable from the entry block never receive a dominator
    /// entry. Asking for the common dominator of such a block is a caller defect;
    /// callers should check [`crate::analysis::ControlFlowGraph::is_reachable`] first.
    #[error("Block {0} is unreachable and has no immediate dominator")]
    UnreachableBlock(BlockId),

    /// A visit-order query was made for a block the traversal never reached.
    #[error("Block {0} was never visited by the post-order traversal")]
    UnvisitedBlock(BlockId),

    /// The IR view returned nothing for a block identifier.
    ///
    /// This happens when a terminator or merge instruction references a block that
    /// is not part of the function.
    #[error("Block {0} is not part of the function")]
    UnknownBlock(BlockId),

    /// Recursion limit reached.
    ///
    /// The depth-first traversal keeps an explicit work stack. To keep memory bounded
    /// for pathological inputs, its depth is limited by
    /// [`crate::analysis::CfgConfig::max_traversal_depth`].
    ///
    /// The associated value shows the recursion limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// A structural invariant of the control flow graph did not hold.
    ///
    /// This indicates malformed input that slipped past validation, such as a dominator
    /// chain that does not terminate at the entry block.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the violated invariant
    /// * `file` - Source file where the violation was detected
    /// * `line` - Source line where the violation was detected
    #[error("Invariant violation - {file}:{line}: {message}")]
    InvariantViolation {
        /// The message to be printed for the violation
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}
