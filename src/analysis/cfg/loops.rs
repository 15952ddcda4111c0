//! Enclosing loop lookup.
//!
//! Structured IR marks loop headers and selection headers with merge information. To
//! find the loop a block sits in, the search walks predecessors upwards and prefers
//! structural links over arbitrary edges:
//!
//! ```text
//!     [header] ---------+      loop merge edge (recorded, no literal branch)
//!        |              |
//!     [body ...]        |
//!        |              v
//!        +-------->  [merge]   <- walking up from here jumps straight to the header
//! ```
//!
//! A merge block jumps straight to the header that owns it. That header is *not*
//! reported for the merge block, since the merge block lies after the loop; the walk
//! continues above it instead.

use crate::{
    analysis::ControlFlowGraph,
    ir::{BlockId, BlockLookup, Merge},
    Result,
};

impl<F: BlockLookup + ?Sized> ControlFlowGraph<'_, F> {
    /// Returns the header of the nearest loop enclosing `block`.
    ///
    /// Each step moves to one recorded predecessor of the current block:
    ///
    /// 1. a loop header whose merge block is the current block, skipping the loop
    ///    header check for this step,
    /// 2. otherwise a selection header whose merge point is the current block,
    /// 3. otherwise the first recorded predecessor.
    ///
    /// Unless the step was a loop-merge jump, the search stops as soon as it lands on a
    /// loop header. `None` means the walk reached a block without predecessors (usually
    /// the entry block) and `block` is not inside any loop.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownBlock`] if a predecessor cannot be resolved through
    /// the IR view, or [`crate::Error::InvariantViolation`] if the predecessor chain
    /// does not terminate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfgscope::{analysis::ControlFlowGraph, ir::{Block, BlockId, Function}};
    ///
    /// let b = BlockId::new;
    /// let function = Function::new(b(1))
    ///     .with_block(b(1), Block::direct(b(2)))
    ///     .with_block(b(2), Block::direct(b(3)).with_loop_merge(b(5)))
    ///     .with_block(b(3), Block::select(b(2), b(5)))
    ///     .with_block(b(5), Block::ret());
    ///
    /// let cfg = ControlFlowGraph::new(&function)?;
    /// assert_eq!(cfg.find_loop_dominator(b(3))?, Some(b(2)));
    /// assert_eq!(cfg.find_loop_dominator(b(5))?, None);
    /// # Ok::<(), cfgscope::Error>(())
    /// ```
    pub fn find_loop_dominator(&self, block: BlockId) -> Result<Option<BlockId>> {
        let mut current = block;

        // Recorded edges are acyclic, so every step lands on a distinct reachable block.
        for _ in 0..=self.block_count() {
            let preds = self.preceding_edges(current);
            let Some(&first) = preds.first() else {
                return Ok(None);
            };

            let mut pred_block = None;
            let mut ignore_loop_header = false;

            // The forced header -> merge edge makes the owning header a predecessor
            // of every reachable merge block.
            for &pred in preds {
                match self.block(pred)?.merge {
                    Merge::Loop { merge_block } if merge_block == current => {
                        pred_block = Some(pred);
                        ignore_loop_header = true;
                        break;
                    }
                    Merge::Selection { next_block } if next_block == current => {
                        pred_block = Some(pred);
                        break;
                    }
                    _ => {}
                }
            }

            // Loop headers dominate the loop body, so any other path leads there too.
            current = pred_block.unwrap_or(first);

            if !ignore_loop_header && self.block(current)?.merge.is_loop() {
                return Ok(Some(current));
            }
        }

        Err(invariant_error!(
            "predecessor walk from {} did not terminate",
            block
        ))
    }
}
