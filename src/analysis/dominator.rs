//! Declaration point search for values with several use sites.
//!
//! A value that is referenced from several blocks must be declared in a block that
//! dominates all of them. [`DominatorAccumulator`] folds the referencing blocks into
//! their nearest common dominator, one block at a time.

use crate::{
    analysis::ControlFlowGraph,
    ir::{BlockId, BlockLookup, Function},
    Error, Result,
};

/// Folds a sequence of blocks into their nearest common dominator.
///
/// Blocks that are unreachable from the entry block are ignored: dead code is never
/// emitted, so it does not constrain where a declaration goes.
///
/// # Examples
///
/// ```rust
/// use cfgscope::{
///     analysis::{ControlFlowGraph, DominatorAccumulator},
///     ir::{Block, BlockId, Function},
/// };
///
/// let b = BlockId::new;
/// let function = Function::new(b(1))
///     .with_block(b(1), Block::select(b(2), b(3)))
///     .with_block(b(2), Block::direct(b(4)))
///     .with_block(b(3), Block::direct(b(4)))
///     .with_block(b(4), Block::ret());
/// let cfg = ControlFlowGraph::new(&function)?;
///
/// let mut accumulator = DominatorAccumulator::new(&cfg);
/// accumulator.add_block(b(2))?;
/// accumulator.add_block(b(4))?;
/// accumulator.lift_continue_block_dominator()?;
/// assert_eq!(accumulator.dominator(), Some(b(1)));
/// # Ok::<(), cfgscope::Error>(())
/// ```
#[derive(Debug)]
pub struct DominatorAccumulator<'c, 'a, F: BlockLookup + ?Sized = Function> {
    cfg: &'c ControlFlowGraph<'a, F>,
    dominator: Option<BlockId>,
}

impl<'c, 'a, F: BlockLookup + ?Sized> DominatorAccumulator<'c, 'a, F> {
    /// Creates an empty accumulator over a built control flow graph.
    #[must_use]
    pub fn new(cfg: &'c ControlFlowGraph<'a, F>) -> Self {
        Self {
            cfg,
            dominator: None,
        }
    }

    /// Widens the accumulated dominator so that it also dominates `block`.
    ///
    /// # Errors
    ///
    /// Propagates invariant violations from
    /// [`ControlFlowGraph::find_common_dominator`]. Unreachable blocks are not an error.
    pub fn add_block(&mut self, block: BlockId) -> Result<()> {
        if self.cfg.immediate_dominator(block).is_none() {
            return Ok(());
        }

        self.dominator = match self.dominator {
            None => Some(block),
            Some(current) if current == block => Some(current),
            Some(current) => Some(self.cfg.find_common_dominator(block, current)?),
        };
        Ok(())
    }

    /// Adds every block of an iterator, see [`add_block`](Self::add_block).
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error.
    pub fn add_blocks<I>(&mut self, blocks: I) -> Result<()>
    where
        I: IntoIterator<Item = BlockId>,
    {
        for block in blocks {
            self.add_block(block)?;
        }
        Ok(())
    }

    /// Moves the accumulated dominator to the entry block if it is a continue block.
    ///
    /// A block that branches to a successor with a larger post-order rank jumps back
    /// to a loop header: it is the continue block of a loop. Declarations cannot be
    /// placed there when the value is also used in the loop body, so the entry block
    /// is used instead. Only the dominator's own successors are inspected.
    ///
    /// Call this once after all blocks have been added.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownBlock`] if the dominator cannot be resolved through the IR view
    /// - [`Error::UnvisitedBlock`] if the dominator or one of its successors has no
    ///   post-order rank
    pub fn lift_continue_block_dominator(&mut self) -> Result<()> {
        let Some(dominator) = self.dominator else {
            return Ok(());
        };

        let rank = self
            .cfg
            .visit_order(dominator)
            .ok_or(Error::UnvisitedBlock(dominator))?;

        let mut back_edge_dominator = false;
        for target in self.cfg.block(dominator)?.successors() {
            let target_rank = self
                .cfg
                .visit_order(target)
                .ok_or(Error::UnvisitedBlock(target))?;
            if target_rank > rank {
                back_edge_dominator = true;
            }
        }

        if back_edge_dominator {
            let entry = self.cfg.entry_block();
            log::debug!("dominator {dominator} is a continue block, lifting to entry {entry}");
            self.dominator = Some(entry);
        }
        Ok(())
    }

    /// Returns the accumulated dominator, or `None` if no reachable block was added.
    #[must_use]
    #[inline]
    pub fn dominator(&self) -> Option<BlockId> {
        self.dominator
    }
}
