//! Control Flow Graph implementation.
//!
//! This module provides the main [`ControlFlowGraph`] structure: the post-order
//! numbering, the recorded adjacency, and the immediate dominator mapping of one
//! function, together with the queries the code generator runs against them.

use std::{
    collections::{HashMap, HashSet},
    fmt::Write,
};

use crate::{
    analysis::{
        cfg::postorder::{Adjacency, PostOrderBuilder},
        CfgConfig,
    },
    ir::{Block, BlockId, BlockLookup, Function, Merge},
    utils::DotWriter,
    Error, Result,
};

/// The control flow graph and immediate dominator tree of one function.
///
/// The graph is built once from a read-only [`BlockLookup`] view and is immutable
/// afterwards. Construction runs a depth-first post-order traversal from the entry
/// block that records every edge except back edges, then computes immediate
/// dominators in a single pass over the post-order in reverse.
///
/// Two properties make the dominator queries cheap:
///
/// - the entry block has the largest post-order rank, and
/// - every block's immediate dominator has a strictly larger rank than the block,
///
/// so walking a dominator chain always moves to larger ranks until it reaches the
/// entry block.
///
/// # Loop merge edges
///
/// For every reachable loop header an edge to the loop's merge block is recorded even
/// though no branch exists, and a merge block that no branch reaches is visited
/// through it. This keeps the loop header on the dominator chain of blocks after the
/// loop, so a value that is only used after a loop is never declared inside its body.
/// See [`CfgConfig::synthesize_loop_merge_edges`].
///
/// # Examples
///
/// ```rust
/// use cfgscope::{analysis::ControlFlowGraph, ir::{Block, BlockId, Function}};
///
/// // Diamond: 1 branches to 2 and 3, both of which reconverge at 4.
/// let b = BlockId::new;
/// let function = Function::new(b(1))
///     .with_block(b(1), Block::select(b(2), b(3)).with_selection_merge(b(4)))
///     .with_block(b(2), Block::direct(b(4)))
///     .with_block(b(3), Block::direct(b(4)))
///     .with_block(b(4), Block::ret());
///
/// let cfg = ControlFlowGraph::new(&function)?;
/// assert_eq!(cfg.immediate_dominator(b(4)), Some(b(1)));
/// assert_eq!(cfg.find_common_dominator(b(2), b(3))?, b(1));
/// # Ok::<(), cfgscope::Error>(())
/// ```
///
/// # Thread Safety
///
/// `ControlFlowGraph` is [`Send`] and [`Sync`] whenever the borrowed IR view is
/// [`Sync`]. All queries take `&self`.
#[derive(Debug)]
pub struct ControlFlowGraph<'a, F: BlockLookup + ?Sized = Function> {
    /// The borrowed IR view.
    function: &'a F,
    /// The function's entry block, root of the traversal and the dominator tree.
    entry: BlockId,
    /// Post-order rank of each reachable block, starting at 1.
    visit_order: HashMap<BlockId, u32>,
    /// Reachable blocks in completion order.
    post_order: Vec<BlockId>,
    /// Recorded predecessors of each block.
    preceding_edges: Adjacency,
    /// Recorded successors of each block.
    succeeding_edges: Adjacency,
    /// Branches that were not recorded because they close a cycle.
    back_edges: Vec<(BlockId, BlockId)>,
    /// Recorded edges from loop headers to their merge blocks.
    loop_merge_edges: Vec<(BlockId, BlockId)>,
    /// Immediate dominator of each reachable block; the entry maps to itself.
    immediate_dominators: HashMap<BlockId, BlockId>,
}

impl<'a, F: BlockLookup + ?Sized> ControlFlowGraph<'a, F> {
    /// Builds the control flow graph of a function with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a branch targets a block the function does not contain,
    /// or if the input violates the structural assumptions of the dominator pass.
    pub fn new(function: &'a F) -> Result<Self> {
        Self::with_config(function, CfgConfig::default())
    }

    /// Builds the control flow graph of a function.
    ///
    /// # Arguments
    ///
    /// * `function` - Read-only view of the function's blocks
    /// * `config` - Construction options
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownBlock`] if a branch targets a block the function does not contain
    /// - [`Error::RecursionLimit`] if the traversal exceeds
    ///   [`CfgConfig::max_traversal_depth`]
    /// - [`Error::InvariantViolation`] if a dominator chain cannot be resolved
    pub fn with_config(function: &'a F, config: CfgConfig) -> Result<Self> {
        let entry = function.entry_block();
        let order = PostOrderBuilder::new(function, config).build()?;

        let mut cfg = Self {
            function,
            entry,
            visit_order: order.visit_order,
            post_order: order.post_order,
            preceding_edges: order.preceding_edges,
            succeeding_edges: order.succeeding_edges,
            back_edges: order.back_edges,
            loop_merge_edges: order.loop_merge_edges,
            immediate_dominators: HashMap::new(),
        };
        cfg.build_immediate_dominators()?;

        log::debug!(
            "built CFG for entry {}: {} reachable blocks, {} back edges, {} loop merge edges",
            cfg.entry,
            cfg.post_order.len(),
            cfg.back_edges.len(),
            cfg.loop_merge_edges.len()
        );

        Ok(cfg)
    }

    /// Computes the immediate dominator of every reachable block.
    ///
    /// Blocks are processed from last-completed to first-completed. Every recorded
    /// predecessor of a block completed after it, so its dominator is already known
    /// when the block is reached.
    fn build_immediate_dominators(&mut self) -> Result<()> {
        self.immediate_dominators.clear();
        self.immediate_dominators.insert(self.entry, self.entry);

        for index in (0..self.post_order.len()).rev() {
            let block = self.post_order[index];
            if block == self.entry {
                continue;
            }

            let preds = match self.preceding_edges.get(&block) {
                Some(preds) if !preds.is_empty() => preds.clone(),
                _ => continue,
            };

            let mut dominator = preds[0];
            if !self.immediate_dominators.contains_key(&dominator) {
                return Err(invariant_error!(
                    "predecessor {} of {} has no immediate dominator",
                    dominator,
                    block
                ));
            }

            for &pred in &preds[1..] {
                dominator = self.find_common_dominator(dominator, pred)?;
            }

            self.immediate_dominators.insert(block, dominator);
        }

        Ok(())
    }

    /// Returns the nearest block that dominates both `a` and `b`.
    ///
    /// Whichever block has the smaller post-order rank is replaced by its immediate
    /// dominator until both meet. A block dominates itself, so if one argument
    /// dominates the other it is returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::UnreachableBlock`] if either block (or a block on its chain) has no
    ///   immediate dominator
    /// - [`Error::InvariantViolation`] if a dominator chain does not move towards the
    ///   entry block
    pub fn find_common_dominator(&self, a: BlockId, b: BlockId) -> Result<BlockId> {
        let mut a = a;
        let mut b = b;

        // Each step moves one side up its chain; chains are at most as long as the
        // number of dominated blocks.
        let mut budget = 2 * self.immediate_dominators.len() + 2;

        while a != b {
            if budget == 0 {
                return Err(invariant_error!(
                    "dominator chains of {} and {} never meet",
                    a,
                    b
                ));
            }
            budget -= 1;

            if self.dominated_rank(a)? < self.dominated_rank(b)? {
                a = self.step_up(a, b)?;
            } else {
                b = self.step_up(b, a)?;
            }
        }

        Ok(a)
    }

    /// Rank of a block that must have an immediate dominator.
    fn dominated_rank(&self, block: BlockId) -> Result<u32> {
        if !self.immediate_dominators.contains_key(&block) {
            return Err(Error::UnreachableBlock(block));
        }
        self.visit_order
            .get(&block)
            .copied()
            .ok_or(Error::UnvisitedBlock(block))
    }

    fn step_up(&self, block: BlockId, other: BlockId) -> Result<BlockId> {
        let dominator = self
            .immediate_dominators
            .get(&block)
            .copied()
            .ok_or(Error::UnreachableBlock(block))?;

        if dominator == block {
            return Err(invariant_error!(
                "dominator chain of {} ends at {} without reaching {}",
                block,
                dominator,
                other
            ));
        }
        Ok(dominator)
    }

    /// Returns the function's entry block.
    #[must_use]
    #[inline]
    pub fn entry_block(&self) -> BlockId {
        self.entry
    }

    /// Returns the IR view this graph was built from.
    #[must_use]
    #[inline]
    pub fn function(&self) -> &'a F {
        self.function
    }

    /// Resolves a block through the IR view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if the function has no such block.
    pub fn block(&self, id: BlockId) -> Result<&'a Block> {
        self.function.block(id).ok_or(Error::UnknownBlock(id))
    }

    /// Returns the immediate dominator of a block.
    ///
    /// The entry block is its own immediate dominator. `None` means the block is not
    /// reachable from the entry block.
    #[must_use]
    #[inline]
    pub fn immediate_dominator(&self, block: BlockId) -> Option<BlockId> {
        self.immediate_dominators.get(&block).copied()
    }

    /// Returns the post-order rank of a block, or `None` if the block is unreachable.
    ///
    /// Ranks start at 1 and increase in the order blocks finish their visit; the entry
    /// block has the largest rank. A branch to a block with a larger rank than its
    /// source closes a cycle.
    #[must_use]
    #[inline]
    pub fn visit_order(&self, block: BlockId) -> Option<u32> {
        self.visit_order.get(&block).copied()
    }

    /// Returns the reachable blocks in the order their visit completed.
    #[must_use]
    #[inline]
    pub fn post_order(&self) -> &[BlockId] {
        &self.post_order
    }

    /// Returns `true` if the block is reachable from the entry block.
    #[must_use]
    #[inline]
    pub fn is_reachable(&self, block: BlockId) -> bool {
        self.visit_order.contains_key(&block)
    }

    /// Returns the number of blocks reachable from the entry block.
    #[must_use]
    #[inline]
    pub fn block_count(&self) -> usize {
        self.post_order.len()
    }

    /// Returns the recorded predecessors of a block, in the order they were recorded.
    #[must_use]
    pub fn preceding_edges(&self, block: BlockId) -> &[BlockId] {
        self.preceding_edges
            .get(&block)
            .map_or(&[], |edges| edges.as_slice())
    }

    /// Returns the recorded successors of a block, in the order they were recorded.
    #[must_use]
    pub fn succeeding_edges(&self, block: BlockId) -> &[BlockId] {
        self.succeeding_edges
            .get(&block)
            .map_or(&[], |edges| edges.as_slice())
    }

    /// Returns the branches that were left out of the graph because they close a cycle.
    #[must_use]
    pub fn back_edges(&self) -> &[(BlockId, BlockId)] {
        &self.back_edges
    }

    /// Returns the recorded loop header to merge block edges.
    #[must_use]
    pub fn loop_merge_edges(&self) -> &[(BlockId, BlockId)] {
        &self.loop_merge_edges
    }

    /// Checks if block `a` dominates block `b`.
    ///
    /// A block dominates itself. Returns `false` if either block is unreachable.
    #[must_use]
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.is_reachable(a) && self.dominators(b).any(|dominator| dominator == a)
    }

    /// Returns an iterator over all dominators of a block, from the block itself up to
    /// (and including) the entry block.
    ///
    /// The iterator is empty for unreachable blocks.
    pub fn dominators(&self, block: BlockId) -> DominatorIterator<'_, 'a, F> {
        DominatorIterator {
            cfg: self,
            current: self.immediate_dominator(block).map(|_| block),
        }
    }

    /// Walks the recorded successors starting at `block`, visiting each block once.
    ///
    /// `op` is called for every newly reached block; the walk only continues into that
    /// block's successors if it returns `true`. Blocks already in `seen` are skipped, so
    /// the same set can be shared across several walks.
    pub fn walk_from<O>(&self, seen: &mut HashSet<BlockId>, block: BlockId, mut op: O)
    where
        O: FnMut(BlockId) -> bool,
    {
        let mut stack = vec![block];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if op(current) {
                stack.extend(self.succeeding_edges(current).iter().rev().copied());
            }
        }
    }

    /// Generates a DOT format representation of the graph.
    ///
    /// Recorded branches are solid, loop merge edges dashed, and back edges dotted.
    /// With `with_dominators`, immediate dominator links are added in blue.
    ///
    /// # Arguments
    ///
    /// * `title` - Optional title for the graph
    /// * `with_dominators` - Whether to include the dominator tree
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>, with_dominators: bool) -> String {
        let mut dot = DotWriter::new("CFG", title);
        let name = |block: BlockId| format!("B{}", block.raw());

        for &block in self.post_order.iter().rev() {
            let mut label = format!("{block} #{}", self.visit_order[&block]);
            if let Some(data) = self.function.block(block) {
                let _ = write!(label, "\n{}", data.terminator.kind_name());
                if data.merge != Merge::None {
                    let _ = write!(label, " ({})", data.merge.kind_name());
                }
            }

            let attrs = if block == self.entry {
                "style=filled, fillcolor=lightgreen"
            } else {
                ""
            };
            dot.node(&name(block), &label, attrs);
        }
        dot.blank_line();

        for &from in self.post_order.iter().rev() {
            for &to in self.succeeding_edges(from) {
                let attrs = if self.loop_merge_edges.contains(&(from, to)) {
                    "style=dashed"
                } else {
                    ""
                };
                dot.edge(&name(from), &name(to), attrs);
            }
        }

        for &(from, to) in &self.back_edges {
            dot.edge(&name(from), &name(to), "style=dotted");
        }

        if with_dominators {
            dot.blank_line();
            for &block in self.post_order.iter().rev() {
                if let Some(dominator) = self.immediate_dominator(block) {
                    if dominator != block {
                        dot.edge(
                            &name(dominator),
                            &name(block),
                            "color=blue, constraint=false",
                        );
                    }
                }
            }
        }

        dot.finish()
    }
}

/// Iterator over the dominators of a block, from the block up to the entry.
pub struct DominatorIterator<'c, 'a, F: BlockLookup + ?Sized> {
    cfg: &'c ControlFlowGraph<'a, F>,
    current: Option<BlockId>,
}

impl<F: BlockLookup + ?Sized> Iterator for DominatorIterator<'_, '_, F> {
    type Item = BlockId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        self.current = match self.cfg.immediate_dominator(current) {
            Some(dominator) if dominator != current => Some(dominator),
            _ => None,
        };
        Some(current)
    }
}
