//! Post-order traversal and edge recording.
//!
//! The traversal walks the block graph depth-first from the entry block and records
//! every edge that is not a back edge. Each block carries one of three states while the
//! walk is running: unvisited (absent from the state map), on the current path, or done
//! with its final post-order rank. An edge to a block on the current path is a back
//! edge and is dropped; an edge to a finished block is a crossing edge and is kept.
//!
//! The walk keeps an explicit work stack instead of recursing, so deeply nested input
//! cannot exhaust the native call stack. The stack depth is still bounded by
//! [`CfgConfig::max_traversal_depth`].

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::{
    analysis::CfgConfig,
    ir::{BlockId, BlockLookup, Merge},
    Error, Result,
};

/// Ordered, duplicate-free adjacency lists keyed by block.
pub(crate) type Adjacency = HashMap<BlockId, SmallVec<[BlockId; 4]>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    /// The block is on the current depth-first path.
    OnPath,
    /// The block's visit completed with this post-order rank.
    Done(u32),
}

/// A block whose visit is in progress.
struct Frame {
    block: BlockId,
    targets: SmallVec<[BlockId; 4]>,
    next: usize,
    loop_merge: Option<BlockId>,
}

/// Everything the traversal produces.
#[derive(Debug, Default)]
pub(crate) struct PostOrder {
    /// Final post-order rank of each reachable block, starting at 1.
    pub visit_order: HashMap<BlockId, u32>,
    /// Reachable blocks in completion order.
    pub post_order: Vec<BlockId>,
    pub preceding_edges: Adjacency,
    pub succeeding_edges: Adjacency,
    /// Edges dropped because their target was on the current path.
    pub back_edges: Vec<(BlockId, BlockId)>,
    /// Header to merge-block edges recorded without a literal branch.
    pub loop_merge_edges: Vec<(BlockId, BlockId)>,
}

/// Builds the post-order numbering and adjacency of one function.
pub(crate) struct PostOrderBuilder<'f, F: BlockLookup + ?Sized> {
    function: &'f F,
    config: CfgConfig,
    state: HashMap<BlockId, VisitState>,
    visit_count: u32,
    result: PostOrder,
}

impl<'f, F: BlockLookup + ?Sized> PostOrderBuilder<'f, F> {
    pub(crate) fn new(function: &'f F, config: CfgConfig) -> Self {
        Self {
            function,
            config,
            state: HashMap::new(),
            visit_count: 0,
            result: PostOrder::default(),
        }
    }

    /// Runs the traversal from the function's entry block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBlock`] if a branch targets a block the function does
    /// not contain, or [`Error::RecursionLimit`] if the work stack grows past the
    /// configured depth.
    pub(crate) fn build(mut self) -> Result<PostOrder> {
        let entry = self.function.entry_block();
        let mut stack: Vec<Frame> = Vec::new();
        self.push(&mut stack, entry)?;

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };

            if let Some(&target) = frame.targets.get(frame.next) {
                frame.next += 1;
                let from = frame.block;
                self.follow(&mut stack, from, target)?;
                continue;
            }

            // Scheduled after the literal targets, so every header reaches its merge
            // block even when no branch leads there.
            if let Some(merge_block) = frame.loop_merge.take() {
                let header = frame.block;
                if self.follow(&mut stack, header, merge_block)? {
                    log::trace!("loop merge edge {header} -> {merge_block}");
                    self.result.loop_merge_edges.push((header, merge_block));
                }
                continue;
            }

            let Some(frame) = stack.pop() else {
                break;
            };
            self.finish(&frame);

            // The child completed, so the edge into it is not a back edge.
            if let Some(parent) = stack.last() {
                self.add_branch(parent.block, frame.block);
            }
        }

        Ok(self.result)
    }

    /// Handles the edge `from -> target`, returning `false` if it is a back edge.
    fn follow(
        &mut self,
        stack: &mut Vec<Frame>,
        from: BlockId,
        target: BlockId,
    ) -> Result<bool> {
        match self.state.get(&target).copied() {
            None => self.push(stack, target)?,
            Some(VisitState::OnPath) => {
                log::trace!("back edge {from} -> {target}");
                self.result.back_edges.push((from, target));
                return Ok(false);
            }
            Some(VisitState::Done(_)) => self.add_branch(from, target),
        }
        Ok(true)
    }

    /// Marks `block` as on the current path and schedules its branch targets.
    fn push(&mut self, stack: &mut Vec<Frame>, block: BlockId) -> Result<()> {
        if stack.len() >= self.config.max_traversal_depth {
            return Err(Error::RecursionLimit(self.config.max_traversal_depth));
        }

        let data = self
            .function
            .block(block)
            .ok_or(Error::UnknownBlock(block))?;

        self.state.insert(block, VisitState::OnPath);
        stack.push(Frame {
            block,
            targets: data.successors(),
            next: 0,
            loop_merge: match data.merge {
                Merge::Loop { merge_block } if self.config.synthesize_loop_merge_edges => {
                    Some(merge_block)
                }
                _ => None,
            },
        });
        Ok(())
    }

    /// Completes the visit of a block once all of its targets, including a pending
    /// loop merge block, are done.
    fn finish(&mut self, frame: &Frame) {
        // Ranks start at one so that no finished block shares a value with the
        // on-path state.
        self.visit_count += 1;
        self.state
            .insert(frame.block, VisitState::Done(self.visit_count));
        self.result
            .visit_order
            .insert(frame.block, self.visit_count);
        self.result.post_order.push(frame.block);
    }

    fn add_branch(&mut self, from: BlockId, to: BlockId) {
        add_unique(self.result.preceding_edges.entry(to).or_default(), from);
        add_unique(self.result.succeeding_edges.entry(from).or_default(), to);
    }
}

fn add_unique(list: &mut SmallVec<[BlockId; 4]>, value: BlockId) {
    if !list.contains(&value) {
        list.push(value);
    }
}
