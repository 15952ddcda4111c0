//! Read-only block view consumed by the control flow analysis.
//!
//! The analysis never owns or mutates instructions. All it needs from a basic block is
//! how the block ends ([`Terminator`]) and whether it heads a structured construct
//! ([`Merge`]). The surrounding compiler lowers its own block representation into
//! these types, or implements [`crate::ir::BlockLookup`] over an existing store.

use std::fmt;

use smallvec::SmallVec;
use strum::IntoStaticStr;

/// A strongly-typed identifier for a basic block.
///
/// `BlockId` wraps the raw `u32` identifier assigned by the IR owner. Identifiers are
/// opaque to the analysis: they are never allocated here, may be sparse, and every
/// value including `0` names a real block. The absence of a block is always spelled
/// `Option<BlockId>::None`.
///
/// # Examples
///
/// ```rust
/// use cfgscope::ir::BlockId;
///
/// let block = BlockId::new(5);
/// assert_eq!(block.raw(), 5);
/// assert_eq!(block.to_string(), "%5");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(u32);

impl BlockId {
    /// Creates a new `BlockId` from a raw identifier.
    #[must_use]
    #[inline]
    pub const fn new(id: u32) -> Self {
        BlockId(id)
    }

    /// Returns the raw identifier value.
    #[must_use]
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl From<u32> for BlockId {
    #[inline]
    fn from(id: u32) -> Self {
        BlockId(id)
    }
}

impl From<BlockId> for u32 {
    #[inline]
    fn from(id: BlockId) -> Self {
        id.0
    }
}

/// One case of a multi-way branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchCase {
    /// The selector value that takes this case.
    pub value: u64,
    /// The block control transfers to.
    pub block: BlockId,
}

/// How control leaves a basic block.
///
/// Only [`Direct`](Self::Direct), [`Select`](Self::Select) and
/// [`MultiSelect`](Self::MultiSelect) have successors. The remaining kinds end the
/// function or the invocation and contribute no edges.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Terminator {
    /// Unconditional branch to a single successor.
    Direct {
        /// The successor block.
        target: BlockId,
    },
    /// Two-way conditional branch.
    Select {
        /// Taken when the condition holds.
        true_block: BlockId,
        /// Taken when the condition does not hold.
        false_block: BlockId,
    },
    /// Multi-way branch over a selector value.
    MultiSelect {
        /// Cases in declaration order.
        cases: Vec<SwitchCase>,
        /// Target when no case matches, if any.
        default: Option<BlockId>,
    },
    /// Returns from the function.
    Return,
    /// Control never reaches the end of this block.
    Unreachable,
    /// Terminates the current invocation.
    Kill,
}

impl Terminator {
    /// Returns the successors of this terminator in traversal order.
    ///
    /// The order is fixed: the true target before the false target, and switch cases
    /// in declaration order followed by the default target. The post-order numbering
    /// of the whole graph depends on it.
    #[must_use]
    pub fn targets(&self) -> SmallVec<[BlockId; 4]> {
        match self {
            Terminator::Direct { target } => smallvec::smallvec![*target],
            Terminator::Select {
                true_block,
                false_block,
            } => smallvec::smallvec![*true_block, *false_block],
            Terminator::MultiSelect { cases, default } => cases
                .iter()
                .map(|case| case.block)
                .chain(*default)
                .collect(),
            Terminator::Return | Terminator::Unreachable | Terminator::Kill => SmallVec::new(),
        }
    }

    /// Returns the static name of this terminator kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.into()
    }
}

/// Structured control flow information attached to a header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Merge {
    /// The block does not head a structured construct.
    #[default]
    None,
    /// The block is a loop header.
    Loop {
        /// The block control reaches once the loop exits.
        merge_block: BlockId,
    },
    /// The block heads an if or switch construct.
    Selection {
        /// The block where the branches of the selection reconverge.
        next_block: BlockId,
    },
}

impl Merge {
    /// Returns `true` if this is a loop merge.
    #[must_use]
    pub const fn is_loop(&self) -> bool {
        matches!(self, Merge::Loop { .. })
    }

    /// Returns the static name of this merge kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.into()
    }
}

/// The analysis' view of one basic block.
///
/// # Examples
///
/// ```rust
/// use cfgscope::ir::{Block, BlockId, Merge};
///
/// let header = Block::direct(BlockId::new(2)).with_loop_merge(BlockId::new(4));
/// assert!(header.merge.is_loop());
/// assert_eq!(header.successors().as_slice(), &[BlockId::new(2)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// How control leaves the block.
    pub terminator: Terminator,
    /// Structured construct headed by this block.
    pub merge: Merge,
}

impl Block {
    /// Creates a block with the given terminator and no merge information.
    #[must_use]
    pub fn new(terminator: Terminator) -> Self {
        Self {
            terminator,
            merge: Merge::None,
        }
    }

    /// Creates a block ending in an unconditional branch.
    #[must_use]
    pub fn direct(target: BlockId) -> Self {
        Self::new(Terminator::Direct { target })
    }

    /// Creates a block ending in a two-way conditional branch.
    #[must_use]
    pub fn select(true_block: BlockId, false_block: BlockId) -> Self {
        Self::new(Terminator::Select {
            true_block,
            false_block,
        })
    }

    /// Creates a block ending in a multi-way branch.
    ///
    /// Case values are assigned from the position of each target.
    #[must_use]
    pub fn multi_select(targets: &[BlockId], default: Option<BlockId>) -> Self {
        let cases = targets
            .iter()
            .zip(0u64..)
            .map(|(&block, value)| SwitchCase { value, block })
            .collect();
        Self::new(Terminator::MultiSelect { cases, default })
    }

    /// Creates a block that returns from the function.
    #[must_use]
    pub fn ret() -> Self {
        Self::new(Terminator::Return)
    }

    /// Creates a block whose end is never reached.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::new(Terminator::Unreachable)
    }

    /// Marks this block as a loop header merging to `merge_block`.
    #[must_use]
    pub fn with_loop_merge(mut self, merge_block: BlockId) -> Self {
        self.merge = Merge::Loop { merge_block };
        self
    }

    /// Marks this block as a selection header reconverging at `next_block`.
    #[must_use]
    pub fn with_selection_merge(mut self, next_block: BlockId) -> Self {
        self.merge = Merge::Selection { next_block };
        self
    }

    /// Returns the literal branch targets of this block in traversal order.
    #[must_use]
    pub fn successors(&self) -> SmallVec<[BlockId; 4]> {
        self.terminator.targets()
    }
}
