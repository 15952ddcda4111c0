//! Function-level access to blocks.

use std::collections::HashMap;

use crate::ir::{Block, BlockId};

/// Read-only lookup of the blocks that make up one function.
///
/// This is the only capability the analysis needs from the IR owner. Implement it over
/// whatever block store the compiler already has; the analysis borrows the view for
/// its whole lifetime and never mutates it.
pub trait BlockLookup {
    /// Returns the function's single entry block.
    fn entry_block(&self) -> BlockId;

    /// Returns the block with the given identifier, or `None` if the function has no
    /// such block.
    fn block(&self, id: BlockId) -> Option<&Block>;
}

impl<T: BlockLookup + ?Sized> BlockLookup for &T {
    fn entry_block(&self) -> BlockId {
        (**self).entry_block()
    }

    fn block(&self, id: BlockId) -> Option<&Block> {
        (**self).block(id)
    }
}

/// An owned function body: an entry block and a map of blocks.
///
/// # Examples
///
/// ```rust
/// use cfgscope::ir::{Block, BlockId, BlockLookup, Function};
///
/// let entry = BlockId::new(1);
/// let mut function = Function::new(entry);
/// function.insert(entry, Block::direct(BlockId::new(2)));
/// function.insert(BlockId::new(2), Block::ret());
///
/// assert_eq!(function.entry_block(), entry);
/// assert_eq!(function.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Function {
    entry: BlockId,
    blocks: HashMap<BlockId, Block>,
}

impl Function {
    /// Creates an empty function with the given entry block.
    #[must_use]
    pub fn new(entry: BlockId) -> Self {
        Self {
            entry,
            blocks: HashMap::new(),
        }
    }

    /// Inserts or replaces a block, returning the previous block with that identifier.
    pub fn insert(&mut self, id: BlockId, block: Block) -> Option<Block> {
        self.blocks.insert(id, block)
    }

    /// Builder-style variant of [`insert`](Self::insert).
    #[must_use]
    pub fn with_block(mut self, id: BlockId, block: Block) -> Self {
        self.blocks.insert(id, block);
        self
    }

    /// Returns the number of blocks in the function, reachable or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the function has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns an iterator over all block identifiers, in no particular order.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.keys().copied()
    }
}

impl BlockLookup for Function {
    fn entry_block(&self) -> BlockId {
        self.entry
    }

    fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }
}
