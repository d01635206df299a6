//! Fixed-capacity blocks and the arena that owns them.
//!
//! Blocks are addressed by handles of some [`Capacity`] type rather than by
//! pointer. Vacant arena entries are threaded onto an intrusive free list, so
//! a released handle is the first one to be handed out again.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::storage::{from_value_out_of_range, Capacity};

/// Number of element slots per block.
pub(crate) const BLOCK_SIZE: usize = 8;
/// Index of the last slot in a block.
pub(crate) const LAST_SLOT: usize = BLOCK_SIZE - 1;

/// A fixed-capacity run of element slots linked into a chain.
///
/// A block does not know which role it plays in its deque. Unoccupied slots
/// always hold `None`.
#[derive(Clone)]
pub(crate) struct Block<T, I> {
    pub(crate) slots: [Option<T>; BLOCK_SIZE],
    pub(crate) prev: Option<I>,
    pub(crate) next: Option<I>,
}

impl<T, I> Block<T, I> {
    fn new() -> Self {
        Block {
            slots: core::array::from_fn(|_| None),
            prev: None,
            next: None,
        }
    }
}

#[derive(Clone)]
enum Entry<T, I> {
    Occupied(Box<Block<T, I>>),
    Vacant { next_free: Option<I> },
}

/// Owner of every block of one deque.
pub(crate) struct BlockArena<T, I> {
    entries: Vec<Entry<T, I>>,
    next_free: Option<I>,
    len: usize,
}

#[inline(never)]
#[cold]
#[track_caller]
fn vacant_handle(index: usize) -> ! {
    panic!("block handle {} does not refer to a live block", index)
}

impl<T, I: Capacity> BlockArena<T, I> {
    pub(crate) const fn new() -> Self {
        BlockArena {
            entries: Vec::new(),
            next_free: None,
            len: 0,
        }
    }

    /// Returns the number of live blocks.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Allocates a fresh, unlinked block and returns its handle.
    ///
    /// # Panics
    /// Panics if the handle type cannot address another block.
    pub(crate) fn allocate(&mut self) -> I {
        let block = Box::new(Block::new());

        if let Some(handle) = self.next_free {
            let entry = &mut self.entries[handle.as_usize()];
            if let Entry::Vacant { next_free } = *entry {
                self.next_free = next_free;
            }
            *entry = Entry::Occupied(block);
            self.len += 1;
            return handle;
        }

        let index = self.entries.len();
        if index > I::MAX_REPRESENTABLE {
            from_value_out_of_range(index);
        }

        self.entries.push(Entry::Occupied(block));
        self.len += 1;
        I::from_usize(index)
    }

    /// Unlinks a block from its neighbours and removes it from the arena,
    /// returning it so the caller can move out any remaining values.
    pub(crate) fn release(&mut self, handle: I) -> Box<Block<T, I>> {
        let index = handle.as_usize();
        let vacant = Entry::Vacant { next_free: self.next_free };
        let block = match self.entries.get_mut(index).map(|e| core::mem::replace(e, vacant)) {
            Some(Entry::Occupied(block)) => block,
            Some(entry) => {
                self.entries[index] = entry;
                vacant_handle(index);
            }
            None => vacant_handle(index),
        };

        if let Some(prev) = block.prev {
            self[prev].next = block.next;
        }
        if let Some(next) = block.next {
            self[next].prev = block.prev;
        }

        self.next_free = Some(handle);
        self.len -= 1;
        block
    }

    /// Links the unlinked block `new` directly after `anchor`.
    pub(crate) fn link_after(&mut self, anchor: I, new: I) {
        let next = self[anchor].next;
        self[anchor].next = Some(new);
        self[new].prev = Some(anchor);
        self[new].next = next;
        if let Some(next) = next {
            self[next].prev = Some(new);
        }
    }

    /// Links the unlinked block `new` directly before `anchor`.
    pub(crate) fn link_before(&mut self, anchor: I, new: I) {
        let prev = self[anchor].prev;
        self[anchor].prev = Some(new);
        self[new].next = Some(anchor);
        self[new].prev = prev;
        if let Some(prev) = prev {
            self[prev].next = Some(new);
        }
    }

    /// Returns the value stored in `slot` of block `handle`, if any.
    #[inline]
    pub(crate) fn value(&self, handle: I, slot: usize) -> Option<&T> {
        self[handle].slots.get(slot)?.as_ref()
    }

    /// Returns the slot `slot` of block `handle` for writing.
    #[inline]
    pub(crate) fn slot_mut(&mut self, handle: I, slot: usize) -> &mut Option<T> {
        &mut self[handle].slots[slot]
    }

    /// Collects mutable references to the blocks reachable from `head`, in
    /// chain order.
    pub(crate) fn chain_mut(&mut self, head: Option<I>) -> Vec<&mut Block<T, I>> {
        let mut refs: Vec<Option<&mut Block<T, I>>> = self
            .entries
            .iter_mut()
            .map(|entry| match entry {
                Entry::Occupied(block) => Some(&mut **block),
                Entry::Vacant { .. } => None,
            })
            .collect();

        let mut chain = Vec::with_capacity(self.len);
        let mut cursor = head;
        while let Some(handle) = cursor {
            let block = match refs.get_mut(handle.as_usize()).and_then(Option::take) {
                Some(block) => block,
                None => break,
            };
            cursor = block.next;
            chain.push(block);
        }

        chain
    }

    /// Drops every block.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_free = None;
        self.len = 0;
    }
}

impl<T, I: Capacity> Index<I> for BlockArena<T, I> {
    type Output = Block<T, I>;

    #[inline]
    #[track_caller]
    fn index(&self, handle: I) -> &Block<T, I> {
        let index = handle.as_usize();
        match self.entries.get(index) {
            Some(Entry::Occupied(block)) => &**block,
            _ => vacant_handle(index),
        }
    }
}

impl<T, I: Capacity> IndexMut<I> for BlockArena<T, I> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, handle: I) -> &mut Block<T, I> {
        let index = handle.as_usize();
        match self.entries.get_mut(index) {
            Some(Entry::Occupied(block)) => &mut **block,
            _ => vacant_handle(index),
        }
    }
}

impl<T: Clone, I: Clone> Clone for BlockArena<T, I> {
    fn clone(&self) -> Self {
        BlockArena {
            entries: self.entries.clone(),
            next_free: self.next_free.clone(),
            len: self.len,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.entries.clear();
        self.entries.extend(source.entries.iter().cloned());
        self.next_free = source.next_free.clone();
        self.len = source.len;
    }
}
