//! A double-ended queue built from a chain of fixed-capacity blocks.
//!
//! This queue has amortized O(1) inserts and removals at both ends of the
//! sequence, and O(1) average indexing.
//!
//! Storage is a doubly-linked chain of blocks holding [`BLOCK_SIZE`](BlockDeque::BLOCK_SIZE)
//! elements each. The leftmost block (the *front block*) is filled from its
//! end towards slot 0, the rightmost block (the *back block*) from slot 0
//! upwards, and every block strictly between the two is always full. This is
//! what allows an index to be mapped to its block with a single division.
//!
//! A deque holding a single block gives that block exactly one of the two
//! roles. Which one depends on the end it was first filled from, and decides
//! which end of the block its elements are anchored to.

use alloc::boxed::Box;
use alloc::vec::{self, Vec};
use core::cmp::Ordering;
use core::fmt::{self, Debug, Formatter};
use core::hash::{Hash, Hasher};
use core::iter::{FromIterator, FusedIterator};
use core::ops::{Index, IndexMut};

use tracing::{debug, trace};

use crate::block::{Block, BlockArena, BLOCK_SIZE, LAST_SLOT};
use crate::cursor::Cursor;
use crate::error::Error;
use crate::storage::Capacity;

/// A double-ended queue implemented with a chain of fixed-capacity blocks.
///
/// Generic over the element type `T` and the type `I` used for block handles.
/// A narrower handle type shrinks the per-block link overhead, at the cost of
/// limiting the number of blocks a deque may hold at once.
///
/// # Examples
/// ```
/// use block_deque::BlockDeque;
///
/// let mut deque = BlockDeque::<i32>::new();
/// deque.push_back(10);
/// deque.push_front(20);
///
/// assert_eq!(deque.front(), Ok(&20));
/// assert_eq!(deque.back(), Ok(&10));
/// assert_eq!(deque[1], 10);
/// assert_eq!(deque, [20, 10]);
/// ```
pub struct BlockDeque<T, I: Capacity = usize> {
    pub(crate) blocks: BlockArena<T, I>,
    pub(crate) front_block: Option<I>,
    pub(crate) back_block: Option<I>,
    pub(crate) front_index: usize,
    pub(crate) back_index: isize,
}

#[inline(never)]
#[cold]
#[track_caller]
fn index_out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index out of bounds: the len is {} but the index is {}", len, index)
}

impl<T, I: Capacity> BlockDeque<T, I> {
    /// Number of elements held by each block.
    pub const BLOCK_SIZE: usize = BLOCK_SIZE;
    /// Value of the front cursor while no front block exists.
    pub const FRONT_SENTINEL: usize = BLOCK_SIZE;
    /// Value of the back cursor while no back block exists.
    pub const BACK_SENTINEL: isize = -1;

    /// Constructs a new, empty deque. No blocks are allocated until the
    /// first element is pushed.
    ///
    /// # Examples
    /// ```
    /// let deque = block_deque::BlockDeque::<u32>::new();
    /// assert!(deque.is_empty());
    /// assert_eq!(deque.block_count(), 0);
    /// ```
    pub const fn new() -> Self {
        BlockDeque {
            blocks: BlockArena::new(),
            front_block: None,
            back_block: None,
            front_index: Self::FRONT_SENTINEL,
            back_index: Self::BACK_SENTINEL,
        }
    }

    #[inline]
    pub(crate) fn head(&self) -> Option<I> {
        self.front_block.or(self.back_block)
    }

    #[inline]
    pub(crate) fn tail(&self) -> Option<I> {
        self.back_block.or(self.front_block)
    }

    #[inline]
    fn back_len(&self) -> usize {
        (self.back_index + 1) as usize
    }

    fn allocate_block(&mut self, side: &'static str) -> I {
        let block = self.blocks.allocate();
        trace!(block = block.as_usize(), side, "allocated block");
        block
    }

    fn release_block(&mut self, block: I) -> Box<Block<T, I>> {
        trace!(block = block.as_usize(), "released block");
        self.blocks.release(block)
    }

    /// Returns the number of elements currently in the deque.
    ///
    /// This is derived from the cursors and the number of blocks in the chain.
    #[inline]
    pub fn len(&self) -> usize {
        match (self.front_block, self.back_block) {
            (None, None) => 0,
            (Some(_), None) => BLOCK_SIZE - self.front_index,
            (None, Some(_)) => self.back_len(),
            (Some(_), Some(_)) => {
                let interior = self.blocks.len() - 2;
                (BLOCK_SIZE - self.front_index) + BLOCK_SIZE * interior + self.back_len()
            }
        }
    }

    /// Returns `true` exactly when the deque contains zero elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.front_block.is_none() && self.back_block.is_none()
    }

    /// Returns the number of blocks currently owned by the deque.
    ///
    /// # Examples
    /// ```
    /// let mut deque = block_deque::BlockDeque::<u8>::new();
    /// deque.extend(0..9);
    /// assert_eq!(deque.block_count(), 2);
    /// deque.pop_back();
    /// assert_eq!(deque.block_count(), 1);
    /// ```
    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the deque contains an element equal to the given value.
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|e| e == x)
    }

    /// Appends an element to the back of the deque.
    ///
    /// A new block is linked in when the back block is full, or when there
    /// is no back block yet.
    ///
    /// # Examples
    /// ```
    /// let mut deque = block_deque::BlockDeque::<i32>::new();
    /// for i in 0..9 { deque.push_back(i); }
    /// assert_eq!(deque.len(), 9);
    /// assert_eq!(deque[8], 8);
    /// ```
    pub fn push_back(&mut self, value: T) {
        let back = match (self.front_block, self.back_block) {
            (front, Some(back)) if self.back_index == LAST_SLOT as isize => {
                let block = self.allocate_block("back");
                self.blocks.link_after(back, block);
                if front.is_none() {
                    // a full back-only block takes over the front role
                    self.front_block = Some(back);
                    self.front_index = 0;
                }
                self.back_block = Some(block);
                self.back_index = Self::BACK_SENTINEL;
                block
            }
            (_, Some(back)) => back,
            (Some(front), None) => {
                let block = self.allocate_block("back");
                self.blocks.link_after(front, block);
                self.back_block = Some(block);
                self.back_index = Self::BACK_SENTINEL;
                block
            }
            (None, None) => {
                let block = self.allocate_block("back");
                self.back_block = Some(block);
                self.back_index = Self::BACK_SENTINEL;
                block
            }
        };

        self.back_index += 1;
        *self.blocks.slot_mut(back, self.back_index as usize) = Some(value);
    }

    /// Prepends an element to the front of the deque.
    ///
    /// A new block is linked in when the front block is full, or when there
    /// is no front block yet.
    ///
    /// # Examples
    /// ```
    /// let mut deque = block_deque::BlockDeque::<i32>::new();
    /// for i in 0..9 { deque.push_front(i); }
    /// assert_eq!(deque.front(), Ok(&8));
    /// assert_eq!(deque.back(), Ok(&0));
    /// ```
    pub fn push_front(&mut self, value: T) {
        let front = match (self.front_block, self.back_block) {
            (Some(front), back) if self.front_index == 0 => {
                let block = self.allocate_block("front");
                self.blocks.link_before(front, block);
                if back.is_none() {
                    // a full front-only block takes over the back role
                    self.back_block = Some(front);
                    self.back_index = LAST_SLOT as isize;
                }
                self.front_block = Some(block);
                self.front_index = Self::FRONT_SENTINEL;
                block
            }
            (Some(front), _) => front,
            (None, Some(back)) => {
                let block = self.allocate_block("front");
                self.blocks.link_before(back, block);
                self.front_block = Some(block);
                self.front_index = Self::FRONT_SENTINEL;
                block
            }
            (None, None) => {
                let block = self.allocate_block("front");
                self.front_block = Some(block);
                self.front_index = Self::FRONT_SENTINEL;
                block
            }
        };

        self.front_index -= 1;
        *self.blocks.slot_mut(front, self.front_index) = Some(value);
    }

    /// Removes the last element and returns it, or [`None`] if the deque is
    /// empty. Popping an empty deque is not an error.
    ///
    /// The back block is released as soon as its last element is removed.
    ///
    /// # Examples
    /// ```
    /// let mut deque = block_deque::BlockDeque::<i32>::new();
    /// deque.push_back(1);
    /// deque.push_back(3);
    /// assert_eq!(deque.pop_back(), Some(3));
    /// assert_eq!(deque.pop_back(), Some(1));
    /// assert_eq!(deque.pop_back(), None);
    /// ```
    pub fn pop_back(&mut self) -> Option<T> {
        match (self.front_block, self.back_block) {
            (None, None) => None,
            (Some(front), None) => {
                if self.front_index == LAST_SLOT {
                    self.front_block = None;
                    self.front_index = Self::FRONT_SENTINEL;
                    let mut block = self.release_block(front);
                    return block.slots[LAST_SLOT].take();
                }

                // a lone front block stays anchored to its last slot
                let slots = &mut self.blocks[front].slots;
                let value = slots[LAST_SLOT].take();
                slots[self.front_index..].rotate_right(1);
                self.front_index += 1;
                value
            }
            (front, Some(back)) => {
                if self.back_index > 0 {
                    let value = self.blocks.slot_mut(back, self.back_index as usize).take();
                    self.back_index -= 1;
                    return value;
                }

                let prev = self.blocks[back].prev;
                let mut block = self.release_block(back);
                match prev {
                    Some(prev) if Some(prev) != front => {
                        self.back_block = Some(prev);
                        self.back_index = LAST_SLOT as isize;
                    }
                    _ => {
                        self.back_block = None;
                        self.back_index = Self::BACK_SENTINEL;
                    }
                }
                block.slots[0].take()
            }
        }
    }

    /// Removes the first element and returns it, or [`None`] if the deque is
    /// empty. Popping an empty deque is not an error.
    ///
    /// The front block is released as soon as its last element is removed.
    ///
    /// # Examples
    /// ```
    /// let mut deque = block_deque::BlockDeque::<i32>::new();
    /// deque.push_back(1);
    /// deque.push_back(2);
    /// assert_eq!(deque.pop_front(), Some(1));
    /// assert_eq!(deque.pop_front(), Some(2));
    /// assert_eq!(deque.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        match (self.front_block, self.back_block) {
            (None, None) => None,
            (None, Some(back)) => {
                if self.back_index == 0 {
                    self.back_block = None;
                    self.back_index = Self::BACK_SENTINEL;
                    let mut block = self.release_block(back);
                    return block.slots[0].take();
                }

                // a lone back block stays anchored to slot 0
                let last = self.back_index as usize;
                let slots = &mut self.blocks[back].slots;
                let value = slots[0].take();
                slots[..=last].rotate_left(1);
                self.back_index -= 1;
                value
            }
            (Some(front), back) => {
                if self.front_index < LAST_SLOT {
                    let value = self.blocks.slot_mut(front, self.front_index).take();
                    self.front_index += 1;
                    return value;
                }

                let next = self.blocks[front].next;
                let mut block = self.release_block(front);
                match next {
                    Some(next) if Some(next) != back => {
                        self.front_block = Some(next);
                        self.front_index = 0;
                    }
                    _ => {
                        self.front_block = None;
                        self.front_index = Self::FRONT_SENTINEL;
                    }
                }
                block.slots[LAST_SLOT].take()
            }
        }
    }

    fn front_position(&self) -> Option<(I, usize)> {
        match (self.front_block, self.back_block) {
            (Some(front), _) => Some((front, self.front_index)),
            (None, Some(back)) => Some((back, 0)),
            (None, None) => None,
        }
    }

    fn back_position(&self) -> Option<(I, usize)> {
        match (self.front_block, self.back_block) {
            (_, Some(back)) => Some((back, self.back_index as usize)),
            (Some(front), None) => Some((front, LAST_SLOT)),
            (None, None) => None,
        }
    }

    /// Returns a reference to the front element, or [`Error::Empty`] if the
    /// deque is empty.
    pub fn front(&self) -> Result<&T, Error> {
        let (block, slot) = self.front_position().ok_or(Error::Empty)?;
        self.blocks.value(block, slot).ok_or(Error::Empty)
    }

    /// Returns a mutable reference to the front element, or [`Error::Empty`]
    /// if the deque is empty.
    pub fn front_mut(&mut self) -> Result<&mut T, Error> {
        let (block, slot) = self.front_position().ok_or(Error::Empty)?;
        self.blocks.slot_mut(block, slot).as_mut().ok_or(Error::Empty)
    }

    /// Returns a reference to the back element, or [`Error::Empty`] if the
    /// deque is empty.
    ///
    /// # Examples
    /// ```
    /// use block_deque::{BlockDeque, Error};
    ///
    /// let mut deque = BlockDeque::<i32>::new();
    /// assert_eq!(deque.back(), Err(Error::Empty));
    /// deque.push_front(4);
    /// assert_eq!(deque.back(), Ok(&4));
    /// ```
    pub fn back(&self) -> Result<&T, Error> {
        let (block, slot) = self.back_position().ok_or(Error::Empty)?;
        self.blocks.value(block, slot).ok_or(Error::Empty)
    }

    /// Returns a mutable reference to the back element, or [`Error::Empty`]
    /// if the deque is empty.
    pub fn back_mut(&mut self) -> Result<&mut T, Error> {
        let (block, slot) = self.back_position().ok_or(Error::Empty)?;
        self.blocks.slot_mut(block, slot).as_mut().ok_or(Error::Empty)
    }

    /// Maps a logical index to its block and slot. Only blocks strictly
    /// after the front block are walked, one link per full block skipped.
    fn locate(&self, index: usize) -> Option<(I, usize)> {
        match (self.front_block, self.back_block) {
            (None, None) => None,
            (None, Some(back)) => Some((back, index)),
            (Some(front), None) => Some((front, self.front_index + index)),
            (Some(front), Some(_)) => {
                if index <= LAST_SLOT - self.front_index {
                    return Some((front, self.front_index + index));
                }

                let index = index - (BLOCK_SIZE - self.front_index);
                let mut block = self.blocks[front].next?;
                for _ in 0..index / BLOCK_SIZE {
                    block = self.blocks[block].next?;
                }

                Some((block, index % BLOCK_SIZE))
            }
        }
    }

    fn slot_at(&mut self, index: usize) -> Option<&mut Option<T>> {
        let (block, slot) = self.locate(index)?;
        Some(self.blocks.slot_mut(block, slot))
    }

    fn take_at(&mut self, index: usize) -> Option<T> {
        self.slot_at(index)?.take()
    }

    fn put_at(&mut self, index: usize, value: Option<T>) {
        if let Some(slot) = self.slot_at(index) {
            *slot = value;
        }
    }

    /// Returns a reference to the element at the given index, or [`None`] if
    /// the index is out of bounds. The deque is left untouched either way.
    ///
    /// The element at index 0 is the front of the queue.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }

        let (block, slot) = self.locate(index)?;
        self.blocks.value(block, slot)
    }

    /// Returns a mutable reference to the element at the given index, or
    /// [`None`] if the index is out of bounds. The deque is left untouched
    /// either way.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }

        self.slot_at(index)?.as_mut()
    }

    #[cold]
    fn reject(&mut self, index: isize, len: usize) -> Error {
        if len > 0 {
            debug!(index, len, "index out of range, clearing deque");
        }
        self.clear();
        Error::IndexOutOfRange { index, len }
    }

    /// Returns a mutable reference to the element at the given index.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index` is negative or not less
    /// than the deque's length. **The deque is cleared before the error is
    /// returned.** Use [`get_mut`](BlockDeque::get_mut) for a non-destructive
    /// lookup.
    ///
    /// # Examples
    /// ```
    /// use block_deque::{BlockDeque, Error};
    ///
    /// let mut deque: BlockDeque<i32> = (0..17).collect();
    /// *deque.at(16).unwrap() += 100;
    /// assert_eq!(deque.back(), Ok(&116));
    ///
    /// assert_eq!(deque.at(-1), Err(Error::IndexOutOfRange { index: -1, len: 17 }));
    /// assert!(deque.is_empty());
    /// ```
    pub fn at(&mut self, index: isize) -> Result<&mut T, Error> {
        let len = self.len();
        if index < 0 || index as usize >= len {
            return Err(self.reject(index, len));
        }

        self.get_mut(index as usize)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Clears the deque, dropping all values and releasing every block.
    pub fn clear(&mut self) {
        if self.blocks.len() > 0 {
            trace!(blocks = self.blocks.len(), "releasing all blocks");
        }

        self.blocks.clear();
        self.front_block = None;
        self.back_block = None;
        self.front_index = Self::FRONT_SENTINEL;
        self.back_index = Self::BACK_SENTINEL;
    }

    /// Swaps the elements at indices `i` and `j`.
    ///
    /// `i` and `j` may be equal.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    ///
    /// # Examples
    /// ```
    /// let mut deque: block_deque::BlockDeque<i32> = (1..=10).collect();
    /// deque.swap(0, 9);
    /// assert_eq!(deque, [10, 2, 3, 4, 5, 6, 7, 8, 9, 1]);
    /// ```
    pub fn swap(&mut self, i: usize, j: usize) {
        let len = self.len();
        if i >= len || j >= len {
            index_out_of_bounds(usize::max(i, j), len);
        }

        let a = self.take_at(i);
        let b = self.take_at(j);
        self.put_at(i, b);
        self.put_at(j, a);
    }

    /// Inserts an element at `index`, shifting all elements after it one
    /// position towards the back.
    ///
    /// Inserting at 0 or at `len()` is the same as [`push_front`](BlockDeque::push_front)
    /// or [`push_back`](BlockDeque::push_back). Anywhere else this takes O(n)
    /// time.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index` is negative or greater
    /// than the deque's length. **The deque is cleared before the error is
    /// returned**, and `value` is dropped.
    ///
    /// # Examples
    /// ```
    /// let mut deque: block_deque::BlockDeque<char> = "abc".chars().collect();
    /// deque.insert(1, 'd').unwrap();
    /// assert_eq!(deque, ['a', 'd', 'b', 'c']);
    /// ```
    pub fn insert(&mut self, index: isize, value: T) -> Result<(), Error> {
        let len = self.len();
        if index < 0 || index as usize > len {
            return Err(self.reject(index, len));
        }

        let index = index as usize;
        if index == 0 {
            self.push_front(value);
        } else if index == len {
            self.push_back(value);
        } else {
            let last = self.take_at(len - 1);
            for i in (index + 1..len).rev() {
                let shifted = self.take_at(i - 1);
                self.put_at(i, shifted);
            }
            self.put_at(index, Some(value));

            // re-appending the displaced element grows the chain if needed
            if let Some(last) = last {
                self.push_back(last);
            }
        }

        Ok(())
    }

    /// Removes and returns the element at `index`, shifting all elements
    /// after it one position towards the front.
    ///
    /// Removing at 0 or at `len() - 1` is the same as [`pop_front`](BlockDeque::pop_front)
    /// or [`pop_back`](BlockDeque::pop_back). Anywhere else this takes O(n)
    /// time.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index` is negative or not less
    /// than the deque's length. **The deque is cleared before the error is
    /// returned.**
    ///
    /// # Examples
    /// ```
    /// let mut deque: block_deque::BlockDeque<i32> = (1..=3).collect();
    /// assert_eq!(deque.remove(1), Ok(2));
    /// assert_eq!(deque, [1, 3]);
    /// ```
    pub fn remove(&mut self, index: isize) -> Result<T, Error> {
        let len = self.len();
        if index < 0 || index as usize >= len {
            return Err(self.reject(index, len));
        }

        let position = index as usize;
        let removed = if position == 0 {
            self.pop_front()
        } else if position == len - 1 {
            self.pop_back()
        } else {
            let removed = self.take_at(position);
            for i in position..len - 1 {
                let shifted = self.take_at(i + 1);
                self.put_at(i, shifted);
            }

            let hole = self.pop_back();
            debug_assert!(hole.is_none());
            removed
        };

        removed.ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Returns a cursor positioned at the front element.
    ///
    /// For an empty deque this is a null cursor equal to [`end`](BlockDeque::end).
    pub fn begin(&self) -> Cursor<'_, T, I> {
        match (self.front_block, self.back_block) {
            (Some(front), _) => Cursor::new(self, Some(front), self.front_index),
            (None, Some(back)) => Cursor::new(self, Some(back), 0),
            (None, None) => Cursor::new(self, None, 0),
        }
    }

    /// Returns a cursor positioned one past the back element.
    ///
    /// # Examples
    /// ```
    /// let mut deque = block_deque::BlockDeque::<i32>::new();
    /// deque.push_back(10);
    /// deque.push_front(20);
    ///
    /// let mut values = Vec::new();
    /// let mut it = deque.begin();
    /// while it != deque.end() {
    ///     values.push(*it.get().unwrap());
    ///     it += 1;
    /// }
    /// assert_eq!(values, [20, 10]);
    /// ```
    pub fn end(&self) -> Cursor<'_, T, I> {
        match (self.front_block, self.back_block) {
            (_, Some(back)) => Cursor::new(self, Some(back), usize::min(self.back_len(), BLOCK_SIZE)),
            (Some(front), None) => Cursor::new(self, Some(front), BLOCK_SIZE),
            (None, None) => Cursor::new(self, None, 0),
        }
    }

    /// Returns a front-to-back iterator.
    ///
    /// # Examples
    /// ```
    /// let mut deque = block_deque::BlockDeque::<i32>::new();
    /// deque.push_back(5);
    /// deque.push_back(3);
    /// deque.push_front(4);
    ///
    /// let mut it = deque.iter();
    /// assert_eq!(it.next(), Some(&4));
    /// assert_eq!(it.next_back(), Some(&3));
    /// assert_eq!(it.next(), Some(&5));
    /// assert!(it.next().is_none());
    /// ```
    pub fn iter(&self) -> Iter<'_, T, I> {
        Iter {
            blocks: &self.blocks,
            front: self.front_position(),
            back: self.back_position(),
            len: self.len(),
        }
    }

    /// Returns a front-to-back iterator that returns mutable references.
    ///
    /// # Examples
    /// ```
    /// let mut deque: block_deque::BlockDeque<i32> = (0..20).collect();
    /// for num in deque.iter_mut() {
    ///     *num *= 2;
    /// }
    /// assert_eq!(deque[19], 38);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, T, I> {
        let len = self.len();
        let head = self.head();
        IterMut {
            blocks: self.blocks.chain_mut(head).into_iter(),
            front: None,
            back: None,
            len,
        }
    }
}

impl<T, I: Capacity> Default for BlockDeque<T, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, I: Capacity> Clone for BlockDeque<T, I> {
    /// Deep-copies every block. Handles, and therefore the front and back
    /// roles, carry over unchanged.
    fn clone(&self) -> Self {
        BlockDeque {
            blocks: self.blocks.clone(),
            front_block: self.front_block,
            back_block: self.back_block,
            front_index: self.front_index,
            back_index: self.back_index,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.blocks.clone_from(&source.blocks);
        self.front_block = source.front_block;
        self.back_block = source.back_block;
        self.front_index = source.front_index;
        self.back_index = source.back_index;
    }
}

impl<T: Debug, I: Capacity> Debug for BlockDeque<T, I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, I: Capacity> Index<usize> for BlockDeque<T, I> {
    type Output = T;

    /// Non-destructive indexing; see [`BlockDeque::at`] for the checked form.
    #[track_caller]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => index_out_of_bounds(index, self.len()),
        }
    }
}

impl<T, I: Capacity> IndexMut<usize> for BlockDeque<T, I> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        match self.get_mut(index) {
            Some(value) => value,
            None => index_out_of_bounds(index, len),
        }
    }
}

impl<T: Hash, I: Capacity> Hash for BlockDeque<T, I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        self.iter().for_each(|elem| elem.hash(state));
    }
}

impl<AT, AI, BT, BI> PartialEq<BlockDeque<BT, BI>> for BlockDeque<AT, AI>
where
    AT: PartialEq<BT>,
    AI: Capacity,
    BI: Capacity,
{
    fn eq(&self, other: &BlockDeque<BT, BI>) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq, I: Capacity> Eq for BlockDeque<T, I> {}

impl<T: PartialEq, I: Capacity, R: AsRef<[T]>> PartialEq<R> for BlockDeque<T, I> {
    fn eq(&self, other: &R) -> bool {
        let other = other.as_ref();
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: PartialOrd, AI: Capacity, BI: Capacity> PartialOrd<BlockDeque<T, BI>> for BlockDeque<T, AI> {
    fn partial_cmp(&self, other: &BlockDeque<T, BI>) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, I: Capacity> Ord for BlockDeque<T, I> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T, I: Capacity> Extend<T> for BlockDeque<T, I> {
    fn extend<It: IntoIterator<Item = T>>(&mut self, iter: It) {
        iter.into_iter().for_each(|item| self.push_back(item));
    }
}

impl<'a, T: 'a + Clone, I: Capacity> Extend<&'a T> for BlockDeque<T, I> {
    fn extend<It: IntoIterator<Item = &'a T>>(&mut self, iter: It) {
        iter.into_iter()
            .for_each(|item| self.push_back(item.clone()));
    }
}

impl<T, I: Capacity> FromIterator<T> for BlockDeque<T, I> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

/// An iterator over the elements of a deque.
///
/// This `struct` is created by the [`iter`](BlockDeque::iter) method on [`BlockDeque`].
/// See its documentation for more.
pub struct Iter<'a, T, I: Capacity> {
    blocks: &'a BlockArena<T, I>,
    front: Option<(I, usize)>,
    back: Option<(I, usize)>,
    len: usize,
}

impl<T, I: Capacity> Clone for Iter<'_, T, I> {
    fn clone(&self) -> Self {
        Iter {
            blocks: self.blocks,
            front: self.front,
            back: self.back,
            len: self.len,
        }
    }
}

impl<T: Debug, I: Capacity> Debug for Iter<'_, T, I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T, I: Capacity> Iterator for Iter<'a, T, I> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }

        let blocks = self.blocks;
        let (block, slot) = self.front?;
        self.len -= 1;
        self.front = if slot == LAST_SLOT {
            blocks[block].next.map(|next| (next, 0))
        } else {
            Some((block, slot + 1))
        };

        blocks.value(block, slot)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T, I: Capacity> DoubleEndedIterator for Iter<'a, T, I> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }

        let blocks = self.blocks;
        let (block, slot) = self.back?;
        self.len -= 1;
        self.back = if slot == 0 {
            blocks[block].prev.map(|prev| (prev, LAST_SLOT))
        } else {
            Some((block, slot - 1))
        };

        blocks.value(block, slot)
    }
}

impl<T, I: Capacity> ExactSizeIterator for Iter<'_, T, I> {}
impl<T, I: Capacity> FusedIterator for Iter<'_, T, I> {}

/// A mutable iterator over the elements of a deque.
///
/// This `struct` is created by the [`iter_mut`](BlockDeque::iter_mut) method on [`BlockDeque`].
/// See its documentation for more.
pub struct IterMut<'a, T, I> {
    blocks: vec::IntoIter<&'a mut Block<T, I>>,
    front: Option<core::slice::IterMut<'a, Option<T>>>,
    back: Option<core::slice::IterMut<'a, Option<T>>>,
    len: usize,
}

impl<T: Debug, I> Debug for IterMut<'_, T, I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("len", &self.len).finish()
    }
}

impl<'a, T, I> Iterator for IterMut<'a, T, I> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        loop {
            if let Some(slots) = &mut self.front {
                for slot in slots {
                    if let Some(value) = Option::as_mut(slot) {
                        self.len -= 1;
                        return Some(value);
                    }
                }
            }

            match self.blocks.next() {
                Some(block) => self.front = Some(block.slots.iter_mut()),
                None => break,
            }
        }

        let slots = self.back.as_mut()?;
        for slot in slots {
            if let Some(value) = Option::as_mut(slot) {
                self.len -= 1;
                return Some(value);
            }
        }

        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T, I> DoubleEndedIterator for IterMut<'a, T, I> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        loop {
            if let Some(slots) = &mut self.back {
                while let Some(slot) = slots.next_back() {
                    if let Some(value) = Option::as_mut(slot) {
                        self.len -= 1;
                        return Some(value);
                    }
                }
            }

            match self.blocks.next_back() {
                Some(block) => self.back = Some(block.slots.iter_mut()),
                None => break,
            }
        }

        let slots = self.front.as_mut()?;
        while let Some(slot) = slots.next_back() {
            if let Some(value) = Option::as_mut(slot) {
                self.len -= 1;
                return Some(value);
            }
        }

        None
    }
}

impl<T, I> ExactSizeIterator for IterMut<'_, T, I> {}
impl<T, I> FusedIterator for IterMut<'_, T, I> {}

/// An owning iterator over the elements of a deque.
///
/// This `struct` is created by the [`into_iter`](BlockDeque::into_iter)
/// method on [`BlockDeque`] (provided by the [`IntoIterator`] trait). See its
/// documentation for more.
pub struct IntoIter<T, I: Capacity> {
    deque: BlockDeque<T, I>,
}

impl<T: Debug, I: Capacity> Debug for IntoIter<T, I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.deque).finish()
    }
}

impl<T, I: Capacity> Iterator for IntoIter<T, I> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.deque.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.deque.len();
        (len, Some(len))
    }
}

impl<T, I: Capacity> DoubleEndedIterator for IntoIter<T, I> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.deque.pop_back()
    }
}

impl<T, I: Capacity> ExactSizeIterator for IntoIter<T, I> {}
impl<T, I: Capacity> FusedIterator for IntoIter<T, I> {}

impl<T, I: Capacity> IntoIterator for BlockDeque<T, I> {
    type Item = T;
    type IntoIter = IntoIter<T, I>;

    fn into_iter(self) -> IntoIter<T, I> {
        IntoIter { deque: self }
    }
}

impl<'a, T, I: Capacity> IntoIterator for &'a BlockDeque<T, I> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, I>;

    fn into_iter(self) -> Iter<'a, T, I> {
        self.iter()
    }
}

impl<'a, T, I: Capacity> IntoIterator for &'a mut BlockDeque<T, I> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, I>;

    fn into_iter(self) -> IterMut<'a, T, I> {
        self.iter_mut()
    }
}

#[cfg(test)]
impl<T, I: Capacity> BlockDeque<T, I> {
    /// Asserts the structural invariants of the block chain.
    pub(crate) fn check_invariants(&self) {
        assert!(self.front_index <= BLOCK_SIZE);
        assert!(self.back_index >= -1 && self.back_index <= LAST_SLOT as isize);
        match self.front_block {
            Some(_) => assert!(self.front_index < BLOCK_SIZE),
            None => assert_eq!(self.front_index, BLOCK_SIZE),
        }
        match self.back_block {
            Some(_) => assert!(self.back_index >= 0),
            None => assert_eq!(self.back_index, -1),
        }
        if self.front_block.is_some() {
            assert!(self.front_block != self.back_block);
        }

        let mut chain = Vec::new();
        let mut prev = None;
        let mut cursor = self.head();
        while let Some(block) = cursor {
            assert!(self.blocks[block].prev == prev, "broken back link");
            chain.push(block);
            prev = Some(block);
            cursor = self.blocks[block].next;
        }
        assert_eq!(chain.len(), self.blocks.len(), "arena holds unlinked blocks");
        assert!(self.tail() == chain.last().copied());
        if chain.len() >= 2 {
            assert!(self.front_block == chain.first().copied());
            assert!(self.back_block == chain.last().copied());
        }

        for &block in &chain {
            for slot in 0..BLOCK_SIZE {
                let occupied = if Some(block) == self.front_block {
                    slot >= self.front_index
                } else if Some(block) == self.back_block {
                    slot as isize <= self.back_index
                } else {
                    true
                };
                assert_eq!(
                    self.blocks[block].slots[slot].is_some(),
                    occupied,
                    "slot {} of block {} has wrong occupancy",
                    slot,
                    block.as_usize()
                );
            }
        }

        assert_eq!(self.iter().count(), self.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::VecDeque;
    use alloc::format;
    use core::cell::Cell;
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    fn contents<I: Capacity>(deque: &BlockDeque<i32, I>) -> Vec<i32> {
        deque.iter().copied().collect()
    }

    #[test]
    fn empty_deque() {
        let mut deque = BlockDeque::<i32>::new();
        deque.check_invariants();
        assert!(deque.is_empty());
        assert_eq!(deque.len(), 0);
        assert_eq!(deque.front(), Err(Error::Empty));
        assert_eq!(deque.back(), Err(Error::Empty));
        assert_eq!(deque.front_mut(), Err(Error::Empty));
        assert_eq!(deque.pop_back(), None);
        assert_eq!(deque.pop_front(), None);
        assert_eq!(deque.get(0), None);
        assert!(deque.iter().next().is_none());
        deque.check_invariants();
    }

    #[test]
    fn push_back_crosses_block_boundaries() {
        let mut deque = BlockDeque::<i32>::new();
        for i in 0..9 {
            deque.push_back(i);
            deque.check_invariants();
        }
        assert_eq!(deque.len(), 9);
        assert_eq!(deque.at(8), Ok(&mut 8));

        for i in 9..17 {
            deque.push_back(i);
            deque.check_invariants();
        }
        assert_eq!(deque.block_count(), 3);
        for i in 0..17 {
            assert_eq!(deque.at(i), Ok(&mut (i as i32)));
        }
    }

    #[test]
    fn push_front_prepends() {
        let mut deque = BlockDeque::<i32>::new();
        for i in 0..20 {
            deque.push_front(i);
            deque.check_invariants();
        }
        let expected: Vec<i32> = (0..20).rev().collect();
        assert_eq!(contents(&deque), expected);
        assert_eq!(deque.block_count(), 3);
    }

    #[test]
    fn full_back_only_block_becomes_front() {
        let mut deque = BlockDeque::<i32>::new();
        deque.extend(0..8);
        assert!(deque.front_block.is_none());
        assert_eq!(deque.back_index, 7);

        let old = deque.back_block;
        deque.push_back(8);
        deque.check_invariants();
        assert_eq!(deque.front_block, old);
        assert_eq!(deque.front_index, 0);
        assert_eq!(deque.back_index, 0);
    }

    #[test]
    fn full_front_only_block_becomes_back() {
        let mut deque = BlockDeque::<i32>::new();
        for i in 0..8 {
            deque.push_front(i);
        }
        assert!(deque.back_block.is_none());
        assert_eq!(deque.front_index, 0);

        let old = deque.front_block;
        deque.push_front(8);
        deque.check_invariants();
        assert_eq!(deque.back_block, old);
        assert_eq!(deque.back_index, 7);
        assert_eq!(deque.front_index, 7);
        assert_eq!(contents(&deque), [8, 7, 6, 5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn front_only_block_pops_back_by_shifting() {
        let mut deque = BlockDeque::<i32>::new();
        deque.push_front(3);
        deque.push_front(2);
        deque.push_front(1);
        assert_eq!(deque.front_index, 5);

        assert_eq!(deque.pop_back(), Some(3));
        deque.check_invariants();
        assert_eq!(deque.front_index, 6);
        assert_eq!(contents(&deque), [1, 2]);
        assert_eq!(deque.back(), Ok(&2));

        assert_eq!(deque.pop_back(), Some(2));
        assert_eq!(deque.pop_back(), Some(1));
        deque.check_invariants();
        assert_eq!(deque.block_count(), 0);
    }

    #[test]
    fn back_only_block_pops_front_by_shifting() {
        let mut deque = BlockDeque::<i32>::new();
        deque.extend([1, 2, 3].iter());
        assert_eq!(deque.pop_front(), Some(1));
        deque.check_invariants();
        assert_eq!(deque.back_index, 1);
        assert_eq!(contents(&deque), [2, 3]);

        deque.push_front(9);
        deque.check_invariants();
        assert_eq!(deque.block_count(), 2);
        assert_eq!(contents(&deque), [9, 2, 3]);
    }

    #[test]
    fn blocks_are_released_as_soon_as_they_empty() {
        let mut deque = BlockDeque::<i32>::new();
        deque.extend(0..24);
        assert_eq!(deque.block_count(), 3);

        for _ in 0..8 {
            deque.pop_front();
        }
        deque.check_invariants();
        assert_eq!(deque.block_count(), 2);

        deque.pop_back();
        deque.check_invariants();
        assert_eq!(deque.block_count(), 2);
        for _ in 0..7 {
            deque.pop_back();
        }
        deque.check_invariants();
        assert_eq!(deque.block_count(), 1);
        assert!(deque.back_block.is_none());
        assert_eq!(contents(&deque), (8..16).collect::<Vec<_>>());
    }

    #[test]
    fn push_then_pop_round_trip() {
        for n in [1, 7, 8, 9, 16, 17, 100].iter().copied() {
            let mut deque = BlockDeque::<i32>::new();
            deque.extend(0..n);
            for i in (0..n).rev() {
                assert_eq!(deque.pop_back(), Some(i));
                deque.check_invariants();
            }
            assert!(deque.is_empty());
            assert_eq!(deque.len(), 0);
            assert_eq!(deque.block_count(), 0);
        }
    }

    #[test]
    fn mixed_ends_model() {
        let mut rng = SmallRng::seed_from_u64(0x5432_1012_3454_3210);
        let mut deque = BlockDeque::<i32, u16>::new();
        let mut model = VecDeque::new();

        for step in 0..20_000 {
            match rng.gen_range(0..10) {
                0..=2 => {
                    deque.push_back(step);
                    model.push_back(step);
                }
                3..=5 => {
                    deque.push_front(step);
                    model.push_front(step);
                }
                6 | 7 => assert_eq!(deque.pop_back(), model.pop_back()),
                _ => assert_eq!(deque.pop_front(), model.pop_front()),
            }

            deque.check_invariants();
            assert_eq!(deque.len(), model.len());
            assert_eq!(deque.front().ok(), model.front());
            assert_eq!(deque.back().ok(), model.back());
            if !model.is_empty() {
                let i = rng.gen_range(0..model.len());
                assert_eq!(deque.get(i), model.get(i));
            }
        }

        assert!(deque.iter().eq(model.iter()));
        assert!(deque.iter().rev().eq(model.iter().rev()));
    }

    #[test]
    fn indexing_matches_push_order() {
        let mut deque = BlockDeque::<i32>::new();
        let mut model = VecDeque::new();
        for i in 0..40 {
            if i % 3 == 0 {
                deque.push_front(i);
                model.push_front(i);
            } else {
                deque.push_back(i);
                model.push_back(i);
            }
        }

        for (i, expected) in model.iter().enumerate() {
            assert_eq!(&deque[i], expected);
            assert_eq!(deque.at(i as isize), Ok(&mut expected.clone()));
        }
        deque[5] = -5;
        assert_eq!(deque.get(5), Some(&-5));
    }

    #[test]
    fn bad_index_clears_the_deque() {
        let mut deque: BlockDeque<i32> = (0..10).collect();
        assert_eq!(deque.at(-1), Err(Error::IndexOutOfRange { index: -1, len: 10 }));
        assert!(deque.is_empty());
        deque.check_invariants();

        deque.extend(0..10);
        assert_eq!(deque.at(10), Err(Error::IndexOutOfRange { index: 10, len: 10 }));
        assert!(deque.is_empty());
        assert_eq!(deque.block_count(), 0);

        assert_eq!(deque.at(0), Err(Error::IndexOutOfRange { index: 0, len: 0 }));
        deque.check_invariants();
    }

    #[test]
    fn non_destructive_lookups_keep_contents() {
        let deque: BlockDeque<i32> = (0..10).collect();
        assert_eq!(deque.get(10), None);
        assert_eq!(deque.len(), 10);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn index_operator_panics() {
        let deque: BlockDeque<i32> = (0..3).collect();
        let _value = deque[3];
    }

    #[test]
    fn insert_at_ends_delegates_to_push() {
        let mut deque: BlockDeque<i32> = (1..=3).collect();
        deque.insert(0, 0).unwrap();
        deque.insert(4, 4).unwrap();
        assert_eq!(deque, [0, 1, 2, 3, 4]);

        let mut pushed: BlockDeque<i32> = (1..=3).collect();
        pushed.push_front(0);
        pushed.push_back(4);
        assert_eq!(deque.front_block, pushed.front_block);
        assert_eq!(deque.front_index, pushed.front_index);
        assert_eq!(deque.back_index, pushed.back_index);
    }

    #[test]
    fn insert_in_the_middle_shifts_up() {
        for len in 2..30 {
            for k in 1..len {
                let mut deque = BlockDeque::<i32>::new();
                let mut model = VecDeque::new();
                for i in 0..len {
                    if i % 2 == 0 {
                        deque.push_back(i);
                        model.push_back(i);
                    } else {
                        deque.push_front(i);
                        model.push_front(i);
                    }
                }

                deque.insert(k as isize, -1).unwrap();
                model.insert(k as usize, -1);
                deque.check_invariants();
                assert_eq!(deque.len(), len as usize + 1);
                assert_eq!(deque.get(k as usize), Some(&-1));
                assert!(deque.iter().eq(model.iter()));
            }
        }
    }

    #[test]
    fn insert_with_bad_index_clears() {
        let mut deque: BlockDeque<i32> = (0..5).collect();
        assert_eq!(deque.insert(6, 0), Err(Error::IndexOutOfRange { index: 6, len: 5 }));
        assert!(deque.is_empty());

        deque.extend(0..5);
        assert_eq!(deque.insert(-3, 0), Err(Error::IndexOutOfRange { index: -3, len: 5 }));
        assert!(deque.is_empty());
        deque.check_invariants();
    }

    #[test]
    fn remove_shifts_down() {
        for len in 1..30 {
            for k in 0..len {
                let mut deque = BlockDeque::<i32>::new();
                let mut model = VecDeque::new();
                for i in 0..len {
                    if i % 3 == 0 {
                        deque.push_front(i);
                        model.push_front(i);
                    } else {
                        deque.push_back(i);
                        model.push_back(i);
                    }
                }

                assert_eq!(deque.remove(k as isize).ok(), model.remove(k as usize));
                deque.check_invariants();
                assert!(deque.iter().eq(model.iter()));
            }
        }
    }

    #[test]
    fn remove_at_ends_delegates_to_pop() {
        let mut deque: BlockDeque<i32> = (0..12).collect();
        assert_eq!(deque.remove(0), Ok(0));
        assert_eq!(deque.remove(10), Ok(11));
        assert_eq!(deque, (1..11).collect::<Vec<_>>());

        assert_eq!(deque.remove(10), Err(Error::IndexOutOfRange { index: 10, len: 10 }));
        assert!(deque.is_empty());
    }

    #[test]
    fn swap_across_blocks() {
        let mut deque: BlockDeque<i32> = (0..20).collect();
        deque.swap(1, 18);
        deque.swap(4, 4);
        assert_eq!(deque[1], 18);
        assert_eq!(deque[18], 1);
        assert_eq!(deque[4], 4);
        deque.check_invariants();
    }

    #[test]
    fn clone_is_deep() {
        let mut original = BlockDeque::<i32>::new();
        for i in 0..12 {
            original.push_front(i);
            original.push_back(-i);
        }

        let mut copy = original.clone();
        copy.check_invariants();
        assert_eq!(copy, original);

        let len = original.len();
        copy.push_back(100);
        *copy.front_mut().unwrap() = 7;
        assert_eq!(original.len(), len);
        assert_eq!(original.front(), Ok(&11));

        let mut target: BlockDeque<i32> = (0..3).collect();
        target.clone_from(&original);
        target.check_invariants();
        assert_eq!(target, original);
        target.clear();
        assert_eq!(original.len(), len);
    }

    #[test]
    fn iter_mut_visits_every_element_once() {
        let mut deque = BlockDeque::<i32>::new();
        for i in 0..13 {
            deque.push_front(-i);
            deque.push_back(i);
        }
        let mut model: Vec<i32> = deque.iter().copied().collect();

        assert_eq!(deque.iter_mut().len(), 26);
        for (i, value) in deque.iter_mut().enumerate() {
            *value += i as i32 * 100;
        }
        for (i, value) in model.iter_mut().enumerate() {
            *value += i as i32 * 100;
        }
        assert_eq!(deque, model);

        let mut it = deque.iter_mut();
        *it.next_back().unwrap() = 0;
        *it.next().unwrap() = 0;
        assert_eq!(it.len(), 24);
        assert_eq!(it.count(), 24);
        assert_eq!(deque.front(), Ok(&0));
        assert_eq!(deque.back(), Ok(&0));
    }

    #[test]
    fn iter_mut_meets_in_the_middle() {
        let mut deque: BlockDeque<i32> = (0..3).collect();
        let mut it = deque.iter_mut();
        assert_eq!(it.next_back().map(|v| *v), Some(2));
        assert_eq!(it.next_back().map(|v| *v), Some(1));
        assert_eq!(it.next().map(|v| *v), Some(0));
        assert!(it.next().is_none());
        assert!(it.next_back().is_none());
    }

    #[test]
    fn into_iter_both_ends() {
        let mut deque = BlockDeque::<i32>::new();
        for i in 0..10 {
            deque.push_front(i);
        }
        let mut it = deque.into_iter();
        assert_eq!(it.len(), 10);
        assert_eq!(it.next(), Some(9));
        assert_eq!(it.next_back(), Some(0));
        assert_eq!(it.collect::<Vec<_>>(), [8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn values_are_dropped_exactly_once() {
        struct Droppable<'a> {
            counter: &'a Cell<usize>,
        }

        impl Drop for Droppable<'_> {
            fn drop(&mut self) {
                self.counter.set(self.counter.get() + 1);
            }
        }

        let drop_count = Cell::new(0);
        let item = || Droppable { counter: &drop_count };

        let mut deque = BlockDeque::<Droppable>::new();
        for _ in 0..20 {
            deque.push_back(item());
            deque.push_front(item());
        }
        assert_eq!(drop_count.get(), 0);

        drop(deque.pop_back());
        drop(deque.pop_front());
        assert_eq!(drop_count.get(), 2);

        drop(deque.remove(17));
        assert_eq!(drop_count.get(), 3);
        deque.insert(5, item()).unwrap();
        assert_eq!(drop_count.get(), 3);
        assert_eq!(deque.len(), 38);

        let _ = deque.at(100);
        assert_eq!(drop_count.get(), 41);

        deque.extend((0..10).map(|_| item()));
        drop(deque);
        assert_eq!(drop_count.get(), 51);
    }

    #[test]
    fn narrow_handles() {
        crate::index_type! { Tiny: u8 };
        let mut deque = BlockDeque::<u32, Tiny>::new();
        deque.extend(0..(256 * BLOCK_SIZE as u32));
        assert_eq!(deque.block_count(), 256);
        deque.check_invariants();
        for _ in 0..BLOCK_SIZE {
            deque.pop_front();
        }
        deque.push_back(0);
        deque.check_invariants();
        assert_eq!(deque.block_count(), 256);
    }

    #[test]
    fn hashing_follows_contents() {
        use core::hash::{BuildHasher, BuildHasherDefault};
        use rustc_hash::FxHasher;

        let build = BuildHasherDefault::<FxHasher>::default();
        let hash_of = |deque: &BlockDeque<i32>| {
            let mut hasher = build.build_hasher();
            deque.hash(&mut hasher);
            hasher.finish()
        };

        let from_back: BlockDeque<i32> = (0..20).collect();
        let mut from_front = BlockDeque::<i32>::new();
        for i in (0..20).rev() {
            from_front.push_front(i);
        }

        assert_eq!(from_back, from_front);
        assert_eq!(hash_of(&from_back), hash_of(&from_front));
        from_front.pop_back();
        assert_ne!(hash_of(&from_back), hash_of(&from_front));
    }

    #[test]
    fn ordering_and_formatting() {
        let a: BlockDeque<i32> = (0..3).collect();
        let b: BlockDeque<i32, u8> = (0..4).collect();
        assert!(a < b);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
        assert_eq!(format!("{:?}", a), "[0, 1, 2]");
        assert!(a.contains(&2));
        assert!(!a.contains(&3));
    }
}
