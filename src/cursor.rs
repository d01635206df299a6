//! Bidirectional positions within a [`BlockDeque`].
//!
//! A cursor is a block handle paired with a slot index. It borrows the deque
//! immutably, so the deque cannot be modified while any cursor into it is
//! alive.
//!
//! Movement follows the block chain: stepping past the last slot of a block
//! continues at slot 0 of the next block, and stepping forward out of the
//! last block snaps to [`end`](BlockDeque::end). Stepping backwards onto or
//! before the front element snaps to [`begin`](BlockDeque::begin).

use core::fmt::{self, Debug, Formatter};
use core::ops::{Add, AddAssign, Sub, SubAssign};

use crate::block::{BLOCK_SIZE, LAST_SLOT};
use crate::deque::BlockDeque;
use crate::error::Error;
use crate::storage::Capacity;

/// A position within a [`BlockDeque`], created by [`begin`](BlockDeque::begin)
/// and [`end`](BlockDeque::end).
///
/// A cursor without a block is *null*. Null cursors compare equal to the
/// `begin()` and `end()` of an empty deque, and cannot be dereferenced or
/// moved.
///
/// # Examples
/// ```
/// use block_deque::{BlockDeque, Error};
///
/// let deque: BlockDeque<u32> = (0..10).collect();
/// let mut it = deque.begin() + 8;
/// assert_eq!(it.get(), Ok(&8));
///
/// it -= 3;
/// assert_eq!(it.get(), Ok(&5));
///
/// let end = deque.end();
/// assert_eq!(end.get(), Err(Error::InvalidPosition));
/// assert_eq!(end - 1, deque.begin() + 9);
/// ```
pub struct Cursor<'a, T, I: Capacity = usize> {
    deque: &'a BlockDeque<T, I>,
    block: Option<I>,
    slot: usize,
}

#[inline(never)]
#[cold]
#[track_caller]
fn invalid_position() -> ! {
    panic!("cursor moved from an invalid position")
}

impl<'a, T, I: Capacity> Cursor<'a, T, I> {
    pub(crate) fn new(deque: &'a BlockDeque<T, I>, block: Option<I>, slot: usize) -> Self {
        Cursor { deque, block, slot }
    }

    /// Returns `true` if the cursor does not refer to any block.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.block.is_none()
    }

    /// Returns a reference to the element under the cursor.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPosition`] if the cursor is null, or if it
    /// does not point at an element, as is the case for `end()`.
    pub fn get(&self) -> Result<&'a T, Error> {
        let deque = self.deque;
        let block = self.block.ok_or(Error::InvalidPosition)?;
        if self.slot >= BLOCK_SIZE {
            return Err(Error::InvalidPosition);
        }

        deque.blocks.value(block, self.slot).ok_or(Error::InvalidPosition)
    }

    /// Moves the cursor one position towards the back.
    ///
    /// Moving forward from the last slot of the back block, or of a lone
    /// front block, yields `end()`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPosition`] if the cursor is null. The cursor
    /// is left unchanged.
    pub fn move_next(&mut self) -> Result<(), Error> {
        let block = self.block.ok_or(Error::InvalidPosition)?;
        if self.slot < LAST_SLOT {
            self.slot += 1;
            return Ok(());
        }

        match self.deque.blocks[block].next {
            Some(next) if Some(block) != self.deque.tail() => {
                self.block = Some(next);
                self.slot = 0;
            }
            _ => *self = self.deque.end(),
        }

        Ok(())
    }

    /// Moves the cursor one position towards the front.
    ///
    /// Moving backward from the front element stays at `begin()`. Moving
    /// backward from slot 0 of a block that has no predecessor yields a null
    /// cursor.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPosition`] if the cursor is null. The cursor
    /// is left unchanged.
    pub fn move_prev(&mut self) -> Result<(), Error> {
        let block = self.block.ok_or(Error::InvalidPosition)?;
        if Some(block) == self.deque.front_block {
            if self.slot <= self.deque.front_index {
                *self = self.deque.begin();
            } else {
                self.slot -= 1;
            }
        } else if self.slot == 0 {
            self.block = self.deque.blocks[block].prev;
            self.slot = LAST_SLOT;
        } else {
            self.slot -= 1;
        }

        Ok(())
    }

    /// Moves the cursor by `steps` positions, towards the back for positive
    /// values and towards the front for negative ones.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPosition`] as soon as a step is attempted from
    /// a null cursor. Steps taken before that are not undone.
    pub fn try_advance(&mut self, steps: isize) -> Result<(), Error> {
        if steps < 0 {
            for _ in 0..steps.unsigned_abs() {
                self.move_prev()?;
            }
        } else {
            for _ in 0..steps as usize {
                self.move_next()?;
            }
        }

        Ok(())
    }

    /// Moves the cursor by `steps` positions, towards the front for positive
    /// values and towards the back for negative ones.
    ///
    /// # Errors
    /// Same as [`try_advance`](Cursor::try_advance).
    pub fn try_retreat(&mut self, steps: isize) -> Result<(), Error> {
        if steps < 0 {
            for _ in 0..steps.unsigned_abs() {
                self.move_next()?;
            }
        } else {
            for _ in 0..steps as usize {
                self.move_prev()?;
            }
        }

        Ok(())
    }
}

impl<T, I: Capacity> Clone for Cursor<'_, T, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, I: Capacity> Copy for Cursor<'_, T, I> {}

impl<T, I: Capacity> Debug for Cursor<'_, T, I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("block", &self.block.map(|b| b.as_usize()))
            .field("slot", &self.slot)
            .finish()
    }
}

/// Cursors are equal when they sit at the same block and slot of deques with
/// the same front and back handles. Cursors into two distinct deques of
/// identical shape therefore compare equal.
impl<T, I: Capacity> PartialEq for Cursor<'_, T, I> {
    fn eq(&self, other: &Self) -> bool {
        self.deque.front_block == other.deque.front_block
            && self.deque.back_block == other.deque.back_block
            && self.block == other.block
            && self.slot == other.slot
    }
}

impl<T, I: Capacity> Eq for Cursor<'_, T, I> {}

impl<T, I: Capacity> Add<usize> for Cursor<'_, T, I> {
    type Output = Self;

    /// # Panics
    /// Panics if a step is attempted from a null cursor.
    #[track_caller]
    fn add(mut self, steps: usize) -> Self {
        for _ in 0..steps {
            if self.move_next().is_err() {
                invalid_position();
            }
        }
        self
    }
}

impl<T, I: Capacity> Sub<usize> for Cursor<'_, T, I> {
    type Output = Self;

    /// # Panics
    /// Panics if a step is attempted from a null cursor.
    #[track_caller]
    fn sub(mut self, steps: usize) -> Self {
        for _ in 0..steps {
            if self.move_prev().is_err() {
                invalid_position();
            }
        }
        self
    }
}

impl<T, I: Capacity> AddAssign<isize> for Cursor<'_, T, I> {
    #[track_caller]
    fn add_assign(&mut self, steps: isize) {
        if self.try_advance(steps).is_err() {
            invalid_position();
        }
    }
}

impl<T, I: Capacity> SubAssign<isize> for Cursor<'_, T, I> {
    #[track_caller]
    fn sub_assign(&mut self, steps: isize) {
        if self.try_retreat(steps).is_err() {
            invalid_position();
        }
    }
}
