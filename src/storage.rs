//! Index types for addressing blocks within a deque's block arena.

use core::convert::TryInto;

/// Two-way conversion between `Self` and `usize`, used as the representation
/// of block handles.
///
/// # Safety
/// Implementors must ensure the conversion functions are each other's inverse,
/// i.e. `Capacity::from_usize(i).as_usize()` must either evaluate to `i`, or
/// panic for all `usize` values. Mutable iteration relies on distinct handles
/// mapping to distinct blocks.
///
/// Using [`index_type!`] should be preferred over implementing this manually.
pub unsafe trait Capacity: Copy + Eq {
    /// The largest `usize` value that can be safely converted to `Self`.
    const MAX_REPRESENTABLE: usize;
    /// Convert a `usize` into `Self`.
    fn from_usize(i: usize) -> Self;
    /// Convert `self` into `usize`.
    fn as_usize(&self) -> usize;
}

#[inline(never)]
#[cold]
#[track_caller]
pub(crate) fn from_value_out_of_range(i: usize) -> ! {
    panic!("called `from_usize` with value out of range (is {})", i)
}

#[inline(never)]
#[cold]
#[track_caller]
fn into_value_out_of_range() -> ! {
    panic!("called `as_usize` with value out of range")
}

macro_rules! impl_capacity_widening {
    ($($t:ty),*) => {$(
        unsafe impl Capacity for $t {
            const MAX_REPRESENTABLE: usize = <$t>::MAX as usize;

            #[inline]
            #[track_caller]
            fn from_usize(i: usize) -> Self {
                if let Ok(t) = i.try_into() {
                    t
                } else {
                    from_value_out_of_range(i);
                }
            }

            #[inline]
            fn as_usize(&self) -> usize {
                (*self).into()
            }
        }
    )*};
}

impl_capacity_widening!(u8, u16);

unsafe impl Capacity for u32 {
    const MAX_REPRESENTABLE: usize = if (u32::MAX as u64) < (usize::MAX as u64) {
        u32::MAX as usize
    } else {
        usize::MAX
    };

    #[inline]
    #[track_caller]
    fn from_usize(i: usize) -> Self {
        if let Ok(t) = i.try_into() {
            t
        } else {
            from_value_out_of_range(i);
        }
    }

    #[inline]
    #[track_caller]
    fn as_usize(&self) -> usize {
        if let Ok(t) = (*self).try_into() {
            t
        } else {
            into_value_out_of_range();
        }
    }
}

unsafe impl Capacity for u64 {
    const MAX_REPRESENTABLE: usize = usize::MAX;

    #[inline]
    #[track_caller]
    fn from_usize(i: usize) -> Self {
        if let Ok(t) = i.try_into() {
            t
        } else {
            from_value_out_of_range(i);
        }
    }

    #[inline]
    #[track_caller]
    fn as_usize(&self) -> usize {
        if let Ok(t) = (*self).try_into() {
            t
        } else {
            into_value_out_of_range();
        }
    }
}

unsafe impl Capacity for usize {
    const MAX_REPRESENTABLE: usize = usize::MAX;

    #[inline]
    fn from_usize(i: usize) -> Self {
        i
    }

    #[inline]
    fn as_usize(&self) -> usize {
        *self
    }
}

/// Generates a newtype wrapping an implementor of [`Capacity`].
///
/// This keeps block handles of one deque type from being confused with plain
/// integers elsewhere in a program.
///
/// # Examples
/// ```
/// use block_deque::{index_type, BlockDeque};
///
/// index_type! { pub BlockIndex: u16 };
///
/// let mut deque = BlockDeque::<i32, BlockIndex>::new();
/// for i in 0..20 { deque.push_back(i); }
/// assert_eq!(deque.block_count(), 3);
/// ```
#[macro_export]
macro_rules! index_type {
    ($v:vis $name:ident: $repr:ty) => {
        #[derive(
            core::marker::Copy,
            core::clone::Clone,
            core::default::Default,
            core::fmt::Debug,
            core::hash::Hash,
            core::cmp::PartialEq,
            core::cmp::Eq,
            core::cmp::PartialOrd,
            core::cmp::Ord)]
        $v struct $name($repr);

        unsafe impl $crate::storage::Capacity for $name {
            const MAX_REPRESENTABLE: usize = <$repr as $crate::storage::Capacity>::MAX_REPRESENTABLE;

            #[inline]
            #[track_caller]
            fn from_usize(i: usize) -> Self {
                Self(<$repr as $crate::storage::Capacity>::from_usize(i))
            }

            #[inline]
            #[track_caller]
            fn as_usize(&self) -> usize {
                <$repr as $crate::storage::Capacity>::as_usize(&self.0)
            }
        }
    }
}
