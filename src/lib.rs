#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A double-ended queue stored as a chain of fixed-capacity blocks.
//!
//! [`BlockDeque`] supports amortized O(1) pushes and pops at both ends and
//! O(1) average random access, without ever moving existing elements to grow.
//! Blocks are allocated and released one at a time as the queue grows and
//! shrinks, so memory usage tracks the current length rather than the peak.
//!
//! ```
//! use block_deque::BlockDeque;
//!
//! let mut deque = BlockDeque::<i32>::new();
//! deque.push_back(10);
//! deque.push_front(20);
//! deque.push_back(30);
//! deque.push_back(40);
//! deque.push_front(50);
//!
//! // iterate from front to back with a cursor
//! let mut seen = Vec::new();
//! let mut it = deque.begin();
//! while it != deque.end() {
//!     seen.push(*it.get().unwrap());
//!     it.move_next().unwrap();
//! }
//! assert_eq!(seen, [50, 20, 10, 30, 40]);
//!
//! assert_eq!(deque.pop_front(), Some(50));
//! assert_eq!(deque.pop_back(), Some(40));
//! assert_eq!(deque, [20, 10, 30]);
//! ```
//!
//! # Checked access clears
//!
//! [`BlockDeque::at`], [`BlockDeque::insert`] and [`BlockDeque::remove`]
//! take signed indices and report bad ones as [`Error::IndexOutOfRange`]. They
//! clear the deque before doing so. The [`Index`](core::ops::Index) operator,
//! [`get`](BlockDeque::get) and [`get_mut`](BlockDeque::get_mut) never modify
//! the deque.
//!
//! # Block handles
//!
//! Blocks are linked by handles rather than pointers. The handle type is the
//! second type parameter of [`BlockDeque`], and can be any [`Capacity`]
//! implementor, including newtypes generated by [`index_type!`].
//!
//! # Logging
//!
//! Block allocation and release are reported as `tracing` events at `TRACE`
//! level. Clearing a non-empty deque because of a bad index is reported at
//! `DEBUG` level.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod block;
pub mod cursor;
pub mod deque;
pub mod error;
pub mod storage;

pub use crate::cursor::Cursor;
pub use crate::deque::{BlockDeque, IntoIter, Iter, IterMut};
pub use crate::error::Error;
pub use crate::storage::Capacity;
