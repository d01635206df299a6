//! Failure conditions reported by [`BlockDeque`](crate::BlockDeque) and
//! [`Cursor`](crate::Cursor).

use core::fmt::{self, Display, Formatter};

/// The error type for fallible deque and cursor operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The front or back element of an empty deque was requested.
    Empty,
    /// An index was negative or not below the bound required by the operation.
    ///
    /// Operations reporting this have cleared the deque beforehand.
    IndexOutOfRange {
        /// The offending index.
        index: isize,
        /// The length of the deque at the time of the call.
        len: usize,
    },
    /// A cursor was dereferenced or moved while not referring to an element.
    InvalidPosition,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Empty => f.write_str("deque is empty"),
            Error::IndexOutOfRange { index, len } => {
                write!(f, "index out of range (is {}, len is {})", index, len)
            }
            Error::InvalidPosition => f.write_str("invalid cursor position"),
        }
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
impl std::error::Error for Error {}
