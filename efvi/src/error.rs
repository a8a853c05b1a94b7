//! VI error types

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Operational errors reported to the immediate caller.
///
/// Programmer errors (missing init step, codec width skew) are not represented
/// here; those are strict-mode assertions, see [`crate::codec::Strictness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Generation or revision does not implement the request.
    #[error("Operation not supported by this hardware")]
    NotSupported,
    /// Handle does not refer to an open driver or protection domain.
    #[error("Invalid handle")]
    InvalidHandle,
    /// Host part of an address string exceeds the supported length.
    #[error("Host name too long")]
    NameTooLong,
    /// Host name could not be resolved.
    #[error("Host not found")]
    NotFound,
    /// Address or port string is malformed.
    #[error("Invalid address")]
    InvalidAddress,
    /// Ring entry count not supported by the generation.
    #[error("Unsupported ring size: {0}")]
    InvalidRingSize(u32),
    /// Descriptor ring has no free slots.
    #[error("Queue full")]
    QueueFull,
    /// Packed-stream credits exhausted, posting must wait for replenishment.
    #[error("No packed-stream credit available")]
    NoCredit,
    /// Buffer too short for the record being parsed.
    #[error("Buffer truncated")]
    Truncated,
    /// Configuration rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// POSIX error numbers used by [`Error::errno`].
pub mod errno {
    pub const EBADF: i32 = 9;
    pub const EAGAIN: i32 = 11;
    pub const ENOENT: i32 = 2;
    pub const EINVAL: i32 = 22;
    pub const ENOSPC: i32 = 28;
    pub const ENAMETOOLONG: i32 = 36;
    pub const EOPNOTSUPP: i32 = 95;
}

impl Error {
    /// Negative errno equivalent, for callers speaking the C convention.
    pub fn errno(&self) -> i32 {
        -match self {
            Self::NotSupported => errno::EOPNOTSUPP,
            Self::InvalidHandle => errno::EBADF,
            Self::NameTooLong => errno::ENAMETOOLONG,
            Self::NotFound => errno::ENOENT,
            Self::InvalidAddress => errno::EINVAL,
            Self::InvalidRingSize(_) => errno::EINVAL,
            Self::QueueFull => errno::EAGAIN,
            Self::NoCredit => errno::EAGAIN,
            Self::Truncated => errno::ENOSPC,
            Self::InvalidConfig(_) => errno::EINVAL,
        }
    }
}
