//! C interoperability foundation for the Wyvern kernel crates
//!
//! This crate provides the shared vocabulary the kernel data-structure
//! crates use at C boundaries: the untyped caller-owned value pointer,
//! errno-valued error handling, and allocator request flags.

#![cfg_attr(not(test), no_std)]
#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]

use core::ffi::c_void;

use static_assertions::const_assert_eq;

pub use libc::{c_char, c_int, c_long, c_ulong, size_t};

/// Untyped pointer to a caller-owned value (matches C `void *`).
///
/// Kernel containers store these without constructing, copying, or
/// dereferencing the pointee; interpretation and lifetime belong to the
/// owning subsystem.
pub type KernelPtr = *mut c_void;

/// Allocation request flags matching Linux GFP values.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GfpFlags(pub u32);

impl GfpFlags {
    /// Ordinary kernel allocation; the allocator may block.
    pub const GFP_KERNEL: Self = GfpFlags(0x0cc0);
    /// Allocation from atomic context; must not block.
    pub const GFP_ATOMIC: Self = GfpFlags(0x0020);
    pub const GFP_NOWAIT: Self = GfpFlags(0x0000);
    /// Zero the block before returning it.
    pub const __GFP_ZERO: Self = GfpFlags(0x8000);

    /// Whether every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Combine two flag sets.
    pub const fn union(self, other: Self) -> Self {
        GfpFlags(self.0 | other.0)
    }
}

/// Error codes with Linux errno values.
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Operation not permitted
    EPERM = 1,
    /// Lookup target absent
    ENOENT = 2,
    /// Interrupted call
    EINTR = 4,
    /// I/O error
    EIO = 5,
    /// Try again
    EAGAIN = 11,
    /// Allocation failure
    ENOMEM = 12,
    /// Permission denied
    EACCES = 13,
    /// Bad address
    EFAULT = 14,
    /// Resource busy
    EBUSY = 16,
    /// Already exists
    EEXIST = 17,
    /// Invalid argument
    EINVAL = 22,
    /// No space left
    ENOSPC = 28,
}

impl KernelError {
    /// Negative errno form used at C call boundaries.
    pub const fn to_errno(self) -> c_int {
        -(self as c_int)
    }

    /// Map a negative errno back to the error it encodes.
    pub fn from_errno(errno: c_int) -> Option<Self> {
        match -errno {
            1 => Some(Self::EPERM),
            2 => Some(Self::ENOENT),
            4 => Some(Self::EINTR),
            5 => Some(Self::EIO),
            11 => Some(Self::EAGAIN),
            12 => Some(Self::ENOMEM),
            13 => Some(Self::EACCES),
            14 => Some(Self::EFAULT),
            16 => Some(Self::EBUSY),
            17 => Some(Self::EEXIST),
            22 => Some(Self::EINVAL),
            28 => Some(Self::ENOSPC),
            _ => None,
        }
    }

    /// Symbolic name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::EPERM => "EPERM",
            Self::ENOENT => "ENOENT",
            Self::EINTR => "EINTR",
            Self::EIO => "EIO",
            Self::EAGAIN => "EAGAIN",
            Self::ENOMEM => "ENOMEM",
            Self::EACCES => "EACCES",
            Self::EFAULT => "EFAULT",
            Self::EBUSY => "EBUSY",
            Self::EEXIST => "EEXIST",
            Self::EINVAL => "EINVAL",
            Self::ENOSPC => "ENOSPC",
        }
    }
}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

// Errno values are ABI; pin the ones the container crates return.
const_assert_eq!(KernelError::ENOENT as i32, 2);
const_assert_eq!(KernelError::ENOMEM as i32, 12);
const_assert_eq!(KernelError::EINVAL as i32, 22);
