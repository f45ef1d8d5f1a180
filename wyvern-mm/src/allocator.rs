//! Kernel memory allocator interfaces
//!
//! `kmalloc`/`kfree` in front of the platform heap. Every block carries a
//! size header below the returned pointer, so `kfree` needs no size
//! argument and callers keep the C contract.

use core::alloc::Layout;

use static_assertions::const_assert;
use wyvern_ffi::{GfpFlags, KernelError, KernelResult};

use alloc::alloc::{alloc as heap_alloc, dealloc as heap_dealloc};

/// Minimum alignment handed out by `kmalloc`; also the header stride.
const KMALLOC_ALIGN: usize = 16;

// The header stores a usize and must not break the alignment guarantee.
const_assert!(KMALLOC_ALIGN.is_power_of_two());
const_assert!(KMALLOC_ALIGN >= core::mem::size_of::<usize>());

#[cfg(feature = "fault-injection")]
mod fault {
    use core::sync::atomic::{AtomicU64, Ordering};

    static FAIL_REMAINING: AtomicU64 = AtomicU64::new(0);

    /// Arm the next `n` allocations to fail with `ENOMEM`.
    pub fn fail_next_allocations(n: u64) {
        FAIL_REMAINING.store(n, Ordering::SeqCst);
    }

    pub(crate) fn should_fail() -> bool {
        FAIL_REMAINING
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1))
            .is_ok()
    }
}

#[cfg(feature = "fault-injection")]
pub use fault::fail_next_allocations;

/// Allocate `size` bytes of kernel memory.
///
/// The block is aligned to [`KMALLOC_ALIGN`] and zeroed when `flags`
/// carries `__GFP_ZERO`.
///
/// # Safety
/// The returned block must be released with [`kfree`] and not used after.
pub unsafe fn kmalloc(size: usize, flags: GfpFlags) -> KernelResult<*mut u8> {
    if size == 0 {
        return Err(KernelError::EINVAL);
    }

    #[cfg(feature = "fault-injection")]
    if fault::should_fail() {
        return Err(KernelError::ENOMEM);
    }

    let total = size.checked_add(KMALLOC_ALIGN).ok_or(KernelError::ENOMEM)?;
    let layout =
        Layout::from_size_align(total, KMALLOC_ALIGN).map_err(|_| KernelError::EINVAL)?;
    let raw = heap_alloc(layout);
    if raw.is_null() {
        return Err(KernelError::ENOMEM);
    }

    (raw as *mut usize).write(total);
    let block = raw.add(KMALLOC_ALIGN);
    if flags.contains(GfpFlags::__GFP_ZERO) {
        block.write_bytes(0, size);
    }
    Ok(block)
}

/// Allocate zeroed kernel memory.
///
/// # Safety
/// Same contract as [`kmalloc`].
pub unsafe fn kzalloc(size: usize, flags: GfpFlags) -> KernelResult<*mut u8> {
    kmalloc(size, flags.union(GfpFlags::__GFP_ZERO))
}

/// Release a block obtained from [`kmalloc`]. Null is ignored.
///
/// # Safety
/// `ptr` must come from [`kmalloc`]/[`kzalloc`] and not be freed twice.
pub unsafe fn kfree(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    let raw = ptr.sub(KMALLOC_ALIGN);
    let total = (raw as *const usize).read();
    heap_dealloc(raw, Layout::from_size_align_unchecked(total, KMALLOC_ALIGN));
}

/// C-compatible exports
#[no_mangle]
pub unsafe extern "C" fn __kmalloc(size: usize, flags: u32) -> *mut u8 {
    match kmalloc(size, GfpFlags(flags)) {
        Ok(ptr) => ptr,
        Err(_) => core::ptr::null_mut(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn kfree_wrapper(ptr: *mut u8) {
    kfree(ptr);
}
