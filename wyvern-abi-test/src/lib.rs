//! ABI regression testing for the Wyvern kernel crates
//!
//! The container structures are `repr(C)` and walked by kernel C code;
//! this crate pins their layout so a refactor cannot silently move a
//! field or grow a struct.

#![allow(dead_code)]

/// Verify a structure's size at compile time.
#[macro_export]
macro_rules! verify_size {
    ($rust_type:ty, $expected_size:expr) => {
        const _: () = {
            assert!(
                ::core::mem::size_of::<$rust_type>() == $expected_size,
                "size mismatch"
            );
        };
    };
}

/// Verify a structure's alignment at compile time.
#[macro_export]
macro_rules! verify_align {
    ($rust_type:ty, $expected_align:expr) => {
        const _: () = {
            assert!(
                ::core::mem::align_of::<$rust_type>() == $expected_align,
                "alignment mismatch"
            );
        };
    };
}
