//! Memory management subsystem
//!
//! This crate provides the allocation primitives the kernel container
//! crates build on.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod allocator;

pub use allocator::*;
