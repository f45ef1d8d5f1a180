//! Test framework for Wyvern kernel components
//!
//! This crate provides testing infrastructure for validating the kernel
//! container crates. Unlike the kernel crates, it runs in userspace and
//! can use std.

pub mod helpers;
