//! Allocation-failure atomicity: a failed insert must leave the tree
//! completely unmodified.
//!
//! Lives in its own test binary (and a single test function) because the
//! fault hook is process-global and would race parallel tests.

use wyvern_ffi::KernelError;
use wyvern_mm::fail_next_allocations;
use wyvern_rbtree::{sentinel_init, RbNode};
use wyvern_test_framework::helpers::{
    assert_red_black_invariants, build_tree, collect_inorder, free_value, make_value,
};

#[test]
fn failed_allocations_leave_the_tree_unchanged() {
    // The sentinel must exist before the hook is armed.
    sentinel_init().expect("sentinel");

    // Node construction reports the failure without side effects.
    fail_next_allocations(1);
    let value = make_value(1);
    assert_eq!(RbNode::create(value).unwrap_err(), KernelError::ENOMEM);
    free_value(value);

    let mut tree = build_tree(&[20, 10, 30, 25]);
    let before = collect_inorder(&tree);

    fail_next_allocations(1);
    let value = make_value(99);
    assert_eq!(tree.insert(value).unwrap_err(), KernelError::ENOMEM);
    free_value(value);

    // No partial splice, no size change.
    assert_eq!(tree.size(), 4);
    assert_eq!(collect_inorder(&tree), before);
    assert_red_black_invariants(&tree);

    // The hook is drained; the same insert now succeeds.
    tree.insert(make_value(99)).expect("insert");
    assert_eq!(tree.size(), 5);
    assert_red_black_invariants(&tree);
}
