//! Tree-walk helpers shared by the kernel container tests.
//!
//! Test values are boxed `u64`s handed to the tree as untyped pointers,
//! the way kernel subsystems hand it externally-owned objects. The
//! invariant checker walks the public node links directly, so it verifies
//! the structure the kernel would actually traverse.

use core::cmp::Ordering;

use wyvern_ffi::{KernelPtr, KernelResult};
use wyvern_rbtree::{sentinel_init, RbNode, RbRoot};

/// Concrete tree type used by the userspace harnesses.
pub type TestTree = RbRoot<fn(KernelPtr, KernelPtr) -> Ordering, fn(KernelPtr)>;

/// Box a test value and hand out ownership of the allocation.
pub fn make_value(v: u64) -> KernelPtr {
    Box::into_raw(Box::new(v)) as KernelPtr
}

/// Read a test value produced by [`make_value`].
pub fn read_value(value: KernelPtr) -> u64 {
    unsafe { *(value as *const u64) }
}

/// Reclaim a [`make_value`] allocation; also usable as a release callback.
pub fn free_value(value: KernelPtr) {
    unsafe { drop(Box::from_raw(value as *mut u64)) };
}

/// Comparator over [`make_value`] pointees.
pub fn u64_compare(a: KernelPtr, b: KernelPtr) -> Ordering {
    read_value(a).cmp(&read_value(b))
}

/// Build a tree seeded with `values[0]`, inserting the rest in order.
///
/// The tree owns its values through [`free_value`], so dropping it
/// reclaims everything still stored.
pub fn build_tree(values: &[u64]) -> TestTree {
    let seed = RbNode::create(make_value(values[0])).expect("seed node");
    let mut tree = RbRoot::create_with_release(
        seed,
        u64_compare as fn(KernelPtr, KernelPtr) -> Ordering,
        free_value as fn(KernelPtr),
    )
    .expect("tree");
    for &v in &values[1..] {
        tree.insert(make_value(v)).expect("insert");
    }
    tree
}

/// Query `v` through a temporary probe value.
pub fn query_value<C, R>(tree: &RbRoot<C, R>, v: u64) -> KernelResult<u64>
where
    C: Fn(KernelPtr, KernelPtr) -> Ordering,
    R: Fn(KernelPtr),
{
    let probe = make_value(v);
    let found = tree
        .query(probe)
        .map(|node| unsafe { read_value((*node).value) });
    free_value(probe);
    found
}

/// Delete `v` through a temporary probe value.
pub fn delete_value<C, R>(tree: &mut RbRoot<C, R>, v: u64) -> KernelResult<()>
where
    C: Fn(KernelPtr, KernelPtr) -> Ordering,
    R: Fn(KernelPtr),
{
    let probe = make_value(v);
    let result = tree.delete(probe);
    free_value(probe);
    result
}

/// In-order traversal of the stored test values.
pub fn collect_inorder<C, R>(tree: &RbRoot<C, R>) -> Vec<u64>
where
    C: Fn(KernelPtr, KernelPtr) -> Ordering,
    R: Fn(KernelPtr),
{
    let nil = sentinel_init().expect("sentinel");
    let mut out = Vec::new();
    unsafe { walk_inorder(tree.rb_node, nil, &mut out) };
    out
}

unsafe fn walk_inorder(node: *mut RbNode, nil: *mut RbNode, out: &mut Vec<u64>) {
    if node == nil {
        return;
    }
    walk_inorder((*node).left, nil, out);
    out.push(read_value((*node).value));
    walk_inorder((*node).right, nil, out);
}

/// Assert the red-black structural invariants over the whole tree:
/// black sentinel and root, no red node with a red child, equal black
/// count on every root-to-sentinel path, sorted in-order sequence, and a
/// size counter matching the number of real nodes.
pub fn assert_red_black_invariants<C, R>(tree: &RbRoot<C, R>)
where
    C: Fn(KernelPtr, KernelPtr) -> Ordering,
    R: Fn(KernelPtr),
{
    let nil = sentinel_init().expect("sentinel");
    unsafe {
        assert!((*nil).is_black(), "sentinel must stay black");
        assert_eq!((*nil).left, nil, "sentinel left link must stay on itself");
        assert_eq!((*nil).right, nil, "sentinel right link must stay on itself");

        if tree.rb_node != nil {
            assert!((*tree.rb_node).is_black(), "root must be black");
            assert_eq!(
                (*tree.rb_node).parent,
                nil,
                "root parent must be the sentinel"
            );
        }

        let mut count = 0;
        check_subtree(tree.rb_node, nil, &mut count);
        assert_eq!(count, tree.size(), "size counter out of sync");
    }

    let inorder = collect_inorder(tree);
    assert!(
        inorder.windows(2).all(|w| w[0] <= w[1]),
        "in-order sequence must be sorted: {inorder:?}"
    );
}

/// Returns the black-height of the subtree, panicking on any violation.
unsafe fn check_subtree(node: *mut RbNode, nil: *mut RbNode, count: &mut usize) -> usize {
    if node == nil {
        return 1;
    }
    *count += 1;

    if (*node).is_red() {
        assert!(
            (*(*node).left).is_black() && (*(*node).right).is_black(),
            "red node with red child"
        );
    }
    if (*node).left != nil {
        assert_eq!((*(*node).left).parent, node, "left child parent link broken");
    }
    if (*node).right != nil {
        assert_eq!(
            (*(*node).right).parent,
            node,
            "right child parent link broken"
        );
    }

    let left_height = check_subtree((*node).left, nil, count);
    let right_height = check_subtree((*node).right, nil, count);
    assert_eq!(left_height, right_height, "black-height mismatch");

    left_height + usize::from((*node).is_black())
}
