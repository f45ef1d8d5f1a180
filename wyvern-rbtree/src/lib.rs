//! Kernel red-black tree
//!
//! Self-balancing ordered container used by kernel subsystems to keep
//! sorted collections of externally-owned values under logarithmic
//! insertion, exact-match lookup, and deletion.
//!
//! Every absent child or parent link points at one shared black sentinel
//! node instead of null, so traversal and rebalancing run without
//! null-pointer special cases. The tree owns exactly the nodes reachable
//! from its root; the stored values stay owned by the caller, and an
//! optional release callback lets the caller reclaim a value when its node
//! leaves the tree.

#![cfg_attr(not(test), no_std)]

use core::cmp::Ordering;
use core::fmt;
use core::mem;
use core::ptr;

use spin::Once;
use static_assertions::const_assert_eq;
use wyvern_ffi::{GfpFlags, KernelError, KernelPtr, KernelResult};
use wyvern_mm::{kfree, kmalloc};

/// Red-black node color
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RbColor {
    Red = 0,
    Black = 1,
}

/// Red-black tree node
///
/// `left` and `right` are owning links, `parent` is a non-owning
/// back-reference used only for upward traversal. All three point at the
/// shared sentinel when there is no neighbor. `value` is an untyped
/// reference to a caller-owned object the tree never dereferences.
#[repr(C)]
#[derive(Debug)]
pub struct RbNode {
    pub left: *mut RbNode,
    pub right: *mut RbNode,
    pub parent: *mut RbNode,
    pub value: KernelPtr,
    pub color: RbColor,
}

// Safety: RbNode is a raw pointer container used in kernel context where
// single-threaded or manually synchronized access is guaranteed
unsafe impl Send for RbNode {}
unsafe impl Sync for RbNode {}

// Four pointer fields plus a C-int color, padded to pointer size on LP64.
const_assert_eq!(
    mem::size_of::<RbNode>(),
    5 * mem::size_of::<usize>()
);

struct SentinelPtr(*mut RbNode);

// Safety: the sentinel is written once at initialization and only read
// afterwards
unsafe impl Send for SentinelPtr {}
unsafe impl Sync for SentinelPtr {}

static RB_NIL: Once<SentinelPtr> = Once::new();

/// Allocate the shared NIL leaf terminating every tree.
///
/// The sentinel is black, its children reference itself, and it is never
/// torn down: every tree built afterwards keeps pointing at it. The call
/// is idempotent and race-guarded; concurrent or repeated calls observe
/// the same node. Allocation failure reports `ENOMEM` and leaves the
/// sentinel uninitialized so a later call can retry.
///
/// Public operations initialize the sentinel on demand, so calling this
/// early (e.g. from boot code) is optional.
pub fn sentinel_init() -> KernelResult<*mut RbNode> {
    let nil = RB_NIL.try_call_once(|| unsafe {
        let node = kmalloc(mem::size_of::<RbNode>(), GfpFlags::GFP_KERNEL)? as *mut RbNode;
        node.write(RbNode {
            left: node,
            right: node,
            parent: node,
            value: ptr::null_mut(),
            color: RbColor::Black,
        });
        Ok(SentinelPtr(node))
    })?;
    Ok(nil.0)
}

/// Sentinel accessor for internal paths.
///
/// Every public entry point has already run [`sentinel_init`] by the time
/// this is reached.
fn nil() -> *mut RbNode {
    match RB_NIL.get() {
        Some(sentinel) => sentinel.0,
        None => ptr::null_mut(),
    }
}

impl RbNode {
    /// Allocate a node for `value`.
    ///
    /// New nodes start red with all links on the sentinel; inserting a
    /// black node would unbalance the black-height of every path through
    /// it. Allocation failure propagates as `ENOMEM` without touching any
    /// tree state.
    pub fn create(value: KernelPtr) -> KernelResult<*mut RbNode> {
        let nil = sentinel_init()?;
        let node = unsafe { kmalloc(mem::size_of::<RbNode>(), GfpFlags::GFP_KERNEL)? } as *mut RbNode;
        unsafe {
            node.write(RbNode {
                left: nil,
                right: nil,
                parent: nil,
                value,
                color: RbColor::Red,
            });
        }
        Ok(node)
    }

    /// Check if node is red
    pub fn is_red(&self) -> bool {
        self.color == RbColor::Red
    }

    /// Check if node is black
    pub fn is_black(&self) -> bool {
        self.color == RbColor::Black
    }
}

/// Red-black tree root
///
/// Holds the current root node (the sentinel when empty), the stored-value
/// count, the comparator, and the optional release callback. Both
/// capabilities are generic parameters, so dispatch is resolved at the
/// call site.
///
/// The comparator must define one total order for the lifetime of the
/// tree; duplicate keys are permitted and route to the right subtree.
pub struct RbRoot<C, R = fn(KernelPtr)>
where
    C: Fn(KernelPtr, KernelPtr) -> Ordering,
    R: Fn(KernelPtr),
{
    pub rb_node: *mut RbNode,
    size: usize,
    cmp: C,
    release: Option<R>,
}

// Safety: the tree is not internally synchronized; sharing across
// execution contexts requires the caller to serialize every operation
unsafe impl<C, R> Send for RbRoot<C, R>
where
    C: Fn(KernelPtr, KernelPtr) -> Ordering + Send,
    R: Fn(KernelPtr) + Send,
{
}
unsafe impl<C, R> Sync for RbRoot<C, R>
where
    C: Fn(KernelPtr, KernelPtr) -> Ordering + Sync,
    R: Fn(KernelPtr) + Sync,
{
}

impl<C> RbRoot<C>
where
    C: Fn(KernelPtr, KernelPtr) -> Ordering,
{
    /// Wrap `seed` as the root of a new tree.
    ///
    /// A tree always starts with one node already holding a value. The
    /// seed's links are reset to the sentinel and its color forced black.
    /// A null `seed` is rejected with `EINVAL`.
    pub fn create(seed: *mut RbNode, cmp: C) -> KernelResult<Self> {
        Self::init(seed, cmp, None)
    }
}

impl<C, R> RbRoot<C, R>
where
    C: Fn(KernelPtr, KernelPtr) -> Ordering,
    R: Fn(KernelPtr),
{
    /// Like [`RbRoot::create`], additionally registering a release
    /// callback invoked exactly once with each stored value when its node
    /// leaves the tree.
    ///
    /// The callback must not re-enter the tree it is registered on.
    pub fn create_with_release(seed: *mut RbNode, cmp: C, release: R) -> KernelResult<Self> {
        Self::init(seed, cmp, Some(release))
    }

    fn init(seed: *mut RbNode, cmp: C, release: Option<R>) -> KernelResult<Self> {
        if seed.is_null() {
            return Err(KernelError::EINVAL);
        }
        let nil = sentinel_init()?;
        unsafe {
            (*seed).parent = nil;
            (*seed).left = nil;
            (*seed).right = nil;
            (*seed).color = RbColor::Black;
        }
        Ok(Self {
            rb_node: seed,
            size: 1,
            cmp,
            release,
        })
    }

    /// Number of stored values.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.rb_node == nil()
    }

    /// Find the node holding a value comparing equal to `value`.
    ///
    /// Binary-search descent from the root; reaching the sentinel without
    /// a match reports `ENOENT`. Never mutates the tree.
    pub fn query(&self, value: KernelPtr) -> KernelResult<*mut RbNode> {
        let nil = nil();
        let mut cur = self.rb_node;
        unsafe {
            while cur != nil {
                match (self.cmp)(value, (*cur).value) {
                    Ordering::Equal => return Ok(cur),
                    Ordering::Less => cur = (*cur).left,
                    Ordering::Greater => cur = (*cur).right,
                }
            }
        }
        Err(KernelError::ENOENT)
    }

    /// Insert `value` into the tree.
    ///
    /// Values comparing equal to a stored value land in its right
    /// subtree. On `ENOMEM` the tree is left completely unmodified.
    pub fn insert(&mut self, value: KernelPtr) -> KernelResult<()> {
        // Allocate before touching any link so an allocation failure
        // cannot leave a partial splice behind.
        let node = RbNode::create(value)?;
        let nil = nil();
        unsafe {
            let mut last = nil;
            let mut cur = self.rb_node;
            while cur != nil {
                last = cur;
                cur = if (self.cmp)((*node).value, (*cur).value) == Ordering::Less {
                    (*cur).left
                } else {
                    (*cur).right
                };
            }

            (*node).parent = last;
            if last == nil {
                self.rb_node = node;
            } else if (self.cmp)((*node).value, (*last).value) == Ordering::Less {
                (*last).left = node;
            } else {
                (*last).right = node;
            }

            self.size += 1;
            self.insert_fixup(node);
        }
        Ok(())
    }

    /// Remove one node holding a value comparing equal to `value`.
    ///
    /// With duplicate keys this removes the first structural match found
    /// by descent. An absent value reports `ENOENT` and leaves the tree
    /// untouched. The registered release callback sees the stored value
    /// before the node's memory is reclaimed, and only after all
    /// surviving nodes are relinked.
    pub fn delete(&mut self, value: KernelPtr) -> KernelResult<()> {
        let nil = nil();
        let target = self.query(value)?;
        unsafe {
            let mut removed_color = (*target).color;
            // The node that ends up in the spliced-out position (possibly
            // the sentinel) and its parent, tracked here because the
            // sentinel's own fields are never written.
            let occupier;
            let occupier_parent;

            if (*target).left == nil {
                occupier = (*target).right;
                occupier_parent = (*target).parent;
                self.transplant(target, occupier);
            } else if (*target).right == nil {
                occupier = (*target).left;
                occupier_parent = (*target).parent;
                self.transplant(target, occupier);
            } else {
                let succ = Self::minimum((*target).right);
                removed_color = (*succ).color;
                occupier = (*succ).right;
                if (*succ).parent == target {
                    occupier_parent = succ;
                } else {
                    occupier_parent = (*succ).parent;
                    self.transplant(succ, occupier);
                    (*succ).right = (*target).right;
                    (*(*succ).right).parent = succ;
                }
                self.transplant(target, succ);
                (*succ).left = (*target).left;
                (*(*succ).left).parent = succ;
                (*succ).color = (*target).color;
            }

            if removed_color == RbColor::Black {
                self.delete_fixup(occupier, occupier_parent);
            }

            self.size -= 1;

            // Dispose only after every link is settled.
            if let Some(release) = &self.release {
                release((*target).value);
            }
            kfree(target as *mut u8);
        }
        Ok(())
    }

    /// Leftmost node of the subtree rooted at `node`.
    unsafe fn minimum(node: *mut RbNode) -> *mut RbNode {
        let nil = nil();
        let mut cur = node;
        while (*cur).left != nil {
            cur = (*cur).left;
        }
        cur
    }

    /// Promote `node`'s right child into its position.
    ///
    /// Purely structural; preserves in-order sequence, never recolors.
    /// Requires `node->right` to be a real node.
    unsafe fn rotate_left(&mut self, node: *mut RbNode) {
        let nil = nil();
        let right = (*node).right;
        debug_assert!(right != nil);

        (*node).right = (*right).left;
        if (*right).left != nil {
            (*(*right).left).parent = node;
        }
        (*right).parent = (*node).parent;
        if (*node).parent == nil {
            self.rb_node = right;
        } else if node == (*(*node).parent).left {
            (*(*node).parent).left = right;
        } else {
            (*(*node).parent).right = right;
        }
        (*right).left = node;
        (*node).parent = right;
    }

    /// Mirror image of [`Self::rotate_left`]; requires a real left child.
    unsafe fn rotate_right(&mut self, node: *mut RbNode) {
        let nil = nil();
        let left = (*node).left;
        debug_assert!(left != nil);

        (*node).left = (*left).right;
        if (*left).right != nil {
            (*(*left).right).parent = node;
        }
        (*left).parent = (*node).parent;
        if (*node).parent == nil {
            self.rb_node = left;
        } else if node == (*(*node).parent).right {
            (*(*node).parent).right = left;
        } else {
            (*(*node).parent).left = left;
        }
        (*left).right = node;
        (*node).parent = left;
    }

    /// Replace the subtree rooted at `old` with the one rooted at `new`
    /// in `old`'s parent.
    ///
    /// Leaves `old`'s own links untouched and restores no color
    /// invariants; deletion follows up with a fixup pass whenever a black
    /// node left a path.
    unsafe fn transplant(&mut self, old: *mut RbNode, new: *mut RbNode) {
        let nil = nil();
        if (*old).parent == nil {
            self.rb_node = new;
        } else if old == (*(*old).parent).left {
            (*(*old).parent).left = new;
        } else {
            (*(*old).parent).right = new;
        }
        if new != nil {
            (*new).parent = (*old).parent;
        }
    }

    /// Restore the red-black invariants after attaching the red `node`.
    ///
    /// Walks upward while a red parent remains: a red uncle recolors one
    /// level and ascends, a black uncle rotates the violation to the
    /// outer side and resolves it with one grandparent rotation.
    unsafe fn insert_fixup(&mut self, mut node: *mut RbNode) {
        while (*(*node).parent).is_red() {
            let parent = (*node).parent;
            let grandparent = (*parent).parent;

            if parent == (*grandparent).left {
                let uncle = (*grandparent).right;
                if (*uncle).is_red() {
                    (*parent).color = RbColor::Black;
                    (*uncle).color = RbColor::Black;
                    (*grandparent).color = RbColor::Red;
                    node = grandparent;
                } else {
                    if node == (*parent).right {
                        node = parent;
                        self.rotate_left(node);
                    }
                    let parent = (*node).parent;
                    let grandparent = (*parent).parent;
                    (*parent).color = RbColor::Black;
                    (*grandparent).color = RbColor::Red;
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = (*grandparent).left;
                if (*uncle).is_red() {
                    (*parent).color = RbColor::Black;
                    (*uncle).color = RbColor::Black;
                    (*grandparent).color = RbColor::Red;
                    node = grandparent;
                } else {
                    if node == (*parent).left {
                        node = parent;
                        self.rotate_right(node);
                    }
                    let parent = (*node).parent;
                    let grandparent = (*parent).parent;
                    (*parent).color = RbColor::Black;
                    (*grandparent).color = RbColor::Red;
                    self.rotate_left(grandparent);
                }
            }
        }
        (*self.rb_node).color = RbColor::Black;
    }

    /// Absorb the double-black left behind by removing a black node.
    ///
    /// `node` occupies the removed position and may be the sentinel, so
    /// its parent travels alongside instead of being read through the
    /// sentinel. A red sibling is first rotated into a black one; black
    /// nephews push the deficiency one level up; a red far nephew ends
    /// the walk with one parent rotation.
    unsafe fn delete_fixup(&mut self, mut node: *mut RbNode, mut parent: *mut RbNode) {
        let nil = nil();
        while node != self.rb_node && (*node).is_black() {
            if node == (*parent).left {
                let mut sibling = (*parent).right;
                if (*sibling).is_red() {
                    (*sibling).color = RbColor::Black;
                    (*parent).color = RbColor::Red;
                    self.rotate_left(parent);
                    sibling = (*parent).right;
                }
                if (*(*sibling).left).is_black() && (*(*sibling).right).is_black() {
                    (*sibling).color = RbColor::Red;
                    node = parent;
                    parent = (*node).parent;
                } else {
                    if (*(*sibling).right).is_black() {
                        (*(*sibling).left).color = RbColor::Black;
                        (*sibling).color = RbColor::Red;
                        self.rotate_right(sibling);
                        sibling = (*parent).right;
                    }
                    (*sibling).color = (*parent).color;
                    (*parent).color = RbColor::Black;
                    (*(*sibling).right).color = RbColor::Black;
                    self.rotate_left(parent);
                    node = self.rb_node;
                    parent = nil;
                }
            } else {
                let mut sibling = (*parent).left;
                if (*sibling).is_red() {
                    (*sibling).color = RbColor::Black;
                    (*parent).color = RbColor::Red;
                    self.rotate_right(parent);
                    sibling = (*parent).left;
                }
                if (*(*sibling).right).is_black() && (*(*sibling).left).is_black() {
                    (*sibling).color = RbColor::Red;
                    node = parent;
                    parent = (*node).parent;
                } else {
                    if (*(*sibling).left).is_black() {
                        (*(*sibling).right).color = RbColor::Black;
                        (*sibling).color = RbColor::Red;
                        self.rotate_left(sibling);
                        sibling = (*parent).left;
                    }
                    (*sibling).color = (*parent).color;
                    (*parent).color = RbColor::Black;
                    (*(*sibling).left).color = RbColor::Black;
                    self.rotate_right(parent);
                    node = self.rb_node;
                    parent = nil;
                }
            }
        }
        // The walk exits on a red node or at the root; either absorbs the
        // extra black. The sentinel stays untouched.
        if node != nil {
            (*node).color = RbColor::Black;
        }
    }
}

impl<C, R> fmt::Debug for RbRoot<C, R>
where
    C: Fn(KernelPtr, KernelPtr) -> Ordering,
    R: Fn(KernelPtr),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RbRoot")
            .field("rb_node", &self.rb_node)
            .field("size", &self.size)
            .finish()
    }
}

impl<C, R> Drop for RbRoot<C, R>
where
    C: Fn(KernelPtr, KernelPtr) -> Ordering,
    R: Fn(KernelPtr),
{
    fn drop(&mut self) {
        let nil = nil();
        let mut cur = self.rb_node;
        unsafe {
            // Post-order teardown without recursion: descend to a leaf,
            // detach and free it, resume from its parent.
            while cur != nil {
                if (*cur).left != nil {
                    cur = (*cur).left;
                } else if (*cur).right != nil {
                    cur = (*cur).right;
                } else {
                    let parent = (*cur).parent;
                    if parent != nil {
                        if (*parent).left == cur {
                            (*parent).left = nil;
                        } else {
                            (*parent).right = nil;
                        }
                    }
                    if let Some(release) = &self.release {
                        release((*cur).value);
                    }
                    kfree(cur as *mut u8);
                    cur = parent;
                }
            }
            self.rb_node = nil;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;

    type TestTree = RbRoot<fn(KernelPtr, KernelPtr) -> Ordering, fn(KernelPtr)>;

    fn val(v: u64) -> KernelPtr {
        Box::into_raw(Box::new(v)) as KernelPtr
    }

    fn readv(value: KernelPtr) -> u64 {
        unsafe { *(value as *const u64) }
    }

    fn freev(value: KernelPtr) {
        unsafe { drop(Box::from_raw(value as *mut u64)) };
    }

    fn cmp(a: KernelPtr, b: KernelPtr) -> Ordering {
        readv(a).cmp(&readv(b))
    }

    fn tree_with(values: &[u64]) -> TestTree {
        let seed = RbNode::create(val(values[0])).expect("seed node");
        let mut tree = RbRoot::create_with_release(
            seed,
            cmp as fn(KernelPtr, KernelPtr) -> Ordering,
            freev as fn(KernelPtr),
        )
        .expect("tree");
        for &v in &values[1..] {
            tree.insert(val(v)).expect("insert");
        }
        tree
    }

    fn delete(tree: &mut TestTree, v: u64) -> KernelResult<()> {
        let probe = val(v);
        let result = tree.delete(probe);
        freev(probe);
        result
    }

    fn inorder(tree: &TestTree) -> Vec<u64> {
        unsafe fn walk(node: *mut RbNode, nil: *mut RbNode, out: &mut Vec<u64>) {
            if node == nil {
                return;
            }
            walk((*node).left, nil, out);
            out.push(*((*node).value as *const u64));
            walk((*node).right, nil, out);
        }
        let nil = sentinel_init().expect("sentinel");
        let mut out = Vec::new();
        unsafe { walk(tree.rb_node, nil, &mut out) };
        out
    }

    #[test]
    fn test_sentinel_is_shared_and_black() {
        let nil = sentinel_init().expect("sentinel");
        assert_eq!(sentinel_init().expect("sentinel"), nil);
        unsafe {
            assert!((*nil).is_black());
            assert_eq!((*nil).left, nil);
            assert_eq!((*nil).right, nil);
            assert!((*nil).value.is_null());
        }
    }

    #[test]
    fn test_create_tree_rejects_null_seed() {
        let err = RbRoot::create(ptr::null_mut(), cmp).unwrap_err();
        assert_eq!(err, KernelError::EINVAL);
    }

    #[test]
    fn test_new_nodes_start_red() {
        let value = val(7);
        let node = RbNode::create(value).expect("node");
        let nil = sentinel_init().expect("sentinel");
        unsafe {
            assert!((*node).is_red());
            assert_eq!((*node).left, nil);
            assert_eq!((*node).right, nil);
            assert_eq!((*node).parent, nil);
            assert_eq!((*node).value, value);
            kfree(node as *mut u8);
        }
        freev(value);
    }

    #[test]
    fn test_seed_becomes_black_root() {
        let tree = tree_with(&[20]);
        let nil = sentinel_init().expect("sentinel");
        unsafe {
            assert!((*tree.rb_node).is_black());
            assert_eq!((*tree.rb_node).parent, nil);
            assert_eq!(readv((*tree.rb_node).value), 20);
        }
        assert_eq!(tree.size(), 1);
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_first_insertions_attach_red() {
        let mut tree = tree_with(&[20]);
        tree.insert(val(10)).expect("insert");
        unsafe {
            let left = (*tree.rb_node).left;
            assert_eq!(readv((*left).value), 10);
            assert!((*left).is_red());
        }
        tree.insert(val(30)).expect("insert");
        unsafe {
            let right = (*tree.rb_node).right;
            assert_eq!(readv((*right).value), 30);
            assert!((*right).is_red());
        }
        assert_eq!(tree.size(), 3);
    }

    #[test]
    fn test_query_returns_the_stored_value() {
        let mut tree = tree_with(&[20]);
        let stored = val(10);
        tree.insert(stored).expect("insert");

        let probe = val(10);
        let node = tree.query(probe).expect("present");
        unsafe {
            // The exact value reference, not a copy.
            assert_eq!((*node).value, stored);
        }
        freev(probe);

        let probe = val(99);
        assert_eq!(tree.query(probe).unwrap_err(), KernelError::ENOENT);
        freev(probe);
    }

    #[test]
    fn test_duplicate_keys_route_right() {
        let mut tree = tree_with(&[20, 20, 20]);
        assert_eq!(tree.size(), 3);
        assert_eq!(inorder(&tree), vec![20, 20, 20]);
        unsafe {
            // Ties land as right descendants of the first equal node.
            let root = tree.rb_node;
            assert_eq!(readv((*(*root).right).value), 20);
        }

        // Any-one-matching removal semantics.
        delete(&mut tree, 20).expect("delete");
        assert_eq!(tree.size(), 2);
        assert_eq!(inorder(&tree), vec![20, 20]);
    }

    #[test]
    fn test_delete_absent_is_a_noop() {
        let mut tree = tree_with(&[20, 10, 30]);
        let before = inorder(&tree);

        assert_eq!(delete(&mut tree, 7).unwrap_err(), KernelError::ENOENT);
        assert_eq!(tree.size(), 3);
        assert_eq!(inorder(&tree), before);
    }

    #[test]
    fn test_delete_to_empty_and_reinsert() {
        let mut tree = tree_with(&[2, 1, 3]);
        for v in [1, 2, 3] {
            delete(&mut tree, v).expect("delete");
        }
        assert!(tree.is_empty());
        assert_eq!(tree.size(), 0);

        let probe = val(2);
        assert_eq!(tree.query(probe).unwrap_err(), KernelError::ENOENT);
        freev(probe);

        tree.insert(val(42)).expect("insert into emptied tree");
        assert_eq!(tree.size(), 1);
        assert_eq!(inorder(&tree), vec![42]);
        unsafe {
            assert!((*tree.rb_node).is_black());
        }
    }

    #[test]
    fn test_release_runs_once_per_removed_value() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);

        let seed = RbNode::create(val(20)).expect("node");
        let mut tree = RbRoot::create_with_release(seed, cmp, move |value| {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
            unsafe { drop(Box::from_raw(value as *mut u64)) };
        })
        .expect("tree");

        for v in [10, 30, 25] {
            tree.insert(val(v)).expect("insert");
        }

        let probe = val(25);
        tree.delete(probe).expect("delete");
        freev(probe);
        assert_eq!(released.load(AtomicOrdering::SeqCst), 1);

        let probe = val(20);
        tree.delete(probe).expect("delete");
        freev(probe);
        assert_eq!(released.load(AtomicOrdering::SeqCst), 2);

        // Teardown releases whatever is still stored.
        drop(tree);
        assert_eq!(released.load(AtomicOrdering::SeqCst), 4);
    }
}
