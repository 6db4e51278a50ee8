//! AvlTree: height-balanced binary search tree with owned links.

use crate::traversal::{Cursor, Traversal};
use core::cmp::Ordering;
use core::fmt;
use std::fmt::Write as _;

pub(crate) type Link<T> = Option<Box<Node<T>>>;

#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
    height: i32,
}

impl<T> Node<T> {
    fn leaf(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
            height: 0,
        }
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> i32 {
        height(&self.left) - height(&self.right)
    }
}

#[inline]
fn height<T>(link: &Link<T>) -> i32 {
    link.as_ref().map_or(-1, |n| n.height)
}

fn balance_factor<T>(link: &Link<T>) -> i32 {
    link.as_ref().map_or(0, |n| n.balance_factor())
}

fn rotate_left<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_right<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

/// Recompute the height of `node` and restore the AVL invariant with at
/// most two rotations. Returns the new subtree root.
fn balance<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    node.update_height();
    let bf = node.balance_factor();
    if bf > 1 {
        if balance_factor(&node.left) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        rotate_right(node)
    } else if bf < -1 {
        if balance_factor(&node.right) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        rotate_left(node)
    } else {
        node
    }
}

fn rebalance<T>(link: &mut Link<T>) {
    if let Some(node) = link.take() {
        *link = Some(balance(node));
    }
}

fn insert_at<T: Ord>(link: &mut Link<T>, value: T) -> bool {
    let inserted = match link {
        None => {
            *link = Some(Box::new(Node::leaf(value)));
            return true;
        }
        Some(node) => match value.cmp(&node.value) {
            Ordering::Less => insert_at(&mut node.left, value),
            Ordering::Greater => insert_at(&mut node.right, value),
            Ordering::Equal => false,
        },
    };
    if inserted {
        rebalance(link);
    }
    inserted
}

/// Detach the rightmost node of the subtree and return its value,
/// rebalancing every node on the way back up.
fn take_max<T>(link: &mut Link<T>) -> Option<T> {
    let node = link.as_mut()?;
    if node.right.is_some() {
        let max = take_max(&mut node.right);
        rebalance(link);
        return max;
    }
    let node = link.take()?;
    let Node { value, left, .. } = *node;
    *link = left;
    Some(value)
}

fn remove_at<T: Ord>(link: &mut Link<T>, value: &T) -> bool {
    let Some(node) = link.as_mut() else {
        return false;
    };
    let removed = match value.cmp(&node.value) {
        Ordering::Less => remove_at(&mut node.left, value),
        Ordering::Greater => remove_at(&mut node.right, value),
        Ordering::Equal => {
            if node.left.is_some() && node.right.is_some() {
                // Two children: the in-order predecessor takes this slot.
                if let Some(pred) = take_max(&mut node.left) {
                    node.value = pred;
                }
            } else if let Some(target) = link.take() {
                let Node { left, right, .. } = *target;
                *link = left.or(right);
            }
            true
        }
    };
    if removed {
        rebalance(link);
    }
    removed
}

fn is_balanced_at<T: Ord>(link: &Link<T>, lo: Option<&T>, hi: Option<&T>) -> bool {
    let Some(node) = link else {
        return true;
    };
    if lo.is_some_and(|lo| node.value <= *lo) || hi.is_some_and(|hi| node.value >= *hi) {
        return false;
    }
    let expected = 1 + height(&node.left).max(height(&node.right));
    node.height == expected
        && node.balance_factor().abs() <= 1
        && is_balanced_at(&node.left, lo, Some(&node.value))
        && is_balanced_at(&node.right, Some(&node.value), hi)
}

fn count<T>(link: &Link<T>) -> usize {
    link.as_ref()
        .map_or(0, |n| 1 + count(&n.left) + count(&n.right))
}

fn write_pretty<T: fmt::Display>(link: &Link<T>, depth: usize, out: &mut String) {
    let Some(node) = link else {
        return;
    };
    write_pretty(&node.right, depth + 1, out);
    for _ in 0..depth {
        out.push_str("   ");
    }
    let _ = writeln!(out, "{}", node.value);
    write_pretty(&node.left, depth + 1, out);
}

/// A height-balanced binary search tree holding distinct values.
///
/// Duplicate inserts and removals of absent values are silent no-ops that
/// report `false`. Lookups that may have no answer (`min_value`,
/// `successor`, ...) return `Option` instead of a default sentinel.
pub struct AvlTree<T> {
    root: Link<T>,
}

impl<T> AvlTree<T> {
    pub const fn new() -> Self {
        Self { root: None }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of stored values. Walks the whole tree.
    pub fn len(&self) -> usize {
        count(&self.root)
    }

    /// Height of the tree: -1 when empty, 0 for a single node.
    pub fn height(&self) -> i32 {
        height(&self.root)
    }

    pub fn root(&self) -> Option<&T> {
        self.root.as_ref().map(|n| &n.value)
    }

    pub fn min_value(&self) -> Option<&T> {
        let mut cur = self.root.as_deref()?;
        while let Some(left) = cur.left.as_deref() {
            cur = left;
        }
        Some(&cur.value)
    }

    pub fn max_value(&self) -> Option<&T> {
        let mut cur = self.root.as_deref()?;
        while let Some(right) = cur.right.as_deref() {
            cur = right;
        }
        Some(&cur.value)
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.root = None;
    }

    /// Cursor positioned at the first value of the given traversal.
    pub fn begin(&self, mode: Traversal) -> Cursor<'_, T> {
        Cursor::new(self.root.as_deref(), mode)
    }

    /// The canonical past-the-end cursor.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::end()
    }

    pub fn iter(&self, mode: Traversal) -> Cursor<'_, T> {
        self.begin(mode)
    }
}

impl<T: Ord> AvlTree<T> {
    /// Insert `value`, rebalancing the path back to the root. Returns
    /// `false` and leaves the tree untouched when the value is present.
    pub fn insert(&mut self, value: T) -> bool {
        insert_at(&mut self.root, value)
    }

    pub fn contains(&self, value: &T) -> bool {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match value.cmp(&node.value) {
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => cur = node.right.as_deref(),
                Ordering::Equal => return true,
            }
        }
        false
    }

    /// Remove `value`. A node with two children takes its in-order
    /// predecessor's value. Returns `false` when the value is absent.
    pub fn remove(&mut self, value: &T) -> bool {
        remove_at(&mut self.root, value)
    }

    /// Smallest stored value strictly greater than `value`. `value` need
    /// not be present.
    pub fn successor(&self, value: &T) -> Option<&T> {
        let mut cur = self.root.as_deref();
        let mut best = None;
        while let Some(node) = cur {
            if *value < node.value {
                best = Some(&node.value);
                cur = node.left.as_deref();
            } else {
                cur = node.right.as_deref();
            }
        }
        best
    }

    /// Largest stored value strictly less than `value`.
    pub fn predecessor(&self, value: &T) -> Option<&T> {
        let mut cur = self.root.as_deref();
        let mut best = None;
        while let Some(node) = cur {
            if *value > node.value {
                best = Some(&node.value);
                cur = node.right.as_deref();
            } else {
                cur = node.left.as_deref();
            }
        }
        best
    }

    /// Full verification: balance factors, cached heights and BST order.
    pub fn is_balanced(&self) -> bool {
        is_balanced_at(&self.root, None, None)
    }
}

impl<T: fmt::Display> AvlTree<T> {
    fn joined(&self, mode: Traversal) -> String {
        let mut out = String::new();
        for v in self.iter(mode) {
            let _ = write!(out, "{} ", v);
        }
        out
    }

    /// In-order values, each followed by a space: `"10 20 30 "`.
    pub fn in_order_string(&self) -> String {
        self.joined(Traversal::InOrder)
    }

    pub fn pre_order_string(&self) -> String {
        self.joined(Traversal::PreOrder)
    }

    pub fn post_order_string(&self) -> String {
        self.joined(Traversal::PostOrder)
    }

    /// Sideways rendering: right subtree above, left below, three spaces
    /// per level of depth.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        write_pretty(&self.root, 0, &mut out);
        out
    }

    pub fn display_pretty(&self) {
        print!("{}", self.pretty());
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter(Traversal::InOrder)).finish()
    }
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(values: &[i32]) -> AvlTree<i32> {
        values.iter().copied().collect()
    }

    /// Invariant: three ascending inserts trigger a single left rotation.
    #[test]
    fn right_right_case_rotates_left() {
        let t = tree_of(&[10, 20, 30]);
        assert_eq!(t.root(), Some(&20));
        assert_eq!(t.height(), 1);
        assert_eq!(t.in_order_string(), "10 20 30 ");
        assert!(t.is_balanced());
    }

    /// Invariant: three descending inserts trigger a single right rotation.
    #[test]
    fn left_left_case_rotates_right() {
        let t = tree_of(&[30, 20, 10]);
        assert_eq!(t.root(), Some(&20));
        assert_eq!(t.pre_order_string(), "20 10 30 ");
    }

    /// Invariant: zig-zag inserts are fixed by a double rotation.
    #[test]
    fn double_rotations() {
        let lr = tree_of(&[30, 10, 20]);
        assert_eq!(lr.root(), Some(&20));
        assert_eq!(lr.height(), 1);

        let rl = tree_of(&[10, 30, 20]);
        assert_eq!(rl.root(), Some(&20));
        assert_eq!(rl.post_order_string(), "10 30 20 ");
    }

    /// Invariant: duplicates are rejected without changing the shape.
    #[test]
    fn duplicate_insert_is_noop() {
        let mut t = tree_of(&[5, 3, 8]);
        let before = t.pre_order_string();
        assert!(!t.insert(3));
        assert_eq!(t.len(), 3);
        assert_eq!(t.pre_order_string(), before);
    }

    /// Invariant: removing a node with two children promotes its in-order
    /// predecessor.
    #[test]
    fn remove_two_children_uses_predecessor() {
        let mut t = tree_of(&[20, 10, 30, 5, 15, 25, 35]);
        assert!(t.remove(&20));
        assert_eq!(t.root(), Some(&15));
        assert_eq!(t.in_order_string(), "5 10 15 25 30 35 ");
        assert!(t.is_balanced());
    }

    /// Invariant: removal rebalances every ancestor.
    #[test]
    fn remove_triggers_rotation() {
        let mut t = tree_of(&[20, 10, 30, 40]);
        assert!(t.remove(&10));
        assert_eq!(t.root(), Some(&30));
        assert_eq!(t.pre_order_string(), "30 20 40 ");
        assert!(t.is_balanced());
    }

    /// Invariant: predecessor removal deep in the left subtree keeps the
    /// whole path balanced.
    #[test]
    fn remove_predecessor_rebalances_left_subtree() {
        let mut t = tree_of(&[50, 30, 70, 20, 40, 60, 80, 10, 35, 45, 90, 5]);
        for v in [50, 45, 40, 35] {
            assert!(t.remove(&v));
            assert!(t.is_balanced(), "unbalanced after removing {}", v);
        }
        assert_eq!(t.in_order_string(), "5 10 20 30 60 70 80 90 ");
    }

    /// Invariant: removing an absent value is a no-op.
    #[test]
    fn remove_absent_is_noop() {
        let mut t = tree_of(&[1, 2, 3]);
        assert!(!t.remove(&9));
        assert_eq!(t.len(), 3);
        let mut empty: AvlTree<i32> = AvlTree::new();
        assert!(!empty.remove(&1));
    }

    /// Invariant: successor/predecessor work for absent arguments and
    /// report `None` past either end.
    #[test]
    fn successor_and_predecessor() {
        let t = tree_of(&[10, 20, 30, 40, 50]);
        assert_eq!(t.successor(&20), Some(&30));
        assert_eq!(t.successor(&25), Some(&30));
        assert_eq!(t.successor(&50), None);
        assert_eq!(t.predecessor(&20), Some(&10));
        assert_eq!(t.predecessor(&45), Some(&40));
        assert_eq!(t.predecessor(&10), None);
        assert_eq!(t.successor(&0), Some(&10));
    }

    /// Invariant: empty-tree queries are observable as `None`.
    #[test]
    fn empty_tree_queries() {
        let t: AvlTree<i32> = AvlTree::new();
        assert_eq!(t.min_value(), None);
        assert_eq!(t.max_value(), None);
        assert_eq!(t.successor(&1), None);
        assert_eq!(t.height(), -1);
        assert_eq!(t.len(), 0);
        assert!(t.is_balanced());
        assert_eq!(t.in_order_string(), "");
        assert_eq!(t.min_value().copied().unwrap_or_default(), 0);
    }

    /// Invariant: min/max follow the outer spines.
    #[test]
    fn min_and_max() {
        let t = tree_of(&[42, 7, 99, 1, 63]);
        assert_eq!(t.min_value(), Some(&1));
        assert_eq!(t.max_value(), Some(&99));
    }

    /// Invariant: `clear` drops every node and the tree is reusable.
    #[test]
    fn clear_then_reuse() {
        let mut t = tree_of(&[3, 1, 2]);
        t.clear();
        assert!(t.is_empty());
        assert!(!t.contains(&2));
        assert!(t.insert(2));
        assert_eq!(t.len(), 1);
    }

    /// Invariant: `is_balanced` catches a hand-built skewed chain.
    #[test]
    fn is_balanced_rejects_skewed_tree() {
        let mut chain = Node::leaf(3);
        let mut mid = Node::leaf(2);
        mid.right = Some(Box::new(chain));
        mid.update_height();
        chain = Node::leaf(1);
        chain.right = Some(Box::new(mid));
        chain.update_height();
        let t = AvlTree {
            root: Some(Box::new(chain)),
        };
        assert!(!t.is_balanced());
    }

    /// Invariant: pretty output puts the right subtree above the root.
    #[test]
    fn pretty_rendering() {
        let t = tree_of(&[2, 1, 3]);
        assert_eq!(t.pretty(), "   3\n2\n   1\n");
    }

    #[test]
    fn debug_lists_values_in_order() {
        let t = tree_of(&[3, 1, 2]);
        assert_eq!(format!("{:?}", t), "{1, 2, 3}");
    }
}
