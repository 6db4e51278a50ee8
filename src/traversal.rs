//! Traversal cursors over an `AvlTree`.
//!
//! A cursor owns its frontier (a stack or a queue of node references) so
//! cloning a cursor yields an independent traversal from the same
//! position. Equality only looks at the node the cursor currently points
//! to; the end cursor points to none.

use crate::avl_tree::Node;
use std::collections::VecDeque;
use std::iter::FusedIterator;

/// Order in which a [`Cursor`] visits the tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Traversal {
    /// root, left, right
    PreOrder,
    /// left, root, right (ascending)
    InOrder,
    /// left, right, root
    PostOrder,
    /// level by level, left to right
    BreadthFirst,
}

enum Frontier<'a, T> {
    Stack(Vec<&'a Node<T>>),
    // `bool` marks a node whose right subtree has already been pushed.
    Frames(Vec<(&'a Node<T>, bool)>),
    Queue(VecDeque<&'a Node<T>>),
}

impl<'a, T> Clone for Frontier<'a, T> {
    fn clone(&self) -> Self {
        match self {
            Frontier::Stack(s) => Frontier::Stack(s.clone()),
            Frontier::Frames(s) => Frontier::Frames(s.clone()),
            Frontier::Queue(q) => Frontier::Queue(q.clone()),
        }
    }
}

/// Forward-only position in one of the four traversals.
pub struct Cursor<'a, T> {
    current: Option<&'a Node<T>>,
    mode: Traversal,
    frontier: Frontier<'a, T>,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(root: Option<&'a Node<T>>, mode: Traversal) -> Self {
        let frontier = match mode {
            Traversal::InOrder => {
                let mut stack = Vec::new();
                push_left_spine(&mut stack, root);
                Frontier::Stack(stack)
            }
            Traversal::PreOrder => Frontier::Stack(root.into_iter().collect()),
            Traversal::PostOrder => {
                let mut frames = Vec::new();
                push_left_frames(&mut frames, root);
                Frontier::Frames(frames)
            }
            Traversal::BreadthFirst => Frontier::Queue(root.into_iter().collect()),
        };
        let mut cursor = Self {
            current: None,
            mode,
            frontier,
        };
        cursor.advance();
        cursor
    }

    pub(crate) fn end() -> Self {
        Self {
            current: None,
            mode: Traversal::InOrder,
            frontier: Frontier::Stack(Vec::new()),
        }
    }

    pub fn mode(&self) -> Traversal {
        self.mode
    }

    /// Value under the cursor, `None` once the traversal is exhausted.
    pub fn current(&self) -> Option<&'a T> {
        self.current.map(|n| &n.value)
    }

    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Move to the next node of the traversal. No-op at the end.
    pub fn advance(&mut self) {
        self.current = match &mut self.frontier {
            Frontier::Stack(stack) => match self.mode {
                Traversal::PreOrder => stack.pop().map(|node| {
                    stack.extend(node.right.as_deref());
                    stack.extend(node.left.as_deref());
                    node
                }),
                _ => stack.pop().map(|node| {
                    push_left_spine(stack, node.right.as_deref());
                    node
                }),
            },
            Frontier::Frames(frames) => next_post_order(frames),
            Frontier::Queue(queue) => queue.pop_front().map(|node| {
                queue.extend(node.left.as_deref());
                queue.extend(node.right.as_deref());
                node
            }),
        };
    }
}

fn push_left_spine<'a, T>(stack: &mut Vec<&'a Node<T>>, mut node: Option<&'a Node<T>>) {
    while let Some(n) = node {
        stack.push(n);
        node = n.left.as_deref();
    }
}

fn push_left_frames<'a, T>(frames: &mut Vec<(&'a Node<T>, bool)>, mut node: Option<&'a Node<T>>) {
    while let Some(n) = node {
        frames.push((n, false));
        node = n.left.as_deref();
    }
}

fn next_post_order<'a, T>(frames: &mut Vec<(&'a Node<T>, bool)>) -> Option<&'a Node<T>> {
    while let Some((node, visited)) = frames.pop() {
        if visited {
            return Some(node);
        }
        frames.push((node, true));
        push_left_frames(frames, node.right.as_deref());
    }
    None
}

impl<'a, T> Clone for Cursor<'a, T> {
    fn clone(&self) -> Self {
        Self {
            current: self.current,
            mode: self.mode,
            frontier: self.frontier.clone(),
        }
    }
}

impl<'a, T> PartialEq for Cursor<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        match (self.current, other.current) {
            (Some(a), Some(b)) => core::ptr::eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<'a, T> Eq for Cursor<'a, T> {}

impl<'a, T> Iterator for Cursor<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.advance();
        Some(&node.value)
    }
}

impl<'a, T> FusedIterator for Cursor<'a, T> {}

impl<'a, T: core::fmt::Debug> core::fmt::Debug for Cursor<'a, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cursor")
            .field("mode", &self.mode)
            .field("current", &self.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AvlTree;

    //        40
    //      /    \
    //    20      60
    //   /  \    /  \
    //  10  30  50  70
    //                \
    //                80
    fn sample() -> AvlTree<i32> {
        [40, 20, 60, 10, 30, 50, 70, 80].into_iter().collect()
    }

    fn walk(t: &AvlTree<i32>, mode: Traversal) -> Vec<i32> {
        t.iter(mode).copied().collect()
    }

    /// Invariant: each mode visits nodes in its textbook order.
    #[test]
    fn all_four_orders() {
        let t = sample();
        assert_eq!(walk(&t, Traversal::InOrder), [10, 20, 30, 40, 50, 60, 70, 80]);
        assert_eq!(walk(&t, Traversal::PreOrder), [40, 20, 10, 30, 60, 50, 70, 80]);
        assert_eq!(walk(&t, Traversal::PostOrder), [10, 30, 20, 50, 80, 70, 60, 40]);
        assert_eq!(
            walk(&t, Traversal::BreadthFirst),
            [40, 20, 60, 10, 30, 50, 70, 80]
        );
    }

    /// Invariant: every traversal of an empty tree starts at `end()`.
    #[test]
    fn empty_tree_begins_at_end() {
        let t: AvlTree<i32> = AvlTree::new();
        for mode in [
            Traversal::PreOrder,
            Traversal::InOrder,
            Traversal::PostOrder,
            Traversal::BreadthFirst,
        ] {
            assert!(t.begin(mode) == t.end());
            assert_eq!(t.iter(mode).next(), None);
        }
    }

    /// Invariant: manual cursor stepping reaches `end()` after exactly
    /// `len()` advances.
    #[test]
    fn cursor_reaches_end() {
        let t = sample();
        let mut it = t.begin(Traversal::PostOrder);
        let end = t.end();
        let mut steps = 0;
        while it != end {
            assert!(it.current().is_some());
            it.advance();
            steps += 1;
        }
        assert_eq!(steps, t.len());
        assert!(it.is_end());
        it.advance();
        assert!(it.is_end());
    }

    /// Invariant: a cloned cursor owns its frontier; advancing one does not
    /// move the other.
    #[test]
    fn clones_advance_independently() {
        let t = sample();
        for mode in [
            Traversal::PreOrder,
            Traversal::InOrder,
            Traversal::PostOrder,
            Traversal::BreadthFirst,
        ] {
            let mut a = t.begin(mode);
            a.advance();
            a.advance();
            let b = a.clone();
            assert!(a == b);
            let rest_a: Vec<i32> = a.by_ref().copied().collect();
            assert!(a.is_end());
            let rest_b: Vec<i32> = b.copied().collect();
            assert_eq!(rest_a, rest_b);
            assert_eq!(rest_a.len(), t.len() - 2);
        }
    }

    /// Invariant: equality is node identity, not value equality.
    #[test]
    fn equality_is_identity() {
        let t1: AvlTree<i32> = [1].into_iter().collect();
        let t2: AvlTree<i32> = [1].into_iter().collect();
        assert!(t1.begin(Traversal::InOrder) != t2.begin(Traversal::InOrder));
        assert!(t1.begin(Traversal::InOrder) == t1.begin(Traversal::PreOrder));
    }
}
