//! Iteration over a [`TreeList`].
//!
//! Both iterators step along the threads, so moving to a neighbour costs
//! O(1) unless a real subtree has to be descended.

use super::node::{NodeId, Nodes};
use super::TreeList;
use crate::error::{check_position_index, Error, Result};

/// Borrowing iterator over a tree in index order.
pub struct Iter<'a, T> {
    nodes: &'a Nodes<T>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(nodes: &'a Nodes<T>, root: Option<NodeId>, len: usize) -> Iter<'a, T> {
        return Iter {
            nodes,
            front: root.map(|root| nodes.min(root)),
            back: root.map(|root| nodes.max(root)),
            remaining: len,
        };
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front?;
        self.front = self.nodes.next(node);
        self.remaining -= 1;
        return Some(&self.nodes.node(node).value);
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.remaining, Some(self.remaining));
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back?;
        self.back = self.nodes.previous(node);
        self.remaining -= 1;
        return Some(&self.nodes.node(node).value);
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

// =============================================================================
// Fail-fast list iterator
// =============================================================================

/// A bidirectional, fail-fast iterator over a [`TreeList`].
///
/// Caches the node it will return next and follows threads from there.
/// Removal and insertion through the iterator may reshape the tree, so they
/// drop the cache and the next step looks the node up again by index.
#[derive(Clone, Debug)]
pub struct TreeListIter {
    /// `None` when unknown; resolved from `next_index` on demand.
    next: Option<NodeId>,
    next_index: usize,
    current: Option<NodeId>,
    current_index: Option<usize>,
    expected_version: u64,
}

impl TreeListIter {
    pub(crate) fn new<T>(tree: &TreeList<T>, from: usize) -> Result<TreeListIter> {
        check_position_index(from, tree.len())?;
        return Ok(TreeListIter {
            next: tree.node_at(from),
            next_index: from,
            current: None,
            current_index: None,
            expected_version: tree.version(),
        });
    }

    fn check_version<T>(&self, tree: &TreeList<T>) -> Result<()> {
        if tree.version() != self.expected_version {
            return Err(Error::ConcurrentModification);
        }
        return Ok(());
    }

    pub fn has_next<T>(&self, tree: &TreeList<T>) -> bool {
        return self.next_index < tree.len();
    }

    pub fn has_previous(&self) -> bool {
        return self.next_index > 0;
    }

    pub fn next_index(&self) -> usize {
        return self.next_index;
    }

    pub fn previous_index(&self) -> Option<usize> {
        return self.next_index.checked_sub(1);
    }

    pub fn next<'a, T>(&mut self, tree: &'a TreeList<T>) -> Result<&'a T> {
        self.check_version(tree)?;
        if !self.has_next(tree) {
            return Err(Error::NoSuchElement);
        }
        let node = match self.next {
            Some(node) => node,
            None => tree.node_at(self.next_index).ok_or(Error::NoSuchElement)?,
        };
        self.current = Some(node);
        self.current_index = Some(self.next_index);
        self.next_index += 1;
        self.next = tree.nodes().next(node);
        return Ok(&tree.nodes().node(node).value);
    }

    pub fn previous<'a, T>(&mut self, tree: &'a TreeList<T>) -> Result<&'a T> {
        self.check_version(tree)?;
        if !self.has_previous() {
            return Err(Error::NoSuchElement);
        }
        let node = match self.next {
            Some(next) => tree.nodes().previous(next),
            None => tree.node_at(self.next_index - 1),
        };
        let node = node.ok_or(Error::NoSuchElement)?;
        self.next = Some(node);
        self.next_index -= 1;
        self.current = Some(node);
        self.current_index = Some(self.next_index);
        return Ok(&tree.nodes().node(node).value);
    }

    /// Removes the element returned by the last step.
    pub fn remove<T>(&mut self, tree: &mut TreeList<T>) -> Result<T> {
        self.check_version(tree)?;
        let index = self.current_index.ok_or(Error::IllegalState)?;
        let value = tree.remove(index)?;
        if self.next_index != index {
            self.next_index -= 1;
        }
        self.next = None;
        self.current = None;
        self.current_index = None;
        self.expected_version += 1;
        return Ok(value);
    }

    /// Replaces the element returned by the last step.
    pub fn set<T>(&mut self, tree: &mut TreeList<T>, value: T) -> Result<T> {
        self.check_version(tree)?;
        let current = self.current.ok_or(Error::IllegalState)?;
        return Ok(std::mem::replace(&mut tree.nodes_mut().node_mut(current).value, value));
    }

    /// Inserts before the next element; a following `next` is unaffected.
    pub fn add<T>(&mut self, tree: &mut TreeList<T>, value: T) -> Result<()> {
        self.check_version(tree)?;
        tree.insert(self.next_index, value)?;
        self.next = None;
        self.current = None;
        self.current_index = None;
        self.next_index += 1;
        self.expected_version += 1;
        return Ok(());
    }
}
