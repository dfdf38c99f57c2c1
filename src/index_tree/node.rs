//! AVL nodes keyed by position, and the balancing algorithms over them.
//!
//! Nodes live in a `Vec` arena and name each other by [`NodeId`]. A node
//! stores its position *relative to its parent* (the root stores its
//! absolute index), so rotations only need to touch the offsets of the
//! nodes they move.
//!
//! A child slot is either a real subtree or, when the subtree is empty, a
//! thread to the in-order neighbour on that side. Following threads makes a
//! step to the next or previous element O(1) without parent pointers.
//!
//! The recursive functions below take the root of a subtree and an index
//! relative to that root's parent, and return the subtree's new root.

use std::mem;

use crate::error::{Error, Result};

/// Index of a node slot in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline(always)]
    fn index(self) -> usize {
        return self.0 as usize;
    }

    fn from_index(index: usize) -> NodeId {
        match u32::try_from(index) {
            Ok(id) => return NodeId(id),
            Err(_) => panic!("arena full: tree slot {index} has no node id"),
        }
    }
}

/// One side of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Child {
    /// Root of a non-empty subtree.
    Subtree(NodeId),
    /// No subtree: a thread to the in-order predecessor (left side) or
    /// successor (right side), `None` past either end.
    Link(Option<NodeId>),
}

impl Child {
    #[inline(always)]
    pub fn subtree(self) -> Option<NodeId> {
        match self {
            Child::Subtree(node) => Some(node),
            Child::Link(_) => None,
        }
    }

    /// The subtree if there is one, otherwise a thread to `link`.
    #[inline(always)]
    fn or_link(subtree: Option<NodeId>, link: Option<NodeId>) -> Child {
        match subtree {
            Some(node) => Child::Subtree(node),
            None => Child::Link(link),
        }
    }

    /// Whatever the slot points at, subtree root or thread target.
    #[inline(always)]
    fn target(self) -> Option<NodeId> {
        match self {
            Child::Subtree(node) => Some(node),
            Child::Link(link) => link,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AvlNode<T> {
    pub(crate) value: T,
    pub(crate) left: Child,
    pub(crate) right: Child,
    /// Height of the subtree rooted here; a leaf is 0, a missing subtree -1.
    pub(crate) height: i32,
    /// Offset of this node's index from its parent's index.
    pub(crate) relative_position: isize,
}

impl<T> AvlNode<T> {
    fn leaf(relative_position: isize, value: T, previous: Option<NodeId>, next: Option<NodeId>) -> AvlNode<T> {
        return AvlNode {
            value,
            left: Child::Link(previous),
            right: Child::Link(next),
            height: 0,
            relative_position,
        };
    }
}

#[derive(Clone, Debug)]
pub struct Nodes<T> {
    slots: Vec<Option<AvlNode<T>>>,
    /// Vacant slots, reused before the vector grows.
    free: Vec<NodeId>,
}

impl<T> Nodes<T> {
    pub fn with_capacity(capacity: usize) -> Nodes<T> {
        return Nodes {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        };
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Allocated slots, vacant ones included.
    pub fn slots(&self) -> usize {
        return self.slots.len();
    }

    /// Gives back the vacant slots at the end of the arena. Live nodes
    /// keep their ids.
    pub fn shrink_to_fit(&mut self) {
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
        let len = self.slots.len();
        self.free.retain(|id| id.index() < len);
        self.slots.shrink_to_fit();
        self.free.shrink_to_fit();
    }

    fn alloc(&mut self, node: AvlNode<T>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(node);
            return id;
        }
        let id = NodeId::from_index(self.slots.len());
        self.slots.push(Some(node));
        return id;
    }

    fn release(&mut self, id: NodeId) -> T {
        let node = match self.slots[id.index()].take() {
            Some(node) => node,
            None => panic!("tree node {id:?} released twice"),
        };
        self.free.push(id);
        return node.value;
    }

    /// Moves a node's value out, leaving the slot vacant but not free.
    /// Only for tearing the whole arena down.
    pub(crate) fn take_value(&mut self, id: NodeId) -> Option<T> {
        return self.slots[id.index()].take().map(|node| node.value);
    }

    #[inline(always)]
    pub fn node(&self, id: NodeId) -> &AvlNode<T> {
        match &self.slots[id.index()] {
            Some(node) => node,
            None => panic!("dangling tree node {id:?}"),
        }
    }

    #[inline(always)]
    pub fn node_mut(&mut self, id: NodeId) -> &mut AvlNode<T> {
        match &mut self.slots[id.index()] {
            Some(node) => node,
            None => panic!("dangling tree node {id:?}"),
        }
    }

    #[inline(always)]
    fn offset(&self, id: NodeId) -> isize {
        return self.node(id).relative_position;
    }

    fn set_offset(&mut self, id: NodeId, offset: isize) {
        self.node_mut(id).relative_position = offset;
    }

    fn left_subtree(&self, id: NodeId) -> NodeId {
        match self.node(id).left {
            Child::Subtree(left) => left,
            Child::Link(_) => panic!("tree inconsistent: {id:?} has no left subtree"),
        }
    }

    fn right_subtree(&self, id: NodeId) -> NodeId {
        match self.node(id).right {
            Child::Subtree(right) => right,
            Child::Link(_) => panic!("tree inconsistent: {id:?} has no right subtree"),
        }
    }

    // =========================================================================
    // Heights
    // =========================================================================

    #[inline(always)]
    fn height(&self, child: Child) -> i32 {
        match child {
            Child::Subtree(node) => self.node(node).height,
            Child::Link(_) => -1,
        }
    }

    fn recalc_height(&mut self, id: NodeId) {
        let node = self.node(id);
        let height = self.height(node.left).max(self.height(node.right)) + 1;
        self.node_mut(id).height = height;
    }

    fn height_right_minus_left(&self, id: NodeId) -> i32 {
        let node = self.node(id);
        return self.height(node.right) - self.height(node.left);
    }

    fn set_left(&mut self, id: NodeId, left: Child) {
        self.node_mut(id).left = left;
        self.recalc_height(id);
    }

    fn set_right(&mut self, id: NodeId, right: Child) {
        self.node_mut(id).right = right;
        self.recalc_height(id);
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn min(&self, mut id: NodeId) -> NodeId {
        while let Child::Subtree(left) = self.node(id).left {
            id = left;
        }
        return id;
    }

    pub fn max(&self, mut id: NodeId) -> NodeId {
        while let Child::Subtree(right) = self.node(id).right {
            id = right;
        }
        return id;
    }

    /// In-order successor.
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id).right {
            Child::Link(next) => next,
            Child::Subtree(right) => Some(self.min(right)),
        }
    }

    /// In-order predecessor.
    pub fn previous(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id).left {
            Child::Link(previous) => previous,
            Child::Subtree(left) => Some(self.max(left)),
        }
    }

    /// Finds the node at `index`, relative to the parent of `id`.
    pub fn find(&self, mut id: NodeId, mut index: isize) -> Option<NodeId> {
        loop {
            let node = self.node(id);
            let relative = index - node.relative_position;
            if relative == 0 {
                return Some(id);
            }
            let child = if relative < 0 { node.left } else { node.right };
            id = child.subtree()?;
            index = relative;
        }
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// A lone root holding `value` at absolute `index`.
    pub fn new_root(&mut self, index: usize, value: T) -> NodeId {
        return self.alloc(AvlNode::leaf(index as isize, value, None, None));
    }

    pub fn insert(&mut self, id: NodeId, index: isize, value: T) -> NodeId {
        let relative = index - self.offset(id);
        if relative <= 0 {
            return self.insert_on_left(id, relative, value);
        }
        return self.insert_on_right(id, relative, value);
    }

    fn insert_on_left(&mut self, id: NodeId, relative: isize, value: T) -> NodeId {
        match self.node(id).left {
            Child::Link(previous) => {
                let leaf = self.alloc(AvlNode::leaf(-1, value, previous, Some(id)));
                self.set_left(id, Child::Subtree(leaf));
            }
            Child::Subtree(left) => {
                let left = self.insert(left, relative, value);
                self.set_left(id, Child::Subtree(left));
            }
        }
        // everything from here rightwards moved up by one
        if self.offset(id) >= 0 {
            self.node_mut(id).relative_position += 1;
        }
        let top = self.balance(id);
        self.recalc_height(id);
        return top;
    }

    fn insert_on_right(&mut self, id: NodeId, relative: isize, value: T) -> NodeId {
        match self.node(id).right {
            Child::Link(next) => {
                let leaf = self.alloc(AvlNode::leaf(1, value, Some(id), next));
                self.set_right(id, Child::Subtree(leaf));
            }
            Child::Subtree(right) => {
                let right = self.insert(right, relative, value);
                self.set_right(id, Child::Subtree(right));
            }
        }
        if self.offset(id) < 0 {
            self.node_mut(id).relative_position -= 1;
        }
        let top = self.balance(id);
        self.recalc_height(id);
        return top;
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Removes the node at `index` from the subtree rooted at `id`.
    /// Returns the subtree's new root (`None` once it is empty) and the
    /// removed value.
    pub fn remove(&mut self, id: NodeId, index: isize) -> (Option<NodeId>, T) {
        let relative = index - self.offset(id);
        if relative == 0 {
            return self.remove_self(id);
        }
        let value;
        if relative > 0 {
            let right = self.right_subtree(id);
            let link = self.node(right).right.target();
            let (subtree, removed) = self.remove(right, relative);
            self.set_right(id, Child::or_link(subtree, link));
            if self.offset(id) < 0 {
                self.node_mut(id).relative_position += 1;
            }
            value = removed;
        } else {
            let left = self.left_subtree(id);
            let link = self.node(left).left.target();
            let (subtree, removed) = self.remove(left, relative);
            self.set_left(id, Child::or_link(subtree, link));
            if self.offset(id) > 0 {
                self.node_mut(id).relative_position -= 1;
            }
            value = removed;
        }
        self.recalc_height(id);
        return (Some(self.balance(id)), value);
    }

    fn remove_max(&mut self, id: NodeId) -> (Option<NodeId>, T) {
        let Child::Subtree(right) = self.node(id).right else {
            return self.remove_self(id);
        };
        let link = self.node(right).right.target();
        let (subtree, value) = self.remove_max(right);
        self.set_right(id, Child::or_link(subtree, link));
        if self.offset(id) < 0 {
            self.node_mut(id).relative_position += 1;
        }
        self.recalc_height(id);
        return (Some(self.balance(id)), value);
    }

    fn remove_min(&mut self, id: NodeId) -> (Option<NodeId>, T) {
        let Child::Subtree(left) = self.node(id).left else {
            return self.remove_self(id);
        };
        let link = self.node(left).left.target();
        let (subtree, value) = self.remove_min(left);
        self.set_left(id, Child::or_link(subtree, link));
        if self.offset(id) > 0 {
            self.node_mut(id).relative_position -= 1;
        }
        self.recalc_height(id);
        return (Some(self.balance(id)), value);
    }

    /// Removes `id` itself from its subtree.
    ///
    /// With two children the node keeps its slot and takes over the value
    /// of its in-order neighbour, which is removed instead: the successor
    /// when the right subtree is strictly taller, otherwise the predecessor.
    fn remove_self(&mut self, id: NodeId) -> (Option<NodeId>, T) {
        let (left, right, position) = {
            let node = self.node(id);
            (node.left, node.right, node.relative_position)
        };
        match (left, right) {
            (Child::Link(_), Child::Link(_)) => {
                return (None, self.release(id));
            }
            (Child::Subtree(left), Child::Link(next)) => {
                let shift = if position > 0 { position } else { position + 1 };
                self.node_mut(left).relative_position += shift;
                let max = self.max(left);
                self.set_right(max, Child::Link(next));
                return (Some(left), self.release(id));
            }
            (Child::Link(previous), Child::Subtree(right)) => {
                let shift = if position < 0 { position } else { position - 1 };
                self.node_mut(right).relative_position += shift;
                let min = self.min(right);
                self.set_left(min, Child::Link(previous));
                return (Some(right), self.release(id));
            }
            (Child::Subtree(left), Child::Subtree(right)) => {
                let old;
                if self.height_right_minus_left(id) > 0 {
                    let link = self.node(self.min(right)).right.target();
                    let (subtree, moved) = self.remove_min(right);
                    let node = self.node_mut(id);
                    node.right = Child::or_link(subtree, link);
                    old = mem::replace(&mut node.value, moved);
                    if node.relative_position < 0 {
                        node.relative_position += 1;
                    }
                } else {
                    // a lone left child leaves its own predecessor thread behind
                    let link = self.node(left).left.target();
                    let (subtree, moved) = self.remove_max(left);
                    let node = self.node_mut(id);
                    node.left = Child::or_link(subtree, link);
                    old = mem::replace(&mut node.value, moved);
                    if node.relative_position > 0 {
                        node.relative_position -= 1;
                    }
                }
                self.recalc_height(id);
                return (Some(id), old);
            }
        }
    }

    // =========================================================================
    // Rebalancing
    // =========================================================================

    /// Restores the AVL property at `id`, returning the subtree's new root.
    ///
    /// Panics if the balance factor is outside -2..=2, which no single
    /// insertion or removal can produce in a consistent tree.
    fn balance(&mut self, id: NodeId) -> NodeId {
        match self.height_right_minus_left(id) {
            -1..=1 => return id,
            -2 => {
                let left = self.left_subtree(id);
                if self.height_right_minus_left(left) > 0 {
                    let left = self.rotate_left(left);
                    self.set_left(id, Child::Subtree(left));
                }
                return self.rotate_right(id);
            }
            2 => {
                let right = self.right_subtree(id);
                if self.height_right_minus_left(right) < 0 {
                    let right = self.rotate_right(right);
                    self.set_right(id, Child::Subtree(right));
                }
                return self.rotate_left(id);
            }
            factor => panic!("tree inconsistent: balance factor {factor} at {id:?}"),
        }
    }

    fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let top = self.right_subtree(id);
        let moved = self.node(top).left.subtree();

        let top_position = self.offset(id) + self.offset(top);
        let my_position = -self.offset(top);
        let moved_position = self.offset(top) + moved.map_or(0, |node| self.offset(node));

        self.set_right(id, Child::or_link(moved, Some(top)));
        self.set_left(top, Child::Subtree(id));

        self.set_offset(top, top_position);
        self.set_offset(id, my_position);
        if let Some(moved) = moved {
            self.set_offset(moved, moved_position);
        }
        log::trace!("rotated {id:?} left under {top:?}");
        return top;
    }

    fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let top = self.left_subtree(id);
        let moved = self.node(top).right.subtree();

        let top_position = self.offset(id) + self.offset(top);
        let my_position = -self.offset(top);
        let moved_position = self.offset(top) + moved.map_or(0, |node| self.offset(node));

        self.set_left(id, Child::or_link(moved, Some(top)));
        self.set_right(top, Child::Subtree(id));

        self.set_offset(top, top_position);
        self.set_offset(id, my_position);
        if let Some(moved) = moved {
            self.set_offset(moved, moved_position);
        }
        log::trace!("rotated {id:?} right under {top:?}");
        return top;
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Checks balance, heights, offsets and threads of the tree under
    /// `root`, which must hold `len` nodes.
    pub fn validate(&self, root: Option<NodeId>, len: usize) -> Result<()> {
        let mut order = Vec::with_capacity(len);
        if let Some(root) = root {
            self.validate_subtree(root, self.offset(root), &mut order)?;
        }
        if order.len() != len {
            return Err(violation(format!("{} nodes reachable, expected {}", order.len(), len)));
        }
        for (rank, &(id, index)) in order.iter().enumerate() {
            if index != rank as isize {
                return Err(violation(format!("{id:?} has index {index}, in-order rank {rank}")));
            }
            let node = self.node(id);
            let previous = rank.checked_sub(1).map(|i| order[i].0);
            let next = order.get(rank + 1).map(|&(id, _)| id);
            if let Child::Link(link) = node.left {
                if link != previous {
                    return Err(violation(format!("{id:?} threads left to {link:?}, expected {previous:?}")));
                }
            }
            if let Child::Link(link) = node.right {
                if link != next {
                    return Err(violation(format!("{id:?} threads right to {link:?}, expected {next:?}")));
                }
            }
        }
        return Ok(());
    }

    /// Walks the subtree in order, recording absolute indices. Returns the
    /// subtree's height.
    fn validate_subtree(&self, id: NodeId, index: isize, order: &mut Vec<(NodeId, isize)>) -> Result<i32> {
        let node = self.node(id);
        let left = match node.left {
            Child::Subtree(left) => self.validate_subtree(left, index + self.offset(left), order)?,
            Child::Link(_) => -1,
        };
        order.push((id, index));
        let right = match node.right {
            Child::Subtree(right) => self.validate_subtree(right, index + self.offset(right), order)?,
            Child::Link(_) => -1,
        };
        let height = left.max(right) + 1;
        if node.height != height {
            return Err(violation(format!("{id:?} records height {}, actual {height}", node.height)));
        }
        if (right - left).abs() > 1 {
            return Err(violation(format!("{id:?} unbalanced: left {left}, right {right}")));
        }
        return Ok(height);
    }
}

fn violation(reason: String) -> Error {
    return Error::InvariantViolation { reason };
}
