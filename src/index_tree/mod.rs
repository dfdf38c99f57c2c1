//! A list stored as an AVL tree ordered by position.
//!
//! `get`, `insert` and `remove` at any index are O(log n). Nodes hold their
//! offset from their parent rather than an absolute index, so an insertion
//! or removal only adjusts offsets along the path it walks.
//!
//! ```
//! use ringtree::index_tree::TreeList;
//!
//! let mut tree: TreeList<u32> = (0..100).collect();
//! tree.insert(50, 1000).unwrap();
//! assert_eq!(tree.get(50), Ok(&1000));
//! assert_eq!(tree.remove(0), Ok(0));
//! assert_eq!(tree.index_of(&1000), Some(49));
//! tree.validate().unwrap();
//! ```

pub mod iter;
mod node;

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{check_element_index, check_position_index, Result};
use crate::sequence::Sequence;

pub use iter::{Iter, TreeListIter};
use node::{NodeId, Nodes};

pub struct TreeList<T> {
    nodes: Nodes<T>,
    root: Option<NodeId>,
    len: usize,
    /// Bumped by every insertion, removal and clear.
    version: u64,
}

impl<T> TreeList<T> {
    pub fn new() -> TreeList<T> {
        return TreeList::with_capacity(0);
    }

    /// Pre-sizes the arena for `capacity` elements.
    ///
    /// Removals leave their slots for later insertions to reuse; the
    /// arena only gives memory back in [`TreeList::shrink_to_fit`].
    pub fn with_capacity(capacity: usize) -> TreeList<T> {
        return TreeList {
            nodes: Nodes::with_capacity(capacity),
            root: None,
            len: 0,
            version: 0,
        };
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        return self.len;
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Number of levels on the longest root-to-leaf path; 0 when empty.
    pub fn height(&self) -> usize {
        match self.root {
            Some(root) => return self.nodes.node(root).height as usize + 1,
            None => return 0,
        }
    }

    #[inline(always)]
    pub(crate) fn version(&self) -> u64 {
        return self.version;
    }

    #[inline(always)]
    pub(crate) fn nodes(&self) -> &Nodes<T> {
        return &self.nodes;
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Nodes<T> {
        return &mut self.nodes;
    }

    pub(crate) fn node_at(&self, index: usize) -> Option<NodeId> {
        return self.nodes.find(self.root?, index as isize);
    }

    // =========================================================================
    // Positional access
    // =========================================================================

    pub fn get(&self, index: usize) -> Result<&T> {
        check_element_index(index, self.len)?;
        let node = self.found(index);
        return Ok(&self.nodes.node(node).value);
    }

    /// Replaces the element at `index`. Not a structural change.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        check_element_index(index, self.len)?;
        let node = self.found(index);
        return Ok(std::mem::replace(&mut self.nodes.node_mut(node).value, value));
    }

    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        check_position_index(index, self.len)?;
        self.insert_unchecked(index, value);
        return Ok(());
    }

    pub fn push(&mut self, value: T) {
        self.insert_unchecked(self.len, value);
    }

    /// Inserts every item, in order, starting at `index`.
    pub fn insert_all<I>(&mut self, index: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        check_position_index(index, self.len)?;
        for (offset, item) in items.into_iter().enumerate() {
            self.insert_unchecked(index + offset, item);
        }
        return Ok(());
    }

    /// Inserts at an index already checked against `0..=len`.
    fn insert_unchecked(&mut self, index: usize, value: T) {
        debug_assert!(index <= self.len);
        self.version += 1;
        self.root = Some(match self.root {
            None => self.nodes.new_root(index, value),
            Some(root) => self.nodes.insert(root, index as isize, value),
        });
        self.len += 1;
    }

    pub fn remove(&mut self, index: usize) -> Result<T> {
        check_element_index(index, self.len)?;
        self.version += 1;
        let Some(root) = self.root else {
            panic!("tree inconsistent: no root with {} elements", self.len);
        };
        let (root, value) = self.nodes.remove(root, index as isize);
        self.root = root;
        self.len -= 1;
        return Ok(value);
    }

    pub fn clear(&mut self) {
        self.version += 1;
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Releases vacant arena slots past the last live node. Not a
    /// structural change: open iterators stay valid.
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    /// The node at an index already checked against `len`.
    fn found(&self, index: usize) -> NodeId {
        match self.node_at(index) {
            Some(node) => return node,
            None => panic!("tree inconsistent: no node at index {index} of {}", self.len),
        }
    }

    // =========================================================================
    // Search and bulk reads
    // =========================================================================

    /// In-order scan; the tree is not ordered by value.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return self.iter().position(|item| item == value);
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        return self.index_of(value).is_some();
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        return self.iter().cloned().collect();
    }

    /// Moves every element out, in order.
    pub fn into_vec(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        let mut walk = self.root.map(|root| self.nodes.min(root));
        while let Some(node) = walk {
            walk = self.nodes.next(node);
            out.extend(self.nodes.take_value(node));
        }
        return out;
    }

    pub fn iter(&self) -> Iter<'_, T> {
        return Iter::new(&self.nodes, self.root, self.len);
    }

    /// A fail-fast iterator whose first `next` returns element `from`.
    pub fn list_iter(&self, from: usize) -> Result<TreeListIter> {
        return TreeListIter::new(self, from);
    }

    /// Checks balance, heights, offsets and threads of every node.
    pub fn validate(&self) -> Result<()> {
        return self.nodes.validate(self.root, self.len);
    }
}

// =============================================================================
// Trait impls
// =============================================================================

impl<T> Sequence<T> for TreeList<T> {
    fn len(&self) -> usize {
        return TreeList::len(self);
    }

    fn get(&self, index: usize) -> Result<&T> {
        return TreeList::get(self, index);
    }

    fn set(&mut self, index: usize, value: T) -> Result<T> {
        return TreeList::set(self, index, value);
    }

    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        return TreeList::insert(self, index, value);
    }

    fn remove(&mut self, index: usize) -> Result<T> {
        return TreeList::remove(self, index);
    }

    fn clear(&mut self) {
        TreeList::clear(self);
    }

    fn push(&mut self, value: T) {
        TreeList::push(self, value);
    }

    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return TreeList::index_of(self, value);
    }
}

impl<T> Default for TreeList<T> {
    fn default() -> Self {
        return TreeList::new();
    }
}

impl<T: Clone> Clone for TreeList<T> {
    fn clone(&self) -> Self {
        return TreeList {
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
            version: 0,
        };
    }
}

impl<T: fmt::Debug> fmt::Debug for TreeList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_list().entries(self.iter()).finish();
    }
}

impl<T: PartialEq> PartialEq for TreeList<T> {
    fn eq(&self, other: &Self) -> bool {
        return self.len == other.len && self.iter().eq(other.iter());
    }
}

impl<T: Eq> Eq for TreeList<T> {}

impl<T: Hash> Hash for TreeList<T> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        state.write_usize(self.len);
        for item in self.iter() {
            item.hash(state);
        }
    }
}

impl<T> Extend<T> for TreeList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.push(item);
        }
    }
}

impl<T> FromIterator<T> for TreeList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(items: I) -> Self {
        let mut tree = TreeList::new();
        tree.extend(items);
        return tree;
    }
}

impl<'a, T> IntoIterator for &'a TreeList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        return self.iter();
    }
}

impl<T> IntoIterator for TreeList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> std::vec::IntoIter<T> {
        return self.into_vec().into_iter();
    }
}
