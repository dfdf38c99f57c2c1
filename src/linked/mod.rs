//! Doubly-linked list over a sentinel ring.
//!
//! Every structural change goes through two primitives, insert-before and
//! remove-node, which bump the list's version and then notify the list's
//! [`LinkHooks`]. With [`Plain`] hooks nothing else happens. With a
//! [`CursorRegistry`] every live [`Cursor`] is told about the change and
//! repairs its own position, which is what lets a cursor survive mutations
//! that make the fail-fast [`ListIter`] give up.
//!
//! ```
//! use ringtree::linked::CursorableList;
//!
//! let mut list: CursorableList<char> = "abc".chars().collect();
//! let mut cursor = list.cursor(0).unwrap();
//! let mut plain = list.list_iter(0).unwrap();
//!
//! assert_eq!(cursor.next(&list), Ok(&'a'));
//! list.remove(1).unwrap();
//!
//! assert_eq!(cursor.next(&list), Ok(&'c'));
//! assert!(plain.next(&list).is_err());
//! ```

pub mod cursor;
pub mod hooks;
pub mod iter;
pub mod ring;

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{check_element_index, check_position_index, Error, Result};
use crate::sequence::Sequence;

pub use cursor::{Cursor, CursorRegistry, SubCursor};
pub use hooks::{LinkHooks, Plain};
pub use iter::{IntoIter, Iter, ListIter, SubList, SubListIter};
pub use ring::{NodeId, Ring, SENTINEL};

/// A linked list whose live cursors survive concurrent mutation.
pub type CursorableList<T> = LinkedList<T, CursorRegistry>;

/// A doubly-linked list with positional access.
///
/// Positional lookups walk from whichever end of the ring is closer.
pub struct LinkedList<T, H: LinkHooks<T> = Plain> {
    ring: Ring<T>,
    hooks: H,
    /// Bumped by every insertion, removal and clear.
    version: u64,
}

impl<T> LinkedList<T, Plain> {
    pub fn new() -> LinkedList<T, Plain> {
        return LinkedList::with_capacity(0);
    }

    /// Pre-sizes the arena for `capacity` elements.
    ///
    /// Slots freed by removals are reused by later insertions but are not
    /// returned to the allocator until [`LinkedList::shrink_to_fit`].
    pub fn with_capacity(capacity: usize) -> LinkedList<T, Plain> {
        return LinkedList::with_capacity_and_hooks(capacity, Plain);
    }
}

impl<T, H: LinkHooks<T>> LinkedList<T, H> {
    /// An empty list reporting its changes to `hooks`.
    ///
    /// A [`CursorableList`] is usually built with `CursorableList::default()`.
    pub fn with_hooks(hooks: H) -> Self {
        return Self::with_capacity_and_hooks(0, hooks);
    }

    pub fn with_capacity_and_hooks(capacity: usize, hooks: H) -> Self {
        return LinkedList {
            ring: Ring::with_capacity(capacity),
            hooks,
            version: 0,
        };
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        return self.ring.len();
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        return self.ring.len() == 0;
    }

    #[inline(always)]
    pub(crate) fn version(&self) -> u64 {
        return self.version;
    }

    #[inline(always)]
    pub(crate) fn ring(&self) -> &Ring<T> {
        return &self.ring;
    }

    pub(crate) fn hooks_mut(&mut self) -> &mut H {
        return &mut self.hooks;
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Splices a new node in before `before` and reports it to the hooks.
    pub(crate) fn insert_before(&mut self, before: NodeId, value: T) -> NodeId {
        let node = self.ring.insert_before(before, value);
        self.version += 1;
        self.hooks.node_inserted(&self.ring, node);
        return node;
    }

    /// Unlinks `node`, reports it to the hooks, then frees its slot.
    pub(crate) fn remove_node(&mut self, node: NodeId) -> T {
        self.ring.unlink(node);
        self.version += 1;
        self.hooks.node_removed(&self.ring, node);
        return self.ring.release(node);
    }

    /// Replaces a node's value. Not a structural change.
    pub(crate) fn update_node(&mut self, node: NodeId, value: T) -> T {
        let old = std::mem::replace(self.ring.value_mut(node), value);
        self.hooks.node_changed(&self.ring, node);
        return old;
    }

    // =========================================================================
    // Positional access
    // =========================================================================

    pub fn get(&self, index: usize) -> Result<&T> {
        check_element_index(index, self.len())?;
        return Ok(self.ring.value(self.ring.node_at(index)));
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        check_element_index(index, self.len())?;
        let node = self.ring.node_at(index);
        return Ok(self.update_node(node, value));
    }

    /// Inserts before the element at `index`; `index == len` appends.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        check_position_index(index, self.len())?;
        let before = self.ring.node_at(index);
        self.insert_before(before, value);
        return Ok(());
    }

    /// Inserts every item, in order, before the element at `index`.
    pub fn insert_all<I>(&mut self, index: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        check_position_index(index, self.len())?;
        let before = self.ring.node_at(index);
        for item in items {
            self.insert_before(before, item);
        }
        return Ok(());
    }

    pub fn remove(&mut self, index: usize) -> Result<T> {
        check_element_index(index, self.len())?;
        let node = self.ring.node_at(index);
        return Ok(self.remove_node(node));
    }

    // =========================================================================
    // Ends
    // =========================================================================

    pub fn first(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(Error::NoSuchElement);
        }
        return Ok(self.ring.value(self.ring.first()));
    }

    pub fn last(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(Error::NoSuchElement);
        }
        return Ok(self.ring.value(self.ring.last()));
    }

    pub fn push_front(&mut self, value: T) {
        let first = self.ring.first();
        self.insert_before(first, value);
    }

    pub fn push_back(&mut self, value: T) {
        self.insert_before(SENTINEL, value);
    }

    pub fn pop_front(&mut self) -> Result<T> {
        if self.is_empty() {
            return Err(Error::NoSuchElement);
        }
        let first = self.ring.first();
        return Ok(self.remove_node(first));
    }

    pub fn pop_back(&mut self) -> Result<T> {
        if self.is_empty() {
            return Err(Error::NoSuchElement);
        }
        let last = self.ring.last();
        return Ok(self.remove_node(last));
    }

    // =========================================================================
    // Search and bulk operations
    // =========================================================================

    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return self.iter().position(|item| item == value);
    }

    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return self.iter().rposition(|item| item == value);
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        return self.index_of(value).is_some();
    }

    /// Removes the first element equal to `value`.
    pub fn remove_value(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        let mut node = self.ring.first();
        while node != SENTINEL {
            if self.ring.value(node) == value {
                self.remove_node(node);
                return true;
            }
            node = self.ring.next(node);
        }
        return false;
    }

    /// Keeps only the elements for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut node = self.ring.first();
        while node != SENTINEL {
            let next = self.ring.next(node);
            if !keep(self.ring.value(node)) {
                self.remove_node(node);
            }
            node = next;
        }
    }

    /// Returns vacant arena slots past the last linked node to the
    /// allocator. Not a structural change: iterators, views and cursors
    /// stay valid.
    pub fn shrink_to_fit(&mut self) {
        self.ring.shrink_to_fit();
    }

    /// Removes every element.
    ///
    /// Drops the ring in one step when the hooks allow it; otherwise each
    /// node is removed individually so the hooks see every removal.
    pub fn clear(&mut self) {
        if self.hooks.allows_bulk_clear() {
            log::debug!("clearing {} nodes in bulk", self.len());
            self.ring.reset();
            self.version += 1;
            return;
        }
        log::debug!("clearing {} nodes one by one", self.len());
        while !self.is_empty() {
            let first = self.ring.first();
            self.remove_node(first);
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        return self.iter().cloned().collect();
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    pub fn iter(&self) -> Iter<'_, T> {
        return Iter::new(&self.ring);
    }

    /// A fail-fast iterator positioned before the element at `from`.
    pub fn list_iter(&self, from: usize) -> Result<ListIter> {
        return ListIter::new(self, from);
    }

    /// A fail-fast view of `from..to`.
    pub fn sub_list(&self, from: usize, to: usize) -> Result<SubList> {
        return SubList::new(self, from, to);
    }
}

impl<T> LinkedList<T, CursorRegistry> {
    /// Opens a cursor positioned before the element at `from`.
    ///
    /// The cursor stays registered until it is closed or dropped.
    pub fn cursor(&mut self, from: usize) -> Result<Cursor> {
        return Cursor::open(self, from);
    }

    /// Number of registered cursors that have not been closed or dropped.
    pub fn live_cursors(&self) -> usize {
        return self.hooks.live_cursors();
    }
}

// =============================================================================
// Trait impls
// =============================================================================

impl<T, H: LinkHooks<T>> Sequence<T> for LinkedList<T, H> {
    fn len(&self) -> usize {
        return LinkedList::len(self);
    }

    fn get(&self, index: usize) -> Result<&T> {
        return LinkedList::get(self, index);
    }

    fn set(&mut self, index: usize, value: T) -> Result<T> {
        return LinkedList::set(self, index, value);
    }

    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        return LinkedList::insert(self, index, value);
    }

    fn remove(&mut self, index: usize) -> Result<T> {
        return LinkedList::remove(self, index);
    }

    fn clear(&mut self) {
        LinkedList::clear(self);
    }

    fn push(&mut self, value: T) {
        self.push_back(value);
    }

    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return LinkedList::index_of(self, value);
    }
}

impl<T, H: LinkHooks<T> + Default> Default for LinkedList<T, H> {
    fn default() -> Self {
        return Self::with_hooks(H::default());
    }
}

/// Clones the elements only; cursors stay attached to the original.
impl<T: Clone, H: LinkHooks<T> + Default> Clone for LinkedList<T, H> {
    fn clone(&self) -> Self {
        let mut list = Self::with_capacity_and_hooks(self.len(), H::default());
        list.extend(self.iter().cloned());
        return list;
    }
}

impl<T: fmt::Debug, H: LinkHooks<T>> fmt::Debug for LinkedList<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_list().entries(self.iter()).finish();
    }
}

impl<T: PartialEq, H: LinkHooks<T>> PartialEq for LinkedList<T, H> {
    fn eq(&self, other: &Self) -> bool {
        return self.len() == other.len() && self.iter().eq(other.iter());
    }
}

impl<T: Eq, H: LinkHooks<T>> Eq for LinkedList<T, H> {}

impl<T: Hash, H: LinkHooks<T>> Hash for LinkedList<T, H> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        state.write_usize(self.len());
        for item in self.iter() {
            item.hash(state);
        }
    }
}

impl<T, H: LinkHooks<T>> Extend<T> for LinkedList<T, H> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.push_back(item);
        }
    }
}

impl<T, H: LinkHooks<T> + Default> FromIterator<T> for LinkedList<T, H> {
    fn from_iter<I: IntoIterator<Item = T>>(items: I) -> Self {
        let mut list = Self::default();
        list.extend(items);
        return list;
    }
}

impl<'a, T, H: LinkHooks<T>> IntoIterator for &'a LinkedList<T, H> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        return self.iter();
    }
}

impl<T, H: LinkHooks<T>> IntoIterator for LinkedList<T, H> {
    type Item = T;
    type IntoIter = IntoIter<T, H>;

    fn into_iter(self) -> IntoIter<T, H> {
        return IntoIter::new(self);
    }
}
