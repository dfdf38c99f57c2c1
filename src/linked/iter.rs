//! Iteration over a [`LinkedList`].
//!
//! [`Iter`] borrows the list and is the everyday way to read it.
//! [`ListIter`], [`SubList`] and [`SubListIter`] are detached: they keep a position and a
//! snapshot of the list's version, and every call takes the list as an
//! argument. That lets the list be modified between calls, which the next
//! call then reports as [`Error::ConcurrentModification`] unless the change
//! was made through the same handle.

use super::hooks::LinkHooks;
use super::ring::{NodeId, Ring, SENTINEL};
use super::LinkedList;
use crate::error::{check_element_index, check_position_index, Error, Result};

// =============================================================================
// Borrowing iterators
// =============================================================================

/// Borrowing iterator over a ring, front to back.
pub struct Iter<'a, T> {
    ring: &'a Ring<T>,
    front: NodeId,
    back: NodeId,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(ring: &'a Ring<T>) -> Iter<'a, T> {
        return Iter {
            ring,
            front: ring.first(),
            back: ring.last(),
            remaining: ring.len(),
        };
    }

    /// Iterates `len` nodes starting at `start`.
    pub(crate) fn range(ring: &'a Ring<T>, start: NodeId, len: usize) -> Iter<'a, T> {
        let mut back = start;
        for _ in 1..len {
            back = ring.next(back);
        }
        return Iter {
            ring,
            front: start,
            back,
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
        let value = self.ring.value(self.front);
        self.front = self.ring.next(self.front);
        self.remaining -= 1;
        return Some(value);
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
        let value = self.ring.value(self.back);
        self.back = self.ring.prev(self.back);
        self.remaining -= 1;
        return Some(value);
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

/// Owning iterator, popping from the front.
pub struct IntoIter<T, H: LinkHooks<T>> {
    list: LinkedList<T, H>,
}

impl<T, H: LinkHooks<T>> IntoIter<T, H> {
    pub(crate) fn new(list: LinkedList<T, H>) -> IntoIter<T, H> {
        return IntoIter { list };
    }
}

impl<T, H: LinkHooks<T>> Iterator for IntoIter<T, H> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        return self.list.pop_front().ok();
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.list.len(), Some(self.list.len()));
    }
}

impl<T, H: LinkHooks<T>> DoubleEndedIterator for IntoIter<T, H> {
    fn next_back(&mut self) -> Option<T> {
        return self.list.pop_back().ok();
    }
}

impl<T, H: LinkHooks<T>> ExactSizeIterator for IntoIter<T, H> {}

// =============================================================================
// Fail-fast list iterator
// =============================================================================

/// A bidirectional iterator that refuses to continue once the list has been
/// structurally changed by anyone else.
///
/// Changes made through the iterator itself (`remove`, `add`) keep it
/// valid. A `ListIter` must only be used with the list that created it.
#[derive(Clone, Debug)]
pub struct ListIter {
    next: NodeId,
    next_index: usize,
    /// The node returned by the last `next`/`previous`, if it may still be
    /// removed or replaced.
    current: Option<NodeId>,
    expected_version: u64,
}

impl ListIter {
    pub(crate) fn new<T, H: LinkHooks<T>>(list: &LinkedList<T, H>, from: usize) -> Result<ListIter> {
        check_position_index(from, list.len())?;
        return Ok(ListIter {
            next: list.ring().node_at(from),
            next_index: from,
            current: None,
            expected_version: list.version(),
        });
    }

    fn check_version<T, H: LinkHooks<T>>(&self, list: &LinkedList<T, H>) -> Result<()> {
        if list.version() != self.expected_version {
            return Err(Error::ConcurrentModification);
        }
        return Ok(());
    }

    pub fn has_next(&self) -> bool {
        return self.next != SENTINEL;
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

    pub fn next<'a, T, H: LinkHooks<T>>(&mut self, list: &'a LinkedList<T, H>) -> Result<&'a T> {
        self.check_version(list)?;
        if !self.has_next() {
            return Err(Error::NoSuchElement);
        }
        let ring = list.ring();
        let node = self.next;
        self.current = Some(node);
        self.next = ring.next(node);
        self.next_index += 1;
        return Ok(ring.value(node));
    }

    pub fn previous<'a, T, H: LinkHooks<T>>(&mut self, list: &'a LinkedList<T, H>) -> Result<&'a T> {
        self.check_version(list)?;
        if !self.has_previous() {
            return Err(Error::NoSuchElement);
        }
        let ring = list.ring();
        self.next = ring.prev(self.next);
        self.current = Some(self.next);
        self.next_index -= 1;
        return Ok(ring.value(self.next));
    }

    /// Removes the element returned by the last step.
    pub fn remove<T, H: LinkHooks<T>>(&mut self, list: &mut LinkedList<T, H>) -> Result<T> {
        self.check_version(list)?;
        let current = self.current.ok_or(Error::IllegalState)?;
        let value = if current == self.next {
            // after previous(): the cursor sits before the removed node
            self.next = list.ring().next(current);
            list.remove_node(current)
        } else {
            let value = list.remove_node(current);
            self.next_index -= 1;
            value
        };
        self.current = None;
        self.expected_version += 1;
        return Ok(value);
    }

    /// Replaces the element returned by the last step.
    pub fn set<T, H: LinkHooks<T>>(&mut self, list: &mut LinkedList<T, H>, value: T) -> Result<T> {
        self.check_version(list)?;
        let current = self.current.ok_or(Error::IllegalState)?;
        return Ok(list.update_node(current, value));
    }

    /// Inserts before the next element; a following `next` is unaffected.
    pub fn add<T, H: LinkHooks<T>>(&mut self, list: &mut LinkedList<T, H>, value: T) -> Result<()> {
        self.check_version(list)?;
        list.insert_before(self.next, value);
        self.current = None;
        self.next_index += 1;
        self.expected_version += 1;
        return Ok(());
    }
}

// =============================================================================
// Sub-list view
// =============================================================================

/// A fail-fast window `offset..offset + len` onto a list.
///
/// Changes made through the view keep it valid and resize it; any other
/// structural change to the list invalidates it.
#[derive(Clone, Debug)]
pub struct SubList {
    pub(super) offset: usize,
    pub(super) len: usize,
    pub(super) expected_version: u64,
}

impl SubList {
    pub(crate) fn new<T, H: LinkHooks<T>>(list: &LinkedList<T, H>, from: usize, to: usize) -> Result<SubList> {
        if from > to {
            return Err(Error::InvalidRange { from, to });
        }
        check_position_index(to, list.len())?;
        return Ok(SubList {
            offset: from,
            len: to - from,
            expected_version: list.version(),
        });
    }

    pub(super) fn check_version<T, H: LinkHooks<T>>(&self, list: &LinkedList<T, H>) -> Result<()> {
        if list.version() != self.expected_version {
            return Err(Error::ConcurrentModification);
        }
        return Ok(());
    }

    /// Keeps the view valid after its own handles changed the list.
    pub(super) fn resized<T, H: LinkHooks<T>>(&mut self, list: &LinkedList<T, H>, len: usize) {
        self.len = len;
        self.expected_version = list.version();
    }

    pub fn len<T, H: LinkHooks<T>>(&self, list: &LinkedList<T, H>) -> Result<usize> {
        self.check_version(list)?;
        return Ok(self.len);
    }

    pub fn is_empty<T, H: LinkHooks<T>>(&self, list: &LinkedList<T, H>) -> Result<bool> {
        return Ok(self.len(list)? == 0);
    }

    pub fn get<'a, T, H: LinkHooks<T>>(&self, list: &'a LinkedList<T, H>, index: usize) -> Result<&'a T> {
        check_element_index(index, self.len)?;
        self.check_version(list)?;
        return list.get(self.offset + index);
    }

    pub fn set<T, H: LinkHooks<T>>(&self, list: &mut LinkedList<T, H>, index: usize, value: T) -> Result<T> {
        check_element_index(index, self.len)?;
        self.check_version(list)?;
        return list.set(self.offset + index, value);
    }

    pub fn insert<T, H: LinkHooks<T>>(&mut self, list: &mut LinkedList<T, H>, index: usize, value: T) -> Result<()> {
        check_position_index(index, self.len)?;
        self.check_version(list)?;
        list.insert(self.offset + index, value)?;
        self.resized(list, self.len + 1);
        return Ok(());
    }

    pub fn push<T, H: LinkHooks<T>>(&mut self, list: &mut LinkedList<T, H>, value: T) -> Result<()> {
        let len = self.len;
        return self.insert(list, len, value);
    }

    /// Inserts every item, in order, before the view's element at `index`.
    pub fn insert_all<T, H, I>(&mut self, list: &mut LinkedList<T, H>, index: usize, items: I) -> Result<()>
    where
        H: LinkHooks<T>,
        I: IntoIterator<Item = T>,
    {
        check_position_index(index, self.len)?;
        self.check_version(list)?;
        let before = list.len();
        list.insert_all(self.offset + index, items)?;
        let added = list.len() - before;
        self.resized(list, self.len + added);
        return Ok(());
    }

    pub fn remove<T, H: LinkHooks<T>>(&mut self, list: &mut LinkedList<T, H>, index: usize) -> Result<T> {
        check_element_index(index, self.len)?;
        self.check_version(list)?;
        let value = list.remove(self.offset + index)?;
        self.resized(list, self.len - 1);
        return Ok(value);
    }

    /// Removes every element in the window from the list.
    pub fn clear<T, H: LinkHooks<T>>(&mut self, list: &mut LinkedList<T, H>) -> Result<()> {
        self.check_version(list)?;
        let mut node = list.ring().node_at(self.offset);
        for _ in 0..self.len {
            let next = list.ring().next(node);
            list.remove_node(node);
            node = next;
        }
        self.resized(list, 0);
        return Ok(());
    }

    pub fn iter<'a, T, H: LinkHooks<T>>(&self, list: &'a LinkedList<T, H>) -> Result<Iter<'a, T>> {
        self.check_version(list)?;
        let start = list.ring().node_at(self.offset);
        return Ok(Iter::range(list.ring(), start, self.len));
    }

    /// A fail-fast iterator over the view, positioned before its element
    /// at `from`.
    pub fn list_iter<T, H: LinkHooks<T>>(&self, list: &LinkedList<T, H>, from: usize) -> Result<SubListIter> {
        check_position_index(from, self.len)?;
        self.check_version(list)?;
        return Ok(SubListIter {
            inner: ListIter::new(list, self.offset + from)?,
            offset: self.offset,
        });
    }

    pub fn to_vec<T: Clone, H: LinkHooks<T>>(&self, list: &LinkedList<T, H>) -> Result<Vec<T>> {
        return Ok(self.iter(list)?.cloned().collect());
    }

    /// A narrower window, relative to this one.
    pub fn sub_list<T, H: LinkHooks<T>>(&self, list: &LinkedList<T, H>, from: usize, to: usize) -> Result<SubList> {
        self.check_version(list)?;
        if from > to {
            return Err(Error::InvalidRange { from, to });
        }
        check_position_index(to, self.len)?;
        return Ok(SubList {
            offset: self.offset + from,
            len: to - from,
            expected_version: self.expected_version,
        });
    }
}

/// A [`ListIter`] confined to a [`SubList`].
///
/// Indices are relative to the view, and stepping stops at the view's ends.
/// `remove` and `add` resize the view passed to them, which must be the view
/// the iterator was created from.
#[derive(Clone, Debug)]
pub struct SubListIter {
    inner: ListIter,
    offset: usize,
}

impl SubListIter {
    pub fn has_next(&self, view: &SubList) -> bool {
        return self.next_index() < view.len;
    }

    pub fn has_previous(&self) -> bool {
        return self.inner.next_index() > self.offset;
    }

    pub fn next_index(&self) -> usize {
        return self.inner.next_index() - self.offset;
    }

    pub fn previous_index(&self) -> Option<usize> {
        return self.next_index().checked_sub(1);
    }

    pub fn next<'a, T, H: LinkHooks<T>>(&mut self, view: &SubList, list: &'a LinkedList<T, H>) -> Result<&'a T> {
        self.inner.check_version(list)?;
        if !self.has_next(view) {
            return Err(Error::NoSuchElement);
        }
        return self.inner.next(list);
    }

    pub fn previous<'a, T, H: LinkHooks<T>>(&mut self, list: &'a LinkedList<T, H>) -> Result<&'a T> {
        self.inner.check_version(list)?;
        if !self.has_previous() {
            return Err(Error::NoSuchElement);
        }
        return self.inner.previous(list);
    }

    pub fn remove<T, H: LinkHooks<T>>(&mut self, view: &mut SubList, list: &mut LinkedList<T, H>) -> Result<T> {
        let value = self.inner.remove(list)?;
        view.resized(list, view.len.saturating_sub(1));
        return Ok(value);
    }

    pub fn set<T, H: LinkHooks<T>>(&mut self, list: &mut LinkedList<T, H>, value: T) -> Result<T> {
        return self.inner.set(list, value);
    }

    pub fn add<T, H: LinkHooks<T>>(&mut self, view: &mut SubList, list: &mut LinkedList<T, H>, value: T) -> Result<()> {
        self.inner.add(list, value)?;
        view.resized(list, view.len + 1);
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(items: &[char]) -> LinkedList<char> {
        return items.iter().copied().collect();
    }

    #[test]
    fn iter_both_directions() {
        let list = list_of(&['a', 'b', 'c']);
        assert_eq!(list.iter().collect::<String>(), "abc");
        assert_eq!(list.iter().rev().collect::<String>(), "cba");
        let mut it = list.iter();
        assert_eq!(it.next(), Some(&'a'));
        assert_eq!(it.next_back(), Some(&'c'));
        assert_eq!(it.len(), 1);
        assert_eq!(it.next(), Some(&'b'));
        assert_eq!(it.next_back(), None);
    }

    #[test]
    fn list_iter_walks_both_ways() {
        let list = list_of(&['a', 'b', 'c']);
        let mut it = list.list_iter(1).unwrap();
        assert_eq!(it.previous_index(), Some(0));
        assert_eq!(it.next(&list), Ok(&'b'));
        assert_eq!(it.next(&list), Ok(&'c'));
        assert!(!it.has_next());
        assert_eq!(it.next(&list), Err(Error::NoSuchElement));
        assert_eq!(it.previous(&list), Ok(&'c'));
        assert_eq!(it.previous(&list), Ok(&'b'));
        assert_eq!(it.previous(&list), Ok(&'a'));
        assert_eq!(it.previous(&list), Err(Error::NoSuchElement));
        assert_eq!(it.previous_index(), None);
    }

    #[test]
    fn list_iter_rejects_out_of_range_start() {
        let list = list_of(&['a']);
        assert!(list.list_iter(1).is_ok());
        assert_eq!(
            list.list_iter(2).err(),
            Some(Error::IndexOutOfRange { index: 2, len: 1 })
        );
    }

    #[test]
    fn remove_requires_a_step() {
        let mut list = list_of(&['a', 'b']);
        let mut it = list.list_iter(0).unwrap();
        assert_eq!(it.remove(&mut list), Err(Error::IllegalState));
        it.next(&list).unwrap();
        assert_eq!(it.remove(&mut list), Ok('a'));
        assert_eq!(it.remove(&mut list), Err(Error::IllegalState));
        assert_eq!(it.next_index(), 0);
        assert_eq!(it.next(&list), Ok(&'b'));
    }

    #[test]
    fn remove_after_previous() {
        let mut list = list_of(&['a', 'b', 'c']);
        let mut it = list.list_iter(2).unwrap();
        assert_eq!(it.previous(&list), Ok(&'b'));
        assert_eq!(it.remove(&mut list), Ok('b'));
        assert_eq!(it.next_index(), 1);
        assert_eq!(it.next(&list), Ok(&'c'));
        assert_eq!(list.to_vec(), vec!['a', 'c']);
    }

    #[test]
    fn set_and_add() {
        let mut list = list_of(&['a', 'c']);
        let mut it = list.list_iter(0).unwrap();
        assert_eq!(it.set(&mut list, 'x'), Err(Error::IllegalState));
        it.next(&list).unwrap();
        assert_eq!(it.set(&mut list, 'A'), Ok('a'));
        it.add(&mut list, 'b').unwrap();
        assert_eq!(it.set(&mut list, 'z'), Err(Error::IllegalState));
        assert_eq!(it.next_index(), 2);
        assert_eq!(it.next(&list), Ok(&'c'));
        assert_eq!(list.to_vec(), vec!['A', 'b', 'c']);
    }

    #[test]
    fn external_change_fails_fast() {
        let mut list = list_of(&['a', 'b', 'c']);
        let mut it = list.list_iter(0).unwrap();
        it.next(&list).unwrap();
        list.push_back('d');
        assert_eq!(it.next(&list), Err(Error::ConcurrentModification));
        assert_eq!(it.remove(&mut list), Err(Error::ConcurrentModification));
    }

    #[test]
    fn value_change_does_not_invalidate() {
        let mut list = list_of(&['a', 'b']);
        let mut it = list.list_iter(0).unwrap();
        list.set(1, 'B').unwrap();
        assert_eq!(it.next(&list), Ok(&'a'));
        assert_eq!(it.next(&list), Ok(&'B'));
    }

    #[test]
    fn sub_list_view() {
        let mut list = list_of(&['a', 'b', 'c', 'd', 'e']);
        let mut sub = list.sub_list(1, 4).unwrap();
        assert_eq!(sub.to_vec(&list), Ok(vec!['b', 'c', 'd']));
        assert_eq!(sub.get(&list, 3), Err(Error::IndexOutOfRange { index: 3, len: 3 }));

        sub.push(&mut list, 'x').unwrap();
        assert_eq!(sub.remove(&mut list, 0), Ok('b'));
        assert_eq!(sub.set(&mut list, 0, 'C'), Ok('c'));
        assert_eq!(sub.to_vec(&list), Ok(vec!['C', 'd', 'x']));
        assert_eq!(list.to_vec(), vec!['a', 'C', 'd', 'x', 'e']);

        let inner = sub.sub_list(&list, 1, 2).unwrap();
        assert_eq!(inner.to_vec(&list), Ok(vec!['d']));

        sub.clear(&mut list).unwrap();
        assert_eq!(sub.len(&list), Ok(0));
        assert_eq!(list.to_vec(), vec!['a', 'e']);
    }

    #[test]
    fn sub_list_fails_fast() {
        let mut list = list_of(&['a', 'b', 'c']);
        let sub = list.sub_list(0, 2).unwrap();
        list.remove(2).unwrap();
        assert_eq!(sub.len(&list), Err(Error::ConcurrentModification));
        assert_eq!(sub.get(&list, 0), Err(Error::ConcurrentModification));
    }

    #[test]
    fn sub_list_insert_all() {
        let mut list = list_of(&['a', 'b', 'f']);
        let mut sub = list.sub_list(1, 2).unwrap();
        sub.insert_all(&mut list, 1, ['c', 'd', 'e']).unwrap();
        assert_eq!(sub.to_vec(&list), Ok(vec!['b', 'c', 'd', 'e']));
        assert_eq!(list.to_vec(), vec!['a', 'b', 'c', 'd', 'e', 'f']);
        assert_eq!(
            sub.insert_all(&mut list, 5, ['z']),
            Err(Error::IndexOutOfRange { index: 5, len: 4 })
        );
        sub.insert_all(&mut list, 0, []).unwrap();
        assert_eq!(sub.len(&list), Ok(4));

        list.push_front('_');
        assert_eq!(sub.insert_all(&mut list, 0, ['z']), Err(Error::ConcurrentModification));
    }

    #[test]
    fn sub_list_iter_stays_inside_the_window() {
        let list = list_of(&['a', 'b', 'c', 'd', 'e']);
        let sub = list.sub_list(1, 4).unwrap();
        let mut it = sub.list_iter(&list, 1).unwrap();
        assert_eq!(it.next_index(), 1);
        assert_eq!(it.next(&sub, &list), Ok(&'c'));
        assert_eq!(it.next(&sub, &list), Ok(&'d'));
        assert!(!it.has_next(&sub));
        assert_eq!(it.next(&sub, &list), Err(Error::NoSuchElement));
        assert_eq!(it.previous(&list), Ok(&'d'));
        assert_eq!(it.previous(&list), Ok(&'c'));
        assert_eq!(it.previous(&list), Ok(&'b'));
        assert!(!it.has_previous());
        assert_eq!(it.previous_index(), None);
        assert_eq!(it.previous(&list), Err(Error::NoSuchElement));
        assert_eq!(
            sub.list_iter(&list, 4).err(),
            Some(Error::IndexOutOfRange { index: 4, len: 3 })
        );
    }

    #[test]
    fn sub_list_iter_edits_resize_the_view() {
        let mut list = list_of(&['a', 'b', 'c', 'd']);
        let mut sub = list.sub_list(1, 3).unwrap();
        let mut it = sub.list_iter(&list, 0).unwrap();
        assert_eq!(it.next(&sub, &list), Ok(&'b'));
        assert_eq!(it.remove(&mut sub, &mut list), Ok('b'));
        assert_eq!(sub.len(&list), Ok(1));
        assert_eq!(it.next_index(), 0);

        it.add(&mut sub, &mut list, 'x').unwrap();
        it.add(&mut sub, &mut list, 'y').unwrap();
        assert_eq!(sub.len(&list), Ok(3));
        assert_eq!(it.next(&sub, &list), Ok(&'c'));
        assert_eq!(it.set(&mut list, 'C'), Ok('c'));
        assert!(!it.has_next(&sub));
        assert_eq!(sub.to_vec(&list), Ok(vec!['x', 'y', 'C']));
        assert_eq!(list.to_vec(), vec!['a', 'x', 'y', 'C', 'd']);

        // an edit through the view itself leaves the iterator behind
        sub.push(&mut list, 'z').unwrap();
        assert_eq!(it.previous(&list), Err(Error::ConcurrentModification));
    }

    #[test]
    fn sub_list_bounds() {
        let list = list_of(&['a', 'b']);
        assert_eq!(list.sub_list(2, 1).err(), Some(Error::InvalidRange { from: 2, to: 1 }));
        assert_eq!(
            list.sub_list(0, 3).err(),
            Some(Error::IndexOutOfRange { index: 3, len: 2 })
        );
        let empty = list.sub_list(2, 2).unwrap();
        assert_eq!(empty.is_empty(&list), Ok(true));
        assert_eq!(empty.iter(&list).unwrap().count(), 0);
    }
}
