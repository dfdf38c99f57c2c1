//! Live cursors over a [`CursorableList`].
//!
//! A cursor's state is shared between the [`Cursor`] handle (strong) and the
//! list's [`CursorRegistry`] (weak). Every structural change to the list is
//! broadcast to the registered states, which repair their position in place
//! instead of failing. Dropping the handle is enough to retire a cursor: its
//! weak entry dies and is pruned the next time the registry is walked.
//! [`Cursor::close`] retires it immediately.
//!
//! A [`SubCursor`] is a cursor confined to a [`SubList`] window. Its indices
//! are relative to the window, and its own `add` and `remove` resize the
//! window instead of invalidating it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use super::hooks::LinkHooks;
use super::iter::SubList;
use super::ring::{NodeId, Ring, SENTINEL};
use super::CursorableList;
use crate::error::{check_position_index, Error, Result};

#[derive(Debug)]
struct CursorState {
    /// Node returned by the next forward step; the sentinel at the end.
    next: NodeId,
    /// Cached position of `next`. Only trusted while `index_valid`.
    next_index: usize,
    index_valid: bool,
    /// Node returned by the last step, while it may still be removed or set.
    current: Option<NodeId>,
    /// Set when someone else removed `current`; a following `remove` on this
    /// cursor is then a no-op instead of an error.
    current_removed_by_another: bool,
    open: bool,
}

impl CursorState {
    fn node_removed<T>(&mut self, ring: &Ring<T>, node: NodeId) {
        let is_current = self.current == Some(node);
        if node == self.next && is_current {
            // next() followed by previous(): both point at the removed node
            self.next = ring.next(node);
            self.current = None;
            self.current_removed_by_another = true;
        } else if node == self.next {
            self.next = ring.next(node);
            self.current_removed_by_another = false;
        } else if is_current {
            self.current = None;
            self.current_removed_by_another = true;
            self.next_index = self.next_index.saturating_sub(1);
        } else {
            self.index_valid = false;
            self.current_removed_by_another = false;
        }
    }

    fn node_inserted<T>(&mut self, ring: &Ring<T>, node: NodeId) {
        if self.current == Some(ring.prev(node)) || ring.prev(self.next) == node {
            self.next = node;
        } else {
            self.index_valid = false;
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Link hooks that broadcast every change to the list's live cursors.
#[derive(Debug, Default)]
pub struct CursorRegistry {
    cursors: SmallVec<[Weak<RefCell<CursorState>>; 4]>,
}

impl CursorRegistry {
    fn register(&mut self, state: &Rc<RefCell<CursorState>>) {
        self.prune();
        self.cursors.push(Rc::downgrade(state));
        log::trace!("registered cursor, {} live", self.cursors.len());
    }

    fn unregister(&mut self, state: &Rc<RefCell<CursorState>>) {
        let target = Rc::downgrade(state);
        self.cursors
            .retain(|weak| weak.strong_count() > 0 && !weak.ptr_eq(&target));
        log::trace!("unregistered cursor, {} live", self.cursors.len());
    }

    /// Drops entries whose cursor handle is gone.
    fn prune(&mut self) {
        let before = self.cursors.len();
        self.cursors.retain(|weak| weak.strong_count() > 0);
        if self.cursors.len() != before {
            log::trace!("pruned {} dropped cursors", before - self.cursors.len());
        }
    }

    /// Hands every live cursor to `f`, pruning dead entries on the way.
    fn broadcast<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut CursorState),
    {
        self.cursors.retain(|weak| match weak.upgrade() {
            Some(state) => {
                f(&mut state.borrow_mut());
                true
            }
            None => false,
        });
    }

    pub(crate) fn live_cursors(&self) -> usize {
        return self
            .cursors
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count();
    }
}

impl<T> LinkHooks<T> for CursorRegistry {
    fn node_inserted(&mut self, ring: &Ring<T>, node: NodeId) {
        self.broadcast(|cursor| cursor.node_inserted(ring, node));
    }

    fn node_removed(&mut self, ring: &Ring<T>, node: NodeId) {
        self.broadcast(|cursor| cursor.node_removed(ring, node));
    }

    fn node_changed(&mut self, _ring: &Ring<T>, _node: NodeId) {
        // a new value does not move anyone
        self.broadcast(|_| {});
    }

    fn allows_bulk_clear(&self) -> bool {
        return false;
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// A list iterator that stays valid while its list is modified.
///
/// Each call takes the list the cursor was opened on. Changes made directly
/// to the list, or through other cursors, are absorbed: a removed next
/// element is skipped, an element inserted right at the cursor is returned
/// next, and the index is recomputed lazily when it can no longer be
/// tracked. Every call on a closed cursor fails with
/// [`Error::ClosedCursor`].
#[derive(Debug)]
pub struct Cursor {
    state: Rc<RefCell<CursorState>>,
}

impl Cursor {
    pub(crate) fn open<T>(list: &mut CursorableList<T>, from: usize) -> Result<Cursor> {
        check_position_index(from, list.len())?;
        let state = Rc::new(RefCell::new(CursorState {
            next: list.ring().node_at(from),
            next_index: from,
            index_valid: true,
            current: None,
            current_removed_by_another: false,
            open: true,
        }));
        list.hooks_mut().register(&state);
        return Ok(Cursor { state });
    }

    fn check_open(&self) -> Result<()> {
        if !self.state.borrow().open {
            return Err(Error::ClosedCursor);
        }
        return Ok(());
    }

    pub fn is_closed(&self) -> bool {
        return !self.state.borrow().open;
    }

    pub fn has_next(&self) -> Result<bool> {
        self.check_open()?;
        return Ok(self.state.borrow().next != SENTINEL);
    }

    pub fn has_previous<T>(&self, list: &CursorableList<T>) -> Result<bool> {
        self.check_open()?;
        return Ok(list.ring().prev(self.state.borrow().next) != SENTINEL);
    }

    pub fn next<'a, T>(&mut self, list: &'a CursorableList<T>) -> Result<&'a T> {
        self.check_open()?;
        let ring = list.ring();
        let mut state = self.state.borrow_mut();
        if state.next == SENTINEL {
            return Err(Error::NoSuchElement);
        }
        let node = state.next;
        state.current = Some(node);
        state.next = ring.next(node);
        state.next_index += 1;
        return Ok(ring.value(node));
    }

    pub fn previous<'a, T>(&mut self, list: &'a CursorableList<T>) -> Result<&'a T> {
        self.check_open()?;
        let ring = list.ring();
        let mut state = self.state.borrow_mut();
        let prev = ring.prev(state.next);
        if prev == SENTINEL {
            return Err(Error::NoSuchElement);
        }
        state.next = prev;
        state.current = Some(prev);
        state.next_index = state.next_index.saturating_sub(1);
        return Ok(ring.value(prev));
    }

    /// Position of the element the next forward step returns.
    ///
    /// Recounted from the head when a change elsewhere in the list made the
    /// cached value unreliable.
    pub fn next_index<T>(&self, list: &CursorableList<T>) -> Result<usize> {
        self.check_open()?;
        let mut state = self.state.borrow_mut();
        if !state.index_valid {
            state.next_index = list.ring().position_of(state.next);
            state.index_valid = true;
        }
        return Ok(state.next_index);
    }

    pub fn previous_index<T>(&self, list: &CursorableList<T>) -> Result<Option<usize>> {
        return Ok(self.next_index(list)?.checked_sub(1));
    }

    /// Removes the element returned by the last step.
    ///
    /// Returns `Ok(None)` when that element was already removed by someone
    /// else since it was returned.
    pub fn remove<T>(&mut self, list: &mut CursorableList<T>) -> Result<Option<T>> {
        self.check_open()?;
        let (current, removed_by_another) = {
            let state = self.state.borrow();
            (state.current, state.current_removed_by_another)
        };
        let removed = match current {
            Some(node) => {
                // the broadcast repairs this cursor too
                Some(list.remove_node(node))
            }
            None if removed_by_another => None,
            None => return Err(Error::IllegalState),
        };
        self.state.borrow_mut().current_removed_by_another = false;
        return Ok(removed);
    }

    /// Replaces the element returned by the last step.
    ///
    /// Fails with [`Error::IllegalState`] if that element has been removed.
    pub fn set<T>(&mut self, list: &mut CursorableList<T>, value: T) -> Result<T> {
        self.check_open()?;
        let current = self.state.borrow().current.ok_or(Error::IllegalState)?;
        return Ok(list.update_node(current, value));
    }

    /// Inserts before the next element; a following `next` is unaffected.
    pub fn add<T>(&mut self, list: &mut CursorableList<T>, value: T) -> Result<()> {
        self.check_open()?;
        let next = self.state.borrow().next;
        list.insert_before(next, value);
        let mut state = self.state.borrow_mut();
        state.current = None;
        state.next_index += 1;
        // the broadcast moved `next` onto the new node; step back over it
        state.next = list.ring().next(state.next);
        return Ok(());
    }

    /// De-registers the cursor. Later calls fail with
    /// [`Error::ClosedCursor`]; closing again does nothing.
    pub fn close<T>(&mut self, list: &mut CursorableList<T>) {
        if !self.state.borrow().open {
            return;
        }
        list.hooks_mut().unregister(&self.state);
        self.state.borrow_mut().open = false;
    }
}

// =============================================================================
// Sub-list cursor
// =============================================================================

impl SubList {
    /// Opens a cursor over this view, positioned before its element at
    /// `from`. Only valid for a view of a [`CursorableList`].
    pub fn cursor<T>(&self, list: &mut CursorableList<T>, from: usize) -> Result<SubCursor> {
        check_position_index(from, self.len)?;
        self.check_version(list)?;
        let cursor = Cursor::open(list, self.offset + from)?;
        return Ok(SubCursor {
            cursor,
            offset: self.offset,
        });
    }
}

/// A [`Cursor`] that stays inside a [`SubList`].
///
/// Forward steps stop at the end of the view passed in and backward steps
/// at its start. Changes made elsewhere are repaired as for any cursor, but
/// they still invalidate the view itself. This cursor's `add` and `remove`
/// keep a valid view in step and leave a stale one stale.
#[derive(Debug)]
pub struct SubCursor {
    cursor: Cursor,
    offset: usize,
}

impl SubCursor {
    pub fn is_closed(&self) -> bool {
        return self.cursor.is_closed();
    }

    /// Position within the view. Reads 0 if edits before the view pushed
    /// the cursor in front of it.
    pub fn next_index<T>(&self, list: &CursorableList<T>) -> Result<usize> {
        return Ok(self.cursor.next_index(list)?.saturating_sub(self.offset));
    }

    pub fn previous_index<T>(&self, list: &CursorableList<T>) -> Result<Option<usize>> {
        return Ok(self.next_index(list)?.checked_sub(1));
    }

    pub fn has_next<T>(&self, view: &SubList, list: &CursorableList<T>) -> Result<bool> {
        return Ok(self.next_index(list)? < view.len);
    }

    pub fn has_previous<T>(&self, list: &CursorableList<T>) -> Result<bool> {
        return Ok(self.next_index(list)? > 0);
    }

    pub fn next<'a, T>(&mut self, view: &SubList, list: &'a CursorableList<T>) -> Result<&'a T> {
        if !self.has_next(view, list)? {
            return Err(Error::NoSuchElement);
        }
        return self.cursor.next(list);
    }

    pub fn previous<'a, T>(&mut self, list: &'a CursorableList<T>) -> Result<&'a T> {
        if !self.has_previous(list)? {
            return Err(Error::NoSuchElement);
        }
        return self.cursor.previous(list);
    }

    /// Removes the element returned by the last step, shrinking the view.
    ///
    /// Returns `Ok(None)`, and leaves the view's length alone, when that
    /// element was already removed by someone else.
    pub fn remove<T>(&mut self, view: &mut SubList, list: &mut CursorableList<T>) -> Result<Option<T>> {
        let in_step = view.check_version(list).is_ok();
        let removed = self.cursor.remove(list)?;
        if in_step && removed.is_some() {
            view.resized(list, view.len.saturating_sub(1));
        }
        return Ok(removed);
    }

    pub fn set<T>(&mut self, list: &mut CursorableList<T>, value: T) -> Result<T> {
        return self.cursor.set(list, value);
    }

    /// Inserts before the next element, growing the view.
    pub fn add<T>(&mut self, view: &mut SubList, list: &mut CursorableList<T>, value: T) -> Result<()> {
        let in_step = view.check_version(list).is_ok();
        self.cursor.add(list, value)?;
        if in_step {
            view.resized(list, view.len + 1);
        }
        return Ok(());
    }

    pub fn close<T>(&mut self, list: &mut CursorableList<T>) {
        self.cursor.close(list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(items: &str) -> CursorableList<char> {
        return items.chars().collect();
    }

    #[test]
    fn walks_like_an_iterator() {
        let mut list = list_of("abc");
        let mut cursor = list.cursor(0).unwrap();
        assert_eq!(cursor.next(&list), Ok(&'a'));
        assert_eq!(cursor.next(&list), Ok(&'b'));
        assert_eq!(cursor.previous(&list), Ok(&'b'));
        assert_eq!(cursor.next_index(&list), Ok(1));
        assert_eq!(cursor.next(&list), Ok(&'b'));
        assert_eq!(cursor.next(&list), Ok(&'c'));
        assert_eq!(cursor.has_next(), Ok(false));
        assert_eq!(cursor.next(&list), Err(Error::NoSuchElement));
    }

    #[test]
    fn removal_of_next_is_skipped() {
        let mut list = list_of("abc");
        let mut cursor = list.cursor(0).unwrap();
        assert_eq!(cursor.next(&list), Ok(&'a'));
        list.remove(1).unwrap();
        assert_eq!(cursor.next_index(&list), Ok(1));
        assert_eq!(cursor.next(&list), Ok(&'c'));
    }

    #[test]
    fn removal_of_current_shifts_index() {
        let mut list = list_of("abc");
        let mut cursor = list.cursor(0).unwrap();
        cursor.next(&list).unwrap();
        cursor.next(&list).unwrap();
        list.remove(1).unwrap();
        assert_eq!(cursor.next_index(&list), Ok(1));
        // already gone: quietly ignored
        assert_eq!(cursor.remove(&mut list), Ok(None));
        assert_eq!(cursor.remove(&mut list), Err(Error::IllegalState));
        assert_eq!(cursor.next(&list), Ok(&'c'));
    }

    #[test]
    fn removal_after_previous() {
        let mut list = list_of("abc");
        let mut cursor = list.cursor(2).unwrap();
        assert_eq!(cursor.previous(&list), Ok(&'b'));
        list.remove(1).unwrap();
        assert_eq!(cursor.remove(&mut list), Ok(None));
        assert_eq!(cursor.next(&list), Ok(&'c'));
        assert_eq!(cursor.set(&mut list, 'C'), Ok('c'));
        assert_eq!(list.to_vec(), vec!['a', 'C']);
    }

    #[test]
    fn removal_elsewhere_is_recounted() {
        let mut list = list_of("abcd");
        let mut cursor = list.cursor(3).unwrap();
        list.remove(0).unwrap();
        assert_eq!(cursor.next_index(&list), Ok(2));
        assert_eq!(cursor.next(&list), Ok(&'d'));
    }

    #[test]
    fn insertion_at_cursor_is_returned_next() {
        let mut list = list_of("ac");
        let mut cursor = list.cursor(0).unwrap();
        cursor.next(&list).unwrap();
        list.insert(1, 'b').unwrap();
        assert_eq!(cursor.next_index(&list), Ok(1));
        assert_eq!(cursor.next(&list), Ok(&'b'));
        assert_eq!(cursor.next(&list), Ok(&'c'));
    }

    #[test]
    fn insertion_before_cursor_is_recounted() {
        let mut list = list_of("abc");
        let mut cursor = list.cursor(2).unwrap();
        list.push_front('z');
        assert_eq!(cursor.next_index(&list), Ok(3));
        assert_eq!(cursor.next(&list), Ok(&'c'));
    }

    #[test]
    fn own_add_is_not_returned() {
        let mut list = list_of("ac");
        let mut cursor = list.cursor(1).unwrap();
        cursor.add(&mut list, 'b').unwrap();
        assert_eq!(cursor.next_index(&list), Ok(2));
        assert_eq!(cursor.next(&list), Ok(&'c'));
        assert_eq!(cursor.previous(&list), Ok(&'c'));
        assert_eq!(cursor.previous(&list), Ok(&'b'));
        assert_eq!(list.to_vec(), vec!['a', 'b', 'c']);
    }

    #[test]
    fn own_remove() {
        let mut list = list_of("abc");
        let mut cursor = list.cursor(0).unwrap();
        assert_eq!(cursor.remove(&mut list), Err(Error::IllegalState));
        cursor.next(&list).unwrap();
        cursor.next(&list).unwrap();
        assert_eq!(cursor.remove(&mut list), Ok(Some('b')));
        assert_eq!(cursor.next_index(&list), Ok(1));
        assert_eq!(cursor.next(&list), Ok(&'c'));
        assert_eq!(list.to_vec(), vec!['a', 'c']);
    }

    #[test]
    fn two_cursors_share_a_list() {
        let mut list = list_of("abcd");
        let mut first = list.cursor(0).unwrap();
        let mut second = list.cursor(0).unwrap();
        first.next(&list).unwrap();
        second.next(&list).unwrap();
        second.next(&list).unwrap();
        // `second` removes the element `first` would return next
        second.remove(&mut list).unwrap();
        assert_eq!(first.next(&list), Ok(&'c'));
        assert_eq!(second.next(&list), Ok(&'c'));
    }

    #[test]
    fn clear_repairs_cursors() {
        let mut list = list_of("abc");
        let mut cursor = list.cursor(1).unwrap();
        list.clear();
        assert_eq!(cursor.has_next(), Ok(false));
        assert_eq!(cursor.next_index(&list), Ok(0));
        // appending at the cursor's position lands in front of it
        list.push_back('x');
        assert_eq!(cursor.next(&list), Ok(&'x'));
        assert_eq!(cursor.next(&list), Err(Error::NoSuchElement));
    }

    #[test]
    fn close_is_immediate_and_idempotent() {
        let mut list = list_of("ab");
        let mut cursor = list.cursor(0).unwrap();
        assert_eq!(list.live_cursors(), 1);
        cursor.close(&mut list);
        assert_eq!(list.live_cursors(), 0);
        assert!(cursor.is_closed());
        for _ in 0..2 {
            assert_eq!(cursor.next(&list), Err(Error::ClosedCursor));
            assert_eq!(cursor.has_next(), Err(Error::ClosedCursor));
            assert_eq!(cursor.next_index(&list), Err(Error::ClosedCursor));
            assert_eq!(cursor.add(&mut list, 'z'), Err(Error::ClosedCursor));
            cursor.close(&mut list);
        }
        assert_eq!(list.to_vec(), vec!['a', 'b']);
    }

    #[test]
    fn sub_cursor_walks_the_window() {
        let mut list = list_of("abcde");
        let view = list.sub_list(1, 4).unwrap();
        let mut cursor = view.cursor(&mut list, 0).unwrap();
        assert_eq!(list.live_cursors(), 1);
        assert_eq!(cursor.has_previous(&list), Ok(false));
        assert_eq!(cursor.previous(&list), Err(Error::NoSuchElement));
        assert_eq!(cursor.next(&view, &list), Ok(&'b'));
        assert_eq!(cursor.next(&view, &list), Ok(&'c'));
        assert_eq!(cursor.next(&view, &list), Ok(&'d'));
        assert_eq!(cursor.next_index(&list), Ok(3));
        assert_eq!(cursor.has_next(&view, &list), Ok(false));
        assert_eq!(cursor.next(&view, &list), Err(Error::NoSuchElement));
        assert_eq!(cursor.previous(&list), Ok(&'d'));
        assert_eq!(cursor.previous_index(&list), Ok(Some(1)));
        assert_eq!(
            view.cursor(&mut list, 4).err(),
            Some(Error::IndexOutOfRange { index: 4, len: 3 })
        );
    }

    #[test]
    fn sub_cursor_edits_resize_the_window() {
        let mut list = list_of("abcd");
        let mut view = list.sub_list(1, 3).unwrap();
        let mut cursor = view.cursor(&mut list, 0).unwrap();
        assert_eq!(cursor.next(&view, &list), Ok(&'b'));
        assert_eq!(cursor.remove(&mut view, &mut list), Ok(Some('b')));
        assert_eq!(view.len(&list), Ok(1));
        cursor.add(&mut view, &mut list, 'x').unwrap();
        assert_eq!(view.to_vec(&list), Ok(vec!['x', 'c']));
        assert_eq!(cursor.next_index(&list), Ok(1));
        assert_eq!(cursor.next(&view, &list), Ok(&'c'));
        assert_eq!(cursor.set(&mut list, 'C'), Ok('c'));
        assert_eq!(cursor.has_next(&view, &list), Ok(false));
        assert_eq!(list.to_vec(), vec!['a', 'x', 'C', 'd']);

        cursor.close(&mut list);
        assert!(cursor.is_closed());
        assert_eq!(cursor.next(&view, &list), Err(Error::ClosedCursor));
        assert_eq!(list.live_cursors(), 0);
    }

    #[test]
    fn sub_cursor_outlives_its_window() {
        let mut list = list_of("abcd");
        let mut view = list.sub_list(1, 3).unwrap();
        let mut cursor = view.cursor(&mut list, 0).unwrap();
        assert_eq!(cursor.next(&view, &list), Ok(&'b'));
        list.remove(1).unwrap();
        // the view is stale, the cursor is not
        assert_eq!(view.len(&list), Err(Error::ConcurrentModification));
        assert_eq!(cursor.remove(&mut view, &mut list), Ok(None));
        assert_eq!(cursor.next(&view, &list), Ok(&'c'));
        cursor.add(&mut view, &mut list, 'x').unwrap();
        assert_eq!(view.len(&list), Err(Error::ConcurrentModification));
        assert_eq!(list.to_vec(), vec!['a', 'c', 'x', 'd']);
    }

    #[test]
    fn dropped_cursors_are_pruned() {
        let mut list = list_of("ab");
        let kept = list.cursor(0).unwrap();
        {
            let _dropped = list.cursor(1).unwrap();
            assert_eq!(list.live_cursors(), 2);
        }
        assert_eq!(list.live_cursors(), 1);
        list.push_back('c');
        assert_eq!(list.hooks_mut().cursors.len(), 1);
        drop(kept);
        assert_eq!(list.live_cursors(), 0);
    }
}
