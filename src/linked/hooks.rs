use super::ring::{NodeId, Ring};

/// Side effects attached to the two structural primitives of a
/// [`LinkedList`](super::LinkedList) and to value replacement.
///
/// The list applies the change to the ring first and then calls the hook,
/// so a hook always sees the post-mutation ring. A removed node is reported
/// while it still remembers its old neighbours; its slot is released only
/// after the hook returns.
pub trait LinkHooks<T> {
    fn node_inserted(&mut self, ring: &Ring<T>, node: NodeId);

    fn node_removed(&mut self, ring: &Ring<T>, node: NodeId);

    fn node_changed(&mut self, ring: &Ring<T>, node: NodeId);

    /// Whether `clear` may drop the whole ring in one step. Hooks that need
    /// to observe every removal return `false`, and the list then removes
    /// nodes one by one.
    fn allows_bulk_clear(&self) -> bool;
}

/// No side effects; `clear` is O(1).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Plain;

impl<T> LinkHooks<T> for Plain {
    #[inline(always)]
    fn node_inserted(&mut self, _ring: &Ring<T>, _node: NodeId) {}

    #[inline(always)]
    fn node_removed(&mut self, _ring: &Ring<T>, _node: NodeId) {}

    #[inline(always)]
    fn node_changed(&mut self, _ring: &Ring<T>, _node: NodeId) {}

    #[inline(always)]
    fn allows_bulk_clear(&self) -> bool {
        return true;
    }
}
