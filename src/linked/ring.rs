//! Circular doubly-linked node storage.
//!
//! Nodes live in a `Vec` and refer to their neighbours by index, so the
//! cycle never needs shared ownership. Slot 0 holds the sentinel: it carries
//! no value and sits between the last and the first element. An empty ring
//! is the sentinel linked to itself in both directions.
//!
//! Removed slots go onto a free list and are reused by the next insertion.

/// Index of a node slot in the ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline(always)]
    fn index(self) -> usize {
        return self.0 as usize;
    }

    /// Names slot `index`. Panics once the arena outgrows `u32` ids.
    fn from_index(index: usize) -> NodeId {
        match u32::try_from(index) {
            Ok(id) => return NodeId(id),
            Err(_) => panic!("arena full: slot {index} has no node id"),
        }
    }
}

/// The sentinel slot, marking both ends of the ring.
pub const SENTINEL: NodeId = NodeId(0);

#[derive(Clone, Debug)]
struct Node<T> {
    /// `None` for the sentinel and for vacant slots.
    value: Option<T>,
    prev: NodeId,
    next: NodeId,
}

#[derive(Clone, Debug)]
pub struct Ring<T> {
    nodes: Vec<Node<T>>,
    /// Vacant slots, reused before the vector grows.
    free: Vec<NodeId>,
    len: usize,
}

impl<T> Ring<T> {
    pub fn new() -> Ring<T> {
        return Ring::with_capacity(0);
    }

    pub fn with_capacity(capacity: usize) -> Ring<T> {
        let mut nodes = Vec::with_capacity(capacity + 1);
        nodes.push(Node {
            value: None,
            prev: SENTINEL,
            next: SENTINEL,
        });
        return Ring {
            nodes,
            free: Vec::new(),
            len: 0,
        };
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        return self.len;
    }

    /// Allocated slots, the sentinel and vacant slots included.
    pub fn slots(&self) -> usize {
        return self.nodes.len();
    }

    #[inline(always)]
    pub fn next(&self, node: NodeId) -> NodeId {
        return self.nodes[node.index()].next;
    }

    #[inline(always)]
    pub fn prev(&self, node: NodeId) -> NodeId {
        return self.nodes[node.index()].prev;
    }

    #[inline(always)]
    pub fn first(&self) -> NodeId {
        return self.next(SENTINEL);
    }

    #[inline(always)]
    pub fn last(&self) -> NodeId {
        return self.prev(SENTINEL);
    }

    /// Value held by a linked node.
    ///
    /// Panics on the sentinel or a vacant slot.
    pub fn value(&self, node: NodeId) -> &T {
        match &self.nodes[node.index()].value {
            Some(value) => value,
            None => panic!("node {node:?} holds no value"),
        }
    }

    pub fn value_mut(&mut self, node: NodeId) -> &mut T {
        match &mut self.nodes[node.index()].value {
            Some(value) => value,
            None => panic!("node {node:?} holds no value"),
        }
    }

    /// Resolves an index to a node, walking from whichever end is closer.
    ///
    /// Indices below `len / 2` walk forward from the first node; the rest
    /// walk backward from the sentinel, so no lookup takes more than
    /// `len / 2` steps. `index == len` resolves to the sentinel, which is
    /// the insertion point for appends. The caller checks the bounds.
    pub fn node_at(&self, index: usize) -> NodeId {
        debug_assert!(index <= self.len);
        if index < self.len / 2 {
            let mut node = self.first();
            for _ in 0..index {
                node = self.next(node);
            }
            return node;
        }
        let mut node = SENTINEL;
        for _ in index..self.len {
            node = self.prev(node);
        }
        return node;
    }

    /// Position of `node`, counted from the first node. The sentinel
    /// reports `len`.
    pub fn position_of(&self, node: NodeId) -> usize {
        if node == SENTINEL {
            return self.len;
        }
        let mut position = 0;
        let mut walk = self.first();
        while walk != node {
            debug_assert!(walk != SENTINEL, "node {node:?} is not linked");
            position += 1;
            walk = self.next(walk);
        }
        return position;
    }

    /// Allocates a node and splices it in immediately before `before`.
    pub fn insert_before(&mut self, before: NodeId, value: T) -> NodeId {
        let prev = self.prev(before);
        let node = Node {
            value: Some(value),
            prev,
            next: before,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = node;
                id
            }
            None => {
                let id = NodeId::from_index(self.nodes.len());
                self.nodes.push(node);
                id
            }
        };
        self.nodes[prev.index()].next = id;
        self.nodes[before.index()].prev = id;
        self.len += 1;
        return id;
    }

    /// Splices `node` out of the ring by relinking its neighbours.
    ///
    /// The node keeps its own `prev`/`next` links until [`Ring::release`],
    /// so observers can still see where it used to be.
    pub fn unlink(&mut self, node: NodeId) {
        debug_assert!(node != SENTINEL);
        let prev = self.prev(node);
        let next = self.next(node);
        self.nodes[prev.index()].next = next;
        self.nodes[next.index()].prev = prev;
        self.len -= 1;
    }

    /// Returns an unlinked node's slot to the free list, yielding its value.
    pub fn release(&mut self, node: NodeId) -> T {
        let slot = &mut self.nodes[node.index()];
        let value = match slot.value.take() {
            Some(value) => value,
            None => panic!("node {node:?} released twice"),
        };
        slot.prev = SENTINEL;
        slot.next = SENTINEL;
        self.free.push(node);
        return value;
    }

    /// Gives back the vacant slots at the end of the arena.
    ///
    /// Linked nodes never move, so ids held elsewhere stay valid. An empty
    /// ring shrinks to the sentinel alone.
    pub fn shrink_to_fit(&mut self) {
        while self.nodes.len() > 1 && self.nodes[self.nodes.len() - 1].value.is_none() {
            self.nodes.pop();
        }
        let slots = self.nodes.len();
        self.free.retain(|id| id.index() < slots);
        self.nodes.shrink_to_fit();
        self.free.shrink_to_fit();
    }

    /// Drops every value and resets to the sentinel-only state.
    pub fn reset(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0].prev = SENTINEL;
        self.nodes[0].next = SENTINEL;
        self.free.clear();
        self.len = 0;
    }
}

impl<T> Default for Ring<T> {
    fn default() -> Self {
        return Ring::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(ring: &Ring<char>) -> Vec<char> {
        let mut out = Vec::new();
        let mut node = ring.first();
        while node != SENTINEL {
            out.push(*ring.value(node));
            node = ring.next(node);
        }
        return out;
    }

    #[test]
    fn empty_ring_is_self_linked() {
        let ring: Ring<char> = Ring::new();
        assert_eq!(ring.first(), SENTINEL);
        assert_eq!(ring.last(), SENTINEL);
        assert_eq!(ring.node_at(0), SENTINEL);
    }

    #[test]
    fn insert_and_unlink() {
        let mut ring = Ring::new();
        let a = ring.insert_before(SENTINEL, 'a');
        let c = ring.insert_before(SENTINEL, 'c');
        let b = ring.insert_before(c, 'b');
        assert_eq!(values(&ring), vec!['a', 'b', 'c']);

        ring.unlink(b);
        // unlinked node still remembers its neighbours
        assert_eq!(ring.prev(b), a);
        assert_eq!(ring.next(b), c);
        assert_eq!(ring.release(b), 'b');
        assert_eq!(values(&ring), vec!['a', 'c']);
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn released_slots_are_reused() {
        let mut ring = Ring::new();
        let a = ring.insert_before(SENTINEL, 'a');
        ring.unlink(a);
        ring.release(a);
        let b = ring.insert_before(SENTINEL, 'b');
        assert_eq!(a, b);
        assert_eq!(values(&ring), vec!['b']);
    }

    #[test]
    fn ring_closes_after_len_plus_one_steps() {
        let mut ring = Ring::new();
        for c in "abcde".chars() {
            ring.insert_before(SENTINEL, c);
        }
        let start = ring.node_at(2);
        let mut node = start;
        for _ in 0..ring.len() + 1 {
            node = ring.next(node);
        }
        assert_eq!(node, start);
    }

    #[test]
    fn node_at_walks_from_both_ends() {
        let mut ring = Ring::new();
        for c in "abcdefg".chars() {
            ring.insert_before(SENTINEL, c);
        }
        for (i, c) in "abcdefg".chars().enumerate() {
            assert_eq!(*ring.value(ring.node_at(i)), c);
            assert_eq!(ring.position_of(ring.node_at(i)), i);
        }
        assert_eq!(ring.node_at(7), SENTINEL);
        assert_eq!(ring.position_of(SENTINEL), 7);
    }

    #[test]
    fn shrink_keeps_linked_nodes_in_place() {
        let mut ring = Ring::new();
        let ids: Vec<NodeId> = "abcdef".chars().map(|c| ring.insert_before(SENTINEL, c)).collect();
        for &id in &ids[3..] {
            ring.unlink(id);
            ring.release(id);
        }
        ring.unlink(ids[1]);
        ring.release(ids[1]);
        assert_eq!(ring.slots(), 7);

        ring.shrink_to_fit();
        // the hole at `b` is below a linked node and stays
        assert_eq!(ring.slots(), 4);
        assert_eq!(values(&ring), vec!['a', 'c']);
        assert_eq!(ring.node_at(1), ids[2]);
        assert_eq!(ring.insert_before(SENTINEL, 'x'), ids[1]);
        assert_eq!(ring.insert_before(SENTINEL, 'y'), NodeId(4));
        assert_eq!(values(&ring), vec!['a', 'c', 'x', 'y']);
    }

    #[test]
    fn emptied_ring_shrinks_to_the_sentinel() {
        let mut ring = Ring::with_capacity(64);
        for c in "abc".chars() {
            ring.insert_before(SENTINEL, c);
        }
        while ring.len() > 0 {
            let first = ring.first();
            ring.unlink(first);
            ring.release(first);
        }
        ring.shrink_to_fit();
        assert_eq!(ring.slots(), 1);
        assert!(ring.free.is_empty());
        assert_eq!(ring.first(), SENTINEL);
        ring.insert_before(SENTINEL, 'z');
        assert_eq!(values(&ring), vec!['z']);
    }

    #[test]
    fn last_representable_slot_has_an_id() {
        assert_eq!(NodeId::from_index(u32::MAX as usize), NodeId(u32::MAX));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "arena full")]
    fn slot_ids_do_not_wrap() {
        NodeId::from_index(u32::MAX as usize + 1);
    }

    #[test]
    fn reset_empties() {
        let mut ring = Ring::new();
        ring.insert_before(SENTINEL, 'x');
        ring.reset();
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.first(), SENTINEL);
    }
}
