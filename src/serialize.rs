//! Serde support for both list types.
//!
//! A list is written as a sequence that announces its length up front,
//! followed by the elements in order. Reading appends elements in the
//! order they arrive, so a round trip reproduces the list exactly.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::index_tree::TreeList;
use crate::linked::{LinkHooks, LinkedList};

fn serialize_items<'a, T, I, S>(len: usize, items: I, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(len))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    return seq.end();
}

impl<T: Serialize, H: LinkHooks<T>> Serialize for LinkedList<T, H> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        return serialize_items(self.len(), self.iter(), serializer);
    }
}

impl<T: Serialize> Serialize for TreeList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        return serialize_items(self.len(), self.iter(), serializer);
    }
}

/// Fills any default-constructible, extendable list from a sequence.
struct AppendVisitor<L, T> {
    expecting: &'static str,
    marker: PhantomData<fn() -> (L, T)>,
}

impl<'de, L, T> Visitor<'de> for AppendVisitor<L, T>
where
    L: Default + Extend<T>,
    T: Deserialize<'de>,
{
    type Value = L;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        return formatter.write_str(self.expecting);
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<L, A::Error> {
        let mut list = L::default();
        while let Some(item) = seq.next_element::<T>()? {
            list.extend(Some(item));
        }
        return Ok(list);
    }
}

impl<'de, T, H> Deserialize<'de> for LinkedList<T, H>
where
    T: Deserialize<'de>,
    H: LinkHooks<T> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        return deserializer.deserialize_seq(AppendVisitor::<Self, T> {
            expecting: "a sequence of list elements",
            marker: PhantomData,
        });
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for TreeList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        return deserializer.deserialize_seq(AppendVisitor::<Self, T> {
            expecting: "a sequence of tree list elements",
            marker: PhantomData,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linked::CursorableList;

    #[test]
    fn linked_list_as_json_array() {
        let list: LinkedList<u32> = [3, 1, 2].into_iter().collect();
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, "[3,1,2]");
        let back: LinkedList<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn cursorable_list_reads_without_cursors() {
        let mut list: CursorableList<String> = CursorableList::default();
        list.push_back("x".to_string());
        let _cursor = list.cursor(0).unwrap();
        let json = serde_json::to_string(&list).unwrap();
        let back: CursorableList<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
        assert_eq!(back.live_cursors(), 0);
    }

    #[test]
    fn tree_list_round_trip() {
        let tree: TreeList<i64> = (-50..50).collect();
        let json = serde_json::to_string(&tree).unwrap();
        let back: TreeList<i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
        back.validate().unwrap();
    }

    #[test]
    fn rejects_non_sequences() {
        let result: Result<TreeList<u8>, _> = serde_json::from_str("{\"a\":1}");
        assert!(result.is_err());
    }
}
