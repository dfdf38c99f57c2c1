//! Serialization round trips through serde_json.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};

use ringtree::{CursorableList, LinkedList, TreeList};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Document {
    title: String,
    lines: TreeList<String>,
    history: LinkedList<u64>,
}

#[test]
fn nested_lists_round_trip() {
    let doc = Document {
        title: "notes".to_string(),
        lines: ["first", "second", "third"].iter().map(|s| s.to_string()).collect(),
        history: [3, 2, 1].into_iter().collect(),
    };
    let json = serde_json::to_string(&doc).unwrap();
    assert_eq!(
        json,
        r#"{"title":"notes","lines":["first","second","third"],"history":[3,2,1]}"#
    );
    let back: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
    back.lines.validate().unwrap();
}

#[test]
fn empty_lists_round_trip() {
    let tree: TreeList<u8> = TreeList::new();
    let json = serde_json::to_string(&tree).unwrap();
    assert_eq!(json, "[]");
    let back: TreeList<u8> = serde_json::from_str(&json).unwrap();
    assert!(back.is_empty());
}

#[test]
fn edited_cursorable_list_round_trips() {
    let mut list: CursorableList<i32> = (0..10).collect();
    let mut cursor = list.cursor(0).unwrap();
    while let Ok(value) = cursor.next(&list) {
        if value % 3 == 0 {
            cursor.remove(&mut list).unwrap();
        }
    }
    cursor.close(&mut list);
    let json = serde_json::to_vec(&list).unwrap();
    let back: CursorableList<i32> = serde_json::from_slice(&json).unwrap();
    assert_eq!(back.to_vec(), vec![1, 2, 4, 5, 7, 8]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn any_list_round_trips(items in prop::collection::vec(any::<i64>(), 0..200)) {
        let list: LinkedList<i64> = items.iter().copied().collect();
        let tree: TreeList<i64> = items.iter().copied().collect();

        let list_back: LinkedList<i64> = serde_json::from_str(&serde_json::to_string(&list).unwrap()).unwrap();
        let tree_back: TreeList<i64> = serde_json::from_str(&serde_json::to_string(&tree).unwrap()).unwrap();

        prop_assert_eq!(list_back.to_vec(), items.clone());
        prop_assert_eq!(tree_back.to_vec(), items);
        prop_assert_eq!(tree_back.validate(), Ok(()));
    }
}
