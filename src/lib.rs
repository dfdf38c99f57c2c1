//! Ringtree - positional lists whose cursors survive concurrent edits.
//!
//! Two engines share the [`Sequence`] contract:
//!
//! - [`LinkedList`]: a doubly-linked list over a sentinel ring. Its
//!   [`ListIter`](linked::ListIter) is fail-fast. The [`CursorableList`]
//!   flavour additionally hands out [`Cursor`]s, which are told about every
//!   insertion and removal and repair their own position.
//! - [`TreeList`]: an AVL tree keyed by position with threaded in-order
//!   links, for O(log n) access anywhere in a long list.
//!
//! # Quick Start
//!
//! ```
//! use ringtree::{CursorableList, Error, TreeList};
//!
//! let mut list: CursorableList<&str> = ["a", "b", "c"].into_iter().collect();
//! let mut cursor = list.cursor(0).unwrap();
//! assert_eq!(cursor.next(&list), Ok(&"a"));
//!
//! // remove "b" behind the cursor's back
//! list.remove(1).unwrap();
//! assert_eq!(cursor.next(&list), Ok(&"c"));
//! assert_eq!(cursor.next(&list), Err(Error::NoSuchElement));
//! cursor.close(&mut list);
//!
//! let mut tree: TreeList<u32> = (0..1000).collect();
//! assert_eq!(tree.remove(500), Ok(500));
//! assert_eq!(tree.get(500), Ok(&501));
//! ```

pub mod error;
pub mod index_tree;
pub mod linked;
pub mod sequence;
mod serialize;

pub use error::{Error, Result};
pub use index_tree::TreeList;
pub use linked::{Cursor, CursorableList, LinkedList};
pub use sequence::Sequence;
