//! AFL fuzz harness for cursor repair
//!
//! Replays byte-encoded edits against a `CursorableList` and a plain `Vec`
//! model. Edits arrive both directly and through a handful of live cursors.
//! After every step the list must match the model, cursors must only ever
//! return elements still in the list, and their reported indices must stay
//! in range.

use afl::fuzz;
use ringtree::{Cursor, CursorableList, Error};

const NUM_CURSORS: usize = 3;

/// Operation types the fuzzer can generate
#[derive(Debug, Clone, Copy)]
enum FuzzOp {
    /// Insert directly into the list
    Insert { pos_frac: u8 },
    /// Remove directly from the list
    Remove { pos_frac: u8 },
    /// Replace directly in the list
    Set { pos_frac: u8 },
    /// Step a cursor forward
    Next { cursor: u8 },
    /// Step a cursor backward
    Previous { cursor: u8 },
    /// Remove through a cursor
    CursorRemove { cursor: u8 },
    /// Insert through a cursor
    CursorAdd { cursor: u8 },
    /// Close a cursor and open a fresh one at `pos_frac`
    Reopen { cursor: u8, pos_frac: u8 },
}

impl FuzzOp {
    fn from_bytes(bytes: &[u8]) -> Option<(FuzzOp, &[u8])> {
        if bytes.is_empty() {
            return None;
        }

        let op_type = bytes[0] % 8;
        let rest = &bytes[1..];
        let cursor = |b: u8| b % NUM_CURSORS as u8;

        match op_type {
            0 if !rest.is_empty() => Some((FuzzOp::Insert { pos_frac: rest[0] }, &rest[1..])),
            1 if !rest.is_empty() => Some((FuzzOp::Remove { pos_frac: rest[0] }, &rest[1..])),
            2 if !rest.is_empty() => Some((FuzzOp::Set { pos_frac: rest[0] }, &rest[1..])),
            3 if !rest.is_empty() => Some((FuzzOp::Next { cursor: cursor(rest[0]) }, &rest[1..])),
            4 if !rest.is_empty() => Some((FuzzOp::Previous { cursor: cursor(rest[0]) }, &rest[1..])),
            5 if !rest.is_empty() => Some((FuzzOp::CursorRemove { cursor: cursor(rest[0]) }, &rest[1..])),
            6 if !rest.is_empty() => Some((FuzzOp::CursorAdd { cursor: cursor(rest[0]) }, &rest[1..])),
            7 if rest.len() >= 2 => {
                let op = FuzzOp::Reopen {
                    cursor: cursor(rest[0]),
                    pos_frac: rest[1],
                };
                Some((op, &rest[2..]))
            }
            _ => None,
        }
    }
}

/// Scales a byte onto `0..=len` (or `0..len` when `inclusive` is false).
fn scaled(frac: u8, len: usize, inclusive: bool) -> usize {
    let span = if inclusive { len + 1 } else { len };
    return (frac as usize * span) / 256;
}

fn main() {
    fuzz!(|data: &[u8]| {
        let mut list: CursorableList<u32> = CursorableList::default();
        let mut model: Vec<u32> = Vec::new();
        // every inserted value is unique, so values identify positions
        let mut counter: u32 = 0;
        let mut fresh = || {
            counter += 1;
            counter
        };

        let mut cursors: Vec<Cursor> = (0..NUM_CURSORS)
            .map(|_| list.cursor(0).expect("empty list accepts a cursor at 0"))
            .collect();
        let mut remaining = data;

        while let Some((op, rest)) = FuzzOp::from_bytes(remaining) {
            remaining = rest;

            match op {
                FuzzOp::Insert { pos_frac } => {
                    let at = scaled(pos_frac, model.len(), true);
                    let value = fresh();
                    list.insert(at, value).expect("insert in range");
                    model.insert(at, value);
                }

                FuzzOp::Remove { pos_frac } => {
                    if !model.is_empty() {
                        let at = scaled(pos_frac, model.len(), false);
                        assert_eq!(list.remove(at), Ok(model.remove(at)));
                    }
                }

                FuzzOp::Set { pos_frac } => {
                    if !model.is_empty() {
                        let at = scaled(pos_frac, model.len(), false);
                        let value = fresh();
                        assert_eq!(list.set(at, value), Ok(model[at]));
                        model[at] = value;
                    }
                }

                FuzzOp::Next { cursor } => {
                    match cursors[cursor as usize].next(&list) {
                        Ok(value) => assert!(model.contains(value), "next returned a stale value"),
                        Err(e) => assert_eq!(e, Error::NoSuchElement),
                    }
                }

                FuzzOp::Previous { cursor } => {
                    match cursors[cursor as usize].previous(&list) {
                        Ok(value) => assert!(model.contains(value), "previous returned a stale value"),
                        Err(e) => assert_eq!(e, Error::NoSuchElement),
                    }
                }

                FuzzOp::CursorRemove { cursor } => {
                    match cursors[cursor as usize].remove(&mut list) {
                        Ok(Some(value)) => {
                            let at = model.iter().position(|v| *v == value).expect("removed value was present");
                            model.remove(at);
                        }
                        Ok(None) => {}
                        Err(e) => assert_eq!(e, Error::IllegalState),
                    }
                }

                FuzzOp::CursorAdd { cursor } => {
                    let value = fresh();
                    cursors[cursor as usize].add(&mut list, value).expect("open cursor accepts add");
                    // a cursor's cached index may lag its node, so locate the insert by value
                    let at = list.iter().position(|v| *v == value).expect("added value is present");
                    model.insert(at, value);
                }

                FuzzOp::Reopen { cursor, pos_frac } => {
                    cursors[cursor as usize].close(&mut list);
                    let at = scaled(pos_frac, model.len(), true);
                    cursors[cursor as usize] = list.cursor(at).expect("cursor start in range");
                }
            }

            // CRITICAL INVARIANT: list and model agree
            assert_eq!(list.len(), model.len(), "Length mismatch");
            assert!(list.iter().eq(model.iter()), "Content mismatch");
            assert_eq!(list.live_cursors(), NUM_CURSORS);
            for c in &cursors {
                let at = c.next_index(&list).expect("open cursor");
                assert!(at <= model.len(), "cursor index {} past end {}", at, model.len());
            }
        }
    });
}
