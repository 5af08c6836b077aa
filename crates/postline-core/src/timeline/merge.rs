//! Priority merge of two creation-ordered sequences.

use std::collections::HashSet;

use crate::domain::Key;
use crate::ports::{Order, Record};

/// Returns true when `a` sorts strictly before `b` under `order`.
fn precedes<T: Record>(order: Order, a: &T, b: &T) -> bool {
    match order {
        Order::CreationAsc => a.creation() < b.creation(),
        Order::CreationDesc => a.creation() > b.creation(),
    }
}

fn same_key<T: Record>(a: &T, b: &T) -> bool {
    matches!((a.key(), b.key()), (Some(x), Some(y)) if x == y)
}

/// Merge `priority` and `other` into one sequence of at most `limit` records.
///
/// Precondition: both inputs are sorted by creation time in the direction of
/// `order`. This is not checked; unsorted input yields a result that is out of
/// order, but never panics.
///
/// When both heads carry the same key, the `priority` record is emitted and
/// both heads are consumed. Otherwise the head that sorts first is emitted,
/// with ties going to `priority`. A key already emitted is never emitted again,
/// so records sharing a creation time may arrive in any order.
pub fn merge_sorted<T: Record>(
    priority: Vec<T>,
    other: Vec<T>,
    order: Order,
    limit: Option<usize>,
) -> Vec<T> {
    let bound = limit.unwrap_or(usize::MAX);
    let mut merged = Vec::with_capacity(bound.min(priority.len() + other.len()));
    let mut a = priority.into_iter().peekable();
    let mut b = other.into_iter().peekable();
    let mut seen: HashSet<Key> = HashSet::new();

    while merged.len() < bound {
        let next = match (a.peek(), b.peek()) {
            (None, None) => break,
            (Some(_), None) => a.next(),
            (None, Some(_)) => b.next(),
            (Some(x), Some(y)) if same_key(x, y) => {
                b.next();
                a.next()
            }
            (Some(x), Some(y)) if precedes(order, y, x) => b.next(),
            (Some(_), Some(_)) => a.next(),
        };
        let Some(record) = next else { break };
        if let Some(key) = record.key() {
            if !seen.insert(key.clone()) {
                continue;
            }
        }
        merged.push(record);
    }

    merged
}
