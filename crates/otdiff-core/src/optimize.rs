//! Clean-up pass for flat operation lists.
//!
//! The shifted list walk can emit an insert at index `i` immediately
//! followed by a delete of the same value at `i + 1`. Applied in order the
//! two cancel, so both payloads are stripped and records that end up with
//! nothing but a path are dropped.
//!
//! Only adjacent pairs are examined. A matching pair separated by an
//! unrelated operation survives.

use otdiff_types::json_equal;

use crate::encoding::FlatOp;

/// Strip adjacent insert/delete pairs of equal values and drop empty records.
pub fn cancel_adjacent(mut ops: Vec<FlatOp>) -> Vec<FlatOp> {
    for i in 1..ops.len() {
        let (head, tail) = ops.split_at_mut(i);
        let (a, b) = (&mut head[i - 1], &mut tail[0]);
        if cancels(a, b) {
            a.li = None;
            b.ld = None;
        }
    }
    ops.retain(|op| !op.is_noop());
    ops
}

fn cancels(a: &FlatOp, b: &FlatOp) -> bool {
    if !a.p.is_sibling_of(&b.p) {
        return false;
    }
    match (a.p.last_index(), b.p.last_index()) {
        (Some(x), Some(y)) if x + 1 == y => {}
        _ => return false,
    }
    match (&a.li, &b.ld) {
        (Some(inserted), Some(deleted)) => json_equal(inserted, deleted),
        _ => false,
    }
}
