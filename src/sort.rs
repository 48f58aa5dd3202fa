//! Ordering of ranked records.
//!
//! Provides the comparator used by [`crate::ranking::rank`]:
//! score (descending), match position (ascending, missing last), normalized
//! name length (ascending), then load order.

use std::cmp::Ordering;

use crate::ranking::RankedRecord;

/// Compare optional match positions: earlier first, `None` after any `Some`.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use pricesearch::sort::compare_positions;
///
/// assert_eq!(compare_positions(Some(0), Some(4)), Ordering::Less);
/// assert_eq!(compare_positions(Some(9), None), Ordering::Less);
/// assert_eq!(compare_positions(None, None), Ordering::Equal);
/// ```
pub fn compare_positions(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Four-level comparator for ranked records.
///
/// 1. **Higher total score wins.**
/// 2. **Earlier match position wins**; records where the first token has no
///    position sort last within their score group.
/// 3. **Shorter normalized name wins.**
/// 4. **Earlier load order wins**, which makes the order total.
///
/// # Returns
///
/// [`Ordering`] suitable for [`slice::sort_by`]; `Less` means `a` is shown
/// before `b`.
pub fn compare_ranked(a: &RankedRecord<'_>, b: &RankedRecord<'_>) -> Ordering {
    b.score
        .total
        .cmp(&a.score.total)
        .then_with(|| compare_positions(a.score.position, b.score.position))
        .then_with(|| {
            let a_len = a.record.normalized_name().chars().count();
            let b_len = b.record.normalized_name().chars().count();
            a_len.cmp(&b_len)
        })
        .then_with(|| a.index.cmp(&b.index))
}
