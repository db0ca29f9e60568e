//! Locale-independent ordering helpers shared by suggestion and analytics
//! sorting.

use std::cmp::Ordering;

/// Case-insensitive comparison with a deterministic byte-order fallback for
/// strings that only differ in case ("alice" sorts before "Alice" never
/// flip-flops between runs).
pub fn compare_ci(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
