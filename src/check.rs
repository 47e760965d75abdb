//! Order verification (`-c`)
//!
//! Lines are checked exactly as given: no trimming, reversing or
//! deduplication. Each line must sort strictly after its predecessor, so two
//! adjacent lines with equal keys count as a disorder.

use crate::compare::Comparator;
use crate::config::SortConfig;
use itertools::Itertools;

/// Index of the first line that does not sort strictly after the one before it
pub fn first_disorder<S: AsRef<str>>(lines: &[S], config: &SortConfig) -> Option<usize> {
    let comparator = Comparator::new(config);
    lines
        .iter()
        .tuple_windows()
        .position(|(prev, cur)| !comparator.less(prev.as_ref(), cur.as_ref()))
        .map(|pair| pair + 1)
}

/// True when every adjacent pair is in strictly ascending order
pub fn is_sorted<S: AsRef<str>>(lines: &[S], config: &SortConfig) -> bool {
    first_disorder(lines, config).is_none()
}
