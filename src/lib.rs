//! Line sorting engine
//!
//! Orders text lines by a whole-line or column key under one of four
//! comparison modes (lexical, numeric, month name, human-readable size),
//! with optional reverse and unique post-processing, an order checker, and an
//! external merge sort for inputs larger than the in-memory chunk size.
//!
//! The library never prints or exits; see the `sort` binary for the
//! command-line front end.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

pub mod config;
pub mod error;

// Comparison and ordering
pub mod check;
pub mod compare;
pub mod core_sort;
pub mod external_sort;
pub mod key;

pub mod input;

// Re-export commonly used types
pub use compare::Comparator;
pub use config::{SortConfig, SortConfigBuilder, SortMode, SortOrder};
pub use core_sort::{sort_in_memory, CoreSort};
pub use error::{SortError, SortResult};
pub use external_sort::ExternalSort;

/// Exit codes matching GNU sort
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const SORT_FAILURE: i32 = 2;

/// Sort `lines` according to `config`, spilling to disk above the chunk size
pub fn sort_lines<I>(lines: I, config: &SortConfig) -> SortResult<Vec<String>>
where
    I: IntoIterator<Item = String>,
{
    CoreSort::new(config.clone()).sort(lines)
}
