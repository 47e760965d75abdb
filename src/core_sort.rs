use crate::check;
use crate::compare::Comparator;
use crate::config::{SortConfig, SortOrder};
use crate::error::SortResult;
use crate::external_sort::ExternalSort;
use log::debug;
use rayon::prelude::*;

/// Batches at least this large use the parallel stable sort when enabled
const PARALLEL_THRESHOLD: usize = 10_000;

/// Core sort entry point: picks in-memory or external sorting by input size
pub struct CoreSort {
    config: SortConfig,
}

impl CoreSort {
    pub fn new(config: SortConfig) -> Self {
        Self { config }
    }

    /// Sort `input` according to the configuration.
    ///
    /// At most `chunk_size + 1` lines are pulled before the engine is chosen.
    /// Longer inputs are streamed into the external merge path, which spills
    /// each chunk as it fills; both paths produce identical output.
    pub fn sort<I>(&self, input: I) -> SortResult<Vec<String>>
    where
        I: IntoIterator<Item = String>,
    {
        let mut input = input.into_iter();
        let head: Vec<String> = input
            .by_ref()
            .take(self.config.chunk_size.saturating_add(1))
            .collect();

        if !self.config.needs_external_sort(head.len()) {
            return Ok(sort_owned(head, &self.config));
        }

        debug!(
            "input exceeds chunk size {}, using external merge sort",
            self.config.chunk_size
        );
        let external = ExternalSort::new(&self.config)?;
        external.sort(head.into_iter().chain(input))
    }

    /// Check whether `lines` is already strictly ascending
    pub fn is_sorted(&self, lines: &[String]) -> bool {
        check::is_sorted(lines, &self.config)
    }

    /// Index of the first line that breaks ascending order, if any
    pub fn first_disorder(&self, lines: &[String]) -> Option<usize> {
        check::first_disorder(lines, &self.config)
    }
}

/// Sort a complete batch of lines in memory.
///
/// Works on a private copy: trailing blanks are trimmed if requested, the copy
/// is stable-sorted, then reversed and deduplicated as configured.
pub fn sort_in_memory(lines: &[String], config: &SortConfig) -> Vec<String> {
    sort_owned(lines.to_vec(), config)
}

fn sort_owned(mut working: Vec<String>, config: &SortConfig) -> Vec<String> {
    if config.trim_trailing {
        working.iter_mut().for_each(trim_trailing_blanks);
    }

    debug!(
        "sorting {} lines in memory (mode={}, column={})",
        working.len(),
        config.mode,
        config.key_column
    );

    sort_stable(&mut working, config);
    finish(working, config)
}

/// Stable sort with the configured comparator.
///
/// Lines whose keys compare equal keep their relative input order.
pub(crate) fn sort_stable(lines: &mut [String], config: &SortConfig) {
    let comparator = Comparator::new(config);

    if config.parallel && lines.len() >= PARALLEL_THRESHOLD {
        lines.par_sort_by(|a, b| comparator.compare(a, b));
    } else {
        lines.sort_by(|a, b| comparator.compare(a, b));
    }
}

/// Apply reverse and unique to a fully ordered sequence.
///
/// Reversal happens after the stable sort, so equal keys appear in reverse
/// input order. Unique drops adjacent byte-identical lines only.
pub(crate) fn finish(mut lines: Vec<String>, config: &SortConfig) -> Vec<String> {
    if config.sort_order() == SortOrder::Descending {
        lines.reverse();
    }

    if config.unique {
        let before = lines.len();
        lines.dedup();
        debug!("unique removed {} duplicate lines", before - lines.len());
    }

    lines
}

/// Strip trailing spaces and tabs in place
pub(crate) fn trim_trailing_blanks(line: &mut String) {
    let keep = line.trim_end_matches(|c: char| c == ' ' || c == '\t').len();
    line.truncate(keep);
}
