//! Property tests for the sorting engine.

use keyed_sort::{check, sort_in_memory, sort_lines, ExternalSort, SortConfig, SortMode};
use proptest::prelude::*;

fn mode_strategy() -> impl Strategy<Value = SortMode> {
    prop_oneof![
        Just(SortMode::Lexicographic),
        Just(SortMode::Numeric),
        Just(SortMode::Month),
        Just(SortMode::HumanNumeric),
    ]
}

/// Lines mixing numbers, sizes, month names and free text, some with columns
fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "-?[0-9]{1,4}(\\.[0-9]{1,2})?",
        "[0-9]{1,3}[kKmMgG]?i?[bB]?",
        "(jan|Feb|MAR|april|may|dec|xyz)",
        "[a-c ]{0,4}",
        "[a-z0-9]{0,3}\t[0-9a-z]{0,3}( |\t)?",
    ]
}

fn config_strategy() -> impl Strategy<Value = SortConfig> {
    (mode_strategy(), 0usize..3, any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(mode, column, reverse, unique, trim)| {
            SortConfig::default()
                .with_mode(mode)
                .with_key_column(column)
                .with_reverse(reverse)
                .with_unique(unique)
                .with_trim_trailing(trim)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn external_merge_matches_in_memory(
        lines in prop::collection::vec(line_strategy(), 0..40),
        config in config_strategy(),
        chunk_size in 1usize..8,
    ) {
        let expected = sort_in_memory(&lines, &config);
        let config = config.with_chunk_size(chunk_size);
        let merged = ExternalSort::new(&config)
            .and_then(|sorter| sorter.sort(lines.clone()))
            .expect("external sort succeeds");
        prop_assert_eq!(merged, expected);
    }

    #[test]
    fn dispatcher_matches_in_memory_at_any_threshold(
        lines in prop::collection::vec(line_strategy(), 0..40),
        config in config_strategy(),
        chunk_size in 1usize..48,
    ) {
        let expected = sort_in_memory(&lines, &config);
        let config = config.with_chunk_size(chunk_size);
        let sorted = sort_lines(lines.into_iter(), &config).expect("sort succeeds");
        prop_assert_eq!(sorted, expected);
    }

    #[test]
    fn sorting_twice_changes_nothing(
        lines in prop::collection::vec(line_strategy(), 0..40),
        mode in mode_strategy(),
        column in 0usize..3,
    ) {
        let config = SortConfig::default().with_mode(mode).with_key_column(column);
        let once = sort_in_memory(&lines, &config);
        prop_assert_eq!(sort_in_memory(&once, &config), once);
    }

    #[test]
    fn sorted_unique_output_passes_check_unless_keys_tie(
        lines in prop::collection::vec(line_strategy(), 0..40),
        mode in mode_strategy(),
    ) {
        let config = SortConfig::default().with_mode(mode).with_unique(true);
        let sorted = sort_in_memory(&lines, &config);
        match check::first_disorder(sorted.as_slice(), &config) {
            None => {}
            // Only distinct lines with equal keys may trip the strict check
            Some(index) => prop_assert_eq!(
                keyed_sort::Comparator::new(&config).compare(&sorted[index - 1], &sorted[index]),
                std::cmp::Ordering::Equal
            ),
        }
    }
}
