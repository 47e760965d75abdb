//! Sort key extraction
//!
//! A key is the part of a line the comparator looks at: either the whole line
//! or a single separator-delimited column, trimmed of surrounding whitespace.

use crate::config::SortConfig;

/// Extract the comparison key for `line`.
///
/// Column 0 returns the line untouched. Any other column is 1-based; a line
/// with too few fields yields an empty key rather than an error.
#[inline]
pub fn extract<'a>(line: &'a str, config: &SortConfig) -> &'a str {
    if config.key_column == 0 {
        return line;
    }

    line.split(config.field_separator)
        .nth(config.key_column - 1)
        .map(str::trim)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(n: usize) -> SortConfig {
        SortConfig::default().with_key_column(n)
    }

    #[test]
    fn test_whole_line_is_untouched() {
        let config = column(0);
        assert_eq!(extract("  padded\tline  ", &config), "  padded\tline  ");
    }

    #[test]
    fn test_column_is_trimmed() {
        let config = column(2);
        assert_eq!(extract("alpha\t  beta \tgamma", &config), "beta");
    }

    #[test]
    fn test_custom_separator() {
        let config = column(3).with_field_separator(',');
        assert_eq!(extract("a,b, c ,d", &config), "c");
    }

    #[test]
    fn test_missing_column_is_empty() {
        let config = column(4);
        assert_eq!(extract("a\tb", &config), "");
        assert_eq!(extract("", &config), "");
    }

    #[test]
    fn test_empty_fields_are_counted() {
        let config = column(2).with_field_separator(':');
        assert_eq!(extract("a::c", &config), "");
        assert_eq!(extract("::c", &column(3).with_field_separator(':')), "c");
    }

    #[test]
    fn test_first_column_without_separator() {
        assert_eq!(extract("lonely", &column(1)), "lonely");
        assert_eq!(extract("lonely", &column(2)), "");
    }
}
