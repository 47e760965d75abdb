//! Configuration management for sort operations

use crate::error::{SortError, SortResult};
use std::path::PathBuf;

/// Line count above which input is spilled to sorted chunks on disk
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Field separator used when none is given
pub const DEFAULT_FIELD_SEPARATOR: char = '\t';

/// Main configuration structure for sort operations
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// 1-based column used as the sort key; 0 selects the whole line
    pub key_column: usize,
    /// Comparison mode applied to the extracted keys
    pub mode: SortMode,
    /// Field separator character for column extraction
    pub field_separator: char,
    /// Reverse the fully sorted output
    pub reverse: bool,
    /// Output only the first of a run of identical lines
    pub unique: bool,
    /// Check if input is already sorted
    pub check: bool,
    /// Strip trailing spaces and tabs before sorting
    pub trim_trailing: bool,
    /// Maximum number of lines sorted in memory at once
    pub chunk_size: usize,
    /// Temporary directory for external sorting
    pub temp_dir: Option<PathBuf>,
    /// Use a parallel stable sort for large in-memory batches
    pub parallel: bool,
    /// Debug mode (for troubleshooting)
    pub debug: bool,
}

/// Sort mode enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Standard byte-wise sorting
    #[default]
    Lexicographic,
    /// Floating point sorting
    Numeric,
    /// Month name sorting
    Month,
    /// Human-readable numeric sorting (with suffixes like K, M, G)
    HumanNumeric,
}

/// Sort order enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key_column: 0,
            mode: SortMode::Lexicographic,
            field_separator: DEFAULT_FIELD_SEPARATOR,
            reverse: false,
            unique: false,
            check: false,
            trim_trailing: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            temp_dir: None,
            parallel: false,
            debug: false,
        }
    }
}

impl SortConfig {
    /// Set the sort mode
    pub fn with_mode(mut self, mode: SortMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the key column (0 = whole line)
    pub fn with_key_column(mut self, column: usize) -> Self {
        self.key_column = column;
        self
    }

    /// Set field separator
    pub fn with_field_separator(mut self, separator: char) -> Self {
        self.field_separator = separator;
        self
    }

    /// Enable reverse sorting
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Enable unique output
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn with_trim_trailing(mut self, trim: bool) -> Self {
        self.trim_trailing = trim;
        self
    }

    /// Set the in-memory chunk threshold (lines)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the directory used for spilled chunks
    pub fn with_temp_dir(mut self, temp_dir: Option<PathBuf>) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parse chunk size from string
    pub fn set_chunk_size_from_string(&mut self, size_str: &str) -> SortResult<()> {
        let size = size_str
            .trim()
            .parse::<usize>()
            .map_err(|_| SortError::invalid_chunk_size(size_str))?;
        self.chunk_size = size;
        Ok(())
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> SortResult<()> {
        if self.chunk_size == 0 {
            return Err(SortError::invalid_chunk_size(
                "chunk size must hold at least one line",
            ));
        }

        // Lines never contain the record terminator, so splitting on it is meaningless
        if self.field_separator == '\n' {
            return Err(SortError::invalid_field_separator(
                "newline cannot separate fields",
            ));
        }

        Ok(())
    }

    /// Get the effective sort order
    pub fn sort_order(&self) -> SortOrder {
        if self.reverse {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }

    /// Whether a batch of `line_count` lines must go through the external merge path
    pub fn needs_external_sort(&self, line_count: usize) -> bool {
        line_count > self.chunk_size
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SortMode::Lexicographic => "lexicographic",
            SortMode::Numeric => "numeric",
            SortMode::Month => "month",
            SortMode::HumanNumeric => "human-numeric",
        };
        write!(f, "{name}")
    }
}

/// Builder pattern for creating configurations
pub struct SortConfigBuilder {
    config: SortConfig,
}

impl SortConfigBuilder {
    /// Start building a new configuration
    pub fn new() -> Self {
        Self {
            config: SortConfig::default(),
        }
    }

    /// Set sort mode
    pub fn mode(mut self, mode: SortMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Sort by the given 1-based column
    pub fn key_column(mut self, column: usize) -> Self {
        self.config.key_column = column;
        self
    }

    /// Set field separator
    pub fn field_separator(mut self, separator: char) -> Self {
        self.config.field_separator = separator;
        self
    }

    /// Enable reverse sorting
    pub fn reverse(mut self) -> Self {
        self.config.reverse = true;
        self
    }

    /// Enable unique output
    pub fn unique(mut self) -> Self {
        self.config.unique = true;
        self
    }

    /// Enable check mode
    pub fn check(mut self) -> Self {
        self.config.check = true;
        self
    }

    pub fn trim_trailing(mut self) -> Self {
        self.config.trim_trailing = true;
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn temp_dir(mut self, dir: PathBuf) -> Self {
        self.config.temp_dir = Some(dir);
        self
    }

    pub fn parallel(mut self) -> Self {
        self.config.parallel = true;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> SortResult<SortConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for SortConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SortConfig::default();
        assert_eq!(config.mode, SortMode::Lexicographic);
        assert_eq!(config.key_column, 0);
        assert_eq!(config.field_separator, '\t');
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(!config.reverse);
        assert!(!config.unique);
        assert!(!config.trim_trailing);
    }

    #[test]
    fn test_config_builder() {
        let config = SortConfigBuilder::new()
            .mode(SortMode::Numeric)
            .key_column(2)
            .field_separator(',')
            .reverse()
            .unique()
            .build()
            .expect("Failed to build test config");

        assert_eq!(config.mode, SortMode::Numeric);
        assert_eq!(config.key_column, 2);
        assert_eq!(config.field_separator, ',');
        assert!(config.reverse);
        assert!(config.unique);
    }

    #[test]
    fn test_validate_rejects_zero_chunk() {
        let result = SortConfigBuilder::new().chunk_size(0).build();
        assert!(matches!(result, Err(SortError::InvalidChunkSize { .. })));
    }

    #[test]
    fn test_validate_rejects_newline_separator() {
        let config = SortConfig::default().with_field_separator('\n');
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chunk_size_from_string() {
        let mut config = SortConfig::default();
        config
            .set_chunk_size_from_string("250")
            .expect("Failed to parse chunk size");
        assert_eq!(config.chunk_size, 250);
        assert!(config.needs_external_sort(251));
        assert!(!config.needs_external_sort(250));
        assert!(config.set_chunk_size_from_string("lots").is_err());
    }

    #[test]
    fn test_sort_order_and_mode_names() {
        assert_eq!(SortConfig::default().sort_order(), SortOrder::Ascending);
        assert_eq!(
            SortConfig::default().with_reverse(true).sort_order(),
            SortOrder::Descending
        );
        assert_eq!(SortMode::HumanNumeric.to_string(), "human-numeric");
    }
}
