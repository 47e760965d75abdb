//! Line acquisition from files and standard input

use crate::error::{SortContext, SortError, SortResult};
use log::debug;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read};

/// Name used for standard input in messages
pub const STDIN_NAME: &str = "-";

/// Lines gathered from every input source, in read order
#[derive(Debug, Default)]
pub struct Input {
    pub lines: Vec<String>,
    /// Source name and index of its first line in `lines`
    sources: Vec<(String, usize)>,
}

impl Input {
    fn push_source(&mut self, name: &str, mut lines: Vec<String>) {
        debug!("read {} lines from {name}", lines.len());
        self.sources.push((name.to_string(), self.lines.len()));
        self.lines.append(&mut lines);
    }

    /// Source name and 1-based line number within it for `lines[index]`
    pub fn locate(&self, index: usize) -> (&str, usize) {
        // Empty sources share a start with their successor; the last one owns the line
        let owner = self
            .sources
            .partition_point(|(_, start)| *start <= index)
            .checked_sub(1)
            .and_then(|pos| self.sources.get(pos));

        match owner {
            Some((name, start)) => (name.as_str(), index - start + 1),
            None => (STDIN_NAME, index + 1),
        }
    }
}

/// Read every line from `files` in order; no files (or `-`) means stdin
pub fn read_input(files: &[String]) -> SortResult<Input> {
    let mut input = Input::default();
    if files.is_empty() {
        input.push_source(STDIN_NAME, read_stdin()?);
        return Ok(input);
    }

    for file in files {
        let lines = if file == STDIN_NAME {
            read_stdin()?
        } else {
            read_file(file)?
        };
        input.push_source(file, lines);
    }
    Ok(input)
}

/// Memory-map a file and split it into lines
pub fn read_file(path: &str) -> SortResult<Vec<String>> {
    let file = File::open(path).with_file_context(path)?;
    let metadata = file.metadata().with_file_context(path)?;
    if metadata.is_dir() {
        return Err(SortError::is_directory(path));
    }
    if metadata.len() == 0 {
        return Ok(Vec::new());
    }

    // SAFETY: the map is only read while `file` is open and is dropped before
    // returning; lines are copied out into owned strings.
    let mmap = unsafe { Mmap::map(&file) }.with_file_context(path)?;
    split_lines(&mmap)
}

fn read_stdin() -> SortResult<Vec<String>> {
    let mut buffer = Vec::new();
    io::stdin()
        .lock()
        .read_to_end(&mut buffer)
        .with_context(|| "reading standard input".to_string())?;
    split_lines(&buffer)
}

/// Split raw bytes on `\n`, dropping a trailing `\r` from each line.
///
/// A final newline does not produce an empty last line.
pub fn split_lines(data: &[u8]) -> SortResult<Vec<String>> {
    let text = std::str::from_utf8(data)?;
    Ok(text.lines().map(str::to_owned).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_split_lines() -> SortResult<()> {
        assert_eq!(split_lines(b"b\na\r\n\nc")?, vec!["b", "a", "", "c"]);
        assert_eq!(split_lines(b"x\n")?, vec!["x"]);
        assert!(split_lines(b"")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        assert!(matches!(
            split_lines(b"ok\n\xff\xfe"),
            Err(SortError::Utf8Error(_))
        ));
    }

    #[test]
    fn test_read_files_in_order() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let first = temp_dir.path().join("first.txt");
        let second = temp_dir.path().join("second.txt");
        let empty = temp_dir.path().join("empty.txt");
        fs::write(&first, "zebra\napple\n")?;
        fs::write(&second, "mango")?;
        fs::write(&empty, "")?;

        let files: Vec<String> = [&first, &empty, &second]
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();
        let input = read_input(&files)?;
        assert_eq!(input.lines, vec!["zebra", "apple", "mango"]);

        assert_eq!(input.locate(1), (files[0].as_str(), 2));
        assert_eq!(input.locate(2), (files[2].as_str(), 1));
        Ok(())
    }

    #[test]
    fn test_locate_without_sources_counts_from_stdin() {
        let input = Input::default();
        assert_eq!(input.locate(4), (STDIN_NAME, 5));
    }

    #[test]
    fn test_missing_file() {
        let result = read_file("/definitely/not/here.txt");
        assert!(matches!(result, Err(SortError::FileNotFound { .. })));
    }

    #[test]
    fn test_directory_is_rejected() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_string_lossy().to_string();
        assert!(matches!(
            read_file(&path),
            Err(SortError::IsDirectory { .. })
        ));
        Ok(())
    }
}
