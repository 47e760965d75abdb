//! External sorting for inputs larger than the in-memory chunk size
//!
//! Input is cut into chunks of at most `chunk_size` lines. Each chunk is
//! stable-sorted and written to its own file in a scoped temporary directory,
//! then all chunks are k-way merged through a min-heap of chunk heads. Reverse and
//! unique run once over the merged result, so the output matches a single
//! in-memory sort of the whole input.

use crate::compare::Comparator;
use crate::config::SortConfig;
use crate::core_sort::{finish, sort_stable, trim_trailing_blanks};
use crate::error::{SortContext, SortError, SortResult};
use log::{debug, trace};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tempfile::TempDir;

/// External sorter owning the temporary directory for one sort operation
pub struct ExternalSort<'a> {
    config: &'a SortConfig,
    comparator: Comparator<'a>,
    /// Temporary directory for chunk files, removed when the sorter is dropped
    temp_dir: TempDir,
}

/// A sorted chunk persisted to disk
#[derive(Debug)]
struct ChunkFile {
    path: PathBuf,
    line_count: usize,
}

/// Read position inside one chunk file
struct ChunkCursor {
    reader: BufReader<File>,
    path: PathBuf,
    /// Lines not yet read
    remaining: usize,
}

/// Head line of one chunk waiting in the merge heap
struct MergeItem<'a> {
    line: String,
    chunk_index: usize,
    comparator: Comparator<'a>,
}

impl<'a> ExternalSort<'a> {
    /// Create a sorter with a fresh temporary directory, placed in
    /// `config.temp_dir` when set and in the system default location otherwise
    pub fn new(config: &'a SortConfig) -> SortResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("keyed-sort-");

        let temp_dir = match &config.temp_dir {
            Some(dir) => builder
                .tempdir_in(dir)
                .with_context(|| format!("creating temporary directory in {}", dir.display()))?,
            None => builder
                .tempdir()
                .with_context(|| "creating temporary directory".to_string())?,
        };

        Ok(Self {
            config,
            comparator: Comparator::new(config),
            temp_dir,
        })
    }

    /// Sort the input, returning the fully ordered lines.
    ///
    /// Every chunk file is deleted before this returns, on both the success
    /// and the error path.
    pub fn sort<I>(self, input: I) -> SortResult<Vec<String>>
    where
        I: IntoIterator<Item = String>,
    {
        let chunks = self.create_sorted_chunks(input)?;
        let merged = self.merge_sorted_chunks(&chunks)?;

        let temp_path = self.temp_dir.path().to_path_buf();
        self.temp_dir
            .close()
            .with_context(|| format!("removing {}", temp_path.display()))?;

        Ok(finish(merged, self.config))
    }

    /// Cut the input into sorted chunk files of at most `chunk_size` lines
    fn create_sorted_chunks<I>(&self, input: I) -> SortResult<Vec<ChunkFile>>
    where
        I: IntoIterator<Item = String>,
    {
        let chunk_size = self.config.chunk_size.max(1);
        let mut chunks = Vec::new();
        let mut buffer: Vec<String> = Vec::with_capacity(chunk_size);

        for mut line in input {
            if self.config.trim_trailing {
                trim_trailing_blanks(&mut line);
            }
            buffer.push(line);

            if buffer.len() == chunk_size {
                chunks.push(self.spill_chunk(&mut buffer, chunks.len())?);
            }
        }

        if !buffer.is_empty() {
            chunks.push(self.spill_chunk(&mut buffer, chunks.len())?);
        }

        debug!(
            "created {} sorted chunks in {}",
            chunks.len(),
            self.temp_dir.path().display()
        );
        Ok(chunks)
    }

    /// Sort the buffered lines and write them out, leaving the buffer empty
    fn spill_chunk(&self, buffer: &mut Vec<String>, chunk_number: usize) -> SortResult<ChunkFile> {
        sort_stable(buffer, self.config);
        let chunk = self.write_chunk_to_file(buffer, chunk_number)?;
        buffer.clear();
        Ok(chunk)
    }

    /// Write sorted chunk to temporary file
    fn write_chunk_to_file(&self, lines: &[String], chunk_number: usize) -> SortResult<ChunkFile> {
        let path = self
            .temp_dir
            .path()
            .join(format!("chunk_{chunk_number:06}.txt"));

        let file = File::create(&path)
            .with_context(|| format!("creating chunk file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{line}")
                .with_context(|| format!("writing chunk file {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("flushing chunk file {}", path.display()))?;

        trace!("spilled chunk {chunk_number} ({} lines)", lines.len());
        Ok(ChunkFile {
            path,
            line_count: lines.len(),
        })
    }

    /// Merge sorted chunks using k-way merge.
    ///
    /// Among equal heads the chunk with the lowest index wins, which keeps the
    /// result identical to one stable sort over the concatenated chunks.
    fn merge_sorted_chunks(&self, chunks: &[ChunkFile]) -> SortResult<Vec<String>> {
        let total: usize = chunks.iter().map(|c| c.line_count).sum();
        debug!("merging {} chunks holding {} lines", chunks.len(), total);

        let mut cursors = chunks
            .iter()
            .map(ChunkCursor::open)
            .collect::<SortResult<Vec<_>>>()?;

        let comparator = self.comparator;
        let mut heap: BinaryHeap<Reverse<MergeItem>> = BinaryHeap::with_capacity(cursors.len());

        // Initialize heap with first line from each chunk
        for (chunk_index, cursor) in cursors.iter_mut().enumerate() {
            if let Some(line) = cursor.next_line()? {
                heap.push(Reverse(MergeItem {
                    line,
                    chunk_index,
                    comparator,
                }));
            }
        }

        let mut merged = Vec::with_capacity(total);
        while let Some(Reverse(item)) = heap.pop() {
            let chunk_index = item.chunk_index;
            merged.push(item.line);

            if let Some(line) = cursors[chunk_index].next_line()? {
                heap.push(Reverse(MergeItem {
                    line,
                    chunk_index,
                    comparator,
                }));
            }
        }

        if merged.len() != total {
            return Err(SortError::merge_failed(&format!(
                "merged {} lines but chunks held {}",
                merged.len(),
                total
            )));
        }

        Ok(merged)
    }
}

impl ChunkCursor {
    fn open(chunk: &ChunkFile) -> SortResult<Self> {
        let file = File::open(&chunk.path)
            .with_context(|| format!("opening chunk file {}", chunk.path.display()))?;
        Ok(Self {
            reader: BufReader::new(file),
            path: chunk.path.clone(),
            remaining: chunk.line_count,
        })
    }

    /// Next line of the chunk, or `None` once it is drained.
    ///
    /// The file must hold exactly as many lines as were written to it.
    fn next_line(&mut self) -> SortResult<Option<String>> {
        let mut line = String::new();
        let bytes = self
            .reader
            .read_line(&mut line)
            .with_context(|| format!("reading chunk file {}", self.path.display()))?;

        if bytes == 0 {
            if self.remaining != 0 {
                return Err(SortError::merge_failed(&format!(
                    "{} ended {} lines early",
                    self.path.display(),
                    self.remaining
                )));
            }
            return Ok(None);
        }

        if self.remaining == 0 {
            return Err(SortError::merge_failed(&format!(
                "{} holds more lines than were written",
                self.path.display()
            )));
        }
        self.remaining -= 1;

        if line.ends_with('\n') {
            line.pop();
        }
        Ok(Some(line))
    }
}

impl PartialEq for MergeItem<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MergeItem<'_> {}

impl PartialOrd for MergeItem<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeItem<'_> {
    // Comparator order first, then chunk index so ties pop from the earliest chunk
    fn cmp(&self, other: &Self) -> Ordering {
        self.comparator
            .compare(&self.line, &other.line)
            .then_with(|| self.chunk_index.cmp(&other.chunk_index))
    }
}
