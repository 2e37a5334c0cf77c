//! Sequence I/O Module
//!
//! Reads the FASTQ corpus that probe searches run against.
//! Supports plain and gzip-compressed files.
//!
//! Reads are handled in two forms:
//! - **Raw blocks**: the verbatim four-line record as a single string,
//!   which is what the approximate locator pattern-matches against.
//! - **ReadRecord**: the (sequence, quality) pair split out of a raw
//!   block for anchor resolution.
//!
//! # Examples
//! ```no_run
//! use hetscreen::seqio::FastqFile;
//!
//! let mut reader = FastqFile::open("reads.fastq.gz").unwrap();
//! while let Some(block) = reader.read_next_block().unwrap() {
//!     println!("{} lines", block.lines().count());
//! }
//! ```

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

// ============================================================================
// Read Records
// ============================================================================

/// A single sequencing read split out of a raw FASTQ block.
///
/// # Fields
/// - `sequence`: Nucleotide sequence line
/// - `quality`: Quality string (Phred+33 encoded, same length as sequence)
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRecord {
    /// Nucleotide sequence.
    pub sequence: String,
    /// Quality scores aligned with the sequence.
    pub quality: String,
}

/// Splits a raw four-line FASTQ block into a read record.
///
/// The sequence and quality lines sit at fixed offsets (lines 2 and 4)
/// within the block. Blocks lacking either line are discarded by
/// returning `None` - incomplete records occur at a low rate in real
/// corpora and are not fatal.
pub fn split_block(block: &str) -> Option<ReadRecord> {
    let mut lines = block.lines();
    lines.next()?; // @name header
    let sequence = lines.next()?.to_string();
    lines.next()?; // + separator
    let quality = lines.next()?.to_string();

    if sequence.is_empty() || quality.is_empty() {
        return None;
    }

    Some(ReadRecord { sequence, quality })
}

// ============================================================================
// FASTQ Reading
// ============================================================================

/// Generic FASTQ reader supporting any Read source.
///
/// Use `FastqReader<File>` for plain files or
/// `FastqReader<MultiGzDecoder<File>>` for gzipped files.
pub struct FastqReader<R: Read> {
    reader: BufReader<R>,
    line_buf: String,
}

impl FastqReader<File> {
    /// Opens a plain (uncompressed) FASTQ file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open FASTQ: {}", path.as_ref().display()))?;
        Ok(Self {
            reader: BufReader::with_capacity(1024 * 1024, file),
            line_buf: String::with_capacity(512),
        })
    }
}

impl FastqReader<MultiGzDecoder<File>> {
    /// Opens a gzip-compressed FASTQ file.
    pub fn open_gz<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open FASTQ.gz: {}", path.as_ref().display()))?;
        let decoder = MultiGzDecoder::new(file);
        Ok(Self {
            reader: BufReader::with_capacity(1024 * 1024, decoder),
            line_buf: String::with_capacity(512),
        })
    }
}

impl<R: Read> FastqReader<R> {
    /// Reads the next four-line FASTQ record as a raw block.
    ///
    /// # FASTQ Format
    /// ```text
    /// @read_name
    /// SEQUENCE
    /// +
    /// QUALITY
    /// ```
    ///
    /// The block keeps the four lines joined with `\n` and no trailing
    /// newline, so the locator can match against the record verbatim.
    ///
    /// # Returns
    /// - `Ok(Some(block))` - Successfully read a record
    /// - `Ok(None)` - End of file reached
    /// - `Err(e)` - I/O error occurred
    pub fn read_next_block(&mut self) -> Result<Option<String>> {
        // Line 1: @name
        self.line_buf.clear();
        if self.reader.read_line(&mut self.line_buf)? == 0 {
            return Ok(None);
        }
        let header = self.line_buf.trim_end();
        if header.is_empty() {
            return Ok(None);
        }
        let mut block = String::with_capacity(512);
        block.push_str(header);

        // Lines 2-4: sequence, separator, quality
        for _ in 0..3 {
            self.line_buf.clear();
            if self.reader.read_line(&mut self.line_buf)? == 0 {
                break;
            }
            block.push('\n');
            block.push_str(self.line_buf.trim_end());
        }

        Ok(Some(block))
    }
}

/// Auto-detecting FASTQ file reader.
///
/// Automatically selects plain or gzip reader based on file extension.
/// Files ending in `.gz` are treated as gzip-compressed.
pub enum FastqFile {
    /// Plain text FASTQ file.
    Plain(FastqReader<File>),
    /// Gzip-compressed FASTQ file.
    Gzipped(FastqReader<MultiGzDecoder<File>>),
}

impl FastqFile {
    /// Opens a FASTQ file with automatic compression detection.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        if ext == "gz" {
            Ok(FastqFile::Gzipped(FastqReader::open_gz(path)?))
        } else {
            Ok(FastqFile::Plain(FastqReader::open(path)?))
        }
    }

    /// Reads the next raw FASTQ block.
    ///
    /// Delegates to the appropriate reader based on file type.
    pub fn read_next_block(&mut self) -> Result<Option<String>> {
        match self {
            FastqFile::Plain(r) => r.read_next_block(),
            FastqFile::Gzipped(r) => r.read_next_block(),
        }
    }
}

// ============================================================================
// Corpus Loading
// ============================================================================

/// Finds all FASTQ files (plain or gzipped) in a directory.
///
/// Recognized suffixes: `.fastq`, `.fq`, `.fastq.gz`, `.fq.gz`.
/// Results are sorted for a deterministic corpus order across runs.
pub fn find_fastq_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let suffixes = [".fastq", ".fq", ".fastq.gz", ".fq.gz"];
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if suffixes.iter().any(|s| filename.ends_with(s)) {
            files.push(path);
        }
    }

    files.sort();

    if files.is_empty() {
        anyhow::bail!("No FASTQ files found in {}", dir.display());
    }

    Ok(files)
}

/// Loads the full read corpus as raw blocks, concatenated over all files.
///
/// Each element is one verbatim four-line record. The locator searches
/// these blocks directly; splitting into (sequence, quality) happens
/// later, per probe, only for blocks that survive the pre-filter.
pub fn load_corpus(paths: &[PathBuf]) -> Result<Vec<String>> {
    let mut corpus = Vec::new();

    for path in paths {
        let mut reader = FastqFile::open(path)?;
        while let Some(block) = reader
            .read_next_block()
            .with_context(|| format!("Failed to read {}", path.display()))?
        {
            corpus.push(block);
        }
    }

    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_block() {
        let block = "@read1\nACGTACGT\n+\nIIIIIIII";
        let record = split_block(block).unwrap();
        assert_eq!(record.sequence, "ACGTACGT");
        assert_eq!(record.quality, "IIIIIIII");
    }

    #[test]
    fn test_split_block_incomplete() {
        // Truncated records are dropped, not errors
        assert!(split_block("@read1\nACGT").is_none());
        assert!(split_block("@read1\nACGT\n+").is_none());
        assert!(split_block("").is_none());
    }

    #[test]
    fn test_split_block_empty_lines() {
        assert!(split_block("@read1\n\n+\nIIII").is_none());
        assert!(split_block("@read1\nACGT\n+\n").is_none());
    }
}
