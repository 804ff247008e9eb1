//! Pronscore CoNLL - Token-per-line annotation reader
//!
//! Reads CoNLL-2012 style coreference files, where every non-comment,
//! non-blank line is one token and columns are whitespace separated:
//!
//! | column | content          |
//! |--------|------------------|
//! | 0      | document id      |
//! | 3      | token            |
//! | 4      | coarse POS       |
//! | 5      | morphological tag|
//! | 11     | coreference field|
//!
//! Lines starting with `#` (`#begin document`, `#end document`) and blank
//! sentence separators are structural and never produce a record.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use pronscore_core::{PronscoreError, TokenRecord};
use thiserror::Error;

// ============================================================================
// Column Layout
// ============================================================================

pub const DOCUMENT_COLUMN: usize = 0;
pub const TOKEN_COLUMN: usize = 3;
pub const POS_COLUMN: usize = 4;
pub const MORPH_COLUMN: usize = 5;
pub const COREF_COLUMN: usize = 11;

/// Minimum number of columns a token line must carry
pub const MIN_COLUMNS: usize = COREF_COLUMN + 1;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while reading annotation streams
#[derive(Error, Debug)]
pub enum ConllError {
    /// A token line has fewer columns than required
    #[error("Malformed token line {line}: expected at least {} columns, found {found}", MIN_COLUMNS)]
    MalformedLine { line: usize, found: usize },

    /// IO error while reading the file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<ConllError> for PronscoreError {
    fn from(err: ConllError) -> Self {
        match err {
            ConllError::MalformedLine { line, found } => PronscoreError::MalformedLine {
                line,
                expected: MIN_COLUMNS,
                found,
            },
            ConllError::IoError { path, source } => PronscoreError::Io { path, source },
        }
    }
}

pub type Result<T> = std::result::Result<T, ConllError>;

// ============================================================================
// Token Reader
// ============================================================================

/// Lazy iterator over the token records of an annotation stream
///
/// Positions count token lines only; line numbers (1-based, used in errors)
/// count every physical line.
pub struct TokenReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    position: usize,
}

impl<'a> TokenReader<'a> {
    /// Create a reader over raw annotation text
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines().enumerate(),
            position: 0,
        }
    }
}

impl Iterator for TokenReader<'_> {
    type Item = Result<TokenRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        for (line_idx, line) in self.lines.by_ref() {
            if is_structural(line) {
                continue;
            }

            let position = self.position;
            self.position += 1;
            return Some(parse_line(line, line_idx + 1, position));
        }
        None
    }
}

/// Whether a line is a comment or a blank separator
fn is_structural(line: &str) -> bool {
    line.starts_with('#') || line.trim().is_empty()
}

/// Parse a single token line into a record
pub fn parse_line(line: &str, line_number: usize, position: usize) -> Result<TokenRecord> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.len() < MIN_COLUMNS {
        return Err(ConllError::MalformedLine {
            line: line_number,
            found: columns.len(),
        });
    }

    Ok(TokenRecord::new(
        columns[DOCUMENT_COLUMN],
        position,
        columns[TOKEN_COLUMN],
        columns[POS_COLUMN],
        columns[MORPH_COLUMN],
        columns[COREF_COLUMN],
    ))
}

/// Read every record of a stream, failing on the first malformed line
pub fn read_all(content: &str) -> Result<Vec<TokenRecord>> {
    TokenReader::new(content).collect()
}

// ============================================================================
// Annotation Files
// ============================================================================

/// A fully loaded annotation file
#[derive(Debug, Clone)]
pub struct AnnotationFile {
    /// Original file path
    pub file_path: PathBuf,

    /// Token records in file order
    pub records: Vec<TokenRecord>,
}

impl AnnotationFile {
    /// Number of token records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct document ids in order of first appearance
    pub fn document_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|record| record.document_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Read an annotation file fully into memory
pub fn load_file(path: &Path) -> Result<AnnotationFile> {
    let content = std::fs::read_to_string(path).map_err(|e| ConllError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    let file = AnnotationFile {
        file_path: path.to_path_buf(),
        records: read_all(&content)?,
    };
    tracing::debug!(
        "Read {} tokens in {} documents from {}",
        file.len(),
        file.document_ids().len(),
        path.display()
    );

    Ok(file)
}

// ============================================================================
// Tests
// ============================================================================
