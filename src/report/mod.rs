//! Line-oriented access to DIRAC output reports.
//!
//! Every scanner in this crate consumes a [`DiracReport`], rewinds it to the start, and folds
//! over its lines. Nothing is cached between scans so that each section reader can be tested in
//! isolation on a small text fragment.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Seek, SeekFrom};
use std::path::Path;

pub mod input_echo;

#[cfg(test)]
#[path = "report_tests.rs"]
mod report_tests;

// ==================
// Error definitions
// ==================

/// An enumerated type for failures encountered while reading a DIRAC report.
///
/// Apart from [`ReportError::Io`], every variant carries a human-readable explanation which
/// includes, wherever possible, a hint on how the DIRAC calculation or the program options
/// should be changed.
#[derive(Debug)]
pub enum ReportError {
    /// A section required by the parser is absent from the report.
    MissingSection(String),

    /// A line has been recognised as belonging to a section, but its fields do not follow the
    /// expected layout.
    FormatMismatch(String),

    /// Two parts of the report disagree with each other.
    Consistency(String),

    /// The DIRAC input settings echoed in the report make the requested extraction impossible.
    Configuration(String),

    /// The underlying stream could not be read.
    Io(io::Error),
}

impl ReportError {
    /// Returns a short name for the kind of this error.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::MissingSection(_) => "missing section",
            ReportError::FormatMismatch(_) => "format mismatch",
            ReportError::Consistency(_) => "consistency",
            ReportError::Configuration(_) => "configuration",
            ReportError::Io(_) => "I/O",
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::MissingSection(msg)
            | ReportError::FormatMismatch(msg)
            | ReportError::Consistency(msg)
            | ReportError::Configuration(msg) => {
                write!(f, "DIRAC report error ({}): {msg}", self.kind())
            }
            ReportError::Io(err) => write!(f, "DIRAC report error (I/O): {err}"),
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        ReportError::Io(err)
    }
}

// ==================
// Struct definitions
// ==================

/// A seekable DIRAC report.
#[derive(Debug)]
pub struct DiracReport<R> {
    reader: R,
}

impl<R: BufRead + Seek> DiracReport<R> {
    /// Wraps a buffered, seekable reader.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Rewinds the report to its first line.
    pub fn rewind(&mut self) -> Result<(), ReportError> {
        self.reader.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    /// Rewinds the report and returns an iterator over all of its lines with line terminators
    /// removed.
    pub fn scan(&mut self) -> Result<ReportLines<'_, R>, ReportError> {
        self.rewind()?;
        Ok(ReportLines {
            reader: &mut self.reader,
            buf: Vec::new(),
        })
    }
}

impl DiracReport<BufReader<File>> {
    /// Opens a DIRAC report on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<'a> DiracReport<Cursor<&'a [u8]>> {
    /// Wraps a report held in memory.
    pub fn from_text(text: &'a str) -> Self {
        Self::new(Cursor::new(text.as_bytes()))
    }
}

/// An iterator over the lines of a [`DiracReport`].
///
/// Invalid UTF-8 is replaced rather than rejected, since DIRAC occasionally echoes arbitrary
/// bytes from input files.
pub struct ReportLines<'r, R> {
    reader: &'r mut R,
    buf: Vec<u8>,
}

impl<'r, R: BufRead> Iterator for ReportLines<'r, R> {
    type Item = Result<String, ReportError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                while matches!(self.buf.last(), Some(b'\n') | Some(b'\r')) {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(err) => Some(Err(ReportError::Io(err))),
        }
    }
}

// =========
// Functions
// =========

/// Splits a report line into its space-separated words, discarding empty words.
///
/// Only the space character separates words: DIRAC never emits tabs in the sections parsed
/// here, and fixed-width fields sometimes contain other whitespace-like padding.
pub fn split_words(line: &str) -> Vec<&str> {
    line.split(' ').filter(|word| !word.is_empty()).collect()
}
