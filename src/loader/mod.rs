//! Reading execution history from CSV.
//!
//! Each row is one execution of the suite and each column one test. Cells
//! hold outcome tokens from the configured [`TokenVocabulary`]. Rows may be
//! preceded by a header row naming the tests.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};

use crate::config::InputConfig;
use crate::core::{Error, Result};
use crate::history::{ExecutionRecord, FailureLedger, TokenVocabulary};

/// Parsed history input: the records and, when present, the test names.
#[derive(Debug, Clone)]
pub struct History {
    pub records: Vec<ExecutionRecord>,
    pub test_names: Option<Vec<String>>,
}

impl History {
    /// Build a fresh ledger from the loaded records.
    pub fn ledger(&self) -> Result<FailureLedger> {
        FailureLedger::new(self.records.iter().cloned())
    }

    /// Name of a test, falling back to its index.
    pub fn test_name(&self, index: usize) -> String {
        self.test_names
            .as_ref()
            .and_then(|names| names.get(index))
            .cloned()
            .unwrap_or_else(|| index.to_string())
    }
}

/// Reads history files according to input settings and a token vocabulary.
pub struct HistoryLoader<'a> {
    input: &'a InputConfig,
    vocabulary: &'a TokenVocabulary,
}

impl<'a> HistoryLoader<'a> {
    pub fn new(input: &'a InputConfig, vocabulary: &'a TokenVocabulary) -> Self {
        Self { input, vocabulary }
    }

    /// Load history from a CSV file.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<History> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        tracing::info!("Loading test history from {}", path.display());
        let file = File::open(path)?;
        self.load_reader(file, &path.display().to_string())
    }

    /// Load history from any reader. `origin` names the source in errors.
    ///
    /// Blank lines are skipped. A single-test row whose only cell is an
    /// empty not-run token is therefore not read as an execution.
    pub fn load_reader<R: Read>(&self, reader: R, origin: &str) -> Result<History> {
        let delimiter = delimiter_byte(self.input.delimiter)?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(self.input.has_headers)
            .delimiter(delimiter)
            .trim(if self.input.trim { Trim::All } else { Trim::None })
            .flexible(true)
            .from_reader(reader);

        let test_names = if self.input.has_headers {
            Some(rdr.headers()?.iter().map(str::to_string).collect())
        } else {
            None
        };

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row?;
            let line = row.position().map_or(records.len() + 1, |p| p.line() as usize);
            let record = ExecutionRecord::from_tokens_with(row.iter(), self.vocabulary)
                .map_err(|source| Error::Parse { row: line, source })?;
            records.push(record);
        }

        if records.is_empty() {
            return Err(Error::EmptyHistory {
                origin: origin.to_string(),
            });
        }

        tracing::debug!(executions = records.len(), "parsed test history");
        Ok(History {
            records,
            test_names,
        })
    }
}

/// Write records as CSV in the given vocabulary and delimiter.
pub fn write_history<'r, W: Write>(
    writer: W,
    records: impl IntoIterator<Item = &'r ExecutionRecord>,
    vocabulary: &TokenVocabulary,
    delimiter: char,
) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .flexible(true)
        .from_writer(writer);
    for record in records {
        wtr.write_record(record.outcomes().iter().map(|o| vocabulary.token_for(*o)))?;
    }
    wtr.flush()?;
    Ok(())
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(|b| b.is_ascii())
        .ok_or_else(|| {
            Error::config(format!(
                "delimiter {delimiter:?} must be a single ASCII character"
            ))
        })
}
