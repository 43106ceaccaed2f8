// src/ledger.rs
use crate::error::ImportError;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// The pair of failure logs written during a run: one human-readable line
/// per failure, and the SequenceID of the failing record on the same
/// position of the second log.
pub struct FailureLedger<W: Write> {
    errors: W,
    sequence_ids: W,
    entries: usize,
}

impl FailureLedger<BufWriter<File>> {
    /// Create (truncate) both ledger files.
    pub fn create(errors_path: &Path, sequence_ids_path: &Path) -> Result<Self, ImportError> {
        let open = |path: &Path| {
            File::create(path)
                .map(BufWriter::new)
                .map_err(|e| ImportError::LedgerUnopenable {
                    path: path.to_path_buf(),
                    source: e,
                })
        };
        Ok(FailureLedger::new(open(errors_path)?, open(sequence_ids_path)?))
    }
}

impl<W: Write> FailureLedger<W> {
    pub fn new(errors: W, sequence_ids: W) -> Self {
        FailureLedger {
            errors,
            sequence_ids,
            entries: 0,
        }
    }

    /// Append one failure to both logs. Both writers are flushed before
    /// returning, so an interrupted run keeps every entry recorded so far.
    pub fn record(&mut self, sequence_id: &str, message: &str) -> io::Result<()> {
        writeln!(self.errors, "{}", message)?;
        writeln!(self.sequence_ids, "{}", sequence_id)?;
        self.entries += 1;
        self.flush()
    }

    /// Number of failures recorded so far
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.errors.flush()?;
        self.sequence_ids.flush()
    }

    pub fn into_inner(self) -> (W, W) {
        (self.errors, self.sequence_ids)
    }
}

/// SequenceIDs read back from a previous run's SequenceID ledger.
#[derive(Debug, Clone, Default)]
pub struct ResumeSet {
    lines: Vec<String>,
    ids: HashSet<String>,
}

impl ResumeSet {
    pub fn load(path: &Path) -> Result<Self, ImportError> {
        let content = std::fs::read_to_string(path).map_err(|e| ImportError::ResumeUnreadable {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::parse(&content))
    }

    /// One ID per line. Every line counts towards `raw_len`, duplicates and
    /// blank lines included.
    pub fn parse(content: &str) -> Self {
        let lines: Vec<String> = content
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();
        let ids = lines.iter().cloned().collect();
        ResumeSet { lines, ids }
    }

    pub fn contains(&self, sequence_id: &str) -> bool {
        self.ids.contains(sequence_id)
    }

    /// Line count of the source file, used as the progress denominator
    pub fn raw_len(&self) -> usize {
        self.lines.len()
    }
}
