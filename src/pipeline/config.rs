use crate::ledger::ResumeSet;

/// Configuration for one import run
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub mode: RunMode,
}

/// Which client records a run covers
#[derive(Debug, Clone, Default)]
pub enum RunMode {
    /// Every client record in the export
    #[default]
    Full,
    /// Only the records listed in a previous run's SequenceID ledger
    Resume(ResumeSet),
}

impl PipelineConfig {
    pub fn resume(set: ResumeSet) -> Self {
        PipelineConfig {
            mode: RunMode::Resume(set),
        }
    }

    pub fn resume_set(&self) -> Option<&ResumeSet> {
        match &self.mode {
            RunMode::Full => None,
            RunMode::Resume(set) => Some(set),
        }
    }

    /// Denominator of the progress percentage. In resume mode this is the
    /// resume file's line count, which still counts IDs that no longer
    /// match any record.
    pub fn progress_denominator(&self, client_count: usize) -> usize {
        match &self.mode {
            RunMode::Full => client_count,
            RunMode::Resume(set) => set.raw_len(),
        }
    }
}
