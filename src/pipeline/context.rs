use std::time::Duration;

/// Runtime statistics of one import run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportStats {
    /// Client records in the export
    pub clients_total: usize,
    /// Records left after the resume filter
    pub clients_selected: usize,
    /// Records iterated; the numerator of the progress percentage
    pub clients_processed: usize,
    /// Records without id or name
    pub clients_skipped: usize,
    pub companies_created: usize,
    pub company_failures: usize,
    pub users_created: usize,
    pub user_failures: usize,
    pub field_errors: usize,
    pub system_row_errors: usize,
    pub cache_sets: usize,
    /// Console-only; these never reach the ledger
    pub cache_failures: usize,
    pub ledger_entries: usize,
    pub processing_time: Duration,
}

/// How a single client record ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOutcome {
    /// No id or name, nothing dispatched
    Skipped,
    /// Company request failed, employees not attempted
    CompanyFailed,
    /// Company created; employee failures are counted separately
    Completed,
}

#[derive(Debug, Clone, Copy)]
pub struct Progress {
    denominator: usize,
}

impl Progress {
    pub fn new(denominator: usize) -> Self {
        Progress { denominator }
    }

    /// Percentage rounded to two decimals
    pub fn percent(&self, processed: usize) -> f64 {
        if self.denominator == 0 {
            return 0.0;
        }
        let raw = processed as f64 * 100.0 / self.denominator as f64;
        (raw * 100.0).round() / 100.0
    }

    pub fn format(&self, processed: usize) -> String {
        format!("Processed {:.2}%", self.percent(processed))
    }
}
