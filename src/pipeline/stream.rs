// src/pipeline/stream.rs
use std::io::Write;
use std::time::Instant;

use indexmap::IndexSet;

use crate::document::{Record, SourceDocument};
use crate::error::ImportError;
use crate::ledger::FailureLedger;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::context::{ClientOutcome, ImportStats, Progress};
use crate::pipeline::extract::{
    extract_client, extract_employee, extract_system, ClientFields, EMPLOYEES_TABLE,
    SYSTEMS_TABLE,
};
use crate::pipeline::filter::select_records;
use crate::pipeline::payload::{CompanyPayload, UserPayload};
use crate::sinks::Dispatcher;
use crate::system_code::{cache_key, SystemCodeTable};

/// Console and ledger sinks of a run, borrowed for its duration
struct Report<'r, L: Write, W: Write> {
    ledger: &'r mut FailureLedger<L>,
    console: &'r mut W,
}

impl<L: Write, W: Write> Report<'_, L, W> {
    /// A recoverable failure: console and both ledgers
    fn failure(&mut self, sequence_id: &str, message: &str) -> Result<(), ImportError> {
        writeln!(self.console, "{}", message)?;
        self.ledger.record(sequence_id, message)?;
        Ok(())
    }

    /// Console only
    fn line(&mut self, message: &str) -> Result<(), ImportError> {
        writeln!(self.console, "{}", message)?;
        Ok(())
    }
}

/// Bulk import orchestrator
pub struct ImportPipeline<'a, D: Dispatcher> {
    config: PipelineConfig,
    codes: &'a SystemCodeTable,
    dispatcher: D,
}

impl<'a, D: Dispatcher> ImportPipeline<'a, D> {
    pub fn new(config: PipelineConfig, codes: &'a SystemCodeTable, dispatcher: D) -> Self {
        ImportPipeline {
            config,
            codes,
            dispatcher,
        }
    }

    /// Process every selected client of the document. Only fatal conditions
    /// are returned as errors; everything else ends up in the ledger, on the
    /// console, or in the returned stats.
    pub fn run<L: Write, W: Write>(
        &mut self,
        document: &SourceDocument,
        ledger: &mut FailureLedger<L>,
        console: &mut W,
    ) -> Result<ImportStats, ImportError> {
        let start_time = Instant::now();

        let clients: Vec<&Record> = document.clients().collect();
        let selected = select_records(clients.iter().copied(), self.config.resume_set());
        let progress = Progress::new(self.config.progress_denominator(clients.len()));

        let mut stats = ImportStats {
            clients_total: clients.len(),
            clients_selected: selected.len(),
            ..ImportStats::default()
        };
        tracing::info!(
            "Importing {} of {} client records",
            stats.clients_selected,
            stats.clients_total
        );

        let mut report = Report { ledger, console };

        for record in selected {
            stats.clients_processed += 1;

            match self.process_client(record, &mut report, &mut stats)? {
                ClientOutcome::Skipped => {
                    stats.clients_skipped += 1;
                    tracing::debug!("client no.{}: no id or name, skipped", record.sequence_id);
                }
                ClientOutcome::CompanyFailed => {}
                ClientOutcome::Completed => {
                    report.line(&progress.format(stats.clients_processed))?;
                }
            }
        }

        report.ledger.flush()?;
        report.console.flush()?;

        stats.ledger_entries = report.ledger.len();
        stats.processing_time = start_time.elapsed();
        tracing::info!(
            "Import finished: {} processed, {} ledger entries in {:?}",
            stats.clients_processed,
            stats.ledger_entries,
            stats.processing_time
        );
        Ok(stats)
    }

    fn process_client<L: Write, W: Write>(
        &mut self,
        record: &Record,
        report: &mut Report<'_, L, W>,
        stats: &mut ImportStats,
    ) -> Result<ClientOutcome, ImportError> {
        let seq = record.sequence_id.as_str();

        let extraction = extract_client(record);
        for (field, err) in extraction.failures() {
            stats.field_errors += 1;
            report.failure(
                seq,
                &format!(
                    "Error getting parameter {} in client no.{}: {}",
                    field.key(),
                    seq,
                    err
                ),
            )?;
        }

        let client = extraction.into_fields();
        if !client.is_identifiable() {
            return Ok(ClientOutcome::Skipped);
        }

        let maintained_bases = self.push_systems(record, &client, report, stats)?;

        let payload = CompanyPayload::new(&client, maintained_bases);
        match self.dispatcher.post_company(&payload) {
            Ok(status) => {
                stats.companies_created += 1;
                report.line(&format!("{} {}: {}", client.to, client.name, status))?;
            }
            Err(err) => {
                stats.company_failures += 1;
                report.failure(
                    seq,
                    &format!(
                        "Error while processing request for client {}: {}",
                        client.name, err
                    ),
                )?;
                return Ok(ClientOutcome::CompanyFailed);
            }
        }

        self.push_employees(record, &client, report, stats)?;

        report.line(&format!("Created users for client {}", client.to))?;
        Ok(ClientOutcome::Completed)
    }

    /// Set a cache key per `systems` row and collect the distinct
    /// abbreviations in first-seen order.
    fn push_systems<L: Write, W: Write>(
        &mut self,
        record: &Record,
        client: &ClientFields,
        report: &mut Report<'_, L, W>,
        stats: &mut ImportStats,
    ) -> Result<Vec<String>, ImportError> {
        let seq = record.sequence_id.as_str();
        let mut abbreviations: IndexSet<String> = IndexSet::new();

        for row in record.table(SYSTEMS_TABLE) {
            let system = match extract_system(row) {
                Ok(system) => system,
                Err(err) => {
                    stats.system_row_errors += 1;
                    report.failure(
                        seq,
                        &format!("Error getting system data in client no.{}: {}", seq, err),
                    )?;
                    continue;
                }
            };

            let code = self
                .codes
                .resolve(&system.abbr)
                .ok_or_else(|| ImportError::UnknownSystem {
                    abbr: system.abbr.clone(),
                    sequence_id: seq.to_string(),
                })?;
            let key = cache_key(code, &system.distr);
            abbreviations.insert(system.abbr);

            match self.dispatcher.set_system(&key, &client.to) {
                Ok(()) => stats.cache_sets += 1,
                Err(err) => {
                    stats.cache_failures += 1;
                    tracing::warn!("cache set {} failed: {}", key, err);
                    report.line(&format!("Setting {} = {}: {}", key, client.to, err))?;
                }
            }
        }

        Ok(abbreviations.into_iter().collect())
    }

    fn push_employees<L: Write, W: Write>(
        &mut self,
        record: &Record,
        client: &ClientFields,
        report: &mut Report<'_, L, W>,
        stats: &mut ImportStats,
    ) -> Result<(), ImportError> {
        let seq = record.sequence_id.as_str();
        let mut ordinal = 1;

        for row in record.table(EMPLOYEES_TABLE) {
            let employee = match extract_employee(row, ordinal, &client.to) {
                Ok(employee) => employee,
                Err(err) => {
                    stats.user_failures += 1;
                    report.failure(
                        seq,
                        &format!(
                            "Error getting parameter userFullName in client user {}: {}",
                            client.to, err
                        ),
                    )?;
                    continue;
                }
            };
            ordinal += 1;

            let payload = UserPayload::new(&client.to, &employee);
            match self.dispatcher.post_user(&payload) {
                Ok(status) => {
                    stats.users_created += 1;
                    if status != 200 {
                        report.line(&format!(
                            "{} {}: {}",
                            client.to, employee.full_name, status
                        ))?;
                    }
                }
                Err(err) => {
                    stats.user_failures += 1;
                    report.failure(
                        seq,
                        &format!(
                            "Error while processing request for client user {} {}: {}",
                            client.to, employee.full_name, err
                        ),
                    )?;
                }
            }
        }

        Ok(())
    }
}
