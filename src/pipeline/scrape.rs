// src/pipeline/scrape.rs

//! Registry scraping pipeline.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::models::{Config, FieldSelection, Record, RunContext};
use crate::services::{FieldCatalog, FieldExtractor, RetrievalOutcome, RetrievalStateMachine};
use crate::session::{Credentials, HttpSession, LoginOutcome, PageSession};
use crate::storage::{CsvRecordSink, IdentifierSource, RecordSink};
use crate::utils::log::{Reporter, StatusLog, header, summary};

/// What to scrape and where to put it.
#[derive(Debug, Clone)]
pub struct ScrapeJob {
    pub identifiers: IdentifierSource,
    pub selection: FieldSelection,
    /// Reduce identifiers to their digits before use
    pub normalize: bool,
    /// Result file; defaults to a timestamped file in the output directory
    pub output: Option<PathBuf>,
}

/// Result of a scrape run.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    /// Every record written, in input order
    pub records: Vec<Record>,
    pub extracted: usize,
    pub not_found: usize,
    pub unreachable: usize,
    pub output: PathBuf,
    pub elapsed: Duration,
}

impl ScrapeReport {
    pub fn processed(&self) -> usize {
        self.extracted + self.not_found + self.unreachable
    }
}

/// Log in, then scrape every identifier of `job` into a CSV file.
pub async fn run_scrape(
    config: &Config,
    context: &RunContext,
    credentials: &Credentials,
    job: ScrapeJob,
) -> Result<ScrapeReport> {
    let started = Instant::now();
    header("SPIUnet scrape");
    let reporter = StatusLog::new(context);

    let mut session = HttpSession::new(&config.session)?;
    match session.login(&config.registry, credentials).await? {
        LoginOutcome::LoggedIn => reporter.info(&format!("Logged in as {}", credentials.username)),
        LoginOutcome::AlreadyLoggedIn => reporter.info("Session already authenticated"),
    }

    let catalog = FieldCatalog::new(config.fields.clone());
    let selection = select_fields(&catalog, &job.selection, &reporter);

    let output = job.output.unwrap_or_else(|| context.result_path(config));
    let mut sink = CsvRecordSink::create(&output, &selection)?;

    let identifiers = if job.normalize {
        job.identifiers.load_normalized()?
    } else {
        job.identifiers.load()?
    };
    reporter.info(&format!("{} identifiers to process", identifiers.len()));

    let mut report = scrape_identifiers(
        &mut session,
        &reporter,
        config,
        &catalog,
        &selection,
        &identifiers,
        &mut sink,
    )
    .await?;
    report.output = output;
    report.elapsed = started.elapsed();

    summary(
        "Scrape complete",
        &[
            ("Processed", report.processed().to_string()),
            ("Extracted", report.extracted.to_string()),
            ("Not found", report.not_found.to_string()),
            ("Unreachable", report.unreachable.to_string()),
            ("Output", report.output.display().to_string()),
            ("Elapsed", format!("{:.1}s", report.elapsed.as_secs_f64())),
        ],
    );

    Ok(report)
}

/// Effective selection, warning about names the catalog does not know.
pub fn select_fields(
    catalog: &FieldCatalog,
    requested: &FieldSelection,
    reporter: &dyn Reporter,
) -> Vec<String> {
    let unknown = catalog.unknown_fields(requested);
    if !unknown.is_empty() {
        reporter.warn(&format!("Unknown fields ignored: {}", unknown.join(", ")));
    }

    let selection = catalog.effective_selection(requested);
    if selection.is_empty() {
        reporter.warn("No known fields selected; rows will hold identifiers only");
    }
    selection
}

/// Retrieve identifiers one after another, persisting each record before
/// moving on.
pub async fn scrape_identifiers(
    session: &mut dyn PageSession,
    reporter: &dyn Reporter,
    config: &Config,
    catalog: &FieldCatalog,
    selection: &[String],
    identifiers: &[String],
    sink: &mut dyn RecordSink,
) -> Result<ScrapeReport> {
    let extractor = FieldExtractor::new(config.output.keep_currency_symbol);
    let mut machine =
        RetrievalStateMachine::new(session, reporter, &config.registry, catalog, selection)
            .with_extractor(extractor);

    let total = identifiers.len();
    let mut report = ScrapeReport::default();

    for (index, identifier) in identifiers.iter().enumerate() {
        let started = Instant::now();
        reporter.info(&format!("[{}/{}] RIP {}", index + 1, total, identifier));

        let outcome = machine.retrieve(identifier).await;
        let elapsed = started.elapsed().as_secs_f64();
        match &outcome {
            RetrievalOutcome::Extracted { record, endpoint } => {
                report.extracted += 1;
                reporter.info(&format!(
                    "RIP {} - {}/{} fields from {:?} ({:.2}s)",
                    identifier,
                    record.filled_count(),
                    selection.len(),
                    endpoint,
                    elapsed
                ));
            }
            RetrievalOutcome::NotFound { marker, .. } => {
                report.not_found += 1;
                reporter.warn(&format!("RIP {} - {} ({:.2}s)", identifier, marker, elapsed));
            }
            RetrievalOutcome::Unreachable => {
                report.unreachable += 1;
                log::debug!("RIP {} gave up after {:.2}s", identifier, elapsed);
            }
        }

        if let Some(record) = outcome.into_record() {
            sink.append(&record)?;
            report.records.push(record);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::session::scripted::{Script, ScriptedSession};
    use crate::utils::log::MemoryReporter;

    const RECORD_PAGE: &str = r#"<html><body><table>
        <tr><td><font>Logradouro:</font></td><td><font><b>RUA DAS FLORES</b></font></td></tr>
        <tr><td><font>Número:</font></td><td><font><b>120</b></font></td></tr>
    </table></body></html>"#;

    const NOT_FOUND_PAGE: &str =
        "<html><body><p>500 - Internal server error.</p></body></html>";

    fn read_rows(path: &std::path::Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|row| row.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_select_fields_warns_on_unknown() {
        let catalog = FieldCatalog::default();
        let reporter = MemoryReporter::default();
        let requested: FieldSelection = "Numero,Bogus,Logradouro".parse().unwrap();

        let selection = select_fields(&catalog, &requested, &reporter);
        assert_eq!(selection, vec!["Logradouro", "Numero"]);

        let messages = reporter.take();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].1.contains("Bogus"));
    }

    #[tokio::test]
    async fn test_scrape_identifiers_writes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        let config = Config::default();
        let catalog = FieldCatalog::new(config.fields.clone());
        let selection = vec!["Logradouro".to_string(), "Numero".to_string()];
        let mut sink = CsvRecordSink::create(&path, &selection).unwrap();
        let reporter = MemoryReporter::default();

        // second identifier times out on both endpoints
        let mut session = ScriptedSession::new(vec![
            Script::page(RECORD_PAGE),
            Script::Timeout,
            Script::Timeout,
            Script::Timeout,
            Script::page(NOT_FOUND_PAGE),
        ]);
        let identifiers = vec!["123.45.678-9".to_string(), "000".to_string(), "555".to_string()];

        let report = scrape_identifiers(
            &mut session,
            &reporter,
            &config,
            &catalog,
            &selection,
            &identifiers,
            &mut sink,
        )
        .await
        .unwrap();

        assert_eq!(report.processed(), 3);
        assert_eq!(report.extracted, 1);
        assert_eq!(report.unreachable, 1);
        assert_eq!(report.not_found, 1);
        assert_eq!(report.records.len(), 2);
        assert_eq!(sink.written(), 2);

        let rows = read_rows(&path);
        assert_eq!(
            rows,
            vec![
                vec!["identifier", "Logradouro", "Numero"],
                vec!["123.45.678-9", "RUA DAS FLORES", "120"],
                vec!["555", "", ""],
            ]
        );
        assert_eq!(session.visited.len(), 5);
    }

    /// CSV sink whose disk fills up after a number of rows.
    struct FullDisk {
        inner: CsvRecordSink,
        capacity: usize,
    }

    impl RecordSink for FullDisk {
        fn append(&mut self, record: &Record) -> Result<()> {
            if self.inner.written() >= self.capacity {
                return Err(AppError::Io(std::io::Error::other("no space left on device")));
            }
            self.inner.append(record)
        }

        fn written(&self) -> usize {
            self.inner.written()
        }
    }

    #[tokio::test]
    async fn test_append_failure_keeps_written_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        let config = Config::default();
        let catalog = FieldCatalog::new(config.fields.clone());
        let selection = vec!["Logradouro".to_string(), "Numero".to_string()];
        let mut sink = FullDisk {
            inner: CsvRecordSink::create(&path, &selection).unwrap(),
            capacity: 1,
        };
        let reporter = MemoryReporter::default();
        let mut session = ScriptedSession::new(vec![
            Script::page(RECORD_PAGE),
            Script::page(RECORD_PAGE),
            Script::page(RECORD_PAGE),
        ]);
        let identifiers = vec!["1".to_string(), "2".to_string(), "3".to_string()];

        let result = scrape_identifiers(
            &mut session,
            &reporter,
            &config,
            &catalog,
            &selection,
            &identifiers,
            &mut sink,
        )
        .await;

        assert!(matches!(result, Err(AppError::Io(_))));
        assert_eq!(session.visited.len(), 2);
        assert_eq!(
            read_rows(&path),
            vec![
                vec!["identifier", "Logradouro", "Numero"],
                vec!["1", "RUA DAS FLORES", "120"],
            ]
        );
    }
}
