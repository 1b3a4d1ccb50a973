//! Per-identifier retrieval state machine.
//!
//! ```text
//! Init ─▶ AwaitPrimary ─┬─▶ Ready ─▶ Done (record)
//!                       └─▶ PrimaryTimeout ─▶ AwaitSecondary ─┬─▶ Ready ─▶ Done (record)
//!                                                             └─▶ SecondaryTimeout ─▶ Done (no record)
//! ```
//!
//! A page that loads always yields exactly one record, blank when the page
//! is an error page. Two consecutive timeouts yield none. Nothing inside a
//! retrieval is returned as an error.

use std::time::Duration;

use scraper::Html;

use crate::models::{Record, RegistryConfig};
use crate::services::classifier::{ErrorMarker, PageClass, PageClassifier};
use crate::services::{FieldCatalog, FieldExtractor};
use crate::session::{PageSession, Visibility};
use crate::utils::log::Reporter;
use crate::utils::{endpoint_url, same_url};

/// Registry view a page was requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Utilization view, tried first
    Primary,
    /// Property view, tried when the primary does not load
    Secondary,
}

/// How retrieval of one identifier ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    /// The page held a record
    Extracted { record: Record, endpoint: Endpoint },
    /// The page loaded but was an error page; the record is blank
    NotFound {
        record: Record,
        endpoint: Endpoint,
        marker: ErrorMarker,
    },
    /// Neither endpoint loaded in time
    Unreachable,
}

impl RetrievalOutcome {
    pub fn record(&self) -> Option<&Record> {
        match self {
            RetrievalOutcome::Extracted { record, .. }
            | RetrievalOutcome::NotFound { record, .. } => Some(record),
            RetrievalOutcome::Unreachable => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            RetrievalOutcome::Extracted { record, .. }
            | RetrievalOutcome::NotFound { record, .. } => Some(record),
            RetrievalOutcome::Unreachable => None,
        }
    }
}

/// State of one retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalState {
    Init,
    AwaitPrimary,
    PrimaryTimeout,
    AwaitSecondary,
    SecondaryTimeout,
    Ready(Endpoint),
    Done(RetrievalOutcome),
}

/// Drives retrievals over a borrowed page session.
pub struct RetrievalStateMachine<'a> {
    session: &'a mut dyn PageSession,
    reporter: &'a dyn Reporter,
    registry: &'a RegistryConfig,
    catalog: &'a FieldCatalog,
    selection: &'a [String],
    classifier: PageClassifier,
    extractor: FieldExtractor,
    timeout: Duration,
}

impl<'a> RetrievalStateMachine<'a> {
    pub fn new(
        session: &'a mut dyn PageSession,
        reporter: &'a dyn Reporter,
        registry: &'a RegistryConfig,
        catalog: &'a FieldCatalog,
        selection: &'a [String],
    ) -> Self {
        Self {
            session,
            reporter,
            registry,
            catalog,
            selection,
            classifier: PageClassifier::new(),
            extractor: FieldExtractor::default(),
            timeout: registry.wait_timeout(),
        }
    }

    /// Use a specific extractor, e.g. one that keeps currency symbols.
    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Override the readiness timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the machine for one identifier until it is done.
    pub async fn retrieve(&mut self, identifier: &str) -> RetrievalOutcome {
        let mut state = RetrievalState::Init;
        loop {
            state = match self.step(identifier, state).await {
                RetrievalState::Done(outcome) => return outcome,
                next => next,
            };
        }
    }

    /// Perform one transition.
    pub async fn step(&mut self, identifier: &str, state: RetrievalState) -> RetrievalState {
        log::debug!("RIP {}: {:?}", identifier, state);
        match state {
            RetrievalState::Init => self.begin(identifier, Endpoint::Primary).await,
            RetrievalState::AwaitPrimary => self.await_page(Endpoint::Primary).await,
            RetrievalState::PrimaryTimeout => self.begin(identifier, Endpoint::Secondary).await,
            RetrievalState::AwaitSecondary => self.await_page(Endpoint::Secondary).await,
            RetrievalState::SecondaryTimeout => {
                self.reporter.warn(&format!("RIP {identifier} - Not found."));
                RetrievalState::Done(RetrievalOutcome::Unreachable)
            }
            RetrievalState::Ready(endpoint) => {
                RetrievalState::Done(self.capture(identifier, endpoint).await)
            }
            done @ RetrievalState::Done(_) => done,
        }
    }

    fn endpoint_template(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Primary => &self.registry.utilization_url,
            Endpoint::Secondary => &self.registry.property_url,
        }
    }

    async fn begin(&mut self, identifier: &str, endpoint: Endpoint) -> RetrievalState {
        let url = endpoint_url(self.endpoint_template(endpoint), identifier);
        match self.session.navigate(&url).await {
            Ok(()) => match endpoint {
                Endpoint::Primary => RetrievalState::AwaitPrimary,
                Endpoint::Secondary => RetrievalState::AwaitSecondary,
            },
            Err(e) => {
                log::warn!("Navigation to {} failed: {}", url, e);
                timed_out(endpoint)
            }
        }
    }

    async fn await_page(&mut self, endpoint: Endpoint) -> RetrievalState {
        match self.session.wait_for_body(self.timeout).await {
            Visibility::Visible => RetrievalState::Ready(endpoint),
            Visibility::TimedOut => timed_out(endpoint),
        }
    }

    async fn capture(&mut self, identifier: &str, endpoint: Endpoint) -> RetrievalOutcome {
        if same_url(self.session.current_url(), &self.registry.root_url) {
            let frame = &self.registry.frame_name;
            if let Err(e) = self.session.switch_to_frame(frame).await {
                log::warn!("RIP {}: could not enter frame '{}': {}", identifier, frame, e);
            }
        }

        let document = Html::parse_document(self.session.page_source());
        match self.classifier.classify(&document) {
            PageClass::NotFound(marker) => RetrievalOutcome::NotFound {
                record: Record::empty(identifier, self.selection),
                endpoint,
                marker,
            },
            PageClass::Valid => {
                let values = self
                    .extractor
                    .extract(&document, self.catalog, self.selection);
                RetrievalOutcome::Extracted {
                    record: Record::new(identifier, self.selection, values),
                    endpoint,
                }
            }
        }
    }
}

fn timed_out(endpoint: Endpoint) -> RetrievalState {
    match endpoint {
        Endpoint::Primary => RetrievalState::PrimaryTimeout,
        Endpoint::Secondary => RetrievalState::SecondaryTimeout,
    }
}
