//! RSVP sinks.
//!
//! A sink records one [`RsvpRecord`] somewhere durable. The HTTP layer
//! provides a Google Sheets implementation; this module holds the trait,
//! the sheet target policy, and the log-only sink used when no store is
//! configured.

use std::sync::Mutex;

use thiserror::Error;

use crate::models::rsvp::RsvpRecord;

/// Sheet used when the spreadsheet reports no sheets at all.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Boxed cause carried by [`SinkError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Step of a remote append at which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkStage {
    Authenticate,
    FetchMetadata,
    Append,
}

impl std::fmt::Display for SinkStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkStage::Authenticate => write!(f, "authenticate"),
            SinkStage::FetchMetadata => write!(f, "fetch spreadsheet metadata"),
            SinkStage::Append => write!(f, "append row"),
        }
    }
}

/// Error type for sink operations.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sheet store access failed while trying to {stage}")]
    StoreAccess {
        stage: SinkStage,
        #[source]
        source: BoxError,
    },
}

impl SinkError {
    pub fn store_access(stage: SinkStage, source: impl Into<BoxError>) -> Self {
        SinkError::StoreAccess {
            stage,
            source: source.into(),
        }
    }

    pub fn stage(&self) -> SinkStage {
        match self {
            SinkError::StoreAccess { stage, .. } => *stage,
        }
    }
}

/// What a sink did with a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    /// Row appended to the named sheet.
    Appended { sheet: String },
    /// No store configured; the record only went to the log.
    LoggedOnly,
}

impl SinkOutcome {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            SinkOutcome::Appended { .. } => "appended",
            SinkOutcome::LoggedOnly => "logged_only",
        }
    }
}

/// Destination for received RSVPs.
#[async_trait::async_trait]
pub trait RsvpSink: Send + Sync {
    /// Record one RSVP. A single attempt; callers do not retry.
    async fn append(&self, record: &RsvpRecord) -> Result<SinkOutcome, SinkError>;
}

/// Sheet chosen to receive a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSheet {
    pub name: String,
    /// True when the configured sheet was missing and another was picked.
    pub fallback: bool,
}

/// Picks the sheet that receives the row.
///
/// An exact title match on `desired` wins. Otherwise the first listed sheet
/// is used, or [`DEFAULT_SHEET_NAME`] when the listing is empty or the first
/// sheet has no title, so a typo in the configured name never fails a
/// submission. Untitled sheets appear as empty strings in `titles`.
pub fn resolve_target<S: AsRef<str>>(titles: &[S], desired: &str) -> TargetSheet {
    if titles.iter().any(|t| t.as_ref() == desired) {
        return TargetSheet {
            name: desired.to_string(),
            fallback: false,
        };
    }

    let name = titles
        .first()
        .map(|t| t.as_ref())
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_SHEET_NAME)
        .to_string();

    TargetSheet {
        name,
        fallback: true,
    }
}

/// Sink used when the sheet store is not configured.
///
/// Writes the full record to the diagnostic log and reports
/// [`SinkOutcome::LoggedOnly`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlySink;

#[async_trait::async_trait]
impl RsvpSink for LogOnlySink {
    async fn append(&self, record: &RsvpRecord) -> Result<SinkOutcome, SinkError> {
        let rendered = serde_json::to_string(record).unwrap_or_else(|_| format!("{:?}", record));
        tracing::info!(
            record = %rendered,
            "RSVP received (sheet store not configured, logging only)"
        );
        Ok(SinkOutcome::LoggedOnly)
    }
}

/// In-memory sink for development and testing.
///
/// Keeps every appended record and reports them as appended to `sheet`.
#[derive(Debug, Default)]
pub struct MockSink {
    sheet: String,
    simulate_failure: bool,
    records: Mutex<Vec<RsvpRecord>>,
}

impl MockSink {
    /// Create a mock sink that appends to `sheet`.
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            simulate_failure: false,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock sink whose appends fail with a store access error.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Records appended so far.
    pub fn records(&self) -> Vec<RsvpRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl RsvpSink for MockSink {
    async fn append(&self, record: &RsvpRecord) -> Result<SinkOutcome, SinkError> {
        if self.simulate_failure {
            tracing::debug!(name = %record.name(), "[MOCK] Simulating sheet store failure");
            return Err(SinkError::store_access(
                SinkStage::Append,
                "simulated store failure",
            ));
        }

        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());

        Ok(SinkOutcome::Appended {
            sheet: self.sheet.clone(),
        })
    }
}
