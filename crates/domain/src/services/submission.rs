//! RSVP submission service.
//!
//! Turns a raw request body into an [`RsvpRecord`], stamps it with the
//! receipt time and hands it to the configured sink. One attempt per
//! submission; failures are terminal for that request.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use super::sink::{LogOnlySink, RsvpSink, SinkError, SinkOutcome};
use crate::models::rsvp::{RsvpError, RsvpRecord};

/// Confirmation text when the row reached the sheet.
pub const SUBMITTED_MESSAGE: &str = "RSVP submitted successfully";

/// Confirmation text when no sheet store is configured.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "RSVP received (not logged to Google Sheets - configuration needed)";

/// Generic failure text shown to guests.
pub const FAILURE_MESSAGE: &str = "Failed to submit RSVP";

/// Successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub outcome: SinkOutcome,
}

impl Confirmation {
    /// Guest-facing confirmation text.
    pub fn message(&self) -> &'static str {
        match self.outcome {
            SinkOutcome::Appended { .. } => SUBMITTED_MESSAGE,
            SinkOutcome::LoggedOnly => NOT_CONFIGURED_MESSAGE,
        }
    }
}

/// Why a submission failed. Only the HTTP boundary decides what the guest
/// sees; the cause chain is for the logs.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("malformed RSVP input")]
    MalformedInput(#[from] RsvpError),

    #[error("RSVP could not be stored")]
    Sink(#[from] SinkError),
}

/// Receives RSVPs and routes them to a sink.
#[derive(Clone)]
pub struct SubmissionService {
    sink: Arc<dyn RsvpSink>,
}

impl SubmissionService {
    pub fn new(sink: Arc<dyn RsvpSink>) -> Self {
        Self { sink }
    }

    /// Service for a process without sheet store configuration.
    pub fn log_only() -> Self {
        Self::new(Arc::new(LogOnlySink))
    }

    /// Parse, stamp and store one RSVP.
    pub async fn submit(&self, raw: &[u8]) -> Result<Confirmation, SubmissionError> {
        let record = RsvpRecord::parse(raw, Utc::now())?;
        let outcome = self.sink.append(&record).await?;
        Ok(Confirmation { outcome })
    }
}

impl std::fmt::Debug for SubmissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionService").finish_non_exhaustive()
    }
}
