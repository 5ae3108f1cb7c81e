//! External service integrations.

pub mod google_auth;
pub mod sheets;

use std::sync::Arc;

use domain::services::{LogOnlySink, RsvpSink};

use crate::config::SheetsConfig;

pub use sheets::{GoogleSheetsSink, SheetsError};

/// Choose the RSVP sink for this process.
///
/// Without both a spreadsheet id and credentials, RSVPs are only logged.
/// The choice holds for the life of the process. Credentials that are set
/// but unusable are logged here and fail each submission.
pub fn build_sink(config: &SheetsConfig) -> Result<Arc<dyn RsvpSink>, SheetsError> {
    if !config.is_configured() {
        tracing::warn!("Google Sheets not configured; RSVPs will only be logged");
        return Ok(Arc::new(LogOnlySink));
    }

    let sink = GoogleSheetsSink::new(config)?;
    match sink.credentials_error() {
        Some(error) => tracing::error!(
            sheet_name = %sink.sheet_name(),
            error = %error,
            "Google credentials could not be loaded; RSVP submissions will fail"
        ),
        None => tracing::info!(
            sheet_name = %sink.sheet_name(),
            client_email = %sink.client_email().unwrap_or_default(),
            "Google Sheets sink configured"
        ),
    }
    Ok(Arc::new(sink))
}
