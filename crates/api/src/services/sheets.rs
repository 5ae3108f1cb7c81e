//! Google Sheets RSVP sink.
//!
//! Implements the [`RsvpSink`] trait on top of the Sheets API v4. Each
//! append walks the same steps: obtain an access token, list the sheets in
//! the spreadsheet, resolve the target sheet, then append one row with
//! `USER_ENTERED` so Sheets interprets dates and numbers. A failure at any
//! step aborts the append and is reported with the step that failed.
//!
//! Credentials that cannot be loaded do not stop the server; every append
//! then fails at the authenticate step until the bundle is fixed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::models::RsvpRecord;
use domain::services::{resolve_target, RsvpSink, SinkError, SinkOutcome, SinkStage};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};

use super::google_auth::{ServiceAccountAuth, ServiceAccountCredentials, SPREADSHEETS_SCOPE};
use crate::config::SheetsConfig;

/// Columns written for each RSVP row.
const ROW_RANGE: &str = "A:F";

/// Spreadsheet metadata, trimmed to the sheet titles.
#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    #[serde(default)]
    properties: Option<SheetProperties>,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    #[serde(default)]
    title: Option<String>,
}

impl SpreadsheetMetadata {
    /// Titles in sheet order; an untitled sheet keeps its slot as `""`.
    fn titles(self) -> Vec<String> {
        self.sheets
            .into_iter()
            .map(|sheet| sheet.properties.and_then(|p| p.title).unwrap_or_default())
            .collect()
    }
}

/// Body of a `values.append` call.
#[derive(Debug, Serialize)]
struct ValueRange {
    values: Vec<Vec<String>>,
}

/// Error type for Google Sheets operations.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("Failed to parse credentials: {0}")]
    Credentials(String),

    #[error("Failed to sign service account assertion")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Failed to get access token: {0}")]
    Token(String),

    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid Sheets API URL: {0}")]
    InvalidUrl(String),
}

/// RSVP sink backed by a Google spreadsheet.
pub struct GoogleSheetsSink {
    client: Client,
    auth: Result<ServiceAccountAuth, Arc<SheetsError>>,
    spreadsheet_id: String,
    sheet_name: String,
    api_base_url: Url,
}

impl GoogleSheetsSink {
    /// Create a new Google Sheets sink.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or the API base
    /// URL is invalid. Unusable credentials are kept and reported by
    /// [`credentials_error`](Self::credentials_error) instead.
    pub fn new(config: &SheetsConfig) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        let api_base_url = Url::parse(&config.api_base_url)
            .map_err(|e| SheetsError::InvalidUrl(format!("{}: {}", config.api_base_url, e)))?;

        let auth = ServiceAccountCredentials::load(&config.credentials)
            .map(|credentials| {
                ServiceAccountAuth::new(client.clone(), credentials, SPREADSHEETS_SCOPE)
            })
            .map_err(Arc::new);

        Ok(Self {
            auth,
            client,
            spreadsheet_id: config.spreadsheet_id.trim().to_string(),
            sheet_name: config.sheet_name.clone(),
            api_base_url,
        })
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Service account in use, if the credentials loaded.
    pub fn client_email(&self) -> Option<&str> {
        self.auth.as_ref().ok().map(|auth| auth.client_email())
    }

    /// Why the configured credentials could not be loaded.
    pub fn credentials_error(&self) -> Option<&SheetsError> {
        self.auth.as_ref().err().map(|e| e.as_ref())
    }

    /// `{base}/spreadsheets/{id}/{extra...}` with every segment escaped.
    fn endpoint(&self, extra: &[&str]) -> Result<Url, SheetsError> {
        let mut url = self.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl(self.api_base_url.to_string()))?
            .pop_if_empty()
            .extend(["spreadsheets", self.spreadsheet_id.as_str()])
            .extend(extra);
        Ok(url)
    }

    /// List sheet titles in spreadsheet order.
    async fn fetch_sheet_titles(&self, token: &str) -> Result<Vec<String>, SheetsError> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let metadata: SpreadsheetMetadata = ensure_success(response).await?.json().await?;

        Ok(metadata.titles())
    }

    /// Append one row after the last populated row of `sheet`.
    async fn append_row(
        &self,
        token: &str,
        sheet: &str,
        row: Vec<String>,
    ) -> Result<(), SheetsError> {
        let range = format!("{}:append", a1_range(sheet));
        let mut url = self.endpoint(&["values", range.as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        let body = ValueRange { values: vec![row] };
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Quoted A1 range covering the RSVP columns of `sheet`.
fn a1_range(sheet: &str) -> String {
    format!("'{}'!{}", sheet.replace('\'', "''"), ROW_RANGE)
}

async fn ensure_success(response: Response) -> Result<Response, SheetsError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(SheetsError::Api { status, body })
}

#[async_trait]
impl RsvpSink for GoogleSheetsSink {
    #[tracing::instrument(
        name = "sheets_append",
        skip_all,
        fields(spreadsheet_id = %self.spreadsheet_id)
    )]
    async fn append(&self, record: &RsvpRecord) -> Result<SinkOutcome, SinkError> {
        let auth = self
            .auth
            .as_ref()
            .map_err(|e| SinkError::store_access(SinkStage::Authenticate, Arc::clone(e)))?;

        let token = auth
            .access_token()
            .await
            .map_err(|e| SinkError::store_access(SinkStage::Authenticate, e))?;

        let titles = self
            .fetch_sheet_titles(&token)
            .await
            .map_err(|e| SinkError::store_access(SinkStage::FetchMetadata, e))?;

        tracing::debug!(available_sheets = ?titles, "Fetched spreadsheet metadata");

        let target = resolve_target(&titles, &self.sheet_name);
        if target.fallback {
            tracing::warn!(
                configured_sheet = %self.sheet_name,
                chosen_sheet = %target.name,
                available_sheets = ?titles,
                "Configured sheet not found, using first available sheet"
            );
        }

        self.append_row(&token, &target.name, record.to_row())
            .await
            .map_err(|e| SinkError::store_access(SinkStage::Append, e))?;

        tracing::info!(
            sheet = %target.name,
            name = %record.name(),
            attending = %record.attending(),
            guest_count = record.guest_count().get(),
            "RSVP appended to sheet"
        );

        Ok(SinkOutcome::Appended { sheet: target.name })
    }
}
