//! RSVP domain models.
//!
//! A submission arrives as raw JSON from the invitation page, is validated
//! into a [`SubmitRsvpRequest`] and then stamped into an immutable
//! [`RsvpRecord`] that is handed to exactly one sink.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Column layout of a stored RSVP row.
pub const ROW_COLUMNS: [&str; 6] = [
    "timestamp",
    "name",
    "email",
    "attending",
    "guestCount",
    "message",
];

/// Whether the guest will attend the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attending {
    Yes,
    No,
}

impl Attending {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attending::Yes => "yes",
            Attending::No => "no",
        }
    }
}

impl std::fmt::Display for Attending {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of people in the party.
///
/// The invitation form sends a JSON number on first render and the selected
/// `<option>` value (a string) once the guest touches the dropdown, so both
/// shapes are accepted. Integral floats such as `2.0` count as integers.
/// The 1-6 range is the form's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGuestCount", into = "i64")]
pub struct GuestCount(i64);

impl GuestCount {
    pub fn new(count: i64) -> Self {
        Self(count)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<GuestCount> for i64 {
    fn from(count: GuestCount) -> Self {
        count.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGuestCount {
    Number(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<RawGuestCount> for GuestCount {
    type Error = String;

    fn try_from(raw: RawGuestCount) -> Result<Self, Self::Error> {
        match raw {
            RawGuestCount::Number(n) => Ok(Self(n)),
            // i64::MAX as f64 rounds up to 2^63, hence the strict bound.
            RawGuestCount::Float(f)
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
            {
                Ok(Self(f as i64))
            }
            RawGuestCount::Float(f) => Err(format!("guestCount {} is not an integer", f)),
            RawGuestCount::Text(text) => text
                .trim()
                .parse::<i64>()
                .map(Self)
                .map_err(|_| format!("guestCount '{}' is not an integer", text)),
        }
    }
}

/// RSVP as submitted by the invitation page.
///
/// Unknown fields are ignored, which includes any caller-supplied
/// `timestamp`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRsvpRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,

    /// Presence only; address format is checked by the page.
    #[validate(custom(function = "validate_not_blank"))]
    pub email: String,

    pub attending: Attending,

    pub guest_count: GuestCount,

    #[serde(default)]
    pub message: Option<String>,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Field must not be empty".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Reasons raw input cannot become an [`RsvpRecord`].
#[derive(Debug, Error)]
pub enum RsvpError {
    #[error("request body is not a valid RSVP document")]
    Malformed(#[from] serde_json::Error),

    #[error("RSVP failed validation")]
    Invalid(#[from] validator::ValidationErrors),
}

/// A received RSVP, stamped with the server's receipt time.
///
/// Fields are private so a record cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRecord {
    timestamp: DateTime<Utc>,
    name: String,
    email: String,
    attending: Attending,
    guest_count: GuestCount,
    message: String,
}

impl RsvpRecord {
    /// Parses a raw JSON body and stamps it with `received_at`.
    pub fn parse(raw: &[u8], received_at: DateTime<Utc>) -> Result<Self, RsvpError> {
        let request: SubmitRsvpRequest = serde_json::from_slice(raw)?;
        Self::from_submission(request, received_at)
    }

    /// Validates a submission and stamps it with `received_at`.
    pub fn from_submission(
        request: SubmitRsvpRequest,
        received_at: DateTime<Utc>,
    ) -> Result<Self, RsvpError> {
        request.validate()?;

        Ok(Self {
            timestamp: received_at,
            name: request.name,
            email: request.email,
            attending: request.attending,
            guest_count: request.guest_count,
            message: request.message.unwrap_or_default(),
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn attending(&self) -> Attending {
        self.attending
    }

    pub fn guest_count(&self) -> GuestCount {
        self.guest_count
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Receipt time as ISO-8601 UTC with millisecond precision,
    /// e.g. `2025-10-01T09:30:00.000Z`.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Serializes the record in [`ROW_COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp_text(),
            self.name.clone(),
            self.email.clone(),
            self.attending.to_string(),
            self.guest_count.get().to_string(),
            self.message.clone(),
        ]
    }
}
