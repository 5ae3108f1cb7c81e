//! RSVP submission endpoint.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};

use crate::app::AppState;
use crate::error::{ApiError, RsvpResponse};
use crate::middleware::record_rsvp_submission;

/// Record an RSVP.
///
/// POST /api/rsvp
///
/// The body is read as raw bytes, and a body that cannot be read at all
/// (over the size limit, aborted upload) is caught here too, so anything
/// unparseable is answered like every other failure: `500` with the
/// generic message.
pub async fn submit_rsvp(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RsvpResponse>, ApiError> {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            record_rsvp_submission("failed");
            return Err(rejection.into());
        }
    };

    match state.submissions.submit(&body).await {
        Ok(confirmation) => {
            record_rsvp_submission(confirmation.outcome.label());
            Ok(Json(RsvpResponse {
                success: true,
                message: confirmation.message().to_string(),
            }))
        }
        Err(err) => {
            record_rsvp_submission("failed");
            Err(err.into())
        }
    }
}
