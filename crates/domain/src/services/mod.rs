//! Domain services for the RSVP pipeline.

pub mod sink;
pub mod submission;

pub use sink::{
    resolve_target, BoxError, LogOnlySink, MockSink, RsvpSink, SinkError, SinkOutcome, SinkStage,
    TargetSheet, DEFAULT_SHEET_NAME,
};
pub use submission::{
    Confirmation, SubmissionError, SubmissionService, FAILURE_MESSAGE, NOT_CONFIGURED_MESSAGE,
    SUBMITTED_MESSAGE,
};
