//! Domain models.

pub mod rsvp;

pub use rsvp::{Attending, GuestCount, RsvpError, RsvpRecord, SubmitRsvpRequest, ROW_COLUMNS};
