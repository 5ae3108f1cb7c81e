//! Domain layer for the RSVP service.
//!
//! This crate contains:
//! - The RSVP record model and its validation
//! - The sink abstraction and sheet target policy
//! - The submission service that ties them together

pub mod models;
pub mod services;
