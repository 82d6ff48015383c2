//! Core library for memorialqr.
//!
//! Client side of the memorial QR service: the REST API client, the
//! session guard that gates protected navigation, person and company
//! models, and media helpers. The command line front end lives in the
//! `memorialqr-cli` crate.

pub mod api;
pub mod auth;
pub mod config;
pub mod media;
pub mod models;
pub mod routes;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{GuardDecision, Session, SessionGuard, VerificationOutcome};
pub use config::Config;
pub use routes::Route;
