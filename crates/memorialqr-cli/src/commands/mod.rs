//! Command handler layer.
//!
//! Parses nothing itself: each handler receives already-parsed arguments,
//! passes the session guard for its route, calls the API and prints.
//!
//! ## Files
//! - `auth.rs`: login/logout/status/verify/open.
//! - `persons.rs`: person records, images, QR codes.
//! - `companies.rs`: company records, media, QR codes, locations.

pub mod auth;
pub mod companies;
pub mod persons;
