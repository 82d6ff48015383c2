//! REST API client module for the memorial QR service.
//!
//! This module provides the `ApiClient` for communicating with the
//! remote API that owns person and company records, their media and
//! their QR codes.
//!
//! The API uses bearer token authentication; the token is obtained from
//! the `/auth/login` endpoint and checked with `/auth/verify-token`.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse, LoginUser};
pub use error::ApiError;
