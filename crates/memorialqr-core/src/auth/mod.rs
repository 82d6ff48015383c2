//! Authentication module: the session credential and the navigation guard.
//!
//! This module provides:
//! - `TokenStore`: persistent storage for the one session credential
//!   (file, OS keychain, or memory)
//! - `Session`: the injected session handle (store + authenticated flag)
//! - `Verifier`: asks the API whether the stored credential is still valid
//! - `SessionGuard`: permits or redirects navigation to protected routes
//!
//! The flag is seeded from storage at startup. A stored credential is
//! trusted until a verification says otherwise.

pub mod guard;
pub mod login;
pub mod session;
pub mod store;
pub mod verifier;

pub use guard::{GuardDecision, SessionGuard};
pub use login::{login, login_error_message, LoginForm, LoginFormError};
pub use session::Session;
pub use store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, SessionData, StoreError, TokenStore};
pub use verifier::{ApiVerifier, VerificationOutcome, Verifier};
