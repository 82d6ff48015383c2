use std::future::Future;

use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};

/// Result of one verification round trip. Never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationOutcome {
    /// The server accepted the credential.
    Valid,
    /// The server rejected the credential.
    Invalid,
    /// No usable answer: transport error, timeout, unexpected status or body.
    Unreachable,
}

impl VerificationOutcome {
    pub fn is_valid(self) -> bool {
        self == VerificationOutcome::Valid
    }
}

/// Asks a remote authority whether a credential is still valid.
pub trait Verifier: Send + Sync {
    fn check(&self, credential: &str) -> impl Future<Output = VerificationOutcome> + Send;
}

/// Verifier backed by `GET /auth/verify-token`.
#[derive(Clone)]
pub struct ApiVerifier {
    api: ApiClient,
}

impl ApiVerifier {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl Verifier for ApiVerifier {
    async fn check(&self, credential: &str) -> VerificationOutcome {
        match self.api.verify_token(credential).await {
            Ok(true) => VerificationOutcome::Valid,
            Ok(false) => VerificationOutcome::Invalid,
            Err(e) => outcome_for_error(&e),
        }
    }
}

/// An explicit rejection (401/403) is `Invalid`; everything else is `Unreachable`.
fn outcome_for_error(error: &ApiError) -> VerificationOutcome {
    match error {
        ApiError::Unauthorized | ApiError::AccessDenied(_) => {
            debug!(error = %error, "Token rejected by server");
            VerificationOutcome::Invalid
        }
        _ => {
            warn!(error = %error, "Token verification failed");
            VerificationOutcome::Unreachable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_for_error() {
        assert_eq!(outcome_for_error(&ApiError::Unauthorized), VerificationOutcome::Invalid);
        assert_eq!(
            outcome_for_error(&ApiError::AccessDenied(String::new())),
            VerificationOutcome::Invalid
        );
        assert_eq!(
            outcome_for_error(&ApiError::ServerError("boom".to_string())),
            VerificationOutcome::Unreachable
        );
        assert_eq!(
            outcome_for_error(&ApiError::InvalidResponse("garbage".to_string())),
            VerificationOutcome::Unreachable
        );
        assert_eq!(outcome_for_error(&ApiError::RateLimited), VerificationOutcome::Unreachable);
        assert_eq!(
            outcome_for_error(&ApiError::NotFound(String::new())),
            VerificationOutcome::Unreachable
        );
    }

    #[tokio::test]
    async fn test_api_verifier_unreachable_host() {
        // Port 9 (discard) on loopback is not expected to run an HTTP server.
        let api = ApiClient::with_timeout("http://127.0.0.1:9", std::time::Duration::from_secs(2)).unwrap();
        let outcome = ApiVerifier::new(api).check("abc123").await;
        assert_eq!(outcome, VerificationOutcome::Unreachable);
    }
}
