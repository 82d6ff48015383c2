use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::session::Session;
use super::verifier::{VerificationOutcome, Verifier};
use crate::routes::Route;

/// What the guard decided for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "lowercase")]
pub enum GuardDecision {
    Permit,
    Redirect(Route),
}

impl GuardDecision {
    pub fn is_permit(&self) -> bool {
        matches!(self, GuardDecision::Permit)
    }
}

/// Gates navigation to protected routes.
///
/// Every call resolves to `Permit` or `Redirect(login)`; verification
/// failures are absorbed here and never reach the caller.
///
/// Verification runs on its own task: dropping a `can_enter` future does
/// not stop it, and its outcome still lands on the session.
pub struct SessionGuard<V> {
    session: Session,
    verifier: Arc<V>,
    login_route: Route,
}

impl<V: Verifier + 'static> SessionGuard<V> {
    pub fn new(session: Session, verifier: V) -> Self {
        Self {
            session,
            verifier: Arc::new(verifier),
            login_route: Route::Login,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn can_enter(&self, destination: &Route) -> GuardDecision {
        if !destination.is_protected() {
            return GuardDecision::Permit;
        }

        // Optimistic: a session that looks authenticated is not re-checked.
        if self.session.is_authenticated() {
            debug!(%destination, "Session authenticated, permitting");
            return GuardDecision::Permit;
        }

        match self.verify_detached().await {
            VerificationOutcome::Valid => {
                debug!(%destination, "Credential verified, permitting");
                GuardDecision::Permit
            }
            outcome => {
                info!(%destination, ?outcome, redirect = %self.login_route, "Navigation denied");
                GuardDecision::Redirect(self.login_route.clone())
            }
        }
    }

    async fn verify_detached(&self) -> VerificationOutcome {
        let session = self.session.clone();
        let verifier = Arc::clone(&self.verifier);
        let task = tokio::spawn(async move { session.verify(verifier.as_ref()).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Verification task failed");
                VerificationOutcome::Unreachable
            }
        }
    }

    /// Resolve `path` and return the route the user actually lands on.
    pub async fn navigate(&self, path: &str) -> Route {
        let requested = Route::parse(path);
        match self.can_enter(&requested).await {
            GuardDecision::Permit => requested,
            GuardDecision::Redirect(to) => to,
        }
    }
}
