use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::store::{StoreError, TokenStore};
use super::verifier::{VerificationOutcome, Verifier};

/// Handle to the client session: the credential store plus the
/// authenticated flag.
///
/// Cloning is cheap and every clone shares the same store and flag, so a
/// handle can be passed to each component that reads or changes the
/// session. Separate `Session::new` calls give isolated sessions.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    authenticated: Arc<watch::Sender<bool>>,
}

impl Session {
    /// Seed the flag from storage, without a verification round trip.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let seeded = store.has_credential();
        debug!(authenticated = seeded, "Session seeded from storage");
        let (tx, _rx) = watch::channel(seeded);
        Self {
            store,
            authenticated: Arc::new(tx),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    /// Watch the authenticated flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    /// The stored credential. Unreadable storage counts as no credential.
    pub fn token(&self) -> Option<String> {
        match self.store.load() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential");
                None
            }
        }
    }

    pub fn has_credential(&self) -> bool {
        self.token().is_some()
    }

    fn set_authenticated(&self, value: bool) {
        self.authenticated.send_replace(value);
    }

    /// `anonymous -> authenticated`: store the credential from a successful login.
    pub fn login(&self, token: &str) -> Result<(), StoreError> {
        self.store.save(token)?;
        self.set_authenticated(true);
        info!("Session started");
        Ok(())
    }

    /// `authenticated -> anonymous`: forget the credential.
    ///
    /// The flag drops even if the store fails to clear.
    pub fn logout(&self) -> Result<(), StoreError> {
        let result = self.store.clear();
        self.set_authenticated(false);
        info!("Session ended");
        result
    }

    /// Check the stored credential with `verifier` and apply the outcome.
    ///
    /// Without a credential this is `Invalid` and the verifier is never called.
    pub async fn verify<V: Verifier>(&self, verifier: &V) -> VerificationOutcome {
        let Some(token) = self.token() else {
            debug!("No stored credential, skipping verification");
            self.set_authenticated(false);
            return VerificationOutcome::Invalid;
        };

        let outcome = verifier.check(&token).await;
        self.apply(&token, outcome);
        outcome
    }

    fn apply(&self, verified_token: &str, outcome: VerificationOutcome) {
        debug!(?outcome, "Applying verification outcome");
        if outcome.is_valid() {
            self.set_authenticated(true);
            return;
        }

        // Invalid and unreachable end the session alike. A newer login may
        // have replaced the credential while the check was in flight.
        if self.token().as_deref() != Some(verified_token) {
            debug!("Verified credential already replaced");
            return;
        }
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear credential after failed verification");
        }
        self.set_authenticated(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryTokenStore;

    struct Fixed(VerificationOutcome);

    impl Verifier for Fixed {
        async fn check(&self, _credential: &str) -> VerificationOutcome {
            self.0
        }
    }

    #[test]
    fn test_seeded_from_storage() {
        let empty = Session::new(Arc::new(MemoryTokenStore::new()));
        assert!(!empty.is_authenticated());

        let stored = Session::new(Arc::new(MemoryTokenStore::with_token("abc123")));
        assert!(stored.is_authenticated());
        assert_eq!(stored.token().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_login_logout_transitions() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        let rx = session.subscribe();

        session.login("tok").unwrap();
        assert!(session.is_authenticated());
        assert!(*rx.borrow());
        assert!(session.has_credential());

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert!(!*rx.borrow());
        assert!(!session.has_credential());
    }

    #[test]
    fn test_login_rejects_empty_token() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        assert!(matches!(session.login(""), Err(StoreError::EmptyToken)));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clones_share_state_and_instances_are_isolated() {
        let a = Session::new(Arc::new(MemoryTokenStore::new()));
        let a2 = a.clone();
        let b = Session::new(Arc::new(MemoryTokenStore::new()));

        a.login("tok").unwrap();
        assert!(a2.is_authenticated());
        assert!(!b.is_authenticated());
    }

    #[tokio::test]
    async fn test_verify_invalid_clears_credential() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_token("old")));
        let outcome = session.verify(&Fixed(VerificationOutcome::Invalid)).await;
        assert_eq!(outcome, VerificationOutcome::Invalid);
        assert!(!session.is_authenticated());
        assert!(!session.has_credential());
    }

    #[tokio::test]
    async fn test_verify_unreachable_clears_credential() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_token("abc123")));
        let outcome = session.verify(&Fixed(VerificationOutcome::Unreachable)).await;
        assert_eq!(outcome, VerificationOutcome::Unreachable);
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn test_stale_rejection_keeps_newer_login() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_token("old")));
        // A login lands between the request and its response.
        session.login("new").unwrap();
        session.apply("old", VerificationOutcome::Invalid);
        session.apply("old", VerificationOutcome::Unreachable);
        assert_eq!(session.token().as_deref(), Some("new"));
        assert!(session.is_authenticated());
    }
}
