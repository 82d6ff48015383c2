//! Per-invocation application context: config, API client, session, guard.

use anyhow::{bail, Result};
use tracing::debug;

use memorialqr_core::auth::{ApiVerifier, GuardDecision, Session, SessionGuard};
use memorialqr_core::{ApiClient, Config, Route};

pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub session: Session,
    pub guard: SessionGuard<ApiVerifier>,
    pub json: bool,
}

impl App {
    pub fn new(config: Config, json: bool) -> Result<Self> {
        let api = ApiClient::with_timeout(config.effective_api_url(), config.request_timeout())?;
        let session = Session::new(config.token_store()?);
        debug!(
            api_url = %config.effective_api_url(),
            backend = ?config.token_backend,
            authenticated = session.is_authenticated(),
            "App context ready"
        );

        let guard = SessionGuard::new(session.clone(), ApiVerifier::new(api.clone()));
        Ok(Self {
            config,
            api,
            session,
            guard,
            json,
        })
    }

    /// API client carrying the current session token, if any.
    pub fn authed_api(&self) -> ApiClient {
        match self.session.token() {
            Some(token) => self.api.with_token(token),
            None => self.api.clone(),
        }
    }

    /// Run the guard for `route`; on a redirect, fail with a login hint.
    pub async fn enter(&self, route: Route) -> Result<ApiClient> {
        match self.guard.can_enter(&route).await {
            GuardDecision::Permit => Ok(self.authed_api()),
            GuardDecision::Redirect(to) => {
                bail!("Not logged in (redirected to {}). Run `memorialqr login` first.", to)
            }
        }
    }
}
