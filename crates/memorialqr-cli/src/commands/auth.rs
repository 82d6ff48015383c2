use std::io::{self, Write};

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::warn;

use memorialqr_core::auth::{self, ApiVerifier, LoginForm};
use memorialqr_core::config::TokenBackend;
use memorialqr_core::{Route, VerificationOutcome};

use crate::context::App;
use crate::output::{print_done, print_one};

/// Environment variable supplying the password non-interactively
const PASSWORD_ENV: &str = "MEMORIALQR_PASSWORD";

#[derive(Serialize)]
struct Status {
    authenticated: bool,
    credential_stored: bool,
    api_url: String,
    token_backend: TokenBackend,
}

#[derive(Serialize)]
struct Navigation {
    requested: String,
    landed: Route,
    redirected: bool,
}

pub async fn login(app: &mut App, email: Option<String>) -> Result<()> {
    let email = match email.or_else(|| app.config.last_email.clone()) {
        Some(email) => email,
        None => prompt_email()?,
    };
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ")?,
    };

    let form = LoginForm::new(email, password);
    if let Err(e) = auth::login(&app.api, &app.session, &form).await {
        bail!("{}", auth::login_error_message(&e));
    }

    app.config.last_email = Some(form.email.clone());
    if let Err(e) = app.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    print_done(app.json, &format!("Logged in as {}", form.email))
}

fn prompt_email() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;

    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    Ok(email.trim().to_string())
}

pub fn logout(app: &App) -> Result<()> {
    app.session.logout()?;
    print_done(app.json, "Logged out")
}

pub fn status(app: &App) -> Result<()> {
    let status = Status {
        authenticated: app.session.is_authenticated(),
        credential_stored: app.session.has_credential(),
        api_url: app.config.effective_api_url().to_string(),
        token_backend: app.config.token_backend,
    };
    print_one(app.json, status, |s| {
        let state = if s.authenticated { "authenticated" } else { "anonymous" };
        format!("{} (api: {})", state, s.api_url)
    })
}

pub async fn verify(app: &App) -> Result<()> {
    let verifier = ApiVerifier::new(app.api.clone());
    let outcome = app.session.verify(&verifier).await;
    print_one(app.json, outcome, |o| {
        let message = match o {
            VerificationOutcome::Valid => "Session is valid",
            VerificationOutcome::Invalid => "Session is not valid, please log in",
            VerificationOutcome::Unreachable => "Could not reach the server, please log in again",
        };
        message.to_string()
    })
}

pub async fn open(app: &App, path: &str) -> Result<()> {
    let requested = Route::parse(path);
    let landed = app.guard.navigate(path).await;
    let nav = Navigation {
        requested: path.to_string(),
        redirected: landed != requested,
        landed,
    };
    print_one(app.json, nav, |n| n.landed.path())
}
