use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{error, info};

use super::session::Session;
use crate::api::{ApiClient, ApiError, LoginResponse};

/// Minimum password length accepted by the login form.
const MIN_PASSWORD_LENGTH: usize = 4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoginFormError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least 4 characters")]
    PasswordTooShort,
}

/// Email and password as typed by the user.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), LoginFormError> {
        if !is_valid_email(&self.email) {
            return Err(LoginFormError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(LoginFormError::PasswordTooShort);
        }
        Ok(())
    }
}

/// Loose address check: one `@`, something on both sides, no whitespace.
fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Validate the form, log in, and start the session on success.
pub async fn login(api: &ApiClient, session: &Session, form: &LoginForm) -> Result<LoginResponse> {
    form.validate()?;

    let response = match api.login(&form.email, &form.password).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Login failed");
            return Err(e);
        }
    };

    let token = response
        .token()
        .ok_or_else(|| ApiError::InvalidResponse("login response carried no token".to_string()))?;
    session.login(token).context("Failed to store session token")?;

    info!(email = %form.email, "Login successful");
    Ok(response)
}

/// Turn a login error into the message shown to the user.
pub fn login_error_message(error: &anyhow::Error) -> String {
    if let Some(form_error) = error.downcast_ref::<LoginFormError>() {
        return form_error.to_string();
    }
    match error.downcast_ref::<ApiError>() {
        Some(ApiError::Unauthorized) => "Invalid email or password".to_string(),
        Some(ApiError::NetworkError(e)) if e.is_timeout() => {
            "Connection timed out. Please try again.".to_string()
        }
        Some(ApiError::NetworkError(_)) => {
            "Unable to connect to server. Check your internet connection.".to_string()
        }
        Some(api_error) => api_error
            .server_message()
            .unwrap_or_else(|| "Login failed".to_string()),
        None => format!("Login failed: {}", error),
    }
}
