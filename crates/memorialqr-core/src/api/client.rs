//! API client for communicating with the memorial QR REST API.
//!
//! This module provides the `ApiClient` struct for logging in, verifying
//! the session token, and managing person and company records along with
//! their media and QR codes.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::media::{upload_mime_type, MediaFile};
use crate::models::{
    Company, CreateCompany, CreatePerson, ImagesResponse, MediaResponse, Person, UpdateCompany,
    UpdatePerson,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Multipart field name for person image uploads.
const PERSON_UPLOAD_FIELD: &str = "image";

/// Multipart field name for company media uploads.
const COMPANY_UPLOAD_FIELD: &str = "media";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Response of `POST /auth/login`.
///
/// The API returns the token as `access_token`; some deployments use
/// `token` instead.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl LoginResponse {
    /// The issued token, if the response carried a non-empty one.
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.as_deref().filter(|t| !t.is_empty()))
    }
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    valid: Option<bool>,
}

#[derive(Debug, Serialize)]
struct RemoveImageRequest<'a> {
    #[serde(rename = "imagePath")]
    image_path: &'a str,
}

#[derive(Debug, Serialize)]
struct RemoveMediaRequest<'a> {
    #[serde(rename = "mediaPath")]
    media_path: &'a str,
}

/// API client for the memorial QR service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the given base URL (e.g. `https://host/api`)
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .context("Token contains characters not allowed in a header")?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: Response) -> Result<Option<Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request built by `build`, retrying with exponential backoff
    /// while the server answers 429.
    async fn send<F>(&self, url: &str, build: F) -> Result<Response>
    where
        F: Fn() -> Result<RequestBuilder>,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build()?
                .headers(self.auth_headers()?)
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self.send(&url, || Ok(self.client.get(&url))).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self.send(&url, || Ok(self.client.post(&url).json(body))).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self.send(&url, || Ok(self.client.patch(&url).json(body))).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// DELETE with an optional JSON body; the response body is ignored.
    async fn delete<B: Serialize>(&self, path: &str, body: Option<&B>) -> Result<()> {
        let url = self.url(path);
        self.send(&url, || {
            let request = self.client.delete(&url);
            Ok(match body {
                Some(body) => request.json(body),
                None => request,
            })
        })
        .await?;
        Ok(())
    }

    /// POST with no payload, ignoring the response body.
    async fn post_empty(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        self.send(&url, || Ok(self.client.post(&url).json(&serde_json::json!({}))))
            .await?;
        Ok(())
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url(path);
        let response = self.send(&url, || Ok(self.client.get(&url))).await?;
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        Ok(bytes.to_vec())
    }

    async fn upload_file(&self, path: &str, field: &'static str, file: &Path) -> Result<()> {
        let url = self.url(path);
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow::anyhow!("Not a file: {}", file.display()))?;
        let contents = tokio::fs::read(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let mime = upload_mime_type(&filename);
        debug!(file = %filename, mime, bytes = contents.len(), "Uploading");

        self.send(&url, || {
            let part = multipart::Part::bytes(contents.clone())
                .file_name(filename.clone())
                .mime_str(mime)?;
            let form = multipart::Form::new().part(field, part);
            Ok(self.client.post(&url).multipart(form))
        })
        .await?;
        Ok(())
    }

    // ===== Authentication =====

    /// Log in with email and password and return the login response.
    /// A successful HTTP response without a token is reported as an error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let url = self.url("/auth/login");
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;
        let login: LoginResponse = response.json().await.context("Failed to parse login response")?;

        if login.token().is_none() {
            return Err(ApiError::InvalidResponse("login response carried no token".to_string()).into());
        }
        Ok(login)
    }

    /// Ask the server whether `token` is still valid.
    ///
    /// Issues exactly one request (no rate-limit retries). A missing or null
    /// `valid` field counts as `false`.
    pub async fn verify_token(&self, token: &str) -> Result<bool, ApiError> {
        let url = self.url("/auth/verify-token");
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        let parsed: VerifyResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("verify-token body: {}", e)))?;
        Ok(parsed.valid.unwrap_or(false))
    }

    // ===== Persons =====

    pub async fn fetch_persons(&self) -> Result<Vec<Person>> {
        self.get("/persons").await
    }

    pub async fn fetch_person(&self, id: i64) -> Result<Person> {
        self.get(&format!("/persons/{}", id)).await
    }

    pub async fn fetch_person_by_tcno(&self, tcno: &str) -> Result<Person> {
        self.get(&format!("/persons/tcno/{}", tcno)).await
    }

    pub async fn create_person(&self, person: &CreatePerson) -> Result<Person> {
        self.post("/persons", person).await
    }

    pub async fn update_person(&self, id: i64, person: &UpdatePerson) -> Result<Person> {
        self.patch(&format!("/persons/{}", id), person).await
    }

    pub async fn delete_person(&self, id: i64) -> Result<()> {
        self.delete::<()>(&format!("/persons/{}", id), None).await
    }

    pub async fn upload_person_image(&self, tcno: &str, file: &Path) -> Result<()> {
        self.upload_file(&format!("/persons/{}/upload-image", tcno), PERSON_UPLOAD_FIELD, file)
            .await
    }

    pub async fn remove_person_image(&self, tcno: &str, image_path: &str) -> Result<()> {
        let body = RemoveImageRequest { image_path };
        self.delete(&format!("/persons/{}/remove-image", tcno), Some(&body)).await
    }

    pub async fn fetch_person_images(&self, tcno: &str) -> Result<Vec<MediaFile>> {
        let response: ImagesResponse = self.get(&format!("/persons/{}/images", tcno)).await?;
        Ok(response
            .images
            .into_iter()
            .map(|f| MediaFile::new(self.person_image_url(tcno, &f), f))
            .collect())
    }

    pub fn person_image_url(&self, tcno: &str, filename: &str) -> String {
        self.url(&format!("/persons/image/{}/{}", tcno, filename))
    }

    pub fn person_qr_code_url(&self, tcno: &str) -> String {
        self.url(&format!("/persons/{}/qr-code", tcno))
    }

    /// Download the rendered QR code (PNG bytes).
    pub async fn download_person_qr_code(&self, tcno: &str) -> Result<Vec<u8>> {
        self.get_bytes(&format!("/persons/{}/qr-code", tcno)).await
    }

    pub async fn generate_person_qr_code(&self, tcno: &str) -> Result<()> {
        self.post_empty(&format!("/persons/{}/generate-qr", tcno)).await
    }

    // ===== Companies =====

    pub async fn fetch_companies(&self) -> Result<Vec<Company>> {
        self.get("/companies").await
    }

    pub async fn fetch_company(&self, id: i64) -> Result<Company> {
        self.get(&format!("/companies/{}", id)).await
    }

    pub async fn fetch_company_by_code(&self, code: &str) -> Result<Company> {
        self.get(&format!("/companies/code/{}", code)).await
    }

    pub async fn create_company(&self, company: &CreateCompany) -> Result<Company> {
        self.post("/companies", company).await
    }

    pub async fn update_company(&self, id: i64, company: &UpdateCompany) -> Result<Company> {
        self.patch(&format!("/companies/{}", id), company).await
    }

    pub async fn delete_company(&self, id: i64) -> Result<()> {
        self.delete::<()>(&format!("/companies/{}", id), None).await
    }

    pub async fn upload_company_media(&self, code: &str, file: &Path) -> Result<()> {
        self.upload_file(&format!("/companies/{}/upload-media", code), COMPANY_UPLOAD_FIELD, file)
            .await
    }

    pub async fn remove_company_media(&self, code: &str, media_path: &str) -> Result<()> {
        let body = RemoveMediaRequest { media_path };
        self.delete(&format!("/companies/{}/remove-media", code), Some(&body)).await
    }

    pub async fn fetch_company_media(&self, code: &str) -> Result<Vec<MediaFile>> {
        let response: MediaResponse = self.get(&format!("/companies/{}/media", code)).await?;
        Ok(response
            .media
            .into_iter()
            .map(|f| MediaFile::new(self.company_media_url(code, &f), f))
            .collect())
    }

    pub fn company_media_url(&self, code: &str, filename: &str) -> String {
        self.url(&format!("/companies/media/{}/{}", code, filename))
    }

    pub fn company_qr_code_url(&self, code: &str) -> String {
        self.url(&format!("/companies/{}/qr-code", code))
    }

    pub async fn download_company_qr_code(&self, code: &str) -> Result<Vec<u8>> {
        self.get_bytes(&format!("/companies/{}/qr-code", code)).await
    }

    pub async fn generate_company_qr_code(&self, code: &str) -> Result<()> {
        self.post_empty(&format!("/companies/{}/generate-qr", code)).await
    }
}
