//! Reqwest-based blocking HTTP client for the SecureSuite API.
//!
//! This module only moves bytes: it builds requests, attaches the token
//! header, and captures status + body. Interpreting the result is left to
//! the validator, the token manager and the benchmark client.

use crate::config::WorkbenchConfig;
use crate::credential::reader::LicenseCredential;
use crate::WorkbenchError;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::io::Write;
use tracing::debug;

/// Header carrying the access token.
pub const TOKEN_HEADER: &str = "X-SecureSuite-Token";

/// Maximum number of body characters kept in error messages.
pub const BODY_PREVIEW_CHARS: usize = 500;

/// HTTP response with status and fully read body.
#[derive(Debug)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,

    /// Raw response body.
    pub body: Vec<u8>,

    /// Requested URL, for log messages.
    pub url: String,
}

impl ApiResponse {
    fn from_response(response: Response, url: String) -> Result<Self, WorkbenchError> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| WorkbenchError::NetworkFailure(format!("Failed to read body: {}", e)))?
            .to_vec();

        debug!(%url, status, bytes = body.len(), "Response received");
        Ok(Self { status, body, url })
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, WorkbenchError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            WorkbenchError::MalformedResponse(format!(
                "Response from {} is not valid JSON ({}): {}",
                self.url,
                e,
                self.body_preview()
            ))
        })
    }

    /// First [`BODY_PREVIEW_CHARS`] characters of the body, lossily decoded.
    pub fn body_preview(&self) -> String {
        truncate_chars(&String::from_utf8_lossy(&self.body), BODY_PREVIEW_CHARS)
    }

    /// Map the status to the shared taxonomy: 200 passes, 401 is
    /// `Unauthorized`, anything else is `UnexpectedStatus`.
    pub fn ensure_success(self) -> Result<Self, WorkbenchError> {
        match self.status {
            200 => Ok(self),
            401 => Err(WorkbenchError::Unauthorized),
            status => Err(WorkbenchError::UnexpectedStatus {
                status,
                body: self.body_preview(),
            }),
        }
    }
}

/// SecureSuite HTTP client.
pub struct VendorClient {
    client: Client,
    base_url: String,
}

impl VendorClient {
    /// Create a client from config, applying the request timeout and User-Agent.
    pub fn new(config: &WorkbenchConfig) -> Result<Self, WorkbenchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(build_user_agent(config))
            .build()
            .map_err(|e| WorkbenchError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.endpoint(""),
        })
    }

    /// API root this client talks to, with trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /license` with the raw license payload.
    pub fn exchange_license(
        &self,
        credential: &LicenseCredential,
    ) -> Result<ApiResponse, WorkbenchError> {
        let url = self.url("license");
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, credential.format.content_type())
            .body(credential.payload.clone());
        self.send(request, url)
    }

    /// `GET /token/check`.
    pub fn check_token(&self, token: &str) -> Result<ApiResponse, WorkbenchError> {
        let url = self.url("token/check");
        let request = self.client.get(&url).header(TOKEN_HEADER, token);
        self.send(request, url)
    }

    /// `GET /benchmarks`; the token is optional on this endpoint.
    pub fn list_benchmarks(&self, token: Option<&str>) -> Result<ApiResponse, WorkbenchError> {
        let url = self.url("benchmarks");
        let mut request = self.client.get(&url);
        if let Some(token) = token {
            request = request.header(TOKEN_HEADER, token);
        }
        self.send(request, url)
    }

    /// `GET /benchmarks/{id}`.
    pub fn benchmark_details(&self, id: &str, token: &str) -> Result<ApiResponse, WorkbenchError> {
        let url = self.url(&format!("benchmarks/{}", id));
        let request = self.client.get(&url).header(TOKEN_HEADER, token);
        self.send(request, url)
    }

    /// `GET /benchmarks/{id}/JSON`, streaming the archive into `sink`.
    ///
    /// Nothing is written to `sink` unless the status is 200. Returns the
    /// number of bytes copied.
    pub fn download_archive(
        &self,
        id: &str,
        token: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, WorkbenchError> {
        let url = self.url(&format!("benchmarks/{}/JSON", id));
        let mut response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, token)
            .header(ACCEPT, "application/zip")
            .send()
            .map_err(|e| WorkbenchError::NetworkFailure(format!("Request to {} failed: {}", url, e)))?;

        if response.status().as_u16() != 200 {
            return ApiResponse::from_response(response, url)?
                .ensure_success()
                .map(|_| 0);
        }

        let copied = response
            .copy_to(sink)
            .map_err(|e| WorkbenchError::NetworkFailure(format!("Download from {} failed: {}", url, e)))?;
        debug!(%url, bytes = copied, "Archive streamed");
        Ok(copied)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder, url: String) -> Result<ApiResponse, WorkbenchError> {
        let response = request
            .send()
            .map_err(|e| WorkbenchError::NetworkFailure(format!("Request to {} failed: {}", url, e)))?;
        ApiResponse::from_response(response, url)
    }
}

/// Build a User-Agent string from config.
///
/// Format: `<product>/securesuite-<version>`
pub fn build_user_agent(config: &WorkbenchConfig) -> String {
    format!(
        "{}/securesuite-{}",
        config.user_agent_product,
        env!("CARGO_PKG_VERSION")
    )
}

/// Truncate to `max` characters, marking the cut with `...`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
