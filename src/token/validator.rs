//! Two-tier token validation.
//!
//! 1. **Local**: `now <= expires_at - margin`, so a token never expires
//!    mid-request.
//! 2. **Remote**: `GET /token/check`, only reached when the local tier
//!    passes.
//!
//! Anything the server could not confirm is not trusted: callers treat
//! [`ValidationOutcome::Indeterminate`] the same as `Invalid`.

use crate::cache::format::{token_preview, TokenRecord};
use crate::client::http::{ApiResponse, VendorClient};
use crate::clock::Clock;
use crate::protocol::models::TokenCheckResponse;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of a validity check. Computed per call, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Locally fresh and confirmed by the server.
    Valid,
    /// Locally expired, or rejected by the server.
    Invalid,
    /// The server could not be asked or gave an unusable answer.
    Indeterminate,
}

impl ValidationOutcome {
    /// Fail-closed view: only `Valid` counts.
    pub fn is_valid(self) -> bool {
        self == ValidationOutcome::Valid
    }
}

/// Checks cached tokens against the clock and the token-check endpoint.
pub struct TokenValidator<'a> {
    client: &'a VendorClient,
    clock: &'a dyn Clock,
    margin: Duration,
}

impl<'a> TokenValidator<'a> {
    /// Create a validator using `margin` as the local expiry safety margin.
    pub fn new(client: &'a VendorClient, clock: &'a dyn Clock, margin: Duration) -> Self {
        Self {
            client,
            clock,
            margin,
        }
    }

    /// Run both tiers.
    pub fn check(&self, record: &TokenRecord) -> ValidationOutcome {
        if !record.is_locally_fresh(self.margin, self.clock) {
            debug!(
                expires_at = %record.expires_at,
                "Cached token is past its local expiry"
            );
            return ValidationOutcome::Invalid;
        }
        self.check_remote(&record.token)
    }

    /// Both tiers pass.
    pub fn is_valid(&self, record: &TokenRecord) -> bool {
        self.check(record).is_valid()
    }

    /// Remote tier only.
    pub fn check_remote(&self, token: &str) -> ValidationOutcome {
        match self.client.check_token(token) {
            Ok(response) => classify_check_response(&response),
            Err(e) => {
                warn!(token = %token_preview(token), "Token check failed: {}", e);
                ValidationOutcome::Indeterminate
            }
        }
    }
}

/// Map a token-check response to an outcome.
pub fn classify_check_response(response: &ApiResponse) -> ValidationOutcome {
    match response.status {
        200 => match response.json::<TokenCheckResponse>() {
            Ok(body) if body.is_successful() => ValidationOutcome::Valid,
            Ok(body) => {
                debug!(status = ?body.status, "Token check did not confirm token");
                ValidationOutcome::Invalid
            }
            Err(e) => {
                warn!("Token check returned unreadable body: {}", e);
                ValidationOutcome::Indeterminate
            }
        },
        401 => {
            warn!("Token is invalid or expired");
            ValidationOutcome::Invalid
        }
        status => {
            warn!(status, "Unexpected status from token check");
            ValidationOutcome::Indeterminate
        }
    }
}
