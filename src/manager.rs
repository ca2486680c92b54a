//! Token Manager - the main public API for SecureSuite.
//!
//! The `TokenManager` answers one question: "give me a token I can use".
//! - Cache hit: the stored token passes both validity tiers and is reused
//! - Cache miss, invalid or forced: the license key is exchanged for a new
//!   token, which is cached and returned

use crate::cache::file::TokenStore;
use crate::cache::format::{token_preview, TokenRecord};
use crate::client::http::VendorClient;
use crate::clock::{Clock, SystemClock};
use crate::config::WorkbenchConfig;
use crate::credential::reader::read_credential;
use crate::protocol::models::LicenseExchangeResponse;
use crate::token::validator::{TokenValidator, ValidationOutcome};
use crate::WorkbenchError;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Token lifecycle manager.
///
/// Create one instance per process and reuse it for every API call.
pub struct TokenManager {
    config: WorkbenchConfig,
    clock: Arc<dyn Clock>,
    client: VendorClient,
    store: TokenStore,
}

impl TokenManager {
    /// Create a new token manager with the given configuration.
    ///
    /// Uses the system clock for time operations.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Configuration validation fails
    /// - HTTP client creation fails
    pub fn new(config: WorkbenchConfig) -> Result<Self, WorkbenchError> {
        config.validate()?;
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a token manager with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(
        config: WorkbenchConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, WorkbenchError> {
        config.validate()?;
        Self::with_clock(config, clock)
    }

    fn with_clock(config: WorkbenchConfig, clock: Arc<dyn Clock>) -> Result<Self, WorkbenchError> {
        let client = VendorClient::new(&config)?;
        let store = TokenStore::new(config.token_file.clone());

        Ok(Self {
            config,
            clock,
            client,
            store,
        })
    }

    /// Get a usable token.
    ///
    /// Unless `force_refresh` is set, a cached token that passes both
    /// validity tiers is returned without contacting the license endpoint.
    /// Otherwise a new token is acquired with the license at
    /// `credential_path`. Failures are logged and reported as `None`;
    /// there is no retry inside this call.
    pub fn get_token(&self, credential_path: &Path, force_refresh: bool) -> Option<String> {
        if !force_refresh {
            if let Some(record) = self.store.load() {
                if self.validator().is_valid(&record) {
                    info!(
                        token = %token_preview(&record.token),
                        remaining_secs = record.remaining_secs(self.clock.as_ref()),
                        "Using cached token"
                    );
                    return Some(record.token);
                }
                debug!("Cached token rejected, acquiring a new one");
            }
        } else {
            debug!("Forced token refresh");
        }

        match self.acquire(credential_path) {
            Ok(record) => Some(record.token),
            Err(e) => {
                error!(path = %credential_path.display(), "Could not obtain a valid token: {}", e);
                None
            }
        }
    }

    /// Exchange the license at `credential_path` for a new token and cache it.
    ///
    /// # Errors
    /// - `CredentialNotFound` / `CredentialUnreadable` - license file problems
    /// - `NetworkFailure` - the license endpoint could not be reached
    /// - `Unauthorized` / `UnexpectedStatus` - the endpoint did not answer 200
    /// - `MalformedResponse` - body is not JSON or has no `token`
    pub fn acquire(&self, credential_path: &Path) -> Result<TokenRecord, WorkbenchError> {
        let credential = read_credential(credential_path)?;
        info!(content_type = credential.format.content_type(), "Requesting new token");

        let response = self.client.exchange_license(&credential)?.ensure_success()?;
        let body: LicenseExchangeResponse = response.json()?;
        let token = body.token.ok_or_else(|| {
            WorkbenchError::MalformedResponse(format!(
                "No token in license response: {}",
                response.body_preview()
            ))
        })?;

        let record = TokenRecord::issue(token, self.config.token_validity, self.clock.as_ref());
        self.store.save(&record);
        info!(token = %token_preview(&record.token), expires_at = %record.expires_at, "Token acquired");

        Ok(record)
    }

    /// Run both validity tiers against a record.
    pub fn check(&self, record: &TokenRecord) -> ValidationOutcome {
        self.validator().check(record)
    }

    /// Validator bound to this manager's client, clock and margin.
    pub fn validator(&self) -> TokenValidator<'_> {
        TokenValidator::new(&self.client, self.clock.as_ref(), self.config.expiry_margin)
    }

    /// The HTTP client shared with the benchmark client.
    pub fn client(&self) -> &VendorClient {
        &self.client
    }

    /// The token store.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// The clock used for expiry and archive dates.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Get the current configuration.
    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }
}
