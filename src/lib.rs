//! # SecureSuite
//!
//! **Token-managed client for the CIS WorkBench SecureSuite vendor API.**
//!
//! SecureSuite exchanges a member license key for a short-lived access
//! token, caches that token on disk, and uses it to list, inspect and
//! download CIS benchmarks.
//!
//! ## Features
//!
//! - **Token caching** - one JSON record, reused across invocations
//! - **Two-tier validation** - local expiry with a safety margin, then a server check
//! - **Fail-closed** - a token the server could not confirm is never reused
//! - **Bounded 401 retry** - one forced refresh and one retry per call, never more
//!
//! ## Quickstart
//!
//! ```no_run
//! use securesuite::{BenchmarkClient, TokenManager, WorkbenchConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), securesuite::WorkbenchError> {
//!     let manager = TokenManager::new(WorkbenchConfig::default())?;
//!     let license = Path::new("license.xml");
//!
//!     let token = manager
//!         .get_token(license, false)
//!         .ok_or(securesuite::WorkbenchError::Unauthorized)?;
//!
//!     let client = BenchmarkClient::new(&manager, license);
//!     let archive = client.download_benchmark("18915", &token)?;
//!     println!("saved {}", archive.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! - `base_url` - API root, defaults to the production vendor API
//! - `token_file` - where the token record is cached
//! - `token_validity` / `expiry_margin` - 20 minutes / 30 seconds
//!
//! See [`WorkbenchConfig`] for full documentation.

#![warn(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Credential layer
pub mod credential;

// Protocol layer
pub mod protocol;

// Client layer
pub mod client;

// Cache layer
pub mod cache;

// Validation layer
pub mod token;

// Manager (main public API)
pub mod manager;

// Resource layer
pub mod api;

// Reports
pub mod report;

// Re-exports for public API
pub use api::benchmarks::{BenchmarkClient, BenchmarkListing};
pub use cache::format::TokenRecord;
pub use clock::{Clock, SystemClock};
pub use config::WorkbenchConfig;
pub use credential::reader::{CredentialFormat, LicenseCredential};
pub use errors::WorkbenchError;
pub use manager::TokenManager;
pub use token::validator::ValidationOutcome;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
