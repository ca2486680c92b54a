//! SecureSuite client configuration.

use crate::WorkbenchError;
use std::path::PathBuf;
use std::time::Duration;

/// Production API root of the CIS WorkBench vendor API.
pub const DEFAULT_BASE_URL: &str = "https://workbench.cisecurity.org/api/vendor/v1";

/// File name of the cached token.
pub const TOKEN_FILE_NAME: &str = "securesuite_token.json";

/// File name of the saved benchmark listing.
pub const BENCHMARK_LIST_FILE_NAME: &str = "available_benchmarks.json";

/// How long the server honours a freshly issued token.
pub const DEFAULT_TOKEN_VALIDITY: Duration = Duration::from_secs(20 * 60);

/// Safety margin subtracted from the expiry before a cached token is reused.
pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Longest token window accepted by [`WorkbenchConfig::validate`].
pub const MAX_TOKEN_VALIDITY: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration shared by every SecureSuite component.
///
/// Built once (usually from CLI flags on top of [`WorkbenchConfig::default`])
/// and handed to each component at construction.
#[derive(Debug, Clone)]
pub struct WorkbenchConfig {
    /// API root, without trailing slash (e.g. `https://host/api/vendor/v1`).
    pub base_url: String,

    /// Where the token record is cached.
    pub token_file: PathBuf,

    /// Where the raw benchmark listing is mirrored.
    pub benchmark_list_file: PathBuf,

    /// Directory that receives downloaded benchmark archives.
    pub download_dir: PathBuf,

    /// Lifetime assumed for a newly acquired token.
    pub token_validity: Duration,

    /// A cached token is only reused while `now <= expires_at - expiry_margin`.
    pub expiry_margin: Duration,

    /// Per-request timeout for every HTTP call.
    pub request_timeout: Duration,

    /// Product part of the User-Agent header.
    pub user_agent_product: String,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_file: default_token_file(),
            benchmark_list_file: PathBuf::from(BENCHMARK_LIST_FILE_NAME),
            download_dir: PathBuf::from("."),
            token_validity: DEFAULT_TOKEN_VALIDITY,
            expiry_margin: DEFAULT_EXPIRY_MARGIN,
            request_timeout: Duration::from_secs(30),
            user_agent_product: "securesuite".to_string(),
        }
    }
}

impl WorkbenchConfig {
    /// Default configuration pointed at a different API root.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), WorkbenchError> {
        if self.base_url.is_empty() {
            return Err(WorkbenchError::ConfigError(
                "base_url cannot be empty".to_string(),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(WorkbenchError::ConfigError(format!(
                "base_url must be an http(s) URL, got {}",
                self.base_url
            )));
        }
        if self.token_file.as_os_str().is_empty() {
            return Err(WorkbenchError::ConfigError(
                "token_file cannot be empty".to_string(),
            ));
        }
        if self.token_validity.is_zero() {
            return Err(WorkbenchError::ConfigError(
                "token_validity must be positive".to_string(),
            ));
        }
        if self.token_validity > MAX_TOKEN_VALIDITY {
            return Err(WorkbenchError::ConfigError(format!(
                "token_validity ({}s) exceeds the {}s maximum",
                self.token_validity.as_secs(),
                MAX_TOKEN_VALIDITY.as_secs()
            )));
        }
        if self.expiry_margin >= self.token_validity {
            return Err(WorkbenchError::ConfigError(format!(
                "expiry_margin ({}s) must be shorter than token_validity ({}s)",
                self.expiry_margin.as_secs(),
                self.token_validity.as_secs()
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(WorkbenchError::ConfigError(
                "request_timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Join an endpoint path onto the API root.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// `<cache dir>/securesuite/securesuite_token.json`, or the bare file name
/// in the working directory when the platform has no cache dir.
fn default_token_file() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("securesuite").join(TOKEN_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(TOKEN_FILE_NAME))
}
