//! Benchmark listing, details and downloads.
//!
//! Every call goes through [`BenchmarkClient::with_token_retry`]: on a 401
//! the token manager is asked for a forced refresh and the call is made
//! once more with the new token. A second 401 is returned as-is.

use crate::cache::format::token_preview;
use crate::manager::TokenManager;
use crate::WorkbenchError;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Retries allowed after a 401.
pub const MAX_AUTH_RETRIES: usize = 1;

/// Outcome of a successful listing.
#[derive(Debug, Clone)]
pub struct BenchmarkListing {
    /// Where the raw response was mirrored.
    pub saved_to: PathBuf,
    /// Number of entries in `Benchmarks`.
    pub count: usize,
    /// `Total number of results` as reported by the server.
    pub reported_total: Option<u64>,
}

/// Client for the benchmark endpoints.
pub struct BenchmarkClient<'a> {
    tokens: &'a TokenManager,
    credential_path: PathBuf,
}

impl<'a> BenchmarkClient<'a> {
    /// Create a client that refreshes tokens with the license at `credential_path`.
    pub fn new(tokens: &'a TokenManager, credential_path: impl Into<PathBuf>) -> Self {
        Self {
            tokens,
            credential_path: credential_path.into(),
        }
    }

    /// Fetch the public benchmark listing and mirror it to the list file.
    ///
    /// The response must contain a `Benchmarks` field; otherwise nothing is
    /// written. The body is saved as received, whatever the entries look like.
    pub fn list_benchmarks(
        &self,
        verbose: bool,
        token: Option<&str>,
    ) -> Result<BenchmarkListing, WorkbenchError> {
        let client = self.tokens.client();
        if verbose {
            info!(url = %format!("{}benchmarks", client.base_url()), "Fetching benchmark list");
        }

        let initial = token.map(str::to_string);
        let document = self.with_token_retry(initial, |token| {
            let response = client.list_benchmarks(token)?;
            if response.status != 200 && verbose {
                warn!(status = response.status, body = %response.body_preview(), "Benchmark list request failed");
            }
            let response = response.ensure_success()?;
            response.json::<Value>().map_err(|e| {
                if verbose {
                    warn!(body = %response.body_preview(), "Benchmark list is not JSON");
                }
                e
            })
        })?;

        require_benchmarks_field(&document)?;
        let path = self.tokens.config().benchmark_list_file.clone();
        write_pretty_json(&path, &document)?;

        let reported_total = document
            .get("Total number of results")
            .and_then(Value::as_u64);
        if verbose {
            info!(
                path = %path.display(),
                total = reported_total.unwrap_or(0),
                "Benchmark list saved"
            );
        }

        Ok(BenchmarkListing {
            saved_to: path,
            count: document["Benchmarks"].as_array().map_or(0, Vec::len),
            reported_total,
        })
    }

    /// Fetch the metadata document for benchmark `id`.
    pub fn benchmark_details(
        &self,
        id: &str,
        token: &str,
    ) -> Result<Value, WorkbenchError> {
        check_benchmark_id(id)?;
        let client = self.tokens.client();
        self.with_token_retry(Some(token.to_string()), |token| {
            client
                .benchmark_details(id, token.unwrap_or_default())?
                .ensure_success()?
                .json()
        })
    }

    /// Download the archive for benchmark `id` into the download directory.
    ///
    /// The file is named `benchmark_{id}_{YYYYMMDD}.zip` and only appears
    /// once the whole body has been received.
    pub fn download_benchmark(&self, id: &str, token: &str) -> Result<PathBuf, WorkbenchError> {
        check_benchmark_id(id)?;
        let config = self.tokens.config();
        fs::create_dir_all(&config.download_dir).map_err(|e| {
            WorkbenchError::OutputIO(format!(
                "Failed to create {}: {}",
                config.download_dir.display(),
                e
            ))
        })?;

        let date = self.tokens.clock().now_utc().format("%Y%m%d");
        let target = config
            .download_dir
            .join(format!("benchmark_{}_{}.zip", id, date));
        let partial = target.with_extension("zip.part");

        let client = self.tokens.client();
        let result = self.with_token_retry(Some(token.to_string()), |token| {
            let file = File::create(&partial).map_err(|e| {
                WorkbenchError::OutputIO(format!("Failed to create {}: {}", partial.display(), e))
            })?;
            let mut writer = BufWriter::new(file);
            let bytes = client.download_archive(id, token.unwrap_or_default(), &mut writer)?;
            writer.flush().map_err(|e| {
                WorkbenchError::OutputIO(format!("Failed to write {}: {}", partial.display(), e))
            })?;
            Ok(bytes)
        });

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = fs::remove_file(&partial);
                return Err(e);
            }
        };

        fs::rename(&partial, &target).map_err(|e| {
            let _ = fs::remove_file(&partial);
            WorkbenchError::OutputIO(format!("Failed to move archive into place: {}", e))
        })?;
        info!(path = %target.display(), bytes, "Benchmark downloaded");
        Ok(target)
    }

    /// Run `call`, and on `Unauthorized` refresh the token and run it again,
    /// at most [`MAX_AUTH_RETRIES`] times.
    pub fn with_token_retry<T, F>(&self, token: Option<String>, mut call: F) -> Result<T, WorkbenchError>
    where
        F: FnMut(Option<&str>) -> Result<T, WorkbenchError>,
    {
        let mut token = token;
        let mut retries = 0;
        loop {
            match call(token.as_deref()) {
                Err(e) if e.is_unauthorized() && retries < MAX_AUTH_RETRIES => {
                    retries += 1;
                    warn!("Token rejected, refreshing and retrying");
                    let fresh = self
                        .tokens
                        .get_token(&self.credential_path, true)
                        .ok_or(WorkbenchError::Unauthorized)?;
                    debug!(token = %token_preview(&fresh), "Retrying with refreshed token");
                    token = Some(fresh);
                }
                other => return other,
            }
        }
    }
}

/// The only shape requirement on a listing.
fn require_benchmarks_field(document: &Value) -> Result<(), WorkbenchError> {
    if document.get("Benchmarks").is_none() {
        return Err(WorkbenchError::MalformedResponse(
            "Invalid response format: 'Benchmarks' field missing".to_string(),
        ));
    }
    Ok(())
}

fn write_pretty_json(path: &Path, document: &Value) -> Result<(), WorkbenchError> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|e| WorkbenchError::OutputIO(format!("Failed to serialize list: {}", e)))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| WorkbenchError::OutputIO(format!("Failed to create {}: {}", parent.display(), e)))?;
    }
    fs::write(path, json)
        .map_err(|e| WorkbenchError::OutputIO(format!("Failed to write {}: {}", path.display(), e)))
}

/// IDs end up in URL paths and file names.
fn check_benchmark_id(id: &str) -> Result<(), WorkbenchError> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(WorkbenchError::ConfigError(format!(
            "Invalid benchmark id: {:?}",
            id
        )))
    }
}
