//! SecureSuite API response structs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status message the token-check endpoint returns for a live token.
pub const TOKEN_CHECK_SUCCESS: &str = "Token Validation Check Successful.";

/// Body of a successful `POST /license`.
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseExchangeResponse {
    /// Newly issued access token.
    pub token: Option<String>,
}

/// Body of `GET /token/check`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenCheckResponse {
    /// Human-readable check result.
    #[serde(default)]
    pub status: Option<String>,
}

impl TokenCheckResponse {
    /// Whether the server confirmed the token.
    pub fn is_successful(&self) -> bool {
        self.status.as_deref() == Some(TOKEN_CHECK_SUCCESS)
    }
}

/// Body of `GET /benchmarks`.
///
/// Only the fields the client reads are typed; the file mirror keeps the
/// raw JSON. Listings read back from disk go through
/// [`BenchmarkList::from_document`], which accepts entries that do not fit
/// the typed shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkList {
    /// All published benchmarks.
    #[serde(rename = "Benchmarks")]
    pub benchmarks: Vec<BenchmarkSummary>,

    /// Server-side count, when reported.
    #[serde(rename = "Total number of results", default)]
    pub total_results: Option<u64>,
}

/// One entry of the benchmark listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkSummary {
    /// WorkBench ID used for details and downloads.
    #[serde(default)]
    pub workbench_id: Option<Value>,
    /// Published title.
    #[serde(default)]
    pub benchmark_title: Option<String>,
    /// Release version, e.g. "1.3.0".
    #[serde(default)]
    pub benchmark_version: Option<String>,
    /// `Manual` or `Automated`.
    #[serde(default)]
    pub assessment_status: Option<String>,
    /// Download formats such as "JSON" or "YAML".
    #[serde(default)]
    pub available_formats: Option<Vec<String>>,
    /// Profiles defined by the benchmark.
    #[serde(default)]
    pub profiles: Vec<BenchmarkProfile>,
}

impl BenchmarkList {
    /// Build a listing from raw JSON without rejecting odd entries.
    ///
    /// A missing or non-array `Benchmarks` gives an empty list and a
    /// non-numeric total is dropped.
    pub fn from_document(document: &Value) -> Self {
        let benchmarks = document
            .get("Benchmarks")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(BenchmarkSummary::from_entry).collect())
            .unwrap_or_default();
        Self {
            benchmarks,
            total_results: document.get("Total number of results").and_then(Value::as_u64),
        }
    }
}

impl BenchmarkSummary {
    /// Read one listing entry field by field.
    ///
    /// Scalars of the wrong type are kept as their JSON text; `null` and
    /// non-object entries count as missing.
    pub fn from_entry(entry: &Value) -> Self {
        let field = |name: &str| entry.get(name).filter(|v| !v.is_null());
        Self {
            workbench_id: field("workbenchId").cloned(),
            benchmark_title: field("benchmarkTitle").map(display_text),
            benchmark_version: field("benchmarkVersion").map(display_text),
            assessment_status: field("assessmentStatus").map(display_text),
            available_formats: field("availableFormats").map(|formats| match formats {
                Value::Array(items) => items.iter().map(format_name).collect(),
                other => vec![display_text(other)],
            }),
            profiles: field("profiles")
                .and_then(Value::as_array)
                .map(|profiles| {
                    profiles
                        .iter()
                        .map(|p| BenchmarkProfile {
                            profile_title: p
                                .get("profileTitle")
                                .filter(|v| !v.is_null())
                                .map(display_text),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// WorkBench ID as display text (the API sends numbers or strings).
    pub fn workbench_id_text(&self) -> Option<String> {
        match self.workbench_id.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// True for benchmarks that can only be assessed by hand.
    pub fn is_manual(&self) -> bool {
        self.assessment_status.as_deref() == Some("Manual")
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Formats are plain strings, but some payloads send `{"name": ".."}` objects.
fn format_name(value: &Value) -> String {
    match value.get("name") {
        Some(name) => display_text(name),
        None => display_text(value),
    }
}

/// A benchmark profile (e.g. "Level 1 - Server").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkProfile {
    /// Profile title.
    #[serde(default)]
    pub profile_title: Option<String>,
}
