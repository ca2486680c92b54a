//! Reads the SecureSuite license key and works out how to post it.
//!
//! The vendor issues license keys either as XML or as JSON. The
//! license-exchange endpoint wants the raw file contents with a matching
//! `Content-Type`, so the reader resolves the format in this order:
//!
//! 1. File extension (`.xml` / `.json`, case-insensitive)
//! 2. First non-whitespace character of the payload (`<` / `{`)
//! 3. Fallback to XML, logged as a warning

use crate::WorkbenchError;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Payload encoding of a license key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFormat {
    /// Tag-based license (`application/xml`).
    Xml,
    /// Brace-delimited license (`application/json`).
    Json,
}

impl CredentialFormat {
    /// MIME type sent as `Content-Type` to the license endpoint.
    pub fn content_type(self) -> &'static str {
        match self {
            CredentialFormat::Xml => "application/xml",
            CredentialFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for CredentialFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

/// How the format of a credential was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSource {
    /// Recognised file extension.
    Extension,
    /// Leading character of the payload.
    Content,
    /// Neither matched; XML was assumed.
    Fallback,
}

/// A license key as read from disk.
#[derive(Debug, Clone)]
pub struct LicenseCredential {
    /// Raw file contents, posted unchanged.
    pub payload: String,
    /// Resolved payload encoding.
    pub format: CredentialFormat,
    /// Whether the format was matched or guessed.
    pub source: FormatSource,
    /// File the credential came from.
    pub path: PathBuf,
}

impl LicenseCredential {
    /// True when the format is a guess rather than a match.
    pub fn is_ambiguous(&self) -> bool {
        self.source == FormatSource::Fallback
    }
}

/// Read a license key file and resolve its format.
///
/// # Errors
/// - `CredentialNotFound` - the file does not exist
/// - `CredentialUnreadable` - any other read failure (permissions, bad UTF-8)
pub fn read_credential(path: &Path) -> Result<LicenseCredential, WorkbenchError> {
    let payload = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => WorkbenchError::CredentialNotFound {
            path: path.to_path_buf(),
        },
        _ => WorkbenchError::CredentialUnreadable(format!("{}: {}", path.display(), e)),
    })?;

    let (format, source) = resolve_format(path, &payload);
    if source == FormatSource::Fallback {
        warn!(
            path = %path.display(),
            "Could not determine license format, assuming {}",
            format.content_type()
        );
    } else {
        debug!(path = %path.display(), ?source, "License format is {}", format);
    }

    Ok(LicenseCredential {
        payload,
        format,
        source,
        path: path.to_path_buf(),
    })
}

/// Decide the credential format from the file name, then the content.
pub fn resolve_format(path: &Path, payload: &str) -> (CredentialFormat, FormatSource) {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("xml") => return (CredentialFormat::Xml, FormatSource::Extension),
        Some("json") => return (CredentialFormat::Json, FormatSource::Extension),
        _ => {}
    }

    match payload.trim_start().chars().next() {
        Some('<') => (CredentialFormat::Xml, FormatSource::Content),
        Some('{') => (CredentialFormat::Json, FormatSource::Content),
        _ => (CredentialFormat::Xml, FormatSource::Fallback),
    }
}
