//! OS signature table
//!
//! Records keep the field names and string-typed TTL of the `osinfo.json`
//! format. TTL strings are parsed once at load time; records whose TTL is not
//! an integer stay in the table but never become match candidates.

pub mod matcher;

use crate::error::{GuessError, GuessResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use matcher::{match_signatures, Guess};

/// Signature table bundled into the binary
pub const EMBEDDED_SIGNATURES: &str = include_str!("../../data/osinfo.json");

/// One known OS/TTL pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    #[serde(rename = "Device / OS")]
    pub device_os: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Protocol")]
    pub protocol: String,
    #[serde(rename = "TTL")]
    pub ttl: String,
}

impl SignatureEntry {
    pub fn new(device_os: &str, version: &str, protocol: &str, ttl: &str) -> Self {
        Self {
            device_os: device_os.to_string(),
            version: version.to_string(),
            protocol: protocol.to_string(),
            ttl: ttl.to_string(),
        }
    }

    /// Expected origin TTL, `None` when the TTL field is not an integer
    pub fn expected_ttl(&self) -> Option<i64> {
        self.ttl.parse::<i64>().ok()
    }
}

/// Immutable, ordered collection of signatures
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureTable {
    entries: Vec<SignatureEntry>,
    expected: Vec<Option<i64>>,
}

impl SignatureTable {
    pub fn new(entries: Vec<SignatureEntry>) -> Self {
        let expected = entries.iter().map(SignatureEntry::expected_ttl).collect();
        Self { entries, expected }
    }

    /// Table compiled into the binary
    pub fn embedded() -> GuessResult<Self> {
        Self::from_json_str(EMBEDDED_SIGNATURES)
    }

    pub fn from_json_str(json: &str) -> GuessResult<Self> {
        let entries: Vec<SignatureEntry> = serde_json::from_str(json)
            .map_err(|e| GuessError::SignatureLoad(format!("Error parsing signatures: {}", e)))?;
        Ok(Self::new(entries))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> GuessResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GuessError::SignatureLoad(format!("Error reading {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Load from `path` when given, otherwise the embedded table
    pub fn load(path: Option<&Path>) -> GuessResult<Self> {
        let table = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::embedded()?,
        };
        log::debug!(
            "Loaded {} signatures ({} without a numeric TTL)",
            table.len(),
            table.excluded_count()
        );
        Ok(table)
    }

    pub fn entries(&self) -> &[SignatureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with a numeric TTL, in table order
    pub fn candidates(&self) -> impl Iterator<Item = (&SignatureEntry, i64)> + '_ {
        self.entries
            .iter()
            .zip(self.expected.iter())
            .filter_map(|(entry, ttl)| ttl.map(|ttl| (entry, ttl)))
    }

    /// Number of entries that can never match
    pub fn excluded_count(&self) -> usize {
        self.expected.iter().filter(|ttl| ttl.is_none()).count()
    }
}
