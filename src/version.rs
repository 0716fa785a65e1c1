//! Version identifiers

use crate::error::{DataverError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sequential version identifier, written as `v<N>` (e.g. "v1", "v10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId(u64);

impl VersionId {
    /// The identifier of the very first version
    pub const FIRST: VersionId = VersionId(1);

    pub fn new(number: u64) -> Self {
        Self(number)
    }

    pub fn number(&self) -> u64 {
        self.0
    }

    /// The identifier that follows this one, or `None` at the end of the
    /// numbering space
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Parse a directory or marker name, returning `None` if it is not `v<N>`
    pub fn from_dir_name(name: &str) -> Option<Self> {
        let digits = name.strip_prefix('v')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Self)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl FromStr for VersionId {
    type Err = DataverError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_dir_name(s.trim()).ok_or_else(|| DataverError::InvalidVersionId {
            value: s.to_string(),
        })
    }
}

impl TryFrom<String> for VersionId {
    type Error = DataverError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<VersionId> for String {
    fn from(id: VersionId) -> Self {
        id.to_string()
    }
}
