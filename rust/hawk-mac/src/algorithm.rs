//! MAC algorithms supported by the scheme.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CredentialsError;

/// Hash function backing the HMAC computed over a normalized string.
///
/// Only the two algorithms below are part of the protocol. Names are matched
/// exactly (`"sha1"`, `"sha256"`), so a credential store that returns
/// `"SHA256"` or `"hmac-sha-256"` is misconfigured rather than silently
/// normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// HMAC-SHA1.
    Sha1,
    /// HMAC-SHA256.
    Sha256,
}

impl Algorithm {
    /// Every algorithm a credential may name.
    pub const SUPPORTED: [Algorithm; 2] = [Algorithm::Sha1, Algorithm::Sha256];

    /// Protocol name of this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = CredentialsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::SUPPORTED
            .into_iter()
            .find(|algorithm| algorithm.as_str() == name)
            .ok_or_else(|| CredentialsError::UnknownAlgorithm(name.to_string()))
    }
}
