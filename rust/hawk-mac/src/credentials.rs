//! Shared-secret credentials.
//!
//! A credential store hands back a [`CredentialRecord`], which may be
//! incomplete or name an algorithm this crate does not implement. Converting
//! it into [`Credentials`] is the single place those defects are detected, so
//! every MAC computation downstream works with a validated key and algorithm.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::Algorithm;

/// Reasons a [`CredentialRecord`] cannot be used to compute a MAC.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    /// The record has no id, or an empty one.
    #[error("Invalid credentials: missing id")]
    MissingId,

    /// The record has no key, or an empty one.
    #[error("Invalid credentials: missing key")]
    MissingKey,

    /// The record does not name an algorithm.
    #[error("Invalid credentials: missing algorithm")]
    MissingAlgorithm,

    /// The record names an algorithm outside [`Algorithm::SUPPORTED`].
    #[error("Unknown algorithm: {0:?}")]
    UnknownAlgorithm(String),
}

/// Opaque secret key material.
///
/// Equality is constant-time and `Debug` never prints the bytes.
#[derive(Clone)]
pub struct Key(Vec<u8>);

impl Key {
    /// Raw key bytes, as fed to HMAC.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the key has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key(<redacted>)")
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Key {}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Self(key.as_bytes().to_vec())
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Self(key.into_bytes())
    }
}

impl From<&[u8]> for Key {
    fn from(key: &[u8]) -> Self {
        Self(key.to_vec())
    }
}

impl From<Vec<u8>> for Key {
    fn from(key: Vec<u8>) -> Self {
        Self(key)
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Keys travel as strings in every store format we read from
        let key = std::str::from_utf8(&self.0).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(key)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Key::from)
    }
}

/// Credentials exactly as a store returned them, before validation.
///
/// `metadata` is caller-defined data (a user record, tenant, scopes…) that
/// is carried through verification untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord<M = ()> {
    /// Identity the key belongs to.
    #[serde(default)]
    pub id: Option<String>,
    /// Shared secret.
    #[serde(default)]
    pub key: Option<Key>,
    /// Name of the MAC algorithm, e.g. `"sha256"`.
    #[serde(default)]
    pub algorithm: Option<String>,
    /// Caller-defined data passed through unchanged.
    #[serde(default)]
    pub metadata: M,
}

impl<M: Default> Default for CredentialRecord<M> {
    fn default() -> Self {
        Self {
            id: None,
            key: None,
            algorithm: None,
            metadata: M::default(),
        }
    }
}

impl CredentialRecord<()> {
    /// A complete record with no metadata.
    pub fn new(id: impl Into<String>, key: impl Into<Key>, algorithm: Algorithm) -> Self {
        Self {
            id: Some(id.into()),
            key: Some(key.into()),
            algorithm: Some(algorithm.as_str().to_string()),
            metadata: (),
        }
    }
}

impl<M> CredentialRecord<M> {
    /// Replace the metadata carried by this record.
    pub fn with_metadata<N>(self, metadata: N) -> CredentialRecord<N> {
        CredentialRecord {
            id: self.id,
            key: self.key,
            algorithm: self.algorithm,
            metadata,
        }
    }

    /// Validate a record that was looked up by `id`.
    ///
    /// Stores commonly omit the id from the record they return for it, so a
    /// missing id falls back to the one the lookup was made with. Key and
    /// algorithm are still required.
    pub fn validate_for(mut self, id: &str) -> Result<Credentials<M>, CredentialsError> {
        if self.id.as_deref().is_none_or(str::is_empty) {
            self.id = Some(id.to_string());
        }
        Credentials::try_from(self)
    }
}

/// Validated credentials: non-empty id and key plus a supported algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials<M = ()> {
    id: String,
    key: Key,
    algorithm: Algorithm,
    metadata: M,
}

impl Credentials<()> {
    /// Build credentials without metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` or `key` is empty.
    pub fn new(
        id: impl Into<String>,
        key: impl Into<Key>,
        algorithm: Algorithm,
    ) -> Result<Self, CredentialsError> {
        Credentials::try_from(CredentialRecord::new(id, key, algorithm))
    }
}

impl<M> Credentials<M> {
    /// Identity these credentials belong to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Shared secret.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// MAC algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Caller-defined metadata.
    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    /// Consume the credentials, returning their metadata.
    pub fn into_metadata(self) -> M {
        self.metadata
    }
}

impl<M> TryFrom<CredentialRecord<M>> for Credentials<M> {
    type Error = CredentialsError;

    fn try_from(record: CredentialRecord<M>) -> Result<Self, Self::Error> {
        let id = record
            .id
            .filter(|id| !id.is_empty())
            .ok_or(CredentialsError::MissingId)?;
        let key = record
            .key
            .filter(|key| !key.is_empty())
            .ok_or(CredentialsError::MissingKey)?;
        let algorithm = record
            .algorithm
            .filter(|algorithm| !algorithm.is_empty())
            .ok_or(CredentialsError::MissingAlgorithm)?
            .parse()?;

        Ok(Self {
            id,
            key,
            algorithm,
            metadata: record.metadata,
        })
    }
}

impl<M> From<Credentials<M>> for CredentialRecord<M> {
    fn from(credentials: Credentials<M>) -> Self {
        Self {
            id: Some(credentials.id),
            key: Some(credentials.key),
            algorithm: Some(credentials.algorithm.as_str().to_string()),
            metadata: credentials.metadata,
        }
    }
}
