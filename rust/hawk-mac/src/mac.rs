//! HMAC computation and comparison.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::{Algorithm, Credentials, CredentialsError, Key, MacType, SigningContext};

/// Errors from computing or comparing MACs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacError {
    /// The algorithm name is not one of [`Algorithm::SUPPORTED`].
    #[error("Unknown algorithm: {0:?}")]
    UnknownAlgorithm(String),

    /// The key could not initialize the HMAC.
    #[error("Invalid key")]
    InvalidKey,

    /// The presented MAC does not match the computed one.
    #[error("Bad mac")]
    BadMac,
}

impl From<CredentialsError> for MacError {
    fn from(error: CredentialsError) -> Self {
        match error {
            CredentialsError::UnknownAlgorithm(name) => Self::UnknownAlgorithm(name),
            CredentialsError::MissingId
            | CredentialsError::MissingKey
            | CredentialsError::MissingAlgorithm => Self::InvalidKey,
        }
    }
}

/// Compute the base64 MAC of `context` for the given credentials.
pub fn compute_mac<M>(
    mac_type: MacType,
    credentials: &Credentials<M>,
    context: &SigningContext,
) -> Result<String, MacError> {
    mac_normalized(
        credentials.algorithm(),
        credentials.key(),
        &context.normalized_string(mac_type),
        mac_type,
    )
}

/// Compute a MAC with an algorithm given by name.
///
/// The name is checked against the supported set before anything is hashed,
/// so an unrecognized algorithm is reported as such and never as a mismatch.
pub fn compute_mac_with(
    algorithm: &str,
    key: &Key,
    mac_type: MacType,
    context: &SigningContext,
) -> Result<String, MacError> {
    let algorithm: Algorithm = algorithm.parse()?;
    mac_normalized(
        algorithm,
        key,
        &context.normalized_string(mac_type),
        mac_type,
    )
}

/// MAC over `hawk.1.ts\n<ts>\n`, used by servers to sign their clock.
pub fn timestamp_mac<M>(credentials: &Credentials<M>, ts: u64) -> Result<String, MacError> {
    let normalized = format!("hawk.{}.ts\n{}\n", crate::HEADER_VERSION, ts);
    let digest = hmac(
        credentials.algorithm(),
        credentials.key().as_bytes(),
        normalized.as_bytes(),
    )?;
    Ok(STANDARD.encode(digest))
}

/// Compare a presented MAC against the expected one in constant time.
///
/// Length differences and content differences are both [`MacError::BadMac`].
pub fn verify_mac(expected: &str, computed: &str) -> Result<(), MacError> {
    if bool::from(expected.as_bytes().ct_eq(computed.as_bytes())) {
        Ok(())
    } else {
        Err(MacError::BadMac)
    }
}

fn mac_normalized(
    algorithm: Algorithm,
    key: &Key,
    normalized: &str,
    mac_type: MacType,
) -> Result<String, MacError> {
    tracing::trace!(%mac_type, %algorithm, length = normalized.len(), "computing mac");
    let digest = hmac(algorithm, key.as_bytes(), normalized.as_bytes())?;
    Ok(STANDARD.encode(digest))
}

fn hmac(algorithm: Algorithm, key: &[u8], data: &[u8]) -> Result<Vec<u8>, MacError> {
    match algorithm {
        Algorithm::Sha1 => sign::<Hmac<Sha1>>(key, data),
        Algorithm::Sha256 => sign::<Hmac<Sha256>>(key, data),
    }
}

fn sign<H: Mac + KeyInit>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, MacError> {
    let mut mac = <H as KeyInit>::new_from_slice(key).map_err(|_| MacError::InvalidKey)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
