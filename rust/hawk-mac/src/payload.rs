//! Payload hashes.
//!
//! A payload hash binds a request or response body (and its content type)
//! into the `hash` line of a normalized string. Bewits never carry one, but
//! the hash is computed with the same algorithm as the credentials' MAC.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::{Algorithm, HEADER_VERSION};

/// Hash a complete payload.
pub fn payload_hash(algorithm: Algorithm, payload: &[u8], content_type: &str) -> String {
    let mut hasher = PayloadHasher::new(algorithm, content_type);
    hasher.update(payload);
    hasher.finalize()
}

/// Incremental payload hash, for bodies that arrive in chunks.
#[derive(Debug, Clone)]
pub enum PayloadHasher {
    /// SHA-1 state.
    Sha1(Sha1),
    /// SHA-256 state.
    Sha256(Sha256),
}

impl PayloadHasher {
    /// Start a hash for a payload of the given content type.
    pub fn new(algorithm: Algorithm, content_type: &str) -> Self {
        let mut hasher = match algorithm {
            Algorithm::Sha1 => Self::Sha1(Sha1::new()),
            Algorithm::Sha256 => Self::Sha256(Sha256::new()),
        };
        hasher.update(format!("hawk.{}.payload\n", HEADER_VERSION).as_bytes());
        hasher.update(media_type(content_type).as_bytes());
        hasher.update(b"\n");
        hasher
    }

    /// Feed the next chunk of the payload.
    pub fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Sha1(hasher) => hasher.update(chunk),
            Self::Sha256(hasher) => hasher.update(chunk),
        }
    }

    /// Close the payload and return its base64 hash.
    pub fn finalize(mut self) -> String {
        self.update(b"\n");
        match self {
            Self::Sha1(hasher) => STANDARD.encode(hasher.finalize()),
            Self::Sha256(hasher) => STANDARD.encode(hasher.finalize()),
        }
    }
}

/// `text/plain; charset=utf-8` → `text/plain`
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
