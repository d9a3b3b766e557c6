#![warn(missing_docs)]

//! MAC engine for Hawk request authentication.
//!
//! Clients and servers that share a secret authenticate a request by
//! computing an HMAC over a normalized string built from the request's
//! attributes. This crate owns that string, the HMAC itself, and the
//! credential types it is keyed by. It performs no I/O and keeps no state.
//!
//! # Example
//!
//! ```
//! use hawk_mac::{Algorithm, Credentials, MacType, SigningContext, compute_mac, verify_mac};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("123456", "2983d45yun89q", Algorithm::Sha256)?;
//! let context = SigningContext::bewit(
//!     1356420707,
//!     "/somewhere/over/the/rainbow",
//!     "example.com",
//!     443,
//!     Some("xandyandz".into()),
//! );
//!
//! let mac = compute_mac(MacType::Bewit, &credentials, &context)?;
//! verify_mac(&mac, "kscxwNR2tJpP1T1zDLNPbB5UiKIU9tOSJXTUdG7X9h8=")?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod algorithm;
mod context;
mod credentials;
mod mac;
mod payload;

pub use algorithm::Algorithm;
pub use context::{MacType, SigningContext};
pub use credentials::{CredentialRecord, Credentials, CredentialsError, Key};
pub use mac::{MacError, compute_mac, compute_mac_with, timestamp_mac, verify_mac};
pub use payload::{PayloadHasher, payload_hash};

/// Protocol version written into every normalized string.
pub const HEADER_VERSION: &str = "1";
