//! Normalized request strings.
//!
//! Every MAC in the scheme is computed over the same newline-terminated
//! layout:
//!
//! ```text
//! hawk.1.<type>
//! <ts>
//! <nonce>
//! <METHOD>
//! <resource>
//! <host>
//! <port>
//! <hash>
//! <ext>
//! ```
//!
//! Independent implementations must agree on this layout byte for byte, so
//! fields are written verbatim and nothing is escaped.

use std::fmt;

use crate::HEADER_VERSION;

/// What a MAC authenticates. Part of the first line of the normalized string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacType {
    /// A client request carried in the `Authorization` header.
    Header,
    /// A server response carried in `Server-Authorization`.
    Response,
    /// A bewit embedded in a URL query string.
    Bewit,
}

impl MacType {
    /// Tag written after the protocol version.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Response => "response",
            Self::Bewit => "bewit",
        }
    }
}

impl fmt::Display for MacType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request attributes covered by a MAC.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SigningContext {
    /// Seconds since the epoch. For bewits this is the expiry.
    pub ts: u64,
    /// Client nonce. Always empty for bewits.
    pub nonce: String,
    /// HTTP method. Uppercased when normalized.
    pub method: String,
    /// Path and query string, without a fragment.
    pub resource: String,
    /// Host name. Lowercased when normalized.
    pub host: String,
    /// Port, defaulted from the scheme when the URL has none.
    pub port: u16,
    /// Payload hash, when the payload is covered.
    pub hash: Option<String>,
    /// Application-specific data.
    pub ext: Option<String>,
}

impl SigningContext {
    /// Context for a bewit granting `GET` access to `resource` until `exp`.
    pub fn bewit(
        exp: u64,
        resource: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        ext: Option<String>,
    ) -> Self {
        Self {
            ts: exp,
            nonce: String::new(),
            method: "GET".to_string(),
            resource: resource.into(),
            host: host.into(),
            port,
            hash: None,
            ext,
        }
    }

    /// Render the string the MAC is computed over.
    pub fn normalized_string(&self, mac_type: MacType) -> String {
        format!(
            "hawk.{version}.{mac_type}\n{ts}\n{nonce}\n{method}\n{resource}\n{host}\n{port}\n{hash}\n{ext}\n",
            version = HEADER_VERSION,
            ts = self.ts,
            nonce = self.nonce,
            method = self.method.to_uppercase(),
            resource = self.resource,
            host = self.host.to_lowercase(),
            port = self.port,
            hash = self.hash.as_deref().unwrap_or_default(),
            ext = self.ext.as_deref().unwrap_or_default(),
        )
    }
}
