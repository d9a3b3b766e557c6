//! Issuing bewits.
//!
//! [`get_bewit`] is the convenience boundary: it never fails, and returns an
//! empty string when no token can be produced. [`try_get_bewit`] and
//! [`Bewit::issue`] report why.

use hawk_mac::{CredentialRecord, Credentials, CredentialsError, MacError, MacType, SigningContext};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::Bewit;
use crate::time::{Clock, SystemClock, now_sec};

/// Reasons a bewit cannot be issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueError {
    /// The URI is empty, unparsable, has no host, or has no default port.
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// No credentials were given.
    #[error("Missing credentials")]
    MissingCredentials,

    /// The credentials are incomplete or name an unsupported algorithm.
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    /// No positive time-to-live was given.
    #[error("Missing or zero ttl")]
    MissingTtl,

    /// Computing the MAC failed.
    #[error(transparent)]
    Mac(#[from] MacError),
}

/// Values accepted as the URI a bewit is issued for.
pub trait IntoUri {
    /// Parse into an absolute URL.
    fn into_uri(self) -> Result<Url, IssueError>;
}

impl IntoUri for &str {
    fn into_uri(self) -> Result<Url, IssueError> {
        if self.is_empty() {
            return Err(IssueError::InvalidUri("empty".to_string()));
        }
        Url::parse(self).map_err(|error| IssueError::InvalidUri(error.to_string()))
    }
}

impl IntoUri for &String {
    fn into_uri(self) -> Result<Url, IssueError> {
        self.as_str().into_uri()
    }
}

impl IntoUri for String {
    fn into_uri(self) -> Result<Url, IssueError> {
        self.as_str().into_uri()
    }
}

impl IntoUri for Url {
    fn into_uri(self) -> Result<Url, IssueError> {
        Ok(self)
    }
}

impl IntoUri for &Url {
    fn into_uri(self) -> Result<Url, IssueError> {
        Ok(self.clone())
    }
}

/// Settings for issuing a bewit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "M: Deserialize<'de> + Default"))]
pub struct BewitOptions<M = ()> {
    /// Credentials to sign with.
    pub credentials: Option<CredentialRecord<M>>,
    /// Seconds until the bewit expires. Must be positive.
    pub ttl_sec: Option<u64>,
    /// Application data carried in the token and covered by the MAC.
    pub ext: Option<String>,
    /// Correction applied to the local clock, in milliseconds.
    pub localtime_offset_msec: i64,
}

impl<M> Default for BewitOptions<M> {
    fn default() -> Self {
        Self {
            credentials: None,
            ttl_sec: None,
            ext: None,
            localtime_offset_msec: 0,
        }
    }
}

impl<M> BewitOptions<M> {
    /// Options for a bewit signed with `credentials`, valid for `ttl_sec`.
    pub fn new(credentials: impl Into<CredentialRecord<M>>, ttl_sec: u64) -> Self {
        Self {
            credentials: Some(credentials.into()),
            ttl_sec: Some(ttl_sec),
            ..Self::default()
        }
    }

    /// Set the application data.
    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = Some(ext.into());
        self
    }

    /// Set the local clock correction.
    pub fn with_localtime_offset_msec(mut self, offset: i64) -> Self {
        self.localtime_offset_msec = offset;
        self
    }
}

impl Bewit {
    /// Issue a bewit granting `GET` access to `uri`.
    pub fn issue<M>(
        uri: impl IntoUri,
        options: &BewitOptions<M>,
        clock: &dyn Clock,
    ) -> Result<Self, IssueError> {
        let uri = uri.into_uri()?;
        let host = uri
            .host_str()
            .ok_or_else(|| IssueError::InvalidUri("missing host".to_string()))?;
        let port = uri
            .port_or_known_default()
            .ok_or_else(|| IssueError::InvalidUri("unknown port".to_string()))?;

        let ttl_sec = options
            .ttl_sec
            .filter(|ttl| *ttl > 0)
            .ok_or(IssueError::MissingTtl)?;

        let record = options
            .credentials
            .as_ref()
            .ok_or(IssueError::MissingCredentials)?;
        let credentials = Credentials::try_from(CredentialRecord {
            id: record.id.clone(),
            key: record.key.clone(),
            algorithm: record.algorithm.clone(),
            metadata: (),
        })?;

        let exp = now_sec(clock, options.localtime_offset_msec).saturating_add(ttl_sec);
        let resource = match uri.query() {
            Some(query) => format!("{}?{}", uri.path(), query),
            None => uri.path().to_string(),
        };

        let context = SigningContext::bewit(exp, resource, host, port, options.ext.clone());
        let mac = hawk_mac::compute_mac(MacType::Bewit, &credentials, &context)?;

        Ok(Self {
            id: credentials.id().to_string(),
            exp,
            mac,
            ext: options.ext.clone().unwrap_or_default(),
        })
    }
}

/// Issue an encoded bewit, reporting why none could be produced.
pub fn try_get_bewit<M>(
    uri: impl IntoUri,
    options: &BewitOptions<M>,
    clock: &dyn Clock,
) -> Result<String, IssueError> {
    Bewit::issue(uri, options, clock).map(|bewit| bewit.encode())
}

/// Issue an encoded bewit using the system clock.
///
/// Returns an empty string if the URI, options or credentials are unusable.
///
/// ```
/// use hawk_bewit::{Algorithm, BewitOptions, CredentialRecord, get_bewit};
///
/// let credentials = CredentialRecord::new("123456", "2983d45yun89q", Algorithm::Sha256);
/// let options = BewitOptions::new(credentials, 300).with_ext("xandyandz");
///
/// let token = get_bewit("https://example.com/somewhere/over/the/rainbow", Some(&options));
/// assert!(!token.is_empty());
///
/// assert_eq!(get_bewit::<()>("", Some(&options)), "");
/// assert_eq!(get_bewit::<()>("https://example.com/", None), "");
/// ```
pub fn get_bewit<M>(uri: impl IntoUri, options: Option<&BewitOptions<M>>) -> String {
    get_bewit_with_clock(uri, options, &SystemClock)
}

/// [`get_bewit`] with an explicit clock.
pub fn get_bewit_with_clock<M>(
    uri: impl IntoUri,
    options: Option<&BewitOptions<M>>,
    clock: &dyn Clock,
) -> String {
    let Some(options) = options else {
        tracing::debug!("bewit not issued: missing options");
        return String::new();
    };

    match try_get_bewit(uri, options, clock) {
        Ok(token) => token,
        Err(error) => {
            tracing::debug!(%error, "bewit not issued");
            String::new()
        }
    }
}
