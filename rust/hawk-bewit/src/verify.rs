//! Bewit verification.
//!
//! A request is checked in a fixed order, and the first failing check decides
//! the outcome:
//!
//! 1. Resolve host and port
//! 2. Bound the URL length
//! 3. Extract the `bewit` parameter and the resource it signs
//! 4. Report a missing bewit
//! 5. Reject a bewit that arrives together with an `Authorization` header
//! 6. Reject an empty bewit
//! 7. Require `GET`
//! 8. Decode the token
//! 9. Check expiry
//! 10. Resolve credentials, once
//! 11. Validate the resolved record
//! 12. Recompute and compare the MAC

use hawk_mac::{CredentialsError, Credentials, MacType, SigningContext, compute_mac, verify_mac};
use serde::{Deserialize, Serialize};

use crate::extract::extract_bewit;
use crate::request::{DEFAULT_HOST_HEADER, Request};
use crate::resolver::{CredentialResolver, LookupFailure};
use crate::time::{Clock, SystemClock, now_sec};
use crate::{AuthenticationError, Bewit, BewitError, DEFAULT_MAX_URL_LENGTH};

/// Settings for verifying bewits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticateOptions {
    /// Correction applied to the local clock, in milliseconds.
    pub localtime_offset_msec: i64,
    /// Header to read `host[:port]` from when the request has no explicit host.
    pub host_header_name: String,
    /// Longest request URL accepted.
    pub max_url_length: usize,
}

impl Default for AuthenticateOptions {
    fn default() -> Self {
        Self {
            localtime_offset_msec: 0,
            host_header_name: DEFAULT_HOST_HEADER.to_string(),
            max_url_length: DEFAULT_MAX_URL_LENGTH,
        }
    }
}

impl AuthenticateOptions {
    /// Set the local clock correction.
    pub fn with_localtime_offset_msec(mut self, offset: i64) -> Self {
        self.localtime_offset_msec = offset;
        self
    }

    /// Read the host from a different header, e.g. `x-forwarded-host`.
    pub fn with_host_header_name(mut self, name: impl Into<String>) -> Self {
        self.host_header_name = name.into();
        self
    }

    /// Set the longest request URL accepted.
    pub fn with_max_url_length(mut self, length: usize) -> Self {
        self.max_url_length = length;
        self
    }
}

/// Attributes carried by a verified bewit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BewitAttributes {
    /// Credential id.
    pub id: String,
    /// Expiry, in seconds since the epoch.
    pub exp: u64,
    /// Application data. Empty when none was issued.
    pub ext: String,
}

/// A successfully verified request.
#[derive(Debug, Clone, PartialEq)]
pub struct Authenticated<M = ()> {
    /// The credentials the bewit was signed with.
    pub credentials: Credentials<M>,
    /// Fields of the verified bewit.
    pub attributes: BewitAttributes,
}

/// Verifies bewits against a credential resolver.
#[derive(Debug, Clone)]
pub struct Authenticator<R, C = SystemClock> {
    resolver: R,
    clock: C,
    options: AuthenticateOptions,
}

impl<R: CredentialResolver> Authenticator<R> {
    /// An authenticator reading the system clock.
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            clock: SystemClock,
            options: AuthenticateOptions::default(),
        }
    }
}

impl<R: CredentialResolver, C: Clock> Authenticator<R, C> {
    /// Replace the clock.
    pub fn with_clock<D: Clock>(self, clock: D) -> Authenticator<R, D> {
        Authenticator {
            resolver: self.resolver,
            clock,
            options: self.options,
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: AuthenticateOptions) -> Self {
        self.options = options;
        self
    }

    /// The resolver credentials are looked up with.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// The options requests are checked with.
    pub fn options(&self) -> &AuthenticateOptions {
        &self.options
    }

    /// Verify the bewit carried by `request`.
    pub async fn authenticate(
        &self,
        request: &Request,
    ) -> Result<Authenticated<R::Metadata>, AuthenticationError<R::Error, R::Metadata>> {
        verify(request, &self.resolver, &self.clock, &self.options).await
    }
}

/// Verify the bewit carried by `request` using the system clock.
///
/// On failure, [`AuthenticationError::is_missing`] tells a request that did
/// not attempt bewit authentication apart from one that failed it.
pub async fn authenticate<R>(
    request: &Request,
    resolver: &R,
    options: &AuthenticateOptions,
) -> Result<Authenticated<R::Metadata>, AuthenticationError<R::Error, R::Metadata>>
where
    R: CredentialResolver + ?Sized,
{
    verify(request, resolver, &SystemClock, options).await
}

async fn verify<R>(
    request: &Request,
    resolver: &R,
    clock: &dyn Clock,
    options: &AuthenticateOptions,
) -> Result<Authenticated<R::Metadata>, AuthenticationError<R::Error, R::Metadata>>
where
    R: CredentialResolver + ?Sized,
{
    let (host, port) = request.host_and_port(&options.host_header_name)?;

    if request.url.len() > options.max_url_length {
        return Err(BewitError::ResourcePathTooLong.into());
    }

    let extracted = extract_bewit(&request.url)?;
    let Some(token) = extracted.bewit else {
        return Err(BewitError::Missing.into());
    };

    if request.authorization().is_some() {
        tracing::debug!("rejecting bewit sent with an authorization header");
        return Err(BewitError::MultipleAuthentications.into());
    }

    if token.is_empty() {
        return Err(BewitError::EmptyBewit.into());
    }

    if request.method != "GET" {
        tracing::debug!(method = %request.method, "rejecting bewit for non-GET request");
        return Err(BewitError::InvalidMethod.into());
    }

    let bewit = Bewit::decode(&token)?;

    if bewit.exp <= now_sec(clock, options.localtime_offset_msec) {
        tracing::debug!(id = %bewit.id, exp = bewit.exp, "bewit expired");
        return Err(BewitError::AccessExpired.into());
    }

    let record = match resolver.resolve(&bewit.id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::debug!(id = %bewit.id, "no credentials for bewit");
            return Err(BewitError::UnknownCredentials.into());
        }
        Err(LookupFailure { error, credentials }) => {
            tracing::debug!(id = %bewit.id, "credential lookup failed");
            return Err(AuthenticationError::Resolver { error, credentials });
        }
    };

    let credentials = record.validate_for(&bewit.id).map_err(|error| {
        tracing::error!(id = %bewit.id, %error, "credential store returned an unusable record");
        match error {
            CredentialsError::UnknownAlgorithm(_) => BewitError::UnknownAlgorithm,
            CredentialsError::MissingId
            | CredentialsError::MissingKey
            | CredentialsError::MissingAlgorithm => BewitError::InvalidCredentials,
        }
    })?;

    let ext = (!bewit.ext.is_empty()).then(|| bewit.ext.clone());
    let context = SigningContext::bewit(bewit.exp, extracted.resource, host, port, ext);
    let mac = compute_mac(MacType::Bewit, &credentials, &context).map_err(|error| {
        tracing::error!(id = %bewit.id, %error, "failed to compute bewit mac");
        BewitError::InvalidCredentials
    })?;

    if verify_mac(&mac, &bewit.mac).is_err() {
        tracing::debug!(id = %bewit.id, "bewit mac mismatch");
        return Err(BewitError::BadMac.into());
    }

    tracing::debug!(id = %bewit.id, "bewit verified");
    Ok(Authenticated {
        credentials,
        attributes: BewitAttributes {
            id: bewit.id,
            exp: bewit.exp,
            ext: bewit.ext,
        },
    })
}
