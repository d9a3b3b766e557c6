//! Error taxonomy for bewit authentication.
//!
//! Failures fall into three groups:
//!
//! - **Client-facing** errors describe something wrong with the request. Their
//!   messages are safe to return to the caller, with a 400 or 401 status.
//! - **Internal** errors ([`BewitError::InvalidCredentials`],
//!   [`BewitError::UnknownAlgorithm`]) mean the credential store returned a
//!   malformed record. They are server defects and render as a generic 500.
//! - **Missing** ([`BewitError::Missing`]) means no bewit was presented at
//!   all. It carries no message so that an orchestrating layer can fall back
//!   to another authentication scheme.

use serde::Serialize;
use thiserror::Error;

use hawk_mac::CredentialRecord;

/// Message returned to clients in place of an internal error's detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// A failed bewit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum BewitError {
    /// The request carries no `bewit` parameter.
    #[error("Missing authentication")]
    Missing,

    /// The Host header cannot be parsed as `host[:port]`.
    #[error("Invalid Host header")]
    InvalidHostHeader,

    /// The request URL is longer than the configured limit.
    #[error("Resource path exceeds max length")]
    ResourcePathTooLong,

    /// The request carries a bewit together with another credential, or more
    /// than one bewit.
    #[error("Multiple authentications")]
    MultipleAuthentications,

    /// Bewits only authorize `GET`.
    #[error("Invalid method")]
    InvalidMethod,

    /// The `bewit` parameter is present with no value.
    #[error("Empty bewit")]
    EmptyBewit,

    /// The token is not URL-safe base64.
    #[error("Invalid bewit encoding")]
    InvalidBewitEncoding,

    /// The decoded token does not hold `id\exp\mac\ext`.
    #[error("Invalid bewit structure")]
    InvalidBewitStructure,

    /// One of `id`, `exp` or `mac` is empty.
    #[error("Missing bewit attributes")]
    MissingBewitAttributes,

    /// The bewit's expiry is not in the future.
    #[error("Access expired")]
    AccessExpired,

    /// No credentials exist for the bewit's id.
    #[error("Unknown credentials")]
    UnknownCredentials,

    /// The MAC does not match the request.
    #[error("Bad mac")]
    BadMac,

    /// The credential store returned a record without a key or algorithm.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The credential store returned an algorithm that is not supported.
    #[error("Unknown algorithm")]
    UnknownAlgorithm,
}

impl BewitError {
    /// Classification of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Missing => ErrorCode::Missing,
            Self::InvalidHostHeader => ErrorCode::InvalidHostHeader,
            Self::ResourcePathTooLong => ErrorCode::ResourcePathTooLong,
            Self::MultipleAuthentications => ErrorCode::MultipleAuthentications,
            Self::InvalidMethod => ErrorCode::InvalidMethod,
            Self::EmptyBewit => ErrorCode::EmptyBewit,
            Self::InvalidBewitEncoding => ErrorCode::InvalidBewitEncoding,
            Self::InvalidBewitStructure => ErrorCode::InvalidBewitStructure,
            Self::MissingBewitAttributes => ErrorCode::MissingBewitAttributes,
            Self::AccessExpired => ErrorCode::AccessExpired,
            Self::UnknownCredentials => ErrorCode::UnknownCredentials,
            Self::BadMac => ErrorCode::BadMac,
            Self::InvalidCredentials | Self::UnknownAlgorithm => ErrorCode::InternalError,
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        self.code().status_code()
    }

    /// Whether no bewit was presented at all.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Whether this is a server-side configuration defect.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::UnknownAlgorithm)
    }

    /// Message that may be shown to the client.
    ///
    /// `None` for [`BewitError::Missing`]. Internal errors return
    /// [`INTERNAL_ERROR_MESSAGE`] rather than their detail.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Missing => None,
            Self::InvalidCredentials | Self::UnknownAlgorithm => Some(INTERNAL_ERROR_MESSAGE),
            Self::InvalidHostHeader => Some("Invalid Host header"),
            Self::ResourcePathTooLong => Some("Resource path exceeds max length"),
            Self::MultipleAuthentications => Some("Multiple authentications"),
            Self::InvalidMethod => Some("Invalid method"),
            Self::EmptyBewit => Some("Empty bewit"),
            Self::InvalidBewitEncoding => Some("Invalid bewit encoding"),
            Self::InvalidBewitStructure => Some("Invalid bewit structure"),
            Self::MissingBewitAttributes => Some("Missing bewit attributes"),
            Self::AccessExpired => Some("Access expired"),
            Self::UnknownCredentials => Some("Unknown credentials"),
            Self::BadMac => Some("Bad mac"),
        }
    }

    /// `WWW-Authenticate` challenge for 401 responses.
    pub fn www_authenticate(&self) -> Option<String> {
        if self.status_code() != 401 {
            return None;
        }
        Some(match self.message() {
            Some(message) => format!("Hawk error=\"{message}\""),
            None => "Hawk".to_string(),
        })
    }
}

/// Error codes for bewit authentication responses.
///
/// Each code maps to an HTTP status code via [`ErrorCode::status_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // 400 Bad Request
    /// Host header is malformed
    InvalidHostHeader,
    /// Request URL too long
    ResourcePathTooLong,
    /// More than one authentication presented
    MultipleAuthentications,
    /// Token is not URL-safe base64
    InvalidBewitEncoding,
    /// Token does not have four fields
    InvalidBewitStructure,
    /// Token has empty required fields
    MissingBewitAttributes,

    // 401 Unauthorized
    /// No bewit presented
    Missing,
    /// Bewit parameter has no value
    EmptyBewit,
    /// Request method is not GET
    InvalidMethod,
    /// Bewit has expired
    AccessExpired,
    /// No credentials for the bewit id
    UnknownCredentials,
    /// MAC mismatch
    BadMac,

    // 500 Internal Server Error
    /// Credential store or resolver failure
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorCode::InvalidHostHeader
            | ErrorCode::ResourcePathTooLong
            | ErrorCode::MultipleAuthentications
            | ErrorCode::InvalidBewitEncoding
            | ErrorCode::InvalidBewitStructure
            | ErrorCode::MissingBewitAttributes => 400,

            ErrorCode::Missing
            | ErrorCode::EmptyBewit
            | ErrorCode::InvalidMethod
            | ErrorCode::AccessExpired
            | ErrorCode::UnknownCredentials
            | ErrorCode::BadMac => 401,

            ErrorCode::InternalError => 500,
        }
    }
}

/// Failure of [`crate::authenticate`].
///
/// `E` and `M` are the resolver's error and metadata types.
#[derive(Debug, Error)]
pub enum AuthenticationError<E, M = ()> {
    /// The bewit was rejected.
    #[error(transparent)]
    Bewit(#[from] BewitError),

    /// The credential resolver failed. Its error is passed through unchanged,
    /// along with any partial record it returned.
    #[error("{error}")]
    Resolver {
        /// Error reported by the resolver.
        error: E,
        /// Record the resolver returned alongside its error, if any.
        credentials: Option<CredentialRecord<M>>,
    },
}

impl<E, M> AuthenticationError<E, M> {
    /// The bewit error, unless the resolver failed.
    pub fn bewit_error(&self) -> Option<&BewitError> {
        match self {
            Self::Bewit(error) => Some(error),
            Self::Resolver { .. } => None,
        }
    }

    /// The resolver's error, if the resolver failed.
    pub fn resolver_error(&self) -> Option<&E> {
        match self {
            Self::Resolver { error, .. } => Some(error),
            Self::Bewit(_) => None,
        }
    }

    /// Partial credentials forwarded from a failing resolver.
    pub fn credentials(&self) -> Option<&CredentialRecord<M>> {
        match self {
            Self::Resolver { credentials, .. } => credentials.as_ref(),
            Self::Bewit(_) => None,
        }
    }

    /// Whether no bewit was presented at all.
    pub fn is_missing(&self) -> bool {
        self.bewit_error().is_some_and(BewitError::is_missing)
    }
}

/// Service error with code and message.
///
/// A transport-neutral rendering of an authentication failure that HTTP
/// handlers can turn into a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// The error code
    pub code: ErrorCode,
    /// Client-safe message. `None` when no bewit was presented.
    pub message: Option<String>,
    /// `WWW-Authenticate` header value for 401 responses
    pub challenge: Option<String>,
}

impl ServiceError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }

    /// Internal server error.
    pub fn internal() -> Self {
        Self {
            code: ErrorCode::InternalError,
            message: Some(INTERNAL_ERROR_MESSAGE.to_string()),
            challenge: None,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{:?}: {}", self.code, message),
            None => write!(f, "{:?}", self.code),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<BewitError> for ServiceError {
    fn from(error: BewitError) -> Self {
        Self {
            code: error.code(),
            message: error.message().map(str::to_string),
            challenge: error.www_authenticate(),
        }
    }
}

/// Resolver errors are opaque to the client and render as internal errors.
impl<E, M> From<AuthenticationError<E, M>> for ServiceError {
    fn from(error: AuthenticationError<E, M>) -> Self {
        match error {
            AuthenticationError::Bewit(error) => error.into(),
            AuthenticationError::Resolver { .. } => ServiceError::internal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_maps_codes_to_status() {
        assert_eq!(BewitError::InvalidHostHeader.status_code(), 400);
        assert_eq!(BewitError::MultipleAuthentications.status_code(), 400);
        assert_eq!(BewitError::InvalidBewitEncoding.status_code(), 400);
        assert_eq!(BewitError::Missing.status_code(), 401);
        assert_eq!(BewitError::AccessExpired.status_code(), 401);
        assert_eq!(BewitError::BadMac.status_code(), 401);
        assert_eq!(BewitError::InvalidCredentials.status_code(), 500);
        assert_eq!(BewitError::UnknownAlgorithm.status_code(), 500);
    }

    #[test]
    fn it_flags_only_the_missing_signal() {
        assert!(BewitError::Missing.is_missing());
        assert_eq!(BewitError::Missing.message(), None);
        assert!(!BewitError::EmptyBewit.is_missing());
        assert_eq!(BewitError::EmptyBewit.message(), Some("Empty bewit"));
    }

    #[test]
    fn it_hides_internal_detail_from_clients() {
        let error = BewitError::UnknownAlgorithm;
        assert!(error.is_internal());
        assert_eq!(error.to_string(), "Unknown algorithm");
        assert_eq!(error.message(), Some(INTERNAL_ERROR_MESSAGE));
        assert_eq!(error.www_authenticate(), None);
    }

    #[test]
    fn it_renders_challenges_for_unauthorized_errors() {
        assert_eq!(
            BewitError::BadMac.www_authenticate().as_deref(),
            Some("Hawk error=\"Bad mac\"")
        );
        assert_eq!(BewitError::Missing.www_authenticate().as_deref(), Some("Hawk"));
        assert_eq!(BewitError::InvalidBewitStructure.www_authenticate(), None);
    }

    #[test]
    fn it_converts_resolver_failures_to_internal_service_errors() {
        let error: AuthenticationError<&str> = AuthenticationError::Resolver {
            error: "Boom",
            credentials: None,
        };
        assert_eq!(error.to_string(), "Boom");

        let service = ServiceError::from(error);
        assert_eq!(service.status_code(), 500);
        assert_eq!(service.message.as_deref(), Some(INTERNAL_ERROR_MESSAGE));
    }

    #[test]
    fn it_converts_bewit_errors_to_service_errors() {
        let service = ServiceError::from(BewitError::AccessExpired);
        assert_eq!(service.code, ErrorCode::AccessExpired);
        assert_eq!(service.message.as_deref(), Some("Access expired"));
        assert_eq!(
            service.challenge.as_deref(),
            Some("Hawk error=\"Access expired\"")
        );
    }
}
