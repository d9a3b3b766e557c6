#![warn(missing_docs)]

//! Hawk bewits: time-limited, `GET`-only access embedded in a URL.
//!
//! A bewit lets the holder of a shared secret grant read access to a single
//! resource without handing out the secret. The grant is a `bewit` query
//! parameter carrying the credential id, an expiry, a MAC over the resource,
//! and optional application data.
//!
//! ```
//! use hawk_bewit::{
//!     Algorithm, AuthenticateOptions, BewitOptions, CredentialRecord, MemoryResolver, Request,
//!     authenticate, get_bewit,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let record = CredentialRecord::new("dh37fgj492je", "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn", Algorithm::Sha256);
//!
//! // Issue
//! let options = BewitOptions::new(record.clone(), 60).with_ext("some-app-data");
//! let token = get_bewit("http://example.com:8080/resource/4?a=1", Some(&options));
//!
//! // Verify
//! let resolver = MemoryResolver::new().with("dh37fgj492je", record);
//! let request = Request::get(format!("/resource/4?a=1&bewit={token}")).with_host("example.com", 8080);
//! let authenticated = authenticate(&request, &resolver, &AuthenticateOptions::default()).await?;
//!
//! assert_eq!(authenticated.attributes.ext, "some-app-data");
//! # Ok(())
//! # }
//! ```

mod codec;
mod error;
mod extract;
mod issue;
mod request;
mod resolver;
mod sync;
mod time;
mod verify;

pub use codec::Bewit;
pub use error::{
    AuthenticationError, BewitError, ErrorCode, INTERNAL_ERROR_MESSAGE, ServiceError,
};
pub use extract::{Extracted, extract_bewit};
pub use issue::{BewitOptions, IntoUri, IssueError, get_bewit, get_bewit_with_clock, try_get_bewit};
pub use request::{DEFAULT_HOST_HEADER, Request};
pub use resolver::{CredentialResolver, FnResolver, LookupFailure, MemoryResolver, resolver_fn};
pub use sync::{MaybeSend, MaybeSync};
pub use time::{Clock, FixedClock, SystemClock, now_msec, now_sec};
pub use verify::{AuthenticateOptions, Authenticated, Authenticator, BewitAttributes, authenticate};

pub use hawk_mac::{Algorithm, CredentialRecord, Credentials, CredentialsError, HEADER_VERSION, Key};

/// Name of the query parameter carrying the token.
pub const BEWIT_PARAMETER: &str = "bewit";

/// Longest request URL [`authenticate`] accepts by default.
pub const DEFAULT_MAX_URL_LENGTH: usize = 4096;
