//! The parts of an incoming HTTP request that bewit verification reads.

use crate::BewitError;

/// Default name of the header carrying `host[:port]`.
pub const DEFAULT_HOST_HEADER: &str = "host";

/// An incoming request, independent of any HTTP framework.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Request {
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// Request target: `/path?query`, or an absolute URL.
    pub url: String,
    /// Explicit host. Takes precedence over the Host header.
    pub host: Option<String>,
    /// Explicit port. Takes precedence over the Host header.
    pub port: Option<u16>,
    /// Whether the request arrived over TLS. Selects the default port.
    pub encrypted: bool,
    /// Header names and values as received.
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// A request with the given method and target.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// A `GET` request for the given target.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Set an explicit host and port.
    pub fn with_host(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = Some(host.into());
        self.port = Some(port);
        self
    }

    /// Mark the request as received over TLS.
    pub fn with_encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of the named header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Value of the `Authorization` header, whatever its scheme.
    ///
    /// A blank value carries no credential and reads as absent.
    pub fn authorization(&self) -> Option<&str> {
        self.header("authorization").filter(|value| !value.trim().is_empty())
    }

    /// Resolve the host and port the request was addressed to.
    ///
    /// Explicit fields win over the header named `host_header`. A missing
    /// port defaults to 443 for encrypted requests and 80 otherwise.
    ///
    /// The header must be well-formed only when it supplies the host. With an
    /// explicit host, a malformed header is ignored and the port defaults.
    pub fn host_and_port(&self, host_header: &str) -> Result<(String, u16), BewitError> {
        let default_port = if self.encrypted { 443 } else { 80 };
        let header = self.header(host_header);

        let (host, parsed_port) = match &self.host {
            Some(host) => {
                let port = match self.port {
                    Some(port) => Some(port),
                    None => header
                        .and_then(|value| parse_host(value).ok())
                        .and_then(|(_, port)| port),
                };
                (host.clone(), port)
            }
            None => {
                let value = header.ok_or(BewitError::InvalidHostHeader)?;
                let (host, port) = parse_host(value)?;
                (host.to_string(), self.port.or(port))
            }
        };

        Ok((host, parsed_port.unwrap_or(default_port)))
    }
}

/// Parse `host[:port]`, including bracketed IPv6 hosts.
fn parse_host(value: &str) -> Result<(&str, Option<u16>), BewitError> {
    let value = value.trim();

    let (host, port) = if value.starts_with('[') {
        let end = value.find(']').ok_or(BewitError::InvalidHostHeader)?;
        let (host, rest) = value.split_at(end + 1);
        match rest {
            "" => (host, None),
            rest => (
                host,
                Some(rest.strip_prefix(':').ok_or(BewitError::InvalidHostHeader)?),
            ),
        }
    } else {
        match value.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (value, None),
        }
    };

    if host.is_empty() {
        return Err(BewitError::InvalidHostHeader);
    }

    let port = match port {
        Some(port) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => Some(
            port.parse::<u16>()
                .map_err(|_| BewitError::InvalidHostHeader)?,
        ),
        Some(_) => return Err(BewitError::InvalidHostHeader),
        None => None,
    };

    Ok((host, port))
}

#[cfg(feature = "http")]
impl Request {
    /// `encrypted` is only known from an absolute `https://` URI. Servers
    /// usually see origin-form targets (`/path?query`), so behind TLS set it
    /// with [`Request::with_encrypted`] after converting.
    fn from_http_parts(method: &http::Method, uri: &http::Uri, headers: &http::HeaderMap) -> Self {
        let headers = headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        Self {
            method: method.as_str().to_string(),
            url: uri
                .path_and_query()
                .map(|path| path.as_str().to_string())
                .unwrap_or_else(|| "/".to_string()),
            host: uri.host().map(str::to_string),
            port: uri.port_u16(),
            encrypted: uri.scheme_str() == Some("https"),
            headers,
        }
    }
}

/// Copies method, target, and headers.
///
/// The request counts as encrypted only when its URI is absolute with an
/// `https` scheme. For origin-form requests received over TLS, follow up with
/// [`Request::with_encrypted`].
#[cfg(feature = "http")]
impl<B> From<&http::Request<B>> for Request {
    fn from(request: &http::Request<B>) -> Self {
        Self::from_http_parts(request.method(), request.uri(), request.headers())
    }
}

/// Same as the [`http::Request`] conversion, including how `encrypted` is
/// inferred.
#[cfg(feature = "http")]
impl From<&http::request::Parts> for Request {
    fn from(parts: &http::request::Parts) -> Self {
        Self::from_http_parts(&parts.method, &parts.uri, &parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[test]
    fn it_prefers_explicit_host_and_port() -> TestResult {
        let request = Request::get("/resource/4")
            .with_host("example.com", 8080)
            .with_header("Host", "other.com:9000");
        assert_eq!(request.host_and_port("host")?, ("example.com".into(), 8080));
        Ok(())
    }

    #[test]
    fn it_reads_the_host_header() -> TestResult {
        let request = Request::get("/").with_header("Host", "example.com:8080");
        assert_eq!(request.host_and_port("host")?, ("example.com".into(), 8080));

        let request = Request::get("/").with_header("host", "example.com");
        assert_eq!(request.host_and_port("host")?, ("example.com".into(), 80));

        let request = Request::get("/")
            .with_header("host", "example.com")
            .with_encrypted(true);
        assert_eq!(request.host_and_port("host")?, ("example.com".into(), 443));
        Ok(())
    }

    #[test]
    fn it_reads_a_custom_host_header() -> TestResult {
        let request = Request::get("/")
            .with_header("Host", "internal:3000")
            .with_header("X-Forwarded-Host", "example.com:8443");
        assert_eq!(
            request.host_and_port("x-forwarded-host")?,
            ("example.com".into(), 8443)
        );
        Ok(())
    }

    #[test]
    fn it_reads_ipv6_hosts() -> TestResult {
        let request = Request::get("/").with_header("host", "[::1]:8000");
        assert_eq!(request.host_and_port("host")?, ("[::1]".into(), 8000));

        let request = Request::get("/").with_header("host", "[::1]");
        assert_eq!(request.host_and_port("host")?, ("[::1]".into(), 80));
        Ok(())
    }

    #[test]
    fn it_rejects_malformed_host_headers() {
        for value in [
            "example.com:something",
            "example.com:",
            "example.com:99999",
            ":8080",
            "",
            "a:1:2",
            "[::1",
            "[::1]8080",
        ] {
            let request = Request::get("/").with_header("host", value);
            assert_eq!(
                request.host_and_port("host"),
                Err(BewitError::InvalidHostHeader),
                "{value:?}"
            );
        }
    }

    #[test]
    fn it_ignores_a_malformed_host_header_when_the_host_is_explicit() -> TestResult {
        let mut request = Request::get("/").with_header("host", "example.com:abc");
        request.host = Some("example.com".into());
        assert_eq!(request.host_and_port("host")?, ("example.com".into(), 80));

        request.encrypted = true;
        assert_eq!(request.host_and_port("host")?, ("example.com".into(), 443));

        let mut request = Request::get("/").with_header("host", "other.com:9000");
        request.host = Some("example.com".into());
        assert_eq!(request.host_and_port("host")?, ("example.com".into(), 9000));

        let mut request = Request::get("/").with_header("host", "[::1");
        request.port = Some(8080);
        assert_eq!(
            request.host_and_port("host"),
            Err(BewitError::InvalidHostHeader)
        );
        Ok(())
    }

    #[test]
    fn it_requires_some_host() {
        assert_eq!(
            Request::get("/").host_and_port("host"),
            Err(BewitError::InvalidHostHeader)
        );
    }

    #[test]
    fn it_matches_header_names_case_insensitively() {
        let request = Request::get("/").with_header("AUTHORIZATION", "Basic asdasdasdasd");
        assert_eq!(request.authorization(), Some("Basic asdasdasdasd"));
    }

    #[test]
    fn it_treats_blank_authorization_as_absent() {
        for value in ["", "   ", "\t"] {
            let request = Request::get("/").with_header("authorization", value);
            assert_eq!(request.authorization(), None, "{value:?}");
        }
    }

    #[cfg(feature = "http")]
    #[test]
    fn it_converts_http_requests() -> TestResult {
        let request = http::Request::builder()
            .method("GET")
            .uri("https://example.com/resource/4?a=1&b=2")
            .header("authorization", "Basic abc")
            .body(())?;
        let converted = Request::from(&request);

        assert_eq!(converted.method, "GET");
        assert_eq!(converted.url, "/resource/4?a=1&b=2");
        assert_eq!(converted.host.as_deref(), Some("example.com"));
        assert!(converted.encrypted);
        assert_eq!(converted.host_and_port("host")?, ("example.com".into(), 443));
        assert_eq!(converted.authorization(), Some("Basic abc"));
        Ok(())
    }

    #[cfg(feature = "http")]
    #[test]
    fn it_converts_origin_form_request_parts() -> TestResult {
        let (parts, ()) = http::Request::builder()
            .method("GET")
            .uri("/resource/4?bewit=abc")
            .header("host", "example.com:8080")
            .body(())?
            .into_parts();
        let converted = Request::from(&parts);

        assert_eq!(converted.url, "/resource/4?bewit=abc");
        assert_eq!(converted.host, None);
        assert_eq!(converted.host_and_port("host")?, ("example.com".into(), 8080));
        Ok(())
    }

    #[cfg(feature = "http")]
    #[test]
    fn it_leaves_origin_form_requests_unencrypted_until_told() -> TestResult {
        let request = http::Request::builder()
            .uri("/resource/4")
            .header("host", "example.com")
            .body(())?;

        let converted = Request::from(&request);
        assert!(!converted.encrypted);
        assert_eq!(converted.host_and_port("host")?, ("example.com".into(), 80));

        let converted = converted.with_encrypted(true);
        assert_eq!(converted.host_and_port("host")?, ("example.com".into(), 443));
        Ok(())
    }
}
