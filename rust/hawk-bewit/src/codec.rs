//! Bewit token encoding.
//!
//! A bewit is four fields joined by a literal backslash,
//! `id\exp\mac\ext`, encoded with the URL-safe base64 alphabet. An empty
//! `ext` still produces the trailing backslash, so every token decodes to
//! exactly four fields.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};

use crate::BewitError;

/// URL-safe base64. Tokens are written unpadded; padded input is accepted.
const BEWIT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

const SEPARATOR: char = '\\';

/// The fields carried by a bewit token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bewit {
    /// Credential id the token was issued for.
    pub id: String,
    /// Expiry, in seconds since the epoch.
    pub exp: u64,
    /// Base64 MAC over the bewit's normalized string.
    pub mac: String,
    /// Application data. Empty when none was given.
    pub ext: String,
}

impl Bewit {
    /// Encode as a URL-safe token.
    pub fn encode(&self) -> String {
        let joined = format!(
            "{id}{SEPARATOR}{exp}{SEPARATOR}{mac}{SEPARATOR}{ext}",
            id = self.id,
            exp = self.exp,
            mac = self.mac,
            ext = self.ext,
        );
        BEWIT_ENGINE.encode(joined)
    }

    /// Decode a token taken from a `bewit` query parameter.
    ///
    /// # Errors
    ///
    /// - [`BewitError::InvalidBewitEncoding`] if the token is not URL-safe base64.
    /// - [`BewitError::InvalidBewitStructure`] if it does not hold four fields,
    ///   or `exp` is not a number.
    /// - [`BewitError::MissingBewitAttributes`] if `id`, `exp` or `mac` is empty.
    pub fn decode(token: &str) -> Result<Self, BewitError> {
        let bytes = BEWIT_ENGINE
            .decode(token)
            .map_err(|_| BewitError::InvalidBewitEncoding)?;
        let decoded = String::from_utf8_lossy(&bytes);

        // `ext` is the remainder, backslashes and all
        let mut fields = decoded.splitn(4, SEPARATOR);
        let (Some(id), Some(exp), Some(mac), Some(ext)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(BewitError::InvalidBewitStructure);
        };

        if id.is_empty() || exp.is_empty() || mac.is_empty() {
            return Err(BewitError::MissingBewitAttributes);
        }

        let exp = exp
            .parse::<u64>()
            .map_err(|_| BewitError::InvalidBewitStructure)?;

        Ok(Self {
            id: id.to_string(),
            exp,
            mac: mac.to_string(),
            ext: ext.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    const REFERENCE: &str = "MTIzNDU2XDEzNTY0MjA3MDdca3NjeHdOUjJ0SnBQMVQxekRMTlBiQjVVaUtJVTl0T1NKWFRVZEc3WDloOD1ceGFuZHlhbmR6";

    fn reference() -> Bewit {
        Bewit {
            id: "123456".into(),
            exp: 1356420707,
            mac: "kscxwNR2tJpP1T1zDLNPbB5UiKIU9tOSJXTUdG7X9h8=".into(),
            ext: "xandyandz".into(),
        }
    }

    #[test]
    fn it_encodes_the_reference_token() {
        assert_eq!(reference().encode(), REFERENCE);
    }

    #[test]
    fn it_decodes_the_reference_token() -> TestResult {
        assert_eq!(Bewit::decode(REFERENCE)?, reference());
        Ok(())
    }

    #[test]
    fn it_keeps_the_trailing_separator_for_empty_ext() -> TestResult {
        let bewit = Bewit {
            ext: String::new(),
            mac: "IGYmLgIqLrCe8CxvKPs4JlWIA+UjWJJouwgARiVhCAg=".into(),
            ..reference()
        };
        let token = bewit.encode();

        assert_eq!(
            token,
            "MTIzNDU2XDEzNTY0MjA3MDdcSUdZbUxnSXFMckNlOEN4dktQczRKbFdJQStValdKSm91d2dBUmlWaENBZz1c"
        );
        assert_eq!(Bewit::decode(&token)?.ext, "");
        Ok(())
    }

    #[test]
    fn it_accepts_padded_tokens() -> TestResult {
        // "ab\1\m\" is 8 bytes, so its base64 form needs padding
        let bewit = Bewit {
            id: "ab".into(),
            exp: 1,
            mac: "m".into(),
            ext: String::new(),
        };
        let unpadded = bewit.encode();
        let padded = format!("{unpadded}{}", "=".repeat((4 - unpadded.len() % 4) % 4));

        assert_eq!(Bewit::decode(&padded)?, bewit);
        assert_eq!(Bewit::decode(&unpadded)?, bewit);
        Ok(())
    }

    #[test]
    fn it_rejects_characters_outside_the_url_safe_alphabet() {
        assert_eq!(Bewit::decode("*"), Err(BewitError::InvalidBewitEncoding));
        // Standard alphabet characters are not URL-safe
        assert_eq!(
            Bewit::decode("MTIz+/"),
            Err(BewitError::InvalidBewitEncoding)
        );
    }

    #[test]
    fn it_rejects_tokens_with_too_few_fields() {
        assert_eq!(Bewit::decode("abc"), Err(BewitError::InvalidBewitStructure));
        // "a\b\c"
        assert_eq!(
            Bewit::decode("YVxiXGM"),
            Err(BewitError::InvalidBewitStructure)
        );
    }

    #[test]
    fn it_rejects_empty_required_fields() {
        // "a\\c\d"
        assert_eq!(
            Bewit::decode("YVxcY1xk"),
            Err(BewitError::MissingBewitAttributes)
        );
        // "\4552147622\+BElXP1xnZ7/wSknmethefnoQ3GV6MJQUDy85jSeRxU=\some-app-data"
        assert_eq!(
            Bewit::decode(
                "XDQ1NTIxNDc2MjJcK0JFbFhQMXhuWjcvd1Nrbm1ldGhlZm5vUTNHVjZNSlFVRHk4NWpTZVJ4VT1cc29tZS1hcHAtZGF0YQ"
            ),
            Err(BewitError::MissingBewitAttributes)
        );
    }

    #[test]
    fn it_rejects_non_numeric_expiry() {
        let token = BEWIT_ENGINE.encode(r"123456\soon\mac\ext");
        assert_eq!(
            Bewit::decode(&token),
            Err(BewitError::InvalidBewitStructure)
        );
    }

    #[test]
    fn it_keeps_backslashes_in_ext() -> TestResult {
        let bewit = Bewit {
            ext: r"a\b".into(),
            ..reference()
        };
        assert_eq!(Bewit::decode(&bewit.encode())?.ext, r"a\b");
        Ok(())
    }
}
