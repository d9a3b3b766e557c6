//! Integration tests for bewit issuance.
//!
//! The reference tokens below were produced with the clock pinned to
//! 1356420407232 ms and a 300 second ttl, so every token expires at
//! 1356420707.

use hawk_bewit::{
    Algorithm, Bewit, BewitOptions, Clock, CredentialRecord, FixedClock, SystemClock, get_bewit,
    get_bewit_with_clock,
};
use testresult::TestResult;
use url::Url;

const PINNED_MSEC: u64 = 1_356_420_407_232;

fn credentials() -> CredentialRecord {
    CredentialRecord::new("123456", "2983d45yun89q", Algorithm::Sha256)
}

fn pinned(ext: Option<&str>) -> BewitOptions {
    let options = BewitOptions::new(credentials(), 300);
    match ext {
        Some(ext) => options.with_ext(ext),
        None => options,
    }
}

#[test_log::test]
fn it_returns_the_reference_bewit() {
    let token = get_bewit_with_clock(
        "https://example.com/somewhere/over/the/rainbow",
        Some(&pinned(Some("xandyandz"))),
        &FixedClock(PINNED_MSEC),
    );
    assert_eq!(
        token,
        "MTIzNDU2XDEzNTY0MjA3MDdca3NjeHdOUjJ0SnBQMVQxekRMTlBiQjVVaUtJVTl0T1NKWFRVZEc3WDloOD1ceGFuZHlhbmR6"
    );
}

#[test]
fn it_pins_the_system_clock_with_an_offset() {
    let offset = PINNED_MSEC as i64 - SystemClock.now_msec() as i64;
    let options = pinned(Some("xandyandz")).with_localtime_offset_msec(offset);

    let token = get_bewit("https://example.com/somewhere/over/the/rainbow", Some(&options));
    assert_eq!(
        token,
        "MTIzNDU2XDEzNTY0MjA3MDdca3NjeHdOUjJ0SnBQMVQxekRMTlBiQjVVaUtJVTl0T1NKWFRVZEc3WDloOD1ceGFuZHlhbmR6"
    );
}

#[test]
fn it_signs_an_explicit_port() {
    let token = get_bewit_with_clock(
        "https://example.com:8080/somewhere/over/the/rainbow",
        Some(&pinned(Some("xandyandz"))),
        &FixedClock(PINNED_MSEC),
    );
    assert_eq!(
        token,
        "MTIzNDU2XDEzNTY0MjA3MDdcaFpiSjNQMmNLRW80a3kwQzhqa1pBa1J5Q1p1ZWc0V1NOYnhWN3ZxM3hIVT1ceGFuZHlhbmR6"
    );
}

#[test]
fn it_keeps_the_separator_without_ext() {
    let token = get_bewit_with_clock(
        "https://example.com/somewhere/over/the/rainbow",
        Some(&pinned(None)),
        &FixedClock(PINNED_MSEC),
    );
    assert_eq!(
        token,
        "MTIzNDU2XDEzNTY0MjA3MDdcSUdZbUxnSXFMckNlOEN4dktQczRKbFdJQStValdKSm91d2dBUmlWaENBZz1c"
    );
}

#[test]
fn it_accepts_a_parsed_uri() -> TestResult {
    let uri = Url::parse("https://example.com/somewhere/over/the/rainbow")?;
    let token = get_bewit_with_clock(&uri, Some(&pinned(Some("xandyandz"))), &FixedClock(PINNED_MSEC));

    let bewit = Bewit::decode(&token)?;
    assert_eq!(bewit.mac, "kscxwNR2tJpP1T1zDLNPbB5UiKIU9tOSJXTUdG7X9h8=");
    Ok(())
}

#[test_log::test]
fn it_returns_an_empty_string_for_unusable_input() {
    let clock = FixedClock(PINNED_MSEC);
    let uri = "https://example.com/somewhere/over/the/rainbow";

    assert_eq!(get_bewit_with_clock(uri, None::<&BewitOptions>, &clock), "");
    assert_eq!(get_bewit_with_clock("", Some(&pinned(None)), &clock), "");
    assert_eq!(get_bewit_with_clock("not a uri", Some(&pinned(None)), &clock), "");
    assert_eq!(get_bewit_with_clock(String::new(), Some(&pinned(None)), &clock), "");

    let no_credentials = BewitOptions::<()> {
        ttl_sec: Some(3000),
        ext: Some("xandyandz".into()),
        ..Default::default()
    };
    assert_eq!(get_bewit_with_clock(uri, Some(&no_credentials), &clock), "");

    let mut no_id = pinned(None);
    if let Some(record) = no_id.credentials.as_mut() {
        record.id = None;
    }
    assert_eq!(get_bewit_with_clock(uri, Some(&no_id), &clock), "");

    let mut no_key = pinned(None);
    if let Some(record) = no_key.credentials.as_mut() {
        record.key = None;
    }
    assert_eq!(get_bewit_with_clock(uri, Some(&no_key), &clock), "");

    let mut bad_algorithm = pinned(None);
    if let Some(record) = bad_algorithm.credentials.as_mut() {
        record.algorithm = Some("hmac-sha-0".into());
    }
    assert_eq!(get_bewit_with_clock(uri, Some(&bad_algorithm), &clock), "");

    let mut no_ttl = pinned(None);
    no_ttl.ttl_sec = None;
    assert_eq!(get_bewit_with_clock(uri, Some(&no_ttl), &clock), "");
}

#[test]
fn it_soft_fails_options_loaded_from_json() -> TestResult {
    let clock = FixedClock(PINNED_MSEC);
    let uri = "https://example.com/somewhere/over/the/rainbow";

    let options: BewitOptions = serde_json::from_str(r#"{ "ttl_sec": 3000 }"#)?;
    assert_eq!(get_bewit_with_clock(uri, Some(&options), &clock), "");

    let options: BewitOptions =
        serde_json::from_str(r#"{ "credentials": { "key": "2983d45yun89q", "algorithm": "sha256" }, "ttl_sec": 3000 }"#)?;
    assert_eq!(get_bewit_with_clock(uri, Some(&options), &clock), "");
    Ok(())
}
