//! AWS Signature Version 4 for S3-compatible requests.
//!
//! Only the header-based flavour is implemented: every request carries `x-amz-date` and
//! `x-amz-content-sha256`, and the signed header set is whatever the caller passes in.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// Inputs to one request signature.
pub(crate) struct SigningParams<'a> {
    pub(crate) access_key: &'a str,
    pub(crate) secret_key: &'a str,
    pub(crate) region: &'a str,
    pub(crate) method: &'a str,
    /// Already URI-encoded absolute path.
    pub(crate) canonical_uri: &'a str,
    /// Output of [`canonical_query`].
    pub(crate) canonical_query: &'a str,
    /// Lowercase header names mapped to raw values; all of them are signed.
    pub(crate) headers: &'a BTreeMap<String, String>,
    pub(crate) payload_hash: &'a str,
    pub(crate) timestamp: OffsetDateTime,
}

/// Compute the `Authorization` header value for a request.
pub(crate) fn authorization(params: &SigningParams<'_>) -> String {
    let amz_date = amz_date(params.timestamp);
    let date = &amz_date[..8];
    let scope = format!("{date}/{}/{SERVICE}/aws4_request", params.region);

    let canonical_headers: String = params
        .headers
        .iter()
        .map(|(name, value)| format!("{name}:{}\n", canonical_header_value(value)))
        .collect();
    let signed_headers = params
        .headers
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        params.method,
        params.canonical_uri,
        params.canonical_query,
        canonical_headers,
        signed_headers,
        params.payload_hash
    );
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex_sha256(canonical_request.as_bytes())
    );

    let key = signing_key(params.secret_key, date, params.region);
    let signature = hex::encode(hmac(&key, string_to_sign.as_bytes()));

    format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        params.access_key
    )
}

/// Timestamp in the `YYYYMMDD'T'HHMMSS'Z'` form used by `x-amz-date`.
pub(crate) fn amz_date(timestamp: OffsetDateTime) -> String {
    let utc = timestamp.to_offset(time::UtcOffset::UTC);
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}Z",
        utc.year(),
        u8::from(utc.month()),
        utc.day(),
        utc.hour(),
        utc.minute(),
        utc.second()
    )
}

/// Sorted, encoded query string; keys without a value render as `key=`.
pub(crate) fn canonical_query(pairs: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = pairs
        .iter()
        .map(|(key, value)| (uri_encode(key, true), uri_encode(value, true)))
        .collect();
    encoded.sort();
    encoded
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Everything but RFC 3986 unreserved characters.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Path segments keep their separators.
const UNRESERVED_AND_SLASH: &AsciiSet = &UNRESERVED.remove(b'/');

/// Percent-encode everything except RFC 3986 unreserved characters (and `/` when allowed).
pub(crate) fn uri_encode(input: &str, encode_slash: bool) -> String {
    let set = if encode_slash {
        UNRESERVED
    } else {
        UNRESERVED_AND_SLASH
    };
    utf8_percent_encode(input, set).to_string()
}

/// Lowercase hex SHA-256 digest.
pub(crate) fn hex_sha256(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn canonical_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn signing_key(secret_key: &str, date: &str, region: &str) -> Vec<u8> {
    let date_key = hmac(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let region_key = hmac(&date_key, region.as_bytes());
    let service_key = hmac(&region_key, SERVICE.as_bytes());
    hmac(&service_key, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
