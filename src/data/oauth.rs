//! OAuth 1.0 request signing
//!
//! The places API accepts two-legged OAuth 1.0 requests signed with
//! HMAC-SHA1 using only the consumer key and secret (no access token).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;
use uuid::Uuid;

/// Characters left unescaped by RFC 5849 section 3.6
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Consumer credentials used to sign requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

/// Percent-encodes a value the way OAuth 1.0 requires
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

fn oauth_params(key: &str, nonce: &str, timestamp: i64) -> Vec<(&'static str, String)> {
    vec![
        ("oauth_consumer_key", key.to_string()),
        ("oauth_nonce", nonce.to_string()),
        ("oauth_signature_method", "HMAC-SHA1".to_string()),
        ("oauth_timestamp", timestamp.to_string()),
        ("oauth_version", "1.0".to_string()),
    ]
}

/// Builds the signature base string from the request parameters
///
/// `params` holds both the query parameters and the `oauth_*` parameters;
/// they are encoded, sorted and joined as RFC 5849 section 3.4.1 describes.
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&normalized)
    )
}

/// Signs a base string with the consumer secret and an empty token secret
pub fn sign(base_string: &str, consumer_secret: &str) -> String {
    let key = format!("{}&", encode(consumer_secret));
    let mut mac =
        Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(base_string.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Builds the `Authorization` header value for a request
///
/// Deterministic for a given nonce and timestamp; see [`authorization_header`]
/// for the variant that generates both.
pub fn authorization_header_with(
    method: &str,
    url: &str,
    query: &[(&str, String)],
    credentials: &Credentials,
    nonce: &str,
    timestamp: i64,
) -> String {
    let mut oauth = oauth_params(&credentials.consumer_key, nonce, timestamp);

    let mut all_params = query.to_vec();
    all_params.extend(oauth.iter().cloned());
    let base = signature_base_string(method, url, &all_params);
    oauth.push(("oauth_signature", sign(&base, &credentials.consumer_secret)));

    let fields = oauth
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {}", fields)
}

/// Builds the `Authorization` header value with a fresh nonce and timestamp
pub fn authorization_header(
    method: &str,
    url: &str,
    query: &[(&str, String)],
    credentials: &Credentials,
) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    authorization_header_with(
        method,
        url,
        query,
        credentials,
        &nonce,
        Utc::now().timestamp(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            consumer_key: "key123".to_string(),
            consumer_secret: "s3cr3t".to_string(),
        }
    }

    #[test]
    fn test_encode_reserved_characters() {
        assert_eq!(encode("abc-._~XYZ019"), "abc-._~XYZ019");
        assert_eq!(encode("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(encode("49931/+"), "49931%2F%2B");
        assert_eq!(encode("é"), "%C3%A9");
    }

    #[test]
    fn test_signature_base_string_sorts_parameters() {
        let params = [
            ("origin", "49931".to_string()),
            ("key", "abc".to_string()),
            ("radius", "10".to_string()),
        ];

        let base = signature_base_string("get", "https://example.com/search/v2/radius", &params);

        assert_eq!(
            base,
            "GET&https%3A%2F%2Fexample.com%2Fsearch%2Fv2%2Fradius&key%3Dabc%26origin%3D49931%26radius%3D10"
        );
    }

    #[test]
    fn test_sign_is_deterministic_base64() {
        let first = sign("GET&url&params", "secret");
        let second = sign("GET&url&params", "secret");
        let other = sign("GET&url&params", "other");

        assert_eq!(first, second);
        assert_ne!(first, other);
        // SHA-1 digests are 20 bytes, which base64-encode to 28 characters
        assert_eq!(first.len(), 28);
        assert!(first.ends_with('='));
    }

    #[test]
    fn test_header_contains_oauth_fields() {
        let query = [("origin", "49931".to_string())];
        let header = authorization_header_with(
            "GET",
            "https://example.com/radius",
            &query,
            &credentials(),
            "abcdef",
            1_700_000_000,
        );

        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_consumer_key=\"key123\""));
        assert!(header.contains("oauth_nonce=\"abcdef\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_timestamp=\"1700000000\""));
        assert!(header.contains("oauth_version=\"1.0\""));
        assert!(header.contains("oauth_signature=\""));
    }

    #[test]
    fn test_header_signature_covers_query() {
        let header = |origin: &str| {
            authorization_header_with(
                "GET",
                "https://example.com/radius",
                &[("origin", origin.to_string())],
                &credentials(),
                "n",
                1,
            )
        };

        assert_eq!(header("49931"), header("49931"));
        assert_ne!(header("49931"), header("82190"));
    }

    #[test]
    fn test_fresh_headers_use_new_nonces() {
        let a = authorization_header("GET", "https://example.com", &[], &credentials());
        let b = authorization_header("GET", "https://example.com", &[], &credentials());
        assert_ne!(a, b);
    }
}
