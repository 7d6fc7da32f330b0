//! Signed session cookie codec
//!
//! The cookie value is `<id>.<base64url(HMAC-SHA256(secret, id))>`. Anyone
//! can read the identifier; nobody without the secret can mint one that
//! verifies.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Find a cookie value by name in a `Cookie` request header.
pub fn find<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key.trim() == name {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

/// Produce the signed cookie value for a session identifier.
pub fn sign(id: &str, secret: &[u8]) -> String {
    let tag = mac(secret, id).finalize().into_bytes();
    format!("{id}.{}", URL_SAFE_NO_PAD.encode(tag))
}

/// Verify a signed cookie value, returning the embedded identifier.
///
/// Malformed or tampered values yield `None`; the caller treats that the
/// same as no cookie at all.
pub fn verify(value: &str, secret: &[u8]) -> Option<String> {
    let (id, tag_b64) = value.rsplit_once('.')?;
    let tag = URL_SAFE_NO_PAD.decode(tag_b64).ok()?;
    mac(secret, id).verify_slice(&tag).ok()?;
    Some(id.to_string())
}

/// Build the `Set-Cookie` header value establishing a session.
pub fn set_cookie(name: &str, id: &str, secret: &[u8], max_age_secs: u64) -> String {
    format!(
        "{name}={}; Max-Age={max_age_secs}; Path=/; HttpOnly",
        sign(id, secret)
    )
}

fn mac(secret: &[u8], id: &str) -> HmacSha256 {
    // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC key of any length");
    mac.update(id.as_bytes());
    mac
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"keyboard cat";

    #[test]
    fn test_sign_verify_roundtrip() {
        let signed = sign("abc-123", SECRET);
        assert_eq!(verify(&signed, SECRET), Some("abc-123".to_string()));
    }

    #[test]
    fn test_verify_rejects_tampered_id() {
        let signed = sign("abc-123", SECRET);
        let forged = signed.replacen("abc", "xyz", 1);
        assert_eq!(verify(&forged, SECRET), None);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let signed = sign("abc-123", SECRET);
        assert_eq!(verify(&signed, b"other secret"), None);
    }

    #[test]
    fn test_verify_rejects_malformed_values() {
        assert_eq!(verify("no-dot-here", SECRET), None);
        assert_eq!(verify("id.not!base64!", SECRET), None);
        assert_eq!(verify("", SECRET), None);
    }

    #[test]
    fn test_find_in_multi_cookie_header() {
        let header = "theme=dark; sid=\"abc.def\" ; lang=en";
        assert_eq!(find(header, "sid"), Some("abc.def"));
        assert_eq!(find(header, "theme"), Some("dark"));
        assert_eq!(find(header, "missing"), None);
    }

    #[test]
    fn test_set_cookie_shape() {
        let header = set_cookie("sid", "abc", SECRET, 1_209_600);
        assert!(header.starts_with("sid=abc."));
        assert!(header.contains("Max-Age=1209600"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Path=/"));
    }
}
