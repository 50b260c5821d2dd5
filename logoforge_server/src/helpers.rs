use std::{net::IpAddr, str::FromStr};

use actix_web::HttpRequest;
use hmac::{Hmac, Mac};
use log::{debug, trace};
use regex::Regex;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes the base64-encoded HMAC-SHA256 of `body` under `secret`. This is the digest Shopify places in the
/// `X-Shopify-Hmac-Sha256` header of every webhook delivery.
pub fn calculate_hmac(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(body);
    base64::encode(mac.finalize().into_bytes())
}

/// Verifies a webhook digest against the raw body bytes as they arrived on the wire. The digest must be compared
/// against the exact received bytes; hashing a re-serialized copy of the parsed body produces false negatives.
///
/// Returns `false` for a missing, empty or undecodable digest. Rejection is a normal outcome here, not an error.
/// The underlying comparison runs in constant time.
pub fn verify_webhook_hmac(secret: &str, raw_body: &[u8], supplied_b64: &str) -> bool {
    if supplied_b64.is_empty() {
        return false;
    }
    let supplied = match base64::decode(supplied_b64) {
        Ok(bytes) => bytes,
        Err(_) => {
            trace!("🔐️ Supplied webhook digest is not valid base64");
            return false;
        },
    };
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(raw_body);
    mac.verify_slice(&supplied).is_ok()
}

/// Minimal HTML escaping for values interpolated into the served pages. Covers text and attribute positions.
pub fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Get the remote IP address from the request. It uses 3 sources to determine the IP address, in decreasing order
/// of preference:
/// 1. The `X-Forwarded-For` header, iif `use_x_forwarded_for` is set to true in the configuration.
/// 2. The `Forwarded` header, iif `use_forwarded` is set to true in the configuration.
/// 3. The peer address from the connection info.
pub fn get_remote_ip(req: &HttpRequest, use_x_forwarded_for: bool, use_forwarded: bool) -> Option<IpAddr> {
    let mut result = None;
    if use_x_forwarded_for {
        trace!("Checking X-Forwarded-For header");
        result =
            req.headers().get("X-Forwarded-For").and_then(|v| v.to_str().ok()).and_then(|s| IpAddr::from_str(s).ok());
        if let Some(ip) = result {
            debug!("Using X-Forwarded-For header for remote address: {ip}");
        }
    }
    if use_forwarded && result.is_none() {
        trace!("Checking Forwarded header");
        let re = Regex::new(r#"for=(?P<ip>[^;]+)"#).unwrap();
        result = req
            .headers()
            .get("Forwarded")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| re.captures(v))
            .and_then(|caps| caps.name("ip"))
            .map(|m| m.as_str())
            .and_then(|s| IpAddr::from_str(s).ok());
        if let Some(ip) = result {
            debug!("Using Forwarded header for remote address: {ip}");
        }
    }
    result.or_else(|| {
        let peer_addr = req.connection_info().peer_addr().map(|a| a.to_string());
        trace!("Using Peer address for remote address: {:?}", peer_addr);
        peer_addr.and_then(|s| IpAddr::from_str(&s).ok())
    })
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "hush";

    #[test]
    fn a_correctly_signed_body_verifies() {
        let body = br#"{"shop_domain":"acme.myshopify.com"}"#;
        let digest = calculate_hmac(SECRET, body);
        assert!(verify_webhook_hmac(SECRET, body, &digest));
    }

    #[test]
    fn any_mutation_of_the_digest_fails_verification() {
        let body = br#"{"shop_domain":"acme.myshopify.com"}"#;
        let digest = calculate_hmac(SECRET, body);
        // flip each character in turn; no altered digest may verify
        for i in 0..digest.len() {
            let mut altered: Vec<char> = digest.chars().collect();
            altered[i] = if altered[i] == 'A' { 'B' } else { 'A' };
            let altered: String = altered.into_iter().collect();
            assert!(!verify_webhook_hmac(SECRET, body, &altered), "altered digest verified at index {i}");
        }
    }

    #[test]
    fn a_digest_under_the_wrong_secret_fails_verification() {
        let body = br#"{"shop_domain":"acme.myshopify.com"}"#;
        let digest = calculate_hmac("some other secret", body);
        assert!(!verify_webhook_hmac(SECRET, body, &digest));
    }

    #[test]
    fn an_empty_digest_is_rejected_without_panicking() {
        assert!(!verify_webhook_hmac(SECRET, b"{}", ""));
    }

    #[test]
    fn a_non_base64_digest_is_rejected() {
        assert!(!verify_webhook_hmac(SECRET, b"{}", "this is not base64!!"));
    }

    #[test]
    fn html_escaping_neutralizes_markup() {
        assert_eq!(html_escape(r#"<script>alert("1")</script>"#), "&lt;script&gt;alert(&quot;1&quot;)&lt;/script&gt;");
        assert_eq!(html_escape("acme.myshopify.com"), "acme.myshopify.com");
    }

    #[test]
    fn verification_uses_the_raw_bytes_not_a_reserialized_body() {
        // Shopify signs the exact wire bytes. Whitespace differences between the wire form and a pretty-printed
        // re-serialization must change the digest.
        let wire = br#"{"shop_domain": "acme.myshopify.com"}"#;
        let reserialized = br#"{"shop_domain":"acme.myshopify.com"}"#;
        let digest = calculate_hmac(SECRET, wire);
        assert!(verify_webhook_hmac(SECRET, wire, &digest));
        assert!(!verify_webhook_hmac(SECRET, reserialized, &digest));
    }
}
