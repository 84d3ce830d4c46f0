use anyhow::Result;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Checks `X-Hub-Signature-256: sha256=<hex>` against the raw request body.
/// The comparison runs in constant time.
pub fn verify_signature(app_secret: &str, payload: &[u8], signature_header: &str) -> Result<()> {
    let signature = signature_header
        .trim()
        .strip_prefix("sha256=")
        .ok_or_else(|| anyhow::anyhow!("missing sha256= prefix in signature header"))?;
    let provided = hex::decode(signature)?;

    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())?;
    mac.update(payload);
    mac.verify_slice(&provided)
        .map_err(|_| anyhow::anyhow!("invalid webhook signature"))
}

pub fn sign(app_secret: &str, payload: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())?;
    mac.update(payload);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_signature() {
        let body = br#"{"object":"whatsapp_business_account","entry":[]}"#;
        let header = sign("secret", body).unwrap();
        assert!(verify_signature("secret", body, &header).is_ok());
    }

    #[test]
    fn rejects_tampered_body_and_wrong_secret() {
        let header = sign("secret", b"original").unwrap();
        assert!(verify_signature("secret", b"tampered", &header).is_err());
        assert!(verify_signature("other", b"original", &header).is_err());
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(verify_signature("secret", b"x", "").is_err());
        assert!(verify_signature("secret", b"x", "sha1=abcd").is_err());
        assert!(verify_signature("secret", b"x", "sha256=not-hex").is_err());
    }

    #[test]
    fn known_vector() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let header = sign("key", b"The quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(
            header,
            "sha256=f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }
}
