use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC-SHA256 of the raw webhook body.
pub const SIGNATURE_HEADER: &str = "linear-signature";

/// Checks `signature` against the HMAC of `raw_body` keyed with `secret`.
///
/// Fails closed: a missing secret or a missing header is never valid.
pub fn verify(raw_body: &[u8], signature: Option<&str>, secret: Option<&str>) -> bool {
    let (Some(secret), Some(signature)) = (secret, signature) else {
        return false;
    };
    let Some(expected) = sign(raw_body, secret) else {
        return false;
    };
    digests_match(expected.as_bytes(), signature.trim().as_bytes())
}

/// Hex-encoded HMAC-SHA256 of `raw_body`.
pub fn sign(raw_body: &[u8], secret: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(raw_body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

fn digests_match(expected: &[u8], received: &[u8]) -> bool {
    // Digest length is public.
    if expected.len() != received.len() {
        return false;
    }
    expected.ct_eq(received).into()
}
