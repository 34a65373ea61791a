//! Request signing for the Shopee open platform.
//!
//! Every API call carries an HMAC-SHA256 signature over a plain concatenation of
//! request parts. The platform is byte-exact about this: no separators, no
//! normalization, parts in the documented order. Numeric values (timestamps, ids)
//! must be stringified exactly as they appear in the query string.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Concatenate `parts` in caller order and return the lowercase hex HMAC-SHA256
/// digest keyed by `partner_key`.
pub fn sign(partner_key: &str, parts: &[&str]) -> AppResult<String> {
    if partner_key.is_empty() {
        return Err(AppError::SignatureInput(
            "partner key must not be empty".to_string(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(partner_key.as_bytes())
        .map_err(|e| AppError::SignatureInput(format!("invalid HMAC key: {e}")))?;
    for part in parts {
        mac.update(part.as_bytes());
    }
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Signature for endpoints that do not carry a shop token (auth/token paths).
/// Parts: partner_id, path, timestamp.
pub fn sign_public(partner_key: &str, partner_id: &str, path: &str, timestamp: i64) -> AppResult<String> {
    let ts = timestamp.to_string();
    sign(partner_key, &[partner_id, path, &ts])
}

/// Signature for shop-authenticated endpoints.
/// Parts: partner_id, path, timestamp, access_token, shop_id.
pub fn sign_shop(
    partner_key: &str,
    partner_id: &str,
    path: &str,
    timestamp: i64,
    access_token: &str,
    shop_id: &str,
) -> AppResult<String> {
    let ts = timestamp.to_string();
    sign(partner_key, &[partner_id, path, &ts, access_token, shop_id])
}

/// Verify a webhook push signature: HMAC over `url|body` with the partner key.
/// Comparison happens on hex digests, which are fixed-length for SHA-256.
pub fn verify_push_signature(
    partner_key: &str,
    url: &str,
    body: &str,
    received: &str,
) -> AppResult<bool> {
    let payload = format!("{url}|{body}");
    let expected = sign(partner_key, &[&payload])?;
    Ok(expected.eq_ignore_ascii_case(received))
}
