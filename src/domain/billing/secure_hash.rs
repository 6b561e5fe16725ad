//! Gateway secure hash computation and verification.
//!
//! The gateway signs a flat bag of string fields with HMAC-SHA256 keyed by
//! the merchant's integrity salt. Both sides build the same canonical string
//! independently, so the rules below are part of the wire contract:
//!
//! 1. The `pp_SecureHash` field itself is never part of the input.
//! 2. Remaining fields are taken in byte-lexicographic key order.
//! 3. Fields whose value is empty after trimming are skipped.
//! 4. The string starts with the raw salt; each surviving field appends
//!    `&` followed by its trimmed value. Keys are never included.
//! 5. The digest is rendered as uppercase hex.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::gateway::{GatewayFields, SECURE_HASH};

/// Builds the string that gets signed for a field set.
pub fn canonical_string(fields: &GatewayFields, integrity_salt: &str) -> String {
    let mut canonical = String::from(integrity_salt);
    for (key, value) in fields {
        if key == SECURE_HASH {
            continue;
        }
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        canonical.push('&');
        canonical.push_str(value);
    }
    canonical
}

/// Computes the uppercase hex secure hash for a field set.
pub fn sign(fields: &GatewayFields, integrity_salt: &str) -> String {
    let canonical = canonical_string(fields, integrity_salt);
    let mut mac = Hmac::<Sha256>::new_from_slice(integrity_salt.as_bytes())
        .expect("HMAC accepts any key");
    mac.update(canonical.as_bytes());
    hex::encode_upper(mac.finalize().into_bytes())
}

/// Recomputes the hash over `fields` and checks it against their own
/// `pp_SecureHash` value.
///
/// A missing or empty hash never verifies.
pub fn verify(fields: &GatewayFields, integrity_salt: &str) -> bool {
    let Some(received) = fields.get(SECURE_HASH).map(|h| h.trim()) else {
        return false;
    };
    if received.is_empty() {
        return false;
    }
    let expected = sign(fields, integrity_salt);
    constant_time_compare(expected.as_bytes(), received.to_ascii_uppercase().as_bytes())
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
