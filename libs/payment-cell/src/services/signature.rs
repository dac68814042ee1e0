use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 over `order_id + "|" + payment_id`, the exact
/// string the gateway signs in its checkout callback.
pub fn compute_signature(order_id: &str, payment_id: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    mac.finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Checks a client-supplied signature against the recomputed one. The
/// comparison goes through `Mac::verify_slice`, which is constant-time, so
/// a forger learns nothing from response timing. Undecodable hex counts as
/// a mismatch.
pub fn verify_signature(order_id: &str, payment_id: &str, supplied: &str, secret: &str) -> bool {
    let Some(supplied_bytes) = decode_hex(supplied) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    mac.verify_slice(&supplied_bytes).is_ok()
}

fn decode_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }

    (0..input.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(input.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "rzp_test_secret";

    #[test]
    fn valid_signature_verifies() {
        let sig = compute_signature("order_123", "pay_456", SECRET);
        assert!(verify_signature("order_123", "pay_456", &sig, SECRET));
    }

    #[test]
    fn tampered_signature_fails() {
        let mut sig = compute_signature("order_123", "pay_456", SECRET);
        // Flip the last nibble.
        let last = sig.pop().unwrap();
        sig.push(if last == '0' { '1' } else { '0' });
        assert!(!verify_signature("order_123", "pay_456", &sig, SECRET));
    }

    #[test]
    fn signature_bound_to_both_ids() {
        let sig = compute_signature("order_123", "pay_456", SECRET);
        assert!(!verify_signature("order_999", "pay_456", &sig, SECRET));
        assert!(!verify_signature("order_123", "pay_999", &sig, SECRET));
    }

    #[test]
    fn wrong_secret_fails() {
        let sig = compute_signature("order_123", "pay_456", "other-secret");
        assert!(!verify_signature("order_123", "pay_456", &sig, SECRET));
    }

    #[test]
    fn garbage_hex_fails() {
        assert!(!verify_signature("order_123", "pay_456", "zz", SECRET));
        assert!(!verify_signature("order_123", "pay_456", "abc", SECRET));
        assert!(!verify_signature("order_123", "pay_456", "", SECRET));
    }
}
