use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum distance between the signed timestamp and the verifier's clock.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Checks a `stripe-signature` header (`t=<unix>,v1=<hex>[,v1=<hex>...]`)
/// against the raw payload. See https://stripe.com/docs/webhooks/signatures
///
/// Never fails loudly: anything malformed is simply `false`.
pub fn verify_stripe_signature(payload: &[u8], header: &str, secret: &str, now: i64) -> bool {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        let part = part.trim();
        if let Some(rest) = part.strip_prefix("t=") {
            timestamp = Some(rest);
        } else if let Some(rest) = part.strip_prefix("v1=") {
            signatures.push(rest);
        }
    }

    let Some(timestamp) = timestamp else {
        return false;
    };
    let Ok(signed_at) = timestamp.parse::<i64>() else {
        return false;
    };
    if now.abs_diff(signed_at) > SIGNATURE_TOLERANCE_SECS.unsigned_abs() {
        return false;
    }

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    signatures.into_iter().any(|signature| match hex::decode(signature) {
        // verify_slice compares in constant time
        Ok(provided) => mac.clone().verify_slice(&provided).is_ok(),
        Err(_) => false,
    })
}

/// Builds a header value the way Stripe would for `payload` signed at `timestamp`.
pub fn sign_stripe_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return format!("t={}", timestamp),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let signature = hex::encode(mac.finalize().into_bytes());

    format!("t={},v1={}", timestamp, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"customer.subscription.deleted","data":{"object":{"customer":"cus_123"}}}"#;
    const NOW: i64 = 1_760_000_000;

    #[test]
    fn accepts_signature_within_window() {
        let header = sign_stripe_payload(PAYLOAD, SECRET, NOW - 120);

        assert!(verify_stripe_signature(PAYLOAD, &header, SECRET, NOW));
        assert!(verify_stripe_signature(
            PAYLOAD,
            &header,
            SECRET,
            NOW - 120 + SIGNATURE_TOLERANCE_SECS
        ));
    }

    #[test]
    fn any_single_character_change_in_signature_fails() {
        let header = sign_stripe_payload(PAYLOAD, SECRET, NOW);
        let (prefix, signature) = header.split_once("v1=").unwrap();

        for idx in 0..signature.len() {
            let mut mutated: Vec<char> = signature.chars().collect();
            mutated[idx] = if mutated[idx] == '0' { '1' } else { '0' };
            let mutated: String = mutated.into_iter().collect();
            let header = format!("{}v1={}", prefix, mutated);

            assert!(
                !verify_stripe_signature(PAYLOAD, &header, SECRET, NOW),
                "mutation at {idx} was accepted"
            );
        }
    }

    #[test]
    fn rejects_stale_and_future_timestamps() {
        let stale = sign_stripe_payload(PAYLOAD, SECRET, NOW - SIGNATURE_TOLERANCE_SECS - 1);
        let future = sign_stripe_payload(PAYLOAD, SECRET, NOW + SIGNATURE_TOLERANCE_SECS + 1);

        assert!(!verify_stripe_signature(PAYLOAD, &stale, SECRET, NOW));
        assert!(!verify_stripe_signature(PAYLOAD, &future, SECRET, NOW));
    }

    #[test]
    fn accepts_when_any_of_several_signatures_matches() {
        let valid = sign_stripe_payload(PAYLOAD, SECRET, NOW);
        let signature = valid.split_once("v1=").unwrap().1;
        let header = format!("t={},v1={},v1={}", NOW, "ab".repeat(32), signature);

        assert!(verify_stripe_signature(PAYLOAD, &header, SECRET, NOW));
    }

    #[test]
    fn rejects_wrong_secret_tampered_body_and_garbage() {
        let header = sign_stripe_payload(PAYLOAD, SECRET, NOW);

        assert!(!verify_stripe_signature(PAYLOAD, &header, "whsec_other", NOW));
        assert!(!verify_stripe_signature(b"{}", &header, SECRET, NOW));
        assert!(!verify_stripe_signature(PAYLOAD, "", SECRET, NOW));
        assert!(!verify_stripe_signature(PAYLOAD, "t=abc,v1=zz", SECRET, NOW));
        assert!(!verify_stripe_signature(PAYLOAD, &format!("t={}", NOW), SECRET, NOW));
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_overflow() {
        for timestamp in [i64::MIN, i64::MAX] {
            let header = sign_stripe_payload(PAYLOAD, SECRET, timestamp);

            assert!(!verify_stripe_signature(PAYLOAD, &header, SECRET, NOW));
            assert!(!verify_stripe_signature(PAYLOAD, &header, SECRET, -NOW));
        }

        let header = sign_stripe_payload(PAYLOAD, SECRET, i64::MIN);
        assert!(verify_stripe_signature(PAYLOAD, &header, SECRET, i64::MIN + 10));
    }
}
