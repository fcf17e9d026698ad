use std::sync::Arc;

use bytes::Bytes;
use signed_webhook::signing::{
    Body, KeyResolver, SignatureHeaders, SignedRequest, Signer, StaticKeyRegistry, Verifier,
};
use signed_webhook::SignatureError;

const API_KEY: &str = "Lp0g+cwb19eEfTn1YIOydEnqPcZOg8YxHctnMe+1cQA=";
const API_SECRET: &str = "uC8fVXzXMyaw1PseV452i6ozQwIIa4olcSpjuvn5E4E=";

const TIMESTAMP: &str = "1610000000";
const ENDPOINT: &str = "authorizations";
const APPROVED: &[u8] = br#"{"status":"APPROVED"}"#;

const APPROVED_SIGNATURE: &str = "BPk1++BdHy8oCI3ZMz1S6K62vRsecxlK8rGfzozW1lE=";
const NO_BODY_SIGNATURE: &str = "FCyvL5h2c4wnf/mFePqCzkdcwwn2/mV0kQ21Kc4DF9w=";
const EMPTY_OBJECT_SIGNATURE: &str = "SGfajLKTBKzIqN5mzXyuJzm2F0eAU6KLqS5fTSrVZo4=";

fn keys() -> Arc<dyn KeyResolver> {
    Arc::new(
        StaticKeyRegistry::from_encoded([(API_KEY.to_string(), API_SECRET.to_string())]).unwrap(),
    )
}

fn sign(body: Body, endpoint: &str, timestamp: &str) -> SignatureHeaders {
    Signer::new(keys())
        .sign_at(&body, endpoint, API_KEY, timestamp)
        .unwrap()
}

fn as_received(signed: &SignatureHeaders, body: &[u8]) -> SignedRequest {
    SignedRequest {
        endpoint: signed.endpoint.clone(),
        timestamp: Bytes::from(signed.timestamp.clone()),
        api_key_id: API_KEY.to_string(),
        signature: signed.signature.to_string(),
        body: Bytes::copy_from_slice(body),
    }
}

// ── Known vectors ────────────────────────────────────────────────────

#[test]
fn verifier_accepts_known_vector() {
    let request = SignedRequest {
        endpoint: Bytes::from(ENDPOINT),
        timestamp: Bytes::from(TIMESTAMP),
        api_key_id: API_KEY.to_string(),
        signature: format!("hmac-sha256 {APPROVED_SIGNATURE}"),
        body: Bytes::from_static(APPROVED),
    };
    assert!(Verifier::new(keys()).verify(&request));
}

#[test]
fn signer_reproduces_known_vectors() {
    let with_body = sign(Body::from(APPROVED.to_vec()), ENDPOINT, TIMESTAMP);
    assert_eq!(with_body.signature.value(), APPROVED_SIGNATURE);

    let without_body = sign(Body::Absent, ENDPOINT, TIMESTAMP);
    assert_eq!(without_body.signature.value(), NO_BODY_SIGNATURE);
}

#[test]
fn no_body_vector_differs_from_body_and_placeholder() {
    let without_body = sign(Body::Absent, ENDPOINT, TIMESTAMP);
    let empty_object = sign(Body::from(b"{}".to_vec()), ENDPOINT, TIMESTAMP);

    assert_eq!(empty_object.signature.value(), EMPTY_OBJECT_SIGNATURE);
    assert_ne!(without_body.signature.value(), APPROVED_SIGNATURE);
    assert_ne!(without_body.signature, empty_object.signature);
}

// ── Round trip ───────────────────────────────────────────────────────

#[test]
fn verifies_what_was_signed() {
    let verifier = Verifier::new(keys());
    let cases: &[(&str, &str, &[u8])] = &[
        (TIMESTAMP, ENDPOINT, APPROVED),
        ("0", "adjustments", b"[1,2,3]"),
        ("", "", b""),
        ("1710000000", "authorizations", "{\"merchant\":\"caf\u{e9}\"}".as_bytes()),
        ("1710000000", "authorizations", &[0, 255, 10, 13]),
    ];

    for (timestamp, endpoint, body) in cases {
        let signed = sign(Body::from(body.to_vec()), endpoint, timestamp);
        assert!(
            verifier.verify(&as_received(&signed, body)),
            "round trip failed for {endpoint:?} at {timestamp:?}"
        );
    }
}

#[test]
fn opaque_header_bytes_round_trip() {
    let endpoint: &[u8] = b"caf\xe9";
    let signed = Signer::new(keys())
        .sign_at(&Body::Absent, endpoint, API_KEY, TIMESTAMP)
        .unwrap();
    assert_eq!(signed.endpoint, endpoint);
    assert!(Verifier::new(keys()).verify(&as_received(&signed, b"")));
}

// ── Tamper sensitivity ───────────────────────────────────────────────

#[test]
fn any_flipped_byte_is_detected() {
    let verifier = Verifier::new(keys());
    let signed = sign(Body::from(APPROVED.to_vec()), ENDPOINT, TIMESTAMP);
    let original = as_received(&signed, APPROVED);
    assert!(verifier.verify(&original));

    for i in 0..APPROVED.len() {
        let mut body = APPROVED.to_vec();
        body[i] ^= 0x01;
        let tampered = SignedRequest {
            body: Bytes::from(body),
            ..original.clone()
        };
        assert!(!verifier.verify(&tampered), "body byte {i} flip went unnoticed");
    }

    for i in 0..ENDPOINT.len() {
        let mut endpoint = ENDPOINT.as_bytes().to_vec();
        endpoint[i] ^= 0x01;
        let tampered = SignedRequest {
            endpoint: Bytes::from(endpoint),
            ..original.clone()
        };
        assert!(!verifier.verify(&tampered), "endpoint byte {i} flip went unnoticed");
    }

    for i in 0..TIMESTAMP.len() {
        let mut timestamp = TIMESTAMP.as_bytes().to_vec();
        timestamp[i] ^= 0x01;
        let tampered = SignedRequest {
            timestamp: Bytes::from(timestamp),
            ..original.clone()
        };
        assert!(!verifier.verify(&tampered), "timestamp byte {i} flip went unnoticed");
    }
}

#[test]
fn flipped_signature_byte_is_detected() {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let verifier = Verifier::new(keys());
    let tag = STANDARD.decode(APPROVED_SIGNATURE).unwrap();

    for i in 0..tag.len() {
        let mut flipped = tag.clone();
        flipped[i] ^= 0x80;
        let request = SignedRequest {
            endpoint: Bytes::from(ENDPOINT),
            timestamp: Bytes::from(TIMESTAMP),
            api_key_id: API_KEY.to_string(),
            signature: format!("hmac-sha256 {}", STANDARD.encode(&flipped)),
            body: Bytes::from_static(APPROVED),
        };
        assert!(matches!(
            verifier.check(&request),
            Err(SignatureError::Mismatch { .. })
        ));
    }
}

#[test]
fn field_boundaries_are_not_part_of_the_mac() {
    // Fields are concatenated without delimiters: shifting a byte from the
    // endpoint into the body leaves the canonical bytes unchanged.
    let verifier = Verifier::new(keys());
    let signed = sign(Body::from(APPROVED.to_vec()), ENDPOINT, TIMESTAMP);
    let shifted = SignedRequest {
        endpoint: Bytes::from("authorization"),
        body: Bytes::from(format!("s{}", std::str::from_utf8(APPROVED).unwrap())),
        ..as_received(&signed, APPROVED)
    };
    assert!(verifier.verify(&shifted));
}

// ── Absent vs placeholder bodies ─────────────────────────────────────

#[test]
fn absent_body_never_collides_with_placeholders() {
    let absent = sign(Body::Absent, "adjustments", TIMESTAMP);
    for placeholder in [&b"{}"[..], b"null", b" ", b"\"\"", b"None"] {
        let signed = sign(Body::from(placeholder.to_vec()), "adjustments", TIMESTAMP);
        assert_ne!(
            absent.signature,
            signed.signature,
            "absent body collided with {:?}",
            String::from_utf8_lossy(placeholder)
        );
    }
}

#[test]
fn absent_body_verifies_against_empty_wire_body() {
    let signed = sign(Body::Absent, "adjustments", TIMESTAMP);
    assert!(Verifier::new(keys()).verify(&as_received(&signed, b"")));
    assert!(!Verifier::new(keys()).verify(&as_received(&signed, b"{}")));
}

// ── Rejections ───────────────────────────────────────────────────────

#[test]
fn unknown_key_is_rejected_without_panic() {
    let request = SignedRequest {
        api_key_id: "dW5rbm93bg==".to_string(),
        ..as_received(&sign(Body::Absent, ENDPOINT, TIMESTAMP), b"")
    };
    let verifier = Verifier::new(keys());
    assert!(!verifier.verify(&request));
    assert!(matches!(
        verifier.check(&request),
        Err(SignatureError::KeyNotFound(_))
    ));
}

#[test]
fn empty_registry_rejects_everything() {
    let verifier = Verifier::new(Arc::new(StaticKeyRegistry::default()));
    let request = as_received(&sign(Body::Absent, ENDPOINT, TIMESTAMP), b"");
    assert!(!verifier.verify(&request));
}

#[test]
fn other_algorithms_are_gated() {
    let verifier = Verifier::new(keys());
    for tag in ["hmac-sha1", "hmac-sha512", "HMAC-SHA256", "ed25519", ""] {
        let request = SignedRequest {
            endpoint: Bytes::from(ENDPOINT),
            timestamp: Bytes::from(TIMESTAMP),
            api_key_id: API_KEY.to_string(),
            signature: format!("{tag} {APPROVED_SIGNATURE}"),
            body: Bytes::from_static(APPROVED),
        };
        assert!(matches!(
            verifier.check(&request),
            Err(SignatureError::UnsupportedAlgorithm(_))
        ));
    }
}

#[test]
fn malformed_base64_is_rejected() {
    let verifier = Verifier::new(keys());
    for value in ["%%%", "BPk1++BdHy8oCI3ZMz1S6K62vRsecxlK8rGfzozW1lE", "Zm9v!"] {
        let request = SignedRequest {
            endpoint: Bytes::from(ENDPOINT),
            timestamp: Bytes::from(TIMESTAMP),
            api_key_id: API_KEY.to_string(),
            signature: format!("hmac-sha256 {value}"),
            body: Bytes::from_static(APPROVED),
        };
        assert!(matches!(
            verifier.check(&request),
            Err(SignatureError::MalformedSignature(_))
        ));
    }
}
