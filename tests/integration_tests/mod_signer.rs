use crate::support::{PAIR_A, PAIR_B, loaded_signer, tamper_first_char};
use keysigner::{KeyEncoding, KeyError, KeyKind, KeySigner, SignatureAlgorithm, SignerConfig};
use std::io::Cursor;
use std::sync::Arc;

#[test]
fn sign_then_verify_roundtrip() {
    let signer = loaded_signer();
    let sig = signer.sign("hello").unwrap();
    assert!(signer.verify("hello", &sig).unwrap());
}

#[test]
fn signature_is_padded_base64_of_modulus_size() {
    let signer = loaded_signer();
    let sig = signer.sign("hello").unwrap();
    let raw = keysigner::crypto::decode_signature(&sig).unwrap();
    assert_eq!(raw.len(), 128);
    assert!(sig.ends_with('='));
}

#[test]
fn signing_is_deterministic() {
    let signer = loaded_signer();
    assert_eq!(signer.sign("same message").unwrap(), signer.sign("same message").unwrap());
}

#[test]
fn different_message_does_not_verify() {
    let signer = loaded_signer();
    let sig = signer.sign("hello").unwrap();
    assert!(!signer.verify("hello!", &sig).unwrap());
    assert!(!signer.verify("", &sig).unwrap());
}

#[test]
fn tampered_signature_is_false_not_error() {
    let signer = loaded_signer();
    let sig = signer.sign("hello").unwrap();
    let bad = tamper_first_char(&sig);
    assert_ne!(bad, sig);
    assert!(!signer.verify("hello", &bad).unwrap());
}

#[test]
fn malformed_base64_is_encoding_error() {
    let signer = loaded_signer();
    assert!(matches!(signer.verify("hello", "not*base64"), Err(KeyError::Encoding(_))));
}

#[test]
fn wrongly_sized_signature_is_false() {
    let signer = loaded_signer();
    // Valid Base64, but far shorter than the modulus
    assert!(!signer.verify("hello", "AAAA").unwrap());
    assert!(!signer.verify("hello", "").unwrap());
}

#[test]
fn sign_before_load_is_key_not_loaded() {
    let signer = KeySigner::new();
    signer.load_public_key(&PAIR_A.public_der).unwrap();
    assert!(matches!(signer.sign("hello"), Err(KeyError::KeyNotLoaded(KeyKind::Private))));
}

#[test]
fn verify_before_load_is_key_not_loaded() {
    let signer = KeySigner::new();
    signer.load_private_key(&PAIR_A.private_der).unwrap();
    let sig = signer.sign("hello").unwrap();
    assert!(matches!(signer.verify("hello", &sig), Err(KeyError::KeyNotLoaded(KeyKind::Public))));
}

#[test]
fn signatures_depend_on_active_key() {
    let signer = KeySigner::new();
    signer.load_private_key(&PAIR_A.private_der).unwrap();
    let s1 = signer.sign("hello").unwrap();
    signer.load_private_key(&PAIR_B.private_der).unwrap();
    let s2 = signer.sign("hello").unwrap();
    assert_ne!(s1, s2);
}

#[test]
fn unrelated_public_key_rejects() {
    let signer = loaded_signer();
    let sig = signer.sign("hello").unwrap();
    assert!(signer.verify("hello", &sig).unwrap());
    signer.load_public_key(&PAIR_B.public_der).unwrap();
    assert!(!signer.verify("hello", &sig).unwrap());
}

#[test]
fn separate_signer_verifies_with_public_key_only() {
    let sig = loaded_signer().sign("portable").unwrap();
    let verifier = KeySigner::new();
    verifier.load_public_key(&PAIR_A.public_der).unwrap();
    assert!(verifier.verify("portable", &sig).unwrap());
}

#[test]
fn malformed_key_bytes_are_key_format_errors() {
    let signer = KeySigner::new();
    let truncated = &PAIR_A.private_der[..PAIR_A.private_der.len() / 2];
    assert!(matches!(
        signer.load_private_key(truncated),
        Err(KeyError::KeyFormat { kind: KeyKind::Private, .. })
    ));
    assert!(matches!(
        signer.load_public_key(b"\x00\x01\x02 random bytes"),
        Err(KeyError::KeyFormat { kind: KeyKind::Public, .. })
    ));
    // Right bytes, wrong slot
    assert!(matches!(signer.load_private_key(&PAIR_A.public_der), Err(KeyError::KeyFormat { .. })));
    assert!(matches!(signer.load_public_key(&PAIR_A.private_der), Err(KeyError::KeyFormat { .. })));
    assert!(!signer.has_private_key());
    assert!(!signer.has_public_key());
}

#[test]
fn failed_reload_keeps_previous_key() {
    let signer = loaded_signer();
    let before = signer.sign("hello").unwrap();
    assert!(signer.load_private_key(b"garbage").is_err());
    assert!(signer.load_private_key_from_path("/no/such/private.der").is_err());
    assert_eq!(signer.sign("hello").unwrap(), before);
}

#[test]
fn adapters_are_equivalent_to_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let priv_path = dir.path().join("private.der");
    let pub_path = dir.path().join("public.der");
    std::fs::write(&priv_path, &PAIR_A.private_der).unwrap();
    std::fs::write(&pub_path, &PAIR_A.public_der).unwrap();
    let expected = loaded_signer().sign("adapter").unwrap();

    let from_file = KeySigner::new();
    from_file.load_private_key_from_path(&priv_path).unwrap();
    from_file.load_public_key_from_path(&pub_path).unwrap();

    let from_stream = KeySigner::new();
    from_stream.load_private_key_from_reader(Cursor::new(PAIR_A.private_der.clone())).unwrap();
    from_stream.load_public_key_from_reader(std::fs::File::open(&pub_path).unwrap()).unwrap();

    let from_url = KeySigner::new();
    let priv_url = reqwest::Url::from_file_path(&priv_path).unwrap();
    let pub_url = reqwest::Url::from_file_path(&pub_path).unwrap();
    from_url.load_private_key_from_url(priv_url.as_str()).unwrap();
    from_url.load_public_key_from_url(pub_url.as_str()).unwrap();

    for signer in [&from_file, &from_stream, &from_url] {
        assert_eq!(signer.sign("adapter").unwrap(), expected);
        assert!(signer.verify("adapter", &expected).unwrap());
        assert_eq!(signer.public_key_fingerprint(), from_file.public_key_fingerprint());
    }
}

#[test]
fn pem_keys_load_with_pem_or_auto_encoding() {
    for encoding in [KeyEncoding::Pem, KeyEncoding::Auto] {
        let signer = KeySigner::with_options(SignatureAlgorithm::Sha256WithRsa, encoding);
        signer.load_private_key(PAIR_A.private_pem.as_bytes()).unwrap();
        signer.load_public_key(PAIR_A.public_pem.as_bytes()).unwrap();
        let sig = signer.sign("pem").unwrap();
        assert!(signer.verify("pem", &sig).unwrap());
    }
    let auto = KeySigner::with_options(SignatureAlgorithm::Sha256WithRsa, KeyEncoding::Auto);
    auto.load_private_key(&PAIR_A.private_der).unwrap();
    assert!(auto.has_private_key());
}

#[test]
fn der_signer_rejects_pem_bytes() {
    let signer = KeySigner::new();
    assert!(matches!(
        signer.load_public_key(PAIR_A.public_pem.as_bytes()),
        Err(KeyError::KeyFormat { .. })
    ));
}

#[test]
fn fingerprint_is_hex_sha256_and_tracks_key() {
    let signer = loaded_signer();
    let fp_a = signer.public_key_fingerprint().unwrap();
    assert_eq!(fp_a.len(), 64);
    assert!(fp_a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    signer.load_public_key(&PAIR_B.public_der).unwrap();
    assert_ne!(signer.public_key_fingerprint().unwrap(), fp_a);
}

#[test]
fn clear_drops_both_keys() {
    let signer = loaded_signer();
    signer.clear();
    assert!(matches!(signer.sign("x"), Err(KeyError::KeyNotLoaded(KeyKind::Private))));
    assert!(matches!(signer.verify("x", "AAAA"), Err(KeyError::KeyNotLoaded(KeyKind::Public))));
}

#[test]
fn from_config_loads_named_keys() {
    let dir = tempfile::tempdir().unwrap();
    let priv_path = dir.path().join("private.pem");
    let pub_path = dir.path().join("public.pem");
    std::fs::write(&priv_path, &PAIR_A.private_pem).unwrap();
    std::fs::write(&pub_path, &PAIR_A.public_pem).unwrap();
    let cfg = SignerConfig {
        encoding: Some(KeyEncoding::Auto),
        private_key: Some(priv_path),
        public_key: Some(pub_path),
        ..Default::default()
    };
    let signer = KeySigner::from_config(&cfg).unwrap();
    let sig = signer.sign("configured").unwrap();
    assert!(signer.verify("configured", &sig).unwrap());
}

#[test]
fn from_config_with_missing_key_file_is_io_error() {
    let cfg = SignerConfig { private_key: Some("/no/such/key.der".into()), ..Default::default() };
    assert!(matches!(KeySigner::from_config(&cfg), Err(KeyError::Io(_))));
}

#[test]
fn shared_instance_persists_keys() {
    KeySigner::shared().load_private_key(&PAIR_A.private_der).unwrap();
    KeySigner::shared().load_public_key(&PAIR_A.public_der).unwrap();
    let sig = KeySigner::shared().sign("global").unwrap();
    assert!(KeySigner::shared().verify("global", &sig).unwrap());
}

#[test]
fn concurrent_reloads_never_tear_a_key() {
    let signer = Arc::new(KeySigner::new());
    signer.load_private_key(&PAIR_A.private_der).unwrap();
    let verify_a = KeySigner::new();
    verify_a.load_public_key(&PAIR_A.public_der).unwrap();
    let verify_b = KeySigner::new();
    verify_b.load_public_key(&PAIR_B.public_der).unwrap();

    let loader = {
        let signer = Arc::clone(&signer);
        std::thread::spawn(move || {
            for i in 0..20 {
                let der = if i % 2 == 0 { &PAIR_B.private_der } else { &PAIR_A.private_der };
                signer.load_private_key(der).unwrap();
            }
        })
    };
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let signer = Arc::clone(&signer);
            std::thread::spawn(move || (0..10).map(|_| signer.sign("race").unwrap()).collect::<Vec<_>>())
        })
        .collect();
    loader.join().unwrap();
    for w in workers {
        for sig in w.join().unwrap() {
            assert!(verify_a.verify("race", &sig).unwrap() || verify_b.verify("race", &sig).unwrap());
        }
    }
}

#[test]
fn large_public_key_loads_and_verifies_to_false_for_foreign_signature() {
    use rsa::pkcs8::EncodePublicKey;
    let mut n = vec![0xB7u8; 1024];
    n[1023] |= 1;
    let key = rsa::RsaPublicKey::new_with_max_size(
        rsa::BigUint::from_bytes_be(&n),
        rsa::BigUint::from(65_537u64),
        keysigner::crypto::MAX_MODULUS_BITS,
    )
    .unwrap();
    let der = key.to_public_key_der().unwrap();

    let signer = loaded_signer();
    let sig = signer.sign("hello").unwrap();
    signer.load_public_key(der.as_bytes()).unwrap();
    assert!(signer.public_key_fingerprint().is_some());
    assert!(!signer.verify("hello", &sig).unwrap());
}

#[test]
fn algorithm_unavailable_only_comes_from_name_resolution() {
    let cfg = SignerConfig { algorithm: Some("SHA512withECDSA".into()), ..Default::default() };
    assert!(matches!(KeySigner::from_config(&cfg), Err(KeyError::AlgorithmUnavailable(name)) if name == "SHA512withECDSA"));

    let signer = KeySigner::with_options(SignatureAlgorithm::Sha256WithRsa, KeyEncoding::Auto);
    for bad in [b"garbage".as_slice(), b"".as_slice(), PAIR_A.public_der.as_slice()] {
        assert!(matches!(signer.load_private_key(bad), Err(KeyError::KeyFormat { .. })));
    }
}
