//
// Copyright 2020-2021 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

mod support;

use assert_matches::assert_matches;
use rand::rngs::OsRng;
use signal_sealed_sender::*;
use support::*;

const ALICE_UUID: &str = "9d0652a3-dcc3-4d11-975f-74d61598733f";
const ALICE_E164: &str = "+14151111111";
const BOB_UUID: &str = "796abedb-ca4e-4f18-8803-1fde5b921f9f";
const BOB_E164: &str = "+14151114444";

struct Setup {
    server: TestServer,
    alice_store: InMemIdentityKeyStore,
    alice_cert: SenderCertificate,
    bob_store: InMemIdentityKeyStore,
    bob_address: ProtocolAddress,
    bob_local: LocalAddress,
}

impl Setup {
    fn new() -> Self {
        init_logger();

        let alice_device_id = DeviceId::from(23);
        let bob_device_id = DeviceId::from(42);

        let server = TestServer::new(1);
        let mut alice_store = test_in_memory_identity_store();
        let bob_store = test_in_memory_identity_store();

        let bob_address = ProtocolAddress::new(BOB_UUID.to_owned(), bob_device_id);
        sync(alice_store.save_identity(&bob_address, &identity_of(&bob_store))).expect("saved");

        let alice_cert = server.issue(
            ALICE_UUID,
            Some(ALICE_E164),
            &identity_of(&alice_store),
            alice_device_id,
            JANUARY_2099,
        );

        Self {
            server,
            alice_store,
            alice_cert,
            bob_store,
            bob_address,
            bob_local: LocalAddress::new(
                BOB_UUID.to_owned(),
                Some(BOB_E164.to_owned()),
                bob_device_id,
            ),
        }
    }

    fn seal(&self, message_type: CiphertextMessageType, ptext: &[u8]) -> Vec<u8> {
        let mut cipher = TestSessionCipher::producing(message_type);
        sync(sealed_sender_encrypt(
            &self.bob_address,
            &self.alice_cert,
            ptext,
            &mut cipher,
            &self.alice_store,
            &mut OsRng,
        ))
        .expect("valid")
    }

    fn open(
        &self,
        ciphertext: &[u8],
        timestamp: Timestamp,
        cipher: &mut TestSessionCipher,
    ) -> Result<SealedSenderDecryptionResult, SealedSenderError> {
        sync(sealed_sender_decrypt(
            ciphertext,
            &self.server.validator(),
            timestamp,
            &self.bob_local,
            &self.bob_store,
            cipher,
        ))
    }
}

#[test]
fn test_sealed_sender() -> Result<(), SealedSenderError> {
    let setup = Setup::new();

    let ctext = setup.seal(CiphertextMessageType::Whisper, b"hello");
    let mut bob_cipher = TestSessionCipher::default();
    let result = setup.open(&ctext, JANUARY_2024, &mut bob_cipher)?;

    assert_eq!(result.message(), b"hello");
    assert_eq!(result.message_type(), CiphertextMessageType::Whisper);
    assert_eq!(result.sender_uuid(), ALICE_UUID);
    assert_eq!(result.sender_e164(), Some(ALICE_E164));
    assert_eq!(result.device_id(), DeviceId::from(23));
    assert_eq!(
        result.sender_address(),
        ProtocolAddress::new(ALICE_UUID.to_owned(), DeviceId::from(23))
    );
    assert_eq!(
        bob_cipher.seen,
        vec![(result.sender_address(), CiphertextMessageType::Whisper)]
    );

    Ok(())
}

#[test]
fn test_sealed_sender_other_device_cannot_open() {
    let setup = Setup::new();
    let ctext = setup.seal(CiphertextMessageType::Whisper, b"hello");

    // Bob's second device has its own identity key.
    let bob_other_device = test_in_memory_identity_store();
    let mut cipher = TestSessionCipher::default();
    let result = sync(sealed_sender_decrypt(
        &ctext,
        &setup.server.validator(),
        JANUARY_2024,
        &LocalAddress::new(BOB_UUID.to_owned(), None, DeviceId::from(2)),
        &bob_other_device,
        &mut cipher,
    ));
    assert_matches!(result, Err(SealedSenderError::AuthenticationFailed));
    assert!(cipher.seen.is_empty());

    assert_matches!(
        sync(sealed_sender_decrypt_to_usmc(&ctext, &bob_other_device)),
        Err(SealedSenderError::AuthenticationFailed)
    );
}

#[test]
fn test_sealed_sender_dispatches_by_message_type() -> Result<(), SealedSenderError> {
    let setup = Setup::new();

    for message_type in [
        CiphertextMessageType::Whisper,
        CiphertextMessageType::PreKey,
        CiphertextMessageType::Plaintext,
    ] {
        let ctext = setup.seal(message_type, &[1, 2, 3, 23, 99]);
        let mut bob_cipher = TestSessionCipher::default();
        let result = setup.open(&ctext, JANUARY_2024, &mut bob_cipher)?;

        assert_eq!(result.message_type(), message_type);
        assert_eq!(result.message(), &[1u8, 2, 3, 23, 99]);
        assert_eq!(bob_cipher.seen.len(), 1);
        assert_eq!(bob_cipher.seen[0].1, message_type);
    }
    Ok(())
}

#[test]
fn test_sealed_sender_expired_certificate() {
    let setup = Setup::new();

    for timestamp in [JANUARY_2099, JANUARY_2099.add_millis(11)] {
        let ctext = setup.seal(CiphertextMessageType::Whisper, b"hello");
        let mut bob_cipher = TestSessionCipher::default();
        assert_matches!(
            setup.open(&ctext, timestamp, &mut bob_cipher),
            Err(SealedSenderError::CertificateExpired { expiration, validation_time })
                if expiration == JANUARY_2099 && validation_time == timestamp
        );
        assert!(bob_cipher.seen.is_empty());
    }

    let ctext = setup.seal(CiphertextMessageType::Whisper, b"hello");
    let mut bob_cipher = TestSessionCipher::default();
    assert!(setup
        .open(&ctext, JANUARY_2099.sub_millis(1), &mut bob_cipher)
        .is_ok());
}

#[test]
fn test_sealed_sender_wrong_trust_root() {
    let setup = Setup::new();
    let ctext = setup.seal(CiphertextMessageType::Whisper, b"hello");

    let wrong_trust_root = KeyPair::generate(&mut OsRng);
    let mut bob_cipher = TestSessionCipher::default();
    let result = sync(sealed_sender_decrypt(
        &ctext,
        &CertificateValidator::new(vec![wrong_trust_root.public_key]),
        JANUARY_2024,
        &setup.bob_local,
        &setup.bob_store,
        &mut bob_cipher,
    ));
    assert_matches!(result, Err(SealedSenderError::InvalidSignature));
}

#[test]
fn test_sealed_sender_revoked_server_certificate() {
    init_logger();

    let mut alice_store = test_in_memory_identity_store();
    let bob_store = test_in_memory_identity_store();
    let bob_address = ProtocolAddress::new(BOB_UUID.to_owned(), DeviceId::from(1));
    sync(alice_store.save_identity(&bob_address, &identity_of(&bob_store))).expect("saved");
    let bob_local = LocalAddress::new(BOB_UUID.to_owned(), None, DeviceId::from(1));

    for (server, validator_revokes) in [
        (TestServer::new(0xDEADC357), vec![]),
        (TestServer::new(77), vec![77]),
    ] {
        let alice_cert = server.issue(
            ALICE_UUID,
            None,
            &identity_of(&alice_store),
            DeviceId::from(1),
            JANUARY_2099,
        );
        let ctext = sync(sealed_sender_encrypt(
            &bob_address,
            &alice_cert,
            b"hello",
            &mut TestSessionCipher::default(),
            &alice_store,
            &mut OsRng,
        ))
        .expect("valid");

        let revoked_id = alice_cert.signer().key_id();
        let result = sync(sealed_sender_decrypt(
            &ctext,
            &server.validator().with_revoked_key_ids(validator_revokes),
            JANUARY_2024,
            &bob_local,
            &bob_store,
            &mut TestSessionCipher::default(),
        ));
        assert_matches!(
            result,
            Err(SealedSenderError::RevokedServerCertificate(id)) if id == revoked_id
        );
    }
}

#[test]
fn test_sealed_sender_self_send() -> Result<(), SealedSenderError> {
    init_logger();

    let server = TestServer::new(1);
    let bob_device_id = DeviceId::from(42);
    let bob_address = ProtocolAddress::new(BOB_UUID.to_owned(), bob_device_id);
    let mut bob_store = test_in_memory_identity_store();
    let bob_identity = identity_of(&bob_store);
    sync(bob_store.save_identity(&bob_address, &bob_identity))?;

    let bob_local = LocalAddress::new(
        BOB_UUID.to_owned(),
        Some(BOB_E164.to_owned()),
        bob_device_id,
    );

    let seal_from = |uuid: &str, e164: Option<&str>, device_id: DeviceId| {
        let cert = server.issue(uuid, e164, &bob_identity, device_id, JANUARY_2099);
        sync(sealed_sender_encrypt(
            &bob_address,
            &cert,
            b"note to self",
            &mut TestSessionCipher::default(),
            &bob_store,
            &mut OsRng,
        ))
        .expect("valid")
    };
    let open = |ctext: &[u8]| {
        sync(sealed_sender_decrypt(
            ctext,
            &server.validator(),
            JANUARY_2024,
            &bob_local,
            &bob_store,
            &mut TestSessionCipher::default(),
        ))
    };

    // Same uuid, same device.
    assert_matches!(
        open(&seal_from(BOB_UUID, None, bob_device_id)),
        Err(SealedSenderError::SelfSend)
    );
    // Same phone number, same device.
    assert_matches!(
        open(&seal_from(ALICE_UUID, Some(BOB_E164), bob_device_id)),
        Err(SealedSenderError::SelfSend)
    );
    // Another device of the same account is a legitimate sender.
    let result = open(&seal_from(BOB_UUID, Some(BOB_E164), DeviceId::from(1)))?;
    assert_eq!(result.message(), b"note to self");
    assert_eq!(result.device_id(), DeviceId::from(1));

    Ok(())
}

#[test]
fn test_sealed_sender_wraps_session_errors() {
    let setup = Setup::new();
    let ctext = setup.seal(CiphertextMessageType::PreKey, b"hello");

    let mut bob_cipher = TestSessionCipher::failing(ProtocolErrorKind::InvalidKeyId(7));
    assert_matches!(
        setup.open(&ctext, JANUARY_2024, &mut bob_cipher),
        Err(SealedSenderError::Protocol { kind: ProtocolErrorKind::InvalidKeyId(7), sender, sender_device })
            if sender == ALICE_UUID && sender_device == DeviceId::from(23)
    );
    assert_eq!(bob_cipher.seen.len(), 1);

    let mut alice_cipher = TestSessionCipher::failing(ProtocolErrorKind::NoSession);
    let result = sync(sealed_sender_encrypt(
        &setup.bob_address,
        &setup.alice_cert,
        b"hello",
        &mut alice_cipher,
        &setup.alice_store,
        &mut OsRng,
    ));
    assert_matches!(
        result,
        Err(SealedSenderError::Protocol { kind: ProtocolErrorKind::NoSession, sender, .. })
            if sender == BOB_UUID
    );
}

#[test]
fn test_sealed_sender_unknown_destination() {
    let setup = Setup::new();
    let carol_address = ProtocolAddress::new("carol".to_owned(), DeviceId::from(1));

    let inner = CiphertextMessage::new(CiphertextMessageType::Whisper, b"hello".to_vec());
    let result = sync(sealed_sender_encrypt_ciphertext(
        &carol_address,
        &setup.alice_cert,
        &inner,
        &setup.alice_store,
        &mut OsRng,
    ));
    assert_matches!(result, Err(SealedSenderError::UnknownIdentity(address)) if address == carol_address);
}

#[test]
fn test_sealed_sender_certificate_must_match_sealing_identity() {
    let setup = Setup::new();

    // Mallory seals with her own identity but presents Alice's (valid) certificate.
    let mut mallory_store = test_in_memory_identity_store();
    sync(mallory_store.save_identity(&setup.bob_address, &identity_of(&setup.bob_store)))
        .expect("saved");

    let usmc = UnidentifiedSenderMessageContent::new(
        CiphertextMessageType::Whisper,
        setup.alice_cert.clone(),
        b"session:hello".to_vec(),
    );
    let ctext = sync(sealed_sender_encrypt_from_usmc(
        &setup.bob_address,
        &usmc,
        &mallory_store,
        &mut OsRng,
    ))
    .expect("valid");

    let mut bob_cipher = TestSessionCipher::default();
    assert_matches!(
        setup.open(&ctext, JANUARY_2024, &mut bob_cipher),
        Err(SealedSenderError::AuthenticationFailed)
    );
    assert!(bob_cipher.seen.is_empty());
}

#[test]
fn test_sealed_sender_usmc_round_trip() -> Result<(), SealedSenderError> {
    let setup = Setup::new();

    let usmc = UnidentifiedSenderMessageContent::new(
        CiphertextMessageType::Plaintext,
        setup.alice_cert.clone(),
        b"hello".to_vec(),
    );
    let ctext = sync(sealed_sender_encrypt_from_usmc(
        &setup.bob_address,
        &usmc,
        &setup.alice_store,
        &mut OsRng,
    ))?;

    let recovered = sync(sealed_sender_decrypt_to_usmc(&ctext, &setup.bob_store))?;
    assert_eq!(recovered.msg_type(), CiphertextMessageType::Plaintext);
    assert_eq!(recovered.contents(), b"hello");
    assert_eq!(recovered.sender().sender_uuid(), ALICE_UUID);
    assert_eq!(recovered.serialized(), usmc.serialized());
    Ok(())
}

#[test]
fn test_sealed_sender_bit_flips() {
    let setup = Setup::new();
    let mut ctext = setup.seal(CiphertextMessageType::Whisper, b"hello");

    for b in 0..ctext.len() * 8 {
        ctext[b / 8] ^= 1u8 << (b % 8); // flip a bit
        let mut bob_cipher = TestSessionCipher::default();
        let result = setup.open(&ctext, JANUARY_2024, &mut bob_cipher);
        ctext[b / 8] ^= 1u8 << (b % 8); // flip the bit back

        match result {
            Err(SealedSenderError::AuthenticationFailed)
            | Err(SealedSenderError::MalformedEnvelope(_)) => {}
            Err(e) => panic!("unexpected error at bit {b}: {e}"),
            Ok(_) => panic!("bit {b} flipped without detection"),
        }
        assert!(bob_cipher.seen.is_empty());
    }

    let mut bob_cipher = TestSessionCipher::default();
    assert!(setup.open(&ctext, JANUARY_2024, &mut bob_cipher).is_ok());
}
