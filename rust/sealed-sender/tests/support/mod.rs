//
// Copyright 2020 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

#![allow(dead_code)]

use std::future::Future;

use async_trait::async_trait;
use futures_util::FutureExt;
use rand::rngs::OsRng;
use signal_sealed_sender::*;

/// 2024-01-01T00:00:00Z
pub const JANUARY_2024: Timestamp = Timestamp::from_epoch_millis(1_704_067_200_000);
/// 2099-01-01T00:00:00Z
pub const JANUARY_2099: Timestamp = Timestamp::from_epoch_millis(4_070_908_800_000);

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Everything here completes without yielding, so there is no need for a real executor.
pub fn sync<T>(future: impl Future<Output = T>) -> T {
    future.now_or_never().expect("sync")
}

pub fn test_in_memory_identity_store() -> InMemIdentityKeyStore {
    InMemIdentityKeyStore::new(IdentityKeyPair::generate(&mut OsRng))
}

pub fn identity_of(store: &InMemIdentityKeyStore) -> IdentityKey {
    *sync(store.get_identity_key_pair())
        .expect("in-memory store")
        .identity_key()
}

/// A trust root and one server certificate signed by it.
pub struct TestServer {
    pub trust_root: KeyPair,
    pub server_key: KeyPair,
    pub server_cert: ServerCertificate,
}

impl TestServer {
    pub fn new(key_id: u32) -> Self {
        let mut rng = OsRng;
        let trust_root = KeyPair::generate(&mut rng);
        let server_key = KeyPair::generate(&mut rng);
        let server_cert =
            ServerCertificate::new(key_id, server_key.public_key, &trust_root.private_key, &mut rng)
                .expect("valid");
        Self {
            trust_root,
            server_key,
            server_cert,
        }
    }

    pub fn issue(
        &self,
        uuid: &str,
        e164: Option<&str>,
        identity: &IdentityKey,
        device_id: DeviceId,
        expires: Timestamp,
    ) -> SenderCertificate {
        SenderCertificate::new(
            uuid.to_owned(),
            e164.map(str::to_owned),
            *identity.public_key(),
            device_id,
            expires,
            self.server_cert.clone(),
            &self.server_key.private_key,
            &mut OsRng,
        )
        .expect("valid")
    }

    pub fn validator(&self) -> CertificateValidator {
        CertificateValidator::new(vec![self.trust_root.public_key])
    }
}

const FRAMING: &[u8] = b"session:";

/// A stand-in for the double ratchet: "encrypts" by framing the plaintext, and records every
/// decryption request it sees.
#[derive(Default)]
pub struct TestSessionCipher {
    pub message_type: Option<CiphertextMessageType>,
    pub failure: Option<ProtocolErrorKind>,
    pub seen: Vec<(ProtocolAddress, CiphertextMessageType)>,
}

impl TestSessionCipher {
    pub fn producing(message_type: CiphertextMessageType) -> Self {
        Self {
            message_type: Some(message_type),
            ..Default::default()
        }
    }

    pub fn failing(kind: ProtocolErrorKind) -> Self {
        Self {
            failure: Some(kind),
            ..Default::default()
        }
    }

    fn unframe(
        &mut self,
        remote_address: &ProtocolAddress,
        message_type: CiphertextMessageType,
        ctext: &[u8],
    ) -> Result<Vec<u8>, ProtocolErrorKind> {
        self.seen.push((remote_address.clone(), message_type));
        if let Some(kind) = &self.failure {
            return Err(kind.clone());
        }
        ctext
            .strip_prefix(FRAMING)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| ProtocolErrorKind::InvalidMessage("missing framing".to_owned()))
    }
}

#[async_trait(?Send)]
impl SessionCipher for TestSessionCipher {
    async fn encrypt_message(
        &mut self,
        _remote_address: &ProtocolAddress,
        ptext: &[u8],
    ) -> Result<CiphertextMessage, ProtocolErrorKind> {
        if let Some(kind) = &self.failure {
            return Err(kind.clone());
        }
        Ok(CiphertextMessage::new(
            self.message_type.unwrap_or(CiphertextMessageType::Whisper),
            [FRAMING, ptext].concat(),
        ))
    }

    async fn decrypt_signal_message(
        &mut self,
        remote_address: &ProtocolAddress,
        ctext: &[u8],
    ) -> Result<Vec<u8>, ProtocolErrorKind> {
        self.unframe(remote_address, CiphertextMessageType::Whisper, ctext)
    }

    async fn decrypt_prekey_message(
        &mut self,
        remote_address: &ProtocolAddress,
        ctext: &[u8],
    ) -> Result<Vec<u8>, ProtocolErrorKind> {
        self.unframe(remote_address, CiphertextMessageType::PreKey, ctext)
    }

    async fn decrypt_plaintext_content(
        &mut self,
        remote_address: &ProtocolAddress,
        ctext: &[u8],
    ) -> Result<Vec<u8>, ProtocolErrorKind> {
        self.unframe(remote_address, CiphertextMessageType::Plaintext, ctext)
    }
}
