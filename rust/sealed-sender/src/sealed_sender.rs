//
// Copyright 2020-2022 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Sealed sender: hides the sender of a session message from everyone but the recipient.
//!
//! An envelope has two layers. The first is keyed by an agreement between a fresh ephemeral key
//! and the recipient's identity key, and hides the sender's identity key. The second is keyed by
//! an agreement between the two identity keys, and carries an
//! [`UnidentifiedSenderMessageContent`]: a [`SenderCertificate`] plus the session-layer message.

mod keys;
mod message;

use rand::{CryptoRng, Rng};
use subtle::ConstantTimeEq;

use self::keys::{Direction, EphemeralKeys, StaticKeys};
use self::message::UnidentifiedSenderMessage;
pub use self::message::UnidentifiedSenderMessageContent;
use crate::crypto::{aes256_ctr_hmacsha256_decrypt, aes256_ctr_hmacsha256_encrypt};
use crate::{
    CertificateValidator, CiphertextMessage, CiphertextMessageType, DeviceId, IdentityKeyStore,
    KeyPair, LocalAddress, ProtocolAddress, PublicKey, Result, SealedSenderError,
    SenderCertificate, SessionCipher, Timestamp,
};

/// Seals an already-assembled [`UnidentifiedSenderMessageContent`] for `destination`.
///
/// The destination's identity key must already be in `identity_store`.
pub async fn sealed_sender_encrypt_from_usmc<R: Rng + CryptoRng>(
    destination: &ProtocolAddress,
    usmc: &UnidentifiedSenderMessageContent,
    identity_store: &dyn IdentityKeyStore,
    rng: &mut R,
) -> Result<Vec<u8>> {
    let our_identity = identity_store.get_identity_key_pair().await?;
    let their_identity = identity_store
        .get_identity(destination)
        .await?
        .ok_or_else(|| {
            log::warn!("no identity key for sealed sender destination {}", destination);
            SealedSenderError::UnknownIdentity(destination.clone())
        })?;

    let ephemeral = KeyPair::generate(rng);

    let eph_keys = EphemeralKeys::calculate(
        &ephemeral.private_key,
        &ephemeral.public_key,
        their_identity.public_key(),
        Direction::Sending,
    )?;

    let encrypted_static = aes256_ctr_hmacsha256_encrypt(
        &our_identity.public_key().serialize(),
        &eph_keys.cipher_key,
        &eph_keys.mac_key,
    );

    let static_keys = StaticKeys::calculate(
        our_identity.private_key(),
        their_identity.public_key(),
        &eph_keys.chain_key,
        &encrypted_static,
    )?;

    let encrypted_message = aes256_ctr_hmacsha256_encrypt(
        usmc.serialized(),
        &static_keys.cipher_key,
        &static_keys.mac_key,
    );

    Ok(UnidentifiedSenderMessage {
        ephemeral_public: ephemeral.public_key,
        encrypted_static,
        encrypted_message,
    }
    .serialize())
}

/// Seals a session-layer message that has already been encrypted for `destination`.
pub async fn sealed_sender_encrypt_ciphertext<R: Rng + CryptoRng>(
    destination: &ProtocolAddress,
    sender_cert: &SenderCertificate,
    inner_ciphertext: &CiphertextMessage,
    identity_store: &dyn IdentityKeyStore,
    rng: &mut R,
) -> Result<Vec<u8>> {
    let usmc = UnidentifiedSenderMessageContent::new(
        inner_ciphertext.message_type(),
        sender_cert.clone(),
        inner_ciphertext.serialize().to_vec(),
    );
    sealed_sender_encrypt_from_usmc(destination, &usmc, identity_store, rng).await
}

/// Encrypts `ptext` with the session for `destination`, then seals the result.
pub async fn sealed_sender_encrypt<R: Rng + CryptoRng>(
    destination: &ProtocolAddress,
    sender_cert: &SenderCertificate,
    ptext: &[u8],
    session_cipher: &mut dyn SessionCipher,
    identity_store: &dyn IdentityKeyStore,
    rng: &mut R,
) -> Result<Vec<u8>> {
    let message = session_cipher
        .encrypt_message(destination, ptext)
        .await
        .map_err(|kind| {
            log::error!("session encryption for {} failed: {}", destination, kind);
            SealedSenderError::Protocol {
                kind,
                sender: destination.name().to_owned(),
                sender_device: destination.device_id(),
            }
        })?;
    sealed_sender_encrypt_ciphertext(destination, sender_cert, &message, identity_store, rng).await
}

/// Opens both layers of a sealed sender envelope addressed to the identity in `identity_store`.
///
/// The returned content has *not* had its certificate validated; the only guarantee is that the
/// certificate names the same identity key that sealed the envelope.
pub async fn sealed_sender_decrypt_to_usmc(
    ciphertext: &[u8],
    identity_store: &dyn IdentityKeyStore,
) -> Result<UnidentifiedSenderMessageContent> {
    let our_identity = identity_store.get_identity_key_pair().await?;
    let envelope = UnidentifiedSenderMessage::deserialize(ciphertext)?;

    let eph_keys = EphemeralKeys::calculate(
        our_identity.private_key(),
        our_identity.public_key(),
        &envelope.ephemeral_public,
        Direction::Receiving,
    )?;

    let static_key_bytes = aes256_ctr_hmacsha256_decrypt(
        &envelope.encrypted_static,
        &eph_keys.cipher_key,
        &eph_keys.mac_key,
    )?;
    let static_key = PublicKey::deserialize(&static_key_bytes).map_err(|e| {
        SealedSenderError::MalformedEnvelope(format!("invalid sender identity key: {e}"))
    })?;

    let static_keys = StaticKeys::calculate(
        our_identity.private_key(),
        &static_key,
        &eph_keys.chain_key,
        &envelope.encrypted_static,
    )?;

    let message_bytes = aes256_ctr_hmacsha256_decrypt(
        &envelope.encrypted_message,
        &static_keys.cipher_key,
        &static_keys.mac_key,
    )?;

    let usmc = UnidentifiedSenderMessageContent::deserialize(&message_bytes)?;

    if !bool::from(usmc.sender().key().ct_eq(&static_key)) {
        log::warn!(
            "sealed sender certificate for {}.{} does not match the sealing identity",
            usmc.sender().sender_uuid(),
            usmc.sender().sender_device_id()
        );
        return Err(SealedSenderError::AuthenticationFailed);
    }

    Ok(usmc)
}

/// The sender and session-layer plaintext of a fully decrypted sealed sender message.
#[derive(Debug, Clone)]
pub struct SealedSenderDecryptionResult {
    pub sender_uuid: String,
    pub sender_e164: Option<String>,
    pub device_id: DeviceId,
    pub message_type: CiphertextMessageType,
    pub message: Vec<u8>,
}

impl SealedSenderDecryptionResult {
    pub fn sender_uuid(&self) -> &str {
        &self.sender_uuid
    }

    pub fn sender_e164(&self) -> Option<&str> {
        self.sender_e164.as_deref()
    }

    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    pub fn message_type(&self) -> CiphertextMessageType {
        self.message_type
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// The address to reply to, or to report session errors against.
    pub fn sender_address(&self) -> ProtocolAddress {
        ProtocolAddress::new(self.sender_uuid.clone(), self.device_id)
    }
}

/// Opens a sealed sender envelope, validates its certificate as of `timestamp`, and decrypts the
/// session-layer message inside.
///
/// `timestamp` should be the server's receipt time for the envelope, not the local clock.
pub async fn sealed_sender_decrypt(
    ciphertext: &[u8],
    trust: &CertificateValidator,
    timestamp: Timestamp,
    local_address: &LocalAddress,
    identity_store: &dyn IdentityKeyStore,
    session_cipher: &mut dyn SessionCipher,
) -> Result<SealedSenderDecryptionResult> {
    let usmc = sealed_sender_decrypt_to_usmc(ciphertext, identity_store).await?;
    let sender = usmc.sender();

    trust.validate(sender, timestamp)?;

    if local_address.is_same_device(
        sender.sender_uuid(),
        sender.sender_e164(),
        sender.sender_device_id(),
    ) {
        log::warn!(
            "dropping sealed sender message sent by this device ({}.{})",
            sender.sender_uuid(),
            sender.sender_device_id()
        );
        return Err(SealedSenderError::SelfSend);
    }

    let remote_address =
        ProtocolAddress::new(sender.sender_uuid().to_owned(), sender.sender_device_id());

    let message = match usmc.msg_type() {
        CiphertextMessageType::Whisper => {
            session_cipher
                .decrypt_signal_message(&remote_address, usmc.contents())
                .await
        }
        CiphertextMessageType::PreKey => {
            session_cipher
                .decrypt_prekey_message(&remote_address, usmc.contents())
                .await
        }
        CiphertextMessageType::Plaintext => {
            session_cipher
                .decrypt_plaintext_content(&remote_address, usmc.contents())
                .await
        }
    }
    .map_err(|kind| {
        log::error!(
            "failed to decrypt {:?} message from {}: {}",
            usmc.msg_type(),
            remote_address,
            kind
        );
        SealedSenderError::Protocol {
            kind,
            sender: remote_address.name().to_owned(),
            sender_device: remote_address.device_id(),
        }
    })?;

    log::info!(
        "decrypted sealed sender {:?} message from {}",
        usmc.msg_type(),
        remote_address
    );

    Ok(SealedSenderDecryptionResult {
        sender_uuid: sender.sender_uuid().to_owned(),
        sender_e164: sender.sender_e164().map(str::to_owned),
        device_id: sender.sender_device_id(),
        message_type: usmc.msg_type(),
        message,
    })
}
