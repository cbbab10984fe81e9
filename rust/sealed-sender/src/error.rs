//
// Copyright 2020 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

use crate::curve::CurveError;
use crate::{DeviceId, ProtocolAddress, Timestamp};

pub type Result<T> = std::result::Result<T, SealedSenderError>;

/// Failures reported by the double-ratchet [`SessionCipher`](crate::SessionCipher).
///
/// Sealed sender decryption re-raises these as [`SealedSenderError::Protocol`], attaching the
/// certified sender so the caller can choose between a session reset and a silent drop.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolErrorKind {
    #[error("invalid key")]
    InvalidKey,
    #[error("invalid prekey identifier {0}")]
    InvalidKeyId(u32),
    #[error("no session")]
    NoSession,
    #[error("message with old counter {0} / {1}")]
    DuplicatedMessage(u32, u32),
    #[error("ciphertext version was too old <{0}>")]
    LegacyMessage(u8),
    #[error("ciphertext version was unrecognized <{0}>")]
    InvalidVersion(u8),
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    #[error("untrusted identity")]
    UntrustedIdentity,
}

#[derive(thiserror::Error, Debug)]
pub enum SealedSenderError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("key agreement failed: {0}")]
    KeyAgreement(#[source] CurveError),

    #[error("malformed sealed sender message: {0}")]
    MalformedEnvelope(String),
    #[error("ciphertext serialized bytes were too short <{0}>")]
    MalformedCiphertext(usize),
    #[error("sealed sender message failed authentication")]
    AuthenticationFailed,

    #[error("invalid signature detected")]
    InvalidSignature,
    #[error("server certificate key id {0:#x} has been revoked")]
    RevokedServerCertificate(u32),
    #[error("sender certificate expired at {expiration} (validated at {validation_time})")]
    CertificateExpired {
        expiration: Timestamp,
        validation_time: Timestamp,
    },

    #[error("self send of a sealed sender message")]
    SelfSend,
    #[error("no identity key known for {0}")]
    UnknownIdentity(ProtocolAddress),

    #[error("session cipher failed for {sender}.{sender_device}: {kind}")]
    Protocol {
        kind: ProtocolErrorKind,
        sender: String,
        sender_device: DeviceId,
    },

    #[error("application callback {0} failed with {1}")]
    ApplicationCallback(&'static str, String),
}

impl From<prost::DecodeError> for SealedSenderError {
    fn from(value: prost::DecodeError) -> Self {
        SealedSenderError::MalformedEnvelope(value.to_string())
    }
}
