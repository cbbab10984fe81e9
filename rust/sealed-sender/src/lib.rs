//
// Copyright 2020-2022 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Sealed sender envelopes for Signal Protocol messages.
//!
//! The session layer itself is supplied by the caller through [`SessionCipher`]; this crate only
//! hides who sent a message and proves it to the recipient with a [`SenderCertificate`].

#![warn(clippy::unwrap_used)]
#![deny(unsafe_code)]

mod address;
mod certificate;
mod consts;
mod crypto;
mod curve;
pub mod error;
mod identity_key;
mod kdf;
mod proto;
mod protocol;
mod sealed_sender;
mod session_cipher;
mod storage;
mod timestamp;

use error::Result;

pub use {
    address::{DeviceId, LocalAddress, ProtocolAddress},
    certificate::{CertificateValidator, SenderCertificate, ServerCertificate, TrustRoot},
    consts::REVOKED_SERVER_CERTIFICATE_KEY_IDS,
    curve::{CurveError, KeyPair, KeyType, PrivateKey, PublicKey, SERIALIZED_PUBLIC_KEY_LENGTH},
    error::{ProtocolErrorKind, SealedSenderError},
    identity_key::{IdentityKey, IdentityKeyPair},
    protocol::{CiphertextMessage, CiphertextMessageType},
    sealed_sender::{
        sealed_sender_decrypt, sealed_sender_decrypt_to_usmc, sealed_sender_encrypt,
        sealed_sender_encrypt_ciphertext, sealed_sender_encrypt_from_usmc,
        SealedSenderDecryptionResult, UnidentifiedSenderMessageContent,
    },
    session_cipher::SessionCipher,
    storage::{IdentityKeyStore, InMemIdentityKeyStore},
    timestamp::Timestamp,
};
