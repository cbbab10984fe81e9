//
// Copyright 2020-2022 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::consts::UNIDENTIFIED_DELIVERY_SALT_PREFIX;
use crate::kdf::derive_secrets;
use crate::{PrivateKey, PublicKey, Result, SealedSenderError};

/// Which end of the envelope is deriving keys; decides the order of the keys in the salt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum Direction {
    Sending,
    Receiving,
}

/// Keys protecting the sender's identity key, derived from the ephemeral agreement.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(super) struct EphemeralKeys {
    pub(super) chain_key: [u8; 32],
    pub(super) cipher_key: [u8; 32],
    pub(super) mac_key: [u8; 32],
}

impl EphemeralKeys {
    /// `our_private`/`our_public` are the ephemeral pair when sending and the recipient's
    /// identity pair when receiving; `their_public` is the other one.
    pub(super) fn calculate(
        our_private: &PrivateKey,
        our_public: &PublicKey,
        their_public: &PublicKey,
        direction: Direction,
    ) -> Result<Self> {
        let our_serialized = our_public.serialize();
        let their_serialized = their_public.serialize();
        // The salt is always prefix || recipient identity || ephemeral key.
        let salt = match direction {
            Direction::Sending => [
                UNIDENTIFIED_DELIVERY_SALT_PREFIX,
                &their_serialized[..],
                &our_serialized[..],
            ],
            Direction::Receiving => [
                UNIDENTIFIED_DELIVERY_SALT_PREFIX,
                &our_serialized[..],
                &their_serialized[..],
            ],
        }
        .concat();

        let shared_secret = our_private
            .calculate_agreement(their_public)
            .map_err(SealedSenderError::KeyAgreement)?;
        let derived = derive_secrets::<96>(&shared_secret[..], &salt);

        let mut keys = Self {
            chain_key: [0; 32],
            cipher_key: [0; 32],
            mac_key: [0; 32],
        };
        keys.chain_key.copy_from_slice(&derived[..32]);
        keys.cipher_key.copy_from_slice(&derived[32..64]);
        keys.mac_key.copy_from_slice(&derived[64..]);
        Ok(keys)
    }
}

/// Keys protecting the message content, derived from the two identity keys.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(super) struct StaticKeys {
    pub(super) cipher_key: [u8; 32],
    pub(super) mac_key: [u8; 32],
}

impl StaticKeys {
    /// `salt` is the ephemeral chain key followed by the encrypted static key.
    pub(super) fn calculate(
        our_private: &PrivateKey,
        their_public: &PublicKey,
        chain_key: &[u8; 32],
        encrypted_static: &[u8],
    ) -> Result<Self> {
        let salt = [&chain_key[..], encrypted_static].concat();
        let shared_secret = our_private
            .calculate_agreement(their_public)
            .map_err(SealedSenderError::KeyAgreement)?;
        let derived = derive_secrets::<96>(&shared_secret[..], &salt);

        // The first 32 bytes are a chain key that the static layer never uses.
        let mut keys = Self {
            cipher_key: [0; 32],
            mac_key: [0; 32],
        };
        keys.cipher_key.copy_from_slice(&derived[32..64]);
        keys.mac_key.copy_from_slice(&derived[64..]);
        Ok(keys)
    }
}
