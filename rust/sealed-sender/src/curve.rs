//
// Copyright 2020-2022 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

mod curve25519;

use std::fmt;

use rand::{CryptoRng, Rng};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

pub use curve25519::AGREEMENT_LENGTH;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyType {
    Djb,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl KeyType {
    fn value(&self) -> u8 {
        match &self {
            KeyType::Djb => 0x05u8,
        }
    }
}

#[derive(Debug, displaydoc::Display, PartialEq, Eq)]
pub enum CurveError {
    /// no key type identifier
    NoKeyTypeIdentifier,
    /// bad key type <{0:#04x}>
    BadKeyType(u8),
    /// bad key length <{1}> for key with type <{0}>
    BadKeyLength(KeyType, usize),
    /// key agreement with a low-order point
    NonContributoryAgreement,
}

impl std::error::Error for CurveError {}

impl TryFrom<u8> for KeyType {
    type Error = CurveError;

    fn try_from(x: u8) -> Result<Self, CurveError> {
        match x {
            0x05u8 => Ok(KeyType::Djb),
            t => Err(CurveError::BadKeyType(t)),
        }
    }
}

/// Length of a serialized [`PublicKey`]: one type byte and the 32-byte point.
pub const SERIALIZED_PUBLIC_KEY_LENGTH: usize = 1 + curve25519::PUBLIC_KEY_LENGTH;

#[derive(Clone, Copy, Eq)]
pub struct PublicKey {
    key: [u8; curve25519::PUBLIC_KEY_LENGTH],
}

impl PublicKey {
    /// Parses a type-prefixed public key.
    ///
    /// Unlike some older decoders, trailing bytes are rejected: every key this crate reads sits
    /// in its own length-delimited field.
    pub fn deserialize(value: &[u8]) -> Result<Self, CurveError> {
        let (&type_byte, key_bytes) = value
            .split_first()
            .ok_or(CurveError::NoKeyTypeIdentifier)?;
        match KeyType::try_from(type_byte)? {
            KeyType::Djb => {
                let key = key_bytes
                    .try_into()
                    .map_err(|_| CurveError::BadKeyLength(KeyType::Djb, value.len()))?;
                Ok(PublicKey { key })
            }
        }
    }

    pub fn from_djb_public_key_bytes(bytes: &[u8]) -> Result<Self, CurveError> {
        match <[u8; curve25519::PUBLIC_KEY_LENGTH]>::try_from(bytes) {
            Err(_) => Err(CurveError::BadKeyLength(KeyType::Djb, bytes.len())),
            Ok(key) => Ok(PublicKey { key }),
        }
    }

    pub fn public_key_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn serialize(&self) -> Box<[u8]> {
        let mut result = Vec::with_capacity(SERIALIZED_PUBLIC_KEY_LENGTH);
        result.push(self.key_type().value());
        result.extend_from_slice(&self.key);
        result.into_boxed_slice()
    }

    pub fn verify_signature(&self, message: &[u8], signature: &[u8]) -> bool {
        self.verify_signature_for_multipart_message(&[message], signature)
    }

    pub fn verify_signature_for_multipart_message(
        &self,
        message: &[&[u8]],
        signature: &[u8],
    ) -> bool {
        let Ok(signature) = signature.try_into() else {
            return false;
        };
        curve25519::PrivateKey::verify_signature(&self.key, message, signature)
    }

    pub fn key_type(&self) -> KeyType {
        KeyType::Djb
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = CurveError;

    fn try_from(value: &[u8]) -> Result<Self, CurveError> {
        Self::deserialize(value)
    }
}

impl subtle::ConstantTimeEq for PublicKey {
    fn ct_eq(&self, other: &PublicKey) -> subtle::Choice {
        self.key.ct_eq(&other.key)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &PublicKey) -> bool {
        bool::from(self.ct_eq(other))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PublicKey {{ key_type={}, serialize={:?} }}",
            self.key_type(),
            self.serialize()
        )
    }
}

#[derive(Clone)]
pub struct PrivateKey {
    key: curve25519::PrivateKey,
}

impl PrivateKey {
    pub fn deserialize(value: &[u8]) -> Result<Self, CurveError> {
        let key: [u8; curve25519::PRIVATE_KEY_LENGTH] = value
            .try_into()
            .map_err(|_| CurveError::BadKeyLength(KeyType::Djb, value.len()))?;
        Ok(Self {
            key: curve25519::PrivateKey::from(key),
        })
    }

    pub fn serialize(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.key.private_key_bytes().to_vec())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            key: self.key.derive_public_key_bytes(),
        }
    }

    pub fn key_type(&self) -> KeyType {
        KeyType::Djb
    }

    pub fn calculate_signature<R: CryptoRng + Rng>(
        &self,
        message: &[u8],
        csprng: &mut R,
    ) -> Box<[u8]> {
        Box::new(self.key.calculate_signature(csprng, &[message]))
    }

    /// Diffie-Hellman agreement; the result is erased when dropped.
    pub fn calculate_agreement(
        &self,
        their_key: &PublicKey,
    ) -> Result<Zeroizing<[u8; AGREEMENT_LENGTH]>, CurveError> {
        self.key
            .calculate_agreement(&their_key.key)
            .ok_or(CurveError::NonContributoryAgreement)
    }
}

impl TryFrom<&[u8]> for PrivateKey {
    type Error = CurveError;

    fn try_from(value: &[u8]) -> Result<Self, CurveError> {
        Self::deserialize(value)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("PrivateKey { .. }")
    }
}

#[derive(Clone, Debug)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

impl KeyPair {
    pub fn generate<R: Rng + CryptoRng>(csprng: &mut R) -> Self {
        let private_key = PrivateKey {
            key: curve25519::PrivateKey::new(csprng),
        };
        Self {
            public_key: private_key.public_key(),
            private_key,
        }
    }

    pub fn new(public_key: PublicKey, private_key: PrivateKey) -> Self {
        Self {
            public_key,
            private_key,
        }
    }

    pub fn calculate_signature<R: CryptoRng + Rng>(
        &self,
        message: &[u8],
        csprng: &mut R,
    ) -> Box<[u8]> {
        self.private_key.calculate_signature(message, csprng)
    }

    pub fn calculate_agreement(
        &self,
        their_key: &PublicKey,
    ) -> Result<Zeroizing<[u8; AGREEMENT_LENGTH]>, CurveError> {
        self.private_key.calculate_agreement(their_key)
    }
}

impl From<PrivateKey> for KeyPair {
    fn from(value: PrivateKey) -> Self {
        Self::new(value.public_key(), value)
    }
}
