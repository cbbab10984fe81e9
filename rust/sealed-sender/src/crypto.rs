//
// Copyright 2020 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! The encrypt-then-MAC construction protecting both layers of a sealed sender envelope.
//!
//! AES-256-CTR always starts from an all-zero IV. That is only sound because every key passed
//! in here comes fresh out of HKDF for a single message.

use aes::cipher::{KeyIvInit, StreamCipher};
use aes::Aes256;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::consts::MAC_LENGTH;
use crate::{Result, SealedSenderError};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

pub(crate) fn aes_256_ctr_encrypt(ptext: &[u8], key: &[u8; 32]) -> Vec<u8> {
    let zero_nonce = [0u8; 16];
    let mut cipher = Aes256Ctr::new(key.into(), &zero_nonce.into());

    let mut ctext = ptext.to_vec();
    cipher.apply_keystream(&mut ctext);
    ctext
}

pub(crate) fn aes_256_ctr_decrypt(ctext: &[u8], key: &[u8; 32]) -> Vec<u8> {
    aes_256_ctr_encrypt(ctext, key)
}

pub(crate) fn hmac_sha256(key: &[u8], input: &[u8]) -> [u8; 32] {
    let mut hmac =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC-SHA256 should accept any size key");
    hmac.update(input);
    hmac.finalize().into_bytes().into()
}

/// Encrypts `ptext` and appends a [`MAC_LENGTH`]-byte tag computed over the ciphertext.
pub(crate) fn aes256_ctr_hmacsha256_encrypt(
    ptext: &[u8],
    cipher_key: &[u8; 32],
    mac_key: &[u8; 32],
) -> Vec<u8> {
    let mut ctext = aes_256_ctr_encrypt(ptext, cipher_key);
    let mac = hmac_sha256(mac_key, &ctext);
    ctext.extend_from_slice(&mac[..MAC_LENGTH]);
    ctext
}

/// Checks the trailing tag, and only if it matches, decrypts the rest.
pub(crate) fn aes256_ctr_hmacsha256_decrypt(
    ctext: &[u8],
    cipher_key: &[u8; 32],
    mac_key: &[u8; 32],
) -> Result<Vec<u8>> {
    if ctext.len() < MAC_LENGTH {
        return Err(SealedSenderError::MalformedCiphertext(ctext.len()));
    }
    let (ctext, their_mac) = ctext.split_at(ctext.len() - MAC_LENGTH);
    let our_mac = hmac_sha256(mac_key, ctext);
    if !bool::from(our_mac[..MAC_LENGTH].ct_eq(their_mac)) {
        return Err(SealedSenderError::AuthenticationFailed);
    }
    Ok(aes_256_ctr_decrypt(ctext, cipher_key))
}
