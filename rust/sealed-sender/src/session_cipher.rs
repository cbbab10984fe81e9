//
// Copyright 2020-2022 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

use async_trait::async_trait;

use crate::error::ProtocolErrorKind;
use crate::{CiphertextMessage, ProtocolAddress};

/// The double-ratchet session layer that sealed sender wraps and unwraps.
///
/// Sealed sender never looks inside these messages. It hands the inner ciphertext to the
/// method matching its [`CiphertextMessageType`](crate::CiphertextMessageType), addressed to
/// the sender named in the (already validated) certificate.
#[async_trait(?Send)]
pub trait SessionCipher {
    /// Encrypt `ptext` for `remote_address` using the current session.
    async fn encrypt_message(
        &mut self,
        remote_address: &ProtocolAddress,
        ptext: &[u8],
    ) -> Result<CiphertextMessage, ProtocolErrorKind>;

    /// Decrypt a [`Whisper`](crate::CiphertextMessageType::Whisper) message.
    async fn decrypt_signal_message(
        &mut self,
        remote_address: &ProtocolAddress,
        ctext: &[u8],
    ) -> Result<Vec<u8>, ProtocolErrorKind>;

    /// Decrypt a [`PreKey`](crate::CiphertextMessageType::PreKey) message, establishing a
    /// session if needed.
    async fn decrypt_prekey_message(
        &mut self,
        remote_address: &ProtocolAddress,
        ctext: &[u8],
    ) -> Result<Vec<u8>, ProtocolErrorKind>;

    /// Unwrap a [`Plaintext`](crate::CiphertextMessageType::Plaintext) fallback message.
    async fn decrypt_plaintext_content(
        &mut self,
        remote_address: &ProtocolAddress,
        ctext: &[u8],
    ) -> Result<Vec<u8>, ProtocolErrorKind>;
}
