//
// Copyright 2020-2021 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

use crate::proto::sealed_sender::unidentified_sender_message::message::Type as ProtoMessageType;

/// The kinds of double-ratchet output a sealed sender envelope may carry.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
#[repr(u8)]
pub enum CiphertextMessageType {
    Whisper = 2,
    PreKey = 3,
    Plaintext = 8,
}

impl From<CiphertextMessageType> for ProtoMessageType {
    fn from(value: CiphertextMessageType) -> Self {
        match value {
            CiphertextMessageType::Whisper => ProtoMessageType::Message,
            CiphertextMessageType::PreKey => ProtoMessageType::PrekeyMessage,
            CiphertextMessageType::Plaintext => ProtoMessageType::PlaintextContent,
        }
    }
}

impl From<ProtoMessageType> for CiphertextMessageType {
    fn from(value: ProtoMessageType) -> Self {
        match value {
            ProtoMessageType::Message => CiphertextMessageType::Whisper,
            ProtoMessageType::PrekeyMessage => CiphertextMessageType::PreKey,
            ProtoMessageType::PlaintextContent => CiphertextMessageType::Plaintext,
        }
    }
}

/// A serialized message produced by a [`SessionCipher`](crate::SessionCipher), tagged with its
/// type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiphertextMessage {
    message_type: CiphertextMessageType,
    serialized: Box<[u8]>,
}

impl CiphertextMessage {
    pub fn new(message_type: CiphertextMessageType, serialized: impl Into<Box<[u8]>>) -> Self {
        Self {
            message_type,
            serialized: serialized.into(),
        }
    }

    pub fn message_type(&self) -> CiphertextMessageType {
        self.message_type
    }

    pub fn serialize(&self) -> &[u8] {
        &self.serialized
    }
}
