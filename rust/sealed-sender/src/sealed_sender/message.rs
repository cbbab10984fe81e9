//
// Copyright 2020-2022 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

use prost::Message;

use crate::consts::{MAC_LENGTH, SEALED_SENDER_V1_VERSION, SEALED_SENDER_V1_VERSION_BYTE};
use crate::proto::sealed_sender::unidentified_sender_message::message::Type as ProtoMessageType;
use crate::{proto, CiphertextMessageType, PublicKey, Result, SealedSenderError, SenderCertificate};

/// The plaintext carried inside a sealed sender envelope: who sent it, and the session-layer
/// message they sent.
#[derive(Debug, Clone)]
pub struct UnidentifiedSenderMessageContent {
    serialized: Vec<u8>,
    contents: Vec<u8>,
    sender: SenderCertificate,
    msg_type: CiphertextMessageType,
}

impl UnidentifiedSenderMessageContent {
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let pb = proto::sealed_sender::unidentified_sender_message::Message::decode(data)?;

        let msg_type = pb
            .r#type
            .ok_or_else(|| SealedSenderError::MalformedEnvelope("missing message type".into()))?;
        let msg_type = ProtoMessageType::try_from(msg_type)
            .map_err(|_| {
                SealedSenderError::MalformedEnvelope(format!("unknown message type {msg_type}"))
            })?
            .into();
        let sender = pb.sender_certificate.ok_or_else(|| {
            SealedSenderError::MalformedEnvelope("missing sender certificate".into())
        })?;
        let contents = pb
            .content
            .ok_or_else(|| SealedSenderError::MalformedEnvelope("missing content".into()))?;

        let sender = SenderCertificate::from_protobuf(&sender)?;

        Ok(Self {
            serialized: data.to_vec(),
            contents,
            sender,
            msg_type,
        })
    }

    pub fn new(
        msg_type: CiphertextMessageType,
        sender: SenderCertificate,
        contents: Vec<u8>,
    ) -> Self {
        let msg = proto::sealed_sender::unidentified_sender_message::Message {
            r#type: Some(ProtoMessageType::from(msg_type).into()),
            sender_certificate: Some(sender.to_protobuf()),
            content: Some(contents.clone()),
        };

        Self {
            serialized: msg.encode_to_vec(),
            msg_type,
            sender,
            contents,
        }
    }

    pub fn msg_type(&self) -> CiphertextMessageType {
        self.msg_type
    }

    pub fn sender(&self) -> &SenderCertificate {
        &self.sender
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn serialized(&self) -> &[u8] {
        &self.serialized
    }
}

/// The outer envelope: a version byte followed by the protobuf-encoded layers.
#[derive(Debug)]
pub(super) struct UnidentifiedSenderMessage {
    pub(super) ephemeral_public: PublicKey,
    pub(super) encrypted_static: Vec<u8>,
    pub(super) encrypted_message: Vec<u8>,
}

impl UnidentifiedSenderMessage {
    pub(super) fn deserialize(data: &[u8]) -> Result<Self> {
        let (&version_byte, remaining) = data
            .split_first()
            .ok_or_else(|| SealedSenderError::MalformedEnvelope("empty message".into()))?;

        let version = version_byte >> 4;
        if version != SEALED_SENDER_V1_VERSION {
            return Err(SealedSenderError::MalformedEnvelope(format!(
                "unknown sealed sender version {version}"
            )));
        }
        if version_byte != SEALED_SENDER_V1_VERSION_BYTE {
            return Err(SealedSenderError::MalformedEnvelope(format!(
                "unknown sealed sender minor version {}",
                version_byte & 0x0F
            )));
        }

        let pb = proto::sealed_sender::UnidentifiedSenderMessage::decode(remaining)?;

        let ephemeral_public = pb.ephemeral_public.ok_or_else(|| {
            SealedSenderError::MalformedEnvelope("missing ephemeral public key".into())
        })?;
        let encrypted_static = pb.encrypted_static.ok_or_else(|| {
            SealedSenderError::MalformedEnvelope("missing encrypted static key".into())
        })?;
        let encrypted_message = pb.encrypted_message.ok_or_else(|| {
            SealedSenderError::MalformedEnvelope("missing encrypted message".into())
        })?;

        if encrypted_static.len() < MAC_LENGTH || encrypted_message.len() < MAC_LENGTH {
            return Err(SealedSenderError::MalformedEnvelope(
                "encrypted field shorter than its tag".into(),
            ));
        }

        let ephemeral_public = PublicKey::try_from(&ephemeral_public[..]).map_err(|e| {
            SealedSenderError::MalformedEnvelope(format!("invalid ephemeral public key: {e}"))
        })?;

        Ok(Self {
            ephemeral_public,
            encrypted_static,
            encrypted_message,
        })
    }

    pub(super) fn serialize(&self) -> Vec<u8> {
        let pb = proto::sealed_sender::UnidentifiedSenderMessage {
            ephemeral_public: Some(self.ephemeral_public.serialize().into_vec()),
            encrypted_static: Some(self.encrypted_static.clone()),
            encrypted_message: Some(self.encrypted_message.clone()),
        };

        let mut serialized = Vec::with_capacity(1 + pb.encoded_len());
        serialized.push(SEALED_SENDER_V1_VERSION_BYTE);
        serialized.extend_from_slice(&pb.encode_to_vec());
        serialized
    }
}
