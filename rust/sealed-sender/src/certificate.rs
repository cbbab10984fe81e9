//
// Copyright 2020-2022 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

use prost::Message;
use rand::{CryptoRng, Rng};

use crate::consts::REVOKED_SERVER_CERTIFICATE_KEY_IDS;
use crate::{proto, DeviceId, PrivateKey, PublicKey, Result, SealedSenderError, Timestamp};

/// A key trusted to sign [`ServerCertificate`]s.
pub trait TrustRoot {
    fn verify_signature(&self, message: &[u8], signature: &[u8]) -> bool;
}

impl TrustRoot for PublicKey {
    fn verify_signature(&self, message: &[u8], signature: &[u8]) -> bool {
        PublicKey::verify_signature(self, message, signature)
    }
}

fn missing(field: &str) -> SealedSenderError {
    SealedSenderError::MalformedEnvelope(format!("missing {field}"))
}

fn bad_key(field: &str) -> impl FnOnce(crate::CurveError) -> SealedSenderError + '_ {
    move |e| SealedSenderError::MalformedEnvelope(format!("invalid {field}: {e}"))
}

#[derive(Debug, Clone)]
pub struct ServerCertificate {
    serialized: Vec<u8>,
    key_id: u32,
    key: PublicKey,
    certificate: Vec<u8>,
    signature: Vec<u8>,
}

impl ServerCertificate {
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let pb = proto::sealed_sender::ServerCertificate::decode(data)?;
        let certificate = pb.certificate.ok_or_else(|| missing("server certificate"))?;
        let signature = pb.signature.ok_or_else(|| missing("server signature"))?;
        let certificate_data =
            proto::sealed_sender::server_certificate::Certificate::decode(certificate.as_ref())?;
        let key = PublicKey::deserialize(
            &certificate_data.key.ok_or_else(|| missing("server key"))?,
        )
        .map_err(bad_key("server key"))?;
        let key_id = certificate_data.id.ok_or_else(|| missing("server key id"))?;

        Ok(Self {
            serialized: data.to_vec(),
            certificate,
            signature,
            key,
            key_id,
        })
    }

    /// Issues a certificate for `key`, signed by `trust_root`.
    pub fn new<R: Rng + CryptoRng>(
        key_id: u32,
        key: PublicKey,
        trust_root: &PrivateKey,
        rng: &mut R,
    ) -> Result<Self> {
        let certificate_pb = proto::sealed_sender::server_certificate::Certificate {
            id: Some(key_id),
            key: Some(key.serialize().into_vec()),
        };
        let certificate = certificate_pb.encode_to_vec();

        let signature = trust_root.calculate_signature(&certificate, rng).into_vec();

        let serialized = proto::sealed_sender::ServerCertificate {
            certificate: Some(certificate.clone()),
            signature: Some(signature.clone()),
        }
        .encode_to_vec();

        Ok(Self {
            serialized,
            certificate,
            signature,
            key,
            key_id,
        })
    }

    pub(crate) fn to_protobuf(&self) -> proto::sealed_sender::ServerCertificate {
        proto::sealed_sender::ServerCertificate {
            certificate: Some(self.certificate.clone()),
            signature: Some(self.signature.clone()),
        }
    }

    /// Checks the signature against `trust_root` and the key id against the built-in revocation
    /// list.
    pub fn validate(&self, trust_root: &dyn TrustRoot) -> Result<()> {
        self.validate_against(&[trust_root], &[])
    }

    fn validate_against(&self, trust_roots: &[&dyn TrustRoot], extra_revoked: &[u32]) -> Result<()> {
        if REVOKED_SERVER_CERTIFICATE_KEY_IDS.contains(&self.key_id)
            || extra_revoked.contains(&self.key_id)
        {
            log::error!(
                "received server certificate with revoked ID {:x}",
                self.key_id
            );
            return Err(SealedSenderError::RevokedServerCertificate(self.key_id));
        }
        if !trust_roots
            .iter()
            .any(|root| root.verify_signature(&self.certificate, &self.signature))
        {
            return Err(SealedSenderError::InvalidSignature);
        }
        Ok(())
    }

    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    pub fn public_key(&self) -> PublicKey {
        self.key
    }

    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn serialized(&self) -> &[u8] {
        &self.serialized
    }
}

#[derive(Debug, Clone)]
pub struct SenderCertificate {
    signer: ServerCertificate,
    key: PublicKey,
    sender_device_id: DeviceId,
    sender_uuid: String,
    sender_e164: Option<String>,
    expiration: Timestamp,
    serialized: Vec<u8>,
    certificate: Vec<u8>,
    signature: Vec<u8>,
}

impl SenderCertificate {
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let pb = proto::sealed_sender::SenderCertificate::decode(data)?;
        let certificate = pb.certificate.ok_or_else(|| missing("sender certificate"))?;
        let signature = pb.signature.ok_or_else(|| missing("sender signature"))?;
        let certificate_data =
            proto::sealed_sender::sender_certificate::Certificate::decode(certificate.as_ref())?;

        let sender_device_id = certificate_data
            .sender_device
            .ok_or_else(|| missing("sender device"))?
            .into();
        let expiration = Timestamp::from_epoch_millis(
            certificate_data
                .expires
                .ok_or_else(|| missing("expiration"))?,
        );
        let signer_pb = certificate_data
            .signer
            .ok_or_else(|| missing("signer"))?;
        let sender_uuid = certificate_data
            .sender_uuid
            .filter(|uuid| !uuid.is_empty())
            .ok_or_else(|| missing("sender uuid"))?;
        let sender_e164 = certificate_data.sender_e164;

        let key = PublicKey::deserialize(
            &certificate_data
                .identity_key
                .ok_or_else(|| missing("identity key"))?,
        )
        .map_err(bad_key("identity key"))?;

        let signer = ServerCertificate::deserialize(&signer_pb.encode_to_vec())?;

        Ok(Self {
            signer,
            key,
            sender_device_id,
            sender_uuid,
            sender_e164,
            expiration,
            serialized: data.to_vec(),
            certificate,
            signature,
        })
    }

    /// Issues a certificate binding `key` to `(sender_uuid, sender_device_id)` until
    /// `expiration`, signed by `signer_key`.
    ///
    /// `signer_key` must be the private half of `signer`'s public key for the result to
    /// validate.
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: Rng + CryptoRng>(
        sender_uuid: String,
        sender_e164: Option<String>,
        key: PublicKey,
        sender_device_id: DeviceId,
        expiration: Timestamp,
        signer: ServerCertificate,
        signer_key: &PrivateKey,
        rng: &mut R,
    ) -> Result<Self> {
        if sender_uuid.is_empty() {
            return Err(SealedSenderError::InvalidArgument(
                "sender certificate requires a sender uuid".to_string(),
            ));
        }

        let certificate_pb = proto::sealed_sender::sender_certificate::Certificate {
            sender_uuid: Some(sender_uuid.clone()),
            sender_e164: sender_e164.clone(),
            sender_device: Some(sender_device_id.into()),
            expires: Some(expiration.epoch_millis()),
            identity_key: Some(key.serialize().into_vec()),
            signer: Some(signer.to_protobuf()),
        };
        let certificate = certificate_pb.encode_to_vec();

        let signature = signer_key.calculate_signature(&certificate, rng).into_vec();

        let serialized = proto::sealed_sender::SenderCertificate {
            certificate: Some(certificate.clone()),
            signature: Some(signature.clone()),
        }
        .encode_to_vec();

        Ok(Self {
            signer,
            key,
            sender_device_id,
            sender_uuid,
            sender_e164,
            expiration,
            serialized,
            certificate,
            signature,
        })
    }

    pub(crate) fn from_protobuf(pb: &proto::sealed_sender::SenderCertificate) -> Result<Self> {
        Self::deserialize(&pb.encode_to_vec())
    }

    pub(crate) fn to_protobuf(&self) -> proto::sealed_sender::SenderCertificate {
        proto::sealed_sender::SenderCertificate {
            certificate: Some(self.certificate.clone()),
            signature: Some(self.signature.clone()),
        }
    }

    /// Validates against a single trust root and the built-in revocation list.
    pub fn validate(&self, trust_root: &dyn TrustRoot, validation_time: Timestamp) -> Result<()> {
        self.validate_against(&[trust_root], &[], validation_time)
    }

    fn validate_against(
        &self,
        trust_roots: &[&dyn TrustRoot],
        extra_revoked: &[u32],
        validation_time: Timestamp,
    ) -> Result<()> {
        self.signer.validate_against(trust_roots, extra_revoked)?;

        if !self
            .signer
            .public_key()
            .verify_signature(&self.certificate, &self.signature)
        {
            return Err(SealedSenderError::InvalidSignature);
        }

        if validation_time >= self.expiration {
            return Err(SealedSenderError::CertificateExpired {
                expiration: self.expiration,
                validation_time,
            });
        }

        Ok(())
    }

    pub fn signer(&self) -> &ServerCertificate {
        &self.signer
    }

    pub fn key(&self) -> PublicKey {
        self.key
    }

    pub fn sender_device_id(&self) -> DeviceId {
        self.sender_device_id
    }

    pub fn sender_uuid(&self) -> &str {
        &self.sender_uuid
    }

    pub fn sender_e164(&self) -> Option<&str> {
        self.sender_e164.as_deref()
    }

    pub fn expiration(&self) -> Timestamp {
        self.expiration
    }

    pub fn serialized(&self) -> &[u8] {
        &self.serialized
    }

    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

/// The trust configuration used to accept sender certificates.
///
/// Server certificates must be signed by one of `trust_roots`. Key ids in
/// [`REVOKED_SERVER_CERTIFICATE_KEY_IDS`] are always refused; more can be added with
/// [`with_revoked_key_ids`](Self::with_revoked_key_ids).
#[derive(Debug, Clone)]
pub struct CertificateValidator {
    trust_roots: Vec<PublicKey>,
    revoked_key_ids: Vec<u32>,
}

impl CertificateValidator {
    pub fn new(trust_roots: Vec<PublicKey>) -> Self {
        Self {
            trust_roots,
            revoked_key_ids: Vec::new(),
        }
    }

    pub fn with_revoked_key_ids(mut self, key_ids: impl IntoIterator<Item = u32>) -> Self {
        self.revoked_key_ids.extend(key_ids);
        self
    }

    pub fn trust_roots(&self) -> &[PublicKey] {
        &self.trust_roots
    }

    /// Checks the whole chain, in order: the server certificate (trust root and revocation), the
    /// sender certificate's signature, then expiration.
    ///
    /// A certificate is expired once `validation_time` reaches its expiration.
    pub fn validate(
        &self,
        certificate: &SenderCertificate,
        validation_time: Timestamp,
    ) -> Result<()> {
        let trust_roots: Vec<&dyn TrustRoot> = self
            .trust_roots
            .iter()
            .map(|root| root as &dyn TrustRoot)
            .collect();
        certificate
            .validate_against(&trust_roots, &self.revoked_key_ids, validation_time)
            .inspect_err(|e| {
                log::warn!(
                    "rejecting sender certificate for {}.{}: {}",
                    certificate.sender_uuid(),
                    certificate.sender_device_id(),
                    e
                )
            })
    }
}
