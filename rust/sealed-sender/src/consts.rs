//
// Copyright 2020-2022 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

#![warn(missing_docs)]

//! Magic numbers.

/// Major (and minor) version of the sealed sender envelope produced by this crate.
pub const SEALED_SENDER_V1_VERSION: u8 = 1;

/// The leading byte of every v1 envelope: major version in the high nibble, minor in the low.
pub const SEALED_SENDER_V1_VERSION_BYTE: u8 =
    (SEALED_SENDER_V1_VERSION << 4) | SEALED_SENDER_V1_VERSION;

/// Prefix of the HKDF salt for the ephemeral layer.
pub const UNIDENTIFIED_DELIVERY_SALT_PREFIX: &[u8] = b"UnidentifiedDelivery";

/// Number of HMAC-SHA256 bytes kept as the authentication tag of each layer.
pub const MAC_LENGTH: usize = 10;

/// Server certificate key ids that must never be accepted, whatever their signature.
pub const REVOKED_SERVER_CERTIFICATE_KEY_IDS: &[u32] = &[0xDEADC357];
