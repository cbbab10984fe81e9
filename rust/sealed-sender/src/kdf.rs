//
// Copyright 2020 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

/// HKDF-SHA256 with an empty `info`, producing exactly `N` bytes.
///
/// `N` is always a small compile-time constant, far below the 255 * 32 byte HKDF limit.
pub(crate) fn derive_secrets<const N: usize>(
    input_key_material: &[u8],
    salt: &[u8],
) -> Zeroizing<[u8; N]> {
    let mut okm = Zeroizing::new([0u8; N]);
    Hkdf::<Sha256>::new(Some(salt), input_key_material)
        .expand(&[], &mut okm[..])
        .expect("valid output length");
    okm
}
