//
// Copyright 2020 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

use std::fmt;

/// The number of a particular client instance (phone, desktop, ...) belonging to one account.
#[derive(
    Copy, Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, derive_more::From, derive_more::Into,
)]
pub struct DeviceId(u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a unique Signal client instance as `(<user ID>, <device ID>)` pair.
#[derive(Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct ProtocolAddress {
    name: String,
    device_id: DeviceId,
}

impl ProtocolAddress {
    /// Create a new address.
    ///
    /// `name` is usually the account UUID; `device_id` picks out one client of that account.
    pub fn new(name: String, device_id: DeviceId) -> Self {
        ProtocolAddress { name, device_id }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }
}

impl fmt::Display for ProtocolAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.device_id)
    }
}

/// The identity of the device performing a sealed sender decryption.
///
/// A sealed sender message whose certificate names this device is rejected as a self-send.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocalAddress {
    uuid: String,
    e164: Option<String>,
    device_id: DeviceId,
}

impl LocalAddress {
    pub fn new(uuid: String, e164: Option<String>, device_id: DeviceId) -> Self {
        Self {
            uuid,
            e164,
            device_id,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn e164(&self) -> Option<&str> {
        self.e164.as_deref()
    }

    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    /// True if `(uuid or e164, device_id)` refers to this device.
    ///
    /// The E.164 comparison only applies when both sides have one.
    pub(crate) fn is_same_device(
        &self,
        uuid: &str,
        e164: Option<&str>,
        device_id: DeviceId,
    ) -> bool {
        let same_account = self.uuid == uuid
            || matches!((self.e164(), e164), (Some(ours), Some(theirs)) if ours == theirs);
        same_account && self.device_id == device_id
    }
}
