//
// Copyright 2020-2022 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Interfaces in [traits] and reference implementations in [inmem] for the identity store.

#![warn(missing_docs)]

mod inmem;
mod traits;

pub use inmem::InMemIdentityKeyStore;
pub use traits::IdentityKeyStore;
