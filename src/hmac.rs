// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! HMAC-SHA-1 (RFC 2104) for keys of at most one block.

use crate::sha1::{Sha1, BLOCK_SIZE, DIGEST_SIZE};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// Compute HMAC-SHA-1 of `message` under `key`.
///
/// `key` must not exceed 64 bytes; longer keys are not hashed down and cause a panic.
/// Credential secrets are bounded by [`KEY_SECRET_MAX`](crate::KEY_SECRET_MAX).
pub fn hmac_sha1(key: &[u8], message: &[u8]) -> [u8; DIGEST_SIZE] {
    debug_assert!(key.len() <= BLOCK_SIZE);

    let mut pad = [0u8; BLOCK_SIZE];
    pad[..key.len()].copy_from_slice(key);

    pad.iter_mut().for_each(|byte| *byte ^= IPAD);
    let mut inner = Sha1::new();
    inner.update(&pad);
    inner.update(message);
    let inner = inner.finish();

    pad.iter_mut().for_each(|byte| *byte ^= IPAD ^ OPAD);
    let mut outer = Sha1::new();
    outer.update(&pad);
    outer.update(&inner);
    outer.finish()
}
