// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! RFC 4648 Base32 alphabet without padding, as typed in by the key holder.
//!
//! Encoding emits only complete 5-bit groups, so trailing bits of inputs whose bit
//! length is not a multiple of 5 are dropped. Decoding accepts both cases and maps
//! any symbol outside the alphabet to 31; use [`validate`] to reject such input.

use crate::ensure;
use crate::error::{Error, Result};

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Number of symbols produced by [`encode`] for `len` input bytes.
pub const fn encoded_len(len: usize) -> usize {
    len * 8 / 5
}

/// Number of bytes produced by [`decode`] for `len` input symbols.
pub const fn decoded_len(len: usize) -> usize {
    (len * 5 + 7) / 8
}

/// Encode `src` into `dest`, returning the number of symbols written.
///
/// `dest` must hold at least [`encoded_len`] bytes.
pub fn encode(src: &[u8], dest: &mut [u8]) -> usize {
    let count = encoded_len(src.len());
    debug_assert!(dest.len() >= count);

    for (n, symbol) in dest[..count].iter_mut().enumerate() {
        let bit = n * 5;
        let (byte, shift) = (bit / 8, bit % 8);
        // two bytes cover any 5-bit window
        let high = u16::from(src[byte]) << 8;
        let low = src.get(byte + 1).copied().map_or(0, u16::from);
        let index = ((high | low) >> (11 - shift)) & 0x1f;
        *symbol = ALPHABET[index as usize];
    }
    count
}

fn symbol_value(symbol: u8) -> u8 {
    match symbol {
        b'A'..=b'Z' => symbol - b'A',
        b'a'..=b'z' => symbol - b'a',
        b'2'..=b'7' => symbol - b'2' + 26,
        _ => 31,
    }
}

/// Decode `src` into `dest`, returning the number of bytes written.
///
/// Bits of an incomplete final byte are left aligned. `dest` must hold at least
/// [`decoded_len`] bytes.
pub fn decode(src: &[u8], dest: &mut [u8]) -> usize {
    let count = decoded_len(src.len());
    debug_assert!(dest.len() >= count);

    let mut accumulator: u16 = 0;
    let mut bits = 0;
    let mut written = 0;
    for symbol in src {
        accumulator = (accumulator << 5) | u16::from(symbol_value(*symbol));
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            dest[written] = (accumulator >> bits) as u8;
            written += 1;
        }
        accumulator &= (1 << bits) - 1;
    }
    if bits > 0 {
        dest[written] = (accumulator << (8 - bits)) as u8;
        written += 1;
    }
    debug_assert_eq!(written, count);
    written
}

/// Check that every symbol of `src` belongs to the alphabet.
pub fn validate(src: &[u8]) -> Result {
    ensure(
        src.iter()
            .all(|symbol| symbol.is_ascii_alphabetic() || (b'2'..=b'7').contains(symbol)),
        Error::InvalidBase32,
    )
}
