// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Streaming SHA-1 (FIPS 180-1).
//!
//! Only used as the building block of HMAC-SHA-1 for one-time codes.

/// Size of one input block in bytes
pub const BLOCK_SIZE: usize = 64;
/// Size of the digest in bytes
pub const DIGEST_SIZE: usize = 20;

const INITIAL_STATE: [u32; 5] = [0x67452301, 0xEFCDAB89, 0x98BADCFE, 0x10325476, 0xC3D2E1F0];

/// Incremental SHA-1 context.
///
/// `finish` consumes the context, so a finished hash cannot be extended by accident.
#[derive(Clone)]
pub struct Sha1 {
    state: [u32; 5],
    buffer: [u8; BLOCK_SIZE],
    buffer_size: usize,
    transforms: u64,
}

impl core::fmt::Debug for Sha1 {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // the buffer may hold key material
        fmt.debug_struct("Sha1")
            .field("buffer_size", &self.buffer_size)
            .field("transforms", &self.transforms)
            .finish()
    }
}

impl Default for Sha1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha1 {
    /// Fresh context with the standard initial state.
    pub const fn new() -> Self {
        Self {
            state: INITIAL_STATE,
            buffer: [0; BLOCK_SIZE],
            buffer_size: 0,
            transforms: 0,
        }
    }

    /// Number of 64-byte blocks compressed so far.
    pub fn transforms(&self) -> u64 {
        self.transforms
    }

    /// Append `data` to the message.
    ///
    /// Every full block is compressed immediately, so at most 63 bytes stay buffered.
    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let n = core::cmp::min(BLOCK_SIZE - self.buffer_size, data.len());
            self.buffer[self.buffer_size..][..n].copy_from_slice(&data[..n]);
            self.buffer_size += n;
            data = &data[n..];

            if self.buffer_size == BLOCK_SIZE {
                self.compress_buffer();
                self.buffer_size = 0;
            }
        }
    }

    /// Compress the partially filled buffer as if zero-padded to a full block.
    ///
    /// The zero padding counts as message data for the final length. The buffer
    /// contents are unspecified afterwards.
    pub fn iterate(&mut self) {
        self.buffer[self.buffer_size..].fill(0);
        self.compress_buffer();
        self.buffer_size = 0;
    }

    /// Apply the final padding and return the big-endian digest.
    pub fn finish(mut self) -> [u8; DIGEST_SIZE] {
        let total_bits = (self.transforms * BLOCK_SIZE as u64 + self.buffer_size as u64) * 8;

        self.buffer[self.buffer_size] = 0x80;
        self.buffer[self.buffer_size + 1..].fill(0);

        let mut block = words(&self.buffer);
        if self.buffer_size + 1 > 56 {
            self.compress(&mut block);
            block[..14].fill(0);
        }
        block[14] = (total_bits >> 32) as u32;
        block[15] = total_bits as u32;
        self.compress(&mut block);

        let mut digest = [0u8; DIGEST_SIZE];
        for (chunk, word) in digest.chunks_exact_mut(4).zip(self.state.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        digest
    }

    fn compress_buffer(&mut self) {
        let mut block = words(&self.buffer);
        self.compress(&mut block);
    }

    fn compress(&mut self, block: &mut [u32; 16]) {
        let [mut a, mut b, mut c, mut d, mut e] = self.state;

        for i in 0..80 {
            let w = if i < 16 {
                block[i]
            } else {
                let w = (block[(i + 13) & 15]
                    ^ block[(i + 8) & 15]
                    ^ block[(i + 2) & 15]
                    ^ block[i & 15])
                    .rotate_left(1);
                block[i & 15] = w;
                w
            };

            let (f, k) = match i {
                0..=19 => (((c ^ d) & b) ^ d, 0x5A827999),
                20..=39 => (b ^ c ^ d, 0x6ED9EBA1),
                40..=59 => (((b | c) & d) | (b & c), 0x8F1BBCDC),
                _ => (b ^ c ^ d, 0xCA62C1D6),
            };

            let t = a
                .rotate_left(5)
                .wrapping_add(f)
                .wrapping_add(e)
                .wrapping_add(k)
                .wrapping_add(w);
            e = d;
            d = c;
            c = b.rotate_left(30);
            b = a;
            a = t;
        }

        for (word, value) in self.state.iter_mut().zip([a, b, c, d, e]) {
            *word = word.wrapping_add(value);
        }
        self.transforms += 1;
    }
}

fn words(buffer: &[u8; BLOCK_SIZE]) -> [u32; 16] {
    let mut block = [0u32; 16];
    for (word, chunk) in block.iter_mut().zip(buffer.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    block
}

/// One-shot SHA-1 of `data`.
pub fn sha1(data: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut hash = Sha1::new();
    hash.update(data);
    hash.finish()
}
