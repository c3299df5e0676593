// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persistent memory the credential store lives in.

use crate::store::STORAGE_SIZE;

/// Byte addressable persistent memory with write-through commits.
///
/// Every `commit` is one write cycle of the underlying flash; a commit that
/// returned is durable.
pub trait Medium {
    /// Copy `buffer.len()` bytes starting at `address` into `buffer`.
    fn read(&self, address: usize, buffer: &mut [u8]);
    /// Durably replace the bytes starting at `address` with `data`.
    fn commit(&mut self, address: usize, data: &[u8]);
}

impl<M: Medium + ?Sized> Medium for &mut M {
    fn read(&self, address: usize, buffer: &mut [u8]) {
        (**self).read(address, buffer)
    }
    fn commit(&mut self, address: usize, data: &[u8]) {
        (**self).commit(address, data)
    }
}

/// Zero initialized in-memory medium, for hosts and tests.
///
/// Records the number of commits and can simulate a power loss that drops
/// every commit after a given count.
#[derive(Clone)]
pub struct RamMedium {
    bytes: [u8; STORAGE_SIZE],
    commits: usize,
    power_fails_after: Option<usize>,
}

impl core::fmt::Debug for RamMedium {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.debug_struct("RamMedium")
            .field("commits", &self.commits)
            .field("power_fails_after", &self.power_fails_after)
            .finish()
    }
}

impl Default for RamMedium {
    fn default() -> Self {
        Self::new()
    }
}

impl RamMedium {
    /// Blank medium
    pub const fn new() -> Self {
        Self {
            bytes: [0; STORAGE_SIZE],
            commits: 0,
            power_fails_after: None,
        }
    }

    /// Number of commits that reached the medium.
    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Raw contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Drop every commit after the next `commits` ones.
    pub fn fail_after(&mut self, commits: usize) {
        self.power_fails_after = Some(self.commits + commits);
    }

    /// Power is back: commits reach the medium again.
    pub fn restore_power(&mut self) {
        self.power_fails_after = None;
    }
}

impl Medium for RamMedium {
    fn read(&self, address: usize, buffer: &mut [u8]) {
        buffer.copy_from_slice(&self.bytes[address..][..buffer.len()]);
    }

    fn commit(&mut self, address: usize, data: &[u8]) {
        if let Some(limit) = self.power_fails_after {
            if self.commits >= limit {
                return;
            }
        }
        self.bytes[address..][..data.len()].copy_from_slice(data);
        self.commits += 1;
    }
}
