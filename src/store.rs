// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-capacity credential table on a persistent [`Medium`].
//!
//! Layout: one `initialized` byte, padded to 64 bytes, followed by [`KEYS_MAX`]
//! slots of [`SLOT_SIZE`] bytes. Each mutation commits exactly the bytes of the
//! fields it changes, keeping flash wear low.

use core::convert::TryFrom;

use heapless::Vec;
use heapless_bytes::Bytes;

use crate::credential::{Credential, KeyName, KeySecret};
use crate::error::{Error, Result};
use crate::medium::Medium;
use crate::oath::Kind;
use crate::{KEYS_MAX, KEY_NAME_MAX, KEY_SECRET_MAX};

const INITIALIZED_ADDRESS: usize = 0;
const SLOTS_ADDRESS: usize = 64;
/// Bytes reserved per credential slot
pub const SLOT_SIZE: usize = 64;
/// Bytes of persistent memory a [`Store`] needs
pub const STORAGE_SIZE: usize = SLOTS_ADDRESS + KEYS_MAX * SLOT_SIZE;

const NAME_FIELD_SIZE: usize = 1 + KEY_NAME_MAX;
const SECRET_FIELD_SIZE: usize = 1 + KEY_SECRET_MAX;

/// Independently committed part of a slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
    /// `u64`, little endian
    Counter,
    /// one byte, non-zero when live
    Exists,
    /// one byte, see [`Kind`]
    Kind,
    /// length byte followed by the zero padded name
    Name,
    /// length byte followed by the zero padded secret
    Secret,
}

impl Field {
    /// Offset inside the slot
    pub const fn offset(self) -> usize {
        match self {
            Field::Counter => 0,
            Field::Exists => 8,
            Field::Kind => 9,
            Field::Name => 10,
            Field::Secret => 10 + NAME_FIELD_SIZE,
        }
    }

    /// Size in bytes
    pub const fn size(self) -> usize {
        match self {
            Field::Counter => 8,
            Field::Exists | Field::Kind => 1,
            Field::Name => NAME_FIELD_SIZE,
            Field::Secret => SECRET_FIELD_SIZE,
        }
    }

    /// Address of this field of slot `index`
    pub fn address(self, index: u8) -> usize {
        debug_assert!((index as usize) < KEYS_MAX);
        SLOTS_ADDRESS + index as usize * SLOT_SIZE + self.offset()
    }
}

fn length_prefixed<const N: usize>(data: &[u8]) -> [u8; N] {
    debug_assert!(data.len() < N);
    let mut field = [0u8; N];
    field[0] = data.len() as u8;
    field[1..][..data.len()].copy_from_slice(data);
    field
}

fn from_length_prefixed<const N: usize>(field: &[u8]) -> Bytes<N> {
    let len = core::cmp::min(field[0] as usize, N);
    Bytes::from_slice(&field[1..][..len]).unwrap_or_default()
}

/// The credential table.
///
/// Indices passed to the accessors and mutators must be below [`KEYS_MAX`];
/// operations other than [`Store::create`] do not check whether the slot is live.
pub struct Store<M> {
    medium: M,
    // Count commits to the medium. Development only.
    #[cfg(feature = "devel-counters")]
    counter_commits: u32,
}

impl<M> core::fmt::Debug for Store<M> {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.debug_struct("Store").finish_non_exhaustive()
    }
}

impl<M: Medium> Store<M> {
    /// Open the table kept on `medium`.
    pub fn new(medium: M) -> Self {
        Self {
            medium,
            #[cfg(feature = "devel-counters")]
            counter_commits: 0,
        }
    }

    /// The underlying medium
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// The underlying medium, mutably
    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    /// Give back the underlying medium
    pub fn into_medium(self) -> M {
        self.medium
    }

    fn commit(&mut self, address: usize, data: &[u8]) {
        self.medium.commit(address, data);
        #[cfg(feature = "devel-counters")]
        {
            self.counter_commits += 1;
            debug_now!("Commits to the medium: {}", self.counter_commits);
        }
    }

    fn commit_field(&mut self, index: u8, field: Field, data: &[u8]) {
        debug_assert_eq!(data.len(), field.size());
        self.commit(field.address(index), data);
    }

    fn read_field<const N: usize>(&self, index: u8, field: Field) -> [u8; N] {
        debug_assert_eq!(N, field.size());
        let mut buffer = [0u8; N];
        self.medium.read(field.address(index), &mut buffer);
        buffer
    }

    /// Whether the table was set up on this medium.
    pub fn is_initialized(&self) -> bool {
        let mut flag = [0u8];
        self.medium.read(INITIALIZED_ADDRESS, &mut flag);
        flag[0] != 0
    }

    /// Mark the table as set up. Writes only on the first call.
    pub fn initialize(&mut self) {
        if !self.is_initialized() {
            info_now!("initializing credential store");
            self.commit(INITIALIZED_ADDRESS, &[1]);
        }
    }

    /// Whether slot `index` holds a live credential.
    pub fn exists(&self, index: u8) -> bool {
        let [exists] = self.read_field::<1>(index, Field::Exists);
        exists != 0
    }

    /// Kind of slot `index`; an unknown byte reads as TOTP.
    pub fn kind(&self, index: u8) -> Kind {
        let [kind] = self.read_field::<1>(index, Field::Kind);
        Kind::try_from(kind).unwrap_or_else(|_| {
            warn_now!("slot {} holds unknown kind {}", index, kind);
            Kind::Totp
        })
    }

    /// HOTP counter of slot `index`.
    pub fn counter(&self, index: u8) -> u64 {
        u64::from_le_bytes(self.read_field::<8>(index, Field::Counter))
    }

    /// Name of slot `index`.
    pub fn name(&self, index: u8) -> KeyName {
        from_length_prefixed(&self.read_field::<NAME_FIELD_SIZE>(index, Field::Name))
    }

    /// Secret of slot `index`.
    pub fn secret(&self, index: u8) -> KeySecret {
        from_length_prefixed(&self.read_field::<SECRET_FIELD_SIZE>(index, Field::Secret))
    }

    /// The whole record of slot `index`.
    pub fn credential(&self, index: u8) -> Credential {
        Credential {
            exists: self.exists(index),
            kind: self.kind(index),
            name: self.name(index),
            secret: self.secret(index),
            counter: self.counter(index),
        }
    }

    /// Store `credential` in the lowest free slot and return its index.
    ///
    /// The `exists` marker is committed last, so an interrupted create leaves the slot free.
    pub fn create(&mut self, credential: &Credential) -> Result<u8> {
        let index = (0..KEYS_MAX as u8)
            .find(|index| !self.exists(*index))
            .ok_or(Error::NoSpace)?;

        self.set_counter(index, credential.counter);
        self.set_kind(index, credential.kind);
        self.set_name(index, &credential.name);
        self.set_secret(index, &credential.secret);
        self.commit_field(index, Field::Exists, &[1]);

        info_now!("created credential in slot {}", index);
        Ok(index)
    }

    /// Replace slot `index` with the all-zero record.
    pub fn delete(&mut self, index: u8) {
        self.zero_slot(index);
        info_now!("deleted credential in slot {}", index);
    }

    fn zero_slot(&mut self, index: u8) {
        debug_assert!((index as usize) < KEYS_MAX);
        self.commit(SLOTS_ADDRESS + index as usize * SLOT_SIZE, &[0; SLOT_SIZE]);
    }

    /// Commit a new name, at most [`KEY_NAME_MAX`] bytes.
    pub fn set_name(&mut self, index: u8, name: &[u8]) {
        let field: [u8; NAME_FIELD_SIZE] = length_prefixed(name);
        self.commit_field(index, Field::Name, &field);
    }

    /// Commit a new secret, at most [`KEY_SECRET_MAX`] bytes.
    pub fn set_secret(&mut self, index: u8, secret: &[u8]) {
        let field: [u8; SECRET_FIELD_SIZE] = length_prefixed(secret);
        self.commit_field(index, Field::Secret, &field);
    }

    /// Commit a new HOTP counter.
    pub fn set_counter(&mut self, index: u8, counter: u64) {
        self.commit_field(index, Field::Counter, &counter.to_le_bytes());
    }

    /// Commit a new kind.
    pub fn set_kind(&mut self, index: u8, kind: Kind) {
        self.commit_field(index, Field::Kind, &[kind.into()]);
    }

    /// Number of live credentials.
    pub fn count(&self) -> usize {
        (0..KEYS_MAX as u8).filter(|index| self.exists(*index)).count()
    }

    /// Whether the name of slot `index` equals `name` byte for byte.
    pub fn has_name(&self, index: u8, name: &[u8]) -> bool {
        self.name(index).as_slice() == name
    }

    /// Indices of the live credentials, ordered by name.
    ///
    /// Names compare byte-wise, a prefix sorts before its extensions, and equal
    /// names keep ascending index order.
    pub fn sorted_indices(&self) -> Vec<u8, KEYS_MAX> {
        let mut entries: Vec<(u8, KeyName), KEYS_MAX> = Vec::new();
        for index in 0..KEYS_MAX as u8 {
            if self.exists(index) {
                entries.push((index, self.name(index))).ok();
            }
        }

        // insertion sort, stable
        for i in 1..entries.len() {
            let mut j = i;
            while j > 0 && entries[j - 1].1.as_slice() > entries[j].1.as_slice() {
                entries.swap(j - 1, j);
                j -= 1;
            }
        }

        entries.iter().map(|(index, _)| *index).collect()
    }

    /// Zero every slot. The table stays initialized.
    pub fn wipe_all(&mut self) {
        info_now!(":: wipe - delete all credentials");
        for index in 0..KEYS_MAX as u8 {
            self.zero_slot(index);
        }
        self.initialize();
        debug_now!(":: wipe over");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::RamMedium;

    fn credential(name: &[u8]) -> Credential {
        Credential::new(name, b"12345678901234567890", Kind::Hotp, 1).unwrap()
    }

    fn slot(store: &Store<RamMedium>, index: u8) -> &[u8] {
        let start = SLOTS_ADDRESS + index as usize * SLOT_SIZE;
        &store.medium().as_bytes()[start..][..SLOT_SIZE]
    }

    #[test]
    fn layout_fits_slot() {
        assert_eq!(Field::Secret.offset() + Field::Secret.size(), 52);
        assert!(Field::Secret.offset() + Field::Secret.size() <= SLOT_SIZE);
        assert_eq!(STORAGE_SIZE, 4160);
    }

    #[test]
    fn fresh_medium_is_empty() {
        let store = Store::new(RamMedium::new());
        assert!(!store.is_initialized());
        assert_eq!(store.count(), 0);
        assert!(store.sorted_indices().is_empty());
    }

    #[test]
    fn create_reads_back() {
        let mut store = Store::new(RamMedium::new());
        let expected = credential(b"github");
        let index = store.create(&expected).unwrap();
        assert_eq!(index, 0);
        assert_eq!(store.credential(index), expected);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn create_fills_lowest_free_slot() {
        let mut store = Store::new(RamMedium::new());
        for expected in 0..3 {
            assert_eq!(store.create(&credential(b"k")), Ok(expected));
        }
        store.delete(1);
        assert_eq!(store.create(&credential(b"again")), Ok(1));
        assert_eq!(store.create(&credential(b"next")), Ok(3));
    }

    #[test]
    fn full_store_reports_no_space() {
        let mut store = Store::new(RamMedium::new());
        for _ in 0..KEYS_MAX {
            store.create(&credential(b"k")).unwrap();
        }
        let commits = store.medium().commits();
        assert_eq!(store.create(&credential(b"one more")), Err(Error::NoSpace));
        assert_eq!(store.medium().commits(), commits);
        assert_eq!(store.count(), KEYS_MAX);
    }

    #[test]
    fn delete_zeroes_the_slot() {
        let mut store = Store::new(RamMedium::new());
        let index = store.create(&credential(b"gone")).unwrap();
        store.delete(index);
        assert!(slot(&store, index).iter().all(|byte| *byte == 0));
        assert_eq!(store.credential(index), Credential::tombstone());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn field_updates_commit_once_and_touch_only_their_bytes() {
        let mut store = Store::new(RamMedium::new());
        let index = store.create(&credential(b"github")).unwrap();
        let before = slot(&store, index).to_vec();
        let commits = store.medium().commits();

        store.set_counter(index, 0x0102_0304_0506_0708);
        assert_eq!(store.medium().commits(), commits + 1);
        let after = slot(&store, index).to_vec();
        for (offset, (a, b)) in before.iter().zip(after.iter()).enumerate() {
            if offset >= Field::Counter.size() {
                assert_eq!(a, b, "byte {} changed", offset);
            }
        }
        assert_eq!(store.counter(index), 0x0102_0304_0506_0708);
        assert_eq!(&after[..8], &[8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn set_name_pads_with_zeroes() {
        let mut store = Store::new(RamMedium::new());
        let index = store.create(&credential(b"a much longer name")).unwrap();
        store.set_name(index, b"short");
        let field = &slot(&store, index)[Field::Name.offset()..][..Field::Name.size()];
        assert_eq!(field[0], 5);
        assert_eq!(&field[1..6], b"short");
        assert!(field[6..].iter().all(|byte| *byte == 0));
        assert!(store.has_name(index, b"short"));
        assert!(!store.has_name(index, b"shorter"));
        assert!(!store.has_name(index, b"a much longer name"));
    }

    #[test]
    fn set_secret_and_kind() {
        let mut store = Store::new(RamMedium::new());
        let index = store.create(&credential(b"k")).unwrap();
        store.set_secret(index, b"abc");
        store.set_kind(index, Kind::Totp);
        assert_eq!(store.secret(index).as_slice(), b"abc");
        assert_eq!(store.kind(index), Kind::Totp);
        assert_eq!(store.name(index).as_slice(), b"k");
    }

    #[test]
    fn sorted_by_name_with_stable_ties() {
        let mut store = Store::new(RamMedium::new());
        for name in [&b"mail"[..], b"bank", b"ma", b"bank", b"Zed", b""] {
            store.create(&credential(name)).unwrap();
        }
        store.delete(0);
        assert_eq!(store.sorted_indices().as_slice(), &[5, 4, 1, 3, 2]);
    }

    #[test]
    fn uppercase_sorts_first() {
        let mut store = Store::new(RamMedium::new());
        for name in [&b"Bob"[..], b"alice", b"Amy"] {
            store.create(&credential(name)).unwrap();
        }
        let names: std::vec::Vec<std::vec::Vec<u8>> = store
            .sorted_indices()
            .iter()
            .map(|index| store.name(*index).as_slice().to_vec())
            .collect();
        assert_eq!(names, [b"Amy".to_vec(), b"Bob".to_vec(), b"alice".to_vec()]);
    }

    #[test]
    fn create_then_delete_restores_count() {
        let mut store = Store::new(RamMedium::new());
        store.create(&credential(b"a")).unwrap();
        let count = store.count();
        let index = store.create(&credential(b"b")).unwrap();
        store.delete(index);
        assert!(!store.exists(index));
        assert_eq!(store.count(), count);
    }

    #[test]
    fn wipe_all_is_idempotent() {
        let mut store = Store::new(RamMedium::new());
        store.create(&credential(b"a")).unwrap();
        store.wipe_all();
        let once = store.medium().as_bytes().to_vec();
        store.wipe_all();
        assert_eq!(store.medium().as_bytes(), &once[..]);
    }

    #[test]
    fn wipe_all_empties_and_initializes() {
        let mut store = Store::new(RamMedium::new());
        store.create(&credential(b"a")).unwrap();
        store.create(&credential(b"b")).unwrap();
        store.wipe_all();
        assert_eq!(store.count(), 0);
        assert!(store.is_initialized());
        assert!(store.medium().as_bytes()[SLOTS_ADDRESS..]
            .iter()
            .all(|byte| *byte == 0));

        let commits = store.medium().commits();
        store.initialize();
        assert_eq!(store.medium().commits(), commits);
    }

    #[test]
    fn interrupted_create_leaves_slot_free() {
        let mut store = Store::new(RamMedium::new());
        store.medium_mut().fail_after(3);
        store.create(&credential(b"lost")).unwrap();
        store.medium_mut().restore_power();

        assert!(!store.exists(0));
        assert_eq!(store.count(), 0);
        assert_eq!(store.create(&credential(b"kept")), Ok(0));
        assert_eq!(store.credential(0), credential(b"kept"));
    }

    #[test]
    fn unknown_kind_reads_as_totp() {
        let mut medium = RamMedium::new();
        medium.commit(Field::Kind.address(2), &[0x7f]);
        let store = Store::new(medium);
        assert_eq!(store.kind(2), Kind::Totp);
    }
}
