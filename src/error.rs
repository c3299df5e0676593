// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Failures reported by the store and the authenticator facade.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Error {
    /// All credential slots are occupied
    NoSpace,
    /// The index does not name a live credential
    NotFound,
    /// Name longer than [`KEY_NAME_MAX`](crate::KEY_NAME_MAX) bytes
    NameTooLong,
    /// Secret longer than [`KEY_SECRET_MAX`](crate::KEY_SECRET_MAX) bytes, or its
    /// Base32 text longer than [`KEY_SECRET_ENCODED_MAX`](crate::KEY_SECRET_ENCODED_MAX)
    SecretTooLong,
    /// Secret text contains a character outside the Base32 alphabet
    InvalidBase32,
    /// Unknown credential kind byte
    InvalidKind,
    /// Time sample of the wrong size
    InvalidTimeSample,
    /// No time sample was received yet
    ClockNotSet,
    /// The holder has not confirmed the current time
    TimeNotVerified,
    /// The HOTP counter cannot be advanced any further
    CounterOverflow,
}

/// Result type of this crate
pub type Result<T = ()> = core::result::Result<T, Error>;

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let message = match self {
            Error::NoSpace => "no free credential slot",
            Error::NotFound => "credential not found",
            Error::NameTooLong => "name too long",
            Error::SecretTooLong => "secret too long",
            Error::InvalidBase32 => "invalid base32 secret",
            Error::InvalidKind => "invalid credential kind",
            Error::InvalidTimeSample => "invalid time sample",
            Error::ClockNotSet => "clock not set",
            Error::TimeNotVerified => "time not verified",
            Error::CounterOverflow => "counter overflow",
        };
        f.write_str(message)
    }
}
