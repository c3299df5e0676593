// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg_attr(not(test), no_std)]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    non_ascii_idents,
    trivial_casts,
    unused,
    unused_qualifications,
    clippy::expect_used,
    clippy::unwrap_used
)]
#![deny(unsafe_code)]

//! OTP App is the credential engine of a hardware one-time-password generator.
//!
//! It keeps up to 64 HOTP/TOTP credentials in a fixed table on persistent memory,
//! computes RFC 4226 six digit codes with its own SHA-1 and HMAC-SHA-1, and
//! turns host provided time samples into a wall clock the holder can confirm.

#[macro_use]
extern crate delog;
generate_macros!();

/// This is the main module, containing the OTP App implementation.
pub mod authenticator;

pub use authenticator::{Authenticator, Options, Reply};
pub mod base32;
mod calculate;
pub use calculate::{extract6, otp6, totp_counter, Code, CODE_DIGITS};
pub mod command;
pub use command::Command;
mod credential;
pub use credential::{Credential, KeyName, KeySecret};
pub mod decimal;
mod error;
pub use error::{Error, Result};
pub mod hmac;
pub mod medium;
pub use medium::{Medium, RamMedium};
mod oath;
pub use oath::Kind;
pub mod sha1;
mod state;
pub use state::{Runtime, TimeSample, TIME_SAMPLE_SIZE};
pub mod store;
pub use store::Store;
pub mod time;

/// Number of credential slots
pub const KEYS_MAX: usize = 64;

/// Longest credential name in bytes
pub const KEY_NAME_MAX: usize = 20;

/// Longest credential secret in bytes
pub const KEY_SECRET_MAX: usize = 20;

/// Longest Base32 text of a secret
pub const KEY_SECRET_ENCODED_MAX: usize = (KEY_SECRET_MAX * 8 + 4) / 5;

/// Default TOTP time step
pub const TOTP_PERIOD_SECONDS: u64 = 30;

/// HOTP counter of a freshly registered credential
pub const INITIAL_HOTP_COUNTER: u64 = 1;

/// Name given to credentials registered without one
pub const DEFAULT_KEY_NAME: &str = "Unnamed Key";

fn ensure<T>(cond: bool, err: T) -> core::result::Result<(), T> {
    match cond {
        true => Ok(()),
        false => Err(err),
    }
}
