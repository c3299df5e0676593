// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::medium::Medium;
use crate::store::Store;
use crate::time::{localtime, LocalTime};

/// Size of an encoded [`TimeSample`]
pub const TIME_SAMPLE_SIZE: usize = 12;

/// Current time as pushed by the host.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TimeSample {
    /// UNIX time in seconds
    pub unix_seconds: u64,
    /// Seconds to add to UTC to get the holder's wall clock
    pub utc_offset: i32,
}

impl TimeSample {
    /// The sample as wall clock time.
    pub fn local(&self) -> LocalTime {
        localtime(self.unix_seconds, self.utc_offset)
    }
}

/// Host encoding: big-endian `u64` seconds followed by big-endian `i32` offset.
impl TryFrom<&[u8]> for TimeSample {
    type Error = Error;
    fn try_from(data: &[u8]) -> Result<Self> {
        if data.len() != TIME_SAMPLE_SIZE {
            return Err(Error::InvalidTimeSample);
        }
        let mut seconds = [0u8; 8];
        let mut offset = [0u8; 4];
        seconds.copy_from_slice(&data[..8]);
        offset.copy_from_slice(&data[8..]);
        Ok(Self {
            unix_seconds: u64::from_be_bytes(seconds),
            utc_offset: i32::from_be_bytes(offset),
        })
    }
}

/// Volatile state, lost on power cycle.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Runtime {
    /// Latest time sample, if the host sent one
    pub clock: Option<TimeSample>,
    /// Gets set once the holder confirmed the displayed time,
    /// and cleared on reset.
    pub time_verified: bool,
}

impl Runtime {
    /// Forget the clock and its confirmation.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The clock, once it is set and confirmed.
    pub fn verified_clock(&self) -> Result<TimeSample> {
        let clock = self.clock.ok_or(Error::ClockNotSet)?;
        match self.time_verified {
            true => Ok(clock),
            false => Err(Error::TimeNotVerified),
        }
    }
}

#[derive(Debug)]
pub struct State<M> {
    pub runtime: Runtime,
    pub store: Store<M>,
}

impl<M: Medium> State<M> {
    pub fn new(medium: M) -> Self {
        Self {
            runtime: Runtime::default(),
            store: Store::new(medium),
        }
    }
}
