// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Civil time for the time confirmation screen.

use core::fmt::{self, Write};

use heapless::String;
use serde::{Deserialize, Serialize};

/// Capacity of [`LocalTime::confirmation_prompt`]
pub const PROMPT_MAX: usize = 64;

const SECONDS_PER_DAY: u64 = 86_400;
const DAYS_4YEARS: u64 = 1461;
const DAYS_100YEARS: u64 = 36524;
const DAYS_400YEARS: u64 = 146_097;

const MONTH_DAYS: [u64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const MONTH_DAYS_LEAP: [u64; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const MONTH_NAMES: [&str; 12] = [
    "Jan.", "Feb.", "Mar.", "Apr.", "May", "Jun.", "Jul.", "Aug.", "Sept.", "Oct.", "Nov.", "Dec.",
];

/// Gregorian leap year rule
pub const fn is_leap_year(year: u64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Time zone offset split into sign and magnitude.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct UtcOffset {
    /// West of UTC
    pub negative: bool,
    /// Whole hours
    pub hours: u32,
    /// 0 to 59
    pub minutes: u8,
    /// 0 to 59, not shown
    pub seconds: u8,
}

impl UtcOffset {
    /// Split an offset given in seconds.
    pub fn from_seconds(offset: i32) -> Self {
        let magnitude = offset.unsigned_abs();
        Self {
            negative: offset < 0,
            hours: magnitude / 3600,
            minutes: (magnitude / 60 % 60) as u8,
            seconds: (magnitude % 60) as u8,
        }
    }
}

/// Wall clock time at some UTC offset.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LocalTime {
    /// Gregorian year, 1970 or later
    pub year: u64,
    /// 1 to 12
    pub month: u8,
    /// 1 to 31
    pub day: u8,
    /// 0 to 23
    pub hour: u8,
    /// 0 to 59
    pub minute: u8,
    /// 0 to 59
    pub second: u8,
    /// `year` is a leap year
    pub leap_year: bool,
    pub offset: UtcOffset,
}

/// Decompose `unix_seconds` shifted by `utc_offset` seconds into civil time.
///
/// A local time before the epoch is clamped to the epoch.
pub fn localtime(unix_seconds: u64, utc_offset: i32) -> LocalTime {
    let local = unix_seconds.saturating_add_signed(i64::from(utc_offset));

    let mut days = local / SECONDS_PER_DAY;
    let seconds = local % SECONDS_PER_DAY;

    let mut year = 1970 + days / DAYS_400YEARS * 400;
    days %= DAYS_400YEARS;

    // a century counted from a year ending in 70 holds the leap day of its
    // xx00 year only if that year is divisible by 400
    loop {
        let length = match (year + 30) % 400 == 0 {
            true => DAYS_100YEARS + 1,
            false => DAYS_100YEARS,
        };
        if days < length {
            break;
        }
        days -= length;
        year += 100;
    }

    loop {
        let length = match is_leap_year(year + 2) {
            true => DAYS_4YEARS,
            false => DAYS_4YEARS - 1,
        };
        if days < length {
            break;
        }
        days -= length;
        year += 4;
    }

    let mut leap_year = is_leap_year(year);
    loop {
        let length = if leap_year { 366 } else { 365 };
        if days < length {
            break;
        }
        days -= length;
        year += 1;
        leap_year = is_leap_year(year);
    }

    let table = if leap_year { &MONTH_DAYS_LEAP } else { &MONTH_DAYS };
    let mut month = 0;
    while days >= table[month] {
        days -= table[month];
        month += 1;
    }

    LocalTime {
        year,
        month: month as u8 + 1,
        day: days as u8 + 1,
        hour: (seconds / 3600) as u8,
        minute: (seconds / 60 % 60) as u8,
        second: (seconds % 60) as u8,
        leap_year,
        offset: UtcOffset::from_seconds(utc_offset),
    }
}

/// `fmt::Write` into a byte buffer, silently dropping what does not fit.
struct Truncating<'a> {
    buffer: &'a mut [u8],
    written: usize,
}

impl<'a> Truncating<'a> {
    fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, written: 0 }
    }
}

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let free = &mut self.buffer[self.written..];
        let n = core::cmp::min(free.len(), s.len());
        free[..n].copy_from_slice(&s.as_bytes()[..n]);
        self.written += n;
        match n == s.len() {
            true => Ok(()),
            false => Err(fmt::Error),
        }
    }
}

fn format_into(buffer: &mut [u8], args: fmt::Arguments<'_>) -> usize {
    let mut writer = Truncating::new(buffer);
    writer.write_fmt(args).ok();
    writer.written
}

impl LocalTime {
    /// Month name as shown to the holder.
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[usize::from(self.month - 1)]
    }

    /// `D Mon YYYY`, e.g. `1 Jan. 1970`. Returns the bytes written, truncating to `buffer`.
    pub fn format_date(&self, buffer: &mut [u8]) -> usize {
        format_into(
            buffer,
            format_args!("{} {} {}", self.day, self.month_name(), self.year),
        )
    }

    /// `HH:MM:SS`. Returns the bytes written, truncating to `buffer`.
    pub fn format_time(&self, buffer: &mut [u8]) -> usize {
        format_into(
            buffer,
            format_args!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second),
        )
    }

    /// `UTC+HH:MM` or `UTC-HH:MM`. Returns the bytes written, truncating to `buffer`.
    pub fn format_timezone(&self, buffer: &mut [u8]) -> usize {
        let sign = if self.offset.negative { '-' } else { '+' };
        format_into(
            buffer,
            format_args!(
                "UTC{}{:02}:{:02}",
                sign, self.offset.hours, self.offset.minutes
            ),
        )
    }

    /// Question asked before TOTP codes are released.
    pub fn confirmation_prompt(&self) -> String<PROMPT_MAX> {
        let mut buffer = [0u8; PROMPT_MAX];
        let mut len = format_into(&mut buffer, format_args!("Is this the correct time?\n"));
        len += self.format_date(&mut buffer[len..]);
        len += format_into(&mut buffer[len..], format_args!("\n"));
        len += self.format_time(&mut buffer[len..]);
        len += format_into(&mut buffer[len..], format_args!(" "));
        len += self.format_timezone(&mut buffer[len..]);

        let mut prompt = String::new();
        if let Ok(text) = core::str::from_utf8(&buffer[..len]) {
            prompt.push_str(text).ok();
        }
        prompt
    }
}
