// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::hmac::hmac_sha1;
use crate::sha1::DIGEST_SIZE;

/// Number of digits of every generated code
pub const CODE_DIGITS: usize = 6;

const CODE_MODULUS: u32 = 1_000_000;

/// A six digit one-time code, zero padded ASCII.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct Code([u8; CODE_DIGITS]);

impl Code {
    fn from_value(mut value: u32) -> Self {
        let mut digits = [b'0'; CODE_DIGITS];
        for digit in digits.iter_mut().rev() {
            *digit = b'0' + (value % 10) as u8;
            value /= 10;
        }
        Self(digits)
    }

    /// ASCII digits
    pub fn as_bytes(&self) -> &[u8; CODE_DIGITS] {
        &self.0
    }

    /// Digits as text
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Numeric value of the code
    pub fn value(&self) -> u32 {
        self.0
            .iter()
            .fold(0, |value, digit| value * 10 + u32::from(digit - b'0'))
    }
}

impl core::fmt::Display for Code {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::fmt::Debug for Code {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Code({})", self.as_str())
    }
}

/// Dynamic truncation of RFC 4226, reduced to six digits.
pub fn extract6(digest: &[u8; DIGEST_SIZE]) -> Code {
    let offset = (digest[DIGEST_SIZE - 1] & 0xf) as usize;
    let truncated = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    Code::from_value(truncated % CODE_MODULUS)
}

/// HOTP code of `secret` at `counter` (big-endian counter as the MAC message).
pub fn otp6(secret: &[u8], counter: u64) -> Code {
    extract6(&hmac_sha1(secret, &counter.to_be_bytes()))
}

/// TOTP moving factor for a UNIX time. `period` must not be zero.
pub fn totp_counter(unix_seconds: u64, period: u64) -> u64 {
    unix_seconds / period
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const RFC_SECRET: &[u8] = b"12345678901234567890";

    #[test]
    fn rfc4226_codes() {
        let expected = [
            "755224", "287082", "359152", "969429", "338314", "254676", "287922", "162583",
            "399871", "520489",
        ];
        for (counter, code) in expected.iter().enumerate() {
            assert_eq!(otp6(RFC_SECRET, counter as u64).as_str(), *code);
        }
    }

    #[test]
    fn rfc4226_truncation_example() {
        let digest = hex!("1f8698690e02ca16618550ef7f19da8e945b555a");
        assert_eq!(extract6(&digest).as_str(), "872921");
    }

    #[test]
    fn rfc6238_sha1_six_digits() {
        for (time, code) in [
            (59, "287082"),
            (1111111109, "081804"),
            (1111111111, "050471"),
            (1234567890, "005924"),
            (2000000000, "279037"),
            (20000000000, "353130"),
        ] {
            assert_eq!(otp6(RFC_SECRET, totp_counter(time, 30)).as_str(), code);
        }
    }

    #[test]
    fn zero_padding_and_value() {
        let code = Code::from_value(42);
        assert_eq!(code.as_bytes(), b"000042");
        assert_eq!(code.value(), 42);
        assert_eq!(format!("{}", code), "000042");
    }

    #[test]
    fn highest_offset_stays_in_bounds() {
        let mut digest = [0xffu8; DIGEST_SIZE];
        digest[19] = 0x0f;
        // bytes 15..=18, top bit masked
        assert_eq!(extract6(&digest).as_str(), "483647");
    }
}
