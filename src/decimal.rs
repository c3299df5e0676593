//! Unsigned decimal text for counters.

/// Digits of `u64::MAX`
pub const DECIMAL_MAX: usize = 20;

/// Write `value` most significant digit first, returning the number of digits.
///
/// `dest` must hold the digits; [`DECIMAL_MAX`] bytes always suffice.
pub fn encode(mut value: u64, dest: &mut [u8]) -> usize {
    let mut digits = [0u8; DECIMAL_MAX];
    let mut count = 0;
    loop {
        digits[count] = b'0' + (value % 10) as u8;
        count += 1;
        value /= 10;
        if value == 0 {
            break;
        }
    }

    for (target, digit) in dest[..count].iter_mut().zip(digits[..count].iter().rev()) {
        *target = *digit;
    }
    count
}

/// Parse decimal digits.
///
/// No validation: every byte contributes `byte - b'0'`, and values beyond
/// `u64::MAX` wrap around.
pub fn decode(src: &[u8]) -> u64 {
    src.iter().fold(0u64, |value, byte| {
        value
            .wrapping_mul(10)
            .wrapping_add(u64::from(byte.wrapping_sub(b'0')))
    })
}
