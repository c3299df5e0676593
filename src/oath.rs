use core::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How the moving factor of a credential is obtained.
///
/// The discriminant is the byte persisted in the slot, so an all-zero slot reads as TOTP.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Kind {
    /// Time based, moving factor is `unix_seconds / period`
    #[default]
    Totp = 0x00,
    /// Event based, moving factor is the stored counter
    Hotp = 0x01,
}

impl TryFrom<u8> for Kind {
    type Error = Error;
    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            0x00 => Kind::Totp,
            0x01 => Kind::Hotp,
            _ => return Err(Error::InvalidKind),
        })
    }
}

impl From<Kind> for u8 {
    fn from(kind: Kind) -> Self {
        kind as u8
    }
}

impl Kind {
    /// The other kind, as offered by the edit-type screen.
    pub fn toggled(self) -> Self {
        match self {
            Kind::Totp => Kind::Hotp,
            Kind::Hotp => Kind::Totp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_encoding() {
        assert_eq!(Kind::try_from(0), Ok(Kind::Totp));
        assert_eq!(Kind::try_from(1), Ok(Kind::Hotp));
        assert_eq!(Kind::try_from(0x20), Err(Error::InvalidKind));
        assert_eq!(u8::from(Kind::Hotp), 1);
        assert_eq!(Kind::default(), Kind::Totp);
        assert_eq!(Kind::Totp.toggled(), Kind::Hotp);
    }
}
