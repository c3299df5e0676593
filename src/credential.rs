use heapless::Vec;
use heapless_bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::decimal::DECIMAL_MAX;
use crate::error::{Error, Result};
use crate::{base32, decimal, ensure, oath, KEY_NAME_MAX, KEY_SECRET_ENCODED_MAX, KEY_SECRET_MAX};

/// Display label of a credential, not necessarily UTF-8
pub type KeyName = Bytes<KEY_NAME_MAX>;
/// Raw HMAC key of a credential
pub type KeySecret = Bytes<KEY_SECRET_MAX>;

/// One credential slot.
///
/// A slot with `exists == false` is a tombstone; its other fields carry no meaning.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Credential {
    /// Live credential or tombstone
    #[serde(rename = "E")]
    pub exists: bool,
    /// TOTP or HOTP
    #[serde(rename = "K")]
    pub kind: oath::Kind,
    /// Label shown in the key list
    #[serde(rename = "N")]
    pub name: KeyName,
    /// Decoded secret
    #[serde(rename = "S")]
    pub secret: KeySecret,
    /// HOTP moving factor, unused for TOTP
    #[serde(rename = "C")]
    pub counter: u64,
}

impl Credential {
    /// Live credential, checking the capacity of name and secret.
    pub fn new(name: &[u8], secret: &[u8], kind: oath::Kind, counter: u64) -> Result<Self> {
        ensure(name.len() <= KEY_NAME_MAX, Error::NameTooLong)?;
        ensure(secret.len() <= KEY_SECRET_MAX, Error::SecretTooLong)?;
        Ok(Self {
            exists: true,
            kind,
            name: Bytes::from_slice(name).map_err(|_| Error::NameTooLong)?,
            secret: Bytes::from_slice(secret).map_err(|_| Error::SecretTooLong)?,
            counter,
        })
    }

    /// The all-zero record written on delete.
    pub fn tombstone() -> Self {
        Self::default()
    }

    /// Name as text, if it is valid UTF-8.
    pub fn name_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.name).ok()
    }

    /// Secret as Base32 text, for the edit-secret screen.
    pub fn secret_base32(&self) -> Vec<u8, KEY_SECRET_ENCODED_MAX> {
        let mut text = [0u8; KEY_SECRET_ENCODED_MAX];
        let len = base32::encode(&self.secret, &mut text);
        Vec::from_slice(&text[..len]).unwrap_or_default()
    }

    /// Counter as decimal text, for the edit-counter screen.
    pub fn counter_decimal(&self) -> Vec<u8, DECIMAL_MAX> {
        let mut text = [0u8; DECIMAL_MAX];
        let len = decimal::encode(self.counter, &mut text);
        Vec::from_slice(&text[..len]).unwrap_or_default()
    }
}
