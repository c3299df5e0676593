use crate::oath::Kind;
use crate::state::TimeSample;

/// Request issued by the menu layer, along with its data
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command<'l> {
    /// Register a new credential from typed-in Base32 text.
    Register(Register<'l>),
    /// Delete a credential.
    Delete(Select),
    /// Give a credential another name.
    Rename(Rename<'l>),
    /// Replace the secret from typed-in Base32 text.
    SetSecret(SetSecret<'l>),
    /// Set the HOTP counter.
    SetCounter(SetCounter),
    /// Switch between TOTP and HOTP.
    SetKind(SetKind),
    /// Calculate the current code, advancing the HOTP counter.
    Calculate(Select),
    /// Calculate the code at counter zero, to check a typed-in secret.
    Validate(Select),
    /// Get the full credential record.
    GetCredential(Select),
    /// List credentials ordered by name.
    ListCredentials,
    /// Store the time pushed by the host.
    SetTime(TimeSample),
    /// Get the prompt asking the holder to confirm the time.
    VerifyTime,
    /// Record the holder's answer to the time prompt.
    ConfirmTime(bool),
    /// Delete all credentials and forget the clock.
    Reset,
}

/// Credential addressed by its slot index
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Select {
    /// Slot index
    pub index: u8,
}

/// Data of [`Command::Register`]
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Register<'l> {
    /// empty for the default name
    pub name: &'l [u8],
    /// Base32 text
    pub secret: &'l [u8],
    /// TOTP or HOTP
    pub kind: Kind,
}

impl core::fmt::Debug for Register<'_> {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        fmt.debug_struct("Register")
            .field("name", &hex_str!(&self.name, 20))
            .field("secret (len)", &self.secret.len())
            .field("kind", &self.kind)
            .finish()
    }
}

/// Data of [`Command::Rename`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rename<'l> {
    /// Slot index
    pub index: u8,
    /// New name, empty for the default name
    pub name: &'l [u8],
}

/// Data of [`Command::SetSecret`]
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct SetSecret<'l> {
    /// Slot index
    pub index: u8,
    /// Base32 text
    pub secret: &'l [u8],
}

impl core::fmt::Debug for SetSecret<'_> {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        fmt.debug_struct("SetSecret")
            .field("index", &self.index)
            .field("secret (len)", &self.secret.len())
            .finish()
    }
}

/// Data of [`Command::SetCounter`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SetCounter {
    /// Slot index
    pub index: u8,
    /// New HOTP counter
    pub counter: u64,
}

/// Data of [`Command::SetKind`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SetKind {
    /// Slot index
    pub index: u8,
    /// New kind
    pub kind: Kind,
}
