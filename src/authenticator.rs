// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use heapless::{String, Vec};

use crate::calculate::{otp6, totp_counter, Code};
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::medium::Medium;
use crate::oath::Kind;
use crate::state::{Runtime, State};
use crate::store::Store;
use crate::time::PROMPT_MAX;
use crate::{
    base32, command, ensure, Command, DEFAULT_KEY_NAME, INITIAL_HOTP_COUNTER, KEYS_MAX,
    KEY_NAME_MAX, KEY_SECRET_ENCODED_MAX, KEY_SECRET_MAX, TOTP_PERIOD_SECONDS,
};

/// The options for the authenticator app.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct Options {
    /// TOTP time step in seconds, must not be zero (default: 30).
    pub period: u64,

    /// HOTP counter a freshly registered credential starts at (default: 1).
    pub initial_counter: u64,

    /// Name given to credentials registered or renamed without one.
    pub default_name: &'static [u8],
}

impl Options {
    /// Create new [Options] instance.
    pub const fn new(period: u64, initial_counter: u64, default_name: &'static [u8]) -> Self {
        assert!(period > 0, "TOTP period must not be zero");
        Self {
            period,
            initial_counter,
            default_name,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new(
            TOTP_PERIOD_SECONDS,
            INITIAL_HOTP_COUNTER,
            DEFAULT_KEY_NAME.as_bytes(),
        )
    }
}

/// Successful outcome of a [`Command`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reply {
    /// Nothing to report
    Done,
    /// Slot of the registered credential
    Registered(u8),
    /// One-time code
    Code(Code),
    /// Live credential indices, ordered by name
    Credentials(Vec<u8, KEYS_MAX>),
    /// A full record
    Credential(Credential),
    /// Text for the holder to confirm
    Prompt(String<PROMPT_MAX>),
}

/// The OTP authenticator app.
pub struct Authenticator<M> {
    options: Options,
    state: State<M>,
}

impl<M> core::fmt::Debug for Authenticator<M> {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.debug_struct("Authenticator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<M: Medium> Authenticator<M> {
    /// Wrap a medium. Nothing is written until the first request.
    pub fn new(medium: M, options: Options) -> Self {
        Self {
            state: State::new(medium),
            options,
        }
    }

    /// Set up the credential store on a blank medium.
    pub fn init(&mut self) {
        self.state.store.initialize();
    }

    /// The credential store
    pub fn store(&self) -> &Store<M> {
        &self.state.store
    }

    /// The volatile state
    pub fn runtime(&self) -> &Runtime {
        &self.state.runtime
    }

    /// Give back the medium
    pub fn into_medium(self) -> M {
        self.state.store.into_medium()
    }

    /// Execute one request of the menu layer.
    pub fn respond(&mut self, command: Command<'_>) -> Result<Reply> {
        let result = self.inner_respond(command);
        if let Err(_error) = &result {
            warn_now!("{:?} failed: {:?}", command, _error);
        }
        result
    }

    fn inner_respond(&mut self, command: Command<'_>) -> Result<Reply> {
        info_now!("{:?}", &command);

        // Lazy init: make sure the store is set up
        self.init();

        match command {
            Command::Register(register) => self.register(register),
            Command::Delete(select) => self.delete(select),
            Command::Rename(rename) => self.rename(rename),
            Command::SetSecret(set_secret) => self.set_secret(set_secret),
            Command::SetCounter(set_counter) => self.set_counter(set_counter),
            Command::SetKind(set_kind) => self.set_kind(set_kind),
            Command::Calculate(select) => self.calculate(select),
            Command::Validate(select) => self.validate(select),
            Command::GetCredential(select) => self.get_credential(select),
            Command::ListCredentials => Ok(Reply::Credentials(self.state.store.sorted_indices())),
            Command::SetTime(sample) => {
                self.state.runtime.clock = Some(sample);
                Ok(Reply::Done)
            }
            Command::VerifyTime => {
                let clock = self.state.runtime.clock.ok_or(Error::ClockNotSet)?;
                Ok(Reply::Prompt(clock.local().confirmation_prompt()))
            }
            Command::ConfirmTime(confirmed) => {
                ensure(self.state.runtime.clock.is_some(), Error::ClockNotSet)?;
                self.state.runtime.time_verified = confirmed;
                Ok(Reply::Done)
            }
            Command::Reset => self.reset(),
        }
    }

    fn live(&self, index: u8) -> Result<u8> {
        ensure(
            (index as usize) < KEYS_MAX && self.state.store.exists(index),
            Error::NotFound,
        )?;
        Ok(index)
    }

    fn name_or_default<'a>(&self, name: &'a [u8]) -> Result<&'a [u8]> {
        ensure(name.len() <= KEY_NAME_MAX, Error::NameTooLong)?;
        Ok(match name.is_empty() {
            true => self.options.default_name,
            false => name,
        })
    }

    fn decode_secret(text: &[u8]) -> Result<Vec<u8, KEY_SECRET_MAX>> {
        ensure(text.len() <= KEY_SECRET_ENCODED_MAX, Error::SecretTooLong)?;
        base32::validate(text)?;

        let mut secret = [0u8; KEY_SECRET_MAX];
        let len = base32::decode(text, &mut secret);
        Vec::from_slice(&secret[..len]).map_err(|_| Error::SecretTooLong)
    }

    fn register(&mut self, register: command::Register<'_>) -> Result<Reply> {
        // check capacity before any work on the input
        ensure(self.state.store.count() < KEYS_MAX, Error::NoSpace)?;

        let name = self.name_or_default(register.name)?;
        let secret = Self::decode_secret(register.secret)?;
        let credential =
            Credential::new(name, &secret, register.kind, self.options.initial_counter)?;

        let index = self.state.store.create(&credential)?;
        Ok(Reply::Registered(index))
    }

    fn delete(&mut self, delete: command::Select) -> Result<Reply> {
        let index = self.live(delete.index)?;
        self.state.store.delete(index);
        Ok(Reply::Done)
    }

    fn rename(&mut self, rename: command::Rename<'_>) -> Result<Reply> {
        let index = self.live(rename.index)?;
        let name = self.name_or_default(rename.name)?;
        if self.state.store.has_name(index, name) {
            debug_now!("name unchanged, skipping write");
        } else {
            self.state.store.set_name(index, name);
        }
        Ok(Reply::Done)
    }

    fn set_secret(&mut self, set_secret: command::SetSecret<'_>) -> Result<Reply> {
        let index = self.live(set_secret.index)?;
        let secret = Self::decode_secret(set_secret.secret)?;
        self.state.store.set_secret(index, &secret);
        Ok(Reply::Done)
    }

    fn set_counter(&mut self, set_counter: command::SetCounter) -> Result<Reply> {
        let index = self.live(set_counter.index)?;
        if self.state.store.counter(index) != set_counter.counter {
            self.state.store.set_counter(index, set_counter.counter);
        }
        Ok(Reply::Done)
    }

    fn set_kind(&mut self, set_kind: command::SetKind) -> Result<Reply> {
        let index = self.live(set_kind.index)?;
        if self.state.store.kind(index) != set_kind.kind {
            self.state.store.set_kind(index, set_kind.kind);
        }
        Ok(Reply::Done)
    }

    fn calculate(&mut self, calculate: command::Select) -> Result<Reply> {
        let index = self.live(calculate.index)?;
        let secret = self.state.store.secret(index);

        let code = match self.state.store.kind(index) {
            Kind::Hotp => {
                let counter = self.state.store.counter(index);
                // Do abort with error on the max value, so the same code is never handed out twice
                let next = counter.checked_add(1).ok_or(Error::CounterOverflow)?;
                let code = otp6(&secret, counter);
                self.state.store.set_counter(index, next);
                code
            }
            Kind::Totp => {
                let clock = self.state.runtime.verified_clock()?;
                otp6(&secret, totp_counter(clock.unix_seconds, self.options.period))
            }
        };
        Ok(Reply::Code(code))
    }

    fn validate(&mut self, validate: command::Select) -> Result<Reply> {
        let index = self.live(validate.index)?;
        Ok(Reply::Code(otp6(&self.state.store.secret(index), 0)))
    }

    fn get_credential(&mut self, get_credential: command::Select) -> Result<Reply> {
        let index = self.live(get_credential.index)?;
        Ok(Reply::Credential(self.state.store.credential(index)))
    }

    fn reset(&mut self) -> Result<Reply> {
        self.state.store.wipe_all();
        self.state.runtime.reset();
        debug_now!(":: reset over");
        Ok(Reply::Done)
    }
}
