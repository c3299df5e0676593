// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use otp_app::command::{Register, Rename, Select, SetCounter, SetKind, SetSecret};
use otp_app::{Command, Kind, TimeSample};

pub fn parse(data: &[u8]) -> Vec<&[u8]> {
    // Parse incoming data into slices from format:
    // Size N (1 bytes)
    // Value (N bytes)

    let mut res = Vec::with_capacity(100);
    if data.len() < 2 || data.len() > 1024 * 1024 {
        // Too big or too small data found at this point. Skip it.
        return vec![];
    }

    let mut data = data;
    loop {
        if 2 >= data.len() {
            break;
        }
        let (size, rest) = data.split_at(1);
        data = rest;

        let size = size[0] as usize;
        if size >= data.len() {
            break;
        }
        let (v, rest) = data.split_at(size);
        data = rest;
        res.push(v);
    }
    res
}

fn kind(byte: u8) -> Kind {
    match byte & 1 {
        0 => Kind::Totp,
        _ => Kind::Hotp,
    }
}

/// Frame: instruction (1 byte), then its arguments.
/// Slot indices are taken modulo 80 to also hit the out-of-range path.
pub fn command(frame: &[u8]) -> Option<Command<'_>> {
    let (&instruction, args) = frame.split_first()?;
    let index = || args.first().map(|byte| byte % 80);

    Some(match instruction % 14 {
        0 => {
            let (&flags, rest) = args.split_first()?;
            let name_len = usize::from(flags >> 1).min(rest.len());
            let (name, secret) = rest.split_at(name_len);
            Command::Register(Register {
                name,
                secret,
                kind: kind(flags),
            })
        }
        1 => Command::Delete(Select { index: index()? }),
        2 => Command::Rename(Rename {
            index: index()?,
            name: &args[1..],
        }),
        3 => Command::SetSecret(SetSecret {
            index: index()?,
            secret: &args[1..],
        }),
        4 => {
            let mut counter = [0u8; 8];
            let bytes = args.get(1..9)?;
            counter.copy_from_slice(bytes);
            Command::SetCounter(SetCounter {
                index: index()?,
                counter: u64::from_be_bytes(counter),
            })
        }
        5 => Command::SetKind(SetKind {
            index: index()?,
            kind: kind(*args.get(1)?),
        }),
        6 => Command::Calculate(Select { index: index()? }),
        7 => Command::Validate(Select { index: index()? }),
        8 => Command::GetCredential(Select { index: index()? }),
        9 => Command::ListCredentials,
        10 => Command::SetTime(TimeSample::try_from(args).ok()?),
        11 => Command::VerifyTime,
        12 => Command::ConfirmTime(args.first().map_or(false, |byte| byte & 1 == 1)),
        _ => Command::Reset,
    })
}
