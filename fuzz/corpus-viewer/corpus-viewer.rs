// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use clap::Parser;

#[path = "../fuzz_targets/frames.rs"]
mod frames;

#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Args {
    #[clap(short, long)]
    file_name: String,
}

use std::fs;

fn main() -> Result<(), std::io::Error> {
    pretty_env_logger::init();
    let args = Args::parse();

    let mut app = otp_app::Authenticator::new(
        otp_app::RamMedium::new(),
        otp_app::Options::default(),
    );

    let data = fs::read(args.file_name)?;

    let commands = frames::parse(data.as_ref());
    for frame in commands {
        if let Some(command) = frames::command(frame) {
            println!(">>> {:?}", command);
            let res = app.respond(command);
            println!("<<< {:?}", res);
        } else {
            println!(">>> (unparsed) {:?}", frame);
        }
    }
    Ok(())
}
