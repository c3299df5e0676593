#![no_main]

// Copyright (C) 2023 Nitrokey GmbH
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use libfuzzer_sys::fuzz_target;

use otp_app::{Authenticator, Options, RamMedium, Reply, KEYS_MAX};

mod frames;

fuzz_target!(|data: &[u8]| {
    let mut app = Authenticator::new(RamMedium::new(), Options::default());

    for frame in frames::parse(data) {
        if let Some(command) = frames::command(frame) {
            if let Ok(Reply::Credentials(indices)) = app.respond(command) {
                assert_eq!(indices.len(), app.store().count());
                assert!(indices.iter().all(|index| app.store().exists(*index)));
                assert!(indices
                    .windows(2)
                    .all(|pair| app.store().name(pair[0]).as_slice()
                        <= app.store().name(pair[1]).as_slice()));
            }
            assert!(app.store().count() <= KEYS_MAX);
        }
    }
});
