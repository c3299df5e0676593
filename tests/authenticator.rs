use otp_app::command::{Register, Rename, Select, SetCounter, SetKind, SetSecret};
use otp_app::{
    Authenticator, Command, Error, Kind, Options, RamMedium, Reply, TimeSample, DEFAULT_KEY_NAME,
    KEYS_MAX,
};

// base32 of "12345678901234567890"
const RFC_SECRET: &[u8] = b"GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

fn init_logger() {
    pretty_env_logger::try_init().ok();
}

fn authenticator() -> Authenticator<RamMedium> {
    init_logger();
    Authenticator::new(RamMedium::new(), Options::default())
}

fn register(app: &mut Authenticator<RamMedium>, name: &[u8], kind: Kind) -> u8 {
    match app.respond(Command::Register(Register {
        name,
        secret: RFC_SECRET,
        kind,
    })) {
        Ok(Reply::Registered(index)) => index,
        other => panic!("unexpected {:?}", other),
    }
}

fn code(reply: Result<Reply, Error>) -> String {
    match reply {
        Ok(Reply::Code(code)) => code.to_string(),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
#[should_panic(expected = "TOTP period must not be zero")]
fn zero_totp_period_is_rejected() {
    Options::new(0, 1, b"key");
}

#[test]
fn first_command_initializes_the_store() {
    let mut app = authenticator();
    assert!(!app.store().is_initialized());
    app.respond(Command::ListCredentials).unwrap();
    assert!(app.store().is_initialized());
}

#[test]
fn hotp_codes_advance_the_counter() {
    let mut app = authenticator();
    let index = register(&mut app, b"bank", Kind::Hotp);
    assert_eq!(app.store().counter(index), 1);

    let calculate = Command::Calculate(Select { index });
    assert_eq!(code(app.respond(calculate)), "287082");
    assert_eq!(code(app.respond(calculate)), "359152");
    assert_eq!(app.store().counter(index), 3);
}

#[test]
fn validate_uses_counter_zero_and_keeps_state() {
    let mut app = authenticator();
    let index = register(&mut app, b"bank", Kind::Hotp);
    let commits = app.store().medium().commits();
    assert_eq!(
        code(app.respond(Command::Validate(Select { index }))),
        "755224"
    );
    assert_eq!(app.store().counter(index), 1);
    assert_eq!(app.store().medium().commits(), commits);
}

#[test]
fn hotp_counter_overflow_is_refused() {
    let mut app = authenticator();
    let index = register(&mut app, b"bank", Kind::Hotp);
    app.respond(Command::SetCounter(SetCounter {
        index,
        counter: u64::MAX,
    }))
    .unwrap();
    assert_eq!(
        app.respond(Command::Calculate(Select { index })),
        Err(Error::CounterOverflow)
    );
    assert_eq!(app.store().counter(index), u64::MAX);
}

#[test]
fn totp_requires_a_confirmed_clock() {
    let mut app = authenticator();
    let index = register(&mut app, b"mail", Kind::Totp);
    let calculate = Command::Calculate(Select { index });

    assert_eq!(app.respond(calculate), Err(Error::ClockNotSet));
    assert_eq!(app.respond(Command::VerifyTime), Err(Error::ClockNotSet));
    assert_eq!(app.respond(Command::ConfirmTime(true)), Err(Error::ClockNotSet));

    app.respond(Command::SetTime(TimeSample {
        unix_seconds: 59,
        utc_offset: 0,
    }))
    .unwrap();
    assert_eq!(app.respond(calculate), Err(Error::TimeNotVerified));

    match app.respond(Command::VerifyTime) {
        Ok(Reply::Prompt(prompt)) => assert_eq!(
            prompt.as_str(),
            "Is this the correct time?\n1 Jan. 1970\n00:00:59 UTC+00:00"
        ),
        other => panic!("unexpected {:?}", other),
    }
    app.respond(Command::ConfirmTime(true)).unwrap();
    assert_eq!(code(app.respond(calculate)), "287082");

    // host keeps pushing the time, the confirmation stays
    app.respond(Command::SetTime(TimeSample {
        unix_seconds: 1111111109,
        utc_offset: 3600,
    }))
    .unwrap();
    assert_eq!(code(app.respond(calculate)), "081804");

    app.respond(Command::ConfirmTime(false)).unwrap();
    assert_eq!(app.respond(calculate), Err(Error::TimeNotVerified));
}

#[test]
fn empty_name_becomes_default() {
    let mut app = authenticator();
    let index = register(&mut app, b"", Kind::Totp);
    assert!(app.store().has_name(index, DEFAULT_KEY_NAME.as_bytes()));

    app.respond(Command::Rename(Rename {
        index,
        name: b"work",
    }))
    .unwrap();
    assert!(app.store().has_name(index, b"work"));

    app.respond(Command::Rename(Rename { index, name: b"" }))
        .unwrap();
    assert!(app.store().has_name(index, b"Unnamed Key"));
}

#[test]
fn unchanged_edits_skip_the_write() {
    let mut app = authenticator();
    let index = register(&mut app, b"work", Kind::Hotp);
    let commits = app.store().medium().commits();

    app.respond(Command::Rename(Rename {
        index,
        name: b"work",
    }))
    .unwrap();
    app.respond(Command::SetCounter(SetCounter { index, counter: 1 }))
        .unwrap();
    app.respond(Command::SetKind(SetKind {
        index,
        kind: Kind::Hotp,
    }))
    .unwrap();
    assert_eq!(app.store().medium().commits(), commits);

    app.respond(Command::SetKind(SetKind {
        index,
        kind: Kind::Totp,
    }))
    .unwrap();
    assert_eq!(app.store().medium().commits(), commits + 1);
    assert_eq!(app.store().kind(index), Kind::Totp);
}

#[test]
fn input_is_checked_before_storing() {
    let mut app = authenticator();
    let long_name = [b'n'; 21];
    assert_eq!(
        app.respond(Command::Register(Register {
            name: &long_name,
            secret: RFC_SECRET,
            kind: Kind::Totp,
        })),
        Err(Error::NameTooLong)
    );
    assert_eq!(
        app.respond(Command::Register(Register {
            name: b"k",
            secret: b"GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQA",
            kind: Kind::Totp,
        })),
        Err(Error::SecretTooLong)
    );
    assert_eq!(
        app.respond(Command::Register(Register {
            name: b"k",
            secret: b"GEZD GNBV",
            kind: Kind::Totp,
        })),
        Err(Error::InvalidBase32)
    );
    assert_eq!(app.store().count(), 0);
}

#[test]
fn secrets_are_decoded_case_insensitively() {
    let mut app = authenticator();
    let index = register(&mut app, b"k", Kind::Hotp);
    app.respond(Command::SetSecret(SetSecret {
        index,
        secret: b"gezdgnbvgy3tqojqgezdgnbvgy3tqojq",
    }))
    .unwrap();
    assert_eq!(
        app.store().secret(index).as_slice(),
        b"12345678901234567890"
    );
}

#[test]
fn missing_credentials_are_reported() {
    let mut app = authenticator();
    for command in [
        Command::Delete(Select { index: 0 }),
        Command::Calculate(Select { index: 3 }),
        Command::GetCredential(Select { index: 200 }),
    ] {
        assert_eq!(app.respond(command), Err(Error::NotFound));
    }
}

#[test]
fn listing_is_sorted_and_survives_deletes() {
    let mut app = authenticator();
    for name in [&b"mail"[..], b"bank", b"chat"] {
        register(&mut app, name, Kind::Totp);
    }
    app.respond(Command::Delete(Select { index: 1 })).unwrap();
    register(&mut app, b"alpha", Kind::Hotp);

    match app.respond(Command::ListCredentials) {
        Ok(Reply::Credentials(indices)) => assert_eq!(indices.as_slice(), &[1, 2, 0]),
        other => panic!("unexpected {:?}", other),
    }
    match app.respond(Command::GetCredential(Select { index: 1 })) {
        Ok(Reply::Credential(credential)) => {
            assert_eq!(credential.name_str(), Some("alpha"));
            assert_eq!(credential.kind, Kind::Hotp);
            assert_eq!(credential.counter, 1);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn capacity_is_enforced() {
    let mut app = authenticator();
    for _ in 0..KEYS_MAX {
        register(&mut app, b"k", Kind::Totp);
    }
    assert_eq!(
        app.respond(Command::Register(Register {
            name: b"k",
            secret: RFC_SECRET,
            kind: Kind::Totp,
        })),
        Err(Error::NoSpace)
    );
}

#[test]
fn reset_wipes_credentials_and_clock() {
    let mut app = authenticator();
    register(&mut app, b"k", Kind::Totp);
    app.respond(Command::SetTime(TimeSample::default())).unwrap();
    app.respond(Command::ConfirmTime(true)).unwrap();

    app.respond(Command::Reset).unwrap();
    assert_eq!(app.store().count(), 0);
    assert!(app.store().is_initialized());
    assert_eq!(app.runtime().clock, None);
    assert!(!app.runtime().time_verified);
}

#[test]
fn credentials_persist_across_power_cycles() {
    let mut app = authenticator();
    let index = register(&mut app, b"bank", Kind::Hotp);
    app.respond(Command::Calculate(Select { index })).unwrap();
    app.respond(Command::SetTime(TimeSample::default())).unwrap();

    let mut app = Authenticator::new(app.into_medium(), Options::default());
    assert_eq!(app.runtime().clock, None);
    assert_eq!(
        code(app.respond(Command::Calculate(Select { index }))),
        "359152"
    );
}
