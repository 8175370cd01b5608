//! Option parsing as seen from the host.

use crate::common::*;
use keyhold::{subcommands, Error, HandleKind, Output, Value};
use proptest::prelude::*;

#[test]
fn later_option_wins() {
    let mut s = create_session();
    let dir = tempfile::tempdir().unwrap();
    let env = mint(&mut s, "lmdb env");
    eval(
        &mut s,
        &format!(
            "{} open -path {} -nosync true -nosync false",
            env,
            dir.path().to_str().unwrap()
        ),
    )
    .unwrap();
    let d = mint(
        &mut s,
        &format!("lmdb open -env {} -name x -create 1 -dupsort 1 -dupsort 0", env),
    );
    let t = mint(&mut s, &format!("{} txn -readonly 1", env));
    assert_eq!(
        eval(&mut s, &format!("{} flags -txn {}", d, t)).unwrap(),
        Output::Flags(vec![])
    );
    eval(&mut s, &format!("{} abort", t)).unwrap();
}

#[test]
fn boolean_and_integer_forms() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    for force in ["1", "0", "true", "no", "ON"] {
        eval(&mut s, &format!("{} sync {}", env, force)).unwrap();
    }
    let err = eval(&mut s, &format!("{} sync sometimes", env)).unwrap_err();
    assert!(matches!(err, Error::TypeError { .. }), "got {:?}", err);

    let err = eval(&mut s, &format!("{} set_mapsize -5", env)).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }), "got {:?}", err);
}

#[test]
fn typed_values_accepted_as_words() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let d = mint(&mut s, &format!("lmdb open -env {}", env));
    let t = mint(&mut s, &format!("{} txn", env));

    // Raw bytes and integers travel without string round trips
    s.eval(&[
        Value::from(d.as_str()),
        Value::from("put"),
        Value::Bytes(vec![0, 1, 2]),
        Value::Int(42),
        Value::from("-txn"),
        Value::from(t.as_str()),
        Value::from("-nooverwrite"),
        Value::Bool(true),
    ])
    .unwrap();
    let got = s
        .eval(&[
            Value::from(d.as_str()),
            Value::from("get"),
            Value::Bytes(vec![0, 1, 2]),
            Value::from("-txn"),
            Value::from(t.as_str()),
        ])
        .unwrap();
    assert_eq!(got, Output::Bytes(b"42".to_vec()));
    eval(&mut s, &format!("{} commit", t)).unwrap();
}

#[test]
fn cursor_position_switches() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let d = mint(&mut s, &format!("lmdb open -env {}", env));
    let t = mint(&mut s, &format!("{} txn", env));
    let c = mint(&mut s, &format!("{} cursor -txn {}", d, t));

    let err = eval(&mut s, &format!("{} get -sideways", c)).unwrap_err();
    assert!(matches!(err, Error::UnknownOption { .. }));
    let err = eval(&mut s, &format!("{} get -set", c)).unwrap_err();
    assert!(matches!(err, Error::WrongArgs { .. }));
    let err = eval(&mut s, &format!("{} get -first extra", c)).unwrap_err();
    assert!(matches!(err, Error::WrongArgs { .. }));

    eval(&mut s, &format!("{} close", c)).unwrap();
    eval(&mut s, &format!("{} abort", t)).unwrap();
}

#[test]
fn subcommand_tables_are_complete() {
    assert_eq!(subcommands(None), vec!["env", "open", "version"]);
    assert_eq!(subcommands(Some(HandleKind::Environment)).len(), 13);
    assert_eq!(subcommands(Some(HandleKind::Transaction)).len(), 6);
    assert_eq!(subcommands(Some(HandleKind::Database)).len(), 8);
    assert_eq!(subcommands(Some(HandleKind::Cursor)).len(), 6);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn repeated_readonly_follows_last_value(values in prop::collection::vec(any::<bool>(), 1..6)) {
        let mut s = create_session();
        let (env, _dir) = open_env(&mut s);
        let mut line = format!("{} txn", env);
        for v in &values {
            line.push_str(if *v { " -readonly yes" } else { " -readonly 0" });
        }
        let t = mint(&mut s, &line);

        // Only a read-only transaction can be reset
        let reset = eval(&mut s, &format!("{} reset", t));
        prop_assert_eq!(reset.is_ok(), values[values.len() - 1]);
        eval(&mut s, &format!("{} abort", t)).unwrap();
    }
}
