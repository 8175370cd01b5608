//! Handle lifecycle through host words.

use crate::common::*;
use keyhold::{Error, Output, Value};

#[test]
fn env_configuration_before_open() {
    let mut s = create_session();
    let dir = tempfile::tempdir().unwrap();
    let env = mint(&mut s, "lmdb env");
    eval(&mut s, &format!("{} set_mapsize 1048576", env)).unwrap();
    eval(&mut s, &format!("{} set_maxreaders 16", env)).unwrap();
    eval(&mut s, &format!("{} set_maxdbs 2", env)).unwrap();
    eval(
        &mut s,
        &format!("{} open -path {} -mode 0o600", env, dir.path().to_str().unwrap()),
    )
    .unwrap();

    match eval(&mut s, &format!("{} get_maxreaders", env)).unwrap() {
        Output::Uint(n) => assert_eq!(n, 16),
        other => panic!("unexpected {:?}", other),
    }
    match eval(&mut s, &format!("{} info", env)).unwrap() {
        Output::EnvInfo(info) => assert_eq!(info.map_size, 1048576),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn env_stat_and_copy() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let d = mint(&mut s, &format!("lmdb open -env {}", env));
    let t = mint(&mut s, &format!("{} txn", env));
    eval(&mut s, &format!("{} put k v -txn {}", d, t)).unwrap();
    eval(&mut s, &format!("{} commit", t)).unwrap();

    let stat = eval(&mut s, &format!("{} stat", env)).unwrap().into_value();
    let Value::List(fields) = stat else {
        panic!("stat should be a list");
    };
    assert_eq!(fields.len(), 6);
    assert_eq!(fields[5], Value::Int(1));

    let backup = tempfile::tempdir().unwrap();
    eval(
        &mut s,
        &format!("{} copy {} -cp_compact 1", env, backup.path().to_str().unwrap()),
    )
    .unwrap();
    assert!(backup.path().join("data.mdb").exists());
    eval(&mut s, &format!("{} sync 1", env)).unwrap();
    eval(&mut s, &format!("{} sync 0", env)).unwrap();
}

#[test]
fn readonly_env_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_str().unwrap().to_string();
    {
        let mut s = create_session();
        let env = mint(&mut s, "lmdb env");
        eval(&mut s, &format!("{} open -path {}", env, path)).unwrap();
        eval(&mut s, &format!("{} close", env)).unwrap();
    }

    let mut s = create_session();
    let env = mint(&mut s, "lmdb env");
    eval(&mut s, &format!("{} open -path {} -readonly 1", env, path)).unwrap();
    let d = mint(&mut s, &format!("lmdb open -env {}", env));
    let err = eval(&mut s, &format!("{} txn", env)).unwrap_err();
    assert_eq!(err.engine_kind(), Some(keyhold::EngineErrorKind::Os));

    let t = mint(&mut s, &format!("{} txn -readonly 1", env));
    assert!(eval(&mut s, &format!("{} get k -txn {}", d, t))
        .unwrap_err()
        .is_not_found());
    eval(&mut s, &format!("{} abort", t)).unwrap();
}

#[test]
fn txn_close_detaches_token() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let t = mint(&mut s, &format!("{} txn", env));
    eval(&mut s, &format!("{} abort", t)).unwrap();
    eval(&mut s, &format!("{} close", t)).unwrap();
    let err = eval(&mut s, &format!("{} id", t)).unwrap_err();
    assert!(matches!(err, Error::UnknownHandle { expected: None, .. }));
}

#[test]
fn cursor_put_del_count() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let d = mint(
        &mut s,
        &format!("lmdb open -env {} -name dups -create 1 -dupsort 1", env),
    );
    let t = mint(&mut s, &format!("{} txn", env));
    let c = mint(&mut s, &format!("{} cursor -txn {}", d, t));
    assert_eq!(c, format!("{}.c0", d));

    eval(&mut s, &format!("{} put k 1", c)).unwrap();
    eval(&mut s, &format!("{} put k 2", c)).unwrap();
    eval(&mut s, &format!("{} get -first", c)).unwrap();
    assert_eq!(eval(&mut s, &format!("{} count", c)).unwrap(), Output::Uint(2));

    eval(&mut s, &format!("{} del", c)).unwrap();
    eval(&mut s, &format!("{} get -first", c)).unwrap();
    assert_eq!(eval(&mut s, &format!("{} count", c)).unwrap(), Output::Uint(1));
    eval(&mut s, &format!("{} del -nodupdata 1", c)).unwrap();
    assert!(eval(&mut s, &format!("{} get -first", c))
        .unwrap_err()
        .is_not_found());

    eval(&mut s, &format!("{} close", c)).unwrap();
    eval(&mut s, &format!("{} commit", t)).unwrap();
}

#[test]
fn drop_delete_then_close() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let d = mint(&mut s, &format!("lmdb open -env {} -name gone -create 1", env));
    let t = mint(&mut s, &format!("{} txn", env));
    eval(&mut s, &format!("{} put k v -txn {}", d, t)).unwrap();
    eval(&mut s, &format!("{} drop 1 -txn {}", d, t)).unwrap();
    eval(&mut s, &format!("{} commit", t)).unwrap();

    let err = eval(&mut s, &format!("lmdb open -env {} -name gone", env)).unwrap_err();
    assert!(err.is_not_found());
    eval(&mut s, &format!("{} close -env {}", d, env)).unwrap();
    assert!(!s.is_exposed(&d));
}

#[test]
fn database_from_aborted_txn_does_not_disturb_reused_slot() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);

    let t = mint(&mut s, &format!("{} txn", env));
    let stale = mint(
        &mut s,
        &format!("lmdb open -env {} -txn {} -name a -create 1", env, t),
    );
    eval(&mut s, &format!("{} abort", t)).unwrap();

    let live = mint(&mut s, &format!("lmdb open -env {} -name b -create 1", env));
    let t = mint(&mut s, &format!("{} txn", env));
    eval(&mut s, &format!("{} put k 1 -txn {}", live, t)).unwrap();
    let err = eval(&mut s, &format!("{} put k 1 -txn {}", stale, t)).unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }));
    eval(&mut s, &format!("{} commit", t)).unwrap();

    eval(&mut s, &format!("{} close -env {}", stale, env)).unwrap();
    assert!(!s.is_exposed(&stale));

    let t = mint(&mut s, &format!("{} txn", env));
    eval(&mut s, &format!("{} put j 2 -txn {}", live, t)).unwrap();
    assert_eq!(
        bytes(eval(&mut s, &format!("{} get k -txn {}", live, t)).unwrap()),
        b"1"
    );
    eval(&mut s, &format!("{} commit", t)).unwrap();
}

#[test]
fn cursor_multiple_positions_take_legacy_operands() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let d = mint(
        &mut s,
        &format!(
            "lmdb open -env {} -name fixed -create 1 -dupsort 1 -dupfixed 1",
            env
        ),
    );
    let t = mint(&mut s, &format!("{} txn", env));
    eval(&mut s, &format!("{} put k aa -txn {}", d, t)).unwrap();
    eval(&mut s, &format!("{} put k bb -txn {}", d, t)).unwrap();
    eval(&mut s, &format!("{} commit", t)).unwrap();

    let r = mint(&mut s, &format!("{} txn -readonly 1", env));
    let c = mint(&mut s, &format!("{} cursor -txn {}", d, r));

    // A fresh cursor starts at the first key and hands back its whole page
    match eval(&mut s, &format!("{} get -next_multiple", c)).unwrap() {
        Output::Pair { data, .. } => assert_eq!(data, b"aabb"),
        other => panic!("unexpected {:?}", other),
    }
    assert!(eval(&mut s, &format!("{} get -next_multiple k aa", c))
        .unwrap_err()
        .is_not_found());

    eval(&mut s, &format!("{} get -set k", c)).unwrap();
    match eval(&mut s, &format!("{} get -get_multiple k aa", c)).unwrap() {
        Output::Pair { data, .. } => assert_eq!(data, b"aabb"),
        other => panic!("unexpected {:?}", other),
    }
    match eval(&mut s, &format!("{} get -get_multiple", c)).unwrap() {
        Output::Pair { data, .. } => assert_eq!(data, b"aabb"),
        other => panic!("unexpected {:?}", other),
    }
    let err = eval(&mut s, &format!("{} get -get_multiple k", c)).unwrap_err();
    assert!(matches!(err, Error::WrongArgs { .. }));

    eval(&mut s, &format!("{} close", c)).unwrap();
    eval(&mut s, &format!("{} abort", r)).unwrap();
}
