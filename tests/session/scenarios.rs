//! End-to-end scenarios a host script would run.

use crate::common::*;
use keyhold::{EngineErrorKind, ErrorCategory, Output, Value};

#[test]
fn scenario_put_in_one_txn_read_in_another() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);

    let t = mint(&mut s, &format!("{} txn", env));
    let d = mint(&mut s, &format!("lmdb open -env {} -txn {} -name data -create 1", env, t));
    eval(&mut s, &format!("{} commit", t)).unwrap();

    let t2 = mint(&mut s, &format!("{} txn", env));
    eval(&mut s, &format!("{} put a 1 -txn {}", d, t2)).unwrap();
    eval(&mut s, &format!("{} commit", t2)).unwrap();

    let t3 = mint(&mut s, &format!("{} txn -readonly 1", env));
    let got = eval(&mut s, &format!("{} get a -txn {}", d, t3)).unwrap();
    assert_eq!(bytes(got), b"1");
    eval(&mut s, &format!("{} abort", t3)).unwrap();
}

#[test]
fn scenario_cursor_enumerates_in_byte_order() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let d = mint(&mut s, &format!("lmdb open -env {} -name data -create 1", env));
    let t = mint(&mut s, &format!("{} txn", env));
    for key in ["b", "a", "ab", "B"] {
        eval(&mut s, &format!("{} put {} v -txn {}", d, key, t)).unwrap();
    }
    let c = mint(&mut s, &format!("{} cursor -txn {}", d, t));

    let mut keys = Vec::new();
    let mut op = "-first";
    loop {
        match eval(&mut s, &format!("{} get {}", c, op)) {
            Ok(Output::Pair { key, .. }) => keys.push(String::from_utf8(key).unwrap()),
            Err(e) => {
                assert_eq!(e.category(), ErrorCategory::Engine);
                assert_eq!(e.engine_kind(), Some(EngineErrorKind::NotFound));
                break;
            }
            Ok(other) => panic!("unexpected {:?}", other),
        }
        op = "-next";
    }
    assert_eq!(keys, vec!["B", "a", "ab", "b"]);

    eval(&mut s, &format!("{} close", c)).unwrap();
    eval(&mut s, &format!("{} commit", t)).unwrap();
}

#[test]
fn scenario_empty_data_deletes_all_duplicates() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let d = mint(
        &mut s,
        &format!("lmdb open -env {} -name dups -create 1 -dupsort 1", env),
    );
    let t = mint(&mut s, &format!("{} txn", env));
    for v in ["x", "y", "z"] {
        eval(&mut s, &format!("{} put k {} -txn {}", d, v, t)).unwrap();
    }
    eval(&mut s, &format!("{} put other v -txn {}", d, t)).unwrap();

    let c = mint(&mut s, &format!("{} cursor -txn {}", d, t));
    eval(&mut s, &format!("{} get -set k", c)).unwrap();
    assert_eq!(eval(&mut s, &format!("{} count", c)).unwrap(), Output::Uint(3));
    eval(&mut s, &format!("{} close", c)).unwrap();

    // Explicit empty data word
    s.eval(&[
        Value::from(d.as_str()),
        Value::from("del"),
        Value::from("k"),
        Value::from(""),
        Value::from("-txn"),
        Value::from(t.as_str()),
    ])
    .unwrap();

    let err = eval(&mut s, &format!("{} get k -txn {}", d, t)).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(bytes(eval(&mut s, &format!("{} get other -txn {}", d, t)).unwrap()), b"v");
    eval(&mut s, &format!("{} commit", t)).unwrap();
}

#[test]
fn scenario_env_close_does_not_cascade() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let d = mint(&mut s, &format!("lmdb open -env {} -name data -create 1", env));
    let t = mint(&mut s, &format!("{} txn", env));

    eval(&mut s, &format!("{} close", env)).unwrap();
    assert!(!s.is_exposed(&env));

    eval(&mut s, &format!("{} put k v -txn {}", d, t)).unwrap();
    assert_eq!(bytes(eval(&mut s, &format!("{} get k -txn {}", d, t)).unwrap()), b"v");
    eval(&mut s, &format!("{} commit", t)).unwrap();
}
