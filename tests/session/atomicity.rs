//! Failure atomicity: a failed call leaves the session exactly as it was.

use crate::common::*;
use keyhold::{Error, ErrorCategory};

#[test]
fn failed_env_open_keeps_token_but_mints_nothing() {
    let mut s = create_session();
    let env = mint(&mut s, "lmdb env");
    let before = s.handles();

    let err = eval(&mut s, &format!("{} open -path /nonexistent/keyhold/dir", env)).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Engine);
    assert_eq!(s.handles(), before);
}

#[test]
fn failed_dbi_open_consumes_no_token() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let before = s.handles();

    // Database doesn't exist and -create wasn't given
    let err = eval(&mut s, &format!("lmdb open -env {} -name missing", env)).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(s.handles(), before);
    assert!(!s.is_exposed("dbi0"));

    let d = mint(&mut s, &format!("lmdb open -env {} -name present -create 1", env));
    assert_eq!(d, "dbi0");
}

#[test]
fn failed_txn_begin_consumes_no_token() {
    let mut s = create_session();
    let env = mint(&mut s, "lmdb env");

    // Not open yet
    let err = eval(&mut s, &format!("{} txn", env)).unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }));
    assert_eq!(s.handles().len(), 1);
    assert!(!s.is_exposed(&format!("{}.txn0", env)));
}

#[test]
fn usage_errors_touch_nothing() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let d = mint(&mut s, &format!("lmdb open -env {} -name data -create 1", env));
    let t = mint(&mut s, &format!("{} txn", env));
    let before = s.handles();

    let bad = [
        format!("{} put k -txn {}", d, t),
        format!("{} put k v", d),
        format!("{} put k v -txn {} -bogus 1", d, t),
        format!("{} put k v -txn {} -nooverwrite maybe", d, t),
        format!("{} frobnicate", t),
        format!("{} sync", env),
    ];
    for line in &bad {
        let err = eval(&mut s, line).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Usage, "{} -> {:?}", line, err);
    }
    assert_eq!(s.handles(), before);

    // The transaction is still usable afterwards
    eval(&mut s, &format!("{} put k v -txn {}", d, t)).unwrap();
    eval(&mut s, &format!("{} commit", t)).unwrap();
}

#[test]
fn engine_error_keeps_handles() {
    let mut s = create_session();
    let (env, _dir) = open_env(&mut s);
    let d = mint(&mut s, &format!("lmdb open -env {} -name data -create 1", env));
    let t = mint(&mut s, &format!("{} txn", env));
    eval(&mut s, &format!("{} put k v -txn {}", d, t)).unwrap();

    let err = eval(&mut s, &format!("{} put k w -txn {} -nooverwrite 1", d, t)).unwrap_err();
    assert_eq!(err.engine_kind(), Some(keyhold::EngineErrorKind::KeyExists));
    assert!(s.is_exposed(&t));
    assert!(s.is_exposed(&d));

    assert_eq!(bytes(eval(&mut s, &format!("{} get k -txn {}", d, t)).unwrap()), b"v");
    eval(&mut s, &format!("{} commit", t)).unwrap();
}
