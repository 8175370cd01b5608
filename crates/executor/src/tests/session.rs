//! Session tests: token minting, resolution and the registry.

use super::*;
use crate::{Error, HandleKind};

// =============================================================================
// Tokens
// =============================================================================

#[test]
fn test_tokens_follow_kind_and_parent() {
    let mut s = test_session();
    let (env, _dir) = open_env(&mut s);
    assert_eq!(env, "env0");

    let dbi = open_db(&mut s, &env, "a", 0);
    assert_eq!(dbi, "dbi0");

    let txn = begin(&mut s, &env, false);
    assert_eq!(txn, "env0.txn0");

    let cursor = handle(s.execute(Command::CursorOpen {
        dbi: dbi.clone(),
        txn: txn.clone(),
    }));
    assert_eq!(cursor, "dbi0.c0");

    let mut kinds = s.handles();
    kinds.sort();
    assert_eq!(
        kinds,
        vec![
            ("dbi0".to_string(), HandleKind::Database),
            ("dbi0.c0".to_string(), HandleKind::Cursor),
            ("env0".to_string(), HandleKind::Environment),
            ("env0.txn0".to_string(), HandleKind::Transaction),
        ]
    );
}

#[test]
fn test_tokens_are_never_reused() {
    let mut s = test_session();
    let env = handle(s.execute(Command::EnvCreate));
    s.execute(Command::EnvClose { env: env.clone() }).unwrap();
    let next = handle(s.execute(Command::EnvCreate));
    assert_eq!(env, "env0");
    assert_eq!(next, "env1");
    assert!(!s.is_exposed("env0"));
    assert!(s.is_exposed("env1"));
}

#[test]
fn test_failed_creation_consumes_no_token() {
    let mut s = test_session();
    let (env, _dir) = open_env(&mut s);
    // No -create on a database that doesn't exist
    let err = s
        .execute(Command::DbiOpen {
            env: env.clone(),
            txn: None,
            name: Some("missing".into()),
            flags: FlagSet::default(),
        })
        .unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);
    assert_eq!(s.handles().len(), 1);

    assert_eq!(open_db(&mut s, &env, "present", 0), "dbi0");
}

#[test]
fn test_sessions_are_isolated() {
    let mut a = test_session();
    let mut b = test_session();
    let env = handle(a.execute(Command::EnvCreate));
    assert!(b.execute(Command::EnvStat { env: env.clone() }).is_err());
    assert!(!b.is_exposed(&env));
    // b mints its own env0
    assert_eq!(handle(b.execute(Command::EnvCreate)), env);
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_unknown_token() {
    let mut s = test_session();
    let err = s
        .execute(Command::TxnCommit {
            txn: "env9.txn9".into(),
        })
        .unwrap_err();
    assert_eq!(
        err,
        Error::UnknownHandle {
            token: "env9.txn9".into(),
            expected: Some(HandleKind::Transaction),
        }
    );
}

#[test]
fn test_wrong_kind_is_unknown_handle() {
    let mut s = test_session();
    let (env, _dir) = open_env(&mut s);
    let err = s.execute(Command::TxnCommit { txn: env }).unwrap_err();
    assert!(matches!(
        err,
        Error::UnknownHandle {
            expected: Some(HandleKind::Transaction),
            ..
        }
    ));
}

// =============================================================================
// Argument checks
// =============================================================================

#[test]
fn test_empty_key_and_data_rejected() {
    let mut s = test_session();
    let (env, _dir) = open_env(&mut s);
    let dbi = open_db(&mut s, &env, "a", 0);
    let txn = begin(&mut s, &env, false);

    assert!(matches!(
        put(&mut s, &dbi, &txn, b"", b"v"),
        Err(Error::InvalidArgument { name, .. }) if name == "key"
    ));
    assert!(matches!(
        put(&mut s, &dbi, &txn, b"k", b""),
        Err(Error::InvalidArgument { name, .. }) if name == "data"
    ));
    assert!(get(&mut s, &dbi, &txn, b"").is_err());
    commit(&mut s, &txn).unwrap();
}

#[test]
fn test_version() {
    let mut s = test_session();
    match s.execute(Command::Version { as_string: false }).unwrap() {
        Output::Version { major, .. } => assert!(major >= 0),
        other => panic!("unexpected {:?}", other),
    }
    match s.execute(Command::Version { as_string: true }).unwrap() {
        Output::VersionString(text) => assert!(text.contains("LMDB")),
        other => panic!("unexpected {:?}", other),
    }
}
