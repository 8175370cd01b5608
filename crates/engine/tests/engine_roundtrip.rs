//! Integration tests for the raw engine wrappers
//!
//! These tests drive the C library directly, without the executor's
//! lifecycle bookkeeping:
//! - put/get/commit visibility across transactions
//! - cursor iteration order
//! - dupsort delete-all and cursor count
//! - nested transactions

use keyhold_engine::{dbi, flags, Cursor, Env, Position, Txn};
use tempfile::TempDir;

fn open_env(dir: &TempDir) -> Env {
    let env = Env::create().unwrap();
    unsafe {
        env.set_max_dbs(4).unwrap();
        env.open(dir.path().to_str().unwrap(), 0, 0o664).unwrap();
    }
    env
}

#[test]
fn test_committed_write_visible_to_new_txn() {
    let dir = TempDir::new().unwrap();
    let env = open_env(&dir);
    unsafe {
        let txn = Txn::begin(env, None, false).unwrap();
        let db = dbi::open(txn, None, 0).unwrap();
        dbi::put(txn, db, b"a", b"1", 0).unwrap();
        txn.commit().unwrap();

        let txn = Txn::begin(env, None, true).unwrap();
        assert_eq!(dbi::get(txn, db, b"a").unwrap(), b"1");
        assert!(dbi::get(txn, db, b"b").unwrap_err().is_not_found());
        txn.abort();
        env.close();
    }
}

#[test]
fn test_cursor_walks_in_byte_order() {
    let dir = TempDir::new().unwrap();
    let env = open_env(&dir);
    unsafe {
        let txn = Txn::begin(env, None, false).unwrap();
        let db = dbi::open(txn, None, 0).unwrap();
        for k in [&b"c"[..], b"a", b"b"] {
            dbi::put(txn, db, k, b"x", 0).unwrap();
        }
        let cursor = Cursor::open(txn, db).unwrap();
        let mut keys = vec![cursor.get(Position::First, None, None).unwrap().0];
        loop {
            match cursor.get(Position::Next, None, None) {
                Ok((k, _)) => keys.push(k),
                Err(e) => {
                    assert!(e.is_not_found());
                    break;
                }
            }
        }
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        cursor.close();
        txn.abort();
        env.close();
    }
}

#[test]
fn test_dupsort_delete_all_with_null_data() {
    let dir = TempDir::new().unwrap();
    let env = open_env(&dir);
    unsafe {
        let txn = Txn::begin(env, None, false).unwrap();
        let db = dbi::open(txn, Some("dups"), flags::db::DUPSORT | flags::db::CREATE).unwrap();
        for d in [&b"1"[..], b"2", b"3"] {
            dbi::put(txn, db, b"k", d, 0).unwrap();
        }
        let cursor = Cursor::open(txn, db).unwrap();
        cursor.get(Position::Set, Some(b"k"), None).unwrap();
        assert_eq!(cursor.count().unwrap(), 3);
        cursor.close();

        dbi::del(txn, db, b"k", None).unwrap();
        assert!(dbi::get(txn, db, b"k").unwrap_err().is_not_found());
        assert_eq!(
            flags::db_flag_names(dbi::flags(txn, db).unwrap()),
            vec!["dupsort"]
        );
        txn.abort();
        env.close();
    }
}

#[test]
fn test_nested_txn_sees_parent_writes() {
    let dir = TempDir::new().unwrap();
    let env = open_env(&dir);
    unsafe {
        let parent = Txn::begin(env, None, false).unwrap();
        let db = dbi::open(parent, None, 0).unwrap();
        dbi::put(parent, db, b"p", b"1", 0).unwrap();

        let child = Txn::begin(env, Some(parent), false).unwrap();
        assert_eq!(dbi::get(child, db, b"p").unwrap(), b"1");
        dbi::put(child, db, b"c", b"2", 0).unwrap();
        child.commit().unwrap();

        assert_eq!(dbi::get(parent, db, b"c").unwrap(), b"2");
        parent.abort();
        env.close();
    }
}

#[test]
fn test_reset_and_renew_read_txn() {
    let dir = TempDir::new().unwrap();
    let env = open_env(&dir);
    unsafe {
        let w = Txn::begin(env, None, false).unwrap();
        let db = dbi::open(w, None, 0).unwrap();
        w.commit().unwrap();

        let txn = Txn::begin(env, None, true).unwrap();
        assert!(dbi::get(txn, db, b"k").unwrap_err().is_not_found());
        txn.reset();

        let w = Txn::begin(env, None, false).unwrap();
        dbi::put(w, db, b"k", b"v", 0).unwrap();
        w.commit().unwrap();

        txn.renew().unwrap();
        assert_eq!(dbi::get(txn, db, b"k").unwrap(), b"v");
        txn.abort();
        env.close();
    }
}
