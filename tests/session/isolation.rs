//! Session isolation across threads and within one thread.

use std::thread;

use crate::common::*;
use keyhold::{Error, HandleKind};

#[test]
fn token_from_another_thread_is_unknown() {
    let foreign = thread::spawn(|| {
        let mut s = create_session();
        mint(&mut s, "lmdb env");
        mint(&mut s, "lmdb env")
    })
    .join()
    .unwrap();
    assert_eq!(foreign, "env1");

    let mut s = create_session();
    let err = eval(&mut s, &format!("{} get_maxreaders", foreign)).unwrap_err();
    assert_eq!(
        err,
        Error::UnknownHandle {
            token: foreign,
            expected: None,
        }
    );
}

#[test]
fn threads_mint_independently() {
    let handles: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(|| {
                let mut s = create_session();
                let (env, _dir) = open_env(&mut s);
                let d = mint(&mut s, &format!("lmdb open -env {} -name data -create 1", env));
                let t = mint(&mut s, &format!("{} txn", env));
                eval(&mut s, &format!("{} put k v -txn {}", d, t)).unwrap();
                eval(&mut s, &format!("{} commit", t)).unwrap();
                (env, d, t)
            })
        })
        .collect();

    for h in handles {
        let (env, d, t) = h.join().unwrap();
        assert_eq!(env, "env0");
        assert_eq!(d, "dbi0");
        assert_eq!(t, "env0.txn0");
    }
}

#[test]
fn two_sessions_on_one_thread_are_separate() {
    let mut a = create_session();
    let mut b = create_session();
    let env = mint(&mut a, "lmdb env");
    assert!(a.is_exposed(&env));
    assert!(!b.is_exposed(&env));
    assert!(b.handles().is_empty());
    assert_eq!(a.handles(), vec![(env, HandleKind::Environment)]);
    assert!(eval(&mut b, "env0 close").is_err());
}
