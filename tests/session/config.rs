//! Configuration applied by a session.

use crate::common::*;
use keyhold::{KeyholdConfig, Output, Session, CONFIG_FILE_NAME};

#[test]
fn configured_limits_apply_to_new_envs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "max_readers = 7\nmax_dbs = 3\nmap_size = 2097152\n").unwrap();
    let config = KeyholdConfig::from_file(&path).unwrap();

    let mut s = Session::with_config(config);
    let data = tempfile::tempdir().unwrap();
    let env = mint(&mut s, "lmdb env");
    eval(
        &mut s,
        &format!("{} open -path {}", env, data.path().to_str().unwrap()),
    )
    .unwrap();

    assert_eq!(
        eval(&mut s, &format!("{} get_maxreaders", env)).unwrap(),
        Output::Uint(7)
    );
    match eval(&mut s, &format!("{} info", env)).unwrap() {
        Output::EnvInfo(info) => assert_eq!(info.map_size, 2097152),
        other => panic!("unexpected {:?}", other),
    }
    for name in ["a", "b", "c"] {
        mint(&mut s, &format!("lmdb open -env {} -name {} -create 1", env, name));
    }
    let err = eval(&mut s, &format!("lmdb open -env {} -name d -create 1", env)).unwrap_err();
    assert_eq!(err.engine_kind(), Some(keyhold::EngineErrorKind::DbsFull));
}

#[test]
fn caller_overrides_config() {
    let mut s = Session::with_config(KeyholdConfig {
        max_readers: Some(7),
        ..KeyholdConfig::default()
    });
    let data = tempfile::tempdir().unwrap();
    let env = mint(&mut s, "lmdb env");
    eval(&mut s, &format!("{} set_maxreaders 9", env)).unwrap();
    eval(
        &mut s,
        &format!("{} open -path {}", env, data.path().to_str().unwrap()),
    )
    .unwrap();
    assert_eq!(
        eval(&mut s, &format!("{} get_maxreaders", env)).unwrap(),
        Output::Uint(9)
    );
}

#[test]
fn bad_config_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "file_mode = \"rw\"\n").unwrap();
    let err = KeyholdConfig::from_file(&path).unwrap_err();
    assert_eq!(err.category(), keyhold::ErrorCategory::Config);
}
