//! Environment command handlers, plus `lmdb env` and `lmdb version`.

use std::rc::Rc;

use keyhold_core::{Error, HandleKind, Result};
use keyhold_engine::{flags, version as engine_version, Env};
use tracing::{info, warn};

use super::validate_text;
use crate::lifecycle::{EnvShared, Resource};
use crate::options::FlagSet;
use crate::{Output, Session};

// =============================================================================
// Root
// =============================================================================

/// Handle `lmdb env`: create an environment and apply configured limits.
pub fn create(s: &mut Session) -> Result<Output> {
    let raw = Env::create()?;
    if let Err(e) = apply_limits(s, raw) {
        // SAFETY: never registered, so nothing else can reach it.
        unsafe { raw.close() };
        return Err(e);
    }
    let shared = EnvShared::new(raw);
    let token = s.expose(HandleKind::Environment, None, Resource::Env(shared))?;
    Ok(Output::Handle(token))
}

fn apply_limits(s: &Session, raw: Env) -> Result<()> {
    let config = s.config();
    // SAFETY: freshly created, not yet opened.
    unsafe {
        if let Some(size) = config.map_size {
            raw.set_map_size(map_size(size)?)?;
        }
        if let Some(readers) = config.max_readers {
            raw.set_max_readers(readers)?;
        }
        if let Some(dbs) = config.max_dbs {
            raw.set_max_dbs(dbs)?;
        }
    }
    Ok(())
}

fn map_size(size: u64) -> Result<usize> {
    usize::try_from(size)
        .map_err(|_| Error::invalid_argument("size", format!("{} exceeds the address space", size)))
}

/// Handle `lmdb version ?-string?`.
pub fn version(as_string: bool) -> Output {
    let v = engine_version();
    if as_string {
        Output::VersionString(v.text)
    } else {
        Output::Version {
            major: v.major,
            minor: v.minor,
            patch: v.patch,
        }
    }
}

// =============================================================================
// Environment
// =============================================================================

/// Handle `E open`.
///
/// Configured defaults fill in any flag the caller left alone. The outcome
/// is recorded whether or not the engine succeeds: a failed open leaves the
/// environment defunct.
pub fn open(
    s: &mut Session,
    env: &str,
    path: &str,
    mode: Option<u32>,
    open_flags: FlagSet,
    reverse_key: Option<bool>,
) -> Result<Output> {
    validate_text("-path", path)?;
    let shared = s.env(env)?;
    let raw = shared.created(env, "open")?;

    let config = s.config();
    let default_flags = if config.legacy_fixedmap {
        flags::env::FIXEDMAP
    } else {
        0
    };
    let bits = open_flags.over(default_flags);
    let mode = mode.unwrap_or(config.file_mode);
    let db_defaults = if reverse_key.unwrap_or(false) {
        flags::db::REVERSEKEY
    } else {
        0
    };

    // SAFETY: the environment is in the Created state.
    let result = unsafe { raw.open(path, bits, mode) };
    shared.opened(&result, bits, db_defaults);
    result.map(|_| Output::Unit)
}

/// Handle `E set_mapsize`.
pub fn set_map_size(s: &mut Session, env: &str, size: u64) -> Result<Output> {
    let size = map_size(size)?;
    let raw = s.env(env)?.usable(env, "set_mapsize")?;
    // SAFETY: the environment is created or open, never defunct.
    unsafe { raw.set_map_size(size)? };
    Ok(Output::Unit)
}

/// Handle `E set_maxreaders`.
pub fn set_max_readers(s: &mut Session, env: &str, readers: u32) -> Result<Output> {
    let raw = s.env(env)?.usable(env, "set_maxreaders")?;
    // SAFETY: as above; the engine refuses once the environment is open.
    unsafe { raw.set_max_readers(readers)? };
    Ok(Output::Unit)
}

/// Handle `E set_maxdbs`.
pub fn set_max_dbs(s: &mut Session, env: &str, dbs: u32) -> Result<Output> {
    let raw = s.env(env)?.usable(env, "set_maxdbs")?;
    // SAFETY: as above.
    unsafe { raw.set_max_dbs(dbs)? };
    Ok(Output::Unit)
}

/// Handle `E sync`. `force = false` does nothing.
pub fn sync(s: &mut Session, env: &str, force: bool) -> Result<Output> {
    let raw = s.env(env)?.active(env, "sync")?;
    if force {
        // SAFETY: the environment is open.
        unsafe { raw.sync(true)? };
    }
    Ok(Output::Unit)
}

/// Handle `E stat`.
pub fn stat(s: &mut Session, env: &str) -> Result<Output> {
    let raw = s.env(env)?.active(env, "stat")?;
    // SAFETY: the environment is open.
    let stat = unsafe { raw.stat()? };
    Ok(Output::Stat(stat))
}

/// Handle `E info`.
pub fn info(s: &mut Session, env: &str) -> Result<Output> {
    let raw = s.env(env)?.active(env, "info")?;
    // SAFETY: the environment is open.
    let info = unsafe { raw.info()? };
    Ok(Output::EnvInfo(info))
}

/// Handle `E copy`.
pub fn copy(s: &mut Session, env: &str, path: &str, compact: bool) -> Result<Output> {
    validate_text("path", path)?;
    let raw = s.env(env)?.active(env, "copy")?;
    let bits = if compact { flags::copy::COMPACT } else { 0 };
    // SAFETY: the environment is open.
    unsafe { raw.copy(path, bits)? };
    Ok(Output::Unit)
}

/// Handle `E get_path`.
pub fn get_path(s: &mut Session, env: &str) -> Result<Output> {
    let raw = s.env(env)?.active(env, "get_path")?;
    // SAFETY: the environment is open.
    let path = unsafe { raw.path()? };
    Ok(Output::Path(path))
}

/// Handle `E get_maxreaders`.
pub fn get_max_readers(s: &mut Session, env: &str) -> Result<Output> {
    let raw = s.env(env)?.usable(env, "get_maxreaders")?;
    // SAFETY: the environment is created or open.
    let readers = unsafe { raw.max_readers()? };
    Ok(Output::Uint(u64::from(readers)))
}

/// Handle `E get_maxkeysize`.
pub fn get_max_key_size(s: &mut Session, env: &str) -> Result<Output> {
    let raw = s.env(env)?.usable(env, "get_maxkeysize")?;
    // SAFETY: the environment is created or open.
    let size = unsafe { raw.max_key_size() };
    Ok(Output::Uint(u64::try_from(size).unwrap_or(0)))
}

/// Handle `E close`.
///
/// The token is gone immediately. The native close runs once no database,
/// transaction or cursor record refers to the environment any more.
pub fn close(s: &mut Session, env: &str) -> Result<Output> {
    let shared = s.env(env)?;
    s.forget(env);
    shared.request_close();
    let dependents = Rc::strong_count(&shared) - 1;
    if dependents > 0 {
        warn!(
            target: "keyhold::session",
            token = env,
            dependents,
            "environment closed with open dependents; native close deferred"
        );
    } else {
        info!(target: "keyhold::session", token = env, "environment closed");
    }
    Ok(Output::Unit)
}
