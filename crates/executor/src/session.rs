//! Per-thread session: the registry, the token generator and the router.
//!
//! A [`Session`] is the whole context a host thread needs. It is neither
//! `Send` nor `Sync`: its records hold native pointers and `Rc`s, so a token
//! minted on one thread can never be resolved on another. A second session
//! on the same thread is equally isolated.
//!
//! # Usage
//!
//! ```ignore
//! use keyhold_executor::{Session, Value};
//!
//! let mut session = Session::new();
//! let env = session.eval(&["lmdb".into(), "env".into()])?;
//! let env = env.handle().unwrap().to_string();
//! session.eval(&[env.as_str().into(), "open".into(), "-path".into(), "/tmp/db".into()])?;
//! ```

use std::rc::Rc;

use keyhold_core::{Error, HandleKind, Result, Value};
use keyhold_engine::KeyholdConfig;
use tracing::{debug, warn};

use crate::handlers;
use crate::ids::IdGenerator;
use crate::lifecycle::{CursorRecord, DbiRecord, EnvShared, Resource, TxnShared};
use crate::options;
use crate::registry::{Registry, Rejected};
use crate::router::{self, ROOT_WORD};
use crate::{Command, Output};

/// Per-thread command context.
///
/// Mutation goes through `&mut self`, which serializes every call that can
/// change the registry.
pub struct Session {
    config: KeyholdConfig,
    registry: Registry<Resource>,
    ids: IdGenerator,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session with the default configuration.
    pub fn new() -> Self {
        Self::with_config(KeyholdConfig::default())
    }

    /// Create a session with an explicit configuration.
    pub fn with_config(config: KeyholdConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            ids: IdGenerator::new(),
        }
    }

    /// The configuration this session applies.
    pub fn config(&self) -> &KeyholdConfig {
        &self.config
    }

    /// Evaluate host words: `<lmdb|token> <subcommand> args...`.
    pub fn eval(&mut self, words: &[Value]) -> Result<Output> {
        let head = words
            .first()
            .and_then(options::to_text)
            .ok_or_else(|| Error::wrong_args("command subcommand ?arg ...?"))?;
        let kind = if head == ROOT_WORD {
            None
        } else {
            Some(
                self.registry
                    .kind_of(&head)
                    .ok_or_else(|| Error::unknown_handle(head.as_str(), None))?,
            )
        };
        let cmd = router::parse(&head, kind, words)?;
        self.execute(cmd)
    }

    /// Execute a single typed command.
    pub fn execute(&mut self, cmd: Command) -> Result<Output> {
        match cmd {
            // Root
            Command::EnvCreate => handlers::env::create(self),
            Command::DbiOpen {
                env,
                txn,
                name,
                flags,
            } => handlers::dbi::open(self, &env, txn.as_deref(), name.as_deref(), flags),
            Command::Version { as_string } => Ok(handlers::env::version(as_string)),

            // Environment
            Command::EnvOpen {
                env,
                path,
                mode,
                flags,
                reverse_key,
            } => handlers::env::open(self, &env, &path, mode, flags, reverse_key),
            Command::EnvSetMapSize { env, size } => handlers::env::set_map_size(self, &env, size),
            Command::EnvSetMaxReaders { env, readers } => {
                handlers::env::set_max_readers(self, &env, readers)
            }
            Command::EnvSetMaxDbs { env, dbs } => handlers::env::set_max_dbs(self, &env, dbs),
            Command::EnvSync { env, force } => handlers::env::sync(self, &env, force),
            Command::EnvStat { env } => handlers::env::stat(self, &env),
            Command::EnvInfo { env } => handlers::env::info(self, &env),
            Command::EnvCopy { env, path, compact } => {
                handlers::env::copy(self, &env, &path, compact)
            }
            Command::EnvGetPath { env } => handlers::env::get_path(self, &env),
            Command::EnvGetMaxReaders { env } => handlers::env::get_max_readers(self, &env),
            Command::EnvGetMaxKeySize { env } => handlers::env::get_max_key_size(self, &env),
            Command::EnvClose { env } => handlers::env::close(self, &env),
            Command::TxnBegin {
                env,
                parent,
                read_only,
            } => handlers::txn::begin(self, &env, parent.as_deref(), read_only),

            // Transaction
            Command::TxnAbort { txn } => handlers::txn::abort(self, &txn),
            Command::TxnCommit { txn } => handlers::txn::commit(self, &txn),
            Command::TxnReset { txn } => handlers::txn::reset(self, &txn),
            Command::TxnRenew { txn } => handlers::txn::renew(self, &txn),
            Command::TxnClose { txn } => handlers::txn::close(self, &txn),
            Command::TxnId { txn } => handlers::txn::id(self, &txn),

            // Database
            Command::DbiPut {
                dbi,
                txn,
                key,
                data,
                flags,
            } => handlers::dbi::put(self, &dbi, &txn, &key, &data, flags),
            Command::DbiGet { dbi, txn, key } => handlers::dbi::get(self, &dbi, &txn, &key),
            Command::DbiDel {
                dbi,
                txn,
                key,
                data,
            } => handlers::dbi::del(self, &dbi, &txn, &key, data.as_deref()),
            Command::DbiDrop { dbi, txn, delete } => {
                handlers::dbi::drop(self, &dbi, &txn, delete)
            }
            Command::DbiClose { dbi, env } => handlers::dbi::close(self, &dbi, &env),
            Command::DbiStat { dbi, txn } => handlers::dbi::stat(self, &dbi, &txn),
            Command::DbiFlags { dbi, txn } => handlers::dbi::flags(self, &dbi, &txn),
            Command::CursorOpen { dbi, txn } => handlers::cursor::open(self, &dbi, &txn),

            // Cursor
            Command::CursorGet {
                cursor,
                position,
                key,
                data,
            } => handlers::cursor::get(self, &cursor, position, key.as_deref(), data.as_deref()),
            Command::CursorPut {
                cursor,
                key,
                data,
                flags,
            } => handlers::cursor::put(self, &cursor, &key, &data, flags),
            Command::CursorDel { cursor, flags } => handlers::cursor::del(self, &cursor, flags),
            Command::CursorCount { cursor } => handlers::cursor::count(self, &cursor),
            Command::CursorRenew { cursor, txn } => handlers::cursor::renew(self, &cursor, &txn),
            Command::CursorClose { cursor } => handlers::cursor::close(self, &cursor),
        }
    }

    /// True if `token` is currently callable in this session.
    pub fn is_exposed(&self, token: &str) -> bool {
        self.registry.contains(token)
    }

    /// Every open handle with its kind.
    pub fn handles(&self) -> Vec<(String, HandleKind)> {
        self.registry
            .tokens()
            .map(|(t, k)| (t.to_string(), k))
            .collect()
    }

    // =========================================================================
    // Registry plumbing for handlers
    // =========================================================================

    /// Register a freshly created resource under the next token for `kind`.
    ///
    /// The token is consumed only if registration succeeds; otherwise the
    /// native resource is released and the registry is unchanged.
    pub(crate) fn expose(
        &mut self,
        kind: HandleKind,
        parent: Option<&str>,
        resource: Resource,
    ) -> Result<String> {
        let token = self.ids.peek(kind, parent);
        match self.registry.insert(token.clone(), resource) {
            Ok(id) => {
                self.ids.mint(kind, parent);
                debug!(target: "keyhold::session", token = %token, %kind, %id, "handle created");
                Ok(token)
            }
            Err(Rejected { error, resource }) => {
                resource.release(&token);
                Err(error)
            }
        }
    }

    /// Unregister `token`.
    pub(crate) fn forget(&mut self, token: &str) -> Option<Resource> {
        let resource = self.registry.remove(token)?;
        debug!(target: "keyhold::session", token, "handle closed");
        Some(resource)
    }

    fn resolve(&self, token: &str, kind: HandleKind) -> Result<&Resource> {
        let id = self.registry.lookup(token, Some(kind))?;
        self.registry
            .get(id)
            .ok_or_else(|| Error::unknown_handle(token, Some(kind)))
    }

    pub(crate) fn env(&self, token: &str) -> Result<Rc<EnvShared>> {
        match self.resolve(token, HandleKind::Environment)? {
            Resource::Env(env) => Ok(Rc::clone(env)),
            _ => Err(Error::unknown_handle(token, Some(HandleKind::Environment))),
        }
    }

    pub(crate) fn txn(&self, token: &str) -> Result<Rc<TxnShared>> {
        match self.resolve(token, HandleKind::Transaction)? {
            Resource::Txn(txn) => Ok(Rc::clone(txn)),
            _ => Err(Error::unknown_handle(token, Some(HandleKind::Transaction))),
        }
    }

    pub(crate) fn dbi(&self, token: &str) -> Result<&DbiRecord> {
        match self.resolve(token, HandleKind::Database)? {
            Resource::Dbi(db) => Ok(db),
            _ => Err(Error::unknown_handle(token, Some(HandleKind::Database))),
        }
    }

    pub(crate) fn cursor(&self, token: &str) -> Result<&CursorRecord> {
        match self.resolve(token, HandleKind::Cursor)? {
            Resource::Cursor(c) => Ok(c),
            _ => Err(Error::unknown_handle(token, Some(HandleKind::Cursor))),
        }
    }

    pub(crate) fn cursor_mut(&mut self, token: &str) -> Result<&mut CursorRecord> {
        let unknown = || Error::unknown_handle(token, Some(HandleKind::Cursor));
        let id = self.registry.lookup(token, Some(HandleKind::Cursor))?;
        match self.registry.get_mut(id) {
            Some(Resource::Cursor(c)) => Ok(c),
            _ => Err(unknown()),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.registry.is_empty() {
            return;
        }
        let tokens: Vec<String> = self.registry.tokens().map(|(t, _)| t.to_string()).collect();
        warn!(
            target: "keyhold::session",
            open = tokens.len(),
            ?tokens,
            "session dropped with open handles; native resources are not released"
        );
    }
}
