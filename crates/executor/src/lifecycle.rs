//! Lifecycle records for native resources
//!
//! The registry stores one [`Resource`] per token. Each record tracks the
//! state of its native object and refuses any call the engine would not
//! survive, which is what makes the `unsafe` engine calls below sound:
//!
//! | Kind | States | Terminal |
//! |------|--------|----------|
//! | Environment | Created → Active, Created → Defunct (failed open) | close |
//! | Transaction | Active ⇄ Suspended (read-only), → Committed / Aborted | commit, abort, or an ancestor ending |
//! | Database | Active, Stale once its opening transaction is discarded | close |
//! | Cursor | bound to a transaction, rebindable | close |
//!
//! Children hold an `Rc` to the environment they were created in. Closing an
//! environment token only *requests* the native close; it runs once the last
//! record referring to the environment is gone. Nothing cascades: a closed
//! parent never invalidates its children's tokens.

use std::cell::Cell;
use std::rc::Rc;

use keyhold_core::{Error, HandleKind, Result};
use keyhold_engine::{flags, Cursor, Dbi, Env, Position, Txn};
use tracing::{debug, warn};

use crate::registry::Kinded;

// =============================================================================
// Environment
// =============================================================================

/// Environment lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvState {
    /// Created, not yet opened: only configuration and open are valid
    Created,
    /// Opened successfully
    Active,
    /// Open failed: only close is valid
    Defunct,
}

impl EnvState {
    fn name(self) -> &'static str {
        match self {
            EnvState::Created => "not open",
            EnvState::Active => "open",
            EnvState::Defunct => "defunct after a failed open",
        }
    }
}

/// Shared environment record.
#[derive(Debug)]
pub struct EnvShared {
    raw: Env,
    state: Cell<EnvState>,
    open_flags: Cell<u32>,
    default_db_flags: Cell<u32>,
    close_requested: Cell<bool>,
}

impl EnvShared {
    /// Wrap a freshly created native environment.
    pub fn new(raw: Env) -> Rc<Self> {
        Rc::new(Self {
            raw,
            state: Cell::new(EnvState::Created),
            open_flags: Cell::new(0),
            default_db_flags: Cell::new(0),
            close_requested: Cell::new(false),
        })
    }

    /// Current state.
    pub fn state(&self) -> EnvState {
        self.state.get()
    }

    fn require(&self, token: &str, ok: bool, operation: &str) -> Result<Env> {
        if ok {
            Ok(self.raw)
        } else {
            Err(Error::invalid_state(token, self.state().name(), operation))
        }
    }

    /// The environment, if it has not been opened yet.
    pub fn created(&self, token: &str, operation: &str) -> Result<Env> {
        self.require(token, self.state() == EnvState::Created, operation)
    }

    /// The environment, if it is open.
    pub fn active(&self, token: &str, operation: &str) -> Result<Env> {
        self.require(token, self.state() == EnvState::Active, operation)
    }

    /// The environment, unless a failed open made it defunct.
    pub fn usable(&self, token: &str, operation: &str) -> Result<Env> {
        self.require(token, self.state() != EnvState::Defunct, operation)
    }

    /// Record the outcome of an open attempt.
    pub fn opened(&self, result: &Result<()>, open_flags: u32, default_db_flags: u32) {
        if result.is_ok() {
            self.state.set(EnvState::Active);
            self.open_flags.set(open_flags);
            self.default_db_flags.set(default_db_flags);
        } else {
            self.state.set(EnvState::Defunct);
        }
    }

    /// True if the environment was opened read-only.
    pub fn read_only(&self) -> bool {
        self.open_flags.get() & flags::env::RDONLY != 0
    }

    /// Database flags applied when a database open doesn't say otherwise.
    pub fn default_db_flags(&self) -> u32 {
        self.default_db_flags.get()
    }

    /// Ask for the native close. It runs when the last reference drops.
    pub fn request_close(&self) {
        self.close_requested.set(true);
    }
}

impl Drop for EnvShared {
    fn drop(&mut self) {
        if self.close_requested.get() {
            // SAFETY: this is the last reference, so no record can reach the
            // environment afterwards; close runs at most once.
            unsafe { self.raw.close() };
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// Transaction lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnPhase {
    /// Usable
    Active,
    /// Read-only transaction after reset, waiting for renew
    Suspended,
    /// Committed; the native transaction is gone
    Committed,
    /// Aborted, or a commit the engine refused; the native transaction is gone
    Aborted,
}

/// Shared transaction record.
#[derive(Debug)]
pub struct TxnShared {
    raw: Txn,
    read_only: bool,
    phase: Cell<TxnPhase>,
    parent: Option<Rc<TxnShared>>,
    env: Rc<EnvShared>,
}

impl TxnShared {
    /// Begin a transaction in `env`, nested under `parent` if given.
    pub fn begin(
        env: &Rc<EnvShared>,
        env_token: &str,
        parent: Option<(&str, Rc<TxnShared>)>,
        read_only: bool,
    ) -> Result<Rc<TxnShared>> {
        let raw_env = env.active(env_token, "begin a transaction")?;
        let raw_parent = match &parent {
            Some((token, p)) => {
                if !Rc::ptr_eq(&p.env, env) {
                    return Err(Error::invalid_argument(
                        "-parent",
                        format!("{} belongs to a different environment", token),
                    ));
                }
                Some(p.active(token, "begin a child transaction")?)
            }
            None => None,
        };
        // SAFETY: the environment is open and the parent, if any, is live.
        let raw = unsafe { Txn::begin(raw_env, raw_parent, read_only)? };
        Ok(Rc::new(TxnShared {
            raw,
            read_only,
            phase: Cell::new(TxnPhase::Active),
            parent: parent.map(|(_, p)| p),
            env: Rc::clone(env),
        }))
    }

    /// Environment the transaction runs in.
    pub fn env(&self) -> &Rc<EnvShared> {
        &self.env
    }

    /// True for a read-only transaction.
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Own phase, ignoring ancestors.
    pub fn phase(&self) -> TxnPhase {
        self.phase.get()
    }

    fn ancestors_live(&self) -> bool {
        self.parent.as_ref().map_or(true, |p| p.is_live())
    }

    /// True while the native transaction exists.
    pub fn is_live(&self) -> bool {
        matches!(self.phase(), TxnPhase::Active | TxnPhase::Suspended) && self.ancestors_live()
    }

    /// State name for error messages.
    pub fn status(&self) -> &'static str {
        match self.phase() {
            TxnPhase::Committed => "committed",
            TxnPhase::Aborted => "aborted",
            _ if !self.ancestors_live() => "ended with its parent",
            TxnPhase::Suspended => "reset",
            TxnPhase::Active => "active",
        }
    }

    fn refuse(&self, token: &str, operation: &str) -> Error {
        Error::invalid_state(token, self.status(), operation)
    }

    /// The native transaction, if it is active.
    pub fn active(&self, token: &str, operation: &str) -> Result<Txn> {
        if self.phase() == TxnPhase::Active && self.ancestors_live() {
            Ok(self.raw)
        } else {
            Err(self.refuse(token, operation))
        }
    }

    fn live(&self, token: &str, operation: &str) -> Result<Txn> {
        if self.is_live() {
            Ok(self.raw)
        } else {
            Err(self.refuse(token, operation))
        }
    }

    /// Commit. The transaction is over whatever the engine says; a failed
    /// commit leaves it aborted.
    pub fn commit(&self, token: &str) -> Result<()> {
        let raw = self.live(token, "commit")?;
        self.phase.set(TxnPhase::Committed);
        // SAFETY: live checked above; the phase change prevents reuse.
        unsafe { raw.commit() }.map_err(|e| {
            self.phase.set(TxnPhase::Aborted);
            e
        })
    }

    /// True once the transaction's writes can no longer reach the
    /// environment: it aborted, or an ancestor ended without committing.
    pub fn discarded(&self) -> bool {
        match self.phase() {
            TxnPhase::Aborted => true,
            TxnPhase::Committed => self.parent.as_ref().map_or(false, |p| p.discarded()),
            TxnPhase::Active | TxnPhase::Suspended => !self.ancestors_live(),
        }
    }

    /// Abort.
    pub fn abort(&self, token: &str) -> Result<()> {
        let raw = self.live(token, "abort")?;
        self.phase.set(TxnPhase::Aborted);
        // SAFETY: live checked above; the phase change prevents reuse.
        unsafe { raw.abort() };
        Ok(())
    }

    /// Release the snapshot of an active read-only transaction.
    pub fn reset(&self, token: &str) -> Result<()> {
        if !self.read_only {
            return Err(Error::invalid_state(token, "read-write", "reset"));
        }
        let raw = self.active(token, "reset")?;
        // SAFETY: active read-only transaction.
        unsafe { raw.reset() };
        self.phase.set(TxnPhase::Suspended);
        Ok(())
    }

    /// Reacquire a snapshot after reset.
    pub fn renew(&self, token: &str) -> Result<()> {
        if self.phase() != TxnPhase::Suspended || !self.ancestors_live() {
            return Err(self.refuse(token, "renew"));
        }
        // SAFETY: a suspended transaction still owns its native handle.
        unsafe { self.raw.renew()? };
        self.phase.set(TxnPhase::Active);
        Ok(())
    }

    /// Transaction ID.
    pub fn id(&self, token: &str) -> Result<u64> {
        let raw = self.live(token, "report its id")?;
        // SAFETY: live checked above.
        Ok(unsafe { raw.id() })
    }

    /// Called when the token goes away without commit or abort.
    pub fn detach(&self, token: &str) {
        if self.is_live() {
            warn!(
                target: "keyhold::session",
                token,
                state = self.status(),
                "transaction closed without commit or abort; native transaction leaks"
            );
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Database record.
#[derive(Debug)]
pub struct DbiRecord {
    dbi: Dbi,
    env: Rc<EnvShared>,
    env_token: String,
    opener: Option<Rc<TxnShared>>,
}

impl DbiRecord {
    /// Open a database in `env`, either inside `txn` or in an internal
    /// transaction committed straight away.
    pub fn open(
        env: &Rc<EnvShared>,
        env_token: &str,
        txn: Option<(&str, Rc<TxnShared>)>,
        name: Option<&str>,
        db_flags: u32,
    ) -> Result<DbiRecord> {
        let raw_env = env.active(env_token, "open a database")?;
        let opener = txn.as_ref().map(|(_, t)| Rc::clone(t));
        let dbi = match txn {
            Some((token, txn)) => {
                if !Rc::ptr_eq(txn.env(), env) {
                    return Err(Error::invalid_argument(
                        "-txn",
                        format!("{} belongs to a different environment", token),
                    ));
                }
                let raw = txn.active(token, "open a database")?;
                // SAFETY: active transaction in this environment.
                unsafe { keyhold_engine::dbi::open(raw, name, db_flags)? }
            }
            None => {
                // SAFETY: the environment is open; the internal transaction
                // never escapes this block.
                unsafe {
                    let raw = Txn::begin(raw_env, None, env.read_only())?;
                    match keyhold_engine::dbi::open(raw, name, db_flags) {
                        Ok(dbi) => {
                            raw.commit()?;
                            dbi
                        }
                        Err(e) => {
                            raw.abort();
                            return Err(e);
                        }
                    }
                }
            }
        };
        Ok(DbiRecord {
            dbi,
            env: Rc::clone(env),
            env_token: env_token.to_string(),
            opener,
        })
    }

    /// True when the transaction that opened the database ended without
    /// committing. The engine may have handed the number to another database.
    pub fn stale(&self) -> bool {
        self.opener.as_ref().map_or(false, |t| t.discarded())
    }

    /// Engine database number, refused once the handle is stale.
    pub fn dbi(&self, token: &str, operation: &str) -> Result<Dbi> {
        if self.stale() {
            Err(Error::invalid_state(
                token,
                "discarded with its opening transaction",
                operation,
            ))
        } else {
            Ok(self.dbi)
        }
    }

    /// Token of the environment the database was opened in.
    pub fn env_token(&self) -> &str {
        &self.env_token
    }

    /// Check that `txn` runs in this database's environment.
    pub fn check_txn(&self, txn_token: &str, txn: &TxnShared) -> Result<()> {
        if Rc::ptr_eq(txn.env(), &self.env) {
            Ok(())
        } else {
            Err(Error::invalid_argument(
                "-txn",
                format!("{} belongs to a different environment", txn_token),
            ))
        }
    }

    /// Check that `env` is the opening environment and may still be used.
    pub fn closable(&self, token: &str, env_token: &str, env: &Rc<EnvShared>) -> Result<Env> {
        if !Rc::ptr_eq(env, &self.env) {
            return Err(Error::invalid_argument(
                "-env",
                format!("{} was opened in {}, not {}", token, self.env_token, env_token),
            ));
        }
        env.usable(env_token, "close a database")
    }

    /// Release the database number in `env`, as returned by [`closable`].
    /// A stale number is left alone since it may belong to another database.
    ///
    /// [`closable`]: DbiRecord::closable
    pub fn close(self, env: Env) {
        if self.stale() {
            return;
        }
        // SAFETY: the record holds a reference to the environment, so the
        // native close has not run yet.
        unsafe { keyhold_engine::dbi::close(env, self.dbi) };
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// Cursor record.
#[derive(Debug)]
pub struct CursorRecord {
    raw: Cursor,
    txn: Rc<TxnShared>,
    db_opener: Option<Rc<TxnShared>>,
}

impl CursorRecord {
    /// Open a cursor on `db` under `txn`.
    pub fn open(
        db: &DbiRecord,
        db_token: &str,
        txn_token: &str,
        txn: Rc<TxnShared>,
    ) -> Result<CursorRecord> {
        let dbi = db.dbi(db_token, "open a cursor")?;
        db.check_txn(txn_token, &txn)?;
        let raw_txn = txn.active(txn_token, "open a cursor")?;
        // SAFETY: active transaction in the database's environment.
        let raw = unsafe { Cursor::open(raw_txn, dbi)? };
        Ok(CursorRecord {
            raw,
            txn,
            db_opener: db.opener.clone(),
        })
    }

    /// The engine frees write cursors together with their transaction.
    fn engine_freed(&self) -> bool {
        !self.txn.read_only() && !self.txn.is_live()
    }

    fn check_db(&self, token: &str, operation: &str) -> Result<()> {
        if self.db_opener.as_ref().map_or(false, |t| t.discarded()) {
            Err(Error::invalid_state(
                token,
                "walking a database discarded with its opening transaction",
                operation,
            ))
        } else {
            Ok(())
        }
    }

    fn bound(&self, token: &str, operation: &str) -> Result<Cursor> {
        self.check_db(token, operation)?;
        if self.txn.phase() == TxnPhase::Active && self.txn.is_live() {
            Ok(self.raw)
        } else {
            Err(Error::invalid_state(
                token,
                format!("bound to a transaction that is {}", self.txn.status()),
                operation,
            ))
        }
    }

    /// Position the cursor.
    pub fn get(
        &self,
        token: &str,
        position: Position,
        key: Option<&[u8]>,
        data: Option<&[u8]>,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        let raw = self.bound(token, "get")?;
        // SAFETY: cursor and its transaction are live.
        unsafe { raw.get(position, key, data) }
    }

    /// Store through the cursor.
    pub fn put(&self, token: &str, key: &[u8], data: &[u8], write_flags: u32) -> Result<()> {
        let raw = self.bound(token, "put")?;
        // SAFETY: cursor and its transaction are live.
        unsafe { raw.put(key, data, write_flags) }
    }

    /// Delete at the cursor.
    pub fn del(&self, token: &str, write_flags: u32) -> Result<()> {
        let raw = self.bound(token, "del")?;
        // SAFETY: cursor and its transaction are live.
        unsafe { raw.del(write_flags) }
    }

    /// Duplicate count at the cursor.
    pub fn count(&self, token: &str) -> Result<u64> {
        let raw = self.bound(token, "count")?;
        // SAFETY: cursor and its transaction are live.
        unsafe { raw.count() }
    }

    /// Rebind to `txn`.
    pub fn renew(&mut self, token: &str, txn_token: &str, txn: Rc<TxnShared>) -> Result<()> {
        if self.engine_freed() {
            return Err(Error::invalid_state(
                token,
                "freed with its write transaction",
                "renew",
            ));
        }
        self.check_db(token, "renew")?;
        if !Rc::ptr_eq(txn.env(), self.txn.env()) {
            return Err(Error::invalid_argument(
                "-txn",
                format!("{} belongs to a different environment", txn_token),
            ));
        }
        let raw_txn = txn.active(txn_token, "renew a cursor")?;
        // SAFETY: the cursor was not freed and the new transaction is active.
        unsafe { self.raw.renew(raw_txn)? };
        self.txn = txn;
        Ok(())
    }

    /// Free the native cursor unless the engine already did.
    pub fn close(self, token: &str) {
        if self.engine_freed() {
            debug!(target: "keyhold::session", token, "cursor already freed with its transaction");
            return;
        }
        // SAFETY: not freed by the engine, and the record is consumed.
        unsafe { self.raw.close() };
    }
}

// =============================================================================
// Registry record
// =============================================================================

/// What the registry stores for each token.
#[derive(Debug)]
pub enum Resource {
    /// Environment
    Env(Rc<EnvShared>),
    /// Transaction
    Txn(Rc<TxnShared>),
    /// Database
    Dbi(DbiRecord),
    /// Cursor
    Cursor(CursorRecord),
}

impl Kinded for Resource {
    fn kind(&self) -> HandleKind {
        match self {
            Resource::Env(_) => HandleKind::Environment,
            Resource::Txn(_) => HandleKind::Transaction,
            Resource::Dbi(_) => HandleKind::Database,
            Resource::Cursor(_) => HandleKind::Cursor,
        }
    }
}

impl Resource {
    /// Undo a creation whose registration was refused.
    pub fn release(self, token: &str) {
        match self {
            Resource::Env(env) => env.request_close(),
            Resource::Txn(txn) => {
                if txn.is_live() {
                    let _ = txn.abort(token);
                }
            }
            Resource::Dbi(_) => {}
            Resource::Cursor(cursor) => cursor.close(token),
        }
    }
}
