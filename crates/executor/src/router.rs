//! Host words → [`Command`]
//!
//! Every handle kind has a static subcommand table. A call is
//! `<lmdb|token> <subcommand> args...`; the subcommand is looked up in the
//! table for the handle's kind, then its arguments are checked for count,
//! converted and matched against the subcommand's option table. Nothing in
//! this module touches the engine.

use keyhold_core::{Error, HandleKind, Result, Value};
use keyhold_engine::{flags, Operands, Position};

use crate::command::Command;
use crate::options::{self, Arg, OptionSpec, ParsedOptions, ValueType};

/// Word that addresses the root table.
pub const ROOT_WORD: &str = "lmdb";

// =============================================================================
// Subcommand tables
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootOp {
    Env,
    Open,
    Version,
}

const ROOT_OPS: &[(&str, RootOp)] = &[
    ("env", RootOp::Env),
    ("open", RootOp::Open),
    ("version", RootOp::Version),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvOp {
    Open,
    SetMapSize,
    SetMaxReaders,
    SetMaxDbs,
    Sync,
    Stat,
    Info,
    Copy,
    GetPath,
    GetMaxReaders,
    GetMaxKeySize,
    Close,
    Txn,
}

const ENV_OPS: &[(&str, EnvOp)] = &[
    ("open", EnvOp::Open),
    ("set_mapsize", EnvOp::SetMapSize),
    ("set_maxreaders", EnvOp::SetMaxReaders),
    ("set_maxdbs", EnvOp::SetMaxDbs),
    ("sync", EnvOp::Sync),
    ("stat", EnvOp::Stat),
    ("info", EnvOp::Info),
    ("copy", EnvOp::Copy),
    ("get_path", EnvOp::GetPath),
    ("get_maxreaders", EnvOp::GetMaxReaders),
    ("get_maxkeysize", EnvOp::GetMaxKeySize),
    ("close", EnvOp::Close),
    ("txn", EnvOp::Txn),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxnOp {
    Abort,
    Commit,
    Reset,
    Renew,
    Close,
    Id,
}

const TXN_OPS: &[(&str, TxnOp)] = &[
    ("abort", TxnOp::Abort),
    ("commit", TxnOp::Commit),
    ("reset", TxnOp::Reset),
    ("renew", TxnOp::Renew),
    ("close", TxnOp::Close),
    ("id", TxnOp::Id),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DbiOp {
    Put,
    Get,
    Del,
    Drop,
    Close,
    Stat,
    Flags,
    Cursor,
}

const DBI_OPS: &[(&str, DbiOp)] = &[
    ("put", DbiOp::Put),
    ("get", DbiOp::Get),
    ("del", DbiOp::Del),
    ("drop", DbiOp::Drop),
    ("close", DbiOp::Close),
    ("stat", DbiOp::Stat),
    ("flags", DbiOp::Flags),
    ("cursor", DbiOp::Cursor),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorOp {
    Get,
    Put,
    Del,
    Count,
    Renew,
    Close,
}

const CURSOR_OPS: &[(&str, CursorOp)] = &[
    ("get", CursorOp::Get),
    ("put", CursorOp::Put),
    ("del", CursorOp::Del),
    ("count", CursorOp::Count),
    ("renew", CursorOp::Renew),
    ("close", CursorOp::Close),
];

/// Subcommand names valid for `kind` (`None` for the root).
pub fn subcommands(kind: Option<HandleKind>) -> Vec<&'static str> {
    fn names<T>(table: &[(&'static str, T)]) -> Vec<&'static str> {
        table.iter().map(|(n, _)| *n).collect()
    }
    match kind {
        None => names(ROOT_OPS),
        Some(HandleKind::Environment) => names(ENV_OPS),
        Some(HandleKind::Transaction) => names(TXN_OPS),
        Some(HandleKind::Database) => names(DBI_OPS),
        Some(HandleKind::Cursor) => names(CURSOR_OPS),
    }
}

fn select<T: Copy>(table: &[(&'static str, T)], kind: &str, name: &str) -> Result<T> {
    table
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, op)| *op)
        .ok_or_else(|| Error::UnknownSubcommand {
            kind: kind.to_string(),
            name: name.to_string(),
            valid: table.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", "),
        })
}

// =============================================================================
// Option tables
// =============================================================================

const ENV: usize = 0;
const TXN: usize = 1;
const NAME: usize = 2;

const DBI_OPEN: &[OptionSpec] = &[
    OptionSpec::field("-env", ValueType::Str, ENV).required(),
    OptionSpec::field("-txn", ValueType::Str, TXN),
    OptionSpec::field("-name", ValueType::Str, NAME),
    OptionSpec::flag("-reversekey", flags::db::REVERSEKEY),
    OptionSpec::flag("-dupsort", flags::db::DUPSORT),
    OptionSpec::flag("-dupfixed", flags::db::DUPFIXED),
    OptionSpec::flag("-reversedup", flags::db::REVERSEDUP),
    OptionSpec::flag("-create", flags::db::CREATE),
];

const PATH: usize = 0;
const MODE: usize = 1;
const REVERSEKEY: usize = 2;

const ENV_OPEN: &[OptionSpec] = &[
    OptionSpec::field("-path", ValueType::Str, PATH).required(),
    OptionSpec::field("-mode", ValueType::Int, MODE),
    OptionSpec::field("-reversekey", ValueType::Bool, REVERSEKEY),
    OptionSpec::flag("-fixedmap", flags::env::FIXEDMAP),
    OptionSpec::flag("-nosubdir", flags::env::NOSUBDIR),
    OptionSpec::flag("-readonly", flags::env::RDONLY),
    OptionSpec::flag("-nosync", flags::env::NOSYNC),
    OptionSpec::flag("-nordahead", flags::env::NORDAHEAD),
];

const ENV_COPY: &[OptionSpec] = &[OptionSpec::flag("-cp_compact", flags::copy::COMPACT)];

const PARENT: usize = 0;
const READONLY: usize = 1;

const TXN_BEGIN: &[OptionSpec] = &[
    OptionSpec::field("-parent", ValueType::Str, PARENT),
    OptionSpec::field("-readonly", ValueType::Bool, READONLY),
];

const TXN_ONLY: &[OptionSpec] = &[OptionSpec::field("-txn", ValueType::Str, 0).required()];

const DBI_PUT: &[OptionSpec] = &[
    OptionSpec::field("-txn", ValueType::Str, 0).required(),
    OptionSpec::flag("-nodupdata", flags::write::NODUPDATA),
    OptionSpec::flag("-nooverwrite", flags::write::NOOVERWRITE),
    OptionSpec::flag("-append", flags::write::APPEND),
    OptionSpec::flag("-appenddup", flags::write::APPENDDUP),
];

const DBI_CLOSE: &[OptionSpec] = &[OptionSpec::field("-env", ValueType::Str, 0).required()];

const CURSOR_PUT: &[OptionSpec] = &[
    OptionSpec::flag("-current", flags::write::CURRENT),
    OptionSpec::flag("-nodupdata", flags::write::NODUPDATA),
    OptionSpec::flag("-nooverwrite", flags::write::NOOVERWRITE),
    OptionSpec::flag("-append", flags::write::APPEND),
    OptionSpec::flag("-appenddup", flags::write::APPENDDUP),
];

const CURSOR_DEL: &[OptionSpec] = &[OptionSpec::flag("-nodupdata", flags::write::NODUPDATA)];

// =============================================================================
// Argument helpers
// =============================================================================

/// Positional arguments followed by options.
struct Args<'a> {
    usage: String,
    words: &'a [Value],
}

impl<'a> Args<'a> {
    fn new(head: &str, sub: &str, shape: &str, words: &'a [Value]) -> Self {
        let usage = if shape.is_empty() {
            format!("{} {}", head, sub)
        } else {
            format!("{} {} {}", head, sub, shape)
        };
        Self { usage, words }
    }

    fn none(&self) -> Result<()> {
        if self.words.is_empty() {
            Ok(())
        } else {
            Err(Error::wrong_args(&self.usage))
        }
    }

    /// Split off exactly `n` leading positionals, leaving the options.
    fn positionals(&self, n: usize) -> Result<(&'a [Value], &'a [Value])> {
        if self.words.len() < n {
            return Err(Error::wrong_args(&self.usage));
        }
        Ok(self.words.split_at(n))
    }

    fn exactly(&self, n: usize) -> Result<&'a [Value]> {
        if self.words.len() != n {
            return Err(Error::wrong_args(&self.usage));
        }
        Ok(self.words)
    }

    fn options(&self, table: &[OptionSpec], words: &[Value]) -> Result<ParsedOptions> {
        options::parse(table, words, &self.usage)
    }
}

fn bytes_arg(name: &str, value: &Value) -> Result<Vec<u8>> {
    match options::convert(name, ValueType::Bytes, value)? {
        Arg::Bytes(bytes) => Ok(bytes),
        _ => Err(options::type_error(name, ValueType::Bytes)),
    }
}

fn text_arg(name: &str, value: &Value) -> Result<String> {
    match options::convert(name, ValueType::Str, value)? {
        Arg::Str(text) => Ok(text),
        _ => Err(options::type_error(name, ValueType::Str)),
    }
}

fn wide_arg(name: &str, value: &Value) -> Result<i64> {
    match options::convert(name, ValueType::WideInt, value)? {
        Arg::WideInt(n) => Ok(n),
        _ => Err(options::type_error(name, ValueType::WideInt)),
    }
}

fn count_arg(name: &str, value: &Value) -> Result<u32> {
    let n = match options::convert(name, ValueType::Int, value)? {
        Arg::Int(n) => n,
        _ => return Err(options::type_error(name, ValueType::Int)),
    };
    u32::try_from(n).map_err(|_| Error::invalid_argument(name, "must not be negative"))
}

fn bool_arg(name: &str, value: &Value) -> Result<bool> {
    match options::convert(name, ValueType::Bool, value)? {
        Arg::Bool(b) => Ok(b),
        _ => Err(options::type_error(name, ValueType::Bool)),
    }
}

fn required_str(opts: &mut ParsedOptions, slot: usize, name: &str) -> Result<String> {
    opts.take_str(slot).ok_or_else(|| Error::MissingOption {
        name: name.to_string(),
    })
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a call addressed to `head`.
///
/// `kind` is `None` for the root word and the handle's kind otherwise.
/// `words[0]` is the head itself, `words[1]` the subcommand.
pub fn parse(head: &str, kind: Option<HandleKind>, words: &[Value]) -> Result<Command> {
    if words.len() < 2 {
        return Err(Error::wrong_args(format!("{} subcommand ?arg ...?", head)));
    }
    let sub = options::to_text(&words[1]).ok_or_else(|| Error::UnknownSubcommand {
        kind: kind.map_or(ROOT_WORD, HandleKind::name).to_string(),
        name: words[1].to_string(),
        valid: subcommands(kind).join(", "),
    })?;
    let rest = &words[2..];
    match kind {
        None => parse_root(&sub, rest),
        Some(HandleKind::Environment) => parse_env(head, &sub, rest),
        Some(HandleKind::Transaction) => parse_txn(head, &sub, rest),
        Some(HandleKind::Database) => parse_dbi(head, &sub, rest),
        Some(HandleKind::Cursor) => parse_cursor(head, &sub, rest),
    }
}

fn parse_root(sub: &str, words: &[Value]) -> Result<Command> {
    match select(ROOT_OPS, ROOT_WORD, sub)? {
        RootOp::Env => {
            Args::new(ROOT_WORD, sub, "", words).none()?;
            Ok(Command::EnvCreate)
        }
        RootOp::Open => {
            let args = Args::new(
                ROOT_WORD,
                sub,
                "-env env ?-txn txn? ?-name name? ?-reversekey bool? ?-dupsort bool? ?-dupfixed bool? ?-reversedup bool? ?-create bool?",
                words,
            );
            let mut opts = args.options(DBI_OPEN, words)?;
            Ok(Command::DbiOpen {
                env: required_str(&mut opts, ENV, "-env")?,
                txn: opts.take_str(TXN),
                name: opts.take_str(NAME),
                flags: opts.flags,
            })
        }
        RootOp::Version => {
            let args = Args::new(ROOT_WORD, sub, "?-string?", words);
            match words {
                [] => Ok(Command::Version { as_string: false }),
                [flag] if options::to_text(flag).as_deref() == Some("-string") => {
                    Ok(Command::Version { as_string: true })
                }
                _ => Err(Error::wrong_args(args.usage)),
            }
        }
    }
}

fn parse_env(token: &str, sub: &str, words: &[Value]) -> Result<Command> {
    let env = token.to_string();
    let op = select(ENV_OPS, HandleKind::Environment.name(), sub)?;
    let shape = match op {
        EnvOp::Open => "-path path ?-mode mode? ?-fixedmap bool? ?-reversekey bool? ?-nosubdir bool? ?-readonly bool? ?-nosync bool? ?-nordahead bool?",
        EnvOp::SetMapSize => "size",
        EnvOp::SetMaxReaders => "readers",
        EnvOp::SetMaxDbs => "dbs",
        EnvOp::Sync => "force",
        EnvOp::Copy => "path ?-cp_compact bool?",
        EnvOp::Txn => "?-parent txn? ?-readonly bool?",
        _ => "",
    };
    let args = Args::new(token, sub, shape, words);
    let cmd = match op {
        EnvOp::Open => {
            let mut opts = args.options(ENV_OPEN, words)?;
            let mode = match opts.int(MODE) {
                Some(m) => Some(
                    u32::try_from(m)
                        .map_err(|_| Error::invalid_argument("-mode", "must not be negative"))?,
                ),
                None => None,
            };
            Command::EnvOpen {
                env,
                path: required_str(&mut opts, PATH, "-path")?,
                mode,
                reverse_key: opts.bool(REVERSEKEY),
                flags: opts.flags,
            }
        }
        EnvOp::SetMapSize => {
            let size = wide_arg("size", &args.exactly(1)?[0])?;
            let size = u64::try_from(size)
                .map_err(|_| Error::invalid_argument("size", "must not be negative"))?;
            Command::EnvSetMapSize { env, size }
        }
        EnvOp::SetMaxReaders => Command::EnvSetMaxReaders {
            env,
            readers: count_arg("readers", &args.exactly(1)?[0])?,
        },
        EnvOp::SetMaxDbs => Command::EnvSetMaxDbs {
            env,
            dbs: count_arg("dbs", &args.exactly(1)?[0])?,
        },
        EnvOp::Sync => Command::EnvSync {
            env,
            force: bool_arg("force", &args.exactly(1)?[0])?,
        },
        EnvOp::Stat => {
            args.none()?;
            Command::EnvStat { env }
        }
        EnvOp::Info => {
            args.none()?;
            Command::EnvInfo { env }
        }
        EnvOp::Copy => {
            let (pos, rest) = args.positionals(1)?;
            let opts = args.options(ENV_COPY, rest)?;
            Command::EnvCopy {
                env,
                path: text_arg("path", &pos[0])?,
                compact: opts.flags.bits & flags::copy::COMPACT != 0,
            }
        }
        EnvOp::GetPath => {
            args.none()?;
            Command::EnvGetPath { env }
        }
        EnvOp::GetMaxReaders => {
            args.none()?;
            Command::EnvGetMaxReaders { env }
        }
        EnvOp::GetMaxKeySize => {
            args.none()?;
            Command::EnvGetMaxKeySize { env }
        }
        EnvOp::Close => {
            args.none()?;
            Command::EnvClose { env }
        }
        EnvOp::Txn => {
            let mut opts = args.options(TXN_BEGIN, words)?;
            Command::TxnBegin {
                env,
                read_only: opts.bool(READONLY).unwrap_or(false),
                parent: opts.take_str(PARENT),
            }
        }
    };
    Ok(cmd)
}

fn parse_txn(token: &str, sub: &str, words: &[Value]) -> Result<Command> {
    let op = select(TXN_OPS, HandleKind::Transaction.name(), sub)?;
    Args::new(token, sub, "", words).none()?;
    let txn = token.to_string();
    Ok(match op {
        TxnOp::Abort => Command::TxnAbort { txn },
        TxnOp::Commit => Command::TxnCommit { txn },
        TxnOp::Reset => Command::TxnReset { txn },
        TxnOp::Renew => Command::TxnRenew { txn },
        TxnOp::Close => Command::TxnClose { txn },
        TxnOp::Id => Command::TxnId { txn },
    })
}

fn parse_dbi(token: &str, sub: &str, words: &[Value]) -> Result<Command> {
    let dbi = token.to_string();
    let op = select(DBI_OPS, HandleKind::Database.name(), sub)?;
    let shape = match op {
        DbiOp::Put => "key data -txn txn ?-nodupdata bool? ?-nooverwrite bool? ?-append bool? ?-appenddup bool?",
        DbiOp::Get => "key -txn txn",
        DbiOp::Del => "key data -txn txn",
        DbiOp::Drop => "delete -txn txn",
        DbiOp::Close => "-env env",
        DbiOp::Stat | DbiOp::Flags | DbiOp::Cursor => "-txn txn",
    };
    let args = Args::new(token, sub, shape, words);
    let cmd = match op {
        DbiOp::Put => {
            let (pos, rest) = args.positionals(2)?;
            let mut opts = args.options(DBI_PUT, rest)?;
            Command::DbiPut {
                dbi,
                txn: required_str(&mut opts, 0, "-txn")?,
                key: bytes_arg("key", &pos[0])?,
                data: bytes_arg("data", &pos[1])?,
                flags: opts.flags,
            }
        }
        DbiOp::Get => {
            let (pos, rest) = args.positionals(1)?;
            let mut opts = args.options(TXN_ONLY, rest)?;
            Command::DbiGet {
                dbi,
                txn: required_str(&mut opts, 0, "-txn")?,
                key: bytes_arg("key", &pos[0])?,
            }
        }
        DbiOp::Del => {
            let (pos, rest) = args.positionals(2)?;
            let mut opts = args.options(TXN_ONLY, rest)?;
            let data = if pos[1].is_empty() {
                None
            } else {
                Some(bytes_arg("data", &pos[1])?)
            };
            Command::DbiDel {
                dbi,
                txn: required_str(&mut opts, 0, "-txn")?,
                key: bytes_arg("key", &pos[0])?,
                data,
            }
        }
        DbiOp::Drop => {
            let (pos, rest) = args.positionals(1)?;
            let mut opts = args.options(TXN_ONLY, rest)?;
            Command::DbiDrop {
                dbi,
                txn: required_str(&mut opts, 0, "-txn")?,
                delete: bool_arg("delete", &pos[0])?,
            }
        }
        DbiOp::Close => {
            let mut opts = args.options(DBI_CLOSE, words)?;
            Command::DbiClose {
                dbi,
                env: required_str(&mut opts, 0, "-env")?,
            }
        }
        DbiOp::Stat | DbiOp::Flags | DbiOp::Cursor => {
            let mut opts = args.options(TXN_ONLY, words)?;
            let txn = required_str(&mut opts, 0, "-txn")?;
            match op {
                DbiOp::Stat => Command::DbiStat { dbi, txn },
                DbiOp::Flags => Command::DbiFlags { dbi, txn },
                _ => Command::CursorOpen { dbi, txn },
            }
        }
    };
    Ok(cmd)
}

fn parse_cursor(token: &str, sub: &str, words: &[Value]) -> Result<Command> {
    let cursor = token.to_string();
    let op = select(CURSOR_OPS, HandleKind::Cursor.name(), sub)?;
    let shape = match op {
        CursorOp::Get => "-position ?key? ?data?",
        CursorOp::Put => "key data ?-current bool? ?-nodupdata bool? ?-nooverwrite bool? ?-append bool? ?-appenddup bool?",
        CursorOp::Del => "?-nodupdata bool?",
        CursorOp::Renew => "-txn txn",
        CursorOp::Count | CursorOp::Close => "",
    };
    let args = Args::new(token, sub, shape, words);
    let cmd = match op {
        CursorOp::Get => {
            let (pos, operands) = args.positionals(1)?;
            let name = options::option_name(&pos[0])?;
            let position =
                Position::from_option(&name).ok_or(Error::UnknownOption { name })?;
            let accepted = match position.operands() {
                Operands::None => operands.is_empty(),
                Operands::Key => operands.len() == 1,
                Operands::KeyData => operands.len() == 2,
                Operands::IgnoredKeyData => operands.is_empty() || operands.len() == 2,
            };
            if !accepted {
                return Err(Error::wrong_args(args.usage));
            }
            Command::CursorGet {
                cursor,
                position,
                key: operands.first().map(|v| bytes_arg("key", v)).transpose()?,
                data: operands.get(1).map(|v| bytes_arg("data", v)).transpose()?,
            }
        }
        CursorOp::Put => {
            let (pos, rest) = args.positionals(2)?;
            let opts = args.options(CURSOR_PUT, rest)?;
            Command::CursorPut {
                cursor,
                key: bytes_arg("key", &pos[0])?,
                data: bytes_arg("data", &pos[1])?,
                flags: opts.flags,
            }
        }
        CursorOp::Del => {
            let opts = args.options(CURSOR_DEL, words)?;
            Command::CursorDel {
                cursor,
                flags: opts.flags,
            }
        }
        CursorOp::Count => {
            args.none()?;
            Command::CursorCount { cursor }
        }
        CursorOp::Renew => {
            let mut opts = args.options(TXN_ONLY, words)?;
            Command::CursorRenew {
                cursor,
                txn: required_str(&mut opts, 0, "-txn")?,
            }
        }
        CursorOp::Close => {
            args.none()?;
            Command::CursorClose { cursor }
        }
    };
    Ok(cmd)
}
