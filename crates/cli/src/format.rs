//! Output → human/json/raw string formatting.
//!
//! Three modes:
//! - **Human** (default): e.g. `"value"`, `(integer) 42`, `OK`
//! - **JSON** (`--json`): `serde_json::to_string_pretty`
//! - **Raw** (`--raw`): the host value text, exactly what a script would see

use keyhold_executor::{EnvInfo, Error, Output, Stat};
use serde_json::{json, Value as JsonValue};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Raw,
}

/// Format a successful output.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(&to_json(output)),
        OutputMode::Raw => output.clone().into_value().to_string(),
        OutputMode::Human => format_human(output),
    }
}

/// Format a command error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(&json!({
            "error": err.to_string(),
            "category": format!("{:?}", err.category()),
        })),
        OutputMode::Raw => err.to_string(),
        OutputMode::Human => format!("(error) {}", err),
    }
}

/// Format a line that never reached the session.
pub fn format_parse_error(message: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(&json!({ "error": message })),
        OutputMode::Raw => message.to_string(),
        OutputMode::Human => format!("(error) {}", message),
    }
}

fn pretty(value: &JsonValue) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

// =========================================================================
// JSON
// =========================================================================

fn bytes_json(bytes: &[u8]) -> JsonValue {
    match std::str::from_utf8(bytes) {
        Ok(text) => JsonValue::String(text.to_string()),
        Err(_) => json!({ "bytes": bytes }),
    }
}

fn stat_json(s: &Stat) -> JsonValue {
    json!({
        "psize": s.page_size,
        "depth": s.depth,
        "branch_pages": s.branch_pages,
        "leaf_pages": s.leaf_pages,
        "overflow_pages": s.overflow_pages,
        "entries": s.entries,
    })
}

fn info_json(i: &EnvInfo) -> JsonValue {
    json!({
        "mapsize": i.map_size,
        "last_pgno": i.last_pgno,
        "last_txnid": i.last_txnid,
        "maxreaders": i.max_readers,
        "numreaders": i.num_readers,
    })
}

fn to_json(output: &Output) -> JsonValue {
    match output {
        Output::Unit => JsonValue::Null,
        Output::Handle(token) => json!({ "handle": token }),
        Output::Bytes(b) => bytes_json(b),
        Output::Pair { key, data } => json!([bytes_json(key), bytes_json(data)]),
        Output::Uint(n) => json!(n),
        Output::TxnId(id) => json!({ "txnid": id }),
        Output::Stat(s) => stat_json(s),
        Output::EnvInfo(i) => info_json(i),
        Output::Path(p) => json!({ "path": p }),
        Output::Version {
            major,
            minor,
            patch,
        } => json!([major, minor, patch]),
        Output::VersionString(v) => JsonValue::String(v.clone()),
        Output::Flags(names) => json!(names),
    }
}

// =========================================================================
// Human
// =========================================================================

fn quote(bytes: &[u8]) -> String {
    let escaped: String = bytes.escape_ascii().to_string();
    format!("\"{}\"", escaped)
}

fn numbered<I: IntoIterator<Item = String>>(items: I) -> String {
    let lines: Vec<String> = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| format!("{}) {}", i + 1, item))
        .collect();
    if lines.is_empty() {
        "(empty list)".to_string()
    } else {
        lines.join("\n")
    }
}

fn fields(pairs: &[(&str, u64)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_human(output: &Output) -> String {
    match output {
        Output::Unit => "OK".to_string(),
        Output::Handle(token) => token.clone(),
        Output::Bytes(b) => quote(b),
        Output::Pair { key, data } => numbered([quote(key), quote(data)]),
        Output::Uint(n) => format!("(integer) {}", n),
        Output::TxnId(id) => format!("(txnid) {}", id),
        Output::Stat(s) => fields(&[
            ("psize", u64::from(s.page_size)),
            ("depth", u64::from(s.depth)),
            ("branch_pages", s.branch_pages),
            ("leaf_pages", s.leaf_pages),
            ("overflow_pages", s.overflow_pages),
            ("entries", s.entries),
        ]),
        Output::EnvInfo(i) => fields(&[
            ("mapsize", i.map_size),
            ("last_pgno", i.last_pgno),
            ("last_txnid", i.last_txnid),
            ("maxreaders", u64::from(i.max_readers)),
            ("numreaders", u64::from(i.num_readers)),
        ]),
        Output::Path(p) | Output::VersionString(p) => format!("\"{}\"", p),
        Output::Version {
            major,
            minor,
            patch,
        } => format!("{}.{}.{}", major, minor, patch),
        Output::Flags(names) => numbered(names.iter().cloned()),
    }
}
