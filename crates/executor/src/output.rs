//! Output enum for command execution results.
//!
//! Every command produces exactly one output variant; the mapping is listed
//! on each [`Command`](crate::Command) variant. Hosts that want the flat value
//! model call [`Output::into_value`].

use keyhold_core::Value;
use keyhold_engine::{EnvInfo, Stat};
use serde::{Deserialize, Serialize};

/// Successful command execution results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    // ==================== Primitive Results ====================
    /// No return value
    Unit,

    /// Token of a newly created handle
    Handle(String),

    /// Data bytes (database get)
    Bytes(Vec<u8>),

    /// Key/data pair (cursor get)
    Pair {
        /// Key at the cursor position
        key: Vec<u8>,
        /// Data at the cursor position
        data: Vec<u8>,
    },

    /// Unsigned integer (counts, limits)
    Uint(u64),

    // ==================== Statistics ====================
    /// B-tree statistics
    Stat(Stat),

    /// Environment information
    EnvInfo(EnvInfo),

    // ==================== Introspection ====================
    /// Filesystem path
    Path(String),

    /// Engine version numbers
    Version {
        /// Major version
        major: i32,
        /// Minor version
        minor: i32,
        /// Patch level
        patch: i32,
    },

    /// Engine version string
    VersionString(String),

    /// Database flag names
    Flags(Vec<String>),

    /// Transaction ID
    TxnId(u64),
}

fn int(v: u64) -> Value {
    Value::Int(i64::try_from(v).unwrap_or(i64::MAX))
}

impl Output {
    /// Convert into the host value model: void → `Null`, tuples → `List`.
    pub fn into_value(self) -> Value {
        match self {
            Output::Unit => Value::Null,
            Output::Handle(token) => Value::String(token),
            Output::Bytes(b) => Value::Bytes(b),
            Output::Pair { key, data } => Value::List(vec![Value::Bytes(key), Value::Bytes(data)]),
            Output::Uint(n) | Output::TxnId(n) => int(n),
            Output::Stat(s) => Value::List(s.to_tuple().into_iter().map(int).collect()),
            Output::EnvInfo(i) => Value::List(i.to_tuple().into_iter().map(int).collect()),
            Output::Path(p) | Output::VersionString(p) => Value::String(p),
            Output::Version {
                major,
                minor,
                patch,
            } => Value::List(vec![major.into(), minor.into(), patch.into()]),
            Output::Flags(names) => Value::List(names.into_iter().map(Value::String).collect()),
        }
    }

    /// Token of a handle-creating command's result.
    pub fn handle(&self) -> Option<&str> {
        match self {
            Output::Handle(token) => Some(token),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_is_null() {
        assert_eq!(Output::Unit.into_value(), Value::Null);
    }

    #[test]
    fn test_pair_is_two_element_list() {
        let v = Output::Pair {
            key: b"a".to_vec(),
            data: b"1".to_vec(),
        }
        .into_value();
        assert_eq!(v.to_string(), "a 1");
    }

    #[test]
    fn test_stat_tuple_order() {
        let stat = Stat {
            page_size: 4096,
            depth: 1,
            branch_pages: 0,
            leaf_pages: 1,
            overflow_pages: 0,
            entries: 3,
        };
        assert_eq!(Output::Stat(stat).into_value().to_string(), "4096 1 0 1 0 3");
    }

    #[test]
    fn test_flags_and_version() {
        let v = Output::Flags(vec!["dupsort".into()]).into_value();
        assert_eq!(v, Value::List(vec![Value::String("dupsort".into())]));
        let v = Output::Version {
            major: 0,
            minor: 9,
            patch: 33,
        }
        .into_value();
        assert_eq!(v.to_string(), "0 9 33");
        assert_eq!(Output::Handle("env0".into()).handle(), Some("env0"));
    }
}
