//! Value types for keyhold
//!
//! This module defines:
//! - Value: the host-facing value model
//!
//! ## Value Model
//!
//! A scripting host hands the command layer a list of words and gets a single
//! value back. The model has exactly 6 variants:
//! - Null, Bool, Int, String, Bytes, List
//!
//! ### Type Rules
//!
//! - `Bytes` are not `String`: keys and values travel as raw bytes with
//!   explicit lengths, never through an implicit text encoding.
//! - Different variants are never equal (`Int(1) != String("1")`); coercion
//!   happens only where an option table asks for it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host value passed into and returned from the command surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// No value (void results, "delete all duplicates" data argument)
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Ordered list of values (pairs, statistics tuples)
    List(Vec<Value>),
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::List(_) => "List",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for `Null` and for zero-length strings and byte sequences.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::List(l) => l.is_empty(),
            Value::Bool(_) | Value::Int(_) => false,
        }
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as &[u8] if this is a Bytes value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Get as &[Value] if this is a List value
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value the way a line-oriented host prints it.
    ///
    /// List elements that are empty or contain whitespace are braced so the
    /// printed form splits back into the same elements.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            Value::Int(i) => write!(f, "{}", i),
            Value::String(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    let text = item.to_string();
                    if text.is_empty() || text.chars().any(char::is_whitespace) {
                        write!(f, "{{{}}}", text)?;
                    } else {
                        f.write_str(&text)?;
                    }
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_are_not_strings() {
        assert_ne!(Value::Bytes(b"a".to_vec()), Value::String("a".into()));
        assert_ne!(Value::Int(1), Value::String("1".into()));
    }

    #[test]
    fn test_is_empty() {
        assert!(Value::Null.is_empty());
        assert!(Value::String(String::new()).is_empty());
        assert!(Value::Bytes(Vec::new()).is_empty());
        assert!(!Value::Bytes(vec![0]).is_empty());
        assert!(!Value::Int(0).is_empty());
    }

    #[test]
    fn test_display_list_braces_awkward_elements() {
        let v = Value::List(vec![
            Value::Bytes(b"key".to_vec()),
            Value::String("two words".into()),
            Value::Null,
            Value::Int(7),
        ]);
        assert_eq!(v.to_string(), "key {two words} {} 7");
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Bool(true).to_string(), "1");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Bytes(vec![0xff, b'a']).to_string(), "\u{fffd}a");
    }

    #[test]
    fn test_serde_tagged_form() {
        let json = serde_json::to_string(&Value::Int(5)).unwrap();
        assert_eq!(json, r#"{"Int":5}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Int(5));
    }
}
