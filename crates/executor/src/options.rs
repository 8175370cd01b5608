//! Declarative option parsing
//!
//! Each subcommand declares a static table of [`OptionSpec`]s. [`parse`]
//! scans `-name value` pairs left to right and produces a [`ParsedOptions`]:
//! flag options set or clear a bit, field options store a converted value.
//! Repeating an option is last-write-wins. Required options are checked
//! after the whole scan so the first missing one is reported, not the first
//! malformed pair.
//!
//! # Value conversion
//!
//! | Type | Accepted |
//! |------|----------|
//! | boolean | `Bool`, `Int` (non-zero is true), `1/0/true/false/yes/no/on/off` |
//! | integer | `Int` in `i32` range, decimal / `0x` / `0o` text |
//! | wide integer | `Int`, same text forms |
//! | string | `String`, `Int`, UTF-8 `Bytes` |
//! | byte sequence | `Bytes`, `String`, `Int` (decimal text) |

use keyhold_core::{Error, Result, Value};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Expected type of an option's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Boolean
    Bool,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    WideInt,
    /// Text
    Str,
    /// Raw bytes
    Bytes,
}

impl ValueType {
    /// Name used in type errors.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Bool => "boolean",
            ValueType::Int => "integer",
            ValueType::WideInt => "wide integer",
            ValueType::Str => "string",
            ValueType::Bytes => "byte sequence",
        }
    }
}

/// Where a parsed option lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Boolean option toggling an engine flag bit
    Flag(u32),
    /// Value stored in the given field slot
    Field(usize),
}

/// One entry of a subcommand's option table.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    /// Option word including the leading `-`
    pub name: &'static str,
    /// Expected value type
    pub ty: ValueType,
    /// Flag bit or field slot
    pub target: Target,
    /// Must appear at least once
    pub required: bool,
}

impl OptionSpec {
    /// Optional boolean flag option.
    pub const fn flag(name: &'static str, bit: u32) -> Self {
        Self {
            name,
            ty: ValueType::Bool,
            target: Target::Flag(bit),
            required: false,
        }
    }

    /// Optional field option.
    pub const fn field(name: &'static str, ty: ValueType, slot: usize) -> Self {
        Self {
            name,
            ty,
            target: Target::Field(slot),
            required: false,
        }
    }

    /// Mark the option as required.
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A converted option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Boolean
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    WideInt(i64),
    /// Text
    Str(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

/// Flag bits chosen by the caller, with the set of bits they touched.
///
/// Bits the caller never mentioned fall back to a default with
/// [`FlagSet::over`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSet {
    /// Bits explicitly set
    pub bits: u32,
    /// Bits explicitly set or cleared
    pub touched: u32,
}

impl FlagSet {
    /// Explicitly set or clear `bit`.
    pub fn with(mut self, bit: u32, on: bool) -> Self {
        self.apply(bit, on);
        self
    }

    fn apply(&mut self, bit: u32, on: bool) {
        if on {
            self.bits |= bit;
        } else {
            self.bits &= !bit;
        }
        self.touched |= bit;
    }

    /// Layer the explicit choices over `default`.
    pub fn over(self, default: u32) -> u32 {
        (default & !self.touched) | self.bits
    }
}

/// Result of parsing an option list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedOptions {
    /// Flag options
    pub flags: FlagSet,
    fields: SmallVec<[Option<Arg>; 4]>,
}

impl ParsedOptions {
    /// Raw field slot.
    pub fn field(&self, slot: usize) -> Option<&Arg> {
        self.fields.get(slot).and_then(Option::as_ref)
    }

    /// Take ownership of a field slot.
    pub fn take(&mut self, slot: usize) -> Option<Arg> {
        self.fields.get_mut(slot).and_then(Option::take)
    }

    /// Text field.
    pub fn take_str(&mut self, slot: usize) -> Option<String> {
        match self.take(slot)? {
            Arg::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean field.
    pub fn bool(&self, slot: usize) -> Option<bool> {
        match self.field(slot)? {
            Arg::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer field.
    pub fn int(&self, slot: usize) -> Option<i32> {
        match self.field(slot)? {
            Arg::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// Parse `-name value` pairs against `table`.
///
/// `usage` is reported verbatim when the words don't pair up.
pub fn parse(table: &[OptionSpec], words: &[Value], usage: &str) -> Result<ParsedOptions> {
    if words.len() % 2 != 0 {
        return Err(Error::wrong_args(usage));
    }
    let slots = table
        .iter()
        .filter_map(|s| match s.target {
            Target::Field(i) => Some(i + 1),
            Target::Flag(_) => None,
        })
        .max()
        .unwrap_or(0);
    let mut parsed = ParsedOptions {
        flags: FlagSet::default(),
        fields: SmallVec::from_elem(None, slots),
    };
    let mut seen: SmallVec<[&'static str; 8]> = SmallVec::new();

    for pair in words.chunks(2) {
        let name = option_name(&pair[0])?;
        let spec = table
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::UnknownOption { name: name.clone() })?;
        let arg = convert(spec.name, spec.ty, &pair[1])?;
        match (spec.target, arg) {
            (Target::Flag(bit), Arg::Bool(on)) => parsed.flags.apply(bit, on),
            (Target::Flag(_), _) => {
                return Err(Error::TypeError {
                    option: spec.name.to_string(),
                    expected: ValueType::Bool.name().to_string(),
                })
            }
            (Target::Field(i), arg) => parsed.fields[i] = Some(arg),
        }
        if !seen.contains(&spec.name) {
            seen.push(spec.name);
        }
    }

    if let Some(missing) = table
        .iter()
        .find(|s| s.required && !seen.contains(&s.name))
    {
        return Err(Error::MissingOption {
            name: missing.name.to_string(),
        });
    }
    Ok(parsed)
}

/// An option word as text.
pub fn option_name(word: &Value) -> Result<String> {
    to_text(word).ok_or_else(|| Error::UnknownOption {
        name: word.to_string(),
    })
}

/// Convert one value to `ty`, reporting `name` on failure.
pub fn convert(name: &str, ty: ValueType, value: &Value) -> Result<Arg> {
    let arg = match ty {
        ValueType::Bool => to_bool(value).map(Arg::Bool),
        ValueType::Int => to_int(value).map(Arg::Int),
        ValueType::WideInt => to_wide_int(value).map(Arg::WideInt),
        ValueType::Str => to_text(value).map(Arg::Str),
        ValueType::Bytes => to_bytes(value).map(Arg::Bytes),
    };
    arg.ok_or_else(|| type_error(name, ty))
}

/// The error for a value that does not convert to `ty`.
pub fn type_error(name: &str, ty: ValueType) -> Error {
    Error::TypeError {
        option: name.to_string(),
        expected: ty.name().to_string(),
    }
}

/// Boolean conversion.
pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int(i) => Some(*i != 0),
        Value::String(s) => parse_bool(s),
        Value::Bytes(b) => std::str::from_utf8(b).ok().and_then(parse_bool),
        _ => None,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => parse_int_text(other).map(|i| i != 0),
    }
}

/// 32-bit integer conversion.
pub fn to_int(value: &Value) -> Option<i32> {
    to_wide_int(value).and_then(|i| i32::try_from(i).ok())
}

/// 64-bit integer conversion.
pub fn to_wide_int(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::String(s) => parse_int_text(s),
        Value::Bytes(b) => std::str::from_utf8(b).ok().and_then(parse_int_text),
        _ => None,
    }
}

fn parse_int_text(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let magnitude = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = body.strip_prefix("0o").or_else(|| body.strip_prefix("0O")) {
        i64::from_str_radix(oct, 8).ok()?
    } else if body.starts_with(|c: char| c.is_ascii_digit()) {
        body.parse::<i64>().ok()?
    } else {
        return None;
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Text conversion.
pub fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Bytes(b) => String::from_utf8(b.clone()).ok(),
        _ => None,
    }
}

/// Byte sequence conversion. No implicit encoding beyond UTF-8 text.
pub fn to_bytes(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Bytes(b) => Some(b.clone()),
        Value::String(s) => Some(s.as_bytes().to_vec()),
        Value::Int(i) => Some(i.to_string().into_bytes()),
        _ => None,
    }
}
