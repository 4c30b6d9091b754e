//! Dynamic value representation for TOML documents.
//!
//! This module provides the [`Value`] enum which represents any node of the
//! value tree the encoder accepts: scalars, arrays, tables, the
//! comment-carrying wrapper, and extension scalars behind the [`Scalar`]
//! trait.
//!
//! ## Core Types
//!
//! - [`Value`]: any encodable value (null, bool, integer, big integer,
//!   float, string, date, time, date-time, array, table, commented value,
//!   extension scalar)
//! - [`Scalar`]: an open extension point for scalar types the enum does not
//!   cover; the encoder resolves them through its dispatch tables
//! - [`Commented`]: a value paired with verbatim comment text, preserved by
//!   the comment-preserving encoder variant
//!
//! ## Usage Patterns
//!
//! ```rust
//! use toml_emit::{Table, Value};
//!
//! let table = Table::new();
//! table.insert("title", "example");
//! table.insert("port", 8080);
//! table.insert("ratio", 0.5);
//! table.insert("absent", Value::Null); // omitted from output
//!
//! let text = toml_emit::to_string(&table).unwrap();
//! assert_eq!(text, "title = \"example\"\nport = 8080\nratio = 0.5\n");
//! ```
//!
//! Extension scalars carry any `'static` type; the encoder formats them via
//! registered exact-type formatters, registered capability probes, or the
//! string fallback:
//!
//! ```rust
//! use std::path::PathBuf;
//! use toml_emit::{Table, Value};
//!
//! let table = Table::new();
//! table.insert("path", Value::ext(PathBuf::from("/tmp/x")));
//! assert_eq!(toml_emit::to_string(&table).unwrap(), "path = \"/tmp/x\"\n");
//! ```

use crate::table::Table;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use num_bigint::BigInt;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::rc::Rc;

/// An extension scalar: any value the [`Value`] enum does not model.
///
/// The encoder resolves a `dyn Scalar` in three steps, in order:
///
/// 1. exact-type formatter table (keyed by [`TypeId`](std::any::TypeId)),
/// 2. registered capability probes, first match wins,
/// 3. string formatting of [`text`](Scalar::text) — exhaustion is never an
///    error.
///
/// Implementations exist for the fixed-width numeric primitives, `char`,
/// network address types, and [`PathBuf`]; any other `'static + Debug` type
/// can implement it in one line by delegating `text` to its `Display`.
pub trait Scalar: Any + fmt::Debug {
    /// The value as `Any`, for downcasting in dispatch tables and probes.
    fn as_any(&self) -> &dyn Any;

    /// The value's plain textual representation, used by the string
    /// fallback formatter.
    fn text(&self) -> String;
}

macro_rules! display_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl Scalar for $ty {
            fn as_any(&self) -> &dyn Any {
                self
            }

            fn text(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

display_scalar!(
    i8, i16, i32, u8, u16, u32, u64, i128, u128, f32, char, Ipv4Addr, Ipv6Addr, IpAddr, SocketAddr,
);

impl Scalar for PathBuf {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn text(&self) -> String {
        self.display().to_string()
    }
}

impl Scalar for String {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn text(&self) -> String {
        self.clone()
    }
}

/// A value paired with verbatim comment text.
///
/// `comment` is stored exactly as a decoder captured it, including its
/// leading separator (for example `" # enabled in prod"` or `"\n# section
/// note"`). The comment-preserving encoder variant appends it unchanged
/// after the wrapped value's rendered text; the default variant drops it.
#[derive(Clone, Debug, PartialEq)]
pub struct Commented {
    pub value: Value,
    pub comment: String,
}

impl Commented {
    pub fn new(value: impl Into<Value>, comment: impl Into<String>) -> Self {
        Commented {
            value: value.into(),
            comment: comment.into(),
        }
    }
}

/// A dynamically-typed representation of any encodable TOML value.
///
/// # Examples
///
/// ```rust
/// use toml_emit::Value;
///
/// let null = Value::Null;
/// let num = Value::Integer(42);
/// let text = Value::from("hello");
///
/// assert!(null.is_null());
/// assert_eq!(num.as_integer(), Some(42));
/// assert_eq!(text.as_str(), Some("hello"));
/// ```
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Absence. A table key holding `Null` is silently omitted.
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    /// Integer beyond the `i64` range.
    BigInt(BigInt),
    Float(f64),
    String(String),
    /// Calendar date, no time component.
    Date(NaiveDate),
    /// Local time; TOML local times carry no zone offset.
    Time(NaiveTime),
    /// Offset date-time, rendered with a literal `Z` when the offset is UTC.
    Datetime(DateTime<FixedOffset>),
    Array(Vec<Value>),
    Table(Table),
    /// A value with verbatim comment text attached.
    Commented(Box<Commented>),
    /// An extension scalar resolved through the encoder's dispatch tables.
    Ext(Rc<dyn Scalar>),
}

impl Value {
    /// Wraps any [`Scalar`] implementation as an extension value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toml_emit::Value;
    ///
    /// let v = Value::ext(3.5f32);
    /// assert!(matches!(v, Value::Ext(_)));
    /// ```
    pub fn ext(scalar: impl Scalar) -> Value {
        Value::Ext(Rc::new(scalar))
    }

    /// Attaches verbatim comment text to a value.
    pub fn commented(value: impl Into<Value>, comment: impl Into<String>) -> Value {
        Value::Commented(Box::new(Commented::new(value, comment)))
    }

    /// Returns `true` if the value is [`Value::Null`].
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if the value is a table.
    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Value::Table(_))
    }

    /// Returns `true` if the value is an array.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// If the value is a boolean, returns it.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is an `i64` integer, returns it.
    #[inline]
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// If the value is a float, returns it.
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an array, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// If the value is a table, returns a handle to it.
    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Datetime(a), Value::Datetime(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            (Value::Commented(a), Value::Commented(b)) => a == b,
            (Value::Ext(a), Value::Ext(b)) => {
                Rc::ptr_eq(a, b) || (a.as_any().type_id() == b.as_any().type_id() && a.text() == b.text())
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::BigInt(BigInt::from(value)),
        }
    }
}

impl From<i128> for Value {
    fn from(value: i128) -> Self {
        match i64::try_from(value) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::BigInt(BigInt::from(value)),
        }
    }
}

impl From<u128> for Value {
    fn from(value: u128) -> Self {
        match i64::try_from(value) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::BigInt(BigInt::from(value)),
        }
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::BigInt(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

/// TOML local times carry no zone offset; the offset is dropped here.
impl From<(NaiveTime, FixedOffset)> for Value {
    fn from((time, _offset): (NaiveTime, FixedOffset)) -> Self {
        Value::Time(time)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::Datetime(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Datetime(value.fixed_offset())
    }
}

impl From<Table> for Value {
    fn from(value: Table) -> Self {
        Value::Table(value)
    }
}

impl From<Commented> for Value {
    fn from(value: Commented) -> Self {
        Value::Commented(Box::new(value))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::BigInt(i) => serializer.serialize_str(&i.to_string()),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.serialize_str(&d.to_string()),
            Value::Time(t) => serializer.serialize_str(&t.to_string()),
            Value::Datetime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            Value::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Table(table) => table.serialize(serializer),
            Value::Commented(c) => c.value.serialize(serializer),
            Value::Ext(scalar) => serializer.serialize_str(&scalar.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_primitives() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i32), Value::Integer(42));
        assert_eq!(Value::from(3.5f64), Value::Float(3.5));
        assert_eq!(Value::from("test"), Value::String("test".to_string()));
        assert_eq!(Value::from(u64::MAX), Value::BigInt(BigInt::from(u64::MAX)));
        assert_eq!(Value::from(7u64), Value::Integer(7));
    }

    #[test]
    fn from_option_maps_none_to_null() {
        assert_eq!(Value::from(Some(1)), Value::Integer(1));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn from_vec_converts_elements() {
        let v = Value::from(vec![1, 2, 3]);
        assert_eq!(
            v,
            Value::Array(vec![
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(3)
            ])
        );
    }

    #[test]
    fn offset_time_drops_offset() {
        let time = NaiveTime::from_hms_opt(3, 4, 5).unwrap();
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(Value::from((time, offset)), Value::Time(time));
    }

    #[test]
    fn ext_equality_compares_type_and_text() {
        assert_eq!(Value::ext(3.5f32), Value::ext(3.5f32));
        assert_ne!(Value::ext(1i8), Value::ext(1i16));
    }

    #[test]
    fn accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Integer(5).as_integer(), Some(5));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::Bool(true).as_float(), None);
    }
}
