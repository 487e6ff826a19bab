//! Parsed RESP values.
//!
//! [`Value`] is one node of a decoded message: a tagged payload plus an
//! optional attribute block attached by the parser. Aggregates own their
//! children by value; a tree is immutable once built and is torn down as a
//! unit.
//!
//! Values are totally ordered (kind rank first, then the kind's natural
//! payload order) so they can key the associative containers used by maps
//! and sets. Attributes take no part in ordering or equality.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;

use crate::error::{Error, Result};

/// Attribute metadata attached to a value: an ordered key/value association.
pub type Attributes = BTreeMap<Value, Value>;

/// A parsed RESP value with optional attribute metadata.
#[derive(Debug, Clone)]
pub struct Value {
    kind: ValueKind,
    attrs: Option<Box<Attributes>>,
}

/// The tagged payload of a [`Value`].
///
/// Nullable kinds (`BulkString`, `BulkError`, `VerbatimString`, `Array`,
/// `Push`) carry `None` when the wire encoded them with a negative
/// length/count. The distinct `Null` kind is the RESP3 `_\r\n` form.
#[derive(Debug, Clone)]
pub enum ValueKind {
    /// Simple string: `+OK\r\n`
    SimpleString(Bytes),
    /// Error message: `-ERR message\r\n`
    Error(Bytes),
    /// Integer: `:1000\r\n`
    Integer(i64),
    /// Bulk string: `$6\r\nfoobar\r\n`, or `$-1\r\n` for `None`
    BulkString(Option<Bytes>),
    /// Array: `*2\r\n...`, or `*-1\r\n` for `None`
    Array(Option<Vec<Value>>),
    /// Null: `_\r\n`
    Null,
    /// Boolean: `#t\r\n` or `#f\r\n`
    Boolean(bool),
    /// Double: `,3.14159\r\n`
    Double(f64),
    /// Big number, kept as its raw decimal text: `(12345678901234567890\r\n`
    BigNumber(Bytes),
    /// Bulk error: `!<len>\r\n<error>\r\n`, or `!-1\r\n` for `None`
    BulkError(Option<Bytes>),
    /// Verbatim string with its 3-byte encoding tag:
    /// `=<len>\r\ntxt:<data>\r\n`, or `=-1\r\n` for `None`
    VerbatimString(Option<([u8; 3], Bytes)>),
    /// Map: `%<len>\r\n<key><val>...`
    Map(BTreeMap<Value, Value>),
    /// Set: `~<len>\r\n<elem>...`
    Set(BTreeSet<Value>),
    /// Push message (server-initiated): `><len>\r\n<elem>...`
    Push(Option<Vec<Value>>),
}

impl From<ValueKind> for Value {
    #[inline]
    fn from(kind: ValueKind) -> Self {
        Value { kind, attrs: None }
    }
}

impl Value {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a simple string value.
    #[inline]
    pub fn simple_string(s: impl AsRef<[u8]>) -> Self {
        ValueKind::SimpleString(Bytes::copy_from_slice(s.as_ref())).into()
    }

    /// Create an error message value.
    #[inline]
    pub fn error_message(msg: impl AsRef<[u8]>) -> Self {
        ValueKind::Error(Bytes::copy_from_slice(msg.as_ref())).into()
    }

    /// Create an integer value.
    #[inline]
    pub fn integer(n: i64) -> Self {
        ValueKind::Integer(n).into()
    }

    /// Create a bulk string value.
    #[inline]
    pub fn bulk_string(data: impl AsRef<[u8]>) -> Self {
        ValueKind::BulkString(Some(Bytes::copy_from_slice(data.as_ref()))).into()
    }

    /// Create a null bulk string value.
    #[inline]
    pub fn null_bulk_string() -> Self {
        ValueKind::BulkString(None).into()
    }

    /// Create an array value.
    #[inline]
    pub fn array(elements: Vec<Value>) -> Self {
        ValueKind::Array(Some(elements)).into()
    }

    /// Create a null array value.
    #[inline]
    pub fn null_array() -> Self {
        ValueKind::Array(None).into()
    }

    /// Create a null value.
    #[inline]
    pub fn null() -> Self {
        ValueKind::Null.into()
    }

    /// Create a boolean value.
    #[inline]
    pub fn boolean(b: bool) -> Self {
        ValueKind::Boolean(b).into()
    }

    /// Create a double value.
    #[inline]
    pub fn double(d: f64) -> Self {
        ValueKind::Double(d).into()
    }

    /// Create a big number value from its decimal text.
    #[inline]
    pub fn big_number(num: impl AsRef<[u8]>) -> Self {
        ValueKind::BigNumber(Bytes::copy_from_slice(num.as_ref())).into()
    }

    /// Create a bulk error value.
    #[inline]
    pub fn bulk_error(msg: impl AsRef<[u8]>) -> Self {
        ValueKind::BulkError(Some(Bytes::copy_from_slice(msg.as_ref()))).into()
    }

    /// Create a verbatim string value.
    #[inline]
    pub fn verbatim_string(format: [u8; 3], data: impl AsRef<[u8]>) -> Self {
        ValueKind::VerbatimString(Some((format, Bytes::copy_from_slice(data.as_ref())))).into()
    }

    /// Create a map value.
    #[inline]
    pub fn map(entries: BTreeMap<Value, Value>) -> Self {
        ValueKind::Map(entries).into()
    }

    /// Create a set value.
    #[inline]
    pub fn set(elements: BTreeSet<Value>) -> Self {
        ValueKind::Set(elements).into()
    }

    /// Create a push message value.
    #[inline]
    pub fn push(elements: Vec<Value>) -> Self {
        ValueKind::Push(Some(elements)).into()
    }

    /// Borrow the tagged payload.
    #[inline]
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Name of this value's kind, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            ValueKind::SimpleString(_) => "simple string",
            ValueKind::Error(_) => "error message",
            ValueKind::Integer(_) => "integer",
            ValueKind::BulkString(_) => "bulk string",
            ValueKind::Array(_) => "array",
            ValueKind::Null => "null",
            ValueKind::Boolean(_) => "boolean",
            ValueKind::Double(_) => "double",
            ValueKind::BigNumber(_) => "big number",
            ValueKind::BulkError(_) => "bulk error",
            ValueKind::VerbatimString(_) => "verbatim string",
            ValueKind::Map(_) => "map",
            ValueKind::Set(_) => "set",
            ValueKind::Push(_) => "push",
        }
    }

    // ========================================================================
    // Attribute carrier
    // ========================================================================

    /// Returns true if the parser attached an attribute block to this value.
    #[inline]
    pub fn has_attributes(&self) -> bool {
        self.attrs.is_some()
    }

    /// Borrow the attribute block.
    pub fn attributes(&self) -> Result<&Attributes> {
        self.attrs.as_deref().ok_or(Error::NoAttributes)
    }

    /// Attach an attribute block. Used by the parser when it consumes an
    /// attribute prefix; works uniformly across all kinds.
    pub(crate) fn set_attributes(&mut self, attrs: Attributes) {
        self.attrs = Some(Box::new(attrs));
    }

    // ========================================================================
    // Type predicates
    // ========================================================================

    /// Returns true if this is a simple string.
    #[inline]
    pub fn is_simple_string(&self) -> bool {
        matches!(self.kind, ValueKind::SimpleString(_))
    }

    /// Returns true if this is an error message.
    #[inline]
    pub fn is_error_message(&self) -> bool {
        matches!(self.kind, ValueKind::Error(_))
    }

    /// Returns true if this is an integer.
    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(self.kind, ValueKind::Integer(_))
    }

    /// Returns true if this is a bulk string (including the null form).
    #[inline]
    pub fn is_bulk_string(&self) -> bool {
        matches!(self.kind, ValueKind::BulkString(_))
    }

    /// Returns true if this is an array (including the null form).
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self.kind, ValueKind::Array(_))
    }

    /// Returns true if this is a boolean.
    #[inline]
    pub fn is_boolean(&self) -> bool {
        matches!(self.kind, ValueKind::Boolean(_))
    }

    /// Returns true if this is a double.
    #[inline]
    pub fn is_double(&self) -> bool {
        matches!(self.kind, ValueKind::Double(_))
    }

    /// Returns true if this is a big number.
    #[inline]
    pub fn is_big_number(&self) -> bool {
        matches!(self.kind, ValueKind::BigNumber(_))
    }

    /// Returns true if this is a bulk error (including the null form).
    #[inline]
    pub fn is_bulk_error(&self) -> bool {
        matches!(self.kind, ValueKind::BulkError(_))
    }

    /// Returns true if this is a verbatim string (including the null form).
    #[inline]
    pub fn is_verbatim_string(&self) -> bool {
        matches!(self.kind, ValueKind::VerbatimString(_))
    }

    /// Returns true if this is a map.
    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self.kind, ValueKind::Map(_))
    }

    /// Returns true if this is a set.
    #[inline]
    pub fn is_set(&self) -> bool {
        matches!(self.kind, ValueKind::Set(_))
    }

    /// Returns true if this is a push message.
    #[inline]
    pub fn is_push(&self) -> bool {
        matches!(self.kind, ValueKind::Push(_))
    }

    /// Returns true for any string kind: simple, bulk, or verbatim.
    #[inline]
    pub fn is_string(&self) -> bool {
        self.is_simple_string() || self.is_bulk_string() || self.is_verbatim_string()
    }

    /// Returns true for any error kind: error message or bulk error.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.is_error_message() || self.is_bulk_error()
    }

    /// Returns true if this value is null: the explicit `Null` kind, or any
    /// nullable kind whose null flag is set.
    pub fn is_null(&self) -> bool {
        matches!(
            self.kind,
            ValueKind::Null
                | ValueKind::BulkString(None)
                | ValueKind::Array(None)
                | ValueKind::BulkError(None)
                | ValueKind::VerbatimString(None)
                | ValueKind::Push(None)
        )
    }

    // ========================================================================
    // Typed accessors
    // ========================================================================

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::WrongType {
            expected,
            actual: self.type_name(),
        }
    }

    /// Simple string payload.
    pub fn as_simple_string(&self) -> Result<&[u8]> {
        match &self.kind {
            ValueKind::SimpleString(s) => Ok(s),
            _ => Err(self.mismatch("simple string")),
        }
    }

    /// Error message payload.
    pub fn as_error_message(&self) -> Result<&[u8]> {
        match &self.kind {
            ValueKind::Error(msg) => Ok(msg),
            _ => Err(self.mismatch("error message")),
        }
    }

    /// Integer payload.
    pub fn as_integer(&self) -> Result<i64> {
        match &self.kind {
            ValueKind::Integer(n) => Ok(*n),
            _ => Err(self.mismatch("integer")),
        }
    }

    /// Bulk string payload. Fails with [`Error::NullValue`] on the null form.
    pub fn as_bulk_string(&self) -> Result<&[u8]> {
        match &self.kind {
            ValueKind::BulkString(Some(data)) => Ok(data),
            ValueKind::BulkString(None) => Err(Error::NullValue),
            _ => Err(self.mismatch("bulk string")),
        }
    }

    /// Boolean payload.
    pub fn as_boolean(&self) -> Result<bool> {
        match &self.kind {
            ValueKind::Boolean(b) => Ok(*b),
            _ => Err(self.mismatch("boolean")),
        }
    }

    /// Double payload.
    pub fn as_double(&self) -> Result<f64> {
        match &self.kind {
            ValueKind::Double(d) => Ok(*d),
            _ => Err(self.mismatch("double")),
        }
    }

    /// Big number decimal text.
    pub fn as_big_number(&self) -> Result<&[u8]> {
        match &self.kind {
            ValueKind::BigNumber(n) => Ok(n),
            _ => Err(self.mismatch("big number")),
        }
    }

    /// Bulk error payload. Fails with [`Error::NullValue`] on the null form.
    pub fn as_bulk_error(&self) -> Result<&[u8]> {
        match &self.kind {
            ValueKind::BulkError(Some(msg)) => Ok(msg),
            ValueKind::BulkError(None) => Err(Error::NullValue),
            _ => Err(self.mismatch("bulk error")),
        }
    }

    /// Verbatim string encoding tag and payload.
    pub fn as_verbatim_string(&self) -> Result<(&[u8; 3], &[u8])> {
        match &self.kind {
            ValueKind::VerbatimString(Some((format, data))) => Ok((format, data)),
            ValueKind::VerbatimString(None) => Err(Error::NullValue),
            _ => Err(self.mismatch("verbatim string")),
        }
    }

    /// Map entries.
    pub fn as_map(&self) -> Result<&BTreeMap<Value, Value>> {
        match &self.kind {
            ValueKind::Map(entries) => Ok(entries),
            _ => Err(self.mismatch("map")),
        }
    }

    /// Set elements.
    pub fn as_set(&self) -> Result<&BTreeSet<Value>> {
        match &self.kind {
            ValueKind::Set(elements) => Ok(elements),
            _ => Err(self.mismatch("set")),
        }
    }

    /// Array elements. Fails with [`Error::NullValue`] on the null form.
    pub fn as_array(&self) -> Result<&[Value]> {
        match &self.kind {
            ValueKind::Array(Some(elements)) => Ok(elements),
            ValueKind::Array(None) => Err(Error::NullValue),
            _ => Err(self.mismatch("array")),
        }
    }

    /// Push message elements.
    pub fn as_push(&self) -> Result<&[Value]> {
        match &self.kind {
            ValueKind::Push(Some(elements)) => Ok(elements),
            ValueKind::Push(None) => Err(Error::NullValue),
            _ => Err(self.mismatch("push")),
        }
    }

    /// Elements of either ordered sequence kind: array or push.
    pub fn as_vector(&self) -> Result<&[Value]> {
        match &self.kind {
            ValueKind::Array(_) => self.as_array(),
            ValueKind::Push(_) => self.as_push(),
            _ => Err(self.mismatch("array or push")),
        }
    }

    /// Payload bytes of any string kind: simple, bulk, or verbatim.
    pub fn as_string(&self) -> Result<&[u8]> {
        match &self.kind {
            ValueKind::SimpleString(_) => self.as_simple_string(),
            ValueKind::BulkString(_) => self.as_bulk_string(),
            ValueKind::VerbatimString(_) => self.as_verbatim_string().map(|(_, data)| data),
            _ => Err(self.mismatch("string")),
        }
    }

    /// UTF-8 view over any string kind.
    pub fn as_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(self.as_string()?)?)
    }

    /// Payload of either error kind: error message or bulk error.
    pub fn as_error_text(&self) -> Result<&[u8]> {
        match &self.kind {
            ValueKind::Error(_) => self.as_error_message(),
            ValueKind::BulkError(_) => self.as_bulk_error(),
            _ => Err(self.mismatch("error")),
        }
    }
}

// ============================================================================
// Total ordering
// ============================================================================

impl ValueKind {
    /// Fixed ranking of kinds, in declaration order. The first key of the
    /// ordering relation used for associative placement.
    fn rank(&self) -> u8 {
        match self {
            ValueKind::SimpleString(_) => 0,
            ValueKind::Error(_) => 1,
            ValueKind::Integer(_) => 2,
            ValueKind::BulkString(_) => 3,
            ValueKind::Array(_) => 4,
            ValueKind::Null => 5,
            ValueKind::Boolean(_) => 6,
            ValueKind::Double(_) => 7,
            ValueKind::BigNumber(_) => 8,
            ValueKind::BulkError(_) => 9,
            ValueKind::VerbatimString(_) => 10,
            ValueKind::Map(_) => 11,
            ValueKind::Set(_) => 12,
            ValueKind::Push(_) => 13,
        }
    }

    /// Payload comparison within one kind. Only called with equal ranks, so
    /// the cross-kind arm is never taken.
    fn cmp_payload(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ValueKind::SimpleString(a), ValueKind::SimpleString(b))
            | (ValueKind::Error(a), ValueKind::Error(b))
            | (ValueKind::BigNumber(a), ValueKind::BigNumber(b)) => a.cmp(b),
            (ValueKind::Integer(a), ValueKind::Integer(b)) => a.cmp(b),
            (ValueKind::BulkString(a), ValueKind::BulkString(b))
            | (ValueKind::BulkError(a), ValueKind::BulkError(b)) => a.cmp(b),
            (ValueKind::Array(a), ValueKind::Array(b))
            | (ValueKind::Push(a), ValueKind::Push(b)) => a.cmp(b),
            (ValueKind::Null, ValueKind::Null) => Ordering::Equal,
            (ValueKind::Boolean(a), ValueKind::Boolean(b)) => a.cmp(b),
            (ValueKind::Double(a), ValueKind::Double(b)) => a.total_cmp(b),
            (ValueKind::VerbatimString(a), ValueKind::VerbatimString(b)) => match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some((fa, da)), Some((fb, db))) => fa.cmp(fb).then_with(|| da.cmp(db)),
            },
            (ValueKind::Map(a), ValueKind::Map(b)) => a.cmp(b),
            (ValueKind::Set(a), ValueKind::Set(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .rank()
            .cmp(&other.kind.rank())
            .then_with(|| self.kind.cmp_payload(&other.kind))
    }
}

impl PartialOrd for Value {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}
