//! Caller-facing view over one parsed reply.
//!
//! [`Reply`] wraps the single top-level [`Value`] produced by one parse and
//! offers type-checked access: kind predicates, typed accessors, a generic
//! [`Reply::get`] conversion, and typed sequence extraction. All accessors
//! are read-only; a failed conversion leaves the tree intact and a different
//! accessor may be tried.

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::value::{Value, ValueKind};

/// One parsed reply, or nothing.
///
/// An empty facade (no parsed node) fails every conversion with
/// [`Error::Empty`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    value: Option<Value>,
}

/// Conversion from a parsed [`Value`] into a concrete Rust type, used by
/// [`Reply::get`] and [`Reply::array_of`].
pub trait FromValue: Sized {
    /// Convert a borrowed value. Fails with an access error on kind
    /// mismatch, null value, or out-of-range payload.
    fn from_value(value: &Value) -> Result<Self>;
}

impl Reply {
    /// Wrap one parsed value.
    #[inline]
    pub fn new(value: Value) -> Self {
        Self { value: Some(value) }
    }

    /// A facade holding no value.
    #[inline]
    pub fn empty() -> Self {
        Self { value: None }
    }

    /// Returns true if no value has been parsed into this facade.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Borrow the underlying value tree.
    pub fn value(&self) -> Result<&Value> {
        self.value.as_ref().ok_or(Error::Empty)
    }

    /// Take ownership of the underlying value tree.
    pub fn into_value(self) -> Result<Value> {
        self.value.ok_or(Error::Empty)
    }

    // ========================================================================
    // Predicates (an empty facade satisfies none of them)
    // ========================================================================

    /// Returns true if the reply is any null form.
    pub fn is_null(&self) -> bool {
        self.value.as_ref().is_some_and(Value::is_null)
    }

    /// Returns true if the reply is any string kind.
    pub fn is_string(&self) -> bool {
        self.value.as_ref().is_some_and(Value::is_string)
    }

    /// Returns true if the reply is any error kind.
    pub fn is_error(&self) -> bool {
        self.value.as_ref().is_some_and(Value::is_error)
    }

    /// Returns true if the reply is an integer.
    pub fn is_integer(&self) -> bool {
        self.value.as_ref().is_some_and(Value::is_integer)
    }

    /// Returns true if the reply is an array.
    pub fn is_array(&self) -> bool {
        self.value.as_ref().is_some_and(Value::is_array)
    }

    /// Returns true if the reply is a map.
    pub fn is_map(&self) -> bool {
        self.value.as_ref().is_some_and(Value::is_map)
    }

    /// Returns true if the reply is a set.
    pub fn is_set(&self) -> bool {
        self.value.as_ref().is_some_and(Value::is_set)
    }

    /// Returns true if the reply is a server-initiated push message.
    pub fn is_push(&self) -> bool {
        self.value.as_ref().is_some_and(Value::is_push)
    }

    /// Returns true if the parser attached attributes to the reply value.
    pub fn has_attributes(&self) -> bool {
        self.value.as_ref().is_some_and(Value::has_attributes)
    }

    // ========================================================================
    // Typed accessors
    // ========================================================================

    /// Integer payload.
    pub fn as_integer(&self) -> Result<i64> {
        self.value()?.as_integer()
    }

    /// Payload bytes of any string kind.
    pub fn as_string(&self) -> Result<&[u8]> {
        self.value()?.as_string()
    }

    /// UTF-8 view over any string kind.
    pub fn as_str(&self) -> Result<&str> {
        self.value()?.as_str()
    }

    /// Boolean payload.
    pub fn as_boolean(&self) -> Result<bool> {
        self.value()?.as_boolean()
    }

    /// Double payload.
    pub fn as_double(&self) -> Result<f64> {
        self.value()?.as_double()
    }

    /// Payload of either error kind.
    pub fn as_error_text(&self) -> Result<&[u8]> {
        self.value()?.as_error_text()
    }

    /// Elements of an array or push reply.
    pub fn as_vector(&self) -> Result<&[Value]> {
        self.value()?.as_vector()
    }

    // ========================================================================
    // Generic conversion
    // ========================================================================

    /// Convert the reply into `T`.
    ///
    /// Fails with [`Error::Empty`] if nothing was parsed, and with
    /// [`Error::Server`] carrying the server-supplied text if the reply is an
    /// error kind; otherwise routes to the accessor matching `T`.
    pub fn get<T: FromValue>(&self) -> Result<T> {
        convert(self.value()?)
    }

    /// Convert an array or push reply into a homogeneous `Vec<T>`, failing
    /// on the first child that does not convert.
    pub fn array_of<T: FromValue>(&self) -> Result<Vec<T>> {
        let value = self.value()?;
        if value.is_error() {
            return Err(server_error(value));
        }
        value.as_vector()?.iter().map(convert).collect()
    }

    /// Array of UTF-8 strings.
    pub fn as_string_array(&self) -> Result<Vec<String>> {
        self.array_of()
    }

    /// Array of integers.
    pub fn as_integer_array(&self) -> Result<Vec<i64>> {
        self.array_of()
    }
}

fn server_error(value: &Value) -> Error {
    match value.as_error_text() {
        Ok(text) => Error::Server(String::from_utf8_lossy(text).into_owned()),
        Err(e) => e,
    }
}

fn convert<T: FromValue>(value: &Value) -> Result<T> {
    if value.is_error() {
        return Err(server_error(value));
    }
    T::from_value(value)
}

// ============================================================================
// FromValue implementations
// ============================================================================

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_integer()
    }
}

macro_rules! from_value_narrow_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self> {
                    let n = value.as_integer()?;
                    <$ty>::try_from(n).map_err(|_| Error::OutOfRange(n))
                }
            }
        )*
    };
}

from_value_narrow_int!(i8, i16, i32, u8, u16, u32, u64, usize);

impl FromValue for bool {
    /// Accepts a RESP3 boolean, or the legacy integer encoding where any
    /// non-zero integer is true.
    fn from_value(value: &Value) -> Result<Self> {
        match value.kind() {
            ValueKind::Boolean(b) => Ok(*b),
            ValueKind::Integer(n) => Ok(*n != 0),
            _ => value.as_boolean(),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_double()
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_string().map(<[u8]>::to_vec)
    }
}

impl FromValue for Bytes {
    fn from_value(value: &Value) -> Result<Self> {
        // cheap clone of the underlying payload handle
        match value.kind() {
            ValueKind::SimpleString(s) => Ok(s.clone()),
            ValueKind::BulkString(Some(data)) => Ok(data.clone()),
            ValueKind::VerbatimString(Some((_, data))) => Ok(data.clone()),
            _ => value.as_string().map(Bytes::copy_from_slice),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reply() {
        let reply = Reply::empty();
        assert!(reply.is_empty());
        assert!(!reply.is_null());
        assert!(matches!(reply.get::<i64>(), Err(Error::Empty)));
        assert!(matches!(reply.as_str(), Err(Error::Empty)));
    }

    #[test]
    fn test_get_integer() {
        let reply = Reply::new(Value::integer(100500));
        assert_eq!(reply.get::<i64>().unwrap(), 100500);
        assert_eq!(reply.get::<u32>().unwrap(), 100500);
    }

    #[test]
    fn test_get_integer_out_of_range() {
        let reply = Reply::new(Value::integer(-1));
        assert!(matches!(reply.get::<u8>(), Err(Error::OutOfRange(-1))));
    }

    #[test]
    fn test_get_string_kinds() {
        assert_eq!(
            Reply::new(Value::simple_string("OK")).get::<String>().unwrap(),
            "OK"
        );
        assert_eq!(
            Reply::new(Value::bulk_string("data")).get::<String>().unwrap(),
            "data"
        );
        assert_eq!(
            Reply::new(Value::verbatim_string(*b"txt", "v")).get::<String>().unwrap(),
            "v"
        );
    }

    #[test]
    fn test_get_bytes() {
        let reply = Reply::new(Value::bulk_string(b"\0\r\n"));
        assert_eq!(reply.get::<Vec<u8>>().unwrap(), b"\0\r\n");
        assert_eq!(reply.get::<Bytes>().unwrap(), Bytes::from_static(b"\0\r\n"));
    }

    #[test]
    fn test_get_bool() {
        assert!(Reply::new(Value::boolean(true)).get::<bool>().unwrap());
        assert!(!Reply::new(Value::boolean(false)).get::<bool>().unwrap());
        // legacy integer encoding
        assert!(Reply::new(Value::integer(1)).get::<bool>().unwrap());
        assert!(!Reply::new(Value::integer(0)).get::<bool>().unwrap());
    }

    #[test]
    fn test_get_double() {
        let reply = Reply::new(Value::double(2.5));
        assert_eq!(reply.get::<f64>().unwrap(), 2.5);
    }

    #[test]
    fn test_get_null_fails_with_null_access() {
        let reply = Reply::new(Value::null_bulk_string());
        assert!(matches!(reply.get::<String>(), Err(Error::NullValue)));
    }

    #[test]
    fn test_get_wrong_type() {
        let reply = Reply::new(Value::simple_string("OK"));
        assert!(matches!(reply.get::<i64>(), Err(Error::WrongType { .. })));
        // the tree is untouched; another accessor still works
        assert_eq!(reply.as_str().unwrap(), "OK");
    }

    #[test]
    fn test_get_surfaces_server_error() {
        let reply = Reply::new(Value::error_message("ERR unknown command"));
        match reply.get::<String>() {
            Err(Error::Server(text)) => assert_eq!(text, "ERR unknown command"),
            other => panic!("expected server error, got {:?}", other),
        }
        // bulk errors surface the same way
        let reply = Reply::new(Value::bulk_error("SYNTAX bad"));
        assert!(matches!(reply.get::<i64>(), Err(Error::Server(_))));
    }

    #[test]
    fn test_array_of_integers() {
        let reply = Reply::new(Value::array(vec![Value::integer(1), Value::integer(2)]));
        assert_eq!(reply.as_integer_array().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_array_of_strings() {
        let reply = Reply::new(Value::array(vec![
            Value::simple_string("a"),
            Value::bulk_string("b"),
        ]));
        assert_eq!(reply.as_string_array().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_array_of_fails_on_first_bad_child() {
        let reply = Reply::new(Value::array(vec![
            Value::integer(1),
            Value::simple_string("no"),
        ]));
        assert!(matches!(
            reply.as_integer_array(),
            Err(Error::WrongType { .. })
        ));
    }

    #[test]
    fn test_array_of_accepts_push() {
        let reply = Reply::new(Value::push(vec![
            Value::simple_string("message"),
            Value::simple_string("channel"),
        ]));
        assert_eq!(
            reply.as_string_array().unwrap(),
            vec!["message", "channel"]
        );
    }

    #[test]
    fn test_array_of_null_array() {
        let reply = Reply::new(Value::null_array());
        assert!(matches!(reply.as_integer_array(), Err(Error::NullValue)));
    }
}
