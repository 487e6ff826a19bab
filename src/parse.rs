//! Recursive-descent RESP message decoding.
//!
//! [`parse`] consumes exactly one complete message from a buffered stream,
//! positioned at a marker byte, and materializes it as a [`Value`] tree.
//! Attribute blocks (`|` / `` ` ``) are consumed as a prefix of the value
//! that follows them and attached to that value; they never surface as a
//! standalone node.
//!
//! Any failure leaves the stream at an indeterminate position: the caller
//! must reset the transport before reusing it. Partial results are never
//! returned.

use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::marker;
use crate::value::{Attributes, Value, ValueKind};

/// Default maximum nesting depth for aggregate values.
///
/// A maliciously deep message would otherwise exhaust the call stack; parsing
/// fails with [`Error::NestingTooDeep`] beyond this limit.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default maximum number of elements in a single aggregate (array, map,
/// set, push, or attribute block).
///
/// Prevents a message claiming billions of elements from driving a massive
/// allocation before any payload bytes arrive.
pub const DEFAULT_MAX_COLLECTION_ELEMENTS: usize = 1024 * 1024;

/// Default maximum size of a length-prefixed payload (512MB, the server-side
/// proto-max-bulk-len default).
pub const DEFAULT_MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Default maximum total elements across all aggregates in one message.
///
/// Caps cumulative allocation across nesting levels, which the per-collection
/// limit alone does not.
pub const DEFAULT_MAX_TOTAL_ITEMS: usize = 4 * 1024 * 1024;

/// Hardening limits applied while decoding a message.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Maximum nesting depth for aggregate values.
    pub max_depth: usize,
    /// Maximum number of elements in a single aggregate.
    pub max_collection_elements: usize,
    /// Maximum size of a length-prefixed payload in bytes.
    pub max_bulk_len: usize,
    /// Maximum total elements across all aggregates in one message.
    pub max_total_items: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseOptions {
    /// Create parse options with default limits.
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_collection_elements: DEFAULT_MAX_COLLECTION_ELEMENTS,
            max_bulk_len: DEFAULT_MAX_BULK_LEN,
            max_total_items: DEFAULT_MAX_TOTAL_ITEMS,
        }
    }

    /// Set the maximum nesting depth.
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum aggregate element count.
    pub const fn max_collection_elements(mut self, count: usize) -> Self {
        self.max_collection_elements = count;
        self
    }

    /// Set the maximum payload length.
    pub const fn max_bulk_len(mut self, len: usize) -> Self {
        self.max_bulk_len = len;
        self
    }

    /// Set the maximum total elements across all aggregates.
    pub const fn max_total_items(mut self, count: usize) -> Self {
        self.max_total_items = count;
        self
    }
}

/// Parse exactly one RESP value from the stream with default limits.
///
/// # Errors
///
/// Fails on transport errors, truncated input, unknown markers, and any
/// malformed field. An unknown marker consumes only the marker byte itself.
#[inline]
pub fn parse<R: BufRead>(stream: &mut R) -> Result<Value> {
    parse_with_options(stream, &ParseOptions::new())
}

/// Parse exactly one RESP value from the stream with custom limits.
pub fn parse_with_options<R: BufRead>(stream: &mut R, options: &ParseOptions) -> Result<Value> {
    let mut total_items = 0;
    parse_value(stream, options, 0, &mut total_items)
}

fn parse_value<R: BufRead>(
    stream: &mut R,
    options: &ParseOptions,
    depth: usize,
    total_items: &mut usize,
) -> Result<Value> {
    match read_marker(stream)? {
        marker::SIMPLE_STRING => Ok(ValueKind::SimpleString(read_line(stream)?).into()),
        marker::ERROR_MESSAGE => Ok(ValueKind::Error(read_line(stream)?).into()),
        marker::INTEGER => Ok(ValueKind::Integer(read_integer_line(stream)?).into()),
        marker::BULK_STRING => Ok(ValueKind::BulkString(read_blob(stream, options)?).into()),
        marker::ARRAY => {
            let elements = parse_elements(stream, options, depth, total_items)?;
            Ok(ValueKind::Array(elements).into())
        }
        marker::NULL => {
            let line = read_line(stream)?;
            if !line.is_empty() {
                return Err(Error::Protocol("expected bare CRLF after null".to_string()));
            }
            Ok(ValueKind::Null.into())
        }
        marker::BOOLEAN => {
            let line = read_line(stream)?;
            match line.as_ref() {
                b"t" => Ok(ValueKind::Boolean(true).into()),
                b"f" => Ok(ValueKind::Boolean(false).into()),
                _ => Err(Error::InvalidBoolean),
            }
        }
        marker::DOUBLE => Ok(ValueKind::Double(read_double_line(stream)?).into()),
        marker::BIG_NUMBER => Ok(ValueKind::BigNumber(read_line(stream)?).into()),
        marker::BULK_ERROR => Ok(ValueKind::BulkError(read_blob(stream, options)?).into()),
        marker::VERBATIM_STRING => {
            let payload = read_blob(stream, options)?;
            Ok(ValueKind::VerbatimString(split_verbatim(payload)?).into())
        }
        marker::MAP => {
            let entries = parse_pairs(stream, options, depth, total_items)?;
            Ok(ValueKind::Map(entries).into())
        }
        marker::SET => {
            let elements = parse_set(stream, options, depth, total_items)?;
            Ok(ValueKind::Set(elements).into())
        }
        marker::PUSH => {
            let elements = parse_elements(stream, options, depth, total_items)?;
            Ok(ValueKind::Push(elements).into())
        }
        marker::ATTRIBUTE | marker::ATTRIBUTE_ALT => {
            let attrs = parse_pairs(stream, options, depth, total_items)?;
            let mut value = parse_value(stream, options, depth + 1, total_items)?;
            value.set_attributes(attrs);
            Ok(value)
        }
        other => Err(Error::InvalidMarker(other)),
    }
}

// ============================================================================
// Framing helpers
// ============================================================================

fn read_marker<R: BufRead>(stream: &mut R) -> Result<u8> {
    let mut byte = [0u8; 1];
    match stream.read_exact(&mut byte) {
        Ok(()) => Ok(byte[0]),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(Error::UnexpectedEof),
        Err(e) => Err(e.into()),
    }
}

/// Read one CRLF-terminated line, excluding the terminator. Binary-unsafe by
/// construction; only used for the line-framed fields, never for payloads.
fn read_line<R: BufRead>(stream: &mut R) -> Result<Bytes> {
    let mut line = Vec::new();
    stream.read_until(marker::LF, &mut line)?;
    if !line.ends_with(b"\n") {
        return Err(Error::UnexpectedEof);
    }
    if line.len() < 2 || line[line.len() - 2] != marker::CR {
        return Err(Error::Protocol("line not terminated by CRLF".to_string()));
    }
    line.truncate(line.len() - 2);
    Ok(Bytes::from(line))
}

fn read_integer_line<R: BufRead>(stream: &mut R) -> Result<i64> {
    let line = read_line(stream)?;
    let s = std::str::from_utf8(&line)
        .map_err(|e| Error::InvalidInteger(e.to_string()))?;
    s.parse()
        .map_err(|e: std::num::ParseIntError| Error::InvalidInteger(e.to_string()))
}

fn read_double_line<R: BufRead>(stream: &mut R) -> Result<f64> {
    let line = read_line(stream)?;
    let s = std::str::from_utf8(&line)
        .map_err(|e| Error::InvalidDouble(e.to_string()))?;
    match s {
        "inf" => Ok(f64::INFINITY),
        "-inf" => Ok(f64::NEG_INFINITY),
        "nan" => Ok(f64::NAN),
        _ => s
            .parse()
            .map_err(|e: std::num::ParseFloatError| Error::InvalidDouble(e.to_string())),
    }
}

/// Read a length-prefixed payload: decimal length line, then exactly that
/// many bytes, then a discarded CRLF. A negative length is the null form and
/// consumes nothing further.
fn read_blob<R: BufRead>(stream: &mut R, options: &ParseOptions) -> Result<Option<Bytes>> {
    let len = read_integer_line(stream)?;
    if len < 0 {
        return Ok(None);
    }
    let len = usize::try_from(len).map_err(|_| Error::InvalidInteger(len.to_string()))?;
    if len > options.max_bulk_len {
        return Err(Error::BulkTooLong {
            len,
            max: options.max_bulk_len,
        });
    }

    let mut payload = vec![0u8; len];
    match stream.read_exact(&mut payload) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(Error::UnexpectedEof)
        }
        Err(e) => return Err(e.into()),
    }

    let mut crlf = [0u8; 2];
    match stream.read_exact(&mut crlf) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(Error::UnexpectedEof)
        }
        Err(e) => return Err(e.into()),
    }
    if crlf != [marker::CR, marker::LF] {
        return Err(Error::Protocol("payload not terminated by CRLF".to_string()));
    }

    Ok(Some(Bytes::from(payload)))
}

/// Split a verbatim string payload into its 3-byte encoding tag and data.
/// The tag and its `:` separator are counted in the declared length.
fn split_verbatim(payload: Option<Bytes>) -> Result<Option<([u8; 3], Bytes)>> {
    let payload = match payload {
        Some(payload) => payload,
        None => return Ok(None),
    };
    if payload.len() < 4 || payload[3] != b':' {
        return Err(Error::InvalidVerbatimFormat);
    }
    let format: [u8; 3] = payload[..3]
        .try_into()
        .map_err(|_| Error::InvalidVerbatimFormat)?;
    Ok(Some((format, payload.slice(4..))))
}

// ============================================================================
// Aggregate helpers
// ============================================================================

/// Read an aggregate count line and charge it against the element limits.
/// Returns `None` for a negative (null) count when `nullable` is set.
fn read_count<R: BufRead>(
    stream: &mut R,
    options: &ParseOptions,
    depth: usize,
    total_items: &mut usize,
    weight: usize,
    nullable: bool,
) -> Result<Option<usize>> {
    if depth >= options.max_depth {
        return Err(Error::NestingTooDeep(depth));
    }

    let count = read_integer_line(stream)?;
    if count < 0 {
        if nullable {
            return Ok(None);
        }
        return Err(Error::Protocol("negative aggregate length".to_string()));
    }
    let count = usize::try_from(count).map_err(|_| Error::InvalidInteger(count.to_string()))?;
    if count > options.max_collection_elements {
        return Err(Error::CollectionTooLarge(count));
    }

    let items = count
        .checked_mul(weight)
        .ok_or(Error::CollectionTooLarge(usize::MAX))?;
    *total_items = total_items
        .checked_add(items)
        .ok_or(Error::CollectionTooLarge(usize::MAX))?;
    if *total_items > options.max_total_items {
        return Err(Error::CollectionTooLarge(*total_items));
    }

    Ok(Some(count))
}

/// Parse the body of an array or push: `<count>\r\n` then `count` values.
fn parse_elements<R: BufRead>(
    stream: &mut R,
    options: &ParseOptions,
    depth: usize,
    total_items: &mut usize,
) -> Result<Option<Vec<Value>>> {
    let count = match read_count(stream, options, depth, total_items, 1, true)? {
        Some(count) => count,
        None => return Ok(None),
    };

    let mut elements = Vec::with_capacity(count);
    for _ in 0..count {
        elements.push(parse_value(stream, options, depth + 1, total_items)?);
    }
    Ok(Some(elements))
}

/// Parse the body of a map or attribute block: `<count>\r\n` then `count`
/// key/value pairs. Duplicate keys keep the first occurrence.
fn parse_pairs<R: BufRead>(
    stream: &mut R,
    options: &ParseOptions,
    depth: usize,
    total_items: &mut usize,
) -> Result<Attributes> {
    let count = read_count(stream, options, depth, total_items, 2, false)?
        .unwrap_or_default();

    let mut entries = BTreeMap::new();
    for _ in 0..count {
        let key = parse_value(stream, options, depth + 1, total_items)?;
        let value = parse_value(stream, options, depth + 1, total_items)?;
        entries.entry(key).or_insert(value);
    }
    Ok(entries)
}

/// Parse the body of a set: duplicates collapse, first occurrence wins.
fn parse_set<R: BufRead>(
    stream: &mut R,
    options: &ParseOptions,
    depth: usize,
    total_items: &mut usize,
) -> Result<BTreeSet<Value>> {
    let count = read_count(stream, options, depth, total_items, 1, false)?
        .unwrap_or_default();

    let mut elements = BTreeSet::new();
    for _ in 0..count {
        elements.insert(parse_value(stream, options, depth + 1, total_items)?);
    }
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(mut data: &[u8]) -> Result<Value> {
        let value = parse(&mut data)?;
        assert!(data.is_empty(), "parser left {} unread bytes", data.len());
        Ok(value)
    }

    #[test]
    fn test_parse_simple_string() {
        let value = parse_all(b"+OK\r\n").unwrap();
        assert_eq!(value, Value::simple_string("OK"));
    }

    #[test]
    fn test_parse_error_message() {
        let value = parse_all(b"-ERR unknown command\r\n").unwrap();
        assert_eq!(value, Value::error_message("ERR unknown command"));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_all(b":1000\r\n").unwrap(), Value::integer(1000));
        assert_eq!(parse_all(b":-42\r\n").unwrap(), Value::integer(-42));
    }

    #[test]
    fn test_parse_invalid_integer() {
        let mut data: &[u8] = b":10x0\r\n";
        assert!(matches!(parse(&mut data), Err(Error::InvalidInteger(_))));
    }

    #[test]
    fn test_parse_bulk_string() {
        let value = parse_all(b"$6\r\nfoobar\r\n").unwrap();
        assert_eq!(value, Value::bulk_string("foobar"));
    }

    #[test]
    fn test_parse_empty_bulk_string() {
        let value = parse_all(b"$0\r\n\r\n").unwrap();
        assert_eq!(value, Value::bulk_string(""));
        assert!(!value.is_null());
    }

    #[test]
    fn test_parse_null_bulk_string() {
        let value = parse_all(b"$-1\r\n").unwrap();
        assert!(value.is_null());
        assert!(value.is_bulk_string());
        assert!(matches!(value.as_bulk_string(), Err(Error::NullValue)));
    }

    #[test]
    fn test_parse_binary_safe_payload() {
        let value = parse_all(b"$10\r\nab\0cd\r\nef\x01\r\n").unwrap();
        assert_eq!(value.as_bulk_string().unwrap(), b"ab\0cd\r\nef\x01");
    }

    #[test]
    fn test_parse_array() {
        let value = parse_all(b"*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n").unwrap();
        assert_eq!(
            value,
            Value::array(vec![Value::bulk_string("foo"), Value::bulk_string("bar")])
        );
    }

    #[test]
    fn test_parse_empty_array() {
        let value = parse_all(b"*0\r\n").unwrap();
        assert_eq!(value.as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_parse_null_array() {
        let value = parse_all(b"*-1\r\n").unwrap();
        assert!(value.is_array());
        assert!(value.is_null());
    }

    #[test]
    fn test_parse_nested_array() {
        let value = parse_all(b"*2\r\n:1\r\n*2\r\n:2\r\n:3\r\n").unwrap();
        assert_eq!(
            value,
            Value::array(vec![
                Value::integer(1),
                Value::array(vec![Value::integer(2), Value::integer(3)]),
            ])
        );
    }

    #[test]
    fn test_parse_null() {
        let value = parse_all(b"_\r\n").unwrap();
        assert_eq!(value, Value::null());
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(parse_all(b"#t\r\n").unwrap(), Value::boolean(true));
        assert_eq!(parse_all(b"#f\r\n").unwrap(), Value::boolean(false));

        let mut data: &[u8] = b"#x\r\n";
        assert!(matches!(parse(&mut data), Err(Error::InvalidBoolean)));
    }

    #[test]
    fn test_parse_double() {
        assert_eq!(parse_all(b",3.14159\r\n").unwrap(), Value::double(3.14159));
        assert_eq!(parse_all(b",-1.5\r\n").unwrap(), Value::double(-1.5));
        assert_eq!(parse_all(b",10\r\n").unwrap(), Value::double(10.0));
        assert_eq!(
            parse_all(b",inf\r\n").unwrap().as_double().unwrap(),
            f64::INFINITY
        );
        assert_eq!(
            parse_all(b",-inf\r\n").unwrap().as_double().unwrap(),
            f64::NEG_INFINITY
        );
        assert!(parse_all(b",nan\r\n").unwrap().as_double().unwrap().is_nan());
    }

    #[test]
    fn test_parse_big_number() {
        let value = parse_all(b"(3492890328409238509324850943850943825024385\r\n").unwrap();
        assert_eq!(
            value.as_big_number().unwrap(),
            b"3492890328409238509324850943850943825024385"
        );
    }

    #[test]
    fn test_parse_bulk_error() {
        let value = parse_all(b"!21\r\nSYNTAX invalid syntax\r\n").unwrap();
        assert_eq!(value.as_bulk_error().unwrap(), b"SYNTAX invalid syntax");
        assert!(value.is_error());
    }

    #[test]
    fn test_parse_verbatim_string() {
        let value = parse_all(b"=15\r\ntxt:Some string\r\n").unwrap();
        let (format, data) = value.as_verbatim_string().unwrap();
        assert_eq!(format, b"txt");
        assert_eq!(data, b"Some string");
    }

    #[test]
    fn test_parse_verbatim_string_bad_format() {
        let mut data: &[u8] = b"=2\r\nab\r\n";
        assert!(matches!(
            parse(&mut data),
            Err(Error::InvalidVerbatimFormat)
        ));
    }

    #[test]
    fn test_parse_map() {
        let value = parse_all(b"%2\r\n+first\r\n:1\r\n+second\r\n:2\r\n").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get(&Value::simple_string("first")),
            Some(&Value::integer(1))
        );
        assert_eq!(
            map.get(&Value::simple_string("second")),
            Some(&Value::integer(2))
        );
    }

    #[test]
    fn test_parse_map_duplicate_key_first_wins() {
        let value = parse_all(b"%2\r\n+k\r\n:1\r\n+k\r\n:2\r\n").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Value::simple_string("k")), Some(&Value::integer(1)));
    }

    #[test]
    fn test_parse_set() {
        let value = parse_all(b"~3\r\n+a\r\n+b\r\n+a\r\n").unwrap();
        let set = value.as_set().unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Value::simple_string("a")));
        assert!(set.contains(&Value::simple_string("b")));
    }

    #[test]
    fn test_parse_push() {
        let value = parse_all(b">3\r\n+message\r\n+channel\r\n$5\r\nhello\r\n").unwrap();
        let elements = value.as_push().unwrap();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0], Value::simple_string("message"));
    }

    #[test]
    fn test_parse_attribute_attaches_to_next_value() {
        let value = parse_all(b"|1\r\n+ttl\r\n:3600\r\n+OK\r\n").unwrap();
        assert!(value.is_simple_string());
        assert_eq!(value.as_simple_string().unwrap(), b"OK");
        let attrs = value.attributes().unwrap();
        assert_eq!(
            attrs.get(&Value::simple_string("ttl")),
            Some(&Value::integer(3600))
        );
    }

    #[test]
    fn test_parse_attribute_alt_marker() {
        let value = parse_all(b"`1\r\n+a\r\n:1\r\n:7\r\n").unwrap();
        assert_eq!(value.as_integer().unwrap(), 7);
        assert!(value.has_attributes());
    }

    #[test]
    fn test_parse_attribute_inside_array_stays_on_element() {
        let value = parse_all(b"*2\r\n|1\r\n+a\r\n:1\r\n+first\r\n+second\r\n").unwrap();
        let elements = value.as_array().unwrap();
        assert!(elements[0].has_attributes());
        assert!(!elements[1].has_attributes());
        assert!(!value.has_attributes());
    }

    #[test]
    fn test_parse_unknown_marker_consumes_only_marker() {
        let mut data: &[u8] = b"&5\r\n";
        assert!(matches!(parse(&mut data), Err(Error::InvalidMarker(b'&'))));
        assert_eq!(data, b"5\r\n");
    }

    #[test]
    fn test_parse_truncated_input() {
        assert!(matches!(
            parse(&mut &b""[..]),
            Err(Error::UnexpectedEof)
        ));
        assert!(matches!(
            parse(&mut &b"+OK"[..]),
            Err(Error::UnexpectedEof)
        ));
        assert!(matches!(
            parse(&mut &b"$6\r\nfoo"[..]),
            Err(Error::UnexpectedEof)
        ));
        assert!(matches!(
            parse(&mut &b"*2\r\n:1\r\n"[..]),
            Err(Error::UnexpectedEof)
        ));
    }

    #[test]
    fn test_parse_missing_cr() {
        let mut data: &[u8] = b"+OK\n";
        assert!(matches!(parse(&mut data), Err(Error::Protocol(_))));
    }

    #[test]
    fn test_depth_limit() {
        let options = ParseOptions::new().max_depth(2);
        let mut data: &[u8] = b"*1\r\n*1\r\n*1\r\n:1\r\n";
        assert!(matches!(
            parse_with_options(&mut data, &options),
            Err(Error::NestingTooDeep(2))
        ));
    }

    #[test]
    fn test_collection_element_limit() {
        let options = ParseOptions::new().max_collection_elements(2);
        let mut data: &[u8] = b"*3\r\n:1\r\n:2\r\n:3\r\n";
        assert!(matches!(
            parse_with_options(&mut data, &options),
            Err(Error::CollectionTooLarge(3))
        ));
    }

    #[test]
    fn test_bulk_len_limit() {
        let options = ParseOptions::new().max_bulk_len(4);
        let mut data: &[u8] = b"$5\r\nhello\r\n";
        assert!(matches!(
            parse_with_options(&mut data, &options),
            Err(Error::BulkTooLong { len: 5, max: 4 })
        ));
    }

    #[test]
    fn test_total_items_limit() {
        let options = ParseOptions::new().max_total_items(3);
        let mut data: &[u8] = b"*2\r\n*2\r\n:1\r\n:2\r\n:3\r\n";
        assert!(matches!(
            parse_with_options(&mut data, &options),
            Err(Error::CollectionTooLarge(4))
        ));
    }

    #[test]
    fn test_negative_map_length_rejected() {
        let mut data: &[u8] = b"%-1\r\n";
        assert!(matches!(parse(&mut data), Err(Error::Protocol(_))));
    }
}
