//! Composable RESP value encoding.
//!
//! One stateless, copy-cheap builder per value kind, each wrapping a borrow
//! of the data to encode. Aggregates compose by holding child builders and
//! writing them in declared order. Builders only write; flushing the sink is
//! the caller's job (see [`crate::execute`]).
//!
//! ```
//! use resp_codec::{put, Array, BulkString};
//!
//! let mut buf = Vec::new();
//! put(&mut buf, Array(&[&BulkString("GET"), &BulkString("mykey")])).unwrap();
//! assert_eq!(buf, b"*2\r\n$3\r\nGET\r\n$5\r\nmykey\r\n");
//! ```

use std::io::{self, Write};

use crate::marker;

/// A builder that knows how to write its own wire encoding.
pub trait Serialize {
    /// Write the wire encoding to the sink. Does not flush.
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()>;
}

impl<T: Serialize + ?Sized> Serialize for &T {
    #[inline]
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        (**self).serialize(sink)
    }
}

/// Write a builder's encoding to the sink.
#[inline]
pub fn put<W: Write, T: Serialize>(sink: &mut W, value: T) -> io::Result<()> {
    value.serialize(sink)
}

fn put_line(sink: &mut dyn Write, marker: u8, payload: &[u8]) -> io::Result<()> {
    sink.write_all(&[marker])?;
    sink.write_all(payload)?;
    sink.write_all(marker::CRLF)
}

fn put_length(sink: &mut dyn Write, marker: u8, len: usize) -> io::Result<()> {
    let mut buf = itoa::Buffer::new();
    put_line(sink, marker, buf.format(len).as_bytes())
}

fn put_blob(sink: &mut dyn Write, marker: u8, data: &[u8]) -> io::Result<()> {
    put_length(sink, marker, data.len())?;
    sink.write_all(data)?;
    sink.write_all(marker::CRLF)
}

/// Simple string: `+<text>\r\n`.
///
/// The text must not contain CR or LF bytes; the encoding is line-framed and
/// embedded terminators would desynchronize the stream. Use [`BulkString`]
/// or [`BinaryData`] for arbitrary content.
#[derive(Debug, Clone, Copy)]
pub struct SimpleString<'a>(pub &'a str);

impl Serialize for SimpleString<'_> {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        put_line(sink, marker::SIMPLE_STRING, self.0.as_bytes())
    }
}

/// Error message: `-<text>\r\n`. Same CR/LF precondition as [`SimpleString`].
#[derive(Debug, Clone, Copy)]
pub struct ErrorMessage<'a>(pub &'a str);

impl Serialize for ErrorMessage<'_> {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        put_line(sink, marker::ERROR_MESSAGE, self.0.as_bytes())
    }
}

/// Integer: `:<n>\r\n`.
#[derive(Debug, Clone, Copy)]
pub struct Integer(pub i64);

impl Serialize for Integer {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        let mut buf = itoa::Buffer::new();
        put_line(sink, marker::INTEGER, buf.format(self.0).as_bytes())
    }
}

/// Boolean on the legacy encoding path: an [`Integer`] `1` or `0`.
#[derive(Debug, Clone, Copy)]
pub struct Boolean(pub bool);

impl Serialize for Boolean {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        Integer(i64::from(self.0)).serialize(sink)
    }
}

/// Bulk string: `$<len>\r\n<text>\r\n`. Binary-safe; an empty string is
/// encoded as length `0`, still fully framed.
#[derive(Debug, Clone, Copy)]
pub struct BulkString<'a>(pub &'a str);

impl Serialize for BulkString<'_> {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        put_blob(sink, marker::BULK_STRING, self.0.as_bytes())
    }
}

/// Raw bytes encoded as a bulk string: `$<len>\r\n<data>\r\n`.
#[derive(Debug, Clone, Copy)]
pub struct BinaryData<'a>(pub &'a [u8]);

impl Serialize for BinaryData<'_> {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        put_blob(sink, marker::BULK_STRING, self.0)
    }
}

/// Null, encoded as a null bulk string: `$-1\r\n`.
#[derive(Debug, Clone, Copy)]
pub struct Null;

impl Serialize for Null {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        sink.write_all(b"$-1\r\n")
    }
}

/// Double: `,<float>\r\n`, with `inf`/`-inf`/`nan` literals for the
/// non-finite values.
#[derive(Debug, Clone, Copy)]
pub struct Double(pub f64);

impl Serialize for Double {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        if self.0.is_nan() {
            return put_line(sink, marker::DOUBLE, b"nan");
        }
        if self.0.is_infinite() {
            let literal: &[u8] = if self.0.is_sign_positive() {
                b"inf"
            } else {
                b"-inf"
            };
            return put_line(sink, marker::DOUBLE, literal);
        }
        let mut buf = ryu::Buffer::new();
        put_line(sink, marker::DOUBLE, buf.format(self.0).as_bytes())
    }
}

/// Big number: `(<decimal text>\r\n`.
#[derive(Debug, Clone, Copy)]
pub struct BigNumber<'a>(pub &'a str);

impl Serialize for BigNumber<'_> {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        put_line(sink, marker::BIG_NUMBER, self.0.as_bytes())
    }
}

/// Bulk error: `!<len>\r\n<text>\r\n`.
#[derive(Debug, Clone, Copy)]
pub struct BulkError<'a>(pub &'a str);

impl Serialize for BulkError<'_> {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        put_blob(sink, marker::BULK_ERROR, self.0.as_bytes())
    }
}

/// Verbatim string: `=<len>\r\n<fmt>:<data>\r\n`, where the declared length
/// covers the 3-byte format tag, the `:` separator, and the data.
#[derive(Debug, Clone, Copy)]
pub struct VerbatimString<'a> {
    pub format: [u8; 3],
    pub data: &'a [u8],
}

impl Serialize for VerbatimString<'_> {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        put_length(sink, marker::VERBATIM_STRING, 4 + self.data.len())?;
        sink.write_all(&self.format)?;
        sink.write_all(b":")?;
        sink.write_all(self.data)?;
        sink.write_all(marker::CRLF)
    }
}

/// Array: `*<arity>\r\n` followed by each child in declared order.
#[derive(Clone, Copy)]
pub struct Array<'a>(pub &'a [&'a (dyn Serialize + 'a)]);

impl Serialize for Array<'_> {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        put_length(sink, marker::ARRAY, self.0.len())?;
        for child in self.0 {
            child.serialize(sink)?;
        }
        Ok(())
    }
}

/// Null array: `*-1\r\n`, no children.
#[derive(Debug, Clone, Copy)]
pub struct NullArray;

impl Serialize for NullArray {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        sink.write_all(b"*-1\r\n")
    }
}

/// Map: `%<pairs>\r\n` followed by each key and value in declared order.
#[derive(Clone, Copy)]
pub struct Map<'a>(pub &'a [(&'a (dyn Serialize + 'a), &'a (dyn Serialize + 'a))]);

impl Serialize for Map<'_> {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        put_length(sink, marker::MAP, self.0.len())?;
        for (key, value) in self.0 {
            key.serialize(sink)?;
            value.serialize(sink)?;
        }
        Ok(())
    }
}

/// Set: `~<arity>\r\n` followed by each element in declared order.
#[derive(Clone, Copy)]
pub struct Set<'a>(pub &'a [&'a (dyn Serialize + 'a)]);

impl Serialize for Set<'_> {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        put_length(sink, marker::SET, self.0.len())?;
        for element in self.0 {
            element.serialize(sink)?;
        }
        Ok(())
    }
}

/// Push message: `><arity>\r\n` followed by each element in declared order.
#[derive(Clone, Copy)]
pub struct Push<'a>(pub &'a [&'a (dyn Serialize + 'a)]);

impl Serialize for Push<'_> {
    fn serialize(&self, sink: &mut dyn Write) -> io::Result<()> {
        put_length(sink, marker::PUSH, self.0.len())?;
        for element in self.0 {
            element.serialize(sink)?;
        }
        Ok(())
    }
}
