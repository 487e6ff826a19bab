//! RESP2/RESP3 codec with a synchronous client-side value model.
//!
//! This crate encodes commands and decodes replies for the RESP wire format
//! (the Redis serialization protocol), covering RESP2 plus the RESP3
//! extensions:
//!
//! - Simple String: `+OK\r\n`
//! - Error: `-ERR message\r\n`
//! - Integer: `:1000\r\n`
//! - Bulk String: `$6\r\nfoobar\r\n` (null: `$-1\r\n`)
//! - Array: `*2\r\n...` (null: `*-1\r\n`)
//! - Null: `_\r\n`
//! - Boolean: `#t\r\n` / `#f\r\n`
//! - Double: `,3.14159\r\n`
//! - Big Number: `(12345678901234567890\r\n`
//! - Bulk Error: `!<len>\r\n<error>\r\n`
//! - Verbatim String: `=<len>\r\ntxt:<data>\r\n`
//! - Map: `%<len>\r\n<key><val>...`
//! - Set: `~<len>\r\n<elem>...`
//! - Push: `><len>\r\n<elem>...`
//! - Attribute: `|<len>\r\n<key><val>...<value>` (also spelled `` ` ``)
//!
//! The transport is any `BufRead + Write` byte stream; connecting,
//! reconnecting, and timeouts stay outside this crate. One request/reply
//! exchange is in flight per stream at a time: [`execute`] writes a command
//! fully, flushes, then parses exactly one reply.
//!
//! # Example - decoding a reply
//!
//! ```
//! use resp_codec::parse;
//!
//! let mut input: &[u8] = b"*2\r\n:1\r\n:2\r\n";
//! let value = parse(&mut input).unwrap();
//! let elements = value.as_array().unwrap();
//! assert_eq!(elements[0].as_integer().unwrap(), 1);
//! ```
//!
//! # Example - encoding a command
//!
//! ```
//! use resp_codec::Command;
//!
//! let mut buf = Vec::new();
//! Command::new("GET").arg("mykey").write_to(&mut buf).unwrap();
//! assert_eq!(buf, b"*2\r\n$3\r\nGET\r\n$5\r\nmykey\r\n");
//! ```
//!
//! # Example - typed access
//!
//! ```
//! use resp_codec::{parse, Reply};
//!
//! let mut input: &[u8] = b"$5\r\nhello\r\n";
//! let reply = Reply::new(parse(&mut input).unwrap());
//! assert_eq!(reply.get::<String>().unwrap(), "hello");
//! ```

pub mod marker;

mod error;
mod parse;
mod reply;
mod request;
mod serialize;
mod value;

pub use error::{Error, Result};
pub use parse::{
    parse, parse_with_options, ParseOptions, DEFAULT_MAX_BULK_LEN,
    DEFAULT_MAX_COLLECTION_ELEMENTS, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TOTAL_ITEMS,
};
pub use reply::{FromValue, Reply};
pub use request::{execute, execute_no_flush, Command};
pub use serialize::{
    put, Array, BigNumber, BinaryData, Boolean, BulkError, BulkString, Double, ErrorMessage,
    Integer, Map, Null, NullArray, Push, Serialize, Set, SimpleString, VerbatimString,
};
pub use value::{Attributes, Value, ValueKind};
