//! RESP marker bytes.
//!
//! Every RESP value starts with a single byte identifying its type. The
//! attribute form has two accepted spellings (`|` and `` ` ``); both select
//! the same decode path.

/// Simple string: `+OK\r\n`
pub const SIMPLE_STRING: u8 = b'+';
/// Error message: `-ERR message\r\n`
pub const ERROR_MESSAGE: u8 = b'-';
/// Integer: `:1000\r\n`
pub const INTEGER: u8 = b':';
/// Bulk string: `$6\r\nfoobar\r\n`
pub const BULK_STRING: u8 = b'$';
/// Array: `*2\r\n...`
pub const ARRAY: u8 = b'*';
/// Null: `_\r\n`
pub const NULL: u8 = b'_';
/// Boolean: `#t\r\n` or `#f\r\n`
pub const BOOLEAN: u8 = b'#';
/// Double: `,3.14159\r\n`
pub const DOUBLE: u8 = b',';
/// Big number: `(12345678901234567890\r\n`
pub const BIG_NUMBER: u8 = b'(';
/// Bulk error: `!<len>\r\n<error>\r\n`
pub const BULK_ERROR: u8 = b'!';
/// Verbatim string: `=<len>\r\ntxt:<data>\r\n`
pub const VERBATIM_STRING: u8 = b'=';
/// Map: `%<len>\r\n<key><val>...`
pub const MAP: u8 = b'%';
/// Attribute block: `|<len>\r\n<key><val>...<value>`
pub const ATTRIBUTE: u8 = b'|';
/// Alternate spelling of the attribute marker.
pub const ATTRIBUTE_ALT: u8 = b'`';
/// Set: `~<len>\r\n<elem>...`
pub const SET: u8 = b'~';
/// Push message: `><len>\r\n<elem>...`
pub const PUSH: u8 = b'>';

/// Carriage return.
pub const CR: u8 = b'\r';
/// Line feed.
pub const LF: u8 = b'\n';
/// Line terminator used throughout the protocol.
pub const CRLF: &[u8] = b"\r\n";
