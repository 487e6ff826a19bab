//! Error types for RESP encoding, parsing, and value access.

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for RESP operations.
///
/// Parse-time errors (`UnexpectedEof`, `InvalidMarker`, `InvalidInteger`, ...)
/// are fatal to the current message: the stream is desynchronized and must be
/// reset before it can carry another exchange. Accessor errors (`WrongType`,
/// `NullValue`, `Empty`) are local to a single call and leave the parsed tree
/// and the stream untouched.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying transport failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended in the middle of a message.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Leading byte is not a known marker.
    #[error("invalid marker byte: {0:#04x}")]
    InvalidMarker(u8),

    /// Malformed integer or length field.
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// Malformed floating point literal.
    #[error("invalid double: {0}")]
    InvalidDouble(String),

    /// Boolean line was not `t` or `f`.
    #[error("invalid boolean: expected 't' or 'f'")]
    InvalidBoolean,

    /// Verbatim string payload shorter than its 3-byte tag and separator.
    #[error("invalid verbatim string format")]
    InvalidVerbatimFormat,

    /// Other protocol violation (bad framing, negative map length, ...).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Collection size exceeds the configured limit.
    #[error("collection too large: {0} elements exceeds limit")]
    CollectionTooLarge(usize),

    /// Nesting depth exceeds the configured limit.
    #[error("nesting too deep: depth {0} exceeds limit")]
    NestingTooDeep(usize),

    /// Bulk payload exceeds the configured limit.
    #[error("bulk payload too long: {len} bytes exceeds {max} byte limit")]
    BulkTooLong { len: usize, max: usize },

    /// A typed accessor was invoked against a value of a different kind.
    #[error("wrong type: expected {expected}, found {actual}")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },

    /// A typed accessor was invoked against a null value.
    #[error("null value cannot be converted")]
    NullValue,

    /// The reply facade holds no parsed value.
    #[error("empty reply")]
    Empty,

    /// The value carries no attribute block.
    #[error("value has no attributes")]
    NoAttributes,

    /// The server replied with an error value.
    #[error("server error: {0}")]
    Server(String),

    /// A text conversion was requested on non-UTF-8 payload bytes.
    #[error("string value is not valid utf-8")]
    InvalidUtf8,

    /// Integer value does not fit the requested target type.
    #[error("integer value {0} out of range for target type")]
    OutOfRange(i64),
}

impl Error {
    /// Returns true if this error means the stream is desynchronized and
    /// must be reestablished before reuse.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedEof
                | Error::InvalidMarker(_)
                | Error::InvalidInteger(_)
                | Error::InvalidDouble(_)
                | Error::InvalidBoolean
                | Error::InvalidVerbatimFormat
                | Error::Protocol(_)
                | Error::CollectionTooLarge(_)
                | Error::NestingTooDeep(_)
                | Error::BulkTooLong { .. }
        )
    }

    /// Returns true if this error is local to a single accessor call.
    pub fn is_access(&self) -> bool {
        matches!(
            self,
            Error::WrongType { .. }
                | Error::NullValue
                | Error::Empty
                | Error::NoAttributes
                | Error::InvalidUtf8
                | Error::OutOfRange(_)
        )
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}
