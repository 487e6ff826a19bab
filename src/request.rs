//! Command encoding and the request/reply exchange.
//!
//! A command is encoded as an array of bulk strings: the command name first,
//! then each argument. [`execute`] writes one command, flushes, parses
//! exactly one reply from the same stream, and wraps it in a [`Reply`].
//! The protocol is strictly half-duplex per call, with no pipelining.
//!
//! The transport is anything offering buffered line reads, exact-length
//! reads, and flushable writes: `BufRead + Write`. Connection establishment
//! and reconnection are the caller's concern.

use std::io::{self, BufRead, Write};

use crate::error::Result;
use crate::parse;
use crate::reply::Reply;
use crate::serialize::{put, Array, BinaryData, Serialize};

/// A command under construction: name plus binary-safe arguments.
///
/// ```
/// use resp_codec::Command;
///
/// let mut buf = Vec::new();
/// Command::new("SET").arg("key").arg("value").write_to(&mut buf).unwrap();
/// assert_eq!(buf, b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n");
/// ```
#[derive(Debug, Clone)]
pub struct Command {
    parts: Vec<Vec<u8>>,
}

impl Command {
    /// Start a command with the given name.
    pub fn new(name: impl AsRef<[u8]>) -> Self {
        Self {
            parts: vec![name.as_ref().to_vec()],
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<[u8]>) -> Self {
        self.parts.push(arg.as_ref().to_vec());
        self
    }

    /// Append several arguments.
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        for arg in args {
            self.parts.push(arg.as_ref().to_vec());
        }
        self
    }

    /// Write the command's wire encoding to the sink without flushing.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        let items: Vec<BinaryData> = self.parts.iter().map(|p| BinaryData(p)).collect();
        let children: Vec<&dyn Serialize> = items.iter().map(|i| i as &dyn Serialize).collect();
        put(sink, Array(&children))
    }

    /// Write the command, flush, and parse the single reply.
    pub fn execute<S: BufRead + Write>(&self, stream: &mut S) -> Result<Reply> {
        self.write_to(stream)?;
        stream.flush()?;
        let value = parse::parse(stream)?;
        Ok(Reply::new(value))
    }
}

/// Execute one command: write it fully, flush, then read exactly one reply.
///
/// This is the only point where the serializer, the parser, the reply
/// facade, and the external transport meet.
pub fn execute<S, A>(stream: &mut S, name: &str, args: &[A]) -> Result<Reply>
where
    S: BufRead + Write,
    A: AsRef<[u8]>,
{
    Command::new(name).args(args).execute(stream)
}

/// Encode one command to the stream without flushing, for callers that batch
/// writes at the transport layer before turning the line around.
pub fn execute_no_flush<S, A>(stream: &mut S, name: &str, args: &[A]) -> Result<()>
where
    S: Write,
    A: AsRef<[u8]>,
{
    Command::new(name).args(args).write_to(stream)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let mut buf = Vec::new();
        Command::new("set").arg("k").arg("v").write_to(&mut buf).unwrap();
        assert_eq!(buf, b"*3\r\n$3\r\nset\r\n$1\r\nk\r\n$1\r\nv\r\n");
    }

    #[test]
    fn test_command_no_args() {
        let mut buf = Vec::new();
        Command::new("PING").write_to(&mut buf).unwrap();
        assert_eq!(buf, b"*1\r\n$4\r\nPING\r\n");
    }

    #[test]
    fn test_command_binary_argument() {
        let mut buf = Vec::new();
        Command::new("SET")
            .arg("key")
            .arg(b"\x00\r\nraw".as_slice())
            .write_to(&mut buf)
            .unwrap();
        assert_eq!(buf, b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$6\r\n\x00\r\nraw\r\n");
    }

    #[test]
    fn test_execute_no_flush_encodes_only() {
        let mut buf = Vec::new();
        execute_no_flush(&mut buf, "GET", &["mykey"]).unwrap();
        assert_eq!(buf, b"*2\r\n$3\r\nGET\r\n$5\r\nmykey\r\n");
    }
}
