//! RESP decoder
//!
//! Streaming state machine over a [`BufReader`]. The reader pulls more bytes
//! from the source on demand, so a streaming decode only fails on I/O errors
//! or malformed input. The one-shot helpers decode a complete in-memory
//! buffer and report any truncation as [`ProtocolError::UnexpectedEof`].
//!
//! ## Grammar
//! ```text
//! +<text>\r\n          simple string
//! -<text>\r\n          error
//! :<decimal>\r\n       integer (text kept verbatim)
//! $<len>\r\n<data>\r\n bulk string, $-1\r\n is null
//! *<count>\r\n<values> array, *-1\r\n is null
//! <tok> <tok> ...\r\n  inline command, decoded as an array of bulk strings
//! ```

use std::io::Read;

use bytes::Bytes;

use crate::bufio::BufReader;
use crate::config::Config;
use crate::error::{CodecError, ProtocolError, Result};

use super::value::{RespType, RespValue};

/// Cap on capacity reserved up front for a declared array count
const PREALLOC_LIMIT: usize = 1024;

/// An array whose children are still being decoded
struct PendingArray {
    items: Vec<RespValue>,
    remaining: usize,
}

/// Streaming RESP decoder
pub struct Decoder<R> {
    /// Buffered byte source
    reader: BufReader<R>,

    /// Largest accepted bulk string
    max_bulk_len: usize,

    /// Largest accepted array count
    max_array_len: usize,

    /// First error seen; the decoder refuses further use afterwards
    err: Option<CodecError>,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder with the default configuration
    pub fn new(rd: R) -> Self {
        Self::with_config(rd, &Config::default())
    }

    /// Create a decoder with a given read buffer capacity
    pub fn with_capacity(rd: R, size: usize) -> Self {
        let config = Config::builder().read_buffer_size(size).build();
        Self::with_config(rd, &config)
    }

    /// Create a decoder from a config
    pub fn with_config(rd: R, config: &Config) -> Self {
        Self::with_reader(BufReader::with_capacity(rd, config.read_buffer_size), config)
    }

    /// Create a decoder over an existing buffered reader
    pub fn with_reader(reader: BufReader<R>, config: &Config) -> Self {
        Self {
            reader,
            max_bulk_len: config.max_bulk_len,
            max_array_len: config.max_array_len,
            err: None,
        }
    }

    /// The underlying buffered reader
    pub fn reader(&self) -> &BufReader<R> {
        &self.reader
    }

    /// The error that failed this decoder, if any
    pub fn error(&self) -> Option<&CodecError> {
        self.err.as_ref()
    }

    /// Decode the next value; inline commands come back as arrays
    pub fn decode(&mut self) -> Result<RespValue> {
        if self.err.is_some() {
            return Err(CodecError::FailedDecoder);
        }
        let result = self.decode_resp();
        self.latch(result)
    }

    /// Decode the next value from a stream of values
    ///
    /// Returns `Ok(None)` when the source ends cleanly between values and
    /// [`CodecError::EndOfStream`] when it ends in the middle of one.
    pub fn decode_next(&mut self) -> Result<Option<RespValue>> {
        let start = self.reader.position();
        match self.decode() {
            Ok(value) => Ok(Some(value)),
            Err(CodecError::EndOfStream)
                if self.reader.buffered() == 0 && self.reader.position() == start =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Decode the next client command as a list of bulk strings
    ///
    /// Accepts either an inline command or a non-empty array whose elements
    /// are all bulk strings.
    pub fn decode_multi_bulk(&mut self) -> Result<Vec<RespValue>> {
        if self.err.is_some() {
            return Err(CodecError::FailedDecoder);
        }
        let result = self.decode_command();
        self.latch(result)
    }

    fn latch<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.err = Some(err.clone());
        }
        result
    }

    fn decode_resp(&mut self) -> Result<RespValue> {
        let tag = self.reader.peek_byte()?;
        if RespType::from_tag(tag).is_none() {
            return Ok(RespValue::Array(Some(self.decode_inline()?)));
        }
        self.decode_tagged()
    }

    fn decode_command(&mut self) -> Result<Vec<RespValue>> {
        if self.reader.peek_byte()? != RespType::Array.tag() {
            return self.decode_inline();
        }
        self.reader.read_byte()?;

        let n = match self.decode_array_len()? {
            None | Some(0) => return Err(ProtocolError::EmptyCommand.into()),
            Some(n) => n,
        };

        let mut multi = Vec::with_capacity(n.min(PREALLOC_LIMIT));
        for _ in 0..n {
            if self.reader.read_byte()? != RespType::BulkString.tag() {
                return Err(ProtocolError::InvalidMultiBulk.into());
            }
            multi.push(RespValue::BulkString(self.decode_bulk()?));
        }
        Ok(multi)
    }

    /// Decode one complete tagged value
    ///
    /// Arrays are tracked on an explicit stack rather than by recursion, so
    /// nesting depth is bounded by memory, not by the call stack.
    fn decode_tagged(&mut self) -> Result<RespValue> {
        let mut stack: Vec<PendingArray> = Vec::new();

        'outer: loop {
            let tag = self.reader.read_byte()?;
            let mut value = match RespType::from_tag(tag) {
                Some(RespType::SimpleString) => RespValue::SimpleString(self.decode_text()?),
                Some(RespType::Error) => RespValue::Error(self.decode_text()?),
                Some(RespType::Integer) => RespValue::Integer(self.decode_text()?),
                Some(RespType::BulkString) => RespValue::BulkString(self.decode_bulk()?),
                Some(RespType::Array) => match self.decode_array_len()? {
                    None => RespValue::Array(None),
                    Some(0) => RespValue::Array(Some(Vec::new())),
                    Some(n) => {
                        stack.push(PendingArray {
                            items: Vec::with_capacity(n.min(PREALLOC_LIMIT)),
                            remaining: n,
                        });
                        continue;
                    }
                },
                None => return Err(ProtocolError::InvalidTypeTag(tag).into()),
            };

            // Hand the finished value to its parent, closing every array it completes
            while let Some(mut parent) = stack.pop() {
                parent.items.push(value);
                parent.remaining -= 1;
                if parent.remaining > 0 {
                    stack.push(parent);
                    continue 'outer;
                }
                value = RespValue::Array(Some(parent.items));
            }
            return Ok(value);
        }
    }

    /// Bytes up to CRLF, without the terminator
    fn decode_text(&mut self) -> Result<Bytes> {
        let mut line = self.reader.read_bytes(b'\n')?;
        if !line.ends_with(b"\r\n") {
            return Err(ProtocolError::MissingCrlf.into());
        }
        line.truncate(line.len() - 2);
        Ok(line.freeze())
    }

    /// A CRLF-terminated decimal length or count
    fn decode_int(&mut self) -> Result<i64> {
        let n = match self.reader.read_slice(b'\n') {
            Ok(line) => parse_int_line(line)?,
            Err(CodecError::BufferFull) => {
                let line = self.reader.read_bytes(b'\n')?;
                parse_int_line(&line)?
            }
            Err(err) => return Err(err),
        };
        Ok(n)
    }

    fn decode_bulk(&mut self) -> Result<Option<Bytes>> {
        let n = self.decode_int()?;
        if n == -1 {
            return Ok(None);
        }
        if n < -1 {
            return Err(ProtocolError::InvalidBulkLength(n).into());
        }
        let len = usize::try_from(n).map_err(|_| ProtocolError::InvalidBulkLength(n))?;
        if len > self.max_bulk_len {
            return Err(ProtocolError::BulkTooLarge {
                len,
                max: self.max_bulk_len,
            }
            .into());
        }

        let mut data = self.reader.read_full(len + 2)?;
        if &data[len..] != b"\r\n" {
            return Err(ProtocolError::MissingCrlf.into());
        }
        data.truncate(len);
        Ok(Some(data.freeze()))
    }

    /// Array count; `None` for the null array
    fn decode_array_len(&mut self) -> Result<Option<usize>> {
        let n = self.decode_int()?;
        if n == -1 {
            return Ok(None);
        }
        if n < -1 {
            return Err(ProtocolError::InvalidArrayLength(n).into());
        }
        let count = usize::try_from(n).map_err(|_| ProtocolError::InvalidArrayLength(n))?;
        if count > self.max_array_len {
            return Err(ProtocolError::TooManyElements {
                count,
                max: self.max_array_len,
            }
            .into());
        }
        Ok(Some(count))
    }

    /// Whitespace-separated tokens up to CRLF, each as a bulk string
    fn decode_inline(&mut self) -> Result<Vec<RespValue>> {
        let mut line = self.reader.read_bytes(b'\n')?;
        if !line.ends_with(b"\r\n") {
            return Err(ProtocolError::MissingCrlf.into());
        }
        line.truncate(line.len() - 2);
        let line = line.freeze();

        let multi: Vec<RespValue> = line
            .split(|c| *c == b' ' || *c == b'\t')
            .filter(|token| !token.is_empty())
            .map(|token| RespValue::BulkString(Some(line.slice_ref(token))))
            .collect();

        if multi.is_empty() {
            return Err(ProtocolError::EmptyCommand.into());
        }
        Ok(multi)
    }
}

pub(super) fn parse_int_line(line: &[u8]) -> std::result::Result<i64, ProtocolError> {
    let text = match line {
        [text @ .., b'\r', b'\n'] => text,
        _ => return Err(ProtocolError::MissingCrlf),
    };
    std::str::from_utf8(text)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| ProtocolError::InvalidLength(String::from_utf8_lossy(text).into_owned()))
}

/// Truncation inside a complete buffer is a structural error
fn one_shot(err: CodecError) -> CodecError {
    match err {
        CodecError::EndOfStream => ProtocolError::UnexpectedEof.into(),
        other => other,
    }
}

/// Decode one value from a stream
pub fn decode<R: Read>(rd: R) -> Result<RespValue> {
    Decoder::new(rd).decode()
}

/// Decode one value from a complete buffer
pub fn decode_from_bytes(data: &[u8]) -> Result<RespValue> {
    Decoder::new(data).decode().map_err(one_shot)
}

/// Decode one client command from a complete buffer
pub fn decode_multi_bulk_from_bytes(data: &[u8]) -> Result<Vec<RespValue>> {
    Decoder::new(data).decode_multi_bulk().map_err(one_shot)
}
