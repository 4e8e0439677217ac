//! RESP encoder
//!
//! Writes values in canonical wire form through a [`BufWriter`]. The encoder
//! latches its first failure and answers every later call with
//! [`CodecError::FailedEncoder`] until [`Encoder::reset`] installs a new sink,
//! so a half-written value is never silently extended.

use std::io::Write;

use bytes::{BufMut, BytesMut};

use crate::bufio::BufWriter;
use crate::config::DEFAULT_WRITE_BUFFER_SIZE;
use crate::error::{CodecError, Result};

use super::value::{RespType, RespValue, Visit};

const CRLF: &[u8] = b"\r\n";

/// Buffered RESP encoder
pub struct Encoder<W> {
    writer: BufWriter<W>,
    err: Option<CodecError>,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder with the default buffer capacity
    pub fn new(wr: W) -> Self {
        Self::with_capacity(wr, DEFAULT_WRITE_BUFFER_SIZE)
    }

    /// Create an encoder with a given buffer capacity
    pub fn with_capacity(wr: W, size: usize) -> Self {
        Self::with_writer(BufWriter::with_capacity(wr, size))
    }

    /// Create an encoder over an existing buffered writer
    pub fn with_writer(writer: BufWriter<W>) -> Self {
        Self { writer, err: None }
    }

    /// The error that failed this encoder, if any
    pub fn error(&self) -> Option<&CodecError> {
        self.err.as_ref()
    }

    /// Reference to the underlying sink
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Give back the sink; unflushed bytes are dropped
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Clear the failed state by switching to a fresh sink
    ///
    /// Returns the previous sink. Bytes buffered for it are discarded.
    pub fn reset(&mut self, wr: W) -> W {
        let capacity = self.writer.capacity();
        let old = std::mem::replace(&mut self.writer, BufWriter::with_capacity(wr, capacity));
        self.err = None;
        old.into_inner()
    }

    /// Encode one value, optionally flushing afterwards
    pub fn encode(&mut self, value: &RespValue, flush: bool) -> Result<()> {
        if self.err.is_some() {
            return Err(CodecError::FailedEncoder);
        }
        let mut result = self.encode_resp(value);
        if result.is_ok() && flush {
            result = self.writer.flush();
        }
        self.latch(result)
    }

    /// Encode a command as an array of values, optionally flushing afterwards
    pub fn encode_multi_bulk(&mut self, multi: &[RespValue], flush: bool) -> Result<()> {
        if self.err.is_some() {
            return Err(CodecError::FailedEncoder);
        }
        let mut result = self.encode_multi(multi);
        if result.is_ok() && flush {
            result = self.writer.flush();
        }
        self.latch(result)
    }

    /// Push buffered output to the sink
    pub fn flush(&mut self) -> Result<()> {
        if self.err.is_some() {
            return Err(CodecError::FailedEncoder);
        }
        let result = self.writer.flush();
        self.latch(result)
    }

    fn latch(&mut self, result: Result<()>) -> Result<()> {
        if let Err(err) = &result {
            self.err = Some(err.clone());
        }
        result
    }

    fn encode_multi(&mut self, multi: &[RespValue]) -> Result<()> {
        self.writer.write_byte(RespType::Array.tag())?;
        self.encode_int(multi.len() as i64)?;
        for value in multi {
            self.encode_resp(value)?;
        }
        Ok(())
    }

    /// Writes nodes in pre-order; an array header already carries its count,
    /// so leaving an array writes nothing
    fn encode_resp(&mut self, value: &RespValue) -> Result<()> {
        for visit in value.walk() {
            let node = match visit {
                Visit::Enter(node) => node,
                Visit::Leave => continue,
            };
            self.writer.write_byte(node.kind().tag())?;
            match node {
                RespValue::SimpleString(text) | RespValue::Error(text) | RespValue::Integer(text) => {
                    self.encode_text(text)?
                }
                RespValue::BulkString(data) => self.encode_bulk(data.as_deref())?,
                RespValue::Array(None) => self.encode_int(-1)?,
                RespValue::Array(Some(children)) => self.encode_int(children.len() as i64)?,
            }
        }
        Ok(())
    }

    fn encode_text(&mut self, text: &[u8]) -> Result<()> {
        self.writer.write(text)?;
        self.writer.write(CRLF)?;
        Ok(())
    }

    fn encode_int(&mut self, n: i64) -> Result<()> {
        let mut digits = [0u8; 20];
        let text = format_decimal(n, &mut digits);
        self.encode_text(text)
    }

    fn encode_bulk(&mut self, data: Option<&[u8]>) -> Result<()> {
        match data {
            None => self.encode_int(-1),
            Some(data) => {
                self.encode_int(data.len() as i64)?;
                self.encode_text(data)
            }
        }
    }
}

/// Render `n` in decimal into `buf`, returning the used tail
fn format_decimal(n: i64, buf: &mut [u8; 20]) -> &[u8] {
    let negative = n < 0;
    let mut v = n.unsigned_abs();
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    if negative {
        pos -= 1;
        buf[pos] = b'-';
    }
    &buf[pos..]
}

/// Encode one value to a stream and flush
pub fn encode<W: Write>(wr: W, value: &RespValue) -> Result<()> {
    Encoder::new(wr).encode(value, true)
}

/// Encode one value into a new byte vector
pub fn encode_to_bytes(value: &RespValue) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(value.encoded_len());
    encode(&mut out, value)?;
    Ok(out)
}

/// Encode one value into a growable buffer
///
/// Fails with [`CodecError::ShortWrite`] if the bytes produced differ from
/// the value's expected encoded length.
pub fn encode_to_buffer(value: &RespValue) -> Result<BytesMut> {
    let expected = value.encoded_len();
    let mut writer = BytesMut::with_capacity(expected).writer();
    encode(&mut writer, value)?;

    let buf = writer.into_inner();
    if buf.len() != expected {
        return Err(CodecError::ShortWrite {
            expected,
            written: buf.len(),
        });
    }
    Ok(buf)
}
