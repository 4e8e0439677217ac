//! RESP Encoder Tests
//!
//! Tests for canonical wire output, multi-bulk commands, buffer encoding and
//! the sticky failure state.

use std::io::{self, Write};

use wirecodec::resp::{encode_to_buffer, encode_to_bytes, Encoder};
use wirecodec::{CodecError, RespValue};

/// Accepts `limit` bytes, then fails every write
struct LimitedSink {
    written: Vec<u8>,
    limit: usize,
}

impl Write for LimitedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit - self.written.len();
        if room == 0 {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        }
        let n = room.min(buf.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn assert_encodes(value: RespValue, expected: &[u8]) {
    assert_eq!(encode_to_bytes(&value).unwrap(), expected, "{:?}", value);
    assert_eq!(value.encoded_len(), expected.len(), "{:?}", value);
}

// =============================================================================
// Wire Format Tests
// =============================================================================

#[test]
fn test_encode_simple_string() {
    assert_encodes(RespValue::simple_string("OK"), b"+OK\r\n");
}

#[test]
fn test_encode_error() {
    assert_encodes(RespValue::error("Error"), b"-Error\r\n");
}

#[test]
fn test_encode_integer() {
    for v in [-1i64, 0, 1024 * 1024] {
        let expected = format!(":{}\r\n", v);
        assert_encodes(RespValue::integer(v), expected.as_bytes());
        assert_encodes(RespValue::integer_text(v.to_string()), expected.as_bytes());
    }
}

#[test]
fn test_encode_bulk_string() {
    assert_encodes(RespValue::null_bulk_string(), b"$-1\r\n");
    assert_encodes(RespValue::bulk_string(""), b"$0\r\n\r\n");
    assert_encodes(
        RespValue::bulk_string("helloworld!!"),
        b"$12\r\nhelloworld!!\r\n",
    );
}

#[test]
fn test_encode_bulk_string_lengths() {
    for n in [1usize, 9, 10, 99, 100, 4096, 70_000] {
        let data = vec![b'a'; n];
        let bytes = encode_to_bytes(&RespValue::bulk_string(data.clone())).unwrap();
        let header = format!("${}\r\n", n);
        assert!(bytes.starts_with(header.as_bytes()));
        assert_eq!(&bytes[header.len()..header.len() + n], &data[..]);
        assert!(bytes.ends_with(b"\r\n"));
        assert_eq!(bytes.len(), header.len() + n + 2);
    }
}

#[test]
fn test_encode_array() {
    assert_encodes(RespValue::null_array(), b"*-1\r\n");

    let mut children = Vec::new();
    assert_encodes(RespValue::array(children.clone()), b"*0\r\n");
    children.push(RespValue::integer(0));
    assert_encodes(RespValue::array(children.clone()), b"*1\r\n:0\r\n");
    children.push(RespValue::null_bulk_string());
    assert_encodes(RespValue::array(children.clone()), b"*2\r\n:0\r\n$-1\r\n");
    children.push(RespValue::bulk_string("test"));
    assert_encodes(
        RespValue::array(children),
        b"*3\r\n:0\r\n$-1\r\n$4\r\ntest\r\n",
    );
}

#[test]
fn test_encode_nested_array() {
    let value = RespValue::array(vec![RespValue::array(vec![RespValue::array(vec![
        RespValue::bulk_string("a"),
    ])])]);
    assert_encodes(value, b"*1\r\n*1\r\n*1\r\n$1\r\na\r\n");
}

#[test]
fn test_encode_multi_bulk() {
    let mut encoder = Encoder::new(Vec::new());
    let multi = [RespValue::bulk_string("GET"), RespValue::bulk_string("key")];
    encoder.encode_multi_bulk(&multi, true).unwrap();
    assert_eq!(encoder.get_ref(), b"*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n");
}

// =============================================================================
// Buffering Tests
// =============================================================================

#[test]
fn test_encode_without_flush_stays_buffered() {
    let mut encoder = Encoder::with_capacity(Vec::new(), 64);
    encoder.encode(&RespValue::simple_string("OK"), false).unwrap();
    assert!(encoder.get_ref().is_empty());
    encoder.flush().unwrap();
    assert_eq!(encoder.get_ref(), b"+OK\r\n");
}

#[test]
fn test_encode_many_values_small_buffer() {
    let mut encoder = Encoder::with_capacity(Vec::new(), 3);
    let mut expected = Vec::new();
    for i in 0..50 {
        let value = RespValue::command(["SET".to_string(), format!("key{}", i)]);
        expected.extend_from_slice(&encode_to_bytes(&value).unwrap());
        encoder.encode(&value, false).unwrap();
    }
    encoder.flush().unwrap();
    assert_eq!(encoder.get_ref(), &expected);
}

#[test]
fn test_encode_to_buffer() {
    let value = RespValue::command(["LLEN", "mylist"]);
    let buf = encode_to_buffer(&value).unwrap();
    assert_eq!(&buf[..], b"*2\r\n$4\r\nLLEN\r\n$6\r\nmylist\r\n");
}

// =============================================================================
// Sticky Failure Tests
// =============================================================================

#[test]
fn test_encoder_is_sticky_after_failure() {
    let sink = LimitedSink {
        written: Vec::new(),
        limit: 4,
    };
    let mut encoder = Encoder::with_capacity(sink, 8);

    let err = encoder
        .encode(&RespValue::bulk_string("helloworld"), true)
        .unwrap_err();
    assert!(err.is_io());
    assert!(encoder.error().is_some());

    assert!(matches!(
        encoder.encode(&RespValue::simple_string("OK"), true),
        Err(CodecError::FailedEncoder)
    ));
    assert!(matches!(
        encoder.encode_multi_bulk(&[RespValue::bulk_string("x")], true),
        Err(CodecError::FailedEncoder)
    ));
    assert!(matches!(encoder.flush(), Err(CodecError::FailedEncoder)));
    assert_eq!(encoder.get_ref().written.len(), 4);
}

#[test]
fn test_reset_clears_failure() {
    let sink = LimitedSink {
        written: Vec::new(),
        limit: 0,
    };
    let mut encoder = Encoder::new(sink);
    assert!(encoder.encode(&RespValue::simple_string("OK"), true).is_err());

    let old = encoder.reset(LimitedSink {
        written: Vec::new(),
        limit: 64,
    });
    assert!(old.written.is_empty());
    assert!(encoder.error().is_none());

    encoder.encode(&RespValue::simple_string("OK"), true).unwrap();
    assert_eq!(encoder.into_inner().written, b"+OK\r\n");
}
