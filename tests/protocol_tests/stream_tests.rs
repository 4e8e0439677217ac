//! Frame Reader Tests
//!
//! Tests for incremental frame reads over fragmented sources.

use std::io::{self, Read};
use std::sync::Arc;

use bytes::BufMut;
use wirecodec::protocol::dubbo::DubboFrame;
use wirecodec::{
    CodecError, Config, DubboProtocol, FrameReader, Protocol, RespProtocol, RespValue,
};

/// Delivers its data at most `chunk` bytes per read
struct ChunkedSource {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl Read for ChunkedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Fails on the first read
struct BrokenSource;

impl Read for BrokenSource {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
    }
}

fn dubbo_stream(count: u64) -> Vec<u8> {
    let mut data = Vec::new();
    for id in 0..count {
        let payload = vec![id as u8; id as usize * 3];
        data.put_slice(&DubboFrame::new(0xC2, 0, id, payload).encode());
    }
    data
}

#[test]
fn test_dubbo_frames_over_fragmented_source() {
    let data = dubbo_stream(20);
    for chunk in [1, 5, 16, 17, 4096] {
        let config = Config::builder().read_chunk_size(7).build();
        let source = ChunkedSource {
            data: data.clone(),
            pos: 0,
            chunk,
        };
        let mut reader = FrameReader::with_config(source, Arc::new(DubboProtocol::new()), &config);

        for id in 0..20u64 {
            let frame = reader.next_frame().unwrap().expect("frame missing");
            assert_eq!(frame.request_id(), Some(id));
            let frame = frame.downcast_ref::<DubboFrame>().unwrap();
            assert_eq!(frame.payload.len(), id as usize * 3);
        }
        assert!(reader.next_frame().unwrap().is_none());
        assert!(reader.buffered().is_empty());
    }
}

#[test]
fn test_resp_values_over_fragmented_source() {
    let data = b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n+OK\r\nPING\r\n".to_vec();
    let source = ChunkedSource { data, pos: 0, chunk: 3 };
    let reader = FrameReader::new(source, Arc::new(RespProtocol::new()));

    let values: Vec<RespValue> = reader
        .map(|frame| frame.unwrap().downcast_ref::<RespValue>().unwrap().clone())
        .collect();
    assert_eq!(
        values,
        vec![
            RespValue::command(["GET", "k"]),
            RespValue::simple_string("OK"),
            RespValue::command(["PING"]),
        ]
    );
}

#[test]
fn test_eof_mid_frame() {
    let mut data = dubbo_stream(2);
    data.truncate(data.len() - 1);
    let source = ChunkedSource { data, pos: 0, chunk: 64 };
    let mut reader = FrameReader::new(source, Arc::new(DubboProtocol::new()));

    assert!(reader.next_frame().unwrap().is_some());
    assert!(matches!(reader.next_frame(), Err(CodecError::EndOfStream)));
}

#[test]
fn test_protocol_error_surfaces() {
    let source = ChunkedSource {
        data: vec![0u8; 32],
        pos: 0,
        chunk: 64,
    };
    let mut reader = FrameReader::new(source, Arc::new(DubboProtocol::new()));
    assert!(reader.next_frame().unwrap_err().is_protocol());
    assert!(reader.error().unwrap().is_protocol());
}

#[test]
fn test_io_error_surfaces() {
    let protocol: Arc<dyn Protocol> = Arc::new(RespProtocol::new());
    let mut reader = FrameReader::new(BrokenSource, protocol);
    assert!(reader.next_frame().unwrap_err().is_io());
}

#[test]
fn test_iterator_stops_after_first_error() {
    let source = ChunkedSource {
        data: vec![0u8; 32],
        pos: 0,
        chunk: 64,
    };
    let reader = FrameReader::new(source, Arc::new(DubboProtocol::new()));

    let results: Vec<_> = reader.take(1000).collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].as_ref().unwrap_err().is_protocol());
}

#[test]
fn test_iterator_yields_frames_then_error() {
    let mut data = dubbo_stream(3);
    data.extend_from_slice(&[0u8; 16]);
    let source = ChunkedSource { data, pos: 0, chunk: 5 };
    let reader = FrameReader::new(source, Arc::new(DubboProtocol::new()));

    let results: Vec<_> = reader.collect();
    assert_eq!(results.len(), 4);
    assert!(results[..3].iter().all(|r| r.is_ok()));
    assert!(results[3].as_ref().unwrap_err().is_protocol());
}

#[test]
fn test_error_is_sticky() {
    let protocol: Arc<dyn Protocol> = Arc::new(RespProtocol::new());
    let mut reader = FrameReader::new(BrokenSource, protocol);

    assert!(reader.next_frame().unwrap_err().is_io());
    assert!(reader.next_frame().unwrap_err().is_io());
    assert!(reader.error().unwrap().is_io());
    assert!(reader.next().is_none());
}
