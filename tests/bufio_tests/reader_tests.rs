//! Buffered Reader Tests
//!
//! Tests for refills, delimiter scans, owned reads and sticky errors.

use std::cell::Cell;
use std::io::{self, Read};
use std::rc::Rc;

use wirecodec::bufio::BufReader;
use wirecodec::CodecError;

// =============================================================================
// Test Sources
// =============================================================================

/// Delivers its data at most `chunk` bytes per read
struct ChunkedSource {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl ChunkedSource {
    fn new(data: &[u8], chunk: usize) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            chunk,
        }
    }
}

impl Read for ChunkedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Fails every read and counts how often it was asked
struct FailingSource {
    calls: Rc<Cell<usize>>,
}

impl Read for FailingSource {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        self.calls.set(self.calls.get() + 1);
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
    }
}

/// Interrupts every other read
struct InterruptingSource {
    inner: ChunkedSource,
    interrupt: bool,
}

impl Read for InterruptingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
        }
        self.inner.read(buf)
    }
}

fn payload() -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..200u32 {
        data.extend_from_slice(format!("line {} {}\n", i, "x".repeat(i as usize % 37)).as_bytes());
    }
    data
}

// =============================================================================
// Reconstruction Tests
// =============================================================================

#[test]
fn test_read_byte_reconstructs_payload() {
    let data = payload();
    for size in [1, 2, 3, 7, 16, 64, 1024] {
        for chunk in [1, 3, 5, 4096] {
            let mut reader = BufReader::with_capacity(ChunkedSource::new(&data, chunk), size);
            let mut out = Vec::new();
            while out.len() < data.len() {
                let peeked = reader.peek_byte().unwrap();
                let read = reader.read_byte().unwrap();
                assert_eq!(peeked, read);
                out.push(read);
            }
            assert_eq!(out, data, "size={} chunk={}", size, chunk);
        }
    }
}

#[test]
fn test_read_bytes_reconstructs_payload() {
    let data = payload();
    for size in [1, 2, 5, 16, 64, 4096] {
        for chunk in [1, 7, 4096] {
            let mut reader = BufReader::with_capacity(ChunkedSource::new(&data, chunk), size);
            let mut out = Vec::new();
            while out.len() < data.len() {
                let line = reader.read_bytes(b'\n').unwrap();
                assert_eq!(line.last(), Some(&b'\n'));
                out.extend_from_slice(&line);
            }
            assert_eq!(out, data, "size={} chunk={}", size, chunk);
        }
    }
}

#[test]
fn test_read_full_reconstructs_payload() {
    let data = payload();
    for size in [1, 8, 100, 4096] {
        for step in [1, 13, 511, 512, 2000] {
            let mut reader = BufReader::with_capacity(ChunkedSource::new(&data, 9), size);
            let mut out = Vec::new();
            while out.len() < data.len() {
                let n = step.min(data.len() - out.len());
                let part = reader.read_full(n).unwrap();
                assert_eq!(part.len(), n);
                out.extend_from_slice(&part);
            }
            assert_eq!(out, data, "size={} step={}", size, step);
        }
    }
}

#[test]
fn test_mixed_reads_reconstruct_payload() {
    let data = payload();
    let mut reader = BufReader::with_capacity(ChunkedSource::new(&data, 3), 8);
    let mut out = Vec::new();
    let mut turn = 0;
    while out.len() < data.len() {
        match turn % 3 {
            0 => out.push(reader.read_byte().unwrap()),
            1 => out.extend_from_slice(&reader.read_bytes(b'\n').unwrap()),
            _ => {
                let n = 5.min(data.len() - out.len());
                out.extend_from_slice(&reader.read_full(n).unwrap());
            }
        }
        turn += 1;
    }
    assert_eq!(out, data);
}

// =============================================================================
// Delimiter Tests
// =============================================================================

#[test]
fn test_read_slice_returns_record() {
    let mut reader = BufReader::with_capacity(&b"hello\nworld\n"[..], 16);
    assert_eq!(reader.read_slice(b'\n').unwrap(), b"hello\n");
    assert_eq!(reader.read_slice(b'\n').unwrap(), b"world\n");
    assert!(matches!(reader.read_slice(b'\n'), Err(CodecError::EndOfStream)));
}

#[test]
fn test_read_slice_buffer_full_then_read_bytes() {
    let mut reader = BufReader::with_capacity(&b"0123456789abcdef\nrest"[..], 4);
    assert!(matches!(reader.read_slice(b'\n'), Err(CodecError::BufferFull)));
    assert_eq!(reader.buffered(), 4);
    // Nothing was consumed, so the whole record is still available
    assert_eq!(&reader.read_bytes(b'\n').unwrap()[..], b"0123456789abcdef\n");
    assert_eq!(&reader.read_full(4).unwrap()[..], b"rest");
}

#[test]
fn test_read_bytes_without_delimiter_hits_eof() {
    let mut reader = BufReader::with_capacity(&b"no newline here"[..], 4);
    assert!(matches!(reader.read_bytes(b'\n'), Err(CodecError::EndOfStream)));
}

// =============================================================================
// Direct Read Tests
// =============================================================================

#[test]
fn test_large_read_bypasses_buffer() {
    let data = payload();
    let mut reader = BufReader::with_capacity(ChunkedSource::new(&data, 4096), 16);
    let mut dst = vec![0u8; 64];
    let n = reader.read(&mut dst).unwrap();
    assert_eq!(n, 64);
    assert_eq!(&dst[..], &data[..64]);
    assert_eq!(reader.buffered(), 0);
}

#[test]
fn test_small_read_goes_through_buffer() {
    let data = payload();
    let mut reader = BufReader::with_capacity(ChunkedSource::new(&data, 4096), 16);
    let mut dst = [0u8; 4];
    assert_eq!(reader.read(&mut dst).unwrap(), 4);
    assert_eq!(&dst, &data[..4]);
    assert_eq!(reader.buffered(), 12);
}

#[test]
fn test_position_counts_consumed_bytes() {
    let data = payload();
    let mut reader = BufReader::with_capacity(ChunkedSource::new(&data, 4096), 16);
    assert_eq!(reader.position(), 0);

    reader.peek_byte().unwrap();
    assert_eq!(reader.position(), 0);

    reader.read_byte().unwrap();
    assert_eq!(reader.position(), 1);

    // Bypassing the buffer still advances the position
    reader.read(&mut [0u8; 15]).unwrap();
    let mut dst = vec![0u8; 64];
    let n = reader.read(&mut dst).unwrap();
    assert_eq!(reader.position(), 16 + n as u64);
}

#[test]
fn test_zero_capacity_selects_default() {
    let reader = BufReader::with_capacity(&b""[..], 0);
    assert_eq!(reader.capacity(), wirecodec::config::DEFAULT_READ_BUFFER_SIZE);
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_empty_source_is_end_of_stream() {
    let mut reader = BufReader::new(&b""[..]);
    assert!(matches!(reader.read_byte(), Err(CodecError::EndOfStream)));
    assert!(matches!(reader.peek_byte(), Err(CodecError::EndOfStream)));
}

#[test]
fn test_error_is_sticky() {
    let calls = Rc::new(Cell::new(0));
    let mut reader = BufReader::new(FailingSource {
        calls: Rc::clone(&calls),
    });

    let first = reader.read_byte().unwrap_err();
    assert!(first.is_io());
    assert_eq!(calls.get(), 1);

    assert!(reader.peek_byte().unwrap_err().is_io());
    assert!(reader.read_bytes(b'\n').unwrap_err().is_io());
    assert!(reader.read_full(3).unwrap_err().is_io());
    assert!(reader.read(&mut [0u8; 4096]).unwrap_err().is_io());
    assert_eq!(calls.get(), 1);
    assert!(reader.error().is_some());
}

#[test]
fn test_interrupted_reads_are_retried() {
    let data = payload();
    let source = InterruptingSource {
        inner: ChunkedSource::new(&data, 5),
        interrupt: false,
    };
    let mut reader = BufReader::with_capacity(source, 32);
    let line = reader.read_bytes(b'\n').unwrap();
    assert_eq!(&line[..], b"line 0 \n");
}
