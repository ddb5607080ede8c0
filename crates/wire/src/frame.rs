//! Length-prefixed frame codec
//!
//! Both sides of the protocol use this codec: the client writes
//! request frames and reads response frames, the controller does the
//! reverse. The reader never assumes one underlying read yields one
//! frame; a length line and its payload may arrive in arbitrarily
//! small pieces.

use std::io::{self, ErrorKind, Read, Write};

use pacshim_errors::ProtocolError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Marker line preceding every argument frame in a request
pub const CONTINUE_MARKER: &[u8] = b"T\n";

/// Marker line terminating a request's argument list
pub const STOP_MARKER: &[u8] = b"F\n";

const READ_BUF_SIZE: usize = 4096;

/// Encode `value` as JSON and write it as one frame: the decimal byte
/// length of the encoding, a newline, then the encoding itself.
///
/// The caller must flush if the writer buffers, since the receiver
/// blocks on exact byte counts.
pub fn write_frame<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> io::Result<()> {
    let payload = serde_json::to_vec(value)?;
    writer.write_all(payload.len().to_string().as_bytes())?;
    writer.write_all(b"\n")?;
    writer.write_all(&payload)
}

/// Write one complete request: the command frame, then each argument
/// as a continuation marker plus frame, then the stop marker.
///
/// Argument order is preserved exactly.
pub fn write_request<W, I, S>(writer: &mut W, command: &str, args: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    write_frame(writer, command)?;
    for arg in args {
        writer.write_all(CONTINUE_MARKER)?;
        write_frame(writer, arg.as_ref())?;
    }
    writer.write_all(STOP_MARKER)
}

/// Buffered frame reader over a byte-stream transport
///
/// Owns the raw bytes received but not yet consumed; refills from the
/// transport whenever a length line or payload outruns the buffer.
pub struct FrameReader<R> {
    inner: R,
    buf: Vec<u8>,
    start: usize,
    end: usize,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: vec![0; READ_BUF_SIZE],
            start: 0,
            end: 0,
        }
    }

    /// Refill the buffer from the transport. Returns `false` on EOF.
    fn fill(&mut self) -> Result<bool, ProtocolError> {
        loop {
            match self.inner.read(&mut self.buf) {
                Ok(n) => {
                    self.start = 0;
                    self.end = n;
                    return Ok(n > 0);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(ProtocolError::Io {
                        message: e.to_string(),
                    })
                }
            }
        }
    }

    /// Read bytes up to (and excluding) the next newline.
    fn read_line(&mut self) -> Result<String, ProtocolError> {
        let mut line = Vec::new();
        loop {
            if self.start == self.end && !self.fill()? {
                return Err(ProtocolError::UnexpectedEof);
            }
            while self.start < self.end {
                let byte = self.buf[self.start];
                self.start += 1;
                if byte == b'\n' {
                    return Ok(String::from_utf8_lossy(&line).into_owned());
                }
                line.push(byte);
            }
        }
    }

    /// Read exactly `len` payload bytes, across as many transport
    /// reads as it takes.
    fn read_payload(&mut self, len: usize) -> Result<Vec<u8>, ProtocolError> {
        let mut payload = Vec::with_capacity(len);
        while payload.len() < len {
            if self.start == self.end && !self.fill()? {
                return Err(ProtocolError::Truncated {
                    expected: len,
                    got: payload.len(),
                });
            }
            let take = (len - payload.len()).min(self.end - self.start);
            payload.extend_from_slice(&self.buf[self.start..self.start + take]);
            self.start += take;
        }
        Ok(payload)
    }

    fn read_frame<T: DeserializeOwned>(&mut self, expected: &'static str) -> Result<T, ProtocolError> {
        let line = self.read_line()?;
        let len: usize = line
            .parse()
            .map_err(|_| ProtocolError::InvalidLength { line: line.clone() })?;
        let payload = self.read_payload(len)?;
        serde_json::from_slice(&payload).map_err(|e| ProtocolError::Decode {
            expected,
            message: e.to_string(),
        })
    }

    /// Read one frame and decode it as a string.
    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        self.read_frame("string")
    }

    /// Read one frame and decode it as a signed integer.
    pub fn read_int(&mut self) -> Result<i32, ProtocolError> {
        self.read_frame("integer")
    }

    /// Read one marker line: `T` continues an argument list, `F` ends it.
    pub fn read_marker(&mut self) -> Result<bool, ProtocolError> {
        let line = self.read_line()?;
        match line.as_str() {
            "T" => Ok(true),
            "F" => Ok(false),
            other => Err(ProtocolError::Decode {
                expected: "marker",
                message: format!("unknown marker line {other:?}"),
            }),
        }
    }
}

/// Controller-side counterpart of [`write_request`]: one command
/// string plus its arguments in original order.
pub fn read_request<R: Read>(reader: &mut FrameReader<R>) -> Result<(String, Vec<String>), ProtocolError> {
    let command = reader.read_string()?;
    let mut args = Vec::new();
    while reader.read_marker()? {
        args.push(reader.read_string()?);
    }
    Ok((command, args))
}
