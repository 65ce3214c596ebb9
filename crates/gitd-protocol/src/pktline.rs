//! Pkt-line framing.
//!
//! A pkt-line is a 4-hex-digit length prefix (counting its own four bytes)
//! followed by the payload; the literal `0000` is the flush packet marking
//! a section boundary. On decode a single trailing `\n` is trimmed from
//! the payload — callers that need the newline preserved must re-append it.

use std::io::{Read, Write};

use crate::ProtocolError;

/// Largest payload the 4-hex length prefix can frame (0xffff - 4).
pub const MAX_PKT_DATA_LEN: usize = 65531;

/// One decoded pkt-line frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// Data line, trailing newline already trimmed.
    Line(Vec<u8>),
    /// Flush packet (`0000`) — end of section.
    Flush,
    /// Clean end of stream at a frame boundary. Not an error.
    Eof,
}

/// Pkt-line reader.
pub struct PktReader<R> {
    reader: R,
}

impl<R: Read> PktReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Consume the reader and return the inner value.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read one frame.
    ///
    /// End of stream where a length prefix would start yields
    /// [`Packet::Eof`]; end of stream anywhere inside a frame is a
    /// `short-read` error.
    pub fn read_pkt(&mut self) -> Result<Packet, ProtocolError> {
        let mut len_buf = [0u8; 4];
        let mut filled = 0;
        while filled < 4 {
            let n = self.reader.read(&mut len_buf[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(Packet::Eof);
                }
                return Err(ProtocolError::ShortRead("pkt-line length"));
            }
            filled += n;
        }

        if &len_buf == b"0000" {
            return Ok(Packet::Flush);
        }

        let len_str = std::str::from_utf8(&len_buf)
            .map_err(|_| ProtocolError::MalformedFrame(format!("length bytes {len_buf:?}")))?;
        let len = usize::from_str_radix(len_str, 16)
            .map_err(|_| ProtocolError::MalformedFrame(format!("length {len_str:?}")))?;
        if len < 4 {
            return Err(ProtocolError::MalformedFrame(format!(
                "length {len} below minimum frame size"
            )));
        }

        let mut payload = vec![0u8; len - 4];
        self.reader.read_exact(&mut payload).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ProtocolError::ShortRead("pkt-line payload")
            } else {
                ProtocolError::Io(e)
            }
        })?;

        if payload.last() == Some(&b'\n') {
            payload.pop();
        }
        Ok(Packet::Line(payload))
    }
}

/// Pkt-line writer.
pub struct PktWriter<W> {
    writer: W,
}

impl<W: Write> PktWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the writer and return the inner value.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write a data line with the payload verbatim.
    pub fn write_line(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        if data.len() > MAX_PKT_DATA_LEN {
            return Err(ProtocolError::LineTooLong(data.len()));
        }
        write!(self.writer, "{:04x}", data.len() + 4)?;
        self.writer.write_all(data)?;
        Ok(())
    }

    /// Write a text line, appending `\n` if not already present.
    pub fn write_text(&mut self, text: &str) -> Result<(), ProtocolError> {
        if text.ends_with('\n') {
            self.write_line(text.as_bytes())
        } else {
            let mut data = text.as_bytes().to_vec();
            data.push(b'\n');
            self.write_line(&data)
        }
    }

    /// Write a flush packet (`0000`).
    pub fn write_flush(&mut self) -> Result<(), ProtocolError> {
        self.writer.write_all(b"0000")?;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), ProtocolError> {
        self.writer.flush()?;
        Ok(())
    }
}
