//! CRLF line codec.
//!
//! Bytes accumulate in the caller's `BytesMut`; the decoder scans it
//! incrementally and hands out one line at a time with the `\r\n` removed.
//! Lines may span several transport reads and one read may carry several
//! lines.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::error::{ProtocolError, Result};
use super::message::Message;

/// Default maximum line length in bytes, CRLF excluded.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

pub struct LineCodec {
    /// Index of next byte to check for a delimiter.
    next_index: usize,
    max_len: usize,
    /// Dropping an over-long line until its CRLF shows up.
    discarding: bool,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    /// Drop `len` bytes from the front of the buffer and restart the scan.
    fn skip(&mut self, src: &mut BytesMut, len: usize) {
        src.advance(len);
        self.next_index = 0;
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = Bytes;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        loop {
            let found = src[self.next_index..]
                .iter()
                .position(|b| *b == b'\r' || *b == b'\n')
                .map(|offset| self.next_index + offset);

            let Some(pos) = found else {
                self.next_index = src.len();
                if self.discarding {
                    let len = src.len();
                    self.skip(src, len);
                } else if src.len() > self.max_len {
                    let actual = src.len();
                    self.discarding = true;
                    self.skip(src, actual);
                    return Err(ProtocolError::LineTooLong {
                        actual,
                        limit: self.max_len,
                    });
                }
                return Ok(None);
            };

            if src[pos] == b'\n' {
                // Bare line feed.
                self.skip(src, pos + 1);
                if self.discarding {
                    continue;
                }
                return Err(ProtocolError::MissingCrlf);
            }

            match src.get(pos + 1) {
                // `\r` is the last byte so far: wait for the next read.
                None => {
                    self.next_index = pos;
                    return Ok(None);
                }
                Some(b'\n') => {
                    if self.discarding {
                        self.discarding = false;
                        self.skip(src, pos + 2);
                        continue;
                    }
                    let mut line = src.split_to(pos + 2);
                    self.next_index = 0;
                    line.truncate(pos);
                    if line.len() > self.max_len {
                        return Err(ProtocolError::LineTooLong {
                            actual: line.len(),
                            limit: self.max_len,
                        });
                    }
                    return Ok(Some(line.freeze()));
                }
                Some(_) => {
                    self.skip(src, pos + 1);
                    if self.discarding {
                        continue;
                    }
                    return Err(ProtocolError::MissingCrlf);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None if src.is_empty() || self.discarding => {
                self.discarding = false;
                src.clear();
                self.next_index = 0;
                Ok(None)
            }
            None => {
                src.clear();
                self.next_index = 0;
                Err(ProtocolError::MissingCrlf)
            }
        }
    }
}

impl Encoder<Message> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(&msg.serialize());
        Ok(())
    }
}
