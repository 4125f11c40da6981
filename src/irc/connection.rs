//! Framed connection over a byte stream.
//!
//! The read side and the write side are separate values so that each pump
//! task can own its half of the socket outright.

use bytes::{Bytes, BytesMut};
use futures::SinkExt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, FramedWrite};
use tracing::{debug, info};

use super::codec::LineCodec;
use super::error::Result;
use super::message::Message;

const READ_CHUNK: usize = 4096;

/// Read half: yields one CRLF-delimited line at a time.
pub struct LineReader<R> {
    io: R,
    buf: BytesMut,
    codec: LineCodec,
    eof: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(io: R, codec: LineCodec) -> Self {
        Self {
            io,
            buf: BytesMut::with_capacity(READ_CHUNK),
            codec,
            eof: false,
        }
    }

    /// Next line without its CRLF, or `None` once the peer has closed the
    /// stream with nothing left buffered.
    ///
    /// Framing errors only cost the offending bytes; the reader can be used
    /// again afterwards.
    pub async fn read_line(&mut self) -> Result<Option<Bytes>> {
        loop {
            if self.eof {
                return self.codec.decode_eof(&mut self.buf);
            }
            if let Some(line) = self.codec.decode(&mut self.buf)? {
                return Ok(Some(line));
            }
            self.buf.reserve(READ_CHUNK);
            if self.io.read_buf(&mut self.buf).await? == 0 {
                self.eof = true;
            }
        }
    }
}

/// Write half: serializes one message at a time and flushes it.
pub struct LineWriter<W> {
    framed: FramedWrite<W, LineCodec>,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    pub fn new(io: W, codec: LineCodec) -> Self {
        Self {
            framed: FramedWrite::new(io, codec),
        }
    }

    pub async fn write_line(&mut self, msg: Message) -> Result<()> {
        debug!(message = %msg, "sending");
        self.framed.send(msg).await
    }

    /// Send the connection registration sequence: optional PASS, then NICK
    /// and USER.
    pub async fn register(
        &mut self,
        nickname: &str,
        username: &str,
        realname: &str,
        password: Option<&str>,
    ) -> Result<()> {
        if let Some(password) = password {
            self.write_line(Message::pass(password)).await?;
        }
        self.write_line(Message::nick(nickname)).await?;
        self.write_line(Message::user(username, realname)).await?;
        info!(nickname, username, "registration sent");
        Ok(())
    }
}

/// Open a TCP connection and split it into its two framed halves.
pub async fn connect(
    host: &str,
    port: u16,
    max_line_len: usize,
) -> Result<(LineReader<OwnedReadHalf>, LineWriter<OwnedWriteHalf>)> {
    let stream = TcpStream::connect((host, port)).await?;
    if let Err(e) = stream.set_nodelay(true) {
        debug!(error = %e, "failed to set TCP_NODELAY");
    }
    info!(host, port, "connected");

    let (read_half, write_half) = stream.into_split();
    Ok((
        LineReader::new(read_half, LineCodec::with_max_len(max_line_len)),
        LineWriter::new(write_half, LineCodec::with_max_len(max_line_len)),
    ))
}
