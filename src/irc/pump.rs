//! The two long-running loops that drive a connection.
//!
//! The inbound pump reads lines from the server and hands parsed messages to
//! a [`MessageSink`]. The outbound pump reads operator lines, parses them as
//! raw protocol lines and writes them to the server. Per-line errors are
//! logged and skipped; transport errors end the loop.

use futures::{Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use super::connection::{LineReader, LineWriter};
use super::error::Result;
use super::message::Message;

/// Receives every message parsed off the wire.
pub trait MessageSink {
    fn display(&mut self, msg: &Message);
}

impl<T: MessageSink + ?Sized> MessageSink for &mut T {
    fn display(&mut self, msg: &Message) {
        (**self).display(msg);
    }
}

/// Runs until the server closes the connection or the transport fails.
pub async fn inbound<R, S>(mut reader: LineReader<R>, mut sink: S) -> Result<()>
where
    R: AsyncRead + Unpin,
    S: MessageSink,
{
    loop {
        let line = match reader.read_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("server closed the connection");
                return Ok(());
            }
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "dropping malformed inbound line");
                continue;
            }
            Err(e) => return Err(e),
        };

        match Message::parse(&line) {
            Ok(Some(msg)) => sink.display(&msg),
            Ok(None) => {}
            Err(e) => warn!(
                error = %e,
                line = %String::from_utf8_lossy(&line),
                "failed to parse inbound line"
            ),
        }
    }
}

/// Runs until operator input ends, or reading it or writing to the server
/// fails.
pub async fn outbound<I, W>(mut input: I, mut writer: LineWriter<W>) -> Result<()>
where
    I: Stream<Item = std::io::Result<Vec<u8>>> + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(line) = input.next().await {
        let line = line?;
        let line = line.strip_suffix(b"\n").unwrap_or(&line);
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        match Message::parse(line) {
            Ok(Some(msg)) => writer.write_line(msg).await?,
            Ok(None) => {}
            Err(e) => warn!(
                error = %e,
                line = %String::from_utf8_lossy(line),
                "not a valid protocol line"
            ),
        }
    }
    info!("operator input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::irc::codec::LineCodec;
    use crate::irc::command::Command;
    use crate::irc::error::ProtocolError;

    impl MessageSink for Vec<Message> {
        fn display(&mut self, msg: &Message) {
            self.push(msg.clone());
        }
    }

    #[tokio::test]
    async fn test_inbound_skips_bad_lines() {
        let wire = b":srv NOTICE * :hello there\r\n\
                     \r\n\
                     BOGUS line\r\n\
                     half\rline\r\n\
                     PING :42\r\n";
        let reader = LineReader::new(&wire[..], LineCodec::new());
        let mut seen = Vec::new();

        inbound(reader, &mut seen).await.unwrap();

        let commands: Vec<_> = seen.iter().map(|m| m.command).collect();
        assert_eq!(commands, vec![Command::NOTICE, Command::PING]);
        assert_eq!(seen[1].args, vec!["42"]);
    }

    #[tokio::test]
    async fn test_inbound_ends_on_clean_eof() {
        let reader = LineReader::new(&b""[..], LineCodec::new());
        assert!(inbound(reader, Vec::<Message>::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_outbound_writes_valid_lines() {
        let input = futures::stream::iter(vec![
            Ok(b"NICK alice\n".to_vec()),
            Ok(b"\n".to_vec()),
            Ok(b"nonsense here\n".to_vec()),
            Ok(b" leading space\n".to_vec()),
            Ok(b"PRIVMSG #rust :hi there\r\n".to_vec()),
            Ok(b"QUIT".to_vec()),
        ]);
        let mut out: Vec<u8> = Vec::new();
        let writer = LineWriter::new(&mut out, LineCodec::new());

        outbound(input, writer).await.unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "NICK alice\r\nPRIVMSG #rust :hi there\r\nQUIT\r\n"
        );
    }

    #[tokio::test]
    async fn test_outbound_io_error_is_fatal() {
        let input = futures::stream::iter(vec![
            Ok(b"NICK alice\n".to_vec()),
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed")),
            Ok(b"QUIT\n".to_vec()),
        ]);
        let writer = LineWriter::new(Vec::new(), LineCodec::new());

        assert!(matches!(
            outbound(input, writer).await,
            Err(ProtocolError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_outbound_skips_non_utf8_line() {
        let input = futures::stream::iter(vec![
            Ok(b"NICK alice\n".to_vec()),
            Ok(b"PRIVMSG #a :caf\xe9\n".to_vec()),
            Ok(b"QUIT\n".to_vec()),
        ]);
        let mut out: Vec<u8> = Vec::new();
        let writer = LineWriter::new(&mut out, LineCodec::new());

        assert!(outbound(input, writer).await.is_ok());
        assert_eq!(out, b"NICK alice\r\nQUIT\r\n");
    }
}
