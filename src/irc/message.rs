//! Structured protocol lines.
//!
//! Wire syntax handled here:
//!
//! ```text
//! [':' prefix SP] command *( SP argument ) [SP ':' trailing]
//! ```
//!
//! Parsing works on a single line with the CRLF already removed by the
//! codec. Serializing produces the full line including the CRLF.

use std::fmt;

use super::command::Command;
use super::error::{ProtocolError, Result};

/// One parsed or constructed protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Sender/origin, without the leading `:`.
    pub prefix: Option<String>,
    pub command: Command,
    /// Ordered arguments. Only the last one may contain spaces.
    pub args: Vec<String>,
    /// The last argument goes on the wire as `:trailing`.
    trailing: bool,
}

/// Split off the text before the first space.
fn split_token(s: &str) -> (&str, &str) {
    match s.find(' ') {
        Some(pos) => (&s[..pos], &s[pos + 1..]),
        None => (s, ""),
    }
}

fn needs_trailing(arg: &str) -> bool {
    arg.is_empty() || arg.contains(' ') || arg.starts_with(':')
}

impl Message {
    /// Build a message, marking the last argument trailing when the wire
    /// format needs it to.
    pub fn new<I, S>(prefix: Option<String>, command: Command, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let trailing = args.last().is_some_and(|a| needs_trailing(a));
        Self {
            prefix,
            command,
            args,
            trailing,
        }
    }

    /// Force the last argument to be written in trailing form.
    pub fn with_trailing(mut self) -> Self {
        self.trailing = !self.args.is_empty();
        self
    }

    pub fn pass(password: &str) -> Self {
        Self::new(None, Command::PASS, [password])
    }

    pub fn nick(nickname: &str) -> Self {
        Self::new(None, Command::NICK, [nickname])
    }

    pub fn user(username: &str, realname: &str) -> Self {
        Self::new(None, Command::USER, [username, "0", "*", realname]).with_trailing()
    }

    /// Nickname part of the prefix (`nick!user@host` → `nick`).
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .map(|p| p.split(['!', '@']).next().unwrap_or(p))
    }

    /// Parse one line (without CRLF).
    ///
    /// A blank line is not an error and yields `Ok(None)`.
    pub fn parse(line: &[u8]) -> Result<Option<Self>> {
        if line.is_empty() {
            return Ok(None);
        }
        Self::parse_str(std::str::from_utf8(line)?).map(Some)
    }

    fn parse_str(line: &str) -> Result<Self> {
        let (first, mut rest) = split_token(line);
        if first.is_empty() {
            return Err(ProtocolError::EmptyMessage);
        }

        let (prefix, command) = match first.strip_prefix(':') {
            Some(prefix) => {
                let (command, remainder) = split_token(rest);
                rest = remainder;
                (Some(prefix.to_string()), command)
            }
            None => (None, first),
        };
        if command.is_empty() {
            return Err(ProtocolError::EmptyMessage);
        }
        let command: Command = command.parse()?;

        let mut args = Vec::new();
        let mut trailing = false;
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(text) = rest.strip_prefix(':') {
                args.push(text.to_string());
                trailing = true;
                break;
            }
            let (arg, remainder) = split_token(rest);
            args.push(arg.to_string());
            rest = remainder;
        }

        Ok(Self {
            prefix,
            command,
            args,
            trailing,
        })
    }

    /// Wire form of the message, CRLF included.
    pub fn serialize(&self) -> Vec<u8> {
        format!("{self}\r\n").into_bytes()
    }
}

/// Renders the wire form without the terminating CRLF.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}", self.command)?;
        let last = self.args.len().saturating_sub(1);
        for (i, arg) in self.args.iter().enumerate() {
            if self.trailing && i == last {
                write!(f, " :{}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Option<Message>> {
        Message::parse(line.as_bytes())
    }

    #[test]
    fn test_blank_line_is_not_a_message() {
        assert!(parse("").unwrap().is_none());
    }

    #[test]
    fn test_leading_space_is_empty_message() {
        assert!(matches!(parse(" FOO"), Err(ProtocolError::EmptyMessage)));
    }

    #[test]
    fn test_prefix_only_is_empty_message() {
        assert!(matches!(parse(":only-prefix"), Err(ProtocolError::EmptyMessage)));
        assert!(matches!(parse(":server  NICK"), Err(ProtocolError::EmptyMessage)));
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(
            parse("XYZ123 arg1 arg2"),
            Err(ProtocolError::InvalidCommand(t)) if t == "XYZ123"
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(
            Message::parse(b"PRIVMSG #a :\xff\xfe"),
            Err(ProtocolError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_notice_with_trailing() {
        let msg = parse(":irc.example.com NOTICE * :*** Looking up your hostname")
            .unwrap()
            .unwrap();
        assert_eq!(msg.prefix.as_deref(), Some("irc.example.com"));
        assert_eq!(msg.command, Command::NOTICE);
        assert_eq!(msg.args, vec!["*", "*** Looking up your hostname"]);
        assert!(msg.trailing);
    }

    #[test]
    fn test_ping() {
        let msg = parse("PING :1234567").unwrap().unwrap();
        assert_eq!(msg.prefix, None);
        assert_eq!(msg.command, Command::PING);
        assert_eq!(msg.args, vec!["1234567"]);
    }

    #[test]
    fn test_no_trailing() {
        let msg = parse("MODE #chan +o alice").unwrap().unwrap();
        assert_eq!(msg.args, vec!["#chan", "+o", "alice"]);
        assert!(!msg.trailing);
    }

    #[test]
    fn test_colon_mid_token_is_not_trailing() {
        let msg = parse("PRIVMSG #a b:c :d e:f :g").unwrap().unwrap();
        assert_eq!(msg.args, vec!["#a", "b:c", "d e:f :g"]);
    }

    #[test]
    fn test_empty_trailing() {
        let msg = parse("TOPIC #chan :").unwrap().unwrap();
        assert_eq!(msg.args, vec!["#chan", ""]);
        assert!(msg.trailing);
    }

    #[test]
    fn test_repeated_spaces_between_args() {
        let msg = parse("JOIN  #a   #b").unwrap().unwrap();
        assert_eq!(msg.args, vec!["#a", "#b"]);
    }

    #[test]
    fn test_numeric_reply() {
        let msg = parse(":srv 433 * alice :Nickname is already in use")
            .unwrap()
            .unwrap();
        assert_eq!(msg.command, Command::Numeric(433));
        assert_eq!(msg.args.len(), 3);
    }

    #[test]
    fn test_serialize() {
        let msg = Message::new(
            Some("nick!user@host".into()),
            Command::PRIVMSG,
            ["#rust", "hello there"],
        );
        assert_eq!(msg.serialize(), b":nick!user@host PRIVMSG #rust :hello there\r\n");

        let msg = Message::new(None, Command::QUIT, Vec::<String>::new());
        assert_eq!(msg.serialize(), b"QUIT\r\n");

        let msg = Message::new(None, Command::NICK, ["alice"]);
        assert_eq!(msg.serialize(), b"NICK alice\r\n");
    }

    #[test]
    fn test_serialize_numeric_is_padded() {
        let msg = Message::new(Some("srv".into()), Command::Numeric(1), ["alice", "Welcome"]);
        assert_eq!(msg.serialize(), b":srv 001 alice Welcome\r\n");
    }

    #[test]
    fn test_registration_messages() {
        assert_eq!(Message::pass("secret").serialize(), b"PASS secret\r\n");
        assert_eq!(
            Message::user("alice", "Alice").serialize(),
            b"USER alice 0 * :Alice\r\n"
        );
    }

    #[test]
    fn test_parse_then_serialize_is_identical() {
        let lines = [
            ":irc.example.com NOTICE * :*** Looking up your hostname",
            "PING :1234567",
            ":srv 001 alice :Welcome to the network, alice",
            ":alice!a@host PRIVMSG #rust :hi: there :)",
            "MODE #chan +o alice",
            "TOPIC #chan :",
            "QUIT",
        ];
        for line in lines {
            let msg = parse(line).unwrap().unwrap();
            assert_eq!(msg.serialize(), format!("{line}\r\n").into_bytes(), "{line}");
        }
    }

    #[test]
    fn test_source_nickname() {
        let msg = parse(":alice!a@host PRIVMSG bob :hi").unwrap().unwrap();
        assert_eq!(msg.source_nickname(), Some("alice"));
        let msg = parse(":irc.example.com NOTICE * :x").unwrap().unwrap();
        assert_eq!(msg.source_nickname(), Some("irc.example.com"));
    }
}
