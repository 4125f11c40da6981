//! Protocol verbs.
//!
//! A [`Command`] is either one of a fixed set of keywords or a numeric reply
//! code. Anything else is rejected at parse time.

use std::fmt;
use std::str::FromStr;

use super::error::ProtocolError;

/// Width numeric replies are zero-padded to on the wire (`1` → `001`).
pub const NUMERIC_WIDTH: usize = 3;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    PASS,
    NICK,
    USER,
    PING,
    PONG,
    PRIVMSG,
    NOTICE,
    JOIN,
    PART,
    QUIT,
    MODE,
    TOPIC,
    KICK,
    ERROR,
    /// Numeric reply code such as `001` or `433`.
    Numeric(i32),
}

impl Command {
    const KEYWORDS: [Command; 14] = [
        Command::PASS,
        Command::NICK,
        Command::USER,
        Command::PING,
        Command::PONG,
        Command::PRIVMSG,
        Command::NOTICE,
        Command::JOIN,
        Command::PART,
        Command::QUIT,
        Command::MODE,
        Command::TOPIC,
        Command::KICK,
        Command::ERROR,
    ];

    /// Canonical keyword text, or `None` for numeric replies.
    pub fn keyword(&self) -> Option<&'static str> {
        let kw = match self {
            Command::PASS => "PASS",
            Command::NICK => "NICK",
            Command::USER => "USER",
            Command::PING => "PING",
            Command::PONG => "PONG",
            Command::PRIVMSG => "PRIVMSG",
            Command::NOTICE => "NOTICE",
            Command::JOIN => "JOIN",
            Command::PART => "PART",
            Command::QUIT => "QUIT",
            Command::MODE => "MODE",
            Command::TOPIC => "TOPIC",
            Command::KICK => "KICK",
            Command::ERROR => "ERROR",
            Command::Numeric(_) => return None,
        };
        Some(kw)
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    /// Keywords match case-sensitively and take precedence over numerics.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if let Some(cmd) = Self::KEYWORDS
            .iter()
            .find(|cmd| cmd.keyword() == Some(token))
        {
            return Ok(*cmd);
        }
        token
            .parse::<i32>()
            .map(Command::Numeric)
            .map_err(|_| ProtocolError::InvalidCommand(token.to_string()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Numeric(code) => write!(f, "{:0width$}", code, width = NUMERIC_WIDTH),
            other => f.write_str(other.keyword().unwrap_or_default()),
        }
    }
}
