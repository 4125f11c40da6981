//! Diagnostics setup and the console display of received messages.
//!
//! Diagnostics go to stderr through `tracing`. Received messages are printed
//! to stdout as `[<time>] <origin> <COMMAND> <args>` and, when chat logging is
//! enabled, appended to a daily file `<server>_<date>.log` in the configured
//! log directory (default: `~/.local/share/ircline/logs/`).

use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::model::{DisplayConfig, LoggingConfig};
use crate::irc::pump::MessageSink;
use crate::irc::Message;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides `level`.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Human-readable form of a message.
pub fn render_line(timestamp: &str, msg: &Message) -> String {
    let origin = msg.source_nickname().unwrap_or("*");
    let mut line = format!("[{}] {} {}", timestamp, origin, msg.command);
    for arg in &msg.args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

fn expand_home(dir: &str) -> PathBuf {
    match dir.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(dir),
        },
        None => PathBuf::from(dir),
    }
}

/// Keep only characters that are safe in a file name.
fn safe_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

/// Prints every received message and optionally logs it to disk.
///
/// The log file handle is reopened when the date rolls over. If a file
/// cannot be opened, file logging is switched off with a single warning.
/// Console write failures (e.g. a closed pipe) are also reported once.
pub struct ConsoleDisplay {
    out: Box<dyn Write + Send>,
    out_failed: bool,
    timestamp_format: String,
    log_dir: Option<PathBuf>,
    server: String,
    file: Option<(String, File)>,
}

impl ConsoleDisplay {
    pub fn new(display: &DisplayConfig, logging: &LoggingConfig, server: &str) -> Self {
        Self {
            out: Box::new(std::io::stdout()),
            out_failed: false,
            timestamp_format: display.timestamp_format.clone(),
            log_dir: logging.chat_log.then(|| expand_home(&logging.log_dir)),
            server: safe_file_stem(server),
            file: None,
        }
    }

    #[cfg(test)]
    fn with_output(mut self, out: Box<dyn Write + Send>) -> Self {
        self.out = out;
        self
    }

    fn log_file(&mut self) -> Option<&mut File> {
        let dir = self.log_dir.as_ref()?;
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let stale = self.file.as_ref().map_or(true, |(d, _)| *d != date);
        if stale {
            let path = dir.join(format!("{}_{}.log", self.server, date));
            let opened = fs::create_dir_all(dir)
                .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
            match opened {
                Ok(file) => self.file = Some((date, file)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "chat log disabled");
                    self.log_dir = None;
                    self.file = None;
                    return None;
                }
            }
        }
        self.file.as_mut().map(|(_, file)| file)
    }
}

impl MessageSink for ConsoleDisplay {
    fn display(&mut self, msg: &Message) {
        let now = chrono::Local::now();
        let mut timestamp = String::new();
        if write!(timestamp, "{}", now.format(&self.timestamp_format)).is_err() {
            // Invalid strftime pattern in the config.
            timestamp = now.format("%H:%M:%S").to_string();
        }
        let line = render_line(&timestamp, msg);
        if !self.out_failed {
            if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
                warn!(error = %e, "console output failed, no longer printing messages");
                self.out_failed = true;
            }
        }

        if let Some(file) = self.log_file() {
            if let Err(e) = writeln!(file, "{}", line) {
                warn!(error = %e, "failed to write chat log");
            }
        }
    }
}
