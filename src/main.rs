mod config;
mod irc;
mod logging;

use crate::irc::connection;
use crate::irc::pump;
use crate::logging::ConsoleDisplay;
use anyhow::{Context, Result};
use futures::Stream;
use std::io::BufRead;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Optional config path as the only argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = config::load_config(config_path.as_deref())?;

    logging::init_tracing(&cfg.logging.level);

    if let Err(e) = run(cfg).await {
        error!(error = %e, "connection terminated");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cfg: config::AppConfig) -> Result<()> {
    let server = &cfg.server;
    let (reader, mut writer) =
        connection::connect(&server.host, server.port, cfg.protocol.max_line_len)
            .await
            .with_context(|| format!("Failed to connect to {}", server.label()))?;

    writer
        .register(
            &server.nickname,
            server.username(),
            &server.realname,
            server.password.as_deref(),
        )
        .await
        .context("Failed to send registration")?;

    let display = ConsoleDisplay::new(&cfg.display, &cfg.logging, &server.label());
    let mut inbound: JoinHandle<irc::error::Result<()>> =
        tokio::spawn(pump::inbound(reader, display));

    let operator = spawn_operator_input();
    let mut outbound: JoinHandle<irc::error::Result<()>> =
        tokio::spawn(pump::outbound(operator, writer));

    tokio::select! {
        res = &mut inbound => {
            outbound.abort();
            res.context("inbound task panicked")?.context("read from server failed")?;
        }
        res = &mut outbound => {
            res.context("outbound task panicked")?.context("write to server failed")?;
            info!("operator input finished, still receiving");
            inbound
                .await
                .context("inbound task panicked")?
                .context("read from server failed")?;
        }
    }

    Ok(())
}

/// Raw console lines as a stream, line feed included. Blocking stdin reads
/// run on a plain thread so they never hold up runtime shutdown.
fn spawn_operator_input() -> impl Stream<Item = std::io::Result<Vec<u8>>> + Unpin {
    let (tx, mut rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut stdin = std::io::stdin().lock();
        loop {
            let mut line = Vec::new();
            let item = match stdin.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => Ok(line),
                Err(e) => Err(e),
            };
            let failed = item.is_err();
            if tx.send(item).is_err() || failed {
                break;
            }
        }
    });
    futures::stream::poll_fn(move |cx| rx.poll_recv(cx))
}
