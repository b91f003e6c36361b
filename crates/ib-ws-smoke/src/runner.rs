/*
[INPUT]:  SmokeConfig and a shutdown token
[OUTPUT]: One smoke run against the gateway: commands fired, replies logged
[POS]:    Application layer - wires config into a ConnectionClient
[UPDATE]: When changing what a smoke run logs or how it ends
*/

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use ib_ws_adapter::{ConnectionClient, InboundFrame};

use crate::config::SmokeConfig;

/// Why a smoke run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// Shutdown was requested
    Shutdown,
    /// The gateway side closed or the transport failed
    ConnectionClosed,
}

pub fn build_client(config: &SmokeConfig) -> Result<ConnectionClient> {
    let client_config = config.client_config()?;
    let command_count = config.commands.len();

    Ok(ConnectionClient::new(client_config)
        .with_commands(config.commands.clone())
        .on_open(move || {
            info!(command_count, "gateway connection open; firing commands");
        })
        .on_message(log_frame)
        .on_error(|err| {
            error!(error = %err, "gateway WebSocket error");
        }))
}

/// Connect, fire the configured commands and log replies until the
/// connection ends or `shutdown` is cancelled.
pub async fn run(config: &SmokeConfig, shutdown: CancellationToken) -> Result<RunExit> {
    let mut client = build_client(config)?;
    client.connect().context("start gateway connection")?;

    let exit = tokio::select! {
        biased;
        _ = shutdown.cancelled() => RunExit::Shutdown,
        _ = client.closed() => RunExit::ConnectionClosed,
    };

    client.close().await;
    info!(?exit, "smoke run finished");
    Ok(exit)
}

/// Encoded frames, one per configured command.
pub fn encode_commands(config: &SmokeConfig) -> Result<Vec<String>> {
    config
        .commands
        .iter()
        .map(|command| command.to_frame().context("encode command"))
        .collect()
}

fn log_frame(frame: InboundFrame) {
    info!(
        delay = ?frame.age(),
        payload = %frame.payload,
        "gateway frame"
    );
}
