/*
[INPUT]:  ClientConfig, startup command list, open/message/error handlers
[OUTPUT]: Commands written to the gateway socket, inbound frames delivered to handlers
[POS]:    WebSocket layer - fire-and-forget command dispatch over one connection
[UPDATE]: When changing connection lifecycle, send policy or handler dispatch
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::message::{InboundFrame, Incoming, classify, truncate_for_log};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result, TransportError};
use crate::types::Command;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub type OpenHandler = Arc<dyn Fn() + Send + Sync>;
pub type MessageHandler = Arc<dyn Fn(InboundFrame) + Send + Sync>;
pub type ErrorHandler = Arc<dyn Fn(&TransportError) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not yet asked to connect
    Idle,
    Connecting,
    Open,
    Closed,
}

#[derive(Clone, Default)]
struct Handlers {
    on_open: Option<OpenHandler>,
    on_message: Option<MessageHandler>,
    on_error: Option<ErrorHandler>,
}

/// Client for one duplex connection to the order gateway.
///
/// Handlers and the startup command list are registered before
/// [`ConnectionClient::connect`]. On open the startup list is written once, in
/// order, followed by anything passed to [`ConnectionClient::send`] while the
/// connection was still being established.
pub struct ConnectionClient {
    config: ClientConfig,
    startup: Vec<Command>,
    handlers: Handlers,
    outbound_tx: mpsc::UnboundedSender<String>,
    outbound_rx: Option<mpsc::UnboundedReceiver<String>>,
    state: watch::Sender<ConnectionState>,
    shutdown: CancellationToken,
    frames_sent: Arc<AtomicU64>,
    worker_handle: Option<JoinHandle<()>>,
}

impl ConnectionClient {
    pub fn new(config: ClientConfig) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (state, _rx) = watch::channel(ConnectionState::Idle);

        Self {
            config,
            startup: Vec::new(),
            handlers: Handlers::default(),
            outbound_tx,
            outbound_rx: Some(outbound_rx),
            state,
            shutdown: CancellationToken::new(),
            frames_sent: Arc::new(AtomicU64::new(0)),
            worker_handle: None,
        }
    }

    /// Commands written once, in order, as soon as the connection opens.
    pub fn with_commands(mut self, commands: Vec<Command>) -> Self {
        self.startup = commands;
        self
    }

    /// Called exactly once when the connection becomes ready to send.
    pub fn on_open<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.on_open = Some(Arc::new(handler));
        self
    }

    /// Called once per inbound frame, `message_delay` after its arrival.
    /// Calls never overlap and follow arrival order.
    pub fn on_message<F>(mut self, handler: F) -> Self
    where
        F: Fn(InboundFrame) + Send + Sync + 'static,
    {
        self.handlers.on_message = Some(Arc::new(handler));
        self
    }

    /// Called for every transport failure. The client does not reconnect.
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&TransportError) + Send + Sync + 'static,
    {
        self.handlers.on_error = Some(Arc::new(handler));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Shared count of frames written to the socket so far.
    pub fn frames_sent(&self) -> Arc<AtomicU64> {
        self.frames_sent.clone()
    }

    /// Start connecting in the background.
    ///
    /// Transport failures are reported through the error handler, not here.
    /// Must be called from within a Tokio runtime.
    pub fn connect(&mut self) -> Result<()> {
        let Some(outbound_rx) = self.outbound_rx.take() else {
            return Err(ClientError::AlreadyConnected);
        };

        let startup = match self
            .startup
            .iter()
            .map(Command::to_frame)
            .collect::<serde_json::Result<Vec<_>>>()
        {
            Ok(frames) => frames,
            Err(err) => {
                self.outbound_rx = Some(outbound_rx);
                return Err(err.into());
            }
        };

        self.state.send_replace(ConnectionState::Connecting);

        let worker = ConnectionWorker {
            config: self.config.clone(),
            startup,
            handlers: self.handlers.clone(),
            outbound_rx,
            state: self.state.clone(),
            shutdown: self.shutdown.clone(),
            frames_sent: self.frames_sent.clone(),
        };
        self.worker_handle = Some(tokio::spawn(worker.run()));

        Ok(())
    }

    /// Encode `command` and queue it for the connection.
    ///
    /// Before the connection opens the frame is held and written after the
    /// startup list. Once closed, returns [`ClientError::Closed`].
    pub fn send(&self, command: &Command) -> Result<()> {
        if self.state() == ConnectionState::Closed {
            return Err(ClientError::Closed);
        }

        let frame = command.to_frame()?;
        self.outbound_tx
            .send(frame)
            .map_err(|_| ClientError::Closed)?;

        debug!(code = %command.code(), "ws command queued");
        Ok(())
    }

    /// `send` each command in order, stopping at the first failure.
    pub fn send_all(&self, commands: &[Command]) -> Result<()> {
        for command in commands {
            self.send(command)?;
        }
        Ok(())
    }

    /// Wait until the connection is closed and every received frame has
    /// been handed to the message handler.
    pub async fn closed(&self) {
        if self.state() == ConnectionState::Idle {
            return;
        }
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|state| *state == ConnectionState::Closed).await;
    }

    /// Write any frames already queued by `send`, then send a Close frame and
    /// stop the worker.
    pub async fn close(&mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.worker_handle.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "ws worker terminated abnormally");
            }
        }
        self.state.send_replace(ConnectionState::Closed);
    }
}

impl std::fmt::Debug for ConnectionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionClient")
            .field("url", &self.config.url.as_str())
            .field("startup", &self.startup.len())
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for ConnectionClient {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct ConnectionWorker {
    config: ClientConfig,
    startup: Vec<String>,
    handlers: Handlers,
    outbound_rx: mpsc::UnboundedReceiver<String>,
    state: watch::Sender<ConnectionState>,
    shutdown: CancellationToken,
    frames_sent: Arc<AtomicU64>,
}

impl ConnectionWorker {
    async fn run(mut self) {
        let url = self.config.url.to_string();
        info!(ws_url = %url, "Connecting to gateway WebSocket");

        let ws = tokio::select! {
            _ = self.shutdown.cancelled() => {
                self.state.send_replace(ConnectionState::Closed);
                return;
            }
            connected = connect_async(url.as_str()) => match connected {
                Ok((ws, _response)) => ws,
                Err(source) => {
                    let err = TransportError::Connect { url: url.clone(), source };
                    self.report(&err);
                    self.state.send_replace(ConnectionState::Closed);
                    return;
                }
            }
        };

        self.state.send_replace(ConnectionState::Open);
        info!(ws_url = %url, startup = self.startup.len(), "Gateway WebSocket open");
        if let Some(on_open) = &self.handlers.on_open {
            on_open();
        }

        let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();
        let dispatcher = tokio::spawn(dispatch_loop(
            dispatch_rx,
            self.handlers.on_message.clone(),
            self.config.message_delay,
        ));

        self.stream_loop(ws, dispatch_tx).await;
        self.outbound_rx.close();

        if let Err(err) = dispatcher.await {
            warn!(error = %err, "ws dispatcher terminated abnormally");
        }
        self.state.send_replace(ConnectionState::Closed);
        info!(ws_url = %url, "Gateway WebSocket closed");
    }

    async fn stream_loop(&mut self, ws: WsStream, dispatch_tx: mpsc::UnboundedSender<InboundFrame>) {
        let (mut write, mut read) = ws.split();

        let startup = std::mem::take(&mut self.startup);
        for frame in startup {
            if let Err(source) = self.write_frame(&mut write, frame).await {
                self.report(&TransportError::Send(source));
                return;
            }
        }

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!("ws close requested");
                    self.outbound_rx.close();
                    while let Ok(frame) = self.outbound_rx.try_recv() {
                        if let Err(source) = self.write_frame(&mut write, frame).await {
                            self.report(&TransportError::Send(source));
                            return;
                        }
                    }
                    let _ = write.send(WsMessage::Close(None)).await;
                    return;
                }
                outbound = self.outbound_rx.recv() => {
                    match outbound {
                        Some(frame) => {
                            if let Err(source) = self.write_frame(&mut write, frame).await {
                                self.report(&TransportError::Send(source));
                                return;
                            }
                        }
                        None => {
                            let _ = write.send(WsMessage::Close(None)).await;
                            return;
                        }
                    }
                }
                incoming = read.next() => {
                    match incoming {
                        Some(Ok(message)) => match classify(message) {
                            Incoming::Frame(frame) => {
                                debug!(
                                    bytes = frame.payload.len(),
                                    message = %truncate_for_log(&frame.payload),
                                    "ws frame received"
                                );
                                if dispatch_tx.send(frame).is_err() {
                                    return;
                                }
                            }
                            Incoming::Close => {
                                debug!("ws close frame received");
                                let _ = write.send(WsMessage::Close(None)).await;
                                return;
                            }
                            Incoming::Skip => {}
                        },
                        Some(Err(source)) => {
                            self.report(&TransportError::Receive(source));
                            return;
                        }
                        None => {
                            debug!("ws stream ended");
                            return;
                        }
                    }
                }
            }
        }
    }

    async fn write_frame(
        &self,
        write: &mut SplitSink<WsStream, WsMessage>,
        frame: String,
    ) -> std::result::Result<(), tungstenite::Error> {
        log_frame_sent(&frame);
        write.send(WsMessage::Text(frame.into())).await?;
        self.frames_sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Later `send` calls fail with `Closed` from here on.
    fn report(&mut self, err: &TransportError) {
        self.outbound_rx.close();
        warn!(error = %err, "gateway WebSocket transport error");
        if let Some(on_error) = &self.handlers.on_error {
            on_error(err);
        }
    }
}

/// Hands frames to the message handler one at a time, each at
/// `received_at + delay`.
async fn dispatch_loop(
    mut rx: mpsc::UnboundedReceiver<InboundFrame>,
    handler: Option<MessageHandler>,
    delay: std::time::Duration,
) {
    while let Some(frame) = rx.recv().await {
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep_until(frame.received_at + delay).await;
        }

        match &handler {
            Some(handler) => handler(frame),
            None => debug!(bytes = frame.payload.len(), "ws frame dropped; no message handler"),
        }
    }
}

fn log_frame_sent(frame: &str) {
    debug!(
        bytes = frame.len(),
        message = %truncate_for_log(frame),
        "ws frame sent"
    );
}
