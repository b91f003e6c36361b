/*
[INPUT]:  Test scenarios that need a live gateway socket
[OUTPUT]: In-process WebSocket gateway and shared helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for ib-ws-adapter tests

#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

use ib_ws_adapter::{Command, Op, PlaceOrder};

pub type GatewayStream = WebSocketStream<TcpStream>;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Accept exactly one WebSocket client on an ephemeral port and run
/// `script` against it. Returns the `ws://` URL to connect to.
pub async fn spawn_gateway<F, Fut>(script: F) -> (String, JoinHandle<Fut::Output>)
where
    F: FnOnce(GatewayStream) -> Fut + Send + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = accept_async(stream).await.unwrap();
        script(ws).await
    });
    (format!("ws://{addr}"), handle)
}

/// URL of a local port with nothing listening on it
pub async fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{addr}")
}

pub async fn read_text_frames(ws: &mut GatewayStream, count: usize) -> Vec<String> {
    let mut frames = Vec::with_capacity(count);
    while frames.len() < count {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => frames.push(text.to_string()),
            Some(Ok(_)) => continue,
            other => panic!("gateway stream ended early: {other:?}"),
        }
    }
    frames
}

/// Drain until the client closes or goes away; returns true if a Close frame arrived.
pub async fn wait_for_close(ws: &mut GatewayStream) -> bool {
    while let Some(message) = ws.next().await {
        match message {
            Ok(Message::Close(_)) => return true,
            Ok(_) => continue,
            Err(_) => return false,
        }
    }
    false
}

pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(TEST_TIMEOUT, future)
        .await
        .expect("test step timed out")
}

/// The command script the manual smoke run fires on connect
pub fn smoke_commands() -> Vec<Command> {
    vec![
        PlaceOrder::limit("DU997901", Op::Buy, "CSCO", 1, "123.32".parse().unwrap()).into(),
        PlaceOrder::market("DU1031917", Op::Sell, "TEVA", 2).into(),
        PlaceOrder::market("DU997900", Op::Buy, "MSFT", 3).into(),
        Command::order_status(430),
        Command::cancel_order(430),
        Command::account_info("DU997900"),
    ]
}
