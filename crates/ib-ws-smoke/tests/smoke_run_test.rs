/*
[INPUT]:  Smoke run against an in-process gateway
[OUTPUT]: End-to-end verification of command firing and reply logging
[POS]:    Integration test layer - full run verification
[UPDATE]: When changing the runner's lifecycle
*/

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use ib_ws_smoke::{RunExit, SmokeConfig, runner};

#[tokio::test]
async fn test_smoke_run_fires_script_and_ends_with_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let gateway = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        let mut received = Vec::new();
        while received.len() < 2 {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => received.push(text.to_string()),
                Some(Ok(_)) => continue,
                other => panic!("client went away early: {other:?}"),
            }
        }

        ws.send(Message::Text(r#"{"status":"FILLED","oid":430}"#.into()))
            .await
            .unwrap();
        ws.close(None).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
        received
    });

    let config = SmokeConfig::from_yaml(&format!(
        "url: ws://{addr}\nmessage_delay_ms: 10\ncommands:\n  - {{ code: ORDER-STATUS-REQUEST, oid: 430 }}\n  - {{ code: CANCEL-ORDER-REQUEST, oid: 430 }}\n"
    ))
    .unwrap();

    let exit = timeout(Duration::from_secs(5), runner::run(&config, CancellationToken::new()))
        .await
        .expect("smoke run timed out")
        .unwrap();
    assert_eq!(exit, RunExit::ConnectionClosed);

    let received = timeout(Duration::from_secs(5), gateway).await.unwrap().unwrap();
    assert_eq!(
        received,
        vec![
            r#"{"code":"ORDER-STATUS-REQUEST","oid":430}"#.to_string(),
            r#"{"code":"CANCEL-ORDER-REQUEST","oid":430}"#.to_string(),
        ]
    );
}
