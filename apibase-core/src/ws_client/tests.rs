use super::*;
use serde_json::{Value, json};
use std::sync::atomic::AtomicUsize;
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::accept_async;

const WAIT: Duration = Duration::from_secs(5);

/// Echo server that closes the first `drop_first` connections right after
/// the handshake. Returns the URL and the accepted connection count.
async fn spawn_server(drop_first: usize) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connections);

    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(tcp).await else {
                    return;
                };
                if n <= drop_first {
                    let _ = ws.close(None).await;
                    return;
                }
                while let Some(Ok(frame)) = ws.next().await {
                    if (frame.is_text() || frame.is_binary()) && ws.send(frame).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    (url, connections)
}

fn config(url: &str) -> WsApiConfig {
    WsApiConfig::new(url).with_error_reconnect_timeout(Duration::from_millis(50))
}

async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_received_messages_reach_handler() {
    let (url, _) = spawn_server(0).await;
    let client = WsApiClient::new(config(&url)).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.add_handler_fn(move |message: &WsMessage| {
        let _ = tx.send(message.clone());
        Ok(())
    });

    client.start().await.unwrap();
    assert!(client.is_connected());

    client.send_text("hello").await.unwrap();
    let echoed = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(echoed, WsMessage::Text("hello".to_string()));

    client.send_json(&json!({"op": "ping"})).await.unwrap();
    let echoed = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(echoed.json::<Value>().unwrap()["op"], "ping");

    assert_eq!(client.received_count(), 2);

    client.stop().await;
    assert_eq!(client.state(), WsConnectionState::Disconnected);
}

#[tokio::test]
async fn test_handler_error_is_forwarded_and_reader_survives() {
    let (url, _) = spawn_server(0).await;
    let client = WsApiClient::new(config(&url)).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    client.add_handler_fn(move |message: &WsMessage| {
        seen.fetch_add(1, Ordering::SeqCst);
        if message.as_text() == Some("bad") {
            return Err(Error::invalid_request("cannot handle"));
        }
        Ok(())
    });

    let (err_tx, mut err_rx) = mpsc::unbounded_channel();
    client.on_handler_error(move |message, err| {
        let _ = err_tx.send((message.clone(), err.to_string()));
    });

    client.start().await.unwrap();
    client.send_text("bad").await.unwrap();
    let (message, reported) = timeout(WAIT, err_rx.recv()).await.unwrap().unwrap();
    assert_eq!(message.as_text(), Some("bad"));
    assert!(reported.contains("cannot handle"));

    client.send_text("good").await.unwrap();
    assert!(wait_until(|| calls.load(Ordering::SeqCst) == 2).await);
    assert!(client.is_connected());
    client.stop().await;
}

#[tokio::test]
async fn test_send_before_start_fails() {
    let client = WsApiClient::new(WsApiConfig::new("ws://127.0.0.1:9")).unwrap();
    let err = client.send_text("early").await.unwrap_err();
    assert!(matches!(err, Error::WebSocket(_)));
    assert_eq!(client.state(), WsConnectionState::Disconnected);
}

#[tokio::test]
async fn test_start_failure_leaves_client_disconnected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = WsApiClient::new(WsApiConfig::new(format!("ws://{addr}"))).unwrap();
    assert!(client.start().await.is_err());
    assert_eq!(client.state(), WsConnectionState::Disconnected);
}

#[tokio::test]
async fn test_reconnects_after_peer_drop() {
    let (url, connections) = spawn_server(1).await;
    let client = WsApiClient::new(config(&url)).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.add_handler_fn(move |message: &WsMessage| {
        let _ = tx.send(message.clone());
        Ok(())
    });

    client.start().await.unwrap();
    assert!(
        wait_until(|| connections.load(Ordering::SeqCst) >= 2 && client.is_connected()).await
    );

    client.send_text("after").await.unwrap();
    let echoed = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(echoed.as_text(), Some("after"));
    client.stop().await;
}

#[tokio::test]
async fn test_no_reconnect_when_disabled() {
    let (url, connections) = spawn_server(1).await;
    let client = WsApiClient::new(config(&url).with_auto_reconnect(false)).unwrap();

    client.start().await.unwrap();
    assert!(wait_until(|| client.state() == WsConnectionState::Disconnected).await);
    sleep(Duration::from_millis(200)).await;
    assert_eq!(connections.load(Ordering::SeqCst), 1);
    assert!(client.send_text("late").await.is_err());
}

#[tokio::test]
async fn test_explicit_reconnect_opens_new_socket() {
    let (url, connections) = spawn_server(0).await;
    let client = WsApiClient::new(config(&url)).unwrap();

    client.start().await.unwrap();
    client.start().await.unwrap();
    assert_eq!(connections.load(Ordering::SeqCst), 1);

    client.reconnect().await.unwrap();
    assert!(client.is_connected());
    assert_eq!(connections.load(Ordering::SeqCst), 2);
    client.stop().await;
}

#[test]
fn test_log_level_is_adjustable() {
    let client = WsApiClient::new(WsApiConfig::new("ws://localhost:1")).unwrap();
    assert_eq!(client.log_level(), LogLevel::Info);
    client.set_log_level(LogLevel::Off);
    assert_eq!(client.log_level(), LogLevel::Off);
    assert_eq!(client.id().len(), CLIENT_ID_LEN);
    assert!(WsApiClient::new(WsApiConfig::new("http://localhost:1")).is_err());
}
