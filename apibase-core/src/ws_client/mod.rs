//! WebSocket API client.
//!
//! [`WsApiClient`] owns one socket to a configured endpoint. A background
//! task forwards outbound frames, counts and logs inbound data frames, and
//! hands each one to the registered [`WsMessageHandler`]s. A handler failure
//! is logged and passed to the error callback; the reader keeps running.
//! When the peer closes or the socket errors, the task waits
//! `error_reconnect_timeout` and connects again until [`WsApiClient::stop`].
//!
//! # Example
//!
//! ```rust,no_run
//! use apibase_core::ws_client::{WsApiClient, WsApiConfig, WsMessage};
//!
//! # async fn example() -> apibase_core::Result<()> {
//! let client = WsApiClient::new(WsApiConfig::new("wss://stream.example.com/ws"))?;
//! client.add_handler_fn(|message: &WsMessage| {
//!     println!("{message}");
//!     Ok(())
//! });
//! client.start().await?;
//! client.send_text(r#"{"op":"subscribe","channel":"trades"}"#).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod message;
mod state;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_ERROR_RECONNECT_TIMEOUT, WsApiConfig};
pub use message::WsMessage;
pub use state::WsConnectionState;

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::client::CLIENT_ID_LEN;
use crate::error::{Error, Result};
use crate::logging::LogLevel;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long `stop` waits for the socket task to close cleanly.
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Receives data frames from a [`WsApiClient`].
pub trait WsMessageHandler: Send + Sync {
    /// Handles one received message.
    ///
    /// # Errors
    ///
    /// An error is logged and forwarded to the client's error callback. It
    /// does not stop delivery of later messages.
    fn on_message(&self, message: &WsMessage) -> Result<()>;
}

struct FnHandler<F>(F);

impl<F> WsMessageHandler for FnHandler<F>
where
    F: Fn(&WsMessage) -> Result<()> + Send + Sync,
{
    fn on_message(&self, message: &WsMessage) -> Result<()> {
        (self.0)(message)
    }
}

/// Called with the message and the error when a handler fails.
pub type HandlerErrorCallback = Arc<dyn Fn(&WsMessage, &Error) + Send + Sync>;

/// State shared with the socket task.
struct Shared {
    id: String,
    config: WsApiConfig,
    log_level: RwLock<LogLevel>,
    state: AtomicU8,
    received: AtomicU64,
    handlers: RwLock<Vec<Arc<dyn WsMessageHandler>>>,
    on_handler_error: RwLock<Option<HandlerErrorCallback>>,
}

struct Session {
    outbound: mpsc::UnboundedSender<Message>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct WsInner {
    shared: Arc<Shared>,
    session: Mutex<Option<Session>>,
}

impl Drop for WsInner {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.cancel.cancel();
        }
    }
}

/// Client for a WebSocket API endpoint.
///
/// Cheap to clone; clones share the connection, handlers and counters. The
/// socket task is cancelled when the last clone is dropped.
#[derive(Clone)]
pub struct WsApiClient {
    inner: Arc<WsInner>,
}

impl fmt::Debug for WsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsApiClient")
            .field("id", &self.id())
            .field("url", &self.url())
            .field("state", &self.state())
            .field("received_count", &self.received_count())
            .finish_non_exhaustive()
    }
}

impl WsApiClient {
    /// Creates a client. No connection is made until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn new(config: WsApiConfig) -> Result<Self> {
        let validation = config.validate()?;
        for warning in &validation.warnings {
            warn!(url = %config.url, "{warning}");
        }

        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(CLIENT_ID_LEN);

        Ok(Self {
            inner: Arc::new(WsInner {
                shared: Arc::new(Shared {
                    id,
                    log_level: RwLock::new(config.log_level),
                    config,
                    state: AtomicU8::new(WsConnectionState::Disconnected.as_u8()),
                    received: AtomicU64::new(0),
                    handlers: RwLock::new(Vec::new()),
                    on_handler_error: RwLock::new(None),
                }),
                session: Mutex::new(None),
            }),
        })
    }

    /// Short random identifier used in logs.
    pub fn id(&self) -> &str {
        &self.inner.shared.id
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.inner.shared.config.url
    }

    /// Current connection state.
    pub fn state(&self) -> WsConnectionState {
        self.inner.shared.state()
    }

    /// Whether the socket is currently open.
    pub fn is_connected(&self) -> bool {
        self.state() == WsConnectionState::Connected
    }

    /// Number of data frames received over the client's lifetime.
    pub fn received_count(&self) -> u64 {
        self.inner.shared.received.load(Ordering::Relaxed)
    }

    /// Current verbosity threshold.
    pub fn log_level(&self) -> LogLevel {
        self.inner.shared.log_level()
    }

    /// Changes the verbosity threshold for subsequent messages.
    pub fn set_log_level(&self, level: LogLevel) {
        *self
            .inner
            .shared
            .log_level
            .write()
            .unwrap_or_else(PoisonError::into_inner) = level;
    }

    /// Registers a message handler.
    pub fn add_handler(&self, handler: impl WsMessageHandler + 'static) {
        self.inner
            .shared
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    /// Registers a closure as a message handler.
    pub fn add_handler_fn<F>(&self, handler: F)
    where
        F: Fn(&WsMessage) -> Result<()> + Send + Sync + 'static,
    {
        self.add_handler(FnHandler(handler));
    }

    /// Sets the callback invoked when a handler returns an error.
    pub fn on_handler_error<F>(&self, callback: F)
    where
        F: Fn(&WsMessage, &Error) + Send + Sync + 'static,
    {
        *self
            .inner
            .shared
            .on_handler_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(callback));
    }

    /// Connects and starts the socket task. Does nothing if already running.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the handshake exceeds the connect timeout
    /// - [`Error::WebSocket`] if the connection or handshake fails
    #[instrument(name = "ws_start", skip(self), fields(client_id = %self.id(), url = %self.url()))]
    pub async fn start(&self) -> Result<()> {
        let mut session = self.inner.session.lock().await;
        if session.as_ref().is_some_and(|s| !s.task.is_finished()) {
            debug!("WebSocket client already running");
            return Ok(());
        }

        let shared = &self.inner.shared;
        shared.set_state(WsConnectionState::Connecting);
        let stream = match connect(&shared.config).await {
            Ok(stream) => stream,
            Err(err) => {
                shared.set_state(WsConnectionState::Disconnected);
                error!(error = %err, "WebSocket connect failed");
                return Err(err);
            }
        };
        shared.set_state(WsConnectionState::Connected);
        info!("WebSocket connected");

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(
            Arc::clone(shared),
            stream,
            outbound_rx,
            cancel.clone(),
        ));
        *session = Some(Session {
            outbound,
            cancel,
            task,
        });
        Ok(())
    }

    /// Queues a text frame.
    ///
    /// Frames queued while reconnecting are sent once the socket is back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebSocket`] if the client is not started or the socket
    /// task has ended.
    pub async fn send_text(&self, text: impl Into<String>) -> Result<()> {
        let text: String = text.into();
        self.send_frame(Message::text(text)).await
    }

    /// Serializes `payload` as JSON and queues it as a text frame.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] if serialization fails, otherwise as
    /// [`send_text`](Self::send_text).
    pub async fn send_json<T: Serialize + ?Sized>(&self, payload: &T) -> Result<()> {
        let text = serde_json::to_string(payload)
            .map_err(|e| Error::invalid_request(format!("Failed to serialize message: {e}")))?;
        self.send_text(text).await
    }

    async fn send_frame(&self, frame: Message) -> Result<()> {
        let session = self.inner.session.lock().await;
        let Some(session) = session.as_ref() else {
            return Err(Error::websocket("WebSocket client is not started"));
        };
        session
            .outbound
            .send(frame)
            .map_err(|_| Error::websocket("WebSocket connection is closed"))
    }

    /// Closes the current socket and connects again.
    ///
    /// # Errors
    ///
    /// Any error from [`start`](Self::start).
    pub async fn reconnect(&self) -> Result<()> {
        info!(client_id = %self.id(), "Reconnecting WebSocket");
        self.stop().await;
        self.start().await
    }

    /// Closes the socket with a normal closure and stops the task.
    pub async fn stop(&self) {
        let session = self.inner.session.lock().await.take();
        if let Some(session) = session {
            session.cancel.cancel();
            let mut task = session.task;
            match tokio::time::timeout(STOP_GRACE, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(client_id = %self.id(), error = %err, "WebSocket task failed");
                }
                Err(_elapsed) => task.abort(),
            }
        }
        self.inner
            .shared
            .set_state(WsConnectionState::Disconnected);
        debug!(client_id = %self.id(), "WebSocket stopped");
    }
}

impl Shared {
    fn state(&self) -> WsConnectionState {
        WsConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: WsConnectionState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    fn log_level(&self) -> LogLevel {
        *self
            .log_level
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, message: &WsMessage) {
        let number = self.received.fetch_add(1, Ordering::Relaxed) + 1;
        if self.log_level().allows(LogLevel::Info) {
            info!(
                client_id = %self.id,
                msg_num = number,
                message = %message.summary().to_json(),
                "WebSocket message #{} received",
                number
            );
        }

        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for handler in handlers {
            if let Err(err) = handler.on_message(message) {
                if self.log_level().allows(LogLevel::Error) {
                    error!(
                        client_id = %self.id,
                        msg_num = number,
                        error = %err,
                        "WebSocket message handler failed"
                    );
                }
                let callback = self
                    .on_handler_error
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                if let Some(callback) = callback {
                    callback(message, &err);
                }
            }
        }
    }
}

async fn connect(config: &WsApiConfig) -> Result<WsStream> {
    let (stream, _response) =
        tokio::time::timeout(config.connect_timeout, connect_async(config.url.as_str()))
            .await
            .map_err(|_elapsed| {
                Error::timeout(format!(
                    "WebSocket connect to {} timed out after {}ms",
                    config.url,
                    config.connect_timeout.as_millis()
                ))
            })??;
    Ok(stream)
}

enum SessionEnd {
    Stopped,
    Dropped(String),
}

async fn run(
    shared: Arc<Shared>,
    mut stream: WsStream,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    cancel: CancellationToken,
) {
    loop {
        match pump(&shared, stream, &mut outbound, &cancel).await {
            SessionEnd::Stopped => break,
            SessionEnd::Dropped(reason) => {
                if !shared.config.auto_reconnect {
                    warn!(client_id = %shared.id, reason = %reason, "WebSocket closed");
                    break;
                }
                shared.set_state(WsConnectionState::Reconnecting);
                warn!(
                    client_id = %shared.id,
                    reason = %reason,
                    delay_ms = shared.config.error_reconnect_timeout.as_millis(),
                    "WebSocket dropped, reconnecting"
                );
                match reconnect_after_delay(&shared, &cancel).await {
                    Some(next) => stream = next,
                    None => break,
                }
            }
        }
    }
    shared.set_state(WsConnectionState::Disconnected);
}

async fn pump(
    shared: &Shared,
    stream: WsStream,
    outbound: &mut mpsc::UnboundedReceiver<Message>,
    cancel: &CancellationToken,
) -> SessionEnd {
    let (mut sink, mut source) = stream.split();
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                let close = CloseFrame {
                    code: CloseCode::Normal,
                    reason: "normal closure".into(),
                };
                if let Err(err) = sink.send(Message::Close(Some(close))).await {
                    debug!(client_id = %shared.id, error = %err, "Close frame not sent");
                }
                return SessionEnd::Stopped;
            }
            Some(frame) = outbound.recv() => {
                if let Err(err) = sink.send(frame).await {
                    return SessionEnd::Dropped(err.to_string());
                }
            }
            incoming = source.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    shared.dispatch(&WsMessage::Text(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    shared.dispatch(&WsMessage::Binary(bytes.to_vec()));
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame.map_or_else(
                        || "closed by peer".to_string(),
                        |f| format!("closed by peer: {} {}", u16::from(f.code), f.reason.as_str()),
                    );
                    return SessionEnd::Dropped(reason);
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return SessionEnd::Dropped(err.to_string()),
                None => return SessionEnd::Dropped("stream ended".to_string()),
            }
        }
    }
}

async fn reconnect_after_delay(shared: &Shared, cancel: &CancellationToken) -> Option<WsStream> {
    loop {
        tokio::select! {
            () = cancel.cancelled() => return None,
            () = tokio::time::sleep(shared.config.error_reconnect_timeout) => {}
        }

        shared.set_state(WsConnectionState::Connecting);
        let attempt = tokio::select! {
            () = cancel.cancelled() => return None,
            result = connect(&shared.config) => result,
        };
        match attempt {
            Ok(stream) => {
                shared.set_state(WsConnectionState::Connected);
                info!(client_id = %shared.id, "WebSocket reconnected");
                return Some(stream);
            }
            Err(err) => {
                shared.set_state(WsConnectionState::Reconnecting);
                warn!(client_id = %shared.id, error = %err, "WebSocket reconnect attempt failed");
            }
        }
    }
}
