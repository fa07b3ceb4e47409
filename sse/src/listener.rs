//! The stream listener: connect, read, dispatch, reconnect.
//!
//! One listener owns one connection at a time and moves through
//! `Disconnected → Connecting → Streaming → (Closed | Failed) → Disconnected`
//! until it is cancelled. Timeouts fire `TIMEOUT`, every other failure fires
//! `STREAM_ERROR`, and neither stops the loop. Failed attempts are spaced out
//! with exponential backoff; a clean end of stream reconnects immediately.

use crate::backoff::{ReconnectDecision, ReconnectPolicy};
use crate::frame;
use crate::transport::{LineStream, Transport};
use entity::RealTimeEventStreamEvent;
use events::error::{self, Error, TimeoutPhase};
use events::{ListenerKey, ListenerRegistry, StreamEvent};
use futures_util::StreamExt;
use log::*;
use serde_json::Value;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Streaming,
    /// The server ended the stream.
    Closed,
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Streaming => write!(f, "streaming"),
            ConnectionState::Closed => write!(f, "closed"),
            ConnectionState::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListenerConfig {
    /// Deadline for the endpoint to answer.
    pub connect_timeout: Duration,
    /// Deadline for each line read. The server normally keeps a stream open
    /// for a few minutes, so this catches connections that went quiet without
    /// closing.
    pub idle_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(120),
            idle_timeout: Duration::from_secs(120),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

/// How a single connection attempt ended.
enum Outcome {
    Cancelled,
    Closed,
    Failed(Error),
}

pub struct StreamListener {
    transport: Arc<dyn Transport>,
    registry: Arc<ListenerRegistry>,
    config: ListenerConfig,
    state: watch::Sender<ConnectionState>,
}

impl StreamListener {
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: Arc<ListenerRegistry>,
        config: ListenerConfig,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            transport,
            registry,
            config,
            state,
        }
    }

    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    /// Receiver that observes every state transition.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Run the connect/read/reconnect loop until `cancel` fires, or until the
    /// configured number of consecutive failures is exceeded.
    pub async fn run(&self, cancel: CancellationToken) {
        info!("Starting event stream listener");
        let mut failures: u32 = 0;

        loop {
            match self.connect_and_stream(&cancel, &mut failures).await {
                Outcome::Cancelled => break,
                Outcome::Closed => {
                    info!("Event stream closed");
                    self.set_state(ConnectionState::Disconnected);
                }
                Outcome::Failed(err) => {
                    self.set_state(ConnectionState::Failed);
                    let (key, event) = if err.is_timeout() {
                        warn!("Event stream timed out: {err}");
                        (ListenerKey::Timeout, StreamEvent::Timeout(err))
                    } else {
                        error!("Error listening to event stream: {err}");
                        (ListenerKey::StreamError, StreamEvent::StreamError(err))
                    };
                    if self.dispatch(&cancel, &key, &event).await.is_break() {
                        break;
                    }

                    failures = failures.saturating_add(1);
                    let delay = match self.config.reconnect.decide(failures) {
                        ReconnectDecision::Retry { after } => after,
                        ReconnectDecision::GiveUp => {
                            error!("Giving up on event stream after {failures} consecutive failures");
                            break;
                        }
                    };
                    self.set_state(ConnectionState::Disconnected);
                    debug!("Reconnecting to event stream in {delay:?}");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = sleep(delay) => {}
                    }
                }
            }
        }

        self.set_state(ConnectionState::Disconnected);
        info!("Event stream listener stopped");
    }

    /// Start [`run`](Self::run) on a new task.
    pub fn spawn(self) -> ListenerHandle {
        let cancel = CancellationToken::new();
        let state = self.state();
        let token = cancel.clone();
        let task = tokio::spawn(async move { self.run(token).await });

        ListenerHandle {
            cancel,
            state,
            task,
        }
    }

    async fn connect_and_stream(
        &self,
        cancel: &CancellationToken,
        failures: &mut u32,
    ) -> Outcome {
        self.set_state(ConnectionState::Connecting);

        let opened = tokio::select! {
            _ = cancel.cancelled() => return Outcome::Cancelled,
            opened = timeout(self.config.connect_timeout, self.transport.open()) => opened,
        };
        let mut lines: LineStream = match opened {
            Err(_) => return Outcome::Failed(error::timeout_error(TimeoutPhase::Connect)),
            Ok(Err(e)) => return Outcome::Failed(e),
            Ok(Ok(lines)) => lines,
        };

        self.set_state(ConnectionState::Streaming);
        *failures = 0;
        info!("Event stream connected");

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return Outcome::Cancelled,
                next = timeout(self.config.idle_timeout, lines.next()) => next,
            };
            let line = match next {
                Err(_) => return Outcome::Failed(error::timeout_error(TimeoutPhase::Idle)),
                Ok(None) => {
                    self.set_state(ConnectionState::Closed);
                    return Outcome::Closed;
                }
                Ok(Some(Err(e))) => return Outcome::Failed(e),
                Ok(Some(Ok(line))) => line,
            };

            if self.handle_line(cancel, &line).await.is_break() {
                return Outcome::Cancelled;
            }
        }
    }

    /// Dispatch one line. Frames that fail to decode are reported once on
    /// `STREAM_ERROR` and dropped; the connection stays up.
    async fn handle_line(&self, cancel: &CancellationToken, line: &str) -> ControlFlow<()> {
        let frame = match frame::parse_frame(line) {
            None => return ControlFlow::Continue(()),
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                warn!("Dropping malformed event stream frame: {e}");
                return self.report_decode_error(cancel, e).await;
            }
        };

        let payload = frame::extract_payload(&frame);
        self.dispatch(cancel, &ListenerKey::AllEvents, &StreamEvent::Frame(frame))
            .await?;

        let kinds: Vec<String> = self
            .registry
            .payload_kinds()
            .into_iter()
            .filter(|kind| frame::has_key(&payload, kind))
            .collect();
        if kinds.is_empty() {
            return ControlFlow::Continue(());
        }

        let event = match decode_payload(&payload) {
            Ok(event) => event,
            Err(e) => {
                warn!("Failed to decode {} payload: {e}", kinds.join("/"));
                return self.report_decode_error(cancel, e).await;
            }
        };
        for kind in kinds {
            let key = ListenerKey::Payload(kind.clone());
            let event = StreamEvent::Payload {
                kind,
                event: event.clone(),
            };
            self.dispatch(cancel, &key, &event).await?;
        }

        ControlFlow::Continue(())
    }

    async fn report_decode_error(
        &self,
        cancel: &CancellationToken,
        err: serde_json::Error,
    ) -> ControlFlow<()> {
        let event = StreamEvent::StreamError(Error::from(err));
        self.dispatch(cancel, &ListenerKey::StreamError, &event)
            .await
    }

    async fn dispatch(
        &self,
        cancel: &CancellationToken,
        key: &ListenerKey,
        event: &StreamEvent,
    ) -> ControlFlow<()> {
        if cancel.is_cancelled() {
            return ControlFlow::Break(());
        }
        self.registry.fire(key, event).await;
        ControlFlow::Continue(())
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            trace!("Event stream state {previous} -> {state}");
        }
    }
}

fn decode_payload(payload: &Value) -> Result<RealTimeEventStreamEvent, serde_json::Error> {
    serde_json::from_value(payload.clone())
}

/// Handle to a listener running on its own task.
pub struct ListenerHandle {
    cancel: CancellationToken,
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Token that stops the listener when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the listener and wait for its task to end.
    pub async fn stop(self) {
        self.cancel.cancel();
        self.join().await;
    }

    /// Wait for the listener to end on its own.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!("Event stream listener task failed: {e}");
        }
    }
}
