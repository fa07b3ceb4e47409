//! Listener registry for the realtime event stream.
//!
//! This crate provides the dispatch side of the event stream: what listeners
//! are, how they are keyed, and how an event reaches them.
//!
//! # Architecture
//!
//! - **ListenerKey**: Either one of three reserved keys (`ALL_EVENTS`,
//!   `TIMEOUT`, `STREAM_ERROR`) or an open-ended payload kind such as `event`
//!   or `reactionAdded`.
//! - **StreamEvent**: What a listener receives. The variant matches the kind
//!   of key it was fired under.
//! - **Listener**: Trait for implementing event handlers.
//! - **ListenerRegistry**: Ordered, append-only table of listeners per key.
//!
//! Listeners for one key run sequentially in registration order. A listener
//! that errors or panics is logged and the remaining listeners still run.

use async_trait::async_trait;
use entity::RealTimeEventStreamEvent;
use futures_util::FutureExt;
use log::*;
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};

pub mod error;

pub use error::{Error, StreamErrorKind, TimeoutPhase};

/// Error type listeners may return.
pub type BoxError = Box<dyn StdError + Send + Sync>;

pub const ALL_EVENTS: &str = "ALL_EVENTS";
pub const TIMEOUT: &str = "TIMEOUT";
pub const STREAM_ERROR: &str = "STREAM_ERROR";

/// Key under which listeners are registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListenerKey {
    /// Fired with every raw frame before any other processing.
    AllEvents,
    /// Fired when a connect or read deadline elapses.
    Timeout,
    /// Fired on any other stream failure.
    StreamError,
    /// Fired when the named key is present in a frame's payload.
    Payload(String),
}

impl ListenerKey {
    pub fn payload(kind: impl Into<String>) -> Self {
        ListenerKey::Payload(kind.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            ListenerKey::AllEvents => ALL_EVENTS,
            ListenerKey::Timeout => TIMEOUT,
            ListenerKey::StreamError => STREAM_ERROR,
            ListenerKey::Payload(kind) => kind,
        }
    }
}

impl From<&str> for ListenerKey {
    fn from(key: &str) -> Self {
        match key {
            ALL_EVENTS => ListenerKey::AllEvents,
            TIMEOUT => ListenerKey::Timeout,
            STREAM_ERROR => ListenerKey::StreamError,
            kind => ListenerKey::Payload(kind.to_string()),
        }
    }
}

impl From<String> for ListenerKey {
    fn from(key: String) -> Self {
        ListenerKey::from(key.as_str())
    }
}

impl fmt::Display for ListenerKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event delivered to a listener.
#[derive(Debug)]
pub enum StreamEvent {
    /// Raw frame JSON, delivered under [`ListenerKey::AllEvents`].
    Frame(Value),
    /// Decoded payload, delivered under [`ListenerKey::Payload`] for `kind`.
    Payload {
        kind: String,
        event: RealTimeEventStreamEvent,
    },
    /// Delivered under [`ListenerKey::Timeout`].
    Timeout(Error),
    /// Delivered under [`ListenerKey::StreamError`].
    StreamError(Error),
}

/// Trait for handling stream events.
/// Implementations should return quickly; long work belongs in a spawned task
/// since dispatch is sequential and delays the next frame.
#[async_trait]
pub trait Listener: Send + Sync {
    async fn handle(&self, event: &StreamEvent) -> Result<(), BoxError>;
}

type Entry = (ListenerKey, Vec<Arc<dyn Listener>>);

/// Ordered table of listeners per key.
///
/// Registration is append-only and may happen while the stream is running.
/// Dispatch clones the listener list first so no lock is held across `.await`.
#[derive(Default)]
pub struct ListenerRegistry {
    entries: RwLock<Vec<Entry>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `listener` to the list for `key`.
    pub fn register(&self, key: impl Into<ListenerKey>, listener: Arc<dyn Listener>) {
        let key = key.into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, listeners)) => listeners.push(listener),
            None => {
                debug!("Registering first listener for {key}");
                entries.push((key, vec![listener]));
            }
        }
    }

    /// Snapshot of the listeners registered for `key`, in registration order.
    pub fn listeners(&self, key: &ListenerKey) -> Vec<Arc<dyn Listener>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, listeners)| listeners.clone())
            .unwrap_or_default()
    }

    pub fn has_listeners(&self, key: &ListenerKey) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .any(|(existing, listeners)| existing == key && !listeners.is_empty())
    }

    /// Registered payload kinds, in the order they were first registered.
    pub fn payload_kinds(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .filter_map(|(key, _)| match key {
                ListenerKey::Payload(kind) => Some(kind.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of distinct keys with listeners.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every listener registered for `key`, sequentially.
    /// If a listener panics or errors, we log it but continue with the
    /// remaining listeners. Nothing is propagated to the caller.
    pub async fn fire(&self, key: &ListenerKey, event: &StreamEvent) {
        for (index, listener) in self.listeners(key).into_iter().enumerate() {
            match AssertUnwindSafe(listener.handle(event)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("Listener #{index} for {key} failed to handle {event:?}: {e}");
                }
                Err(_) => {
                    error!("Listener #{index} for {key} panicked while handling {event:?}");
                }
            }
        }
    }
}
