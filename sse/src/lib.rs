//! Client side of the realtime Server-Sent Events stream.
//!
//! This crate keeps one long-lived connection to the realtime endpoint open,
//! turns each `data:` line into a JSON frame, and hands frames and decoded
//! payloads to the listeners in an [`events::ListenerRegistry`].
//!
//! # Message Flow
//!
//! 1. [`StreamListener`] opens a connection through a [`Transport`]
//! 2. Each line is parsed by [`frame::parse_frame`]; non-data lines are skipped
//! 3. `ALL_EVENTS` listeners receive the raw frame
//! 4. The payload inside the `DecoratedEvent` wrapper is extracted
//! 5. If any registered payload kind is present in the payload, the payload is
//!    decoded once into a `RealTimeEventStreamEvent` and each present kind's
//!    listeners fire
//! 6. Timeouts fire `TIMEOUT`, other failures fire `STREAM_ERROR`, and the
//!    listener reconnects with backoff
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = Arc::new(ListenerRegistry::new());
//! registry.register("event", Arc::new(MyMessageHandler));
//!
//! let transport = HttpTransport::new(REALTIME_CONNECT_URL, &credentials, connect_timeout)?;
//! let handle = StreamListener::new(Arc::new(transport), registry, ListenerConfig::default()).spawn();
//! // ...
//! handle.stop().await;
//! ```
//!
//! # Modules
//!
//! - `backoff`: Reconnect policy for failed connection attempts
//! - `frame`: Line parsing and payload extraction
//! - `listener`: The connect/read/reconnect state machine and its task handle
//! - `transport`: Connection seam and its reqwest implementation

pub mod backoff;
pub mod frame;
pub mod listener;
pub mod transport;

pub use backoff::{ReconnectDecision, ReconnectPolicy};
pub use listener::{ConnectionState, ListenerConfig, ListenerHandle, StreamListener};
pub use transport::{Credentials, HttpTransport, LineStream, Transport, REALTIME_CONNECT_URL};
