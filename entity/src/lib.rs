//! Payload model for the messaging real-time event stream.
//!
//! Records in this crate mirror the JSON the realtime endpoint pushes. Two
//! pieces of reusable infrastructure live alongside them:
//!
//! - [`urn::Urn`], the structured entity identifier every payload references.
//! - [`tagged`], the namespace-keyed "one of many" decoder. Payload shapes whose
//!   JSON keys are fully-qualified type names (for example
//!   `com.linkedin.voyager.messaging.event.MessageEvent`) are declared with the
//!   [`tagged_union!`] macro and decoded through a single generic routine.
//!
//! Timestamps travel as integer milliseconds since the Unix epoch and are
//! exposed as `chrono::DateTime<Utc>`; see [`serde_helpers`].

pub mod serde_helpers;
pub mod tagged;
pub mod urn;

pub mod conversation;
pub mod message;
pub mod profile;
pub mod realtime;

pub use realtime::RealTimeEventStreamEvent;
pub use tagged::TaggedUnion;
pub use urn::{Urn, UrnError};

/// Timestamp representation used by every payload record.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
