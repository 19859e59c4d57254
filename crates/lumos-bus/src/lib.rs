//! Lumos Bus - Publish/subscribe transport for lumos values
//!
//! A publisher broadcasts every value to all connected subscribers; each
//! subscriber keeps the topics it asked for.
//!
//! # Architecture
//!
//! ```text
//! Application                          Viewer / Monitor
//! ┌─────────────┐                     ┌─────────────┐
//! │             │   Message{Event}    │             │
//! │  Publisher  │ ──────────────────► │ Subscriber  │
//! │             │   [len][json]       │  (topics)   │
//! │             │ ──────────────────► │             │
//! └─────────────┘         │           └─────────────┘
//!                         │           ┌─────────────┐
//!                         └─────────► │ Subscriber  │
//!                                     └─────────────┘
//! ```

pub mod error;
pub mod messages;
pub mod publisher;
pub mod serialization;
pub mod subscriber;

// Re-export commonly used types
pub use error::{BusError, Result};
pub use messages::{Event, Message, PROTOCOL_VERSION};
pub use publisher::{Publisher, PublisherConfig};
pub use serialization::{Codec, CodecError, FramedCodec};
pub use subscriber::{Subscriber, SubscriberConfig};
