//! # IRC Protocol Layer
//!
//! Framing, parsing and the single server connection.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod connection;
pub mod framer;
pub mod message;
pub mod numeric;
pub mod sink;

pub use connection::{connect, ConnectionError, Session};
pub use framer::{FramerError, LineCodec, LineFramer};
pub use message::{keepalive_reply, parse, Event, OutboundLine, ParsedLine};
pub use sink::NotificationSink;
