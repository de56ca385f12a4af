//! # Command System
//!
//! Routing of parsed protocol events and the chat commands users can issue.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Router plus ordered chat handlers (action, calc, timer)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod context;
pub mod handler;
pub mod handlers;
pub mod registry;
pub mod router;

pub use context::{ChatMessage, CommandContext};
pub use handler::ChatCommandHandler;
pub use registry::CommandRegistry;
pub use router::CommandRouter;
