//! # Core Module
//!
//! Configuration and shared formatting helpers.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.7.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Server config file, expiry formatting
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod format;

pub use config::{ChannelConfig, Config, ServerConfig};
