//! Per-command handler implementations
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.0.0: Chat handlers dispatched in priority order
//! - 1.1.0: Add CalcHandler
//! - 1.0.0: Initial extraction of ActionMirrorHandler and TimerHandler

pub mod action;
pub mod calc;
pub mod timer;

use std::sync::Arc;

use super::handler::ChatCommandHandler;

/// Create all chat command handlers, highest priority first
pub fn create_all_handlers() -> Vec<Arc<dyn ChatCommandHandler>> {
    vec![
        Arc::new(action::ActionMirrorHandler),
        Arc::new(calc::CalcHandler),
        Arc::new(timer::TimerHandler),
    ]
}
