//! Outbound send primitive shared by the router and the scheduler
//!
//! Lines are queued on an unbounded channel and written by a single writer
//! task, so senders never wait on the network and lines never interleave.

use log::warn;
use tokio::sync::mpsc;

use super::message::OutboundLine;

/// Cloneable handle for queueing outbound lines
#[derive(Clone, Debug)]
pub struct NotificationSink {
    tx: mpsc::UnboundedSender<String>,
}

impl NotificationSink {
    /// Create a sink and the receiver its writer task drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (NotificationSink { tx }, rx)
    }

    /// Queue a raw line. Returns false once the writer has gone away.
    pub fn send_raw(&self, line: impl Into<String>) -> bool {
        match self.tx.send(line.into()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping outbound line, writer closed: {}", e.0);
                false
            }
        }
    }

    pub fn send(&self, line: &OutboundLine) -> bool {
        self.send_raw(line.to_wire())
    }

    /// Queue every line in order, stopping at the first failure
    pub fn send_all<I>(&self, lines: I) -> bool
    where
        I: IntoIterator<Item = OutboundLine>,
    {
        lines.into_iter().all(|line| self.send(&line))
    }
}
