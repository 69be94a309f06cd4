// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Event sinks.
//!
//! Roles report through `voltura_core::event::EventSink`; the node side
//! provides the two sinks a deployment actually wants: structured tracing
//! lines for operators, and a broadcast channel a coordinator can subscribe
//! to for rendering.

use std::sync::Arc;
use tokio::sync::broadcast;
use voltura_core::event::{EventSink, RoleEvent};

/// Every event becomes a structured tracing line carrying the role name.
pub struct TracingSink {
    role: &'static str,
}

impl TracingSink {
    pub fn new(role: &'static str) -> Self {
        TracingSink { role }
    }
}

impl EventSink for TracingSink {
    fn emit(&self, event: RoleEvent) {
        match event {
            RoleEvent::Status { state, hint } => {
                tracing::info!(role = self.role, state = %state, hint = %hint, "status");
            }
            RoleEvent::Log(line) => {
                tracing::info!(role = self.role, "{}", line.trim());
            }
            RoleEvent::Progress(pct) => {
                tracing::debug!(role = self.role, percent = pct, "progress");
            }
        }
    }
}

/// Fan-out to coordinator subscribers. Lagging subscribers drop events;
/// the stream is advisory, never protocol state.
pub struct BroadcastSink {
    role: &'static str,
    tx: broadcast::Sender<(&'static str, RoleEvent)>,
}

impl BroadcastSink {
    pub fn new(role: &'static str, tx: broadcast::Sender<(&'static str, RoleEvent)>) -> Self {
        BroadcastSink { role, tx }
    }
}

impl EventSink for BroadcastSink {
    fn emit(&self, event: RoleEvent) {
        // A send error just means nobody is listening right now.
        let _ = self.tx.send((self.role, event));
    }
}

/// Emit to several sinks at once (tracing + broadcast is the usual pair).
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        FanoutSink { sinks }
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: RoleEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}

/// The standard per-role wiring: tracing plus broadcast.
pub fn role_sink(
    role: &'static str,
    tx: broadcast::Sender<(&'static str, RoleEvent)>,
) -> Arc<dyn EventSink> {
    Arc::new(FanoutSink::new(vec![
        Arc::new(TracingSink::new(role)),
        Arc::new(BroadcastSink::new(role, tx)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_sink_delivers() {
        let (tx, mut rx) = broadcast::channel(16);
        let sink = BroadcastSink::new("agent", tx);
        sink.emit(RoleEvent::log("hello"));

        let (role, event) = rx.try_recv().unwrap();
        assert_eq!(role, "agent");
        assert_eq!(event, RoleEvent::log("hello"));
    }

    #[test]
    fn test_broadcast_sink_without_subscribers_is_silent() {
        let (tx, _) = broadcast::channel(16);
        let sink = BroadcastSink::new("agent", tx);
        // No subscriber: must not panic or error.
        sink.emit(RoleEvent::Progress(50.0));
    }
}
