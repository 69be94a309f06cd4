// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Typed role events.
//!
//! Every role reports through a sink as a stream of structured events: a
//! status change (named state plus a display hint), a free-text log line, or
//! a download progress percentage. A coordinator embeds the stream however
//! it likes; the core never formats for a particular frontend. Progress
//! carries no protocol meaning.

use crate::slot::Slot;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Display hints carried by status events. Consumers treat them as opaque.
pub mod hints {
    pub const IDLE: &str = "gray";
    pub const BLUE: &str = "#2196F3";
    pub const AMBER: &str = "#ffc107";
    pub const PURPLE: &str = "#9c27b0";
    pub const VIOLET: &str = "#673ab7";
    pub const GREEN: &str = "#4CAF50";
    pub const RED: &str = "#f44336";
    pub const ORANGE: &str = "#ff9800";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RoleEvent {
    /// Named state transition plus display hint.
    Status { state: String, hint: &'static str },
    /// Free-text log line.
    Log(String),
    /// Download progress, percent of declared content length.
    Progress(f32),
}

impl RoleEvent {
    pub fn status(state: impl Into<String>, hint: &'static str) -> Self {
        RoleEvent::Status { state: state.into(), hint }
    }

    pub fn log(line: impl Into<String>) -> Self {
        RoleEvent::Log(line.into())
    }
}

/// Where a role's events go. Implementations must be cheap; roles emit from
/// inside their protocol loops.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RoleEvent);

    fn status(&self, state: impl Into<String>, hint: &'static str)
    where
        Self: Sized,
    {
        self.emit(RoleEvent::status(state, hint));
    }

    fn log(&self, line: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(RoleEvent::log(line));
    }
}

/// Discards everything. For tests and headless runs.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: RoleEvent) {}
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: RoleEvent) {
        (**self).emit(event);
    }
}

/// Agent phases, in protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
    Idle,
    Checking,
    Downloading,
    Verifying,
    AwaitingAck,
    Success,
    Crashed,
}

impl AgentPhase {
    pub fn name(&self) -> &'static str {
        match self {
            AgentPhase::Idle => "Idle",
            AgentPhase::Checking => "Checking",
            AgentPhase::Downloading => "Downloading",
            AgentPhase::Verifying => "Verifying",
            AgentPhase::AwaitingAck => "Awaiting ACK",
            AgentPhase::Success => "Success",
            AgentPhase::Crashed => "Crashed",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            AgentPhase::Idle => hints::IDLE,
            AgentPhase::Checking => hints::BLUE,
            AgentPhase::Downloading => hints::AMBER,
            AgentPhase::Verifying => hints::PURPLE,
            AgentPhase::AwaitingAck => hints::VIOLET,
            AgentPhase::Success => hints::GREEN,
            AgentPhase::Crashed => hints::RED,
        }
    }

    pub fn event(&self) -> RoleEvent {
        RoleEvent::status(self.name(), self.hint())
    }
}

/// Receiver phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverPhase {
    Listening,
    Updating,
    Flashing(Slot),
    Booting(Slot),
    Compromised,
    RollingBack,
    Success,
    SlotActive(Slot),
    Crashed,
}

impl ReceiverPhase {
    pub fn name(&self) -> String {
        match self {
            ReceiverPhase::Listening => "Listening".to_string(),
            ReceiverPhase::Updating => "Updating...".to_string(),
            ReceiverPhase::Flashing(slot) => format!("Flashing Slot {slot}"),
            ReceiverPhase::Booting(slot) => format!("Booting Slot {slot}"),
            ReceiverPhase::Compromised => "COMPROMISED".to_string(),
            ReceiverPhase::RollingBack => "Rolling Back".to_string(),
            ReceiverPhase::Success => "Success".to_string(),
            ReceiverPhase::SlotActive(slot) => format!("Slot {slot} Active"),
            ReceiverPhase::Crashed => "Crashed".to_string(),
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            ReceiverPhase::Listening => hints::GREEN,
            ReceiverPhase::Updating => hints::AMBER,
            ReceiverPhase::Flashing(_) => hints::ORANGE,
            ReceiverPhase::Booting(_) => hints::AMBER,
            ReceiverPhase::Compromised => hints::RED,
            ReceiverPhase::RollingBack => hints::ORANGE,
            ReceiverPhase::Success => hints::GREEN,
            ReceiverPhase::SlotActive(_) => hints::GREEN,
            ReceiverPhase::Crashed => hints::RED,
        }
    }

    pub fn event(&self) -> RoleEvent {
        RoleEvent::status(self.name(), self.hint())
    }
}

/// Source phases. A spoofing source still reports `Running`; its hint is up
/// to the worker that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePhase {
    Running,
    Crashed,
}

impl SourcePhase {
    pub fn name(&self) -> &'static str {
        match self {
            SourcePhase::Running => "Running",
            SourcePhase::Crashed => "Crashed",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            SourcePhase::Running => hints::GREEN,
            SourcePhase::Crashed => hints::RED,
        }
    }

    pub fn event(&self) -> RoleEvent {
        RoleEvent::status(self.name(), self.hint())
    }
}

impl fmt::Display for RoleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleEvent::Status { state, hint } => write!(f, "STATUS:{state}:{hint}"),
            RoleEvent::Log(line) => write!(f, "LOG:{line}"),
            RoleEvent::Progress(pct) => write!(f, "PROGRESS:{pct}"),
        }
    }
}
