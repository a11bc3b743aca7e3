//! Append-only event log shared by every stage of the engine.
//!
//! Events are what the user sees: one line per file outcome, git step or
//! task-level failure. Each append is also mirrored to `tracing`, so a plain
//! terminal run shows the same stream without a subscriber.

use std::sync::{Arc, Mutex};
use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{error, info};

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    /// Maps a collaborator's free-form `type` field; anything unknown is info
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub severity: Severity,
}

/// Cheaply cloneable handle; clones append to the same sequence.
#[derive(Clone)]
pub struct EventLog {
    events: Arc<Mutex<Vec<LogEvent>>>,
    sender: broadcast::Sender<LogEvent>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            sender,
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Severity::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Severity::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Severity::Error, message.into());
    }

    pub fn push(&self, severity: Severity, message: String) {
        match severity {
            Severity::Error => error!("{message}"),
            _ => info!("{message}"),
        }

        let event = LogEvent {
            timestamp: Local::now(),
            message,
            severity,
        };

        // Broadcast under the lock so subscribers observe log order.
        let mut events = self.events.lock().unwrap_or_else(|p| p.into_inner());
        events.push(event.clone());
        let _ = self.sender.send(event);
    }

    /// Receives every event appended after this call
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.sender.subscribe()
    }

    pub fn snapshot(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events with the given severity, in log order
    pub fn with_severity(&self, severity: Severity) -> Vec<LogEvent> {
        self.snapshot()
            .into_iter()
            .filter(|e| e.severity == severity)
            .collect()
    }
}
