//! Framework-agnostic event broadcasting to the presentation layer.
//!
//! The core never renders anything. It announces state changes on an
//! [`EventBus`] and whatever front-end is attached (CLI, web page, TUI)
//! re-renders from the event payloads.
//!
//! # Example
//!
//! ```rust
//! use sessiondock_core::events::{EventBus, LauncherEvent};
//!
//! let bus = EventBus::new();
//! let _rx = bus.subscribe();
//!
//! let delivered = bus.emit(LauncherEvent::Navigate {
//!     target: "/abc/https://example.com/".into(),
//! });
//! assert_eq!(delivered, 1);
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::session::{SessionRecord, SessionSettings};

/// Events beyond this capacity make slow subscribers lag.
const DEFAULT_CAPACITY: usize = 256;

/// Something the presentation layer may want to react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LauncherEvent {
    /// The cached session list changed; re-render the table.
    SessionsChanged { sessions: Vec<SessionRecord> },

    /// Settings that should be filled into the session form.
    SettingsLoaded { settings: SessionSettings },

    /// The status slot changed. `None` means cleared.
    StatusChanged { message: Option<String> },

    /// The remote service requires a password.
    PasswordRequired,

    /// Launch finished; the client should navigate to `target`.
    Navigate { target: String },
}

impl LauncherEvent {
    /// Short event name, e.g. for logging.
    pub fn name(&self) -> &'static str {
        match self {
            LauncherEvent::SessionsChanged { .. } => "sessions:changed",
            LauncherEvent::SettingsLoaded { .. } => "settings:loaded",
            LauncherEvent::StatusChanged { .. } => "status:changed",
            LauncherEvent::PasswordRequired => "password:required",
            LauncherEvent::Navigate { .. } => "navigate",
        }
    }
}

/// Broadcasts [`LauncherEvent`]s to any number of subscribers.
pub struct EventBus {
    sender: broadcast::Sender<LauncherEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send `event` to all current subscribers.
    ///
    /// Returns how many subscribers received it. With none attached the event
    /// is dropped and 0 is returned.
    pub fn emit(&self, event: LauncherEvent) -> usize {
        log::debug!("Emitting {}", event.name());
        self.sender.send(event).unwrap_or(0)
    }

    /// Receive all future events. Past events are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<LauncherEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
