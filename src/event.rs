// MIT License - Copyright (c) 2026 Peter Wright
// Client events

use crate::devices::AlarmState;
use crate::protocol::Command;

/// All events that can be emitted by the client.
///
/// Users subscribe via `client.subscribe()` to receive a
/// `tokio::sync::broadcast::Receiver<ClientEvent>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Credentials accepted, session established
    LoggedIn,
    /// Login attempt failed
    LoginFailed { reason: String },
    /// The portal stopped recognizing our session; cached state was dropped
    SessionExpired,
    /// An arm/disarm command is about to be sent
    CommandSent { command: Command },
    /// The arming state changed
    StateChanged { old: AlarmState, new: AlarmState },
    /// A poll produced a new sensor summary
    SensorsUpdated { summary: String },
}

/// Type alias for the broadcast sender.
pub type EventSender = tokio::sync::broadcast::Sender<ClientEvent>;

/// Type alias for the broadcast receiver.
pub type EventReceiver = tokio::sync::broadcast::Receiver<ClientEvent>;

/// Create a new event channel with the given capacity.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    tokio::sync::broadcast::channel(capacity)
}
