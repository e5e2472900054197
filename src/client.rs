// MIT License - Copyright (c) 2026 Peter Wright
// Session maintenance, status polling and command dispatch

use std::fmt;

use chrono::Utc;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::devices::{AlarmState, Partition, StatusSnapshot};
use crate::error::{AlarmError, Result};
use crate::event::{event_channel, ClientEvent, EventReceiver, EventSender};
use crate::protocol::Command;
use crate::transport::{Backend, Portal};

/// The main public API for talking to an Alarm.com account.
///
/// Keeps one portal session alive, logging in lazily and again whenever the
/// portal stops recognizing the session. Every operation is bounded by the
/// configured timeout. Methods take `&mut self`: callers issue one request at
/// a time.
///
/// # Example
///
/// ```no_run
/// use alarmdotcom::{AlarmClient, ClientConfig, Command};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ClientConfig::builder()
///         .username("user@example.com")
///         .password("secret")
///         .build();
///
///     let mut client = AlarmClient::new(config)?;
///     let status = client.poll_status().await?;
///     println!("{} ({:?})", status.state, status.sensor_status());
///
///     client.dispatch(Command::ArmStay).await?;
///     Ok(())
/// }
/// ```
pub struct AlarmClient {
    config: ClientConfig,
    portal: Backend,
    partition: Partition,
    snapshot: StatusSnapshot,
    event_tx: EventSender,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Poll,
    Submit(Command),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poll => f.write_str("status poll"),
            Self::Submit(command) => write!(f, "{command}"),
        }
    }
}

enum Outcome {
    Status(StatusSnapshot),
    State(AlarmState),
}

impl Outcome {
    fn into_snapshot(self) -> StatusSnapshot {
        match self {
            Self::Status(snapshot) => snapshot,
            Self::State(state) => StatusSnapshot::new(state, Vec::new()),
        }
    }

    fn into_state(self) -> AlarmState {
        match self {
            Self::Status(snapshot) => snapshot.state,
            Self::State(state) => state,
        }
    }
}

impl AlarmClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let portal = Backend::new(config.clone())?;
        let (event_tx, _event_rx) = event_channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config,
            portal,
            partition: Partition::default(),
            snapshot: StatusSnapshot::default(),
            event_tx,
        })
    }

    /// Subscribe to client events.
    pub fn subscribe(&self) -> EventReceiver {
        self.event_tx.subscribe()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_logged_in(&self) -> bool {
        self.portal.is_logged_in()
    }

    /// Last known arming state.
    pub fn state(&self) -> AlarmState {
        self.partition.state
    }

    /// Sensor summary from the last poll.
    pub fn sensor_status(&self) -> Option<String> {
        self.snapshot.sensor_status()
    }

    pub fn snapshot(&self) -> &StatusSnapshot {
        &self.snapshot
    }

    /// The portal backend in use.
    pub fn portal(&self) -> &Backend {
        &self.portal
    }

    /// Log in. Failures are logged and reported as `false`.
    pub async fn login(&mut self) -> bool {
        match self.try_login().await {
            Ok(()) => true,
            Err(e) => {
                error!("Unable to login to Alarm.com: {}", e);
                false
            }
        }
    }

    /// Log in unless a session is already live.
    pub async fn ensure_logged_in(&mut self) -> Result<()> {
        if self.portal.is_logged_in() {
            return Ok(());
        }
        self.try_login().await
    }

    async fn try_login(&mut self) -> Result<()> {
        let timeout_ms = self.config.timeout_ms;
        let result = timeout(self.config.timeout(), self.portal.login())
            .await
            .map_err(|_| AlarmError::Timeout { timeout_ms })
            .and_then(|r| r);

        match result {
            Ok(()) => {
                debug!("Session key: {:?}", self.portal.session().session_key());
                let _ = self.event_tx.send(ClientEvent::LoggedIn);
                Ok(())
            }
            Err(e) => {
                self.portal.invalidate();
                let _ = self.event_tx.send(ClientEvent::LoginFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Fetch the latest state.
    pub async fn update(&mut self) -> Result<AlarmState> {
        Ok(self.poll_status().await?.state)
    }

    /// Fetch the latest state and sensor list, refreshing the cache.
    pub async fn poll_status(&mut self) -> Result<StatusSnapshot> {
        debug!("Calling update on Alarm.com");
        let snapshot = self.run(Operation::Poll).await?.into_snapshot();
        self.apply_state(snapshot.state);
        if let Some(summary) = snapshot.sensor_status() {
            let _ = self.event_tx.send(ClientEvent::SensorsUpdated { summary });
        }
        self.snapshot = snapshot.clone();
        Ok(snapshot)
    }

    /// Send an arm/disarm command and return the resulting state.
    ///
    /// The live state is read from the portal first; nothing is sent when it
    /// already matches the command's target.
    pub async fn dispatch(&mut self, command: Command) -> Result<AlarmState> {
        let state = self.run(Operation::Submit(command)).await?.into_state();
        self.apply_state(state);
        self.snapshot.state = state;
        self.snapshot.updated_at = Some(Utc::now());
        Ok(state)
    }

    pub async fn disarm(&mut self) -> Result<AlarmState> {
        self.dispatch(Command::Disarm).await
    }

    pub async fn arm_stay(&mut self) -> Result<AlarmState> {
        self.dispatch(Command::ArmStay).await
    }

    pub async fn arm_away(&mut self) -> Result<AlarmState> {
        self.dispatch(Command::ArmAway).await
    }

    /// Run an operation, logging in again and retrying it once if the portal
    /// lost our session. The retry always repeats the same operation, and all
    /// attempts share one deadline.
    async fn run(&mut self, op: Operation) -> Result<Outcome> {
        let timeout_ms = self.config.timeout_ms;
        let deadline = Instant::now() + self.config.timeout();
        let mut relogged = false;

        loop {
            let result = timeout_at(deadline, self.attempt(op))
                .await
                .map_err(|_| AlarmError::Timeout { timeout_ms })
                .and_then(|r| r);

            match result {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_session_loss() && !relogged => {
                    warn!("{} failed ({}), logging in again", op, e);
                    self.handle_session_loss();
                    relogged = true;
                }
                Err(e) => {
                    if e.is_session_loss() {
                        self.handle_session_loss();
                    }
                    error!("{} failed: {}", op, e);
                    return Err(e);
                }
            }
        }
    }

    async fn attempt(&mut self, op: Operation) -> Result<Outcome> {
        self.ensure_logged_in().await?;
        match op {
            Operation::Poll => self.portal.fetch_status().await.map(Outcome::Status),
            Operation::Submit(command) => {
                let target = command.target_state();
                let current = self.portal.current_state().await?;
                if current == target {
                    info!("System already {}, not sending {}", target, command);
                    return Ok(Outcome::State(current));
                }
                let _ = self.event_tx.send(ClientEvent::CommandSent { command });
                self.portal.submit(command).await.map(Outcome::State)
            }
        }
    }

    fn handle_session_loss(&mut self) {
        self.portal.invalidate();
        self.snapshot.clear();
        self.apply_state(AlarmState::Unknown);
        let _ = self.event_tx.send(ClientEvent::SessionExpired);
    }

    fn apply_state(&mut self, state: AlarmState) {
        if let Some(old) = self.partition.update_state(state) {
            debug!("Arming state {:?} -> {:?}", old, state);
            let _ = self.event_tx.send(ClientEvent::StateChanged { old, new: state });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalVariant;

    #[test]
    fn test_new_client_is_logged_out() {
        let client = AlarmClient::new(ClientConfig::default()).unwrap();
        assert!(!client.is_logged_in());
        assert_eq!(client.state(), AlarmState::Unknown);
        assert_eq!(client.sensor_status(), None);
    }

    #[test]
    fn test_backend_follows_variant() {
        let config = ClientConfig::builder().variant(PortalVariant::WebForms).build();
        let client = AlarmClient::new(config).unwrap();
        assert_eq!(client.portal.variant(), PortalVariant::WebForms);
    }

    #[test]
    fn test_session_loss_resets_state() {
        let mut client = AlarmClient::new(ClientConfig::default()).unwrap();
        let mut rx = client.subscribe();
        client.apply_state(AlarmState::ArmedAway);
        client.handle_session_loss();

        assert_eq!(client.state(), AlarmState::Unknown);
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::StateChanged { old: AlarmState::Unknown, new: AlarmState::ArmedAway }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::StateChanged { old: AlarmState::ArmedAway, new: AlarmState::Unknown }
        );
        assert_eq!(rx.try_recv().unwrap(), ClientEvent::SessionExpired);
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Poll.to_string(), "status poll");
        assert_eq!(Operation::Submit(Command::Disarm).to_string(), "Disarm");
    }
}
