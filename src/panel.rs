// MIT License - Copyright (c) 2026 Peter Wright
// Alarm panel facade for home-automation hosts

use bitflags::bitflags;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::client::AlarmClient;
use crate::devices::AlarmState;
use crate::error::{AlarmError, Result};
use crate::protocol::Command;

pub const DEFAULT_NAME: &str = "Alarm.com";

bitflags! {
    /// Actions the panel supports, in the host's terms.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SupportedFeatures: u32 {
        const ARM_HOME = 0x0000_0001;
        const ARM_AWAY = 0x0000_0002;
    }
}

/// Alarm states as home-automation hosts name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostAlarmState {
    Disarmed,
    ArmedHome,
    ArmedAway,
}

impl HostAlarmState {
    pub fn from_alarm_state(state: AlarmState) -> Option<Self> {
        match state {
            AlarmState::Disarmed => Some(Self::Disarmed),
            AlarmState::ArmedStay => Some(Self::ArmedHome),
            AlarmState::ArmedAway => Some(Self::ArmedAway),
            AlarmState::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disarmed => "disarmed",
            Self::ArmedHome => "armed_home",
            Self::ArmedAway => "armed_away",
        }
    }
}

/// Input format a host should offer for the user code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeFormat {
    Number,
    Text,
}

/// An alarm panel entity backed by an [`AlarmClient`].
///
/// Validates the optional user code locally before anything reaches the
/// portal; a wrong code never causes a network request.
pub struct AlarmPanel {
    name: String,
    code: Option<String>,
    client: AlarmClient,
}

impl AlarmPanel {
    pub fn new(name: Option<String>, code: Option<String>, client: AlarmClient) -> Self {
        debug!("Setting up Alarm.com...");
        Self {
            name: name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            code: code.filter(|c| !c.is_empty()),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &AlarmClient {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut AlarmClient {
        &mut self.client
    }

    /// `None` when no code is configured.
    pub fn code_format(&self) -> Option<CodeFormat> {
        let code = self.code.as_deref()?;
        if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
            Some(CodeFormat::Number)
        } else {
            Some(CodeFormat::Text)
        }
    }

    pub fn state(&self) -> Option<HostAlarmState> {
        HostAlarmState::from_alarm_state(self.client.state())
    }

    pub fn supported_features(&self) -> SupportedFeatures {
        SupportedFeatures::ARM_HOME | SupportedFeatures::ARM_AWAY
    }

    /// Extra state attributes exposed to the host.
    pub fn attributes(&self) -> Value {
        json!({ "sensor_status": self.client.sensor_status() })
    }

    pub async fn async_login(&mut self) -> bool {
        self.client.login().await
    }

    /// Refresh from the portal. Failures are logged; the host keeps reading
    /// whatever state the client holds afterwards.
    pub async fn async_update(&mut self) -> Option<HostAlarmState> {
        if let Err(e) = self.client.update().await {
            warn!("Alarm.com update failed: {}", e);
        }
        self.state()
    }

    pub async fn alarm_disarm(&mut self, code: Option<&str>) -> Result<AlarmState> {
        self.send(Command::Disarm, code).await
    }

    pub async fn alarm_arm_home(&mut self, code: Option<&str>) -> Result<AlarmState> {
        self.send(Command::ArmStay, code).await
    }

    pub async fn alarm_arm_away(&mut self, code: Option<&str>) -> Result<AlarmState> {
        self.send(Command::ArmAway, code).await
    }

    async fn send(&mut self, command: Command, code: Option<&str>) -> Result<AlarmState> {
        if !self.validate_code(code) {
            return Err(AlarmError::WrongCode);
        }
        self.client.dispatch(command).await
    }

    /// Accept anything when no code is configured, otherwise an exact match.
    pub fn validate_code(&self, code: Option<&str>) -> bool {
        let check = match self.code.as_deref() {
            None => true,
            Some(expected) => code == Some(expected),
        };
        if !check {
            warn!("Wrong code entered");
        }
        check
    }
}
