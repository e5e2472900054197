// MIT License - Copyright (c) 2026 Peter Wright
// Arm/disarm commands and their portal encodings

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::ArmOptions;
use crate::constants::{BTN_ARM_AWAY, BTN_ARM_STAY, BTN_DISARM};
use crate::devices::AlarmState;
use crate::error::AlarmError;

/// Commands that change the arming state.
///
/// Each command carries both encodings the portal accepts: the button of the
/// status page form and the action segment of the JSON API partition URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Disarm,
    ArmStay,
    ArmAway,
}

/// How a command is expressed on each portal surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Name used in logs and legacy configuration (`Arm+Stay`)
    pub label: &'static str,
    /// Form field of the status page button
    pub form_button: &'static str,
    /// Value posted with the button field
    pub form_value: &'static str,
    /// Path segment appended to `devices/partitions/{id}`
    pub api_action: &'static str,
}

const DISARM: CommandSpec = CommandSpec {
    label: "Disarm",
    form_button: BTN_DISARM,
    form_value: "Disarm",
    api_action: "/disarm",
};

const ARM_STAY: CommandSpec = CommandSpec {
    label: "Arm+Stay",
    form_button: BTN_ARM_STAY,
    form_value: "Arm Stay",
    api_action: "/armStay",
};

const ARM_AWAY: CommandSpec = CommandSpec {
    label: "Arm+Away",
    form_button: BTN_ARM_AWAY,
    form_value: "Arm Away",
    api_action: "/armAway",
};

impl Command {
    pub fn spec(&self) -> &'static CommandSpec {
        match self {
            Self::Disarm => &DISARM,
            Self::ArmStay => &ARM_STAY,
            Self::ArmAway => &ARM_AWAY,
        }
    }

    /// State the partition is in once the command has been carried out.
    pub fn target_state(&self) -> AlarmState {
        match self {
            Self::Disarm => AlarmState::Disarmed,
            Self::ArmStay => AlarmState::ArmedStay,
            Self::ArmAway => AlarmState::ArmedAway,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().label)
    }
}

impl FromStr for Command {
    type Err = AlarmError;

    /// Accepts the portal labels (`Disarm`, `Arm+Stay`, `Arm+Away`) as well as
    /// `arm-stay`/`arm_away` spellings, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', '_', ' '], "+");
        match normalized.as_str() {
            "DISARM" => Ok(Self::Disarm),
            "ARM+STAY" | "ARM+HOME" => Ok(Self::ArmStay),
            "ARM+AWAY" => Ok(Self::ArmAway),
            _ => Err(AlarmError::InvalidCommand { name: s.to_string() }),
        }
    }
}

/// JSON body of a JSON API arm/disarm request.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArmRequest {
    pub force_bypass: bool,
    pub no_entry_delay: bool,
    pub silent_arming: bool,
    pub state_poll_only: bool,
}

impl From<ArmOptions> for ArmRequest {
    fn from(options: ArmOptions) -> Self {
        Self {
            force_bypass: options.force_bypass,
            no_entry_delay: options.no_entry_delay,
            silent_arming: options.silent_arming,
            state_poll_only: false,
        }
    }
}
