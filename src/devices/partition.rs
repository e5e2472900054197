// MIT License - Copyright (c) 2026 Peter Wright
// Partition arming state

use std::fmt;

/// Arming state of the alarm partition as reported by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlarmState {
    /// Not yet read, or the portal reported something we don't recognize
    #[default]
    Unknown,
    Disarmed,
    ArmedStay,
    ArmedAway,
}

impl AlarmState {
    /// Parse the arming label shown on the portal's status page.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Unrecognized labels map to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "disarmed" => Self::Disarmed,
            "armed stay" => Self::ArmedStay,
            "armed away" => Self::ArmedAway,
            _ => Self::Unknown,
        }
    }

    /// Map the numeric `state` attribute of a JSON API partition.
    pub fn from_api_code(code: u64) -> Self {
        match code {
            1 => Self::Disarmed,
            2 => Self::ArmedStay,
            3 => Self::ArmedAway,
            _ => Self::Unknown,
        }
    }

    /// The portal's display label; empty for `Unknown`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "",
            Self::Disarmed => "Disarmed",
            Self::ArmedStay => "Armed Stay",
            Self::ArmedAway => "Armed Away",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single partition a portal account controls.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub state: AlarmState,
}

impl Partition {
    /// Update the state. Returns the previous state when it changed.
    pub fn update_state(&mut self, state: AlarmState) -> Option<AlarmState> {
        if self.state == state {
            return None;
        }
        let old = self.state;
        self.state = state;
        Some(old)
    }
}
