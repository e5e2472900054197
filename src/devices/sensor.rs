// MIT License - Copyright (c) 2026 Peter Wright
// Sensors reported by the JSON API

/// A sensor (door contact, motion detector, ...) on the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sensor {
    pub description: String,
    pub state_text: String,
}

impl Sensor {
    pub fn new(description: impl Into<String>, state_text: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            state_text: state_text.into(),
        }
    }
}

/// Human-readable summary: `"Front Door is Closed, Hallway Motion is Idle"`.
pub fn sensor_summary(sensors: &[Sensor]) -> String {
    sensors
        .iter()
        .map(|s| format!("{} is {}", s.description, s.state_text))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let sensors = vec![
            Sensor::new("Front Door", "Closed"),
            Sensor::new("Hallway Motion", "Idle"),
        ];
        assert_eq!(sensor_summary(&sensors), "Front Door is Closed, Hallway Motion is Idle");
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(sensor_summary(&[]), "");
    }
}
