// MIT License - Copyright (c) 2026 Peter Wright
// Device models

pub mod partition;
pub mod sensor;
pub mod system;

pub use partition::{AlarmState, Partition};
pub use sensor::Sensor;
pub use system::StatusSnapshot;
