// MIT License - Copyright (c) 2026 Peter Wright
// Alarm.com portal client
//
//! # alarmdotcom
//!
//! Reads the arming state of an Alarm.com security system and arms or
//! disarms it through the customer web portal, using the account's normal
//! login credentials.
//!
//! Two portal surfaces are supported, selected by [`PortalVariant`]:
//! the server-rendered web forms, and the JSON API used by the portal's web
//! app (which also reports sensors). Sessions are established lazily and
//! re-established once per operation when the portal drops them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use alarmdotcom::{AlarmClient, AlarmPanel, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::builder()
//!         .username("user@example.com")
//!         .password("secret")
//!         .build();
//!
//!     let client = AlarmClient::new(config)?;
//!     let mut events = client.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let mut panel = AlarmPanel::new(None, Some("1234".to_string()), client);
//!     panel.async_update().await;
//!     panel.alarm_arm_home(Some("1234")).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod devices;
pub mod error;
pub mod event;
pub mod html;
pub mod panel;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use client::AlarmClient;
pub use config::{ArmOptions, ClientConfig, ClientConfigBuilder, PortalVariant};
pub use devices::{AlarmState, Partition, Sensor, StatusSnapshot};
pub use error::{AlarmError, Result};
pub use event::{ClientEvent, EventReceiver};
pub use panel::{AlarmPanel, CodeFormat, HostAlarmState, SupportedFeatures};
pub use protocol::Command;
pub use transport::{Backend, Portal};
