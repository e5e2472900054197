// MIT License - Copyright (c) 2026 Peter Wright
// Portal backends

pub mod api;
pub mod discovery;
pub mod forms;

use crate::config::{ClientConfig, PortalVariant};
use crate::devices::{AlarmState, StatusSnapshot};
use crate::error::Result;
use crate::protocol::Command;
use crate::session::Session;

pub use api::JsonApiPortal;
pub use forms::WebFormsPortal;

/// What a portal surface must offer the client.
///
/// Implementations report session loss as `AlarmError::SessionExpired` or
/// `AlarmError::MalformedResponse`; they never retry on their own.
#[allow(async_fn_in_trait)]
pub trait Portal {
    /// Log in with the configured credentials.
    async fn login(&mut self) -> Result<()>;

    /// Whether a login succeeded and nothing has invalidated it since.
    fn is_logged_in(&self) -> bool;

    /// Forget the current session.
    fn invalidate(&mut self);

    /// Read the arming state (and sensors, where the surface reports them).
    async fn fetch_status(&mut self) -> Result<StatusSnapshot>;

    /// Read only the live arming state.
    async fn current_state(&mut self) -> Result<AlarmState> {
        Ok(self.fetch_status().await?.state)
    }

    /// Send a command and return the state the portal reports afterwards.
    async fn submit(&mut self, command: Command) -> Result<AlarmState>;
}

/// The portal surface selected by configuration.
pub enum Backend {
    WebForms(WebFormsPortal),
    JsonApi(JsonApiPortal),
}

impl Backend {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(match config.variant {
            PortalVariant::WebForms => Self::WebForms(WebFormsPortal::new(config)?),
            PortalVariant::JsonApi => Self::JsonApi(JsonApiPortal::new(config)?),
        })
    }

    pub fn session(&self) -> &Session {
        match self {
            Self::WebForms(p) => p.session(),
            Self::JsonApi(p) => p.session(),
        }
    }

    pub fn variant(&self) -> PortalVariant {
        match self {
            Self::WebForms(_) => PortalVariant::WebForms,
            Self::JsonApi(_) => PortalVariant::JsonApi,
        }
    }
}

impl Portal for Backend {
    async fn login(&mut self) -> Result<()> {
        match self {
            Self::WebForms(p) => p.login().await,
            Self::JsonApi(p) => p.login().await,
        }
    }

    fn is_logged_in(&self) -> bool {
        match self {
            Self::WebForms(p) => p.is_logged_in(),
            Self::JsonApi(p) => p.is_logged_in(),
        }
    }

    fn invalidate(&mut self) {
        match self {
            Self::WebForms(p) => p.invalidate(),
            Self::JsonApi(p) => p.invalidate(),
        }
    }

    async fn fetch_status(&mut self) -> Result<StatusSnapshot> {
        match self {
            Self::WebForms(p) => p.fetch_status().await,
            Self::JsonApi(p) => p.fetch_status().await,
        }
    }

    async fn current_state(&mut self) -> Result<AlarmState> {
        match self {
            Self::WebForms(p) => p.current_state().await,
            Self::JsonApi(p) => p.current_state().await,
        }
    }

    async fn submit(&mut self, command: Command) -> Result<AlarmState> {
        match self {
            Self::WebForms(p) => p.submit(command).await,
            Self::JsonApi(p) => p.submit(command).await,
        }
    }
}
