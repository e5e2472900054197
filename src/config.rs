// MIT License - Copyright (c) 2026 Peter Wright
// Client configuration

use std::time::Duration;

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
use crate::error::{AlarmError, Result};

/// Which portal surface the client talks to.
///
/// Both variants share the same credential login; they differ in how status
/// is read and how commands are submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortalVariant {
    /// Replay the server-rendered ASP.NET forms of the status page.
    WebForms,
    /// Call the JSON API behind the portal's web app.
    #[default]
    JsonApi,
}

impl PortalVariant {
    /// Parse a variant name as it appears in configuration files.
    pub fn from_name(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "webforms" | "web_forms" | "forms" => Ok(Self::WebForms),
            "jsonapi" | "json_api" | "api" | "json" => Ok(Self::JsonApi),
            other => Err(AlarmError::InvalidConfig {
                details: format!("unknown portal variant: {other}"),
            }),
        }
    }
}

/// Flags sent with arm and disarm requests on the JSON API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmOptions {
    /// Bypass open sensors when arming
    pub force_bypass: bool,
    /// Arm without the entry delay
    pub no_entry_delay: bool,
    /// Suppress the panel's arming beeps
    pub silent_arming: bool,
}

impl Default for ArmOptions {
    fn default() -> Self {
        Self {
            force_bypass: false,
            no_entry_delay: false,
            silent_arming: true,
        }
    }
}

/// Configuration for a portal client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Portal account login
    pub username: String,
    /// Portal account password
    pub password: String,
    /// Portal origin, without trailing slash
    pub base_url: String,
    /// Portal surface to use
    pub variant: PortalVariant,
    /// Bound for every network operation, in milliseconds
    pub timeout_ms: u64,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Options for arm/disarm requests
    pub arm_options: ArmOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            variant: PortalVariant::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            arm_options: ArmOptions::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Join a path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn variant(mut self, variant: PortalVariant) -> Self {
        self.config.variant = variant;
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn arm_options(mut self, options: ArmOptions) -> Self {
        self.config.arm_options = options;
        self
    }

    pub fn force_bypass(mut self, force: bool) -> Self {
        self.config.arm_options.force_bypass = force;
        self
    }

    pub fn no_entry_delay(mut self, no_delay: bool) -> Self {
        self.config.arm_options.no_entry_delay = no_delay;
        self
    }

    pub fn silent_arming(mut self, silent: bool) -> Self {
        self.config.arm_options.silent_arming = silent;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
