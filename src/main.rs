// MIT License - Copyright (c) 2026 Peter Wright
// Command-line front end

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, warn};

use alarmdotcom::{
    AlarmClient, AlarmPanel, AlarmState, ClientConfig, ClientEvent, Command, PortalVariant,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "alarmdotcom")]
#[command(about = "Check and change the arming state of an Alarm.com system")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Print the current arming state and sensors
    Status,
    /// Arm in stay mode
    ArmStay {
        /// User code, required when one is configured
        #[arg(long)]
        code: Option<String>,
    },
    /// Arm in away mode
    ArmAway {
        #[arg(long)]
        code: Option<String>,
    },
    /// Disarm
    Disarm {
        #[arg(long)]
        code: Option<String>,
    },
    /// Poll periodically and log state changes until interrupted
    Watch {
        /// Overrides `[watch] interval_secs`
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Config {
    account: AccountToml,
    #[serde(default)]
    portal: PortalToml,
    #[serde(default)]
    watch: WatchToml,
}

#[derive(Debug, Deserialize)]
struct AccountToml {
    username: String,
    password: String,
    /// Display name of the panel
    #[serde(default)]
    name: Option<String>,
    /// User code; may be written as a number or a string
    #[serde(default, deserialize_with = "deserialize_code")]
    code: Option<String>,
}

/// Accept `code = 1234` as well as `code = "0123"`.
fn deserialize_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Number(u64),
        Text(String),
    }

    Ok(Option::<Code>::deserialize(deserializer)?.map(|c| match c {
        Code::Number(n) => n.to_string(),
        Code::Text(s) => s,
    }))
}

#[derive(Debug, Deserialize)]
struct PortalToml {
    #[serde(default = "default_base_url")]
    base_url: String,
    /// "json_api" or "web_forms"
    #[serde(default = "default_variant")]
    variant: String,
    #[serde(default = "default_timeout")]
    timeout_ms: u64,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    force_bypass: bool,
    #[serde(default)]
    no_entry_delay: bool,
    #[serde(default = "default_silent_arming")]
    silent_arming: bool,
}

impl Default for PortalToml {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            variant: default_variant(),
            timeout_ms: default_timeout(),
            user_agent: None,
            force_bypass: false,
            no_entry_delay: false,
            silent_arming: default_silent_arming(),
        }
    }
}

fn default_base_url() -> String {
    alarmdotcom::constants::DEFAULT_BASE_URL.to_string()
}
fn default_variant() -> String {
    "json_api".to_string()
}
fn default_timeout() -> u64 {
    alarmdotcom::constants::DEFAULT_TIMEOUT_MS
}
fn default_silent_arming() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct WatchToml {
    #[serde(default = "default_interval")]
    interval_secs: u64,
}

impl Default for WatchToml {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

fn default_interval() -> u64 {
    60
}

fn build_client_config(account: &AccountToml, portal: &PortalToml) -> Result<ClientConfig> {
    let variant = PortalVariant::from_name(&portal.variant)?;
    let mut builder = ClientConfig::builder()
        .username(&account.username)
        .password(&account.password)
        .base_url(&portal.base_url)
        .variant(variant)
        .timeout_ms(portal.timeout_ms)
        .force_bypass(portal.force_bypass)
        .no_entry_delay(portal.no_entry_delay)
        .silent_arming(portal.silent_arming);
    if let Some(ref agent) = portal.user_agent {
        builder = builder.user_agent(agent);
    }
    Ok(builder.build())
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

async fn print_status(panel: &mut AlarmPanel) -> Result<()> {
    let status = panel
        .client_mut()
        .poll_status()
        .await
        .context("Failed to read status from Alarm.com")?;

    let host_state = panel.state().map_or("unknown", |s| s.as_str());
    println!("{}: {} ({})", panel.name(), status.state, host_state);
    if let Some(summary) = status.sensor_status() {
        println!("Sensors: {summary}");
    }
    if let Some(at) = status.updated_at {
        println!("Updated: {}", at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"));
    }
    Ok(())
}

async fn send_command(panel: &mut AlarmPanel, command: Command, code: Option<&str>) -> Result<()> {
    let state = match command {
        Command::Disarm => panel.alarm_disarm(code).await,
        Command::ArmStay => panel.alarm_arm_home(code).await,
        Command::ArmAway => panel.alarm_arm_away(code).await,
    }
    .with_context(|| format!("{command} failed"))?;

    println!("{}: {}", panel.name(), state);
    Ok(())
}

fn log_event(event: &ClientEvent) {
    match event {
        ClientEvent::StateChanged { old, new } => {
            if *old == AlarmState::Unknown {
                info!("System is {new}");
            } else {
                info!("System changed from {old} to {new}");
            }
        }
        ClientEvent::SensorsUpdated { summary } => debug!("Sensors: {summary}"),
        ClientEvent::SessionExpired => warn!("Alarm.com session expired"),
        ClientEvent::LoginFailed { reason } => error!("Login failed: {reason}"),
        ClientEvent::LoggedIn => info!("Logged in to Alarm.com"),
        ClientEvent::CommandSent { command } => info!("Sent {command}"),
    }
}

async fn watch(panel: &mut AlarmPanel, interval_secs: u64) -> Result<()> {
    let mut events = panel.client().subscribe();
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));

    info!("Polling Alarm.com every {interval_secs}s. Send SIGINT/SIGTERM to stop.");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match panel.client_mut().poll_status().await {
                    Ok(_) => {}
                    Err(e) if e.is_retryable() => warn!("Status poll failed, will retry: {e}"),
                    Err(e) => error!("Status poll failed: {e}"),
                }
            }
            event = events.recv() => match event {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(n)) => warn!("Event receiver lagged, missed {n} events"),
                Err(RecvError::Closed) => {
                    info!("Event channel closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=alarmdotcom=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt().without_time().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();

    let config_text =
        std::fs::read_to_string(&cli.config).context("Failed to read config file")?;
    let config: Config = toml::from_str(&config_text).context("Failed to parse config file")?;

    let client_config = build_client_config(&config.account, &config.portal)?;
    let client = AlarmClient::new(client_config).context("Failed to create HTTP client")?;
    let mut panel = AlarmPanel::new(config.account.name, config.account.code, client);

    match cli.command {
        Action::Status => print_status(&mut panel).await?,
        Action::ArmStay { code } => send_command(&mut panel, Command::ArmStay, code.as_deref()).await?,
        Action::ArmAway { code } => send_command(&mut panel, Command::ArmAway, code.as_deref()).await?,
        Action::Disarm { code } => send_command(&mut panel, Command::Disarm, code.as_deref()).await?,
        Action::Watch { interval_secs } => {
            watch(&mut panel, interval_secs.unwrap_or(config.watch.interval_secs)).await?
        }
    }

    Ok(())
}
