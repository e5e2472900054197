// MIT License - Copyright (c) 2026 Peter Wright
// JSON API backend

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{ArmOptions, ClientConfig};
use crate::constants::{
    AJAX_KEY_HEADER, API_ACCEPT, API_CONTENT_TYPE, API_PARTITIONS, API_PREFIX, API_SENSORS,
};
use crate::devices::{AlarmState, Sensor, StatusSnapshot};
use crate::error::{AlarmError, Result};
use crate::html::{is_login_page, SessionCheck};
use crate::protocol::{ArmRequest, Command};
use crate::session::Session;
use crate::transport::discovery::discover_partition;
use crate::transport::Portal;

// JSON:API documents, reduced to the members we read.

#[derive(Debug, Deserialize)]
pub(crate) struct Document<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelationshipList {
    pub data: Vec<ResourceRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PartitionResource {
    pub attributes: PartitionAttributes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PartitionAttributes {
    pub state: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SensorResource {
    pub attributes: SensorAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SensorAttributes {
    pub description: String,
    pub state_text: String,
}

/// Issue one JSON API request on the session.
///
/// 401/403 and HTML login pages mean the session is gone; a body that isn't
/// JSON at all is malformed. Other HTTP errors are returned as such.
pub(crate) async fn api_call(
    session: &Session,
    method: Method,
    path: &str,
    body: Option<String>,
) -> Result<SessionCheck<Value>> {
    let url = session.config().url(&format!("{API_PREFIX}{path}"));
    let ajax_key = session.ajax_key();
    if ajax_key.is_none() {
        debug!("No {} cookie in jar", crate::constants::AJAX_KEY_COOKIE);
    }

    let mut request = session
        .http()
        .request(method.clone(), &url)
        .header(ACCEPT, API_ACCEPT)
        .header(CONTENT_TYPE, API_CONTENT_TYPE)
        .header(AJAX_KEY_HEADER, ajax_key.unwrap_or_default());
    if let Some(body) = body {
        request = request.body(body);
    }

    debug!("{} {}", method, url);
    let resp = request.send().await.map_err(|e| session.map_http(e))?;
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        debug!("API answered {} for {}", status, path);
        return Ok(SessionCheck::Expired);
    }
    let resp = resp.error_for_status().map_err(|e| session.map_http(e))?;
    let text = resp.text().await.map_err(|e| session.map_http(e))?;

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Ok(SessionCheck::Valid(value)),
        Err(_) if is_login_page(&text) => Ok(SessionCheck::Expired),
        Err(e) => Ok(SessionCheck::Malformed(format!("{path}: not JSON ({e})"))),
    }
}

/// Decode a document, treating a shape mismatch as a malformed response.
pub(crate) fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    serde_json::from_value::<Document<T>>(value)
        .map(|doc| doc.data)
        .map_err(|e| AlarmError::MalformedResponse {
            details: format!("{path}: {e}"),
        })
}

pub(crate) async fn api_get<T: DeserializeOwned>(session: &Session, path: &str) -> Result<T> {
    let value = api_call(session, Method::GET, path, None).await?.into_result()?;
    decode(path, value)
}

/// Talks to the `/web/api/` endpoints used by the portal's web app.
pub struct JsonApiPortal {
    session: Session,
    partition_id: Option<String>,
    arm_options: ArmOptions,
}

impl JsonApiPortal {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let arm_options = config.arm_options;
        Ok(Self {
            session: Session::new(config)?,
            partition_id: None,
            arm_options,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Partition id discovered at login.
    pub fn partition_id(&self) -> Option<&str> {
        self.partition_id.as_deref()
    }

    fn partition_path(&self) -> Result<String> {
        let id = self.partition_id.as_deref().ok_or(AlarmError::NoPartition)?;
        Ok(format!("{API_PARTITIONS}{id}"))
    }

    async fn fetch_partition_state(&self) -> Result<AlarmState> {
        let path = self.partition_path()?;
        let partition: PartitionResource = api_get(&self.session, &path).await?;
        Ok(AlarmState::from_api_code(partition.attributes.state))
    }

    async fn fetch_sensors(&self) -> Result<Vec<Sensor>> {
        let resources: Vec<SensorResource> = api_get(&self.session, API_SENSORS).await?;
        Ok(resources
            .into_iter()
            .map(|r| Sensor::new(r.attributes.description, r.attributes.state_text))
            .collect())
    }
}

impl Portal for JsonApiPortal {
    async fn login(&mut self) -> Result<()> {
        self.session.login().await?;
        if self.partition_id.is_none() {
            match discover_partition(&self.session).await {
                Ok(id) => self.partition_id = Some(id),
                Err(e) => {
                    warn!("Partition discovery failed: {}", e);
                    self.session.invalidate();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    fn invalidate(&mut self) {
        self.session.invalidate();
    }

    async fn fetch_status(&mut self) -> Result<StatusSnapshot> {
        let state = self.fetch_partition_state().await?;
        debug!("Current state is {}", state);

        let sensors = self.fetch_sensors().await?;
        Ok(StatusSnapshot::new(state, sensors))
    }

    async fn current_state(&mut self) -> Result<AlarmState> {
        self.fetch_partition_state().await
    }

    async fn submit(&mut self, command: Command) -> Result<AlarmState> {
        let path = format!("{}{}", self.partition_path()?, command.spec().api_action);
        let body = serde_json::to_string(&ArmRequest::from(self.arm_options))?;

        info!("Sending {} to Alarm.com", command);
        let value = api_call(&self.session, Method::POST, &path, Some(body))
            .await?
            .into_result()?;
        let partition: PartitionResource = decode(&path, value)?;
        let state = AlarmState::from_api_code(partition.attributes.state);
        debug!("Response from Alarm.com: {}", state);
        Ok(state)
    }
}
