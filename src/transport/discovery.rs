// MIT License - Copyright (c) 2026 Peter Wright
// Partition discovery on the JSON API

use serde::Deserialize;
use tracing::{debug, info};

use crate::constants::{API_AVAILABLE_SYSTEMS, API_SYSTEMS};
use crate::error::{AlarmError, Result};
use crate::session::Session;
use crate::transport::api::{api_get, RelationshipList, ResourceRef};

#[derive(Debug, Deserialize)]
struct SystemResource {
    relationships: SystemRelationships,
}

#[derive(Debug, Deserialize)]
struct SystemRelationships {
    partitions: RelationshipList,
}

/// Find the partition the account controls.
///
/// Takes the first system the login can see, then the first partition of
/// that system. Accounts with several systems or partitions are not
/// distinguished.
pub async fn discover_partition(session: &Session) -> Result<String> {
    let systems: Vec<ResourceRef> = api_get(session, API_AVAILABLE_SYSTEMS).await?;
    let system_id = systems
        .into_iter()
        .next()
        .map(|s| s.id)
        .ok_or(AlarmError::NoPartition)?;
    debug!("System id is {}", system_id);

    let system: SystemResource = api_get(session, &format!("{API_SYSTEMS}{system_id}")).await?;
    let partition_id = system
        .relationships
        .partitions
        .data
        .into_iter()
        .next()
        .map(|p| p.id)
        .ok_or(AlarmError::NoPartition)?;

    info!("Using partition {}", partition_id);
    Ok(partition_id)
}
