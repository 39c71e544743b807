use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::client_config::ClientConfig;
use crate::errors::ClientError;

#[derive(Deserialize)]
struct HealthBody {
    status: String,
}

/// Probe the backend health endpoint. Succeeds only on a `{"status":"ok"}`
/// answer.
pub async fn check_health(client: &Client, config: &ClientConfig) -> Result<(), ClientError> {
    let url = config.health_url();
    debug!(url, "checking backend health");

    let body: HealthBody = client.get(&url).send().await?.json().await?;
    if body.status == "ok" {
        Ok(())
    } else {
        Err(ClientError::BackendUnhealthy(body.status))
    }
}
