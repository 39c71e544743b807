use std::path::Path;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::client_config::ClientConfig;
use crate::errors::ClientError;
use crate::job::JobRequest;
use crate::types::SavedFile;
use crate::utils::{is_safe_file_name, parse_content_disposition};

/// JSON body of the job-submission request.
#[derive(Serialize)]
struct JobBody<'a> {
    url: &'a str,
    #[serde(rename = "type")]
    job_type: &'a str,
    format: &'a str,
    id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Submit the job and save the returned payload into `file_dir`.
///
/// The call resolves only when the backend has produced the whole file;
/// interim status arrives on the separate progress stream. Returns the saved
/// filename, taken from the `Content-Disposition` header when present and
/// falling back to `download.<extension>` otherwise.
pub async fn submit(
    client: &Client,
    config: &ClientConfig,
    request: &JobRequest,
    file_dir: &Path,
) -> Result<SavedFile, ClientError> {
    let body = JobBody {
        url: &request.source_url,
        job_type: request.job_type().key(),
        format: request.output_extension(),
        id: request.id.to_string(),
    };

    debug!(job_id = %request.id, url = %request.source_url, "submitting job");
    let response = client
        .post(config.api_url())
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => {
                debug!(%status, error = %body.error, "backend rejected job");
                ClientError::ServerError(body.error)
            }
            Err(_) => {
                debug!(%status, "backend rejected job without a decodable error body");
                ClientError::DownloadFailed
            }
        });
    }

    let file_name = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_disposition)
        // The suggested name lands on the local filesystem; a name carrying
        // path components must not escape `file_dir`.
        .filter(|name| is_safe_file_name(name))
        .unwrap_or_else(|| format!("download.{}", request.output_extension()));

    let payload = response.bytes().await?;
    let path = file_dir.join(&file_name);
    let mut file = tokio::fs::File::create(&path).await?;
    file.write_all(&payload).await?;
    file.flush().await?;

    info!(job_id = %request.id, file = %path.display(), bytes = payload.len(), "file saved");
    Ok(SavedFile {
        file_name,
        path,
        bytes: payload.len() as u64,
    })
}
