use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use crate::errors::ClientError;
use crate::types::JobType;

/// One validated submission attempt. A request that fails validation is never
/// constructed, so the submission client only ever sees well-formed input.
#[derive(Clone, Debug)]
pub struct JobRequest {
    /// Unique identifier correlating the submission with its progress stream.
    pub id: Uuid,
    /// URL of the video to fetch.
    pub source_url: String,
    /// chrono DateTime when the request was created.
    pub date_added: DateTime<Utc>,
    job_type: JobType,
    output_extension: String,
}

impl JobRequest {
    /// Validate the input and mint a fresh job id. `output_extension` of
    /// `None` selects the default extension for the job type.
    pub fn new(
        source_url: impl Into<String>,
        job_type: JobType,
        output_extension: Option<&str>,
    ) -> Result<Self, ClientError> {
        let source_url = source_url.into();
        validate_source_url(&source_url)?;

        let output_extension = match output_extension {
            None => job_type.default_extension().to_string(),
            Some(ext) => checked_extension(job_type, ext)?,
        };

        Ok(Self {
            id: Uuid::new_v4(),
            source_url,
            date_added: Utc::now(),
            job_type,
            output_extension,
        })
    }

    pub fn job_type(&self) -> JobType {
        self.job_type
    }

    pub fn output_extension(&self) -> &str {
        &self.output_extension
    }

    /// Switch the job type. The extension is reset to the first extension
    /// allowed for the new type so the pair can never disagree.
    pub fn set_job_type(&mut self, job_type: JobType) {
        self.job_type = job_type;
        self.output_extension = job_type.default_extension().to_string();
    }

    pub fn set_output_extension(&mut self, extension: &str) -> Result<(), ClientError> {
        self.output_extension = checked_extension(self.job_type, extension)?;
        Ok(())
    }
}

fn checked_extension(job_type: JobType, extension: &str) -> Result<String, ClientError> {
    if extension.is_empty() {
        return Err(ClientError::EmptyExtension);
    }
    if !job_type.allowed_extensions().contains(&extension) {
        return Err(ClientError::UnsupportedExtension {
            job_type: job_type.label().to_string(),
            extension: extension.to_string(),
        });
    }
    Ok(extension.to_string())
}

/// Accepts the URL shapes the backend recognizes: `youtube.com/watch?v=<id>`,
/// `youtube.com/embed/<id>`, `youtube.com/shorts/<id>` and `youtu.be/<id>`,
/// with an optional scheme and optional `www.` prefix. `<id>` is exactly 11
/// characters of `[A-Za-z0-9_-]`.
pub fn validate_source_url(raw: &str) -> Result<(), ClientError> {
    let invalid = || ClientError::InvalidSourceUrl(raw.to_string());

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    // The form accepts scheme-less input.
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&with_scheme).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }

    let host = parsed.host_str().ok_or_else(invalid)?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    let video_id = match host {
        "youtu.be" => parsed.path().strip_prefix('/').map(str::to_string),
        "youtube.com" => {
            let mut segments = parsed.path_segments().ok_or_else(invalid)?;
            let id = match segments.next() {
                Some("watch") => parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("embed") | Some("shorts") => segments.next().map(str::to_string),
                _ => None,
            };
            // The id must end the path; trailing segments are not a video URL.
            if segments.next().is_some() { None } else { id }
        }
        _ => None,
    };

    match video_id {
        Some(id) if is_video_id(&id) => Ok(()),
        _ => Err(invalid()),
    }
}

fn is_video_id(id: &str) -> bool {
    id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
