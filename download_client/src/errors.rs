use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The source URL is not a recognized video URL.
    #[error("invalid video URL: {0}")]
    InvalidSourceUrl(String),

    /// The requested extension is not allowed for the selected job type.
    #[error("extension \"{extension}\" is not available for {job_type}")]
    UnsupportedExtension { job_type: String, extension: String },

    /// No output extension was selected.
    #[error("select a file extension")]
    EmptyExtension,

    /// An error occurred while making an HTTP request.
    #[error("HTTP request failed: {0}")]
    HttpRequestError(#[from] reqwest::Error),

    /// The backend rejected the job and returned its own message.
    #[error("{0}")]
    ServerError(String),

    /// The backend rejected the job without a decodable error body.
    #[error("Download failed")]
    DownloadFailed,

    /// Failed to create or write the output file.
    #[error("file system error: {0}")]
    FileSystemError(#[from] io::Error),

    /// The health endpoint answered with something other than `ok`.
    #[error("backend is unhealthy: {0}")]
    BackendUnhealthy(String),
}

/// Errors on the progress channel. These close the stream but never fail the
/// submission itself.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("progress stream request failed: {0}")]
    HttpRequestError(#[from] reqwest::Error),

    #[error("malformed progress payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}
