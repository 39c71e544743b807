pub mod client_config;
pub mod download;
pub mod errors;
pub mod health;
pub mod job;
pub mod progress;
pub mod progress_stream;
pub mod submit;
pub mod types;
pub mod utils;

pub use client_config::ClientConfig;
pub use download::{Download, ProgressSink};
pub use job::JobRequest;
pub use progress::{ProgressUpdate, StreamState};
pub use progress_stream::ProgressStream;
pub use types::{JobType, SavedFile};
