use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, warn};

use crate::client_config::ClientConfig;
use crate::errors::ClientError;
use crate::job::JobRequest;
use crate::progress::ProgressUpdate;
use crate::progress_stream::ProgressStream;
use crate::submit::submit;
use crate::types::SavedFile;

/// Observer for interim progress. Completion and failure are conveyed by the
/// return value of [`Download::run`], not through the sink.
pub trait ProgressSink: Send + Sync {
    fn update(&self, update: ProgressUpdate);
}

/// One download attempt: a job submission paired with the progress stream
/// watching it.
pub struct Download {
    pub request: JobRequest,
    pub file_dir: PathBuf,
    config: ClientConfig,
    client: Client,
}

impl Download {
    pub fn new(request: JobRequest, config: ClientConfig, file_dir: PathBuf) -> Self {
        Self {
            request,
            file_dir,
            config,
            client: Client::new(),
        }
    }

    /// Run the attempt to completion.
    ///
    /// The progress stream is opened before the submission so no early event
    /// is missed; failing to open it is logged and tolerated, the submission
    /// still runs. Whichever way the submission settles, the stream is torn
    /// down before returning, so the result always wins over a still-open
    /// channel.
    pub async fn run(&self, sink: Arc<dyn ProgressSink>) -> Result<SavedFile, ClientError> {
        debug!(
            job_id = %self.request.id,
            job_type = self.request.job_type().key(),
            extension = self.request.output_extension(),
            date_added = %self.request.date_added,
            "starting download"
        );

        let watcher = match ProgressStream::open(&self.client, &self.config, self.request.id).await
        {
            Ok(stream) => Some(tokio::spawn(relay_updates(stream, Arc::clone(&sink)))),
            Err(err) => {
                warn!(job_id = %self.request.id, error = %err, "progress stream unavailable");
                None
            }
        };

        let result = submit(&self.client, &self.config, &self.request, &self.file_dir).await;

        if let Some(watcher) = watcher {
            // Dropping the relay task drops the stream, which closes the
            // connection even when no `done` event ever arrived.
            watcher.abort();
            let _ = watcher.await;
        }
        result
    }
}

/// Forward stream updates to the sink until the stream ends. Stream errors
/// end the relay but are only logged; they never fail the submission.
async fn relay_updates(mut stream: ProgressStream, sink: Arc<dyn ProgressSink>) {
    loop {
        match stream.next_update().await {
            Ok(Some(update)) => sink.update(update),
            Ok(None) => break,
            Err(err) => {
                warn!(job_id = %stream.job_id(), error = %err, "progress stream error");
                break;
            }
        }
    }
    stream.close();
}
