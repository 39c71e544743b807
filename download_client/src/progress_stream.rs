use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use reqwest::header;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::client_config::ClientConfig;
use crate::errors::StreamError;
use crate::progress::{ProgressDecoder, ProgressUpdate, StreamState};

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// One server-to-client progress subscription, scoped to a single job id.
///
/// The stream is a value owning one connection; there is no registry keyed by
/// job id, so opening a second stream for the same id simply creates a second
/// connection. `close` is idempotent and also runs on drop, which keeps the
/// connection released on every exit path, including task abort.
pub struct ProgressStream {
    job_id: Uuid,
    decoder: ProgressDecoder,
    body: Option<ByteStream>,
}

impl ProgressStream {
    /// Connect to the progress endpoint for `job_id`. A non-success response
    /// status fails the open.
    pub async fn open(
        client: &Client,
        config: &ClientConfig,
        job_id: Uuid,
    ) -> Result<Self, StreamError> {
        let url = config.sse_url(job_id);
        debug!(%job_id, url, "opening progress stream");

        let response = client
            .get(&url)
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await?
            .error_for_status()?;

        Ok(Self {
            job_id,
            decoder: ProgressDecoder::new(),
            body: Some(Box::pin(response.bytes_stream())),
        })
    }

    /// Next notification from the stream.
    ///
    /// `Ok(Some(update))` per update, `Ok(None)` once the stream is over (a
    /// `done` status or the server closing the channel), `Err` on a transport
    /// or decode failure. The connection is released before any terminal
    /// return.
    pub async fn next_update(&mut self) -> Result<Option<ProgressUpdate>, StreamError> {
        loop {
            if let Some(update) = self.decoder.poll_update() {
                trace!(job_id = %self.job_id, ?update, "progress update");
                return Ok(Some(update));
            }
            if self.decoder.is_terminal() {
                self.close();
                return Ok(None);
            }
            let Some(body) = self.body.as_mut() else {
                return Ok(None);
            };

            match body.next().await {
                Some(Ok(chunk)) => {
                    if let Err(err) = self.decoder.push_chunk(&chunk) {
                        self.close();
                        return Err(err);
                    }
                }
                Some(Err(err)) => {
                    self.decoder.fail();
                    self.close();
                    return Err(StreamError::HttpRequestError(err));
                }
                // Server closed the channel without a `done`; treat it as a
                // quiet end of the sequence.
                None => {
                    self.close();
                    return Ok(None);
                }
            }
        }
    }

    pub fn state(&self) -> StreamState {
        self.decoder.state()
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Release the underlying connection. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.body.take().is_some() {
            debug!(job_id = %self.job_id, state = ?self.decoder.state(), "progress stream closed");
        }
    }
}

impl Drop for ProgressStream {
    fn drop(&mut self) {
        self.close();
    }
}
