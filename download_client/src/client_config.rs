use uuid::Uuid;

/// Endpoint configuration shared by the submission client and the progress
/// stream. Passed in explicitly so tests can point both at a mock server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, e.g. "http://127.0.0.1:4444".
    pub backend_origin: String,
    /// Path segment of the job-submission endpoint.
    pub api_path: String,
    /// Path segment of the progress-stream endpoint.
    pub sse_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_origin: "http://127.0.0.1:4444".into(),
            api_path: "api/download".into(),
            sse_path: "api/progress".into(),
        }
    }
}

impl ClientConfig {
    /// Build a config from `TUBEGET_BACKEND_ENDPOINT`, `TUBEGET_API_ENDPOINT`
    /// and `TUBEGET_SSE_ENDPOINT`, falling back to the defaults for any
    /// variable that is unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_origin: std::env::var("TUBEGET_BACKEND_ENDPOINT")
                .unwrap_or(defaults.backend_origin),
            api_path: std::env::var("TUBEGET_API_ENDPOINT").unwrap_or(defaults.api_path),
            sse_path: std::env::var("TUBEGET_SSE_ENDPOINT").unwrap_or(defaults.sse_path),
        }
    }

    pub fn api_url(&self) -> String {
        format!("{}/{}", self.origin(), self.api_path.trim_matches('/'))
    }

    pub fn sse_url(&self, job_id: Uuid) -> String {
        format!(
            "{}/{}/{}",
            self.origin(),
            self.sse_path.trim_matches('/'),
            job_id
        )
    }

    pub fn health_url(&self) -> String {
        format!("{}/api/health", self.origin())
    }

    fn origin(&self) -> &str {
        self.backend_origin.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_assembly_normalizes_slashes() {
        let config = ClientConfig {
            backend_origin: "http://localhost:4444/".into(),
            api_path: "/api/download/".into(),
            sse_path: "api/progress".into(),
        };
        assert_eq!(config.api_url(), "http://localhost:4444/api/download");

        let id = Uuid::new_v4();
        assert_eq!(
            config.sse_url(id),
            format!("http://localhost:4444/api/progress/{}", id)
        );
        assert_eq!(config.health_url(), "http://localhost:4444/api/health");
    }
}
