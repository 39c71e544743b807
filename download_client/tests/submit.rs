use download_client::errors::ClientError;
use download_client::submit::submit;
use download_client::{ClientConfig, JobRequest, JobType};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        backend_origin: server.uri(),
        ..ClientConfig::default()
    }
}

fn request(job_type: JobType) -> JobRequest {
    JobRequest::new("https://youtu.be/dQw4w9WgXcQ", job_type, None).expect("valid request")
}

#[tokio::test]
async fn submit_saves_file_under_suggested_name() {
    let server = MockServer::start().await;
    let request = request(JobType::Both);

    Mock::given(method("POST"))
        .and(path("/api/download"))
        .and(body_partial_json(json!({
            "url": "https://youtu.be/dQw4w9WgXcQ",
            "type": "both",
            "format": "mp4",
            "id": request.id.to_string(),
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"clip.mp4\"")
                .set_body_bytes(b"media payload".to_vec()),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = reqwest::Client::new();
    let saved = submit(&client, &config_for(&server), &request, dir.path())
        .await
        .expect("submit ok");

    assert_eq!(saved.file_name, "clip.mp4");
    assert_eq!(saved.bytes, b"media payload".len() as u64);
    assert_eq!(std::fs::read(&saved.path).unwrap(), b"media payload");
}

#[tokio::test]
async fn submit_falls_back_to_default_filename() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"audio".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = reqwest::Client::new();
    let saved = submit(
        &client,
        &config_for(&server),
        &request(JobType::AudioOnly),
        dir.path(),
    )
    .await
    .expect("submit ok");

    assert_eq!(saved.file_name, "download.mp3");
}

#[tokio::test]
async fn submit_refuses_suggested_names_with_path_components() {
    for suggested in ["../escape.mp4", "/tmp/escape.mp4", "nested/clip.mp4"] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/download"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(
                        "Content-Disposition",
                        format!("attachment; filename=\"{suggested}\"").as_str(),
                    )
                    .set_body_bytes(b"payload".to_vec()),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let saved = submit(&client, &config_for(&server), &request(JobType::Both), dir.path())
            .await
            .expect("submit ok");

        assert_eq!(saved.file_name, "download.mp4", "for {suggested}");
        assert!(
            saved.path.starts_with(dir.path()),
            "file escaped the output dir: {}",
            saved.path.display()
        );
        assert!(saved.path.exists());
    }
}

#[tokio::test]
async fn submit_surfaces_backend_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"error": "quota exceeded"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = reqwest::Client::new();
    let err = submit(&client, &config_for(&server), &request(JobType::Both), dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::ServerError(_)));
    assert_eq!(err.to_string(), "quota exceeded");
}

#[tokio::test]
async fn submit_uses_generic_message_for_unparsable_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = reqwest::Client::new();
    let err = submit(&client, &config_for(&server), &request(JobType::Both), dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::DownloadFailed));
    assert_eq!(err.to_string(), "Download failed");
}
