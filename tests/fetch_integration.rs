//! Integration tests for the fetch module.
//!
//! These tests drive full transfers against mock HTTP servers.

use std::path::{Path, PathBuf};

use grabber_core::fetch::{
    ConsoleProgress, FetchError, Fetcher, ProgressObserver, TransferState, humanize_bytes,
    run_batch,
};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Observer that records every chunk and checks the final path stays absent while streaming.
#[derive(Default)]
struct RecordingObserver {
    chunks: Vec<u64>,
    totals: Vec<u64>,
    finished: usize,
    watch: Option<PathBuf>,
    saw_final_early: bool,
}

impl RecordingObserver {
    fn watching(final_path: PathBuf) -> Self {
        Self {
            watch: Some(final_path),
            ..Self::default()
        }
    }

    fn total(&self) -> u64 {
        self.chunks.iter().sum()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_bytes(&mut self, n: u64) {
        self.chunks.push(n);
        self.totals.push(self.total());
        if let Some(path) = &self.watch {
            if path.exists() {
                self.saw_final_early = true;
            }
        }
    }

    fn finish(&mut self) {
        self.finished += 1;
    }
}

/// Helper to create a mock server with a file endpoint.
async fn setup_mock_file(path_str: &str, content: &[u8]) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(&mock_server)
        .await;

    mock_server
}

/// Serves one response that declares `declared` bytes but sends only `sent` before closing.
async fn truncated_body_server(sent: usize, declared: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        let header = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {declared}\r\n\r\n"
        );
        let _ = socket.write_all(header.as_bytes()).await;
        let _ = socket.write_all(&vec![7u8; sent]).await;
        let _ = socket.flush().await;
        let _ = socket.shutdown().await;
    });

    format!("http://{addr}/img/broken.png")
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_fetch_full_flow_preserves_content() {
    let content = b"This is the complete file content for testing.\nLine 2.\nLine 3.";
    let mock_server = setup_mock_file("/a/b/pic.jpg", content).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let fetcher = Fetcher::new();
    let url = format!("{}/a/b/pic.jpg", mock_server.uri());
    let mut observer = RecordingObserver::default();
    let result = fetcher
        .fetch_with_observer(&url, temp_dir.path(), &mut observer)
        .await;

    assert!(result.is_ok(), "Fetch should succeed: {:?}", result.err());
    let transfer = result.unwrap();
    assert_eq!(transfer.state(), TransferState::Committed);
    assert_eq!(transfer.final_name(), "pic.jpg");
    assert_eq!(transfer.bytes_transferred(), content.len() as u64);

    let downloaded = std::fs::read(temp_dir.path().join("pic.jpg")).expect("should read file");
    assert_eq!(downloaded, content);
    assert_eq!(dir_entries(temp_dir.path()), vec!["pic.jpg"], "no staging file may remain");
    assert_eq!(observer.finished, 1);
}

#[tokio::test]
async fn test_fetch_stages_under_tmp_then_renames() {
    let mock_server = setup_mock_file("/img/42.png", b"png bytes").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let fetcher = Fetcher::new();
    let url = format!("{}/img/42.png", mock_server.uri());
    let final_path = temp_dir.path().join("42.png");
    let mut observer = RecordingObserver::watching(final_path.clone());
    let transfer = fetcher
        .fetch_with_observer(&url, temp_dir.path(), &mut observer)
        .await
        .expect("fetch should succeed");

    assert_eq!(transfer.staging_path(), temp_dir.path().join("42.png.tmp"));
    assert_eq!(transfer.final_path(), final_path);
    assert!(final_path.exists());
    assert!(!transfer.staging_path().exists());
    assert!(
        !observer.saw_final_early,
        "final file must not appear before the stream is consumed"
    );
}

#[tokio::test]
async fn test_fetch_observer_totals_are_monotonic_and_exact() {
    let content: Vec<u8> = (0..=255u8).cycle().take(512 * 1024).collect();
    let mock_server = setup_mock_file("/big.bin", &content).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let fetcher = Fetcher::new();
    let url = format!("{}/big.bin", mock_server.uri());
    let final_path = temp_dir.path().join("big.bin");
    let mut observer = RecordingObserver::watching(final_path.clone());
    let transfer = fetcher
        .fetch_with_observer(&url, temp_dir.path(), &mut observer)
        .await
        .expect("fetch should succeed");

    assert_eq!(observer.total(), content.len() as u64);
    assert_eq!(transfer.bytes_transferred(), content.len() as u64);
    assert!(observer.totals.windows(2).all(|w| w[0] <= w[1]));
    assert!(!observer.saw_final_early);
    assert_eq!(std::fs::read(&final_path).expect("read"), content);
}

#[tokio::test]
async fn test_fetch_empty_body_commits_zero_byte_file() {
    let mock_server = setup_mock_file("/empty.dat", b"").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let fetcher = Fetcher::new();
    let url = format!("{}/empty.dat", mock_server.uri());
    let mut observer = RecordingObserver::default();
    let transfer = fetcher
        .fetch_with_observer(&url, temp_dir.path(), &mut observer)
        .await
        .expect("fetch should succeed");

    assert_eq!(transfer.bytes_transferred(), 0);
    assert_eq!(humanize_bytes(observer.total()), "0 B");
    let meta = std::fs::metadata(temp_dir.path().join("empty.dat")).expect("file exists");
    assert_eq!(meta.len(), 0);
    assert_eq!(observer.finished, 1);
}

#[tokio::test]
async fn test_fetch_overwrites_existing_final_file() {
    let mock_server = setup_mock_file("/notes.txt", b"fresh content").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let final_path = temp_dir.path().join("notes.txt");
    std::fs::write(&final_path, b"stale content that is longer").expect("seed file");

    let fetcher = Fetcher::new();
    let url = format!("{}/notes.txt", mock_server.uri());
    for _ in 0..2 {
        fetcher
            .fetch_with_observer(&url, temp_dir.path(), &mut RecordingObserver::default())
            .await
            .expect("fetch should succeed");
        assert_eq!(std::fs::read(&final_path).expect("read"), b"fresh content");
    }
    assert_eq!(dir_entries(temp_dir.path()), vec!["notes.txt"]);
}

#[tokio::test]
async fn test_fetch_truncates_stale_staging_file() {
    let mock_server = setup_mock_file("/photo.jpg", b"new").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    std::fs::write(temp_dir.path().join("photo.jpg.tmp"), b"leftover from a crash").expect("seed");

    let fetcher = Fetcher::new();
    let url = format!("{}/photo.jpg", mock_server.uri());
    fetcher
        .fetch_with_observer(&url, temp_dir.path(), &mut RecordingObserver::default())
        .await
        .expect("fetch should succeed");

    assert_eq!(std::fs::read(temp_dir.path().join("photo.jpg")).expect("read"), b"new");
    assert_eq!(dir_entries(temp_dir.path()), vec!["photo.jpg"]);
}

#[tokio::test]
async fn test_fetch_http_404_is_status_error_and_leaves_nothing() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>not found</html>"))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new();
    let url = format!("{}/missing.png", mock_server.uri());
    let result = fetcher
        .fetch_with_observer(&url, temp_dir.path(), &mut RecordingObserver::default())
        .await;

    match result {
        Err(FetchError::HttpStatus {
            status,
            url: err_url,
        }) => {
            assert_eq!(status, 404);
            assert!(err_url.contains("/missing.png"));
        }
        other => panic!("Expected HttpStatus(404), got: {other:?}"),
    }
    assert!(
        dir_entries(temp_dir.path()).is_empty(),
        "error page must not be saved"
    );
}

#[tokio::test]
async fn test_fetch_stream_interrupted_after_1024_bytes() {
    let url = truncated_body_server(1024, 4096).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let fetcher = Fetcher::new();
    let mut observer = RecordingObserver::default();
    let result = fetcher
        .fetch_with_observer(&url, temp_dir.path(), &mut observer)
        .await;

    let error = result.expect_err("truncated body must fail");
    assert!(
        matches!(error, FetchError::Network { .. }),
        "Expected Network error, got: {error:?}"
    );
    assert!(error.is_network());
    assert!(observer.total() <= 1024);
    assert!(!temp_dir.path().join("broken.png").exists(), "final file must never appear");
    assert!(
        !temp_dir.path().join("broken.png.tmp").exists(),
        "staging file must be cleaned up"
    );
    assert_eq!(observer.finished, 1);
}

#[tokio::test]
async fn test_fetch_connection_refused_is_network_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let fetcher = Fetcher::new();
    let url = format!("http://{addr}/file.bin");
    let result = fetcher
        .fetch_with_observer(&url, temp_dir.path(), &mut RecordingObserver::default())
        .await;

    assert!(matches!(result, Err(FetchError::Network { .. })));
    assert!(dir_entries(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_fetch_missing_directory_is_io_error() {
    let mock_server = setup_mock_file("/pic.jpg", b"bytes").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let missing = temp_dir.path().join("does-not-exist");

    let fetcher = Fetcher::new();
    let url = format!("{}/pic.jpg", mock_server.uri());
    let result = fetcher
        .fetch_with_observer(&url, &missing, &mut RecordingObserver::default())
        .await;

    match result {
        Err(FetchError::Io { path, .. }) => {
            assert_eq!(path, missing.join("pic.jpg.tmp"));
        }
        other => panic!("Expected Io error, got: {other:?}"),
    }
    assert!(!missing.exists(), "fetcher must not create the directory");
}

#[tokio::test]
async fn test_fetch_rename_onto_directory_fails_and_removes_staging() {
    let mock_server = setup_mock_file("/album.jpg", b"image bytes").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let occupied = temp_dir.path().join("album.jpg");
    std::fs::create_dir(&occupied).expect("create blocking dir");
    std::fs::write(occupied.join("keep.txt"), b"keep me").expect("seed inner file");

    let fetcher = Fetcher::new();
    let url = format!("{}/album.jpg", mock_server.uri());
    let mut observer = RecordingObserver::default();
    let result = fetcher
        .fetch_with_observer(&url, temp_dir.path(), &mut observer)
        .await;

    match result {
        Err(FetchError::Rename { from, to, .. }) => {
            assert_eq!(from, temp_dir.path().join("album.jpg.tmp"));
            assert_eq!(to, occupied);
        }
        other => panic!("Expected Rename error, got: {other:?}"),
    }
    assert_eq!(observer.total(), 11);
    assert!(
        !temp_dir.path().join("album.jpg.tmp").exists(),
        "staging file must be cleaned up"
    );
    assert!(occupied.is_dir());
    assert_eq!(
        std::fs::read(occupied.join("keep.txt")).expect("read inner file"),
        b"keep me"
    );
    assert_eq!(dir_entries(temp_dir.path()), vec!["album.jpg"]);
}

#[tokio::test]
async fn test_fetch_directory_url_is_rejected_before_touching_disk() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let fetcher = Fetcher::new();
    let result = fetcher
        .fetch_with_observer(
            "https://example.com/gallery/",
            temp_dir.path(),
            &mut RecordingObserver::default(),
        )
        .await;

    assert!(matches!(result, Err(FetchError::EmptyFileName { .. })));
    assert!(dir_entries(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_fetch_invalid_url_is_parse_error() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let fetcher = Fetcher::new();
    let result = fetcher
        .fetch_with_observer("not a url", temp_dir.path(), &mut RecordingObserver::default())
        .await;

    assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    assert!(dir_entries(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_run_batch_isolates_failures() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photo/1.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/photo/2.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"second".to_vec()))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let urls = vec![
        format!("{}/photo/1.jpg", mock_server.uri()),
        format!("{}/photo/2.jpg", mock_server.uri()),
        format!("{}/photo/", mock_server.uri()),
    ];

    let fetcher = Fetcher::new();
    let summary = run_batch(&fetcher, &urls, temp_dir.path(), ConsoleProgress::hidden).await;

    assert_eq!(summary.completed(), 1);
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.bytes(), 6);
    assert!(!summary.is_success());
    assert!(summary.failures()[0].url.ends_with("/photo/1.jpg"));
    assert!(matches!(
        summary.failures()[0].error,
        FetchError::HttpStatus { status: 500, .. }
    ));
    assert!(matches!(
        summary.failures()[1].error,
        FetchError::EmptyFileName { .. }
    ));
    assert_eq!(dir_entries(temp_dir.path()), vec!["2.jpg"]);
}

#[tokio::test]
async fn test_run_batch_empty_list_is_success() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let fetcher = Fetcher::new();
    let summary = run_batch(&fetcher, &[], temp_dir.path(), ConsoleProgress::hidden).await;
    assert!(summary.is_success());
    assert_eq!(summary.completed(), 0);
}
