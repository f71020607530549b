//! Integration test: curl transfer client against a local HTTP server,
//! including the confirmation interstitial and redirects.

mod common;

use common::file_server::{self, Route};
use drivewatch_core::config::HttpConfig;
use drivewatch_core::downloader::{DownloadError, FileDownloader};
use drivewatch_core::transfer::{CurlTransferClient, TransferClient};
use tempfile::tempdir;

fn downloader() -> FileDownloader<CurlTransferClient> {
    let http = HttpConfig {
        connect_timeout_secs: 5,
        timeout_secs: 30,
        user_agent: Some("drivewatch-test".to_string()),
    };
    FileDownloader::new(CurlTransferClient::new(&http).expect("curl handle"))
}

#[test]
fn direct_download_writes_served_body() {
    let body: Vec<u8> = (0u8..100).cycle().take(64 * 1024).collect();
    let base = file_server::start(vec![(
        "/uc?export=download&id=DAILY1",
        Route::ok(body.clone()).header("Content-Type", "application/pdf"),
    )]);
    let dest = tempdir().unwrap();

    let url = format!("{}/uc?export=download&id=DAILY1", base);
    let path = downloader().download(&url, dest.path()).expect("download");

    assert_eq!(path, dest.path().join("DAILY1.pdf"));
    let content = std::fs::read(&path).unwrap();
    assert_eq!(content.len(), body.len(), "file size must match");
    assert_eq!(content, body, "file content must match");
}

#[test]
fn confirmation_page_then_file_with_cookie() {
    let real: Vec<u8> = b"%PDF-1.7\n".iter().copied().cycle().take(10_000).collect();
    let interstitial = r#"<html><body>Google Drive can't scan this file for viruses.
        <a href="/uc?export=download&amp;confirm=tok9&amp;id=BIG">Confirm</a></body></html>"#;
    let base = file_server::start(vec![
        (
            "/uc?export=download&id=BIG",
            Route::ok(interstitial).header("Set-Cookie", "download_warning=tok9; Path=/"),
        ),
        (
            "/uc?export=download&id=BIG&confirm=tok9",
            Route::ok(real.clone()).requires_cookie("download_warning=tok9"),
        ),
    ]);
    let dest = tempdir().unwrap();

    let url = format!("{}/uc?export=download&id=BIG", base);
    let path = downloader().download(&url, dest.path()).expect("download");
    assert_eq!(std::fs::read(&path).unwrap(), real);
}

#[test]
fn redirect_is_followed() {
    let base = file_server::start(vec![
        ("/uc?export=download&id=R1", Route::redirect("/store/R1")),
        ("/store/R1", Route::ok("redirected body")),
    ]);
    let dest = tempdir().unwrap();

    let mut client = CurlTransferClient::new(&HttpConfig::default()).unwrap();
    let mut body = Vec::new();
    let resp = client
        .get(&format!("{}/uc?export=download&id=R1", base), &mut |data: &[u8]| {
            body.extend_from_slice(data);
            Ok(())
        })
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(body, b"redirected body");
    assert_eq!(resp.final_url, format!("{}/store/R1", base));

    let path = downloader()
        .download(&format!("{}/uc?export=download&id=R1", base), dest.path())
        .unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"redirected body");
}

#[test]
fn large_body_arrives_in_bounded_blocks() {
    let body: Vec<u8> = (0u8..=255).cycle().take(8 * 1024 * 1024).collect();
    let base = file_server::start(vec![("/uc?export=download&id=HUGE", Route::ok(body.clone()))]);

    let mut client = CurlTransferClient::new(&HttpConfig::default()).unwrap();
    let mut blocks = 0usize;
    let mut largest = 0usize;
    let mut total = 0usize;
    let resp = client
        .get(&format!("{}/uc?export=download&id=HUGE", base), &mut |data: &[u8]| {
            blocks += 1;
            largest = largest.max(data.len());
            total += data.len();
            Ok(())
        })
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(total, body.len());
    assert!(blocks > 1, "body must be delivered incrementally");
    // libcurl never hands the write callback more than CURL_MAX_WRITE_SIZE.
    assert!(largest <= 16 * 1024, "largest block was {largest} bytes");
}

#[test]
fn large_download_is_written_completely() {
    let body: Vec<u8> = (0u8..=250).cycle().take(8 * 1024 * 1024).collect();
    let base = file_server::start(vec![("/uc?export=download&id=HUGE", Route::ok(body.clone()))]);
    let dest = tempdir().unwrap();

    let url = format!("{}/uc?export=download&id=HUGE", base);
    let path = downloader().download(&url, dest.path()).expect("download");
    let content = std::fs::read(&path).unwrap();
    assert_eq!(content.len(), body.len());
    assert!(content == body, "file content must match");
    assert!(!dest.path().join("HUGE.pdf.part").exists());
}

#[test]
fn missing_file_reports_status_and_writes_nothing() {
    let base = file_server::start(vec![]);
    let dest = tempdir().unwrap();

    let url = format!("{}/uc?export=download&id=GONE", base);
    let err = downloader().download(&url, dest.path()).unwrap_err();
    assert!(matches!(err, DownloadError::Status(404)), "got {err:?}");
    assert!(std::fs::read_dir(dest.path()).unwrap().next().is_none());
}

#[test]
fn unreachable_host_is_transfer_error() {
    let dest = tempdir().unwrap();
    // Bind then drop to get a port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let url = format!("http://127.0.0.1:{}/uc?export=download&id=X", port);
    let err = downloader().download(&url, dest.path()).unwrap_err();
    assert!(matches!(err, DownloadError::Transfer(_)), "got {err:?}");
}
