//! Black-box coverage of the update-check and apply protocols
//! against a mocked upstream: manifest digest comparison, archive
//! download/extract/convert, and fingerprint persistence across two
//! independent `SdeUpdater` instances.

use sde_data::{DataDir, SdeUpdater};
use std::io::Write;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIGEST: &str = "deadbeef1234";

fn build_archive() -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options: zip::write::FileOptions<()> = zip::write::FileOptions::default();
        writer.start_file("agents.yaml", options).unwrap();
        writer
            .write_all(b"- agentID: 1\n  name: Test Agent\n")
            .unwrap();
        writer.start_file("other/misc/notes.txt", options).unwrap();
        writer.write_all(b"not an SDE file, must be dropped").unwrap();
        writer.finish().unwrap();
    }
    buf
}

#[tokio::test]
async fn check_reports_update_then_apply_persists_fingerprint_and_converts_yaml() {
    let server = MockServer::start().await;
    let archive = build_archive();

    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{DIGEST}  sde.zip\n")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sde.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let data_dir = DataDir::new(tmp.path().join("data"), tmp.path().join("staging"));
    let updater = SdeUpdater::new(
        format!("{}/manifest.json", server.uri()),
        format!("{}/sde.zip", server.uri()),
    )
    .unwrap();

    let check = updater.check_for_update(&data_dir).await.unwrap();
    assert!(check.updates_available);
    assert_eq!(check.current_version, "");
    assert_eq!(check.latest_version, DIGEST);

    let outcome = updater.apply_update(&data_dir).await.unwrap();
    assert_eq!(outcome.new_fingerprint, DIGEST);
    assert_eq!(outcome.files_written, 1);
    assert!(outcome.log.iter().all(|entry| entry.success));

    let converted = data_dir.read_whole("agents.json").await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&converted).unwrap();
    assert_eq!(value[0]["name"], "Test Agent");

    assert_eq!(data_dir.read_fingerprint().await.unwrap(), DIGEST);

    // A freshly constructed updater over the same data dir sees the
    // persisted fingerprint and reports no further update available.
    let restarted = SdeUpdater::new(
        format!("{}/manifest.json", server.uri()),
        format!("{}/sde.zip", server.uri()),
    )
    .unwrap();
    let recheck = restarted.check_for_update(&data_dir).await.unwrap();
    assert!(!recheck.updates_available);
}

#[tokio::test]
async fn apply_update_fails_and_returns_partial_log_when_archive_missing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{DIGEST}  sde.zip\n")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sde.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let data_dir = DataDir::new(tmp.path().join("data"), tmp.path().join("staging"));
    let updater = SdeUpdater::new(
        format!("{}/manifest.json", server.uri()),
        format!("{}/sde.zip", server.uri()),
    )
    .unwrap();

    let err = updater.apply_update(&data_dir).await.unwrap_err();
    let (_, log) = err;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].step, "download");
    assert!(!log[0].success);
}
