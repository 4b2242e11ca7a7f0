//! End-to-end export tests against a mocked NextDNS API.

mod common;

use std::collections::BTreeMap;

use common::{at, config_for, envelope, mount_three_pages, now, records, LOGS_PATH, PROFILE};
use mockito::Matcher;
use nextdns_logs_client::{ClientError, EndReason};
use nextdns_logs_core::services::CSV_HEADER;
use nextdns_logs_core::{CoreError, ExportService, StopReason};

fn read_json(path: &std::path::Path) -> serde_json::Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn downloads_every_page_and_writes_both_files() {
    let mut server = mockito::Server::new_async().await;
    let mocks = mount_three_pages(&mut server, false).await;
    let dir = tempfile::tempdir().unwrap();

    let service = ExportService::new(config_for(&server, dir.path())).unwrap();
    let report = service.run_at(now()).await.unwrap();

    for mock in &mocks {
        mock.assert_async().await;
    }
    assert_eq!(report.entries, 23);
    assert_eq!(report.metadata.pages_fetched, 3);
    assert_eq!(
        report.metadata.stop_reason,
        Some(StopReason::Exhausted {
            end: EndReason::ShortPage
        })
    );
    assert_eq!(report.metadata.oldest_entry, Some(at("2024-03-01T12:00:37Z")));
    assert_eq!(report.metadata.newest_entry, Some(at("2024-03-01T12:00:59Z")));
    assert!(dir.path().join("export.json").exists());
    assert!(dir.path().join("export.csv").exists());
}

#[tokio::test]
async fn rate_limited_page_is_retried_once_and_export_is_identical() {
    let plain_dir = tempfile::tempdir().unwrap();
    let mut plain = mockito::Server::new_async().await;
    mount_three_pages(&mut plain, false).await;
    ExportService::new(config_for(&plain, plain_dir.path()))
        .unwrap()
        .run_at(now())
        .await
        .unwrap();

    let throttled_dir = tempfile::tempdir().unwrap();
    let mut throttled = mockito::Server::new_async().await;
    let mocks = mount_three_pages(&mut throttled, true).await;
    ExportService::new(config_for(&throttled, throttled_dir.path()))
        .unwrap()
        .run_at(now())
        .await
        .unwrap();

    // every mock, the single 429 included, was hit exactly once
    for mock in &mocks {
        mock.assert_async().await;
    }
    for name in ["export.json", "export.csv"] {
        let a = std::fs::read(plain_dir.path().join(name)).unwrap();
        let b = std::fs::read(throttled_dir.path().join(name)).unwrap();
        assert_eq!(a, b, "{name} differs after a rate-limited retry");
    }
}

#[tokio::test]
async fn json_and_csv_agree_on_totals_and_statuses() {
    let mut server = mockito::Server::new_async().await;
    mount_three_pages(&mut server, false).await;
    let dir = tempfile::tempdir().unwrap();

    ExportService::new(config_for(&server, dir.path()))
        .unwrap()
        .run_at(now())
        .await
        .unwrap();

    let json = read_json(&dir.path().join("export.json"));
    let logs = json["logs"].as_array().unwrap();

    let mut reader = csv::Reader::from_path(dir.path().join("export.csv")).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());
    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();

    assert_eq!(rows.len(), logs.len());
    assert_eq!(json["metadata"]["totalEntries"], rows.len());

    let mut csv_counts: BTreeMap<String, u64> = BTreeMap::new();
    for row in &rows {
        *csv_counts.entry(row[4].to_string()).or_insert(0) += 1;
    }
    let json_counts: BTreeMap<String, u64> =
        serde_json::from_value(json["metadata"]["statusCounts"].clone()).unwrap();
    assert_eq!(csv_counts, json_counts);

    for (row, log) in rows.iter().zip(logs) {
        assert_eq!(&row[0], log["timestamp"].as_str().unwrap());
        assert_eq!(&row[1], log["domain"].as_str().unwrap());
    }
}

#[tokio::test]
async fn cap_is_never_exceeded() {
    let mut server = mockito::Server::new_async().await;
    mount_three_pages(&mut server, false).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(&server, dir.path());
    config.max_records = Some(15);

    let report = ExportService::new(config)
        .unwrap()
        .run_at(now())
        .await
        .unwrap();

    assert_eq!(report.entries, 15);
    assert_eq!(report.metadata.stop_reason, Some(StopReason::Capped));
    let json = read_json(&dir.path().join("export.json"));
    assert_eq!(json["logs"].as_array().unwrap().len(), 15);
}

#[tokio::test]
async fn floor_is_never_crossed() {
    let mut server = mockito::Server::new_async().await;
    mount_three_pages(&mut server, false).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(&server, dir.path());
    let floor = at("2024-03-01T12:00:45Z");
    config.from_timestamp = Some(floor);

    let report = ExportService::new(config)
        .unwrap()
        .run_at(now())
        .await
        .unwrap();

    assert_eq!(report.entries, 15);
    assert_eq!(report.metadata.out_of_window, 8);
    assert_eq!(report.metadata.stop_reason, Some(StopReason::PassedFloor));
    assert!(report.metadata.oldest_entry.unwrap() >= floor);
}

#[tokio::test]
async fn rejected_key_fails_before_any_data() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", LOGS_PATH)
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"errors":[{"code":"unauthorized","detail":"bad key"}]}"#)
        .expect(1)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();

    let err = ExportService::new(config_for(&server, dir.path()))
        .unwrap()
        .run_at(now())
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(
        err,
        CoreError::DownloadFailed {
            source: ClientError::InvalidCredentials { .. },
            saved: 0,
            ..
        }
    ));
    assert!(!dir.path().join("export.json").exists());
}

#[tokio::test]
async fn server_outage_mid_run_saves_partial_export() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", LOGS_PATH)
        .match_query(Matcher::Regex(common::FIRST_PAGE_QUERY.into()))
        .with_status(200)
        .with_body(envelope(&records(59, 10), Some("c1")))
        .create_async()
        .await;
    let outage = server
        .mock("GET", LOGS_PATH)
        .match_query(Matcher::UrlEncoded("cursor".into(), "c1".into()))
        .with_status(503)
        .expect(4)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();

    let err = ExportService::new(config_for(&server, dir.path()))
        .unwrap()
        .run_at(now())
        .await
        .unwrap_err();

    // one attempt plus three retries
    outage.assert_async().await;
    match err {
        CoreError::DownloadFailed {
            source, saved, files, ..
        } => {
            assert!(source.is_transport_exhausted());
            assert_eq!(saved, 10);
            assert_eq!(files.len(), 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let json = read_json(&dir.path().join("export.json"));
    assert_eq!(json["metadata"]["complete"], false);
    assert_eq!(json["logs"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn unknown_profile_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", LOGS_PATH)
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"errors":[{"code":"notFound"}]}"#)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();

    let err = ExportService::new(config_for(&server, dir.path()))
        .unwrap()
        .run_at(now())
        .await
        .unwrap_err();

    match err.client_error() {
        Some(ClientError::ProfileNotFound { profile, .. }) => assert_eq!(profile, PROFILE),
        other => panic!("unexpected error: {other:?}"),
    }
}
