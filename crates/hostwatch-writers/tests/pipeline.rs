// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end writer cycles against a mock master.

use std::collections::BTreeMap;

use async_trait::async_trait;
use hostwatch_core::{Configurable, SnapshotSource};
use hostwatch_writers::{MasterHostWriter, Writer, WriterHandle};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct MapSource(BTreeMap<String, Vec<u8>>);

#[async_trait]
impl SnapshotSource for MapSource {
    async fn fetch(&self, paths: &[String]) -> BTreeMap<String, Vec<u8>> {
        paths
            .iter()
            .filter_map(|p| self.0.get(p).map(|b| (p.clone(), b.clone())))
            .collect()
    }
}

fn mem_source() -> MapSource {
    let mut raw = BTreeMap::new();
    raw.insert(
        "/r/mem".to_string(),
        serde_json::to_vec(&json!({
            "Host": {"Name": "h1"},
            "Data": {"mem": {"free": 100, "used": 20}}
        }))
        .unwrap(),
    );
    MapSource(raw)
}

fn master_writer(url: String, max_retries: u32) -> Box<dyn Writer> {
    let mut writer = MasterHostWriter::new();
    writer.apply_field("Url", &json!(url)).unwrap();
    writer.apply_field("MaxRetries", &json!(max_retries)).unwrap();
    writer.apply_field("RetryDelay", &json!("1ms")).unwrap();
    Box::new(writer)
}

#[tokio::test]
async fn mem_snapshot_is_delivered_once_as_flat_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agent"))
        .and(body_json(json!({
            "Data": {"/r/mem": {"mem.free": 100, "mem.used": 20}},
            "Host": {"Name": "h1"}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let handle = WriterHandle::new(
        "/w/master",
        vec!["/r/mem".to_string()],
        master_writer(format!("{}/api/agent", server.uri()), 3),
    );

    let report = handle
        .run_cycle(&mem_source(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.collected, vec!["/r/mem"]);
    assert!(report.gaps.is_empty());
}

#[tokio::test]
async fn flat_mem_snapshot_produces_exact_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({
            "Data": {"/r/mem": {"free": 100}},
            "Host": {"Name": "h1"}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut raw = BTreeMap::new();
    raw.insert(
        "/r/mem".to_string(),
        br#"{"Host":{"Name":"h1"},"Data":{"free":100}}"#.to_vec(),
    );

    let handle = WriterHandle::new(
        "/w/master",
        vec!["/r/mem".to_string()],
        master_writer(server.uri(), 3),
    );
    handle
        .run_cycle(&MapSource(raw), &CancellationToken::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn transient_failures_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let handle = WriterHandle::new(
        "/w/master",
        vec!["/r/mem".to_string()],
        master_writer(server.uri(), 5),
    );
    handle
        .run_cycle(&mem_source(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn exhausted_retries_fail_the_cycle_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let handle = WriterHandle::new(
        "/w/master",
        vec!["/r/mem".to_string()],
        master_writer(server.uri(), 2),
    );

    let first = handle
        .run_cycle(&mem_source(), &CancellationToken::new())
        .await;
    assert!(first.unwrap_err().to_string().contains("500"));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    // The next cycle starts fresh with its own attempt budget.
    let _ = handle
        .run_cycle(&mem_source(), &CancellationToken::new())
        .await;
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn processor_output_is_what_gets_delivered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({
            "Data": {"/r/mem": {"mem.free": 100, "mem.used": 20}},
            "Host": {"Name": "renamed"}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut writer = master_writer(server.uri(), 1);
    writer
        .apply_field("JsonProcessor", &json!("sed 's/\"h1\"/\"renamed\"/'"))
        .unwrap();
    let handle = WriterHandle::new("/w/master", vec!["/r/mem".to_string()], writer);

    handle
        .run_cycle(&mem_source(), &CancellationToken::new())
        .await
        .unwrap();

    let data: serde_json::Value = serde_json::from_slice(&handle.to_json().unwrap()).unwrap();
    assert_eq!(data["/r/mem"]["Host"]["Name"], "renamed");
}
