// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full agent runs: config tree on disk, built-in plugins, mock master.

use std::fs;
use std::path::Path;
use std::time::Duration;

use hostwatch_agent::Agent;
use hostwatch_config::load_configs;
use hostwatch_core::{HostInfo, PluginFields};
use hostwatch_plugin::Registries;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn inventory_reader(dir: &Path) {
    write(
        dir,
        "readers/inventory.toml",
        r#"
PluginName = "Static"
Path = "/inventory"
Interval = "100ms"

[Host]
Name = "h1"

[PluginFields.Values]
rack = "a4"
cpu = { cores = 8 }
"#,
    );
}

async fn wait_for_requests(server: &MockServer, at_least: usize) -> Vec<wiremock::Request> {
    for _ in 0..100 {
        let received = server.received_requests().await.unwrap();
        if received.len() >= at_least {
            return received;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("master never received {at_least} request(s)");
}

#[tokio::test]
async fn agent_delivers_reader_data_to_master() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    inventory_reader(dir.path());
    write(
        dir.path(),
        "writers/master.toml",
        r#"
PluginName = "MasterHost"
Path = "/master"
Interval = "100ms"
ReaderPaths = ["/inventory"]
"#,
    );

    // The master URL comes from the general config defaults.
    let mut master_defaults = PluginFields::new();
    master_defaults.insert("Url".into(), json!(server.uri()));

    let (configs, _) = load_configs(dir.path());
    let registries = Registries::with_builtins().unwrap();
    let (agent, report) = Agent::build(&registries, &configs, &HostInfo::default(), &master_defaults);
    assert_eq!(report.bound, 2);
    assert!(report.failures.is_empty());

    let cancel = CancellationToken::new();
    let running = tokio::spawn(agent.run(cancel.clone()));

    let received = wait_for_requests(&server, 1).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .unwrap()
        .unwrap();

    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["Host"]["Name"], "h1");
    assert_eq!(body["Data"]["/r/inventory"]["rack"], "a4");
    assert_eq!(body["Data"]["/r/inventory"]["cpu.cores"], 8);
}

#[tokio::test]
async fn broken_instances_do_not_block_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    inventory_reader(dir.path());
    write(dir.path(), "readers/ghost.toml", "PluginName = \"Ghost\"\nPath = \"/ghost\"\n");
    write(
        dir.path(),
        "writers/zero.toml",
        "PluginName = \"Stdout\"\nPath = \"/zero\"\nInterval = \"0s\"\n",
    );
    write(
        dir.path(),
        "writers/out.toml",
        "PluginName = \"Stdout\"\nPath = \"/out\"\nInterval = \"100ms\"\n\n[PluginFields]\nShade = \"blue\"\n",
    );

    let (configs, _) = load_configs(dir.path());
    let registries = Registries::with_builtins().unwrap();
    let (agent, report) = Agent::build(&registries, &configs, &HostInfo::default(), &PluginFields::new());

    assert_eq!(report.bound, 2);
    let failed: Vec<_> = report.failures.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(failed, vec!["/r/ghost", "/w/zero"]);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].0, "/w/out");

    let writers = agent.writers();
    let cancel = CancellationToken::new();
    let running = tokio::spawn(agent.run(cancel.clone()));

    // The stdout writer publishes whatever the reader produced.
    let mut published = None;
    for _ in 0..100 {
        if let Some(data) = writers[0].data().load() {
            published = Some(data);
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    cancel.cancel();
    running.await.unwrap();

    let data = published.expect("writer never produced data");
    assert_eq!(data["/r/inventory"]["Data"]["rack"], "a4");
}
