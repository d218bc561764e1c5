// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binding configured instances and driving them on their intervals.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hostwatch_config::{Config, Configs};
use hostwatch_core::{Executor, HostInfo, HostwatchError, PluginFields, PluginKind, Reader};
use hostwatch_plugin::{bind_executor, bind_reader, bind_writer, BindReport, Registries};
use hostwatch_writers::{master, watch_dir, WriterHandle};
use serde_json::Value;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::store::SnapshotStore;

/// An instance that could not be started.
#[derive(Debug)]
pub struct InstanceFailure {
    pub kind: PluginKind,
    pub path: String,
    pub plugin_name: String,
    pub error: HostwatchError,
}

/// What happened while binding the loaded configs.
#[derive(Debug, Default)]
pub struct AgentReport {
    pub bound: usize,
    pub failures: Vec<InstanceFailure>,
    /// Bind reports with skipped fields, keyed by prefixed path.
    pub warnings: Vec<(String, BindReport)>,
}

struct ReaderTask {
    config: Config,
    path: String,
    interval: Duration,
    host: HostInfo,
    reader: Box<dyn Reader>,
}

struct WriterTask {
    interval: Duration,
    handle: Arc<WriterHandle>,
    trigger: Arc<Notify>,
    processor_dir: Option<PathBuf>,
}

struct ExecutorTask {
    path: String,
    interval: Duration,
    reader_paths: Vec<String>,
    executor: Box<dyn Executor>,
}

/// Every bound instance, ready to run.
pub struct Agent {
    store: Arc<SnapshotStore>,
    readers: Vec<ReaderTask>,
    writers: Vec<WriterTask>,
    executors: Vec<ExecutorTask>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("readers", &self.readers.len())
            .field("writers", &self.writers.len())
            .field("executors", &self.executors.len())
            .finish()
    }
}

fn positive_interval(config: &Config) -> Result<Duration, HostwatchError> {
    let interval = config.interval_duration()?;
    if interval.is_zero() {
        return Err(HostwatchError::Config(format!(
            "Interval of {} must be greater than zero",
            config.path
        )));
    }
    Ok(interval)
}

/// Directory holding the program a `JsonProcessor` command line starts.
fn processor_dir(command: &str) -> Option<PathBuf> {
    let program = command.split_whitespace().next()?;
    let program = Path::new(program);
    if !program.is_absolute() {
        return None;
    }
    program.parent().map(Path::to_path_buf)
}

impl Agent {
    /// Binds every config against `registries`.
    ///
    /// Instances that fail to bind are reported and left out; they never
    /// prevent the others from starting. `master_defaults` fills in fields
    /// `MasterHost` writers leave unset.
    pub fn build(
        registries: &Registries,
        configs: &Configs,
        default_host: &HostInfo,
        master_defaults: &PluginFields,
    ) -> (Self, AgentReport) {
        let mut agent = Agent {
            store: Arc::new(SnapshotStore::new()),
            readers: Vec::new(),
            writers: Vec::new(),
            executors: Vec::new(),
        };
        let mut report = AgentReport::default();

        for config in &configs.readers {
            let bound = positive_interval(config).and_then(|interval| {
                bind_reader(registries, config).map(|(reader, bind)| (interval, reader, bind))
            });
            match bound {
                Ok((interval, reader, bind)) => {
                    let path = config.path_with_prefix();
                    report.record(&path, bind);
                    agent.readers.push(ReaderTask {
                        config: config.clone(),
                        path,
                        interval,
                        host: config.host.clone().unwrap_or_else(|| default_host.clone()),
                        reader,
                    });
                }
                Err(error) => report.fail(PluginKind::Reader, config, error),
            }
        }

        for config in &configs.writers {
            let config = if config.plugin_name == master::PLUGIN_NAME {
                config.clone().with_default_fields(master_defaults)
            } else {
                config.clone()
            };
            let bound = positive_interval(&config).and_then(|interval| {
                bind_writer(registries, &config).map(|(writer, bind)| (interval, writer, bind))
            });
            match bound {
                Ok((interval, writer, bind)) => {
                    let path = config.path_with_prefix();
                    report.record(&path, bind);
                    let watched_dir = writer.base().json_processor().as_deref().and_then(processor_dir);
                    let handle = WriterHandle::new(path, config.reader_paths_with_prefix(), writer);
                    agent.writers.push(WriterTask {
                        interval,
                        handle: Arc::new(handle),
                        trigger: Arc::new(Notify::new()),
                        processor_dir: watched_dir,
                    });
                }
                Err(error) => report.fail(PluginKind::Writer, &config, error),
            }
        }

        for config in &configs.executors {
            let bound = positive_interval(config).and_then(|interval| {
                bind_executor(registries, config).map(|(executor, bind)| (interval, executor, bind))
            });
            match bound {
                Ok((interval, executor, bind)) => {
                    let path = config.path_with_prefix();
                    report.record(&path, bind);
                    agent.executors.push(ExecutorTask {
                        path,
                        interval,
                        reader_paths: config.reader_paths_with_prefix(),
                        executor,
                    });
                }
                Err(error) => report.fail(PluginKind::Executor, config, error),
            }
        }

        info!(
            readers = agent.readers.len(),
            writers = agent.writers.len(),
            executors = agent.executors.len(),
            failed = report.failures.len(),
            "instances bound"
        );
        (agent, report)
    }

    pub fn store(&self) -> Arc<SnapshotStore> {
        self.store.clone()
    }

    /// Handles of every bound writer, for inspecting their latest `Data`.
    pub fn writers(&self) -> Vec<Arc<WriterHandle>> {
        self.writers.iter().map(|w| w.handle.clone()).collect()
    }

    /// Runs every instance until `cancel` fires, then waits for all loops to
    /// finish their current step.
    pub async fn run(self, cancel: CancellationToken) {
        let mut tasks: Vec<JoinHandle<()>> = Vec::new();

        for task in self.readers {
            tasks.push(tokio::spawn(run_reader(task, self.store.clone(), cancel.clone())));
        }

        // One watch per directory, waking every writer whose processor lives there.
        let mut triggers_by_dir: BTreeMap<PathBuf, Vec<Arc<Notify>>> = BTreeMap::new();
        for task in &self.writers {
            if let Some(dir) = &task.processor_dir {
                triggers_by_dir
                    .entry(dir.clone())
                    .or_default()
                    .push(task.trigger.clone());
            }
        }
        for (dir, triggers) in triggers_by_dir {
            tasks.push(tokio::spawn(watch_processor_dir(dir, triggers, cancel.clone())));
        }

        for task in self.writers {
            tasks.push(tokio::spawn(run_writer(task, self.store.clone(), cancel.clone())));
        }

        for task in self.executors {
            tasks.push(tokio::spawn(run_executor(task, self.store.clone(), cancel.clone())));
        }

        info!(tasks = tasks.len(), "agent running");
        for result in futures::future::join_all(tasks).await {
            if let Err(e) = result {
                error!(error = %e, "instance task panicked");
            }
        }
        info!("agent stopped");
    }
}

impl AgentReport {
    fn record(&mut self, path: &str, bind: BindReport) {
        self.bound += 1;
        if !bind.is_clean() {
            self.warnings.push((path.to_string(), bind));
        }
    }

    fn fail(&mut self, kind: PluginKind, config: &Config, error: HostwatchError) {
        error!(kind = %kind, path = %config.path, plugin = %config.plugin_name, error = %error, "instance not started");
        self.failures.push(InstanceFailure {
            kind,
            path: config.path_with_prefix(),
            plugin_name: config.plugin_name.clone(),
            error,
        });
    }
}

/// Waits for `interval`, returning `false` once cancelled.
async fn wait(interval: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(interval) => true,
    }
}

/// Builds the JSON snapshot a reader publishes:
/// `{UnixNano, Path, Interval, PluginName, Host, Data}`.
fn snapshot(config: &Config, host: &HostInfo, data: Value) -> Result<Vec<u8>, HostwatchError> {
    let mut record = config.common_json_data();
    let host = serde_json::to_value(host)
        .map_err(|e| HostwatchError::Internal(format!("failed to serialize host: {e}")))?;
    record.insert("Host".into(), host);
    record.insert("Data".into(), data);
    serde_json::to_vec(&record)
        .map_err(|e| HostwatchError::Internal(format!("failed to serialize snapshot: {e}")))
}

async fn sample_reader(task: &mut ReaderTask) -> Result<Vec<u8>, HostwatchError> {
    task.reader.run().await?;
    let raw = task.reader.to_json()?;
    let data: Value = serde_json::from_slice(&raw).map_err(|e| {
        HostwatchError::Internal(format!("reader produced invalid JSON: {e}"))
    })?;
    snapshot(&task.config, &task.host, data)
}

async fn run_reader(mut task: ReaderTask, store: Arc<SnapshotStore>, cancel: CancellationToken) {
    debug!(path = %task.path, interval = ?task.interval, "reader started");
    loop {
        match sample_reader(&mut task).await {
            Ok(bytes) => store.publish(task.path.clone(), bytes).await,
            Err(e) => warn!(path = %task.path, plugin = task.reader.plugin_name(), error = %e, "reader run failed"),
        }
        if !wait(task.interval, &cancel).await {
            break;
        }
    }
    debug!(path = %task.path, "reader stopped");
}

async fn run_writer(task: WriterTask, store: Arc<SnapshotStore>, cancel: CancellationToken) {
    let path = task.handle.path().to_string();
    debug!(path = %path, interval = ?task.interval, "writer started");
    loop {
        if store.has_any(task.handle.reader_paths()).await {
            match task.handle.run_cycle(store.as_ref(), &cancel).await {
                Ok(_) => {}
                Err(HostwatchError::Cancelled) => break,
                Err(e) => warn!(path = %path, error = %e, "writer cycle failed"),
            }
        } else {
            debug!(path = %path, "no reader snapshots yet, skipping cycle");
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(task.interval) => {}
            _ = task.trigger.notified() => {
                info!(path = %path, "json processor changed, re-running writer");
            }
        }
    }
    debug!(path = %path, "writer stopped");
}

async fn run_executor(mut task: ExecutorTask, store: Arc<SnapshotStore>, cancel: CancellationToken) {
    debug!(path = %task.path, interval = ?task.interval, "executor started");
    loop {
        let readers_data = store.readers_data(&task.reader_paths).await;
        if let Err(e) = task.executor.run(&readers_data).await {
            warn!(path = %task.path, plugin = task.executor.plugin_name(), error = %e, "executor run failed");
        }
        if !wait(task.interval, &cancel).await {
            break;
        }
    }
    debug!(path = %task.path, "executor stopped");
}

async fn watch_processor_dir(dir: PathBuf, triggers: Vec<Arc<Notify>>, cancel: CancellationToken) {
    let result = watch_dir(
        &dir,
        move |change, changed: &Path| {
            debug!(path = %changed.display(), change = ?change, "processor directory changed");
            for trigger in &triggers {
                trigger.notify_one();
            }
            Ok(())
        },
        cancel,
    )
    .await;
    if let Err(e) = result {
        warn!(dir = %dir.display(), error = %e, "cannot watch json processor directory");
    }
}
