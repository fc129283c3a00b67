//! Batch scan orchestrator.
//!
//! The worker runs as its own tokio task and talks to its owner only
//! through channels: `start` commands in, progress/result/complete events
//! out. Files are processed strictly in input order, one at a time; the
//! only suspension point is the metadata read.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::error::{InventoryError, Result};
use crate::inventory::classify::inventory_file;
use crate::inventory::model::{ScanCommand, ScanEvent, ScanFile, ScanState};
use crate::metadata::reader::MetadataReader;

/// Pending `start` commands buffered ahead of the worker.
const COMMAND_CAPACITY: usize = 4;

/// Handle to a running scan worker.
pub struct ScanWorker {
    commands: mpsc::Sender<ScanCommand>,
    events: mpsc::Receiver<ScanEvent>,
    state: watch::Receiver<ScanState>,
    task: JoinHandle<()>,
}

impl ScanWorker {
    /// Spawn a worker on the current tokio runtime. It starts `Idle`.
    pub fn spawn(reader: Arc<dyn MetadataReader>, config: ScanConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(config.channel_capacity.max(1));
        let (state_tx, state_rx) = watch::channel(ScanState::Idle);

        let task = tokio::spawn(run(reader, config, command_rx, event_tx, state_tx));

        Self {
            commands: command_tx,
            events: event_rx,
            state: state_rx,
            task,
        }
    }

    /// Queue a batch. An empty list is rejected before anything is sent.
    pub async fn start(&self, files: Vec<ScanFile>) -> Result<()> {
        if files.is_empty() {
            return Err(InventoryError::EmptyBatch);
        }

        self.commands
            .send(ScanCommand::Start { files })
            .await
            .map_err(|_| InventoryError::WorkerGone)
    }

    /// Next event in emission order; `None` once the worker has stopped.
    pub async fn next_event(&mut self) -> Option<ScanEvent> {
        self.events.recv().await
    }

    pub fn state(&self) -> ScanState {
        *self.state.borrow()
    }

    /// Wait until the worker reports `target`.
    pub async fn wait_for_state(&mut self, target: ScanState) -> Result<()> {
        self.state
            .wait_for(|s| *s == target)
            .await
            .map(|_| ())
            .map_err(|_| InventoryError::WorkerGone)
    }

    /// Stop the worker. A batch still in flight is abandoned.
    pub async fn shutdown(self) {
        let Self {
            commands,
            events,
            task,
            ..
        } = self;

        drop(commands);
        drop(events);

        if let Err(e) = task.await {
            warn!("Scan worker ended abnormally: {}", e);
        }
    }
}

/// Run one batch on a fresh worker and collect every event up to and
/// including `complete`.
pub async fn run_batch(
    reader: Arc<dyn MetadataReader>,
    files: Vec<ScanFile>,
    config: ScanConfig,
) -> Result<Vec<ScanEvent>> {
    let mut worker = ScanWorker::spawn(reader, config);
    worker.start(files).await?;

    let mut events = Vec::new();
    let mut completed = false;

    while let Some(event) = worker.next_event().await {
        completed = matches!(event, ScanEvent::Complete { .. });
        events.push(event);
        if completed {
            break;
        }
    }

    worker.shutdown().await;

    if completed {
        Ok(events)
    } else {
        Err(InventoryError::WorkerGone)
    }
}

async fn run(
    reader: Arc<dyn MetadataReader>,
    config: ScanConfig,
    mut commands: mpsc::Receiver<ScanCommand>,
    events: mpsc::Sender<ScanEvent>,
    state: watch::Sender<ScanState>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            ScanCommand::Start { files } => {
                if files.is_empty() {
                    warn!("Ignoring start command with an empty file list");
                    continue;
                }

                state.send_replace(ScanState::Running);

                if scan_batch(reader.as_ref(), &config, &files, &events)
                    .await
                    .is_err()
                {
                    debug!("Event receiver dropped; stopping scan worker");
                    return;
                }

                state.send_replace(ScanState::Complete);
            }
        }
    }
}

async fn scan_batch(
    reader: &dyn MetadataReader,
    config: &ScanConfig,
    files: &[ScanFile],
    events: &mpsc::Sender<ScanEvent>,
) -> Result<()> {
    let total = files.len();
    info!("Starting inventory of {} files", total);

    for (index, file) in files.iter().enumerate() {
        let result = inventory_file(reader, file, config).await;
        debug!(file = %file.name, status = %result.status, "classified");

        send(events, ScanEvent::Result(result)).await?;
        send(
            events,
            ScanEvent::Progress {
                current: index + 1,
                total,
                filename: file.name.clone(),
            },
        )
        .await?;
    }

    send(events, ScanEvent::Complete { total_files: total }).await?;
    info!("Inventory complete: {} files", total);

    Ok(())
}

async fn send(events: &mpsc::Sender<ScanEvent>, event: ScanEvent) -> Result<()> {
    events
        .send(event)
        .await
        .map_err(|_| InventoryError::WorkerGone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReadError;
    use crate::inventory::model::InventoryStatus;
    use crate::metadata::tree::TagNode;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Reader backed by an in-memory map; unknown paths fail to read.
    #[derive(Default)]
    struct MapReader {
        trees: HashMap<PathBuf, serde_json::Value>,
    }

    impl MapReader {
        fn with(mut self, path: &str, tree: serde_json::Value) -> Self {
            self.trees.insert(PathBuf::from(path), tree);
            self
        }
    }

    #[async_trait]
    impl MetadataReader for MapReader {
        async fn read(&self, file: &ScanFile) -> std::result::Result<Option<TagNode>, ReadError> {
            match self.trees.get(&file.path) {
                Some(v) => Ok(TagNode::from_json(v.clone())),
                None => Err(ReadError::Io {
                    path: file.path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                }),
            }
        }
    }

    fn files(paths: &[&str]) -> Vec<ScanFile> {
        paths.iter().map(|p| ScanFile::new(*p, "batch")).collect()
    }

    fn golden(number: &str) -> serde_json::Value {
        json!({
            "Make": { "value": "Epson" },
            "DocumentNo": {
                "attributes": { "path": "xmp:DocumentNo" },
                "value": number
            }
        })
    }

    #[tokio::test]
    async fn emits_result_then_progress_per_file_then_complete() {
        let reader = MapReader::default()
            .with("/a.jpg", golden("101"))
            .with("/b.jpg", json!({ "Make": "x", "Model": "y" }));

        let events = run_batch(
            Arc::new(reader),
            files(&["/a.jpg", "/b.jpg"]),
            ScanConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(events.len(), 5);

        let ScanEvent::Result(first) = &events[0] else {
            panic!("expected result, got {:?}", events[0]);
        };
        assert_eq!(first.status, InventoryStatus::Valid);
        assert_eq!(first.id.as_deref(), Some("101"));

        assert_eq!(
            events[1],
            ScanEvent::Progress {
                current: 1,
                total: 2,
                filename: "a.jpg".into()
            }
        );

        let ScanEvent::Result(second) = &events[2] else {
            panic!("expected result");
        };
        assert_eq!(second.status, InventoryStatus::NoMatch);

        assert_eq!(events[4], ScanEvent::Complete { total_files: 2 });
    }

    #[tokio::test]
    async fn every_file_failing_still_completes() {
        let paths = ["/1.jpg", "/2.jpg", "/3.jpg", "/4.jpg"];
        let events = run_batch(
            Arc::new(MapReader::default()),
            files(&paths),
            ScanConfig::default(),
        )
        .await
        .unwrap();

        let progress = events
            .iter()
            .filter(|e| matches!(e, ScanEvent::Progress { .. }))
            .count();
        let completes: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, ScanEvent::Complete { .. }))
            .collect();

        assert_eq!(progress, paths.len());
        assert_eq!(completes, vec![&ScanEvent::Complete { total_files: 4 }]);
        assert!(matches!(events.last(), Some(ScanEvent::Complete { .. })));

        for event in &events {
            if let ScanEvent::Result(r) = event {
                assert_eq!(r.status, InventoryStatus::Stripped);
                assert_eq!(r.source, "Read Error");
                assert_eq!(r.folder, "unknown");
            }
        }
    }

    #[tokio::test]
    async fn results_follow_input_order() {
        let paths = ["/c.jpg", "/a.jpg", "/b.jpg"];
        let reader = paths
            .iter()
            .enumerate()
            .fold(MapReader::default(), |r, (i, p)| {
                r.with(p, golden(&format!("{}", 500 + i)))
            });

        let events = run_batch(Arc::new(reader), files(&paths), ScanConfig::default())
            .await
            .unwrap();

        let names: Vec<String> = events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Result(r) => Some(r.file_name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["c.jpg", "a.jpg", "b.jpg"]);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let err = run_batch(
            Arc::new(MapReader::default()),
            Vec::new(),
            ScanConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, InventoryError::EmptyBatch));
    }

    #[tokio::test]
    async fn worker_accepts_a_second_batch() {
        let reader = MapReader::default().with("/a.jpg", golden("7"));
        let mut worker = ScanWorker::spawn(Arc::new(reader), ScanConfig::default());
        assert_eq!(worker.state(), ScanState::Idle);

        for _ in 0..2 {
            worker.start(files(&["/a.jpg"])).await.unwrap();
            loop {
                let event = worker.next_event().await.expect("worker alive");
                if matches!(event, ScanEvent::Complete { total_files: 1 }) {
                    break;
                }
            }
            worker.wait_for_state(ScanState::Complete).await.unwrap();
        }

        worker.shutdown().await;
    }

    #[tokio::test]
    async fn small_channel_applies_backpressure_without_loss() {
        let paths: Vec<String> = (0..20).map(|i| format!("/{i}.jpg")).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let config = ScanConfig {
            channel_capacity: 1,
            ..ScanConfig::default()
        };

        let events = run_batch(Arc::new(MapReader::default()), files(&refs), config)
            .await
            .unwrap();

        assert_eq!(events.len(), 20 * 2 + 1);
    }
}
