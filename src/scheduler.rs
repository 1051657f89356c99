//! Hand-off between chunk notifications and structure searches.
//!
//! Chunk events only enqueue a [`SyncTask`]. The search itself runs later on
//! the consumer side, outside the host's event dispatch, so it never touches
//! the host's structure cache while the host is iterating it.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::sync::{SyncContext, SyncReport};
use crate::world::{Chunk, SearchError};

/// One pending marker sync for a generated chunk
#[derive(Debug, Clone)]
pub struct SyncTask {
    pub chunk: Chunk,
}

impl SyncTask {
    pub fn new(chunk: Chunk) -> Self {
        Self { chunk }
    }

    /// Run the sync; a search failure drops this chunk with a warning
    pub fn run(&self, ctx: &SyncContext) -> Option<SyncReport> {
        match ctx.sync_chunk(&self.chunk) {
            Ok(report) => {
                debug!(
                    "Synced {}: {} searches, {} markers",
                    self.chunk,
                    report.searched,
                    report.placed.len()
                );
                Some(report)
            }
            Err(e) => {
                warn!("{}", self.skip_message(&e));
                None
            }
        }
    }

    fn skip_message(&self, e: &SearchError) -> String {
        let origin = self.chunk.origin();
        format!(
            "Skipping locate at ([{}], {}, {}) due to {}.",
            self.chunk.world.name(),
            origin.x,
            origin.z,
            e
        )
    }
}

/// Producer side of the task queue, held by the event handler
#[derive(Debug, Clone)]
pub struct TaskSender {
    tx: UnboundedSender<SyncTask>,
}

impl TaskSender {
    /// Enqueue without blocking. Returns false once the consumer is gone.
    pub fn submit(&self, task: SyncTask) -> bool {
        match self.tx.send(task) {
            Ok(()) => true,
            Err(e) => {
                debug!("Task queue closed, dropping sync for {}", e.0.chunk);
                false
            }
        }
    }
}

/// Create a connected sender and receiver
pub fn task_queue() -> (TaskSender, UnboundedReceiver<SyncTask>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TaskSender { tx }, rx)
}

/// Consumer side: runs queued tasks one at a time against a shared context
pub struct SyncWorker {
    ctx: Arc<SyncContext>,
    rx: UnboundedReceiver<SyncTask>,
}

impl SyncWorker {
    pub fn new(ctx: Arc<SyncContext>, rx: UnboundedReceiver<SyncTask>) -> Self {
        Self { ctx, rx }
    }

    /// Run every task queued so far, for hosts that drive work from their own tick
    pub fn process_pending(&mut self) -> Vec<SyncReport> {
        let mut reports = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(task) => reports.extend(task.run(&self.ctx)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        reports
    }

    /// Process tasks as they arrive until every sender is dropped.
    ///
    /// Returns the reports of the chunks synced successfully.
    pub async fn run(mut self) -> Vec<SyncReport> {
        let mut reports = Vec::new();
        while let Some(task) = self.rx.recv().await {
            reports.extend(task.run(&self.ctx));
        }
        info!("Task queue closed after {} synced chunks", reports.len());
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Settings};
    use crate::structures::{BiomeTable, StructureKind};
    use crate::webmap::{MarkerSet, MemoryMarkerApi, MemoryMarkerSet};
    use crate::world::{Biome, FixedWorld, PlatformCapabilities};

    fn worker() -> (TaskSender, SyncWorker, Arc<MemoryMarkerSet>) {
        let caps = PlatformCapabilities::default();
        let layer = Arc::new(MemoryMarkerSet::new("structures", "Structures", true));
        let ctx = Arc::new(SyncContext {
            table: Arc::new(BiomeTable::build(&caps)),
            settings: Arc::new(Settings::resolve(&Config::default(), &caps)),
            api: Arc::new(MemoryMarkerApi::new()),
            layer: layer.clone(),
        });
        let (tx, rx) = task_queue();
        (tx, SyncWorker::new(ctx, rx), layer)
    }

    fn world() -> Arc<FixedWorld> {
        Arc::new(
            FixedWorld::new("world")
                .with_default_biome(Biome::Desert)
                .with_structure(StructureKind::DesertPyramid, 100, 100)
                .with_structure(StructureKind::DesertPyramid, 2000, 2000),
        )
    }

    #[test]
    fn test_nothing_runs_until_processed() {
        let (tx, mut worker, layer) = worker();
        let world = world();

        assert!(tx.submit(SyncTask::new(Chunk::new(world.clone(), 0, 0))));
        assert_eq!(world.search_count(), 0);
        assert!(layer.is_empty());

        let reports = worker.process_pending();
        assert_eq!(reports.len(), 1);
        assert!(layer.marker("desertpyramid,100,100").is_some());
        assert!(worker.process_pending().is_empty());
    }

    #[test]
    fn test_failed_chunk_does_not_affect_others() {
        let (tx, mut worker, layer) = worker();
        let good = world();
        let bad = Arc::new(FixedWorld::new("broken").with_default_biome(Biome::Desert));
        bad.fail_searches_with(Some(SearchError::MissingResult));

        tx.submit(SyncTask::new(Chunk::new(bad.clone(), 0, 0)));
        tx.submit(SyncTask::new(Chunk::new(good.clone(), 125, 125)));

        let reports = worker.process_pending();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].world, "world");
        assert_eq!(bad.search_count(), 1);
        assert_eq!(layer.marker_ids(), vec!["desertpyramid,2000,2000".to_string()]);
    }

    #[test]
    fn test_skip_message_names_world_and_origin() {
        let world = Arc::new(FixedWorld::new("nether").with_default_biome(Biome::Desert));
        let task = SyncTask::new(Chunk::new(world, -2, 3));
        assert_eq!(
            task.skip_message(&SearchError::ConcurrentModification),
            format!("Skipping locate at ([nether], -32, 48) due to {}.", SearchError::ConcurrentModification)
        );
    }

    #[test]
    fn test_failed_search_aborts_chunk_once() {
        let (_, worker, layer) = worker();
        let world = Arc::new(
            FixedWorld::new("world")
                .with_default_biome(Biome::Desert)
                .with_structure(StructureKind::DesertPyramid, 0, 0),
        );
        world.fail_searches_with(Some(SearchError::ConcurrentModification));

        let task = SyncTask::new(Chunk::new(world.clone(), 0, 0));
        assert!(task.run(&worker.ctx).is_none());
        assert_eq!(world.search_count(), 1);
        assert!(layer.is_empty());
    }

    #[test]
    fn test_submit_after_worker_dropped() {
        let (tx, worker, _) = worker();
        drop(worker);
        assert!(!tx.submit(SyncTask::new(Chunk::new(world(), 0, 0))));
    }

    #[tokio::test]
    async fn test_run_drains_until_senders_drop() {
        let (tx, worker, layer) = worker();
        let world = world();

        let handle = tokio::spawn(worker.run());
        tx.submit(SyncTask::new(Chunk::new(world.clone(), 0, 0)));
        tx.submit(SyncTask::new(Chunk::new(world.clone(), 1, 1)));
        drop(tx);

        let reports = handle.await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_run_with_block_on() {
        let (tx, worker, layer) = worker();
        tx.submit(SyncTask::new(Chunk::new(world(), 0, 0)));
        drop(tx);

        let reports = tokio_test::block_on(worker.run());
        assert_eq!(reports.len(), 1);
        assert_eq!(layer.len(), 1);
    }
}
