//! The structure marker add-on: start-up wiring and the chunk event handler.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{Config, LayerConfig, Settings};
use crate::scheduler::{SyncTask, SyncWorker, TaskSender, task_queue};
use crate::structures::{BiomeTable, StructureKind};
use crate::sync::{SyncContext, SyncReport};
use crate::webmap::{MarkerApi, MarkerSet, WebMapError};
use crate::world::{Chunk, PlatformCapabilities};

/// Marks structures near newly generated chunks on a web-map layer
pub struct StructureMarkers {
    table: Arc<BiomeTable>,
    settings: Arc<Settings>,
    queue: Option<TaskSender>,
    worker: Option<SyncWorker>,
}

impl StructureMarkers {
    /// Build the biome table and settings, then prepare the web-map layer.
    ///
    /// Never fails: without a web-map (or if the layer cannot be created)
    /// the add-on stays loaded but ignores chunk events.
    pub fn enable(
        config: &Config,
        caps: &PlatformCapabilities,
        webmap: Option<Arc<dyn MarkerApi>>,
    ) -> Self {
        let table = Arc::new(BiomeTable::build(caps));
        let settings = Arc::new(Settings::resolve(config, caps));
        let mut plugin = Self {
            table,
            settings,
            queue: None,
            worker: None,
        };

        let Some(api) = webmap else {
            warn!("Web-map not available, structure markers disabled");
            return plugin;
        };

        let layer = match setup_layer(api.as_ref(), &plugin.settings.layer) {
            Ok(layer) => layer,
            Err(e) => {
                warn!("Could not set up marker layer: {}", e);
                return plugin;
            }
        };

        let icons = install_icons(api.as_ref(), caps.structure_kinds(), &plugin.settings.layer.icons);
        let removed = purge_disabled(layer.as_ref(), &plugin.settings.disabled_kinds());
        info!(
            "Structure markers enabled on layer \"{}\" ({} biomes, {} icons, {} stale markers removed)",
            plugin.settings.layer.name,
            plugin.table.len(),
            icons,
            removed
        );

        let ctx = Arc::new(SyncContext {
            table: plugin.table.clone(),
            settings: plugin.settings.clone(),
            api,
            layer,
        });
        let (tx, rx) = task_queue();
        plugin.queue = Some(tx);
        plugin.worker = Some(SyncWorker::new(ctx, rx));
        plugin
    }

    /// Chunk-load notification. Schedules at most one sync task and never
    /// searches inline. Returns whether a task was scheduled.
    pub fn on_chunk_load(&self, chunk: Chunk, is_new: bool) -> bool {
        let Some(queue) = &self.queue else {
            return false;
        };
        if self.settings.scan.new_chunks_only && !is_new {
            return false;
        }
        if !chunk.world.can_generate_structures() {
            debug!("{} has structure generation off, ignoring {}", chunk.world.name(), chunk);
            return false;
        }
        queue.submit(SyncTask::new(chunk))
    }

    /// Shorthand for a freshly generated chunk
    pub fn on_chunk_generated(&self, chunk: Chunk) -> bool {
        self.on_chunk_load(chunk, true)
    }

    /// Run queued tasks on the caller's turn.
    ///
    /// Returns nothing once the worker has been taken with [`Self::take_worker`].
    pub fn process_pending(&mut self) -> Vec<SyncReport> {
        match self.worker.as_mut() {
            Some(worker) => worker.process_pending(),
            None => Vec::new(),
        }
    }

    /// Hand the queue consumer to an async runtime
    pub fn take_worker(&mut self) -> Option<SyncWorker> {
        self.worker.take()
    }

    /// Stop accepting chunk events. A worker running elsewhere finishes the
    /// tasks already queued and then returns.
    pub fn disable(&mut self) {
        if self.queue.take().is_some() {
            info!("Structure markers disabled");
        }
    }

    /// Whether chunk events are being turned into sync tasks
    pub fn is_active(&self) -> bool {
        self.queue.is_some()
    }

    pub fn table(&self) -> &BiomeTable {
        &self.table
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Get or create the marker set and apply the layer options
fn setup_layer(api: &dyn MarkerApi, layer: &LayerConfig) -> Result<Arc<dyn MarkerSet>, WebMapError> {
    let id = layer.name.to_lowercase();
    let set = match api.marker_set(&id) {
        Some(set) => set,
        None => api.create_marker_set(&id, &layer.name, true)?,
    };
    set.set_hide_by_default(layer.hide_by_default);
    set.set_layer_priority(layer.layer_priority);
    if layer.min_zoom > 0 {
        set.set_min_zoom(layer.min_zoom);
    }
    Ok(set)
}

/// Register `<dir>/<id>.png` as icon `structures.<id>` for each kind.
///
/// Kinds without an image file keep whatever icon the web-map has.
fn install_icons(api: &dyn MarkerApi, kinds: impl Iterator<Item = StructureKind>, dir: &Path) -> usize {
    let mut installed = 0;
    for kind in kinds {
        let id = kind.id();
        let path = dir.join(format!("{}.png", id));
        let image = match std::fs::read(&path) {
            Ok(image) => image,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No icon at {}", path.display());
                continue;
            }
            Err(e) => {
                warn!("Could not read icon {}: {}", path.display(), e);
                continue;
            }
        };

        let key = kind.icon_key();
        let result = if api.marker_icon(&key).is_some() {
            api.set_marker_icon_image(&key, &image)
        } else {
            api.create_marker_icon(&key, &id, &image).map(|_| ())
        };
        match result {
            Ok(()) => installed += 1,
            Err(e) => warn!("Could not install icon {}: {}", key, e),
        }
    }
    installed
}

/// Delete markers whose id starts with a disabled kind's id; returns how many were removed
fn purge_disabled(layer: &dyn MarkerSet, disabled: &[StructureKind]) -> usize {
    if disabled.is_empty() {
        return 0;
    }
    let prefixes: Vec<String> = disabled.iter().map(|k| k.id()).collect();
    let mut removed = 0;
    for id in layer.marker_ids() {
        if !prefixes.iter().any(|p| id.starts_with(p.as_str())) {
            continue;
        }
        match layer.delete_marker(&id) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Could not delete marker {}: {}", id, e),
        }
    }
    removed
}
