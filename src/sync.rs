//! Per-chunk structure search and marker upsert.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::structures::{BiomeTable, StructureKind};
use crate::webmap::{MarkerApi, MarkerSet, MarkerSpec};
use crate::world::{Biome, BlockPos, Chunk, SCAN_LEVEL, SearchError};

/// Search radius handed to the host: one region, the smallest it accepts
pub const SEARCH_RADIUS: u32 = 1;

/// Marker key of the form `kindId,x,z`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId {
    pub kind: StructureKind,
    pub x: i32,
    pub z: i32,
}

impl MarkerId {
    pub fn new(kind: StructureKind, x: i32, z: i32) -> Self {
        Self { kind, x, z }
    }

    /// Structure kind named by the leading component of a marker id
    pub fn kind_of(marker_id: &str) -> Option<StructureKind> {
        let prefix = marker_id.split(',').next()?;
        StructureKind::all().iter().copied().find(|k| k.id() == prefix)
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.kind.id(), self.x, self.z)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid marker id {0:?}, expected kindId,x,z")]
pub struct MarkerIdError(pub String);

impl FromStr for MarkerId {
    type Err = MarkerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MarkerIdError(s.to_string());
        let mut parts = s.split(',');
        let kind = Self::kind_of(s).ok_or_else(err)?;
        parts.next();
        let x = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        let z = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self::new(kind, x, z))
    }
}

/// Outcome of syncing one chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub world: String,
    pub chunk: (i32, i32),
    pub biome: Option<Biome>,
    /// Structure searches performed
    pub searched: usize,
    /// Ids of markers created or updated
    pub placed: Vec<String>,
}

/// Everything a sync task reads, built once when the add-on is enabled
pub struct SyncContext {
    pub table: Arc<BiomeTable>,
    pub settings: Arc<Settings>,
    pub api: Arc<dyn MarkerApi>,
    pub layer: Arc<dyn MarkerSet>,
}

impl SyncContext {
    /// Search around `chunk` for every enabled kind its biome allows and
    /// upsert a marker for each structure found.
    ///
    /// The first search failure aborts the whole chunk; markers placed
    /// before it stay.
    pub fn sync_chunk(&self, chunk: &Chunk) -> Result<SyncReport, SearchError> {
        let world = chunk.world.as_ref();
        let origin = chunk.origin();
        let mut report = SyncReport {
            world: world.name().to_string(),
            chunk: (chunk.x, chunk.z),
            biome: None,
            searched: 0,
            placed: Vec::new(),
        };

        let Some(biome) = world.biome_at(origin) else {
            debug!("No biome at {} in {}", origin, chunk);
            return Ok(report);
        };
        report.biome = Some(biome);

        let Some(kinds) = self.table.eligible(biome) else {
            debug!("Biome {} has no table entry, skipping {}", biome, chunk);
            return Ok(report);
        };

        for kind in kinds.iter().copied().filter(|k| self.settings.is_enabled(*k)) {
            report.searched += 1;
            let found = world.locate_nearest_structure(origin, kind, SEARCH_RADIUS, false)?;
            if let Some(pos) = found {
                if let Some(id) = self.place_marker(world.name(), kind, pos) {
                    report.placed.push(id);
                }
            }
        }

        Ok(report)
    }

    fn place_marker(&self, world: &str, kind: StructureKind, pos: BlockPos) -> Option<String> {
        let id = MarkerId::new(kind, pos.x, pos.z).to_string();
        let marker = MarkerSpec {
            id: id.clone(),
            label: self.settings.marker_label(kind, pos.x, pos.z),
            world: world.to_string(),
            x: pos.x,
            y: SCAN_LEVEL,
            z: pos.z,
            icon: self.api.marker_icon(&kind.icon_key()),
            persistent: true,
        };

        match self.layer.create_marker(marker) {
            Ok(()) => {
                debug!("Marked {} at ([{}], {}, {})", kind.id(), world, pos.x, pos.z);
                Some(id)
            }
            Err(e) => {
                warn!("Could not place marker {}: {}", id, e);
                None
            }
        }
    }
}
