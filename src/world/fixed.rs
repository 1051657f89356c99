//! In-memory world with a fixed set of biomes and structures.
//!
//! Useful for replaying a captured world snapshot without a running server,
//! and as the host stand-in for tests. Deserializes from JSON:
//!
//! ```json
//! {
//!   "name": "world",
//!   "default_biome": "plains",
//!   "chunk_biomes": [{ "x": 4, "z": 0, "biome": "desert" }],
//!   "structures": [{ "kind": "village", "x": 12, "z": -40 }],
//!   "chunks": [[0, 0], [4, 0]]
//! }
//! ```

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use super::{Biome, BlockPos, SearchError, World};
use crate::structures::StructureKind;

/// Blocks covered by one unit of search radius (one region file)
pub const REGION_SPAN: i64 = 512;

/// Biome override for a single chunk
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkBiome {
    pub x: i32,
    pub z: i32,
    pub biome: Biome,
}

/// A structure start at block coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedStructure {
    pub kind: StructureKind,
    pub x: i32,
    pub z: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FixedWorld {
    pub name: String,
    #[serde(default = "default_generate_structures")]
    pub generate_structures: bool,
    /// Biome of every chunk without an override
    #[serde(default)]
    pub default_biome: Option<Biome>,
    #[serde(default)]
    pub chunk_biomes: Vec<ChunkBiome>,
    #[serde(default)]
    pub structures: Vec<PlacedStructure>,
    /// Chunks of the snapshot, in generation order
    #[serde(default)]
    pub chunks: Vec<(i32, i32)>,
    #[serde(skip)]
    failure: Mutex<Option<SearchError>>,
    #[serde(skip)]
    searches: AtomicUsize,
}

fn default_generate_structures() -> bool {
    true
}

impl FixedWorld {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generate_structures: true,
            default_biome: None,
            chunk_biomes: Vec::new(),
            structures: Vec::new(),
            chunks: Vec::new(),
            failure: Mutex::new(None),
            searches: AtomicUsize::new(0),
        }
    }

    /// Load a snapshot from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let world: Self = serde_json::from_str(&content)?;
        Ok(world)
    }

    pub fn with_default_biome(mut self, biome: Biome) -> Self {
        self.default_biome = Some(biome);
        self
    }

    pub fn with_biome(mut self, x: i32, z: i32, biome: Biome) -> Self {
        self.chunk_biomes.push(ChunkBiome { x, z, biome });
        self
    }

    pub fn with_structure(mut self, kind: StructureKind, x: i32, z: i32) -> Self {
        self.structures.push(PlacedStructure { kind, x, z });
        self
    }

    pub fn with_chunk(mut self, x: i32, z: i32) -> Self {
        self.chunks.push((x, z));
        self
    }

    pub fn without_structure_generation(mut self) -> Self {
        self.generate_structures = false;
        self
    }

    /// Make every following search fail with `error` (or succeed again with `None`)
    pub fn fail_searches_with(&self, error: Option<SearchError>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = error;
    }

    /// Number of structure searches performed so far
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::Relaxed)
    }

    /// Chunks to replay: the explicit list, or every chunk with a biome override
    pub fn snapshot_chunks(&self) -> Vec<(i32, i32)> {
        if self.chunks.is_empty() {
            self.chunk_biomes.iter().map(|c| (c.x, c.z)).collect()
        } else {
            self.chunks.clone()
        }
    }
}

impl World for FixedWorld {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_generate_structures(&self) -> bool {
        self.generate_structures
    }

    fn biome_at(&self, pos: BlockPos) -> Option<Biome> {
        let (cx, cz) = pos.chunk();
        self.chunk_biomes
            .iter()
            .rev()
            .find(|c| c.x == cx && c.z == cz)
            .map(|c| c.biome)
            .or(self.default_biome)
    }

    fn locate_nearest_structure(
        &self,
        origin: BlockPos,
        kind: StructureKind,
        radius: u32,
        _find_unexplored: bool,
    ) -> Result<Option<BlockPos>, SearchError> {
        self.searches.fetch_add(1, Ordering::Relaxed);

        if let Some(error) = self.failure.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            return Err(error);
        }

        let reach = i64::from(radius) * REGION_SPAN;
        let nearest = self
            .structures
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| {
                let dx = i64::from(s.x) - i64::from(origin.x);
                let dz = i64::from(s.z) - i64::from(origin.z);
                (s, dx, dz)
            })
            .filter(|(_, dx, dz)| dx.abs() <= reach && dz.abs() <= reach)
            .min_by_key(|(_, dx, dz)| dx * dx + dz * dz)
            .map(|(s, _, _)| BlockPos::new(s.x, origin.y, s.z));

        Ok(nearest)
    }
}
