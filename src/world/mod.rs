//! Host world interface: biomes, chunks and structure search.
//!
//! The game server owns chunk generation and the structure index. This
//! module only describes what the marker layer asks of it:
//! - [`World`] - biome lookup and bounded nearest-structure search
//! - [`Chunk`] - a generated chunk and the world it belongs to
//! - [`PlatformCapabilities`] - which biomes and structure kinds exist
//! - [`FixedWorld`] - an in-memory world for replays and tests

mod biome;
mod fixed;
mod platform;

pub use biome::Biome;
pub use fixed::{ChunkBiome, FixedWorld, PlacedStructure};
pub use platform::{GameVersion, PlatformCapabilities, VersionError};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::structures::StructureKind;

/// Vertical level at which chunks are sampled and markers are placed
pub const SCAN_LEVEL: i32 = 64;

/// Integer block coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk column containing this block
    pub fn chunk(&self) -> (i32, i32) {
        (self.x >> 4, self.z >> 4)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

/// Failures the host may raise while searching for a structure.
///
/// All of them are transient: the caller drops the current chunk and moves on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("structure cache was modified during the search")]
    ConcurrentModification,
    #[error("host returned no result")]
    MissingResult,
    #[error("host error: {0}")]
    Host(String),
}

/// A loaded game world.
///
/// Implementations are provided by the host binding and must be callable
/// from the task queue's consumer.
pub trait World: Send + Sync {
    /// Name the web-map knows this world by
    fn name(&self) -> &str;

    /// Whether structure generation is active in this world
    fn can_generate_structures(&self) -> bool;

    /// Biome at a block, if the host can resolve it
    fn biome_at(&self, pos: BlockPos) -> Option<Biome>;

    /// Nearest structure of `kind` around `origin`.
    ///
    /// `radius` is in the host's search units. With `find_unexplored` unset
    /// the host must not generate anything while searching.
    fn locate_nearest_structure(
        &self,
        origin: BlockPos,
        kind: StructureKind,
        radius: u32,
        find_unexplored: bool,
    ) -> Result<Option<BlockPos>, SearchError>;
}

/// A chunk column together with its world
#[derive(Clone)]
pub struct Chunk {
    pub world: Arc<dyn World>,
    pub x: i32,
    pub z: i32,
}

impl Chunk {
    pub fn new(world: Arc<dyn World>, x: i32, z: i32) -> Self {
        Self { world, x, z }
    }

    /// Point the chunk is sampled at: its north-west corner at [`SCAN_LEVEL`]
    pub fn origin(&self) -> BlockPos {
        BlockPos::new(self.x << 4, SCAN_LEVEL, self.z << 4)
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("world", &self.world.name())
            .field("x", &self.x)
            .field("z", &self.z)
            .finish()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] chunk {}, {}", self.world.name(), self.x, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_origin() {
        let world: Arc<dyn World> = Arc::new(FixedWorld::new("world"));
        assert_eq!(Chunk::new(world.clone(), 0, 0).origin(), BlockPos::new(0, 64, 0));
        assert_eq!(Chunk::new(world.clone(), 2, -3).origin(), BlockPos::new(32, 64, -48));
        assert_eq!(Chunk::new(world, -1, 1).origin(), BlockPos::new(-16, 64, 16));
    }

    #[test]
    fn test_block_chunk() {
        assert_eq!(BlockPos::new(12, 64, -40).chunk(), (0, -3));
        assert_eq!(BlockPos::new(-1, 0, 15).chunk(), (-1, 0));
    }
}
