//! Structure markers for Minecraft web-maps.
//!
//! Watches newly generated chunks, looks up nearby structures that the
//! chunk's biome can hold, and places a marker for each one on a web-map
//! overlay layer. The game server and the web-map are reached through the
//! [`world::World`] and [`webmap::MarkerApi`] traits.

pub mod config;
pub mod plugin;
pub mod scheduler;
pub mod structures;
pub mod sync;
pub mod webmap;
pub mod world;

pub use config::{Config, ConfigError, Settings};
pub use plugin::StructureMarkers;
pub use structures::{BiomeTable, StructureKind};
pub use sync::{MarkerId, SyncReport};
pub use world::{Biome, Chunk, GameVersion, PlatformCapabilities, World};
