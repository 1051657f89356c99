//! Generated structures and where they can appear.
//!
//! - [`StructureKind`] - the structure categories the host can locate
//! - [`BiomeTable`] - which kinds are eligible in which biome

mod table;
mod types;

pub use table::BiomeTable;
pub use types::StructureKind;
