//! What the running host platform supports.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Biome;
use crate::structures::StructureKind;

/// A `major.minor.patch` game version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid game version {0:?}, expected e.g. \"1.16.5\"")]
pub struct VersionError(pub String);

impl GameVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Newest version the biome table was written against
    pub const LATEST: GameVersion = GameVersion::new(1, 16, 5);
}

impl FromStr for GameVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionError(s.to_string());
        let mut parts = s.trim().split('.');
        let major = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        let minor = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        let patch = match parts.next() {
            Some(p) => p.parse().map_err(|_| err())?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self::new(major, minor, patch))
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Biomes and structure kinds the host knows about.
///
/// Computed once at start-up and consulted when building the biome table
/// and resolving per-kind settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCapabilities {
    pub biomes: BTreeSet<Biome>,
    pub structures: BTreeSet<StructureKind>,
}

impl PlatformCapabilities {
    pub fn new(
        biomes: impl IntoIterator<Item = Biome>,
        structures: impl IntoIterator<Item = StructureKind>,
    ) -> Self {
        Self {
            biomes: biomes.into_iter().collect(),
            structures: structures.into_iter().collect(),
        }
    }

    /// Capabilities of a stock host at `version`
    pub fn for_version(version: GameVersion) -> Self {
        Self::new(
            Biome::all().iter().copied().filter(|b| b.available_in(version)),
            StructureKind::all()
                .iter()
                .copied()
                .filter(|k| k.introduced_in() <= version),
        )
    }

    pub fn supports_biome(&self, biome: Biome) -> bool {
        self.biomes.contains(&biome)
    }

    pub fn supports_structure(&self, kind: StructureKind) -> bool {
        self.structures.contains(&kind)
    }

    /// Supported structure kinds in a stable order
    pub fn structure_kinds(&self) -> impl Iterator<Item = StructureKind> + '_ {
        self.structures.iter().copied()
    }
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self::for_version(GameVersion::LATEST)
    }
}
