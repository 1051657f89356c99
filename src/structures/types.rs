//! Structure kinds known to the marker layer.

use serde::{Deserialize, Serialize};

use crate::world::GameVersion;

/// Categories of generated structures that can be located and marked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    BastionRemnant,
    BuriedTreasure,
    DesertPyramid,
    EndCity,
    NetherFortress,
    Igloo,
    JunglePyramid,
    WoodlandMansion,
    Mineshaft,
    NetherFossil,
    OceanMonument,
    OceanRuin,
    PillagerOutpost,
    RuinedPortal,
    Shipwreck,
    Stronghold,
    SwampHut,
    Village,
}

impl StructureKind {
    /// Name the host's structure registry uses for this kind
    pub fn registry_name(&self) -> &'static str {
        match self {
            StructureKind::BastionRemnant => "bastion_remnant",
            StructureKind::BuriedTreasure => "buried_treasure",
            StructureKind::DesertPyramid => "desert_pyramid",
            StructureKind::EndCity => "endcity",
            StructureKind::NetherFortress => "fortress",
            StructureKind::Igloo => "igloo",
            StructureKind::JunglePyramid => "jungle_pyramid",
            StructureKind::WoodlandMansion => "mansion",
            StructureKind::Mineshaft => "mineshaft",
            StructureKind::NetherFossil => "nether_fossil",
            StructureKind::OceanMonument => "monument",
            StructureKind::OceanRuin => "ocean_ruin",
            StructureKind::PillagerOutpost => "pillager_outpost",
            StructureKind::RuinedPortal => "ruined_portal",
            StructureKind::Shipwreck => "shipwreck",
            StructureKind::Stronghold => "stronghold",
            StructureKind::SwampHut => "swamp_hut",
            StructureKind::Village => "village",
        }
    }

    /// Identifier used in config keys, icon names and marker ids.
    ///
    /// Always lowercase with no underscores, e.g. `junglepyramid`.
    pub fn id(&self) -> String {
        self.registry_name().to_lowercase().replace('_', "")
    }

    /// Label shown on the map unless overridden in config
    pub fn default_label(&self) -> &'static str {
        match self {
            StructureKind::BastionRemnant => "Bastion Remnant",
            StructureKind::BuriedTreasure => "Buried Treasure",
            StructureKind::DesertPyramid => "Desert Pyramid",
            StructureKind::EndCity => "End City",
            StructureKind::NetherFortress => "Nether Fortress",
            StructureKind::Igloo => "Igloo",
            StructureKind::JunglePyramid => "Jungle Pyramid",
            StructureKind::WoodlandMansion => "Woodland Mansion",
            StructureKind::Mineshaft => "Mineshaft",
            StructureKind::NetherFossil => "Nether Fossil",
            StructureKind::OceanMonument => "Ocean Monument",
            StructureKind::OceanRuin => "Ocean Ruins",
            StructureKind::PillagerOutpost => "Pillager Outpost",
            StructureKind::RuinedPortal => "Ruined Portal",
            StructureKind::Shipwreck => "Shipwreck",
            StructureKind::Stronghold => "Stronghold",
            StructureKind::SwampHut => "Swamp Hut",
            StructureKind::Village => "Village",
        }
    }

    /// First platform version whose structure registry has this kind
    pub fn introduced_in(&self) -> GameVersion {
        match self {
            StructureKind::PillagerOutpost => GameVersion::new(1, 14, 0),
            StructureKind::BastionRemnant
            | StructureKind::NetherFossil
            | StructureKind::RuinedPortal => GameVersion::new(1, 16, 0),
            _ => GameVersion::new(1, 13, 0),
        }
    }

    /// Look a kind up by its id or registry name
    pub fn parse(s: &str) -> Option<Self> {
        let id = s.trim().to_lowercase().replace(['_', '-', ' '], "");
        Self::all().iter().copied().find(|kind| kind.id() == id)
    }

    /// Key of the icon registered for this kind on the web-map
    pub fn icon_key(&self) -> String {
        format!("structures.{}", self.id())
    }

    /// All structure kinds
    pub fn all() -> &'static [StructureKind] {
        &[
            StructureKind::BastionRemnant,
            StructureKind::BuriedTreasure,
            StructureKind::DesertPyramid,
            StructureKind::EndCity,
            StructureKind::NetherFortress,
            StructureKind::Igloo,
            StructureKind::JunglePyramid,
            StructureKind::WoodlandMansion,
            StructureKind::Mineshaft,
            StructureKind::NetherFossil,
            StructureKind::OceanMonument,
            StructureKind::OceanRuin,
            StructureKind::PillagerOutpost,
            StructureKind::RuinedPortal,
            StructureKind::Shipwreck,
            StructureKind::Stronghold,
            StructureKind::SwampHut,
            StructureKind::Village,
        ]
    }
}

impl std::fmt::Display for StructureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.default_label())
    }
}
