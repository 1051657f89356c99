//! Biome identifiers as reported by the host world.

use serde::{Deserialize, Serialize};

use super::GameVersion;

macro_rules! biomes {
    ($($variant:ident => $key:literal),+ $(,)?) => {
        /// Terrain/climate classification at a world location
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum Biome {
            $($variant),+
        }

        impl Biome {
            /// Namespaced-free key, e.g. `deep_lukewarm_ocean`
            pub fn key(&self) -> &'static str {
                match self {
                    $(Biome::$variant => $key),+
                }
            }

            /// All biomes in declaration order
            pub fn all() -> &'static [Biome] {
                &[$(Biome::$variant),+]
            }
        }
    };
}

biomes! {
    Ocean => "ocean",
    Plains => "plains",
    Desert => "desert",
    Mountains => "mountains",
    Forest => "forest",
    Taiga => "taiga",
    Swamp => "swamp",
    River => "river",
    Nether => "nether",
    NetherWastes => "nether_wastes",
    TheEnd => "the_end",
    FrozenOcean => "frozen_ocean",
    FrozenRiver => "frozen_river",
    SnowyTundra => "snowy_tundra",
    SnowyMountains => "snowy_mountains",
    MushroomFields => "mushroom_fields",
    MushroomFieldShore => "mushroom_field_shore",
    Beach => "beach",
    DesertHills => "desert_hills",
    WoodedHills => "wooded_hills",
    TaigaHills => "taiga_hills",
    MountainEdge => "mountain_edge",
    Jungle => "jungle",
    JungleHills => "jungle_hills",
    JungleEdge => "jungle_edge",
    DeepOcean => "deep_ocean",
    StoneShore => "stone_shore",
    SnowyBeach => "snowy_beach",
    BirchForest => "birch_forest",
    BirchForestHills => "birch_forest_hills",
    DarkForest => "dark_forest",
    SnowyTaiga => "snowy_taiga",
    SnowyTaigaHills => "snowy_taiga_hills",
    GiantTreeTaiga => "giant_tree_taiga",
    GiantTreeTaigaHills => "giant_tree_taiga_hills",
    WoodedMountains => "wooded_mountains",
    Savanna => "savanna",
    SavannaPlateau => "savanna_plateau",
    Badlands => "badlands",
    WoodedBadlandsPlateau => "wooded_badlands_plateau",
    BadlandsPlateau => "badlands_plateau",
    SmallEndIslands => "small_end_islands",
    EndMidlands => "end_midlands",
    EndHighlands => "end_highlands",
    EndBarrens => "end_barrens",
    WarmOcean => "warm_ocean",
    LukewarmOcean => "lukewarm_ocean",
    ColdOcean => "cold_ocean",
    DeepWarmOcean => "deep_warm_ocean",
    DeepLukewarmOcean => "deep_lukewarm_ocean",
    DeepColdOcean => "deep_cold_ocean",
    DeepFrozenOcean => "deep_frozen_ocean",
    TheVoid => "the_void",
    SunflowerPlains => "sunflower_plains",
    DesertLakes => "desert_lakes",
    GravellyMountains => "gravelly_mountains",
    FlowerForest => "flower_forest",
    TaigaMountains => "taiga_mountains",
    SwampHills => "swamp_hills",
    IceSpikes => "ice_spikes",
    ModifiedJungle => "modified_jungle",
    ModifiedJungleEdge => "modified_jungle_edge",
    TallBirchForest => "tall_birch_forest",
    TallBirchHills => "tall_birch_hills",
    DarkForestHills => "dark_forest_hills",
    SnowyTaigaMountains => "snowy_taiga_mountains",
    GiantSpruceTaiga => "giant_spruce_taiga",
    GiantSpruceTaigaHills => "giant_spruce_taiga_hills",
    ModifiedGravellyMountains => "modified_gravelly_mountains",
    ShatteredSavanna => "shattered_savanna",
    ShatteredSavannaPlateau => "shattered_savanna_plateau",
    ErodedBadlands => "eroded_badlands",
    ModifiedWoodedBadlandsPlateau => "modified_wooded_badlands_plateau",
    ModifiedBadlandsPlateau => "modified_badlands_plateau",
    BambooJungle => "bamboo_jungle",
    BambooJungleHills => "bamboo_jungle_hills",
    SoulSandValley => "soul_sand_valley",
    CrimsonForest => "crimson_forest",
    WarpedForest => "warped_forest",
    BasaltDeltas => "basalt_deltas",
    Custom => "custom",
}

impl Biome {
    /// Whether a host running `version` knows this biome.
    ///
    /// The single `nether` biome was split into five biomes in 1.16.
    pub fn available_in(&self, version: GameVersion) -> bool {
        let nether_update = GameVersion::new(1, 16, 0);
        match self {
            Biome::Nether => version < nether_update,
            Biome::NetherWastes
            | Biome::SoulSandValley
            | Biome::CrimsonForest
            | Biome::WarpedForest
            | Biome::BasaltDeltas
            | Biome::Custom => version >= nether_update,
            Biome::BambooJungle | Biome::BambooJungleHills => version >= GameVersion::new(1, 14, 0),
            _ => true,
        }
    }

    /// Parse a biome key, accepting an optional `minecraft:` namespace
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        let key = key.strip_prefix("minecraft:").unwrap_or(&key);
        Self::all().iter().copied().find(|b| b.key() == key)
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(Biome::parse("plains"), Some(Biome::Plains));
        assert_eq!(Biome::parse("minecraft:deep_cold_ocean"), Some(Biome::DeepColdOcean));
        assert_eq!(Biome::parse("PLAINS"), Some(Biome::Plains));
        assert_eq!(Biome::parse("cherry_grove"), None);
    }

    #[test]
    fn test_every_key_parses_back() {
        for biome in Biome::all() {
            assert_eq!(Biome::parse(biome.key()), Some(*biome));
        }
    }

    #[test]
    fn test_nether_split() {
        let old = GameVersion::new(1, 15, 2);
        let new = GameVersion::new(1, 16, 1);
        assert!(Biome::Nether.available_in(old));
        assert!(!Biome::Nether.available_in(new));
        assert!(!Biome::NetherWastes.available_in(old));
        assert!(Biome::NetherWastes.available_in(new));
        assert!(Biome::Plains.available_in(old));
    }

    #[test]
    fn test_bamboo_jungle_gate() {
        assert!(!Biome::BambooJungle.available_in(GameVersion::new(1, 13, 2)));
        assert!(Biome::BambooJungle.available_in(GameVersion::new(1, 14, 0)));
    }
}
