//! Biome to eligible-structure table.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::StructureKind;
use super::StructureKind as S;
use crate::world::{Biome, PlatformCapabilities};

const OCEANIC: &[StructureKind] = &[S::BuriedTreasure, S::Mineshaft, S::OceanRuin, S::Shipwreck, S::Stronghold];
const DEEP_OCEANIC: &[StructureKind] = &[
    S::BuriedTreasure,
    S::Mineshaft,
    S::OceanMonument,
    S::OceanRuin,
    S::Shipwreck,
    S::Stronghold,
];
const UNDERGROUND: &[StructureKind] = &[S::Mineshaft, S::Stronghold];
const SETTLED: &[StructureKind] = &[S::Mineshaft, S::Stronghold, S::Village];
const ARID: &[StructureKind] = &[S::DesertPyramid, S::Mineshaft, S::Stronghold, S::Village];
const SNOWY: &[StructureKind] = &[S::Igloo, S::Mineshaft, S::Stronghold, S::Village];
const JUNGLE: &[StructureKind] = &[S::JunglePyramid, S::Mineshaft, S::Stronghold];
const MARSH: &[StructureKind] = &[S::Mineshaft, S::Stronghold, S::SwampHut];
const ROOFED: &[StructureKind] = &[S::Mineshaft, S::Stronghold, S::WoodlandMansion];
const NETHER: &[StructureKind] = &[S::NetherFortress];
const END: &[StructureKind] = &[S::EndCity];
const BARREN: &[StructureKind] = &[];

/// Structures each biome can hold before version-gated additions
const BASE: &[(Biome, &[StructureKind])] = &[
    (Biome::Ocean, OCEANIC),
    (Biome::Plains, SETTLED),
    (Biome::Desert, ARID),
    (Biome::Mountains, UNDERGROUND),
    (Biome::Forest, UNDERGROUND),
    (Biome::Taiga, SETTLED),
    (Biome::Swamp, MARSH),
    (Biome::River, UNDERGROUND),
    (Biome::Nether, NETHER),
    (Biome::NetherWastes, NETHER),
    (Biome::TheEnd, END),
    (Biome::FrozenOcean, OCEANIC),
    (Biome::FrozenRiver, UNDERGROUND),
    (Biome::SnowyTundra, SNOWY),
    (Biome::SnowyMountains, SETTLED),
    (Biome::MushroomFields, UNDERGROUND),
    (Biome::MushroomFieldShore, UNDERGROUND),
    (Biome::Beach, OCEANIC),
    (Biome::DesertHills, ARID),
    (Biome::WoodedHills, UNDERGROUND),
    (Biome::TaigaHills, SETTLED),
    (Biome::MountainEdge, UNDERGROUND),
    (Biome::Jungle, JUNGLE),
    (Biome::JungleHills, JUNGLE),
    (Biome::JungleEdge, JUNGLE),
    (Biome::DeepOcean, DEEP_OCEANIC),
    (Biome::StoneShore, OCEANIC),
    (Biome::SnowyBeach, OCEANIC),
    (Biome::BirchForest, UNDERGROUND),
    (Biome::BirchForestHills, UNDERGROUND),
    (Biome::DarkForest, ROOFED),
    (Biome::SnowyTaiga, SNOWY),
    (Biome::SnowyTaigaHills, SETTLED),
    (Biome::GiantTreeTaiga, UNDERGROUND),
    (Biome::GiantTreeTaigaHills, UNDERGROUND),
    (Biome::WoodedMountains, UNDERGROUND),
    (Biome::Savanna, SETTLED),
    (Biome::SavannaPlateau, SETTLED),
    (Biome::Badlands, UNDERGROUND),
    (Biome::WoodedBadlandsPlateau, UNDERGROUND),
    (Biome::BadlandsPlateau, UNDERGROUND),
    (Biome::SmallEndIslands, END),
    (Biome::EndMidlands, END),
    (Biome::EndHighlands, END),
    (Biome::EndBarrens, END),
    (Biome::WarmOcean, OCEANIC),
    (Biome::LukewarmOcean, OCEANIC),
    (Biome::ColdOcean, OCEANIC),
    (Biome::DeepWarmOcean, DEEP_OCEANIC),
    (Biome::DeepLukewarmOcean, DEEP_OCEANIC),
    (Biome::DeepColdOcean, DEEP_OCEANIC),
    (Biome::DeepFrozenOcean, DEEP_OCEANIC),
    (Biome::TheVoid, BARREN),
    (Biome::SunflowerPlains, SETTLED),
    (Biome::DesertLakes, ARID),
    (Biome::GravellyMountains, UNDERGROUND),
    (Biome::FlowerForest, UNDERGROUND),
    (Biome::TaigaMountains, SETTLED),
    (Biome::SwampHills, MARSH),
    (Biome::IceSpikes, SETTLED),
    (Biome::ModifiedJungle, JUNGLE),
    (Biome::ModifiedJungleEdge, JUNGLE),
    (Biome::TallBirchForest, UNDERGROUND),
    (Biome::TallBirchHills, UNDERGROUND),
    (Biome::DarkForestHills, ROOFED),
    (Biome::SnowyTaigaMountains, SETTLED),
    (Biome::GiantSpruceTaiga, UNDERGROUND),
    (Biome::GiantSpruceTaigaHills, UNDERGROUND),
    (Biome::ModifiedGravellyMountains, UNDERGROUND),
    (Biome::ShatteredSavanna, SETTLED),
    (Biome::ShatteredSavannaPlateau, SETTLED),
    (Biome::ErodedBadlands, UNDERGROUND),
    (Biome::ModifiedWoodedBadlandsPlateau, UNDERGROUND),
    (Biome::ModifiedBadlandsPlateau, UNDERGROUND),
    (Biome::BambooJungle, JUNGLE),
    (Biome::BambooJungleHills, JUNGLE),
    (Biome::SoulSandValley, NETHER),
    (Biome::CrimsonForest, NETHER),
    (Biome::WarpedForest, NETHER),
    (Biome::BasaltDeltas, NETHER),
];

const PILLAGER_OUTPOST_BIOMES: &[Biome] = &[
    Biome::Plains,
    Biome::Desert,
    Biome::Taiga,
    Biome::SnowyTundra,
    Biome::SnowyMountains,
    Biome::DesertHills,
    Biome::TaigaHills,
    Biome::SnowyTaiga,
    Biome::SnowyTaigaHills,
    Biome::Savanna,
    Biome::SavannaPlateau,
    Biome::SunflowerPlains,
    Biome::DesertLakes,
    Biome::TaigaMountains,
    Biome::IceSpikes,
    Biome::SnowyTaigaMountains,
    Biome::ShatteredSavanna,
    Biome::ShatteredSavannaPlateau,
];

const BASTION_REMNANT_BIOMES: &[Biome] = &[
    Biome::NetherWastes,
    Biome::SoulSandValley,
    Biome::CrimsonForest,
    Biome::WarpedForest,
];

const NETHER_FOSSIL_BIOMES: &[Biome] = &[Biome::SoulSandValley];

/// Which structure kinds can spawn in which biome.
///
/// Built once from the platform's capabilities and never modified after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BiomeTable {
    entries: BTreeMap<Biome, Vec<StructureKind>>,
}

impl BiomeTable {
    pub fn build(caps: &PlatformCapabilities) -> Self {
        let mut entries = BTreeMap::new();

        for kind in StructureKind::all() {
            if !caps.supports_structure(*kind) {
                warn!("{} not supported.", kind.registry_name().to_uppercase());
            }
        }

        for (biome, kinds) in BASE {
            if !caps.supports_biome(*biome) {
                // The single nether biome is gone from 1.16 on; nothing to report.
                if *biome != Biome::Nether {
                    warn!("{} not supported.", biome.key().to_uppercase());
                }
                continue;
            }
            let kinds: Vec<StructureKind> = kinds
                .iter()
                .copied()
                .filter(|k| caps.supports_structure(*k))
                .collect();
            entries.insert(*biome, kinds);
        }

        if caps.supports_biome(Biome::Custom) {
            entries.insert(Biome::Custom, caps.structure_kinds().collect());
        } else {
            warn!("CUSTOM not supported.");
        }

        let mut table = Self { entries };

        if caps.supports_structure(S::PillagerOutpost) {
            table.append(S::PillagerOutpost, PILLAGER_OUTPOST_BIOMES.iter().copied());
        }
        if caps.supports_structure(S::BastionRemnant) {
            table.append(S::BastionRemnant, BASTION_REMNANT_BIOMES.iter().copied());
        }
        if caps.supports_structure(S::NetherFossil) {
            table.append(S::NetherFossil, NETHER_FOSSIL_BIOMES.iter().copied());
        }
        if caps.supports_structure(S::RuinedPortal) {
            let everywhere: Vec<Biome> = table
                .entries
                .keys()
                .copied()
                .filter(|b| *b != Biome::TheEnd)
                .collect();
            table.append(S::RuinedPortal, everywhere);
        }

        debug!("Biome table built with {} biomes", table.len());
        table
    }

    /// Add `kind` to each listed biome that has an entry
    fn append(&mut self, kind: StructureKind, biomes: impl IntoIterator<Item = Biome>) {
        for biome in biomes {
            match self.entries.get_mut(&biome) {
                Some(kinds) if !kinds.contains(&kind) => kinds.push(kind),
                Some(_) => {}
                None => debug!("No table entry for {}, {} not added", biome, kind.id()),
            }
        }
    }

    /// Structure kinds eligible in `biome`, or `None` when the biome has no entry
    pub fn eligible(&self, biome: Biome) -> Option<&[StructureKind]> {
        self.entries.get(&biome).map(Vec::as_slice)
    }

    pub fn contains(&self, biome: Biome) -> bool {
        self.entries.contains_key(&biome)
    }

    /// Biomes where `kind` can appear
    pub fn biomes_with(&self, kind: StructureKind) -> Vec<Biome> {
        self.entries
            .iter()
            .filter(|(_, kinds)| kinds.contains(&kind))
            .map(|(biome, _)| *biome)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Biome, &[StructureKind])> {
        self.entries.iter().map(|(b, k)| (*b, k.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::GameVersion;

    fn latest() -> BiomeTable {
        BiomeTable::build(&PlatformCapabilities::default())
    }

    #[test]
    fn test_plains_on_latest() {
        let table = latest();
        assert_eq!(
            table.eligible(Biome::Plains),
            Some(&[S::Mineshaft, S::Stronghold, S::Village, S::PillagerOutpost, S::RuinedPortal][..])
        );
    }

    #[test]
    fn test_plains_on_1_13() {
        let table = BiomeTable::build(&PlatformCapabilities::for_version(GameVersion::new(1, 13, 2)));
        assert_eq!(
            table.eligible(Biome::Plains),
            Some(&[S::Mineshaft, S::Stronghold, S::Village][..])
        );
        assert!(table.contains(Biome::Nether));
        assert!(!table.contains(Biome::NetherWastes));
        assert!(!table.contains(Biome::BambooJungle));
        assert!(!table.contains(Biome::Custom));
        assert!(table.biomes_with(S::RuinedPortal).is_empty());
    }

    #[test]
    fn test_1_13_omits_later_kinds() {
        let table = BiomeTable::build(&PlatformCapabilities::for_version(GameVersion::new(1, 13, 2)));
        for kind in [S::PillagerOutpost, S::BastionRemnant, S::NetherFossil, S::RuinedPortal] {
            assert!(table.biomes_with(kind).is_empty(), "{} listed on 1.13", kind.id());
        }
        assert!(!table.biomes_with(S::Village).is_empty());
    }

    #[test]
    fn test_nether_biomes_on_latest() {
        let table = latest();
        assert!(!table.contains(Biome::Nether));
        assert_eq!(
            table.eligible(Biome::SoulSandValley),
            Some(&[S::NetherFortress, S::BastionRemnant, S::NetherFossil, S::RuinedPortal][..])
        );
        assert_eq!(
            table.eligible(Biome::BasaltDeltas),
            Some(&[S::NetherFortress, S::RuinedPortal][..])
        );
    }

    #[test]
    fn test_the_end_has_no_ruined_portal() {
        let table = latest();
        assert_eq!(table.eligible(Biome::TheEnd), Some(&[S::EndCity][..]));
        assert_eq!(
            table.eligible(Biome::EndHighlands),
            Some(&[S::EndCity, S::RuinedPortal][..])
        );
    }

    #[test]
    fn test_custom_lists_every_kind_once() {
        let table = latest();
        let custom = table.eligible(Biome::Custom).unwrap();
        assert_eq!(custom.len(), StructureKind::all().len());
        for kind in StructureKind::all() {
            assert_eq!(custom.iter().filter(|k| *k == kind).count(), 1);
        }
    }

    #[test]
    fn test_no_duplicates_anywhere() {
        for (biome, kinds) in latest().iter() {
            let mut seen = kinds.to_vec();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), kinds.len(), "duplicate kind in {biome}");
        }
    }

    #[test]
    fn test_unsupported_kinds_never_listed() {
        let caps = PlatformCapabilities::for_version(GameVersion::new(1, 14, 4));
        let table = BiomeTable::build(&caps);
        for (_, kinds) in table.iter() {
            assert!(kinds.iter().all(|k| caps.supports_structure(*k)));
        }
        assert!(table.eligible(Biome::Taiga).unwrap().contains(&S::PillagerOutpost));
        assert!(table.contains(Biome::BambooJungle));
    }

    #[test]
    fn test_build_is_deterministic() {
        let caps = PlatformCapabilities::default();
        assert_eq!(BiomeTable::build(&caps), BiomeTable::build(&caps));
    }

    #[test]
    fn test_the_void_holds_only_ruined_portal() {
        assert_eq!(latest().eligible(Biome::TheVoid), Some(&[S::RuinedPortal][..]));
    }

    #[test]
    fn test_restricted_capabilities_omit_biomes() {
        let caps = PlatformCapabilities::new([Biome::Plains, Biome::Desert], [S::Village, S::DesertPyramid]);
        let table = BiomeTable::build(&caps);
        assert_eq!(table.len(), 2);
        assert_eq!(table.eligible(Biome::Desert), Some(&[S::DesertPyramid, S::Village][..]));
        assert_eq!(table.eligible(Biome::Ocean), None);
    }
}
