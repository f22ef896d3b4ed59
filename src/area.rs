//! Area catalog: the fixed set of habitat zones a reading can resolve to.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::creature::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Volcano,
    Tornado,
    Earthquake,
    Storm,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Volcano,
        Attribute::Tornado,
        Attribute::Earthquake,
        Attribute::Storm,
    ];

    /// Volcano and Storm oppose each other, as do Tornado and Earthquake.
    pub fn opposite(self) -> Attribute {
        match self {
            Attribute::Volcano => Attribute::Storm,
            Attribute::Storm => Attribute::Volcano,
            Attribute::Tornado => Attribute::Earthquake,
            Attribute::Earthquake => Attribute::Tornado,
        }
    }

    /// Growth bucket fed by areas of this attribute.
    pub fn element(self) -> Element {
        match self {
            Attribute::Volcano => Element::Fire,
            Attribute::Tornado => Element::Wind,
            Attribute::Earthquake => Element::Earth,
            Attribute::Storm => Element::Water,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Attribute::Volcano => "ヴォルケーノ",
            Attribute::Tornado => "トルネード",
            Attribute::Earthquake => "アースクエイク",
            Attribute::Storm => "ストーム",
        }
    }

    pub fn display_name_alt(self) -> &'static str {
        match self {
            Attribute::Volcano => "Volcano",
            Attribute::Tornado => "Tornado",
            Attribute::Earthquake => "Earthquake",
            Attribute::Storm => "Storm",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name_alt())
    }
}

pub const NEUTRAL_DISPLAY_NAME: &str = "無属性";
pub const NEUTRAL_DISPLAY_NAME_ALT: &str = "Neutral";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeaSide {
    South,
    North,
}

impl SeaSide {
    /// Non-negative temperatures are the southern sea.
    pub fn from_temperature(temperature: i32) -> Self {
        if temperature >= 0 {
            SeaSide::South
        } else {
            SeaSide::North
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthBand {
    Shallow,
    Mid,
    Deep,
}

impl DepthBand {
    /// Snaps a raw depth to the nearest of 0 / 50 / 100.
    pub fn from_depth(depth: i32) -> Self {
        if depth <= 25 {
            DepthBand::Shallow
        } else if depth <= 75 {
            DepthBand::Mid
        } else {
            DepthBand::Deep
        }
    }

    pub fn depth(self) -> i32 {
        match self {
            DepthBand::Shallow => 0,
            DepthBand::Mid => 50,
            DepthBand::Deep => 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Terrain {
    Land,
    Sea { side: SeaSide, depth: DepthBand },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub id: &'static str,
    pub display_name: &'static str,
    pub display_name_alt: &'static str,
    pub attribute: Attribute,
    pub terrain: Terrain,
}

impl Area {
    pub fn is_sea(&self) -> bool {
        matches!(self.terrain, Terrain::Sea { .. })
    }
}

const fn land(
    id: &'static str,
    display_name: &'static str,
    display_name_alt: &'static str,
    attribute: Attribute,
) -> Area {
    Area {
        id,
        display_name,
        display_name_alt,
        attribute,
        terrain: Terrain::Land,
    }
}

const fn sea(
    id: &'static str,
    display_name: &'static str,
    display_name_alt: &'static str,
    side: SeaSide,
    depth: DepthBand,
) -> Area {
    Area {
        id,
        display_name,
        display_name_alt,
        attribute: Attribute::Storm,
        terrain: Terrain::Sea { side, depth },
    }
}

const STANDARD_AREAS: &[Area] = &[
    land("V1", "火山", "Volcano", Attribute::Volcano),
    land("V2", "砂漠", "Desert", Attribute::Volcano),
    land("V3", "乾燥帯", "Arid Zone", Attribute::Volcano),
    land("V4", "広葉樹林", "Broadleaf Forest", Attribute::Volcano),
    land("T1", "成層圏", "Stratosphere", Attribute::Tornado),
    land("T2", "山岳地帯", "Mountains", Attribute::Tornado),
    land("T3", "高原", "Highlands", Attribute::Tornado),
    land("T4", "針葉樹林", "Conifer Forest", Attribute::Tornado),
    land("E1", "地底", "Underground", Attribute::Earthquake),
    land("E2", "熱帯雨林", "Rainforest", Attribute::Earthquake),
    land("E3", "熱帯", "Tropics", Attribute::Earthquake),
    land("E4", "温帯草原", "Temperate Grassland", Attribute::Earthquake),
    land("S1", "絶対零度", "Absolute Zero", Attribute::Storm),
    land("S2", "極寒地帯", "Polar Region", Attribute::Storm),
    land("S3", "寒帯", "Frigid Zone", Attribute::Storm),
    land("S4", "寒帯草原", "Tundra", Attribute::Storm),
    sea(
        "SS_SHALLOW",
        "南海浅瀬",
        "South Sea Shallows",
        SeaSide::South,
        DepthBand::Shallow,
    ),
    sea(
        "SS_MID",
        "南海水中",
        "South Sea Midwater",
        SeaSide::South,
        DepthBand::Mid,
    ),
    sea(
        "SS_DEEP",
        "南海深海",
        "South Sea Depths",
        SeaSide::South,
        DepthBand::Deep,
    ),
    sea(
        "SN_SHALLOW",
        "北海浅瀬",
        "North Sea Shallows",
        SeaSide::North,
        DepthBand::Shallow,
    ),
    sea(
        "SN_MID",
        "北海水中",
        "North Sea Midwater",
        SeaSide::North,
        DepthBand::Mid,
    ),
    sea(
        "SN_DEEP",
        "北海深海",
        "North Sea Depths",
        SeaSide::North,
        DepthBand::Deep,
    ),
];

/// Immutable id → area registry. Build once and hand out by reference.
#[derive(Debug, Clone)]
pub struct AreaCatalog {
    areas: Vec<Area>,
    index: HashMap<&'static str, usize>,
}

impl AreaCatalog {
    pub fn standard() -> Self {
        Self::from_areas(STANDARD_AREAS.iter().cloned())
    }

    /// The first definition of a repeated id wins.
    pub fn from_areas(areas: impl IntoIterator<Item = Area>) -> Self {
        let mut catalog = Self {
            areas: Vec::new(),
            index: HashMap::new(),
        };
        for area in areas {
            if catalog.index.contains_key(area.id) {
                continue;
            }
            catalog.index.insert(area.id, catalog.areas.len());
            catalog.areas.push(area);
        }
        catalog
    }

    pub fn get(&self, id: &str) -> Option<&Area> {
        self.index.get(id).map(|&slot| &self.areas[slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Area> {
        self.areas.iter()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl Default for AreaCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_has_sixteen_land_and_six_sea_areas() {
        let catalog = AreaCatalog::standard();
        assert_eq!(catalog.len(), 22);
        assert_eq!(catalog.iter().filter(|a| a.is_sea()).count(), 6);
        assert!(catalog
            .iter()
            .filter(|a| a.is_sea())
            .all(|a| a.attribute == Attribute::Storm));
    }

    #[test]
    fn opposites_pair_up() {
        for attribute in Attribute::ALL {
            assert_ne!(attribute.opposite(), attribute);
            assert_eq!(attribute.opposite().opposite(), attribute);
        }
        assert_eq!(Attribute::Tornado.opposite(), Attribute::Earthquake);
        assert_eq!(Attribute::Volcano.opposite(), Attribute::Storm);
    }

    #[test]
    fn duplicate_ids_keep_first_definition() {
        let catalog = AreaCatalog::from_areas([
            land("X", "一", "First", Attribute::Volcano),
            land("X", "二", "Second", Attribute::Storm),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("X").map(|a| a.attribute), Some(Attribute::Volcano));
    }

    #[test]
    fn depth_snaps_at_midpoints() {
        let bands: Vec<_> = [0, 25, 26, 75, 76, 100]
            .into_iter()
            .map(DepthBand::from_depth)
            .collect();
        assert_eq!(
            bands,
            vec![
                DepthBand::Shallow,
                DepthBand::Shallow,
                DepthBand::Mid,
                DepthBand::Mid,
                DepthBand::Deep,
                DepthBand::Deep,
            ]
        );
    }
}
