//! Maps a (temperature, humidity, light-or-depth) reading onto a catalog area.
//!
//! Land readings go through two banded axes and a 9×9 table; a humidity of
//! exactly 100 switches to the sea table where the third value is depth.
//! `(0, 50, _)` is the neutral reading and wins over every table cell.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::area::{Area, AreaCatalog, DepthBand, SeaSide};

pub const NEUTRAL_TEMPERATURE: i32 = 0;
pub const NEUTRAL_HUMIDITY: i32 = 50;
pub const SEA_HUMIDITY: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentReading {
    pub temperature: i32,
    pub humidity: i32,
    /// Light level on land, water depth when `humidity == 100`.
    #[serde(alias = "depth")]
    pub light: i32,
}

impl EnvironmentReading {
    pub const NEUTRAL: EnvironmentReading = EnvironmentReading {
        temperature: NEUTRAL_TEMPERATURE,
        humidity: NEUTRAL_HUMIDITY,
        light: 50,
    };

    pub fn new(temperature: i32, humidity: i32, light: i32) -> Self {
        Self {
            temperature,
            humidity,
            light,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.temperature == NEUTRAL_TEMPERATURE && self.humidity == NEUTRAL_HUMIDITY
    }

    pub fn is_sea(&self) -> bool {
        self.humidity == SEA_HUMIDITY
    }
}

impl Default for EnvironmentReading {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Temperature rows, hottest first. Inclusive `(low, high)` pairs.
const TEMPERATURE_BANDS: [(i32, i32); 9] = [
    (999, 999),
    (40, 45),
    (35, 35),
    (5, 30),
    (0, 0),
    (-30, -5),
    (-35, -35),
    (-45, -40),
    (-273, -273),
];

/// Humidity columns, driest first. Inclusive `(low, high)` pairs.
const HUMIDITY_BANDS: [(i32, i32); 9] = [
    (0, 0),
    (5, 10),
    (15, 20),
    (25, 45),
    (50, 50),
    (55, 75),
    (80, 85),
    (90, 95),
    (99, 99),
];

// `None` marks the neutral centre of the table.
const LAND_TABLE: [[Option<&str>; 9]; 9] = [
    [
        Some("V1"),
        Some("V2"),
        Some("V3"),
        Some("V3"),
        Some("V3"),
        Some("E3"),
        Some("E3"),
        Some("E2"),
        Some("E1"),
    ],
    [
        Some("V2"),
        Some("V2"),
        Some("V3"),
        Some("V3"),
        Some("V3"),
        Some("E3"),
        Some("E3"),
        Some("E2"),
        Some("E2"),
    ],
    [
        Some("V3"),
        Some("V3"),
        Some("V3"),
        Some("V3"),
        Some("V3"),
        Some("E3"),
        Some("E3"),
        Some("E3"),
        Some("E3"),
    ],
    [
        Some("V3"),
        Some("V3"),
        Some("V3"),
        Some("V4"),
        Some("V4"),
        Some("E4"),
        Some("E4"),
        Some("E3"),
        Some("E3"),
    ],
    [
        Some("T3"),
        Some("T3"),
        Some("T3"),
        Some("T4"),
        None,
        Some("E4"),
        Some("E4"),
        Some("E3"),
        Some("E3"),
    ],
    [
        Some("T3"),
        Some("T3"),
        Some("T3"),
        Some("T4"),
        Some("S4"),
        Some("S4"),
        Some("S3"),
        Some("S3"),
        Some("S3"),
    ],
    [
        Some("T3"),
        Some("T3"),
        Some("T3"),
        Some("T4"),
        Some("S4"),
        Some("S4"),
        Some("S3"),
        Some("S3"),
        Some("S3"),
    ],
    [
        Some("T2"),
        Some("T2"),
        Some("T3"),
        Some("T3"),
        Some("S3"),
        Some("S3"),
        Some("S3"),
        Some("S2"),
        Some("S2"),
    ],
    [
        Some("T1"),
        Some("T2"),
        Some("T3"),
        Some("T3"),
        Some("S3"),
        Some("S3"),
        Some("S3"),
        Some("S2"),
        Some("S1"),
    ],
];

fn band_index(bands: &[(i32, i32)], value: i32) -> Option<usize> {
    bands
        .iter()
        .position(|&(low, high)| (low..=high).contains(&value))
}

fn sea_area_id(side: SeaSide, depth: DepthBand) -> &'static str {
    match (side, depth) {
        (SeaSide::South, DepthBand::Shallow) => "SS_SHALLOW",
        (SeaSide::South, DepthBand::Mid) => "SS_MID",
        (SeaSide::South, DepthBand::Deep) => "SS_DEEP",
        (SeaSide::North, DepthBand::Shallow) => "SN_SHALLOW",
        (SeaSide::North, DepthBand::Mid) => "SN_MID",
        (SeaSide::North, DepthBand::Deep) => "SN_DEEP",
    }
}

/// Table lookup only; does not consult the catalog.
fn table_lookup(temperature: i32, humidity: i32, light_or_depth: i32) -> Option<&'static str> {
    if temperature == NEUTRAL_TEMPERATURE && humidity == NEUTRAL_HUMIDITY {
        return None;
    }

    if humidity == SEA_HUMIDITY {
        let side = SeaSide::from_temperature(temperature);
        return Some(sea_area_id(side, DepthBand::from_depth(light_or_depth)));
    }

    let row = band_index(&TEMPERATURE_BANDS, temperature)?;
    let column = band_index(&HUMIDITY_BANDS, humidity)?;
    LAND_TABLE[row][column]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Neutral,
    Area(&'a Area),
}

impl<'a> Resolution<'a> {
    pub fn area(self) -> Option<&'a Area> {
        match self {
            Resolution::Neutral => None,
            Resolution::Area(area) => Some(area),
        }
    }

    pub fn id(self) -> Option<&'static str> {
        self.area().map(|area| area.id)
    }

    pub fn is_neutral(self) -> bool {
        matches!(self, Resolution::Neutral)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AreaResolver<'a> {
    catalog: &'a AreaCatalog,
}

impl<'a> AreaResolver<'a> {
    pub fn new(catalog: &'a AreaCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a AreaCatalog {
        self.catalog
    }

    pub fn resolve(&self, temperature: i32, humidity: i32, light_or_depth: i32) -> Resolution<'a> {
        let Some(id) = table_lookup(temperature, humidity, light_or_depth) else {
            return Resolution::Neutral;
        };
        match self.catalog.get(id) {
            Some(area) => Resolution::Area(area),
            None => {
                warn!(
                    area_id = id,
                    temperature,
                    humidity,
                    light_or_depth,
                    "resolved area id missing from catalog; treating as neutral"
                );
                Resolution::Neutral
            }
        }
    }

    pub fn resolve_reading(&self, reading: &EnvironmentReading) -> Resolution<'a> {
        self.resolve(reading.temperature, reading.humidity, reading.light)
    }
}
