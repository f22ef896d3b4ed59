use std::fmt;

use serde::{Deserialize, Serialize};

use crate::area::Attribute;

pub const GROW_HP_CAP: u32 = 5110;
pub const GROW_ELEMENT_CAP: u32 = 630;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Wind,
    Earth,
    Water,
}

impl Element {
    pub const ALL: [Element; 4] = [Element::Fire, Element::Wind, Element::Earth, Element::Water];

    pub fn key(self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Wind => "wind",
            Element::Earth => "earth",
            Element::Water => "water",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One value per element. Used for stats, growth and tick counters alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementStats {
    #[serde(default)]
    pub fire: u32,
    #[serde(default)]
    pub wind: u32,
    #[serde(default)]
    pub earth: u32,
    #[serde(default)]
    pub water: u32,
}

impl ElementStats {
    pub fn new(fire: u32, wind: u32, earth: u32, water: u32) -> Self {
        Self {
            fire,
            wind,
            earth,
            water,
        }
    }

    pub fn get(&self, element: Element) -> u32 {
        match element {
            Element::Fire => self.fire,
            Element::Wind => self.wind,
            Element::Earth => self.earth,
            Element::Water => self.water,
        }
    }

    pub fn get_mut(&mut self, element: Element) -> &mut u32 {
        match element {
            Element::Fire => &mut self.fire,
            Element::Wind => &mut self.wind,
            Element::Earth => &mut self.earth,
            Element::Water => &mut self.water,
        }
    }
}

/// Per-element throttle counters for elemental growth.
pub type ElementCounters = ElementStats;

/// Exact reading that earns the super-best tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdealEnvironment {
    pub temperature: i32,
    pub humidity: i32,
    /// Only compared when `humidity == 100`.
    #[serde(default)]
    pub water_depth: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub species_id: String,
    pub species_name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub attribute: Option<Attribute>,
    /// Replaces the fixed opposite as the adverse attribute when set.
    #[serde(default)]
    pub weak_attribute: Option<Attribute>,
    #[serde(default)]
    pub ideal_environment: Option<IdealEnvironment>,
    #[serde(default)]
    pub best_area_id: Option<String>,
    pub base_hp: u32,
    #[serde(default)]
    pub base_stats: ElementStats,
    #[serde(default)]
    pub grow_hp: u32,
    #[serde(default)]
    pub grow_stats: ElementStats,
    pub current_hp: u32,
}

impl Creature {
    /// The stock species: a wind dragon that thrives in thin, cold air.
    pub fn windragon() -> Self {
        let base_hp = 400;
        Self {
            species_id: "windragon".to_string(),
            species_name: "ウインドラゴン".to_string(),
            nickname: String::new(),
            attribute: Some(Attribute::Tornado),
            weak_attribute: None,
            ideal_environment: Some(IdealEnvironment {
                temperature: -45,
                humidity: 5,
                water_depth: 50,
            }),
            best_area_id: None,
            base_hp,
            base_stats: ElementStats::new(60, 100, 60, 20),
            grow_hp: 0,
            grow_stats: ElementStats::default(),
            current_hp: base_hp,
        }
    }

    pub fn max_hp(&self) -> u32 {
        self.base_hp.saturating_add(self.grow_hp)
    }

    /// Base plus grown value for one element.
    pub fn stat(&self, element: Element) -> u32 {
        self.base_stats
            .get(element)
            .saturating_add(self.grow_stats.get(element))
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_hp == 0
    }

    /// Clamps every mutable stat back into its legal range.
    pub fn normalize(&mut self) {
        self.grow_hp = self.grow_hp.min(GROW_HP_CAP);
        for element in Element::ALL {
            let grown = self.grow_stats.get_mut(element);
            *grown = (*grown).min(GROW_ELEMENT_CAP);
        }
        self.current_hp = self.current_hp.min(self.max_hp());
    }
}
