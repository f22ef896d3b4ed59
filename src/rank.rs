//! Compatibility ranking between a creature and its current environment.
//!
//! Land readings are gated by the light level expected at the current hour;
//! a mismatch is always `Bad`, even for the creature's ideal reading. Sea
//! readings skip the light gate entirely since the third value is depth.

use std::fmt;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::area::{Area, AreaCatalog, Attribute};
use crate::creature::{Creature, Element};
use crate::resolver::{AreaResolver, EnvironmentReading, Resolution, SEA_HUMIDITY};

/// Light value assumed on land when deriving a fallback best area from the
/// ideal environment, which carries no light of its own. A modeling
/// simplification, not a property of the area.
pub const LAND_FALLBACK_LIGHT: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    SuperBest,
    Best,
    Good,
    Normal,
    Bad,
    Neutral,
}

impl Tier {
    pub const ALL: [Tier; 6] = [
        Tier::SuperBest,
        Tier::Best,
        Tier::Good,
        Tier::Normal,
        Tier::Bad,
        Tier::Neutral,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tier::SuperBest => "superbest",
            Tier::Best => "best",
            Tier::Good => "good",
            Tier::Normal => "normal",
            Tier::Bad => "bad",
            Tier::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 6–9h → 50, 10–15h → 100, otherwise 0.
pub fn expected_light<T: Timelike>(now: &T) -> i32 {
    match now.hour() {
        6..=9 => 50,
        10..=15 => 100,
        _ => 0,
    }
}

/// Same attribute is good, the opposite is bad, anything else is normal.
pub fn relation_tier(creature: Option<Attribute>, environment: Option<Attribute>) -> Tier {
    relation_tier_with_weakness(creature, environment, None)
}

/// Like [`relation_tier`], but `weakness` (when set) replaces the fixed
/// opposite as the adverse attribute and is checked before anything else.
pub fn relation_tier_with_weakness(
    creature: Option<Attribute>,
    environment: Option<Attribute>,
    weakness: Option<Attribute>,
) -> Tier {
    let Some(environment) = environment else {
        return Tier::Neutral;
    };
    if weakness == Some(environment) {
        return Tier::Bad;
    }
    let Some(creature) = creature else {
        return Tier::Normal;
    };
    if environment == creature {
        return Tier::Good;
    }
    if weakness.is_none() && environment == creature.opposite() {
        return Tier::Bad;
    }
    Tier::Normal
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankInfo {
    pub tier: Tier,
    pub area_id: Option<&'static str>,
    pub environment_attribute: Option<Attribute>,
    pub area_display_name: Option<&'static str>,
    pub area_display_name_alt: Option<&'static str>,
    pub is_sea: bool,
    pub expected_light: Option<i32>,
    pub light_satisfied: bool,
}

impl RankInfo {
    pub fn neutral(expected_light: i32) -> Self {
        Self {
            tier: Tier::Neutral,
            area_id: None,
            environment_attribute: None,
            area_display_name: None,
            area_display_name_alt: None,
            is_sea: false,
            expected_light: Some(expected_light),
            light_satisfied: true,
        }
    }

    fn for_area(
        area: &Area,
        tier: Tier,
        expected_light: Option<i32>,
        light_satisfied: bool,
    ) -> Self {
        Self {
            tier,
            area_id: Some(area.id),
            environment_attribute: Some(area.attribute),
            area_display_name: Some(area.display_name),
            area_display_name_alt: Some(area.display_name_alt),
            is_sea: area.is_sea(),
            expected_light,
            light_satisfied,
        }
    }

    /// Growth bucket the environment feeds, if any.
    pub fn element(&self) -> Option<Element> {
        self.environment_attribute.map(Attribute::element)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompatibilityEngine<'a> {
    resolver: AreaResolver<'a>,
}

impl<'a> CompatibilityEngine<'a> {
    pub fn new(catalog: &'a AreaCatalog) -> Self {
        Self {
            resolver: AreaResolver::new(catalog),
        }
    }

    pub fn resolver(&self) -> &AreaResolver<'a> {
        &self.resolver
    }

    pub fn compute_rank<T: Timelike>(
        &self,
        creature: &Creature,
        reading: &EnvironmentReading,
        now: &T,
        attribute: Option<Attribute>,
    ) -> RankInfo {
        let area = match self.resolver.resolve_reading(reading) {
            Resolution::Neutral => return RankInfo::neutral(expected_light(now)),
            Resolution::Area(area) => area,
        };

        if area.is_sea() {
            let tier = self.match_tier(creature, reading, area, attribute);
            return RankInfo::for_area(area, tier, None, true);
        }

        let need = expected_light(now);
        if reading.light != need {
            return RankInfo::for_area(area, Tier::Bad, Some(need), false);
        }
        let tier = self.match_tier(creature, reading, area, attribute);
        RankInfo::for_area(area, tier, Some(need), true)
    }

    /// super-best → best → attribute relation, first hit wins.
    fn match_tier(
        &self,
        creature: &Creature,
        reading: &EnvironmentReading,
        area: &Area,
        attribute: Option<Attribute>,
    ) -> Tier {
        if is_super_best(creature, reading) {
            Tier::SuperBest
        } else if self.is_best(creature, area.id) {
            Tier::Best
        } else {
            relation_tier_with_weakness(attribute, Some(area.attribute), creature.weak_attribute)
        }
    }

    /// Area the ideal environment resolves to, used when no explicit best
    /// area is declared. Never neutral.
    pub fn fallback_best_area(&self, creature: &Creature) -> Option<&'static str> {
        let ideal = creature.ideal_environment?;
        let light = if ideal.humidity == SEA_HUMIDITY {
            ideal.water_depth
        } else {
            LAND_FALLBACK_LIGHT
        };
        self.resolver
            .resolve(ideal.temperature, ideal.humidity, light)
            .id()
    }

    pub fn is_best(&self, creature: &Creature, area_id: &str) -> bool {
        match creature.best_area_id.as_deref() {
            Some(best) => best == area_id,
            None => self.fallback_best_area(creature) == Some(area_id),
        }
    }
}

pub fn is_super_best(creature: &Creature, reading: &EnvironmentReading) -> bool {
    let Some(ideal) = creature.ideal_environment else {
        return false;
    };
    if reading.temperature != ideal.temperature || reading.humidity != ideal.humidity {
        return false;
    }
    !reading.is_sea() || reading.light == ideal.water_depth
}
