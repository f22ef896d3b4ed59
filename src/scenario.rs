use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    area::{AreaCatalog, Attribute},
    creature::{Creature, ElementStats, IdealEnvironment},
    growth::GrowthTable,
    resolver::{EnvironmentReading, SEA_HUMIDITY},
    world::World,
};

fn default_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|date| date.and_hms_opt(6, 0, 0))
        .unwrap_or_default()
}

fn default_tick_minutes() -> u32 {
    1
}

fn default_snapshot_interval_ticks() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario must define a name")]
    MissingName,
    #[error("tick_minutes must be at least 1")]
    ZeroTickLength,
    #[error("creature base_hp must be greater than zero")]
    ZeroBaseHp,
    #[error("environment entry at tick {at_tick} has humidity {humidity} outside 0..=100")]
    HumidityOutOfRange { at_tick: u64, humidity: i32 },
    #[error("environment schedule defines tick {0} more than once")]
    DuplicateScheduleTick(u64),
    #[error("best_area_id '{0}' is not a known area")]
    UnknownBestArea(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_start")]
    pub start: NaiveDateTime,
    #[serde(default = "default_tick_minutes")]
    pub tick_minutes: u32,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub growth: GrowthTable,
    pub creature: ScenarioCreature,
    #[serde(default)]
    pub environment: Vec<ScheduledReading>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Starting creature. Omitted stats fall back to the stock species.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioCreature {
    pub species_id: Option<String>,
    pub species_name: Option<String>,
    #[serde(default)]
    pub nickname: String,
    pub attribute: Option<Attribute>,
    pub weak_attribute: Option<Attribute>,
    pub ideal_environment: Option<IdealEnvironment>,
    pub best_area_id: Option<String>,
    pub base_hp: Option<u32>,
    pub base_stats: Option<ElementStats>,
    #[serde(default)]
    pub grow_hp: u32,
    #[serde(default)]
    pub grow_stats: ElementStats,
    pub current_hp: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScheduledReading {
    pub at_tick: u64,
    pub reading: EnvironmentReading,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate(&AreaCatalog::standard())
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self, catalog: &AreaCatalog) -> Result<(), ScenarioError> {
        if self.name.trim().is_empty() {
            return Err(ScenarioError::MissingName);
        }
        if self.tick_minutes == 0 {
            return Err(ScenarioError::ZeroTickLength);
        }
        if self.creature.base_hp == Some(0) {
            return Err(ScenarioError::ZeroBaseHp);
        }
        if let Some(best) = &self.creature.best_area_id {
            if !catalog.contains(best) {
                return Err(ScenarioError::UnknownBestArea(best.clone()));
            }
        }

        let mut seen_ticks = Vec::with_capacity(self.environment.len());
        for entry in &self.environment {
            let humidity = entry.reading.humidity;
            if !(0..=SEA_HUMIDITY).contains(&humidity) {
                return Err(ScenarioError::HumidityOutOfRange {
                    at_tick: entry.at_tick,
                    humidity,
                });
            }
            if seen_ticks.contains(&entry.at_tick) {
                return Err(ScenarioError::DuplicateScheduleTick(entry.at_tick));
            }
            seen_ticks.push(entry.at_tick);
        }
        Ok(())
    }

    pub fn build_creature(&self) -> Creature {
        let template = &self.creature;
        let stock = Creature::windragon();
        let base_hp = template.base_hp.unwrap_or(stock.base_hp);
        let mut creature = Creature {
            species_id: template.species_id.clone().unwrap_or(stock.species_id),
            species_name: template.species_name.clone().unwrap_or(stock.species_name),
            nickname: template.nickname.trim().to_string(),
            attribute: template.attribute.or(stock.attribute),
            weak_attribute: template.weak_attribute,
            ideal_environment: template.ideal_environment.or(stock.ideal_environment),
            best_area_id: template.best_area_id.clone(),
            base_hp,
            base_stats: template.base_stats.unwrap_or(stock.base_stats),
            grow_hp: template.grow_hp,
            grow_stats: template.grow_stats,
            current_hp: u32::MAX,
        };
        creature.current_hp = template.current_hp.unwrap_or(creature.max_hp());
        creature.normalize();
        creature
    }

    /// Schedule ordered by tick.
    pub fn schedule(&self) -> Vec<ScheduledReading> {
        let mut schedule = self.environment.clone();
        schedule.sort_by_key(|entry| entry.at_tick);
        schedule
    }

    pub fn build_world(&self) -> World {
        World::new(self.build_creature(), self.start, self.tick_minutes)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(720)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "name: minimal\ncreature: {}\n";

    #[test]
    fn minimal_scenario_uses_defaults() {
        let scenario: Scenario = serde_yaml::from_str(MINIMAL).unwrap();
        scenario.validate(&AreaCatalog::standard()).unwrap();
        assert_eq!(scenario.tick_minutes, 1);
        assert_eq!(scenario.snapshot_interval_ticks, 60);
        assert_eq!(scenario.logging.level, "info");
        assert_eq!(scenario.growth, GrowthTable::default());
        assert_eq!(scenario.ticks(None), 720);
        assert_eq!(scenario.ticks(Some(5)), 5);
        assert_eq!(scenario.start.format("%H:%M").to_string(), "06:00");

        let creature = scenario.build_creature();
        assert_eq!(creature, Creature::windragon());
    }

    #[test]
    fn creature_overrides_apply_and_clamp() {
        let yaml = r#"
name: custom
creature:
  species_id: ember
  species_name: Ember
  attribute: volcano
  base_hp: 200
  grow_hp: 50
  current_hp: 9999
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        let creature = scenario.build_creature();
        assert_eq!(creature.species_id, "ember");
        assert_eq!(creature.attribute, Some(Attribute::Volcano));
        assert_eq!(creature.max_hp(), 250);
        assert_eq!(creature.current_hp, 250);
    }

    #[test]
    fn rejects_duplicate_schedule_ticks() {
        let yaml = r#"
name: dup
creature: {}
environment:
  - at_tick: 0
    reading: { temperature: 20, humidity: 50, light: 50 }
  - at_tick: 0
    reading: { temperature: -20, humidity: 50, light: 50 }
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            scenario.validate(&AreaCatalog::standard()),
            Err(ScenarioError::DuplicateScheduleTick(0))
        ));
    }

    #[test]
    fn rejects_out_of_range_humidity_and_unknown_best_area() {
        let yaml = r#"
name: wet
creature: {}
environment:
  - at_tick: 3
    reading: { temperature: 20, humidity: 101, light: 50 }
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            scenario.validate(&AreaCatalog::standard()),
            Err(ScenarioError::HumidityOutOfRange {
                at_tick: 3,
                humidity: 101
            })
        ));

        let yaml = "name: lost\ncreature:\n  best_area_id: Z9\n";
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            scenario.validate(&AreaCatalog::standard()),
            Err(ScenarioError::UnknownBestArea(id)) if id == "Z9"
        ));
    }

    #[test]
    fn schedule_is_sorted_and_depth_alias_is_accepted() {
        let yaml = r#"
name: sorted
creature: {}
environment:
  - at_tick: 30
    reading: { temperature: 20, humidity: 100, depth: 100 }
  - at_tick: 0
    reading: { temperature: -45, humidity: 5, light: 50 }
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        let schedule = scenario.schedule();
        assert_eq!(schedule[0].at_tick, 0);
        assert_eq!(schedule[1].reading, EnvironmentReading::new(20, 100, 100));
    }
}
