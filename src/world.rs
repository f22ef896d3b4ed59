use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::creature::{Creature, ElementCounters};
use crate::growth::{TickOutcome, TickPreview};
use crate::rank::{RankInfo, Tier};
use crate::resolver::EnvironmentReading;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierHistogram {
    pub superbest: u64,
    pub best: u64,
    pub good: u64,
    pub normal: u64,
    pub bad: u64,
    pub neutral: u64,
}

impl TierHistogram {
    pub fn record(&mut self, tier: Tier) {
        *self.slot_mut(tier) += 1;
    }

    pub fn count(&self, tier: Tier) -> u64 {
        match tier {
            Tier::SuperBest => self.superbest,
            Tier::Best => self.best,
            Tier::Good => self.good,
            Tier::Normal => self.normal,
            Tier::Bad => self.bad,
            Tier::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> u64 {
        Tier::ALL.iter().map(|&tier| self.count(tier)).sum()
    }

    fn slot_mut(&mut self, tier: Tier) -> &mut u64 {
        match tier {
            Tier::SuperBest => &mut self.superbest,
            Tier::Best => &mut self.best,
            Tier::Good => &mut self.good,
            Tier::Normal => &mut self.normal,
            Tier::Bad => &mut self.bad,
            Tier::Neutral => &mut self.neutral,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BookkeepingState {
    pub tiers: TierHistogram,
    pub exhausted_ticks: u64,
}

/// Everything one simulated habitat carries between ticks.
#[derive(Debug, Clone)]
pub struct World {
    tick: u64,
    clock: NaiveDateTime,
    tick_minutes: u32,
    pub creature: Creature,
    pub counters: ElementCounters,
    pub environment: EnvironmentReading,
    pub rank: Option<RankInfo>,
    pub last_outcome: Option<TickOutcome>,
    pub bookkeeping: BookkeepingState,
}

impl World {
    pub fn new(creature: Creature, start: NaiveDateTime, tick_minutes: u32) -> Self {
        Self {
            tick: 0,
            clock: start,
            tick_minutes: tick_minutes.max(1),
            creature,
            counters: ElementCounters::default(),
            environment: EnvironmentReading::NEUTRAL,
            rank: None,
            last_outcome: None,
            bookkeeping: BookkeepingState::default(),
        }
    }

    /// Rebuilds a world from persisted state; derived fields start empty.
    pub fn restore(saved: SavedState, tick_minutes: u32) -> Self {
        let mut world = Self::new(saved.creature, saved.clock, tick_minutes);
        world.tick = saved.tick;
        world.counters = saved.counters;
        world.environment = saved.environment;
        world
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn clock(&self) -> NaiveDateTime {
        self.clock
    }

    pub fn tick_minutes(&self) -> u32 {
        self.tick_minutes
    }

    pub fn advance_time(&mut self) {
        self.tick += 1;
        self.clock += Duration::minutes(i64::from(self.tick_minutes));
    }

    pub fn set_environment(&mut self, reading: EnvironmentReading) {
        self.environment = reading;
    }

    pub fn record_tick(&mut self, rank: RankInfo, outcome: TickOutcome) {
        self.rank = Some(rank);
        self.last_outcome = Some(outcome);
    }

    pub fn saved_state(&self, scenario: &str) -> SavedState {
        SavedState {
            scenario: scenario.to_string(),
            tick: self.tick,
            clock: self.clock,
            creature: self.creature.clone(),
            counters: self.counters,
            environment: self.environment,
        }
    }

    pub fn snapshot(&self, scenario: &str, forecast: Option<TickPreview>) -> WorldSnapshot {
        WorldSnapshot {
            scenario: scenario.to_string(),
            tick: self.tick,
            clock: self.clock,
            max_hp: self.creature.max_hp(),
            creature: self.creature.clone(),
            counters: self.counters,
            environment: self.environment,
            rank: self.rank.clone(),
            last_outcome: self.last_outcome,
            forecast,
            bookkeeping: self.bookkeeping.clone(),
        }
    }
}

/// Persisted subset of a world. Rank information is always recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub scenario: String,
    pub tick: u64,
    pub clock: NaiveDateTime,
    pub creature: Creature,
    #[serde(default)]
    pub counters: ElementCounters,
    #[serde(default)]
    pub environment: EnvironmentReading,
}

/// Per-tick view handed to hooks and the web UI.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub tick: u64,
    pub clock: NaiveDateTime,
    pub max_hp: u32,
    pub creature: Creature,
    pub counters: ElementCounters,
    pub environment: EnvironmentReading,
    pub rank: Option<RankInfo>,
    pub last_outcome: Option<TickOutcome>,
    pub forecast: Option<TickPreview>,
    pub bookkeeping: BookkeepingState,
}
