mod pacing;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::debug;

pub use pacing::TickAccumulator;

use crate::{
    area::AreaCatalog,
    growth::{preview_tick, GrowthTable, TickPreview},
    rank::CompatibilityEngine,
    snapshot::SnapshotWriter,
    world::{World, WorldSnapshot},
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub growth: GrowthTable,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    catalog: AreaCatalog,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            catalog: AreaCatalog::standard(),
            systems: Vec::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: AreaCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> Engine {
        Engine {
            catalog: self.catalog,
            systems: self.systems,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_ticks,
            ),
            settings: self.settings,
        }
    }
}

pub struct Engine {
    catalog: AreaCatalog,
    systems: Vec<Box<dyn System>>,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
}

impl Engine {
    pub fn run(&mut self, world: &mut World, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.step(world)?;
        }
        Ok(())
    }

    /// Runs `ticks` ticks, handing `hook` a snapshot after each one.
    pub fn run_with_hook<F>(&mut self, world: &mut World, ticks: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(WorldSnapshot),
    {
        for _ in 0..ticks {
            self.step(world)?;
            hook(self.snapshot(world));
        }
        Ok(())
    }

    fn step(&mut self, world: &mut World) -> Result<()> {
        let current_tick = world.tick();
        let now = world.clock();
        for system in &mut self.systems {
            let ctx = SystemContext {
                tick: current_tick,
                now,
                scenario_name: &self.settings.scenario_name,
                catalog: &self.catalog,
                growth: &self.settings.growth,
            };
            system.run(&ctx, world)?;
        }
        world.advance_time();
        if let Some(path) = self
            .snapshot_writer
            .maybe_write(world, &self.settings.scenario_name)?
        {
            debug!(tick = world.tick(), path = %path.display(), "snapshot written");
        }
        Ok(())
    }

    /// What the next tick would do at the world's current clock.
    pub fn forecast(&self, world: &World) -> TickPreview {
        forecast(&self.catalog, &self.settings.growth, world)
    }

    pub fn snapshot(&self, world: &World) -> WorldSnapshot {
        world.snapshot(&self.settings.scenario_name, Some(self.forecast(world)))
    }

    pub fn catalog(&self) -> &AreaCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

/// Previews the next tick against `world` without mutating it.
pub fn forecast(catalog: &AreaCatalog, growth: &GrowthTable, world: &World) -> TickPreview {
    let rank = CompatibilityEngine::new(catalog).compute_rank(
        &world.creature,
        &world.environment,
        &world.clock(),
        world.creature.attribute,
    );
    preview_tick(&world.creature, &rank, &world.counters, growth)
}

pub struct SystemContext<'a> {
    pub tick: u64,
    pub now: NaiveDateTime,
    pub scenario_name: &'a str,
    pub catalog: &'a AreaCatalog,
    pub growth: &'a GrowthTable,
}

pub trait System: Send {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()>;
}
