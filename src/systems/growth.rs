use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    growth::apply_tick,
    rank::CompatibilityEngine,
    world::World,
};

/// Ranks the current reading and applies one tick of growth.
pub struct GrowthSystem;

impl GrowthSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GrowthSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for GrowthSystem {
    fn name(&self) -> &str {
        "growth"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()> {
        let compatibility = CompatibilityEngine::new(ctx.catalog);
        let rank = compatibility.compute_rank(
            &world.creature,
            &world.environment,
            &ctx.now,
            world.creature.attribute,
        );
        let outcome = apply_tick(&mut world.creature, &rank, &mut world.counters, ctx.growth);
        world.record_tick(rank, outcome);
        Ok(())
    }
}
