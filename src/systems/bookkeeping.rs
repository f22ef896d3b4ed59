use anyhow::Result;
use tracing::warn;

use crate::{
    engine::{System, SystemContext},
    world::World,
};

pub struct BookkeepingSystem {
    was_exhausted: bool,
}

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self {
            was_exhausted: false,
        }
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()> {
        world.creature.normalize();
        if let Some(rank) = &world.rank {
            world.bookkeeping.tiers.record(rank.tier);
        }
        let exhausted = world.creature.is_exhausted();
        if exhausted {
            world.bookkeeping.exhausted_ticks += 1;
            if !self.was_exhausted {
                warn!(
                    tick = ctx.tick,
                    scenario = ctx.scenario_name,
                    creature = %world.creature.species_id,
                    "creature hp reached zero"
                );
            }
        }
        self.was_exhausted = exhausted;
        Ok(())
    }
}
