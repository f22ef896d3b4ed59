use anyhow::Result;
use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    scenario::ScheduledReading,
    world::World,
};

/// Feeds scheduled sensor readings into the world.
///
/// Entries are applied once, when the tick counter first reaches their
/// `at_tick`. If several entries fall due together the latest one wins.
/// Ticks with nothing due keep the previous reading.
pub struct EnvironmentSystem {
    schedule: Vec<ScheduledReading>,
    cursor: usize,
}

impl EnvironmentSystem {
    pub fn new(mut schedule: Vec<ScheduledReading>) -> Self {
        schedule.sort_by_key(|entry| entry.at_tick);
        Self {
            schedule,
            cursor: 0,
        }
    }

    pub fn pending(&self) -> usize {
        self.schedule.len() - self.cursor
    }
}

impl Default for EnvironmentSystem {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl System for EnvironmentSystem {
    fn name(&self) -> &str {
        "environment"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()> {
        let mut due = None;
        while let Some(entry) = self.schedule.get(self.cursor) {
            if entry.at_tick > ctx.tick {
                break;
            }
            due = Some(entry.reading);
            self.cursor += 1;
        }
        if let Some(reading) = due {
            debug!(
                tick = ctx.tick,
                temperature = reading.temperature,
                humidity = reading.humidity,
                light = reading.light,
                "environment reading applied"
            );
            world.set_environment(reading);
        }
        Ok(())
    }
}
