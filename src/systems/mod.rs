mod bookkeeping;
mod environment;
mod growth;

pub use bookkeeping::BookkeepingSystem;
pub use environment::EnvironmentSystem;
pub use growth::GrowthSystem;

use crate::engine::EngineBuilder;
use crate::scenario::ScheduledReading;

/// Registers the standard tick pipeline: environment, growth, bookkeeping.
pub fn install_default_systems(
    builder: EngineBuilder,
    schedule: Vec<ScheduledReading>,
) -> EngineBuilder {
    builder
        .with_system(EnvironmentSystem::new(schedule))
        .with_system(GrowthSystem::new())
        .with_system(BookkeepingSystem::new())
}
