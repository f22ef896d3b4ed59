pub mod area;
pub mod creature;
pub mod engine;
pub mod growth;
pub mod rank;
pub mod resolver;
pub mod scenario;
pub mod snapshot;
pub mod systems;
pub mod web;
pub mod world;

pub use area::{Area, AreaCatalog, Attribute};
pub use creature::{Creature, Element, ElementStats};
pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use growth::{apply_tick, preview_tick, GrowthTable, TickOutcome, TickPreview};
pub use rank::{CompatibilityEngine, RankInfo, Tier};
pub use resolver::{AreaResolver, EnvironmentReading, Resolution};
pub use scenario::{Scenario, ScenarioLoader};
pub use world::World;
