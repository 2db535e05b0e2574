//! EvoGarden simulation core: a deterministic, tick-driven ecosystem on a
//! 2D grid. The engine owns the grid; hosts talk to it over the command
//! and event channels in [`engine`], and flower synthesis happens in an
//! external service behind the factory channel.

pub mod engine;
pub mod model;

pub use model::config::SimulationParams;
pub use model::garden::{Garden, TickOutput};
pub use model::GardenError;
