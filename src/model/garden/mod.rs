use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::model::config::SimulationParams;
use crate::model::delta::ActorDelta;
use crate::model::environment::EnvironmentState;
use crate::model::events::EngineEvent;
use crate::model::factory::{FactoryLink, FlowerFactory};
use crate::model::grid::Grid;
use crate::model::population::PopulationManager;
use crate::model::summary::TickSummary;

pub mod init;
pub mod update;

/// Lifetime aggregates that survive across ticks and saves.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunningTotals {
    pub insects_eaten: u64,
    pub birds_hunted: u64,
    pub herbicide_planes_spawned: u64,
}

/// What one tick hands downstream.
pub struct TickOutput {
    pub events: Vec<EngineEvent>,
    pub summary: TickSummary,
    pub deltas: Vec<ActorDelta>,
}

/// The simulation world. One `step()` call is one atomic tick; nothing
/// else mutates the grid in between.
pub struct Garden {
    pub params: SimulationParams,
    pub grid: Grid,
    pub tick: u64,
    pub environment: EnvironmentState,
    pub population: PopulationManager,
    pub factory: FlowerFactory,
    pub totals: RunningTotals,
    pub rng: ChaCha8Rng,
}

impl Garden {
    /// An empty garden; call [`Garden::populate`] (after connecting the
    /// factory) to place the initial inhabitants.
    pub fn new(params: SimulationParams) -> Self {
        let seed = params.world.seed.unwrap_or_else(rand::random);
        let grid = Grid::new(params.world.width, params.world.height);
        Self {
            params,
            grid,
            tick: 0,
            environment: EnvironmentState::default(),
            population: PopulationManager::default(),
            factory: FlowerFactory::disconnected(),
            totals: RunningTotals::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn connect_factory(&mut self, link: FactoryLink) {
        self.factory.connect(link);
    }

    /// Drops all state and rebuilds from new params, keeping the factory
    /// channel. In-flight flower requests become orphans; their
    /// completions will find no seed and be discarded.
    pub fn reset(&mut self, params: SimulationParams) {
        let factory = std::mem::replace(&mut self.factory, FlowerFactory::disconnected());
        *self = Garden::new(params);
        self.factory = factory;
        self.factory.forward_params(&self.params);
        self.populate();
    }
}
