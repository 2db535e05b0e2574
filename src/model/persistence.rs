use anyhow::Context;
use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::model::actor::ActorKind;
use crate::model::config::SimulationParams;
use crate::model::environment::EnvironmentState;
use crate::model::garden::{Garden, RunningTotals};
use crate::model::grid::Grid;
use crate::model::population::PopulationManager;
use crate::model::GardenError;

const CURRENT_SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a garden. Field names follow the wire format
/// the host application stores. Flower images are stripped on save and
/// regenerated through the flower service on load.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveEnvelope {
    pub version: u32,
    pub params: SimulationParams,
    pub grid: Grid,
    pub tick: u64,
    pub total_insects_eaten: u64,
    pub total_birds_hunted: u64,
    pub total_herbicide_planes_spawned: u64,
    pub environment_state: EnvironmentState,
    pub saved_at: String,
}

impl Garden {
    /// Snapshot for `get-state`. Image blobs are dropped; they are
    /// regenerable from the genome.
    pub fn save_state(&self) -> SaveEnvelope {
        let mut grid = self.grid.clone();
        let stripped = grid
            .flatten()
            .into_iter()
            .map(|mut actor| {
                if let ActorKind::Flower(flower) = &mut actor.kind {
                    flower.image = String::new();
                }
                actor
            })
            .collect::<Vec<_>>();
        grid = Grid::from_actors(grid.width, grid.height, stripped);
        SaveEnvelope {
            version: CURRENT_SAVE_VERSION,
            params: self.params.clone(),
            grid,
            tick: self.tick,
            total_insects_eaten: self.totals.insects_eaten,
            total_birds_hunted: self.totals.birds_hunted,
            total_herbicide_planes_spawned: self.totals.herbicide_planes_spawned,
            environment_state: self.environment.clone(),
            saved_at: Utc::now().to_rfc3339(),
        }
    }

    /// Restores from a snapshot, keeping the factory channel. Actors
    /// outside the params' grid bounds are dropped with a warning; flowers
    /// get their images re-requested from the service.
    pub fn load_state(&mut self, envelope: SaveEnvelope) -> Result<(), GardenError> {
        if envelope.version > CURRENT_SAVE_VERSION {
            return Err(GardenError::UnsupportedVersion(envelope.version));
        }
        let params = envelope.params;
        if params.world.width == 0 || params.world.height == 0 {
            return Err(GardenError::InvalidSave("zero-sized grid".into()));
        }

        // Re-bucket by actor coordinates; foreign payloads may disagree
        // with their own cell layout.
        let grid = Grid::from_actors(
            params.world.width,
            params.world.height,
            envelope.grid.flatten(),
        );

        let seed = params.world.seed.unwrap_or_else(rand::random);
        self.rng = ChaCha8Rng::seed_from_u64(seed ^ envelope.tick);
        self.params = params;
        self.grid = grid;
        self.tick = envelope.tick;
        self.environment = envelope.environment_state;
        self.population = PopulationManager::default();
        self.totals = RunningTotals {
            insects_eaten: envelope.total_insects_eaten,
            birds_hunted: envelope.total_birds_hunted,
            herbicide_planes_spawned: envelope.total_herbicide_planes_spawned,
        };

        let flowers_without_images: Vec<_> = self
            .grid
            .iter()
            .filter_map(|actor| match &actor.kind {
                ActorKind::Flower(flower) if flower.image.is_empty() => {
                    Some((actor.id, flower.genome.clone()))
                }
                _ => None,
            })
            .collect();
        for (id, genome) in flowers_without_images {
            self.factory.request_image(id, genome);
        }
        Ok(())
    }
}

/// Writes a garden snapshot to disk as JSON.
pub fn save_to_file(garden: &Garden, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let envelope = garden.save_state();
    let data = serde_json::to_string(&envelope).context("Failed to serialize save state")?;
    fs::write(path, data).context("Failed to write save file")?;
    Ok(())
}

/// Reads a garden snapshot from disk.
pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<SaveEnvelope> {
    let content = fs::read_to_string(&path).context("Failed to read save file")?;
    let envelope =
        serde_json::from_str(&content).context("Failed to deserialize save file")?;
    Ok(envelope)
}
