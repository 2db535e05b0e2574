use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::model::actor::{generate_id, Actor, ActorKind, Flower, FlowerSeed, Genome};
use crate::model::config::SimulationParams;
use crate::model::constants::{FLOWER_SEED_MIN_HEALTH, SEED_STEM_IMAGE};

/// Outbound messages to the flower service.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactoryRequest {
    CreateFlower {
        request_id: Uuid,
        x: u16,
        y: u16,
        parent_genome_1: Option<Genome>,
        parent_genome_2: Option<Genome>,
    },
    DrawImage {
        request_id: Uuid,
        genome: Genome,
    },
    UpdateParams {
        mutation_chance: f32,
        mutation_amount: f32,
        flower_detail_radius: u32,
    },
}

/// Inbound completions from the flower service. A failed synthesis comes
/// back as `FlowerCreated { flower: None }`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactoryResponse {
    FlowerCreated {
        request_id: Uuid,
        flower: Option<Flower>,
    },
    ImageDrawn {
        request_id: Uuid,
        image: String,
    },
}

/// Engine side of the duplex factory channel.
pub struct FactoryLink {
    pub requests: UnboundedSender<FactoryRequest>,
    pub completions: UnboundedReceiver<FactoryResponse>,
}

/// Worker side, held by the external flower service (or a test double).
pub struct FactoryWorker {
    pub requests: UnboundedReceiver<FactoryRequest>,
    pub completions: UnboundedSender<FactoryResponse>,
}

pub fn factory_channel() -> (FactoryLink, FactoryWorker) {
    let (req_tx, req_rx) = mpsc::unbounded_channel();
    let (res_tx, res_rx) = mpsc::unbounded_channel();
    (
        FactoryLink {
            requests: req_tx,
            completions: res_rx,
        },
        FactoryWorker {
            requests: req_rx,
            completions: res_tx,
        },
    )
}

/// Engine-owned facade over the factory channel. Requests never block;
/// completions are drained at the top of a tick only.
pub struct FlowerFactory {
    link: Option<FactoryLink>,
    pending: usize,
}

impl FlowerFactory {
    pub fn disconnected() -> Self {
        Self {
            link: None,
            pending: 0,
        }
    }

    pub fn connect(&mut self, link: FactoryLink) {
        self.link = Some(link);
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn forward_params(&mut self, params: &SimulationParams) {
        self.send(FactoryRequest::UpdateParams {
            mutation_chance: params.evolution.mutation_chance,
            mutation_amount: params.evolution.mutation_amount,
            flower_detail_radius: params.engine.flower_detail_radius,
        });
    }

    fn send(&mut self, request: FactoryRequest) -> bool {
        let Some(link) = &self.link else {
            tracing::debug!("factory not connected, dropping request");
            return false;
        };
        if link.requests.send(request).is_err() {
            tracing::warn!("factory channel closed, dropping request");
            self.link = None;
            return false;
        }
        true
    }

    /// Asks the service for a new flower and returns the seed placeholder
    /// to occupy (x, y) meanwhile. The seed's actor id doubles as the
    /// request id. Returns `None` when no factory is connected.
    pub fn request_flower(
        &mut self,
        rng: &mut rand_chacha::ChaCha8Rng,
        x: u16,
        y: u16,
        parent_genome_1: Option<Genome>,
        parent_genome_2: Option<Genome>,
        estimated_health: f64,
    ) -> Option<Actor> {
        let request_id = generate_id(rng);
        if !self.send(FactoryRequest::CreateFlower {
            request_id,
            x,
            y,
            parent_genome_1,
            parent_genome_2,
        }) {
            return None;
        }
        self.pending += 1;
        let health = estimated_health.max(FLOWER_SEED_MIN_HEALTH);
        Some(Actor::new(
            request_id,
            x,
            y,
            ActorKind::FlowerSeed(FlowerSeed {
                image: SEED_STEM_IMAGE.to_string(),
                health,
                max_health: health,
                age: 0,
            }),
        ))
    }

    pub fn request_image(&mut self, flower_id: Uuid, genome: Genome) {
        if self.send(FactoryRequest::DrawImage {
            request_id: flower_id,
            genome,
        }) {
            self.pending += 1;
        }
    }

    /// Non-blocking drain of whatever completions are ready. The only
    /// point where the engine observes state produced outside a tick.
    pub fn drain(&mut self) -> Vec<FactoryResponse> {
        let Some(link) = &mut self.link else {
            return Vec::new();
        };
        let mut completed = Vec::new();
        while let Ok(response) = link.completions.try_recv() {
            completed.push(response);
        }
        self.pending = self.pending.saturating_sub(completed.len());
        completed
    }
}

/// Average health of the living flowers, floored at 1. New seeds start at
/// this estimate so they blend into the current population.
pub fn estimate_seed_health(actors: &BTreeMap<Uuid, Actor>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for actor in actors.values() {
        if let Some(flower) = actor.as_flower() {
            sum += flower.health;
            count += 1;
        }
    }
    if count == 0 {
        FLOWER_SEED_MIN_HEALTH
    } else {
        (sum / count as f64).max(FLOWER_SEED_MIN_HEALTH)
    }
}
