use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::model::actor::{Actor, ActorKind, FlowerEffects};
use crate::model::config::SimulationParams;
use crate::model::environment::{EnvironmentState, Season, WeatherEvent};
use crate::model::events::TickCounters;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActorCounts {
    pub flowers: usize,
    pub seeds: usize,
    pub insects: usize,
    pub birds: usize,
    pub eagles: usize,
    pub eggs: usize,
    pub nutrients: usize,
    pub planes: usize,
    pub smoke: usize,
}

/// Aggregate view of one tick, computed in a single pass over the final
/// actor state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TickSummary {
    pub tick: u64,
    pub counts: ActorCounts,
    pub max_flower_age: u32,
    pub max_flower_health: f64,
    pub avg_flower_health: f64,
    pub avg_flower_stamina: f64,
    pub avg_toxicity: f64,
    pub avg_nutrient_efficiency: f64,
    pub avg_maturation_period: f64,
    pub avg_effects: FlowerEffects,
    pub counters: TickCounters,
    pub current_temperature: f64,
    pub current_humidity: f64,
    pub season: Season,
    pub weather: WeatherEvent,
    /// Fraction of cells holding a flower or seed.
    pub flower_density: f64,
    pub pending_flower_requests: usize,
    pub tick_ms: f64,
}

pub fn compute_summary(
    next: &BTreeMap<Uuid, Actor>,
    environment: &EnvironmentState,
    counters: TickCounters,
    pending_flower_requests: usize,
    params: &SimulationParams,
    tick: u64,
    tick_ms: f64,
) -> TickSummary {
    let mut counts = ActorCounts::default();
    let mut max_flower_age = 0u32;
    let mut max_flower_health = 0.0f64;
    let mut health_sum = 0.0;
    let mut stamina_sum = 0.0;
    let mut toxicity_sum = 0.0;
    let mut efficiency_sum = 0.0;
    let mut maturation_sum = 0.0;
    let mut effects_sum = FlowerEffects::default();

    for actor in next.values() {
        match &actor.kind {
            ActorKind::Flower(flower) => {
                counts.flowers += 1;
                max_flower_age = max_flower_age.max(flower.age);
                max_flower_health = max_flower_health.max(flower.health);
                health_sum += flower.health;
                stamina_sum += flower.stamina;
                toxicity_sum += flower.toxicity_rate;
                efficiency_sum += flower.nutrient_efficiency;
                maturation_sum += flower.maturation_period as f64;
                effects_sum.vitality += flower.effects.vitality;
                effects_sum.agility += flower.effects.agility;
                effects_sum.strength += flower.effects.strength;
                effects_sum.intelligence += flower.effects.intelligence;
                effects_sum.luck += flower.effects.luck;
            }
            ActorKind::FlowerSeed(seed) => {
                counts.seeds += 1;
                max_flower_age = max_flower_age.max(seed.age);
            }
            ActorKind::Insect(_) => counts.insects += 1,
            ActorKind::Bird(_) => counts.birds += 1,
            ActorKind::Eagle(_) => counts.eagles += 1,
            ActorKind::Egg(_) => counts.eggs += 1,
            ActorKind::Nutrient(_) => counts.nutrients += 1,
            ActorKind::HerbicidePlane(_) => counts.planes += 1,
            ActorKind::HerbicideSmoke(_) => counts.smoke += 1,
        }
    }

    let n = counts.flowers as f64;
    let avg = |sum: f64| if counts.flowers == 0 { 0.0 } else { sum / n };
    let avg32 = |sum: f32| if counts.flowers == 0 { 0.0 } else { sum / n as f32 };

    TickSummary {
        tick,
        counts,
        max_flower_age,
        max_flower_health,
        avg_flower_health: avg(health_sum),
        avg_flower_stamina: avg(stamina_sum),
        avg_toxicity: avg(toxicity_sum),
        avg_nutrient_efficiency: avg(efficiency_sum),
        avg_maturation_period: avg(maturation_sum),
        avg_effects: FlowerEffects {
            vitality: avg32(effects_sum.vitality),
            agility: avg32(effects_sum.agility),
            strength: avg32(effects_sum.strength),
            intelligence: avg32(effects_sum.intelligence),
            luck: avg32(effects_sum.luck),
        },
        counters,
        current_temperature: environment.current_temperature,
        current_humidity: environment.current_humidity,
        season: environment.season,
        weather: environment.weather,
        flower_density: (counts.flowers + counts.seeds) as f64 / params.cell_count() as f64,
        pending_flower_requests,
        tick_ms,
    }
}
