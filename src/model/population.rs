use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use uuid::Uuid;

use crate::model::actor::{generate_id, Actor, ActorKind, Bird, Coord, Eagle, HerbicidePlane};
use crate::model::config::SimulationParams;
use crate::model::constants::{
    BIRD_SPAWN_COOLDOWN, EAGLE_MIN_BIRDS, EAGLE_SPAWN_COOLDOWN, HERBICIDE_PLANE_STRIDE,
    POPULATION_TREND_WINDOW, TREND_DECLINE_THRESHOLD, TREND_GROWTH_THRESHOLD,
};
use crate::model::events::{EngineEvent, Importance};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Growing,
    Declining,
    Stable,
}

/// Linearly-weighted average of relative rates of change over a count
/// history; recent deltas weigh more. A rise out of zero counts as +100%.
pub fn weighted_trend(history: &VecDeque<usize>) -> f64 {
    if history.len() < 2 {
        return 0.0;
    }
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 1..history.len() {
        let old = history[i - 1] as f64;
        let new = history[i] as f64;
        let rate = if old == 0.0 {
            if new > 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            (new - old) / old
        };
        let weight = i as f64;
        numerator += rate * weight;
        denominator += weight;
    }
    numerator / denominator
}

pub fn classify(weighted_average: f64) -> Trend {
    if weighted_average > TREND_GROWTH_THRESHOLD {
        Trend::Growing
    } else if weighted_average < -TREND_DECLINE_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Watches population counts and intervenes: predators against insect
/// booms, eagles against bird booms, herbicide sweeps against flower
/// overgrowth. All interventions sit behind per-kind cooldowns.
pub struct PopulationManager {
    pub insect_history: VecDeque<usize>,
    pub bird_history: VecDeque<usize>,
    bird_cooldown: u32,
    eagle_cooldown: u32,
    herbicide_cooldown: u32,
    last_trend: Trend,
}

impl Default for PopulationManager {
    fn default() -> Self {
        Self {
            insect_history: VecDeque::with_capacity(POPULATION_TREND_WINDOW),
            bird_history: VecDeque::with_capacity(POPULATION_TREND_WINDOW),
            bird_cooldown: 0,
            eagle_cooldown: 0,
            herbicide_cooldown: 0,
            last_trend: Trend::Stable,
        }
    }
}

impl PopulationManager {
    /// Appends this tick's counts, trimmed to the trend window.
    pub fn record(&mut self, insects: usize, birds: usize) {
        self.insect_history.push_back(insects);
        self.bird_history.push_back(birds);
        while self.insect_history.len() > POPULATION_TREND_WINDOW {
            self.insect_history.pop_front();
        }
        while self.bird_history.len() > POPULATION_TREND_WINDOW {
            self.bird_history.pop_front();
        }
    }

    pub fn insect_trend(&self) -> Trend {
        classify(weighted_trend(&self.insect_history))
    }

    /// Tick step: decrement cooldowns, then evaluate interventions against
    /// the mutable actor state. Returns the number of planes launched.
    pub fn run(
        &mut self,
        next: &mut BTreeMap<Uuid, Actor>,
        params: &SimulationParams,
        rng: &mut ChaCha8Rng,
        events: &mut Vec<EngineEvent>,
        tick: u64,
    ) -> u64 {
        self.bird_cooldown = self.bird_cooldown.saturating_sub(1);
        self.eagle_cooldown = self.eagle_cooldown.saturating_sub(1);
        self.herbicide_cooldown = self.herbicide_cooldown.saturating_sub(1);

        let trend = self.insect_trend();
        if trend != self.last_trend {
            events.push(EngineEvent::info(
                tick,
                Importance::Low,
                format!("Insect population trend: {trend:?}"),
            ));
            self.last_trend = trend;
        }

        let bird_count = next
            .values()
            .filter(|a| matches!(a.kind, ActorKind::Bird(_)))
            .count();

        if trend == Trend::Growing && self.bird_cooldown == 0 {
            if let Some(at) = find_free_cell(next, params, rng, |a| {
                matches!(a.kind, ActorKind::Bird(_))
            }) {
                let id = generate_id(rng);
                next.insert(
                    id,
                    Actor::new(id, at.x, at.y, ActorKind::Bird(Bird::default())),
                );
                self.bird_cooldown = BIRD_SPAWN_COOLDOWN;
                events.push(EngineEvent::info(
                    tick,
                    Importance::High,
                    "The insect boom has attracted a bird",
                ));
            }
        }

        if trend == Trend::Declining && bird_count > EAGLE_MIN_BIRDS && self.eagle_cooldown == 0 {
            if let Some(at) = find_free_cell(next, params, rng, |a| {
                matches!(a.kind, ActorKind::Eagle(_))
            }) {
                let id = generate_id(rng);
                next.insert(
                    id,
                    Actor::new(id, at.x, at.y, ActorKind::Eagle(Eagle::default())),
                );
                self.eagle_cooldown = EAGLE_SPAWN_COOLDOWN;
                events.push(EngineEvent::info(
                    tick,
                    Importance::High,
                    "An eagle now circles above the garden",
                ));
            }
        }

        let mut planes_spawned = 0;
        let flower_count = next.values().filter(|a| a.is_flower_or_seed()).count();
        let plane_present = next
            .values()
            .any(|a| matches!(a.kind, ActorKind::HerbicidePlane(_)));
        let threshold =
            params.herbicide.flower_density_threshold * params.cell_count() as f64;
        if flower_count as f64 >= threshold && !plane_present && self.herbicide_cooldown == 0 {
            let patterns = sweep_patterns(params.world.width, params.world.height);
            let (start, plane) = patterns[rng.gen_range(0..patterns.len())].clone();
            let id = generate_id(rng);
            next.insert(
                id,
                Actor::new(id, start.x, start.y, ActorKind::HerbicidePlane(plane)),
            );
            self.herbicide_cooldown = params.herbicide.cooldown;
            planes_spawned += 1;
            events.push(EngineEvent::info(
                tick,
                Importance::High,
                "Flower overgrowth detected, a herbicide plane is inbound",
            ));
        }
        planes_spawned
    }
}

/// Four predetermined serpentine sweeps: one per grid edge.
fn sweep_patterns(width: u16, height: u16) -> Vec<(Coord, HerbicidePlane)> {
    let stride = HERBICIDE_PLANE_STRIDE;
    let s = stride as i32;
    vec![
        (
            Coord::new(0, 0),
            HerbicidePlane { dx: 1, dy: 0, turn_dx: 0, turn_dy: s, stride },
        ),
        (
            Coord::new(width - 1, height - 1),
            HerbicidePlane { dx: -1, dy: 0, turn_dx: 0, turn_dy: -s, stride },
        ),
        (
            Coord::new(0, 0),
            HerbicidePlane { dx: 0, dy: 1, turn_dx: s, turn_dy: 0, stride },
        ),
        (
            Coord::new(width - 1, 0),
            HerbicidePlane { dx: 0, dy: 1, turn_dx: -s, turn_dy: 0, stride },
        ),
    ]
}

/// A random cell holding no actor matching `occupied`; falls back to a
/// row-major scan when random probing misses.
fn find_free_cell(
    next: &BTreeMap<Uuid, Actor>,
    params: &SimulationParams,
    rng: &mut ChaCha8Rng,
    occupied: impl Fn(&Actor) -> bool,
) -> Option<Coord> {
    let taken: HashSet<Coord> = next
        .values()
        .filter(|a| occupied(a))
        .map(|a| a.pos())
        .collect();
    if taken.len() >= params.cell_count() {
        return None;
    }
    let (w, h) = (params.world.width, params.world.height);
    for _ in 0..32 {
        let at = Coord::new(rng.gen_range(0..w), rng.gen_range(0..h));
        if !taken.contains(&at) {
            return Some(at);
        }
    }
    for y in 0..h {
        for x in 0..w {
            let at = Coord::new(x, y);
            if !taken.contains(&at) {
                return Some(at);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(counts: &[usize]) -> VecDeque<usize> {
        counts.iter().copied().collect()
    }

    #[test]
    fn test_flat_history_is_stable() {
        assert_eq!(classify(weighted_trend(&history(&[5, 5, 5, 5]))), Trend::Stable);
    }

    #[test]
    fn test_rising_history_grows() {
        let trend = classify(weighted_trend(&history(&[2, 4, 6, 9])));
        assert_eq!(trend, Trend::Growing);
    }

    #[test]
    fn test_falling_history_declines() {
        let trend = classify(weighted_trend(&history(&[9, 6, 4, 2])));
        assert_eq!(trend, Trend::Declining);
    }

    #[test]
    fn test_rise_out_of_zero_counts_as_full_growth() {
        assert!(weighted_trend(&history(&[0, 3])) >= 1.0);
    }

    #[test]
    fn test_non_decreasing_history_never_declines() {
        let trend = classify(weighted_trend(&history(&[3, 3, 4, 4, 4])));
        assert_ne!(trend, Trend::Declining);
    }

    #[test]
    fn test_record_trims_to_window() {
        let mut manager = PopulationManager::default();
        for i in 0..POPULATION_TREND_WINDOW + 5 {
            manager.record(i, i);
        }
        assert_eq!(manager.insect_history.len(), POPULATION_TREND_WINDOW);
        assert_eq!(manager.bird_history.len(), POPULATION_TREND_WINDOW);
        assert_eq!(*manager.insect_history.back().unwrap(), POPULATION_TREND_WINDOW + 4);
    }
}
