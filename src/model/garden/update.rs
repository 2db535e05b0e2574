use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use uuid::Uuid;

use crate::model::actor::{generate_id, Actor, ActorKind, Coord};
use crate::model::behaviors::{self, insect, nutrient, BehaviorCtx};
use crate::model::delta::compute_deltas;
use crate::model::environment::Season;
use crate::model::events::{EngineEvent, Importance, TickCounters};
use crate::model::factory::FactoryResponse;
use crate::model::garden::{Garden, TickOutput};
use crate::model::grid::Grid;
use crate::model::quadtree::{QuadPoint, Quadtree, Rect};
use crate::model::summary::compute_summary;

impl Garden {
    /// One atomic tick: snapshot, mutate, diff, commit.
    pub fn step(&mut self) -> TickOutput {
        let started = Instant::now();
        let mut events: Vec<EngineEvent> = Vec::new();
        let mut counters = TickCounters::default();

        let previous_season = self.environment.season;
        self.environment.update(
            self.tick,
            &self.params.climate,
            &self.params.weather,
            &mut self.rng,
            &mut events,
        );

        // The pre-tick view every behavior reads from.
        let initial_actors = self.grid.flatten();
        let initial_map: BTreeMap<Uuid, Actor> =
            initial_actors.iter().map(|a| (a.id, a.clone())).collect();
        let mut next = initial_map.clone();

        if previous_season == Season::Winter && self.environment.season == Season::Spring {
            self.spring_repopulation(&mut next, &mut events);
        }

        self.drain_completions(&mut next, &mut events);

        self.totals.herbicide_planes_spawned += self.population.run(
            &mut next,
            &self.params,
            &mut self.rng,
            &mut events,
            self.tick,
        );

        let (qtree, flower_qtree) = build_indexes(&next, &self.params);

        nutrient::healing_phase(&mut next, &qtree);

        let mut queued: Vec<Actor> = Vec::new();
        {
            let mut ctx = BehaviorCtx {
                params: &self.params,
                snapshot: &self.grid,
                next: &mut next,
                qtree: &qtree,
                flower_qtree: &flower_qtree,
                events: &mut events,
                counters: &mut counters,
                factory: &mut self.factory,
                queued: &mut queued,
                temperature: self.environment.current_temperature,
                tick: self.tick,
                rng: &mut self.rng,
            };
            for actor in &initial_actors {
                // Already removed by an earlier behavior this tick.
                if !ctx.next.contains_key(&actor.id) {
                    continue;
                }
                behaviors::dispatch(&mut ctx, actor);
            }
        }

        insect::reproduction_phase(
            &mut next,
            &self.params,
            &mut self.rng,
            &mut events,
            &mut counters,
            self.tick,
        );

        for actor in queued {
            next.insert(actor.id, actor);
        }

        resolve_flower_exclusivity(&mut next);
        cull_dead_flora(&mut next, &mut counters);

        let insect_count = next
            .values()
            .filter(|a| matches!(a.kind, ActorKind::Insect(_)))
            .count();
        let bird_count = next
            .values()
            .filter(|a| matches!(a.kind, ActorKind::Bird(_)))
            .count();
        self.population.record(insect_count, bird_count);

        self.totals.insects_eaten += counters.insects_eaten as u64;
        self.totals.birds_hunted += counters.birds_hunted as u64;

        let tick_ms = started.elapsed().as_secs_f64() * 1000.0;
        let summary = compute_summary(
            &next,
            &self.environment,
            counters,
            self.factory.pending(),
            &self.params,
            self.tick,
            tick_ms,
        );

        let deltas = compute_deltas(&initial_map, &next);

        self.grid = Grid::from_actors(
            self.params.world.width,
            self.params.world.height,
            next.into_values(),
        );
        self.tick += 1;

        TickOutput {
            events,
            summary,
            deltas,
        }
    }

    /// Top-of-tick drain: the only point where out-of-tick state enters
    /// the simulation. Completions for seeds that no longer exist are
    /// discarded.
    fn drain_completions(
        &mut self,
        next: &mut BTreeMap<Uuid, Actor>,
        events: &mut Vec<EngineEvent>,
    ) {
        for response in self.factory.drain() {
            match response {
                FactoryResponse::FlowerCreated { request_id, flower } => {
                    let Some(seed_actor) = next.get(&request_id) else {
                        tracing::debug!(%request_id, "completion for a vanished seed, discarding");
                        continue;
                    };
                    let ActorKind::FlowerSeed(seed) = &seed_actor.kind else {
                        continue;
                    };
                    let (x, y, age) = (seed_actor.x, seed_actor.y, seed.age);
                    next.remove(&request_id);
                    let Some(mut flower) = flower else {
                        // Failed synthesis drops the seed silently.
                        continue;
                    };
                    flower.age = age;
                    flower.refresh_maturity();
                    let id = generate_id(&mut self.rng);
                    next.insert(id, Actor::new(id, x, y, ActorKind::Flower(flower)));
                    events.push(EngineEvent::success(
                        self.tick,
                        Importance::Low,
                        "A new flower bloomed",
                    ));
                }
                FactoryResponse::ImageDrawn { request_id, image } => {
                    if let Some(flower) =
                        next.get_mut(&request_id).and_then(|a| a.as_flower_mut())
                    {
                        flower.image = image;
                    }
                }
            }
        }
    }
}

/// Two indexes per tick: all actors for predator vision, flowers only for
/// foraging and patrols.
fn build_indexes(
    next: &BTreeMap<Uuid, Actor>,
    params: &crate::model::config::SimulationParams,
) -> (Quadtree, Quadtree) {
    let bounds = Rect::new(
        0,
        0,
        params.world.width as i32,
        params.world.height as i32,
    );
    let mut qtree = Quadtree::new(bounds);
    let mut flower_qtree = Quadtree::new(bounds);
    for actor in next.values() {
        let point = QuadPoint {
            x: actor.x,
            y: actor.y,
            id: actor.id,
        };
        qtree.insert(point);
        if matches!(actor.kind, ActorKind::Flower(_)) {
            flower_qtree.insert(point);
        }
    }
    (qtree, flower_qtree)
}

/// At most one flower or seed per cell: the first in id-iteration order
/// wins, later ones are deleted.
fn resolve_flower_exclusivity(next: &mut BTreeMap<Uuid, Actor>) {
    let mut occupied: HashSet<Coord> = HashSet::new();
    let mut doomed: Vec<Uuid> = Vec::new();
    for actor in next.values() {
        if actor.is_flower_or_seed() && !occupied.insert(actor.pos()) {
            doomed.push(actor.id);
        }
    }
    for id in doomed {
        next.remove(&id);
    }
}

/// Flora at zero health never reaches the committed grid, whichever path
/// drained it.
fn cull_dead_flora(next: &mut BTreeMap<Uuid, Actor>, counters: &mut TickCounters) {
    let doomed: Vec<Uuid> = next
        .values()
        .filter(|a| match &a.kind {
            ActorKind::Flower(f) => f.health <= 0.0,
            ActorKind::FlowerSeed(s) => s.health <= 0.0,
            _ => false,
        })
        .map(|a| a.id)
        .collect();
    for id in doomed {
        next.remove(&id);
        counters.flowers_withered += 1;
    }
}
