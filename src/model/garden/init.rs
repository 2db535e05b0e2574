use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::model::actor::{generate_id, random_species, Actor, ActorKind, Bird, Coord, Insect};
use crate::model::events::{EngineEvent, Importance};
use crate::model::factory::estimate_seed_health;
use crate::model::garden::Garden;

impl Garden {
    /// Places the initial population: flower seeds (requested from the
    /// factory), insects and birds, each on its own cell kind-wise.
    pub fn populate(&mut self) {
        let mut next: BTreeMap<Uuid, Actor> = BTreeMap::new();
        let mut flora_cells: HashSet<Coord> = HashSet::new();

        for _ in 0..self.params.world.initial_flowers {
            let Some(at) = self.pick_cell(|c| !flora_cells.contains(c)) else { break };
            if let Some(seed) = self.factory.request_flower(
                &mut self.rng,
                at.x,
                at.y,
                None,
                None,
                estimate_seed_health(&next),
            ) {
                flora_cells.insert(at);
                next.insert(seed.id, seed);
            }
        }

        for _ in 0..self.params.world.initial_insects {
            if let Some(at) = self.pick_cell(|_| true) {
                let id = generate_id(&mut self.rng);
                let species = random_species(&mut self.rng);
                next.insert(
                    id,
                    Actor::new(id, at.x, at.y, ActorKind::Insect(Insect::hatch(species))),
                );
            }
        }

        let mut bird_cells: HashSet<Coord> = HashSet::new();
        for _ in 0..self.params.world.initial_birds {
            let Some(at) = self.pick_cell(|c| !bird_cells.contains(c)) else { break };
            bird_cells.insert(at);
            let id = generate_id(&mut self.rng);
            next.insert(
                id,
                Actor::new(id, at.x, at.y, ActorKind::Bird(Bird::default())),
            );
        }

        self.grid = crate::model::grid::Grid::from_actors(
            self.params.world.width,
            self.params.world.height,
            next.into_values(),
        );
    }

    fn pick_cell(&mut self, accept: impl Fn(&Coord) -> bool) -> Option<Coord> {
        let (w, h) = (self.params.world.width, self.params.world.height);
        for _ in 0..64 {
            let at = Coord::new(self.rng.gen_range(0..w), self.rng.gen_range(0..h));
            if accept(&at) {
                return Some(at);
            }
        }
        for y in 0..h {
            for x in 0..w {
                let at = Coord::new(x, y);
                if accept(&at) {
                    return Some(at);
                }
            }
        }
        None
    }

    /// Winter has starved the garden: at the turn of spring, wiped-out
    /// populations are restocked at their initial counts. A transient
    /// occupancy set tracks placements made during this step.
    pub(super) fn spring_repopulation(
        &mut self,
        next: &mut BTreeMap<Uuid, Actor>,
        events: &mut Vec<EngineEvent>,
    ) {
        let flora = next.values().filter(|a| a.is_flower_or_seed()).count();
        let insects = next
            .values()
            .filter(|a| matches!(a.kind, ActorKind::Insect(_)))
            .count();
        if flora > 0 && insects > 0 {
            return;
        }

        let mut flora_cells: HashSet<Coord> = next
            .values()
            .filter(|a| a.is_flower_or_seed())
            .map(|a| a.pos())
            .collect();

        if flora == 0 {
            for _ in 0..self.params.world.initial_flowers {
                let Some(at) = self.pick_cell(|c| !flora_cells.contains(c)) else { break };
                let estimate = estimate_seed_health(next);
                if let Some(seed) =
                    self.factory
                        .request_flower(&mut self.rng, at.x, at.y, None, None, estimate)
                {
                    flora_cells.insert(at);
                    next.insert(seed.id, seed);
                }
            }
            events.push(EngineEvent::info(
                self.tick,
                Importance::High,
                "Spring reseeds the barren garden",
            ));
        }

        if insects == 0 {
            for _ in 0..self.params.world.initial_insects {
                if let Some(at) = self.pick_cell(|_| true) {
                    let id = generate_id(&mut self.rng);
                    let species = random_species(&mut self.rng);
                    next.insert(
                        id,
                        Actor::new(id, at.x, at.y, ActorKind::Insect(Insect::hatch(species))),
                    );
                }
            }
            events.push(EngineEvent::info(
                self.tick,
                Importance::High,
                "Spring brings a new brood of insects",
            ));
        }
    }
}
