use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::model::actor::{Actor, ActorKind, Coord};
use crate::model::config::SimulationParams;
use crate::model::events::{EngineEvent, TickCounters};
use crate::model::factory::FlowerFactory;
use crate::model::grid::Grid;
use crate::model::quadtree::Quadtree;

pub mod bird;
pub mod eagle;
pub mod egg;
pub mod flower;
pub mod herbicide;
pub mod insect;
pub mod nutrient;

/// Everything a behavior may touch during its slice of the tick. The
/// quadtrees and snapshot are the pre-tick view; `next` is the shared
/// mutable state; the event sink, counters and queue are append-only.
pub struct BehaviorCtx<'a> {
    pub params: &'a SimulationParams,
    pub snapshot: &'a Grid,
    pub next: &'a mut BTreeMap<Uuid, Actor>,
    pub qtree: &'a Quadtree,
    pub flower_qtree: &'a Quadtree,
    pub events: &'a mut Vec<EngineEvent>,
    pub counters: &'a mut TickCounters,
    pub factory: &'a mut FlowerFactory,
    pub queued: &'a mut Vec<Actor>,
    pub temperature: f64,
    pub tick: u64,
    pub rng: &'a mut ChaCha8Rng,
}

impl<'a> BehaviorCtx<'a> {
    pub fn width(&self) -> u16 {
        self.params.world.width
    }

    pub fn height(&self) -> u16 {
        self.params.world.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i32 && y < self.height() as i32
    }
}

/// Dispatch by the actor's snapshot tag. The actor may already have been
/// removed by an earlier behavior this tick; each behavior re-checks.
pub fn dispatch(ctx: &mut BehaviorCtx, snapshot_actor: &Actor) {
    match &snapshot_actor.kind {
        ActorKind::Flower(_) => flower::flower_tick(ctx, snapshot_actor.id),
        ActorKind::FlowerSeed(_) => flower::seed_tick(ctx, snapshot_actor.id),
        ActorKind::Insect(_) => insect::insect_tick(ctx, snapshot_actor.id),
        ActorKind::Bird(_) => bird::bird_tick(ctx, snapshot_actor.id),
        ActorKind::Eagle(_) => eagle::eagle_tick(ctx, snapshot_actor.id),
        ActorKind::Egg(_) => egg::egg_tick(ctx, snapshot_actor.id),
        ActorKind::Nutrient(_) => nutrient::nutrient_tick(ctx, snapshot_actor.id),
        ActorKind::HerbicidePlane(_) => herbicide::plane_tick(ctx, snapshot_actor.id),
        ActorKind::HerbicideSmoke(_) => herbicide::smoke_tick(ctx, snapshot_actor.id),
    }
}

/// One grid step toward `to`, moving along both axes at once.
pub fn step_toward(from: Coord, to: Coord) -> Coord {
    let dx = (to.x as i32 - from.x as i32).signum();
    let dy = (to.y as i32 - from.y as i32).signum();
    Coord::new((from.x as i32 + dx) as u16, (from.y as i32 + dy) as u16)
}

pub fn neighbors8(at: Coord, width: u16, height: u16) -> Vec<Coord> {
    let mut out = Vec::with_capacity(8);
    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let x = at.x as i32 + dx;
            let y = at.y as i32 + dy;
            if x >= 0 && y >= 0 && x < width as i32 && y < height as i32 {
                out.push(Coord::new(x as u16, y as u16));
            }
        }
    }
    out
}

pub fn neighbors4(at: Coord, width: u16, height: u16) -> Vec<Coord> {
    let mut out = Vec::with_capacity(4);
    for (dx, dy) in [(1i32, 0i32), (-1, 0), (0, 1), (0, -1)] {
        let x = at.x as i32 + dx;
        let y = at.y as i32 + dy;
        if x >= 0 && y >= 0 && x < width as i32 && y < height as i32 {
            out.push(Coord::new(x as u16, y as u16));
        }
    }
    out
}

pub fn flower_or_seed_at(next: &BTreeMap<Uuid, Actor>, at: Coord) -> Option<&Actor> {
    next.values()
        .find(|a| a.pos() == at && a.is_flower_or_seed())
}

pub fn other_bird_at(next: &BTreeMap<Uuid, Actor>, at: Coord, own_id: Uuid) -> bool {
    next.values()
        .any(|a| a.id != own_id && a.pos() == at && matches!(a.kind, ActorKind::Bird(_)))
}

pub fn smoke_at(next: &BTreeMap<Uuid, Actor>, at: Coord) -> bool {
    next.values()
        .any(|a| a.pos() == at && matches!(a.kind, ActorKind::HerbicideSmoke(_)))
}

pub fn nutrient_at(next: &BTreeMap<Uuid, Actor>, at: Coord) -> bool {
    next.values()
        .any(|a| a.pos() == at && matches!(a.kind, ActorKind::Nutrient(_)))
}

/// Free cell for a new seed around `center`: no flower or seed in the
/// shared state or the pending queue. The wind-side neighbor is preferred
/// with probability `wind_strength`.
pub fn free_seed_cell_around(
    next: &BTreeMap<Uuid, Actor>,
    queued: &[Actor],
    center: Coord,
    params: &SimulationParams,
    rng: &mut ChaCha8Rng,
) -> Option<Coord> {
    let taken = |at: Coord| {
        flower_or_seed_at(next, at).is_some()
            || queued.iter().any(|a| a.pos() == at && a.is_flower_or_seed())
    };
    let free: Vec<Coord> = neighbors8(center, params.world.width, params.world.height)
        .into_iter()
        .filter(|&at| !taken(at))
        .collect();
    if free.is_empty() {
        return None;
    }
    let windward = Coord::new(
        (center.x as i32 + params.climate.wind_dx).clamp(0, params.world.width as i32 - 1) as u16,
        (center.y as i32 + params.climate.wind_dy).clamp(0, params.world.height as i32 - 1) as u16,
    );
    if free.contains(&windward)
        && params.climate.wind_strength > 0.0
        && rng.gen_bool(params.climate.wind_strength.min(1.0))
    {
        return Some(windward);
    }
    Some(free[rng.gen_range(0..free.len())])
}

/// A random cell containing no actor matching `occupied`; probes randomly
/// first, then falls back to a full row-major scan.
pub fn random_cell_without(
    next: &BTreeMap<Uuid, Actor>,
    params: &SimulationParams,
    rng: &mut ChaCha8Rng,
    occupied: impl Fn(&Actor) -> bool,
) -> Option<Coord> {
    let (w, h) = (params.world.width, params.world.height);
    let taken: Vec<Coord> = next.values().filter(|a| occupied(a)).map(|a| a.pos()).collect();
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
