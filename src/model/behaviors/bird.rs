use rand::Rng;
use uuid::Uuid;

use crate::model::actor::{generate_id, Actor, ActorKind, Coord, Nutrient};
use crate::model::behaviors::{
    flower_or_seed_at, other_bird_at, random_cell_without, step_toward, BehaviorCtx,
};
use crate::model::constants::{
    BIRD_DROP_NUTRIENT_CHANCE, BIRD_VISION_RADIUS, NUTRIENT_FROM_PREY_LIFESPAN, NUTRIENT_LIFESPAN,
};

enum Prey {
    Insect,
    Egg,
}

/// Hunter state machine: lock onto unprotected prey, pursue it, otherwise
/// patrol toward a random mature flower. Acquiring a target consumes the
/// turn; birds never share a cell with another bird.
pub fn bird_tick(ctx: &mut BehaviorCtx, id: Uuid) {
    let Some(actor) = ctx.next.get(&id) else { return };
    let ActorKind::Bird(bird) = &actor.kind else { return };
    let mut bird = bird.clone();
    let mut at = actor.pos();
    let mut moved = false;

    if bird.target.is_none() {
        bird.target = acquire_target(ctx, at);
        moved = bird.target.is_some();
    } else if let Some(goal) = bird.target {
        match prey_at(ctx, goal) {
            None => bird.target = None,
            Some((prey_id, prey)) => {
                let step = step_toward(at, goal);
                if step == at || !other_bird_at(ctx.next, step, id) {
                    at = step;
                    moved = true;
                    if at == goal {
                        ctx.next.remove(&prey_id);
                        match prey {
                            Prey::Insect => {
                                let nutrient_id = generate_id(ctx.rng);
                                ctx.next.insert(
                                    nutrient_id,
                                    Actor::new(
                                        nutrient_id,
                                        goal.x,
                                        goal.y,
                                        ActorKind::Nutrient(Nutrient {
                                            lifespan: NUTRIENT_FROM_PREY_LIFESPAN,
                                        }),
                                    ),
                                );
                                ctx.counters.insects_eaten += 1;
                            }
                            Prey::Egg => ctx.counters.eggs_eaten += 1,
                        }
                        bird.target = None;
                    }
                }
            }
        }
    }

    if !moved {
        if bird.patrol_target.is_none() {
            bird.patrol_target = random_mature_flower(ctx);
        }
        if let Some(goal) = bird.patrol_target {
            let step = step_toward(at, goal);
            if !other_bird_at(ctx.next, step, id) {
                at = step;
            }
            if at == goal {
                bird.patrol_target = None;
            }
        } else {
            let options: Vec<Coord> =
                crate::model::behaviors::neighbors4(at, ctx.width(), ctx.height())
                    .into_iter()
                    .filter(|&c| !other_bird_at(ctx.next, c, id))
                    .collect();
            if !options.is_empty() {
                at = options[ctx.rng.gen_range(0..options.len())];
            }
        }
    }

    if ctx.rng.gen_bool(BIRD_DROP_NUTRIENT_CHANCE) {
        if let Some(spot) = random_cell_without(ctx.next, ctx.params, ctx.rng, |a| {
            matches!(a.kind, ActorKind::Nutrient(_))
        }) {
            let nutrient_id = generate_id(ctx.rng);
            ctx.next.insert(
                nutrient_id,
                Actor::new(
                    nutrient_id,
                    spot.x,
                    spot.y,
                    ActorKind::Nutrient(Nutrient {
                        lifespan: NUTRIENT_LIFESPAN,
                    }),
                ),
            );
        }
    }

    if let Some(actor) = ctx.next.get_mut(&id) {
        actor.x = at.x;
        actor.y = at.y;
        actor.kind = ActorKind::Bird(bird);
    }
}

/// Closest unprotected insect or egg within vision. Prey standing on a
/// flower's cell is covered and invisible to the bird.
fn acquire_target(ctx: &BehaviorCtx, from: Coord) -> Option<Coord> {
    let mut best: Option<(i64, Coord)> = None;
    for point in ctx.qtree.query_around(from.x, from.y, BIRD_VISION_RADIUS) {
        let Some(candidate) = ctx.next.get(&point.id) else { continue };
        if !matches!(candidate.kind, ActorKind::Insect(_) | ActorKind::Egg(_)) {
            continue;
        }
        let pos = candidate.pos();
        if flower_or_seed_at(ctx.next, pos).is_some() {
            continue;
        }
        let distance = from.distance_sq(pos);
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, pos));
        }
    }
    best.map(|(_, pos)| pos)
}

fn prey_at(ctx: &BehaviorCtx, at: Coord) -> Option<(Uuid, Prey)> {
    ctx.next.values().find_map(|a| {
        if a.pos() != at {
            return None;
        }
        match a.kind {
            ActorKind::Insect(_) => Some((a.id, Prey::Insect)),
            ActorKind::Egg(_) => Some((a.id, Prey::Egg)),
            _ => None,
        }
    })
}

fn random_mature_flower(ctx: &mut BehaviorCtx) -> Option<Coord> {
    let everything = ctx.flower_qtree.query_around(
        ctx.width() / 2,
        ctx.height() / 2,
        ctx.width().max(ctx.height()) as i32,
    );
    let mature: Vec<Coord> = everything
        .into_iter()
        .filter_map(|p| {
            let actor = ctx.next.get(&p.id)?;
            let flower = actor.as_flower()?;
            flower.is_mature.then(|| actor.pos())
        })
        .collect();
    if mature.is_empty() {
        None
    } else {
        Some(mature[ctx.rng.gen_range(0..mature.len())])
    }
}
