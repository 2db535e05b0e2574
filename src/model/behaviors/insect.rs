use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::model::actor::{generate_id, Actor, ActorKind, Coord, Egg, Pollen};
use crate::model::behaviors::{free_seed_cell_around, step_toward, BehaviorCtx};
use crate::model::config::SimulationParams;
use crate::model::constants::{
    EGG_HATCH_TIME, INSECT_REPRODUCTION_CHANCE, INSECT_TOXICITY_DAMAGE, INSECT_VISION_RADIUS,
};
use crate::model::events::{EngineEvent, Importance, TickCounters};
use crate::model::quadtree::{Quadtree, Rect};

/// Forager tick: age, seek flowers, carry pollen between them. Stepping
/// onto a toxic flower costs lifespan; pollinating a second, different
/// flower requests an offspring from the factory.
pub fn insect_tick(ctx: &mut BehaviorCtx, id: Uuid) {
    let Some(actor) = ctx.next.get(&id) else { return };
    let ActorKind::Insect(insect) = &actor.kind else { return };
    let mut insect = insect.clone();
    let mut at = actor.pos();

    if insect.lifespan <= 1 {
        ctx.next.remove(&id);
        ctx.counters.insects_died_of_old_age += 1;
        return;
    }
    insect.lifespan -= 1;
    insect.reproduction_cooldown = insect.reproduction_cooldown.saturating_sub(1);

    // Vision over the flower index, re-checked against the live state.
    let mut candidates: Vec<(Coord, f64)> = Vec::new();
    for point in ctx
        .flower_qtree
        .query_around(at.x, at.y, INSECT_VISION_RADIUS)
    {
        let Some(target) = ctx.next.get(&point.id) else { continue };
        let Some(flower) = target.as_flower() else { continue };
        if !flower.is_mature {
            continue;
        }
        // Dispersal: carried pollen should reach a different flower.
        if let Some(pollen) = &insect.pollen {
            if pollen.source_flower_id == target.id {
                continue;
            }
        }
        candidates.push((target.pos(), flower.max_health - flower.health));
    }

    if let Some(goal) = pick_goal(&candidates, at, ctx.rng) {
        if goal != at {
            at = step_toward(at, goal);
        }
    }

    // Landing on a flower: toxicity, then pollen pickup or deposit.
    let landed = ctx.next.values().find_map(|a| match &a.kind {
        ActorKind::Flower(f) if a.pos() == at => Some((a.id, f.clone())),
        _ => None,
    });
    if let Some((flower_id, flower)) = landed {
        if flower.toxicity_rate > 0.0 {
            let damage = (flower.toxicity_rate * INSECT_TOXICITY_DAMAGE).round() as u32;
            if damage >= insect.lifespan {
                ctx.next.remove(&id);
                ctx.counters.insects_poisoned += 1;
                return;
            }
            insect.lifespan -= damage;
        }

        match &insect.pollen {
            None => {
                if ctx.rng.gen_bool(ctx.params.insect.pollination_chance.min(1.0)) {
                    insect.pollen = Some(Pollen {
                        genome: flower.genome.clone(),
                        source_flower_id: flower_id,
                    });
                }
            }
            Some(pollen)
                if pollen.source_flower_id != flower_id
                    && flower.is_mature
                    && insect.reproduction_cooldown == 0 =>
            {
                if ctx.rng.gen_bool(ctx.params.insect.pollination_chance.min(1.0)) {
                    if let Some(spot) =
                        free_seed_cell_around(ctx.next, ctx.queued, at, ctx.params, ctx.rng)
                    {
                        let estimate = crate::model::factory::estimate_seed_health(ctx.next);
                        if let Some(seed) = ctx.factory.request_flower(
                            ctx.rng,
                            spot.x,
                            spot.y,
                            Some(pollen.genome.clone()),
                            Some(flower.genome.clone()),
                            estimate,
                        ) {
                            ctx.queued.push(seed);
                            insect.pollen = None;
                            insect.reproduction_cooldown =
                                ctx.params.insect.reproduction_cooldown;
                            ctx.counters.flowers_pollinated += 1;
                            ctx.events.push(EngineEvent::success(
                                ctx.tick,
                                Importance::Low,
                                format!("{} pollinated a flower", insect.emoji),
                            ));
                        }
                    }
                }
            }
            Some(_) => {}
        }
    }

    if let Some(actor) = ctx.next.get_mut(&id) {
        actor.x = at.x;
        actor.y = at.y;
        actor.kind = ActorKind::Insect(insect);
    }
}

/// Closest candidate wins; ties prefer the most damaged flower, then fall
/// to a random pick.
fn pick_goal(
    candidates: &[(Coord, f64)],
    from: Coord,
    rng: &mut ChaCha8Rng,
) -> Option<Coord> {
    let best_distance = candidates
        .iter()
        .map(|(c, _)| from.distance_sq(*c))
        .min()?;
    let closest: Vec<&(Coord, f64)> = candidates
        .iter()
        .filter(|(c, _)| from.distance_sq(*c) == best_distance)
        .collect();
    let best_missing = closest
        .iter()
        .map(|(_, missing)| *missing)
        .fold(f64::MIN, f64::max);
    let tied: Vec<Coord> = closest
        .iter()
        .filter(|(_, missing)| *missing == best_missing)
        .map(|(c, _)| *c)
        .collect();
    Some(tied[rng.gen_range(0..tied.len())])
}

/// Engine phase after the behavior pass: adjacent same-species insects off
/// cooldown pair up and may lay an egg in an empty neighboring cell. Ties
/// for a partner resolve by id-iteration order.
#[allow(clippy::too_many_arguments)]
pub fn reproduction_phase(
    next: &mut BTreeMap<Uuid, Actor>,
    params: &SimulationParams,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<EngineEvent>,
    counters: &mut TickCounters,
    tick: u64,
) {
    let (w, h) = (params.world.width, params.world.height);
    let mut qtree = Quadtree::new(Rect::new(0, 0, w as i32, h as i32));
    for actor in next.values() {
        if matches!(actor.kind, ActorKind::Insect(_)) {
            qtree.insert(crate::model::quadtree::QuadPoint {
                x: actor.x,
                y: actor.y,
                id: actor.id,
            });
        }
    }

    let ids: Vec<Uuid> = next
        .values()
        .filter(|a| matches!(a.kind, ActorKind::Insect(_)))
        .map(|a| a.id)
        .collect();
    let mut paired: HashSet<Uuid> = HashSet::new();

    for id in ids {
        if paired.contains(&id) {
            continue;
        }
        let Some(actor) = next.get(&id) else { continue };
        let Some(insect) = actor.as_insect() else { continue };
        if insect.reproduction_cooldown > 0 {
            continue;
        }
        let at = actor.pos();
        let emoji = insect.emoji;

        let partner = qtree.query_around(at.x, at.y, 1).into_iter().find(|p| {
            p.id != id
                && !paired.contains(&p.id)
                && next
                    .get(&p.id)
                    .and_then(|a| a.as_insect())
                    .is_some_and(|i| i.emoji == emoji && i.reproduction_cooldown == 0)
        });
        let Some(partner) = partner else { continue };

        paired.insert(id);
        paired.insert(partner.id);
        if !rng.gen_bool(INSECT_REPRODUCTION_CHANCE) {
            continue;
        }

        let empty = |at: Coord| !next.values().any(|a| a.pos() == at);
        let Some(spot) = crate::model::behaviors::neighbors8(at, w, h)
            .into_iter()
            .find(|&c| empty(c))
        else {
            continue;
        };

        let egg_id = generate_id(rng);
        next.insert(
            egg_id,
            Actor::new(
                egg_id,
                spot.x,
                spot.y,
                ActorKind::Egg(Egg {
                    hatch_timer: EGG_HATCH_TIME,
                    insect_emoji: emoji,
                }),
            ),
        );
        for insect_id in [id, partner.id] {
            if let Some(i) = next.get_mut(&insect_id).and_then(|a| a.as_insect_mut()) {
                i.reproduction_cooldown = params.insect.reproduction_cooldown;
            }
        }
        counters.eggs_laid += 1;
        events.push(EngineEvent::info(
            tick,
            Importance::Low,
            format!("A pair of {emoji} laid an egg"),
        ));
    }
}
