use rand::Rng;
use uuid::Uuid;

use crate::model::actor::ActorKind;
use crate::model::behaviors::{free_seed_cell_around, BehaviorCtx};
use crate::model::constants::{
    FLOWER_SELF_SEED_CHANCE, FLOWER_SELF_SEED_STAMINA_COST, FLOWER_SELF_SEED_STAMINA_THRESHOLD,
    FLOWER_STAMINA_REGEN, FLOWER_TEMP_STRESS_RATE,
};
use crate::model::factory::estimate_seed_health;

/// Ages the flower, regenerates stamina, applies temperature stress and
/// occasionally self-seeds into a free neighboring cell.
pub fn flower_tick(ctx: &mut BehaviorCtx, id: Uuid) {
    let Some(actor) = ctx.next.get(&id) else { return };
    let ActorKind::Flower(flower) = &actor.kind else { return };
    let at = actor.pos();
    let mut flower = flower.clone();

    flower.age += 1;
    flower.refresh_maturity();
    flower.stamina = (flower.stamina + FLOWER_STAMINA_REGEN).min(flower.max_stamina);

    let t = ctx.temperature;
    if t < flower.min_temp {
        flower.health -= (flower.min_temp - t) * FLOWER_TEMP_STRESS_RATE;
    } else if t > flower.max_temp {
        flower.health -= (t - flower.max_temp) * FLOWER_TEMP_STRESS_RATE;
    }
    if flower.health <= 0.0 {
        ctx.next.remove(&id);
        ctx.counters.flowers_withered += 1;
        return;
    }

    if flower.is_mature
        && flower.stamina >= FLOWER_SELF_SEED_STAMINA_THRESHOLD * flower.max_stamina
        && ctx.rng.gen_bool(FLOWER_SELF_SEED_CHANCE)
    {
        if let Some(spot) = free_seed_cell_around(ctx.next, ctx.queued, at, ctx.params, ctx.rng) {
            let estimate = estimate_seed_health(ctx.next);
            if let Some(seed) = ctx.factory.request_flower(
                ctx.rng,
                spot.x,
                spot.y,
                Some(flower.genome.clone()),
                None,
                estimate,
            ) {
                ctx.queued.push(seed);
                flower.stamina = (flower.stamina - FLOWER_SELF_SEED_STAMINA_COST).max(0.0);
            }
        }
    }

    if let Some(actor) = ctx.next.get_mut(&id) {
        actor.kind = ActorKind::Flower(flower);
    }
}

/// Seeds only age, so maturation is not lost to synthesis latency.
pub fn seed_tick(ctx: &mut BehaviorCtx, id: Uuid) {
    if let Some(actor) = ctx.next.get_mut(&id) {
        if let ActorKind::FlowerSeed(seed) = &mut actor.kind {
            seed.age += 1;
        }
    }
}
