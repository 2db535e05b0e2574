use uuid::Uuid;

use crate::model::actor::{generate_id, Actor, ActorKind, HerbicideSmoke};
use crate::model::behaviors::{neighbors8, smoke_at, BehaviorCtx};

/// Serpentine sweep: drop smoke, step along (dx, dy); at the grid edge
/// take the turn vector and reverse direction; leaving the grid entirely
/// retires the plane.
pub fn plane_tick(ctx: &mut BehaviorCtx, id: Uuid) {
    let Some(actor) = ctx.next.get(&id) else { return };
    let ActorKind::HerbicidePlane(plane) = &actor.kind else { return };
    let mut plane = plane.clone();
    let at = actor.pos();

    if !smoke_at(ctx.next, at) {
        let smoke_id = generate_id(ctx.rng);
        ctx.next.insert(
            smoke_id,
            Actor::new(
                smoke_id,
                at.x,
                at.y,
                ActorKind::HerbicideSmoke(HerbicideSmoke {
                    lifespan: ctx.params.herbicide.smoke_lifespan,
                    can_be_expanded: 1,
                }),
            ),
        );
    }

    let mut nx = at.x as i32 + plane.dx;
    let mut ny = at.y as i32 + plane.dy;
    if !ctx.in_bounds(nx, ny) {
        nx = at.x as i32 + plane.turn_dx;
        ny = at.y as i32 + plane.turn_dy;
        plane.dx = -plane.dx;
        plane.dy = -plane.dy;
        if !ctx.in_bounds(nx, ny) {
            ctx.next.remove(&id);
            return;
        }
    }

    if let Some(actor) = ctx.next.get_mut(&id) {
        actor.x = nx as u16;
        actor.y = ny as u16;
        actor.kind = ActorKind::HerbicidePlane(plane);
    }
}

/// Smoke damages every co-located flower or seed, expands once into its
/// 8 neighbors, and dissipates when its lifespan runs out.
pub fn smoke_tick(ctx: &mut BehaviorCtx, id: Uuid) {
    let Some(actor) = ctx.next.get(&id) else { return };
    let ActorKind::HerbicideSmoke(smoke) = &actor.kind else { return };
    let mut smoke = smoke.clone();
    let at = actor.pos();

    let victims: Vec<Uuid> = ctx
        .next
        .values()
        .filter(|a| a.pos() == at && a.is_flower_or_seed())
        .map(|a| a.id)
        .collect();
    for victim_id in victims {
        let damage = ctx.params.herbicide.damage;
        let dead = match ctx.next.get_mut(&victim_id).map(|a| &mut a.kind) {
            Some(ActorKind::Flower(flower)) => {
                flower.health -= damage;
                flower.health <= 0.0
            }
            Some(ActorKind::FlowerSeed(seed)) => {
                seed.health -= damage;
                seed.health <= 0.0
            }
            _ => false,
        };
        if dead {
            ctx.next.remove(&victim_id);
            ctx.counters.flowers_withered += 1;
        }
    }

    if smoke.can_be_expanded > 0 {
        for spot in neighbors8(at, ctx.width(), ctx.height()) {
            if smoke_at(ctx.next, spot) {
                continue;
            }
            let smoke_id = generate_id(ctx.rng);
            ctx.next.insert(
                smoke_id,
                Actor::new(
                    smoke_id,
                    spot.x,
                    spot.y,
                    ActorKind::HerbicideSmoke(HerbicideSmoke {
                        lifespan: smoke.lifespan,
                        can_be_expanded: 0,
                    }),
                ),
            );
        }
        smoke.can_be_expanded = 0;
    }

    smoke.lifespan = smoke.lifespan.saturating_sub(1);
    if smoke.lifespan == 0 {
        ctx.next.remove(&id);
        return;
    }
    if let Some(actor) = ctx.next.get_mut(&id) {
        actor.kind = ActorKind::HerbicideSmoke(smoke);
    }
}
