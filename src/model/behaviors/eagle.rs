use rand::Rng;
use uuid::Uuid;

use crate::model::actor::{ActorKind, Coord};
use crate::model::behaviors::{neighbors4, step_toward, BehaviorCtx};
use crate::model::constants::EAGLE_VISION_RADIUS;

/// Apex hunter: the bird's acquire/pursue pattern with birds as prey.
/// Kills leave no nutrient behind.
pub fn eagle_tick(ctx: &mut BehaviorCtx, id: Uuid) {
    let Some(actor) = ctx.next.get(&id) else { return };
    let ActorKind::Eagle(eagle) = &actor.kind else { return };
    let mut eagle = eagle.clone();
    let mut at = actor.pos();
    let mut moved = false;

    if eagle.target.is_none() {
        eagle.target = acquire_bird(ctx, at);
        moved = eagle.target.is_some();
    } else if let Some(goal) = eagle.target {
        match bird_at(ctx, goal) {
            None => eagle.target = None,
            Some(bird_id) => {
                at = step_toward(at, goal);
                moved = true;
                if at == goal {
                    ctx.next.remove(&bird_id);
                    ctx.counters.birds_hunted += 1;
                    eagle.target = None;
                }
            }
        }
    }

    if !moved {
        let options = neighbors4(at, ctx.width(), ctx.height());
        if !options.is_empty() {
            at = options[ctx.rng.gen_range(0..options.len())];
        }
    }

    if let Some(actor) = ctx.next.get_mut(&id) {
        actor.x = at.x;
        actor.y = at.y;
        actor.kind = ActorKind::Eagle(eagle);
    }
}

fn acquire_bird(ctx: &BehaviorCtx, from: Coord) -> Option<Coord> {
    let mut best: Option<(i64, Coord)> = None;
    for point in ctx.qtree.query_around(from.x, from.y, EAGLE_VISION_RADIUS) {
        let Some(candidate) = ctx.next.get(&point.id) else { continue };
        if !matches!(candidate.kind, ActorKind::Bird(_)) {
            continue;
        }
        let pos = candidate.pos();
        let distance = from.distance_sq(pos);
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, pos));
        }
    }
    best.map(|(_, pos)| pos)
}

fn bird_at(ctx: &BehaviorCtx, at: Coord) -> Option<Uuid> {
    ctx.next
        .values()
        .find(|a| a.pos() == at && matches!(a.kind, ActorKind::Bird(_)))
        .map(|a| a.id)
}
