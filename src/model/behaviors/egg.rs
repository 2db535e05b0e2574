use uuid::Uuid;

use crate::model::actor::{generate_id, Actor, ActorKind, Insect};
use crate::model::behaviors::BehaviorCtx;
use crate::model::events::{EngineEvent, Importance};

/// Counts down the hatch timer. A bird sitting on the egg's cell at hatch
/// time means no insect emerges.
pub fn egg_tick(ctx: &mut BehaviorCtx, id: Uuid) {
    let Some(actor) = ctx.next.get(&id) else { return };
    let ActorKind::Egg(egg) = &actor.kind else { return };
    let at = actor.pos();
    let mut egg = egg.clone();

    egg.hatch_timer = egg.hatch_timer.saturating_sub(1);
    if egg.hatch_timer > 0 {
        if let Some(actor) = ctx.next.get_mut(&id) {
            actor.kind = ActorKind::Egg(egg);
        }
        return;
    }

    ctx.next.remove(&id);
    let bird_present = ctx
        .next
        .values()
        .any(|a| a.pos() == at && matches!(a.kind, ActorKind::Bird(_)));
    if bird_present {
        tracing::debug!(x = at.x, y = at.y, "egg hatched under a bird, no insect");
        return;
    }

    let insect_id = generate_id(ctx.rng);
    ctx.next.insert(
        insect_id,
        Actor::new(
            insect_id,
            at.x,
            at.y,
            ActorKind::Insect(Insect::hatch(egg.insect_emoji)),
        ),
    );
    ctx.counters.insects_born += 1;
    ctx.events.push(EngineEvent::success(
        ctx.tick,
        Importance::Low,
        format!("An egg hatched into a {}", egg.insect_emoji),
    ));
}
