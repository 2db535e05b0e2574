use std::collections::BTreeMap;
use uuid::Uuid;

use crate::model::actor::{Actor, ActorKind};
use crate::model::behaviors::BehaviorCtx;
use crate::model::constants::FLOWER_NUTRIENT_HEAL;
use crate::model::quadtree::Quadtree;

/// Expiry only; healing happens in the engine phase below.
pub fn nutrient_tick(ctx: &mut BehaviorCtx, id: Uuid) {
    let Some(actor) = ctx.next.get(&id) else { return };
    let ActorKind::Nutrient(nutrient) = &actor.kind else { return };
    if nutrient.lifespan <= 1 {
        ctx.next.remove(&id);
        return;
    }
    if let Some(actor) = ctx.next.get_mut(&id) {
        if let ActorKind::Nutrient(nutrient) = &mut actor.kind {
            nutrient.lifespan -= 1;
        }
    }
}

/// Engine phase before the behavior pass: each nutrient heals every flower
/// in its 3×3 surrounding and is consumed by doing so. A nutrient that
/// finds no flower stays for another tick.
pub fn healing_phase(next: &mut BTreeMap<Uuid, Actor>, qtree: &Quadtree) {
    let nutrients: Vec<(Uuid, u16, u16)> = next
        .values()
        .filter(|a| matches!(a.kind, ActorKind::Nutrient(_)))
        .map(|a| (a.id, a.x, a.y))
        .collect();

    for (nutrient_id, x, y) in nutrients {
        let flower_ids: Vec<Uuid> = qtree
            .query_around(x, y, 1)
            .into_iter()
            .filter(|p| {
                next.get(&p.id)
                    .is_some_and(|a| matches!(a.kind, ActorKind::Flower(_)))
            })
            .map(|p| p.id)
            .collect();
        if flower_ids.is_empty() {
            continue;
        }
        for flower_id in flower_ids {
            if let Some(flower) = next.get_mut(&flower_id).and_then(|a| a.as_flower_mut()) {
                let amount = FLOWER_NUTRIENT_HEAL * flower.nutrient_efficiency;
                flower.health = (flower.health + amount).min(flower.max_health);
                flower.stamina = (flower.stamina + amount).min(flower.max_stamina);
            }
        }
        next.remove(&nutrient_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::actor::{Flower, FlowerEffects, Genome, Nutrient, Sex};
    use crate::model::quadtree::{QuadPoint, Rect};

    fn flower_actor(id: u128, x: u16, y: u16, health: f64) -> Actor {
        Actor::new(
            Uuid::from_u128(id),
            x,
            y,
            ActorKind::Flower(Flower {
                genome: Genome("g".into()),
                image: String::new(),
                health,
                max_health: 100.0,
                stamina: 0.0,
                max_stamina: 100.0,
                nutrient_efficiency: 2.0,
                min_temp: 0.0,
                max_temp: 40.0,
                maturation_period: 10,
                sex: Sex::Both,
                toxicity_rate: 0.0,
                effects: FlowerEffects::default(),
                age: 0,
                is_mature: false,
            }),
        )
    }

    #[test]
    fn test_healing_consumes_nutrient_and_caps_health() {
        let mut next: BTreeMap<Uuid, Actor> = BTreeMap::new();
        let flower = flower_actor(1, 2, 2, 90.0);
        let nutrient = Actor::new(
            Uuid::from_u128(2),
            2,
            3,
            ActorKind::Nutrient(Nutrient { lifespan: 10 }),
        );
        let mut qtree = Quadtree::new(Rect::new(0, 0, 5, 5));
        for a in [&flower, &nutrient] {
            qtree.insert(QuadPoint { x: a.x, y: a.y, id: a.id });
        }
        next.insert(flower.id, flower.clone());
        next.insert(nutrient.id, nutrient.clone());

        healing_phase(&mut next, &qtree);

        assert!(!next.contains_key(&nutrient.id));
        let healed = next.get(&flower.id).unwrap().as_flower().unwrap();
        // 10 * efficiency 2 = 20, capped at max 100.
        assert_eq!(healed.health, 100.0);
        assert_eq!(healed.stamina, 20.0);
    }

    #[test]
    fn test_lonely_nutrient_is_not_consumed() {
        let mut next: BTreeMap<Uuid, Actor> = BTreeMap::new();
        let nutrient = Actor::new(
            Uuid::from_u128(2),
            0,
            0,
            ActorKind::Nutrient(Nutrient { lifespan: 10 }),
        );
        let mut qtree = Quadtree::new(Rect::new(0, 0, 5, 5));
        qtree.insert(QuadPoint { x: 0, y: 0, id: nutrient.id });
        next.insert(nutrient.id, nutrient.clone());

        healing_phase(&mut next, &qtree);
        assert!(next.contains_key(&nutrient.id));
    }
}
