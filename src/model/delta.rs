use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::model::actor::Actor;
use crate::model::GardenError;

/// Minimal per-tick transition for one actor. `Update.changes` holds only
/// the fields of the flat actor encoding whose values differ, `id`
/// excluded. Nested objects (pollen, targets, effects) compare deeply via
/// their serialized values.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ActorDelta {
    Add { actor: Actor },
    Update { id: Uuid, changes: Map<String, Value> },
    Remove { id: Uuid },
}

fn to_fields(actor: &Actor) -> Map<String, Value> {
    match serde_json::to_value(actor) {
        Ok(Value::Object(map)) => map,
        // Actors always encode as objects.
        _ => Map::new(),
    }
}

fn diff_fields(old: &Actor, new: &Actor) -> Map<String, Value> {
    let old_fields = to_fields(old);
    let mut changes = Map::new();
    for (key, value) in to_fields(new) {
        if key == "id" {
            continue;
        }
        if old_fields.get(&key) != Some(&value) {
            changes.insert(key, value);
        }
    }
    changes
}

/// Field-wise diff between the tick-start snapshot and the final actor
/// state. Removals and updates come out in snapshot id order, additions
/// in final id order.
pub fn compute_deltas(
    initial: &BTreeMap<Uuid, Actor>,
    next: &BTreeMap<Uuid, Actor>,
) -> Vec<ActorDelta> {
    let mut deltas = Vec::new();
    for (id, old) in initial {
        match next.get(id) {
            None => deltas.push(ActorDelta::Remove { id: *id }),
            Some(new) => {
                let changes = diff_fields(old, new);
                if !changes.is_empty() {
                    deltas.push(ActorDelta::Update { id: *id, changes });
                }
            }
        }
    }
    for (id, actor) in next {
        if !initial.contains_key(id) {
            deltas.push(ActorDelta::Add {
                actor: actor.clone(),
            });
        }
    }
    deltas
}

/// Replays deltas onto a committed state. Inverse of [`compute_deltas`]:
/// applying a tick's deltas to its starting state reproduces its final
/// state exactly.
pub fn apply_deltas(
    state: &mut BTreeMap<Uuid, Actor>,
    deltas: &[ActorDelta],
) -> Result<(), GardenError> {
    for delta in deltas {
        match delta {
            ActorDelta::Add { actor } => {
                state.insert(actor.id, actor.clone());
            }
            ActorDelta::Remove { id } => {
                state.remove(id);
            }
            ActorDelta::Update { id, changes } => {
                let actor = state.get_mut(id).ok_or_else(|| {
                    GardenError::InvalidDelta(format!("update for unknown actor {id}"))
                })?;
                let mut fields = to_fields(actor);
                for (key, value) in changes {
                    fields.insert(key.clone(), value.clone());
                }
                *actor = serde_json::from_value(Value::Object(fields))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::actor::{ActorKind, Bird, Coord, Insect, Nutrient};

    fn insect(id: u128, x: u16, y: u16) -> Actor {
        Actor::new(Uuid::from_u128(id), x, y, ActorKind::Insect(Insect::hatch('🐝')))
    }

    fn map_of(actors: Vec<Actor>) -> BTreeMap<Uuid, Actor> {
        actors.into_iter().map(|a| (a.id, a)).collect()
    }

    #[test]
    fn test_unchanged_actor_emits_nothing() {
        let state = map_of(vec![insect(1, 2, 2)]);
        assert!(compute_deltas(&state, &state).is_empty());
    }

    #[test]
    fn test_update_contains_only_changed_fields() {
        let initial = map_of(vec![insect(1, 2, 2)]);
        let mut next = initial.clone();
        let actor = next.get_mut(&Uuid::from_u128(1)).unwrap();
        actor.x = 3;
        actor.as_insect_mut().unwrap().lifespan -= 1;

        let deltas = compute_deltas(&initial, &next);
        assert_eq!(deltas.len(), 1);
        match &deltas[0] {
            ActorDelta::Update { changes, .. } => {
                assert_eq!(changes.len(), 2);
                assert!(changes.contains_key("x"));
                assert!(changes.contains_key("lifespan"));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_field_change_is_detected() {
        let bird = Actor::new(
            Uuid::from_u128(1),
            0,
            0,
            ActorKind::Bird(Bird::default()),
        );
        let initial = map_of(vec![bird.clone()]);
        let mut next = initial.clone();
        if let ActorKind::Bird(b) = &mut next.get_mut(&bird.id).unwrap().kind {
            b.target = Some(Coord::new(4, 4));
        }
        let deltas = compute_deltas(&initial, &next);
        match &deltas[0] {
            ActorDelta::Update { changes, .. } => {
                assert_eq!(changes.len(), 1);
                assert!(changes.contains_key("target"));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_add_and_remove() {
        let initial = map_of(vec![insect(1, 0, 0)]);
        let next = map_of(vec![Actor::new(
            Uuid::from_u128(2),
            1,
            1,
            ActorKind::Nutrient(Nutrient { lifespan: 3 }),
        )]);
        let deltas = compute_deltas(&initial, &next);
        assert!(matches!(deltas[0], ActorDelta::Remove { .. }));
        assert!(matches!(deltas[1], ActorDelta::Add { .. }));
    }

    #[test]
    fn test_round_trip_law() {
        let initial = map_of(vec![insect(1, 2, 2), insect(2, 5, 5)]);
        let mut next = initial.clone();
        next.remove(&Uuid::from_u128(2));
        next.get_mut(&Uuid::from_u128(1)).unwrap().y = 9;
        next.insert(Uuid::from_u128(3), insect(3, 0, 1));

        let deltas = compute_deltas(&initial, &next);
        let mut replayed = initial.clone();
        apply_deltas(&mut replayed, &deltas).unwrap();
        assert_eq!(replayed, next);
    }

    #[test]
    fn test_empty_delta_is_identity() {
        let mut state = map_of(vec![insect(1, 2, 2)]);
        let before = state.clone();
        apply_deltas(&mut state, &[]).unwrap();
        assert_eq!(state, before);
    }
}
