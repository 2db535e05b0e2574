mod common;

use common::{count_actors, find_actor, flower_payload, smoke_at, GardenBuilder};
use evogarden::model::actor::{ActorKind, Coord, Genome};
use evogarden::model::factory::FactoryResponse;

#[test]
fn test_completed_seed_blooms_with_accumulated_age() {
    let (mut garden, worker) = GardenBuilder::new(5, 5).build();
    let seed = garden
        .factory
        .request_flower(&mut garden.rng, 1, 1, None, None, 10.0)
        .unwrap();
    let request_id = seed.id;
    garden.grid.insert(seed);

    // Synthesis is slow; the seed ages meanwhile.
    for _ in 0..12 {
        garden.step();
    }
    let aged = find_actor(&garden, &|a| matches!(a.kind, ActorKind::FlowerSeed(_))).unwrap();
    match &aged.kind {
        ActorKind::FlowerSeed(s) => assert_eq!(s.age, 12),
        _ => unreachable!(),
    }

    worker
        .completions
        .send(FactoryResponse::FlowerCreated {
            request_id,
            flower: Some(flower_payload("child")),
        })
        .unwrap();

    let output = garden.step();
    assert_eq!(
        count_actors(&garden, &|a| matches!(a.kind, ActorKind::FlowerSeed(_))),
        0
    );
    let flower = find_actor(&garden, &|a| matches!(a.kind, ActorKind::Flower(_))).unwrap();
    assert_eq!(flower.pos(), Coord::new(1, 1));
    match &flower.kind {
        // Maturation period 10 < carried age: the bloom is already mature,
        // plus one more tick of aging from its own behavior.
        ActorKind::Flower(f) => {
            assert!(f.age >= 12);
            assert!(f.is_mature);
        }
        _ => unreachable!(),
    }
    assert!(output.events.iter().any(|e| e.message.contains("bloomed")));
}

#[test]
fn test_completion_for_destroyed_seed_is_discarded() {
    let (mut garden, worker) = GardenBuilder::new(5, 5)
        .with_params(|p| p.herbicide.damage = 100.0)
        .build();
    let seed = garden
        .factory
        .request_flower(&mut garden.rng, 0, 0, None, None, 10.0)
        .unwrap();
    let request_id = seed.id;
    garden.grid.insert(seed);
    garden.grid.insert(smoke_at(99, 0, 0, 3));

    // The smoke destroys the seed before the service answers.
    garden.step();
    assert_eq!(
        count_actors(&garden, &|a| matches!(a.kind, ActorKind::FlowerSeed(_))),
        0
    );

    worker
        .completions
        .send(FactoryResponse::FlowerCreated {
            request_id,
            flower: Some(flower_payload("orphan")),
        })
        .unwrap();
    garden.step();
    assert_eq!(
        count_actors(&garden, &|a| matches!(a.kind, ActorKind::Flower(_))),
        0,
        "an orphaned completion must not bloom"
    );
}

#[test]
fn test_failed_synthesis_drops_seed_silently() {
    let (mut garden, worker) = GardenBuilder::new(5, 5).build();
    let seed = garden
        .factory
        .request_flower(&mut garden.rng, 2, 2, None, None, 10.0)
        .unwrap();
    let request_id = seed.id;
    garden.grid.insert(seed);

    worker
        .completions
        .send(FactoryResponse::FlowerCreated {
            request_id,
            flower: None,
        })
        .unwrap();
    let output = garden.step();
    assert_eq!(
        count_actors(&garden, &|a| a.is_flower_or_seed()),
        0
    );
    assert!(
        !output.events.iter().any(|e| e.message.contains("bloomed")),
        "failure must stay silent"
    );
}

#[test]
fn test_pending_requests_are_reported_in_summary() {
    let (mut garden, _worker) = GardenBuilder::new(5, 5).build();
    for x in 0..3u16 {
        if let Some(seed) = garden
            .factory
            .request_flower(&mut garden.rng, x, 0, None, None, 10.0)
        {
            garden.grid.insert(seed);
        }
    }
    let output = garden.step();
    assert_eq!(output.summary.pending_flower_requests, 3);
    assert_eq!(output.summary.counts.seeds, 3);
}

#[test]
fn test_drawn_image_patches_flower_on_load_path() {
    let flower = common::FlowerBuilder::new(5).at(3, 3).build();
    let (mut garden, worker) = GardenBuilder::new(5, 5).with_actor(flower).build();

    let envelope = garden.save_state();
    garden.load_state(envelope).unwrap();

    // Images were stripped by the save; a redraw request goes out.
    let stripped = find_actor(&garden, &|a| matches!(a.kind, ActorKind::Flower(_))).unwrap();
    let flower_id = stripped.id;
    match &stripped.kind {
        ActorKind::Flower(f) => {
            assert!(f.image.is_empty());
            assert_eq!(f.genome, Genome("genome-5".into()));
        }
        _ => unreachable!(),
    }

    worker
        .completions
        .send(FactoryResponse::ImageDrawn {
            request_id: flower_id,
            image: "redrawn.svg".into(),
        })
        .unwrap();
    garden.step();
    let patched = find_actor(&garden, &|a| matches!(a.kind, ActorKind::Flower(_))).unwrap();
    match &patched.kind {
        ActorKind::Flower(f) => assert_eq!(f.image, "redrawn.svg"),
        _ => unreachable!(),
    }
}
