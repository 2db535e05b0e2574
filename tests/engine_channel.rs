mod common;

use evogarden::engine::{spawn, EngineCommand, EngineOutput};
use evogarden::model::events::EventKind;
use evogarden::model::factory::factory_channel;
use evogarden::SimulationParams;

fn small_params() -> SimulationParams {
    common::init_tracing();
    let mut params = SimulationParams::default();
    params.world.width = 8;
    params.world.height = 8;
    params.world.seed = Some(7);
    params.world.initial_flowers = 2;
    params.world.initial_insects = 2;
    params.world.initial_birds = 1;
    params.weather.event_chance = 0.0;
    params
}

#[tokio::test(start_paused = true)]
async fn test_engine_initializes_ticks_and_answers_get_state() {
    let mut handle = spawn(small_params());
    let (link, _worker) = factory_channel();
    handle.commands.send(EngineCommand::InitPorts(link)).unwrap();

    assert!(matches!(
        handle.outputs.recv().await,
        Some(EngineOutput::Initialized)
    ));
    let hydrated = handle.outputs.recv().await;
    match hydrated {
        Some(EngineOutput::GridUpdate { tick, .. }) => assert_eq!(tick, 0),
        other => panic!("expected grid update, got {}", describe(&other)),
    }

    handle.commands.send(EngineCommand::Start).unwrap();
    let mut saw_tick = false;
    for _ in 0..10 {
        match handle.outputs.recv().await {
            Some(EngineOutput::TickUpdate { summary, .. }) => {
                assert!(summary.counts.insects <= 2);
                saw_tick = true;
                break;
            }
            Some(_) => continue,
            None => break,
        }
    }
    assert!(saw_tick, "engine never ticked after start");

    handle.commands.send(EngineCommand::Pause).unwrap();
    handle.commands.send(EngineCommand::GetState).unwrap();
    let mut saw_state = false;
    for _ in 0..20 {
        match handle.outputs.recv().await {
            Some(EngineOutput::StateResponse(envelope)) => {
                assert!(envelope.tick > 0);
                saw_state = true;
                break;
            }
            Some(_) => continue,
            None => break,
        }
    }
    assert!(saw_state, "get-state went unanswered");

    handle.commands.send(EngineCommand::Shutdown).unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_engine_aborts_without_factory_ports() {
    let mut handle = spawn(small_params());
    // Never send init-ports; the startup timeout must surface an error.
    match handle.outputs.recv().await {
        Some(EngineOutput::Toast { kind, message }) => {
            assert_eq!(kind, EventKind::Error);
            assert!(message.contains("factory"), "unhelpful message: {message}");
        }
        other => panic!("expected an error toast, got {}", describe(&other)),
    }
}

#[tokio::test(start_paused = true)]
async fn test_update_params_resets_the_world() {
    let mut handle = spawn(small_params());
    let (link, _worker) = factory_channel();
    handle.commands.send(EngineCommand::InitPorts(link)).unwrap();
    handle.outputs.recv().await; // initialized
    handle.outputs.recv().await; // grid update

    let mut bigger = small_params();
    bigger.world.width = 12;
    handle
        .commands
        .send(EngineCommand::UpdateParams(Box::new(bigger)))
        .unwrap();
    match handle.outputs.recv().await {
        Some(EngineOutput::GridUpdate { grid, tick }) => {
            assert_eq!(tick, 0);
            assert_eq!(grid.width, 12);
        }
        other => panic!("expected grid update after reset, got {}", describe(&other)),
    }
    handle.commands.send(EngineCommand::Shutdown).unwrap();
}

fn describe(output: &Option<EngineOutput>) -> &'static str {
    match output {
        None => "closed channel",
        Some(EngineOutput::GridUpdate { .. }) => "grid-update",
        Some(EngineOutput::TickUpdate { .. }) => "tick-update",
        Some(EngineOutput::Initialized) => "initialized",
        Some(EngineOutput::LoadComplete { .. }) => "load-complete",
        Some(EngineOutput::StateResponse(_)) => "state-response",
        Some(EngineOutput::Toast { .. }) => "toast",
    }
}
