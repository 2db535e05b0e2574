//! Async front-end: command channel in, event channel out, factory duplex
//! in between. The tick body itself is synchronous; the loop only decides
//! when to run it.

use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::model::config::{NotificationMode, SimulationParams};
use crate::model::constants::FACTORY_INIT_TIMEOUT_MS;
use crate::model::delta::ActorDelta;
use crate::model::events::{EngineEvent, EventKind, Importance};
use crate::model::factory::FactoryLink;
use crate::model::garden::Garden;
use crate::model::grid::Grid;
use crate::model::persistence::SaveEnvelope;
use crate::model::summary::TickSummary;
use crate::model::GardenError;

pub enum EngineCommand {
    /// Reset the engine and rebuild the initial grid from new params.
    UpdateParams(Box<SimulationParams>),
    Start,
    Pause,
    GetState,
    LoadState(Box<SaveEnvelope>),
    /// Establish the duplex channel with the flower factory.
    InitPorts(FactoryLink),
    Shutdown,
}

pub enum EngineOutput {
    /// Full grid, sent on initial hydration and every reset/load.
    GridUpdate {
        grid: Grid,
        tick: u64,
    },
    /// Minimal per-tick diff.
    TickUpdate {
        deltas: Vec<ActorDelta>,
        events: Vec<EngineEvent>,
        summary: TickSummary,
    },
    Initialized,
    LoadComplete {
        grid: Grid,
    },
    StateResponse(Box<SaveEnvelope>),
    Toast {
        message: String,
        kind: EventKind,
    },
}

pub struct EngineHandle {
    pub commands: UnboundedSender<EngineCommand>,
    pub outputs: UnboundedReceiver<EngineOutput>,
}

/// Spawns the engine loop onto the current tokio runtime.
pub fn spawn(params: SimulationParams) -> EngineHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (output_tx, output_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        if let Err(error) = run(params, command_rx, output_tx.clone()).await {
            tracing::error!(%error, "engine loop stopped");
            let _ = output_tx.send(EngineOutput::Toast {
                message: format!("Simulation stopped: {error}"),
                kind: EventKind::Error,
            });
        }
    });
    EngineHandle {
        commands: command_tx,
        outputs: output_rx,
    }
}

pub async fn run(
    params: SimulationParams,
    mut commands: UnboundedReceiver<EngineCommand>,
    outputs: UnboundedSender<EngineOutput>,
) -> Result<(), GardenError> {
    // Startup blocks on the factory port; everything else is optional.
    let (link, start_early) = wait_for_ports(&mut commands).await?;

    let mut garden = Garden::new(params);
    garden.connect_factory(link);
    garden.factory.forward_params(&garden.params);
    garden.populate();

    let _ = outputs.send(EngineOutput::Initialized);
    let _ = outputs.send(EngineOutput::GridUpdate {
        grid: garden.grid.clone(),
        tick: garden.tick,
    });

    let mut running = start_early;
    let mut interval = tick_interval(garden.params.engine.tick_ms);

    loop {
        tokio::select! {
            command = commands.recv() => {
                match command {
                    None | Some(EngineCommand::Shutdown) => break,
                    Some(EngineCommand::Start) => running = true,
                    Some(EngineCommand::Pause) => running = false,
                    Some(EngineCommand::UpdateParams(new_params)) => {
                        garden.reset(*new_params);
                        interval = tick_interval(garden.params.engine.tick_ms);
                        let _ = outputs.send(EngineOutput::GridUpdate {
                            grid: garden.grid.clone(),
                            tick: garden.tick,
                        });
                    }
                    Some(EngineCommand::GetState) => {
                        let _ = outputs.send(EngineOutput::StateResponse(Box::new(
                            garden.save_state(),
                        )));
                    }
                    Some(EngineCommand::LoadState(envelope)) => {
                        match garden.load_state(*envelope) {
                            Ok(()) => {
                                let _ = outputs.send(EngineOutput::LoadComplete {
                                    grid: garden.grid.clone(),
                                });
                            }
                            Err(error) => {
                                tracing::error!(%error, "rejected saved state");
                                let _ = outputs.send(EngineOutput::Toast {
                                    message: format!("Could not load save: {error}"),
                                    kind: EventKind::Error,
                                });
                            }
                        }
                    }
                    Some(EngineCommand::InitPorts(link)) => garden.connect_factory(link),
                }
            }
            _ = interval.tick(), if running => {
                let output = garden.step();
                forward_toasts(&outputs, &output.events, garden.params.engine.notification_mode);
                let _ = outputs.send(EngineOutput::TickUpdate {
                    deltas: output.deltas,
                    events: output.events,
                    summary: output.summary,
                });
            }
        }
    }
    Ok(())
}

/// Consumes commands until the factory port arrives. A `Start` seen while
/// waiting is honored once the engine is up.
async fn wait_for_ports(
    commands: &mut UnboundedReceiver<EngineCommand>,
) -> Result<(FactoryLink, bool), GardenError> {
    let deadline = Duration::from_millis(FACTORY_INIT_TIMEOUT_MS);
    let mut start_early = false;
    let wait = async {
        while let Some(command) = commands.recv().await {
            match command {
                EngineCommand::InitPorts(link) => return Some(link),
                EngineCommand::Start => start_early = true,
                EngineCommand::Shutdown => return None,
                _ => tracing::debug!("command before init-ports, ignoring"),
            }
        }
        None
    };
    match tokio::time::timeout(deadline, wait).await {
        Ok(Some(link)) => Ok((link, start_early)),
        Ok(None) | Err(_) => Err(GardenError::FactoryInitTimeout),
    }
}

fn tick_interval(tick_ms: u64) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval
}

fn forward_toasts(
    outputs: &UnboundedSender<EngineOutput>,
    events: &[EngineEvent],
    mode: NotificationMode,
) {
    for event in events {
        let wanted = match mode {
            NotificationMode::All => true,
            NotificationMode::Important => event.importance == Importance::High,
            NotificationMode::None => false,
        };
        if wanted {
            let _ = outputs.send(EngineOutput::Toast {
                message: event.message.clone(),
                kind: event.kind,
            });
        }
    }
}
