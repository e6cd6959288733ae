// ./src/main.rs
use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

// Eigene Module deklarieren
pub mod debug;
pub mod math;
pub mod physics;
pub mod setup;

use physics::sim::init::Scenario;
use physics::sim::state::SimulationState;
use physics::sim::systems::*;
use physics::sim::time::{StepHistory, systems::finish_when_done_system};
use setup::setup_world_system;

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("scenario.json"));

    // Vor dem LogPlugin gibt es noch keinen Logger
    let scenario = if path.exists() {
        match Scenario::load(&path) {
            Ok(scenario) => scenario,
            Err(err) => {
                eprintln!("Failed to read scenario '{}': {}", path.display(), err);
                return;
            }
        }
    } else {
        eprintln!("'{}' not found, running the built-in demo scenario", path.display());
        Scenario::demo()
    };

    let params = scenario.params.clone();
    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)))
        .add_plugins(LogPlugin {
            filter: params.log_filter.clone(),
            ..default()
        })
        .insert_resource(params)
        .insert_resource(scenario)
        .insert_resource(StepHistory::new(1000))
        .init_state::<SimulationState>()
        // --- Initialisierungsphase ---
        .add_systems(OnEnter(SimulationState::Initializing), setup_world_system)
        .add_systems(
            Update,
            (simulation_step_system, snapshot_system, finish_when_done_system)
                .chain()
                .run_if(in_state(SimulationState::Running)),
        )
        .add_systems(OnEnter(SimulationState::Finished), report_and_exit_system)
        .run();
}
