// ./src/setup.rs
use crate::physics::sim::init::Scenario;
use crate::physics::sim::state::SimulationState;
use bevy::app::AppExit;
use bevy::prelude::*;

/// Baut den Simulationszustand aus dem Szenario und startet den Lauf
pub fn setup_world_system(
    mut commands: Commands,
    scenario: Res<Scenario>,
    mut next_state: ResMut<NextState<SimulationState>>,
    mut exit: EventWriter<AppExit>,
) {
    let world = scenario.clone().into_world().and_then(|mut world| {
        world.initialize()?;
        Ok(world)
    });

    match world {
        Ok(world) => {
            info!(
                "World ready: {} elements, {} materials, {} links, {} contacts after initial detection",
                world.elements.len(),
                world.materials.len(),
                world.links.len(),
                world.contacts.len()
            );
            commands.insert_resource(world);
            commands.remove_resource::<Scenario>();
            next_state.set(SimulationState::Running);
        }
        Err(err) => {
            error!("Could not set up the simulation: {}", err);
            exit.send(AppExit);
        }
    }
}
