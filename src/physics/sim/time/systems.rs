// src/physics/sim/time/systems.rs
use crate::physics::sim::state::SimulationState;
use crate::physics::sim::world::World;
use bevy::prelude::*;

/// Beendet den Lauf, sobald `total_steps` erreicht ist
pub fn finish_when_done_system(
    world: Res<World>,
    mut next_state: ResMut<NextState<SimulationState>>,
) {
    if world.time.is_finished() {
        info!(
            "Reached step {} of {}, finishing.",
            world.time.n, world.time.total_steps
        );
        next_state.set(SimulationState::Finished);
    }
}
