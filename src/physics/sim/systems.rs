// src/physics/sim/systems.rs
use super::resources::SimulationParameters;
use super::state::SimulationState;
use super::time::StepHistory;
use super::world::World;
use crate::debug::{write_restart, write_snapshot, write_state_svg};
use crate::math::utils::angles;
use bevy::app::AppExit;
use bevy::prelude::*;
use std::path::Path;

/// Ein Simulationsschritt pro Update
pub fn simulation_step_system(
    mut world: ResMut<World>,
    mut history: ResMut<StepHistory>,
    sim_params: Res<SimulationParameters>,
    mut next_state: ResMut<NextState<SimulationState>>,
) {
    if world.time.is_finished() {
        return;
    }
    match world.step() {
        Ok(record) => {
            if sim_params.diagnostics_every != 0 && record.step % sim_params.diagnostics_every == 0 {
                info!(
                    "Step {} (t = {:.0} s): max speed {:.3} m/s, collisions {}, joints {}, E_kin {:.3e} J",
                    record.step,
                    record.elapsed,
                    record.max_speed,
                    record.collisions,
                    record.joints,
                    record.kinetic_energy
                );
                debug!(
                    "  stress xx [{:.3e}, {:.3e}] yy [{:.3e}, {:.3e}] Pa",
                    record.stress.min.xx, record.stress.max.xx, record.stress.min.yy, record.stress.max.yy
                );
                log_monitored_elements(&world);
            }
            history.push(record);
        }
        Err(err) => {
            error!("Simulation aborted at step {}: {}", world.time.n, err);
            next_state.set(SimulationState::Finished);
        }
    }
}

fn log_monitored_elements(world: &World) {
    for e in world.elements.iter().filter(|e| e.is_monitored()) {
        let (lat, lon) = e.lat_lon();
        info!(
            "  element {} at ({:.4}°, {:.4}°): |V| {:.3} m/s, W.z {:.3e} rad/s, flags {}",
            e.id,
            angles::rad_to_deg(lat),
            angles::rad_to_deg(lon),
            e.v.length(),
            e.w.z,
            e.flags
        );
    }
}

/// Schreibt JSON- und SVG-Abzug alle `save_every` Schritte, den
/// vollständigen Restart-Abzug alle `restart_every` Schritte
pub fn snapshot_system(world: Res<World>, sim_params: Res<SimulationParameters>) {
    let dir = Path::new(&sim_params.output_dir);
    if world.time.is_save_step(sim_params.restart_every) {
        if let Err(err) = write_restart(&world, dir) {
            warn!("Restart file at step {} failed: {}", world.time.n, err);
        }
    }
    if !world.time.is_save_step(sim_params.save_every) {
        return;
    }
    if let Err(err) = write_snapshot(&world, dir) {
        warn!("Snapshot at step {} failed: {}", world.time.n, err);
    }
    if let Err(err) = write_state_svg(&world, dir) {
        warn!("SVG at step {} failed: {}", world.time.n, err);
    }
}

/// Zusammenfassung und Programmende
pub fn report_and_exit_system(
    world: Option<Res<World>>,
    history: Res<StepHistory>,
    mut exit: EventWriter<AppExit>,
) {
    if let Some(world) = world {
        let errored = world.elements.iter().filter(|e| e.is_errored()).count();
        info!(
            "Simulation finished after {} steps ({:.0} s model time), {} contacts, {} errored elements.",
            world.time.n,
            world.time.elapsed,
            world.contacts.len(),
            errored
        );
    }
    if let Some(last) = history.latest() {
        info!(
            "Last step {}: max speed {:.3} m/s, E_kin {:.3e} J",
            last.step, last.max_speed, last.kinetic_energy
        );
    }
    exit.send(AppExit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::sim::init::Scenario;

    fn app_with(total_steps: u64) -> App {
        let mut scenario = Scenario::demo();
        scenario.params.total_steps = total_steps;
        let params = scenario.params.clone();
        let mut world = scenario.into_world().unwrap();
        world.initialize().unwrap();

        let mut app = App::new();
        app.insert_resource(world)
            .insert_resource(params)
            .insert_resource(StepHistory::new(10))
            .init_state::<SimulationState>()
            .add_systems(
                Update,
                (simulation_step_system, crate::physics::sim::time::systems::finish_when_done_system).chain(),
            );
        app
    }

    #[test]
    fn test_step_system_advances_world_and_history() {
        let mut app = app_with(10);
        app.update();
        app.update();

        assert_eq!(app.world.resource::<World>().time.n, 2);
        let history = app.world.resource::<StepHistory>();
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().map(|r| r.step), Some(1));
    }

    #[test]
    fn test_snapshot_system_writes_restart_files() {
        let dir = std::env::temp_dir().join(format!("floe_restart_system_{}", std::process::id()));
        let mut app = app_with(10);
        {
            let mut params = app.world.resource_mut::<SimulationParameters>();
            params.restart_every = 2;
            params.output_dir = dir.to_string_lossy().into_owned();
        }
        app.add_systems(Update, snapshot_system.after(simulation_step_system));
        for _ in 0..3 {
            app.update();
        }

        // Abzug nach dem zweiten Schritt, keine Snapshots (save_every = 0)
        assert!(dir.join("restart_000002.json").exists());
        assert!(!dir.join("snapshot_000002.json").exists());
        let restarted = World::load(&dir.join("restart_000002.json")).unwrap();
        assert_eq!(restarted.time.n, 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_run_stops_at_total_steps() {
        let mut app = app_with(3);
        for _ in 0..6 {
            app.update();
        }
        assert_eq!(app.world.resource::<World>().time.n, 3);
        assert_eq!(
            *app.world.resource::<State<SimulationState>>().get(),
            SimulationState::Finished
        );
    }
}
