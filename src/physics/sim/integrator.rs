// src/physics/sim/integrator.rs
//
// Starrkörper-Integration: Winkelgeschwindigkeit per explizitem Euler aus
// Kraft und Drehmoment, Orientierung per normierter Quaternion-Ableitung.

use super::resources::Planet;
use crate::math::geometry::sphere::Quaternion;
use crate::math::types::Point3D;
use crate::physics::error::{SimError, SimResult};
use crate::physics::ice::{Element, ElementFlags, ForceAccumulator};
use bevy::log::error;

/// W += sT·dt mit sT = (−F.y/(R·m), F.x/(R·m), N/I); V folgt aus W.
pub fn update_angular_velocity(e: &mut Element, acc: &ForceAccumulator, dt: f64, planet: &Planet) {
    let rm = planet.r * e.m;
    let super_torque = Point3D::new(-acc.f.y / rm, acc.f.x / rm, acc.n / e.inertia);
    e.w += super_torque * dt;
    e.refresh_velocity(planet);
}

/// q ← q·p mit p = (1 − S, dt/2·W) / (1 + S), S = |W|²·dt²/16.
///
/// p ist für jedes W exakt normiert, die Norm von q driftet nur im Rahmen
/// der Rundung.
pub fn update_orientation(e: &mut Element, dt: f64) {
    let s = e.w.length_squared() * dt * dt / 16.0;
    let v = e.w * (0.5 * dt / (1.0 + s));
    let p = Quaternion::from_scalar_vector((1.0 - s) / (1.0 + s), v);
    e.q = e.q.multiply(&p);
}

/// Ein Integrationsschritt für alle Elemente.
///
/// Statische und fehlerhafte Elemente bleiben unverändert, STEADY-Elemente
/// behalten ihre vorgegebene Winkelgeschwindigkeit. Ein nicht-endlicher
/// Zustand markiert das Element als ERRORED und bricht ab.
pub fn integrate(
    elements: &mut [Element],
    forces: &[ForceAccumulator],
    dt: f64,
    planet: &Planet,
) -> SimResult<()> {
    let len = elements.len();
    if forces.len() != len {
        return Err(SimError::ElementOutOfRange { id: forces.len(), len });
    }

    for (e, acc) in elements.iter_mut().zip(forces) {
        if e.is_static() || e.is_errored() {
            continue;
        }
        if !e.is_steady() {
            update_angular_velocity(e, acc, dt, planet);
        }
        update_orientation(e, dt);

        if !e.is_finite() {
            e.flags.insert(ElementFlags::ERRORED);
            error!("Element {} became non-finite (q = {:?}, W = {:?})", e.id, e.q, e.w);
            return Err(SimError::NumericalCorruption { id: e.id });
        }
    }
    Ok(())
}
