// src/physics/contact/force.rs
//
// Kontaktkräfte. Jede Wechselwirkung wird im lokalen System des ersten
// Elements berechnet und im selben Aufruf als Kraft-Gegenkraft-Paar auf beide
// Akkumulatoren geschrieben.

use super::frame::PairFrame;
use super::record::{Contact, ContactKind};
use crate::math::geometry::polygon::{Intersection, polygon_intersection};
use crate::math::types::*;
use crate::math::utils::simple_geometry::{cross_product_2d as cross, lay_on_surface, ort, rot90_ccw, rot90_cw};
use crate::physics::error::{SimError, SimResult};
use crate::physics::ice::{Element, ForceAccumulator, Material, Stress};
use crate::physics::sim::resources::{PhysConsts, Planet};
use std::f64::consts::PI;

/// Kraft auf `e1` (lokal, N), Reibungsmoment und Angriffspunkte (lokal `e1`, m)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Interaction {
    pub f1: Point2D,
    pub couple: f64,
    pub rf1: Point2D,
    pub rf2: Point2D,
}

/// Geometrie und Kinematik eines Paars im Rahmen von `e1`
struct ContactData<'a> {
    e1: &'a Element,
    e2: &'a Element,
    frame: PairFrame,
    overlap: Intersection,
    /// Kontaktpunkt relativ zu `e1` bzw. `e2`
    r1: Point2D,
    r2: Point2D,
    /// Relativgeschwindigkeit im Kontaktpunkt (m/s)
    va12: Point2D,
}

impl<'a> ContactData<'a> {
    fn new(contact: &Contact, e1: &'a Element, e2: &'a Element, planet: &Planet) -> Self {
        let frame = PairFrame::new(e1, e2);
        let overlap = polygon_intersection(&e1.shape, &frame.second_shape(e2));

        let r1 = if contact.is_joint() {
            let a2 = frame.point_to_first(contact.anchor_second());
            (contact.anchor_first() + a2) * 0.5
        } else {
            overlap.center
        };
        let r2 = r1 - frame.r12;

        let v1 = lay_on_surface(e1.v);
        let v2 = lay_on_surface(frame.vector_to_first(e2.v));
        let va1 = v1 + rot90_cw(r1) * (-e1.w.z) * planet.r;
        let va2 = v2 + rot90_cw(r2) * (-e2.w.z) * planet.r;

        Self {
            e1,
            e2,
            frame,
            overlap,
            r1,
            r2,
            va12: va1 - va2,
        }
    }

    /// Überlappungsfläche (m²), 0 bei Berührung
    fn physical_area(&self, planet: &Planet) -> f64 {
        if self.overlap.is_overlap() {
            self.overlap.area * planet.r2
        } else {
            0.0
        }
    }
}

/// Reduzierte Steifigkeit des Paars (Pa)
fn rigidity(cd: &ContactData, materials: &[Material], planet: &Planet) -> SimResult<f64> {
    let modulus = |e: &Element| {
        materials
            .get(e.mat_id)
            .map(|m| m.e * e.h_main)
            .ok_or_else(|| SimError::scenario(format!("element {} references missing material {}", e.id, e.mat_id)))
    };
    let h1 = modulus(cd.e1)?;
    let h2 = modulus(cd.e2)?;
    let h = h1 * h2 / (h1 * cd.r2.length() + h2 * cd.r1.length());
    Ok(if h.is_finite() { h * planet.r_rec } else { 0.0 })
}

/// Normalenrichtung der Kraft auf `e1`.
///
/// Schneiden sich genau zwei Kanten, steht die Kraft senkrecht auf der
/// Verbindung der beiden Schnittpunkte, sonst wird sie aus den Hebelarmen
/// bestimmt.
fn contact_normal(cd: &ContactData) -> Point2D {
    let edge_points: Vec<Point2D> = cd.overlap.edge_points().map(|p| p.point).collect();
    let normal = if let &[p0, p1] = edge_points.as_slice() {
        let dp = p1 - p0;
        let tau = ort(dp) * cross(p0, dp).signum();
        rot90_ccw(tau)
    } else {
        ort(ort(cd.r2) * cd.r1.length() - ort(cd.r1) * cd.r2.length())
    };
    if normal == Point2D::ZERO {
        -ort(cd.frame.r12)
    } else {
        normal
    }
}

/// Elastischer Anteil mit sublinearem Flächengesetz plus viskose Dämpfung.
/// Ohne Überlappungsfläche keine Kraft.
fn collision(
    cd: &ContactData,
    materials: &[Material],
    planet: &Planet,
    consts: &PhysConsts,
) -> SimResult<Option<Interaction>> {
    let area = cd.physical_area(planet);
    if area <= 0.0 {
        return Ok(None);
    }

    let elastic = consts.rigidity * rigidity(cd, materials, planet)? * area.powf(consts.contact_exponent);
    let viscous = cd.va12 * (-area * consts.etha * consts.viscosity);
    let couple = (cd.e2.w.z - cd.e1.w.z) * consts.etha * area * area / (6.0 * PI);

    let rf = cd.r1 * planet.r;
    Ok(Some(Interaction {
        f1: contact_normal(cd) * elastic + viscous,
        couple,
        rf1: rf,
        rf2: rf,
    }))
}

/// Feder zwischen den beiden Ankerpunkten eines Joints
fn joint_spring(
    contact: &Contact,
    cd: &ContactData,
    materials: &[Material],
    planet: &Planet,
    consts: &PhysConsts,
) -> SimResult<Option<Interaction>> {
    if contact.durability <= 0.0 {
        return Ok(None);
    }

    let k = rigidity(cd, materials, planet)? * consts.joint_stiffness;
    let width = contact.init_wid * planet.r;
    let spring_area = PI * (0.5 * width).powi(2);

    let anchor1 = contact.anchor_first();
    let anchor2 = cd.frame.point_to_first(contact.anchor_second());
    let deformation = anchor2 - anchor1;

    let f1 = deformation * (planet.r * k * width * contact.durability) - cd.va12 * (spring_area * consts.etha);
    let couple = (cd.e2.w.z - cd.e1.w.z) * consts.etha * spring_area * spring_area / (6.0 * PI);

    Ok(Some(Interaction {
        f1,
        couple,
        rf1: anchor1 * planet.r,
        rf2: anchor2 * planet.r,
    }))
}

/// Spannungsbeitrag einer Kraft (lokal) über die Kante `a`–`b` von `e`.
/// `None` für eine entartete Kante.
fn edge_stress(e: &Element, a: usize, b: usize, force: Point2D, planet: &Planet) -> Option<Stress> {
    let va = *e.shape.vertices.get(a)?;
    let vb = *e.shape.vertices.get(b)?;
    let edge = vb - va;
    let length = edge.length() * planet.r;
    let section = e.h_main * length;
    if length < 1e-12 || !(section > 0.0) {
        return None;
    }
    // Außennormale, unabhängig davon, ob `b` Vorgänger oder Nachfolger von `a` ist
    let normal = ort(rot90_cw(edge)) * cross(va, vb).signum();
    Some(Stress::from_edge_force(force, normal, section))
}

/// Schreibt `f1` auf `e1` und die Gegenkraft, transformiert in den Rahmen
/// von `e2`, auf `e2`. Die Spannung wird über die gemeinsamen Kanten des
/// Kontakts verteilt.
fn apply_interaction(
    forces: &mut [ForceAccumulator],
    contact: &Contact,
    cd: &ContactData,
    inter: &Interaction,
    planet: &Planet,
    consts: &PhysConsts,
) {
    let f1 = inter.f1;
    let f2 = lay_on_surface(cd.frame.vector_to_second(Point3D::new(-f1.x, -f1.y, 0.0)));

    let tq1 = consts.rotatability * inter.couple + cross(inter.rf1, f1);
    let tq2 = -consts.rotatability * inter.couple + cross(inter.rf2 - cd.frame.r12 * planet.r, -f1);

    let a1 = &mut forces[cd.e1.id];
    a1.add_force(f1);
    a1.add_torque(tq1);

    let a2 = &mut forces[cd.e2.id];
    a2.add_force(f2);
    a2.add_torque(tq2);

    let s1 = edge_stress(cd.e1, contact.v11, contact.v12, f1, planet);
    let s2 = edge_stress(cd.e2, contact.v21, contact.v22, f2, planet);
    if let (Some(s1), Some(s2)) = (s1, s2) {
        forces[cd.e1.id].add_stress(s1);
        forces[cd.e2.id].add_stress(s2);
    }
}

/// Berechnet alle Kontaktkräfte und summiert sie in `forces` (parallel zu
/// `elements` indiziert). Aktualisiert `area` jedes Kontakts.
pub fn compute_contact_forces(
    elements: &[Element],
    forces: &mut [ForceAccumulator],
    contacts: &mut [Contact],
    materials: &[Material],
    planet: &Planet,
    consts: &PhysConsts,
) -> SimResult<()> {
    let len = elements.len();
    if forces.len() != len {
        return Err(SimError::ElementOutOfRange { id: forces.len(), len });
    }

    for contact in contacts.iter_mut() {
        let e1 = elements
            .get(contact.i1())
            .ok_or(SimError::ElementOutOfRange { id: contact.i1(), len })?;
        let e2 = elements
            .get(contact.i2())
            .ok_or(SimError::ElementOutOfRange { id: contact.i2(), len })?;

        if e1.is_errored() || e2.is_errored() || (e1.is_steady() && e2.is_steady()) {
            continue;
        }

        let cd = ContactData::new(contact, e1, e2, planet);
        contact.area = if cd.overlap.is_overlap() { cd.overlap.area } else { 0.0 };

        let inter = match contact.kind {
            ContactKind::Joint => joint_spring(contact, &cd, materials, planet, consts)?,
            ContactKind::Collision => collision(&cd, materials, planet, consts)?,
            ContactKind::None => None,
        };
        if let Some(inter) = inter {
            apply_interaction(forces, contact, &cd, &inter, planet, consts);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geometry::sphere::loc_to_glob;
    use crate::physics::contact::ContactDetector;
    use crate::physics::ice::element::tests::{east_at, eastward, square_element};
    use crate::physics::ice::{ElementFlags, Link};
    use approx::assert_relative_eq;

    fn prepared(mut elements: Vec<Element>) -> Vec<Element> {
        let planet = Planet::default();
        let ice = Material::sea_ice();
        for e in &mut elements {
            e.update_mass(&ice, &planet);
        }
        elements
    }

    fn run(elements: &[Element], contacts: &mut [Contact]) -> Vec<ForceAccumulator> {
        let mut forces = vec![ForceAccumulator::default(); elements.len()];
        compute_contact_forces(
            elements,
            &mut forces,
            contacts,
            &[Material::sea_ice()],
            &Planet::default(),
            &PhysConsts::default(),
        )
        .unwrap();
        forces
    }

    fn global_force(e: &Element, acc: &ForceAccumulator) -> Point3D {
        loc_to_glob(&e.q, Point3D::new(acc.f.x, acc.f.y, 0.0))
    }

    #[test]
    fn test_overlapping_squares_repel() {
        let elements = prepared(vec![
            square_element(0, 0.0, 0.0, 1.0),
            square_element(1, 0.8, 0.05, 0.8),
        ]);
        let mut contacts = vec![Contact::collision(Link::new(0, 1), 0)];
        let forces = run(&elements, &mut contacts);

        assert!(contacts[0].area > 0.0);
        assert!(eastward(&elements[0], forces[0].f) < 0.0);
        assert!(eastward(&elements[1], forces[1].f) > 0.0);
        // Normale senkrecht zur gemeinsamen Meridiankante
        let g0 = global_force(&elements[0], &forces[0]);
        let across = g0 - east_at(&elements[0]) * g0.dot(east_at(&elements[0]));
        assert!(across.length() < 1e-6 * g0.length());
    }

    #[test]
    fn test_forces_are_equal_and_opposite() {
        let mut elements = prepared(vec![
            square_element(0, 20.0, 60.0, 1.0),
            square_element(1, 20.8, 60.4, 1.2),
        ]);
        elements[0].w = Point3D::new(1e-9, -2e-9, 1e-7);
        elements[1].w = Point3D::new(-3e-9, 1e-9, -2e-7);
        let mut contacts = vec![Contact::collision(Link::new(0, 1), 0)];
        let forces = run(&elements, &mut contacts);

        let g1 = global_force(&elements[0], &forces[0]);
        let g2 = global_force(&elements[1], &forces[1]);
        assert!(g1.length() > 0.0);
        // Rest stammt nur aus der Krümmung zwischen den Tangentialebenen
        assert!((g1 + g2).length() < 0.02 * g1.length());
        assert!(g1.dot(g2) < 0.0);
    }

    #[test]
    fn test_separated_pair_has_no_force() {
        let elements = prepared(vec![
            square_element(0, 0.0, 0.0, 1.0),
            square_element(1, 1.3, 0.0, 1.0),
        ]);
        let mut contacts = vec![Contact::collision(Link::new(0, 1), 0)];
        contacts[0].area = 1.0;
        let forces = run(&elements, &mut contacts);
        assert_eq!(contacts[0].area, 0.0);
        assert_eq!(forces, vec![ForceAccumulator::default(); 2]);
    }

    #[test]
    fn test_two_steady_elements_are_skipped() {
        let mut elements = prepared(vec![
            square_element(0, 0.0, 0.0, 1.0),
            square_element(1, 0.9, 0.0, 1.0),
        ]);
        for e in &mut elements {
            e.flags.set_motion(ElementFlags::STEADY);
        }
        let mut contacts = vec![Contact::collision(Link::new(0, 1), 0)];
        let forces = run(&elements, &mut contacts);
        assert_eq!(forces, vec![ForceAccumulator::default(); 2]);
    }

    #[test]
    fn test_stretched_joint_pulls_together() {
        let mut elements = prepared(vec![
            square_element(0, 0.0, 0.0, 1.0),
            square_element(1, 0.95, 0.0, 1.0),
        ]);
        let mut detector = ContactDetector::default();
        detector.freeze_links(&elements, &[Link::new(0, 1)], 0.1, 0).unwrap();

        // unverformt: nur numerisches Rauschen
        let relaxed = run(&elements, detector.contacts_mut());

        // e2 auseinanderziehen, die Anker bleiben in den lokalen Rahmen fest
        elements[1] = prepared(vec![square_element(1, 1.05, 0.0, 1.0)]).remove(0);
        let stretched = run(&elements, detector.contacts_mut());

        assert!(eastward(&elements[0], stretched[0].f) > 0.0);
        assert!(eastward(&elements[1], stretched[1].f) < 0.0);
        assert!(relaxed[0].f.length() < 1e-6 * stretched[0].f.length());
    }

    #[test]
    fn test_stretched_joint_puts_both_edges_under_tension() {
        let mut elements = prepared(vec![
            square_element(0, 0.0, 0.0, 1.0),
            square_element(1, 0.95, 0.0, 1.0),
        ]);
        let mut detector = ContactDetector::default();
        detector.freeze_links(&elements, &[Link::new(0, 1)], 0.1, 0).unwrap();
        elements[1] = prepared(vec![square_element(1, 1.05, 0.0, 1.0)]).remove(0);
        let forces = run(&elements, detector.contacts_mut());

        // Zug senkrecht zur gemeinsamen Meridiankante: lokal y ≈ Ost
        let s1 = forces[0].stress;
        let s2 = forces[1].stress;
        assert!(s1.yy > 0.0);
        assert!(s2.yy > 0.0);
        assert!(s1.xx.abs() < 1e-3 * s1.yy);

        // Größenordnung: Kraft / (Dicke · Kantenlänge)
        let joint = detector.find(0, 1).unwrap();
        let e1 = &elements[0];
        let edge = e1.shape.vertices[joint.v11].distance(e1.shape.vertices[joint.v12]) * Planet::default().r;
        assert_relative_eq!(s1.yy, forces[0].f.y / (e1.h_main * edge), max_relative = 1e-3);
    }

    #[test]
    fn test_collision_without_edges_carries_no_stress() {
        // Kollisionen tragen keine Kantenzuordnung, nur Kraft und Moment
        let elements = prepared(vec![
            square_element(0, 0.0, 0.0, 1.0),
            square_element(1, 0.8, 0.05, 0.8),
        ]);
        let mut contacts = vec![Contact::collision(Link::new(0, 1), 0)];
        let forces = run(&elements, &mut contacts);
        assert!(forces[0].f.length() > 0.0);
        assert_eq!(forces[0].stress, Stress::default());
    }

    #[test]
    fn test_contact_with_missing_element_is_an_error() {
        let elements = prepared(vec![square_element(0, 0.0, 0.0, 1.0)]);
        let mut contacts = vec![Contact::collision(Link::new(0, 5), 0)];
        let mut forces = vec![ForceAccumulator::default(); 1];
        let err = compute_contact_forces(
            &elements,
            &mut forces,
            &mut contacts,
            &[Material::sea_ice()],
            &Planet::default(),
            &PhysConsts::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::ElementOutOfRange { id: 5, len: 1 }));
    }
}
