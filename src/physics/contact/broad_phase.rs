// src/physics/contact/broad_phase.rs
//
// Kandidatenpaare über umschließende Kugelkappen: zwei Elemente sind
// Kandidaten, wenn der Großkreisabstand ihrer Zentren kleiner ist als die
// Summe ihrer Winkelradien. Statische und fehlerhafte Elemente nehmen nicht teil.

use crate::math::types::Point3D;
use crate::math::utils::simple_geometry::great_circle_distance;
use crate::physics::ice::{Element, Link};

#[derive(Debug, Clone, Copy)]
struct Body {
    id: usize,
    center: Point3D,
    radius: f64,
}

impl Body {
    fn overlaps(&self, other: &Body) -> bool {
        great_circle_distance(self.center, other.center) < self.radius + other.radius
    }
}

fn bodies(elements: &[Element]) -> Vec<Body> {
    elements
        .iter()
        .filter(|e| e.is_active())
        .map(|e| Body {
            id: e.id,
            center: e.center(),
            radius: e.sbb_rmin,
        })
        .collect()
}

fn finish(mut pairs: Vec<Link>) -> Vec<Link> {
    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

/// Vollständiger Paartest
pub fn all_pairs(elements: &[Element]) -> Vec<Link> {
    let bodies = bodies(elements);
    let mut pairs = Vec::new();
    for (k, a) in bodies.iter().enumerate() {
        for b in &bodies[k + 1..] {
            if a.overlaps(b) {
                pairs.push(Link::new(a.id, b.id));
            }
        }
    }
    finish(pairs)
}

/// Sweep-and-Prune entlang der globalen x-Achse.
///
/// |Δx| zweier Zentren ist nie größer als ihr Großkreisabstand, daher verwirft
/// der Intervalltest keine Paare, die der Abstandstest akzeptieren würde.
/// Sortiert wird nur eine Permutation, nie der Element-Speicher selbst.
pub fn sweep_and_prune(elements: &[Element]) -> Vec<Link> {
    let bodies = bodies(elements);
    let mut order: Vec<usize> = (0..bodies.len()).collect();
    order.sort_by(|&a, &b| {
        let lo_a = bodies[a].center.x - bodies[a].radius;
        let lo_b = bodies[b].center.x - bodies[b].radius;
        lo_a.total_cmp(&lo_b)
    });

    let mut pairs = Vec::new();
    for (k, &i) in order.iter().enumerate() {
        let a = &bodies[i];
        let hi = a.center.x + a.radius;
        for &j in &order[k + 1..] {
            let b = &bodies[j];
            if b.center.x - b.radius > hi {
                break;
            }
            if a.overlaps(b) {
                pairs.push(Link::new(a.id, b.id));
            }
        }
    }
    finish(pairs)
}
