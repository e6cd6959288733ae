// src/physics/contact/frame.rs
use crate::math::geometry::{polygon::Polygon, sphere::NORTH, sphere::Quaternion};
use crate::math::types::*;
use crate::math::utils::simple_geometry::lay_on_surface;
use crate::physics::ice::{Element, lift_to_sphere};

/// Relativer Rahmen eines Elementpaars: alles wird im lokalen System des
/// ersten Elements ausgedrückt.
#[derive(Debug, Clone, Copy)]
pub struct PairFrame {
    /// Lokal `e2` → lokal `e1` (q1*·q2)
    pub e2_to_e1: Quaternion,
    pub e1_to_e2: Quaternion,
    /// Zentrum von `e2` im Rahmen von `e1`
    pub r12: Point2D,
}

impl PairFrame {
    pub fn new(e1: &Element, e2: &Element) -> Self {
        let e2_to_e1 = e1.q.conjugate().multiply(&e2.q);
        let e1_to_e2 = e2_to_e1.conjugate();
        Self {
            e2_to_e1,
            e1_to_e2,
            r12: lay_on_surface(e2_to_e1.rotate_vector(NORTH)),
        }
    }

    /// Vektor aus dem Rahmen von `e2` in den Rahmen von `e1`
    pub fn vector_to_first(&self, v: Point3D) -> Point3D {
        self.e2_to_e1.rotate_vector(v)
    }

    pub fn vector_to_second(&self, v: Point3D) -> Point3D {
        self.e1_to_e2.rotate_vector(v)
    }

    /// Ebener Punkt von `e2` in die Tangentialebene von `e1`
    pub fn point_to_first(&self, p: Point2D) -> Point2D {
        lay_on_surface(self.vector_to_first(lift_to_sphere(p)))
    }

    pub fn point_to_second(&self, p: Point2D) -> Point2D {
        lay_on_surface(self.vector_to_second(lift_to_sphere(p)))
    }

    /// Umriss von `e2` in der Tangentialebene von `e1`
    pub fn second_shape(&self, e2: &Element) -> Polygon {
        Polygon {
            vertices: e2
                .shape
                .vertices
                .iter()
                .map(|&p| self.point_to_first(p))
                .collect(),
        }
    }
}
