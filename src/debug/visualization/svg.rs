// src/debug/visualization/svg.rs
//
// Debug-Ansicht des Zustands: Elemente in Länge/Breite (Grad) projiziert,
// Joints als Linien zwischen den Zentren.

use crate::math::geometry::sphere::lat_lon_of;
use crate::math::types::{Bounds2D, Point2D, Point3D};
use crate::physics::contact::ContactKind;
use crate::physics::error::SimResult;
use crate::physics::ice::{Element, ElementFlags};
use crate::physics::sim::World;
use bevy::log::info;
use std::path::{Path, PathBuf};
use ::svg::Node;
use ::svg::Document;
use ::svg::node::element::{Circle, Line, Polygon, Rectangle};

/// Hilfsobjekt zum Aufbau eines SVG-Dokuments
struct SvgBuilder {
    document: Document,
    stroke_w_normal: f64,
    stroke_w_thin: f64,
    point_radius: f64,
}

impl SvgBuilder {
    /// Neues Dokument mit Hintergrund in `display_bounds`
    fn new(display_bounds: &Bounds2D, svg_pixel_size: f64) -> Self {
        let scale = (display_bounds.width() + display_bounds.height()) / 2.0;
        let mut document = Document::new()
            .set("width", svg_pixel_size.to_string())
            .set("height", svg_pixel_size.to_string())
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    display_bounds.min.x,
                    display_bounds.min.y,
                    display_bounds.width(),
                    display_bounds.height()
                ),
            );
        document.append(
            Rectangle::new()
                .set("x", display_bounds.min.x.to_string())
                .set("y", display_bounds.min.y.to_string())
                .set("width", display_bounds.width().to_string())
                .set("height", display_bounds.height().to_string())
                .set("fill", "#dfe8f0"),
        );

        Self {
            document,
            stroke_w_normal: scale * 0.004,
            stroke_w_thin: scale * 0.0015,
            point_radius: scale * 0.003,
        }
    }

    fn draw_polygon(&mut self, vertices: &[Point2D], fill: &str, stroke: &str) {
        if vertices.len() < 3 {
            return;
        }
        let points = vertices
            .iter()
            .map(|p| format!("{:.5},{:.5}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        self.document.append(
            Polygon::new()
                .set("points", points)
                .set("fill", fill)
                .set("stroke", stroke)
                .set("stroke-width", self.stroke_w_thin.to_string()),
        );
    }

    fn draw_circle(&mut self, center: Point2D, fill: &str) {
        self.document.append(
            Circle::new()
                .set("cx", format!("{:.5}", center.x))
                .set("cy", format!("{:.5}", center.y))
                .set("r", self.point_radius.to_string())
                .set("fill", fill),
        );
    }

    fn draw_line(&mut self, from: Point2D, to: Point2D, stroke: &str) {
        self.document.append(
            Line::new()
                .set("x1", format!("{:.5}", from.x))
                .set("y1", format!("{:.5}", from.y))
                .set("x2", format!("{:.5}", to.x))
                .set("y2", format!("{:.5}", to.y))
                .set("stroke", stroke)
                .set("stroke-width", self.stroke_w_normal.to_string()),
        );
    }

    fn save(self, path: &Path) -> SimResult<()> {
        ::svg::save(path, &self.document)?;
        info!("Debug SVG '{}' written", path.display());
        Ok(())
    }
}

/// Globaler Punkt → (lon, −lat) in Grad; y zeigt im SVG nach unten
fn project(p: Point3D) -> Point2D {
    let (lat, lon) = lat_lon_of(p);
    Point2D::new(lon.to_degrees(), -lat.to_degrees())
}

fn fill_for(e: &Element) -> &'static str {
    if e.flags.contains(ElementFlags::ERRORED) {
        "#d62728"
    } else if e.is_static() {
        "#8c8c8c"
    } else if e.is_steady() {
        "#6b8fb5"
    } else {
        "#f7fbff"
    }
}

fn projected_shapes(world: &World) -> Vec<Vec<Point2D>> {
    world
        .elements
        .iter()
        .map(|e| e.global_vertices().into_iter().map(project).collect())
        .collect()
}

/// Baut das SVG-Dokument des aktuellen Zustands
fn build(world: &World, svg_pixel_size: f64) -> Option<SvgBuilder> {
    let shapes = projected_shapes(world);
    let bounds = Bounds2D::from_points_iter(shapes.iter().flatten().copied())?;
    let margin = 0.05 * bounds.width().max(bounds.height()).max(1e-3);
    let mut svg = SvgBuilder::new(&bounds.expanded(margin), svg_pixel_size);

    for (e, shape) in world.elements.iter().zip(&shapes) {
        let stroke = if e.is_monitored() { "#ff7f0e" } else { "#1f3b57" };
        svg.draw_polygon(shape, fill_for(e), stroke);
    }
    for contact in world.contacts.contacts() {
        let (Some(e1), Some(e2)) = (world.elements.get(contact.i1()), world.elements.get(contact.i2())) else {
            continue;
        };
        let stroke = match contact.kind {
            ContactKind::Joint => "#2ca02c",
            _ => "#ff9896",
        };
        svg.draw_line(project(e1.center()), project(e2.center()), stroke);
    }
    for e in &world.elements {
        svg.draw_circle(project(e.center()), "#1f3b57");
    }
    Some(svg)
}

/// Schreibt `state_<step>.svg` nach `dir`. `None`, wenn es nichts zu zeichnen gibt.
pub fn write_state_svg(world: &World, dir: &Path) -> SimResult<Option<PathBuf>> {
    let Some(svg) = build(world, 1024.0) else {
        return Ok(None);
    };
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("state_{:06}.svg", world.time.n));
    svg.save(&path)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ice::element::tests::square_element;
    use crate::physics::ice::{Link, Material};
    use crate::physics::sim::resources::SimulationParameters;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_projection_in_degrees() {
        let p = crate::math::geometry::sphere::GeographicCoordinates::new(30.0, 45.0).to_cartesian();
        let xy = project(p);
        assert_abs_diff_eq!(xy.x, 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(xy.y, -45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_document_contains_elements_and_joints() {
        let elements = vec![square_element(0, 0.0, 0.0, 1.0), square_element(1, 3.0, 0.0, 1.0)];
        let mut world = World::new(
            elements,
            vec![Material::sea_ice()],
            vec![Link::new(0, 1)],
            &SimulationParameters::default(),
        )
        .unwrap();
        world.initialize().unwrap();

        let text = build(&world, 256.0).unwrap().document.to_string();
        assert_eq!(text.matches("<polygon").count(), 2);
        assert_eq!(text.matches("<line").count(), 1);
        assert!(text.contains("#2ca02c"));
    }
}
