// src/physics/contact/detector.rs
//
// Kontaktspeicher: sortiert nach (i1, i2), ohne Duplikate. Joints werden
// nur durch `freeze`/`freeze_links` erzeugt und von keiner Routine entfernt.

use super::broad_phase::{all_pairs, sweep_and_prune};
use super::frame::PairFrame;
use super::gate::{DetectionGate, DetectionMethod, GateState};
use super::record::{Contact, ContactKind};
use crate::math::geometry::polygon::{Polygon, polygon_intersection};
use crate::math::types::Point2D;
use crate::physics::error::{SimError, SimResult};
use crate::physics::ice::{Element, Link};
use crate::physics::sim::time::ModelTime;
use bevy::log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::f64::consts::PI;

/// Gemeinsame Kanten zweier Umrisse (Indizes in die jeweiligen Vertexlisten)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedEdges {
    pub v11: usize,
    pub v12: usize,
    pub v21: usize,
    pub v22: usize,
    /// Mittlere Länge der beiden Kanten
    pub width: f64,
}

/// Sucht die einander zugewandten Kanten: erst das nächste Vertexpaar, dann
/// das nähere der beiden Nachbarpaare.
pub fn find_edges(first: &Polygon, second: &Polygon) -> SharedEdges {
    let p1 = &first.vertices;
    let p2 = &second.vertices;
    let (s1, s2) = (p1.len(), p2.len());
    if s1 == 0 || s2 == 0 {
        return SharedEdges { v11: 0, v12: 0, v21: 0, v22: 0, width: 0.0 };
    }

    let (mut v11, mut v22) = (0, 0);
    let mut min_dist = p1[0].distance(p2[0]);
    for (i, a) in p1.iter().enumerate() {
        for (j, b) in p2.iter().enumerate() {
            let d = a.distance(*b);
            if d < min_dist {
                min_dist = d;
                v11 = i;
                v22 = j;
            }
        }
    }

    let v1l = (v11 + s1 - 1) % s1;
    let v2l = (v22 + 1) % s2;
    let v1r = (v11 + 1) % s1;
    let v2r = (v22 + s2 - 1) % s2;
    let (v12, v21) = if p1[v1l].distance(p2[v2l]) < p1[v1r].distance(p2[v2r]) {
        (v1l, v2l)
    } else {
        (v1r, v2r)
    };

    SharedEdges {
        v11,
        v12,
        v21,
        v22,
        width: 0.5 * (p1[v11].distance(p1[v12]) + p2[v22].distance(p2[v21])),
    }
}

fn element_pair<'a>(elements: &'a [Element], pair: &Link) -> SimResult<(&'a Element, &'a Element)> {
    let len = elements.len();
    let get = |id: usize| elements.get(id).ok_or(SimError::ElementOutOfRange { id, len });
    Ok((get(pair.i1())?, get(pair.i2())?))
}

/// Verankert einen Joint im Schwerpunkt der Überlappung der um `tolerance`
/// aufgeblähten Umrisse. `false`, wenn sie sich nicht überlappen.
fn anchor_by_overlap(contact: &mut Contact, e1: &Element, e2: &Element, tolerance: f64) -> bool {
    let frame = PairFrame::new(e1, e2);
    let second = frame.second_shape(e2);
    let inflated1 = e1.shape.scaled_about(Point2D::ZERO, 1.0 + tolerance);
    let inflated2 = second.scaled_about(frame.r12, 1.0 + tolerance);

    let overlap = polygon_intersection(&inflated1, &inflated2);
    if !overlap.is_overlap() {
        return false;
    }

    let center = overlap.center;
    contact.kind = ContactKind::Joint;
    contact.durability = 1.0;
    contact.p1 = center;
    contact.p2 = center;
    contact.p3 = frame.point_to_second(center);
    contact.p4 = contact.p3;

    let edges = find_edges(&e1.shape, &second);
    contact.v11 = edges.v11;
    contact.v12 = edges.v12;
    contact.v21 = edges.v21;
    contact.v22 = edges.v22;
    contact.init_wid = edges.width;
    if contact.init_wid == 0.0 {
        // Breite aus Fläche / Radius des flächengleichen Kreises
        contact.init_wid = overlap.area * (PI / (e1.area * e2.area).sqrt()).sqrt();
    }
    contact.init_len = contact.p1.length() + contact.p3.length();
    true
}

/// Verankert einen Joint zwischen den nächstliegenden Kanten, ohne
/// Überlappung vorauszusetzen.
fn anchor_by_distance(contact: &mut Contact, e1: &Element, e2: &Element) {
    let frame = PairFrame::new(e1, e2);
    let second = frame.second_shape(e2);
    let edges = find_edges(&e1.shape, &second);

    let t11 = e1.shape.vertices[edges.v11];
    let t12 = e1.shape.vertices[edges.v12];
    let t21 = second.vertices[edges.v21];
    let t22 = second.vertices[edges.v22];
    let c1 = (t11 + t22) * 0.5;
    let c2 = (t12 + t21) * 0.5;

    contact.kind = ContactKind::Joint;
    contact.durability = 1.0;
    contact.p1 = c1;
    contact.p2 = c2;
    contact.p3 = frame.point_to_second(c2);
    contact.p4 = frame.point_to_second(c1);
    contact.v11 = edges.v11;
    contact.v12 = edges.v12;
    contact.v21 = edges.v21;
    contact.v22 = edges.v22;
    contact.init_wid = c1.distance(c2);
    contact.init_len = 0.5 * ((contact.p1 + contact.p2).length() + (contact.p3 + contact.p4).length());
}

/// Kontakterkennung und Kontaktspeicher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetector {
    pub method: DetectionMethod,
    pub gate: DetectionGate,
    #[serde(default)]
    gate_state: GateState,
    #[serde(default, deserialize_with = "deserialize_contacts")]
    contacts: Vec<Contact>,
}

/// Stellt beim Laden die Speicherordnung her: sortiert nach `(i1, i2)`, ein
/// Eintrag je Paar (ein Joint hat Vorrang), keine Selbstpaare.
fn deserialize_contacts<'de, D>(deserializer: D) -> Result<Vec<Contact>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut contacts = Vec::<Contact>::deserialize(deserializer)?;
    contacts.retain(|c| !c.pair.is_degenerate());
    contacts.sort_by_key(|c| (c.key(), !c.is_joint()));
    contacts.dedup_by_key(|c| c.key());
    Ok(contacts)
}

impl ContactDetector {
    pub fn new(method: DetectionMethod, gate: DetectionGate) -> Self {
        Self {
            method,
            gate,
            gate_state: GateState::default(),
            contacts: Vec::new(),
        }
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Veränderbarer Zugriff auf die Kontaktdaten, die Menge der Paare bleibt fest
    pub fn contacts_mut(&mut self) -> &mut [Contact] {
        &mut self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn find(&self, a: usize, b: usize) -> Option<&Contact> {
        let key = Link::new(a, b);
        self.contacts
            .binary_search_by_key(&(key.i1(), key.i2()), Contact::key)
            .ok()
            .map(|idx| &self.contacts[idx])
    }

    pub fn count(&self, kind: ContactKind) -> usize {
        self.contacts.iter().filter(|c| c.kind == kind).count()
    }

    /// Ein Erkennungszyklus: Gate, Clear, Breitphase, Commit.
    /// Liefert `true`, wenn das Gate eine Erkennung zugelassen hat.
    pub fn detect(&mut self, elements: &[Element], time: &ModelTime) -> bool {
        let max_speed = elements
            .iter()
            .filter(|e| e.is_active())
            .map(|e| e.v.length())
            .fold(0.0, f64::max);
        if !self.gate_state.should_detect(self.gate, time, max_speed) {
            return false;
        }

        self.clear();
        let candidates = match self.method {
            DetectionMethod::AllPairs => all_pairs(elements),
            DetectionMethod::SweepAndPrune => sweep_and_prune(elements),
        };
        self.commit(&candidates, time.n);
        debug!(
            "Detection at step {}: {} candidates, {} joints, {} contacts",
            time.n,
            candidates.len(),
            self.count(ContactKind::Joint),
            self.contacts.len()
        );
        true
    }

    /// Entfernt alle Kontakte außer Joints.
    pub fn clear(&mut self) {
        self.contacts.retain(Contact::is_joint);
    }

    /// Übernimmt sortierte, kanonische Kandidaten als Kollisionen. Bereits
    /// vorhandene Paare (insbesondere Joints) bleiben unverändert.
    pub fn commit(&mut self, candidates: &[Link], step: u64) {
        let mut sorted = candidates.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let old = std::mem::take(&mut self.contacts);
        let mut merged = Vec::with_capacity(old.len() + sorted.len());
        let mut old_iter = old.into_iter().peekable();
        let mut new_iter = sorted.into_iter().filter(|l| !l.is_degenerate()).peekable();

        loop {
            let order = match (old_iter.peek(), new_iter.peek()) {
                (Some(c), Some(l)) => c.key().cmp(&(l.i1(), l.i2())),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => break,
            };
            match order {
                Ordering::Less => merged.extend(old_iter.next()),
                Ordering::Greater => merged.extend(new_iter.next().map(|l| Contact::collision(l, step))),
                Ordering::Equal => {
                    merged.extend(old_iter.next());
                    new_iter.next();
                }
            }
        }
        self.contacts = merged;
    }

    /// Befördert Kollisionen, deren um `tolerance` aufgeblähte Umrisse sich
    /// überlappen, zu Joints. Liefert die Anzahl neuer Joints.
    pub fn freeze(&mut self, elements: &[Element], tolerance: f64) -> SimResult<usize> {
        let mut frozen = 0;
        for contact in self.contacts.iter_mut().filter(|c| !c.is_joint()) {
            let (e1, e2) = element_pair(elements, &contact.pair)?;
            if !e1.is_active() || !e2.is_active() {
                continue;
            }
            if anchor_by_overlap(contact, e1, e2, tolerance) {
                frozen += 1;
            }
        }
        info!("Freeze (tolerance {}): {} new joints", tolerance, frozen);
        Ok(frozen)
    }

    /// Erzeugt Joints für vorgegebene Paare, unabhängig von ihrer aktuellen
    /// Lage. Überlappen sich die aufgeblähten Umrisse, wird im
    /// Überlappungsschwerpunkt verankert, sonst zwischen den nächsten Kanten.
    pub fn freeze_links(
        &mut self,
        elements: &[Element],
        links: &[Link],
        tolerance: f64,
        step: u64,
    ) -> SimResult<usize> {
        let mut created = 0;
        for link in links {
            let (e1, e2) = element_pair(elements, link)?;
            if link.is_degenerate() || !e1.is_active() || !e2.is_active() {
                warn!("Link ({}, {}) skipped: degenerate or inactive element", link.i1(), link.i2());
                continue;
            }

            let key = (link.i1(), link.i2());
            let slot = self.contacts.binary_search_by_key(&key, Contact::key);
            let mut contact = Contact::new(*link, ContactKind::Joint, step);
            if !anchor_by_overlap(&mut contact, e1, e2, tolerance) {
                anchor_by_distance(&mut contact, e1, e2);
            }
            match slot {
                Ok(idx) if self.contacts[idx].is_joint() => continue,
                Ok(idx) => {
                    contact.step = self.contacts[idx].step;
                    self.contacts[idx] = contact;
                }
                Err(idx) => self.contacts.insert(idx, contact),
            }
            created += 1;
        }
        info!("Frozen {} of {} scenario links into joints", created, links.len());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ice::element::tests::square_element;

    fn time_at(n: u64) -> ModelTime {
        let mut t = ModelTime::new(600.0, 100);
        for _ in 0..n {
            t.advance();
        }
        t
    }

    fn keys(detector: &ContactDetector) -> Vec<(usize, usize)> {
        detector.contacts().iter().map(Contact::key).collect()
    }

    fn row() -> Vec<Element> {
        vec![
            square_element(0, 0.0, 0.0, 1.0),
            square_element(1, 0.9, 0.1, 1.0),
            square_element(2, -1.3, 0.0, 1.0),
            square_element(3, 5.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn test_find_edges_of_facing_squares() {
        let s1 = Polygon::new(vec![
            Point2D::new(-1.0, -1.0),
            Point2D::new(1.0, -1.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(-1.0, 1.0),
        ])
        .unwrap();
        let s2 = s1.translated(Point2D::new(2.1, 0.0));
        let edges = find_edges(&s1, &s2);
        assert_eq!((edges.v11, edges.v12), (1, 2));
        assert_eq!((edges.v22, edges.v21), (0, 3));
        assert_eq!(edges.width, 2.0);
    }

    #[test]
    fn test_detect_finds_candidates() {
        let elements = row();
        let mut detector = ContactDetector::default();
        assert!(detector.detect(&elements, &time_at(0)));
        assert_eq!(keys(&detector), vec![(0, 1), (0, 2)]);
        assert!(detector.contacts().iter().all(|c| c.kind == ContactKind::Collision));
    }

    #[test]
    fn test_clear_then_detect_is_idempotent() {
        let elements = row();
        for method in [DetectionMethod::AllPairs, DetectionMethod::SweepAndPrune] {
            let mut detector = ContactDetector::new(method, DetectionGate::Always);
            detector.detect(&elements, &time_at(0));
            let first = keys(&detector);
            detector.clear();
            assert!(detector.is_empty());
            detector.detect(&elements, &time_at(1));
            assert_eq!(keys(&detector), first);
        }
    }

    #[test]
    fn test_freeze_promotes_overlapping_pairs_only() {
        let elements = row();
        let mut detector = ContactDetector::default();
        detector.detect(&elements, &time_at(0));

        let frozen = detector.freeze(&elements, 0.05).unwrap();
        assert_eq!(frozen, 1);
        let joint = detector.find(1, 0).unwrap();
        assert!(joint.is_joint());
        assert_eq!(joint.durability, 1.0);
        assert!(joint.init_wid > 0.0);
        // Anker zwischen den beiden Zentren
        let r12 = PairFrame::new(&elements[0], &elements[1]).r12;
        let t = joint.p1.dot(r12) / r12.length_squared();
        assert!(t > 0.0 && t < 1.0);
        assert_eq!(detector.find(0, 2).unwrap().kind, ContactKind::Collision);
    }

    #[test]
    fn test_joints_survive_clear_and_detect() {
        let elements = row();
        let mut detector = ContactDetector::default();
        let created = detector
            .freeze_links(&elements, &[Link::new(3, 1)], 0.1, 0)
            .unwrap();
        assert_eq!(created, 1);

        for n in 0..3 {
            detector.detect(&elements, &time_at(n));
            let joint = detector.find(1, 3).unwrap();
            assert!(joint.is_joint());
            let k = keys(&detector);
            let mut dedup = k.clone();
            dedup.dedup();
            assert_eq!(k, dedup);
        }
        assert_eq!(keys(&detector), vec![(0, 1), (0, 2), (1, 3)]);
    }

    #[test]
    fn test_freeze_links_anchors_distant_pairs() {
        let elements = row();
        let mut detector = ContactDetector::default();
        detector.freeze_links(&elements, &[Link::new(1, 3)], 0.1, 4).unwrap();

        let joint = detector.find(1, 3).unwrap();
        assert_eq!(joint.step, 4);
        // Abstand der nächsten Kanten, keine Überlappung
        assert!(joint.init_wid > 0.0);
        let frame = PairFrame::new(&elements[1], &elements[3]);
        let a1 = joint.anchor_first();
        let a2 = frame.point_to_first(joint.anchor_second());
        assert!(a1.distance(a2) < 1e-5);
        // Anker liegt zwischen den Elementen
        let t = a1.dot(frame.r12) / frame.r12.length_squared();
        assert!(t > 0.0 && t < 1.0);
    }

    #[test]
    fn test_commit_keeps_existing_joint() {
        let elements = row();
        let mut detector = ContactDetector::default();
        detector.freeze_links(&elements, &[Link::new(0, 1)], 0.1, 0).unwrap();
        detector.commit(&[Link::new(1, 0), Link::new(0, 2)], 7);
        assert_eq!(keys(&detector), vec![(0, 1), (0, 2)]);
        assert!(detector.find(0, 1).unwrap().is_joint());
        assert_eq!(detector.find(0, 1).unwrap().step, 0);
        assert_eq!(detector.find(0, 2).unwrap().step, 7);
    }

    #[test]
    fn test_loaded_contacts_are_sorted_and_unique() {
        let mut joint = Contact::new(Link::new(0, 1), ContactKind::Joint, 3);
        joint.init_wid = 0.25;
        let stored = vec![
            Contact::collision(Link::new(2, 3), 1),
            Contact::collision(Link::new(1, 0), 1),
            joint,
            Contact::collision(Link::new(2, 3), 2),
            Contact::collision(Link::new(4, 4), 1),
        ];
        let mut value = serde_json::to_value(ContactDetector::default()).unwrap();
        value["contacts"] = serde_json::to_value(&stored).unwrap();

        let detector: ContactDetector = serde_json::from_value(value).unwrap();
        assert_eq!(keys(&detector), vec![(0, 1), (2, 3)]);
        // Der Joint verdrängt die doppelte Kollision
        let first = detector.find(0, 1).unwrap();
        assert!(first.is_joint());
        assert_eq!(first.init_wid, 0.25);
        assert_eq!(detector.find(2, 3).unwrap().step, 1);

        // Danach funktioniert der Merge wie gewohnt
        let mut detector = detector;
        detector.commit(&[Link::new(0, 2), Link::new(0, 1)], 9);
        assert_eq!(keys(&detector), vec![(0, 1), (0, 2), (2, 3)]);
        assert!(detector.find(0, 1).unwrap().is_joint());
    }

    #[test]
    fn test_gate_skips_detection() {
        let elements = row();
        let mut detector = ContactDetector::new(DetectionMethod::AllPairs, DetectionGate::EveryNSteps(5));
        assert!(detector.detect(&elements, &time_at(0)));
        detector.clear();
        assert!(!detector.detect(&elements, &time_at(2)));
        assert!(detector.is_empty());
        assert!(detector.detect(&elements, &time_at(5)));
        assert_eq!(detector.len(), 2);
    }

    #[test]
    fn test_out_of_range_link_is_an_error() {
        let elements = row();
        let mut detector = ContactDetector::default();
        let err = detector
            .freeze_links(&elements, &[Link::new(0, 17)], 0.1, 0)
            .unwrap_err();
        assert!(matches!(err, SimError::ElementOutOfRange { id: 17, len: 4 }));
    }
}
