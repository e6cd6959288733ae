// src/physics/ice/link.rs
use serde::{Deserialize, Serialize};

/// Angeforderte permanente Verbindung zweier Elemente, immer mit `i1 < i2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Link {
    i1: usize,
    i2: usize,
}

impl Link {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            i1: a.min(b),
            i2: a.max(b),
        }
    }

    pub fn i1(&self) -> usize {
        self.i1
    }

    pub fn i2(&self) -> usize {
        self.i2
    }

    /// Verbindung eines Elements mit sich selbst
    pub fn is_degenerate(&self) -> bool {
        self.i1 == self.i2
    }
}

impl From<(usize, usize)> for Link {
    fn from((a, b): (usize, usize)) -> Self {
        Link::new(a, b)
    }
}

impl From<Link> for (usize, usize) {
    fn from(link: Link) -> Self {
        (link.i1, link.i2)
    }
}
