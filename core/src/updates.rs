use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::*;

/// Coordinates whose display changed since the last drain, in the order they
/// first changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQueue {
    pending: IndexSet<Coord2>,
}

impl UpdateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `coords` unless it is already pending. Returns whether it was added.
    pub fn push(&mut self, coords: Coord2) -> bool {
        self.pending.insert(coords)
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.pending.contains(&coords)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.pending.iter().copied()
    }

    /// Takes every pending coordinate, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Coord2> {
        self.pending.drain(..).collect()
    }
}

impl Extend<Coord2> for UpdateQueue {
    fn extend<I: IntoIterator<Item = Coord2>>(&mut self, iter: I) {
        self.pending.extend(iter);
    }
}
