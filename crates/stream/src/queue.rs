use std::collections::{HashSet, VecDeque};

use crate::grid::{TileCoord, TileKey};

/// A coordinate waiting for generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadEntry {
    pub coord: TileCoord,
    /// Manhattan distance from the viewpoint tile at the last ranking.
    pub distance: i32,
    /// Insertion sequence, breaks distance ties.
    seq: u64,
}

/// Pending tile loads, closest first. Never holds the same coordinate twice.
#[derive(Debug, Default)]
pub struct LoadQueue {
    entries: VecDeque<LoadEntry>,
    members: HashSet<TileKey>,
    next_seq: u64,
}

impl LoadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.members.contains(&coord.key())
    }

    /// Insert `coord` ranked by distance from `center`. Returns `false` if it
    /// was already queued.
    pub fn push(&mut self, coord: TileCoord, center: TileCoord) -> bool {
        if !self.members.insert(coord.key()) {
            return false;
        }
        let entry = LoadEntry {
            coord,
            distance: coord.manhattan(center),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        // Upper bound: after every entry at the same distance, so ties keep insertion order.
        let at = self.entries.partition_point(|e| e.distance <= entry.distance);
        self.entries.insert(at, entry);
        true
    }

    pub fn pop(&mut self) -> Option<LoadEntry> {
        let entry = self.entries.pop_front()?;
        self.members.remove(&entry.coord.key());
        Some(entry)
    }

    /// Re-rank everything against a new viewpoint tile and drop entries farther
    /// than `radius` (Chebyshev). Dropped tiles are simply never generated.
    /// Returns the number dropped.
    pub fn rerank(&mut self, center: TileCoord, radius: i32) -> usize {
        let before = self.entries.len();
        let members = &mut self.members;
        self.entries.retain(|e| {
            let keep = e.coord.chebyshev(center) <= radius;
            if !keep {
                members.remove(&e.coord.key());
            }
            keep
        });
        for e in self.entries.iter_mut() {
            e.distance = e.coord.manhattan(center);
        }
        self.entries
            .make_contiguous()
            .sort_by_key(|e| (e.distance, e.seq));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.members.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadEntry> {
        self.entries.iter()
    }
}
