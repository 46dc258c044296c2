//! Hashed uniform grid for neighbour search.
//!
//! Cells are never stored explicitly. Each particle gets a `(index, hash, key)`
//! entry where `key = hash % n`; entries are sorted by key and a start-index
//! table points at the first entry of every occupied key. A query walks the
//! run of its key and drops entries whose hash differs, so two cells sharing a
//! bucket never see each other's particles.

use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Vec2};
use rayon::prelude::*;

/// Marks a key with no entries in the current build.
pub const EMPTY: u32 = u32::MAX;

const HASH_K1: i32 = 12289;
const HASH_K2: i32 = 24593;

/// The 3x3 block of cells searched around a query cell.
pub const CELL_OFFSETS: [IVec2; 9] = [
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
    IVec2::new(-1, 0),
    IVec2::new(0, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
];

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct GridEntry {
    pub index: u32,
    pub hash: u32,
    pub key: u32,
}

/// Cell containing `point`. Truncates toward zero, so cells `0` on each axis
/// span `(-radius, radius)`.
#[inline]
pub fn cell_coord(point: Vec2, radius: f32) -> IVec2 {
    IVec2::new((point.x / radius) as i32, (point.y / radius) as i32)
}

#[inline]
pub fn cell_hash(cell: IVec2) -> u32 {
    cell.x
        .wrapping_mul(HASH_K1)
        .wrapping_add(cell.y.wrapping_mul(HASH_K2)) as u32
}

#[inline]
pub fn cell_key(hash: u32, bucket_count: u32) -> u32 {
    hash % bucket_count
}

/// Sorted grid entries plus the start-index table, rebuilt from scratch each tick.
#[derive(Clone, Debug)]
pub struct SpatialLookup {
    entries: Vec<GridEntry>,
    start_indices: Vec<u32>,
}

impl SpatialLookup {
    /// Allocate a lookup for `n` particles; bucket count equals `n`.
    pub fn new(n: usize) -> Self {
        Self {
            entries: vec![GridEntry::zeroed(); n],
            start_indices: vec![EMPTY; n],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    fn bucket_count(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Sorted entries from the last build.
    pub fn entries(&self) -> &[GridEntry] {
        &self.entries
    }

    /// First sorted position holding `key`, if any.
    pub fn start_index(&self, key: u32) -> Option<usize> {
        match self.start_indices.get(key as usize) {
            Some(&s) if s != EMPTY => Some(s as usize),
            _ => None,
        }
    }

    /// Number of distinct keys present after the last build.
    pub fn occupied_buckets(&self) -> usize {
        self.start_indices.iter().filter(|&&s| s != EMPTY).count()
    }

    /// Rebuild from `points`, which must hold exactly one position per particle.
    pub fn build(&mut self, points: &[Vec2], radius: f32) {
        debug_assert_eq!(points.len(), self.entries.len());
        let buckets = self.bucket_count();

        self.entries
            .par_iter_mut()
            .zip(points.par_iter())
            .enumerate()
            .for_each(|(i, (entry, &p))| {
                let hash = cell_hash(cell_coord(p, radius));
                *entry = GridEntry {
                    index: i as u32,
                    hash,
                    key: cell_key(hash, buckets),
                };
            });
        self.start_indices.par_iter_mut().for_each(|s| *s = EMPTY);

        // stable, so entries of one key keep particle order
        self.entries.par_sort_by_key(|e| e.key);

        let entries = &self.entries;
        let starts: Vec<(u32, u32)> = (0..entries.len())
            .into_par_iter()
            .filter_map(|i| {
                let key = entries[i].key;
                let prev = if i == 0 { EMPTY } else { entries[i - 1].key };
                (key != prev).then_some((key, i as u32))
            })
            .collect();
        // one write per key
        for (key, start) in starts {
            self.start_indices[key as usize] = start;
        }

        tracing::debug!(
            particles = self.entries.len(),
            buckets = self.occupied_buckets(),
            "spatial lookup rebuilt"
        );
    }

    /// Particles in the 3x3 block of cells centred on `cell`.
    pub fn neighbors_of_cell(&self, cell: IVec2) -> NeighborIter<'_> {
        NeighborIter {
            lookup: self,
            center: cell,
            offset: 0,
            hash: 0,
            key: 0,
            cursor: None,
        }
    }

    /// Particles that can lie within `radius` of `point`.
    #[inline]
    pub fn neighbors_of_point(&self, point: Vec2, radius: f32) -> NeighborIter<'_> {
        self.neighbors_of_cell(cell_coord(point, radius))
    }
}

/// Lazy walk over the nine neighbour cells; yields particle indices.
pub struct NeighborIter<'a> {
    lookup: &'a SpatialLookup,
    center: IVec2,
    offset: usize,
    hash: u32,
    key: u32,
    cursor: Option<usize>,
}

impl NeighborIter<'_> {
    /// Move to the next offset cell whose key has entries.
    fn advance_cell(&mut self) -> bool {
        while self.offset < CELL_OFFSETS.len() {
            let cell = self.center.wrapping_add(CELL_OFFSETS[self.offset]);
            self.offset += 1;
            self.hash = cell_hash(cell);
            self.key = cell_key(self.hash, self.lookup.bucket_count());
            if let Some(start) = self.lookup.start_index(self.key) {
                self.cursor = Some(start);
                return true;
            }
        }
        false
    }
}

impl Iterator for NeighborIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let lookup = self.lookup;
        loop {
            let Some(pos) = self.cursor else {
                if lookup.is_empty() || !self.advance_cell() {
                    return None;
                }
                continue;
            };
            match lookup.entries.get(pos) {
                Some(e) if e.key == self.key => {
                    self.cursor = Some(pos + 1);
                    if e.hash == self.hash {
                        return Some(e.index as usize);
                    }
                }
                _ => self.cursor = None,
            }
        }
    }
}
