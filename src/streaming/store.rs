//! Resident chunk bookkeeping
//!
//! Maps each chunk coordinate to the handle of its mesh and the LOD it was
//! requested at. Handles are issued by the mesh sink, which owns the actual
//! render objects; the store never dereferences them.

use std::collections::HashMap;

use crate::streaming::lod::LodLevel;
use crate::terrain::ChunkCoord;

/// A resident chunk: the sink's handle plus the LOD it was built for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkEntry<H> {
    pub handle: H,
    pub lod: LodLevel,
}

/// Resident chunks keyed by coordinate, at most one entry per coordinate
#[derive(Debug)]
pub struct ChunkStore<H> {
    chunks: HashMap<ChunkCoord, ChunkEntry<H>>,
}

impl<H> Default for ChunkStore<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ChunkStore<H> {
    pub fn new() -> Self {
        Self {
            chunks: HashMap::new(),
        }
    }

    /// Get the entry for a coordinate
    pub fn get(&self, coord: ChunkCoord) -> Option<&ChunkEntry<H>> {
        self.chunks.get(&coord)
    }

    /// LOD of the resident chunk, if any
    pub fn lod_of(&self, coord: ChunkCoord) -> Option<LodLevel> {
        self.chunks.get(&coord).map(|entry| entry.lod)
    }

    /// Insert or replace the entry for `coord`.
    ///
    /// Returns the handle that was replaced so the caller can release it.
    pub fn upsert(&mut self, coord: ChunkCoord, handle: H, lod: LodLevel) -> Option<H> {
        self.chunks
            .insert(coord, ChunkEntry { handle, lod })
            .map(|previous| previous.handle)
    }

    /// Remove a single chunk
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<ChunkEntry<H>> {
        self.chunks.remove(&coord)
    }

    /// Remove every chunk matching the predicate and return them
    pub fn evict_where<F>(&mut self, mut predicate: F) -> Vec<(ChunkCoord, H)>
    where
        F: FnMut(ChunkCoord, &ChunkEntry<H>) -> bool,
    {
        let doomed: Vec<ChunkCoord> = self
            .chunks
            .iter()
            .filter(|&(coord, entry)| predicate(*coord, entry))
            .map(|(coord, _)| *coord)
            .collect();

        doomed
            .into_iter()
            .filter_map(|coord| self.chunks.remove(&coord).map(|entry| (coord, entry.handle)))
            .collect()
    }

    /// Remove every chunk
    pub fn drain(&mut self) -> Vec<(ChunkCoord, H)> {
        self.chunks
            .drain()
            .map(|(coord, entry)| (coord, entry.handle))
            .collect()
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterate over resident coordinates and entries
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &ChunkEntry<H>)> {
        self.chunks.iter()
    }

    pub fn coords(&self) -> impl Iterator<Item = &ChunkCoord> {
        self.chunks.keys()
    }
}
