//! Streaming policy: which chunks should be resident, at which LOD.
//!
//! The controller tracks the observer's chunk. Whenever that chunk changes it
//! walks the square (Chebyshev) view footprint, queues builds for chunks that
//! are missing or at the wrong LOD, and evicts resident chunks outside the
//! circular (Euclidean) unload radius. The two footprints differ on purpose:
//! the circle is a hysteresis margin around the square load area.
//!
//! Requests are never deduplicated. A request that no longer matches the
//! desired state when it reaches the front of the queue is skipped instead.

use std::collections::VecDeque;

use crate::streaming::lod::{LodLevel, lod_for_distance};
use crate::streaming::store::ChunkStore;
use crate::terrain::{ChunkCoord, GenerationSettings};

/// Request to (re)build a chunk at a target LOD
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BuildRequest {
    pub coord: ChunkCoord,
    pub lod: LodLevel,
}

/// Whether the controller knows where the observer is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CenterState {
    /// No observer position seen yet
    #[default]
    NoCenter,
    /// Last known observer chunk
    Tracking(ChunkCoord),
}

/// Outcome of a center change
#[derive(Debug)]
pub struct Recenter<H> {
    pub center: ChunkCoord,
    /// Number of build requests queued
    pub enqueued: usize,
    /// Chunks removed from the store; their handles must be released
    pub evicted: Vec<(ChunkCoord, H)>,
}

/// Owns the resident chunk store and the FIFO build queue
#[derive(Debug)]
pub struct StreamingController<H> {
    store: ChunkStore<H>,
    queue: VecDeque<BuildRequest>,
    state: CenterState,
}

impl<H> Default for StreamingController<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> StreamingController<H> {
    pub fn new() -> Self {
        Self {
            store: ChunkStore::new(),
            queue: VecDeque::new(),
            state: CenterState::NoCenter,
        }
    }

    pub fn state(&self) -> CenterState {
        self.state
    }

    /// Current center chunk, if tracking
    pub fn center(&self) -> Option<ChunkCoord> {
        match self.state {
            CenterState::NoCenter => None,
            CenterState::Tracking(center) => Some(center),
        }
    }

    pub fn store(&self) -> &ChunkStore<H> {
        &self.store
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Queued requests, front first
    pub fn pending(&self) -> impl Iterator<Item = &BuildRequest> {
        self.queue.iter()
    }

    /// Feed the observer's current chunk.
    ///
    /// Recomputes the desired state only on the first observation or when
    /// the chunk differs from the stored center.
    pub fn update_center(
        &mut self,
        center: ChunkCoord,
        settings: &GenerationSettings,
    ) -> Option<Recenter<H>> {
        if self.state == CenterState::Tracking(center) {
            return None;
        }
        self.state = CenterState::Tracking(center);
        Some(self.recenter(center, settings))
    }

    /// Queue builds inside the view radius and evict outside the unload radius
    fn recenter(&mut self, center: ChunkCoord, settings: &GenerationSettings) -> Recenter<H> {
        let radius = settings.view_radius as i64;
        let mut enqueued = 0;

        for dz in -radius..=radius {
            for dx in -radius..=radius {
                let coord = center.offset(dx as i32, dz as i32);
                let distance = dx.unsigned_abs().max(dz.unsigned_abs()) as u32;
                let desired = lod_for_distance(distance, &settings.lod_distances);

                if self.store.lod_of(coord) != Some(desired) {
                    self.queue.push_back(BuildRequest { coord, lod: desired });
                    enqueued += 1;
                }
            }
        }

        let unload_sq = (settings.unload_radius as u64).pow(2);
        let evicted = self
            .store
            .evict_where(|coord, _| coord.distance_squared(center) > unload_sq);

        Recenter {
            center,
            enqueued,
            evicted,
        }
    }

    /// LOD the chunk should have around the current center, or `None` if it
    /// lies outside the view footprint (or there is no center yet)
    pub fn desired_lod(&self, coord: ChunkCoord, settings: &GenerationSettings) -> Option<LodLevel> {
        let center = self.center()?;
        let distance = coord.chebyshev_distance(center);
        (distance <= settings.view_radius).then(|| lod_for_distance(distance, &settings.lod_distances))
    }

    /// Pop the next request from the front of the queue
    pub fn pop_request(&mut self) -> Option<BuildRequest> {
        self.queue.pop_front()
    }

    /// A request is stale when the store already holds the chunk at that LOD,
    /// or when the chunk no longer wants that LOD around the current center.
    pub fn is_stale(&self, request: &BuildRequest, settings: &GenerationSettings) -> bool {
        self.store.lod_of(request.coord) == Some(request.lod)
            || self.desired_lod(request.coord, settings) != Some(request.lod)
    }

    /// Record a freshly built chunk. Returns the handle it replaced, if any.
    pub fn install(&mut self, request: BuildRequest, handle: H) -> Option<H> {
        self.store.upsert(request.coord, handle, request.lod)
    }

    /// Forget everything: drop queued requests, return to `NoCenter` and hand
    /// back every resident handle for release
    pub fn reset(&mut self) -> Vec<(ChunkCoord, H)> {
        self.queue.clear();
        self.state = CenterState::NoCenter;
        self.store.drain()
    }
}
