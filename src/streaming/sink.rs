//! Hand-off point between the streamer and whatever displays the meshes.

use std::collections::HashMap;

use crate::terrain::{ChunkCoord, TerrainMesh};

/// Receives finished chunk meshes and owns their render-visible lifetime.
///
/// The streamer only keeps the returned handle. Every handle it is given is
/// passed back to [`MeshSink::release`] exactly once, when the chunk is
/// replaced, evicted or cleared.
pub trait MeshSink {
    type Handle;

    /// Take ownership of a new chunk mesh
    fn attach(&mut self, coord: ChunkCoord, mesh: TerrainMesh) -> Self::Handle;

    /// Drop the mesh behind `handle`
    fn release(&mut self, coord: ChunkCoord, handle: Self::Handle);
}

/// Identifier issued by [`MeshRegistry`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

/// In-memory sink that keeps every attached mesh until released.
///
/// Useful for headless hosts and tests, and as a staging area for uploads.
#[derive(Debug, Default)]
pub struct MeshRegistry {
    meshes: HashMap<MeshId, (ChunkCoord, TerrainMesh)>,
    next_id: u64,
    attached: u64,
    released: u64,
}

impl MeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: MeshId) -> Option<&TerrainMesh> {
        self.meshes.get(&id).map(|(_, mesh)| mesh)
    }

    /// Number of meshes currently held
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Total attach calls so far
    pub fn attached(&self) -> u64 {
        self.attached
    }

    /// Total release calls so far
    pub fn released(&self) -> u64 {
        self.released
    }

    /// Sum of vertices over all held meshes
    pub fn total_vertices(&self) -> usize {
        self.meshes.values().map(|(_, mesh)| mesh.vertex_count()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, ChunkCoord, &TerrainMesh)> {
        self.meshes.iter().map(|(id, (coord, mesh))| (*id, *coord, mesh))
    }
}

impl MeshSink for MeshRegistry {
    type Handle = MeshId;

    fn attach(&mut self, coord: ChunkCoord, mesh: TerrainMesh) -> MeshId {
        let id = MeshId(self.next_id);
        self.next_id += 1;
        self.attached += 1;
        self.meshes.insert(id, (coord, mesh));
        id
    }

    fn release(&mut self, coord: ChunkCoord, handle: MeshId) {
        self.released += 1;
        if self.meshes.remove(&handle).is_none() {
            log::warn!("Release of unknown mesh {:?} for chunk ({}, {})", handle, coord.x, coord.z);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_attach_release() {
        let mut registry = MeshRegistry::new();
        let a = registry.attach(ChunkCoord::new(0, 0), TerrainMesh::default());
        let b = registry.attach(ChunkCoord::new(1, 0), TerrainMesh::default());
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        registry.release(ChunkCoord::new(0, 0), a);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(a).is_none());
        assert!(registry.get(b).is_some());
        assert_eq!(registry.attached(), 2);
        assert_eq!(registry.released(), 1);
    }

    #[test]
    fn test_registry_unknown_release_is_harmless() {
        let mut registry = MeshRegistry::new();
        registry.release(ChunkCoord::new(0, 0), MeshId(42));
        assert!(registry.is_empty());
        assert_eq!(registry.released(), 1);
    }
}
