//! Chunk streaming around a moving observer

pub mod lod;
pub mod store;
pub mod controller;
pub mod sink;
pub mod scheduler;

pub use lod::{COARSEST_STREAMED_LOD, LodLevel, MAX_LOD, lod_for_distance, quad_size_at_lod};
pub use store::{ChunkEntry, ChunkStore};
pub use controller::{BuildRequest, CenterState, Recenter, StreamingController};
pub use sink::{MeshId, MeshRegistry, MeshSink};
pub use scheduler::{TerrainStreamer, TickReport};
