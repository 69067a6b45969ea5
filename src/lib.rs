//! Lodterrain - streaming level-of-detail heightmap terrain
//!
//! Terrain is split into square chunks on the XZ plane. Around a moving
//! observer, chunks are meshed from a noise height field at a detail level
//! that falls off with distance, handed to a mesh sink, and evicted again
//! once the observer has moved far enough away.
//!
//! ```
//! use lodterrain::streaming::{MeshRegistry, TerrainStreamer};
//! use lodterrain::terrain::GenerationSettings;
//! use glam::DVec3;
//!
//! let settings = GenerationSettings {
//!     chunk_size: 8,
//!     view_radius: 1,
//!     chunks_per_frame: 16,
//!     ..Default::default()
//! };
//! let mut streamer = TerrainStreamer::new(settings, MeshRegistry::new());
//! let report = streamer.tick(Some(DVec3::new(4.0, 0.0, 4.0)), 1.0 / 60.0);
//! assert_eq!(report.built, 9);
//! assert_eq!(streamer.sink().len(), 9);
//! ```

pub mod core;
pub mod terrain;
pub mod streaming;
