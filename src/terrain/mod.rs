//! Procedural terrain: chunk grid, settings, height sampling and meshing

pub mod chunk;
pub use chunk::ChunkCoord;

pub mod settings;
pub use settings::{
    DomainWarpType, FractalType, GenerationSettings, MAX_CHUNK_SIZE, MAX_OCTAVES, NoiseSettings,
    NoiseType,
};

pub mod height_field;
pub use height_field::{HeightField, NoiseHeightField, PingPong};

pub mod mesh;
pub use mesh::{GridLayout, MeshBuilder, TerrainMesh, TerrainVertex, smooth_normals, triangulate};
