//! Heightmap chunk meshing.
//!
//! A chunk is a regular grid of `chunk_size` cells per side. At LOD `l` every
//! `2^l`-th grid line is kept, heights are sampled per vertex from a
//! [`HeightField`], and vertex normals are the sum of the unnormalized face
//! normals of all adjacent triangles (area weighted smoothing).

use glam::{DVec3, Vec2, Vec3};

use super::chunk::ChunkCoord;
use super::height_field::HeightField;
use super::settings::GenerationSettings;
use crate::core::{Error, Result};
use crate::streaming::lod::LodLevel;

/// Accumulated normals shorter than this (squared) fall back to +Y
pub const NORMAL_EPSILON: f32 = 1.0e-6;

/// Interleaved vertex layout for GPU upload
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Triangle mesh of a single terrain chunk in chunk-local space
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainMesh {
    /// Local vertex positions, row-major with x fastest
    pub vertices: Vec<Vec3>,
    /// Unit vertex normals, parallel to `vertices`
    pub normals: Vec<Vec3>,
    /// Texture coordinates in [0, 1], parallel to `vertices`
    pub uvs: Vec<Vec2>,
    /// Triangle list, three indices per triangle
    pub indices: Vec<u32>,
    /// World-space translation of the chunk origin
    pub anchor: DVec3,
    /// LOD the mesh was actually built at after clamping to the chunk size
    pub lod: LodLevel,
    /// Number of non-finite height samples replaced by the water level
    pub repaired_samples: u32,
}

impl TerrainMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleave positions, normals and UVs into one vertex buffer
    pub fn interleaved(&self) -> Vec<TerrainVertex> {
        self.vertices
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| TerrainVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect()
    }

    /// Index buffer as raw bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Grid dimensions derived from a chunk size and LOD
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    /// LOD after clamping so that `step <= chunk_size`
    pub lod: LodLevel,
    /// Grid cells skipped per quad (`2^lod`)
    pub step: u32,
    pub squares_per_side: u32,
    pub verts_per_side: u32,
}

impl GridLayout {
    /// Layout for `chunk_size` cells at the requested LOD. Returns `None` for
    /// an empty chunk.
    pub fn new(chunk_size: u16, lod: LodLevel) -> Option<Self> {
        if chunk_size == 0 {
            return None;
        }
        let lod = lod.clamp_to_chunk(chunk_size);
        let step = lod.step();
        let squares_per_side = chunk_size as u32 / step;
        Some(Self {
            lod,
            step,
            squares_per_side,
            verts_per_side: squares_per_side + 1,
        })
    }

    pub fn vertex_count(&self) -> usize {
        (self.verts_per_side as usize).pow(2)
    }

    pub fn index_count(&self) -> usize {
        (self.squares_per_side as usize).pow(2) * 6
    }

    /// Flat vertex index of grid vertex (vx, vz)
    pub fn vertex_id(&self, vx: u32, vz: u32) -> u32 {
        vz * self.verts_per_side + vx
    }
}

/// Builds chunk meshes from a height field and a settings snapshot
pub struct MeshBuilder<'a, H: HeightField + ?Sized> {
    height_field: &'a H,
    settings: &'a GenerationSettings,
}

impl<'a, H: HeightField + ?Sized> MeshBuilder<'a, H> {
    pub fn new(height_field: &'a H, settings: &'a GenerationSettings) -> Self {
        Self { height_field, settings }
    }

    /// Mesh the chunk at `coord` with the requested LOD.
    ///
    /// Settings are read once here, so step size and vertex counts stay
    /// consistent for the whole build.
    pub fn build(&self, coord: ChunkCoord, lod: LodLevel) -> Result<TerrainMesh> {
        let chunk_size = self.settings.chunk_size;
        let tile_width = self.settings.tile_width;
        let tile_height = self.settings.tile_height;
        let water_level = self.settings.water_level;

        let layout = GridLayout::new(chunk_size, lod).ok_or(Error::InvalidChunkSize)?;
        let verts_per_side = layout.verts_per_side;

        let quad_size = tile_width as f32 * layout.step as f32;
        let anchor = coord.world_origin(chunk_size as f64 * tile_width);

        let vertex_count = layout.vertex_count();
        let mut vertices = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);
        let mut repaired_samples = 0;

        let uv_span = verts_per_side.saturating_sub(1).max(1) as f32;

        for vz in 0..verts_per_side {
            for vx in 0..verts_per_side {
                let world_x = anchor.x + vx as f64 * quad_size as f64;
                let world_z = anchor.z + vz as f64 * quad_size as f64;

                let mut height = self.height_field.sample(world_x, world_z);
                if !height.is_finite() {
                    repaired_samples += 1;
                    height = water_level;
                }
                // Clamp before scaling so the water plane is exact
                if height <= water_level {
                    height = water_level;
                }

                vertices.push(Vec3::new(
                    vx as f32 * quad_size,
                    (height * tile_height) as f32,
                    vz as f32 * quad_size,
                ));
                uvs.push(Vec2::new(vx as f32 / uv_span, vz as f32 / uv_span));
            }
        }

        let indices = triangulate(&layout);
        let normals = smooth_normals(&vertices, &indices);

        if repaired_samples > 0 {
            log::warn!(
                "Chunk ({}, {}): replaced {} non-finite height samples with water level",
                coord.x, coord.z, repaired_samples
            );
        }

        Ok(TerrainMesh {
            vertices,
            normals,
            uvs,
            indices,
            anchor,
            lod: layout.lod,
            repaired_samples,
        })
    }
}

/// Two triangles per cell, wound (v00, v11, v01) and (v00, v10, v11).
///
/// Seen from above the winding is clockwise, the front-face convention of the
/// renderers this feeds.
pub fn triangulate(layout: &GridLayout) -> Vec<u32> {
    let mut indices = Vec::with_capacity(layout.index_count());

    for z in 0..layout.squares_per_side {
        for x in 0..layout.squares_per_side {
            let v00 = layout.vertex_id(x, z);
            let v10 = layout.vertex_id(x + 1, z);
            let v01 = layout.vertex_id(x, z + 1);
            let v11 = layout.vertex_id(x + 1, z + 1);

            indices.extend_from_slice(&[v00, v11, v01, v00, v10, v11]);
        }
    }

    indices
}

/// Face-weighted vertex normals.
///
/// For a clockwise triangle (a, b, c) the outward face normal is
/// `(c - a) x (b - a)`; its length is twice the triangle area.
pub fn smooth_normals(vertices: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let a = vertices[ia];
        let face = (vertices[ic] - a).cross(vertices[ib] - a);

        normals[ia] += face;
        normals[ib] += face;
        normals[ic] += face;
    }

    for n in &mut normals {
        *n = if n.length_squared() > NORMAL_EPSILON {
            n.normalize()
        } else {
            Vec3::Y
        };
    }

    normals
}
