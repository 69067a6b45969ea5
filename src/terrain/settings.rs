//! Generation settings: noise parameters, tile dimensions and streaming radii.
//!
//! Settings are a plain snapshot. The terrain streamer reads one snapshot per
//! build, so a host that tweaks values live never changes a chunk halfway
//! through meshing it. Host-facing setters take the loosely typed values an
//! editor would hand over and clamp them instead of failing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Result;

/// Maximum chunk side length in grid cells
pub const MAX_CHUNK_SIZE: u16 = u16::MAX;

/// Octave ceiling, matching the cap `noise::Fbm` and `noise::RidgedMulti` apply
pub const MAX_OCTAVES: u32 = 32;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Base gradient/cell noise used for terrain heights
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseType {
    #[default]
    OpenSimplex2,
    Perlin,
    Cellular,
}

impl NoiseType {
    /// Map an editor index to a variant. Unknown values fall back to `OpenSimplex2`.
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::Perlin,
            2 => Self::Cellular,
            _ => Self::OpenSimplex2,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Self::OpenSimplex2 => 0,
            Self::Perlin => 1,
            Self::Cellular => 2,
        }
    }
}

/// How octaves are combined
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractalType {
    #[default]
    Fbm,
    Ridged,
    PingPong,
}

impl FractalType {
    /// Map an editor index to a variant. Unknown values fall back to `Fbm`.
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::Ridged,
            2 => Self::PingPong,
            _ => Self::Fbm,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Self::Fbm => 0,
            Self::Ridged => 1,
            Self::PingPong => 2,
        }
    }
}

/// Noise used to displace sample points before the height lookup
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainWarpType {
    #[default]
    OpenSimplex2,
    OpenSimplex2Reduced,
    BasicGrid,
}

impl DomainWarpType {
    /// Map an editor index to a variant. Unknown values fall back to `OpenSimplex2`.
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::OpenSimplex2Reduced,
            2 => Self::BasicGrid,
            _ => Self::OpenSimplex2,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Self::OpenSimplex2 => 0,
            Self::OpenSimplex2Reduced => 1,
            Self::BasicGrid => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Noise settings
// ---------------------------------------------------------------------------

/// Parameters of the height noise field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub seed: i32,
    pub noise_type: NoiseType,
    /// Base frequency applied to world coordinates
    pub frequency: f64,
    pub fractal_type: FractalType,
    /// Number of octaves (1..=32)
    pub octaves: u32,
    /// Frequency multiplier between octaves
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves
    pub gain: f64,
    /// How strongly an octave's value damps the next octave's amplitude.
    /// Only the ping-pong fractal reads it; `Fbm` and `Ridged` ignore it.
    pub weighted_strength: f64,
    pub ping_pong_strength: f64,
    pub domain_warp_enabled: bool,
    pub domain_warp_type: DomainWarpType,
    /// Displacement of sample points in world units
    pub domain_warp_amplitude: f64,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 1337,
            noise_type: NoiseType::OpenSimplex2,
            frequency: 0.01,
            fractal_type: FractalType::Fbm,
            octaves: 5,
            lacunarity: 2.0,
            gain: 0.5,
            weighted_strength: 0.0,
            ping_pong_strength: 2.0,
            domain_warp_enabled: false,
            domain_warp_type: DomainWarpType::OpenSimplex2,
            domain_warp_amplitude: 30.0,
        }
    }
}

impl NoiseSettings {
    /// Set octave count, clamped to `1..=MAX_OCTAVES`
    pub fn set_octaves(&mut self, octaves: i32) {
        self.octaves = octaves.clamp(1, MAX_OCTAVES as i32) as u32;
    }

    pub fn set_noise_type(&mut self, index: i32) {
        self.noise_type = NoiseType::from_index(index);
    }

    pub fn set_fractal_type(&mut self, index: i32) {
        self.fractal_type = FractalType::from_index(index);
    }

    pub fn set_domain_warp_type(&mut self, index: i32) {
        self.domain_warp_type = DomainWarpType::from_index(index);
    }

    /// Clamp a deserialized snapshot into the valid range
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.octaves = self.octaves.clamp(1, MAX_OCTAVES);
        finite_or(&mut self.frequency, defaults.frequency);
        finite_or(&mut self.lacunarity, defaults.lacunarity);
        finite_or(&mut self.gain, defaults.gain);
        finite_or(&mut self.weighted_strength, defaults.weighted_strength);
        finite_or(&mut self.ping_pong_strength, defaults.ping_pong_strength);
        finite_or(&mut self.domain_warp_amplitude, defaults.domain_warp_amplitude);
        self
    }
}

// ---------------------------------------------------------------------------
// Generation settings
// ---------------------------------------------------------------------------

/// Full configuration snapshot for meshing and streaming
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Height noise parameters
    pub noise: NoiseSettings,
    /// World size of one grid cell (>= 0)
    pub tile_width: f64,
    /// Vertical scale applied to the [0, 1] height sample
    pub tile_height: f64,
    /// Height sample at or below which terrain is flattened
    pub water_level: f64,
    /// Chunk side length in grid cells
    pub chunk_size: u16,
    /// Chebyshev radius (in chunks) of the load footprint
    pub view_radius: u32,
    /// Euclidean radius (in chunks) beyond which chunks are evicted
    pub unload_radius: u32,
    /// Maximum chunk builds per tick
    pub chunks_per_frame: u32,
    /// Chebyshev distance thresholds for LOD 0, 1 and 2
    pub lod_distances: [u32; 3],
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            noise: NoiseSettings::default(),
            tile_width: 1.0,
            tile_height: 10.0,
            water_level: 0.0,
            chunk_size: 32,
            view_radius: 8,
            unload_radius: 10,
            chunks_per_frame: 4,
            lod_distances: [2, 4, 8],
        }
    }
}

impl GenerationSettings {
    /// World-space side length of one chunk
    pub fn chunk_extent(&self) -> f64 {
        self.chunk_size as f64 * self.tile_width
    }

    pub fn set_tile_width(&mut self, width: f64) {
        self.tile_width = if width > 0.0 { width } else { 0.0 };
    }

    pub fn set_tile_height(&mut self, height: f64) {
        self.tile_height = height;
    }

    pub fn set_water_level(&mut self, level: f64) {
        self.water_level = level;
    }

    /// Set chunk size, clamped to `0..=65535`
    pub fn set_chunk_size(&mut self, size: i32) {
        self.chunk_size = size.clamp(0, MAX_CHUNK_SIZE as i32) as u16;
    }

    pub fn set_view_radius(&mut self, radius: i32) {
        self.view_radius = radius.max(0) as u32;
    }

    pub fn set_unload_radius(&mut self, radius: i32) {
        self.unload_radius = radius.max(0) as u32;
    }

    pub fn set_chunks_per_frame(&mut self, count: i32) {
        self.chunks_per_frame = count.max(0) as u32;
    }

    /// Set the distance threshold for LOD `level` (0..=2). Other levels are ignored.
    pub fn set_lod_distance(&mut self, level: usize, distance: i32) {
        if let Some(slot) = self.lod_distances.get_mut(level) {
            *slot = distance.max(0) as u32;
        }
    }

    /// Clamp a deserialized snapshot into the valid range
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        finite_or(&mut self.tile_width, defaults.tile_width);
        finite_or(&mut self.tile_height, defaults.tile_height);
        finite_or(&mut self.water_level, defaults.water_level);
        self.set_tile_width(self.tile_width);
        self.noise = self.noise.sanitized();
        self
    }

    /// Load settings from a JSON file, clamping invalid values
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&json)?;
        Ok(settings.sanitized())
    }

    /// Save settings as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }
}

fn finite_or(value: &mut f64, fallback: f64) {
    if !value.is_finite() {
        *value = fallback;
    }
}
