//! Chunk coordinates on the infinite XZ terrain grid

use glam::DVec3;

/// Integer coordinate identifying a terrain chunk in the world grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Convert a world position to the chunk that contains it.
    ///
    /// `chunk_extent` is the side length of one chunk in world units
    /// (`chunk_size * tile_width`). A zero, negative or non-finite extent
    /// has no meaningful grid, so every position maps to the origin chunk.
    pub fn from_world(x: f64, z: f64, chunk_extent: f64) -> Self {
        if !(chunk_extent > 0.0 && chunk_extent.is_finite()) {
            return Self::default();
        }
        Self {
            x: (x / chunk_extent).floor() as i32,
            z: (z / chunk_extent).floor() as i32,
        }
    }

    /// World-space origin (minimum corner) of this chunk, y = 0
    pub fn world_origin(&self, chunk_extent: f64) -> DVec3 {
        DVec3::new(
            self.x as f64 * chunk_extent,
            0.0,
            self.z as f64 * chunk_extent,
        )
    }

    /// Offset this coordinate by a grid delta
    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        Self::new(self.x.wrapping_add(dx), self.z.wrapping_add(dz))
    }

    /// Chebyshev (square) distance in chunks: `max(|dx|, |dz|)`
    pub fn chebyshev_distance(&self, other: ChunkCoord) -> u32 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dz = (self.z as i64 - other.z as i64).unsigned_abs();
        dx.max(dz).min(u32::MAX as u64) as u32
    }

    /// Squared Euclidean distance in chunks, saturating at `u64::MAX`
    pub fn distance_squared(&self, other: ChunkCoord) -> u64 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dz = (self.z as i64 - other.z as i64).unsigned_abs();
        dx.saturating_mul(dx).saturating_add(dz.saturating_mul(dz))
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from((x, z): (i32, i32)) -> Self {
        Self::new(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_world_floors_negative() {
        assert_eq!(ChunkCoord::from_world(0.0, 0.0, 32.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(31.9, 31.9, 32.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(32.0, 0.0, 32.0), ChunkCoord::new(1, 0));
        assert_eq!(ChunkCoord::from_world(-0.1, -32.0, 32.0), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_world(-32.1, 0.0, 32.0), ChunkCoord::new(-2, 0));
    }

    #[test]
    fn test_from_world_degenerate_extent() {
        assert_eq!(ChunkCoord::from_world(500.0, -20.0, 0.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(500.0, -20.0, f64::NAN), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(500.0, -20.0, -4.0), ChunkCoord::new(0, 0));
    }

    #[test]
    fn test_world_origin() {
        let origin = ChunkCoord::new(2, -3).world_origin(16.0);
        assert_eq!(origin, DVec3::new(32.0, 0.0, -48.0));
    }

    #[test]
    fn test_distances() {
        let a = ChunkCoord::new(0, 0);
        let b = ChunkCoord::new(3, -2);
        assert_eq!(a.chebyshev_distance(b), 3);
        assert_eq!(b.chebyshev_distance(a), 3);
        assert_eq!(a.distance_squared(b), 13);
    }

    #[test]
    fn test_distance_does_not_overflow() {
        let a = ChunkCoord::new(i32::MIN, i32::MIN);
        let b = ChunkCoord::new(i32::MAX, i32::MAX);
        assert_eq!(a.chebyshev_distance(b), u32::MAX);
        assert_eq!(a.distance_squared(b), u64::MAX);
    }
}
