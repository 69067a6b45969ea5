//! Level of Detail (LOD) selection for terrain chunks
//!
//! Each LOD level doubles the grid step used when meshing a chunk, so a
//! chunk at level `l` has `(chunk_size / 2^l + 1)^2` vertices. The streamer
//! picks a level from the Chebyshev distance (in chunks) between a chunk
//! and the observer's chunk.

use serde::{Deserialize, Serialize};

/// Maximum LOD level a mesh can be built at
pub const MAX_LOD: u32 = 6;

/// Level used beyond the last distance threshold
pub const COARSEST_STREAMED_LOD: LodLevel = LodLevel::Level3;

/// Closed set of detail levels; higher is coarser
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LodLevel {
    #[default]
    Level0,
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
    Level6,
}

impl LodLevel {
    pub const ALL: [LodLevel; 7] = [
        LodLevel::Level0,
        LodLevel::Level1,
        LodLevel::Level2,
        LodLevel::Level3,
        LodLevel::Level4,
        LodLevel::Level5,
        LodLevel::Level6,
    ];

    /// Map an integer to a level, clamping out-of-range values
    ///
    /// # Examples
    /// ```
    /// use lodterrain::streaming::lod::LodLevel;
    ///
    /// assert_eq!(LodLevel::from_index(2), LodLevel::Level2);
    /// assert_eq!(LodLevel::from_index(-1), LodLevel::Level0);
    /// assert_eq!(LodLevel::from_index(40), LodLevel::Level6);
    /// ```
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.clamp(0, MAX_LOD as i32) as usize]
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Grid step (`2^level`) in cells
    pub fn step(self) -> u32 {
        1 << self.index()
    }

    /// Next finer level, saturating at `Level0`
    pub fn finer(self) -> Self {
        Self::from_index(self.index() as i32 - 1)
    }

    /// Reduce the level until its step fits inside a chunk of `chunk_size`
    /// cells. A zero-sized chunk floors to `Level0`.
    ///
    /// # Examples
    /// ```
    /// use lodterrain::streaming::lod::LodLevel;
    ///
    /// assert_eq!(LodLevel::Level3.clamp_to_chunk(32), LodLevel::Level3);
    /// assert_eq!(LodLevel::Level6.clamp_to_chunk(10), LodLevel::Level3);
    /// assert_eq!(LodLevel::Level2.clamp_to_chunk(1), LodLevel::Level0);
    /// ```
    pub fn clamp_to_chunk(self, chunk_size: u16) -> Self {
        let mut lod = self;
        while lod != LodLevel::Level0 && lod.step() > chunk_size as u32 {
            lod = lod.finer();
        }
        lod
    }
}

/// Pick the LOD for a chunk `distance` chunks away (Chebyshev).
///
/// Thresholds are inclusive: `distance <= thresholds[0]` is LOD 0 and so on;
/// anything past the last threshold gets [`COARSEST_STREAMED_LOD`].
/// Thresholds are expected to be non-decreasing but this is not enforced,
/// the first matching threshold wins.
///
/// # Examples
/// ```
/// use lodterrain::streaming::lod::{lod_for_distance, LodLevel};
///
/// let thresholds = [2, 4, 8];
/// assert_eq!(lod_for_distance(0, &thresholds), LodLevel::Level0);
/// assert_eq!(lod_for_distance(3, &thresholds), LodLevel::Level1);
/// assert_eq!(lod_for_distance(8, &thresholds), LodLevel::Level2);
/// assert_eq!(lod_for_distance(9, &thresholds), LodLevel::Level3);
/// ```
pub fn lod_for_distance(distance: u32, thresholds: &[u32; 3]) -> LodLevel {
    for (level, &max_dist) in thresholds.iter().enumerate() {
        if distance <= max_dist {
            return LodLevel::ALL[level];
        }
    }
    COARSEST_STREAMED_LOD
}

/// World size of one mesh quad at a given LOD
///
/// # Examples
/// ```
/// use lodterrain::streaming::lod::{quad_size_at_lod, LodLevel};
///
/// assert_eq!(quad_size_at_lod(1.0, LodLevel::Level0), 1.0);
/// assert_eq!(quad_size_at_lod(0.5, LodLevel::Level3), 4.0);
/// ```
pub fn quad_size_at_lod(tile_width: f64, lod: LodLevel) -> f64 {
    tile_width * lod.step() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lod_for_distance() {
        let thresholds = [2, 4, 8];

        assert_eq!(lod_for_distance(0, &thresholds), LodLevel::Level0);
        assert_eq!(lod_for_distance(2, &thresholds), LodLevel::Level0);

        assert_eq!(lod_for_distance(3, &thresholds), LodLevel::Level1);
        assert_eq!(lod_for_distance(4, &thresholds), LodLevel::Level1);

        assert_eq!(lod_for_distance(5, &thresholds), LodLevel::Level2);
        assert_eq!(lod_for_distance(8, &thresholds), LodLevel::Level2);

        assert_eq!(lod_for_distance(9, &thresholds), LodLevel::Level3);
        assert_eq!(lod_for_distance(u32::MAX, &thresholds), LodLevel::Level3);
    }

    #[test]
    fn test_lod_for_distance_unsorted_thresholds() {
        // First matching threshold wins
        let thresholds = [5, 1, 3];
        assert_eq!(lod_for_distance(4, &thresholds), LodLevel::Level0);
        assert_eq!(lod_for_distance(6, &thresholds), LodLevel::Level3);
    }

    #[test]
    fn test_lod_for_distance_zero_thresholds() {
        let thresholds = [0, 0, 0];
        assert_eq!(lod_for_distance(0, &thresholds), LodLevel::Level0);
        assert_eq!(lod_for_distance(1, &thresholds), LodLevel::Level3);
    }

    #[test]
    fn test_step_powers_of_two() {
        for lod in LodLevel::ALL {
            assert_eq!(lod.step(), 2u32.pow(lod.index()));
        }
        assert_eq!(LodLevel::Level6.step(), 64);
    }

    #[test]
    fn test_from_index_round_trip() {
        for lod in LodLevel::ALL {
            assert_eq!(LodLevel::from_index(lod.index() as i32), lod);
        }
    }

    #[test]
    fn test_finer_saturates() {
        assert_eq!(LodLevel::Level3.finer(), LodLevel::Level2);
        assert_eq!(LodLevel::Level0.finer(), LodLevel::Level0);
    }

    #[test]
    fn test_clamp_to_chunk() {
        for chunk_size in 1..=200u16 {
            for lod in LodLevel::ALL {
                let clamped = lod.clamp_to_chunk(chunk_size);
                assert!(clamped.step() <= chunk_size as u32);
                assert!(clamped <= lod);
                // Only clamp as far as needed
                if clamped < lod {
                    let next = LodLevel::ALL[clamped.index() as usize + 1];
                    assert!(next.step() > chunk_size as u32);
                }
            }
        }
        assert_eq!(LodLevel::Level4.clamp_to_chunk(0), LodLevel::Level0);
    }

    #[test]
    fn test_ordering() {
        assert!(LodLevel::Level0 < LodLevel::Level1);
        assert!(LodLevel::Level6 > LodLevel::Level3);
        assert_eq!(COARSEST_STREAMED_LOD, LodLevel::Level3);
    }
}
