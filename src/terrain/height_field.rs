//! Height sampling over the noise field.
//!
//! A [`HeightField`] is a pure function of world (x, z). The mesh builder
//! calls it once per vertex, so implementations must be deterministic and
//! free of side effects.

use noise::{
    Fbm, MultiFractal, NoiseFn, OpenSimplex, Perlin, RidgedMulti, Seedable, SuperSimplex, Value,
    Worley,
};

use super::settings::{DomainWarpType, FractalType, MAX_OCTAVES, NoiseSettings, NoiseType};

/// Scalar height source sampled at world (x, z)
pub trait HeightField {
    /// Height contribution at world (x, z). Noise-backed fields return [0, 1]
    /// for typical settings; callers must not rely on the range.
    fn sample(&self, x: f64, z: f64) -> f64;
}

impl<F> HeightField for F
where
    F: Fn(f64, f64) -> f64,
{
    fn sample(&self, x: f64, z: f64) -> f64 {
        self(x, z)
    }
}

type BoxedNoise = Box<dyn NoiseFn<f64, 2>>;

/// Two decorrelated noise fields displacing the sample point
struct DomainWarp {
    x: BoxedNoise,
    z: BoxedNoise,
    amplitude: f64,
}

/// Fractal noise height field built from [`NoiseSettings`]
pub struct NoiseHeightField {
    source: BoxedNoise,
    warp: Option<DomainWarp>,
    frequency: f64,
}

impl NoiseHeightField {
    /// Build the noise graph for the given settings
    pub fn new(settings: &NoiseSettings) -> Self {
        let seed = settings.seed as u32;

        let source = match settings.noise_type {
            NoiseType::OpenSimplex2 => fractal::<OpenSimplex>(settings, seed),
            NoiseType::Perlin => fractal::<Perlin>(settings, seed),
            NoiseType::Cellular => fractal::<Worley>(settings, seed),
        };

        let warp = settings.domain_warp_enabled.then(|| {
            let (x, z) = match settings.domain_warp_type {
                DomainWarpType::OpenSimplex2 => warp_pair::<OpenSimplex>(seed),
                DomainWarpType::OpenSimplex2Reduced => warp_pair::<SuperSimplex>(seed),
                DomainWarpType::BasicGrid => warp_pair::<Value>(seed),
            };
            DomainWarp {
                x,
                z,
                amplitude: settings.domain_warp_amplitude,
            }
        });

        Self {
            source,
            warp,
            frequency: settings.frequency,
        }
    }

    /// Raw fractal value at world (x, z), roughly in [-1, 1]
    pub fn raw(&self, x: f64, z: f64) -> f64 {
        let (mut x, mut z) = (x, z);

        if let Some(warp) = &self.warp {
            let point = [x * self.frequency, z * self.frequency];
            let dx = warp.x.get(point);
            let dz = warp.z.get(point);
            x += dx * warp.amplitude;
            z += dz * warp.amplitude;
        }

        self.source.get([x * self.frequency, z * self.frequency])
    }
}

impl HeightField for NoiseHeightField {
    fn sample(&self, x: f64, z: f64) -> f64 {
        (self.raw(x, z) + 1.0) * 0.5
    }
}

/// Warp sources for x and z, seeded apart from the height octaves
fn warp_pair<T>(seed: u32) -> (BoxedNoise, BoxedNoise)
where
    T: NoiseFn<f64, 2> + Default + Seedable + 'static,
{
    let x: BoxedNoise = Box::new(T::default().set_seed(seed.wrapping_add(1)));
    let z: BoxedNoise = Box::new(T::default().set_seed(seed.wrapping_add(2)));
    (x, z)
}

/// Combine octaves of `T` according to the fractal type.
///
/// Frequency is applied by the caller, so the fractal itself runs at 1.0.
fn fractal<T>(settings: &NoiseSettings, seed: u32) -> BoxedNoise
where
    T: NoiseFn<f64, 2> + Default + Seedable + 'static,
{
    let octaves = settings.octaves.clamp(1, MAX_OCTAVES) as usize;

    match settings.fractal_type {
        FractalType::Fbm => Box::new(
            Fbm::<T>::new(seed)
                .set_octaves(octaves)
                .set_frequency(1.0)
                .set_lacunarity(settings.lacunarity)
                .set_persistence(settings.gain),
        ),
        FractalType::Ridged => Box::new(
            RidgedMulti::<T>::new(seed)
                .set_octaves(octaves)
                .set_frequency(1.0)
                .set_lacunarity(settings.lacunarity)
                .set_persistence(settings.gain),
        ),
        FractalType::PingPong => Box::new(PingPong::<T>::new(
            seed,
            octaves,
            settings.lacunarity,
            settings.gain,
            settings.weighted_strength,
            settings.ping_pong_strength,
        )),
    }
}

// ---------------------------------------------------------------------------
// Ping-pong fractal
// ---------------------------------------------------------------------------

/// Fractal that folds each octave through a triangle wave, producing terraced
/// ridges. Octave `i` uses seed `seed + i`; the octave count is clamped to
/// `1..=MAX_OCTAVES`.
pub struct PingPong<T> {
    sources: Vec<T>,
    lacunarity: f64,
    gain: f64,
    weighted_strength: f64,
    strength: f64,
    bounding: f64,
}

impl<T> PingPong<T>
where
    T: Default + Seedable,
{
    pub fn new(
        seed: u32,
        octaves: usize,
        lacunarity: f64,
        gain: f64,
        weighted_strength: f64,
        strength: f64,
    ) -> Self {
        let octaves = octaves.clamp(1, MAX_OCTAVES as usize);
        let sources = (0..octaves)
            .map(|i| T::default().set_seed(seed.wrapping_add(i as u32)))
            .collect();

        Self {
            sources,
            lacunarity,
            gain,
            weighted_strength,
            strength,
            bounding: fractal_bounding(octaves, gain),
        }
    }
}

/// Normalizes the summed amplitudes of `octaves` octaves back to 1
fn fractal_bounding(octaves: usize, gain: f64) -> f64 {
    let gain = gain.abs();
    let mut amp = gain;
    let mut total = 1.0;
    for _ in 1..octaves {
        total += amp;
        amp *= gain;
    }
    1.0 / total
}

/// Triangle wave with period 2 mapping t into [0, 1]
fn ping_pong(t: f64) -> f64 {
    let t = t.rem_euclid(2.0);
    if t < 1.0 { t } else { 2.0 - t }
}

impl<T> NoiseFn<f64, 2> for PingPong<T>
where
    T: NoiseFn<f64, 2>,
{
    fn get(&self, point: [f64; 2]) -> f64 {
        let [mut x, mut z] = point;
        let mut sum = 0.0;
        let mut amp = self.bounding;

        for source in &self.sources {
            let value = ping_pong((source.get([x, z]) + 1.0) * self.strength);
            sum += (value - 0.5) * 2.0 * amp;
            amp *= 1.0 + (value - 1.0) * self.weighted_strength;

            x *= self.lacunarity;
            z *= self.lacunarity;
            amp *= self.gain;
        }

        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with(noise_type: NoiseType, fractal_type: FractalType) -> NoiseSettings {
        NoiseSettings {
            noise_type,
            fractal_type,
            ..Default::default()
        }
    }

    #[test]
    fn test_sample_is_deterministic() {
        let field = NoiseHeightField::new(&NoiseSettings::default());
        let positions = [(0.0, 0.0), (12.5, -7.25), (1000.0, 1000.0), (-5000.3, 42.0)];

        for (x, z) in positions {
            let h1 = field.sample(x, z);
            let h2 = field.sample(x, z);
            assert_eq!(h1, h2, "Height should be consistent at ({}, {})", x, z);
        }

        let rebuilt = NoiseHeightField::new(&NoiseSettings::default());
        assert_eq!(field.sample(12.5, -7.25), rebuilt.sample(12.5, -7.25));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseHeightField::new(&NoiseSettings { seed: 1, ..Default::default() });
        let b = NoiseHeightField::new(&NoiseSettings { seed: 2, ..Default::default() });

        let differs = (0..16).any(|i| {
            let x = i as f64 * 13.7 + 0.31;
            a.sample(x, x * 0.5) != b.sample(x, x * 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn test_all_combinations_are_finite() {
        let noise_types = [NoiseType::OpenSimplex2, NoiseType::Perlin, NoiseType::Cellular];
        let fractal_types = [FractalType::Fbm, FractalType::Ridged, FractalType::PingPong];

        for noise_type in noise_types {
            for fractal_type in fractal_types {
                let field = NoiseHeightField::new(&settings_with(noise_type, fractal_type));
                for i in 0..32 {
                    let x = i as f64 * 7.3 - 100.0;
                    let z = i as f64 * -3.1 + 50.0;
                    let h = field.sample(x, z);
                    assert!(
                        h.is_finite(),
                        "{:?}/{:?} produced {} at ({}, {})",
                        noise_type, fractal_type, h, x, z
                    );
                }
            }
        }
    }

    #[test]
    fn test_fbm_roughly_normalized() {
        let field = NoiseHeightField::new(&NoiseSettings::default());
        for i in 0..64 {
            let x = i as f64 * 17.0 + 0.5;
            let h = field.sample(x, -x);
            assert!(h > -0.5 && h < 1.5, "height {} far outside [0, 1]", h);
        }
    }

    #[test]
    fn test_tolerates_extreme_inputs() {
        let field = NoiseHeightField::new(&NoiseSettings::default());
        assert!(field.sample(1.0e9, -1.0e9).is_finite());
        assert!(field.sample(-0.0, 1.0e-300).is_finite());
    }

    #[test]
    fn test_domain_warp_moves_samples() {
        let plain = NoiseHeightField::new(&NoiseSettings::default());
        let warped = NoiseHeightField::new(&NoiseSettings {
            domain_warp_enabled: true,
            domain_warp_amplitude: 50.0,
            ..Default::default()
        });

        let differs = (0..16).any(|i| {
            let x = i as f64 * 11.3 + 0.7;
            plain.sample(x, x) != warped.sample(x, x)
        });
        assert!(differs);
    }

    #[test]
    fn test_warp_types_are_finite() {
        for warp_type in [
            DomainWarpType::OpenSimplex2,
            DomainWarpType::OpenSimplex2Reduced,
            DomainWarpType::BasicGrid,
        ] {
            let field = NoiseHeightField::new(&NoiseSettings {
                domain_warp_enabled: true,
                domain_warp_type: warp_type,
                ..Default::default()
            });
            assert!(field.sample(33.3, -71.9).is_finite());
        }
    }

    #[test]
    fn test_ping_pong_wave() {
        assert_eq!(ping_pong(0.0), 0.0);
        assert_eq!(ping_pong(0.5), 0.5);
        assert_eq!(ping_pong(1.0), 1.0);
        assert_eq!(ping_pong(1.5), 0.5);
        assert_eq!(ping_pong(2.0), 0.0);
        assert_eq!(ping_pong(3.25), 0.75);
    }

    #[test]
    fn test_fractal_bounding() {
        assert_eq!(fractal_bounding(1, 0.5), 1.0);
        assert!((fractal_bounding(3, 0.5) - 1.0 / 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_ping_pong_stays_bounded() {
        let pp = PingPong::<Perlin>::new(9, 4, 2.0, 0.5, 0.0, 2.0);
        for i in 0..64 {
            let v = pp.get([i as f64 * 0.37, i as f64 * -0.11]);
            assert!((-1.0..=1.0).contains(&v), "ping-pong value {} out of range", v);
        }
    }

    #[test]
    fn test_huge_octave_count_is_capped() {
        let pp = PingPong::<Perlin>::new(1, usize::MAX, 2.0, 0.5, 0.0, 2.0);
        assert_eq!(pp.sources.len(), MAX_OCTAVES as usize);

        let field = NoiseHeightField::new(&NoiseSettings {
            octaves: u32::MAX,
            fractal_type: FractalType::PingPong,
            ..Default::default()
        });
        assert!(field.sample(3.0, 4.0).is_finite());
    }

    #[test]
    fn test_weighted_strength_only_affects_ping_pong() {
        let positions = [(3.7, -1.2), (120.5, 44.1), (-80.0, 9.9)];
        for fractal_type in [FractalType::Fbm, FractalType::Ridged] {
            let plain = NoiseHeightField::new(&settings_with(NoiseType::Perlin, fractal_type));
            let weighted = NoiseHeightField::new(&NoiseSettings {
                weighted_strength: 0.8,
                ..settings_with(NoiseType::Perlin, fractal_type)
            });
            for (x, z) in positions {
                assert_eq!(plain.sample(x, z), weighted.sample(x, z));
            }
        }

        let plain = NoiseHeightField::new(&settings_with(NoiseType::Perlin, FractalType::PingPong));
        let weighted = NoiseHeightField::new(&NoiseSettings {
            weighted_strength: 0.8,
            ..settings_with(NoiseType::Perlin, FractalType::PingPong)
        });
        assert!(positions.iter().any(|&(x, z)| plain.sample(x, z) != weighted.sample(x, z)));
    }

    #[test]
    fn test_closure_height_field() {
        let flat = |_x: f64, _z: f64| 0.5;
        assert_eq!(flat.sample(10.0, -3.0), 0.5);

        let slope = |x: f64, _z: f64| x * 0.1;
        assert_eq!(slope.sample(5.0, 0.0), 0.5);
    }
}
