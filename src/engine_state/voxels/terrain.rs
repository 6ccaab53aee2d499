//! # Terrain Generation
//!
//! Layered OpenSimplex noise that drives the height map and cave carving.
//!
//! ## Key Components
//!
//! * `TerrainGenerator` - Noise sources for one world seed, built once per chunk
//! * `biome_noise` / `fractal_noise` / `cave_noise` - Pure samplers for a seed
//! * `height_from_noise` - Maps a fractal sample into a column height
//!
//! ## Seeding
//!
//! The secondary seeds are drawn from a PRNG seeded with the world seed, so every
//! sampler is a pure function of `(coordinates, seed)`. The biome layer and the
//! second fractal octave are seeded from the same first draw.
//!
//! ## Performance Considerations
//!
//! Building an `OpenSimplex` permutation table is far more expensive than sampling
//! it. Generating a chunk goes through one `TerrainGenerator`; the free functions
//! build a fresh generator per call and are meant for one-off queries.

use noise::{NoiseFn, OpenSimplex};

use super::chunk::MAX_HEIGHT;

/// Cave noise at or below this value carves the voxel out.
pub const CAVE_NOISE_THRESHOLD: f64 = -0.4;

/// Surface blocks below `WATER_LEVEL + 2` become sand instead of grass.
pub const WATER_LEVEL: i32 = 32;

/// Horizontal scale of the biome layer.
const BIOME_SCALE: f64 = 1000.0;
/// Horizontal scale of the fractal layers and of cave noise in all three axes.
const DETAIL_SCALE: f64 = 10.0;
/// Upper bound (inclusive) of derived seeds.
const MAX_DERIVED_SEED: u32 = 1_000_000;

/// Biome bands as `(lower bound, upper bound, height multiplier)`.
///
/// Plains, hills, mountains and super-mountains, in that order.
const BIOME_BANDS: [(f64, f64, f64); 4] = [
    (0.0, 0.5, 2.0),
    (0.5, 0.75, 4.0),
    (0.75, 0.8, 8.0),
    (0.8, 1.0, 16.0),
];

/// The noise sources for one world seed.
pub struct TerrainGenerator {
    seed: u32,
    base: OpenSimplex,
    octaves: [OpenSimplex; 3],
}

impl TerrainGenerator {
    /// Creates the generator for `seed`.
    pub fn new(seed: u32) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed as u64);
        let octaves = [(); 3].map(|_| OpenSimplex::new(rng.u32(0..=MAX_DERIVED_SEED)));

        Self {
            seed,
            base: OpenSimplex::new(seed),
            octaves,
        }
    }

    /// The world seed this generator was built from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Biome value in `[0, 1]`; selects the height band of a column.
    pub fn biome(&self, x: f64, z: f64) -> f64 {
        let n = self.octaves[0].get([x / BIOME_SCALE, z / BIOME_SCALE]);
        ((n + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    /// Four octaves summed with weights 1, 1/2, 1/4 and 1/8.
    pub fn fractal(&self, x: f64, z: f64) -> f64 {
        let point = [x / DETAIL_SCALE, z / DETAIL_SCALE];
        let mut value = self.base.get(point);
        let mut weight = 1.0;
        for octave in &self.octaves {
            weight /= 2.0;
            value += octave.get(point) * weight;
        }
        value
    }

    /// 3D noise deciding whether a voxel is carved out.
    pub fn cave(&self, x: f64, y: f64, z: f64) -> f64 {
        self.base
            .get([x / DETAIL_SCALE, y / DETAIL_SCALE, z / DETAIL_SCALE])
    }

    /// Surface height of the column at `(x, z)`.
    pub fn height(&self, x: f64, z: f64) -> i32 {
        height_from_noise(self.fractal(x, z), self.biome(x, z))
    }

    /// Whether the voxel at `(x, y, z)` survives cave carving.
    pub fn is_solid(&self, x: f64, y: f64, z: f64) -> bool {
        self.cave(x, y, z) > CAVE_NOISE_THRESHOLD
    }
}

/// Biome noise at `(x, z)` for `seed`, in `[0, 1]`.
pub fn biome_noise(x: f64, z: f64, seed: u32) -> f64 {
    TerrainGenerator::new(seed).biome(x, z)
}

/// Four-octave fractal noise at `(x, z)` for `seed`.
pub fn fractal_noise(x: f64, z: f64, seed: u32) -> f64 {
    TerrainGenerator::new(seed).fractal(x, z)
}

/// Cave noise at `(x, y, z)` for `seed`.
pub fn cave_noise(x: f64, y: f64, z: f64, seed: u32) -> f64 {
    TerrainGenerator::new(seed).cave(x, y, z)
}

/// Turns a fractal sample into a column height, with the amplitude picked by the
/// biome band that `biome` falls in.
pub fn height_from_noise(fractal: f64, biome: f64) -> i32 {
    let (low, high, multiplier) = BIOME_BANDS
        .iter()
        .copied()
        .find(|&(low, high, _)| biome >= low && biome < high)
        .unwrap_or(BIOME_BANDS[BIOME_BANDS.len() - 1]);

    let amplitude = multiplier / 2.0 + multiplier * (high - low);
    (fractal * amplitude + MAX_HEIGHT as f64).round().abs() as i32
}
