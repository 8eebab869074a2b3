//! Multi-octave tileable terrain synthesis.

use log::info;
use noise::{NoiseFn, OpenSimplex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::constants::*;
use crate::tesselation::{scale, Scale, Tesselation};
use crate::world::{Cell, Extrema, World};

/// One noise layer of the terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctaveSpec {
    pub seed: u32,
    /// Multiplier applied to the octave's [-1, 1] output.
    pub amplitude: f64,
    /// Spatial frequency fed to the scale adapter. Lower = broader features.
    pub frequency: f64,
}

impl OctaveSpec {
    pub const fn new(seed: u32, amplitude: f64, frequency: f64) -> Self {
        Self {
            seed,
            amplitude,
            frequency,
        }
    }
}

// (seed, amplitude in tenths, frequency), broadest first.
const DEFAULT_OCTAVES: [(u32, f64, f64); 7] = [
    (2, 125.0, 1.0 / 80.0),
    (3, 100.0, 1.0 / 40.0),
    (5, 75.0, 1.0 / 30.0),
    (4, 50.0, 1.0 / 10.0),
    (4, 20.0, 1.0 / 6.0),
    (5, 10.0, 1.0 / 4.0),
    (5, 5.0, 1.0 / 2.0),
];

/// Configuration for terrain generation
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainConfig {
    pub width: usize,
    pub height: usize,
    /// Water spread evenly over the grid at synthesis.
    pub total_water: i64,
    pub octaves: Vec<OctaveSpec>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            total_water: DEFAULT_TOTAL_WATER,
            octaves: DEFAULT_OCTAVES
                .iter()
                .map(|&(seed, amplitude, frequency)| {
                    OctaveSpec::new(seed, amplitude * AMPLITUDE_FACTOR, frequency)
                })
                .collect(),
        }
    }
}

impl TerrainConfig {
    /// Same amplitude/frequency table with octave seeds drawn from `seed`.
    pub fn reseeded(mut self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        for octave in &mut self.octaves {
            octave.seed = rng.gen();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.octaves.is_empty() {
            return Err(ConfigError::NoOctaves);
        }
        if self.total_water < 0 {
            return Err(ConfigError::NegativeWater(self.total_water));
        }
        for (index, o) in self.octaves.iter().enumerate() {
            if !o.amplitude.is_finite() || !o.frequency.is_finite() {
                return Err(ConfigError::NonFiniteOctave { index });
            }
        }
        Ok(())
    }

    /// Water given to each cell at synthesis.
    pub fn water_per_cell(&self) -> i64 {
        self.total_water / self.width as i64 / self.height as i64
    }
}

/// Errors raised when validating a terrain configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("terrain needs at least one octave")]
    NoOctaves,
    #[error("total water {0} must not be negative")]
    NegativeWater(i64),
    #[error("octave {index} has a non-finite amplitude or frequency")]
    NonFiniteOctave { index: usize },
}

type Octave = (f64, Tesselation<Scale<OpenSimplex>>);

fn build_octaves(config: &TerrainConfig) -> Vec<Octave> {
    let (w, h) = (config.width as f64, config.height as f64);
    config
        .octaves
        .iter()
        .map(|o| {
            let source = Tesselation::new(scale(OpenSimplex::new(o.seed), o.frequency), w, h);
            (o.amplitude, source)
        })
        .collect()
}

/// Sum of all octaves at one grid point, before truncation.
fn elevation_at(octaves: &[Octave], x: usize, y: usize) -> f64 {
    octaves
        .iter()
        .map(|(amplitude, source)| amplitude * source.get([x as f64, y as f64]))
        .sum()
}

/// Fill `world` with synthesized terrain and uniform water.
///
/// `world` must already have the configured dimensions.
pub fn synthesize_into(world: &mut World, config: &TerrainConfig) {
    assert_eq!(
        (world.width(), world.height()),
        (config.width, config.height),
        "world dimensions do not match terrain config"
    );

    let octaves = build_octaves(config);
    world.cells_mut().fill(Cell::default());
    world.extrema = Extrema::default();
    // Truncate toward zero, as a float-to-int cast does.
    world.set_terrain(config.water_per_cell(), |x, y| {
        elevation_at(&octaves, x, y) as i64
    });

    info!(
        "synthesized {}x{} terrain from {} octaves: elevation {}..{}, {} water per cell",
        config.width,
        config.height,
        config.octaves.len(),
        world.extrema.lowest_surface_elevation,
        world.extrema.highest_surface_elevation,
        config.water_per_cell(),
    );
}

impl World {
    /// Build a fresh world from `config`.
    pub fn synthesize(config: &TerrainConfig) -> Result<World, ConfigError> {
        config.validate()?;
        let mut world = World::new(config.width, config.height);
        synthesize_into(&mut world, config);
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> TerrainConfig {
        TerrainConfig {
            width: 32,
            height: 24,
            total_water: 32 * 24 * 100,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_matches_reference_table() {
        let config = TerrainConfig::default();
        assert_eq!(config.width, 128);
        assert_eq!(config.height, 128);
        assert_eq!(config.water_per_cell(), 100);
        assert_eq!(config.octaves.len(), 7);
        assert_eq!(config.octaves[0], OctaveSpec::new(2, 1250.0, 1.0 / 80.0));
        assert_eq!(config.octaves[6], OctaveSpec::new(5, 50.0, 0.5));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let a = World::synthesize(&small_config()).unwrap();
        let b = World::synthesize(&small_config()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_synthesis_records_extrema() {
        let w = World::synthesize(&small_config()).unwrap();
        let max = w.cells().iter().map(|c| c.surface_elevation).max().unwrap();
        let min = w.cells().iter().map(|c| c.surface_elevation).min().unwrap();
        assert_eq!(w.extrema.highest_surface_elevation, max.max(0));
        assert_eq!(w.extrema.lowest_surface_elevation, min.min(0));
        assert!(max > min, "terrain should not be flat");
    }

    #[test]
    fn test_synthesis_spreads_water_evenly() {
        let w = World::synthesize(&small_config()).unwrap();
        assert!(w.cells().iter().all(|c| c.water == 100));
        assert!(w.cells().iter().all(|c| c.surface_heat == 0));
        assert_eq!(w.total_water(), 32 * 24 * 100);
    }

    #[test]
    fn test_different_seeds_give_different_terrain() {
        let a = World::synthesize(&small_config()).unwrap();
        let b = World::synthesize(&small_config().reseeded(99)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_reseeded_is_repeatable() {
        let a = small_config().reseeded(1234);
        let b = small_config().reseeded(1234);
        assert_eq!(a, b);
        // Only the seeds change.
        for (o, d) in a.octaves.iter().zip(small_config().octaves.iter()) {
            assert_eq!(o.amplitude, d.amplitude);
            assert_eq!(o.frequency, d.frequency);
        }
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let mut c = small_config();
        c.width = 0;
        assert_eq!(
            World::synthesize(&c).unwrap_err(),
            ConfigError::EmptyGrid { width: 0, height: 24 }
        );

        let mut c = small_config();
        c.octaves.clear();
        assert_eq!(World::synthesize(&c).unwrap_err(), ConfigError::NoOctaves);

        let mut c = small_config();
        c.total_water = -1;
        assert_eq!(World::synthesize(&c).unwrap_err(), ConfigError::NegativeWater(-1));

        let mut c = small_config();
        c.octaves[2].frequency = f64::NAN;
        assert_eq!(
            World::synthesize(&c).unwrap_err(),
            ConfigError::NonFiniteOctave { index: 2 }
        );
    }

    #[test]
    fn test_terrain_is_continuous_across_wrap() {
        // Neighbouring cells across the seam differ no more than typical
        // interior neighbours do.
        let config = TerrainConfig::default();
        let w = World::synthesize(&config).unwrap();
        let (width, height) = (w.width(), w.height());

        let mut interior_max = 0;
        for x in 0..width - 1 {
            for y in 0..height {
                let d = (w.cell(x, y).surface_elevation - w.cell(x + 1, y).surface_elevation).abs();
                interior_max = interior_max.max(d);
            }
        }
        for y in 0..height {
            let d = (w.cell(width - 1, y).surface_elevation - w.cell(0, y).surface_elevation).abs();
            assert!(d <= 2 * interior_max, "seam jump {d} against interior max {interior_max}");
        }
    }
}
