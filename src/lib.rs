//! Terrain, surface water and sunlight on a toroidal grid.
//!
//! Terrain is synthesized once from tileable noise octaves; after that the
//! world is advanced tick by tick, routing water toward lower neighbours and
//! diffusing heat from a sun that sweeps along the x-axis.
//!
//! ```
//! use bottle_world::{Simulation, TerrainConfig, World};
//!
//! let config = TerrainConfig { width: 32, height: 32, total_water: 32 * 32 * 100, ..Default::default() };
//! let mut sim = Simulation::new(World::synthesize(&config).unwrap());
//! sim.run(10);
//! assert_eq!(sim.current().total_water(), 32 * 32 * 100);
//! ```

pub mod constants;
pub mod husl;
pub mod simulation;
pub mod terrain;
pub mod tesselation;
pub mod tick;
pub mod viz;
pub mod world;

pub use simulation::Simulation;
pub use terrain::{synthesize_into, ConfigError, OctaveSpec, TerrainConfig};
pub use tesselation::{scale, Scale, Tesselation};
pub use tick::{sub_solar_point, sunlight, tick, TickReport};
pub use world::{Cell, Extrema, WaterShed, World};
