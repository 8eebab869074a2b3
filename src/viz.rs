// -----------------------------------------------------------------------------
// Frame capture and GIF output for the driver.
// -----------------------------------------------------------------------------
// Colourers only read a finished world. `record` is the one place that steps
// a simulation, to decide which ticks become frames.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;

use image::codecs::gif::{GifEncoder, Repeat};
use image::error::{ParameterError, ParameterErrorKind};
use image::{Delay, Frame, ImageError, ImageResult, Rgba, RgbaImage};
use log::{debug, info};
use rayon::prelude::*;
use thiserror::Error;

use crate::constants::*;
use crate::husl::husl_to_rgb;
use crate::simulation::Simulation;
use crate::world::{Cell, WaterShed, World};

/// What a frame shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Grayscale terrain, one still frame.
    Topo,
    /// Terrain where dry, water surface where wet.
    Hydro,
    /// Grayscale surface heat.
    Thermo,
    /// Flow direction per cell.
    WaterShed,
    /// Flow direction as hue, flow speed as lightness.
    WaterSpeed,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown render mode {0:?}, expected one of topo, hydro, thermo, watershed, waterspeed")]
pub struct UnknownMode(pub String);

impl FromStr for RenderMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topo" => Ok(RenderMode::Topo),
            "hydro" => Ok(RenderMode::Hydro),
            "thermo" => Ok(RenderMode::Thermo),
            "watershed" => Ok(RenderMode::WaterShed),
            "waterspeed" => Ok(RenderMode::WaterSpeed),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderMode::Topo => "topo",
            RenderMode::Hydro => "hydro",
            RenderMode::Thermo => "thermo",
            RenderMode::WaterShed => "watershed",
            RenderMode::WaterSpeed => "waterspeed",
        };
        f.write_str(name)
    }
}

/// How many ticks to run and which of them to capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunPlan {
    /// Ticks run before any frame is captured.
    pub overture: u64,
    /// Capture every `speed`-th tick.
    pub speed: u64,
    /// Length of the show, in sweeps of the sun around the world.
    pub duration: u64,
}

impl RunPlan {
    /// Per-mode defaults. Topo never ticks.
    pub fn for_mode(mode: RenderMode) -> Self {
        let (overture, speed, duration) = match mode {
            RenderMode::Topo => (0, 1, 0),
            RenderMode::Hydro => (20_000, 5, 1),
            RenderMode::Thermo => (0, 1, 1),
            RenderMode::WaterShed => (0, 100, 4),
            RenderMode::WaterSpeed => (0, 50, 4),
        };
        Self {
            overture,
            speed,
            duration,
        }
    }

    /// Index one past the last tick of the show, for a world `width` wide.
    pub fn end(&self, width: usize) -> u64 {
        self.overture + width as u64 * self.speed * self.duration
    }

    /// Whether tick `t` of the show is captured.
    pub fn captures(&self, t: u64) -> bool {
        t >= self.overture && t % self.speed.max(1) == 0
    }
}

/// Default output file for a mode, e.g. `hydro.gif`.
pub fn default_output(mode: RenderMode) -> String {
    format!("{mode}.gif")
}

// ---------------------------------------------------------------------------
// Colour helpers
// ---------------------------------------------------------------------------

pub fn gray(b: u8) -> Rgba<u8> {
    Rgba([b, b, b, 0xff])
}

/// HSLuv colour. `hue` in degrees, `saturation` and `lightness` in [0, 100].
pub fn husl(hue: f64, saturation: f64, lightness: f64) -> Rgba<u8> {
    let [r, g, b] = husl_to_rgb(hue, saturation, lightness);
    Rgba([(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, 0xff])
}

/// Position of `v` within `[lo, hi]` as a fraction. A degenerate range maps to 0.
pub fn ratio(v: i64, lo: i64, hi: i64) -> f64 {
    if hi <= lo {
        return 0.0;
    }
    ((v - lo) as f64 / (hi - lo) as f64).clamp(0.0, 1.0)
}

fn shed_hue(shed: WaterShed) -> f64 {
    (shed as u8 as f64 - 1.0) * 90.0
}

/// Colour for one cell under `mode`, scaled by the world's extrema.
pub fn colour(mode: RenderMode, world: &World, c: &Cell) -> Rgba<u8> {
    let e = &world.extrema;
    match mode {
        RenderMode::Topo => {
            let t = ratio(c.surface_elevation, e.lowest_surface_elevation, e.highest_surface_elevation);
            gray((t * 255.0) as u8)
        }
        RenderMode::Hydro => {
            let topographic = ratio(c.surface_elevation, e.lowest_surface_elevation, e.highest_surface_elevation);
            let hydraulic = ratio(c.water_elevation, e.lowest_water_elevation, e.highest_water_elevation);
            // Shallow water is drawn as terrain, deep water as its surface.
            let (saturation, lightness) = if c.water < 10 {
                (0.0, topographic)
            } else if c.water < 20 {
                (0.5, (topographic + hydraulic) / 2.0)
            } else {
                (1.0, hydraulic)
            };
            husl(240.0, 10.0 + saturation * 80.0, 10.0 + lightness * 80.0)
        }
        RenderMode::Thermo => {
            let t = ratio(c.surface_heat, 0, e.hottest_surface);
            gray((t * 255.0) as u8)
        }
        RenderMode::WaterShed => match c.water_shed {
            WaterShed::None => gray(0xff),
            shed => husl(shed_hue(shed), 100.0, 50.0),
        },
        RenderMode::WaterSpeed => match c.water_shed {
            WaterShed::None => gray(0),
            shed => husl(shed_hue(shed), 50.0, ratio(c.water_speed, 0, e.most_rapid_water) * 100.0),
        },
    }
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

/// Render `world` as a frame 5/4 the size of the grid, wrapping so the seam
/// shows. Rows are coloured in parallel.
pub fn capture<F>(world: &World, colour: F) -> RgbaImage
where
    F: Fn(&Cell) -> Rgba<u8> + Sync,
{
    let width = world.width() * CAPTURE_NUMERATOR / CAPTURE_DENOMINATOR;
    let height = world.height() * CAPTURE_NUMERATOR / CAPTURE_DENOMINATOR;

    let mut img = RgbaImage::new(width as u32, height as u32);
    img.par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                px.copy_from_slice(&colour(world.cell(x, y)).0);
            }
        });
    img
}

/// Capture a frame in one of the standard modes.
pub fn capture_mode(world: &World, mode: RenderMode) -> RgbaImage {
    capture(world, |c| colour(mode, world, c))
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

fn report(sim: &Simulation) {
    let e = &sim.current().extrema;
    info!(
        "tick {}: water elevation {}..{}  wettest {}  most rapid {}  hottest {}  equator heat {}..{}  latitude heat {}..{}",
        sim.tick_count(),
        e.lowest_water_elevation,
        e.highest_water_elevation,
        e.wettest,
        e.most_rapid_water,
        e.hottest_surface,
        e.equatorial_min_heat,
        e.equatorial_max_heat,
        e.latitudinal_min_heat,
        e.latitudinal_max_heat,
    );
}

/// Run `sim` through `plan`, capturing the frames the plan asks for.
///
/// Topo captures the current world once and never ticks. A plan whose
/// overture reaches its end captures nothing.
pub fn record(sim: &mut Simulation, plan: &RunPlan, mode: RenderMode) -> Vec<RgbaImage> {
    if mode == RenderMode::Topo {
        return vec![capture_mode(sim.current(), mode)];
    }
    let end = plan.end(sim.current().width());
    let mut frames = Vec::new();

    // A) overture, nothing captured
    while sim.tick_count() < plan.overture {
        sim.step();
        if sim.tick_count() % 1000 == 0 {
            report(sim);
        }
    }

    // B) the show
    while sim.tick_count() < end {
        let t = sim.tick_count();
        let tick_report = sim.step();
        debug!(
            "tick {t}: moved {} damped {}",
            tick_report.water_moved, tick_report.damped_cells
        );
        if plan.captures(t) {
            frames.push(capture_mode(sim.current(), mode));
            report(sim);
        }
    }
    frames
}

/// Write frames as a looping GIF. An empty frame list is an error and leaves
/// no file behind.
pub fn write_gif<P: AsRef<Path>>(path: P, frames: Vec<RgbaImage>) -> ImageResult<()> {
    if frames.is_empty() {
        return Err(ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::Generic("no frames to encode".to_string()),
        )));
    }
    let file = File::create(path)?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite)?;
    let delay = Delay::from_numer_denom_ms(FRAME_DELAY_CENTISECONDS * 10, 1);
    encoder.encode_frames(
        frames
            .into_iter()
            .map(|img| Frame::from_parts(img, 0, 0, delay)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_round_trip() {
        for mode in [
            RenderMode::Topo,
            RenderMode::Hydro,
            RenderMode::Thermo,
            RenderMode::WaterShed,
            RenderMode::WaterSpeed,
        ] {
            assert_eq!(mode.to_string().parse::<RenderMode>(), Ok(mode));
        }
        assert_eq!(
            "life".parse::<RenderMode>(),
            Err(UnknownMode("life".to_string()))
        );
    }

    #[test]
    fn test_run_plan_defaults() {
        let hydro = RunPlan::for_mode(RenderMode::Hydro);
        assert_eq!(hydro.end(128), 20_000 + 128 * 5);
        assert!(!hydro.captures(19_995));
        assert!(hydro.captures(20_000));
        assert!(!hydro.captures(20_001));

        let thermo = RunPlan::for_mode(RenderMode::Thermo);
        assert_eq!(thermo.end(128), 128);
        assert!((0..128).all(|t| thermo.captures(t)));

        assert_eq!(RunPlan::for_mode(RenderMode::Topo).end(128), 0);
    }

    #[test]
    fn test_husl_endpoints() {
        assert_eq!(husl(77.0, 50.0, 100.0), gray(255));
        assert_eq!(husl(77.0, 50.0, 0.0), gray(0));
        // Zero saturation is gray whatever the hue.
        let Rgba([r, g, b, _]) = husl(240.0, 0.0, 50.0);
        assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1);
        // Full-saturation hue 240 is a blue.
        let Rgba([r, g, b, _]) = husl(240.0, 100.0, 50.0);
        assert!(b > r && b > g);
    }

    #[test]
    fn test_hydro_lightness_follows_water_surface() {
        let mut w = World::new(2, 1);
        w.set_terrain(30, |x, _| x as i64 * 10);
        w.extrema.lowest_water_elevation = 30;
        w.extrema.highest_water_elevation = 40;
        let low = colour(RenderMode::Hydro, &w, w.cell(0, 0));
        let high = colour(RenderMode::Hydro, &w, w.cell(1, 0));
        assert_eq!(low, husl(240.0, 90.0, 10.0));
        assert_eq!(high, husl(240.0, 90.0, 90.0));
    }

    #[test]
    fn test_ratio_handles_flat_range() {
        assert_eq!(ratio(5, 5, 5), 0.0);
        assert_eq!(ratio(5, 0, 10), 0.5);
        assert_eq!(ratio(20, 0, 10), 1.0);
    }

    #[test]
    fn test_capture_tiles_the_wrap() {
        let mut w = World::new(8, 4);
        w.set_terrain(0, |x, y| (x * 10 + y) as i64);
        let img = capture(&w, |c| gray(c.surface_elevation as u8));

        assert_eq!(img.dimensions(), (10, 5));
        assert_eq!(img.get_pixel(0, 0), &gray(0));
        assert_eq!(img.get_pixel(3, 2), &gray(32));
        // Past the right and bottom edges the grid repeats.
        assert_eq!(img.get_pixel(9, 0), img.get_pixel(1, 0));
        assert_eq!(img.get_pixel(2, 4), img.get_pixel(2, 0));
    }

    #[test]
    fn test_watershed_colours() {
        let w = World::new(2, 2);
        let mut c = Cell::default();
        assert_eq!(colour(RenderMode::WaterShed, &w, &c), gray(0xff));
        assert_eq!(colour(RenderMode::WaterSpeed, &w, &c), gray(0));
        c.water_shed = WaterShed::North;
        assert_eq!(colour(RenderMode::WaterShed, &w, &c), husl(0.0, 100.0, 50.0));
        c.water_shed = WaterShed::East;
        assert_eq!(colour(RenderMode::WaterShed, &w, &c), husl(270.0, 100.0, 50.0));
    }

    #[test]
    fn test_write_gif_creates_file() {
        let mut w = World::new(8, 8);
        w.set_terrain(0, |x, _| x as i64);
        let frames = vec![capture_mode(&w, RenderMode::Topo), capture_mode(&w, RenderMode::Thermo)];

        let path = std::env::temp_dir().join(format!("bottle-world-viz-{}.gif", std::process::id()));
        write_gif(&path, frames).unwrap();
        let len = std::fs::metadata(&path).unwrap().len();
        std::fs::remove_file(&path).unwrap();
        assert!(len > 0);
    }

    #[test]
    fn test_write_gif_refuses_no_frames() {
        let path = std::env::temp_dir().join(format!("bottle-world-empty-{}.gif", std::process::id()));
        assert!(write_gif(&path, Vec::new()).is_err());
        assert!(!path.exists());
    }

    fn small_world(width: usize, height: usize) -> World {
        let mut w = World::new(width, height);
        w.set_terrain(100, |x, y| ((x * 7 + y * 3) % 11) as i64 * 40);
        w
    }

    #[test]
    fn test_record_hydro_defaults_give_one_frame_per_column() {
        let mut sim = Simulation::new(small_world(16, 16));
        let plan = RunPlan::for_mode(RenderMode::Hydro);
        let frames = record(&mut sim, &plan, RenderMode::Hydro);
        assert_eq!(frames.len(), 16 * plan.duration as usize);
        assert_eq!(sim.tick_count(), plan.end(16));
        assert!(frames.iter().all(|f| f.dimensions() == (20, 20)));
    }

    #[test]
    fn test_record_every_tick_and_still() {
        let mut sim = Simulation::new(small_world(8, 8));
        let frames = record(&mut sim, &RunPlan::for_mode(RenderMode::Thermo), RenderMode::Thermo);
        assert_eq!(frames.len(), 8);
        assert_eq!(sim.tick_count(), 8);

        let mut sim = Simulation::new(small_world(8, 8));
        let frames = record(&mut sim, &RunPlan::for_mode(RenderMode::Topo), RenderMode::Topo);
        assert_eq!(frames.len(), 1);
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn test_record_empty_when_overture_covers_the_show() {
        let mut sim = Simulation::new(small_world(8, 8));
        let plan = RunPlan {
            overture: 50,
            speed: 5,
            duration: 0,
        };
        assert!(record(&mut sim, &plan, RenderMode::WaterShed).is_empty());
        assert_eq!(sim.tick_count(), 50);
    }
}
