// -----------------------------------------------------------------------------
// One simulation step: water routing, then heat diffusion and sunlight.
// -----------------------------------------------------------------------------
// A tick reads only `prev` and writes only `next`. The caller owns both
// buffers and swaps their roles afterwards.

use crate::constants::*;
use crate::world::{Cell, WaterShed, World};

// Catch negative water as soon as it appears and crash with context.
macro_rules! ensure_non_negative {
    ($val:expr, $label:expr, $x:expr, $y:expr, $t:expr) => {
        if $val < 0 {
            panic!(
                "Detected negative {} at cell ({}, {}) on tick {}: {}",
                $label, $x, $y, $t, $val
            );
        }
    };
}

/// Bookkeeping from one tick, beyond what lands in the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Cells whose outflow was damped by the floor division.
    pub damped_cells: usize,
    /// Total water moved between cells.
    pub water_moved: i64,
}

#[inline(always)]
fn level(c: &Cell) -> i64 {
    c.surface_elevation + c.water
}

/// Column and row directly under the sun on tick `t`.
///
/// The sun sweeps westward one column per tick, starting at column 0.
pub fn sub_solar_point(width: usize, height: usize, t: u64) -> (usize, usize) {
    let column = width - (t % width as u64) as usize;
    (column % width, height / 2)
}

/// Light reaching a cell `distance` steps from the sub-solar point.
#[inline]
pub fn sunlight(width: usize, distance: usize) -> i64 {
    let horizon = (width * HORIZON_NUMERATOR / HORIZON_DENOMINATOR) as i64;
    (horizon - distance as i64).max(0)
}

/// Advance `prev` by one step into `next`.
///
/// Both worlds must have the same dimensions. Every per-tick field of `next`
/// is overwritten, so its previous contents do not matter.
pub fn tick(next: &mut World, prev: &World, t: u64) -> TickReport {
    assert_eq!(
        (next.width(), next.height()),
        (prev.width(), prev.height()),
        "tick buffers differ in size"
    );

    refresh_elevation(next, prev);
    let report = route_water(next, prev, t);
    survey_bathymetry(next, t);
    radiate(next, prev, t);
    report
}

// A) Terrain and water carry over unchanged; routing adjusts water next.
fn refresh_elevation(next: &mut World, prev: &World) {
    for (nc, pc) in next.cells_mut().iter_mut().zip(prev.cells()) {
        nc.surface_elevation = pc.surface_elevation;
        nc.water = pc.water;
    }
    next.extrema.highest_surface_elevation = prev.extrema.highest_surface_elevation;
    next.extrema.lowest_surface_elevation = prev.extrema.lowest_surface_elevation;
}

// B) Each cell sends water toward its lowest neighbour. Several cells may
// feed the same target, so inflows accumulate.
fn route_water(next: &mut World, prev: &World, t: u64) -> TickReport {
    let mut report = TickReport::default();
    let mut most_rapid = 0;
    let src = prev.cells();

    for x in 0..prev.width() {
        for y in 0..prev.height() {
            let here = prev.idx(x, y);
            let pc = &src[here];

            // Strictly lower only, so ties keep the earlier direction.
            let mut target = here;
            let mut shed = WaterShed::None;
            for dir in WaterShed::NEIGHBOURS {
                let n = prev.neighbour_idx(x, y, dir);
                if level(&src[n]) < level(&src[target]) {
                    target = n;
                    shed = dir;
                }
            }

            let own = level(pc);
            let equilibrium = (own + level(&src[target])) / 2;
            let mut delta = (own - equilibrium).min(pc.water);
            // dampen water flow
            if delta > DAMPING_THRESHOLD {
                delta /= DAMPING_DIVISOR;
                report.damped_cells += 1;
            }
            ensure_non_negative!(delta, "outflow", x, y, t);

            let dst = next.cells_mut();
            dst[target].water += delta;
            dst[here].water -= delta;
            dst[here].water_shed = shed;
            dst[here].water_speed = delta;

            most_rapid = most_rapid.max(delta);
            report.water_moved += delta;
        }
    }

    next.extrema.most_rapid_water = most_rapid;
    report
}

// C) Recompute water elevation and fold the bathymetric extrema.
fn survey_bathymetry(next: &mut World, t: u64) {
    let height = next.height();
    let mut wettest = 0;
    let mut highest = 0;
    let mut lowest = LOWEST_WATER_ELEVATION_SEED;

    for (i, c) in next.cells_mut().iter_mut().enumerate() {
        ensure_non_negative!(c.water, "water", i / height, i % height, t);
        c.water_elevation = level(c);
        highest = highest.max(c.water_elevation);
        lowest = lowest.min(c.water_elevation);
        wettest = wettest.max(c.water);
    }

    let e = &mut next.extrema;
    e.wettest = wettest;
    e.highest_water_elevation = highest;
    e.lowest_water_elevation = lowest;
}

// D) Diffuse last tick's heat, add sunlight, radiate a fixed fraction away.
fn radiate(next: &mut World, prev: &World, t: u64) {
    let (width, height) = (prev.width(), prev.height());
    let (sx, sy) = sub_solar_point(width, height, t);
    let src = prev.cells();
    let mut hottest = 0;
    let mut brightest = 0;

    for x in 0..width {
        for y in 0..height {
            let mut sum = src[prev.idx(x, y)].surface_heat;
            for dir in WaterShed::NEIGHBOURS {
                sum += src[prev.neighbour_idx(x, y, dir)].surface_heat;
            }
            let heat = sum / DIFFUSION_STENCIL;

            let light = sunlight(width, prev.manhattan(sx, sy, x, y));
            let i = next.idx(x, y);
            let nc = &mut next.cells_mut()[i];
            nc.sun_light = light;
            nc.surface_heat = (heat + light) * RADIATIVE_RETAIN / RADIATIVE_TOTAL;

            brightest = brightest.max(light);
            hottest = hottest.max(nc.surface_heat);
        }
    }

    next.extrema.hottest_surface = hottest;
    next.extrema.brightest_surface = brightest;

    let (eq_min, eq_max) = row_heat_range(next, height / 2, hottest);
    let (lat_min, lat_max) = row_heat_range(next, height / 4, hottest);
    let e = &mut next.extrema;
    e.equatorial_min_heat = eq_min;
    e.equatorial_max_heat = eq_max;
    e.latitudinal_min_heat = lat_min;
    e.latitudinal_max_heat = lat_max;
}

/// Min and max surface heat along row `y`. The minimum starts from `hottest`.
fn row_heat_range(world: &World, y: usize, hottest: i64) -> (i64, i64) {
    (0..world.width())
        .map(|x| world.cell(x, y).surface_heat)
        .fold((hottest, 0), |(lo, hi), h| (lo.min(h), hi.max(h)))
}
