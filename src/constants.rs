// Default world dimensions, in cells.
pub const DEFAULT_WIDTH: usize = 128;
pub const DEFAULT_HEIGHT: usize = 128;

// Enough water for a column of 100 over every cell.
pub const WATER_PER_CELL: i64 = 100;
pub const DEFAULT_TOTAL_WATER: i64 = (DEFAULT_WIDTH * DEFAULT_HEIGHT) as i64 * WATER_PER_CELL;

// Octave amplitudes in the default terrain table are quoted in tenths.
pub const AMPLITUDE_FACTOR: f64 = 10.0;

// --- Water routing ---
// Flows larger than this are damped by DAMPING_DIVISOR. The floor division
// under-transfers a little water every time it applies.
pub const DAMPING_THRESHOLD: i64 = 3;
pub const DAMPING_DIVISOR: i64 = 3;

// Seed for the lowest-water-elevation fold. Anything above the tallest
// possible water column works.
pub const LOWEST_WATER_ELEVATION_SEED: i64 = 1_000_000_000;

// --- Heat ---
// Five-point stencil: the cell and its four neighbours.
pub const DIFFUSION_STENCIL: i64 = 5;
// Roughly 2% of surface heat radiates away each tick.
pub const RADIATIVE_RETAIN: i64 = 100;
pub const RADIATIVE_TOTAL: i64 = 102;
// Sunlight reaches cells within 3/5 of the grid width of the sub-solar point.
pub const HORIZON_NUMERATOR: usize = 3;
pub const HORIZON_DENOMINATOR: usize = 5;

// --- Driver ---
// GIF frame delay in hundredths of a second.
pub const FRAME_DELAY_CENTISECONDS: u32 = 10;
// Frames are a 5/4 tiling of the grid so the wrap is visible.
pub const CAPTURE_NUMERATOR: usize = 5;
pub const CAPTURE_DENOMINATOR: usize = 4;
