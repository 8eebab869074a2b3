//! Grid state for one buffer of the double-buffered simulation.

/// Direction a cell's water is flowing this tick.
///
/// The discriminants follow the neighbour scan order, which doubles as the
/// tie-break priority: North beats South beats West beats East.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WaterShed {
    #[default]
    None = 0,
    North = 1,
    South = 2,
    West = 3,
    East = 4,
}

impl WaterShed {
    /// Neighbour directions in scan (and tie-break) order.
    pub const NEIGHBOURS: [WaterShed; 4] = [
        WaterShed::North,
        WaterShed::South,
        WaterShed::West,
        WaterShed::East,
    ];

    /// Grid offset `(dx, dy)` for this direction. North is `y - 1`.
    pub fn offset(self) -> (isize, isize) {
        match self {
            WaterShed::None => (0, 0),
            WaterShed::North => (0, -1),
            WaterShed::South => (0, 1),
            WaterShed::West => (-1, 0),
            WaterShed::East => (1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub surface_elevation: i64,
    /// Height of the water column over terrain. Never negative.
    pub water: i64,
    /// `surface_elevation + water`, refreshed every tick.
    pub water_elevation: i64,
    pub surface_heat: i64,
    pub sun_light: i64,
    pub water_shed: WaterShed,
    /// Water moved out of this cell on the last tick.
    pub water_speed: i64,
}

/// Running statistics, rebuilt from the grid every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extrema {
    // Terrain, fixed at synthesis.
    pub highest_surface_elevation: i64,
    pub lowest_surface_elevation: i64,
    // Bathymetry.
    pub highest_water_elevation: i64,
    pub lowest_water_elevation: i64,
    pub wettest: i64,
    pub most_rapid_water: i64,
    // Heat and light.
    pub hottest_surface: i64,
    pub brightest_surface: i64,
    pub equatorial_min_heat: i64,
    pub equatorial_max_heat: i64,
    // Row height/4.
    pub latitudinal_min_heat: i64,
    pub latitudinal_max_heat: i64,
}

/// A toroidal grid of cells. Indices wrap in both axes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct World {
    width: usize,
    height: usize,
    // Column-major: cell (x, y) lives at x * height + y.
    cells: Vec<Cell>,
    /// Per-tick statistics, rebuilt by every tick.
    pub extrema: Extrema,
}

impl World {
    /// An all-zero world. Dimensions are assumed validated by the caller;
    /// `World::synthesize` is the checked entry point.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "world must be at least 1x1");
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
            extrema: Extrema::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    /// Index of the cell at `(x + dx, y + dy)`, wrapped onto the torus.
    #[inline]
    pub fn wrapped_idx(&self, x: usize, y: usize, dx: isize, dy: isize) -> usize {
        let nx = (x as isize + dx).rem_euclid(self.width as isize) as usize;
        let ny = (y as isize + dy).rem_euclid(self.height as isize) as usize;
        self.idx(nx, ny)
    }

    /// Index of the neighbour in `dir`, or of the cell itself for `WaterShed::None`.
    #[inline]
    pub fn neighbour_idx(&self, x: usize, y: usize, dir: WaterShed) -> usize {
        let (dx, dy) = dir.offset();
        self.wrapped_idx(x, y, dx, dy)
    }

    /// Cell at `(x, y)`; coordinates wrap.
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[self.idx(x % self.width, y % self.height)]
    }

    /// Mutable cell at `(x, y)`; coordinates wrap.
    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        let i = self.idx(x % self.width, y % self.height);
        &mut self.cells[i]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Water summed over every cell.
    pub fn total_water(&self) -> i64 {
        self.cells.iter().map(|c| c.water).sum()
    }

    /// Refresh every cell's derived water elevation.
    pub fn refresh_water_elevation(&mut self) {
        for c in &mut self.cells {
            c.water_elevation = c.surface_elevation + c.water;
        }
    }

    /// Toroidal Manhattan distance. Each axis is folded to at most half the
    /// grid dimension before summing.
    pub fn manhattan(&self, x1: usize, y1: usize, x2: usize, y2: usize) -> usize {
        let mut dx = x1.abs_diff(x2);
        if dx > self.width / 2 {
            dx = self.width - dx;
        }
        let mut dy = y1.abs_diff(y2);
        if dy > self.height / 2 {
            dy = self.height - dy;
        }
        dx + dy
    }

    /// Overwrite every cell's terrain and reset water to `water` per cell,
    /// recording the elevation extrema. Used by synthesis and by tests that
    /// need hand-built terrain.
    pub fn set_terrain<F>(&mut self, water: i64, mut elevation: F)
    where
        F: FnMut(usize, usize) -> i64,
    {
        let mut highest = 0;
        let mut lowest = 0;
        for x in 0..self.width {
            for y in 0..self.height {
                let el = elevation(x, y);
                highest = highest.max(el);
                lowest = lowest.min(el);

                let i = self.idx(x, y);
                let c = &mut self.cells[i];
                c.surface_elevation = el;
                c.water = water;
                c.water_elevation = el + water;
            }
        }
        self.extrema.highest_surface_elevation = highest;
        self.extrema.lowest_surface_elevation = lowest;
    }
}
