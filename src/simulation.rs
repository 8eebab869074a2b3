//! Double-buffered driver state.

use crate::tick::{tick, TickReport};
use crate::world::World;

/// Owns the two world buffers and the tick counter.
///
/// Each step ticks `current` into the spare buffer, then swaps the two so the
/// freshest state is always `current`.
pub struct Simulation {
    current: World,
    spare: World,
    t: u64,
}

impl Simulation {
    pub fn new(world: World) -> Self {
        Self {
            spare: world.clone(),
            current: world,
            t: 0,
        }
    }

    /// Advance one tick.
    pub fn step(&mut self) -> TickReport {
        let report = tick(&mut self.spare, &self.current, self.t);
        std::mem::swap(&mut self.current, &mut self.spare);
        self.t += 1;
        report
    }

    /// Advance `ticks` ticks, discarding the reports.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// The most recently computed world.
    pub fn current(&self) -> &World {
        &self.current
    }

    /// Ticks taken so far. Also the index of the next tick.
    pub fn tick_count(&self) -> u64 {
        self.t
    }
}
