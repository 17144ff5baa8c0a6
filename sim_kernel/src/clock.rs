//! # Cycle Clock
//!
//! Deterministic global time for the simulation.
//!
//! ## Philosophy
//!
//! **Determinism enables thorough testing.**
//!
//! The clock never advances on its own. The scheduler moves it forward by
//! exactly one cycle at the end of every `run_one_unit`, and every deadline
//! in the system is compared against it.

/// Global cycle counter
///
/// # Examples
///
/// ```
/// use sim_kernel::clock::CycleClock;
///
/// let mut clock = CycleClock::new();
/// assert_eq!(clock.current(), 0);
///
/// clock.tick();
/// clock.advance(2);
/// assert_eq!(clock.current(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleClock {
    cycle: u64,
}

impl CycleClock {
    /// Creates a clock at cycle 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock starting at `cycle`
    pub fn starting_at(cycle: u64) -> Self {
        Self { cycle }
    }

    /// Advances by one cycle
    pub fn tick(&mut self) {
        self.advance(1);
    }

    /// Advances by `delta` cycles, saturating at `u64::MAX`
    pub fn advance(&mut self, delta: u64) {
        self.cycle = self.cycle.saturating_add(delta);
    }

    /// Returns the current cycle
    pub fn current(&self) -> u64 {
        self.cycle
    }
}
