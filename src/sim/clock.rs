//! Tick counter for the simulation.
//!
//! Uses checked arithmetic: advancing past `u64::MAX` is an error, never a
//! silent wrap.

use crate::MarketError;

/// Monotonic simulation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickClock {
    tick: u64,
}

impl TickClock {
    /// Clock starting at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock resumed at `tick`
    pub fn starting_at(tick: u64) -> Self {
        Self { tick }
    }

    /// The tick that will run next
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Move to the next tick and return it.
    ///
    /// # Errors
    ///
    /// [`MarketError::TickOverflow`] if the counter is at `u64::MAX`; the
    /// clock is left unchanged.
    pub fn advance(&mut self) -> Result<u64, MarketError> {
        self.tick = self.tick.checked_add(1).ok_or(MarketError::TickOverflow)?;
        Ok(self.tick)
    }
}
