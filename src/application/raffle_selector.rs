//! Winner selection with a presentational spin.
//!
//! The winner comes from one uniform draw over the participants. The spin
//! is a separate sequence of highlighted indexes whose length is randomized
//! within a bounded range and then extended until the last frame lands on
//! the drawn winner.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use crate::domain::errors::DomainError;

pub const TICK_INTERVAL: Duration = Duration::from_millis(100);
pub const MIN_TICKS: usize = 30;
pub const EXTRA_TICKS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpinPlan {
    pub winner: usize,
    /// Highlighted participant index per tick.
    pub frames: Vec<usize>,
}

impl SpinPlan {
    /// Highlighted index after the last tick.
    pub fn final_highlight(&self) -> Option<usize> {
        self.frames.last().copied()
    }
}

/// Plans a spin over `participants` entries starting from `start`.
pub fn plan_spin(participants: usize, start: usize, rng: &mut impl Rng) -> Result<SpinPlan, DomainError> {
    if participants == 0 {
        return Err(DomainError::NoParticipants);
    }
    let winner = rng.gen_range(0..participants);
    let mut ticks = MIN_TICKS + rng.gen_range(0..=EXTRA_TICKS);

    let start = start % participants;
    let landing = (start + ticks) % participants;
    ticks += (winner + participants - landing) % participants;

    let frames = (1..=ticks).map(|t| (start + t) % participants).collect();
    Ok(SpinPlan { winner, frames })
}
