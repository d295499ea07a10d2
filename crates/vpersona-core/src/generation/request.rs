//! Candidate count for one pipeline run.

use rand::Rng;

use crate::error::{Result, VpError};

/// Bounds of a run: between `min` (inclusive) and `max` (exclusive) persons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    pub min: usize,
    pub max: usize,
}

impl GenerationRequest {
    /// Validates `min < max`.
    pub fn new(min: usize, max: usize) -> Result<Self> {
        if min >= max {
            return Err(VpError::config(format!(
                "Invalid person count range: min ({min}) must be lower than max ({max})"
            )));
        }
        Ok(Self { min, max })
    }

    /// Draws the number of candidate names to request, uniformly in `[min, max)`.
    pub fn draw_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(self.min..self.max)
    }
}
