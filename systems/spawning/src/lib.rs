#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting tile placements.
//!
//! The system never touches the board directly: it samples free cells it is
//! handed, decides face values, and responds with [`Command::PlaceTile`]
//! batches for the board to execute.

use rand::{seq::index, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tile_fusion_core::{Command, GridCoord, TileValue};

/// Probability that a spawned tile carries the rare value four.
const FOUR_PROBABILITY: f64 = 0.2;

/// Pure system that deterministically selects spawn cells and values.
#[derive(Clone, Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system seeded for reproducible sessions.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Emits placement commands for up to `amount` tiles on distinct cells.
    ///
    /// Cells are sampled uniformly without replacement from `free_cells`, so
    /// a spawn never targets an occupied cell and stops once free cells are
    /// exhausted. Identical seed and free-cell list produce an identical
    /// batch on every execution.
    pub fn plan(&mut self, free_cells: &[GridCoord], amount: usize, out: &mut Vec<Command>) {
        let spawn_count = amount.min(free_cells.len());
        if spawn_count == 0 {
            return;
        }

        for selected in index::sample(&mut self.rng, free_cells.len(), spawn_count) {
            let value = if self.rng.gen_bool(FOUR_PROBABILITY) {
                TileValue::FOUR
            } else {
                TileValue::TWO
            };
            out.push(Command::PlaceTile {
                cell: free_cells[selected],
                value,
            });
        }
    }
}
