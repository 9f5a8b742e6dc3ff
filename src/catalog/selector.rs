use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::core::Catalog;

/// Strategy for choosing which catalog item the next round shows
pub trait RoundPicker {
    /// Return an index into `catalog`. `previous` is the index shown last, if any.
    fn pick(&mut self, catalog: &Catalog, previous: Option<usize>) -> usize;
}

/// Uniform random choice that never shows the same item twice in a row
/// when there is more than one to choose from
#[derive(Debug)]
pub struct NoRepeatPicker {
    rng: StdRng,
}

impl NoRepeatPicker {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for NoRepeatPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundPicker for NoRepeatPicker {
    fn pick(&mut self, catalog: &Catalog, previous: Option<usize>) -> usize {
        let len = catalog.len();
        match previous {
            Some(prev) if len > 1 && prev < len => {
                // draw from the other len-1 slots and shift past the previous one
                let idx = self.rng.gen_range(0..len - 1);
                if idx >= prev {
                    idx + 1
                } else {
                    idx
                }
            }
            _ => self.rng.gen_range(0..len),
        }
    }
}

/// Replays a fixed list of indices in order, wrapping around.
/// Useful for deterministic sessions in tests and demos.
#[derive(Debug, Clone)]
pub struct SequencePicker {
    order: Vec<usize>,
    next: usize,
}

impl SequencePicker {
    pub fn new(order: Vec<usize>) -> Self {
        Self { order, next: 0 }
    }
}

impl RoundPicker for SequencePicker {
    fn pick(&mut self, catalog: &Catalog, _previous: Option<usize>) -> usize {
        if self.order.is_empty() {
            return 0;
        }
        let idx = self.order[self.next % self.order.len()];
        self.next += 1;
        idx % catalog.len()
    }
}
