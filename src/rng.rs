use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;
use serde::{Deserialize, Serialize};

const LCG_MUL: u32 = 1_664_525;
const LCG_INC: u32 = 1_013_904_223;

/// Seeded 32-bit linear congruential generator.
///
/// The entire engine derives its randomness from this state, so a hand is
/// replayable bit-for-bit from `(seed, action_sequence)`. The state is a
/// plain `u32` and round-trips through `get_state`/`set_state`.
///
/// Not cryptographically secure. Do not use for anything that must resist
/// prediction; the LCG exists for reproducibility, not secrecy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableRng {
    state: u32,
}

impl TableRng {
    pub fn new(seed: u32) -> TableRng {
        TableRng { state: seed }
    }

    /// Seeds from the wallclock. Used when a table is created without an
    /// explicit seed; replays of such tables must capture `get_state` first.
    pub fn from_entropy() -> TableRng {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        TableRng {
            state: now.subsec_nanos() ^ (now.as_secs() as u32),
        }
    }

    pub fn get_state(&self) -> u32 {
        self.state
    }

    pub fn set_state(&mut self, state: u32) {
        self.state = state;
    }

    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        self.state
    }

    /// Advances the generator and returns a uniform draw in `[0, 1)`.
    pub fn next(&mut self) -> f64 {
        self.step() as f64 / (u32::MAX as f64 + 1.0)
    }
}

impl RngCore for TableRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.step() as u64;
        let lo = self.step() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
