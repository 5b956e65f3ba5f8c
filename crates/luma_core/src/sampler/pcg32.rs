//! Minimal PCG32 generator (O'Neill 2014), matching the reference stream
//! semantics so that seeded sequences are reproducible across platforms.

use rand::{RngCore, SeedableRng};

const PCG32_DEFAULT_STATE: u64 = 0x853c_49e6_748f_ea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e_39cb_94b9_5bdb;
const PCG32_MULT: u64 = 0x5851_f42d_4c95_7f2d;

/// PCG32 pseudo-random number generator.
#[derive(Debug, Clone)]
pub struct Pcg32 {
    state: u64,
    inc: u64,
}

impl Default for Pcg32 {
    fn default() -> Self {
        Self {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl Pcg32 {
    /// Seed with an initial state and a stream selector.
    ///
    /// Different streams produce independent sequences even for equal
    /// initial states.
    pub fn seed(&mut self, init_state: u64, init_seq: u64) {
        self.state = 0;
        self.inc = (init_seq << 1) | 1;
        self.next_u32();
        self.state = self.state.wrapping_add(init_state);
        self.next_u32();
    }

    pub fn from_seed_parts(init_state: u64, init_seq: u64) -> Self {
        let mut pcg = Self::default();
        pcg.seed(init_state, init_seq);
        pcg
    }

    /// The next 32 uniformly distributed bits.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xorshifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// A single-precision float in [0, 1).
    ///
    /// Uses the bit trick of filling the mantissa of 1.0 and subtracting,
    /// which keeps the value strictly below 1.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        f32::from_bits((self.next_u32() >> 9) | 0x3f80_0000) - 1.0
    }
}

impl RngCore for Pcg32 {
    fn next_u32(&mut self) -> u32 {
        Pcg32::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let lo = Pcg32::next_u32(self) as u64;
        let hi = Pcg32::next_u32(self) as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = Pcg32::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Pcg32 {
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        let init_state = u64::from_le_bytes(seed[0..8].try_into().unwrap());
        let init_seq = u64::from_le_bytes(seed[8..16].try_into().unwrap());
        Self::from_seed_parts(init_state, init_seq)
    }
}
