//! Seeded pseudo-random stream
//!
//! A seed string is folded into 32 bits with FNV-1a and then drives a
//! xorshift32 generator. Same seed, same stream, on every platform.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 16_777_619;

/// Draws are taken modulo this value and scaled into [0, 1)
const DRAW_RESOLUTION: u32 = 1_000_000;

/// FNV-1a over the UTF-16 code units of `seed`
pub fn fnv1a32(seed: &str) -> u32 {
    seed.encode_utf16()
        .fold(FNV_OFFSET_BASIS, |h, unit| (h ^ u32::from(unit)).wrapping_mul(FNV_PRIME))
}

/// 32-bit xorshift generator (13, 17, 5)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub fn new(state: u32) -> Self {
        Self { state }
    }

    /// Seed from a string via [`fnv1a32`]
    pub fn from_seed_str(seed: &str) -> Self {
        Self::new(fnv1a32(seed))
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Next draw in [0, 1), with six decimal digits of resolution
    pub fn next_draw(&mut self) -> f64 {
        f64::from(self.next_u32() % DRAW_RESOLUTION) / f64::from(DRAW_RESOLUTION)
    }
}

/// Pick one element uniformly by `floor(draw * len)`
///
/// Panics if `items` is empty.
pub fn pick<'a, T>(items: &'a [T], rng: &mut XorShift32) -> &'a T {
    let index = (rng.next_draw() * items.len() as f64) as usize;
    &items[index.min(items.len() - 1)]
}
