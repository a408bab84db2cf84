//! Integer hash used for all world placement.
//!
//! The function and its constants are fixed: a world generated with seed 0
//! is bit-compatible with every other build of the game.

/// Salt applied when a call site does not pick its own.
pub const DEFAULT_SALT: i32 = 1_234_567;

const PRIME_X: i32 = 374_761_393;
const PRIME_Z: i32 = 668_265_263;

/// Deterministic pseudo-random value in `[0, 1)` for an integer pair.
///
/// Multiplication wraps at 32 bits, the avalanche step works on the unsigned
/// representation, and the result is quantised to 1/10000.
#[inline]
pub fn seeded_random(x: i32, z: i32, salt: i32) -> f32 {
    let n = x.wrapping_mul(PRIME_X) ^ z.wrapping_mul(PRIME_Z) ^ salt;
    let n = n as u32;
    let n = n ^ (n >> 13);
    (n % 10_000) as f32 / 10_000.0
}

/// A world seed folded into every salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldHash {
    seed: u32,
}

impl WorldHash {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Hash with the default salt.
    #[inline]
    pub fn at(&self, x: i32, z: i32) -> f32 {
        self.salted(x, z, DEFAULT_SALT)
    }

    /// Hash with an explicit salt.
    #[inline]
    pub fn salted(&self, x: i32, z: i32, salt: i32) -> f32 {
        seeded_random(x, z, salt ^ self.seed as i32)
    }
}
