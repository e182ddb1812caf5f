//! Small non-cryptographic random source for id suffixes
//!
//! Uses a simple xorshift64 algorithm seeded from `rand`. Ids only need to
//! be hard to collide across store instances, not unpredictable.

/// xorshift64 random number generator
#[derive(Debug, Clone)]
pub struct IdRng {
    state: u64,
}

impl IdRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // Ensure non-zero state (xorshift requires this)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Seed from the thread-local OS-seeded generator
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a random u32
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }
}

impl Default for IdRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
