/// Small PCG-style PRNG seeded from the platform entropy source.
///
/// Works unchanged in the browser build because `getrandom` is compiled with
/// its `js` backend.
#[derive(Debug, Clone)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    pub fn new() -> Self {
        let mut seed_bytes = [0u8; 8];
        getrandom::getrandom(&mut seed_bytes).unwrap_or_else(|err| {
            log::warn!("entropy source unavailable ({}), using counter seed", err);
            static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
            let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            seed_bytes = counter.to_le_bytes();
        });
        Self::with_seed(u64::from_le_bytes(seed_bytes))
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let xorshifted = (((self.state >> 18) ^ self.state) >> 27) as u32;
        let rot = (self.state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Uniform value in `0..bound`. `bound` must be non-zero.
    pub fn below(&mut self, bound: u32) -> u32 {
        // multiply-shift range reduction
        ((self.next_u32() as u64 * bound as u64) >> 32) as u32
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new()
    }
}
