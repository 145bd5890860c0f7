//! Seeded, domain-separated random streams.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;

/// Independent RNG streams derived from one user-visible seed.
#[derive(Debug, Clone)]
pub struct RngStreams {
    journey: CountingRng<SmallRng>,
    population: CountingRng<SmallRng>,
}

impl RngStreams {
    /// Construct the streams from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            journey: CountingRng::new(derive_stream_seed(seed, b"journey")),
            population: CountingRng::new(derive_stream_seed(seed, b"population")),
        }
    }

    /// Split into the (journey, population) streams.
    #[must_use]
    pub fn into_parts(self) -> (CountingRng<SmallRng>, CountingRng<SmallRng>) {
        (self.journey, self.population)
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    /// Seed a fresh `SmallRng` stream.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::wrap(SmallRng::seed_from_u64(seed))
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Wrap an existing generator.
    #[must_use]
    pub const fn wrap(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
