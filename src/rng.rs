//! Multi-stream random-number generation.
//!
//! [`Streams`] holds 100 independent seed registers for a prime-modulus multiplicative linear-congruential generator
//! (modulus `2^31 - 1`, two multiplicative steps per draw). The recurrence and the default seeds are reproduced
//! bit-for-bit so that a model driven by the same stream assignments yields the same draws as any other faithful
//! implementation of the generator. Variate transforms built on top of [`Streams::uniform01()`] live in the
//! `variates` submodule.
//!
//! A stream only advances when a draw is taken from it. Besides drawing, the registers can be read and overwritten
//! individually ([`seed()`], [`set_seed()`]), captured and restored wholesale ([`snapshot()`], [`restore()`]), or
//! jumped ahead by an arbitrary number of draws ([`jump()`]) to carve out non-overlapping substreams for independent
//! replications.
//!
//! [`seed()`]: Streams::seed
//! [`set_seed()`]: Streams::set_seed
//! [`snapshot()`]: Streams::snapshot
//! [`restore()`]: Streams::restore
//! [`jump()`]: Streams::jump

mod default_seeds;
mod variates;

use default_seeds::DEFAULT_SEEDS;
use serde::{Deserialize, Serialize};

const MODLUS: i64 = 2_147_483_647;
const MULT1: i64 = 24_112;
const MULT2: i64 = 26_143;

/// Number of independent streams available.
pub const STREAM_COUNT: usize = 100;

/// Identifier for one of the 100 streams, validated to lie in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct StreamId(u8);

impl StreamId {
    /// Validate a one-based stream number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStream`] if `stream` is not in `1..=100`.
    ///
    /// [`Error::InvalidStream`]: crate::Error::InvalidStream
    pub fn new(stream: usize) -> crate::Result<Self> {
        if (1..=STREAM_COUNT).contains(&stream) {
            // fits: bounded by STREAM_COUNT above
            Ok(Self(stream as u8))
        } else {
            Err(crate::Error::InvalidStream(stream))
        }
    }

    /// The one-based stream number.
    pub fn get(self) -> usize {
        usize::from(self.0)
    }

    fn index(self) -> usize {
        self.get() - 1
    }
}

impl TryFrom<usize> for StreamId {
    type Error = crate::Error;

    fn try_from(stream: usize) -> crate::Result<Self> {
        Self::new(stream)
    }
}

impl From<StreamId> for usize {
    fn from(stream: StreamId) -> Self {
        stream.get()
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "stream {}", self.0)
    }
}

/// Serializable copy of all 100 seed registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSnapshot {
    seeds: Vec<u32>,
}

impl StreamSnapshot {
    /// The captured seeds, stream 1 first.
    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }
}

/// The 100 seed registers of the generator.
///
/// `Streams` is plain data: cloning it forks every stream, and a clone moved to another thread evolves independently
/// of the one it was cloned from. Use [`substreams()`] rather than bare clones when replications must not share draws.
///
/// [`substreams()`]: Streams::substreams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Streams {
    seeds: [i64; STREAM_COUNT],
}

impl Default for Streams {
    fn default() -> Self {
        Self::new()
    }
}

impl Streams {
    /// All 100 streams at their published default seeds.
    pub fn new() -> Self {
        let mut seeds = [0; STREAM_COUNT];
        for (register, &seed) in seeds.iter_mut().zip(DEFAULT_SEEDS.iter()) {
            *register = i64::from(seed);
        }
        Self { seeds }
    }

    /// Draw the next `Uniform(0, 1)` value from `stream`. The result is never exactly 0 or 1.
    pub fn uniform01(&mut self, stream: StreamId) -> f64 {
        let register = &mut self.seeds[stream.index()];
        let mut zi = multiply_mod(*register, MULT1);
        zi = multiply_mod(zi, MULT2);
        *register = zi;
        // 24 high-order bits with the lowest forced on, so the result is strictly inside (0, 1)
        ((zi >> 7) | 1) as f64 / 16_777_216.0
    }

    /// Current seed of `stream`.
    pub fn seed(&self, stream: StreamId) -> u32 {
        // registers always lie in 1..MODLUS
        self.seeds[stream.index()] as u32
    }

    /// Overwrite the seed of `stream`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `seed` is zero or not below `2^31 - 1`; such a register would either stay
    /// at zero forever or fall outside the generator's state space.
    ///
    /// [`Error::InvalidConfig`]: crate::Error::InvalidConfig
    pub fn set_seed(&mut self, stream: StreamId, seed: u32) -> crate::Result {
        let seed = i64::from(seed);
        if seed == 0 || seed >= MODLUS {
            return Err(crate::Error::InvalidConfig(format!(
                "seed {seed} for {stream} must lie in 1..{MODLUS}"
            )));
        }
        self.seeds[stream.index()] = seed;
        Ok(())
    }

    /// Capture every seed register.
    pub fn snapshot(&self) -> StreamSnapshot {
        StreamSnapshot {
            seeds: self.seeds.iter().map(|&seed| seed as u32).collect(),
        }
    }

    /// Overwrite every seed register from `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the snapshot does not hold exactly 100 valid seeds, leaving `self`
    /// untouched.
    ///
    /// [`Error::InvalidConfig`]: crate::Error::InvalidConfig
    pub fn restore(&mut self, snapshot: &StreamSnapshot) -> crate::Result {
        if snapshot.seeds.len() != STREAM_COUNT {
            return Err(crate::Error::InvalidConfig(format!(
                "snapshot holds {} seeds, expected {STREAM_COUNT}",
                snapshot.seeds.len()
            )));
        }
        let mut restored = self.clone();
        for (index, &seed) in snapshot.seeds.iter().enumerate() {
            restored.set_seed(StreamId::new(index + 1)?, seed)?;
        }
        *self = restored;
        Ok(())
    }

    /// Advance every stream by `draws` draws without generating the intermediate values.
    ///
    /// Each draw multiplies the register by `MULT1 * MULT2` modulo `2^31 - 1`, so skipping `n` draws is a single
    /// multiplication by that constant raised to the `n`th power.
    pub fn jump(&mut self, draws: u64) {
        let multiplier = pow_mod((MULT1 * MULT2) as u64 % MODLUS as u64, draws);
        for register in self.seeds.iter_mut() {
            *register = ((*register as u64 * multiplier) % MODLUS as u64) as i64;
        }
    }

    /// Produce `count` copies of these streams, the `k`th advanced by `k * spacing` draws.
    ///
    /// As long as no copy takes more than `spacing` draws from any one stream, the copies never overlap, so each can
    /// drive its own replication (on its own thread if desired). The first copy equals `self`, which makes a
    /// sequential run that starts from `self` and stays within `spacing` draws per replication reproduce the first
    /// replication exactly.
    pub fn substreams(&self, count: usize, spacing: u64) -> Vec<Streams> {
        let mut copies = Vec::with_capacity(count);
        let mut current = self.clone();
        for _ in 0..count {
            let next = {
                let mut next = current.clone();
                next.jump(spacing);
                next
            };
            copies.push(current);
            current = next;
        }
        copies
    }
}

/// One multiplicative step `z * multiplier mod (2^31 - 1)`, computed with 16-bit halves so that no intermediate
/// exceeds 31 bits plus sign.
fn multiply_mod(z: i64, multiplier: i64) -> i64 {
    let lowprd = (z & 65_535) * multiplier;
    let hi31 = (z >> 16) * multiplier + (lowprd >> 16);
    let mut zi = ((lowprd & 65_535) - MODLUS) + ((hi31 & 32_767) << 16) + (hi31 >> 15);
    if zi < 0 {
        zi += MODLUS;
    }
    zi
}

fn pow_mod(mut base: u64, mut exponent: u64) -> u64 {
    let modulus = MODLUS as u64;
    let mut result = 1;
    base %= modulus;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result * base % modulus;
        }
        base = base * base % modulus;
        exponent >>= 1;
    }
    result
}
