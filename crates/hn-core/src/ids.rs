//! Identifier providers for nodes and pipes.
//!
//! Entity ids are opaque strings. The store never fabricates them itself; it asks an
//! injected [`IdProvider`], so tests can swap in a deterministic sequence.
//!
//! - [`UuidIds`]: random v4 UUIDs from the platform RNG (preferred)
//! - [`FallbackIds`]: coarse timestamp plus a low-entropy suffix. Uniqueness is
//!   practical, not guaranteed.
//! - [`SequentialIds`]: `prefix1`, `prefix2`, ... for tests and fixtures

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of fresh entity identifiers.
pub trait IdProvider: Send + Sync {
    fn next_id(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdProvider for UuidIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Timestamp-based ids for targets without a usable random source.
///
/// Format: `<millis base16>-<6 hex digits>`. The suffix comes from a seeded
/// `SmallRng`, so two providers built with the same seed and clock produce the
/// same ids.
pub struct FallbackIds {
    clock: fn() -> i64,
    rng: Mutex<SmallRng>,
}

impl FallbackIds {
    /// Seeded from the wall clock; no OS entropy is needed.
    pub fn new() -> Self {
        let seed = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
        Self::with_seed(seed, wall_clock_millis)
    }

    pub fn with_seed(seed: u64, clock: fn() -> i64) -> Self {
        Self {
            clock,
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    fn next_suffix(&self) -> u32 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random::<u32>() & 0x00ff_ffff
    }
}

impl Default for FallbackIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdProvider for FallbackIds {
    fn next_id(&self) -> String {
        let millis = (self.clock)().max(0) as u64;
        format!("{:x}-{:06x}", millis, self.next_suffix())
    }
}

fn wall_clock_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Deterministic `prefix1, prefix2, ...` ids.
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdProvider for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.prefix, n)
    }
}

/// Strong random ids where the platform offers them, timestamp ids otherwise.
pub fn default_provider() -> Box<dyn IdProvider> {
    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        Box::new(FallbackIds::new())
    }
    #[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
    {
        Box::new(UuidIds)
    }
}
