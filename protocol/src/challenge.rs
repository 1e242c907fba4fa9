//! Single-use, time-bounded challenges.
//!
//! The verifier side of a proof round-trip: hand out a fresh random
//! challenge, remember it until it expires, and accept it back exactly once.
//! This is the only stateful piece of SGAIP.
//!
//! ## Design
//!
//! - `DashMap` keyed by challenge bytes. `remove` is atomic per key, so when
//!   two threads race to redeem the same challenge exactly one of them gets
//!   the entry back.
//! - An entry is removed on every redemption attempt, successful or not.
//! - Expiry is checked at redemption time. [`ChallengeManager::sweep_expired`]
//!   only reclaims memory; it never removes a live entry, so it can run
//!   concurrently with everything else.
//! - A TTL too large for the monotonic clock is stored as "no expiry". The
//!   challenge is still single-use.
//! - Capacity is a soft bound: concurrent `generate` calls can overshoot it
//!   by at most the number of racing threads.

use std::fmt;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ChallengeConfig, MIN_CHALLENGE_LENGTH};

// ---------------------------------------------------------------------------
// Challenge
// ---------------------------------------------------------------------------

/// Random bytes a prover must sign to demonstrate key possession.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Challenge {
    #[serde(with = "hex::serde")]
    bytes: Vec<u8>,
}

impl Challenge {
    /// Wrap bytes received from a prover. No length check: an unknown
    /// challenge of any length simply fails to redeem.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Raw bytes, exactly what the prover signs.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the challenge is empty. Issued challenges never are.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Parse hex text.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s.trim()).map(|bytes| Self { bytes })
    }

    /// Short prefix for logs. Challenges are public, but 64-char hex blobs
    /// make log lines unreadable.
    fn short(&self) -> String {
        let hex_str = self.to_hex();
        hex_str[..hex_str.len().min(12)].to_string()
    }
}

impl AsRef<[u8]> for Challenge {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Challenge({}..., {} bytes)", self.short(), self.bytes.len())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from challenge issuance. Redemption never errors; it answers
/// `true` or `false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    /// The OS RNG could not be read.
    #[error("secure random source unavailable")]
    EntropyUnavailable,

    /// Too many challenges are outstanding and none have expired yet.
    #[error("too many outstanding challenges (limit {limit})")]
    CapacityExceeded {
        /// Configured limit.
        limit: usize,
    },
}

// ---------------------------------------------------------------------------
// ChallengeManager
// ---------------------------------------------------------------------------

/// Issues challenges and redeems each of them at most once.
///
/// Share it between verification sessions behind an `Arc`; every method
/// takes `&self`.
pub struct ChallengeManager {
    /// Outstanding challenges and the instant they stop being redeemable.
    /// `None` when the TTL reaches past what `Instant` can represent.
    outstanding: DashMap<Vec<u8>, Option<Instant>>,

    config: ChallengeConfig,
}

impl fmt::Debug for ChallengeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChallengeManager")
            .field("outstanding", &self.outstanding.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for ChallengeManager {
    fn default() -> Self {
        Self::new(ChallengeConfig::default())
    }
}

impl ChallengeManager {
    /// Create a manager. A `challenge_len` below [`MIN_CHALLENGE_LENGTH`] is
    /// raised to the minimum.
    pub fn new(mut config: ChallengeConfig) -> Self {
        config.challenge_len = config.challenge_len.max(MIN_CHALLENGE_LENGTH);
        Self {
            outstanding: DashMap::new(),
            config,
        }
    }

    /// The effective configuration.
    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    /// Issue a challenge redeemable for `ttl_seconds`.
    ///
    /// A TTL of zero issues a challenge that is already expired.
    pub fn generate(&self, ttl_seconds: u64) -> Result<Challenge, ChallengeError> {
        self.generate_with_ttl(Duration::from_secs(ttl_seconds))
    }

    /// Issue a challenge with the configured default TTL.
    pub fn generate_default(&self) -> Result<Challenge, ChallengeError> {
        self.generate_with_ttl(self.config.default_ttl)
    }

    /// Issue a challenge redeemable for `ttl`.
    ///
    /// # Errors
    ///
    /// [`ChallengeError::EntropyUnavailable`] if the OS RNG fails,
    /// [`ChallengeError::CapacityExceeded`] if the store is full even after
    /// sweeping expired entries.
    pub fn generate_with_ttl(&self, ttl: Duration) -> Result<Challenge, ChallengeError> {
        if self.outstanding.len() >= self.config.max_outstanding {
            let swept = self.sweep_expired();
            if self.outstanding.len() >= self.config.max_outstanding {
                warn!(
                    limit = self.config.max_outstanding,
                    swept, "challenge store full, refusing to issue"
                );
                return Err(ChallengeError::CapacityExceeded {
                    limit: self.config.max_outstanding,
                });
            }
        }

        let now = Instant::now();
        let expires_at = now.checked_add(ttl);

        loop {
            let mut bytes = vec![0u8; self.config.challenge_len];
            OsRng
                .try_fill_bytes(&mut bytes)
                .map_err(|_| ChallengeError::EntropyUnavailable)?;

            // Re-draw on collision; a live entry is never overwritten.
            if let dashmap::mapref::entry::Entry::Vacant(slot) =
                self.outstanding.entry(bytes.clone())
            {
                slot.insert(expires_at);
                let challenge = Challenge { bytes };
                debug!(challenge = %challenge.short(), ttl_ms = ttl.as_millis() as u64, "challenge issued");
                return Ok(challenge);
            }
        }
    }

    /// Redeem a challenge.
    ///
    /// Returns `true` only if the challenge was issued by this manager, has
    /// not been redeemed before, and has not expired. The entry is removed in
    /// every case, so a second call with the same bytes always returns
    /// `false`.
    pub fn consume(&self, challenge: &[u8]) -> bool {
        let Some((_, expires_at)) = self.outstanding.remove(challenge) else {
            debug!("challenge redemption rejected: unknown or already used");
            return false;
        };
        let live = is_live(expires_at, Instant::now());
        if !live {
            debug!("challenge redemption rejected: expired");
        }
        live
    }

    /// Drop every expired entry. Returns how many were removed.
    ///
    /// The expiry predicate is evaluated under the shard lock, so an entry
    /// that is still live is never removed, whatever else is running.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.outstanding.retain(|_, expires_at| {
            let keep = is_live(*expires_at, now);
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            debug!(removed, "swept expired challenges");
        }
        removed
    }

    /// Number of challenges currently tracked, expired ones included until
    /// swept.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }
}

/// `now < expires_at`, so a zero TTL is dead on arrival.
fn is_live(expires_at: Option<Instant>, now: Instant) -> bool {
    expires_at.map_or(true, |deadline| now < deadline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn manager() -> ChallengeManager {
        ChallengeManager::default()
    }

    #[test]
    fn generated_challenge_has_configured_length() {
        let mgr = manager();
        let c = mgr.generate(60).unwrap();
        assert_eq!(c.len(), 32);
        assert!(!c.is_empty());
    }

    #[test]
    fn short_length_is_raised_to_minimum() {
        let mgr = ChallengeManager::new(ChallengeConfig {
            challenge_len: 8,
            ..Default::default()
        });
        assert_eq!(mgr.config().challenge_len, MIN_CHALLENGE_LENGTH);
        assert_eq!(mgr.generate(60).unwrap().len(), MIN_CHALLENGE_LENGTH);
    }

    #[test]
    fn longer_challenges_are_honoured() {
        let mgr = ChallengeManager::new(ChallengeConfig {
            challenge_len: 64,
            ..Default::default()
        });
        assert_eq!(mgr.generate(60).unwrap().len(), 64);
    }

    #[test]
    fn consume_succeeds_exactly_once() {
        let mgr = manager();
        let c = mgr.generate(60).unwrap();
        assert!(mgr.consume(c.as_bytes()));
        assert!(!mgr.consume(c.as_bytes()));
        assert!(!mgr.consume(c.as_bytes()));
        assert_eq!(mgr.outstanding(), 0);
    }

    #[test]
    fn unknown_challenge_is_rejected() {
        let mgr = manager();
        assert!(!mgr.consume(&[0u8; 32]));
    }

    #[test]
    fn zero_ttl_fails_on_first_attempt() {
        let mgr = manager();
        let c = mgr.generate(0).unwrap();
        assert!(!mgr.consume(c.as_bytes()));
    }

    #[test]
    fn huge_ttl_is_redeemable_once() {
        let mgr = manager();
        for ttl in [u64::MAX, u64::MAX / 2] {
            let c = mgr.generate(ttl).unwrap();
            assert!(mgr.consume(c.as_bytes()));
            assert!(!mgr.consume(c.as_bytes()));
        }
    }

    #[test]
    fn sweep_keeps_huge_ttl_entries() {
        let mgr = manager();
        let c = mgr.generate(u64::MAX).unwrap();
        assert_eq!(mgr.sweep_expired(), 0);
        assert!(mgr.consume(c.as_bytes()));
    }

    #[test]
    fn sweep_count_matches_removals_under_concurrent_issue() {
        let mgr = Arc::new(manager());
        for _ in 0..50 {
            mgr.generate(0).unwrap();
        }
        let issuer = {
            let mgr = Arc::clone(&mgr);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    mgr.generate(3600).unwrap();
                }
            })
        };
        let removed = mgr.sweep_expired();
        issuer.join().unwrap();
        assert_eq!(removed, 50);
        assert_eq!(mgr.outstanding(), 200);
    }

    #[test]
    fn elapsed_ttl_fails() {
        let mgr = manager();
        let c = mgr.generate_with_ttl(Duration::from_millis(20)).unwrap();
        std::thread::sleep(Duration::from_millis(60));
        assert!(!mgr.consume(c.as_bytes()));
        // Removed even though it failed.
        assert_eq!(mgr.outstanding(), 0);
    }

    #[test]
    fn challenges_are_unique() {
        let mgr = manager();
        let set: std::collections::HashSet<Vec<u8>> = (0..1000)
            .map(|_| mgr.generate(60).unwrap().as_bytes().to_vec())
            .collect();
        assert_eq!(set.len(), 1000);
        assert_eq!(mgr.outstanding(), 1000);
    }

    #[test]
    fn sweep_removes_only_expired() {
        let mgr = manager();
        let live = mgr.generate(3600).unwrap();
        mgr.generate(0).unwrap();
        mgr.generate(0).unwrap();

        assert_eq!(mgr.sweep_expired(), 2);
        assert_eq!(mgr.outstanding(), 1);
        assert!(mgr.consume(live.as_bytes()));
    }

    #[test]
    fn capacity_limit_enforced() {
        let mgr = ChallengeManager::new(ChallengeConfig {
            max_outstanding: 2,
            ..Default::default()
        });
        mgr.generate(60).unwrap();
        mgr.generate(60).unwrap();
        assert_eq!(
            mgr.generate(60).unwrap_err(),
            ChallengeError::CapacityExceeded { limit: 2 }
        );
    }

    #[test]
    fn capacity_recovers_after_expiry() {
        let mgr = ChallengeManager::new(ChallengeConfig {
            max_outstanding: 2,
            ..Default::default()
        });
        mgr.generate(0).unwrap();
        mgr.generate(0).unwrap();
        // Full of dead entries; issuing sweeps them first.
        assert!(mgr.generate(60).is_ok());
        assert_eq!(mgr.outstanding(), 1);
    }

    #[test]
    fn concurrent_consume_has_single_winner() {
        for _ in 0..20 {
            let mgr = Arc::new(manager());
            let c = mgr.generate(60).unwrap();
            let barrier = Arc::new(std::sync::Barrier::new(8));

            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let mgr = Arc::clone(&mgr);
                    let bytes = c.as_bytes().to_vec();
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        barrier.wait();
                        mgr.consume(&bytes)
                    })
                })
                .collect();

            let wins = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(wins, 1);
        }
    }

    #[test]
    fn challenge_hex_roundtrip() {
        let mgr = manager();
        let c = mgr.generate(60).unwrap();
        assert_eq!(Challenge::from_hex(&c.to_hex()).unwrap(), c);
    }

    #[test]
    fn debug_is_abbreviated() {
        let c = Challenge::from_bytes(vec![0xAB; 32]);
        assert_eq!(format!("{:?}", c), "Challenge(abababababab..., 32 bytes)");
    }
}
