//! Placement engine for choosing ledger ensembles.

use crate::error::{QuorumLogError, Result};
use crate::types::{BookieId, BookieInfo, ReplicationConfig};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Rack assigned to bookies that do not report one.
pub const DEFAULT_RACK: &str = "/default-rack";

/// Placement engine for deciding which bookies host a new ledger.
///
/// Selection is deterministic for a given seed and call sequence, which is
/// what tests rely on. The RNG and the round-robin cursor are shared by all
/// concurrent creation requests.
#[derive(Debug)]
pub struct PlacementEngine {
    /// Strategy for placement.
    strategy: PlacementStrategy,
    rng: Mutex<StdRng>,
    cursor: AtomicUsize,
}

/// Placement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Shuffle the writable pool and take the first bookies.
    #[default]
    Random,
    /// Walk the address-sorted pool from a rotating offset.
    RoundRobin,
    /// Spread the ensemble across racks before reusing one.
    RackAware,
}

impl PlacementEngine {
    pub fn new(strategy: PlacementStrategy) -> Self {
        Self::with_seed(strategy, rand::random())
    }

    pub fn with_seed(strategy: PlacementStrategy, seed: u64) -> Self {
        Self {
            strategy,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn strategy(&self) -> PlacementStrategy {
        self.strategy
    }

    /// Choose an ensemble from plain addresses.
    ///
    /// Every address is treated as writable and rackless.
    pub fn select(&self, config: &ReplicationConfig, available: &[BookieId]) -> Result<Vec<BookieId>> {
        let bookies: Vec<_> = available
            .iter()
            .map(|id| BookieInfo::writable(id.as_str()))
            .collect();
        self.choose_ensemble(config, &bookies, &HashSet::new())
    }

    /// Choose the ensemble for a new ledger.
    ///
    /// Returns exactly `config.ensemble_size` distinct bookies. Read-only,
    /// offline and excluded bookies are never chosen; duplicate entries in
    /// `bookies` count once.
    pub fn choose_ensemble(
        &self,
        config: &ReplicationConfig,
        bookies: &[BookieInfo],
        exclude: &HashSet<BookieId>,
    ) -> Result<Vec<BookieId>> {
        let required = config.ensemble_len();

        let mut seen = HashSet::new();
        let available: Vec<_> = bookies
            .iter()
            .filter(|b| b.is_writable() && !exclude.contains(&b.id))
            .filter(|b| seen.insert(b.id.clone()))
            .collect();

        if available.len() < required {
            return Err(QuorumLogError::NotEnoughBookies {
                required,
                available: available.len(),
            });
        }

        if required == 0 {
            return Ok(Vec::new());
        }

        let ensemble = match self.strategy {
            PlacementStrategy::Random => self.place_random(&available, required),
            PlacementStrategy::RoundRobin => self.place_round_robin(&available, required),
            PlacementStrategy::RackAware => self.place_rack_aware(&available, required),
        };

        debug!(
            strategy = ?self.strategy,
            required,
            pool = available.len(),
            ensemble = ?ensemble,
            "Chose ensemble"
        );

        Ok(ensemble)
    }

    /// Choose bookies randomly.
    fn place_random(&self, bookies: &[&BookieInfo], count: usize) -> Vec<BookieId> {
        let mut selected: Vec<_> = bookies.to_vec();
        selected.shuffle(&mut *self.rng.lock());

        selected.into_iter().take(count).map(|b| b.id.clone()).collect()
    }

    /// Take consecutive bookies from the sorted pool, starting one further
    /// along on every call.
    fn place_round_robin(&self, bookies: &[&BookieInfo], count: usize) -> Vec<BookieId> {
        let mut sorted: Vec<_> = bookies.to_vec();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % sorted.len();
        sorted
            .iter()
            .cycle()
            .skip(start)
            .take(count)
            .map(|b| b.id.clone())
            .collect()
    }

    /// Interleave racks so consecutive ensemble slots land in different
    /// failure domains whenever enough racks exist.
    fn place_rack_aware(&self, bookies: &[&BookieInfo], count: usize) -> Vec<BookieId> {
        let mut racks: BTreeMap<&str, Vec<&BookieInfo>> = BTreeMap::new();
        for &bookie in bookies {
            let rack = bookie.rack.as_deref().unwrap_or(DEFAULT_RACK);
            racks.entry(rack).or_default().push(bookie);
        }

        let mut rng = self.rng.lock();
        for members in racks.values_mut() {
            members.sort_by(|a, b| a.id.cmp(&b.id));
            members.shuffle(&mut *rng);
        }

        let mut result = Vec::with_capacity(count);
        let mut round = 0;
        while result.len() < count {
            for members in racks.values() {
                if let Some(bookie) = members.get(round) {
                    result.push(bookie.id.clone());
                    if result.len() == count {
                        break;
                    }
                }
            }
            round += 1;
        }

        result
    }
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new(PlacementStrategy::Random)
    }
}
