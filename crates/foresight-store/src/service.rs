//! The facade the transport layer talks to.

use crate::adapter::SnapshotAdapter;
use crate::pool::ForesightPool;
use crate::store::{AssignmentStore, UserId};
use chrono::{DateTime, TimeZone};
use foresight_core::{config::Durability, error::ForesightError};

/// Picks today's foresight for a user.
pub struct ForesightService {
    pool: ForesightPool,
    store: AssignmentStore,
}

impl ForesightService {
    /// Pair a pool with a store opened for a pool of the same size.
    pub fn new(pool: ForesightPool, store: AssignmentStore) -> Result<Self, ForesightError> {
        if store.pool_len() != pool.len() {
            return Err(ForesightError::Config(format!(
                "assignment store expects {} foresights, pool has {}",
                store.pool_len(),
                pool.len()
            )));
        }
        Ok(Self { pool, store })
    }

    /// Open the store behind `adapter` for `pool`.
    pub fn open(
        pool: ForesightPool,
        adapter: Box<dyn SnapshotAdapter>,
        durability: Durability,
    ) -> Result<Self, ForesightError> {
        let store = AssignmentStore::open(adapter, pool.len(), durability)?;
        Self::new(pool, store)
    }

    /// Today's foresight text for `user`, as of `now`.
    pub fn get_foresight<Tz: TimeZone>(
        &self,
        user: UserId,
        now: &DateTime<Tz>,
    ) -> Result<&str, ForesightError> {
        let index = self.store.get_or_assign(user, now)?;
        Ok(self.pool.get(index))
    }

    pub fn pool(&self) -> &ForesightPool {
        &self.pool
    }

    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MemoryAdapter;
    use crate::snapshot::PersistedSnapshot;
    use crate::DayKey;
    use chrono::{Local, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn pool() -> ForesightPool {
        ForesightPool::from_entries(["Sunny", "Rainy", "Windy"]).unwrap()
    }

    #[test]
    fn test_get_foresight_is_stable_within_day() {
        let service =
            ForesightService::open(pool(), Box::new(MemoryAdapter::new()), Durability::BestEffort)
                .unwrap();
        let now = Local::now();
        let first = service.get_foresight(42, &now).unwrap().to_string();
        assert!(service.pool().iter().any(|t| t == first));
        assert_eq!(service.get_foresight(42, &now).unwrap(), first);
    }

    #[test]
    fn test_get_foresight_returns_stored_text() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let adapter = MemoryAdapter::with_snapshot(PersistedSnapshot {
            last_day: DayKey::from_datetime(&now).get(),
            user_mapping: BTreeMap::from([(7, 2), (42, 0)]),
        });
        let service =
            ForesightService::open(pool(), Box::new(adapter), Durability::BestEffort).unwrap();
        assert_eq!(service.get_foresight(7, &now).unwrap(), "Windy");
        assert_eq!(service.get_foresight(42, &now).unwrap(), "Sunny");
    }

    #[test]
    fn test_corrupt_index_is_caught_before_lookup() {
        let adapter = MemoryAdapter::with_snapshot(PersistedSnapshot {
            last_day: 1,
            user_mapping: BTreeMap::from([(7, 5)]),
        });
        let result = ForesightService::open(pool(), Box::new(adapter), Durability::BestEffort);
        assert!(matches!(result, Err(ForesightError::CorruptState(_))));
    }

    #[test]
    fn test_mismatched_store_is_rejected() {
        let store = AssignmentStore::open_with_rng(
            Box::new(MemoryAdapter::new()),
            5,
            Durability::BestEffort,
            StdRng::seed_from_u64(1),
        )
        .unwrap();
        assert!(matches!(
            ForesightService::new(pool(), store),
            Err(ForesightError::Config(_))
        ));
    }

    #[test]
    fn test_empty_pool_never_reaches_service() {
        assert!(matches!(
            ForesightPool::from_text("\n"),
            Err(ForesightError::EmptyPool)
        ));
    }
}
