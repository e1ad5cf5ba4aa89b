//! Daily assignment store.
//!
//! Maps each user to one foresight index per calendar day. The map is
//! cleared lazily the first time a request arrives on a new day, and the
//! whole state is written through the [`SnapshotAdapter`] after every
//! mutation.


use crate::adapter::SnapshotAdapter;
use crate::day::DayKey;
use crate::snapshot::PersistedSnapshot;
use chrono::{DateTime, TimeZone};
use foresight_core::{config::Durability, error::ForesightError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Platform user identity (Telegram user IDs are signed 64-bit).
pub type UserId = i64;

/// Mutable state guarded by the store lock.
struct State {
    last_day: DayKey,
    assignments: HashMap<UserId, usize>,
    rng: StdRng,
}

impl State {
    fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            last_day: self.last_day.get(),
            user_mapping: self.assignments.iter().map(|(k, v)| (*k, *v)).collect(),
        }
    }
}

/// One foresight per user per calendar day, stable across repeated queries.
pub struct AssignmentStore {
    state: Mutex<State>,
    adapter: Box<dyn SnapshotAdapter>,
    pool_len: usize,
    durability: Durability,
}

impl AssignmentStore {
    /// Open the store for a pool of `pool_len` foresights.
    ///
    /// Restores the saved snapshot if there is one, otherwise starts empty
    /// with [`DayKey::NEVER`]. The opened state is written back immediately so
    /// the state file exists from the first run on.
    pub fn open(
        adapter: Box<dyn SnapshotAdapter>,
        pool_len: usize,
        durability: Durability,
    ) -> Result<Self, ForesightError> {
        Self::open_with_rng(adapter, pool_len, durability, StdRng::from_entropy())
    }

    /// Like [`open`](Self::open), drawing from the given RNG.
    pub fn open_with_rng(
        adapter: Box<dyn SnapshotAdapter>,
        pool_len: usize,
        durability: Durability,
        rng: StdRng,
    ) -> Result<Self, ForesightError> {
        if pool_len == 0 {
            return Err(ForesightError::EmptyPool);
        }

        let snapshot = adapter.load()?.unwrap_or_default();
        if let Some((user, index)) = snapshot
            .user_mapping
            .iter()
            .find(|(_, index)| **index >= pool_len)
        {
            return Err(ForesightError::CorruptState(format!(
                "{}: user {user} holds foresight #{index} but the pool has {pool_len} entries",
                adapter.describe()
            )));
        }

        let state = State {
            last_day: DayKey::from(snapshot.last_day),
            assignments: snapshot.user_mapping.into_iter().collect(),
            rng,
        };

        info!(
            "Assignment store opened at {} | day: {} | users: {} | durability: {}",
            adapter.describe(),
            state.last_day,
            state.assignments.len(),
            durability.display_name()
        );

        let store = Self {
            state: Mutex::new(state),
            adapter,
            pool_len,
            durability,
        };

        let snapshot = store.lock().snapshot();
        if let Err(e) = store.adapter.save(&snapshot) {
            match durability {
                Durability::BestEffort => warn!("failed to write initial state: {e}"),
                Durability::Strict => return Err(e),
            }
        }

        Ok(store)
    }

    /// Return `user`'s foresight index for the day `now` falls on, drawing
    /// one uniformly at random if the user has none yet.
    ///
    /// The whole check-reset-draw-persist sequence runs under one lock, so
    /// concurrent first requests from the same user observe a single draw.
    pub fn get_or_assign<Tz: TimeZone>(
        &self,
        user: UserId,
        now: &DateTime<Tz>,
    ) -> Result<usize, ForesightError> {
        let mut today = DayKey::from_datetime(now);
        let mut state = self.lock();

        if today < state.last_day {
            // Late callers count against the current day; the map never moves backwards.
            debug!("request for {today} arrived after reset to {}", state.last_day);
            today = state.last_day;
        }

        if today > state.last_day {
            info!(
                "day changed {} -> {}, clearing {} assignments",
                state.last_day,
                today,
                state.assignments.len()
            );
            state.assignments.clear();
            state.last_day = today;
            // A failed reset write is repaired by the assignment write below.
            if let Err(e) = self.adapter.save(&state.snapshot()) {
                warn!("failed to persist day reset: {e}");
            }
        }

        if let Some(&index) = state.assignments.get(&user) {
            return Ok(index);
        }

        let index = state.rng.gen_range(0..self.pool_len);
        state.assignments.insert(user, index);

        if let Err(e) = self.adapter.save(&state.snapshot()) {
            match self.durability {
                Durability::BestEffort => {
                    warn!("failed to persist assignment for user {user}, answering from memory: {e}");
                }
                Durability::Strict => {
                    state.assignments.remove(&user);
                    return Err(e);
                }
            }
        }

        debug!("assigned foresight #{index} to user {user} for {today}");
        Ok(index)
    }

    /// Day of the last reset.
    pub fn last_day(&self) -> DayKey {
        self.lock().last_day
    }

    /// Number of users holding an assignment for [`last_day`](Self::last_day).
    pub fn assigned_count(&self) -> usize {
        self.lock().assignments.len()
    }

    /// `user`'s current assignment, without resetting or drawing.
    pub fn assignment(&self, user: UserId) -> Option<usize> {
        self.lock().assignments.get(&user).copied()
    }

    /// Copy of the current state in its persisted form.
    pub fn snapshot(&self) -> PersistedSnapshot {
        self.lock().snapshot()
    }

    pub fn pool_len(&self) -> usize {
        self.pool_len
    }

    pub fn durability(&self) -> Durability {
        self.durability
    }

    pub fn location(&self) -> String {
        self.adapter.describe()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Nothing panics between mutations, so a poisoned state is still whole.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
