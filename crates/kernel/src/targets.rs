//! Per-entity target list: pending locks count down each tick, then lock.

use orrery_common::EntityId;
use std::collections::{BTreeMap, BTreeSet};

/// Maximum simultaneous targets when not configured.
pub const DEFAULT_MAX_TARGETS: usize = 8;

#[derive(Debug, Clone)]
pub struct TargetList {
    max_targets: usize,
    /// Target id -> ticks left until locked.
    pending: BTreeMap<EntityId, u32>,
    locked: BTreeSet<EntityId>,
}

impl Default for TargetList {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TARGETS)
    }
}

impl TargetList {
    pub fn new(max_targets: usize) -> Self {
        Self {
            max_targets,
            pending: BTreeMap::new(),
            locked: BTreeSet::new(),
        }
    }

    /// Begin locking `target`; it becomes locked after `lock_ticks` calls to
    /// [`process`](Self::process). Returns false when already targeted or
    /// the list is full.
    pub fn start_lock(&mut self, target: EntityId, lock_ticks: u32) -> bool {
        if target.is_none() || self.contains(target) || self.len() >= self.max_targets {
            return false;
        }
        if lock_ticks == 0 {
            self.locked.insert(target);
        } else {
            self.pending.insert(target, lock_ticks);
        }
        true
    }

    /// Drop `target`, whether pending or locked.
    pub fn clear(&mut self, target: EntityId) -> bool {
        self.pending.remove(&target).is_some() | self.locked.remove(&target)
    }

    pub fn clear_all(&mut self) {
        self.pending.clear();
        self.locked.clear();
    }

    /// Advance pending locks by one tick.
    pub fn process(&mut self) {
        let mut done = Vec::new();
        for (id, ticks) in self.pending.iter_mut() {
            *ticks -= 1;
            if *ticks == 0 {
                done.push(*id);
            }
        }
        for id in done {
            self.pending.remove(&id);
            self.locked.insert(id);
            tracing::debug!(target_id = %id, "target locked");
        }
    }

    pub fn is_locked(&self, target: EntityId) -> bool {
        self.locked.contains(&target)
    }

    pub fn is_locking(&self, target: EntityId) -> bool {
        self.pending.contains_key(&target)
    }

    pub fn contains(&self, target: EntityId) -> bool {
        self.is_locked(target) || self.is_locking(target)
    }

    pub fn locked(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.locked.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.locked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
