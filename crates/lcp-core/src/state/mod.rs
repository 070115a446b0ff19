use std::{
    collections::{HashMap, VecDeque},
    time::Instant,
};

use lcp_model::{BoundaryUpdate, TaskId, TileKey};

use crate::scheduler::{CoalescePolicy, SchedulerError};

/// Bookkeeping for one task that has been submitted and not yet consumed.
#[derive(Debug, Clone)]
pub struct InFlight {
    pub key: TileKey,
    pub kind: &'static str,
    pub submitted_at: Instant,
}

/// Scheduling state owned by a single control loop.
///
/// Invariants:
/// - a key is in the running set iff exactly one task for it is in flight;
/// - waiting updates exist only for keys that are running.
#[derive(Debug, Default)]
pub struct ScheduleState {
    /// Running set: key -> the one task in flight for it.
    running: HashMap<TileKey, TaskId>,
    /// In-flight tasks by id.
    in_flight: HashMap<TaskId, InFlight>,
    /// Updates that arrived while their tile was running, oldest first.
    waiting: HashMap<TileKey, VecDeque<BoundaryUpdate>>,
}

impl ScheduleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self, key: &TileKey) -> bool {
        self.running.contains_key(key)
    }

    /// Task currently in flight for `key`.
    pub fn running_task(&self, key: &TileKey) -> Option<TaskId> {
        self.running.get(key).copied()
    }

    /// Record that `id` was submitted for `key`.
    ///
    /// Fails if `key` already has a task in flight.
    pub fn mark_running(
        &mut self,
        key: TileKey,
        id: TaskId,
        kind: &'static str,
    ) -> Result<(), SchedulerError> {
        if let Some(existing) = self.running.get(&key) {
            return Err(SchedulerError::AlreadyRunning {
                key,
                running: *existing,
                submitted: id,
            });
        }
        self.running.insert(key, id);
        self.in_flight.insert(
            id,
            InFlight {
                key,
                kind,
                submitted_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Consume a completion for `id`, taking its key out of the running set.
    ///
    /// A second completion for the same id is an [`SchedulerError::UnknownTask`].
    /// A key bound to some other task is left bound and reported as a
    /// [`SchedulerError::RunningSetInvariantViolation`].
    pub fn retire(&mut self, id: TaskId) -> Result<InFlight, SchedulerError> {
        let flight = self
            .in_flight
            .remove(&id)
            .ok_or(SchedulerError::UnknownTask(id))?;
        match self.running.remove(&flight.key) {
            Some(bound) if bound == id => Ok(flight),
            other => {
                if let Some(bound) = other {
                    self.running.insert(flight.key, bound);
                }
                Err(SchedulerError::RunningSetInvariantViolation {
                    key: flight.key,
                    task: id,
                })
            }
        }
    }

    /// Park `update` until `key` finishes its current pass.
    pub fn enqueue(&mut self, key: TileKey, update: BoundaryUpdate) {
        self.waiting.entry(key).or_default().push_back(update);
    }

    /// Take the updates for the next pass over `key`, per `policy`.
    ///
    /// Returns an empty vec when nothing is waiting.
    pub fn take_pending(&mut self, key: &TileKey, policy: CoalescePolicy) -> Vec<BoundaryUpdate> {
        let Some(queue) = self.waiting.get_mut(key) else {
            return Vec::new();
        };

        let taken = match policy {
            CoalescePolicy::OneSidePerPass => queue.pop_front().into_iter().collect(),
            CoalescePolicy::MergeBySide => {
                let mut seen = [false; 4];
                let mut taken = Vec::new();
                let mut rest = VecDeque::with_capacity(queue.len());
                for update in queue.drain(..) {
                    let slot = &mut seen[update.side.index()];
                    if *slot {
                        rest.push_back(update);
                    } else {
                        *slot = true;
                        taken.push(update);
                    }
                }
                *queue = rest;
                taken
            }
        };

        if queue.is_empty() {
            self.waiting.remove(key);
        }
        taken
    }

    /// Number of updates parked for `key`.
    pub fn pending(&self, key: &TileKey) -> usize {
        self.waiting.get(key).map_or(0, VecDeque::len)
    }

    /// Updates parked across all keys.
    pub fn waiting_total(&self) -> usize {
        self.waiting.values().map(VecDeque::len).sum()
    }

    pub fn running_len(&self) -> usize {
        self.running.len()
    }

    /// Ids still in flight, lowest first.
    pub fn in_flight_ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<_> = self.in_flight.keys().copied().collect();
        ids.sort();
        ids
    }
}
