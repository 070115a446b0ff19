use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one submitted tile computation.
///
/// Ids are 1-based and handed out in strictly increasing order by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// The first id of a run.
    pub const FIRST: TaskId = TaskId(1);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_one_based_and_increasing() {
        let a = TaskId::FIRST;
        let b = a.next();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert!(a < b);
        assert_eq!(b.to_string(), "2");
    }
}
