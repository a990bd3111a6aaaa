//! Level progression rules.
//!
//! One engine serves both topologies, parameterized by the ordered level
//! list and the sequential flag. Sequential processes hold exactly one
//! level open at a time; parallel processes open every level from entry
//! and complete only when all of them have approved. Rejection is handled
//! upstream in the instance: one rejection at any open level is terminal
//! for the whole process regardless of topology.

use serde::{Deserialize, Serialize};

use crate::value_objects::LevelId;

/// Outcome of recording an approval on an open level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Progress {
    /// Every configured level has now approved; the process is complete.
    Complete,

    /// Sequential topology: the approval unlocked the next level.
    Advanced(LevelId),

    /// Parallel topology: the approval was recorded but other levels are
    /// still awaiting a decision.
    AwaitingOthers,
}

/// View of a process's configured levels and topology.
#[derive(Debug, Clone, Copy)]
pub struct LevelTopology<'a> {
    levels: &'a [LevelId],
    sequential: bool,
}

impl<'a> LevelTopology<'a> {
    /// Creates a topology view over an ordered level list.
    pub fn new(levels: &'a [LevelId], sequential: bool) -> Self {
        Self { levels, sequential }
    }

    /// Returns the levels currently awaiting a decision.
    ///
    /// `current` is the sequential cursor; it is ignored for parallel
    /// topologies.
    pub fn open_levels(&self, approved: &[LevelId], current: Option<LevelId>) -> Vec<LevelId> {
        if self.sequential {
            current.into_iter().collect()
        } else {
            self.levels
                .iter()
                .filter(|level| !approved.contains(level))
                .copied()
                .collect()
        }
    }

    /// Returns true if `level` is currently open for a decision.
    pub fn is_open(&self, approved: &[LevelId], current: Option<LevelId>, level: LevelId) -> bool {
        if self.sequential {
            current == Some(level)
        } else {
            self.levels.contains(&level) && !approved.contains(&level)
        }
    }

    /// Computes the effect of approving `level`.
    ///
    /// `approved` is the set of approvals recorded before this one; the
    /// caller must have already checked that `level` is open.
    pub fn record_approval(&self, approved: &[LevelId], level: LevelId) -> Progress {
        if self.sequential {
            match self.levels.iter().position(|l| *l == level) {
                Some(pos) if pos + 1 < self.levels.len() => Progress::Advanced(self.levels[pos + 1]),
                _ => Progress::Complete,
            }
        } else if approved.len() + 1 >= self.levels.len() {
            Progress::Complete
        } else {
            Progress::AwaitingOthers
        }
    }
}
