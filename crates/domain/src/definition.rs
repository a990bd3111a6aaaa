//! Approval process templates.

use serde::{Deserialize, Serialize};

use crate::error::ProcessError;
use crate::value_objects::{LevelId, ProcessId};

/// The approval configuration a `ProcessId` resolves to: which levels
/// exist, their order, and the topology they open in.
///
/// Sequential processes open exactly one level at a time, in the configured
/// order. Parallel processes open every level at once and complete when all
/// have approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    process_id: ProcessId,
    levels: Vec<LevelId>,
    sequential: bool,
}

impl ProcessDefinition {
    /// Creates a definition, validating the level list.
    pub fn new(
        process_id: ProcessId,
        levels: Vec<LevelId>,
        sequential: bool,
    ) -> Result<Self, ProcessError> {
        if levels.is_empty() {
            return Err(ProcessError::EmptyDefinition);
        }
        for (i, level) in levels.iter().enumerate() {
            if levels[..i].contains(level) {
                return Err(ProcessError::DuplicateLevel(*level));
            }
        }
        Ok(Self {
            process_id,
            levels,
            sequential,
        })
    }

    /// Creates a sequential definition.
    pub fn sequential(process_id: ProcessId, levels: Vec<LevelId>) -> Result<Self, ProcessError> {
        Self::new(process_id, levels, true)
    }

    /// Creates a parallel definition.
    pub fn parallel(process_id: ProcessId, levels: Vec<LevelId>) -> Result<Self, ProcessError> {
        Self::new(process_id, levels, false)
    }

    /// Returns the process ID this definition belongs to.
    pub fn process_id(&self) -> ProcessId {
        self.process_id
    }

    /// Returns the configured levels in order.
    pub fn levels(&self) -> &[LevelId] {
        &self.levels
    }

    /// Returns true if levels must be approved in order.
    pub fn is_sequential(&self) -> bool {
        self.sequential
    }

    /// Returns the first level of a sequential process.
    pub fn first_level(&self) -> LevelId {
        self.levels[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(ids: &[i32]) -> Vec<LevelId> {
        ids.iter().map(|&i| LevelId::new(i)).collect()
    }

    #[test]
    fn sequential_definition() {
        let def = ProcessDefinition::sequential(ProcessId::new(1), levels(&[10, 20, 30])).unwrap();
        assert!(def.is_sequential());
        assert_eq!(def.levels().len(), 3);
        assert_eq!(def.first_level(), LevelId::new(10));
    }

    #[test]
    fn parallel_definition() {
        let def = ProcessDefinition::parallel(ProcessId::new(1), levels(&[10, 20])).unwrap();
        assert!(!def.is_sequential());
    }

    #[test]
    fn empty_levels_rejected() {
        let result = ProcessDefinition::sequential(ProcessId::new(1), vec![]);
        assert!(matches!(result, Err(ProcessError::EmptyDefinition)));
    }

    #[test]
    fn duplicate_levels_rejected() {
        let result = ProcessDefinition::parallel(ProcessId::new(1), levels(&[10, 20, 10]));
        assert!(matches!(
            result,
            Err(ProcessError::DuplicateLevel(level)) if level == LevelId::new(10)
        ));
    }

    #[test]
    fn serialization_roundtrip() {
        let def = ProcessDefinition::sequential(ProcessId::new(4), levels(&[1, 2])).unwrap();
        let json = serde_json::to_string(&def).unwrap();
        let back: ProcessDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(def, back);
    }
}
