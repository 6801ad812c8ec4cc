//! Validated milestone collections

use crate::context::ConfigError;

use super::MilestoneDefinition;

/// An index-ordered set of milestone definitions.
///
/// Construction enforces the invariants the evaluator relies on:
/// indices are unique, and a victory milestone is the deepest one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MilestoneSet {
    /// Sorted by ascending index
    definitions: Vec<MilestoneDefinition>,
}

impl MilestoneSet {
    pub fn new(mut definitions: Vec<MilestoneDefinition>) -> Result<Self, ConfigError> {
        definitions.sort_by_key(MilestoneDefinition::index);

        for pair in definitions.windows(2) {
            if pair[0].index() == pair[1].index() {
                return Err(ConfigError::DuplicateMilestoneIndex {
                    index: pair[0].index(),
                    first: pair[0].label().to_string(),
                    second: pair[1].label().to_string(),
                });
            }
        }

        if let Some(deepest) = definitions.last() {
            for victory in definitions.iter().filter(|d| d.is_victory()) {
                if victory.index() != deepest.index() {
                    return Err(ConfigError::VictoryNotDeepest {
                        label: victory.label().to_string(),
                        index: victory.index(),
                        deeper_label: deepest.label().to_string(),
                        deeper_index: deepest.index(),
                    });
                }
            }
        }

        Ok(Self { definitions })
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions in ascending index order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &MilestoneDefinition> {
        self.definitions.iter()
    }

    /// Definitions from the deepest milestone to the shallowest.
    pub fn deepest_first(&self) -> impl Iterator<Item = &MilestoneDefinition> {
        self.definitions.iter().rev()
    }

    pub fn get(&self, index: u32) -> Option<&MilestoneDefinition> {
        self.definitions
            .binary_search_by_key(&index, MilestoneDefinition::index)
            .ok()
            .map(|pos| &self.definitions[pos])
    }

    /// Rank of a milestone in depth order (0 = shallowest).
    ///
    /// Indices need not be contiguous, so charts use the rank as the row.
    pub fn rank(&self, index: u32) -> Option<usize> {
        self.definitions
            .binary_search_by_key(&index, MilestoneDefinition::index)
            .ok()
    }

    pub fn victory(&self) -> Option<&MilestoneDefinition> {
        self.definitions.iter().find(|d| d.is_victory())
    }
}

impl<'a> IntoIterator for &'a MilestoneSet {
    type Item = &'a MilestoneDefinition;
    type IntoIter = std::slice::Iter<'a, MilestoneDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.iter()
    }
}
