//! Milestone definition types
//!
//! A milestone is a point of progress inside an encounter. Definitions are
//! loaded from TOML and come in two kinds:
//!
//! ```toml
//! [[milestone]]
//! type = "ability"
//! index = 0
//! label = "Living Liquid"
//! ability_ids = [18864]
//! style = { color = [135, 206, 250, 255] }
//!
//! [[milestone]]
//! type = "victory"
//! index = 1
//! label = "Cleared"
//! ```

use std::collections::BTreeSet;

use progchart_types::MilestoneStyle;
use serde::{Deserialize, Serialize};

use crate::attempt::Attempt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum MilestoneDefinition {
    /// Reached when any event of the attempt carries one of `ability_ids`.
    Ability {
        index: u32,
        label: String,
        #[serde(default, alias = "abilities")]
        ability_ids: BTreeSet<i64>,
        #[serde(default)]
        style: MilestoneStyle,
    },

    /// Reached when the attempt ended in a kill.
    Victory {
        index: u32,
        label: String,
        #[serde(default)]
        style: MilestoneStyle,
    },
}

impl MilestoneDefinition {
    pub fn ability(
        index: u32,
        label: impl Into<String>,
        ability_ids: impl IntoIterator<Item = i64>,
    ) -> Self {
        MilestoneDefinition::Ability {
            index,
            label: label.into(),
            ability_ids: ability_ids.into_iter().collect(),
            style: MilestoneStyle::default(),
        }
    }

    pub fn victory(index: u32, label: impl Into<String>) -> Self {
        MilestoneDefinition::Victory {
            index,
            label: label.into(),
            style: MilestoneStyle::default(),
        }
    }

    pub fn with_style(mut self, new_style: MilestoneStyle) -> Self {
        match &mut self {
            MilestoneDefinition::Ability { style, .. }
            | MilestoneDefinition::Victory { style, .. } => {
                *style = new_style;
            }
        }
        self
    }

    pub fn index(&self) -> u32 {
        match self {
            MilestoneDefinition::Ability { index, .. }
            | MilestoneDefinition::Victory { index, .. } => *index,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            MilestoneDefinition::Ability { label, .. }
            | MilestoneDefinition::Victory { label, .. } => label,
        }
    }

    pub fn style(&self) -> &MilestoneStyle {
        match self {
            MilestoneDefinition::Ability { style, .. }
            | MilestoneDefinition::Victory { style, .. } => style,
        }
    }

    pub fn is_victory(&self) -> bool {
        matches!(self, MilestoneDefinition::Victory { .. })
    }

    /// Whether the attempt reached this milestone.
    pub fn matches(&self, attempt: &Attempt) -> bool {
        match self {
            MilestoneDefinition::Ability { ability_ids, .. } => {
                !ability_ids.is_empty() && attempt.has_any_ability(|id| ability_ids.contains(&id))
            }
            MilestoneDefinition::Victory { .. } => attempt.ended_in_kill,
        }
    }
}
