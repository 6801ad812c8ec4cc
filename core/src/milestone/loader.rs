//! Milestone definition loading
//!
//! Milestone files are TOML documents with an optional `[encounter]`
//! header followed by `[[milestone]]` entries:
//!
//! ```toml
//! [encounter]
//! name = "The Epic of Alexander (Ultimate)"
//! zone_id = 887
//!
//! [[milestone]]
//! type = "ability"
//! index = 0
//! label = "Living Liquid"
//! ability_ids = [18864]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use progchart_types::DEFAULT_ZONE_ID;
use serde::{Deserialize, Serialize};

use super::{MilestoneDefinition, MilestoneError, MilestoneSet};

const BUILTIN_TEA: &str = include_str!("builtin/the_epic_of_alexander.toml");
const BUILTIN_ORIGIN: &str = "<builtin>";

/// Encounter metadata for a milestone file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncounterHeader {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encounter_id: Option<u32>,
}

/// Root structure of a milestone file (TOML)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilestoneFile {
    #[serde(default)]
    pub encounter: Option<EncounterHeader>,

    #[serde(default, rename = "milestone")]
    pub milestones: Vec<MilestoneDefinition>,
}

/// A validated milestone set plus the header it was declared with
#[derive(Debug, Clone)]
pub struct LoadedMilestones {
    pub encounter: Option<EncounterHeader>,
    pub set: MilestoneSet,
    pub origin: PathBuf,
}

impl LoadedMilestones {
    /// Zone to fetch: the configured one, else the file header's, else the
    /// default zone.
    pub fn zone_id(&self, configured: Option<u32>) -> u32 {
        configured
            .or_else(|| self.encounter.as_ref().and_then(|e| e.zone_id))
            .unwrap_or(DEFAULT_ZONE_ID)
    }

    /// Encounter filter: the configured one, else the file header's.
    pub fn encounter_id(&self, configured: Option<u32>) -> Option<u32> {
        configured.or_else(|| self.encounter.as_ref().and_then(|e| e.encounter_id))
    }
}

/// Parse and validate milestone definitions from TOML text.
///
/// `origin` only labels errors and log lines.
pub fn parse_milestones(
    content: &str,
    origin: &Path,
) -> Result<LoadedMilestones, MilestoneError> {
    let file: MilestoneFile =
        toml::from_str(content).map_err(|source| MilestoneError::ParseToml {
            path: origin.to_path_buf(),
            source,
        })?;

    let set = MilestoneSet::new(file.milestones).map_err(|source| MilestoneError::Invalid {
        path: origin.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        origin = %origin.display(),
        milestones = set.len(),
        "Parsed milestone definitions"
    );

    Ok(LoadedMilestones {
        encounter: file.encounter,
        set,
        origin: origin.to_path_buf(),
    })
}

pub fn load_milestones_from_file(path: &Path) -> Result<LoadedMilestones, MilestoneError> {
    let content = fs::read_to_string(path).map_err(|source| MilestoneError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_milestones(&content, path)
}

/// The bundled definitions for The Epic of Alexander (Ultimate).
pub fn builtin_milestones() -> Result<LoadedMilestones, MilestoneError> {
    parse_milestones(BUILTIN_TEA, Path::new(BUILTIN_ORIGIN))
}

/// Load from `path` when given, otherwise fall back to the bundled set.
pub fn load_milestones(path: Option<&Path>) -> Result<LoadedMilestones, MilestoneError> {
    let loaded = match path {
        Some(path) => load_milestones_from_file(path)?,
        None => builtin_milestones()?,
    };

    tracing::info!(
        origin = %loaded.origin.display(),
        encounter = loaded
            .encounter
            .as_ref()
            .map(|e| e.name.as_str())
            .unwrap_or("-"),
        milestones = loaded.set.len(),
        "Loaded milestone definitions"
    );

    Ok(loaded)
}
