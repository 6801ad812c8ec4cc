//! Game ability catalog
//!
//! Maps ability ids to names so milestone files can be authored without
//! digging through raw logs. The catalog only changes with game patches,
//! so it is fetched once and kept in its own JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::json;

use crate::cache::CacheError;

use super::queries::{ABILITIES_QUERY, AbilitiesData, AbilityEntry};
use super::{FetchError, FflogsClient};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbilityCatalog {
    abilities: BTreeMap<i64, String>,
}

impl AbilityCatalog {
    pub fn from_entries(entries: impl IntoIterator<Item = AbilityEntry>) -> Self {
        Self {
            abilities: entries.into_iter().map(|e| (e.id, e.name)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    pub fn name(&self, id: i64) -> Option<&str> {
        self.abilities.get(&id).map(String::as_str)
    }

    /// Abilities whose name contains `text` (case-insensitive), by id.
    pub fn search<'a>(&'a self, text: &str) -> impl Iterator<Item = (i64, &'a str)> + 'a {
        let needle = text.to_lowercase();
        self.abilities
            .iter()
            .filter(move |(_, name)| needle.is_empty() || name.to_lowercase().contains(&needle))
            .map(|(id, name)| (*id, name.as_str()))
    }

    /// Read a previously saved catalog. `Ok(None)` when the file does not
    /// exist or no longer parses.
    pub fn load(path: &Path) -> Result<Option<Self>, CacheError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        match serde_json::from_str::<Vec<AbilityEntry>>(&content) {
            Ok(entries) => Ok(Some(Self::from_entries(entries))),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring unreadable ability catalog"
                );
                Ok(None)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let entries: Vec<AbilityEntry> = self
            .abilities
            .iter()
            .map(|(id, name)| AbilityEntry {
                id: *id,
                name: name.clone(),
            })
            .collect();
        let content = serde_json::to_string(&entries).map_err(|source| CacheError::Serialize {
            key: "abilities".to_string(),
            source,
        })?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| CacheError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, content).map_err(|source| CacheError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Page through every ability known to the API.
    pub async fn fetch(client: &FflogsClient) -> Result<Self, FetchError> {
        let mut entries = Vec::new();
        let mut page = 1;

        loop {
            let data: AbilitiesData = client.query(ABILITIES_QUERY, json!({ "page": page })).await?;
            let abilities = data.game_data.abilities;
            entries.extend(abilities.data);

            if !abilities.has_more_pages {
                break;
            }
            page += 1;
        }

        tracing::info!(abilities = entries.len(), pages = page, "Fetched ability catalog");
        Ok(Self::from_entries(entries))
    }

    /// Catalog from `path`, fetching and saving it when missing.
    pub async fn load_or_fetch(path: &Path, client: &FflogsClient) -> Result<Self, FetchError> {
        if let Some(catalog) = Self::load(path)? {
            tracing::debug!(
                path = %path.display(),
                abilities = catalog.len(),
                "Using saved ability catalog"
            );
            return Ok(catalog);
        }

        let catalog = Self::fetch(client).await?;
        catalog.save(path)?;
        Ok(catalog)
    }
}
