use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{RenderingError, VisualKey, VisualTable};

/// Visual manifest version understood by [`VisualTable::from_manifest_str`].
pub const SUPPORTED_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct Manifest {
    version: u32,
    #[serde(default)]
    visuals: HashMap<String, String>,
}

impl VisualTable {
    /// Parses a TOML visual manifest.
    ///
    /// The manifest holds a `version` and a `[visuals]` table mapping key
    /// names (`GrassA` or `grass_a` style) to resource identifiers. Keys may
    /// be left out; cells using them are skipped when a scene is built.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML, an unsupported version, unknown key names and
    /// two names resolving to the same key.
    pub fn from_manifest_str(contents: &str) -> Result<Self, RenderingError> {
        let manifest: Manifest = toml::from_str(contents)?;
        if manifest.version != SUPPORTED_MANIFEST_VERSION {
            return Err(RenderingError::UnsupportedVersion {
                found: manifest.version,
                expected: SUPPORTED_MANIFEST_VERSION,
            });
        }

        let mut entries: Vec<_> = manifest.visuals.into_iter().collect();
        entries.sort();

        let mut table = VisualTable::new();
        for (name, resource) in entries {
            let key = parse_visual_key(&name).ok_or(RenderingError::UnknownKey(name))?;
            if table.insert(key, resource).is_some() {
                return Err(RenderingError::DuplicateKey(key));
            }
        }
        Ok(table)
    }

    /// Reads and parses the visual manifest at `path`.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read visual manifest at {}", path.display()))?;
        Self::from_manifest_str(&contents)
            .with_context(|| format!("invalid visual manifest at {}", path.display()))
    }
}

fn parse_visual_key(name: &str) -> Option<VisualKey> {
    let normalized: String = name
        .chars()
        .filter(|character| *character != '_')
        .flat_map(char::to_lowercase)
        .collect();

    VisualKey::ALL
        .into_iter()
        .find(|key| key.name().eq_ignore_ascii_case(&normalized))
}
