//! JSON-file persistence for the lore store.
//!
//! A call loads the file, runs against the in-memory store and writes the
//! new state back only if the call succeeded. Writes go to a sibling temp
//! file that is renamed over the original, so a crash mid-write leaves the
//! previous state intact.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use realms_core::{LoreStore, Word};
use serde::{Deserialize, Serialize};

pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    pub version: u32,
    pub lore: LoreStore,
}

impl WorldState {
    pub fn new(admin: Word) -> Self {
        Self {
            version: STATE_VERSION,
            lore: LoreStore::new(admin),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read state file: {}", path.display()))?;
        let state: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse state file: {}", path.display()))?;
        if state.version != STATE_VERSION {
            bail!(
                "unsupported state version {} in {} (expected {STATE_VERSION})",
                state.version,
                path.display()
            );
        }
        tracing::debug!(
            path = %path.display(),
            entities = state.lore.entity_count(),
            "loaded state"
        );
        Ok(state)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).context("failed to serialize state")?;

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = Path::new(&tmp_name);

        fs::write(tmp_path, json)
            .with_context(|| format!("failed writing state: {}", tmp_path.display()))?;
        fs::rename(tmp_path, path)
            .with_context(|| format!("failed replacing state file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "saved state");
        Ok(())
    }
}

/// Load, apply `f`, and persist only when `f` succeeds.
pub fn update<T>(path: &Path, f: impl FnOnce(&mut WorldState) -> Result<T>) -> Result<T> {
    let mut state = WorldState::load(path)?;
    let out = f(&mut state)?;
    state.save(path)?;
    Ok(out)
}
