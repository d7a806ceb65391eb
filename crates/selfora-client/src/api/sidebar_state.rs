use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Persisted sidebar convenience state: the workspace last shown and which
/// pages were expanded. Losing this file only loses UI state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SidebarState {
    pub workspace_id: Option<String>,
    pub expanded: Vec<String>,
}

impl SidebarState {
    /// Get the path to the sidebar state file
    fn state_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("selfora");

        fs::create_dir_all(&config_dir)
            .context("Could not create config directory")?;

        Ok(config_dir.join("sidebar.json"))
    }

    /// Load sidebar state from disk
    pub fn load() -> Result<Self> {
        let path = Self::state_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .context("Could not read sidebar state file")?;

        let state: Self = serde_json::from_str(&contents)
            .context("Could not parse sidebar state file")?;

        Ok(state)
    }

    /// Save sidebar state to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::state_path()?;
        let contents = serde_json::to_string_pretty(self)
            .context("Could not serialize sidebar state")?;

        fs::write(&path, contents)
            .context("Could not write sidebar state file")?;

        Ok(())
    }
}
