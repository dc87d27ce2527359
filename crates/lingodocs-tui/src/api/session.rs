use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Optional bearer token for deployments that put the API behind a proxy
/// requiring one. The file is provisioned out of band; the server itself
/// enforces nothing, and a 401 from a proxy clears this session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
}

impl Session {
    /// Get the path to the session file
    fn session_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("lingodocs");

        fs::create_dir_all(&config_dir)
            .context("Could not create config directory")?;

        Ok(config_dir.join("session.json"))
    }

    /// Load the session from disk
    pub fn load() -> Result<Option<Self>> {
        let path = Self::session_path()?;

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .context("Could not read session file")?;

        let session: Self = serde_json::from_str(&contents)
            .context("Could not parse session file")?;

        Ok(Some(session))
    }

    /// Delete the stored session
    pub fn delete() -> Result<()> {
        let path = Self::session_path()?;

        if path.exists() {
            fs::remove_file(&path)
                .context("Could not delete session file")?;
        }

        Ok(())
    }
}
