//! Config file discovery
//!
//! Every service reads an optional TOML file. The search order is shared so
//! the binaries behave the same way:
//!
//! 1. The path named by the service's env var (e.g. `REMOTE_SHELL_CONFIG`)
//! 2. `./<stem>.toml`
//! 3. `$XDG_CONFIG_HOME/<stem>/config.toml`
//! 4. `~/.<stem>.toml`
//! 5. `T::default()` if none is found

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;

/// Load config from an explicit path, failing if it is missing or invalid
pub fn load_config_from<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Load config from the standard locations, falling back to defaults
pub fn load_config<T>(env_var: &str, stem: &str) -> T
where
    T: DeserializeOwned + Default,
{
    for path in candidate_paths(env_var, stem) {
        if !path.exists() {
            continue;
        }
        match load_config_from::<T>(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                return config;
            }
            Err(e) => {
                tracing::warn!("Skipping config {}: {:#}", path.display(), e);
            }
        }
    }

    tracing::info!("Using default configuration");
    T::default()
}

/// Candidate config paths in search order
pub fn candidate_paths(env_var: &str, stem: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var(env_var) {
        let path = PathBuf::from(&env_path);
        if !path.exists() {
            tracing::warn!("{}={} does not exist", env_var, env_path);
        }
        paths.push(path);
    }

    paths.push(PathBuf::from(format!("{}.toml", stem)));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(stem).join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(format!(".{}.toml", stem)));
    }

    paths
}
