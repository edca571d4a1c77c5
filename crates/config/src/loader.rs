use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::schema::VaultConfig;

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "agentic-vault.toml",
    "agentic-vault.yaml",
    "agentic-vault.yml",
    "agentic-vault.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<VaultConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./agentic-vault.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/agentic-vault/agentic-vault.{toml,yaml,yml,json}` (user-global)
///
/// Returns `VaultConfig::default()` if no config file is found.
pub fn discover_and_load() -> VaultConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    VaultConfig::default()
}

/// Load an explicitly requested config file, or fall back to discovery.
///
/// Unlike discovery, an explicit path that cannot be read or parsed is an error.
pub fn load_or_discover(explicit: Option<&Path>) -> anyhow::Result<VaultConfig> {
    match explicit {
        Some(path) => load_config(path),
        None => Ok(discover_and_load()),
    }
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/agentic-vault/
    if let Some(config_dir) = config_dir() {
        for name in CONFIG_FILENAMES {
            let p = config_dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Returns the user-global config directory (`~/.config/agentic-vault/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "agentic-vault").map(|d| d.config_dir().to_path_buf())
}

/// Resolve the home directory that target skill directories live under.
pub fn home_dir(override_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("could not determine the home directory"))
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<VaultConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
