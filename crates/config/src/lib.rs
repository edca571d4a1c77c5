//! Configuration loading and built-in defaults.
//!
//! Config files: `agentic-vault.toml`, `agentic-vault.yaml`, or `agentic-vault.json`
//! Searched in `./` then `~/.config/agentic-vault/`.
//!
//! Every table has a built-in default, so a missing config file yields the
//! stock targets, catalog, and upstream source.

pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, home_dir, load_config, load_or_discover},
    schema::{
        CatalogConfig, CategoryConfig, InstallConfig, SourceConfig, TargetConfig, TargetTable,
        ValidateConfig, VaultConfig,
    },
};
