//! Configuration module for Pactline
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (PACTLINE_*)
//! 3. `--config <file>`, `./pactline.toml`, or `<config_dir>/pactline/config.toml`
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{
    apply_store, default_ledger_path, user_config_path, ConfigWarning, ENV_LOCK_TIMEOUT_MS,
    ENV_STORE, PROJECT_CONFIG_FILE,
};
pub use types::{Config, LockingConfig, LoggingConfig, StorageBackend, StorageConfig};
