//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PactError, PactResult};

use super::types::{Config, StorageBackend};

pub const PROJECT_CONFIG_FILE: &str = "pactline.toml";
pub const ENV_STORE: &str = "PACTLINE_STORE";
pub const ENV_LOCK_TIMEOUT_MS: &str = "PACTLINE_LOCK_TIMEOUT_MS";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A key the config schema does not know
    UnknownKey {
        key: String,
        file: PathBuf,
        line: Option<usize>,
        suggestion: Option<String>,
    },
    /// An environment variable with an unusable value; it was ignored
    InvalidEnv {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::UnknownKey {
                key,
                file,
                line,
                suggestion,
            } => {
                write!(f, "unknown config key '{}' in {}", key, file.display())?;
                if let Some(line) = line {
                    write!(f, ":{}", line)?;
                }
                if let Some(suggestion) = suggestion {
                    write!(f, " (did you mean '{}'?)", suggestion)?;
                }
                Ok(())
            }
            ConfigWarning::InvalidEnv {
                var,
                value,
                expected,
            } => write!(f, "ignoring {}='{}': expected {}", var, value, expected),
        }
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> PactResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| PactError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| PactError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .rsplit('.')
                .next()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning::UnknownKey {
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Resolve the config file to use, load it and apply environment overrides
///
/// An explicit path must exist. Otherwise `./pactline.toml` wins over
/// `<config_dir>/pactline/config.toml`; with neither present the defaults
/// are used.
pub fn discover(explicit: Option<&Path>) -> PactResult<(Config, Vec<ConfigWarning>)> {
    let candidate = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => [Some(PathBuf::from(PROJECT_CONFIG_FILE)), user_config_path()]
            .into_iter()
            .flatten()
            .find(|p| p.is_file()),
    };

    let (config, mut warnings) = match candidate {
        Some(path) => load_with_warnings(&path)?,
        None => (Config::default(), Vec::new()),
    };
    let (config, env_warnings) = with_env_overrides(config, |name| std::env::var(name).ok());
    warnings.extend(env_warnings);
    Ok((config, warnings))
}

/// Apply environment variable overrides (PACTLINE_* prefix)
///
/// `PACTLINE_STORE` is either `memory` or a ledger file path.
pub fn with_env_overrides(
    mut config: Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> (Config, Vec<ConfigWarning>) {
    let mut warnings = Vec::new();

    if let Some(store) = lookup(ENV_STORE).filter(|s| !s.trim().is_empty()) {
        apply_store(&mut config, &store);
    }

    if let Some(raw) = lookup(ENV_LOCK_TIMEOUT_MS) {
        match raw.trim().parse::<u64>() {
            Ok(ms) => config.locking.timeout_ms = ms,
            Err(_) => warnings.push(ConfigWarning::InvalidEnv {
                var: ENV_LOCK_TIMEOUT_MS,
                value: raw,
                expected: "a whole number of milliseconds",
            }),
        }
    }

    (config, warnings)
}

/// Interpret a `--store` / `PACTLINE_STORE` value
pub fn apply_store(config: &mut Config, store: &str) {
    let store = store.trim();
    if store.eq_ignore_ascii_case("memory") {
        config.storage.backend = StorageBackend::Memory;
    } else {
        config.storage.backend = StorageBackend::Toml;
        config.storage.path = Some(PathBuf::from(store));
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pactline").join("config.toml"))
}

pub fn default_ledger_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("pactline").join("ledger.toml"))
        .unwrap_or_else(|| PathBuf::from("pactline-ledger.toml"))
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.trim_start().starts_with(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "storage",
        "backend",
        "path",
        "locking",
        "timeout_ms",
        "logging",
        "level",
    ];

    CANDIDATES
        .iter()
        .map(|candidate| (*candidate, edit_distance(unknown, candidate)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= 2)
        .map(|(candidate, _)| candidate.to_string())
}

/// Levenshtein distance over chars
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for (i, ac) in a.chars().enumerate() {
        let mut curr = Vec::with_capacity(b.len() + 1);
        curr.push(i + 1);
        for (j, bc) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ac != *bc);
            curr.push(substitution.min(prev[j + 1] + 1).min(curr[j] + 1));
        }
        prev = curr;
    }

    prev[b.len()]
}
