//! Project configuration (§6 "Project configuration file"): an optional
//! `juno.toml` at the project root, parsed into `Config`. Unlike the
//! teacher's hand-built `settings::Config` (a large struct populated by
//! `create_new_project`'s HTML-project scaffolding, never read from disk),
//! this one is read from a real file via the `toml` crate — there is no
//! `juno.toml` precedent in the teacher or the original source, so the two
//! tables below are designed directly from §6's wording.

use crate::compiler_messages::CompilerError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "juno.toml";
pub const DEFAULT_ENTRY_FILE: &str = "main.juno";
pub const DEFAULT_CACHE_DIR: &str = "__cache__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub entry: PathBuf,
    pub out: Option<String>,
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            entry: PathBuf::from(DEFAULT_ENTRY_FILE),
            out: None,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    entry: Option<RawEntry>,
    build: Option<RawBuild>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBuild {
    out: Option<String>,
    cache_dir: Option<String>,
}

impl Config {
    /// Loads `<project_root>/juno.toml`, falling back to `Config::default()`
    /// for any table the file omits, or entirely if the file itself is
    /// absent — a missing config file is not an error.
    pub fn load(project_root: &Path) -> Result<Config, CompilerError> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Config::default());
        }

        let text = std::fs::read_to_string(&path)
            .map_err(|e| CompilerError::file(format!("cannot read '{}': {e}", path.display()), path.clone()))?;
        let raw: RawConfig =
            toml::from_str(&text).map_err(|e| CompilerError::config(format!("malformed '{}': {e}", path.display()), path.clone()))?;

        let mut config = Config::default();
        if let Some(entry_path) = raw.entry.and_then(|entry| entry.path) {
            config.entry = PathBuf::from(entry_path);
        }
        if let Some(build) = raw.build {
            config.out = build.out;
            if let Some(cache_dir) = build.cache_dir {
                config.cache_dir = PathBuf::from(cache_dir);
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_config_fills_in_remaining_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[entry]\npath = \"src/app.juno\"\n").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.entry, PathBuf::from("src/app.juno"));
        assert_eq!(config.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));
        assert_eq!(config.out, None);
    }

    #[test]
    fn full_config_overrides_every_default() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[entry]\npath = \"src/app.juno\"\n[build]\nout = \"app\"\ncache_dir = \"build\"\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.entry, PathBuf::from("src/app.juno"));
        assert_eq!(config.out, Some("app".to_string()));
        assert_eq!(config.cache_dir, PathBuf::from("build"));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[entry\n").unwrap();
        let error = Config::load(dir.path()).unwrap_err();
        assert_eq!(error.error_type, crate::compiler_messages::ErrorType::Config);
    }
}
