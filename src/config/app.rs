// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";
pub const DEFAULT_HISTORY_PATH: &str = "research_history.json";

pub const ENV_CONFIG_PATH: &str = "RESEARCH_CONFIG_PATH";
pub const ENV_HISTORY_PATH: &str = "RESEARCH_HISTORY_PATH";
pub const ENV_DEBUG_ROUTES: &str = "DEBUG_ROUTES";

fn default_history_path() -> PathBuf {
    PathBuf::from(DEFAULT_HISTORY_PATH)
}
fn default_depth() -> i64 {
    crate::research::DEFAULT_DEPTH
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// JSON file mirroring the research history.
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    /// Depth used when a request does not carry one.
    #[serde(default = "default_depth")]
    pub default_depth: i64,
    /// Mount `/metrics` (Prometheus exposition).
    #[serde(default)]
    pub metrics_route: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            default_depth: default_depth(),
            metrics_route: false,
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&data).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    /// Resolve configuration:
    /// 1) $RESEARCH_CONFIG_PATH (must exist)
    /// 2) config/app.toml
    /// 3) built-in defaults
    ///
    /// then apply env overrides ($RESEARCH_HISTORY_PATH, DEBUG_ROUTES=1).
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };

        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(p) = env::var(ENV_HISTORY_PATH) {
            if !p.trim().is_empty() {
                self.history_path = PathBuf::from(p.trim());
            }
        }
        if env::var(ENV_DEBUG_ROUTES).ok().as_deref() == Some("1") {
            self.metrics_route = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = AppConfig::from_toml_str("default_depth = 4").unwrap();
        assert_eq!(cfg.default_depth, 4);
        assert_eq!(cfg.history_path, PathBuf::from(DEFAULT_HISTORY_PATH));
        assert!(!cfg.metrics_route);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(AppConfig::from_toml_str("default_depth = \"two\"").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn env_path_then_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("app.toml");
        fs::write(&p, "history_path = \"from_file.json\"\ndefault_depth = 3\n").unwrap();

        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        env::remove_var(ENV_HISTORY_PATH);
        env::remove_var(ENV_DEBUG_ROUTES);
        let cfg = AppConfig::load_default().unwrap();
        assert_eq!(cfg.history_path, PathBuf::from("from_file.json"));
        assert_eq!(cfg.default_depth, 3);

        env::set_var(ENV_HISTORY_PATH, "override.json");
        env::set_var(ENV_DEBUG_ROUTES, "1");
        let cfg = AppConfig::load_default().unwrap();
        assert_eq!(cfg.history_path, PathBuf::from("override.json"));
        assert!(cfg.metrics_route);

        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(AppConfig::load_default().is_err());

        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_HISTORY_PATH);
        env::remove_var(ENV_DEBUG_ROUTES);
    }
}
