use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_CONFIG: &str = "authdb-convert.yaml";

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    pub dry_run: Option<bool>,
    pub busy_timeout_ms: Option<u64>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub convert: Option<ConvertConfig>,
}

pub fn load_config(path: Option<&Path>) -> Option<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG);
            if p.exists() { p.to_path_buf() } else { return None; }
        }
    };
    let s = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read config, ignoring");
            return None;
        }
    };
    parse_config(&s)
        .map_err(|e| warn!(path = %path.display(), error = %e, "malformed config, ignoring"))
        .ok()
}

pub fn parse_config(s: &str) -> Result<Config, serde_yaml::Error> {
    serde_yaml::from_str(s)
}
