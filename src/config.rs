//! Profile-backed configuration for the annotator: tier overrides, density
//! preset, circuit-breaker parameters, and the target-rating used by the
//! human-move-model collaborator.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{CIRCUIT_FAILURE_THRESHOLD, CIRCUIT_RESET_TIMEOUT_SECS, CIRCUIT_SUCCESS_THRESHOLD};
use crate::intent::Density;

const PROFILES_DIR: &str = "profiles";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub reset_timeout_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: CIRCUIT_FAILURE_THRESHOLD,
            success_threshold: CIRCUIT_SUCCESS_THRESHOLD,
            reset_timeout_secs: CIRCUIT_RESET_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    pub density: Density,
    pub annotate_all: bool,
    pub skip_llm: bool,
    pub target_rating: u32,
    pub circuit_breaker: CircuitBreakerConfig,
    pub max_tool_calls: Option<u32>,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            density: Density::Normal,
            annotate_all: false,
            skip_llm: false,
            target_rating: 1500,
            circuit_breaker: CircuitBreakerConfig::default(),
            max_tool_calls: None,
        }
    }
}

fn profiles_dir() -> PathBuf {
    PathBuf::from(PROFILES_DIR)
}

pub fn save_profile(name: &str, config: &AnnotatorConfig) -> io::Result<()> {
    let dir = profiles_dir();
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{name}.json"));
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}

pub fn load_profile(name: &str) -> io::Result<AnnotatorConfig> {
    let path = profiles_dir().join(format!("{name}.json"));
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(io::Error::from)
}

pub fn get_profiles() -> io::Result<Vec<String>> {
    let dir = profiles_dir();
    if !Path::new(&dir).exists() {
        return Ok(Vec::new());
    }
    let mut profiles = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                profiles.push(stem.to_string());
            }
        }
    }
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_profile() {
        let dir = tempfile::tempdir().unwrap();
        let orig_cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let cfg = AnnotatorConfig {
            density: Density::Verbose,
            ..Default::default()
        };
        save_profile("test", &cfg).unwrap();
        let loaded = load_profile("test").unwrap();
        assert_eq!(loaded.density, cfg.density);
        assert!(get_profiles().unwrap().contains(&"test".to_string()));

        std::env::set_current_dir(orig_cwd).unwrap();
    }
}
