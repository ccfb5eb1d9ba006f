use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::images::{CacheConfig, FetchConfig};
use crate::layout::PlannerConfig;

const DEFAULT_INPUT: &str = "txt.txt";
const DEFAULT_OUTPUT_DIR: &str = "out";

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed numbers are startup errors.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub stack_threshold: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            input_path: env_or("DECKFIT_INPUT", DEFAULT_INPUT).into(),
            output_dir: env_or("DECKFIT_OUTPUT_DIR", DEFAULT_OUTPUT_DIR).into(),
            cache_dir: env_or("DECKFIT_CACHE_DIR", crate::images::cache::DEFAULT_CACHE_DIR).into(),
            stack_threshold: parse_or(
                "DECKFIT_STACK_THRESHOLD",
                std::env::var("DECKFIT_STACK_THRESHOLD").ok(),
                PlannerConfig::default().stack_threshold,
            )?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            directory: self.cache_dir.clone(),
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::default()
    }

    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            stack_threshold: self.stack_threshold,
            ..PlannerConfig::default()
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses `raw` when present, otherwise returns `default`.
fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{value}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            input_path: "deck.txt".into(),
            output_dir: "build".into(),
            cache_dir: "tmp-cache".into(),
            stack_threshold: 2,
            rust_log: "debug".to_string(),
        }
    }

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        assert_eq!(parse_or::<usize>("K", None, 3).unwrap(), 3);
    }

    #[test]
    fn test_parse_or_parses_trimmed_value() {
        assert_eq!(parse_or::<usize>("K", Some(" 5 ".to_string()), 3).unwrap(), 5);
    }

    #[test]
    fn test_parse_or_rejects_garbage_with_key_in_message() {
        let err = parse_or::<usize>("DECKFIT_STACK_THRESHOLD", Some("three".to_string()), 3)
            .unwrap_err();
        assert!(err.to_string().contains("DECKFIT_STACK_THRESHOLD"));
    }

    #[test]
    fn test_derived_configs_follow_settings() {
        let config = config();
        assert_eq!(config.cache_config().directory, PathBuf::from("tmp-cache"));
        assert_eq!(config.planner_config().stack_threshold, 2);
        assert_eq!(config.planner_config().slide_width, 1920.0);
        assert_eq!(config.fetch_config().max_attempts, 3);
    }
}
