//! Configuration module

use std::env;
use std::path::PathBuf;

use agv_health_core::constants;

/// Models served when `MODELS` is unset
pub const DEFAULT_MODELS: &str = "mpc_200,wheel_problems";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Base directory of model artifacts and manifests
    pub model_dir: PathBuf,

    /// Manifest names to load at startup
    pub models: Vec<String>,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            model_dir: constants::get_model_dir(),

            models: parse_models(
                &env::var("MODELS").unwrap_or_else(|_| DEFAULT_MODELS.to_string()),
            ),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Comma-separated list; blanks and repeats dropped
fn parse_models(raw: &str) -> Vec<String> {
    let mut models: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !models.iter().any(|m| m == name) {
            models.push(name.to_string());
        }
    }
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_models() {
        assert_eq!(parse_models(DEFAULT_MODELS), vec!["mpc_200", "wheel_problems"]);
        assert_eq!(parse_models(" a, ,b,a "), vec!["a", "b"]);
        assert!(parse_models("").is_empty());
    }
}
