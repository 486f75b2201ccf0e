//! Environment-driven configuration
//!
//! Read once in the binaries after `dotenv`. Defaults keep a local
//! checkout runnable with the shipped artifacts.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::orchestrator::DEFAULT_ADAPTER_BUDGET;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MODELS_DIR: &str = "models";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub models_dir: PathBuf,
    pub adapter_budget: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .or_else(|_| env::var("API_PORT"))
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let models_dir = env::var("MODELS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODELS_DIR));

        let adapter_budget = env::var("ADAPTER_BUDGET_MS")
            .ok()
            .and_then(|value| value.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_ADAPTER_BUDGET);

        Self {
            port,
            models_dir,
            adapter_budget,
        }
    }
}
