//! Handles settings for the application. Values are layered: defaults, then
//! `household.toml` (or the file given with `--config`), then `HOUSEHOLD_*`
//! environment variables.
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub data_file: PathBuf,
    pub log_level: String,
    pub recent_expenses: usize,
}

impl Settings {
    pub fn new(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("household").required(false),
        };

        Config::builder()
            .set_default("data_file", "data.json")?
            .set_default("log_level", "info")?
            .set_default("recent_expenses", 20_i64)?
            .add_source(file)
            .add_source(Environment::with_prefix("HOUSEHOLD"))
            .build()?
            .try_deserialize()
    }
}
