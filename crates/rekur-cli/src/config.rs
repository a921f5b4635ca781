use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use rekur_core::config::SchedulerConfig;
use serde::Deserialize;
use uuid::Uuid;

const DEFAULT_DATABASE_PATH: &str = "rekur.db";

#[derive(Deserialize, Debug)]
pub struct Config {
    /// SQLite database file (`REKUR_DATABASE_PATH`)
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Account whose tasks this CLI manages (`REKUR_OWNER_ID`)
    #[serde(default)]
    pub owner_id: Uuid,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

impl Config {
    /// Loads `rekur.toml` from the working directory, overridden by `REKUR_*`
    /// environment variables (`REKUR_SCHEDULER__TIMEZONE` for nested keys).
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file("rekur.toml"))
            .merge(Env::prefixed("REKUR_").split("__"))
    }
}
