//! Process configuration, read once from the environment at startup.
//!
//! `DATABASE_URL` wins when present; otherwise the URL is assembled from the
//! `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_DATABASE` parts.

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub pool_size: u32,
    pub setup_schema: bool,
    pub port: u16,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("DB_DATABASE must be set when DATABASE_URL is not")]
    MissingDatabase,
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenvy::dotenv().ok();
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_owned());
                let port: u16 = parse(&lookup, "DB_PORT", 3306)?;
                let user = lookup("DB_USER").unwrap_or_else(|| "root".to_owned());
                let password = lookup("DB_PASSWORD").unwrap_or_default();
                let database = lookup("DB_DATABASE").ok_or(ConfigError::MissingDatabase)?;

                format!("mysql://{user}:{password}@{host}:{port}/{database}")
            }
        };

        let pool_size: u32 = parse(&lookup, "DB_POOL_SIZE", DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_POOL_SIZE",
                value: "0".to_owned(),
            });
        }

        Ok(Config {
            database_url,
            pool_size,
            setup_schema: parse(&lookup, "DB_SETUP_SCHEMA", false)?,
            port: parse(&lookup, "PORT", DEFAULT_PORT)?,
        })
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
