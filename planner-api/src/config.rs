use std::{str::FromStr, time::Duration};

use serde::Deserialize;
use serde_with::serde_as;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use strum::{Display, EnumString};

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub seed: SeedSettings,
}

#[serde_as]
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
    /// Origin of the web client, used for CORS.
    pub app_url: String,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

#[serde_as]
#[derive(Deserialize, Clone)]
pub struct AuthSettings {
    /// Base64-encoded 32 byte key used to seal session tokens.
    pub token_key: String,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default = "default_allow_registration")]
    pub allow_registration: bool,
}

#[derive(Deserialize, Clone, Default)]
pub struct SeedSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub projects: Vec<SeedProject>,
}

#[derive(Deserialize, Clone)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Deserialize, Clone)]
pub struct SeedProject {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_allow_registration() -> bool {
    true
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to determine the current directory: {0}")]
    CurrentDir(#[from] std::io::Error),
    #[error("invalid APP_ENVIRONMENT '{0}', expected 'local' or 'production'")]
    Environment(String),
    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

pub fn read_config() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()?;
    let config_directory = base_path.join("config");

    let raw_environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".into());
    let environment = Environment::from_str(&raw_environment)
        .map_err(|_| ConfigError::Environment(raw_environment.clone()))?;
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")))
        .add_source(config::File::from(
            config_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("PLANNER")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<Settings>()?)
}

#[derive(Display, Debug, EnumString, PartialEq, Eq)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!(Environment::from_str("LOCAL").unwrap(), Environment::Local);
        assert_eq!(
            Environment::from_str("Production").unwrap(),
            Environment::Production
        );
        assert!(Environment::from_str("staging").is_err());
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
application:
  port: 8080
  host: 127.0.0.1
  app_url: http://localhost:5173
database:
  username: postgres
  password: password
  port: 5432
  host: localhost
  database_name: planner
  require_ssl: false
auth:
  token_key: AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=
"#,
                config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap();

        assert_eq!(settings.database.max_connections, 10);
        assert_eq!(settings.auth.token_ttl_hours, 24);
        assert!(settings.auth.allow_registration);
        assert!(!settings.seed.enabled);
        assert!(settings.seed.users.is_empty());
    }
}
