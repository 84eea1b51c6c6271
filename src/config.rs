//! Process configuration loaded from environment variables.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::ConfigError;

/// Runtime settings, read once at start-up.
///
/// All fields have defaults suitable for local development.
///
/// | Env var              | Default                       |
/// |----------------------|-------------------------------|
/// | `HOST`               | `0.0.0.0`                     |
/// | `PORT`               | `8080`                        |
/// | `DATABASE_URL`       | `postgres://localhost/garagem`|
/// | `DB_MAX_CONNECTIONS` | `5`                           |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_var("PORT", 8080)?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/garagem".into()),
            max_connections: parsed_var("DB_MAX_CONNECTIONS", 5)?,
        })
    }
}

fn parsed_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var state is process-global, so these tests touch only variables
    // no other test reads.

    #[test]
    fn missing_var_falls_back_to_default() {
        env::remove_var("GARAGEM_TEST_PORT");
        let port: u16 = parsed_var("GARAGEM_TEST_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn set_var_is_parsed() {
        env::set_var("GARAGEM_TEST_MAX", "17");
        let max: u32 = parsed_var("GARAGEM_TEST_MAX", 5).unwrap();
        assert_eq!(max, 17);
    }

    #[test]
    fn unparsable_var_is_reported_by_name() {
        env::set_var("GARAGEM_TEST_BAD", "not-a-number");
        let err = parsed_var::<u16>("GARAGEM_TEST_BAD", 1).unwrap_err();
        assert!(err.to_string().contains("GARAGEM_TEST_BAD"));
    }
}
