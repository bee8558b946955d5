//! Server settings, read from `KINSHIP_*` environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;
const MAX_TOKEN_TTL_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub token_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = get("KINSHIP_DB_PATH").context("KINSHIP_DB_PATH must be set")?;
        let jwt_secret = get("KINSHIP_JWT_SECRET").context("KINSHIP_JWT_SECRET must be set")?;
        let host = get("KINSHIP_HOST").unwrap_or_else(|| DEFAULT_HOST.into());

        let port = match get("KINSHIP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("KINSHIP_PORT is not a valid port: {}", raw))?,
            None => DEFAULT_PORT,
        };

        let token_ttl_days = match get("KINSHIP_TOKEN_TTL_DAYS") {
            Some(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("KINSHIP_TOKEN_TTL_DAYS is not a number: {}", raw))?,
            None => DEFAULT_TOKEN_TTL_DAYS,
        };
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&token_ttl_days) {
            bail!(
                "KINSHIP_TOKEN_TTL_DAYS must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_DAYS,
                token_ttl_days
            );
        }

        Ok(Self {
            db_path: PathBuf::from(db_path),
            jwt_secret,
            host,
            port,
            token_ttl_days,
        })
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.token_ttl_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_keys_are_missing() {
        let config = Config::from_lookup(lookup(&[
            ("KINSHIP_DB_PATH", "/tmp/kinship.db"),
            ("KINSHIP_JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/kinship.db"));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.token_ttl(), chrono::Duration::days(30));
    }

    #[test]
    fn required_keys_must_be_present_and_non_empty() {
        assert!(Config::from_lookup(lookup(&[("KINSHIP_JWT_SECRET", "secret")])).is_err());
        assert!(
            Config::from_lookup(lookup(&[
                ("KINSHIP_DB_PATH", "kinship.db"),
                ("KINSHIP_JWT_SECRET", "  "),
            ]))
            .is_err()
        );
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = Config::from_lookup(lookup(&[
            ("KINSHIP_DB_PATH", "kinship.db"),
            ("KINSHIP_JWT_SECRET", "secret"),
            ("KINSHIP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("KINSHIP_PORT"));

        assert!(
            Config::from_lookup(lookup(&[
                ("KINSHIP_DB_PATH", "kinship.db"),
                ("KINSHIP_JWT_SECRET", "secret"),
                ("KINSHIP_TOKEN_TTL_DAYS", "0"),
            ]))
            .is_err()
        );
    }

    #[test]
    fn token_ttl_is_bounded() {
        let with_ttl = |days: &str| {
            Config::from_lookup(lookup(&[
                ("KINSHIP_DB_PATH", "kinship.db"),
                ("KINSHIP_JWT_SECRET", "secret"),
                ("KINSHIP_TOKEN_TTL_DAYS", days),
            ]))
        };

        assert_eq!(with_ttl("3650").unwrap().token_ttl(), chrono::Duration::days(3650));
        let err = with_ttl("3651").unwrap_err();
        assert!(err.to_string().contains("KINSHIP_TOKEN_TTL_DAYS"));
        assert!(with_ttl("100000000").is_err());
        assert!(with_ttl(&i64::MAX.to_string()).is_err());
        assert!(with_ttl("-1").is_err());
    }

    #[test]
    fn overrides_are_used() {
        let config = Config::from_lookup(lookup(&[
            ("KINSHIP_DB_PATH", "kinship.db"),
            ("KINSHIP_JWT_SECRET", "secret"),
            ("KINSHIP_HOST", "127.0.0.1"),
            ("KINSHIP_PORT", "8080"),
            ("KINSHIP_TOKEN_TTL_DAYS", "7"),
        ]))
        .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.token_ttl_days, 7);
    }
}
