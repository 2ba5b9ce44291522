//! Service configuration read from the environment.

use thiserror::Error;
use crate::media::CloudinaryCredentials;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("incomplete Cloudinary settings, missing {0}")]
    PartialCloudinary(&'static str),
}

#[derive(Clone)]
pub struct AppConfig {
    /// `None` runs the catalog from memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    pub log_level: String,
    pub cloudinary: Option<CloudinaryCredentials>,
    pub media_folder: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url.as_ref().map(|_| "[redacted]"))
            .field("db_max_connections", &self.db_max_connections)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("cloudinary", &self.cloudinary)
            .field("media_folder", &self.media_folder)
            .finish()
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid { name, reason: e.to_string() }),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cloudinary = match (get("CLOUDINARY_CLOUD_NAME"), get("CLOUDINARY_API_KEY"), get("CLOUDINARY_API_SECRET")) {
            (None, None, None) => None,
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryCredentials { cloud_name, api_key, api_secret }),
            (None, _, _) => return Err(ConfigError::PartialCloudinary("CLOUDINARY_CLOUD_NAME")),
            (_, None, _) => return Err(ConfigError::PartialCloudinary("CLOUDINARY_API_KEY")),
            (_, _, None) => return Err(ConfigError::PartialCloudinary("CLOUDINARY_API_SECRET")),
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            db_max_connections: parse("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 10)?,
            port: parse("PORT", get("PORT"), 8083)?,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            cloudinary,
            media_folder: get("MEDIA_FOLDER").unwrap_or_else(|| "olas-accessories/products".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.port, 8083);
        assert_eq!(c.db_max_connections, 10);
        assert_eq!(c.log_level, "info");
        assert!(c.database_url.is_none());
        assert!(c.cloudinary.is_none());
        assert_eq!(c.media_folder, "olas-accessories/products");
    }

    #[test]
    fn test_invalid_port() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn test_partial_cloudinary_rejected() {
        let err = config(&[("CLOUDINARY_CLOUD_NAME", "shop"), ("CLOUDINARY_API_KEY", "k")]).unwrap_err();
        assert_eq!(err, ConfigError::PartialCloudinary("CLOUDINARY_API_SECRET"));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let c = config(&[("DATABASE_URL", "postgres://user:pw@db/shop")]).unwrap();
        assert!(!format!("{c:?}").contains("pw@db"));
    }
}
