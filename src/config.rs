//! This module holds the configuration for the server

use std::net::IpAddr;

use actix_toolbox::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

use crate::ingest::DEFAULT_MAX_IMAGE_SIZE;
use crate::render::DisplayLocale;
use crate::repository::DEFAULT_MAX_VIEW_RETRIES;

/// Configuration regarding the server
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct ServerConfig {
    /// The address the server should bind to
    pub listen_address: IpAddr,
    /// The port the server should bind to
    pub listen_port: u16,
    /// The maximum size of a json request body in bytes.
    ///
    /// Images are uploaded base64 encoded within the request body,
    /// so this has to be larger than the sum of all images of an invitation.
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

fn default_max_request_size() -> usize {
    64 * 1024 * 1024
}

/// Configuration of the database connection
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct DatabaseConfig {
    /// The host of the database
    pub host: String,
    /// The port of the database
    pub port: u16,
    /// The name of the database
    pub name: String,
    /// The user to connect as
    pub user: String,
    /// The password of the user
    pub password: String,
}

/// Configuration of invitation handling
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct InvitationConfig {
    /// Calling code prefixed to RSVP phone numbers
    #[serde(default = "default_country_code")]
    pub country_code: String,
    /// Host of the messaging service used for RSVP links
    #[serde(default = "default_messaging_host")]
    pub messaging_host: String,
    /// Language of rendered invitations
    #[serde(default)]
    pub locale: DisplayLocale,
    /// The maximum size of a single image in bytes
    #[serde(default = "default_max_image_size")]
    pub max_image_size: usize,
    /// How often incrementing a view count is retried when viewers race
    #[serde(default = "default_max_view_retries")]
    pub max_view_retries: u32,
    /// Upper bound of invitations kept when running without a database
    #[serde(default)]
    pub memory_limit: Option<usize>,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            country_code: default_country_code(),
            messaging_host: default_messaging_host(),
            locale: DisplayLocale::default(),
            max_image_size: default_max_image_size(),
            max_view_retries: default_max_view_retries(),
            memory_limit: None,
        }
    }
}

fn default_country_code() -> String {
    "55".to_string()
}

fn default_messaging_host() -> String {
    "wa.me".to_string()
}

fn default_max_image_size() -> usize {
    DEFAULT_MAX_IMAGE_SIZE
}

fn default_max_view_retries() -> u32 {
    DEFAULT_MAX_VIEW_RETRIES
}

/// This struct can be parsed from the configuration file
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    /// Configuration regarding the server
    pub server: ServerConfig,
    /// Configuration of the database.
    ///
    /// If omitted, invitations are only kept in memory.
    pub database: Option<DatabaseConfig>,
    /// Configuration of invitation handling
    #[serde(default)]
    pub invitations: InvitationConfig,
    /// The logging configuration
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_for_invitations() {
        let config: InvitationConfig = toml::from_str("").unwrap();

        assert_eq!(config.country_code, "55");
        assert_eq!(config.messaging_host, "wa.me");
        assert_eq!(config.locale, DisplayLocale::PtBr);
        assert_eq!(config.max_image_size, 5 * 1024 * 1024);
        assert_eq!(config.memory_limit, None);
    }

    #[test]
    fn pascal_case_keys() {
        let config: InvitationConfig = toml::from_str(
            r#"
            CountryCode = "1"
            Locale = "en-US"
            MaxImageSize = 1024
            MemoryLimit = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.country_code, "1");
        assert_eq!(config.locale, DisplayLocale::EnUs);
        assert_eq!(config.max_image_size, 1024);
        assert_eq!(config.memory_limit, Some(100));
    }
}
