//! Configuration management for the webhook Lambda.

use std::env;

use chrono_tz::Tz;

use crate::{Error, Result};

/// Default number of days covered by `/upcoming`.
pub const DEFAULT_UPCOMING_DAYS: u32 = 7;

const DEFAULT_API_BASE_URL: &str = "https://api.line.me";
const DEFAULT_TIMEZONE: &str = "Asia/Bangkok";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Channel access token, when provided directly
    pub channel_access_token: Option<String>,
    /// ARN of the secret holding channel credentials
    pub credentials_secret_arn: Option<String>,
    /// Messaging API base URL
    pub api_base_url: String,
    /// Timezone that defines "today"
    pub timezone: Tz,
    /// Window used by `/upcoming`
    pub upcoming_days: u32,
    /// Only accept `/add` from group chats
    pub add_requires_group: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let channel_access_token = lookup("LINE_CHANNEL_ACCESS_TOKEN").filter(|v| !v.is_empty());
        let credentials_secret_arn =
            lookup("LINE_CREDENTIALS_SECRET_ARN").filter(|v| !v.is_empty());

        if channel_access_token.is_none() && credentials_secret_arn.is_none() {
            return Err(Error::Config(
                "LINE_CHANNEL_ACCESS_TOKEN or LINE_CREDENTIALS_SECRET_ARN must be set".to_string(),
            ));
        }

        let timezone_name = lookup("BOT_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = timezone_name
            .parse::<Tz>()
            .map_err(|_| Error::Config(format!("Unknown timezone: {}", timezone_name)))?;

        let upcoming_days = match lookup("UPCOMING_DAYS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::Config(format!("Invalid UPCOMING_DAYS: {}", raw)))?,
            None => DEFAULT_UPCOMING_DAYS,
        };

        let add_requires_group = match lookup("ADD_REQUIRES_GROUP") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| Error::Config(format!("Invalid ADD_REQUIRES_GROUP: {}", raw)))?,
            None => true,
        };

        Ok(Self {
            channel_access_token,
            credentials_secret_arn,
            api_base_url: lookup("LINE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            timezone,
            upcoming_days,
            add_requires_group,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
