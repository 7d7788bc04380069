//! AWS Secrets Manager integration for channel credentials.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{Config, Error, Result};

/// Secret strings by ARN, kept for the lifetime of the container.
static SECRET_STRINGS: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn secret_strings() -> &'static RwLock<HashMap<String, String>> {
    SECRET_STRINGS.get_or_init(Default::default)
}

async fn cached_secret(secret_arn: &str) -> Option<String> {
    secret_strings().read().await.get(secret_arn).cloned()
}

async fn remember_secret(secret_arn: &str, value: &str) {
    secret_strings()
        .write()
        .await
        .insert(secret_arn.to_string(), value.to_string());
}

/// Messaging channel credentials stored as a JSON secret.
#[derive(Debug, Deserialize)]
pub struct ChannelCredentials {
    pub channel_access_token: String,
    pub channel_secret: Option<String>,
}

/// Fetch a secret string, asking Secrets Manager only on the first call per ARN.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    if let Some(value) = cached_secret(secret_arn).await {
        return Ok(value);
    }

    let output = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to read {}: {}", secret_arn, e)))?;

    let value = output
        .secret_string()
        .ok_or_else(|| Error::Aws(format!("Secret {} is not a string", secret_arn)))?;

    debug!(secret_arn = %secret_arn, "Fetched channel secret");
    remember_secret(secret_arn, value).await;
    Ok(value.to_string())
}

/// Get channel credentials from Secrets Manager.
pub async fn get_channel_credentials(
    client: &SecretsClient,
    secret_arn: &str,
) -> Result<ChannelCredentials> {
    let secret_string = get_secret(client, secret_arn).await?;

    serde_json::from_str(&secret_string)
        .map_err(|e| Error::Aws(format!("Failed to parse channel credentials: {}", e)))
}

/// Resolve the channel access token, preferring the one set in the environment.
pub async fn resolve_channel_token(config: &Config) -> Result<String> {
    if let Some(token) = &config.channel_access_token {
        return Ok(token.clone());
    }

    let secret_arn = config
        .credentials_secret_arn
        .as_deref()
        .ok_or_else(|| Error::Config("No channel credentials configured".to_string()))?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = SecretsClient::new(&aws_config);

    Ok(get_channel_credentials(&client, secret_arn)
        .await?
        .channel_access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_secret_cache() {
        let arn = "arn:aws:secretsmanager:ap-southeast-1:000000000000:secret:line-test";
        assert_eq!(cached_secret(arn).await, None);

        remember_secret(arn, r#"{"channel_access_token":"abc"}"#).await;
        assert_eq!(
            cached_secret(arn).await.as_deref(),
            Some(r#"{"channel_access_token":"abc"}"#)
        );
    }

    #[tokio::test]
    async fn test_env_token_skips_secrets_manager() {
        let config = Config::from_lookup(|key: &str| match key {
            "LINE_CHANNEL_ACCESS_TOKEN" => Some("from-env".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(resolve_channel_token(&config).await.unwrap(), "from-env");
    }

    #[test]
    fn test_parse_credentials() {
        let json = r#"{"channel_access_token":"abc123","channel_secret":"s3cret"}"#;
        let creds: ChannelCredentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.channel_access_token, "abc123");
        assert_eq!(creds.channel_secret, Some("s3cret".to_string()));
    }

    #[test]
    fn test_parse_credentials_without_secret() {
        let json = r#"{"channel_access_token":"abc123"}"#;
        let creds: ChannelCredentials = serde_json::from_str(json).unwrap();
        assert!(creds.channel_secret.is_none());
    }
}
