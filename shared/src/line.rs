//! LINE Messaging API client and webhook payload types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::{Caller, Error, Result};

/// Webhook request body.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// One webhook event. Only text messages are acted on.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub reply_token: Option<String>,
    pub source: Option<EventSource>,
    pub message: Option<MessageContent>,
}

impl WebhookEvent {
    /// Text of a text-message event.
    pub fn text(&self) -> Option<&str> {
        if self.event_type != "message" {
            return None;
        }
        self.message
            .as_ref()
            .filter(|m| m.message_type == "text")
            .and_then(|m| m.text.as_deref())
    }
}

/// Where an event came from.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
}

impl EventSource {
    pub fn is_group(&self) -> bool {
        self.source_type == "group"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: Option<String>,
}

/// User profile as returned by the profile endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
}

impl From<Profile> for Caller {
    fn from(profile: Profile) -> Self {
        Caller::new(profile.user_id, profile.display_name)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: &'a [Value],
}

/// Client for the messaging platform.
pub struct LineClient {
    http_client: reqwest::Client,
    base_url: String,
    channel_access_token: String,
}

impl LineClient {
    /// Create a new client.
    pub fn new(base_url: impl Into<String>, channel_access_token: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            channel_access_token: channel_access_token.into(),
        }
    }

    /// Look up who sent a message.
    pub async fn get_profile(&self, user_id: &str) -> Result<Caller> {
        let url = format!("{}/v2/bot/profile/{}", self.base_url, user_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.channel_access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Platform(format!("Profile lookup failed: {}", status)));
        }

        let profile: Profile = response.json().await?;
        Ok(profile.into())
    }

    /// Answer an event using its reply token.
    pub async fn reply(&self, reply_token: &str, messages: &[Value]) -> Result<()> {
        let url = format!("{}/v2/bot/message/reply", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.channel_access_token)
            .json(&ReplyRequest {
                reply_token,
                messages,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Reply failed: {} - {}", status, body);
            return Err(Error::Platform(format!("Reply failed: {}", status)));
        }

        info!("Reply sent successfully");
        Ok(())
    }
}
