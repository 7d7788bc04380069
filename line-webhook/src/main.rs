//! LINE Webhook Lambda - Handles chat messages sent to the calendar bot.
//!
//! Endpoints:
//! - GET / - Health check
//! - POST /callback - Messaging platform webhook
//!
//! Each text message is parsed as a slash command, run against the in-memory
//! event store and answered through the reply API. Events live as long as the
//! Lambda container does.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde_json::Value;
use shared::dispatcher::{parse_command, APOLOGY_TEXT, GROUP_ONLY_TEXT};
use shared::http::text_response;
use shared::line::EventSource;
use shared::{
    flex, resolve_channel_token, Caller, Clock, Command, Config, Dispatcher, ErrorKind,
    EventStore, LineClient, SystemClock, WebhookBody, WebhookEvent,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    dispatcher: Dispatcher,
    line_client: LineClient,
    clock: Box<dyn Clock>,
    add_requires_group: bool,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let channel_access_token = resolve_channel_token(&config).await?;

        info!(
            timezone = %config.timezone,
            upcoming_days = config.upcoming_days,
            add_requires_group = config.add_requires_group,
            "Starting webhook"
        );

        let dispatcher =
            Dispatcher::new(Arc::new(EventStore::new())).with_upcoming_days(config.upcoming_days);

        Ok(Self {
            dispatcher,
            line_client: LineClient::new(&config.api_base_url, channel_access_token),
            clock: Box::new(SystemClock::new(config.timezone)),
            add_requires_group: config.add_requires_group,
        })
    }

    /// Resolve the sender's profile. Failures only cost the caller identity.
    async fn resolve_caller(&self, source: Option<&EventSource>) -> Option<Caller> {
        let user_id = source.and_then(|s| s.user_id.as_deref())?;

        match self.line_client.get_profile(user_id).await {
            Ok(caller) => {
                info!(user_id = %caller.id, "Message from {}", caller.display_name);
                Some(caller)
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Profile lookup failed");
                None
            }
        }
    }

    /// Work out the reply for one text message.
    async fn respond(&self, event: &WebhookEvent, text: &str) -> shared::Response {
        let command = match parse_command(text) {
            Ok(command) => command,
            Err(response) => return response,
        };

        let in_group = event.source.as_ref().is_some_and(EventSource::is_group);
        if let Some(response) = group_rule(&command, in_group, self.add_requires_group) {
            return response;
        }

        let caller = match &command {
            Command::AddEvent { .. } => self.resolve_caller(event.source.as_ref()).await,
            _ => None,
        };

        let today = self.clock.today();
        settle(self.dispatcher.dispatch(command, caller.as_ref(), today))
    }

    async fn handle_event(&self, event: &WebhookEvent) {
        let Some(text) = event.text() else {
            info!(event_type = %event.event_type, "Ignoring non-text event");
            return;
        };
        let Some(reply_token) = event.reply_token.as_deref() else {
            warn!("Text message without reply token");
            return;
        };

        info!("Received message: {}", text);
        let response = self.respond(event, text).await;
        let message = to_platform_message(&response);

        if let Err(e) = self.line_client.reply(reply_token, &[message]).await {
            error!(error = %e, "Failed to send reply");
        }
    }
}

/// Refuse `/add` outside group chats when the bot is configured that way.
fn group_rule(command: &Command, in_group: bool, add_requires_group: bool) -> Option<shared::Response> {
    match command {
        Command::AddEvent { .. } if add_requires_group && !in_group => {
            info!("Rejected /add outside of a group");
            Some(shared::Response::Text(GROUP_ONLY_TEXT.to_string()))
        }
        _ => None,
    }
}

/// Internal faults are logged in full and answered with the generic apology.
fn settle(result: shared::Result<shared::Response>) -> shared::Response {
    match result {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Dispatch failed");
            shared::Response::internal_fault()
        }
    }
}

/// Translate a dispatcher response into a platform message.
fn to_platform_message(response: &shared::Response) -> Value {
    match response {
        shared::Response::Card(message) => flex::to_message(message),
        shared::Response::Text(text) => flex::text_message(text),
        shared::Response::Error(kind, text) => {
            match kind {
                ErrorKind::InternalFault => error!(kind = ?kind, "Replying with apology"),
                _ => warn!(kind = ?kind, "Replying with error"),
            }
            let text = if text.is_empty() { APOLOGY_TEXT } else { text.as_str() };
            flex::text_message(text)
        }
    }
}

async fn handle_callback(state: &AppState, body: &Body) -> Result<Response<Body>, Error> {
    let body_str = std::str::from_utf8(body.as_ref()).unwrap_or_default();
    info!("Request body: {}", body_str);

    let webhook: WebhookBody = match serde_json::from_str(body_str) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to parse webhook body: {}", e);
            return text_response(400, "Invalid request");
        }
    };

    info!("Number of events: {}", webhook.events.len());
    if webhook.events.is_empty() {
        info!("No events in request");
    }

    for event in &webhook.events {
        state.handle_event(event).await;
    }

    text_response(200, "OK")
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path();

    info!("Webhook request: {} {}", method, path);

    match (method, path) {
        ("GET", "/") | ("GET", "/health") => text_response(200, "OK"),
        ("POST", "/callback") => handle_callback(&state, event.body()).await,
        _ => text_response(404, "Not found"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
