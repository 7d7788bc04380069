//! Shared library for the calendar event bot.
//!
//! This crate holds the command parser, the in-memory event store, the card
//! renderer and the dispatcher tying them together, plus the platform helpers
//! used by the webhook Lambda.

pub mod card;
pub mod clock;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod flex;
pub mod http;
pub mod line;
pub mod models;
pub mod secrets;
pub mod store;

pub use card::{render_event_list, render_single_event, Card, CardContents, CardMessage, CardRow, Rendered};
pub use clock::{Clock, FixedClock, SystemClock};
pub use command::{parse, Command, ParseError};
pub use config::Config;
pub use dispatcher::{Dispatcher, ErrorKind, Response};
pub use error::{Error, Result};
pub use line::{LineClient, WebhookBody, WebhookEvent};
pub use models::{Caller, Event};
pub use secrets::resolve_channel_token;
pub use store::EventStore;
