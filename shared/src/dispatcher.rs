//! Command dispatcher: runs a parsed command against the store and renders the reply.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::card::{render_event_list, render_single_event, CardMessage, Rendered};
use crate::command::{parse, Command, ParseError};
use crate::config::DEFAULT_UPCOMING_DAYS;
use crate::{Caller, EventStore, Result};

pub const ADD_USAGE: &str = "กรุณาใช้: /add YYYY-MM-DD หัวข้อ รายละเอียด";
pub const MISSING_FIELDS_TEXT: &str = "ข้อผิดพลาด: ข้อมูลไม่ครบถ้วน";
pub const INVALID_DATE_TEXT: &str = "ข้อผิดพลาด: รูปแบบวันที่ไม่ถูกต้อง กรุณาใช้รูปแบบ YYYY-MM-DD";
pub const GROUP_ONLY_TEXT: &str = "กรุณาใช้คำสั่งในกลุ่มเท่านั้น";
pub const APOLOGY_TEXT: &str = "เกิดข้อผิดพลาด กรุณาลองใหม่อีกครั้ง";
pub const NO_EVENTS_TODAY_TEXT: &str = "ไม่มีกิจกรรมในวันนี้";
pub const NO_UPCOMING_EVENTS_TEXT: &str = "ไม่มีกิจกรรมในช่วงวันข้างหน้า";

pub const HELP_TEXT: &str = "คำสั่งที่ใช้ได้:
/add YYYY-MM-DD หัวข้อ รายละเอียด - เพิ่มกิจกรรม
/today - ดูกิจกรรมวันนี้
/upcoming - ดูกิจกรรมใน 7 วันข้างหน้า
/help - แสดงคำสั่งทั้งหมด

ตัวอย่าง: /add 2024-11-20 ประชุม สรุปงานประจำเดือน";

/// Category of a user-facing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingFields,
    InvalidDate,
    IdentityUnavailable,
    InternalFault,
}

/// What the webhook should send back to the chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Response {
    Card(CardMessage),
    Text(String),
    Error(ErrorKind, String),
}

impl Response {
    /// Generic apology for faults the user cannot fix.
    pub fn internal_fault() -> Self {
        Response::Error(ErrorKind::InternalFault, APOLOGY_TEXT.to_string())
    }
}

impl From<ParseError> for Response {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MissingFields => Response::Error(
                ErrorKind::MissingFields,
                format!("{}\n{}", MISSING_FIELDS_TEXT, ADD_USAGE),
            ),
            ParseError::InvalidDate(token) => Response::Error(
                ErrorKind::InvalidDate,
                format!("{} ({})\n{}", INVALID_DATE_TEXT, token, ADD_USAGE),
            ),
        }
    }
}

impl From<Rendered> for Response {
    fn from(rendered: Rendered) -> Self {
        match rendered {
            Rendered::Card(message) => Response::Card(message),
            Rendered::Text(text) => Response::Text(text),
        }
    }
}

/// Parse `text`, turning a parse failure into the corrective error response.
pub fn parse_command(text: &str) -> std::result::Result<Command, Response> {
    parse(text).map_err(|err| {
        warn!(error = %err, "Rejected command");
        Response::from(err)
    })
}

/// Stateless front of the event store; each call is independent.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: Arc<EventStore>,
    upcoming_days: u32,
}

impl Dispatcher {
    pub fn new(store: Arc<EventStore>) -> Self {
        Self {
            store,
            upcoming_days: DEFAULT_UPCOMING_DAYS,
        }
    }

    /// Override the `/upcoming` window.
    pub fn with_upcoming_days(mut self, days: u32) -> Self {
        self.upcoming_days = days;
        self
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Parse `text` and dispatch it. Parse failures become error responses.
    pub fn handle_text(
        &self,
        text: &str,
        caller: Option<&Caller>,
        today: NaiveDate,
    ) -> Result<Response> {
        match parse_command(text) {
            Ok(command) => self.dispatch(command, caller, today),
            Err(response) => Ok(response),
        }
    }

    /// Execute one command.
    ///
    /// `Err` is only returned for internal store faults.
    pub fn dispatch(
        &self,
        command: Command,
        caller: Option<&Caller>,
        today: NaiveDate,
    ) -> Result<Response> {
        match command {
            Command::AddEvent {
                date,
                title,
                description,
            } => {
                let Some(caller) = caller else {
                    warn!(date = %date, "Add requested without a resolved caller");
                    return Ok(Response::Error(
                        ErrorKind::IdentityUnavailable,
                        APOLOGY_TEXT.to_string(),
                    ));
                };

                let event = self.store.insert(
                    date,
                    &title,
                    &description,
                    &caller.id,
                    &caller.display_name,
                )?;
                info!(date = %date, user_id = %caller.id, "Created event");

                Ok(Response::Card(render_single_event(date, &event)))
            }
            Command::QueryToday => {
                let items: Vec<_> = self
                    .store
                    .query_by_date(today)?
                    .into_iter()
                    .map(|event| (today, event))
                    .collect();
                info!(date = %today, count = items.len(), "Queried today");

                Ok(render_event_list(&items, NO_EVENTS_TODAY_TEXT).into())
            }
            Command::QueryUpcoming => {
                let items = self.store.query_range(today, self.upcoming_days)?;
                info!(
                    start = %today,
                    days = self.upcoming_days,
                    count = items.len(),
                    "Queried upcoming"
                );

                Ok(render_event_list(&items, NO_UPCOMING_EVENTS_TEXT).into())
            }
            Command::Help | Command::Unrecognized => Ok(Response::Text(HELP_TEXT.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardContents, CREATOR_LABEL, DATE_LABEL};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(EventStore::new()))
    }

    fn caller() -> Caller {
        Caller::new("u1", "สมชาย")
    }

    #[test]
    fn test_today_on_empty_store() {
        let response = dispatcher()
            .dispatch(Command::QueryToday, Some(&caller()), date("2024-11-20"))
            .unwrap();
        assert_eq!(response, Response::Text(NO_EVENTS_TODAY_TEXT.to_string()));
    }

    #[test]
    fn test_add_then_today() {
        let dispatcher = dispatcher();
        let today = date("2024-11-20");

        let added = dispatcher
            .handle_text("/add 2024-11-20 ประชุม สรุปงาน", Some(&caller()), today)
            .unwrap();
        let message = match added {
            Response::Card(message) => message,
            other => panic!("expected card, got {:?}", other),
        };
        let card = &message.cards()[0];
        assert_eq!(card.title, "ประชุม");
        assert_eq!(card.body, vec!["สรุปงาน".to_string()]);
        assert_eq!(card.row(DATE_LABEL), Some("2024-11-20"));
        assert_eq!(card.row(CREATOR_LABEL), Some("สมชาย"));

        let listed = dispatcher
            .dispatch(Command::QueryToday, Some(&caller()), today)
            .unwrap();
        let message = match listed {
            Response::Card(message) => message,
            other => panic!("expected carousel, got {:?}", other),
        };
        assert!(matches!(message.contents, CardContents::Carousel(_)));
        assert_eq!(message.cards().len(), 1);
        assert_eq!(message.cards()[0].title, "ประชุม");
    }

    #[test]
    fn test_invalid_date() {
        let response = dispatcher()
            .handle_text("/add bad-date X Y", Some(&caller()), date("2024-11-20"))
            .unwrap();
        match response {
            Response::Error(ErrorKind::InvalidDate, message) => {
                assert!(message.contains("bad-date"));
                assert!(message.contains(ADD_USAGE));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_missing_fields() {
        let response = dispatcher()
            .handle_text("/add 2024-11-20", Some(&caller()), date("2024-11-20"))
            .unwrap();
        assert!(matches!(
            response,
            Response::Error(ErrorKind::MissingFields, ref message) if message.contains(ADD_USAGE)
        ));
    }

    #[test]
    fn test_add_without_caller() {
        let dispatcher = dispatcher();
        let response = dispatcher
            .handle_text("/add 2024-11-20 Title", None, date("2024-11-20"))
            .unwrap();
        assert_eq!(
            response,
            Response::Error(ErrorKind::IdentityUnavailable, APOLOGY_TEXT.to_string())
        );
        assert!(dispatcher.store().is_empty().unwrap());
    }

    #[test]
    fn test_queries_do_not_need_caller() {
        let response = dispatcher()
            .dispatch(Command::QueryUpcoming, None, date("2024-11-20"))
            .unwrap();
        assert_eq!(response, Response::Text(NO_UPCOMING_EVENTS_TEXT.to_string()));
    }

    #[test]
    fn test_upcoming_covers_seven_days() {
        let dispatcher = dispatcher();
        let today = date("2024-11-20");
        for text in [
            "/add 2024-11-19 yesterday",
            "/add 2024-11-26 sixth",
            "/add 2024-11-20 today",
            "/add 2024-11-27 seventh",
        ] {
            dispatcher.handle_text(text, Some(&caller()), today).unwrap();
        }

        let response = dispatcher
            .dispatch(Command::QueryUpcoming, Some(&caller()), today)
            .unwrap();
        let message = match response {
            Response::Card(message) => message,
            other => panic!("expected carousel, got {:?}", other),
        };
        let titles: Vec<&str> = message.cards().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["today", "sixth"]);
    }

    #[test]
    fn test_custom_upcoming_window() {
        let dispatcher = dispatcher().with_upcoming_days(1);
        let today = date("2024-11-20");
        dispatcher
            .handle_text("/add 2024-11-21 tomorrow", Some(&caller()), today)
            .unwrap();
        let response = dispatcher
            .dispatch(Command::QueryUpcoming, None, today)
            .unwrap();
        assert_eq!(response, Response::Text(NO_UPCOMING_EVENTS_TEXT.to_string()));
    }

    #[test]
    fn test_parse_command_maps_errors() {
        assert_eq!(parse_command("/today"), Ok(Command::QueryToday));
        assert!(matches!(
            parse_command("/add 2024-02-30 x"),
            Err(Response::Error(ErrorKind::InvalidDate, _))
        ));
    }

    #[test]
    fn test_help_and_fallback() {
        let dispatcher = dispatcher();
        let today = date("2024-11-20");
        let help = dispatcher.handle_text("/help", None, today).unwrap();
        let fallback = dispatcher.handle_text("what can you do?", None, today).unwrap();
        assert_eq!(help, Response::Text(HELP_TEXT.to_string()));
        assert_eq!(fallback, help);
        for command in ["/add", "/today", "/upcoming", "/help"] {
            assert!(HELP_TEXT.contains(command));
        }
    }
}
