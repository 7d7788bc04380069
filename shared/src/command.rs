//! Slash-command parsing.
//!
//! Grammar understood by the bot:
//!
//! ```text
//! /add YYYY-MM-DD <title> [<description...>]
//! /today
//! /upcoming
//! /help
//! ```
//!
//! Anything else is [`Command::Unrecognized`].

use chrono::NaiveDate;
use thiserror::Error;

const ADD_PREFIX: &str = "/add";

/// A recognized user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddEvent {
        date: NaiveDate,
        title: String,
        description: String,
    },
    QueryToday,
    QueryUpcoming,
    Help,
    Unrecognized,
}

/// Why an `/add` command could not be accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("/add needs at least a date and a title")]
    MissingFields,

    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Parse a raw chat message into a command.
///
/// Only `/add` can fail; every other input classifies to some command.
pub fn parse(raw: &str) -> Result<Command, ParseError> {
    let text = raw.trim();

    if let Some(rest) = text.strip_prefix(ADD_PREFIX) {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return parse_add(rest);
        }
        return Ok(Command::Unrecognized);
    }

    Ok(match text {
        "/today" => Command::QueryToday,
        "/upcoming" => Command::QueryUpcoming,
        "/help" => Command::Help,
        _ => Command::Unrecognized,
    })
}

/// Split the `/add` arguments into date, title and the untouched remainder.
fn parse_add(args: &str) -> Result<Command, ParseError> {
    let (date_token, rest) = split_token(args).ok_or(ParseError::MissingFields)?;
    let (title, description) = split_token(rest).ok_or(ParseError::MissingFields)?;

    let date = parse_date(date_token)?;

    Ok(Command::AddEvent {
        date,
        title: title.to_string(),
        description: description.trim().to_string(),
    })
}

/// Take the next whitespace-delimited token, returning it with whatever follows.
fn split_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.find(char::is_whitespace) {
        Some(idx) => Some((&input[..idx], &input[idx..])),
        None => Some((input, "")),
    }
}

/// Parse a strict `YYYY-MM-DD` date that exists on the calendar.
pub fn parse_date(token: &str) -> Result<NaiveDate, ParseError> {
    let bytes = token.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !well_formed {
        return Err(ParseError::InvalidDate(token.to_string()));
    }

    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .map_err(|_| ParseError::InvalidDate(token.to_string()))
}
