//! Platform-agnostic cards and the renderers that build them from events.

use chrono::NaiveDate;
use serde::Serialize;

use crate::Event;

pub const NEW_EVENT_BANNER: &str = "📅 กิจกรรมใหม่";
pub const NO_TITLE: &str = "ไม่มีหัวข้อ";
pub const NO_DESCRIPTION: &str = "ไม่มีรายละเอียด";
pub const DATE_LABEL: &str = "วันที่";
pub const CREATOR_LABEL: &str = "ผู้สร้าง";

/// A labeled value line, e.g. `วันที่ | 2024-11-20`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardRow {
    pub label: String,
    pub value: String,
}

impl CardRow {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One visual card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Optional header strip above the title
    pub banner: Option<String>,
    pub title: String,
    /// Free text lines under the title
    pub body: Vec<String>,
    pub rows: Vec<CardRow>,
    /// Rendered smaller, used inside carousels
    pub compact: bool,
}

impl Card {
    /// Value of the first row with `label`.
    pub fn row(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "cards", rename_all = "snake_case")]
pub enum CardContents {
    Bubble(Card),
    Carousel(Vec<Card>),
}

/// A card reply plus the plain-text summary shown in notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardMessage {
    pub alt_text: String,
    pub contents: CardContents,
}

impl CardMessage {
    pub fn cards(&self) -> &[Card] {
        match &self.contents {
            CardContents::Bubble(card) => std::slice::from_ref(card),
            CardContents::Carousel(cards) => cards,
        }
    }
}

/// Output of a list render: cards when there is something to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Rendered {
    Card(CardMessage),
    Text(String),
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// Card announcing a freshly created event.
pub fn render_single_event(date: NaiveDate, event: &Event) -> CardMessage {
    let title = or_placeholder(&event.title, NO_TITLE);
    let card = Card {
        banner: Some(NEW_EVENT_BANNER.to_string()),
        title: title.clone(),
        body: vec![or_placeholder(&event.description, NO_DESCRIPTION)],
        rows: vec![
            CardRow::new(DATE_LABEL, date.format("%Y-%m-%d").to_string()),
            CardRow::new(CREATOR_LABEL, event.creator_name.clone()),
        ],
        compact: false,
    };

    CardMessage {
        alt_text: format!("กิจกรรมใหม่: {}", title),
        contents: CardContents::Bubble(card),
    }
}

/// Carousel with one compact card per event, or `empty_text` when there are none.
pub fn render_event_list(items: &[(NaiveDate, Event)], empty_text: &str) -> Rendered {
    if items.is_empty() {
        return Rendered::Text(empty_text.to_string());
    }

    let cards = items
        .iter()
        .map(|(date, event)| Card {
            banner: None,
            title: or_placeholder(&event.title, NO_TITLE),
            body: vec![or_placeholder(&event.description, NO_DESCRIPTION)],
            rows: vec![CardRow::new(DATE_LABEL, date.format("%Y-%m-%d").to_string())],
            compact: true,
        })
        .collect();

    Rendered::Card(CardMessage {
        alt_text: format!("รายการกิจกรรม {} รายการ", items.len()),
        contents: CardContents::Carousel(cards),
    })
}
