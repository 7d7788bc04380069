//! Translation of cards into LINE Flex Message JSON.

use serde_json::{json, Value};
use tracing::warn;

use crate::card::{Card, CardContents, CardMessage};

/// Maximum bubbles the platform accepts in one carousel.
pub const MAX_CAROUSEL_CARDS: usize = 12;

/// Maximum characters in a flex message's `altText`.
pub const MAX_ALT_TEXT_CHARS: usize = 1500;

/// Maximum characters in a text message.
pub const MAX_TEXT_CHARS: usize = 5000;

const BANNER_COLOR: &str = "#1DB446";
const LABEL_COLOR: &str = "#AAAAAA";
const VALUE_COLOR: &str = "#666666";

/// Build a flex message for a card reply.
pub fn to_message(message: &CardMessage) -> Value {
    let contents = match &message.contents {
        CardContents::Bubble(card) => bubble(card),
        CardContents::Carousel(cards) => {
            if cards.len() > MAX_CAROUSEL_CARDS {
                warn!(
                    total = cards.len(),
                    shown = MAX_CAROUSEL_CARDS,
                    "Carousel truncated"
                );
            }
            let bubbles: Vec<Value> = cards.iter().take(MAX_CAROUSEL_CARDS).map(bubble).collect();
            json!({
                "type": "carousel",
                "contents": bubbles,
            })
        }
    };

    json!({
        "type": "flex",
        "altText": truncate_chars(&message.alt_text, MAX_ALT_TEXT_CHARS),
        "contents": contents,
    })
}

/// Build a plain text message.
pub fn text_message(text: &str) -> Value {
    json!({
        "type": "text",
        "text": truncate_chars(text, MAX_TEXT_CHARS),
    })
}

/// Cut `text` to at most `max` characters, never splitting a character.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn bubble(card: &Card) -> Value {
    let title_size = if card.compact { "md" } else { "xl" };
    let mut body = vec![json!({
        "type": "text",
        "text": card.title,
        "weight": "bold",
        "size": title_size,
        "wrap": true,
    })];

    body.extend(card.body.iter().map(|line| {
        json!({
            "type": "text",
            "text": line,
            "size": "sm",
            "color": VALUE_COLOR,
            "wrap": true,
        })
    }));

    if !card.rows.is_empty() {
        body.push(json!({ "type": "separator", "margin": "md" }));
        body.extend(card.rows.iter().map(|row| {
            json!({
                "type": "box",
                "layout": "baseline",
                "spacing": "sm",
                "contents": [
                    {
                        "type": "text",
                        "text": row.label,
                        "color": LABEL_COLOR,
                        "size": "sm",
                        "flex": 2,
                    },
                    {
                        "type": "text",
                        "text": row.value,
                        "color": VALUE_COLOR,
                        "size": "sm",
                        "flex": 5,
                        "wrap": true,
                    },
                ],
            })
        }));
    }

    let mut bubble = json!({
        "type": "bubble",
        "body": {
            "type": "box",
            "layout": "vertical",
            "spacing": "sm",
            "contents": body,
        },
    });

    if card.compact {
        bubble["size"] = json!("kilo");
    }

    if let Some(banner) = &card.banner {
        bubble["header"] = json!({
            "type": "box",
            "layout": "vertical",
            "contents": [{
                "type": "text",
                "text": banner,
                "weight": "bold",
                "color": BANNER_COLOR,
                "size": "sm",
            }],
        });
    }

    bubble
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{render_event_list, render_single_event, Rendered, NEW_EVENT_BANNER};
    use crate::Event;
    use chrono::{NaiveDate, Utc};

    fn event(title: &str) -> Event {
        Event {
            date: NaiveDate::from_ymd_opt(2024, 11, 20).unwrap(),
            title: title.to_string(),
            description: "desc".to_string(),
            creator_id: "u1".to_string(),
            creator_name: "Name".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_single_bubble() {
        let e = event("T");
        let value = to_message(&render_single_event(e.date, &e));

        assert_eq!(value["type"], "flex");
        assert_eq!(value["altText"], "กิจกรรมใหม่: T");
        assert_eq!(value["contents"]["type"], "bubble");
        assert_eq!(value["contents"]["header"]["contents"][0]["text"], NEW_EVENT_BANNER);

        let body = value["contents"]["body"]["contents"].as_array().unwrap();
        assert_eq!(body[0]["text"], "T");
        assert_eq!(body[1]["text"], "desc");
        assert_eq!(body[2]["type"], "separator");
        assert_eq!(body[3]["contents"][1]["text"], "2024-11-20");
        assert_eq!(body[4]["contents"][1]["text"], "Name");
    }

    #[test]
    fn test_carousel_is_capped() {
        let items: Vec<_> = (0..15)
            .map(|i| {
                let e = event(&format!("e{}", i));
                (e.date, e)
            })
            .collect();
        let Rendered::Card(message) = render_event_list(&items, "none") else {
            panic!("expected cards");
        };

        let value = to_message(&message);
        assert_eq!(value["contents"]["type"], "carousel");
        let bubbles = value["contents"]["contents"].as_array().unwrap();
        assert_eq!(bubbles.len(), MAX_CAROUSEL_CARDS);
        assert_eq!(bubbles[0]["size"], "kilo");
        assert!(bubbles[0].get("header").is_none());
    }

    #[test]
    fn test_long_thai_title_alt_text_is_capped() {
        let text = format!("/add 2024-11-20 {} x", "ประชุม".repeat(300));
        let Ok(crate::Command::AddEvent { date, title, description }) = crate::parse(&text) else {
            panic!("expected add command");
        };
        let mut e = event(&title);
        e.description = description;

        let value = to_message(&render_single_event(date, &e));
        let alt_text = value["altText"].as_str().unwrap();
        assert_eq!(alt_text.chars().count(), MAX_ALT_TEXT_CHARS);
        assert!(alt_text.starts_with("กิจกรรมใหม่: ประชุม"));
    }

    #[test]
    fn test_short_alt_text_untouched() {
        let e = event("T");
        let value = to_message(&render_single_event(e.date, &e));
        assert_eq!(value["altText"], "กิจกรรมใหม่: T");
    }

    #[test]
    fn test_long_text_message_is_capped() {
        let long = "ก".repeat(MAX_TEXT_CHARS + 10);
        let value = text_message(&long);
        assert_eq!(value["text"].as_str().unwrap().chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn test_text_message() {
        let value = text_message("hello");
        assert_eq!(value, json!({"type": "text", "text": "hello"}));
    }
}
