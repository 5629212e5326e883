//! Reply-markup normalization.
//!
//! Buttons may arrive with the callback token under `callbackData` or
//! `callback`; the Bot API only knows `callback_data`. Normalizing an already
//! canonical keyboard is a no-op.

use serde_json::{Map, Value};

const CANONICAL: &str = "callback_data";
const ALIASES: [&str; 2] = ["callbackData", "callback"];

/// Rewrite alias button fields inside `reply_markup.inline_keyboard` in place.
/// Markup without an inline keyboard is left untouched.
pub fn normalize_reply_markup(markup: &mut Value) {
    let Some(rows) = markup
        .get_mut("inline_keyboard")
        .and_then(Value::as_array_mut)
    else {
        return;
    };

    for row in rows.iter_mut() {
        let Some(buttons) = row.as_array_mut() else {
            continue;
        };
        for button in buttons.iter_mut() {
            if let Some(obj) = button.as_object_mut() {
                normalize_button(obj);
            }
        }
    }
}

/// Normalize the `reply_markup` of an outbound payload, if it has one.
pub fn normalize_payload(payload: &mut Map<String, Value>) {
    if let Some(markup) = payload.get_mut("reply_markup") {
        normalize_reply_markup(markup);
    }
}

fn normalize_button(button: &mut Map<String, Value>) {
    let mut token = None;
    for alias in ALIASES {
        if let Some(v) = button.remove(alias) {
            if token.is_none() && !v.is_null() {
                token = Some(v);
            }
        }
    }
    if let Some(token) = token {
        button.entry(CANONICAL).or_insert(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aliases_become_callback_data() {
        let mut markup = json!({"inline_keyboard": [[
            {"text": "A", "callbackData": "view:posters:1"},
            {"text": "B", "callback": "noop"},
        ]]});
        normalize_reply_markup(&mut markup);
        assert_eq!(
            markup,
            json!({"inline_keyboard": [[
                {"text": "A", "callback_data": "view:posters:1"},
                {"text": "B", "callback_data": "noop"},
            ]]})
        );
    }

    #[test]
    fn canonical_markup_is_unchanged() {
        let canonical = json!({"inline_keyboard": [[
            {"text": "A", "callback_data": "x"},
            {"text": "Docs", "url": "https://example.com"},
        ]]});
        let mut once = canonical.clone();
        normalize_reply_markup(&mut once);
        assert_eq!(once, canonical);

        let mut twice = json!({"inline_keyboard": [[{"text": "A", "callbackData": "x"}]]});
        normalize_reply_markup(&mut twice);
        let snapshot = twice.clone();
        normalize_reply_markup(&mut twice);
        assert_eq!(twice, snapshot);
    }

    #[test]
    fn existing_callback_data_wins() {
        let mut markup = json!({"inline_keyboard": [[
            {"text": "A", "callback_data": "keep", "callback": "drop"}
        ]]});
        normalize_reply_markup(&mut markup);
        assert_eq!(
            markup,
            json!({"inline_keyboard": [[{"text": "A", "callback_data": "keep"}]]})
        );
    }

    #[test]
    fn other_markup_is_ignored() {
        let mut markup = json!({"remove_keyboard": true});
        normalize_reply_markup(&mut markup);
        assert_eq!(markup, json!({"remove_keyboard": true}));

        let mut payload = json!({"chat_id": 1, "text": "hi"});
        normalize_payload(payload.as_object_mut().unwrap());
        assert_eq!(payload, json!({"chat_id": 1, "text": "hi"}));
    }
}
