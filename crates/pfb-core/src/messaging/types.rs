use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform result of every outbound Bot API call.
///
/// Transport and decode failures are folded into `ok: false` with the error
/// text in `description`, so callers branch on `ok` instead of matching errors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
}

impl ApiResponse {
    pub fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            ..Default::default()
        }
    }

    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            ok: false,
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("Unknown error")
    }
}

/// Text formatting mode for captions and messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Markdown,
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
        }
    }
}

/// Outgoing "chat action" (the typing indicator).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    Typing,
}

impl ChatAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatAction::Typing => "typing",
        }
    }
}

/// Inline keyboard: ordered rows of callback buttons.
///
/// Serializes to the Bot API shape `{"inline_keyboard": [[{"text", "callback_data"}]]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
    #[serde(rename = "inline_keyboard")]
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    #[serde(rename = "text")]
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn callback(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

impl InlineKeyboard {
    pub fn row(mut self, row: Vec<InlineButton>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }

    /// First button whose label contains `needle`.
    pub fn find(&self, needle: &str) -> Option<&InlineButton> {
        self.buttons().find(|b| b.label.contains(needle))
    }
}

/// Options shared by send/edit calls that carry text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageOptions {
    pub parse_mode: Option<ParseMode>,
    pub reply_markup: Option<InlineKeyboard>,
}

impl MessageOptions {
    pub fn markdown() -> Self {
        Self {
            parse_mode: Some(ParseMode::Markdown),
            reply_markup: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.reply_markup = Some(keyboard);
        self
    }
}

/// Replacement media for `editMessageMedia`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputMedia {
    Photo { media: String },
}

/// Answer to a button press. Every callback must be answered once, or the
/// client keeps showing a loading indicator on the button.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackAnswer {
    pub text: Option<String>,
    pub show_alert: bool,
}

impl CallbackAnswer {
    /// Silent acknowledgement.
    pub fn ack() -> Self {
        Self::default()
    }

    /// Short toast at the top of the chat.
    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            show_alert: false,
        }
    }

    /// Modal alert the user has to dismiss.
    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            show_alert: true,
        }
    }
}
