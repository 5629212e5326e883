//! Recording fakes for the outbound ports, shared with adapter crate tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::{
    domain::{ChatId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ApiResponse, CallbackAnswer, ChatAction, InlineKeyboard, InputMedia, MessageOptions},
    },
    ports::{MediaSearch, SearchOutcome},
    Result,
};

/// One outbound call captured by [`FakeMessenger`].
#[derive(Clone, Debug, PartialEq)]
pub enum Sent {
    Message {
        chat_id: ChatId,
        text: String,
        opts: MessageOptions,
    },
    Photo {
        chat_id: ChatId,
        photo: String,
        caption: String,
        opts: MessageOptions,
    },
    EditText {
        msg: MessageRef,
        text: String,
        opts: MessageOptions,
    },
    EditCaption {
        msg: MessageRef,
        caption: String,
        opts: MessageOptions,
    },
    EditMedia {
        msg: MessageRef,
        url: String,
        keyboard: Option<InlineKeyboard>,
    },
    Answer {
        callback_id: String,
        answer: CallbackAnswer,
    },
    ChatAction {
        chat_id: ChatId,
        action: ChatAction,
    },
}

#[derive(Default)]
pub struct FakeMessenger {
    sent: Mutex<Vec<Sent>>,
    edit_error: Mutex<Option<String>>,
    photo_error: Mutex<Option<String>>,
    markdown_error: Mutex<Option<String>>,
}

impl FakeMessenger {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Make every subsequent edit return `ok: false` with `description`.
    pub fn fail_edits(&self, description: &str) {
        *self.edit_error.lock().unwrap() = Some(description.to_string());
    }

    /// Make every subsequent `send_photo` return `ok: false` with `description`.
    pub fn fail_photos(&self, description: &str) {
        *self.photo_error.lock().unwrap() = Some(description.to_string());
    }

    /// Make every subsequent Markdown `send_message` return `ok: false` with
    /// `description`. Plain messages still succeed.
    pub fn fail_markdown_messages(&self, description: &str) {
        *self.markdown_error.lock().unwrap() = Some(description.to_string());
    }

    fn record(&self, s: Sent) {
        self.sent.lock().unwrap().push(s);
    }

    fn outcome(slot: &Mutex<Option<String>>) -> ApiResponse {
        match slot.lock().unwrap().as_deref() {
            Some(desc) => ApiResponse::failure(desc),
            None => ApiResponse::success(json!(true)),
        }
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_message(&self, chat_id: ChatId, text: &str, opts: MessageOptions) -> ApiResponse {
        let markdown = opts.parse_mode.is_some();
        self.record(Sent::Message {
            chat_id,
            text: text.to_string(),
            opts,
        });
        match self.markdown_error.lock().unwrap().as_deref() {
            Some(desc) if markdown => ApiResponse::failure(desc),
            _ => ApiResponse::success(json!({"message_id": 1})),
        }
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &str,
        caption: &str,
        opts: MessageOptions,
    ) -> ApiResponse {
        self.record(Sent::Photo {
            chat_id,
            photo: photo.to_string(),
            caption: caption.to_string(),
            opts,
        });
        Self::outcome(&self.photo_error)
    }

    async fn edit_message_text(
        &self,
        msg: MessageRef,
        text: &str,
        opts: MessageOptions,
    ) -> ApiResponse {
        self.record(Sent::EditText {
            msg,
            text: text.to_string(),
            opts,
        });
        Self::outcome(&self.edit_error)
    }

    async fn edit_message_caption(
        &self,
        msg: MessageRef,
        caption: &str,
        opts: MessageOptions,
    ) -> ApiResponse {
        self.record(Sent::EditCaption {
            msg,
            caption: caption.to_string(),
            opts,
        });
        Self::outcome(&self.edit_error)
    }

    async fn edit_message_media(
        &self,
        msg: MessageRef,
        media: InputMedia,
        keyboard: Option<InlineKeyboard>,
    ) -> ApiResponse {
        let InputMedia::Photo { media: url } = media;
        self.record(Sent::EditMedia { msg, url, keyboard });
        Self::outcome(&self.edit_error)
    }

    async fn answer_callback_query(&self, callback_id: &str, answer: CallbackAnswer) -> ApiResponse {
        self.record(Sent::Answer {
            callback_id: callback_id.to_string(),
            answer,
        });
        ApiResponse::success(json!(true))
    }

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> ApiResponse {
        self.record(Sent::ChatAction { chat_id, action });
        ApiResponse::success(json!(true))
    }
}

/// Search service returning a fixed outcome and recording queries.
pub struct FakeSearch {
    outcome: std::result::Result<SearchOutcome, String>,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn returning(outcome: SearchOutcome) -> Self {
        Self {
            outcome: Ok(outcome),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaSearch for FakeSearch {
    async fn search(&self, query: &str) -> Result<SearchOutcome> {
        self.queries.lock().unwrap().push(query.to_string());
        self.outcome.clone().map_err(Error::External)
    }
}
