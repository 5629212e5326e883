//! Telegram Bot API adapter.
//!
//! A thin client over the HTTP Bot API (JSON and multipart) implementing the
//! `pfb-core` MessagingPort, plus the update handlers and the axum webhook router.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

pub mod files;
pub mod handlers;
pub mod markup;
pub mod multipart;
pub mod router;

#[cfg(test)]
mod test_support;

pub use files::{FileKind, InputFile};

use pfb_core::{
    config::DEFAULT_API_BASE,
    domain::{ChatId, MessageRef},
    messaging::{
        port::MessagingPort,
        types::{
            ApiResponse, CallbackAnswer, ChatAction, InlineKeyboard, InputMedia, MessageOptions,
        },
    },
};

use crate::multipart::Multipart;

/// Entry for `setMyCommands`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

impl BotCommand {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
        }
    }
}

/// Bot API client.
///
/// Every call yields an [`ApiResponse`]: transport and decode failures are folded
/// into `ok: false` with the error text as description. Nothing is retried.
#[derive(Clone)]
pub struct BotApi {
    api_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for BotApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The URL embeds the token.
        f.debug_struct("BotApi").finish_non_exhaustive()
    }
}

impl BotApi {
    pub fn new(token: &str) -> Self {
        Self::with_base_url(token, DEFAULT_API_BASE)
    }

    pub fn with_base_url(token: &str, base: &str) -> Self {
        Self {
            api_url: format!("{}/bot{token}", base.trim_end_matches('/')),
            http: reqwest::Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.api_url)
    }

    async fn post(&self, method: &str, content_type: &str, body: Vec<u8>) -> ApiResponse {
        let sent = self
            .http
            .post(self.method_url(method))
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await;

        let resp = match sent {
            Ok(resp) => resp.json::<ApiResponse>().await.unwrap_or_else(|e| {
                ApiResponse::failure(format!("invalid response from {method}: {e}"))
            }),
            Err(e) => ApiResponse::failure(e.to_string()),
        };

        if resp.ok {
            debug!(method, "bot api call ok");
        } else {
            warn!(
                method,
                error_code = resp.error_code,
                description = resp.description_or_default(),
                "bot api call failed"
            );
        }
        resp
    }

    /// JSON call. A `reply_markup` in the payload is normalized first.
    pub async fn call(&self, method: &str, mut payload: Value) -> ApiResponse {
        if let Some(obj) = payload.as_object_mut() {
            markup::normalize_payload(obj);
        }
        match serde_json::to_vec(&payload) {
            Ok(body) => self.post(method, "application/json", body).await,
            Err(e) => ApiResponse::failure(e.to_string()),
        }
    }

    /// Send a file by reference (plain JSON) or by bytes (multipart upload).
    ///
    /// `filename` and `content_type` in `options` override the kind's defaults
    /// for uploads and are never forwarded to the platform.
    pub async fn send_file(
        &self,
        kind: FileKind,
        chat_id: ChatId,
        file: InputFile,
        mut options: Map<String, Value>,
    ) -> ApiResponse {
        let filename = take_string(&mut options, "filename");
        let content_type = take_string(&mut options, "content_type");
        markup::normalize_payload(&mut options);

        match file {
            InputFile::Reference(reference) => {
                let mut payload = Map::new();
                payload.insert("chat_id".to_string(), json!(chat_id));
                payload.insert(kind.field().to_string(), Value::String(reference));
                for (k, v) in options {
                    payload.insert(k, v);
                }
                self.call(kind.method(), Value::Object(payload)).await
            }
            InputFile::Bytes(bytes) => {
                let mut form = Multipart::new();
                form.text("chat_id", &chat_id.to_string());
                for (k, v) in &options {
                    if let Some(value) = form_value(v) {
                        form.text(k, &value);
                    }
                }
                form.file(
                    kind.field(),
                    filename.as_deref().unwrap_or(kind.default_filename()),
                    content_type
                        .as_deref()
                        .unwrap_or(kind.default_content_type()),
                    &bytes,
                );
                let (body, ctype) = form.finish();
                self.post(kind.method(), &ctype, body).await
            }
        }
    }

    pub async fn set_webhook(
        &self,
        url: &str,
        drop_pending_updates: bool,
        secret_token: Option<&str>,
    ) -> ApiResponse {
        let mut payload = json!({
            "url": url,
            "drop_pending_updates": drop_pending_updates,
        });
        if let Some(secret) = secret_token {
            payload["secret_token"] = json!(secret);
        }
        self.call("setWebhook", payload).await
    }

    pub async fn delete_webhook(&self) -> ApiResponse {
        self.call("deleteWebhook", json!({})).await
    }

    pub async fn get_webhook_info(&self) -> ApiResponse {
        self.call("getWebhookInfo", json!({})).await
    }

    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> ApiResponse {
        self.call("setMyCommands", json!({ "commands": commands }))
            .await
    }
}

/// Remove a string option, ignoring non-string values.
fn take_string(options: &mut Map<String, Value>, key: &str) -> Option<String> {
    match options.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Multipart encoding of one option value; `None` for null.
fn form_value(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn apply_options(payload: &mut Value, opts: MessageOptions) {
    if let Some(mode) = opts.parse_mode {
        payload["parse_mode"] = json!(mode.as_str());
    }
    if let Some(keyboard) = opts.reply_markup {
        payload["reply_markup"] = json!(keyboard);
    }
}

#[async_trait]
impl MessagingPort for BotApi {
    async fn send_message(&self, chat_id: ChatId, text: &str, opts: MessageOptions) -> ApiResponse {
        let mut payload = json!({ "chat_id": chat_id, "text": text });
        apply_options(&mut payload, opts);
        self.call("sendMessage", payload).await
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &str,
        caption: &str,
        opts: MessageOptions,
    ) -> ApiResponse {
        let mut options = json!({ "caption": caption });
        apply_options(&mut options, opts);
        let options = match options {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.send_file(FileKind::Photo, chat_id, InputFile::from(photo), options)
            .await
    }

    async fn edit_message_text(
        &self,
        msg: MessageRef,
        text: &str,
        opts: MessageOptions,
    ) -> ApiResponse {
        let mut payload = json!({
            "chat_id": msg.chat_id,
            "message_id": msg.message_id,
            "text": text,
        });
        apply_options(&mut payload, opts);
        self.call("editMessageText", payload).await
    }

    async fn edit_message_caption(
        &self,
        msg: MessageRef,
        caption: &str,
        opts: MessageOptions,
    ) -> ApiResponse {
        let mut payload = json!({
            "chat_id": msg.chat_id,
            "message_id": msg.message_id,
            "caption": caption,
        });
        apply_options(&mut payload, opts);
        self.call("editMessageCaption", payload).await
    }

    async fn edit_message_media(
        &self,
        msg: MessageRef,
        media: InputMedia,
        keyboard: Option<InlineKeyboard>,
    ) -> ApiResponse {
        let mut payload = json!({
            "chat_id": msg.chat_id,
            "message_id": msg.message_id,
            "media": media,
        });
        if let Some(keyboard) = keyboard {
            payload["reply_markup"] = json!(keyboard);
        }
        self.call("editMessageMedia", payload).await
    }

    async fn answer_callback_query(&self, callback_id: &str, answer: CallbackAnswer) -> ApiResponse {
        let mut payload = json!({ "callback_query_id": callback_id });
        if let Some(text) = answer.text {
            payload["text"] = json!(text);
        }
        if answer.show_alert {
            payload["show_alert"] = json!(true);
        }
        self.call("answerCallbackQuery", payload).await
    }

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> ApiResponse {
        self.call(
            "sendChatAction",
            json!({ "chat_id": chat_id, "action": action.as_str() }),
        )
        .await
    }
}
