use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::{ApiResponse, CallbackAnswer, ChatAction, InlineKeyboard, InputMedia, MessageOptions},
};

/// Outbound messenger port.
///
/// Implementations never fail with an error: every call yields an
/// [`ApiResponse`] and callers inspect `ok`. No call is retried.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, text: &str, opts: MessageOptions) -> ApiResponse;

    /// Send a photo by URL or platform file id.
    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &str,
        caption: &str,
        opts: MessageOptions,
    ) -> ApiResponse;

    /// Edit a text-only message.
    async fn edit_message_text(&self, msg: MessageRef, text: &str, opts: MessageOptions)
        -> ApiResponse;

    async fn edit_message_caption(
        &self,
        msg: MessageRef,
        caption: &str,
        opts: MessageOptions,
    ) -> ApiResponse;

    async fn edit_message_media(
        &self,
        msg: MessageRef,
        media: InputMedia,
        keyboard: Option<InlineKeyboard>,
    ) -> ApiResponse;

    async fn answer_callback_query(&self, callback_id: &str, answer: CallbackAnswer) -> ApiResponse;

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> ApiResponse;
}
