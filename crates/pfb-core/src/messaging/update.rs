//! Inbound update envelope as delivered to the webhook.
//!
//! Only the fields the bot reads are modelled; unknown fields are ignored.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatId, MessageId, MessageRef, UserId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
}

/// Which payload an update carries.
#[derive(Clone, Copy, Debug)]
pub enum UpdateKind<'a> {
    Message(&'a Message),
    CallbackQuery(&'a CallbackQuery),
}

impl Update {
    /// Classify the envelope. A message wins over a callback query; an update
    /// carrying neither (edited messages, polls, ...) is `None`.
    pub fn kind(&self) -> Option<UpdateKind<'_>> {
        if let Some(m) = &self.message {
            return Some(UpdateKind::Message(m));
        }
        self.callback_query.as_ref().map(UpdateKind::CallbackQuery)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    #[serde(rename = "from", default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl Message {
    pub fn reference(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat.id,
            message_id: self.message_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl CallbackQuery {
    /// The message the pressed button belongs to, when the platform sent it.
    pub fn origin(&self) -> Option<MessageRef> {
        self.message.as_ref().map(Message::reference)
    }
}
