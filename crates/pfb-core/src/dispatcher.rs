//! Routes one inbound [`Update`] to the handlers registered for its kind.
//!
//! The handler lists are built once at startup and passed around by value;
//! there is no global registration.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    messaging::update::{CallbackQuery, Message, Update, UpdateKind},
    Result,
};

#[async_trait]
pub trait UpdateHandler<T: Send + Sync>: Send + Sync {
    async fn handle(&self, payload: &T) -> Result<()>;
}

pub type MessageHandler = Arc<dyn UpdateHandler<Message>>;
pub type CallbackHandler = Arc<dyn UpdateHandler<CallbackQuery>>;

/// Which branch a dispatch took and how many handlers ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatched {
    Message(usize),
    CallbackQuery(usize),
    Ignored,
}

#[derive(Clone, Default)]
pub struct Dispatcher {
    message_handlers: Vec<MessageHandler>,
    callback_handlers: Vec<CallbackHandler>,
}

#[derive(Default)]
pub struct DispatcherBuilder {
    inner: Dispatcher,
}

impl DispatcherBuilder {
    pub fn on_message(mut self, handler: MessageHandler) -> Self {
        self.inner.message_handlers.push(handler);
        self
    }

    pub fn on_callback_query(mut self, handler: CallbackHandler) -> Self {
        self.inner.callback_handlers.push(handler);
        self
    }

    pub fn build(self) -> Dispatcher {
        self.inner
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Run every handler registered for the update's kind, sequentially and in
    /// registration order.
    ///
    /// The first handler error stops the loop and is returned to the caller;
    /// later handlers for this update do not run. Nothing is retried here.
    pub async fn dispatch(&self, update: &Update) -> Result<Dispatched> {
        match update.kind() {
            Some(UpdateKind::Message(msg)) => {
                for h in &self.message_handlers {
                    h.handle(msg).await?;
                }
                Ok(Dispatched::Message(self.message_handlers.len()))
            }
            Some(UpdateKind::CallbackQuery(cb)) => {
                for h in &self.callback_handlers {
                    h.handle(cb).await?;
                }
                Ok(Dispatched::CallbackQuery(self.callback_handlers.len()))
            }
            None => {
                tracing::debug!(update_id = update.update_id, "ignoring update without message or callback");
                Ok(Dispatched::Ignored)
            }
        }
    }
}
