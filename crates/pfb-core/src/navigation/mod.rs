//! Callback-driven navigation over a cached session record.
//!
//! States: main menu → language select → paginated image view, plus details.
//! None of it lives in process memory: every transition re-reads the record
//! from the [`SessionStore`] and re-renders over the originating message.

pub mod token;
pub mod views;

use std::sync::Arc;

use crate::{
    domain::MessageRef,
    media::MediaRecord,
    messaging::{
        port::MessagingPort,
        types::{ApiResponse, CallbackAnswer, InlineKeyboard, InputMedia, MessageOptions},
        update::{CallbackQuery, Message},
    },
    session::SessionStore,
    Result,
};

pub use token::{BackTarget, NavToken, MAX_TOKEN_LEN};

pub const SESSION_EXPIRED_TEXT: &str = "Sorry, this session has expired. Please search again.";
pub const MALFORMED_TOKEN_TEXT: &str = "Sorry, that button is no longer valid. Please search again.";
pub const NO_IMAGES_TEXT: &str = "No images found for this selection.";
pub const DETACHED_TEXT: &str = "This message can no longer be updated.";
pub const BACKEND_FAILURE_TEXT: &str = "Something went wrong, please try again.";

/// What a transition rendered over the message.
#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    /// Caption + keyboard edit (main menu, language list, details).
    Caption {
        caption: String,
        keyboard: InlineKeyboard,
    },
    /// Media replacement (image view).
    Image {
        url: String,
        index: usize,
        total: usize,
        keyboard: InlineKeyboard,
    },
}

impl Screen {
    pub fn keyboard(&self) -> &InlineKeyboard {
        match self {
            Screen::Caption { keyboard, .. } | Screen::Image { keyboard, .. } => keyboard,
        }
    }
}

/// Kind of message a keyboard is attached to, which decides the edit call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    /// Photo message: caption and media can be edited.
    Media,
    /// Text-only message (poster fallback): only the text can be edited.
    Text,
}

impl Surface {
    pub fn of(message: &Message) -> Self {
        if message.text.is_some() && message.caption.is_none() {
            Surface::Text
        } else {
            Surface::Media
        }
    }
}

/// Terminal result of resolving one callback. Every variant has answered the callback.
#[derive(Clone, Debug, PartialEq)]
pub enum NavOutcome {
    /// `noop`: acknowledged, nothing changed.
    Acknowledged,
    Rendered(Screen),
    NoImages,
    SessionExpired,
    MalformedToken,
    /// The callback carried no originating message to edit.
    Detached,
}

/// Compute the screen for a token against a record. `None` only for an empty
/// image selection. `noop` never reaches here.
pub fn render(token: &NavToken, record: &MediaRecord, media_id: &str) -> Option<Screen> {
    let screen = match token {
        NavToken::View { media_type, .. } => Screen::Caption {
            caption: views::language_caption(record, media_type),
            keyboard: views::language_keyboard(record, media_type, media_id),
        },
        NavToken::Page {
            media_type,
            lang,
            index,
            ..
        } => {
            let page = views::image_page(record, media_type, lang, *index, media_id)?;
            Screen::Image {
                url: page.url,
                index: page.index,
                total: page.total,
                keyboard: page.keyboard,
            }
        }
        NavToken::Details { .. } => Screen::Caption {
            caption: views::details_caption(record),
            keyboard: views::details_keyboard(media_id),
        },
        NavToken::Back {
            target: BackTarget::Main,
            ..
        } => Screen::Caption {
            caption: views::main_caption(record),
            keyboard: views::main_keyboard(media_id),
        },
        NavToken::Noop => return None,
    };
    Some(screen)
}

pub struct Navigator {
    sessions: SessionStore,
    messenger: Arc<dyn MessagingPort>,
}

impl Navigator {
    pub fn new(sessions: SessionStore, messenger: Arc<dyn MessagingPort>) -> Self {
        Self {
            sessions,
            messenger,
        }
    }

    /// Resolve a button press: decode the token, fetch the session, edit the
    /// message in place and answer the callback.
    ///
    /// Expired sessions and malformed tokens are answered with an alert and
    /// reported as outcomes. Only cache backend failures propagate, after the
    /// callback has been answered with a generic alert.
    pub async fn resolve(&self, query: &CallbackQuery) -> Result<NavOutcome> {
        let data = query.data.as_deref().unwrap_or_default();

        let token = match data.parse::<NavToken>() {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(callback_id = %query.id, error = %e, "rejecting callback");
                self.answer(&query.id, CallbackAnswer::alert(MALFORMED_TOKEN_TEXT))
                    .await;
                return Ok(NavOutcome::MalformedToken);
            }
        };

        let Some(media_id) = token.media_id() else {
            self.answer(&query.id, CallbackAnswer::ack()).await;
            return Ok(NavOutcome::Acknowledged);
        };

        let Some(origin) = query.origin() else {
            self.answer(&query.id, CallbackAnswer::notice(DETACHED_TEXT))
                .await;
            return Ok(NavOutcome::Detached);
        };

        let loaded = match self.sessions.load(media_id).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(media_id = %media_id, error = %e, "session lookup failed");
                self.answer(&query.id, CallbackAnswer::alert(BACKEND_FAILURE_TEXT))
                    .await;
                return Err(e);
            }
        };
        let Some(record) = loaded else {
            tracing::info!(media_id = %media_id, "session expired");
            self.answer(&query.id, CallbackAnswer::alert(SESSION_EXPIRED_TEXT))
                .await;
            return Ok(NavOutcome::SessionExpired);
        };

        let Some(screen) = render(&token, &record, media_id) else {
            self.answer(&query.id, CallbackAnswer::notice(NO_IMAGES_TEXT))
                .await;
            return Ok(NavOutcome::NoImages);
        };

        let surface = query
            .message
            .as_ref()
            .map(Surface::of)
            .unwrap_or(Surface::Media);
        let res = self.show(origin, surface, &screen).await;
        let answer = if res.ok {
            CallbackAnswer::ack()
        } else {
            tracing::warn!(
                media_id = %media_id,
                token = %token,
                error = res.description_or_default(),
                "failed to update navigation message"
            );
            CallbackAnswer::notice(format!(
                "Couldn't update this message: {}",
                res.description_or_default()
            ))
        };
        self.answer(&query.id, answer).await;

        Ok(NavOutcome::Rendered(screen))
    }

    async fn show(&self, origin: MessageRef, surface: Surface, screen: &Screen) -> ApiResponse {
        match (surface, screen) {
            (Surface::Text, Screen::Caption { caption, keyboard }) => {
                self.messenger
                    .edit_message_text(
                        origin,
                        caption,
                        MessageOptions::markdown().with_keyboard(keyboard.clone()),
                    )
                    .await
            }
            (
                Surface::Text,
                Screen::Image {
                    url,
                    index,
                    total,
                    keyboard,
                },
            ) => {
                self.messenger
                    .edit_message_text(
                        origin,
                        &views::image_link(url, *index, *total),
                        MessageOptions::markdown().with_keyboard(keyboard.clone()),
                    )
                    .await
            }
            (Surface::Media, Screen::Caption { caption, keyboard }) => {
                self.messenger
                    .edit_message_caption(
                        origin,
                        caption,
                        MessageOptions::markdown().with_keyboard(keyboard.clone()),
                    )
                    .await
            }
            (Surface::Media, Screen::Image { url, keyboard, .. }) => {
                self.messenger
                    .edit_message_media(
                        origin,
                        InputMedia::Photo { media: url.clone() },
                        Some(keyboard.clone()),
                    )
                    .await
            }
        }
    }

    async fn answer(&self, callback_id: &str, answer: CallbackAnswer) {
        let res = self
            .messenger
            .answer_callback_query(callback_id, answer)
            .await;
        if !res.ok {
            tracing::warn!(
                callback_id = %callback_id,
                error = res.description_or_default(),
                "answerCallbackQuery failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cache::MemoryCache,
        domain::{ChatId, MessageId, UserId},
        messaging::update::{Chat, Message, User},
        session::SESSION_TTL,
        testing::{FakeMessenger, Sent},
    };
    use serde_json::json;

    fn query(data: &str) -> CallbackQuery {
        CallbackQuery {
            id: "cb".to_string(),
            from: User {
                id: UserId(1),
                is_bot: false,
                first_name: "T".to_string(),
                last_name: None,
                username: None,
            },
            message: Some(Message {
                message_id: MessageId(77),
                sender: None,
                chat: Chat {
                    id: ChatId(5),
                    kind: "private".to_string(),
                    title: None,
                    username: None,
                },
                date: 0,
                text: None,
                caption: Some("x".to_string()),
            }),
            inline_message_id: None,
            data: Some(data.to_string()),
        }
    }

    async fn setup() -> (Navigator, Arc<FakeMessenger>) {
        let sessions = SessionStore::new(Arc::new(MemoryCache::new(100)), SESSION_TTL);
        let record: MediaRecord = serde_json::from_value(json!({
            "media_id": "123",
            "title": "Heat",
            "year": 1995,
            "images": {"posters": {"en": ["p0", "p1", "p2"]}}
        }))
        .unwrap();
        sessions.save(&record).await.unwrap();

        let messenger = Arc::new(FakeMessenger::default());
        (Navigator::new(sessions, messenger.clone()), messenger)
    }

    fn tokens(screen: &Screen) -> Vec<String> {
        screen
            .keyboard()
            .buttons()
            .map(|b| b.callback_data.clone())
            .collect()
    }

    async fn press(nav: &Navigator, data: &str) -> Screen {
        match nav.resolve(&query(data)).await.unwrap() {
            NavOutcome::Rendered(s) => s,
            other => panic!("{data}: expected a render, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn browse_posters_end_to_end() {
        let (nav, messenger) = setup().await;

        let langs = press(&nav, "view:posters:123").await;
        let en = langs.keyboard().find("EN (3)").unwrap();
        assert_eq!(en.callback_data, "nav:posters:en:0:123");

        let first = press(&nav, &en.callback_data).await;
        assert!(matches!(first, Screen::Image { index: 0, total: 3, .. }));
        assert_eq!(tokens(&first), vec!["noop", "nav:posters:en:1:123", "view:posters:123"]);

        let second = press(&nav, "nav:posters:en:1:123").await;
        assert!(matches!(second, Screen::Image { index: 1, total: 3, .. }));
        assert_eq!(
            tokens(&second),
            vec![
                "nav:posters:en:0:123",
                "noop",
                "nav:posters:en:2:123",
                "view:posters:123"
            ]
        );

        let third = press(&nav, "nav:posters:en:2:123").await;
        assert!(matches!(third, Screen::Image { index: 2, total: 3, .. }));
        assert_eq!(tokens(&third), vec!["nav:posters:en:1:123", "noop", "view:posters:123"]);

        // Each transition edits once and answers once, in that order.
        let sent = messenger.sent();
        assert_eq!(sent.len(), 8);
        assert!(matches!(sent[0], Sent::EditCaption { .. }));
        assert!(matches!(sent[1], Sent::Answer { ref answer, .. } if *answer == CallbackAnswer::ack()));
        assert!(matches!(sent[2], Sent::EditMedia { ref url, .. } if url == "p0"));
        assert!(matches!(sent[6], Sent::EditMedia { ref url, .. } if url == "p2"));
    }

    #[tokio::test]
    async fn out_of_range_index_is_clamped() {
        let (nav, _) = setup().await;
        let last = press(&nav, "nav:posters:en:99:123").await;
        assert!(matches!(last, Screen::Image { index: 2, .. }));
        let first = press(&nav, "nav:posters:en:-4:123").await;
        assert!(matches!(first, Screen::Image { index: 0, .. }));
    }

    #[tokio::test]
    async fn cache_miss_alerts_for_every_action() {
        let (nav, messenger) = setup().await;
        for data in [
            "view:posters:999",
            "nav:posters:en:0:999",
            "details:999",
            "back:main:999",
        ] {
            let outcome = nav.resolve(&query(data)).await.unwrap();
            assert_eq!(outcome, NavOutcome::SessionExpired, "{data}");
        }
        let sent = messenger.sent();
        assert_eq!(sent.len(), 4);
        assert!(sent.iter().all(|s| matches!(
            s,
            Sent::Answer { answer, .. } if *answer == CallbackAnswer::alert(SESSION_EXPIRED_TEXT)
        )));
    }

    #[tokio::test]
    async fn noop_only_acknowledges() {
        let (nav, messenger) = setup().await;
        assert_eq!(
            nav.resolve(&query("noop")).await.unwrap(),
            NavOutcome::Acknowledged
        );
        assert_eq!(
            messenger.sent(),
            vec![Sent::Answer {
                callback_id: "cb".to_string(),
                answer: CallbackAnswer::ack()
            }]
        );
    }

    #[tokio::test]
    async fn malformed_token_alerts_without_editing() {
        let (nav, messenger) = setup().await;
        assert_eq!(
            nav.resolve(&query("nav:posters:en:123")).await.unwrap(),
            NavOutcome::MalformedToken
        );
        assert_eq!(
            nav.resolve(&query("")).await.unwrap(),
            NavOutcome::MalformedToken
        );
        assert!(messenger
            .sent()
            .iter()
            .all(|s| matches!(s, Sent::Answer { answer, .. } if answer.show_alert)));
    }

    #[tokio::test]
    async fn empty_selection_answers_notice() {
        let (nav, messenger) = setup().await;
        assert_eq!(
            nav.resolve(&query("nav:backdrops:en:0:123")).await.unwrap(),
            NavOutcome::NoImages
        );
        assert_eq!(
            messenger.sent(),
            vec![Sent::Answer {
                callback_id: "cb".to_string(),
                answer: CallbackAnswer::notice(NO_IMAGES_TEXT)
            }]
        );
    }

    #[tokio::test]
    async fn back_and_details_edit_caption_in_place() {
        let (nav, messenger) = setup().await;

        let details = press(&nav, "details:123").await;
        assert_eq!(tokens(&details), vec!["back:main:123"]);

        let main = press(&nav, "back:main:123").await;
        let Screen::Caption { caption, keyboard } = main else {
            panic!("expected caption");
        };
        assert!(caption.starts_with("🎬 *Heat* (1995)"));
        assert_eq!(keyboard, views::main_keyboard("123"));

        let origin = MessageRef {
            chat_id: ChatId(5),
            message_id: MessageId(77),
        };
        assert!(messenger
            .sent()
            .iter()
            .all(|s| !matches!(s, Sent::Message { .. } | Sent::Photo { .. })));
        assert!(messenger
            .sent()
            .iter()
            .any(|s| matches!(s, Sent::EditCaption { msg, .. } if *msg == origin)));
    }

    #[tokio::test]
    async fn failed_edit_is_reported_in_the_answer() {
        let (nav, messenger) = setup().await;
        messenger.fail_edits("Bad Request: message is not modified");

        let outcome = nav.resolve(&query("details:123")).await.unwrap();
        assert!(matches!(outcome, NavOutcome::Rendered(_)));
        let last = messenger.sent().pop().unwrap();
        assert_eq!(
            last,
            Sent::Answer {
                callback_id: "cb".to_string(),
                answer: CallbackAnswer::notice(
                    "Couldn't update this message: Bad Request: message is not modified"
                )
            }
        );
    }

    #[tokio::test]
    async fn callback_without_message_is_detached() {
        let (nav, _) = setup().await;
        let mut q = query("details:123");
        q.message = None;
        q.inline_message_id = Some("inline".to_string());
        assert_eq!(nav.resolve(&q).await.unwrap(), NavOutcome::Detached);
    }

    struct UnavailableCache;

    #[async_trait::async_trait]
    impl crate::ports::SessionCache for UnavailableCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(crate::errors::Error::Cache("kv unavailable".to_string()))
        }

        async fn put(&self, _key: &str, _value: Vec<u8>, _ttl: std::time::Duration) -> Result<()> {
            Err(crate::errors::Error::Cache("kv unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn cache_failure_answers_before_propagating() {
        let messenger = Arc::new(FakeMessenger::default());
        let nav = Navigator::new(
            SessionStore::new(Arc::new(UnavailableCache), SESSION_TTL),
            messenger.clone(),
        );

        let err = nav.resolve(&query("details:1")).await.unwrap_err();
        assert!(matches!(err, crate::errors::Error::Cache(_)));
        assert_eq!(
            messenger.sent(),
            vec![Sent::Answer {
                callback_id: "cb".to_string(),
                answer: CallbackAnswer::alert(BACKEND_FAILURE_TEXT)
            }]
        );
    }

    fn text_query(data: &str) -> CallbackQuery {
        let mut q = query(data);
        if let Some(m) = q.message.as_mut() {
            m.caption = None;
            m.text = Some("🎬 *Heat* (1995)".to_string());
        }
        q
    }

    #[tokio::test]
    async fn text_menus_are_edited_as_text() {
        let (nav, messenger) = setup().await;
        let origin = MessageRef {
            chat_id: ChatId(5),
            message_id: MessageId(77),
        };

        for data in ["view:posters:123", "nav:posters:en:1:123", "details:123", "back:main:123"] {
            let outcome = nav.resolve(&text_query(data)).await.unwrap();
            assert!(matches!(outcome, NavOutcome::Rendered(_)), "{data}");
        }

        let sent = messenger.sent();
        assert_eq!(sent.len(), 8);
        assert!(sent
            .iter()
            .all(|s| !matches!(s, Sent::EditCaption { .. } | Sent::EditMedia { .. })));

        let Sent::EditText { msg, text, opts } = &sent[2] else {
            panic!("expected a text edit, got {:?}", sent[2]);
        };
        assert_eq!(*msg, origin);
        assert_eq!(*text, views::image_link("p1", 1, 3));
        assert_eq!(
            opts.reply_markup.as_ref().map(|kb| kb.buttons().count()),
            Some(4)
        );
        assert!(matches!(sent[3], Sent::Answer { ref answer, .. } if *answer == CallbackAnswer::ack()));
    }

    #[test]
    fn surface_follows_message_content() {
        let photo = query("noop").message.unwrap();
        assert_eq!(Surface::of(&photo), Surface::Media);
        let text = text_query("noop").message.unwrap();
        assert_eq!(Surface::of(&text), Surface::Text);
    }
}
