use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use pfb_core::{
    dispatcher::UpdateHandler,
    domain::ChatId,
    media::MediaRecord,
    messaging::{
        port::MessagingPort,
        types::{ChatAction, MessageOptions},
        update::Message,
    },
    navigation::views,
    ports::{MediaSearch, SearchOutcome},
    session::SessionStore,
    Result,
};

use super::texts;

/// Commands and searches from plain chat messages.
pub struct SearchHandler {
    messenger: Arc<dyn MessagingPort>,
    sessions: SessionStore,
    search: Arc<dyn MediaSearch>,
    placeholder_poster: String,
}

impl SearchHandler {
    pub fn new(
        messenger: Arc<dyn MessagingPort>,
        sessions: SessionStore,
        search: Arc<dyn MediaSearch>,
        placeholder_poster: impl Into<String>,
    ) -> Self {
        Self {
            messenger,
            sessions,
            search,
            placeholder_poster: placeholder_poster.into(),
        }
    }

    async fn reply(&self, chat_id: ChatId, text: &str, opts: MessageOptions) {
        let res = self.messenger.send_message(chat_id, text, opts).await;
        if !res.ok {
            warn!(chat_id = %chat_id, error = res.description_or_default(), "sendMessage failed");
        }
    }

    async fn run_search(&self, chat_id: ChatId, query: &str) {
        self.messenger
            .send_chat_action(chat_id, ChatAction::Typing)
            .await;

        if !query.chars().any(|c| c.is_ascii_digit()) {
            self.reply(chat_id, texts::YEAR_HINT, MessageOptions::markdown())
                .await;
            return;
        }

        let outcome = match self.search.search(query).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "search failed");
                self.reply(chat_id, &texts::search_failed(&e), MessageOptions::default())
                    .await;
                return;
            }
        };

        match outcome {
            SearchOutcome::NotFound => {
                self.reply(chat_id, &texts::not_found(query), MessageOptions::default())
                    .await;
            }
            SearchOutcome::MissingId => {
                self.reply(chat_id, texts::MISSING_ID, MessageOptions::default())
                    .await;
            }
            SearchOutcome::Found(record) => match self.sessions.save(&record).await {
                Ok(media_id) => {
                    info!(chat_id = %chat_id, media_id = %media_id, "search hit");
                    self.send_main_menu(chat_id, &record, &media_id).await;
                }
                Err(e) => {
                    error!(chat_id = %chat_id, error = %e, "failed to store session");
                    self.reply(chat_id, &texts::search_failed(&e), MessageOptions::default())
                        .await;
                }
            },
        }
    }

    /// Poster with the main-menu caption; falls back to a text message when
    /// the platform rejects the photo, and to plain text when the Markdown
    /// is rejected as well.
    async fn send_main_menu(&self, chat_id: ChatId, record: &MediaRecord, media_id: &str) {
        let caption = views::main_caption(record);
        let opts = MessageOptions::markdown().with_keyboard(views::main_keyboard(media_id));
        let poster = record
            .poster_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&self.placeholder_poster);

        let res = self
            .messenger
            .send_photo(chat_id, poster, &caption, opts.clone())
            .await;
        if !res.ok {
            warn!(
                chat_id = %chat_id,
                media_id = %media_id,
                error = res.description_or_default(),
                "poster rejected, sending text menu"
            );
            let keyboard = opts.reply_markup.clone();
            let res = self.messenger.send_message(chat_id, &caption, opts).await;
            if !res.ok {
                warn!(
                    chat_id = %chat_id,
                    media_id = %media_id,
                    error = res.description_or_default(),
                    "text menu rejected, sending without formatting"
                );
                let plain = MessageOptions {
                    parse_mode: None,
                    reply_markup: keyboard,
                };
                self.reply(chat_id, &caption, plain).await;
            }
        }
    }
}

/// Reply text for a `/command` (an `@botname` suffix is ignored).
/// `None` for commands the bot does not know.
fn command_reply(text: &str) -> Option<&'static str> {
    let word = text.split_whitespace().next().unwrap_or(text);
    let name = word.trim_start_matches('/');
    let name = name.split_once('@').map_or(name, |(n, _)| n);
    match name {
        "start" | "help" => Some(texts::WELCOME),
        "about" => Some(texts::ABOUT),
        "faq" => Some(texts::FAQ),
        "disclaimer" => Some(texts::DISCLAIMER),
        _ => None,
    }
}

#[async_trait]
impl UpdateHandler<Message> for SearchHandler {
    async fn handle(&self, msg: &Message) -> Result<()> {
        let chat_id = msg.chat.id;
        let text = msg.text.as_deref().unwrap_or_default().trim();

        if text.starts_with('/') {
            match command_reply(text) {
                Some(reply) => self.reply(chat_id, reply, MessageOptions::markdown()).await,
                None => debug!(chat_id = %chat_id, command = text, "ignoring unknown command"),
            }
            return Ok(());
        }
        if text.is_empty() {
            return Ok(());
        }

        self.run_search(chat_id, text).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfb_core::{
        cache::MemoryCache,
        domain::MessageId,
        messaging::update::Chat,
        session::SESSION_TTL,
        testing::{FakeMessenger, FakeSearch, Sent},
    };
    use serde_json::json;

    const PLACEHOLDER: &str = "https://placeholder/poster.png";

    struct Harness {
        handler: SearchHandler,
        messenger: Arc<FakeMessenger>,
        search: Arc<FakeSearch>,
        sessions: SessionStore,
    }

    fn harness(search: FakeSearch) -> Harness {
        let messenger = Arc::new(FakeMessenger::default());
        let search = Arc::new(search);
        let sessions = SessionStore::new(Arc::new(MemoryCache::new(100)), SESSION_TTL);
        let handler = SearchHandler::new(
            messenger.clone(),
            sessions.clone(),
            search.clone(),
            PLACEHOLDER,
        );
        Harness {
            handler,
            messenger,
            search,
            sessions,
        }
    }

    fn text_message(text: Option<&str>) -> Message {
        Message {
            message_id: MessageId(1),
            sender: None,
            chat: Chat {
                id: ChatId(42),
                kind: "private".to_string(),
                title: None,
                username: None,
            },
            date: 0,
            text: text.map(str::to_string),
            caption: None,
        }
    }

    fn record(poster: Option<&str>) -> MediaRecord {
        let mut v = json!({
            "media_id": "27205",
            "title": "Inception",
            "year": "2010",
            "plot": "A thief who steals corporate secrets.",
            "images": {"posters": {"en": ["https://img/1.jpg"]}}
        });
        if let Some(p) = poster {
            v["poster_url"] = json!(p);
        }
        serde_json::from_value(v).unwrap()
    }

    fn typing() -> Sent {
        Sent::ChatAction {
            chat_id: ChatId(42),
            action: ChatAction::Typing,
        }
    }

    fn message(text: &str, opts: MessageOptions) -> Sent {
        Sent::Message {
            chat_id: ChatId(42),
            text: text.to_string(),
            opts,
        }
    }

    #[tokio::test]
    async fn known_commands_reply_with_static_text() {
        let h = harness(FakeSearch::returning(SearchOutcome::NotFound));
        for (cmd, reply) in [
            ("/start", texts::WELCOME),
            ("/help@PosterFlixBot", texts::WELCOME),
            ("/about", texts::ABOUT),
            ("/faq", texts::FAQ),
            ("/disclaimer extra words", texts::DISCLAIMER),
        ] {
            h.handler.handle(&text_message(Some(cmd))).await.unwrap();
            assert_eq!(
                h.messenger.sent().last(),
                Some(&message(reply, MessageOptions::markdown())),
                "{cmd}"
            );
        }
        assert_eq!(h.messenger.sent().len(), 5);
        assert!(h.search.queries().is_empty());
    }

    #[tokio::test]
    async fn unknown_commands_and_empty_text_are_ignored() {
        let h = harness(FakeSearch::returning(SearchOutcome::NotFound));
        for m in [
            text_message(Some("/settings")),
            text_message(Some("   ")),
            text_message(None),
        ] {
            h.handler.handle(&m).await.unwrap();
        }
        assert!(h.messenger.sent().is_empty());
        assert!(h.search.queries().is_empty());
    }

    #[tokio::test]
    async fn query_without_year_gets_hint() {
        let h = harness(FakeSearch::returning(SearchOutcome::NotFound));
        h.handler
            .handle(&text_message(Some("Inception")))
            .await
            .unwrap();
        assert_eq!(
            h.messenger.sent(),
            vec![
                typing(),
                message(texts::YEAR_HINT, MessageOptions::markdown())
            ]
        );
        assert!(h.search.queries().is_empty());
    }

    #[tokio::test]
    async fn search_misses_are_reported() {
        let h = harness(FakeSearch::returning(SearchOutcome::NotFound));
        h.handler
            .handle(&text_message(Some("  Nothing 1999 ")))
            .await
            .unwrap();
        assert_eq!(h.search.queries(), vec!["Nothing 1999".to_string()]);
        assert_eq!(
            h.messenger.sent(),
            vec![
                typing(),
                message(&texts::not_found("Nothing 1999"), MessageOptions::default())
            ]
        );

        let h = harness(FakeSearch::returning(SearchOutcome::MissingId));
        h.handler
            .handle(&text_message(Some("Odd 2001")))
            .await
            .unwrap();
        assert_eq!(
            h.messenger.sent()[1],
            message(texts::MISSING_ID, MessageOptions::default())
        );
    }

    #[tokio::test]
    async fn search_errors_are_reported() {
        let h = harness(FakeSearch::failing("connection reset"));
        h.handler
            .handle(&text_message(Some("Inception 2010")))
            .await
            .unwrap();
        let sent = h.messenger.sent();
        assert_eq!(sent.len(), 2);
        let Sent::Message { text, .. } = &sent[1] else {
            panic!("expected an error message, got {:?}", sent[1]);
        };
        assert!(text.starts_with("An error occurred during the search: "));
        assert!(text.contains("connection reset"));
    }

    #[tokio::test]
    async fn hit_saves_session_and_sends_poster_menu() {
        let rec = record(Some("https://img/poster.jpg"));
        let h = harness(FakeSearch::returning(SearchOutcome::Found(rec.clone())));
        h.handler
            .handle(&text_message(Some("Inception 2010")))
            .await
            .unwrap();

        assert_eq!(
            h.messenger.sent(),
            vec![
                typing(),
                Sent::Photo {
                    chat_id: ChatId(42),
                    photo: "https://img/poster.jpg".to_string(),
                    caption: views::main_caption(&rec),
                    opts: MessageOptions::markdown().with_keyboard(views::main_keyboard("27205")),
                }
            ]
        );
        assert_eq!(h.sessions.load("27205").await.unwrap(), Some(rec));
    }

    #[tokio::test]
    async fn missing_poster_uses_placeholder() {
        let h = harness(FakeSearch::returning(SearchOutcome::Found(record(None))));
        h.handler
            .handle(&text_message(Some("Inception 2010")))
            .await
            .unwrap();
        let Sent::Photo { photo, .. } = &h.messenger.sent()[1] else {
            panic!("expected a photo");
        };
        assert_eq!(photo, PLACEHOLDER);
    }

    #[tokio::test]
    async fn rejected_poster_falls_back_to_text() {
        let rec = record(Some("https://img/broken.jpg"));
        let h = harness(FakeSearch::returning(SearchOutcome::Found(rec.clone())));
        h.messenger
            .fail_photos("Bad Request: wrong file identifier/HTTP URL specified");
        h.handler
            .handle(&text_message(Some("Inception 2010")))
            .await
            .unwrap();

        let sent = h.messenger.sent();
        assert_eq!(sent.len(), 3);
        assert!(matches!(sent[1], Sent::Photo { .. }));
        assert_eq!(
            sent[2],
            message(
                &views::main_caption(&rec),
                MessageOptions::markdown().with_keyboard(views::main_keyboard("27205"))
            )
        );
    }

    #[tokio::test]
    async fn rejected_markdown_menu_is_resent_plain() {
        let rec = record(Some("https://img/broken.jpg"));
        let h = harness(FakeSearch::returning(SearchOutcome::Found(rec.clone())));
        h.messenger.fail_photos("Bad Request: wrong file identifier/HTTP URL specified");
        h.messenger
            .fail_markdown_messages("Bad Request: can't parse entities");
        h.handler
            .handle(&text_message(Some("Inception 2010")))
            .await
            .unwrap();

        let sent = h.messenger.sent();
        assert_eq!(sent.len(), 4);
        assert!(matches!(sent[2], Sent::Message { ref opts, .. } if opts.parse_mode.is_some()));
        assert_eq!(
            sent[3],
            message(
                &views::main_caption(&rec),
                MessageOptions::default().with_keyboard(views::main_keyboard("27205"))
            )
        );
    }
}
