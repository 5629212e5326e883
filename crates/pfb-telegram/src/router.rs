use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tracing::{debug, error, info, warn};

use pfb_core::{
    cache::MemoryCache,
    config::Config,
    dispatcher::Dispatcher,
    messaging::{port::MessagingPort, update::Update},
    navigation::Navigator,
    ports::{MediaSearch, SessionCache},
    session::SessionStore,
};
use pfb_search::SearchClient;

use crate::{
    handlers::{self, NavigationHandler, SearchHandler},
    BotApi,
};

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

const USAGE: &str =
    "Not Found. Visit `/` to set webhook, `/delete` to remove it, or `/status` to check it.";

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub api: BotApi,
    pub dispatcher: Dispatcher,
}

/// Wire the handlers: one search handler for messages, one navigation handler
/// for button presses.
pub fn build_dispatcher(
    cfg: &Config,
    messenger: Arc<dyn MessagingPort>,
    sessions: SessionStore,
    search: Arc<dyn MediaSearch>,
) -> Dispatcher {
    let search_handler = SearchHandler::new(
        messenger.clone(),
        sessions.clone(),
        search,
        cfg.placeholder_poster_url.clone(),
    );
    let nav_handler = NavigationHandler::new(Navigator::new(sessions, messenger));

    Dispatcher::builder()
        .on_message(Arc::new(search_handler))
        .on_callback_query(Arc::new(nav_handler))
        .build()
}

pub fn build_router(state: AppState) -> Router {
    let webhook_path = state.cfg.webhook_path.clone();
    Router::new()
        .route(
            "/",
            get(register_webhook)
                .post(receive_update)
                .fallback(not_found),
        )
        .route(&webhook_path, post(receive_update).fallback(not_found))
        .route("/delete", get(delete_webhook).fallback(not_found))
        .route("/status", get(webhook_status).fallback(not_found))
        .fallback(not_found)
        .with_state(Arc::new(state))
}

pub async fn run_webhook(cfg: Arc<Config>) -> anyhow::Result<()> {
    let api = BotApi::with_base_url(&cfg.telegram_bot_token, &cfg.telegram_api_base);
    let messenger: Arc<dyn MessagingPort> = Arc::new(api.clone());
    let cache: Arc<dyn SessionCache> = Arc::new(MemoryCache::new(cfg.session_cache_capacity));
    let sessions = SessionStore::new(cache, cfg.session_ttl);
    let search: Arc<dyn MediaSearch> = Arc::new(SearchClient::new(cfg.search_api_url.clone()));

    let dispatcher = build_dispatcher(&cfg, messenger, sessions, search);
    let app = build_router(AppState {
        cfg: cfg.clone(),
        api,
        dispatcher,
    });

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    info!(
        address = %cfg.bind_addr,
        webhook_path = %cfg.webhook_path,
        session_ttl_secs = cfg.session_ttl.as_secs(),
        "webhook server listening"
    );

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        info!("received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn receive_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(expected) = state.cfg.webhook_secret.as_deref() {
        let given = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if given != Some(expected) {
            warn!("rejecting update with missing or wrong secret token");
            return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
        }
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(e) => {
            // Acknowledged anyway: an error status only makes the platform redeliver it.
            warn!(error = %e, "discarding undecodable update");
            return (StatusCode::OK, "ok").into_response();
        }
    };

    match state.dispatcher.dispatch(&update).await {
        Ok(dispatched) => {
            debug!(update_id = update.update_id, dispatched = ?dispatched, "update handled")
        }
        Err(e) => error!(update_id = update.update_id, error = %e, "error processing update"),
    }
    (StatusCode::OK, "ok").into_response()
}

async fn register_webhook(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let cfg = &state.cfg;
    let base = match (&cfg.public_url, headers.get(header::HOST)) {
        (Some(url), _) => url.clone(),
        (None, Some(host)) => match host.to_str() {
            Ok(host) => format!("https://{host}"),
            Err(_) => return bad_host(),
        },
        (None, None) => return bad_host(),
    };
    let webhook_url = format!("{base}{}", cfg.webhook_path);

    let commands = state.api.set_my_commands(&handlers::bot_commands()).await;
    if !commands.ok {
        warn!(error = commands.description_or_default(), "setMyCommands failed");
    }

    let result = state
        .api
        .set_webhook(
            &webhook_url,
            cfg.drop_pending_updates,
            cfg.webhook_secret.as_deref(),
        )
        .await;
    if result.ok {
        info!(url = %webhook_url, "webhook registered");
        (
            StatusCode::OK,
            format!("✅ Webhook set successfully to {webhook_url}\n🤖 Bot commands updated."),
        )
            .into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!(
                "❌ Failed to set webhook: {}",
                result.description_or_default()
            ),
        )
            .into_response()
    }
}

fn bad_host() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "❌ Failed to set webhook: no PUBLIC_URL configured and no usable Host header",
    )
        .into_response()
}

async fn delete_webhook(State(state): State<Arc<AppState>>) -> Response {
    let result = state.api.delete_webhook().await;
    if result.ok {
        info!("webhook deleted");
        (StatusCode::OK, "✅ Webhook deleted successfully!").into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!(
                "❌ Failed to delete webhook. Reason: {}",
                result.description_or_default()
            ),
        )
            .into_response()
    }
}

async fn webhook_status(State(state): State<Arc<AppState>>) -> Response {
    let info = state.api.get_webhook_info().await;
    let body = serde_json::to_string_pretty(&info)
        .unwrap_or_else(|e| format!("{{\"ok\": false, \"description\": \"{e}\"}}"));
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, USAGE).into_response()
}
