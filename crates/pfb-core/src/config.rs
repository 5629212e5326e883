use std::{env, fs, net::SocketAddr, path::Path, time::Duration};

use crate::{errors::Error, session::SESSION_TTL, Result};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_SEARCH_API_URL: &str = "https://tmdbapi-eight.vercel.app/api/movie-posters";
pub const DEFAULT_PLACEHOLDER_POSTER: &str =
    "https://via.placeholder.com/300x450.png?text=No+Poster";

/// Paths served by the admin routes.
const RESERVED_PATHS: [&str; 3] = ["/", "/delete", "/status"];

/// Typed configuration, read from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    // Bot API
    pub telegram_bot_token: String,
    pub telegram_api_base: String,

    // Webhook server
    pub bind_addr: SocketAddr,
    pub public_url: Option<String>,
    pub webhook_path: String,
    pub webhook_secret: Option<String>,
    pub drop_pending_updates: bool,

    // Search service
    pub search_api_url: String,

    // Sessions
    pub session_ttl: Duration,
    pub session_cache_capacity: u64,

    pub placeholder_poster_url: String,
}

impl Config {
    /// Load from the process environment, after an optional `.env` in the
    /// working directory (never overriding variables that are already set).
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required
        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
        })?;
        let telegram_api_base = get("TELEGRAM_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("BIND_ADDR is not a socket address: {e}")))?;

        let public_url = get("PUBLIC_URL").map(|u| u.trim().trim_end_matches('/').to_string());
        let webhook_path = get("WEBHOOK_PATH").unwrap_or_else(|| "/webhook".to_string());
        if !webhook_path.starts_with('/') || RESERVED_PATHS.contains(&webhook_path.as_str()) {
            return Err(Error::Config(format!(
                "WEBHOOK_PATH must start with '/' and not be one of {RESERVED_PATHS:?}, got {webhook_path:?}"
            )));
        }
        if webhook_path.contains([':', '*', '{', '}']) {
            return Err(Error::Config(format!(
                "WEBHOOK_PATH must be a literal path without ':', '*', '{{' or '}}', got {webhook_path:?}"
            )));
        }
        let webhook_secret = get("WEBHOOK_SECRET");
        let drop_pending_updates = get("DROP_PENDING_UPDATES")
            .map(|s| parse_bool(&s))
            .unwrap_or(true);

        let search_api_url =
            get("SEARCH_API_URL").unwrap_or_else(|| DEFAULT_SEARCH_API_URL.to_string());

        let session_ttl = match get("SESSION_TTL_SECS") {
            Some(s) => Duration::from_secs(parse_u64("SESSION_TTL_SECS", &s)?),
            None => SESSION_TTL,
        };
        if session_ttl.is_zero() {
            return Err(Error::Config("SESSION_TTL_SECS must be positive".to_string()));
        }
        let session_cache_capacity = match get("SESSION_CACHE_CAPACITY") {
            Some(s) => parse_u64("SESSION_CACHE_CAPACITY", &s)?,
            None => 10_000,
        };

        let placeholder_poster_url = get("PLACEHOLDER_POSTER_URL")
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_POSTER.to_string());

        Ok(Self {
            telegram_bot_token,
            telegram_api_base,
            bind_addr,
            public_url,
            webhook_path,
            webhook_secret,
            drop_pending_updates,
            search_api_url,
            session_ttl,
            session_cache_capacity,
            placeholder_poster_url,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_u64(key: &str, s: &str) -> Result<u64> {
    s.trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got {s:?}")))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
