use crate::Result;

/// Initialize tracing for the bot.
///
/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to
/// one-JSON-object-per-line output for log collectors.
pub fn init(service_name: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    // Default: info for our crates, warn for everything else.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,pfb_core=info,pfb_telegram=info,pfb_search=info,{}=info",
            service_name.replace('-', "_")
        ))
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .try_init()
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(true)
            .try_init()
    };

    res.map_err(|e| crate::Error::Config(format!("logging init failed: {e}")))
}
