use std::sync::Arc;

use pfb_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), pfb_core::Error> {
    pfb_core::logging::init("pfb")?;

    let cfg = Arc::new(Config::load()?);
    tracing::info!(
        bind_addr = %cfg.bind_addr,
        search_api = %cfg.search_api_url,
        "starting poster bot"
    );

    pfb_telegram::router::run_webhook(cfg)
        .await
        .map_err(|e| pfb_core::Error::External(format!("webhook server failed: {e}")))?;

    Ok(())
}
