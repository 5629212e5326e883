use async_trait::async_trait;
use tracing::debug;

use pfb_core::{
    dispatcher::UpdateHandler,
    messaging::update::CallbackQuery,
    navigation::Navigator,
    Result,
};

/// Button presses on the browse keyboards.
pub struct NavigationHandler {
    navigator: Navigator,
}

impl NavigationHandler {
    pub fn new(navigator: Navigator) -> Self {
        Self { navigator }
    }
}

#[async_trait]
impl UpdateHandler<CallbackQuery> for NavigationHandler {
    async fn handle(&self, query: &CallbackQuery) -> Result<()> {
        let outcome = self.navigator.resolve(query).await?;
        debug!(callback_id = %query.id, outcome = ?outcome, "callback resolved");
        Ok(())
    }
}
