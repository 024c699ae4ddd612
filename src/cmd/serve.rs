use tracing::warn;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::server::{self, AppState};

pub async fn run(ctx: AppContext) -> AppResult<()> {
    if ctx.config.linear_webhook_secret.is_none() {
        warn!("LINEAR_WEBHOOK_SECRET not set; webhook signatures will not be verified");
    }
    let address = ctx.config.listen_address();
    server::serve(AppState::new(ctx), &address).await
}
