use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::pipeline::{EnrichmentOutcome, EnrichmentPipeline, Feedback};

#[derive(Debug, Clone)]
pub struct EnrichCommandArgs {
    pub issue_id: String,
    pub feedback: bool,
}

pub async fn run(ctx: &AppContext, args: EnrichCommandArgs) -> AppResult<EnrichmentOutcome> {
    EnrichmentPipeline::new(ctx.clone())
        .run(&args.issue_id, Feedback::from_flag(args.feedback))
        .await
}
