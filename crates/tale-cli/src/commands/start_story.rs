//! `tale start-story`.

use anyhow::{Result, bail};
use tale_config::{Config, Purpose};
use tale_core::{Publication, StoryTarget};
use tale_telemetry::RequestContext;
use tracing::Instrument;

use super::build_engine;

/// Generate and publish part 1 of a new story, in-process.
pub(crate) async fn run(cfg: &Config, on: Option<String>) -> Result<()> {
    cfg.require_credentials(Purpose::StartStory)?;

    let engine = build_engine(cfg)?;
    let target = on.map_or(StoryTarget::NewPost, StoryTarget::CommentOn);

    let ctx = RequestContext::new("cli").with_operation("start_story");
    let outcome = engine
        .starter()
        .start(&target)
        .instrument(ctx.span())
        .await;

    match outcome {
        Ok(Publication::Post { .. }) => {
            println!("Published a new story on page {}", cfg.facebook.page_id);
            Ok(())
        },
        Ok(Publication::Comment(command)) => {
            println!("Published a new story under {}", command.target_id);
            Ok(())
        },
        Err(e) => bail!("could not start a story: {e}"),
    }
}
