//! rate-limit command - Show the remaining API budget

use anyhow::{Context as _, Result};

use super::connect;
use crate::cli::Context;
use crate::forge::HostingApi;
use crate::ui::output::format_timestamp;

/// Run the rate-limit command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn rate_limit(ctx: &Context) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(rate_limit_async(ctx))
}

async fn rate_limit_async(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let client = connect(&config).await?;

    let rate = client
        .get_rate_limit()
        .await
        .context("failed to read rate limit")?;

    ctx.out.result(&rate, |rate| {
        vec![
            format!(
                "{} of {} requests remaining ({} used)",
                rate.remaining, rate.limit, rate.used
            ),
            format!("Resets at {}", format_timestamp(rate.reset)),
        ]
    })?;
    Ok(())
}
