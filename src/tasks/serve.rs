use std::time::Duration;

use crate::context::BuildContext;
use crate::Result;

pub fn serve(ctx: &BuildContext) -> Result<()> {
    ctx.services.start_server(
        &ctx.config.tools.server,
        &ctx.layout.dist(),
        ctx.layout.project(),
    )
}

pub fn watch(ctx: &BuildContext) -> Result<()> {
    ctx.services.start_watching(
        &ctx.layout.src(),
        ctx.layout.watched()?,
        Duration::from_millis(ctx.config.watch.debounce_ms),
    )
}
