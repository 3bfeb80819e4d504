use std::path::PathBuf;

use crate::context::BuildContext;
use crate::pipeline::{concat, read_required, Artifact, PathRewriter};
use crate::{slog_debug, Result};

use super::emit;

fn assemble(ctx: &BuildContext, parts: Vec<PathBuf>) -> Result<()> {
    let fragments = read_required(&parts)?;
    let target = ctx.layout.single_file();
    emit(concat("index.html", &fragments), &target)?;
    slog_debug!("Assembled {} from {} fragment(s)", target.display(), fragments.len());
    Ok(())
}

/// Header, style, body-wrapped page, script, footer.
pub fn single_file(ctx: &BuildContext) -> Result<()> {
    assemble(ctx, ctx.layout.dev_assembly())
}

/// Same order as [`single_file`] with the page copied verbatim.
pub fn single_file_prod(ctx: &BuildContext) -> Result<()> {
    assemble(ctx, ctx.layout.prod_assembly())
}

pub fn change_img_path(ctx: &BuildContext) -> Result<()> {
    let rewriter = PathRewriter::new(&ctx.config.markers)?;
    let documents = ctx.layout.documents()?.resolve()?;
    for doc in &documents {
        let rewritten = rewriter.rewrite(Artifact::from_source(doc)?);
        std::fs::write(&doc.path, &rewritten.contents)?;
    }
    slog_debug!("change-img-path: rewrote {} document(s)", documents.len());
    Ok(())
}
