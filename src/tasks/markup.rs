use crate::context::BuildContext;
use crate::pipeline::{copy_files, Artifact, BODY};
use crate::Result;

use super::emit;

pub fn html_tag(ctx: &BuildContext) -> Result<()> {
    let page = Artifact::read(&ctx.layout.page(), ctx.layout.paths().page.clone())?;
    emit(BODY.wrap(page), &ctx.layout.tagged_page())?;
    Ok(())
}

pub fn copy_html(ctx: &BuildContext) -> Result<()> {
    let files = ctx.layout.html()?.resolve()?;
    copy_files(&files, &ctx.layout.html_dir())?;
    Ok(())
}
