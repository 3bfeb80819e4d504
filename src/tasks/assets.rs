use crate::context::BuildContext;
use crate::pipeline::copy_files;
use crate::Result;

/// Copy static files keeping their paths relative to the source root.
pub fn copy_static(ctx: &BuildContext) -> Result<()> {
    let files = ctx.layout.static_files()?.resolve()?;
    copy_files(&files, &ctx.layout.dist())?;
    Ok(())
}

pub fn copy_lib_css(ctx: &BuildContext) -> Result<()> {
    let files = ctx.layout.lib_css()?.resolve()?;
    copy_files(&files, &ctx.layout.css_dir())?;
    Ok(())
}
