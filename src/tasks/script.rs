use crate::context::BuildContext;
use crate::pipeline::{concat, read_all, read_required, Artifact, SCRIPT};
use crate::{slog_debug, Result};

use super::emit;

/// Transpile application scripts and join them in file-set order.
pub fn min_js(ctx: &BuildContext) -> Result<()> {
    let files = ctx.layout.app_scripts()?.resolve()?;
    let mut transpiled = Vec::with_capacity(files.len());
    for file in &files {
        let source = Artifact::from_source(file)?;
        transpiled.push(
            ctx.toolchain
                .transpile_script(file, source, ctx.source_maps())?,
        );
    }
    emit(concat("bundle.js", &transpiled), &ctx.layout.app_bundle())?;
    slog_debug!("min-js: bundled {} script(s)", transpiled.len());
    Ok(())
}

/// Join third-party scripts untouched: base library, declared modules, then
/// the remaining library files.
pub fn modules(ctx: &BuildContext) -> Result<()> {
    let files = ctx.layout.vendor_scripts()?.resolve()?;
    let scripts = read_all(&files)?;
    emit(concat("vendor.js", &scripts), &ctx.layout.vendor_bundle())?;
    slog_debug!("modules: bundled {} vendor script(s)", scripts.len());
    Ok(())
}

pub fn script_tag(ctx: &BuildContext) -> Result<()> {
    let layout = &ctx.layout;
    let bundles = read_required(&[layout.vendor_bundle(), layout.app_bundle()])?;
    let combined = concat("bundleVendor.js", &bundles);
    emit(combined.clone(), &layout.combined_bundle())?;
    emit(SCRIPT.wrap(combined), &layout.tagged_script())?;
    Ok(())
}
