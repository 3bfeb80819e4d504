use crate::context::BuildContext;
use crate::fileset::SourceFile;
use crate::pipeline::{Artifact, STYLE};
use crate::{slog_debug, Result};

use super::emit;

/// Partials (`_name.scss`) are linted but never compiled on their own.
pub fn is_partial(file: &SourceFile) -> bool {
    file.path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('_'))
        .unwrap_or(false)
}

/// Lint every source, then compile, prefix and write. Nothing is written
/// unless every file passes every step.
pub fn sass(ctx: &BuildContext) -> Result<()> {
    let files = ctx.layout.scss()?.resolve()?;

    for file in &files {
        ctx.toolchain.lint_style(file)?;
    }

    let mut compiled = Vec::new();
    for file in files.iter().filter(|f| !is_partial(f)) {
        let source = Artifact::from_source(file)?;
        let css = ctx
            .toolchain
            .compile_style(file, source, ctx.source_maps())?;
        compiled.push(ctx.toolchain.prefix_style(css)?.with_extension("css"));
    }

    let dest = ctx.layout.css_dir();
    for css in &compiled {
        css.write_to(&dest)?;
    }
    slog_debug!(
        "sass: {} source(s), {} stylesheet(s) written",
        files.len(),
        compiled.len()
    );
    Ok(())
}

pub fn style_tag(ctx: &BuildContext) -> Result<()> {
    let css = Artifact::read(&ctx.layout.compiled_css(), "style.css")?;
    emit(STYLE.wrap(css), &ctx.layout.tagged_css())?;
    Ok(())
}
