use std::path::PathBuf;

use super::Artifact;

/// Inserted between concatenated files.
pub const SEPARATOR: &[u8] = b"\n";

/// Join artifacts in the given order into a single artifact named `name`.
pub fn concat(name: impl Into<PathBuf>, parts: &[Artifact]) -> Artifact {
    let len = parts.iter().map(|p| p.contents.len()).sum::<usize>()
        + SEPARATOR.len() * parts.len().saturating_sub(1);
    let mut contents = Vec::with_capacity(len);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            contents.extend_from_slice(SEPARATOR);
        }
        contents.extend_from_slice(&part.contents);
    }
    Artifact::new(name, contents)
}
