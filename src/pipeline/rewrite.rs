use regex::bytes::{NoExpand, Regex};

use super::Artifact;
use crate::config::Markers;
use crate::{Error, Result};

/// Appends a marker token after every `.png`, `.jpg` and `.gif` in a document.
///
/// Plain text substitution: occurrences inside attributes, text nodes or
/// scripts are all rewritten.
#[derive(Debug, Clone)]
pub struct PathRewriter {
    rules: Vec<(Regex, Vec<u8>)>,
}

impl PathRewriter {
    pub fn new(markers: &Markers) -> Result<Self> {
        let rules = [("png", &markers.png), ("jpg", &markers.jpg), ("gif", &markers.gif)]
            .into_iter()
            .map(|(ext, marker)| {
                let regex = Regex::new(&format!(r"\.{}", ext)).map_err(|e| Error::Pattern {
                    pattern: ext.to_string(),
                    reason: e.to_string(),
                })?;
                Ok((regex, format!(".{}?{}", ext, marker).into_bytes()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn rewrite(&self, artifact: Artifact) -> Artifact {
        let contents = self.rules.iter().fold(artifact.contents, |text, (regex, replacement)| {
            regex
                .replace_all(&text, NoExpand(replacement.as_slice()))
                .into_owned()
        });
        Artifact::new(artifact.path, contents)
    }
}
