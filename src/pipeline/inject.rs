use super::Artifact;

/// A fixed prefix/suffix pair placed around an artifact's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrapper {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

pub const STYLE: Wrapper = Wrapper {
    prefix: "<style>\n",
    suffix: "\n</style>",
};

pub const BODY: Wrapper = Wrapper {
    prefix: "<body>\n",
    suffix: "\n</body>",
};

pub const SCRIPT: Wrapper = Wrapper {
    prefix: "<script>\n",
    suffix: "\n</script>",
};

impl Wrapper {
    /// Wrap the contents verbatim. The wrapped text is never inspected.
    pub fn wrap(&self, artifact: Artifact) -> Artifact {
        let mut contents =
            Vec::with_capacity(self.prefix.len() + artifact.contents.len() + self.suffix.len());
        contents.extend_from_slice(self.prefix.as_bytes());
        contents.extend_from_slice(&artifact.contents);
        contents.extend_from_slice(self.suffix.as_bytes());
        Artifact::new(artifact.path, contents)
    }
}
