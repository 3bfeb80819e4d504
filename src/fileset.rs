//! Ordered glob file-sets.
//!
//! A [`FileSet`] is a list of patterns relative to a root directory. Positive
//! patterns are expanded in the order they are listed and a path produced by an
//! earlier pattern is never repeated, so listing a file explicitly before a
//! wildcard that also matches it pins that file to the front. Patterns starting
//! with `!` exclude paths wherever they appear in the list.
//!
//! Supported syntax: `*` and `?` (never crossing `/`), `**` as a whole segment
//! (zero or more directories) and `[...]` character classes. A pattern without
//! any of these is a literal path and must exist.

use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{slog_debug, Error, Result};

fn has_magic(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// A single compiled pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    negated: bool,
    literal: bool,
    /// Leading segments without metacharacters.
    base: PathBuf,
    regex: Regex,
}

impl Pattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let (negated, body) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let body = body.trim().trim_start_matches("./");
        if body.is_empty() {
            return Err(Error::Pattern {
                pattern: pattern.to_string(),
                reason: "empty pattern".to_string(),
            });
        }

        let literal = !has_magic(body);
        let segments: Vec<&str> = body.split('/').collect();
        let base: PathBuf = if literal {
            Path::new(body).parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            segments.iter().take_while(|s| !has_magic(s)).collect()
        };

        Ok(Self {
            raw: pattern.to_string(),
            negated,
            literal,
            base,
            regex: glob_to_regex(pattern, &segments)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_literal(&self) -> bool {
        self.literal
    }

    /// Directory prefix of the pattern that contains no metacharacters.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Match a `/`-separated path relative to the pattern root.
    pub fn matches(&self, relative: &str) -> bool {
        self.regex.is_match(relative)
    }
}

fn glob_to_regex(raw: &str, segments: &[&str]) -> Result<Regex> {
    let mut re = String::from("^");
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        if *segment == "**" {
            if i == last {
                re.push_str(".*");
            } else {
                re.push_str("(?:[^/]+/)*");
            }
            continue;
        }
        translate_segment(raw, segment, &mut re)?;
        if i != last {
            re.push('/');
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| Error::Pattern {
        pattern: raw.to_string(),
        reason: e.to_string(),
    })
}

fn translate_segment(raw: &str, segment: &str, re: &mut String) -> Result<()> {
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    class.push(c);
                }
                if !closed || class.is_empty() {
                    return Err(Error::Pattern {
                        pattern: raw.to_string(),
                        reason: "unterminated character class".to_string(),
                    });
                }
                re.push('[');
                match class.strip_prefix('!') {
                    Some(rest) => {
                        re.push('^');
                        re.push_str(&rest.replace('\\', "\\\\"));
                    }
                    None => re.push_str(&class.replace('\\', "\\\\")),
                }
                re.push(']');
            }
            other => re.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    Ok(())
}

/// A file produced by resolving a [`FileSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the glob base (or the explicit base), used for output naming.
    pub relative: PathBuf,
}

/// Ordered list of include/exclude patterns rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileSet {
    root: PathBuf,
    patterns: Vec<Pattern>,
    base: Option<PathBuf>,
}

impl FileSet {
    pub fn new<I, S>(root: impl Into<PathBuf>, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Pattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            root: root.into(),
            patterns,
            base: None,
        })
    }

    /// Compute `relative` against this directory (relative to the root)
    /// instead of each pattern's glob base.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    fn excluded(&self, relative: &str) -> bool {
        self.patterns
            .iter()
            .filter(|p| p.negated)
            .any(|p| p.matches(relative))
    }

    /// Whether an absolute path is selected by this file-set.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(relative) = relative_str(&self.root, path) else {
            return false;
        };
        self.patterns
            .iter()
            .any(|p| !p.negated && p.matches(&relative))
            && !self.excluded(&relative)
    }

    /// Expand the file-set into files, in pattern order.
    pub fn resolve(&self) -> Result<Vec<SourceFile>> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for pattern in self.patterns.iter().filter(|p| !p.negated) {
            let candidates = if pattern.literal {
                let path = self.root.join(pattern.raw.trim().trim_start_matches("./"));
                if !path.is_file() {
                    return Err(Error::MissingInput(path));
                }
                vec![path]
            } else {
                let mut found = Vec::new();
                walk_files(&self.root.join(&pattern.base), &mut found)?;
                found.sort();
                found
                    .into_iter()
                    .filter(|path| {
                        relative_str(&self.root, path)
                            .map(|rel| pattern.matches(&rel))
                            .unwrap_or(false)
                    })
                    .collect()
            };

            for path in candidates {
                let Some(rel) = relative_str(&self.root, &path) else {
                    continue;
                };
                if self.excluded(&rel) || !seen.insert(path.clone()) {
                    continue;
                }
                let base = self.root.join(self.base.as_deref().unwrap_or(&pattern.base));
                let relative = path
                    .strip_prefix(&base)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| PathBuf::from(path.file_name().unwrap_or_default()));
                files.push(SourceFile { path, relative });
            }
        }

        slog_debug!(
            "FileSet resolved {} file(s) from [{}]",
            files.len(),
            self.patterns
                .iter()
                .map(|p| p.raw.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(files)
    }
}

/// `/`-separated path of `path` below `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
    )
}

/// Collect files below `dir`. Symlinked directories are not descended into.
fn walk_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk_files(&path, out)?;
        } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
            out.push(path);
        }
    }
    Ok(())
}
