use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Header prepended to every generated page.
pub const FRONT_MATTER: &str = "---\nlayout: page\n---\n\n";

/// How the opening line of a fenced code block is rewritten.
///
/// A fence-open line is a line starting with ```` ``` ```` immediately
/// followed by `language`; anything after the language tag up to the line
/// terminator is its trailing content.
///
/// - `all = false` rewrites only the first such line, `true` rewrites all.
/// - `keep_trailing = false` replaces the whole line with ```` ```marker ````;
///   `true` appends the trailing content after the marker.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FenceRule {
    pub language: String,
    pub marker: String,
    pub all: bool,
    pub keep_trailing: bool,
}

impl Default for FenceRule {
    fn default() -> Self {
        Self {
            language: "php".to_string(),
            marker: "php?start_inline".to_string(),
            all: false,
            keep_trailing: false,
        }
    }
}

impl FenceRule {
    /// Build the matcher for this rule. Do it once per run and reuse it.
    pub fn compile(&self) -> Result<Fence> {
        // `[^\r\n]*` keeps CRLF terminators out of the trailing content.
        let re = format!(r"(?m)^```{}([^\r\n]*)", regex::escape(&self.language));
        let re = Regex::new(&re)
            .with_context(|| format!("invalid fence language {:?}", self.language))?;
        Ok(Fence {
            rule: self.clone(),
            re,
        })
    }
}

/// A [`FenceRule`] with its regex compiled.
#[derive(Debug, Clone)]
pub struct Fence {
    rule: FenceRule,
    re: Regex,
}

impl Fence {
    /// Rewrite fence-open lines in `text`.
    ///
    /// Returns the input borrowed and untouched when nothing matches.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let limit = if self.rule.all { 0 } else { 1 };
        self.re.replacen(text, limit, |caps: &Captures| {
            if self.rule.keep_trailing {
                format!("```{}{}", self.rule.marker, &caps[1])
            } else {
                format!("```{}", self.rule.marker)
            }
        })
    }
}

/// Build the final page: front matter followed by the rewritten markdown.
pub fn render_page(markdown: &str, fence: &Fence) -> String {
    let body = fence.apply(markdown);
    let mut out = String::with_capacity(FRONT_MATTER.len() + body.len());
    out.push_str(FRONT_MATTER);
    out.push_str(&body);
    out
}

/// Read `rel` from inside a working copy.
///
/// # Errors
/// Missing, unreadable or non-UTF-8 files; the error names the file.
pub fn read_source(working_copy: &Path, rel: &str) -> Result<String> {
    let p = working_copy.join(rel);
    fs::read_to_string(&p).with_context(|| format!("cannot read source file: {}", p.display()))
}
