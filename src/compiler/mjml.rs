//! MJML to HTML compilation.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use mrml::prelude::render::RenderOptions;
use regex::{Captures, Regex};
use thiserror::Error;

/// Options forwarded to the MJML renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Keep `<!-- -->` comments from the source in the output.
    pub keep_comments: bool,
    /// Extra web fonts (name -> stylesheet URL).
    pub fonts: BTreeMap<String, String>,
    /// Decode `{{ ... }}` expressions that the renderer percent-encoded in `href`s.
    pub preserve_href_expressions: bool,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid MJML: {0}")]
    Parse(String),

    #[error("MJML rendering failed: {0}")]
    Render(String),
}

/// Compile rendered MJML text into a standalone HTML document.
pub fn compile(text: &str, options: &CompileOptions) -> Result<String, CompileError> {
    let parsed = mrml::parse(text).map_err(|e| CompileError::Parse(e.to_string()))?;

    let mut render_options = RenderOptions::default();
    render_options.disable_comments = !options.keep_comments;
    render_options.fonts.extend(
        options
            .fonts
            .iter()
            .map(|(name, url)| (name.clone(), Cow::Owned(url.clone()))),
    );

    let html = parsed
        .render(&render_options)
        .map_err(|e| CompileError::Render(e.to_string()))?;

    if options.preserve_href_expressions {
        Ok(decode_href_expressions(&html).into_owned())
    } else {
        Ok(html)
    }
}

/// Undo percent-encoding of template expressions inside `href="..."`.
///
/// `href="%7B%7B%20.url%20%7D%7D"` -> `href="{{ .url }}"`
fn decode_href_expressions(html: &str) -> Cow<'_, str> {
    static RE_ENCODED_HREF: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"href="(%7[bB]%7[bB].*?%7[dD]%7[dD])""#).unwrap()
    });

    RE_ENCODED_HREF.replace_all(html, |caps: &Captures<'_>| {
        let decoded = caps[1]
            .replace("%7B", "{")
            .replace("%7b", "{")
            .replace("%7D", "}")
            .replace("%7d", "}")
            .replace("%20", " ");
        format!("href=\"{decoded}\"")
    })
}
