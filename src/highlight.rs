//! Syntax highlighting for fenced code blocks. Highlighted code is emitted as
//! `<span>`s carrying prefixed CSS classes (e.g. `splash-keyword`) so that the
//! theme's stylesheet decides the colors.

use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use thiserror::Error;

// syntect only takes a 'static class prefix. Each distinct prefix is leaked
// once per process and shared by every highlighter using it.
static PREFIXES: OnceLock<Mutex<HashMap<String, &'static str>>> = OnceLock::new();

fn static_prefix(prefix: &str) -> &'static str {
    let mut prefixes = PREFIXES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(leaked) = prefixes.get(prefix).copied() {
        return leaked;
    }
    let leaked: &'static str = Box::leak(prefix.to_owned().into_boxed_str());
    prefixes.insert(prefix.to_owned(), leaked);
    leaked
}

pub struct Highlighter {
    syntax_set: SyntaxSet,
    class_style: ClassStyle,
}

impl Highlighter {
    /// Creates a highlighter whose CSS classes start with `class_prefix`.
    pub fn new(class_prefix: &str) -> Highlighter {
        let class_style = if class_prefix.is_empty() {
            ClassStyle::Spaced
        } else {
            ClassStyle::SpacedPrefixed {
                prefix: static_prefix(class_prefix),
            }
        };
        Highlighter {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            class_style,
        }
    }

    /// Highlights `code` written in `language` and returns a complete
    /// `<pre><code>` block. Unknown or missing languages are rendered as plain
    /// text.
    pub fn highlight(&self, language: Option<&str>, code: &str) -> Result<String> {
        let token = language.filter(|l| !l.is_empty()).unwrap_or("text");
        let syntax = find_syntax(&self.syntax_set, token)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut code = code.to_owned();
        if !code.ends_with('\n') {
            code.push('\n');
        }

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntax_set,
            self.class_style,
        );
        for line in LinesWithEndings::from(&code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| Error::Highlight {
                    language: token.to_owned(),
                    message: err.to_string(),
                })?;
        }

        let mut language_class = String::new();
        escape_html(&mut language_class, &token.to_ascii_lowercase())?;
        Ok(format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            language_class,
            generator.finalize()
        ))
    }
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let lowercase = token.to_ascii_lowercase();
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_name(token))
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Returned when syntect fails on a line of code.
    #[error("highlighting `{language}` code: {message}")]
    Highlight { language: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_highlight_known_language() {
        let highlighter = Highlighter::new("splash-");
        let html = highlighter
            .highlight(Some("rust"), "fn main() {}")
            .unwrap();
        assert!(html.starts_with("<pre><code class=\"language-rust\">"));
        assert!(html.contains("splash-"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let highlighter = Highlighter::new("splash-");
        let html = highlighter
            .highlight(Some("no-such-language"), "a < b")
            .unwrap();
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn test_prefix_is_leaked_once() {
        let first = static_prefix("leak-once-");
        let second = static_prefix("leak-once-");
        assert!(std::ptr::eq(first, second));
        assert!(!std::ptr::eq(first, static_prefix("other-")));
        assert_eq!("leak-once-", first);
    }

    #[test]
    fn test_missing_language() {
        let highlighter = Highlighter::new("");
        let html = highlighter.highlight(None, "plain").unwrap();
        assert!(html.starts_with("<pre><code class=\"language-text\">"));
    }
}
