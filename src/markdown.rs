use crate::highlight::{Error as HighlightError, Highlighter};
use pulldown_cmark::*;
use thiserror::Error;

/// Converts Markdown documents to HTML. Fenced and indented code blocks are
/// passed through the installed [`Highlighter`], if any.
#[derive(Default)]
pub struct MarkdownParser {
    highlighter: Option<Highlighter>,
}

impl MarkdownParser {
    pub fn new() -> MarkdownParser {
        MarkdownParser::default()
    }

    /// Installs `highlighter` for all subsequent conversions.
    pub fn set_highlighter(&mut self, highlighter: Highlighter) {
        self.highlighter = Some(highlighter);
    }

    pub fn has_highlighter(&self) -> bool {
        self.highlighter.is_some()
    }

    /// Converts `markdown` to HTML.
    pub fn to_html(&self, markdown: &str) -> Result<String, Error> {
        let mut events = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for ev in Parser::new_ext(markdown, options()) {
            let highlighter = match &self.highlighter {
                Some(highlighter) => highlighter,
                None => {
                    events.push(ev);
                    continue;
                }
            };
            match ev {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_block = Some((language(&kind), String::new()));
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::End(Tag::CodeBlock(_)) => {
                    if let Some((language, code)) = code_block.take() {
                        let html = highlighter.highlight(language.as_deref(), &code)?;
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }
                ev => events.push(ev),
            }
        }

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html, events.into_iter());
        Ok(html)
    }
}

/// Returns the text of the first top-level (`#`) heading in `markdown`, if
/// any.
pub fn first_heading(markdown: &str) -> Option<String> {
    let mut heading: Option<String> = None;
    for ev in Parser::new_ext(markdown, options()) {
        match ev {
            Event::Start(Tag::Heading(1)) if heading.is_none() => {
                heading = Some(String::new())
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = heading.as_mut() {
                    heading.push_str(&text);
                }
            }
            Event::End(Tag::Heading(1)) if heading.is_some() => break,
            _ => {}
        }
    }
    heading.map(|h| h.trim().to_owned()).filter(|h| !h.is_empty())
}

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

// The language of a fenced block is the first word of its info string.
fn language(kind: &CodeBlockKind) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info
            .split_whitespace()
            .next()
            .map(|word| word.to_owned()),
        CodeBlockKind::Indented => None,
    }
}

/// Represents an error converting markdown to HTML.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a code block can't be highlighted.
    #[error(transparent)]
    Highlight(#[from] HighlightError),
}
