//! The state shared by the steps of one publish run.

use crate::config::Config;
use crate::content::ContentStore;
use crate::markdown::MarkdownParser;
use crate::theme::{self, Theme};
use std::path::Path;

/// Owns everything a publish run reads and builds: the configuration, the
/// content parsed so far, the Markdown parser (which plugins may extend) and
/// the theme.
pub struct PublishingContext {
    pub config: Config,
    pub content: ContentStore,
    pub markdown: MarkdownParser,
    pub theme: Theme,
}

impl PublishingContext {
    /// Creates a context with empty content for `config`, using the primary
    /// theme.
    pub fn new(config: Config) -> theme::Result<PublishingContext> {
        Ok(PublishingContext {
            content: ContentStore::new(&config.sections),
            markdown: MarkdownParser::new(),
            theme: Theme::primary()?,
            config,
        })
    }

    pub fn output_directory(&self) -> &Path {
        &self.config.output_directory
    }
}
