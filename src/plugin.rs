//! Plugins extend a [`PublishingContext`] before any content is read.

use crate::context::PublishingContext;
use crate::highlight::Highlighter;

pub trait Plugin {
    /// A human-readable name, used in step names and logs.
    fn name(&self) -> &str;

    fn install(&self, context: &mut PublishingContext);
}

/// Highlights fenced code blocks, emitting CSS classes that start with
/// `class_prefix`.
pub struct SyntaxHighlighting {
    pub class_prefix: String,
}

impl Plugin for SyntaxHighlighting {
    fn name(&self) -> &str {
        "Syntax highlighting"
    }

    fn install(&self, context: &mut PublishingContext) {
        context
            .markdown
            .set_highlighter(Highlighter::new(&self.class_prefix));
    }
}

/// The plugins installed for a site.
pub fn default_plugins(class_prefix: &str) -> Vec<Box<dyn Plugin>> {
    vec![Box::new(SyntaxHighlighting {
        class_prefix: class_prefix.to_owned(),
    })]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::config;

    #[test]
    fn test_syntax_highlighting_installs_highlighter() {
        let mut context = PublishingContext::new(config()).unwrap();
        assert!(!context.markdown.has_highlighter());

        let plugins = default_plugins("splash-");
        assert_eq!("Syntax highlighting", plugins[0].name());
        for plugin in &plugins {
            plugin.install(&mut context);
        }
        assert!(context.markdown.has_highlighter());
    }
}
