//! The publishing steps. Each step reads and updates the
//! [`PublishingContext`]; [`crate::build`] runs them in order and names
//! them.

use crate::classifier::TagClassifier;
use crate::content::NOT_FOUND_PAGE;
use crate::context::PublishingContext;
use crate::parser::{self, Parser};
use crate::plugin::Plugin;
use crate::resources;
use crate::theme::{self, PageKind, RenderContext, STYLESHEET_PATH};
use crate::write::{self, Writer};
use crate::{deploy, feed, sitemap};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub fn install_plugin(context: &mut PublishingContext, plugin: &dyn Plugin) -> Result<()> {
    plugin.install(context);
    Ok(())
}

/// Copies the `Resources` folder, if there is one, and writes the theme's
/// combined stylesheet.
pub fn copy_resources(context: &mut PublishingContext) -> Result<()> {
    let copied = resources::copy_resources(
        &context.config.resources_directory,
        context.output_directory(),
    )?;
    debug!("copied {} resource files", copied);

    let css = resources::combine_stylesheets(context.theme.stylesheets(), context.config.minify);
    writer(context).write_file(
        Path::new(STYLESHEET_PATH.trim_start_matches('/')),
        css.as_bytes(),
    )?;
    Ok(())
}

/// Parses the content directory into the context's content store.
pub fn add_markdown_files(context: &mut PublishingContext) -> Result<()> {
    let content = Parser::new(&context.markdown)
        .parse_content(&context.config.content_directory, &context.config.sections)?;
    info!(
        "read {} items and {} pages",
        content.all_items().len(),
        content.pages().count()
    );
    context.content = content;
    Ok(())
}

/// Sorts every section's items newest first.
pub fn sort_items(context: &mut PublishingContext) -> Result<()> {
    context.content.sort_items();
    Ok(())
}

/// Renders every page of the site and writes it to the output directory.
/// The tag classifier is built here from the content being rendered.
pub fn generate_html(context: &mut PublishingContext) -> Result<()> {
    let content = &context.content;
    let classifier = TagClassifier::new(&content.all_tags());
    let cx = RenderContext {
        config: &context.config,
        content,
        classifier: &classifier,
    };
    let writer = writer(context);

    let pages = PageKind::all(content, &classifier);
    for page in &pages {
        let html = context.theme.render(*page, &cx)?;
        writer.write_page(&page.path(), &html)?;
    }
    info!(
        "generated {} pages ({} tags)",
        pages.len(),
        classifier.len()
    );
    Ok(())
}

/// Moves the 404 page from `404/index.html` to `404.html`, where GitHub
/// Pages looks for it, and removes its folder.
pub fn move_404_file(context: &mut PublishingContext) -> Result<()> {
    let page = context
        .content
        .page(NOT_FOUND_PAGE)
        .ok_or_else(|| Error::MissingPage(NOT_FOUND_PAGE.to_owned()))?;

    let output = context.output_directory();
    let folder = output.join(page.path().trim_matches('/'));
    let from = folder.join("index.html");
    let to = output.join(format!("{}.html", NOT_FOUND_PAGE));

    fs::rename(&from, &to).map_err(|err| Error::Io {
        path: from.clone(),
        err,
    })?;
    fs::remove_dir_all(&folder).map_err(|err| Error::Io { path: folder, err })?;
    Ok(())
}

pub fn generate_rss_feed(context: &mut PublishingContext) -> Result<()> {
    feed::write_feed(&writer(context), &context.config, &context.content)?;
    Ok(())
}

pub fn generate_site_map(context: &mut PublishingContext) -> Result<()> {
    sitemap::write_sitemap(&writer(context), &context.config, &context.content)?;
    Ok(())
}

/// Pushes the output directory to the configured git remote.
pub fn deploy(context: &mut PublishingContext) -> Result<()> {
    let config = context
        .config
        .deploy
        .as_ref()
        .ok_or(Error::MissingDeployConfig)?;
    deploy::deploy(
        config,
        &context.config.output_directory,
        &context.config.staging_directory,
    )?;
    Ok(())
}

fn writer(context: &PublishingContext) -> Writer<'_> {
    Writer {
        output_directory: context.output_directory(),
        minify: context.config.minify,
    }
}

/// The result of a step.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a step failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Resources(#[from] resources::Error),

    #[error(transparent)]
    Parse(#[from] parser::Error),

    #[error(transparent)]
    Render(#[from] theme::Error),

    #[error(transparent)]
    Write(#[from] write::Error),

    #[error(transparent)]
    Feed(#[from] feed::Error),

    #[error(transparent)]
    Sitemap(#[from] sitemap::Error),

    #[error(transparent)]
    Deploy(#[from] deploy::Error),

    /// Returned when a page a step depends on doesn't exist.
    #[error("unable to find `{0}` page")]
    MissingPage(String),

    /// Returned when deploying without a `deploy` section in the project
    /// file.
    #[error("no deployment method is configured")]
    MissingDeployConfig,

    #[error("moving `{}`: {err}", path.display())]
    Io { path: PathBuf, err: std::io::Error },
}
