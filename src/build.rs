//! Exports the [`build_site`] function which runs the named publishing
//! steps ([`crate::steps`]) in order over one [`PublishingContext`]: install
//! plugins, copy resources, parse the content, sort it, render the HTML,
//! relocate the 404 page, write the RSS feed and the sitemap, and optionally
//! deploy.

use crate::config::Config;
use crate::context::PublishingContext;
use crate::plugin::{default_plugins, Plugin};
use crate::steps;
use crate::theme;
use crate::write;
use log::info;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

type Run = Box<dyn Fn(&mut PublishingContext) -> steps::Result<()>>;

/// A named unit of publishing work. Failures are reported with the step's
/// name.
pub struct Step {
    pub name: String,
    run: Run,
}

impl Step {
    pub fn new<F>(name: &str, run: F) -> Step
    where
        F: Fn(&mut PublishingContext) -> steps::Result<()> + 'static,
    {
        Step {
            name: name.to_owned(),
            run: Box::new(run),
        }
    }

    /// Installs `plugin` into the context.
    pub fn install_plugin(plugin: Box<dyn Plugin>) -> Step {
        let name = format!("Install plugin '{}'", plugin.name());
        Step::new(&name, move |context| {
            steps::install_plugin(context, plugin.as_ref())
        })
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish()
    }
}

/// The steps that publish a site, in order. The deploy step is only
/// included when `deploy` is set.
pub fn default_steps(config: &Config, deploy: bool) -> Vec<Step> {
    let mut steps: Vec<Step> = default_plugins(&config.highlight.class_prefix)
        .into_iter()
        .map(Step::install_plugin)
        .collect();
    steps.push(Step::new("Copy resources", steps::copy_resources));
    steps.push(Step::new("Add Markdown files", steps::add_markdown_files));
    steps.push(Step::new("Sort items", steps::sort_items));
    steps.push(Step::new("Generate HTML", steps::generate_html));
    steps.push(Step::new(
        "Move 404 file for GitHub Pages",
        steps::move_404_file,
    ));
    steps.push(Step::new("Generate RSS feed", steps::generate_rss_feed));
    steps.push(Step::new("Generate site map", steps::generate_site_map));
    if deploy {
        steps.push(Step::new("Deploy", steps::deploy));
    }
    steps
}

/// Cleans the output directory and runs `steps` in order. The first failing
/// step aborts the run.
pub fn run(context: &mut PublishingContext, steps: &[Step]) -> Result<()> {
    check_output_directory(&context.config)?;
    write::clean(context.output_directory())?;
    for (i, step) in steps.iter().enumerate() {
        info!("[{}/{}] {}", i + 1, steps.len(), step.name);
        (step.run)(&mut *context).map_err(|source| Error::Step {
            step: step.name.clone(),
            source,
        })?;
    }
    info!(
        "published `{}` to `{}`",
        context.config.site.name,
        context.output_directory().display()
    );
    Ok(())
}

// The output directory is deleted before every run, so it must not overlap
// the project root or any of the directories the run reads from.
fn check_output_directory(config: &Config) -> Result<()> {
    let output = resolve(&config.output_directory);
    if resolve(&config.root_directory).starts_with(&output) {
        return Err(Error::UnsafeOutput {
            output: config.output_directory.clone(),
            protected: config.root_directory.clone(),
        });
    }
    let protected = [
        &config.content_directory,
        &config.resources_directory,
        &config.staging_directory,
    ];
    for directory in protected.iter() {
        let resolved = resolve(directory);
        if resolved.starts_with(&output) || output.starts_with(&resolved) {
            return Err(Error::UnsafeOutput {
                output: config.output_directory.clone(),
                protected: directory.to_path_buf(),
            });
        }
    }
    Ok(())
}

// Absolute and, where the path exists, canonical.
fn resolve(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_owned()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_owned())
    };
    absolute.canonicalize().unwrap_or(absolute)
}

/// Builds the site described by `config`, deploying it afterwards if
/// `deploy` is set.
pub fn build_site(config: Config, deploy: bool) -> Result<()> {
    let steps = default_steps(&config, deploy);
    let mut context = PublishingContext::new(config)?;
    run(&mut context, &steps)
}

/// The result of a publish run.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for publishing a site.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the theme can't be loaded.
    #[error("loading theme")]
    Theme(#[from] theme::Error),

    /// Returned when the output directory can't be cleaned.
    #[error("cleaning output directory")]
    Clean(#[from] write::Error),

    /// Returned when the output directory overlaps the project root or one
    /// of its source directories, since it's deleted before every run.
    #[error(
        "refusing to use `{}` as the output directory: it overlaps `{}`",
        .output.display(),
        .protected.display()
    )]
    UnsafeOutput { output: PathBuf, protected: PathBuf },

    /// Returned when a step fails.
    #[error("step '{step}' failed")]
    Step { step: String, source: steps::Error },
}
