//! Loads the site description from a `site.yaml` project file. The project
//! file is searched for in the given directory and then in each of its
//! parents, so the tool can be run from anywhere inside a project.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "site.yaml";

/// The site's identity. Read-only for the duration of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub name: String,
    pub description: String,

    /// The site's base URL. Always ends in a trailing slash.
    pub url: Url,

    /// The language tag, e.g. `en`.
    pub language: String,

    /// Site-relative path to the favicon, if any.
    pub favicon: Option<String>,

    /// Site-relative path to the image used when the site is shared on
    /// social media, if any.
    pub image: Option<String>,
}

impl SiteConfig {
    /// Returns the absolute URL for a site-relative `path`.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.url.as_str().trim_end_matches('/'),
            if path.starts_with('/') {
                path.to_owned()
            } else {
                format!("/{}", path)
            }
        )
    }
}

/// A section as declared in the project file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SectionConfig {
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,
}

impl SectionConfig {
    /// The configured title, or the id with its first letter capitalized.
    pub fn title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => {
                let mut chars = self.id.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// Settings for the RSS feed.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FeedConfig {
    /// The sections whose items appear in the feed. Empty means all
    /// sections.
    #[serde(default)]
    pub sections: Vec<String>,

    #[serde(default = "default_feed_max_items")]
    pub max_items: usize,

    /// Site-relative path of the feed document.
    #[serde(default = "default_feed_path")]
    pub path: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            sections: Vec::new(),
            max_items: default_feed_max_items(),
            path: default_feed_path(),
        }
    }
}

fn default_feed_max_items() -> usize {
    100
}

fn default_feed_path() -> String {
    String::from("feed.rss")
}

/// Settings for the analytics script included in every page's head.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AnalyticsConfig {
    /// The GoatCounter endpoint, e.g. `https://me.goatcounter.com/count`.
    pub goatcounter: String,
}

/// An external link shown in the footer.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Link {
    pub title: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct FooterConfig {
    #[serde(default)]
    pub copyright_year: Option<u32>,

    #[serde(default)]
    pub links: Vec<Link>,
}

/// Where `publish` pushes the generated site.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DeployConfig {
    /// The git remote, e.g. `git@github.com:me/me.github.io.git`.
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    String::from("master")
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct HighlightConfig {
    /// Prefix for the CSS classes emitted for highlighted code.
    #[serde(default = "default_class_prefix")]
    pub class_prefix: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            class_prefix: default_class_prefix(),
        }
    }
}

fn default_class_prefix() -> String {
    String::from("splash-")
}

fn default_language() -> String {
    String::from("en")
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("Output")
}

/// The on-disk shape of `site.yaml`.
#[derive(Deserialize)]
struct Project {
    name: String,
    description: String,
    url: String,

    #[serde(default = "default_language")]
    language: String,

    #[serde(default)]
    favicon: Option<String>,

    #[serde(default)]
    image: Option<String>,

    sections: Vec<SectionConfig>,

    #[serde(default)]
    feed: FeedConfig,

    #[serde(default)]
    analytics: Option<AnalyticsConfig>,

    #[serde(default)]
    footer: FooterConfig,

    #[serde(default)]
    deploy: Option<DeployConfig>,

    #[serde(default)]
    highlight: HighlightConfig,

    #[serde(default)]
    minify: bool,

    #[serde(default = "default_output_directory")]
    output_directory: PathBuf,
}

/// The resolved configuration for a publish run. All directories are
/// absolute or relative to the working directory, never to the project file.
#[derive(Clone, Debug)]
pub struct Config {
    pub site: SiteConfig,
    pub sections: Vec<SectionConfig>,
    pub feed: FeedConfig,
    pub analytics: Option<AnalyticsConfig>,
    pub footer: FooterConfig,
    pub deploy: Option<DeployConfig>,
    pub highlight: HighlightConfig,

    /// Whether generated HTML and CSS are minified.
    pub minify: bool,

    /// The directory containing `site.yaml`.
    pub root_directory: PathBuf,

    /// Markdown sources: `{root_directory}/content`.
    pub content_directory: PathBuf,

    /// Static files copied verbatim: `{root_directory}/Resources`.
    pub resources_directory: PathBuf,

    pub output_directory: PathBuf,

    /// The git working copy used while deploying:
    /// `{root_directory}/.publish`.
    pub staging_directory: PathBuf,
}

impl Config {
    /// Looks for [`PROJECT_FILE`] in `dir` and then in each ancestor of `dir`,
    /// and loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(dir) = current {
            let path = dir.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path);
            }
            current = dir.parent();
        }
        Err(Error::NotFound(dir.to_owned()))
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project =
            serde_yaml::from_reader(file).map_err(|err| Error::Yaml {
                path: path.to_owned(),
                err,
            })?;
        let root = match path.parent() {
            Some(root) => root,
            None => return Err(Error::NoParent(path.to_owned())),
        };
        Config::from_project(project, root)
    }

    /// Loads a project from YAML `contents` as if the project file lived in
    /// `root`.
    pub fn from_project_str(contents: &str, root: &Path) -> Result<Config> {
        let project: Project =
            serde_yaml::from_str(contents).map_err(|err| Error::Yaml {
                path: root.join(PROJECT_FILE),
                err,
            })?;
        Config::from_project(project, root)
    }

    fn from_project(project: Project, root: &Path) -> Result<Config> {
        let mut url = Url::parse(&project.url)
            .map_err(|err| Error::InvalidUrl { url: project.url.clone(), err })?;
        if url.cannot_be_a_base() {
            return Err(Error::Invalid(format!(
                "site url `{}` must be an absolute http(s) URL",
                project.url
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        validate_sections(&project.sections)?;
        for id in &project.feed.sections {
            if !project.sections.iter().any(|s| &s.id == id) {
                return Err(Error::Invalid(format!(
                    "feed section `{}` is not a configured section",
                    id
                )));
            }
        }

        Ok(Config {
            site: SiteConfig {
                name: project.name,
                description: project.description,
                url,
                language: project.language,
                favicon: project.favicon,
                image: project.image,
            },
            sections: project.sections,
            feed: project.feed,
            analytics: project.analytics,
            footer: project.footer,
            deploy: project.deploy,
            highlight: project.highlight,
            minify: project.minify,
            root_directory: root.to_owned(),
            content_directory: root.join("content"),
            resources_directory: root.join("Resources"),
            output_directory: root.join(project.output_directory),
            staging_directory: root.join(".publish"),
        })
    }

    /// The sections included in the RSS feed.
    pub fn feed_sections(&self) -> Vec<&str> {
        if self.feed.sections.is_empty() {
            self.sections.iter().map(|s| s.id.as_str()).collect()
        } else {
            self.feed.sections.iter().map(String::as_str).collect()
        }
    }
}

fn validate_sections(sections: &[SectionConfig]) -> Result<()> {
    if sections.is_empty() {
        return Err(Error::Invalid(String::from(
            "at least one section must be configured",
        )));
    }

    let mut seen = HashSet::new();
    for section in sections {
        if section.id.is_empty()
            || section.id != slug::slugify(&section.id)
        {
            return Err(Error::Invalid(format!(
                "section id `{}` must be a lowercase slug",
                section.id
            )));
        }
        if section.id == "tags" {
            return Err(Error::Invalid(String::from(
                "section id `tags` collides with the tag pages",
            )));
        }
        if !seen.insert(section.id.as_str()) {
            return Err(Error::Invalid(format!(
                "section `{}` is declared twice",
                section.id
            )));
        }
    }
    Ok(())
}

/// The result of loading a configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem finding, reading or validating the project file.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when no project file exists in a directory or its ancestors.
    #[error("could not find `{}` in `{}` or any parent directory", PROJECT_FILE, .0.display())]
    NotFound(PathBuf),

    /// Returned when the project file can't be opened.
    #[error("opening project file `{}`: {err}", path.display())]
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid YAML for a project.
    #[error("loading project file `{}`: {err}", path.display())]
    Yaml { path: PathBuf, err: serde_yaml::Error },

    /// Returned when the project file path has no parent directory.
    #[error("can't get parent directory for project file `{}`", .0.display())]
    NoParent(PathBuf),

    /// Returned when the site URL doesn't parse.
    #[error("invalid site url `{url}`: {err}")]
    InvalidUrl { url: String, err: url::ParseError },

    /// Returned when the project is well-formed YAML but inconsistent.
    #[error("invalid project: {0}")]
    Invalid(String),
}
