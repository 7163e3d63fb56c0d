//! Defines the [`Parser`] and [`Error`] types, and the logic for reading the
//! content directory into a [`ContentStore`].
//!
//! The content directory is laid out as follows:
//!
//! ```text
//! content/
//!   index.md            metadata for the home page
//!   about.md            a page, published at /about/
//!   404.md              the page relocated to /404.html
//!   articles/           a configured section
//!     index.md          metadata for the section
//!     hello-world.md    an item, published at /articles/hello-world/
//! ```
//!
//! Every Markdown file may begin with YAML frontmatter between `---` fences:
//!
//! ```md
//! ---
//! title: Hello, world!
//! description: The first post
//! date: 2021-01-04 10:30
//! tags: [swift, ios]
//! ---
//! Body
//! ```

use crate::config::SectionConfig;
use crate::content::{ContentStore, Metadata};
use crate::item::{Item, Page};
use crate::markdown::{self, first_heading, MarkdownParser};
use crate::tag::Tag;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = "md";
const INDEX_STEM: &str = "index";
const TAGS_DIRECTORY: &str = "tags";

/// The date formats accepted in frontmatter, tried in order.
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses the content directory into a [`ContentStore`].
pub struct Parser<'a> {
    markdown: &'a MarkdownParser,
}

impl<'a> Parser<'a> {
    /// Constructs a parser which renders bodies with `markdown`.
    pub fn new(markdown: &'a MarkdownParser) -> Parser<'a> {
        Parser { markdown }
    }

    /// Reads every Markdown file under `content_directory`. Files are visited
    /// in file-name order so ingestion is deterministic. Directories that
    /// aren't configured sections are skipped with a warning.
    pub fn parse_content(
        &self,
        content_directory: &Path,
        sections: &[SectionConfig],
    ) -> Result<ContentStore> {
        if !content_directory.is_dir() {
            return Err(Error::MissingContentDirectory(
                content_directory.to_owned(),
            ));
        }

        let mut store = ContentStore::new(sections);
        let mut entries = WalkDir::new(content_directory)
            .min_depth(1)
            .max_depth(2)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter();

        while let Some(result) = entries.next() {
            let entry = result?;
            let path = entry.path();

            if entry.file_type().is_dir() {
                if entry.depth() > 1 || !is_section(sections, path) {
                    warn!("skipping unknown content directory `{}`", path.display());
                    entries.skip_current_dir();
                }
                continue;
            }

            if path.extension().map_or(true, |e| e != MARKDOWN_EXTENSION) {
                debug!("skipping non-Markdown file `{}`", path.display());
                continue;
            }

            debug!("parsing `{}`", path.display());
            self.parse_file(&mut store, path, entry.depth())
                .map_err(|err| {
                    Error::Annotated(
                        format!("parsing `{}`", path.display()),
                        Box::new(err),
                    )
                })?;
        }

        check_tag_routes(&store)?;
        Ok(store)
    }

    fn parse_file(
        &self,
        store: &mut ContentStore,
        path: &Path,
        depth: usize,
    ) -> Result<()> {
        let stem = file_stem(path)?;
        let contents = fs::read_to_string(path)?;
        let (frontmatter, markdown) = split_frontmatter(&contents)?;
        let title = frontmatter
            .title
            .clone()
            .or_else(|| first_heading(markdown));
        let description = frontmatter.description.clone().unwrap_or_default();

        match (depth, stem == INDEX_STEM) {
            (1, true) => {
                store.index = Metadata {
                    title: title.unwrap_or_default(),
                    description,
                };
            }
            (1, false) => {
                if store.section(stem).is_some() || stem == TAGS_DIRECTORY {
                    return Err(Error::RouteCollision(stem.to_owned()));
                }
                store.add_page(Page {
                    name: stem.to_owned(),
                    title: title.unwrap_or_default(),
                    description,
                    body: self.markdown.to_html(markdown)?,
                });
            }
            (_, is_index) => {
                let section_id = section_id(path)?;
                if is_index {
                    if let Some(section) = store.section_mut(section_id) {
                        if let Some(title) = title {
                            section.title = title;
                        }
                        section.description = description;
                    }
                    return Ok(());
                }

                let date = match &frontmatter.date {
                    Some(date) => parse_date(date)?,
                    None => modification_date(path)?,
                };
                let item = Item {
                    section: section_id.to_owned(),
                    stem: stem.to_owned(),
                    title: title.unwrap_or_else(|| stem.to_owned()),
                    description,
                    date,
                    tags: frontmatter.tags(),
                    body: self.markdown.to_html(markdown)?,
                };
                if let Err(item) = store.add_item(item) {
                    return Err(Error::UnknownSection(item.section));
                }
            }
        }
        Ok(())
    }
}

fn is_section(sections: &[SectionConfig], dir: &Path) -> bool {
    dir.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| sections.iter().any(|s| s.id == name))
}

fn file_stem(path: &Path) -> Result<&str> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| Error::InvalidFileName(path.to_owned()))
}

// The section of an item is the name of the directory containing it.
fn section_id(path: &Path) -> Result<&str> {
    path.parent()
        .and_then(|dir| dir.file_name())
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::InvalidFileName(path.to_owned()))
}

fn modification_date(path: &Path) -> Result<NaiveDateTime> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}

// Each tag must own its details page: a shared slug would overwrite a page
// and an empty slug would overwrite the tag list.
fn check_tag_routes(store: &ContentStore) -> Result<()> {
    let mut routes: BTreeMap<String, Tag> = BTreeMap::new();
    for tag in store.all_tags() {
        if tag.slug().is_empty() {
            return Err(Error::EmptyTagSlug(tag.name().to_owned()));
        }
        let path = tag.path();
        if let Some(first) = routes.get(&path) {
            return Err(Error::TagRouteCollision {
                first: first.name().to_owned(),
                second: tag.name().to_owned(),
                path,
            });
        }
        routes.insert(path, tag);
    }
    Ok(())
}

/// Parses a frontmatter date. A bare date is taken to be at midnight.
pub fn parse_date(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    for format in DATE_TIME_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(date);
        }
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|source| Error::InvalidDate {
            value: value.to_owned(),
            source,
        })
}

// Returns the frontmatter and the remaining Markdown. Documents without an
// opening fence have empty frontmatter.
fn split_frontmatter(input: &str) -> Result<(Frontmatter, &str)> {
    fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
        const FENCE: &str = "---";
        const END_FENCE: &str = "\n---";
        match input[FENCE.len()..].find(END_FENCE) {
            None => Err(Error::FrontmatterMissingEndFence),
            Some(offset) => Ok((
                FENCE.len(),                            // yaml_start
                FENCE.len() + offset,                   // yaml_stop
                FENCE.len() + offset + END_FENCE.len(), // body_start
            )),
        }
    }

    let input = input.trim_start_matches('\u{feff}');
    if !input.starts_with("---") {
        return Ok((Frontmatter::default(), input));
    }

    let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
    let yaml = &input[yaml_start..yaml_stop];
    let frontmatter = if yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml)?
    };
    Ok((frontmatter, &input[body_start..]))
}

#[derive(Debug, Default, Deserialize)]
struct Frontmatter {
    #[serde(default, alias = "Title")]
    title: Option<String>,

    #[serde(default, alias = "Description")]
    description: Option<String>,

    #[serde(default, alias = "Date")]
    date: Option<String>,

    #[serde(default, alias = "Tags")]
    tags: Option<Tags>,
}

impl Frontmatter {
    fn tags(&self) -> BTreeSet<Tag> {
        let names: Vec<&str> = match &self.tags {
            None => Vec::new(),
            Some(Tags::List(tags)) => tags.iter().map(String::as_str).collect(),
            Some(Tags::Joined(tags)) => tags.split(',').collect(),
        };
        names
            .into_iter()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Tag::new)
            .collect()
    }
}

/// Tags may be written as a YAML list or as one comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Tags {
    List(Vec<String>),
    Joined(String),
}

/// Represents the result of a content-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing the content directory.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the content directory doesn't exist.
    #[error("content directory `{}` not found", .0.display())]
    MissingContentDirectory(PathBuf),

    /// Returned when a source file has an opening frontmatter fence (`---`)
    /// but no closing one.
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when a frontmatter date matches none of the accepted formats.
    #[error("invalid date `{value}`")]
    InvalidDate {
        value: String,
        source: chrono::ParseError,
    },

    /// Returned when a page would be published at the route of a section
    /// or of the tag list.
    #[error("page `{0}` collides with a section or the tag list")]
    RouteCollision(String),

    /// Returned when a tag label has no URL-safe characters, e.g. `+`.
    #[error("tag `{0}` has no URL-safe characters to build its page route from")]
    EmptyTagSlug(String),

    /// Returned when two distinct tags would share a details page.
    #[error("tags `{first}` and `{second}` would both be published at `{path}`")]
    TagRouteCollision {
        first: String,
        second: String,
        path: String,
    },

    /// Returned when an item lives in a directory that isn't a section.
    #[error("unknown section `{0}`")]
    UnknownSection(String),

    /// Returned when a file name isn't valid UTF-8.
    #[error("invalid file name: {}", .0.display())]
    InvalidFileName(PathBuf),

    /// Returned when a body can't be converted to HTML.
    #[error(transparent)]
    Markdown(#[from] markdown::Error),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, Box<Error>),
}
