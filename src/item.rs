//! Defines [`Item`] and [`Page`], the two kinds of documents parsed from the
//! content directory.

use crate::tag::Tag;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// The human-readable date format used in item lists, e.g. `Jan 4, 2021`.
const DISPLAY_DATE_FORMAT: &str = "%b %-d, %Y";

/// A single post belonging to a section.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    /// The id of the owning section.
    pub section: String,

    /// The source file name less the `.md` extension. It is the last
    /// component of the item's route.
    pub stem: String,

    pub title: String,

    pub description: String,

    /// The publish date. Items written without a time of day are published
    /// at midnight.
    pub date: NaiveDateTime,

    /// The item's tags, iterated in label order regardless of the order they
    /// were written in.
    pub tags: BTreeSet<Tag>,

    /// The rendered HTML body.
    pub body: String,
}

impl Item {
    /// The item's route, e.g. `/articles/hello-world/`.
    pub fn path(&self) -> String {
        format!("/{}/{}/", self.section, self.stem)
    }

    /// The publish date formatted for display.
    pub fn display_date(&self) -> String {
        self.date.format(DISPLAY_DATE_FORMAT).to_string()
    }

    /// Whether the item carries `tag`.
    pub fn is_tagged(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }
}

/// A standalone document that doesn't belong to a section, such as an
/// "about" page or the custom 404 page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// The source file name less the `.md` extension.
    pub name: String,
    pub title: String,
    pub description: String,
    pub body: String,
}

impl Page {
    /// The page's route, e.g. `/about/`.
    pub fn path(&self) -> String {
        format!("/{}/", self.name)
    }
}
