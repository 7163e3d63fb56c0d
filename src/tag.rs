//! Defines the [`Tag`] type, which represents an [`crate::item::Item`] tag.

use std::fmt;

/// The route under which the tag list and the tag details pages live.
pub const TAGS_PATH: &str = "/tags/";

/// Represents an [`crate::item::Item`] tag. Tags are compared, hashed and
/// ordered by their label text, so two items tagged `swift` share one tag and
/// a sorted collection of tags is in lexicographic label order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    name: String,
}

impl Tag {
    /// Creates a tag from its label. Surrounding whitespace is dropped.
    pub fn new<S: AsRef<str>>(name: S) -> Tag {
        Tag {
            name: name.as_ref().trim().to_owned(),
        }
    }

    /// The tag's label as the author wrote it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The URL-safe form of the label, e.g. `Swift UI` becomes `swift-ui`.
    pub fn slug(&self) -> String {
        slug::slugify(&self.name)
    }

    /// The route of the tag's details page, e.g. `/tags/swift-ui/`.
    pub fn path(&self) -> String {
        format!("{}{}/", TAGS_PATH, self.slug())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.name.fmt(f)
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Tag {
        Tag::new(name)
    }
}
