//! Assigns every tag a CSS class from a small, fixed alphabet so the theme
//! can color tag pills without one stylesheet rule per tag.
//!
//! Classes are assigned in sorted tag order and the alphabet is reused
//! cyclically: with the default eight letters, the ninth tag gets `tag-a`
//! again. Because assignment depends only on the sorted set, rebuilding the
//! site never shuffles colors between tags unless the tag set itself changes.

use crate::tag::Tag;
use std::collections::BTreeMap;
use thiserror::Error;

/// The letters cycled through when assigning tag classes.
pub const ALPHABET: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];

/// The class every tag carries in addition to its lettered class.
const BASE_CLASS: &str = "tag";

/// Maps each tag of one content snapshot to its CSS class. Build one per
/// publish run from the same content that is being rendered.
#[derive(Clone, Debug, Default)]
pub struct TagClassifier {
    classes: BTreeMap<Tag, String>,
}

impl TagClassifier {
    /// Builds the classifier for `tags` using [`ALPHABET`]. Duplicates are
    /// ignored and the order of `tags` doesn't matter.
    pub fn new<'a, I>(tags: I) -> TagClassifier
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        TagClassifier {
            classes: assign(tags, &ALPHABET),
        }
    }

    /// Like [`TagClassifier::new`] but cycles through `alphabet` instead.
    pub fn with_alphabet<'a, I>(tags: I, alphabet: &[&str]) -> Result<TagClassifier>
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        if alphabet.is_empty() {
            return Err(Error::EmptyAlphabet);
        }
        Ok(TagClassifier {
            classes: assign(tags, alphabet),
        })
    }

    /// Returns the class for `tag`. A tag outside the set the classifier was
    /// built from means the classifier and the content being rendered come
    /// from different snapshots.
    pub fn class_of(&self, tag: &Tag) -> Result<&str> {
        self.classes
            .get(tag)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownTag(tag.name().to_owned()))
    }

    /// The classified tags in sorted order, with their classes.
    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &str)> {
        self.classes.iter().map(|(tag, class)| (tag, class.as_str()))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

fn assign<'a, I>(tags: I, alphabet: &[&str]) -> BTreeMap<Tag, String>
where
    I: IntoIterator<Item = &'a Tag>,
{
    let mut sorted: Vec<&Tag> = tags.into_iter().collect();
    sorted.sort();
    sorted.dedup();

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, tag)| {
            let letter = alphabet[i % alphabet.len()];
            (tag.clone(), format!("{} {}-{}", BASE_CLASS, BASE_CLASS, letter))
        })
        .collect()
}

/// The result of a fallible classifier operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a misuse of the classifier. Both variants are programming
/// errors rather than problems with the site's content.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when looking up a tag the classifier wasn't built from.
    #[error("no CSS class for tag `{0}`: the tag set changed after classification")]
    UnknownTag(String),

    /// Returned when a custom alphabet has no letters.
    #[error("the tag class alphabet must not be empty")]
    EmptyAlphabet,
}
