//! Defines the [`ContentStore`], the in-memory collection of everything
//! parsed from the content directory for one publish run.

use crate::config::SectionConfig;
use crate::item::{Item, Page};
use crate::tag::Tag;
use std::collections::{BTreeMap, BTreeSet};

/// The name of the page which is relocated to `/404.html` after HTML
/// generation.
pub const NOT_FOUND_PAGE: &str = "404";

/// Title and description attached to a location that isn't itself an item
/// or a page (the home page).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    pub title: String,
    pub description: String,
}

/// A named grouping of items sharing a route prefix.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub description: String,
    pub items: Vec<Item>,
}

impl Section {
    /// The section's route, e.g. `/articles/`.
    pub fn path(&self) -> String {
        format!("/{}/", self.id)
    }
}

/// Every section, item and page known to one publish run.
#[derive(Clone, Debug, Default)]
pub struct ContentStore {
    /// Metadata for the home page, from `content/index.md`.
    pub index: Metadata,
    sections: Vec<Section>,
    pages: BTreeMap<String, Page>,
}

impl ContentStore {
    /// Creates an empty store with one empty section per configured section,
    /// in configuration order.
    pub fn new(sections: &[SectionConfig]) -> ContentStore {
        ContentStore {
            index: Metadata::default(),
            sections: sections
                .iter()
                .map(|s| Section {
                    id: s.id.clone(),
                    title: s.title(),
                    description: String::new(),
                    items: Vec::new(),
                })
                .collect(),
            pages: BTreeMap::new(),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    /// Adds `item` to its owning section. Returns the item back if its
    /// section doesn't exist.
    pub fn add_item(&mut self, item: Item) -> Result<(), Item> {
        match self.section_mut(&item.section) {
            Some(section) => {
                section.items.push(item);
                Ok(())
            }
            None => Err(item),
        }
    }

    /// Adds `page`, replacing any page with the same name.
    pub fn add_page(&mut self, page: Page) {
        self.pages.insert(page.name.clone(), page);
    }

    pub fn page(&self, name: &str) -> Option<&Page> {
        self.pages.get(name)
    }

    /// All pages in name order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// Sorts every section's items by date, newest first. The sort is stable
    /// so items published on the same date keep their ingestion order.
    pub fn sort_items(&mut self) {
        for section in self.sections.iter_mut() {
            section.items.sort_by(|a, b| b.date.cmp(&a.date));
        }
    }

    /// Every item across all sections, newest first.
    pub fn all_items(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> =
            self.sections.iter().flat_map(|s| s.items.iter()).collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        items
    }

    /// Every item carrying `tag`, newest first.
    pub fn items_tagged(&self, tag: &Tag) -> Vec<&Item> {
        self.all_items()
            .into_iter()
            .filter(|item| item.is_tagged(tag))
            .collect()
    }

    /// The authoritative, sorted set of distinct tags across all items.
    pub fn all_tags(&self) -> BTreeSet<Tag> {
        self.sections
            .iter()
            .flat_map(|s| s.items.iter())
            .flat_map(|item| item.tags.iter().cloned())
            .collect()
    }
}
