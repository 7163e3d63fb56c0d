//! Shared fixtures for unit tests.

use crate::config::{Config, SectionConfig};
use crate::content::ContentStore;
use crate::item::{Item, Page};
use crate::tag::Tag;
use chrono::NaiveDate;
use std::path::Path;

pub const PROJECT: &str = "
name: An Unheralded Perspective
description: My thoughts on Swift, iOS development and beyond
url: https://siddarthkalra.github.io
sections:
  - id: articles
  - id: about
footer:
  copyright_year: 2020
  links:
    - title: Twitter
      url: https://twitter.com/siddarthkalra
";

pub fn config() -> Config {
    Config::from_project_str(PROJECT, Path::new("/site")).unwrap()
}

pub fn sections(ids: &[&str]) -> Vec<SectionConfig> {
    ids.iter()
        .map(|id| SectionConfig {
            id: (*id).to_owned(),
            title: None,
        })
        .collect()
}

/// Builds an item whose title is its stem and whose description mentions
/// the stem.
pub fn item(section: &str, stem: &str, date: &str, tags: &[&str]) -> Item {
    Item {
        section: section.to_owned(),
        stem: stem.to_owned(),
        title: stem.to_owned(),
        description: format!("About {}", stem),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        tags: tags.iter().map(Tag::new).collect(),
        body: format!("<p>Body of {}</p>", stem),
    }
}

pub fn page(name: &str, title: &str) -> Page {
    Page {
        name: name.to_owned(),
        title: title.to_owned(),
        description: String::new(),
        body: format!("<p>{} page</p>", name),
    }
}

/// A store for [`config`] holding `items` in the `articles` section plus an
/// about page.
pub fn store(items: Vec<Item>) -> ContentStore {
    let mut store = ContentStore::new(&config().sections);
    for item in items {
        store.add_item(item).unwrap();
    }
    store.add_page(page("about-me", "About"));
    store.sort_items();
    store
}
