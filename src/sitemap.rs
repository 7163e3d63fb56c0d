//! Sitemap generation. Lists every published location with an absolute URL
//! so search engines can index the site:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/articles/hello/</loc>
//!     <lastmod>2021-01-04</lastmod>
//!   </url>
//! </urlset>
//! ```

use crate::config::Config;
use crate::content::{ContentStore, NOT_FOUND_PAGE};
use crate::item::Item;
use crate::minify;
use crate::tag::TAGS_PATH;
use crate::write::{self, Writer};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The route of the sitemap.
pub const SITEMAP_PATH: &str = "sitemap.xml";

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const LASTMOD_FORMAT: &str = "%Y-%m-%d";

/// A single location in the sitemap.
#[derive(Debug, PartialEq)]
pub struct UrlEntry {
    pub loc: String,

    /// The date of the newest item shown at the location, if any.
    pub lastmod: Option<String>,
}

/// Collects the sitemap entries: the index, each section, each item, each
/// page except the 404 page, the tag list and each tag's page.
pub fn entries(config: &Config, content: &ContentStore) -> Vec<UrlEntry> {
    let site = &config.site;
    let entry = |path: &str, newest: Option<&Item>| UrlEntry {
        loc: site.url_for(path),
        lastmod: newest.map(|item| lastmod(&item.date)),
    };

    let all_items = content.all_items();
    let mut entries = vec![entry("/", all_items.first().copied())];
    for section in content.sections() {
        let newest = section.items.iter().max_by_key(|item| item.date);
        entries.push(entry(&section.path(), newest));
        for item in &section.items {
            entries.push(entry(&item.path(), Some(item)));
        }
    }
    for page in content.pages().filter(|p| p.name != NOT_FOUND_PAGE) {
        entries.push(entry(&page.path(), None));
    }
    entries.push(entry(TAGS_PATH, all_items.first().copied()));
    for tag in content.all_tags() {
        let tagged = content.items_tagged(&tag);
        entries.push(entry(&tag.path(), tagged.first().copied()));
    }
    entries
}

fn lastmod(date: &NaiveDateTime) -> String {
    date.format(LASTMOD_FORMAT).to_string()
}

/// Renders `entries` as a sitemap document.
pub fn to_xml(entries: &[UrlEntry]) -> String {
    let mut xml = String::with_capacity(4096);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<urlset xmlns="{}">"#, SITEMAP_NS));
    xml.push('\n');

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        if let Some(lastmod) = &entry.lastmod {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Writes the sitemap to [`SITEMAP_PATH`] under the output directory.
pub fn write_sitemap(writer: &Writer, config: &Config, content: &ContentStore) -> Result<PathBuf> {
    let mut xml = to_xml(&entries(config, content));
    if writer.minify {
        xml = minify::xml(&xml);
    }
    Ok(writer.write_file(Path::new(SITEMAP_PATH), xml.as_bytes())?)
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Write(#[from] write::Error),
}
