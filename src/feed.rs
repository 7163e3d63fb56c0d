//! Support for creating the site's RSS feed from the items of the feed
//! sections.

use crate::config::Config;
use crate::content::ContentStore;
use crate::item::Item;
use crate::minify;
use crate::write::{self, Writer};
use chrono::{NaiveDateTime, TimeZone, Utc};
use rss::{CategoryBuilder, Channel, ChannelBuilder, GuidBuilder, ItemBuilder};
use std::path::{Path, PathBuf};
use thiserror::Error;

const GENERATOR: &str = "unheralded";

/// Builds the feed channel: the newest items of the configured feed
/// sections, newest first and at most `max_items` of them.
pub fn channel(config: &Config, content: &ContentStore) -> Channel {
    let sections = config.feed_sections();
    let items: Vec<&Item> = content
        .all_items()
        .into_iter()
        .filter(|item| sections.contains(&item.section.as_str()))
        .take(config.feed.max_items)
        .collect();

    let site = &config.site;
    ChannelBuilder::default()
        .title(site.name.clone())
        .link(site.url.to_string())
        .description(site.description.clone())
        .language(Some(site.language.clone()))
        .generator(Some(GENERATOR.to_owned()))
        .last_build_date(items.first().map(|item| rfc2822(&item.date)))
        .items(
            items
                .into_iter()
                .map(|item| feed_item(config, item))
                .collect::<Vec<rss::Item>>(),
        )
        .build()
}

fn feed_item(config: &Config, item: &Item) -> rss::Item {
    let link = config.site.url_for(&item.path());
    ItemBuilder::default()
        .title(Some(item.title.clone()))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .description(Some(item.description.clone()))
        .pub_date(Some(rfc2822(&item.date)))
        .categories(
            item.tags
                .iter()
                .map(|tag| CategoryBuilder::default().name(tag.name().to_owned()).build())
                .collect::<Vec<rss::Category>>(),
        )
        .build()
}

// Item dates carry no zone; they're published as UTC.
fn rfc2822(date: &NaiveDateTime) -> String {
    Utc.from_utc_datetime(date).to_rfc2822()
}

/// Renders the feed and writes it to the configured feed path.
pub fn write_feed(writer: &Writer, config: &Config, content: &ContentStore) -> Result<PathBuf> {
    let mut xml = channel(config, content).to_string();
    if writer.minify {
        xml = minify::xml(&xml);
    }
    Ok(writer.write_file(
        Path::new(config.feed.path.trim_start_matches('/')),
        xml.as_bytes(),
    )?)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating the feed.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Write(#[from] write::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::test_helpers::{config, item, store, PROJECT};
    use tempfile::TempDir;

    fn sample() -> ContentStore {
        store(vec![
            item("articles", "first", "2020-12-14", &["swift"]),
            item("articles", "second", "2021-01-04", &["ios", "swift"]),
            item("about", "me", "2021-02-01", &[]),
        ])
    }

    #[test]
    fn test_channel() {
        let channel = channel(&config(), &sample());
        assert_eq!("An Unheralded Perspective", channel.title());
        assert_eq!("https://siddarthkalra.github.io/", channel.link());
        assert_eq!(Some("Mon, 1 Feb 2021 00:00:00 +0000"), channel.last_build_date());

        let links: Vec<&str> = channel.items().iter().filter_map(|i| i.link()).collect();
        assert_eq!(
            vec![
                "https://siddarthkalra.github.io/about/me/",
                "https://siddarthkalra.github.io/articles/second/",
                "https://siddarthkalra.github.io/articles/first/",
            ],
            links
        );

        let second = &channel.items()[1];
        assert_eq!(Some("second"), second.title());
        assert_eq!(Some("About second"), second.description());
        assert_eq!(Some("Mon, 4 Jan 2021 00:00:00 +0000"), second.pub_date());
        let guid = second.guid().unwrap();
        assert!(guid.is_permalink());
        assert_eq!("https://siddarthkalra.github.io/articles/second/", guid.value());
        let categories: Vec<&str> = second.categories().iter().map(|c| c.name()).collect();
        assert_eq!(vec!["ios", "swift"], categories);
    }

    #[test]
    fn test_channel_respects_feed_sections_and_limit() {
        let yaml = format!("{}feed:\n  sections: [articles]\n  max_items: 1\n", PROJECT);
        let config = Config::from_project_str(&yaml, Path::new("/site")).unwrap();
        let channel = channel(&config, &sample());
        assert_eq!(1, channel.items().len());
        assert_eq!(Some("second"), channel.items()[0].title());
    }

    #[test]
    fn test_write_feed() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let writer = Writer {
            output_directory: dir.path(),
            minify: false,
        };
        let path = write_feed(&writer, &config(), &sample())?;
        assert_eq!(dir.path().join("feed.rss"), path);
        let xml = std::fs::read_to_string(path).unwrap();
        assert!(xml.contains("<rss"));
        assert!(xml.contains("<link>https://siddarthkalra.github.io/articles/first/</link>"));
        Ok(())
    }
}
