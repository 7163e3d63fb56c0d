//! The primary theme. Turns the site model into HTML documents.
//!
//! Every page shares one layout (head, header with navigation, footer) and
//! differs only in its content, which is rendered by a per-kind template.
//! Templates are [`gtmpl`] templates bundled into the binary; all values are
//! computed here and HTML-escaped before they reach a template, so the
//! templates themselves only place text.

use crate::classifier::{Error as ClassifierError, TagClassifier};
use crate::config::Config;
use crate::content::{ContentStore, Section, NOT_FOUND_PAGE};
use crate::item::{Item, Page};
use crate::tag::{Tag, TAGS_PATH};
use gtmpl::{Context, Template, Value};
use pulldown_cmark::escape::{escape_href, escape_html};
use std::collections::HashMap;
use thiserror::Error;

/// The route of the combined stylesheet.
pub const STYLESHEET_PATH: &str = "/styles.css";

const TITLE_SEPARATOR: &str = " | ";
const TAG_LIST_TITLE: &str = "Tags";

/// A stylesheet bundled with a theme. Stylesheets are combined, in order,
/// into the single file served at [`STYLESHEET_PATH`].
#[derive(Clone, Copy, Debug)]
pub struct Stylesheet {
    pub name: &'static str,
    pub contents: &'static str,
}

/// The kinds of page the theme can render, each borrowing the model it
/// presents.
#[derive(Clone, Copy, Debug)]
pub enum PageKind<'a> {
    Index,
    Section(&'a Section),
    Item(&'a Item),
    Page(&'a Page),
    TagList,
    TagDetails(&'a Tag),
}

impl<'a> PageKind<'a> {
    /// Every page of the site: the index, each section, each item, each
    /// page, the tag list and one details page per classified tag.
    pub fn all(content: &'a ContentStore, classifier: &'a TagClassifier) -> Vec<PageKind<'a>> {
        let mut pages = vec![PageKind::Index];
        for section in content.sections() {
            pages.push(PageKind::Section(section));
            pages.extend(section.items.iter().map(PageKind::Item));
        }
        pages.extend(content.pages().map(PageKind::Page));
        pages.push(PageKind::TagList);
        pages.extend(classifier.iter().map(|(tag, _)| PageKind::TagDetails(tag)));
        pages
    }

    /// The route the page is published at.
    pub fn path(&self) -> String {
        match self {
            PageKind::Index => String::from("/"),
            PageKind::Section(section) => section.path(),
            PageKind::Item(item) => item.path(),
            PageKind::Page(page) => page.path(),
            PageKind::TagList => String::from(TAGS_PATH),
            PageKind::TagDetails(tag) => tag.path(),
        }
    }

    fn title(&self, content: &ContentStore) -> String {
        match self {
            PageKind::Index => content.index.title.clone(),
            PageKind::Section(section) => section.title.clone(),
            PageKind::Item(item) => item.title.clone(),
            PageKind::Page(page) => page.title.clone(),
            PageKind::TagList => String::from(TAG_LIST_TITLE),
            PageKind::TagDetails(tag) => tag.name().to_owned(),
        }
    }

    fn description(&self, content: &ContentStore) -> String {
        match self {
            PageKind::Index => content.index.description.clone(),
            PageKind::Section(section) => section.description.clone(),
            PageKind::Item(item) => item.description.clone(),
            PageKind::Page(page) => page.description.clone(),
            PageKind::TagList | PageKind::TagDetails(_) => String::new(),
        }
    }
}

/// Everything a render call reads. The classifier must have been built from
/// the same `content`.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a Config,
    pub content: &'a ContentStore,
    pub classifier: &'a TagClassifier,
}

/// A parsed set of templates plus the stylesheets they expect.
pub struct Theme {
    layout: Template,
    item_list: Template,
    index: Template,
    section: Template,
    item: Template,
    page: Template,
    tag_list: Template,
    tag_details: Template,
    stylesheets: Vec<Stylesheet>,
}

impl Theme {
    /// Parses the bundled primary theme.
    pub fn primary() -> Result<Theme> {
        Ok(Theme {
            layout: parse_template(&[include_str!("../theme/primary/layout.html")])?,
            item_list: parse_template(&[include_str!("../theme/primary/item_list.html")])?,
            index: parse_template(&[include_str!("../theme/primary/index.html")])?,
            section: parse_template(&[include_str!("../theme/primary/section.html")])?,
            item: parse_template(&[include_str!("../theme/primary/item.html")])?,
            page: parse_template(&[include_str!("../theme/primary/page.html")])?,
            tag_list: parse_template(&[include_str!("../theme/primary/tag_list.html")])?,
            tag_details: parse_template(&[include_str!("../theme/primary/tag_details.html")])?,
            stylesheets: vec![
                Stylesheet {
                    name: "styles.css",
                    contents: include_str!("../theme/primary/styles.css"),
                },
                Stylesheet {
                    name: "splash.css",
                    contents: include_str!("../theme/primary/splash.css"),
                },
            ],
        })
    }

    pub fn stylesheets(&self) -> &[Stylesheet] {
        &self.stylesheets
    }

    /// Renders one page to a complete HTML document. Rendering is pure:
    /// the same page and context always produce the same bytes.
    pub fn render(&self, page: PageKind, cx: &RenderContext) -> Result<String> {
        let (content, body_class) = match page {
            PageKind::Index => {
                let item_list = self.item_list(cx.content.all_items(), cx)?;
                (execute(&self.index, object(vec![("item_list", item_list)]))?, None)
            }
            PageKind::Section(section) => {
                let item_list = self.item_list(section.items.iter().collect(), cx)?;
                let value = object(vec![("title", text(&section.title)?), ("item_list", item_list)]);
                (execute(&self.section, value)?, None)
            }
            PageKind::Item(item) => {
                let value = object(vec![
                    ("body", Value::String(item.body.clone())),
                    ("tags", tag_values(item.tags.iter(), cx.classifier)?),
                ]);
                (execute(&self.item, value)?, Some("item-page"))
            }
            PageKind::Page(page) => {
                let value = object(vec![("body", Value::String(page.body.clone()))]);
                (execute(&self.page, value)?, None)
            }
            PageKind::TagList => {
                let tags = cx.content.all_tags();
                let value = object(vec![("tags", tag_values(tags.iter(), cx.classifier)?)]);
                (execute(&self.tag_list, value)?, None)
            }
            PageKind::TagDetails(tag) => {
                let item_list = self.item_list(cx.content.items_tagged(tag), cx)?;
                let value = object(vec![
                    ("tag", tag_value(tag, cx.classifier)?),
                    ("tag_list_path", Value::String(String::from(TAGS_PATH))),
                    ("item_list", item_list),
                ]);
                (execute(&self.tag_details, value)?, None)
            }
        };

        let document = object(vec![
            ("lang", text(&cx.config.site.language)?),
            ("head", head(page, cx)?),
            ("header", header(page, cx)?),
            ("body_class", optional(body_class.map(String::from))),
            ("content", Value::String(content)),
            ("footer", footer(cx)?),
        ]);
        execute(&self.layout, document)
    }

    // Renders `items` newest first as the shared item list fragment.
    fn item_list(&self, mut items: Vec<&Item>, cx: &RenderContext) -> Result<Value> {
        items.sort_by(|a, b| b.date.cmp(&a.date));
        let items = items
            .into_iter()
            .map(|item| {
                Ok(object(vec![
                    ("path", href(&item.path())?),
                    ("title", text(&item.title)?),
                    ("description", text(&item.description)?),
                    ("date", text(&item.display_date())?),
                    ("tags", tag_values(item.tags.iter(), cx.classifier)?),
                ]))
            })
            .collect::<Result<Vec<Value>>>()?;
        Ok(Value::String(execute(
            &self.item_list,
            object(vec![("items", Value::Array(items))]),
        )?))
    }
}

fn head(page: PageKind, cx: &RenderContext) -> Result<Value> {
    let site = &cx.config.site;

    let title = page.title(cx.content);
    let title = if title.is_empty() {
        site.name.clone()
    } else {
        format!("{}{}{}", title, TITLE_SEPARATOR, site.name)
    };

    let description = page.description(cx.content);
    let description = if description.is_empty() {
        site.description.clone()
    } else {
        description
    };

    let rss = object(vec![
        ("url", href(&site_path(&cx.config.feed.path))?),
        ("title", text(&format!("Subscribe to {}", site.name))?),
    ]);

    Ok(object(vec![
        ("site_name", text(&site.name)?),
        ("url", href(&site.url_for(&page.path()))?),
        ("title", text(&title)?),
        ("description", text(&description)?),
        (
            "card",
            Value::String(String::from(match site.image {
                Some(_) => "summary_large_image",
                None => "summary",
            })),
        ),
        (
            "stylesheets",
            Value::Array(vec![Value::String(String::from(STYLESHEET_PATH))]),
        ),
        (
            "favicon",
            match &site.favicon {
                Some(favicon) => href(&site_path(favicon))?,
                None => Value::Nil,
            },
        ),
        ("rss", rss),
        (
            "image",
            match &site.image {
                Some(image) => href(&site.url_for(image))?,
                None => Value::Nil,
            },
        ),
        (
            "analytics",
            match &cx.config.analytics {
                Some(analytics) => href(&analytics.goatcounter)?,
                None => Value::Nil,
            },
        ),
    ]))
}

fn header(page: PageKind, cx: &RenderContext) -> Result<Value> {
    let current = page.path();
    let destinations = navigation(cx.content);
    let nav = if destinations.len() > 1 {
        Value::Array(
            destinations
                .into_iter()
                .map(|(path, title)| {
                    Ok(object(vec![
                        ("selected", Value::Bool(path == current)),
                        ("path", href(&path)?),
                        ("title", text(&title)?),
                    ]))
                })
                .collect::<Result<Vec<Value>>>()?,
        )
    } else {
        Value::Nil
    };

    Ok(object(vec![
        ("site_name", text(&cx.config.site.name)?),
        ("nav", nav),
    ]))
}

/// The top-level destinations shown in the header: every section and every
/// page except the 404 page, sorted by title.
pub fn navigation(content: &ContentStore) -> Vec<(String, String)> {
    let mut destinations: Vec<(String, String)> = content
        .sections()
        .iter()
        .map(|s| (s.path(), s.title.clone()))
        .chain(
            content
                .pages()
                .filter(|p| p.name != NOT_FOUND_PAGE)
                .map(|p| (p.path(), p.title.clone())),
        )
        .collect();
    destinations.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    destinations
}

fn footer(cx: &RenderContext) -> Result<Value> {
    let site = &cx.config.site;
    let copyright = match cx.config.footer.copyright_year {
        Some(year) => format!("{} \u{00A9} {} \u{22C5} All rights reserved", site.name, year),
        None => format!("{} \u{22C5} All rights reserved", site.name),
    };
    let links = cx
        .config
        .footer
        .links
        .iter()
        .map(|link| {
            Ok(object(vec![
                ("title", text(&link.title)?),
                ("url", href(&link.url)?),
            ]))
        })
        .collect::<Result<Vec<Value>>>()?;

    Ok(object(vec![
        ("copyright", text(&copyright)?),
        ("links", Value::Array(links)),
        ("rss", href(&site_path(&cx.config.feed.path))?),
    ]))
}

fn tag_values<'a, I>(tags: I, classifier: &TagClassifier) -> Result<Value>
where
    I: Iterator<Item = &'a Tag>,
{
    Ok(Value::Array(
        tags.map(|tag| tag_value(tag, classifier))
            .collect::<Result<Vec<Value>>>()?,
    ))
}

fn tag_value(tag: &Tag, classifier: &TagClassifier) -> Result<Value> {
    Ok(object(vec![
        ("name", text(tag.name())?),
        ("path", href(&tag.path())?),
        ("class", text(classifier.class_of(tag)?)?),
    ]))
}

// Makes a site-relative path absolute-from-root, e.g. `feed.rss` becomes
// `/feed.rss`.
fn site_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

fn object(fields: Vec<(&str, Value)>) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect::<HashMap<String, Value>>(),
    )
}

fn optional(value: Option<String>) -> Value {
    match value {
        Some(value) => Value::String(value),
        None => Value::Nil,
    }
}

fn text(s: &str) -> Result<Value> {
    let mut escaped = String::with_capacity(s.len());
    escape_html(&mut escaped, s)?;
    Ok(Value::String(escaped))
}

fn href(s: &str) -> Result<Value> {
    let mut escaped = String::with_capacity(s.len());
    escape_href(&mut escaped, s)?;
    Ok(Value::String(escaped))
}

// Concatenates the template sources and parses the result into a template.
fn parse_template(sources: &[&str]) -> Result<Template> {
    let mut contents = String::new();
    for source in sources {
        contents.push_str(source);
        contents.push(' ');
    }

    let mut template = Template::default();
    template
        .parse(contents)
        .map_err(|err| Error::ParseTemplate(err.to_string()))?;
    Ok(template)
}

fn execute(template: &Template, value: Value) -> Result<String> {
    let context = Context::from(value).map_err(|err| Error::Template(err.to_string()))?;
    let mut out: Vec<u8> = Vec::new();
    template
        .execute(&mut out, &context)
        .map_err(|err| Error::Template(err.to_string()))?;
    Ok(String::from_utf8(out)?)
}

/// The result of a fallible render operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering a page.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a bundled template doesn't parse.
    #[error("parsing template: {0}")]
    ParseTemplate(String),

    /// Returned when executing a template fails.
    #[error("executing template: {0}")]
    Template(String),

    /// Returned when a tag has no class, i.e. the classifier was built from a
    /// different content snapshot than the one being rendered.
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    /// Returned when a template produces invalid UTF-8.
    #[error("template output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Returned when escaping text fails.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::{config, item, page, store};

    fn render(page: PageKind, config: &Config, content: &ContentStore) -> String {
        let classifier = TagClassifier::new(&content.all_tags());
        let cx = RenderContext {
            config,
            content,
            classifier: &classifier,
        };
        Theme::primary().unwrap().render(page, &cx).unwrap()
    }

    fn sample() -> ContentStore {
        store(vec![
            item("articles", "first", "2020-12-14", &["swift", "ios"]),
            item("articles", "third", "2021-01-04", &["testing"]),
            item("articles", "second", "2020-12-30", &["swift"]),
        ])
    }

    #[test]
    fn test_index_title_falls_back_to_site_name() {
        let html = render(PageKind::Index, &config(), &sample());
        assert!(html.contains("<title>An Unheralded Perspective</title>"));
    }

    #[test]
    fn test_item_title_includes_site_name() {
        let content = sample();
        let item = &content.section("articles").unwrap().items[0];
        let html = render(PageKind::Item(item), &config(), &content);
        assert!(html.contains("<title>third | An Unheralded Perspective</title>"));
    }

    #[test]
    fn test_description_falls_back_to_site_description() {
        let content = sample();
        let html = render(PageKind::TagList, &config(), &content);
        assert!(html.contains(
            "<meta name=\"description\" content=\"My thoughts on Swift, iOS development and beyond\"/>"
        ));

        let item = &content.section("articles").unwrap().items[0];
        let html = render(PageKind::Item(item), &config(), &content);
        assert!(html.contains("<meta name=\"description\" content=\"About third\"/>"));
    }

    #[test]
    fn test_index_lists_items_newest_first() {
        let html = render(PageKind::Index, &config(), &sample());
        let third = html.find("href=\"/articles/third/\"").unwrap();
        let second = html.find("href=\"/articles/second/\"").unwrap();
        let first = html.find("href=\"/articles/first/\"").unwrap();
        assert!(third < second && second < first);
        assert!(html.contains("<p class=\"publish-date\">Jan 4, 2021</p>"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let config = config();
        let content = sample();
        let classifier = TagClassifier::new(&content.all_tags());
        let cx = RenderContext {
            config: &config,
            content: &content,
            classifier: &classifier,
        };
        let theme = Theme::primary().unwrap();
        for page in PageKind::all(&content, &classifier) {
            assert_eq!(
                theme.render(page, &cx).unwrap(),
                theme.render(page, &cx).unwrap()
            );
        }
    }

    #[test]
    fn test_section_page_selects_its_nav_entry() {
        let content = sample();
        let section = content.section("articles").unwrap();
        let html = render(PageKind::Section(section), &config(), &content);
        assert!(html.contains("<h1>Articles</h1>"));
        assert!(html.contains("<li><a class=\"selected\" href=\"/articles/\">Articles</a></li>"));
        assert!(html.contains("<li><a href=\"/about/\">About</a></li>"));
    }

    #[test]
    fn test_navigation_excludes_404_and_sorts_by_title() {
        let mut content = sample();
        content.add_page(page("404", "Not found"));
        content.add_page(page("colophon", "Colophon"));
        let titles: Vec<String> = navigation(&content).into_iter().map(|(_, t)| t).collect();
        assert_eq!(vec!["About", "About", "Articles", "Colophon"], titles);
    }

    #[test]
    fn test_item_page_lists_tags_sorted_with_classes() {
        let content = sample();
        let item = content
            .all_items()
            .into_iter()
            .find(|i| i.stem == "first")
            .unwrap();
        let html = render(PageKind::Item(item), &config(), &content);
        assert!(html.contains("<body class=\"item-page\">"));
        assert!(html.contains(
            "<li class=\"tag tag-a\"><a href=\"/tags/ios/\">ios</a></li>\
             <li class=\"tag tag-b\"><a href=\"/tags/swift/\">swift</a></li>"
        ));
    }

    #[test]
    fn test_tag_list() {
        let html = render(PageKind::TagList, &config(), &sample());
        assert!(html.contains(
            "<ul class=\"all-tags\">\
             <li class=\"tag tag-a\"><a href=\"/tags/ios/\">ios</a></li>\
             <li class=\"tag tag-b\"><a href=\"/tags/swift/\">swift</a></li>\
             <li class=\"tag tag-c\"><a href=\"/tags/testing/\">testing</a></li>\
             </ul>"
        ));
    }

    #[test]
    fn test_tag_details_lists_only_tagged_items() {
        let content = sample();
        let tag = Tag::new("swift");
        let html = render(PageKind::TagDetails(&tag), &config(), &content);
        assert!(html.contains("<h1>Tagged with <span class=\"tag tag-b\">swift</span></h1>"));
        assert!(html.contains("<a class=\"browse-all\" href=\"/tags/\">Browse all tags</a>"));
        let second = html.find("href=\"/articles/second/\"").unwrap();
        let first = html.find("href=\"/articles/first/\"").unwrap();
        assert!(second < first);
        assert!(!html.contains("href=\"/articles/third/\""));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut tricky = item("articles", "tricky", "2021-01-01", &[]);
        tricky.title = String::from("<script> & friends");
        let content = store(vec![tricky]);
        let html = render(PageKind::Index, &config(), &content);
        assert!(html.contains("&lt;script&gt; &amp; friends"));
        assert!(!html.contains("<script> & friends"));
    }

    #[test]
    fn test_stale_classifier_is_an_error() {
        let config = config();
        let content = sample();
        let classifier = TagClassifier::new(&vec![Tag::new("swift")]);
        let cx = RenderContext {
            config: &config,
            content: &content,
            classifier: &classifier,
        };
        assert!(matches!(
            Theme::primary().unwrap().render(PageKind::TagList, &cx),
            Err(Error::Classifier(ClassifierError::UnknownTag(_)))
        ));
    }

    #[test]
    fn test_head_optional_entries() {
        let yaml = format!(
            "{}favicon: images/favicon.png\nimage: images/card.png\nanalytics:\n  goatcounter: https://me.goatcounter.com/count\n",
            crate::test_helpers::PROJECT
        );
        let config = Config::from_project_str(&yaml, std::path::Path::new("/site")).unwrap();
        let html = render(PageKind::Index, &config, &sample());
        assert!(html.contains("<link rel=\"shortcut icon\" href=\"/images/favicon.png\" type=\"image/png\"/>"));
        assert!(html.contains("<meta property=\"og:image\" content=\"https://siddarthkalra.github.io/images/card.png\"/>"));
        assert!(html.contains("<meta name=\"twitter:card\" content=\"summary_large_image\"/>"));
        assert!(html.contains("data-goatcounter=\"https://me.goatcounter.com/count\""));

        let plain = render(PageKind::Index, &crate::test_helpers::config(), &sample());
        assert!(!plain.contains("shortcut icon"));
        assert!(!plain.contains("goatcounter"));
        assert!(plain.contains("<meta name=\"twitter:card\" content=\"summary\"/>"));
    }

    #[test]
    fn test_footer() {
        let html = render(PageKind::Index, &config(), &sample());
        assert!(html.contains("<p>An Unheralded Perspective \u{00A9} 2020 \u{22C5} All rights reserved</p>"));
        assert!(html.contains("<a href=\"https://twitter.com/siddarthkalra\" target=\"_blank\">Twitter</a> | <a href=\"/feed.rss\" target=\"_blank\">RSS</a>"));
        assert!(html.contains("<link rel=\"alternate\" href=\"/feed.rss\" type=\"application/rss+xml\" title=\"Subscribe to An Unheralded Perspective\"/>"));
    }
}
