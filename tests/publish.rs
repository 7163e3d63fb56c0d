use std::fs;
use std::path::Path;
use tempfile::TempDir;
use unheralded::build::{build_site, Error};
use unheralded::config::{Config, PROJECT_FILE};
use unheralded::steps;

const PROJECT: &str = "
name: An Unheralded Perspective
description: My thoughts on Swift, iOS development and beyond
url: https://siddarthkalra.github.io
sections:
  - id: articles
footer:
  copyright_year: 2020
";

const TAGS: [&str; 9] = [
    "accessibility",
    "combine",
    "concurrency",
    "ios",
    "macos",
    "swift",
    "swiftui",
    "testing",
    "xcode",
];

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative))
        .unwrap_or_else(|err| panic!("reading {}: {}", relative, err))
}

// Ten articles over nine tags, an about page, a 404 page and a resource.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, PROJECT_FILE, PROJECT);
    write(root, "Resources/CNAME", "siddarthkalra.github.io\n");
    write(root, "content/index.md", "---\ndescription: Welcome\n---\n");
    write(root, "content/about.md", "---\ntitle: About\n---\nHello.\n");
    write(root, "content/404.md", "---\ntitle: Not found\n---\nNothing here.\n");
    for day in 1..=10 {
        let tag = TAGS[(day - 1) % TAGS.len()];
        write(
            root,
            &format!("content/articles/post-{:02}.md", day),
            &format!(
                "---\ntitle: Post {}\ndate: 2021-01-{:02}\ntags: [{}]\n---\n```rust\nlet day = {};\n```\n",
                day, day, tag, day
            ),
        );
    }
    dir
}

#[test]
fn test_publish_site() {
    let dir = project();
    let root = dir.path();
    let config = Config::from_directory(&root.join("content/articles")).unwrap();
    build_site(config, false).unwrap();

    let output = root.join("Output");

    // The 404 page is relocated for GitHub Pages.
    assert!(output.join("404.html").is_file());
    assert!(!output.join("404").exists());

    assert_eq!("siddarthkalra.github.io\n", read(&output, "CNAME"));
    assert!(read(&output, "styles.css").contains(".tag-h"));

    let index = read(&output, "index.html");
    assert!(index.contains("<title>An Unheralded Perspective</title>"));
    assert!(index.contains("content=\"Welcome\""));
    let newest = index.find("href=\"/articles/post-10/\"").unwrap();
    let oldest = index.find("href=\"/articles/post-01/\"").unwrap();
    assert!(newest < oldest);

    // Nine tags share eight classes: the ninth, sorted, wraps around.
    let tags = read(&output, "tags/index.html");
    assert!(tags.contains("<li class=\"tag tag-a\"><a href=\"/tags/accessibility/\">accessibility</a></li>"));
    assert!(tags.contains("<li class=\"tag tag-h\"><a href=\"/tags/testing/\">testing</a></li>"));
    assert!(tags.contains("<li class=\"tag tag-a\"><a href=\"/tags/xcode/\">xcode</a></li>"));

    let post = read(&output, "articles/post-01/index.html");
    assert!(post.contains("<title>Post 1 | An Unheralded Perspective</title>"));
    assert!(post.contains("<pre><code class=\"language-rust\">"));
    assert!(post.contains("splash-"));

    let about = read(&output, "about/index.html");
    assert!(about.contains("<li><a class=\"selected\" href=\"/about/\">About</a></li>"));
    assert!(!about.contains("href=\"/404/\""));

    let feed = read(&output, "feed.rss");
    assert_eq!(10, feed.matches("<item>").count());
    assert!(feed.contains("https://siddarthkalra.github.io/articles/post-10/"));

    let sitemap = read(&output, "sitemap.xml");
    assert!(sitemap.contains("<loc>https://siddarthkalra.github.io/tags/xcode/</loc>"));
    assert!(!sitemap.contains("/404/"));
}

#[test]
fn test_rebuild_is_identical() {
    let dir = project();
    let root = dir.path();
    let config = Config::from_directory(root).unwrap();
    build_site(config.clone(), false).unwrap();
    let first = read(&root.join("Output"), "articles/index.html");
    build_site(config, false).unwrap();
    assert_eq!(first, read(&root.join("Output"), "articles/index.html"));
}

#[test]
fn test_missing_404_page_aborts() {
    let dir = project();
    let root = dir.path();
    fs::remove_file(root.join("content/404.md")).unwrap();

    let config = Config::from_directory(root).unwrap();
    match build_site(config, false) {
        Err(Error::Step { step, source }) => {
            assert_eq!("Move 404 file for GitHub Pages", step);
            assert!(matches!(source, steps::Error::MissingPage(_)));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!root.join("Output/feed.rss").exists());
}
