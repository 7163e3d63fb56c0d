//! HTML, CSS and XML minification, used when `minify: true` is set in the
//! project file.

const STYLE_OPEN: &str = "<style>";
const STYLE_CLOSE: &str = "</style>";

fn cfg() -> minify_html::Cfg {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    cfg
}

/// Minifies a complete HTML document.
pub fn html(html: &str) -> String {
    String::from_utf8_lossy(&minify_html::minify(html.as_bytes(), &cfg())).into_owned()
}

/// Minifies a stylesheet by minifying it as the contents of a `<style>`
/// element. Returns `css` unchanged if the result can't be unwrapped.
pub fn css(css: &str) -> String {
    let wrapped = format!("{}{}{}", STYLE_OPEN, css, STYLE_CLOSE);
    let minified = html(&wrapped);
    match minified
        .strip_prefix(STYLE_OPEN)
        .and_then(|rest| rest.strip_suffix(STYLE_CLOSE))
    {
        Some(inner) => inner.to_owned(),
        None => css.to_owned(),
    }
}

/// Minifies XML by trimming every line and dropping the line breaks.
pub fn xml(xml: &str) -> String {
    xml.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_html() {
        let minified = html("<html>\n  <head>\n  </head>\n  <body>\n    <p>Hello World</p>\n  </body>\n</html>");
        assert!(!minified.contains("\n  "));
        assert!(minified.contains("<p>Hello World</p>"));
    }

    #[test]
    fn test_css() {
        let source = "body {\n    color: red;\n}\n\n.tag-a {\n    background: blue;\n}\n";
        let minified = css(source);
        assert!(minified.len() < source.len());
        assert!(minified.contains("body{"));
        assert!(!minified.contains('\n'));
    }

    #[test]
    fn test_xml() {
        let minified = xml("<?xml version=\"1.0\"?>\n<root>\n\n  <item>Hello</item>\n</root>\n");
        assert_eq!("<?xml version=\"1.0\"?><root><item>Hello</item></root>", minified);
    }
}
