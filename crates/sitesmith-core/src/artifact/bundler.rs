//! Preview bundler.
//!
//! Folds a generated file set into one self-contained HTML document that can be
//! rendered through `srcdoc` inside a sandboxed frame. Stylesheets and scripts are
//! inlined in place of their `<link>` / `<script src>` references, or appended
//! before `</head>` / `</body>` when the page never references them. A small
//! navigation script is always appended so clicks on local `.html` links are
//! reported to the embedder instead of navigating the frame.
//!
//! Bundling is pure and total: the same input always yields the same bytes,
//! and a missing entry page yields a placeholder document instead of an error.

use std::ops::Range;

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use super::model::{FileKind, INDEX_FILE, SourceFile};

/// Sandbox capabilities the embedding frame may grant to a bundled document.
pub const PREVIEW_SANDBOX: &str = "allow-scripts allow-same-origin";

/// Click interceptor appended to every bundle.
///
/// Posts `{ kind: 'navigate', target }` to the parent for relative `.html` links.
pub const NAVIGATION_SCRIPT: &str = r#"<script>
(function () {
  document.addEventListener('click', function (event) {
    var origin = event.target;
    var anchor = origin && origin.closest ? origin.closest('a') : null;
    if (!anchor) { return; }
    var href = anchor.getAttribute('href');
    if (!href || !/\.html$/i.test(href)) { return; }
    if (/^([a-z][a-z0-9+.-]*:|\/\/)/i.test(href)) { return; }
    event.preventDefault();
    window.parent.postMessage({ kind: 'navigate', target: href }, '*');
  });
})();
</script>"#;

const LINK_TEMPLATE: &str =
    r#"<link\b[^>]*?\bhref\s*=\s*["'](?:\./|/)?{name}(?:[?#][^"']*)?["'][^>]*>"#;
const SCRIPT_TEMPLATE: &str = r#"<script\b[^>]*?\bsrc\s*=\s*["'](?:\./|/)?{name}(?:[?#][^"']*)?["'][^>]*?(?:/>|>\s*</script\s*>)"#;

/// Bundles the site rooted at `index.html`.
pub fn bundle(files: &[SourceFile]) -> String {
    bundle_entry(files, INDEX_FILE)
}

/// Bundles the site using `entry` as the page to render.
///
/// Used by embedders that follow a `navigate` message to another page of the set.
/// References are located in the entry page as authored, so text inside an
/// inlined file is never rewritten.
pub fn bundle_entry(files: &[SourceFile], entry: &str) -> String {
    let Some(page) = files.iter().find(|file| file.name == entry) else {
        debug!(entry, file_count = files.len(), "Entry page missing; rendering placeholder");
        return missing_entry_document(entry);
    };

    let seed = page.content.as_str();
    let mut edits: Vec<Edit> = Vec::new();
    let mut head_blocks = String::new();
    let mut body_blocks = String::new();

    for style in files.iter().filter(|file| file.kind == FileKind::Style) {
        let block = format!("<style>\n{}\n</style>", style.content);
        match find_reference(seed, LINK_TEMPLATE, &style.name, &edits) {
            Some(span) => edits.push(Edit::replace(span, block)),
            None => head_blocks.push_str(&block),
        }
    }

    for script in files.iter().filter(|file| file.kind == FileKind::Script) {
        let block = format!("<script>\n{}\n</script>", script.content);
        match find_reference(seed, SCRIPT_TEMPLATE, &script.name, &edits) {
            Some(span) => edits.push(Edit::replace(span, block)),
            None => body_blocks.push_str(&block),
        }
    }
    body_blocks.push_str(NAVIGATION_SCRIPT);

    if !head_blocks.is_empty() {
        edits.push(Edit::insert(head_close(seed), head_blocks));
    }
    edits.push(Edit::insert(body_close(seed), body_blocks));

    // Stable: insertions at the same offset keep head-before-body order.
    edits.sort_by_key(|edit| (edit.span.start, edit.span.end));
    splice(seed, &edits)
}

/// A replacement of `span` in the entry page; empty spans are insertions.
struct Edit {
    span: Range<usize>,
    text: String,
}

impl Edit {
    fn replace(span: Range<usize>, text: String) -> Self {
        Self { span, text }
    }

    fn insert(at: usize, text: String) -> Self {
        Self { span: at..at, text }
    }
}

fn splice(seed: &str, edits: &[Edit]) -> String {
    let extra: usize = edits.iter().map(|edit| edit.text.len()).sum();
    let mut document = String::with_capacity(seed.len() + extra);
    let mut cursor = 0;

    for edit in edits {
        let start = edit.span.start.max(cursor);
        document.push_str(&seed[cursor..start]);
        document.push_str(&edit.text);
        cursor = edit.span.end.max(start);
    }
    document.push_str(&seed[cursor..]);
    document
}

/// Minimal valid document shown when the entry page does not exist.
pub fn missing_entry_document(entry: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Preview unavailable</title></head>\n\
         <body style=\"font-family: sans-serif; padding: 2rem;\">\n\
         <h1>Preview unavailable</h1>\n\
         <p>The generated site has no <code>{}</code> file, so there is nothing to render.</p>\n\
         </body>\n</html>\n",
        escape_html(entry)
    )
}

/// First reference to `name` in `seed` that no earlier edit already claimed.
///
/// `None` when nothing matched or the pattern could not be built, in which
/// case the caller appends the block instead.
fn find_reference(seed: &str, template: &str, name: &str, claimed: &[Edit]) -> Option<Range<usize>> {
    let pattern = reference_pattern(template, name)?;
    pattern.find_iter(seed).map(|found| found.range()).find(|range| {
        !claimed
            .iter()
            .any(|edit| range.start < edit.span.end && edit.span.start < range.end)
    })
}

fn reference_pattern(template: &str, name: &str) -> Option<Regex> {
    let pattern = template.replace("{name}", &regex::escape(name));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(file = name, error = %err, "Reference pattern rejected; appending instead");
            None
        }
    }
}

fn head_close(document: &str) -> usize {
    let lower = document.to_ascii_lowercase();
    lower
        .find("</head>")
        .or_else(|| lower.find("<body"))
        .unwrap_or(0)
}

fn body_close(document: &str) -> usize {
    let lower = document.to_ascii_lowercase();
    lower.rfind("</body>").unwrap_or(document.len())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(content: &str) -> SourceFile {
        SourceFile::new("index.html", FileKind::Markup, content)
    }

    fn css(name: &str, content: &str) -> SourceFile {
        SourceFile::new(name, FileKind::Style, content)
    }

    fn js(name: &str, content: &str) -> SourceFile {
        SourceFile::new(name, FileKind::Script, content)
    }

    #[test]
    fn test_style_appended_before_head_close() {
        let files = vec![
            index("<html><head></head><body></body></html>"),
            css("style.css", "body{color:red}"),
        ];

        let html = bundle(&files);

        assert!(html.contains("<head><style>\nbody{color:red}\n</style></head>"));
        let nav_at = html.find(NAVIGATION_SCRIPT).expect("navigation script present");
        assert_eq!(&html[nav_at + NAVIGATION_SCRIPT.len()..], "</body></html>");
    }

    #[test]
    fn test_link_reference_replaced_in_place() {
        let files = vec![
            index(
                "<html><head><link rel=\"stylesheet\" href=\"./css/site.css\"><title>t</title></head><body></body></html>",
            ),
            css("css/site.css", "h1{margin:0}"),
        ];

        let html = bundle(&files);

        assert!(!html.contains("<link"));
        assert!(html.contains("<head><style>\nh1{margin:0}\n</style><title>t</title></head>"));
        assert_eq!(html.matches("h1{margin:0}").count(), 1);
    }

    #[test]
    fn test_script_reference_paired_and_self_closing() {
        let files = vec![
            index(
                "<html><head><script src=\"app.js\" defer></script></head><body><script src='nav.js'/></body></html>",
            ),
            js("app.js", "console.log('app');"),
            js("nav.js", "console.log('nav');"),
        ];

        let html = bundle(&files);

        assert!(!html.contains("src="));
        assert!(html.contains("<head><script>\nconsole.log('app');\n</script></head>"));
        assert!(html.contains("<body><script>\nconsole.log('nav');\n</script>"));
    }

    #[test]
    fn test_unreferenced_script_appended_before_body_close() {
        let files = vec![
            index("<html><head></head><body><main></main></body></html>"),
            js("main.js", "init();"),
        ];

        let html = bundle(&files);

        let script_at = html.find("<script>\ninit();\n</script>").unwrap();
        let nav_at = html.find(NAVIGATION_SCRIPT).unwrap();
        assert!(html.find("<main></main>").unwrap() < script_at);
        assert!(script_at < nav_at);
        assert!(html.ends_with("</body></html>"));
    }

    #[test]
    fn test_every_asset_inlined_exactly_once() {
        let files = vec![
            index(
                "<!DOCTYPE html><html><head><link href=\"a.css\" rel=\"stylesheet\"></head><body><script src=\"a.js\"></script></body></html>",
            ),
            css("a.css", ".a{top:1px}"),
            css("b.css", ".b{top:2px}"),
            js("a.js", "let a = 1;"),
            js("b.js", "let b = 2;"),
        ];

        let html = bundle(&files);

        for needle in [".a{top:1px}", ".b{top:2px}", "let a = 1;", "let b = 2;"] {
            assert_eq!(html.matches(needle).count(), 1, "{needle} inlined once");
        }
    }

    #[test]
    fn test_reference_text_inside_inlined_script_is_kept() {
        let loader = "document.write('<script src=\"extra.js\"></script>');";
        let files = vec![
            index(
                "<html><head></head><body><script src=\"loader.js\"></script><script src=\"extra.js\"></script></body></html>",
            ),
            js("loader.js", loader),
            js("extra.js", "extra();"),
        ];

        let html = bundle(&files);

        assert_eq!(html.matches(loader).count(), 1);
        assert_eq!(html.matches("extra();").count(), 1);
        assert!(html.contains("<body><script>\ndocument.write("));
    }

    #[test]
    fn test_reference_text_inside_inlined_style_is_kept() {
        let theme = "/* load with <link href=\"print.css\"> */ body{}";
        let files = vec![
            index("<html><head></head><body></body></html>"),
            css("theme.css", theme),
            css("print.css", "@media print{body{}}"),
        ];

        let html = bundle(&files);

        assert_eq!(html.matches(theme).count(), 1);
        assert_eq!(html.matches("@media print{body{}}").count(), 1);
    }

    #[test]
    fn test_replacement_content_is_not_expanded() {
        let files = vec![
            index("<html><head><link href=\"price.css\"></head><body></body></html>"),
            css("price.css", ".p::before{content:'$1 $0 ${name}'}"),
        ];

        let html = bundle(&files);

        assert!(html.contains(".p::before{content:'$1 $0 ${name}'}"));
    }

    #[test]
    fn test_name_with_pattern_metacharacters() {
        let files = vec![
            index("<html><head></head><body></body></html>"),
            css("weird(1)+[x].css", "p{}"),
            js("a*b?.js", "run();"),
        ];

        let html = bundle(&files);

        assert!(html.contains("<style>\np{}\n</style></head>"));
        assert!(html.contains("<script>\nrun();\n</script>"));
    }

    #[test]
    fn test_missing_index_returns_placeholder() {
        let files = vec![css("style.css", "body{}")];

        let html = bundle(&files);

        assert!(!html.is_empty());
        assert!(html.contains("index.html"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_placeholder_escapes_entry_name() {
        let html = bundle_entry(&[], "<img onerror=x>.html");
        assert!(html.contains("&lt;img onerror=x&gt;.html"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_bundle_is_deterministic() {
        let files = vec![
            index("<html><head></head><body></body></html>"),
            css("style.css", "body{}"),
            js("app.js", "go();"),
        ];

        assert_eq!(bundle(&files), bundle(&files));
    }

    #[test]
    fn test_document_without_head_or_body_markers() {
        let files = vec![index("<h1>Hello</h1>"), css("s.css", "h1{}"), js("s.js", "x();")];

        let html = bundle(&files);

        assert!(html.starts_with("<style>\nh1{}\n</style><h1>Hello</h1>"));
        assert!(html.ends_with(NAVIGATION_SCRIPT));
        assert!(html.contains("<script>\nx();\n</script>"));
    }

    #[test]
    fn test_uppercase_markers_are_found() {
        let files = vec![
            index("<HTML><HEAD></HEAD><BODY></BODY></HTML>"),
            css("s.css", "a{}"),
        ];

        let html = bundle(&files);

        assert!(html.contains("<HEAD><style>\na{}\n</style></HEAD>"));
        assert!(html.contains(&format!("{NAVIGATION_SCRIPT}</BODY>")));
    }

    #[test]
    fn test_bundle_entry_renders_other_page() {
        let files = vec![
            index("<html><body>home</body></html>"),
            SourceFile::new("about.html", FileKind::Markup, "<html><body>about</body></html>"),
            js("app.js", "boot();"),
        ];

        let html = bundle_entry(&files, "about.html");

        assert!(html.contains("about"));
        assert!(!html.contains("home"));
        assert!(html.contains("boot();"));
    }

    #[test]
    fn test_data_files_are_not_inlined() {
        let files = vec![
            index("<html><head></head><body></body></html>"),
            SourceFile::new("data.json", FileKind::Data, "{\"k\":1}"),
        ];

        assert!(!bundle(&files).contains("{\"k\":1}"));
    }
}
