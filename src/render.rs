//! HTML rendering for the index page.
//!
//! Templates live in `templates/` and are compiled in by askama, which also
//! does the HTML escaping. The collection is additionally handed to the page
//! script as JSON inside a `<script>` element.

use askama::Html as HtmlEscaper;
use askama::{MarkupDisplay, Template};

use crate::error::TemplateError;
use crate::model::Bookmark;

pub const INDEX: &str = "index.html";

type SafeJson = MarkupDisplay<HtmlEscaper, String>;

/// Schemes a bookmark link may point at. Anything else is rendered as `#`.
const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

struct BookmarkRow<'a> {
    href: &'a str,
    label: &'a str,
    url: &'a str,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    rows: Vec<BookmarkRow<'a>>,
    bookmarks_json: SafeJson,
}

/// Renders the template called `name` with `bookmarks`.
pub fn render(name: &str, bookmarks: &[Bookmark]) -> Result<String, TemplateError> {
    match name {
        INDEX => {
            let template = IndexTemplate {
                rows: bookmarks.iter().map(row).collect(),
                bookmarks_json: MarkupDisplay::new_safe(script_json(bookmarks)?, HtmlEscaper),
            };
            template.render().map_err(TemplateError::Render)
        }
        _ => Err(TemplateError::Unknown(name.to_string())),
    }
}

fn row(bookmark: &Bookmark) -> BookmarkRow<'_> {
    let url = bookmark.url().unwrap_or("");
    let label = match bookmark.title() {
        Some(title) if !title.is_empty() => title,
        _ => url,
    };
    BookmarkRow {
        href: safe_href(url),
        label,
        url,
    }
}

/// Returns `url` when it is relative or uses one of `SAFE_SCHEMES`, else `#`.
///
/// Browsers drop whitespace and control characters inside a scheme, so they
/// are ignored when reading it here too.
pub fn safe_href(url: &str) -> &str {
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();

    match cleaned.find([':', '/', '?', '#']) {
        Some(end) if cleaned[end..].starts_with(':') => {
            let scheme = cleaned[..end].to_ascii_lowercase();
            if SAFE_SCHEMES.contains(&scheme.as_str()) {
                url
            } else {
                "#"
            }
        }
        _ => url,
    }
}

// Keeps `</script>` and friends in titles from closing the surrounding element.
fn script_json(bookmarks: &[Bookmark]) -> Result<String, TemplateError> {
    let json = serde_json::to_string(bookmarks).map_err(TemplateError::Serialize)?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}
