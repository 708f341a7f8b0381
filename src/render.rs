//! HTML rendering of book cards and standalone pages.
//!
//! All record text passes through [`escape_text`] or [`escape_attr`] before it
//! reaches markup; nothing from the API is emitted raw.

use std::fmt::Write as _;

use crate::catalog::Book;
use crate::view::Messages;

/// Escapes `&`, `<` and `>` for element content.
#[must_use]
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes element-content characters plus both quote styles for attributes.
#[must_use]
pub fn escape_attr(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Renders one book as an `<article>` card.
///
/// The download control reads its id from a `data-book-id` attribute so the
/// id never appears inside script text.
#[must_use]
pub fn book_card(book: &Book, messages: &Messages) -> String {
    format!(
        concat!(
            r#"<article class="book">"#,
            r#"<div class="book-header">"#,
            r#"<div class="book-info">"#,
            "<h3>{title}</h3>",
            r#"<p class="book-meta">{by} {author}</p>"#,
            r#"<p class="book-desc">{description}</p>"#,
            "</div>",
            r#"<button class="download-btn" data-book-id="{id}" "#,
            r#"onclick="downloadBook(this.getAttribute('data-book-id'))" title="{hint}">"#,
            r#"<span class="download-icon">⬇</span>"#,
            r#"<span class="download-text">{label}</span>"#,
            "</button>",
            "</div>",
            "</article>"
        ),
        title = escape_text(&book.title),
        by = escape_text(messages.author_prefix()),
        author = escape_text(&book.author),
        description = escape_text(&book.description),
        id = escape_attr(&book.id),
        hint = escape_attr(messages.download_hint()),
        label = escape_text(messages.download_label()),
    )
}

/// Element state needed to print a whole page.
#[derive(Debug, Clone, Copy)]
pub struct PageParts<'a> {
    /// Status line text.
    pub status: &'a str,
    /// Whether the status carries error styling.
    pub status_error: bool,
    /// Whether the load trigger is disabled.
    pub trigger_disabled: bool,
    /// Rendered cards, in order.
    pub cards: &'a [String],
}

/// Renders a standalone HTML document with status line, trigger and books.
#[must_use]
pub fn page_document(parts: &PageParts<'_>, messages: &Messages) -> String {
    let mut html = String::new();
    let status_class = if parts.status_error {
        "status-text error"
    } else {
        "status-text"
    };
    let disabled = if parts.trigger_disabled { " disabled" } else { "" };

    // Writing to a String cannot fail.
    let _ = write!(
        html,
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"{lang}\">\n",
            "<head><meta charset=\"utf-8\"><title>{title}</title></head>\n",
            "<body>\n",
            "<p id=\"status-text\" class=\"{status_class}\">{status}</p>\n",
            "<button id=\"load-btn\" onclick=\"loadBooks()\"{disabled}>{load}</button>\n",
            "<section id=\"books\">\n"
        ),
        lang = messages.locale().as_str(),
        title = escape_text(messages.page_title()),
        status_class = status_class,
        status = escape_text(parts.status),
        disabled = disabled,
        load = escape_text(messages.load_label()),
    );
    for card in parts.cards {
        html.push_str(card);
        html.push('\n');
    }
    html.push_str("</section>\n</body>\n</html>\n");
    html
}
