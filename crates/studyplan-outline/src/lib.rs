//! Heading detection and outline reconstruction.
//!
//! [`heading::classify_line`] decides per line whether it is a heading;
//! [`OutlineBuilder`] folds the resulting page-ordered event stream into a
//! nested [`OutlineNode`] forest.

pub mod builder;
pub mod heading;

pub use builder::OutlineBuilder;
pub use heading::{Heading, HeadingKind, classify_line};
use studyplan_core::{HeadingEvent, OutlineNode, Page};

/// Page separator in plain-text input (form feed, as emitted by most
/// text-layer tools).
pub const PAGE_BREAK: char = '\u{0C}';

/// Build the outline of a page list. Pages are expected in order; the last
/// page number closes any heading still open at the end.
pub fn build_outline(pages: &[Page]) -> Vec<OutlineNode> {
    let mut builder = OutlineBuilder::new();
    for page in pages {
        for line in page.text.lines() {
            match classify_line(line) {
                Some(h) => builder.push_heading(HeadingEvent {
                    level: h.level,
                    title: h.title,
                    page: page.page_number,
                }),
                None => builder.push_body(page.page_number, line),
            }
        }
    }

    let last_page = pages.last().map_or(0, |p| p.page_number);
    let headings = builder.heading_count();
    let outline = builder.finish(last_page);
    tracing::debug!(pages = pages.len(), headings, roots = outline.len(), "outline built");
    outline
}

/// Split already-extracted text into pages on form feeds. Text without a
/// form feed is a single page.
pub fn pages_from_text(text: &str) -> Vec<Page> {
    text.split(PAGE_BREAK)
        .enumerate()
        .map(|(i, chunk)| Page::new(i + 1, chunk, false))
        .collect()
}

/// Outline of plain text; see [`pages_from_text`] for page numbering.
pub fn build_outline_from_text(text: &str) -> Vec<OutlineNode> {
    build_outline(&pages_from_text(text))
}
