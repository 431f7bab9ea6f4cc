//! BBC News article parser.
//!
//! BBC article pages wrap the story in a single `<article>` element. Inside it:
//!
//! - the byline lives in `div[data-component="byline-block"]`, with the
//!   contributor line in `span[data-testid="byline-new-contributors"]` on
//!   current pages and `span[data-testid="byline-contributors"]` on older ones
//! - each paragraph is a `div[data-component="text-block"]`
//!
//! The contributor line usually nests the name and the reporter title in
//! separate elements. Their text is joined with [`BYLINE_SEPARATOR`] so the
//! two halves can be split apart afterwards.

use crate::models::{ArticleStub, EnrichedStory};
use crate::normalize::normalize;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

/// Joins text fragments of the contributor line. Never appears in prose.
pub const BYLINE_SEPARATOR: &str = "[BREAK]";

/// Byline recorded when the page has no contributor line.
pub const UNKNOWN_BYLINE: &str = "Unknown";

/// Separator placed between text blocks before normalization.
const PARAGRAPH_BREAK: &str = "\n\n";

static ARTICLE: Lazy<Selector> = Lazy::new(|| selector("article"));
static BYLINE_BLOCK: Lazy<Selector> =
    Lazy::new(|| selector(r#"div[data-component="byline-block"]"#));
static NEW_CONTRIBUTORS: Lazy<Selector> =
    Lazy::new(|| selector(r#"span[data-testid="byline-new-contributors"]"#));
static CONTRIBUTORS: Lazy<Selector> =
    Lazy::new(|| selector(r#"span[data-testid="byline-contributors"]"#));
static TEXT_BLOCK: Lazy<Selector> =
    Lazy::new(|| selector(r#"div[data-component="text-block"]"#));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Byline and reporter title split out of a contributor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Byline {
    pub name: String,
    pub reporter_title: Option<String>,
}

impl Byline {
    fn unknown() -> Self {
        Self {
            name: UNKNOWN_BYLINE.to_string(),
            reporter_title: None,
        }
    }

    /// Split on the first [`BYLINE_SEPARATOR`]: left is the name, right the title.
    pub fn from_line(line: &str) -> Self {
        match line.split_once(BYLINE_SEPARATOR) {
            Some((name, title)) => Self {
                name: name.to_string(),
                reporter_title: Some(title.to_string()),
            },
            None => Self {
                name: line.to_string(),
                reporter_title: None,
            },
        }
    }
}

/// Enrich `stub` with the byline and body found in `html`.
///
/// Without an `<article>` element the stub comes back unchanged. A missing
/// byline never prevents body extraction.
#[instrument(level = "debug", skip_all, fields(title = stub.title().unwrap_or_default()))]
pub fn parse(stub: ArticleStub, html: &str) -> EnrichedStory {
    let document = Html::parse_document(html);
    let Some(article) = document.select(&ARTICLE).next() else {
        debug!("No <article> container; passing stub through");
        return EnrichedStory::from(stub);
    };

    let byline = contributor_line(article)
        .map(|line| Byline::from_line(&line))
        .unwrap_or_else(Byline::unknown);

    let full_story = normalize(&body_text(article));
    debug!(
        byline = %byline.name,
        bytes = full_story.len(),
        "Parsed article"
    );

    EnrichedStory {
        stub,
        full_story: Some(full_story),
        byline: Some(byline.name),
        reporter_title: byline.reporter_title,
    }
}

/// Locate the contributor line, one lookup at a time.
fn contributor_line(article: ElementRef<'_>) -> Option<String> {
    let Some(block) = article.select(&BYLINE_BLOCK).next() else {
        debug!("Byline block missing");
        return None;
    };

    let Some(line) = block
        .select(&NEW_CONTRIBUTORS)
        .next()
        .or_else(|| block.select(&CONTRIBUTORS).next())
    else {
        debug!("Contributor line missing from byline block");
        return None;
    };

    Some(joined_text(line, BYLINE_SEPARATOR))
}

/// All text blocks in document order, separated by a paragraph break.
fn body_text(article: ElementRef<'_>) -> String {
    article
        .select(&TEXT_BLOCK)
        .map(|block| joined_text(block, " "))
        .join(PARAGRAPH_BREAK)
}

/// Trimmed, non-empty text nodes of `element` joined with `separator`.
fn joined_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub() -> ArticleStub {
        ArticleStub {
            title: Some("X".into()),
            category: None,
            news_link: "https://bbc.local/a".into(),
        }
    }

    #[test]
    fn test_parses_byline_and_text() {
        let html = r#"
        <article>
          <div data-component="byline-block">
            <span data-testid="byline-new-contributors">Jane Doe[BREAK]Business reporter</span>
          </div>
          <div data-component="text-block">First paragraph.</div>
          <div data-component="text-block">Second paragraph.</div>
        </article>
        "#;

        let out = parse(stub(), html);
        assert_eq!(out.byline.as_deref(), Some("Jane Doe"));
        assert_eq!(out.reporter_title.as_deref(), Some("Business reporter"));
        assert_eq!(
            out.full_story.as_deref(),
            Some("First paragraph.\n\nSecond paragraph.")
        );
        assert_eq!(out.stub, stub());
    }

    #[test]
    fn test_nested_contributor_elements_are_split() {
        let html = r#"
        <article>
          <div data-component="byline-block">
            <span data-testid="byline-new-contributors">
              <div><span>Jane Doe</span></div>
              <div><span>Technology editor</span></div>
            </span>
          </div>
          <div data-component="text-block"><p>Body.</p></div>
        </article>
        "#;

        let out = parse(stub(), html);
        assert_eq!(out.byline.as_deref(), Some("Jane Doe"));
        assert_eq!(out.reporter_title.as_deref(), Some("Technology editor"));
    }

    #[test]
    fn test_falls_back_to_legacy_contributor_marker() {
        let html = r#"
        <article>
          <div data-component="byline-block">
            <span data-testid="byline-contributors">John Smith</span>
          </div>
          <div data-component="text-block">Body.</div>
        </article>
        "#;

        let out = parse(stub(), html);
        assert_eq!(out.byline.as_deref(), Some("John Smith"));
        assert_eq!(out.reporter_title, None);
    }

    #[test]
    fn test_no_article_returns_stub_unchanged() {
        let html = "<html><body><div data-component=\"text-block\">Stray.</div></body></html>";
        let out = parse(stub(), html);
        assert_eq!(out, EnrichedStory::from(stub()));
        assert_eq!(out.full_story, None);
        assert_eq!(out.byline, None);
    }

    #[test]
    fn test_missing_byline_block_defaults_to_unknown() {
        let html = r#"
        <article>
          <div data-component="text-block">First paragraph.</div>
          <div data-component="text-block">Second paragraph.</div>
        </article>
        "#;

        let out = parse(stub(), html);
        assert_eq!(out.byline.as_deref(), Some(UNKNOWN_BYLINE));
        assert_eq!(out.reporter_title, None);
        let body = out.full_story.unwrap();
        assert!(body.contains("First paragraph."));
        assert!(body.contains("Second paragraph."));
    }

    #[test]
    fn test_byline_block_without_contributor_defaults_to_unknown() {
        let html = r#"
        <article>
          <div data-component="byline-block"><time>2 hours ago</time></div>
          <div data-component="text-block">Body.</div>
        </article>
        "#;

        let out = parse(stub(), html);
        assert_eq!(out.byline.as_deref(), Some(UNKNOWN_BYLINE));
        assert_eq!(out.full_story.as_deref(), Some("Body."));
    }

    #[test]
    fn test_empty_contributor_line_is_kept_as_empty_byline() {
        let html = r#"
        <article>
          <div data-component="byline-block">
            <span data-testid="byline-new-contributors"></span>
          </div>
          <div data-component="text-block">Body.</div>
        </article>
        "#;

        let out = parse(stub(), html);
        assert_eq!(out.byline.as_deref(), Some(""));
        assert_eq!(out.reporter_title, None);
        assert_eq!(out.full_story.as_deref(), Some("Body."));
    }

    #[test]
    fn test_block_text_is_collapsed_and_normalized() {
        let html = "<article><div data-component=\"text-block\">\
                    <p>Prices rose\n   <b>3%</b>\tin&nbsp;May &ldquo;sharply&rdquo;.</p>\
                    </div></article>";
        let out = parse(stub(), html);
        assert_eq!(
            out.full_story.as_deref(),
            Some("Prices rose 3% in May \u{201c}sharply\u{201d}.")
        );
    }

    #[test]
    fn test_text_blocks_outside_article_are_ignored() {
        let html = r#"
        <div data-component="text-block">Promo.</div>
        <article><div data-component="text-block">Story.</div></article>
        "#;
        let out = parse(stub(), html);
        assert_eq!(out.full_story.as_deref(), Some("Story."));
    }

    #[test]
    fn test_article_without_text_blocks_has_empty_body() {
        let out = parse(stub(), "<article><h1>Headline</h1></article>");
        assert_eq!(out.full_story.as_deref(), Some(""));
        assert_eq!(out.byline.as_deref(), Some(UNKNOWN_BYLINE));
    }

    #[test]
    fn test_byline_splits_on_first_separator_only() {
        let byline = Byline::from_line("Jane Doe[BREAK]Reporter[BREAK]Reporting from Paris");
        assert_eq!(byline.name, "Jane Doe");
        assert_eq!(
            byline.reporter_title.as_deref(),
            Some("Reporter[BREAK]Reporting from Paris")
        );
    }
}
