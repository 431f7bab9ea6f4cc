//! Plain-text cleanup for scraped article bodies.
//!
//! Publisher markup leaks entities, non-breaking spaces, typographic glyphs
//! and uneven whitespace into extracted text. [`normalize`] folds all of that
//! into a canonical form: entities decoded, NFKC applied, horizontal
//! whitespace collapsed to one space, at most one blank line between
//! paragraphs, no leading or trailing whitespace.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Normalize raw extracted text. Total over all inputs; `""` maps to `""`.
///
/// Repeated until stable so that `normalize(normalize(s)) == normalize(s)`,
/// e.g. `&amp;quot;` decodes all the way to `"`. A pass after the first
/// only changes text by decoding an entity, which either removes an `&` or
/// shortens the text, so the loop terminates.
pub fn normalize(raw: &str) -> String {
    let mut current = clean_once(raw);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    let spaced = decoded.replace('\u{a0}', " ");
    let folded: String = spaced.nfkc().collect();
    let collapsed = HORIZONTAL_WS.replace_all(&folded, " ");
    let paragraphs = EXCESS_NEWLINES.replace_all(&collapsed, "\n\n");
    paragraphs.trim().to_string()
}
