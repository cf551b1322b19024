//! Extraction of an X (formerly Twitter) profile link from free text.
//!
//! Four patterns are tried in priority order and the first hit wins:
//! 1. full URL on `x.com` or `twitter.com`
//! 2. the same URL without a scheme
//! 3. an `@handle` mention
//! 4. a labelled mention such as `Twitter: foo` or `x | foo`
//!
//! Every hit is normalized to `https://x.com/<handle>`.

use std::sync::LazyLock;

use regex::Regex;

const CANONICAL_BASE: &str = "https://x.com/";

/// Path segments that are site routes rather than profile handles.
const RESERVED_PATHS: &[&str] = &["intent", "share", "home", "search", "hashtag", "i"];

static FULL_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:www\.)?(?:x|twitter)\.com/([A-Za-z0-9_]{1,15})")
        .expect("valid full URL regex")
});

static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:www\.)?(?:x|twitter)\.com/([A-Za-z0-9_]{1,15})")
        .expect("valid bare URL regex")
});

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]{1,15})").expect("valid mention regex"));

static LABELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(twitter|x)\s*([:\-|–])\s*(@?)([A-Za-z0-9_]{1,15})")
        .expect("valid labelled mention regex")
});

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn char_before(text: &str, byte_idx: usize) -> Option<char> {
    text[..byte_idx].chars().next_back()
}

fn char_after(text: &str, byte_idx: usize) -> Option<char> {
    text[byte_idx..].chars().next()
}

/// `true` when the captured handle is not cut out of a longer word.
fn handle_ends_cleanly(text: &str, handle_end: usize) -> bool {
    !char_after(text, handle_end).is_some_and(is_word_char)
}

fn is_reserved(handle: &str) -> bool {
    RESERVED_PATHS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(handle))
}

fn canonical(handle: &str) -> String {
    format!("{CANONICAL_BASE}{handle}")
}

/// Finds the first match of `re` whose handle passes `accept`, returning the canonical URL.
fn first_handle(
    text: &str,
    re: &Regex,
    accept: impl Fn(usize, &str, usize) -> bool,
) -> Option<String> {
    re.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let handle = caps.get(1)?;
        accept(whole.start(), handle.as_str(), handle.end()).then(|| canonical(handle.as_str()))
    })
}

/// First labelled mention, or `None`.
///
/// A bare `x` label takes only `:` or `|` as separator unless the handle
/// carries an `@`, so prose like `X-Men` or `Xbox X - Series` is skipped.
fn labelled_handle(text: &str) -> Option<String> {
    LABELLED.captures_iter(text).find_map(|caps| {
        let label = caps.get(1)?.as_str();
        let separator = caps.get(2)?.as_str();
        let has_at = !caps.get(3)?.as_str().is_empty();
        let handle = caps.get(4)?;
        let label_ok = label.eq_ignore_ascii_case("twitter")
            || has_at
            || matches!(separator, ":" | "|");
        (label_ok && handle_ends_cleanly(text, handle.end())).then(|| canonical(handle.as_str()))
    })
}

/// Extracts the first X profile link from `text`, or `None`.
#[must_use]
pub fn extract_social_link(text: &str) -> Option<String> {
    let url_handle =
        |handle: &str, end: usize| !is_reserved(handle) && handle_ends_cleanly(text, end);

    first_handle(text, &FULL_URL, |_, handle, end| url_handle(handle, end))
        .or_else(|| {
            first_handle(text, &BARE_URL, |start, handle, end| {
                let prefix_ok = !char_before(text, start)
                    .is_some_and(|c| is_word_char(c) || matches!(c, '.' | '/' | '-'));
                prefix_ok && url_handle(handle, end)
            })
        })
        .or_else(|| {
            first_handle(text, &MENTION, |start, _, end| {
                // A word char before `@` means an email address; a slash means
                // a path on some other site (e.g. `youtube.com/@name`).
                let prefix_ok = !char_before(text, start).is_some_and(|c| is_word_char(c) || c == '/');
                prefix_ok && handle_ends_cleanly(text, end)
            })
        })
        .or_else(|| labelled_handle(text))
}
