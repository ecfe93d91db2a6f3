//! Markup and string helpers shared by the record transforms.
//!
//! Everything here is pure and allocation-light; regexes are compiled once
//! and cached in `LazyLock` statics.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});")
        .expect("valid regex")
});
static H2_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?)h2(\s[^>]*)?>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Longest a legacy part code may be.
pub const LEGACY_PART_CODE_MAX: usize = 20;

/// Decodes HTML character references: the common named entities plus
/// decimal (`&#39;`) and hexadecimal (`&#x27;`) forms.
///
/// Unknown names and invalid code points are left untouched.
#[must_use]
pub fn decode_html_entities(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }
    ENTITY_RE.replace_all(value, |caps: &Captures<'_>| {
        let body = &caps[1];
        let decoded = if let Some(num) = body.strip_prefix('#') {
            let parsed = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse::<u32>().ok(),
            };
            parsed.and_then(char::from_u32).map(String::from)
        } else {
            named_entity(body).map(String::from)
        };
        decoded.unwrap_or_else(|| caps[0].to_string())
    })
}

fn named_entity(name: &str) -> Option<&'static str> {
    let decoded = match name {
        "amp" | "AMP" => "&",
        "lt" | "LT" => "<",
        "gt" | "GT" => ">",
        "quot" | "QUOT" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "hellip" => "\u{2026}",
        "bull" => "\u{2022}",
        "middot" => "\u{b7}",
        "deg" => "\u{b0}",
        "times" => "\u{d7}",
        "divide" => "\u{f7}",
        "plusmn" => "\u{b1}",
        "micro" => "\u{b5}",
        "frac12" => "\u{bd}",
        "frac14" => "\u{bc}",
        "frac34" => "\u{be}",
        "sup2" => "\u{b2}",
        "sup3" => "\u{b3}",
        "reg" => "\u{ae}",
        "copy" => "\u{a9}",
        "trade" => "\u{2122}",
        "eacute" => "\u{e9}",
        "egrave" => "\u{e8}",
        "aacute" => "\u{e1}",
        "ouml" => "\u{f6}",
        "uuml" => "\u{fc}",
        "auml" => "\u{e4}",
        "szlig" => "\u{df}",
        "Prime" => "\u{2033}",
        "prime" => "\u{2032}",
        _ => return None,
    };
    Some(decoded)
}

/// Rewrites every `<h2>` / `</h2>` tag (any case, attributes kept) to the
/// matching `h3` tag.
#[must_use]
pub fn demote_h2(value: &str) -> Cow<'_, str> {
    H2_TAG_RE.replace_all(value, |caps: &Captures<'_>| {
        let closing = caps.get(1).map_or("", |m| m.as_str());
        let attrs = caps.get(2).map_or("", |m| m.as_str());
        format!("<{closing}h3{attrs}>")
    })
}

/// Converts markup to a single line of plain text: entities decoded, tags
/// replaced by a space, whitespace runs collapsed, ends trimmed.
#[must_use]
pub fn html_to_plain_text(value: &str) -> String {
    let decoded = decode_html_entities(value);
    let untagged = TAG_RE.replace_all(&decoded, " ");
    collapse_whitespace(&untagged)
}

/// Collapses every whitespace run to one ASCII space and trims the ends.
#[must_use]
pub fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RE.replace_all(value, " ").trim().to_string()
}

/// Returns the first `max_chars` characters of `value`.
#[must_use]
pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Cuts `value` to at most `max_chars` characters, ending on a word boundary.
///
/// When the whole string fits it is returned unchanged. Otherwise the cut
/// falls on the last space inside the budget, or at the budget itself when
/// the character right after it starts a new word. A single word longer than
/// the budget yields an empty string.
#[must_use]
pub fn truncate_at_word_boundary(value: &str, max_chars: usize) -> &str {
    let head = truncate_chars(value, max_chars);
    if head.len() == value.len() {
        return value;
    }
    if value[head.len()..].starts_with(char::is_whitespace) {
        return head.trim_end();
    }
    match head.rfind(char::is_whitespace) {
        Some(idx) => head[..idx].trim_end(),
        None => "",
    }
}

/// Removes every case-insensitive occurrence of `needle` from `haystack`.
#[must_use]
pub fn remove_case_insensitive(haystack: &str, needle: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    match Regex::new(&format!("(?i){}", regex::escape(needle))) {
        Ok(re) => re.replace_all(haystack, "").into_owned(),
        Err(_) => haystack.to_string(),
    }
}

/// Strips `prefix` from the start of `value`, ignoring case.
#[must_use]
pub fn strip_prefix_case_insensitive<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let candidate = value.get(..prefix.len())?;
    let rest = &value[prefix.len()..];
    (candidate.to_lowercase() == prefix.to_lowercase()).then_some(rest)
}

/// Drops repeated words (compared case-insensitively), keeping the first
/// spelling seen and the original order.
#[must_use]
pub fn dedupe_words(value: &str) -> String {
    let mut seen: Vec<String> = Vec::new();
    let mut kept: Vec<&str> = Vec::new();
    for word in value.split_whitespace() {
        let folded = word.to_lowercase();
        if !seen.contains(&folded) {
            seen.push(folded);
            kept.push(word);
        }
    }
    kept.join(" ")
}

/// Formats a part number for the legacy invoicing system.
///
/// Non-alphanumerics are dropped and a hyphen goes after the third
/// character. Codes of three characters or fewer get no hyphen. A hyphenated
/// code longer than [`LEGACY_PART_CODE_MAX`] is spliced from its first four
/// characters, the last three of its seven-character head and the remainder,
/// then cut to the cap from the front.
#[must_use]
pub fn legacy_part_code(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();
    if cleaned.len() <= 3 {
        return cleaned;
    }
    let (head, body) = cleaned.split_at(3);
    let hyphenated = format!("{head}-{body}");
    if hyphenated.len() <= LEGACY_PART_CODE_MAX {
        return hyphenated;
    }

    // Only ASCII remains, so byte offsets are char offsets.
    let (splice_head, remainder) = hyphenated.split_at(7);
    let spliced = format!("{}{}{remainder}", &splice_head[..4], &splice_head[4..]);
    truncate_chars(&spliced, LEGACY_PART_CODE_MAX).to_owned()
}
