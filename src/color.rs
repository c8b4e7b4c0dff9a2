//! Hex color tokens and the text-level operations over vector markup.
//!
//! Colors are found and replaced purely at the text level: a token is a `#`
//! followed by exactly three or six hex digits, standing on a word boundary.
//! This mirrors what a browser-side pattern match would see, without
//! interpreting the markup as XML.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};

// ============================================================================
// ColorToken
// ============================================================================

/// A normalized hex color: always `#`-prefixed, lowercase, three or six digits.
///
/// Equality is by normalized string, so `#FFF` and `#fff` are the same token
/// while `#fff` and `#ffffff` are not (they are distinct textual spellings).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorToken(String);

impl ColorToken {
    /// Parses and normalizes a color. The leading `#` is optional.
    pub fn parse(value: &str) -> StudioResult<Self> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !matches!(digits.len(), 3 | 6) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(StudioError::invalid_color(value));
        }
        Ok(Self(format!("#{}", digits.to_ascii_lowercase())))
    }

    /// Wraps a value already known to be normalized.
    pub(crate) fn from_normalized(value: &str) -> Self {
        debug_assert!(Self::parse(value).is_ok_and(|t| t.0 == value));
        Self(value.to_owned())
    }

    /// Returns the normalized `#`-prefixed form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if `text` spells this token, ignoring ASCII case.
    pub fn matches(&self, text: &str) -> bool {
        self.0.eq_ignore_ascii_case(text)
    }

    /// Converts to an 8-bit sRGB triple.
    pub fn to_srgb(&self) -> StudioResult<Srgb<u8>> {
        Srgb::<u8>::from_str(&self.0).map_err(|_| StudioError::invalid_color(&self.0))
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ColorToken {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ColorToken {
    type Error = StudioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ColorToken> for String {
    fn from(token: ColorToken) -> Self {
        token.0
    }
}

// ============================================================================
// Scanning
// ============================================================================

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Yields the byte range of every hex color token in `markup`, in order.
///
/// `&#160;`-style character references are skipped.
fn token_ranges(markup: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    let bytes = markup.as_bytes();
    let mut pos = 0;

    std::iter::from_fn(move || {
        while pos < bytes.len() {
            let Some(found) = bytes[pos..].iter().position(|&b| b == b'#') else {
                pos = bytes.len();
                return None;
            };
            let start = pos + found;
            let digits = bytes[start + 1..]
                .iter()
                .take_while(|b| b.is_ascii_hexdigit())
                .count();
            let end = start + 1 + digits;

            let after_ok = bytes.get(end).is_none_or(|&b| !is_word_byte(b));
            let entity = start > 0 && bytes[start - 1] == b'&';

            if matches!(digits, 3 | 6) && after_ok && !entity {
                pos = end;
                return Some(start..end);
            }
            pos = start + 1;
        }
        None
    })
}

/// Returns the distinct colors of `markup` in first-seen order.
///
/// Never fails: markup without any color token yields an empty list.
pub fn extract_colors(markup: &str) -> Vec<ColorToken> {
    let mut seen = HashSet::new();
    let mut colors = Vec::new();

    for range in token_ranges(markup) {
        let token = ColorToken(markup[range].to_ascii_lowercase());
        if seen.insert(token.clone()) {
            colors.push(token);
        }
    }

    colors
}

/// Replaces every occurrence of `from` in `markup` with `to`.
///
/// Matching is literal and case-insensitive, and only whole tokens are
/// replaced: `#abc` never matches inside `#abcdef` or `#abc_id`.
/// Returns the new markup and the number of replacements.
pub fn substitute(markup: &str, from: &ColorToken, to: &ColorToken) -> (String, usize) {
    let mut result = String::with_capacity(markup.len());
    let mut last = 0;
    let mut count = 0;

    for range in token_ranges(markup) {
        if from.matches(&markup[range.clone()]) {
            result.push_str(&markup[last..range.start]);
            result.push_str(to.as_str());
            last = range.end;
            count += 1;
        }
    }

    result.push_str(&markup[last..]);
    (result, count)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tok(s: &str) -> ColorToken {
        ColorToken::parse(s).unwrap()
    }

    const STAR: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100"><path fill="#FF0000" d="M0 0h10v10z"/><path fill="#00f" stroke="#ff0000"/><circle style="fill:#0a0B0c"/></svg>"##;

    #[test]
    fn parse_normalizes_case_and_prefix() {
        assert_eq!(tok("ABC").as_str(), "#abc");
        assert_eq!(tok(" #A0b1C2 ").as_str(), "#a0b1c2");
    }

    #[test]
    fn parse_rejects_bad_lengths_and_digits() {
        assert!(ColorToken::parse("#abcd").is_err());
        assert!(ColorToken::parse("#ggg").is_err());
        assert!(ColorToken::parse("").is_err());
    }

    #[test]
    fn to_srgb_expands_short_form() {
        let rgb = tok("#f80").to_srgb().unwrap();
        assert_eq!((rgb.red, rgb.green, rgb.blue), (0xff, 0x88, 0x00));
    }

    #[test]
    fn extract_preserves_first_seen_order_without_duplicates() {
        let colors = extract_colors(STAR);
        let names: Vec<_> = colors.iter().map(ColorToken::as_str).collect();
        assert_eq!(names, vec!["#ff0000", "#00f", "#0a0b0c"]);
    }

    #[test]
    fn extract_from_malformed_markup_is_empty() {
        assert!(extract_colors("<svg <<< fill=").is_empty());
        assert!(extract_colors("").is_empty());
    }

    #[test]
    fn extract_ignores_non_color_hashes() {
        let markup = r##"<use href="#abcd"/><a x="#12345"/><p>&#160;</p><g fill="#abc_1"/>"##;
        assert!(extract_colors(markup).is_empty());
    }

    #[test]
    fn extract_is_a_fixed_point_on_its_output() {
        let first = extract_colors(STAR);
        let joined = first
            .iter()
            .map(ColorToken::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(extract_colors(&joined), first);
    }

    #[test]
    fn substitute_replaces_every_case_variant() {
        let (out, count) = substitute(STAR, &tok("#ff0000"), &tok("#123456"));
        assert_eq!(count, 2);
        assert!(!out.to_ascii_lowercase().contains("#ff0000"));
        assert_eq!(out.matches("#123456").count(), 2);
    }

    #[test]
    fn substitute_keeps_longer_tokens_intact() {
        let markup = r##"<g fill="#abc" stroke="#abcdef"/>"##;
        let (out, count) = substitute(markup, &tok("#abc"), &tok("#000"));
        assert_eq!(count, 1);
        assert_eq!(out, r##"<g fill="#000" stroke="#abcdef"/>"##);
    }

    #[test]
    fn substitute_without_match_returns_same_text() {
        let (out, count) = substitute(STAR, &tok("#999"), &tok("#000"));
        assert_eq!(count, 0);
        assert_eq!(out, STAR);
    }

    #[test]
    fn serde_uses_normalized_string() {
        let json = serde_json::to_string(&tok("#ABC")).unwrap();
        assert_eq!(json, "\"#abc\"");
        let back: ColorToken = serde_json::from_str("\"FFF\"").unwrap();
        assert_eq!(back, tok("#fff"));
        assert!(serde_json::from_str::<ColorToken>("\"red\"").is_err());
    }
}
