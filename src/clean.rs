//! Text cleaning before synthesis
//!
//! Removes characters a voice model cannot pronounce:
//! - Emoji and pictographic symbols are dropped
//! - ZWNJ (U+200C) becomes a space, so joined words are spoken separately
//! - Links (`http://`, `https://`, `www.`) are removed up to the next whitespace
//!
//! Code points are filtered before links are removed, so a link broken up by
//! an emoji is still recognised as a single link.

use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::RangeInclusive;

/// Zero-width non-joiner
pub const ZWNJ: char = '\u{200C}';

/// Emoji and symbol blocks removed from speech text
pub const EMOJI_RANGES: [RangeInclusive<u32>; 12] = [
    0x1F600..=0x1F64F, // Emoticons
    0x1F300..=0x1F5FF, // Symbols & Pictographs
    0x1F680..=0x1F6FF, // Transport & Map
    0x1F700..=0x1F77F, // Alchemical Symbols
    0x1F780..=0x1F7FF, // Geometric Shapes Extended
    0x1F800..=0x1F8FF, // Supplemental Arrows-C
    0x1F900..=0x1F9FF, // Supplemental Symbols and Pictographs
    0x1FA00..=0x1FAFF, // Extended Pictographs
    0x1F1E6..=0x1F1FF, // Regional Indicator Symbols (flags)
    0x2600..=0x26FF,   // Misc Symbols
    0x2700..=0x27BF,   // Dingbats
    0x2B50..=0x2B55,   // Stars and Circles
];

static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(https?://|www\.)\S+").expect("link pattern is a valid regex")
});

/// Whether a character falls in one of the emoji ranges
pub fn is_emoji(ch: char) -> bool {
    let code = ch as u32;
    EMOJI_RANGES.iter().any(|range| range.contains(&code))
}

/// Clean text for synthesis
///
/// Pure function: strips emoji, turns ZWNJ into a space and removes links.
pub fn clean_text(text: &str) -> String {
    let filtered: String = text
        .chars()
        .filter_map(|ch| {
            if ch == ZWNJ {
                Some(' ')
            } else if is_emoji(ch) {
                None
            } else {
                Some(ch)
            }
        })
        .collect();

    LINK_PATTERN.replace_all(&filtered, "").into_owned()
}

/// Clean raw bytes, rejecting input that is not valid UTF-8
pub fn clean_bytes(bytes: &[u8]) -> Result<String> {
    let text = String::from_utf8(bytes.to_vec())?;
    Ok(clean_text(&text))
}
