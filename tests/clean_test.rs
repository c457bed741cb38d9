//! Text cleaner properties
//!
//! Checked over a hand-picked corpus of mixed-script strings.

use piper_cli::clean::{clean_text, is_emoji, EMOJI_RANGES, ZWNJ};

const CORPUS: &[&str] = &[
    "",
    "Hello, world!",
    "سلام دنیا 😀",
    "می\u{200C}خواهم بروم",
    "Read https://example.com/path?x=1 and www.test.org now",
    "☀️ Weather: ⛅ 20°C ⭐⭐",
    "Link inside 🚀https://x.y/😀z end",
    "wwwhttp://a.b c",
    "http:// nothing here",
    "Flags \u{1F1FA}\u{1F1F8} and arrows \u{1F800}",
    "Tabs\tand\nnewlines https://a.b\tkeep",
    "\u{200C}www.\u{200C}example",
];

/// A link prefix followed by at least one more character
fn has_link(word: &str) -> bool {
    ["http://", "https://", "www."].iter().any(|prefix| {
        word.match_indices(prefix)
            .any(|(i, _)| word.len() > i + prefix.len())
    })
}

fn sample_each_range() -> String {
    EMOJI_RANGES
        .iter()
        .flat_map(|range| {
            [*range.start(), (*range.start() + *range.end()) / 2, *range.end()]
                .into_iter()
                .filter_map(char::from_u32)
        })
        .collect()
}

#[test]
fn test_no_emoji_survive() {
    let mut inputs: Vec<String> = CORPUS.iter().map(|s| s.to_string()).collect();
    inputs.push(format!("a{}b", sample_each_range()));

    for input in &inputs {
        let cleaned = clean_text(input);
        assert!(
            !cleaned.chars().any(is_emoji),
            "emoji left in {:?} -> {:?}",
            input,
            cleaned
        );
    }
    assert_eq!(clean_text(&format!("a{}b", sample_each_range())), "ab");
}

#[test]
fn test_zwnj_replaced_one_for_one() {
    let input = "a\u{200C}b\u{200C}\u{200C}c";
    let cleaned = clean_text(input);
    assert_eq!(cleaned, "a b  c");
    assert!(!cleaned.contains(ZWNJ));
}

#[test]
fn test_no_links_survive() {
    for input in CORPUS {
        let cleaned = clean_text(input);
        for word in cleaned.split_whitespace() {
            assert!(!has_link(word), "link left in {:?} -> {:?}", input, cleaned);
        }
    }
}

#[test]
fn test_text_outside_links_preserved() {
    assert_eq!(
        clean_text("Read https://example.com/path?x=1 and www.test.org now"),
        "Read  and  now"
    );
    assert_eq!(clean_text("wwwhttp://a.b c"), "www c");
    assert_eq!(clean_text("http:// nothing here"), "http:// nothing here");
    assert_eq!(
        clean_text("Tabs\tand\nnewlines https://a.b\tkeep"),
        "Tabs\tand\nnewlines \tkeep"
    );
}

#[test]
fn test_idempotent() {
    for input in CORPUS {
        let once = clean_text(input);
        assert_eq!(clean_text(&once), once, "not idempotent for {:?}", input);
    }
}
