// ============================================================
// Layer 4 — Casual Text Tokenizer
// ============================================================
// Splits corpus text into word tokens the same way for the
// vocabulary builder and the sequence encoder, so every token
// seen during encoding was counted when the vocabulary was made.
//
// The corpus is user-written debate text, so the tokenizer is
// the "casual" kind: it keeps things like URLs, phone numbers,
// emoticons, @handles and "don't" together instead of shredding
// them on punctuation. HTML entities ("&amp;", "&#39;") are
// decoded before matching.
//
// Pattern alternatives are tried left to right at each position
// (leftmost-first), so their order matters:
//
//   URLs → phone numbers → emoticons → HTML tags → arrows
//   → @handles → #hashtags → e-mail → words with ' or -
//   → numbers → plain words → ellipsis → any other non-space
//
// After matching, each token is NFKD-decomposed and reduced to
// ASCII (accents are dropped: "café" → "cafe"). Tokens that end
// up empty are discarded.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        // URLs
        r"(?:https?://[^\s<>\x22]+|www\.[^\s<>\x22]+)",
        // phone numbers: optional +1, optional (area code), 3 + 4 digits
        r"|(?:(?:\+?[01][ *\-.)]*)?(?:\(?\d{3}[ *\-.)]*)?\d{3}[ *\-.)]*\d{4})",
        // emoticons: eyes-nose-mouth, mouth-nose-eyes, hearts
        r"|(?:[<>]?[:;=8][-o*']?[)\](\[dDpP/:}{@|\\]|[)\](\[dDpP/:}{@|\\][-o*']?[:;=8][<>]?|</?3)",
        // HTML tags
        r"|(?:<[^>\s]+>)",
        // ASCII arrows
        r"|(?:-+>|<-+)",
        // @handles
        r"|(?:@\w+)",
        // #hashtags
        r"|(?:#+\w+[\w'-]*\w+)",
        // e-mail addresses
        r"|(?:[\w.+-]+@[\w-]+\.(?:[\w-]\.?)+[\w-])",
        // words with inner apostrophes or dashes
        r"|(?:[^\W\d_](?:[^\W\d_]|['_-])+[^\W\d_])",
        // numbers with separators: 1,000  3.14  1/2  10:30
        r"|(?:[+-]?\d+[,/.:-]\d+[+-]?)",
        // plain words
        r"|(?:\w+)",
        // ellipsis
        r"|(?:\.(?:\s*\.)+)",
        // everything else that is not whitespace
        r"|(?:\S)",
    ))
    .expect("token pattern is a valid regex")
});

/// Tokenize `text` into ASCII word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let text = html_escape::decode_html_entities(text);
    TOKEN_PATTERN
        .find_iter(&text)
        .filter_map(|m| {
            let ascii: String = m.as_str().nfkd().filter(char::is_ascii).collect();
            let trimmed = ascii.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
