//! Plain-text helpers shared by detectors

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "been", "before", "being", "best", "does", "each", "from", "guide",
    "have", "here", "into", "just", "like", "make", "more", "most", "only", "over", "should",
    "some", "than", "that", "their", "them", "then", "there", "these", "they", "this", "tips",
    "very", "want", "what", "when", "where", "which", "while", "will", "with", "would", "your",
];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Alphanumeric runs (apostrophes kept so "I've" stays one word)
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
}

/// Occurrences per 1,000 words; 0 for empty text
pub fn per_thousand(count: usize, words: usize) -> f64 {
    if words == 0 {
        0.0
    } else {
        count as f64 * 1000.0 / words as f64
    }
}

/// Prefix of at most `max_chars` characters, cut on a char boundary
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The sentence around a byte offset, trimmed to `max_chars`
pub fn sentence_around(text: &str, offset: usize, max_chars: usize) -> String {
    let offset = offset.min(text.len());
    let start = text[..offset]
        .rfind(['.', '!', '?', '\n'])
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = text[offset..]
        .find(['.', '!', '?', '\n'])
        .map(|i| offset + i + 1)
        .unwrap_or(text.len());
    excerpt(text[start..end].trim(), max_chars).to_string()
}
