use std::collections::HashSet;

const MIN_WORD_CHARS: usize = 3;

fn significant_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() >= MIN_WORD_CHARS)
        .map(str::to_string)
        .collect()
}

/// Lexical overlap between a query and a chunk.
///
/// Counts query words (with repetition) found in the chunk and divides by the
/// number of distinct words across both. Words shorter than three characters
/// are ignored. Repeated query words can push the ratio past one, so the result
/// is clamped to `[0, 1]`.
pub fn calculate_similarity(query: &str, text: &str) -> f64 {
    let query_words = significant_words(query);
    let text_words = significant_words(text);

    let text_set: HashSet<&str> = text_words.iter().map(String::as_str).collect();
    let matched = query_words
        .iter()
        .filter(|word| text_set.contains(word.as_str()))
        .count();

    let union_size = query_words
        .iter()
        .map(String::as_str)
        .chain(text_set.iter().copied())
        .collect::<HashSet<_>>()
        .len();

    if union_size == 0 {
        return 0.0;
    }

    (matched as f64 / union_size as f64).min(1.0)
}
