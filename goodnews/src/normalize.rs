/// English stop-words dropped from titles before scoring, matched against
/// whole tokens only. Matching runs after punctuation stripping, so the
/// apostrophe entries of the usual list ("don't", "you're", ...) can never
/// occur as tokens and are not carried.
const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
    "will", "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
    "aren", "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn",
    "mustn", "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

/// Normalize a raw title for scoring: lowercase, strip punctuation (anything
/// that is neither alphanumeric, underscore nor whitespace), drop stop-words,
/// join the surviving tokens with single spaces.
///
/// Pure and idempotent: normalizing an already-normalized title is a no-op.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();
    stripped
        .split_whitespace()
        .filter(|token| !STOP_WORDS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(
            normalize("Breaking: Markets Rally, Again!"),
            "breaking markets rally"
        );
    }

    #[test]
    fn removes_stop_words_whole_token_only() {
        // "not" is a stop-word; "notable" must survive untouched
        assert_eq!(normalize("A notable win"), "notable win");
        assert_eq!(normalize("This is not over"), "");
    }

    #[test]
    fn keeps_digits_and_underscores() {
        assert_eq!(normalize("Top_10 stories for 2024"), "top_10 stories 2024");
    }

    #[test]
    fn idempotent() {
        let raw = "Scientists Discover a Promising Cure - Details Inside!";
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn all_stop_words_collapse_to_empty() {
        assert_eq!(normalize("It is what it is"), "");
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(normalize("  good\t\tnews   today "), "good news today");
    }
}
