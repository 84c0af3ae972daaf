//! Cleans free text descriptions before they are vectorized.

use unicode_segmentation::UnicodeSegmentation;

/// The standard English stopword list used by NLTK.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "aren", "aren't", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "couldn", "couldn't", "d", "did", "didn", "didn't",
    "do", "does", "doesn", "doesn't", "doing", "don", "don't", "down", "during", "each", "few",
    "for", "from", "further", "had", "hadn", "hadn't", "has", "hasn", "hasn't", "have", "haven",
    "haven't", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
    "i", "if", "in", "into", "is", "isn", "isn't", "it", "it's", "its", "itself", "just", "ll",
    "m", "ma", "me", "mightn", "mightn't", "more", "most", "mustn", "mustn't", "my", "myself",
    "needn", "needn't", "no", "nor", "not", "now", "o", "of", "off", "on", "once", "only", "or",
    "other", "our", "ours", "ourselves", "out", "over", "own", "re", "s", "same", "shan",
    "shan't", "she", "she's", "should", "should've", "shouldn", "shouldn't", "so", "some",
    "such", "t", "than", "that", "that'll", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "ve", "very", "was", "wasn", "wasn't", "we", "were", "weren", "weren't", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "won", "won't",
    "wouldn", "wouldn't", "y", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Lowercase and tokenize `text`, keeping only alphanumeric tokens that are not stopwords.
///
/// The kept tokens are joined with single spaces.
pub fn preprocess_text(text: &str) -> String {
    text.to_lowercase()
        .unicode_words()
        .filter(|token| token.chars().all(char::is_alphanumeric))
        .filter(|token| !is_stopword(token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{STOPWORDS, preprocess_text};

    #[test]
    fn stopwords_are_sorted_for_binary_search() {
        assert!(STOPWORDS.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn removes_stopwords_and_punctuation() {
        assert_eq!(
            preprocess_text("Bought a Coffee at the station!"),
            "bought coffee station"
        );
    }

    #[test]
    fn drops_tokens_with_symbols() {
        assert_eq!(preprocess_text("uber-eats $12.50 dinner"), "uber eats dinner");
    }

    #[test]
    fn all_stopwords_gives_empty_string() {
        assert_eq!(preprocess_text("it is what it is"), "");
    }
}
