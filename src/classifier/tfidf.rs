//! A TF-IDF vectorizer for preprocessed descriptions.

use std::collections::BTreeMap;

use crate::classifier::ClassifierError;

/// A sparse row vector as `(feature index, value)` pairs sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

/// Maps whitespace separated tokens to L2 normalized TF-IDF weights.
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

fn analyze(document: &str) -> impl Iterator<Item = &str> {
    document
        .split_whitespace()
        .filter(|token| token.chars().count() >= 2)
}

impl TfidfVectorizer {
    /// Learn the vocabulary and inverse document frequencies of `documents`.
    ///
    /// The vocabulary is sorted so that feature indices are stable across fits.
    ///
    /// # Errors
    /// Returns [ClassifierError::EmptyVocabulary] if no document has any usable token.
    pub fn fit(documents: &[String]) -> Result<Self, ClassifierError> {
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();

        for document in documents {
            let mut seen: Vec<&str> = analyze(document).collect();
            seen.sort_unstable();
            seen.dedup();

            for token in seen {
                *document_frequency.entry(token).or_default() += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(ClassifierError::EmptyVocabulary);
        }

        let document_count = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());

        for (index, (token, frequency)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(token.to_owned(), index);
            idf.push(((1.0 + document_count) / (1.0 + frequency as f64)).ln() + 1.0);
        }

        Ok(Self { vocabulary, idf })
    }

    /// The number of features, i.e. the size of the vocabulary.
    pub fn feature_count(&self) -> usize {
        self.idf.len()
    }

    /// Convert `document` into a TF-IDF vector. Tokens outside the vocabulary are ignored.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();

        for token in analyze(document) {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_default() += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();

        let norm = vector
            .iter()
            .map(|(_, value)| value * value)
            .sum::<f64>()
            .sqrt();

        if norm > 0.0 {
            for (_, value) in vector.iter_mut() {
                *value /= norm;
            }
        }

        vector
    }
}
