use std::collections::{HashMap, HashSet};

use super::segment::Segmenter;

/// TF-IDF vector space fitted over a small corpus.
///
/// Raw term counts are weighted by the smoothed idf `ln((1 + n) / (1 + df)) + 1`
/// and every row is L2-normalized, so the dot product of two rows is their
/// cosine similarity.
#[derive(Debug, Clone)]
pub struct TfIdfMatrix {
    vocabulary: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TfIdfMatrix {
    /// Fits the vocabulary over `documents` and transforms them. The
    /// vocabulary keeps the `max_features` terms with the highest document
    /// frequency (ties: total count, then the term itself).
    pub fn fit_transform(
        documents: &[&str],
        segmenter: &dyn Segmenter,
        max_features: usize,
    ) -> Self {
        let tokenized = documents
            .iter()
            .map(|doc| tokenize(doc, segmenter))
            .collect::<Vec<_>>();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        let mut total_count: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let unique = tokens.iter().map(String::as_str).collect::<HashSet<_>>();
            for token in unique {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
            for token in tokens {
                *total_count.entry(token.as_str()).or_insert(0) += 1;
            }
        }

        let mut ranked = document_frequency.into_iter().collect::<Vec<_>>();
        ranked.sort_by(|(term_a, df_a), (term_b, df_b)| {
            df_b.cmp(df_a)
                .then_with(|| total_count[term_b].cmp(&total_count[term_a]))
                .then_with(|| term_a.cmp(term_b))
        });
        ranked.truncate(max_features);
        // sorted so that column order does not depend on ranking ties
        ranked.sort_by(|(term_a, _), (term_b, _)| term_a.cmp(term_b));

        let n_documents = documents.len() as f64;
        let index = ranked
            .iter()
            .enumerate()
            .map(|(idx, (term, _))| (*term, idx))
            .collect::<HashMap<_, _>>();
        let idf = ranked
            .iter()
            .map(|(_, df)| ((1.0 + n_documents) / (1.0 + *df as f64)).ln() + 1.0)
            .collect::<Vec<_>>();

        let rows = tokenized
            .iter()
            .map(|tokens| {
                let mut row = vec![0.0; ranked.len()];
                for token in tokens {
                    if let Some(&idx) = index.get(token.as_str()) {
                        row[idx] += 1.0;
                    }
                }
                for (weight, idf) in row.iter_mut().zip(&idf) {
                    *weight *= idf;
                }
                l2_normalize(&mut row);
                row
            })
            .collect();

        let vocabulary = ranked
            .into_iter()
            .map(|(term, _)| term.to_string())
            .collect();
        Self { vocabulary, rows }
    }

    #[cfg(test)]
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Lower-cases, segments and drops tokens without any alphanumeric character.
fn tokenize(text: &str, segmenter: &dyn Segmenter) -> Vec<String> {
    let lowered = text.to_lowercase();
    segmenter
        .segment(&lowered)
        .into_iter()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .map(str::to_string)
        .collect()
}

fn l2_normalize(row: &mut [f64]) {
    let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in row.iter_mut() {
            *value /= norm;
        }
    }
}

pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let magnitude_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        0.0
    } else {
        dot_product / (magnitude_a * magnitude_b)
    }
}
