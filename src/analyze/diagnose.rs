use super::segment::{JiebaSegmenter, Segmenter};
use super::tfidf::{cosine_similarity, TfIdfMatrix};
use crate::error::{PlanscopeError, Result};
use crate::types::config::DiagnosisParams;
use crate::types::record::Record;
use crate::types::report::{DiagnosisResult, SimilarityBand};
use std::collections::HashMap;

/// Similarity reported when the corpus yields no usable terms.
pub const NEUTRAL_SIMILARITY: f64 = 0.5;

const STOPWORDS: [&str; 11] = ["的", "了", "和", "是", "在", "有", "我", "你", "他", "它", "们"];

/// Compares project descriptions against historical top-tier projects.
pub struct ProjectDiagnoser<S = JiebaSegmenter> {
    segmenter: S,
    params: DiagnosisParams,
}

impl ProjectDiagnoser<JiebaSegmenter> {
    pub fn new(params: DiagnosisParams) -> Self {
        Self::with_segmenter(JiebaSegmenter::new(), params)
    }
}

impl<S: Segmenter> ProjectDiagnoser<S> {
    pub fn with_segmenter(segmenter: S, params: DiagnosisParams) -> Self {
        Self { segmenter, params }
    }

    /// Rejects descriptions shorter than the configured minimum.
    pub fn check_text(&self, text: &str) -> Result<()> {
        let chars = text.chars().count();
        if chars < self.params.min_text_chars {
            return Err(PlanscopeError::TextTooShort {
                chars,
                min: self.params.min_text_chars,
            });
        }
        Ok(())
    }

    pub fn diagnose(&self, text: &str, records: &[Record]) -> Result<DiagnosisResult> {
        self.check_text(text)?;

        let mut references = records
            .iter()
            .filter(|record| record.award_tier == self.params.top_tier)
            .map(|record| record.project_name.as_str())
            .collect::<Vec<_>>();
        let fallback_corpus_used = references.is_empty();
        if fallback_corpus_used {
            tracing::warn!(
                top_tier = %self.params.top_tier,
                "no top-tier projects in dataset, comparing against fallback corpus"
            );
            references = self
                .params
                .fallback_corpus
                .iter()
                .map(String::as_str)
                .collect();
        }

        let (similarity, neutral_similarity) = match self.mean_similarity(text, &references) {
            Some(similarity) => (similarity, false),
            None => {
                tracing::warn!(
                    "reference corpus has no extractable terms, using neutral similarity {}",
                    NEUTRAL_SIMILARITY
                );
                (NEUTRAL_SIMILARITY, true)
            }
        };

        let band = SimilarityBand::from_similarity(similarity);
        tracing::info!(similarity, band = ?band, references = references.len(), "diagnosed project");
        Ok(DiagnosisResult {
            similarity: round_to(similarity, 2),
            band,
            advice: band.advice().to_string(),
            risk: band.risk().to_string(),
            keywords: self.keywords(text, self.params.top_keywords),
            fallback_corpus_used,
            neutral_similarity,
        })
    }

    /// Mean cosine similarity of `text` against each reference, or `None`
    /// when the combined corpus has an empty vocabulary.
    fn mean_similarity(&self, text: &str, references: &[&str]) -> Option<f64> {
        if references.is_empty() {
            return None;
        }
        let mut corpus = references.to_vec();
        corpus.push(text);

        let matrix = TfIdfMatrix::fit_transform(&corpus, &self.segmenter, self.params.max_features);
        if matrix.is_empty() {
            return None;
        }
        let candidate = matrix.row(references.len());
        let total = (0..references.len())
            .map(|idx| cosine_similarity(candidate, matrix.row(idx)))
            .sum::<f64>();
        Some((total / references.len() as f64).clamp(0.0, 1.0))
    }

    /// Most frequent meaningful words of `text`; ties keep first-seen order.
    pub fn keywords(&self, text: &str, top_n: usize) -> Vec<String> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for word in self.segmenter.segment(text) {
            let word = word.trim();
            if word.chars().count() <= 1
                || !word.chars().any(char::is_alphanumeric)
                || STOPWORDS.contains(&word)
                || word.chars().all(|c| c.is_numeric())
            {
                continue;
            }
            match positions.get(word) {
                Some(&idx) => counts[idx].1 += 1,
                None => {
                    positions.insert(word, counts.len());
                    counts.push((word, 1));
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .take(top_n)
            .map(|(word, _)| word.to_string())
            .collect()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, tier: &str) -> Record {
        Record {
            track: "人工智能".to_string(),
            market_score: 80.0,
            tech_score: 80.0,
            team_score: 80.0,
            award_tier: tier.to_string(),
            project_name: name.to_string(),
            keywords: vec![],
        }
    }

    fn diagnoser() -> ProjectDiagnoser {
        ProjectDiagnoser::new(DiagnosisParams::default())
    }

    #[test]
    fn short_text_is_rejected_without_a_score() {
        let result = diagnoser().diagnose("智能平台", &[]);
        assert!(matches!(
            result,
            Err(PlanscopeError::TextTooShort { chars: 4, min: 10 })
        ));
    }

    #[test]
    fn identical_description_lands_in_high_band() {
        let text = "基于计算机视觉的农产品质量智能检测平台";
        let records = vec![record(text, "一等奖"), record("校园二手交易小程序", "二等奖")];

        let result = diagnoser()
            .diagnose(text, &records)
            .expect("diagnosis should succeed");
        assert!(result.similarity > 0.6);
        assert_eq!(result.band, SimilarityBand::High);
        assert_eq!(result.advice, SimilarityBand::High.advice());
        assert!(!result.fallback_corpus_used);
    }

    #[test]
    fn unrelated_description_is_distinct() {
        let records = vec![record("区块链供应链金融服务平台", "一等奖")];
        let result = diagnoser()
            .diagnose("面向老年人的社区健身课程预约小程序", &records)
            .expect("diagnosis should succeed");
        assert_eq!(result.band, SimilarityBand::Distinct);
        assert_eq!(result.risk, SimilarityBand::Distinct.risk());
    }

    #[test]
    fn missing_top_tier_uses_fallback_corpus() {
        let records = vec![record("校园二手交易小程序", "二等奖")];
        let result = diagnoser()
            .diagnose("人工智能创新项目的市场推广方案设计", &records)
            .expect("diagnosis should succeed");
        assert!(result.fallback_corpus_used);
        assert!(!result.neutral_similarity);
        assert!(result.similarity > 0.0);
    }

    #[test]
    fn termless_corpus_falls_back_to_neutral_similarity() {
        let params = DiagnosisParams {
            fallback_corpus: vec!["……".to_string()],
            ..DiagnosisParams::default()
        };
        let result = ProjectDiagnoser::new(params)
            .diagnose("！！！！！？？？？？。。。", &[])
            .expect("diagnosis should succeed");
        assert_eq!(result.similarity, NEUTRAL_SIMILARITY);
        assert!(result.neutral_similarity);
        assert_eq!(result.band, SimilarityBand::Moderate);
    }

    #[test]
    fn similarity_is_rounded_to_two_decimals() {
        let records = vec![
            record("智能农业无人机植保服务", "一等奖"),
            record("智能仓储物流机器人", "一等奖"),
        ];
        let result = diagnoser()
            .diagnose("智能农业物流无人机配送服务平台", &records)
            .expect("diagnosis should succeed");
        assert!((0.0..=1.0).contains(&result.similarity));
        assert_eq!(result.similarity, (result.similarity * 100.0).round() / 100.0);
    }

    #[test]
    fn keywords_drop_short_numeric_and_punctuation_tokens() {
        let text = "平台服务农户，平台连接合作社。我们在2024年上线了平台……";
        let keywords = diagnoser().keywords(text, 8);
        assert_eq!(keywords.first().map(String::as_str), Some("平台"));
        assert!(keywords.len() <= 8);
        assert!(keywords.iter().all(|word| word.chars().count() > 1));
        assert!(keywords
            .iter()
            .all(|word| word.chars().any(char::is_alphanumeric)));
        assert!(!keywords.iter().any(|word| word == "2024"));
    }

    #[test]
    fn keyword_ties_keep_first_occurrence_order() {
        struct Whitespace;
        impl Segmenter for Whitespace {
            fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
                text.split_whitespace().collect()
            }
        }

        let diagnoser = ProjectDiagnoser::with_segmenter(Whitespace, DiagnosisParams::default());
        let keywords = diagnoser.keywords("beta alpha 12 的 x alpha beta gamma", 3);
        assert_eq!(keywords, vec!["beta", "alpha", "gamma"]);
    }
}
