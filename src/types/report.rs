use crate::types::record::SubScore;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnFill {
    pub column: SubScore,
    pub missing: usize,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub rows_after_dedup: usize,
    pub rows_written: usize,
    pub fills: Vec<ColumnFill>,
    pub output: Option<PathBuf>,
}

impl CleaningReport {
    pub fn filled_any(&self) -> bool {
        self.fills.iter().any(|fill| fill.missing > 0)
    }
}

/// Ordinal heat label, hottest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatTier {
    Hot,
    Warm,
    Emerging,
    Niche,
}

impl HeatTier {
    pub const ORDERED: [HeatTier; 4] = [
        HeatTier::Hot,
        HeatTier::Warm,
        HeatTier::Emerging,
        HeatTier::Niche,
    ];

    /// Label for a cluster ranked `rank` (0 = hottest) out of `clusters`.
    pub fn for_rank(rank: usize, clusters: usize) -> Self {
        let clusters = clusters.max(1);
        let index = (rank * Self::ORDERED.len() / clusters).min(Self::ORDERED.len() - 1);
        Self::ORDERED[index]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hot => "热门",
            Self::Warm => "较热",
            Self::Emerging => "潜力",
            Self::Niche => "小众",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackAggregate {
    pub track: String,
    pub mean_market: f64,
    pub mean_tech: f64,
    pub mean_team: f64,
    pub first_place_count: usize,
    pub record_count: usize,
    pub heat: HeatTier,
}

impl TrackAggregate {
    /// Feature vector used for clustering. Team strength is not part of heat.
    pub fn cluster_features(&self) -> [f64; 3] {
        [
            self.mean_market,
            self.mean_tech,
            self.first_place_count as f64,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityBand {
    High,
    Moderate,
    Distinct,
}

impl SimilarityBand {
    pub fn from_similarity(similarity: f64) -> Self {
        if similarity > 0.6 {
            Self::High
        } else if similarity > 0.4 {
            Self::Moderate
        } else {
            Self::Distinct
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            Self::High => "创新点与高分项目高度相似，建议突出差异化竞争优势",
            Self::Moderate => "项目具备一定创新性，建议加强技术深度与市场数据支撑",
            Self::Distinct => "项目差异化明显，建议参考高分项目的逻辑结构与表达方式",
        }
    }

    pub fn risk(self) -> &'static str {
        match self {
            Self::High => "注意避免与已有获奖项目同质化",
            Self::Moderate => "补充市场规模、用户调研等量化证据",
            Self::Distinct => "完善商业计划书的撰写规范",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisResult {
    pub similarity: f64,
    pub band: SimilarityBand,
    pub advice: String,
    pub risk: String,
    pub keywords: Vec<String>,
    pub fallback_corpus_used: bool,
    pub neutral_similarity: bool,
}

impl DiagnosisResult {
    pub fn used_fallback(&self) -> bool {
        self.fallback_corpus_used || self.neutral_similarity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureWeight {
    pub feature: SubScore,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub train_size: usize,
    pub test_size: usize,
    pub mse: f64,
    pub r2: f64,
    pub intercept: f64,
    pub weights: Vec<FeatureWeight>,
    pub model_path: PathBuf,
    pub trained_at: String,
    pub dataset_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub market_score: f64,
    pub tech_score: f64,
    pub team_score: f64,
    pub predicted: f64,
    /// Share of each input in the three-score total, in feature order.
    pub contributions: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Cleaning(CleaningReport),
    Tracks { tracks: Vec<TrackAggregate> },
    Diagnosis(DiagnosisResult),
    Training(TrainingReport),
    Prediction(PredictionReport),
}
