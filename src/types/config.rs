use crate::error::PlanscopeError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_RAW_DATA: &str = "data/raw_data/3c_competition_raw.csv";
pub const DEFAULT_PROCESSED_DATA: &str = "data/processed_data/3c_competition_processed.csv";
pub const DEFAULT_MODEL: &str = "models/linear_regression.bin";
pub const DEFAULT_TOP_TIER: &str = "一等奖";
pub const DEFAULT_KEYWORD_DELIMITER: char = '、';

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanscopeConfig {
    pub paths: Option<PathsConfig>,
    pub data: Option<DataConfig>,
    pub model: Option<ModelConfig>,
    pub tracks: Option<TracksConfig>,
    pub diagnosis: Option<DiagnosisConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub raw_data: Option<String>,
    pub processed_data: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub keyword_delimiter: Option<String>,
    pub top_tier: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub random_seed: Option<u64>,
    pub test_size: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TracksConfig {
    pub cluster_count: Option<usize>,
    pub n_init: Option<usize>,
    pub max_iter: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosisConfig {
    pub min_text_chars: Option<usize>,
    pub top_keywords: Option<usize>,
    pub max_features: Option<usize>,
    pub fallback_corpus: Option<Vec<String>>,
}

/// Fully resolved parameters handed to the analytical routines.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub raw_data: PathBuf,
    pub processed_data: PathBuf,
    pub model_path: PathBuf,
    pub keyword_delimiter: char,
    pub tracks: TrackParams,
    pub diagnosis: DiagnosisParams,
    pub training: TrainParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackParams {
    pub cluster_count: usize,
    pub n_init: usize,
    pub max_iter: usize,
    pub seed: u64,
    pub top_tier: String,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            cluster_count: 4,
            n_init: 10,
            max_iter: 300,
            seed: 42,
            top_tier: DEFAULT_TOP_TIER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisParams {
    pub min_text_chars: usize,
    pub top_keywords: usize,
    pub max_features: usize,
    pub fallback_corpus: Vec<String>,
    pub top_tier: String,
}

impl Default for DiagnosisParams {
    fn default() -> Self {
        Self {
            min_text_chars: 10,
            top_keywords: 8,
            max_features: 100,
            fallback_corpus: default_fallback_corpus(),
            top_tier: DEFAULT_TOP_TIER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainParams {
    pub seed: u64,
    pub test_size: f64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            seed: 42,
            test_size: 0.2,
        }
    }
}

pub fn default_fallback_corpus() -> Vec<String> {
    vec!["人工智能创新项目".to_string(), "区块链应用平台".to_string()]
}

impl Settings {
    pub fn defaults(root: &Path) -> Self {
        PlanscopeConfig::default().settings(root)
    }
}

impl PlanscopeConfig {
    pub fn settings(&self, root: &Path) -> Settings {
        let paths = self.paths.as_ref();
        let resolve = |value: Option<&String>, fallback: &str| {
            let raw = value.map(String::as_str).unwrap_or(fallback);
            let path = PathBuf::from(raw);
            if path.is_absolute() {
                path
            } else {
                root.join(path)
            }
        };

        let top_tier = self
            .data
            .as_ref()
            .and_then(|data| data.top_tier.clone())
            .unwrap_or_else(|| DEFAULT_TOP_TIER.to_string());
        let keyword_delimiter = self
            .data
            .as_ref()
            .and_then(|data| data.keyword_delimiter.as_deref())
            .and_then(|delimiter| delimiter.chars().next())
            .unwrap_or(DEFAULT_KEYWORD_DELIMITER);

        let training_defaults = TrainParams::default();
        let training = TrainParams {
            seed: self
                .model
                .as_ref()
                .and_then(|model| model.random_seed)
                .unwrap_or(training_defaults.seed),
            test_size: self
                .model
                .as_ref()
                .and_then(|model| model.test_size)
                .unwrap_or(training_defaults.test_size),
        };

        let track_defaults = TrackParams::default();
        let tracks = match &self.tracks {
            Some(tracks) => TrackParams {
                cluster_count: tracks.cluster_count.unwrap_or(track_defaults.cluster_count),
                n_init: tracks.n_init.unwrap_or(track_defaults.n_init),
                max_iter: tracks.max_iter.unwrap_or(track_defaults.max_iter),
                seed: training.seed,
                top_tier: top_tier.clone(),
            },
            None => TrackParams {
                seed: training.seed,
                top_tier: top_tier.clone(),
                ..track_defaults
            },
        };

        let diagnosis_defaults = DiagnosisParams::default();
        let diagnosis = match &self.diagnosis {
            Some(diagnosis) => DiagnosisParams {
                min_text_chars: diagnosis
                    .min_text_chars
                    .unwrap_or(diagnosis_defaults.min_text_chars),
                top_keywords: diagnosis
                    .top_keywords
                    .unwrap_or(diagnosis_defaults.top_keywords),
                max_features: diagnosis
                    .max_features
                    .unwrap_or(diagnosis_defaults.max_features),
                fallback_corpus: diagnosis
                    .fallback_corpus
                    .clone()
                    .unwrap_or(diagnosis_defaults.fallback_corpus),
                top_tier,
            },
            None => DiagnosisParams {
                top_tier,
                ..diagnosis_defaults
            },
        };

        Settings {
            raw_data: resolve(
                paths.and_then(|paths| paths.raw_data.as_ref()),
                DEFAULT_RAW_DATA,
            ),
            processed_data: resolve(
                paths.and_then(|paths| paths.processed_data.as_ref()),
                DEFAULT_PROCESSED_DATA,
            ),
            model_path: resolve(paths.and_then(|paths| paths.model.as_ref()), DEFAULT_MODEL),
            keyword_delimiter,
            tracks,
            diagnosis,
            training,
        }
    }

    pub fn validate(&self) -> Result<(), PlanscopeError> {
        if let Some(data) = &self.data {
            if let Some(delimiter) = &data.keyword_delimiter {
                if delimiter.chars().count() != 1 {
                    return Err(PlanscopeError::ConfigParse(format!(
                        "data.keyword_delimiter must be a single character (found {delimiter:?})"
                    )));
                }
            }
            if let Some(top_tier) = &data.top_tier {
                if top_tier.trim().is_empty() {
                    return Err(PlanscopeError::ConfigParse(
                        "data.top_tier cannot be empty".to_string(),
                    ));
                }
            }
        }

        if let Some(model) = &self.model {
            if let Some(test_size) = model.test_size {
                if !(test_size > 0.0 && test_size < 1.0) {
                    return Err(PlanscopeError::ConfigParse(format!(
                        "model.test_size must be strictly between 0.0 and 1.0 (found {test_size})"
                    )));
                }
            }
        }

        if let Some(tracks) = &self.tracks {
            if tracks.cluster_count == Some(0) {
                return Err(PlanscopeError::ConfigParse(
                    "tracks.cluster_count must be greater than 0".to_string(),
                ));
            }
            if tracks.n_init == Some(0) {
                return Err(PlanscopeError::ConfigParse(
                    "tracks.n_init must be greater than 0".to_string(),
                ));
            }
            if tracks.max_iter == Some(0) {
                return Err(PlanscopeError::ConfigParse(
                    "tracks.max_iter must be greater than 0".to_string(),
                ));
            }
        }

        if let Some(diagnosis) = &self.diagnosis {
            if diagnosis.max_features == Some(0) {
                return Err(PlanscopeError::ConfigParse(
                    "diagnosis.max_features must be greater than 0".to_string(),
                ));
            }
            if let Some(corpus) = &diagnosis.fallback_corpus {
                if corpus.iter().all(|entry| entry.trim().is_empty()) {
                    return Err(PlanscopeError::ConfigParse(
                        "diagnosis.fallback_corpus needs at least one non-empty entry".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}
