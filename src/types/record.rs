use serde::Serialize;

/// The three judged dimensions of a project, in feature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubScore {
    Market,
    Tech,
    Team,
}

impl SubScore {
    pub const ALL: [SubScore; 3] = [SubScore::Market, SubScore::Tech, SubScore::Team];

    pub fn column(self) -> &'static str {
        match self {
            Self::Market => "市场前景评分",
            Self::Tech => "技术创新评分",
            Self::Team => "团队实力评分",
        }
    }
}

/// One row of the raw award table, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub track: String,
    pub market_score: Option<f64>,
    pub tech_score: Option<f64>,
    pub team_score: Option<f64>,
    pub award_tier: String,
    pub project_name: String,
    pub keywords: Option<String>,
}

impl RawRecord {
    pub fn score(&self, which: SubScore) -> Option<f64> {
        match which {
            SubScore::Market => self.market_score,
            SubScore::Tech => self.tech_score,
            SubScore::Team => self.team_score,
        }
    }

    pub fn score_mut(&mut self, which: SubScore) -> &mut Option<f64> {
        match which {
            SubScore::Market => &mut self.market_score,
            SubScore::Tech => &mut self.tech_score,
            SubScore::Team => &mut self.team_score,
        }
    }
}

/// One row of the cleaned table. Sub-scores are always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub track: String,
    pub market_score: f64,
    pub tech_score: f64,
    pub team_score: f64,
    pub award_tier: String,
    pub project_name: String,
    pub keywords: Vec<String>,
}

impl Record {
    pub fn features(&self) -> [f64; 3] {
        [self.market_score, self.tech_score, self.team_score]
    }

    /// Unweighted mean of the three sub-scores.
    pub fn composite(&self) -> f64 {
        (self.market_score + self.tech_score + self.team_score) / 3.0
    }

    /// Converts back to the raw shape, joining keywords with `delimiter`.
    pub fn to_raw(&self, delimiter: char) -> RawRecord {
        let keywords = if self.keywords.is_empty() {
            None
        } else {
            Some(self.keywords.join(&delimiter.to_string()))
        };
        RawRecord {
            track: self.track.clone(),
            market_score: Some(self.market_score),
            tech_score: Some(self.tech_score),
            team_score: Some(self.team_score),
            award_tier: self.award_tier.clone(),
            project_name: self.project_name.clone(),
            keywords,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_is_mean_of_sub_scores() {
        let record = Record {
            track: "AI".to_string(),
            market_score: 80.0,
            tech_score: 60.0,
            team_score: 65.0,
            award_tier: "二等奖".to_string(),
            project_name: "demo".to_string(),
            keywords: vec![],
        };
        assert!((record.composite() - 68.333_333).abs() < 1e-5);
    }

    #[test]
    fn to_raw_joins_keywords_and_marks_empty_as_missing() {
        let mut record = Record {
            track: "AI".to_string(),
            market_score: 1.0,
            tech_score: 2.0,
            team_score: 3.0,
            award_tier: "一等奖".to_string(),
            project_name: "demo".to_string(),
            keywords: vec!["ai".to_string(), "农业".to_string()],
        };
        assert_eq!(record.to_raw('、').keywords.as_deref(), Some("ai、农业"));

        record.keywords.clear();
        assert_eq!(record.to_raw('、').keywords, None);
    }
}
