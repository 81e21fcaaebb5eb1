use crate::types::record::SubScore;
use crate::types::report::{
    CleaningReport, DiagnosisResult, PredictionReport, Report, TrackAggregate, TrainingReport,
};

pub fn to_markdown(report: &Report) -> String {
    match report {
        Report::Cleaning(cleaning) => cleaning_markdown(cleaning),
        Report::Tracks { tracks } => tracks_markdown(tracks),
        Report::Diagnosis(diagnosis) => diagnosis_markdown(diagnosis),
        Report::Training(training) => training_markdown(training),
        Report::Prediction(prediction) => prediction_markdown(prediction),
    }
}

fn feature_name(feature: SubScore) -> &'static str {
    match feature {
        SubScore::Market => "market",
        SubScore::Tech => "tech",
        SubScore::Team => "team",
    }
}

fn cleaning_markdown(report: &CleaningReport) -> String {
    let mut output = String::new();
    output.push_str("# Data Cleaning\n\n");
    output.push_str(&format!(
        "- rows read: {}\n- rows after dedup: {}\n- rows written: {}\n",
        report.rows_read, report.rows_after_dedup, report.rows_written
    ));
    if let Some(path) = &report.output {
        output.push_str(&format!("- output: {}\n", path.display()));
    }
    output.push('\n');

    output.push_str("## Missing Scores\n\n");
    if report.fills.is_empty() {
        output.push_str("- none\n");
    } else {
        for fill in &report.fills {
            output.push_str(&format!(
                "- {}: {} filled with median {:.2}\n",
                fill.column.column(),
                fill.missing,
                fill.median
            ));
        }
    }
    output
}

fn tracks_markdown(tracks: &[TrackAggregate]) -> String {
    let mut output = String::new();
    output.push_str("# Track Heat\n\n");
    if tracks.is_empty() {
        output.push_str("- no tracks\n");
        return output;
    }

    output.push_str("| track | heat | market | tech | team | first place | projects |\n");
    output.push_str("|---|---|---|---|---|---|---|\n");
    let mut ordered = tracks.iter().collect::<Vec<_>>();
    ordered.sort_by(|a, b| a.heat.cmp(&b.heat).then_with(|| a.track.cmp(&b.track)));
    for track in ordered {
        output.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} | {:.2} | {} | {} |\n",
            track.track,
            track.heat.label(),
            track.mean_market,
            track.mean_tech,
            track.mean_team,
            track.first_place_count,
            track.record_count
        ));
    }
    output
}

fn diagnosis_markdown(diagnosis: &DiagnosisResult) -> String {
    let mut output = String::new();
    output.push_str("# Project Diagnosis\n\n");
    output.push_str(&format!(
        "Similarity to top-tier projects: {:.2}\n\n",
        diagnosis.similarity
    ));
    output.push_str(&format!("- advice: {}\n", diagnosis.advice));
    output.push_str(&format!("- risk: {}\n", diagnosis.risk));
    if diagnosis.keywords.is_empty() {
        output.push_str("- keywords: none\n");
    } else {
        output.push_str(&format!("- keywords: {}\n", diagnosis.keywords.join(", ")));
    }
    if diagnosis.fallback_corpus_used {
        output.push_str("\nNote: no top-tier projects in the dataset; compared against the fallback corpus.\n");
    }
    if diagnosis.neutral_similarity {
        output.push_str("\nNote: no comparable terms were found; similarity is the neutral default.\n");
    }
    output
}

fn training_markdown(report: &TrainingReport) -> String {
    let mut output = String::new();
    output.push_str("# Score Model\n\n");
    output.push_str(&format!(
        "- train rows: {}\n- test rows: {}\n- MSE: {:.2}\n- R²: {:.2}\n- model: {}\n- trained at: {}\n\n",
        report.train_size,
        report.test_size,
        report.mse,
        report.r2,
        report.model_path.display(),
        report.trained_at
    ));
    output.push_str("## Feature Weights\n\n");
    for weight in &report.weights {
        output.push_str(&format!(
            "- {}: {:.2}\n",
            feature_name(weight.feature),
            weight.coefficient
        ));
    }
    output.push_str(&format!("- intercept: {:.2}\n", report.intercept));
    output
}

fn prediction_markdown(report: &PredictionReport) -> String {
    let mut output = String::new();
    output.push_str("# Score Prediction\n\n");
    output.push_str(&format!("Predicted composite score: {:.1} / 100\n\n", report.predicted));
    output.push_str("## Score Composition\n\n");
    let inputs = [report.market_score, report.tech_score, report.team_score];
    for ((feature, score), share) in SubScore::ALL.iter().zip(inputs).zip(report.contributions) {
        output.push_str(&format!(
            "- {}: {:.0} ({:.1}%)\n",
            feature_name(*feature),
            score,
            share * 100.0
        ));
    }
    output
}
