use pawdx_schema::{Prediction, Severity};

use crate::reference::{MatchResult, ReferenceIndex};
use crate::scoring::{confidence, is_emergency};

/// `diagnose` never returns more than this many predictions.
pub const MAX_PREDICTIONS: usize = 5;
const CANDIDATES: usize = 10;
const MIN_CONFIDENCE: f64 = 0.1;
const DESCRIPTION_SYMPTOMS: usize = 4;

pub const ACTION_IMMEDIATE: &str = "Immediate veterinary consultation recommended";
pub const ACTION_WITHIN_DAY: &str = "Veterinary consultation within 24 hours";
pub const ACTION_MONITOR: &str = "Monitor symptoms and consult veterinarian if they worsen";

fn round2(x: f64) -> f64 { (x * 100.0).round() / 100.0 }

fn describe(index: &ReferenceIndex, disease: &str) -> String {
    let common = match index.disease_info(disease) {
        Some(info) if !info.symptoms.is_empty() => info.symptoms.iter().take(DESCRIPTION_SYMPTOMS).cloned().collect::<Vec<_>>().join(", "),
        _ => "various symptoms".to_string(),
    };
    format!("A condition commonly associated with {common}. Based on veterinary data analysis.")
}

pub fn action_for(disease: &str, confidence: f64) -> &'static str {
    if is_emergency(disease) || confidence > 0.8 { ACTION_IMMEDIATE }
    else if confidence > 0.6 { ACTION_WITHIN_DAY }
    else { ACTION_MONITOR }
}

pub fn severity_for(disease: &str, confidence: f64) -> Severity {
    if is_emergency(disease) { Severity::Emergency }
    else if confidence > 0.7 { Severity::High }
    else if confidence > 0.5 { Severity::Medium }
    else { Severity::Low }
}

/// Score the top candidates of an already sorted match list and package the
/// survivors as predictions, highest confidence first.
pub fn rank(index: &ReferenceIndex, matches: &[MatchResult], user_count: usize) -> Vec<Prediction> {
    let mut predictions: Vec<Prediction> = matches.iter().take(CANDIDATES).filter_map(|m| {
        let frequency = index.disease_info(&m.disease).map(|i| i.frequency);
        let c = confidence(user_count, m, frequency);
        if c <= MIN_CONFIDENCE { return None; }
        Some(Prediction {
            disease: m.disease.clone(),
            confidence: round2(c),
            description: describe(index, &m.disease),
            action: action_for(&m.disease, c).to_string(),
            severity: severity_for(&m.disease, c),
        })
    }).collect();
    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    predictions.truncate(MAX_PREDICTIONS);
    predictions
}
