use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical comparison form of a symptom phrase: lowercased, non-word
/// characters removed, whitespace runs collapsed to one space, trimmed.
///
/// Applied identically to reference symptoms, user phrases and search
/// queries. Output only contains `[a-z0-9_ ]` so a second pass is a no-op.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let kept: String = lowered.chars().filter(|c| is_word_char(*c) || c.is_whitespace()).collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_word_char(c: char) -> bool { c.is_ascii_alphanumeric() || c == '_' }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity { Low, Medium, High, Emergency }

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Emergency => write!(f, "emergency"),
        }
    }
}

/// Display record for one symptom of the reference vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseCatalogEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub recommended_action: String,
    pub common_symptoms: Vec<String>,
}

/// One ranked diagnosis. `confidence` is rounded to two places and never above 0.95.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub disease: String,
    pub confidence: f64,
    pub description: String,
    pub action: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub follow_up_question: Option<String>,
}

impl DiagnosisRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.symptoms.is_empty() { return Err("At least one symptom is required".into()); }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResponse {
    pub chat_response: String,
    pub predictions: Vec<Prediction>,
    pub follow_up_available: bool,
    pub diagnosis_id: Uuid,
}

/// Every field is optional on the wire so a missing one can be reported as a 400
/// instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpRequest {
    pub symptoms: Option<Vec<String>>,
    pub predictions: Option<Vec<Prediction>>,
    pub question: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpResponse { pub chat_response: String }

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRecord {
    pub id: Uuid,
    pub symptoms: Vec<String>,
    pub predictions: Vec<Prediction>,
    pub chat_response: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests { use super::*; use proptest::prelude::*;
    #[test] fn normalize_lowercases_and_strips_punctuation() { assert_eq!(normalize("  Loss of   Appetite!! "), "loss of appetite"); assert_eq!(normalize("Bloat (GDV)"), "bloat gdv"); }
    #[test] fn normalize_keeps_underscore_and_digits() { assert_eq!(normalize("Stage_2 Fever"), "stage_2 fever"); }
    #[test] fn normalize_collapses_gap_left_by_punctuation() { assert_eq!(normalize("nose - bleed"), "nose bleed"); assert_eq!(normalize("?!"), ""); }
    #[test] fn normalize_drops_non_ascii_letters() { assert_eq!(normalize("Fièvre"), "fivre"); }
    proptest! {
        #[test] fn prop_normalize_idempotent(s in "\\PC{0,40}") { let once = normalize(&s); prop_assert_eq!(normalize(&once), once); }
        #[test] fn prop_normalize_output_alphabet(s in "\\PC{0,40}") { let n = normalize(&s); prop_assert!(n.chars().all(|c| c == ' ' || c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit())); prop_assert!(!n.contains("  ")); prop_assert_eq!(n.trim(), n.as_str()); }
    }
    #[test] fn severity_serializes_lowercase() { assert_eq!(serde_json::to_string(&Severity::Emergency).unwrap(), "\"emergency\""); assert_eq!(Severity::Medium.to_string(), "medium"); }
    #[test] fn diagnosis_request_uses_camel_case() { let req: DiagnosisRequest = serde_json::from_str(r#"{"symptoms":["Vomiting"],"followUpQuestion":"Is it serious?"}"#).unwrap(); assert_eq!(req.follow_up_question.as_deref(), Some("Is it serious?")); assert!(req.validate().is_ok()); }
    #[test] fn diagnosis_request_rejects_empty_symptoms() { let req: DiagnosisRequest = serde_json::from_str(r#"{"symptoms":[]}"#).unwrap(); assert!(req.validate().is_err()); }
    #[test] fn diagnosis_request_missing_symptoms_fails() { let de: Result<DiagnosisRequest, _> = serde_json::from_str(r#"{"followUpQuestion":"x"}"#); assert!(de.is_err()); }
    #[test] fn catalog_entry_field_names() { let e = DiseaseCatalogEntry { id:"1".into(), name:"Kennel Cough".into(), description:"d".into(), severity: Severity::Low, recommended_action:"a".into(), common_symptoms: vec!["Coughing".into()] }; let v = serde_json::to_value(&e).unwrap(); assert!(v.get("recommendedAction").is_some()); assert!(v.get("commonSymptoms").is_some()); assert_eq!(v["severity"], "low"); }
    #[test] fn follow_up_request_tolerates_missing_fields() { let req: FollowUpRequest = serde_json::from_str(r#"{"question":"why?"}"#).unwrap(); assert!(req.symptoms.is_none()); assert!(req.predictions.is_none()); }
}
