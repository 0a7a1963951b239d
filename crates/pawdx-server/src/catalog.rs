//! Display records derived once from the reference index: the symptom
//! vocabulary served to autocomplete and the disease reference list.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use pawdx_schema::{DiseaseCatalogEntry, Severity, SymptomRecord};

use crate::reference::ReferenceIndex;

/// Severity tiers for the disease catalog. Narrower than
/// `scoring::SCORING_EMERGENCY_KEYWORDS`: no `gdv`, no `bleeding`.
pub const CATALOG_EMERGENCY_KEYWORDS: &[&str] = &["bloat", "poisoning", "trauma", "seizure", "unconscious"];
pub const CATALOG_HIGH_KEYWORDS: &[&str] = &["cancer", "kidney", "liver", "heart", "diabetes"];
pub const CATALOG_MEDIUM_KEYWORDS: &[&str] = &["fever", "infection"];

const DESCRIPTION_SYMPTOMS: usize = 3;
const COMMON_SYMPTOMS: usize = 6;

// keyed by lowercased name
static CATEGORIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| HashMap::from([
    ("vomiting", "Gastrointestinal"),
    ("diarrhea", "Gastrointestinal"),
    ("loss of appetite", "Gastrointestinal"),
    ("fever", "Systemic"),
    ("lethargy", "Behavioral"),
    ("weight loss", "Systemic"),
    ("coughing", "Respiratory"),
    ("breathing difficulty", "Respiratory"),
    ("nasal discharge", "Respiratory"),
    ("lameness", "Musculoskeletal"),
    ("swollen lymph nodes", "Immune"),
    ("heart complication", "Cardiovascular"),
    ("increased drinking and urination", "Urinary"),
    ("neurological disorders", "Neurological"),
]));

// keyed by exact display name
static DESCRIPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| HashMap::from([
    ("Fever", "Elevated body temperature above normal range"),
    ("Loss of appetite", "Decreased interest in food or eating less than usual"),
    ("Lethargy", "Unusual tiredness, weakness, or lack of energy"),
    ("Vomiting", "Forceful expulsion of stomach contents"),
    ("Weight Loss", "Unintentional decrease in body weight"),
    ("Breathing Difficulty", "Labored, rapid, or troubled breathing"),
    ("Nasal Discharge", "Fluid coming from the nose"),
    ("Lameness", "Difficulty walking or favoring one leg"),
    ("Swollen Lymph nodes", "Enlarged lymph glands, often indicating infection"),
    ("Heart Complication", "Issues affecting heart function or rhythm"),
    ("Increased drinking and urination", "Excessive thirst and frequent urination"),
    ("Neurological Disorders", "Problems affecting the nervous system"),
]));

static KEYWORDS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| HashMap::from([
    ("Fever", &["hot", "temperature", "warm", "burning"] as &[&str]),
    ("Loss of appetite", &["not eating", "refuses food", "appetite loss"] as &[&str]),
    ("Lethargy", &["tired", "sleepy", "weak", "inactive"] as &[&str]),
    ("Vomiting", &["throwing up", "sick", "puke", "regurgitate"] as &[&str]),
    ("Weight Loss", &["losing weight", "thin", "skinny", "underweight"] as &[&str]),
    ("Breathing Difficulty", &["breathing problems", "panting", "wheezing"] as &[&str]),
    ("Lameness", &["limping", "walking problems", "favoring leg"] as &[&str]),
    ("Increased drinking and urination", &["drinking lots", "frequent urination", "excessive thirst"] as &[&str]),
]));

pub fn catalog_severity(disease: &str) -> Severity {
    let lower = disease.to_lowercase();
    let hit = |keys: &[&str]| keys.iter().any(|k| lower.contains(k));
    if hit(CATALOG_EMERGENCY_KEYWORDS) { Severity::Emergency }
    else if hit(CATALOG_HIGH_KEYWORDS) { Severity::High }
    else if hit(CATALOG_MEDIUM_KEYWORDS) { Severity::Medium }
    else { Severity::Low }
}

pub fn default_action(severity: Severity) -> &'static str {
    match severity {
        Severity::Emergency => "Immediate emergency veterinary care required",
        Severity::High => "Urgent veterinary consultation within 6 hours",
        Severity::Medium => "Veterinary consultation within 24 hours",
        Severity::Low => "Monitor symptoms and consult veterinarian if they worsen",
    }
}

fn symptom_record(position: usize, name: &str) -> SymptomRecord {
    let description = DESCRIPTIONS.get(name).map(|d| d.to_string())
        .unwrap_or_else(|| format!("Observable sign or symptom: {}", name.to_lowercase()));
    let category = CATEGORIES.get(name.to_lowercase().as_str()).copied().unwrap_or("General").to_string();
    let keywords = match KEYWORDS.get(name) {
        Some(k) => k.iter().map(|s| s.to_string()).collect(),
        None => vec![name.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")],
    };
    SymptomRecord { id: (position + 1).to_string(), name: name.to_string(), description, category, keywords }
}

fn disease_entry(position: usize, name: &str, index: &ReferenceIndex) -> DiseaseCatalogEntry {
    let symptoms = index.disease_info(name).map(|i| i.symptoms.as_slice()).unwrap_or_default();
    let characterized_by = if symptoms.is_empty() {
        "various symptoms".to_string()
    } else {
        symptoms.iter().take(DESCRIPTION_SYMPTOMS).cloned().collect::<Vec<_>>().join(", ")
    };
    let severity = catalog_severity(name);
    DiseaseCatalogEntry {
        id: (position + 1).to_string(),
        name: name.to_string(),
        description: format!("Condition characterized by {characterized_by}"),
        severity,
        recommended_action: default_action(severity).to_string(),
        common_symptoms: symptoms.iter().take(COMMON_SYMPTOMS).cloned().collect(),
    }
}

#[derive(Debug)]
pub struct Catalog {
    symptoms: Vec<SymptomRecord>,
    diseases: Vec<DiseaseCatalogEntry>,
    symptom_by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn build(index: &ReferenceIndex) -> Self {
        let symptoms: Vec<SymptomRecord> = index.all_symptom_names().iter().enumerate().map(|(i, n)| symptom_record(i, n)).collect();
        let diseases: Vec<DiseaseCatalogEntry> = index.all_disease_names().enumerate().map(|(i, n)| disease_entry(i, n, index)).collect();
        let symptom_by_name = symptoms.iter().enumerate().map(|(i, s)| (s.name.clone(), i)).collect();
        tracing::info!(symptoms = symptoms.len(), diseases = diseases.len(), "catalog initialized");
        Self { symptoms, diseases, symptom_by_name }
    }

    pub fn symptoms(&self) -> &[SymptomRecord] { &self.symptoms }
    pub fn diseases(&self) -> &[DiseaseCatalogEntry] { &self.diseases }

    /// Exact display-name lookup.
    pub fn symptom(&self, name: &str) -> Option<&SymptomRecord> {
        self.symptom_by_name.get(name).map(|i| &self.symptoms[*i])
    }

    pub fn disease_by_name(&self, name: &str) -> Option<&DiseaseCatalogEntry> {
        let lower = name.to_lowercase();
        self.diseases.iter().find(|d| d.name.to_lowercase() == lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::DiseaseReferenceEntry;
    use crate::scoring::SCORING_EMERGENCY_KEYWORDS;

    fn index() -> ReferenceIndex {
        let e = |d: &str, s: &[&str]| DiseaseReferenceEntry { disease: d.into(), symptoms: s.iter().map(|x| x.to_string()).collect() };
        ReferenceIndex::from_entries(vec![
            e("Canine Distemper", &["Fever", "Nasal Discharge", "Coughing", "Lethargy", "Vomiting", "Diarrhea", "Seizures"]),
            e("Kidney Disease", &["Increased drinking and urination", "Weight Loss"]),
            e("Bloat (GDV)", &["Swollen abdomen"]),
        ])
    }

    #[test]
    fn emergency_keyword_lists_differ_on_purpose() {
        assert_ne!(SCORING_EMERGENCY_KEYWORDS, CATALOG_EMERGENCY_KEYWORDS);
        for k in CATALOG_EMERGENCY_KEYWORDS { assert!(SCORING_EMERGENCY_KEYWORDS.contains(k)); }
        assert!(!CATALOG_EMERGENCY_KEYWORDS.contains(&"gdv"));
        assert!(!CATALOG_EMERGENCY_KEYWORDS.contains(&"bleeding"));
        assert_eq!(catalog_severity("Internal Bleeding"), Severity::Low);
        assert!(crate::scoring::is_emergency("Internal Bleeding"));
    }

    #[test]
    fn severity_tiers() {
        assert_eq!(catalog_severity("Bloat (GDV)"), Severity::Emergency);
        assert_eq!(catalog_severity("Chronic Kidney Disease"), Severity::High);
        assert_eq!(catalog_severity("Ear Infection"), Severity::Medium);
        assert_eq!(catalog_severity("Tick Fever"), Severity::Medium);
        assert_eq!(catalog_severity("Kennel Cough"), Severity::Low);
        assert_eq!(default_action(Severity::High), "Urgent veterinary consultation within 6 hours");
    }

    #[test]
    fn symptom_records_follow_sorted_vocabulary() {
        let c = Catalog::build(&index());
        let names: Vec<&str> = c.symptoms().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"Coughing"));
        assert_eq!(c.symptoms()[0].id, "1");
        let fever = c.symptom("Fever").unwrap();
        assert_eq!(fever.category, "Systemic");
        assert_eq!(fever.description, "Elevated body temperature above normal range");
        assert_eq!(fever.keywords, vec!["hot", "temperature", "warm", "burning"]);
        // category table is keyed by lowercased name, description table by exact name
        let nasal = c.symptom("Nasal Discharge").unwrap();
        assert_eq!(nasal.category, "Respiratory");
        assert_eq!(nasal.description, "Fluid coming from the nose");
        let swollen = c.symptom("Swollen abdomen").unwrap();
        assert_eq!(swollen.category, "General");
        assert_eq!(swollen.description, "Observable sign or symptom: swollen abdomen");
        assert_eq!(swollen.keywords, vec!["swollen abdomen"]);
    }

    #[test]
    fn disease_entries_follow_encounter_order() {
        let c = Catalog::build(&index());
        let d = &c.diseases()[0];
        assert_eq!((d.id.as_str(), d.name.as_str()), ("1", "Canine Distemper"));
        assert_eq!(d.description, "Condition characterized by Fever, Nasal Discharge, Coughing");
        assert_eq!(d.common_symptoms.len(), 6);
        assert_eq!(d.severity, Severity::Low);
        assert_eq!(c.diseases()[1].severity, Severity::High);
        assert_eq!(c.diseases()[2].recommended_action, "Immediate emergency veterinary care required");
    }

    #[test]
    fn disease_lookup_ignores_case() {
        let c = Catalog::build(&index());
        assert_eq!(c.disease_by_name("kidney disease").map(|d| d.id.as_str()), Some("2"));
        assert!(c.disease_by_name("rabies").is_none());
    }
}
