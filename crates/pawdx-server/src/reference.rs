use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use pawdx_schema::normalize;

/// `searchSymptoms` never returns more than this many names.
pub const MAX_SEARCH_RESULTS: usize = 10;
const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("cannot read reference data {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("reference data {path} contains no usable records")]
    Empty { path: PathBuf },
}

/// One raw `disease,symptom,...` row.
#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseReferenceEntry { pub disease: String, pub symptoms: Vec<String> }

/// All rows sharing one disease name, folded. `symptoms` keeps first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseAggregate { pub symptoms: Vec<String>, pub frequency: usize }

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult { pub disease: String, pub match_count: usize, pub total_symptoms: usize }

impl MatchResult {
    /// Ratio used to order candidates: `match_count / max(total_symptoms, user_count)`.
    pub fn ratio(&self, user_count: usize) -> f64 {
        self.match_count as f64 / self.total_symptoms.max(user_count).max(1) as f64
    }
}

fn fallback_entries() -> Vec<DiseaseReferenceEntry> {
    vec![
        DiseaseReferenceEntry { disease: "Gastroenteritis".into(), symptoms: vec!["Vomiting".into(), "Diarrhea".into(), "Loss of appetite".into(), "Lethargy".into()] },
        DiseaseReferenceEntry { disease: "Kennel Cough".into(), symptoms: vec!["Coughing".into(), "Lethargy".into(), "Loss of appetite".into()] },
    ]
}

/// Parse reference CSV text. The first line is a header; blank rows, rows with
/// fewer than two columns, and rows left without a disease or symptom after
/// trimming are skipped. Quoting is not supported.
pub fn parse_csv(content: &str) -> Vec<DiseaseReferenceEntry> {
    content.split('\n').skip(1).filter_map(|raw| {
        let line = raw.trim();
        if line.is_empty() { return None; }
        let columns: Vec<&str> = line.split(',').collect();
        if columns.len() < 2 { return None; }
        let disease = columns[0].trim();
        let symptoms: Vec<String> = columns[1..].iter().map(|c| c.trim()).filter(|c| !c.is_empty()).map(String::from).collect();
        if disease.is_empty() || symptoms.is_empty() { return None; }
        Some(DiseaseReferenceEntry { disease: disease.to_string(), symptoms })
    }).collect()
}

pub fn read_entries(path: &Path) -> Result<Vec<DiseaseReferenceEntry>, ReferenceError> {
    let content = std::fs::read_to_string(path).map_err(|source| ReferenceError::Io { path: path.to_path_buf(), source })?;
    let entries = parse_csv(&content);
    if entries.is_empty() { return Err(ReferenceError::Empty { path: path.to_path_buf() }); }
    Ok(entries)
}

/// Read-only disease/symptom lookup built once at startup.
#[derive(Debug)]
pub struct ReferenceIndex {
    entries: Vec<DiseaseReferenceEntry>,
    // (disease, aggregate) in first-encounter order
    aggregates: Vec<(String, DiseaseAggregate)>,
    by_name: HashMap<String, usize>,
    symptom_names: Vec<String>,
}

impl ReferenceIndex {
    /// Load from `path`, substituting the built-in table when the file is unusable.
    pub fn load(path: &Path) -> Self {
        match read_entries(path) {
            Ok(entries) => {
                tracing::info!(records = entries.len(), path = %path.display(), "loaded disease-symptom records");
                Self::from_entries(entries)
            }
            Err(e) => {
                tracing::warn!(error = %e, "reference data unavailable, using fallback table");
                Self::fallback()
            }
        }
    }

    pub fn fallback() -> Self { Self::from_entries(fallback_entries()) }

    pub fn from_entries(entries: Vec<DiseaseReferenceEntry>) -> Self {
        let mut aggregates: Vec<(String, DiseaseAggregate)> = vec![];
        let mut by_name: HashMap<String, usize> = HashMap::new();
        let mut seen: Vec<HashSet<String>> = vec![];
        let mut names: HashSet<String> = HashSet::new();
        for entry in &entries {
            let idx = *by_name.entry(entry.disease.clone()).or_insert_with(|| {
                aggregates.push((entry.disease.clone(), DiseaseAggregate { symptoms: vec![], frequency: 0 }));
                seen.push(HashSet::new());
                aggregates.len() - 1
            });
            let agg = &mut aggregates[idx].1;
            agg.frequency += 1;
            for s in &entry.symptoms {
                if seen[idx].insert(s.clone()) { agg.symptoms.push(s.clone()); }
                names.insert(s.clone());
            }
        }
        let mut symptom_names: Vec<String> = names.into_iter().collect();
        symptom_names.sort();
        Self { entries, aggregates, by_name, symptom_names }
    }

    pub fn entries(&self) -> &[DiseaseReferenceEntry] { &self.entries }

    /// Distinct disease names in first-encounter order.
    pub fn all_disease_names(&self) -> impl Iterator<Item = &str> { self.aggregates.iter().map(|(n, _)| n.as_str()) }

    /// Distinct symptom names, sorted on their original casing.
    pub fn all_symptom_names(&self) -> &[String] { &self.symptom_names }

    pub fn disease_info(&self, disease: &str) -> Option<&DiseaseAggregate> {
        self.by_name.get(disease).map(|i| &self.aggregates[*i].1)
    }

    pub fn search_symptoms(&self, query: &str) -> Vec<&str> {
        let q = normalize(query);
        if q.chars().count() < MIN_QUERY_CHARS { return vec![]; }
        self.symptom_names.iter().filter(|s| normalize(s).contains(&q)).take(MAX_SEARCH_RESULTS).map(String::as_str).collect()
    }

    /// Per-disease best single-row match against `user_symptoms`, keeping only
    /// diseases with at least one hit, ordered by descending ratio then count.
    ///
    /// Both `match_count` and `total_symptoms` take the maximum over a disease's
    /// rows rather than accumulating across them.
    pub fn match_diseases(&self, user_symptoms: &[String]) -> Vec<MatchResult> {
        let user: Vec<String> = user_symptoms.iter().map(|s| normalize(s)).filter(|s| !s.is_empty()).collect();
        let mut results: Vec<MatchResult> = self.aggregates.iter()
            .map(|(name, _)| MatchResult { disease: name.clone(), match_count: 0, total_symptoms: 0 })
            .collect();
        for entry in &self.entries {
            let Some(&idx) = self.by_name.get(&entry.disease) else { continue };
            let current = entry.symptoms.iter().filter(|s| {
                let reference = normalize(s);
                !reference.is_empty() && user.iter().any(|u| symptoms_overlap(u, &reference))
            }).count();
            let r = &mut results[idx];
            r.total_symptoms = r.total_symptoms.max(entry.symptoms.len());
            r.match_count = r.match_count.max(current);
        }
        let n = user.len();
        results.retain(|r| r.match_count > 0);
        // ratios compared by cross-multiplication to stay exact
        results.sort_by(|a, b| {
            let lhs = b.match_count * a.total_symptoms.max(n);
            let rhs = a.match_count * b.total_symptoms.max(n);
            lhs.cmp(&rhs).then(b.match_count.cmp(&a.match_count))
        });
        results
    }
}

/// Bidirectional substring test on already-normalized phrases.
pub fn symptoms_overlap(a: &str, b: &str) -> bool { a.contains(b) || b.contains(a) }
