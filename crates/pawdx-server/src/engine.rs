use pawdx_schema::{normalize, DiseaseCatalogEntry, Prediction, SymptomRecord};

use crate::catalog::Catalog;
use crate::ranking::rank;
use crate::reference::ReferenceIndex;

/// Reference data plus everything derived from it. Built once, read-only after.
#[derive(Debug)]
pub struct Engine {
    index: ReferenceIndex,
    catalog: Catalog,
}

impl Engine {
    pub fn new(index: ReferenceIndex) -> Self {
        let catalog = Catalog::build(&index);
        Self { index, catalog }
    }

    pub fn index(&self) -> &ReferenceIndex { &self.index }
    pub fn symptoms(&self) -> &[SymptomRecord] { self.catalog.symptoms() }
    pub fn diseases(&self) -> &[DiseaseCatalogEntry] { self.catalog.diseases() }
    pub fn disease_by_name(&self, name: &str) -> Option<&DiseaseCatalogEntry> { self.catalog.disease_by_name(name) }

    pub fn search(&self, query: &str) -> Vec<SymptomRecord> {
        self.index.search_symptoms(query).into_iter().filter_map(|n| self.catalog.symptom(n).cloned()).collect()
    }

    /// Ranked predictions for `symptoms`; empty when nothing scores above the floor.
    pub fn diagnose(&self, symptoms: &[String]) -> Vec<Prediction> {
        let usable: Vec<String> = symptoms.iter().filter(|s| !normalize(s).is_empty()).cloned().collect();
        if usable.is_empty() { return vec![]; }
        let matches = self.index.match_diseases(&usable);
        tracing::debug!(symptoms = usable.len(), candidates = matches.len(), "matched reference diseases");
        rank(&self.index, &matches, usable.len())
    }
}
