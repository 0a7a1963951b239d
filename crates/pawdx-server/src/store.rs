use std::collections::HashMap;

use chrono::Utc;
use pawdx_schema::{DiagnosisRecord, Prediction};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Past diagnoses, kept in memory for the life of the process.
#[derive(Default)]
pub struct DiagnosisStore { inner: RwLock<HashMap<Uuid, DiagnosisRecord>> }

impl DiagnosisStore {
    pub async fn create(&self, symptoms: Vec<String>, predictions: Vec<Prediction>, chat_response: String) -> DiagnosisRecord {
        let record = DiagnosisRecord { id: Uuid::new_v4(), symptoms, predictions, chat_response, created_at: Utc::now() };
        self.inner.write().await.insert(record.id, record.clone());
        record
    }

    pub async fn get(&self, id: &Uuid) -> Option<DiagnosisRecord> {
        self.inner.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize { self.inner.read().await.len() }
}
