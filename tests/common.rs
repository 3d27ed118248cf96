#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use devis_server::storage::{DocumentStorage, StorageError};
use devis_server::{AppConfig, AppState};
use serde_json::{json, Value};
use tokio::sync::Mutex;

/// In-memory implementation of DocumentStorage for testing
pub struct MockDocumentStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_writes: bool,
}

impl MockDocumentStorage {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            fail_writes: false,
        }
    }

    /// Storage whose writes always fail, as a full disk would.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    pub async fn has_file(&self, filename: &str) -> bool {
        self.files.lock().await.contains_key(filename)
    }

    pub async fn file_count(&self) -> usize {
        self.files.lock().await.len()
    }
}

#[async_trait::async_trait]
impl DocumentStorage for MockDocumentStorage {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no space left on device",
            )));
        }
        let mut files = self.files.lock().await;
        files.insert(filename.to_string(), data.to_vec());
        Ok(())
    }

    async fn load(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let files = self.files.lock().await;
        files
            .get(filename)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(filename.to_string()))
    }
}

pub fn test_config(output_dir: &Path) -> AppConfig {
    AppConfig {
        output_dir: output_dir.to_path_buf(),
        ..AppConfig::default()
    }
}

pub fn local_state(output_dir: &Path) -> AppState {
    AppState::with_local_storage(test_config(output_dir)).expect("failed to prepare output dir")
}

pub fn mock_state(storage: Arc<MockDocumentStorage>) -> AppState {
    AppState::new(AppConfig::default(), storage)
}

/// The reference quote: 2 x 450, 1 x 1200 and 5 x 30 at 20% VAT.
pub fn sample_request() -> Value {
    json!({
        "entreprise": {
            "nom": "Atelier Martin",
            "gerant": "Paul Martin",
            "siret": "123 456 789 00012",
            "adresse": "4 rue des Lilas",
            "cp_ville": "69003 Lyon",
            "tel": "04 78 00 00 00",
            "email": "contact@atelier-martin.fr"
        },
        "client": {
            "nom": "Claire Dubois",
            "adresse": "18 avenue Foch",
            "cp_ville": "69006 Lyon",
            "email": "claire.dubois@example.com"
        },
        "prestations": [
            { "description": "Peinture salon", "quantite": 2, "unite": "jour", "prix_unitaire": 450 },
            { "description": "Pose parquet chêne", "quantite": 1, "unite": "forfait", "prix_unitaire": 1200 },
            { "description": "Plinthes", "quantite": 5, "unite": "m", "prix_unitaire": 30 }
        ],
        "tva_taux": 20,
        "delai_realisation": "3 semaines"
    })
}

pub fn sample_simple_request() -> Value {
    json!({
        "entreprise": {
            "nom": "Jardins du Rhône",
            "siret": "98765432100011",
            "adresse": "2 chemin Vert",
            "cp_ville": "69100 Villeurbanne",
            "tel": "06 11 22 33 44",
            "tva_taux": 10,
            "conditions_paiement": "Paiement à réception de facture",
            "forme_juridique": "sasu",
            "couleur_pdf": "#1B4F72"
        },
        "devis_data": {
            "client_nom": "Syndic Bellecour",
            "prestations": [
                { "description": "Tonte pelouse", "quantite": 4, "unite": "passage", "prix_unitaire": 55 }
            ],
            "delai": "Avril"
        }
    })
}
