use crate::query::{Row, Table};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{collections::BTreeMap, io, path::Path};
use tokio::fs;
use tracing::{error, info};
use uuid::Uuid;

/// Contents of the document file: one array of rows per table.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct AppData {
    pub tables: BTreeMap<Table, Vec<Row>>,
}

impl AppData {
    pub fn rows(&self, table: Table) -> &[Row] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn rows_mut(&mut self, table: Table) -> &mut Vec<Row> {
        self.tables.entry(table).or_default()
    }
}

const SAMPLE_ATHLETES: [&str; 10] = [
    "Tommaso Fogliatto",
    "Pietro Matarazzo",
    "Taylor Foster",
    "Samantha Valdes Molina",
    "Steffi Steinberg",
    "Ciat Joyce",
    "Victoria Sosa",
    "Thyago Alberto Guimarães Santos",
    "Paula Ryder",
    "Noura Alomairi",
];

/// Roster used to seed an empty document store.
pub fn sample_data(owner_id: &str) -> AppData {
    let now = Utc::now().to_rfc3339();
    let mut data = AppData::default();
    let athletes = data.rows_mut(Table::Athletes);
    for name in SAMPLE_ATHLETES {
        let row = json!({
            "id": Uuid::new_v4().to_string(),
            "user_id": owner_id,
            "name": name,
            "sport": "triathlon",
            "date_of_birth": "2000-01-01",
            "created_at": now,
        });
        if let serde_json::Value::Object(row) = row {
            athletes.push(row);
        }
    }
    data
}

/// Reads the document file. A missing file yields `None`. An unreadable or
/// malformed file is an error so it never gets overwritten.
pub async fn load_data(path: &Path) -> io::Result<Option<AppData>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            return Err(err);
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(data) => Ok(Some(data)),
        Err(err) => {
            error!("failed to parse data file {}: {err}", path.display());
            Err(io::Error::new(io::ErrorKind::InvalidData, err))
        }
    }
}

pub async fn load_or_seed(path: &Path, seed: bool, owner_id: &str) -> io::Result<AppData> {
    Ok(match load_data(path).await? {
        Some(data) => data,
        None if seed => {
            info!("seeding sample athletes into {}", path.display());
            sample_data(owner_id)
        }
        None => AppData::default(),
    })
}

pub async fn persist_data(path: &Path, data: &AppData) -> io::Result<()> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await
}
