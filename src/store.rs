use crate::models::Record;
use crate::query::{Query, Row, Table};
use crate::storage::{AppData, persist_data};
use chrono::Utc;
use reqwest::{Client, RequestBuilder, StatusCode, header::HeaderMap};
use serde::Serialize;
use serde_json::Value;
use std::{path::PathBuf, sync::Arc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no {table} row with id {id}")]
    NotFound { table: &'static str, id: String },

    #[error("store responded with {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("fields must serialize to an object")]
    NotAnObject,

    #[error("failed to persist document store: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection<T> {
    pub rows: Vec<T>,
    /// Exact match count when the query asked for one.
    pub count: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum Store {
    Document(DocumentStore),
    Remote(RestStore),
}

impl Store {
    pub async fn select_rows(&self, query: &Query) -> Result<Selection<Row>, StoreError> {
        match self {
            Store::Document(store) => Ok(store.select(query).await),
            Store::Remote(store) => store.select(query).await,
        }
    }

    pub async fn select<T: Record>(&self, query: &Query) -> Result<Selection<T>, StoreError> {
        let selection = self.select_rows(query).await?;
        let rows = selection
            .rows
            .into_iter()
            .map(|row| serde_json::from_value(Value::Object(row)))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(Selection {
            rows,
            count: selection.count,
        })
    }

    pub async fn count(&self, query: Query) -> Result<u64, StoreError> {
        let selection = self.select_rows(&query.select("id").count_exact()).await?;
        Ok(selection.count.unwrap_or(selection.rows.len() as u64))
    }

    pub async fn insert<T: Record>(&self, fields: &impl Serialize) -> Result<T, StoreError> {
        let fields = to_row(fields)?;
        let row = match self {
            Store::Document(store) => store.insert(T::TABLE, fields).await?,
            Store::Remote(store) => store.insert(T::TABLE, fields).await?,
        };
        Ok(serde_json::from_value(Value::Object(row))?)
    }

    pub async fn update<T: Record>(&self, id: &str, fields: &impl Serialize) -> Result<T, StoreError> {
        let fields = to_row(fields)?;
        let row = match self {
            Store::Document(store) => store.update(T::TABLE, id, fields).await?,
            Store::Remote(store) => store.update(T::TABLE, id, fields).await?,
        };
        Ok(serde_json::from_value(Value::Object(row))?)
    }

    pub async fn delete<T: Record>(&self, id: &str) -> Result<T, StoreError> {
        let row = match self {
            Store::Document(store) => store.delete(T::TABLE, id).await?,
            Store::Remote(store) => store.delete(T::TABLE, id).await?,
        };
        Ok(serde_json::from_value(Value::Object(row))?)
    }
}

fn to_row(fields: &impl Serialize) -> Result<Row, StoreError> {
    match serde_json::to_value(fields)? {
        Value::Object(row) => Ok(row),
        _ => Err(StoreError::NotAnObject),
    }
}

fn not_found(table: Table, id: &str) -> StoreError {
    StoreError::NotFound {
        table: table.as_str(),
        id: id.to_string(),
    }
}

/// Local JSON document store. Rows live in memory and the whole file is
/// rewritten after every mutation.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: Option<PathBuf>,
    data: Arc<Mutex<AppData>>,
}

impl DocumentStore {
    pub fn new(path: PathBuf, data: AppData) -> Self {
        Self {
            path: Some(path),
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub fn ephemeral(data: AppData) -> Self {
        Self {
            path: None,
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub async fn select(&self, query: &Query) -> Selection<Row> {
        let data = self.data.lock().await;
        let (rows, total) = query.apply(data.rows(query.table));
        Selection {
            rows,
            count: query.count.then_some(total),
        }
    }

    pub async fn insert(&self, table: Table, mut fields: Row) -> Result<Row, StoreError> {
        fields.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        let stamp = table.stamp_column();
        if fields.get(stamp).is_none_or(Value::is_null) {
            fields.insert(stamp.to_string(), Value::String(Utc::now().to_rfc3339()));
        }

        let mut data = self.data.lock().await;
        let mut next = data.clone();
        next.rows_mut(table).push(fields.clone());
        self.commit(&mut data, next).await?;
        debug!(table = table.as_str(), "inserted document");
        Ok(fields)
    }

    pub async fn update(&self, table: Table, id: &str, fields: Row) -> Result<Row, StoreError> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let updated = {
            let row = next
                .rows_mut(table)
                .iter_mut()
                .find(|row| row_id(row) == Some(id))
                .ok_or_else(|| not_found(table, id))?;
            for (column, value) in fields {
                if column != "id" {
                    row.insert(column, value);
                }
            }
            row.clone()
        };
        self.commit(&mut data, next).await?;
        Ok(updated)
    }

    pub async fn delete(&self, table: Table, id: &str) -> Result<Row, StoreError> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let rows = next.rows_mut(table);
        let index = rows
            .iter()
            .position(|row| row_id(row) == Some(id))
            .ok_or_else(|| not_found(table, id))?;
        let removed = rows.remove(index);
        self.commit(&mut data, next).await?;
        Ok(removed)
    }

    // In-memory rows only change once the file write has succeeded.
    async fn commit(&self, data: &mut AppData, next: AppData) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            persist_data(path, &next).await?;
        }
        *data = next;
        Ok(())
    }
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

/// Hosted relational store reached through its PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn request(&self, method: reqwest::Method, table: Table) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{}", self.base_url, table.as_str()))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    pub async fn select(&self, query: &Query) -> Result<Selection<Row>, StoreError> {
        let mut request = self
            .request(reqwest::Method::GET, query.table)
            .query(&query.to_params());
        if query.count {
            request = request.header("Prefer", "count=exact");
        }

        let response = request.send().await?;
        let response = check_status(response).await?;
        let count = if query.count {
            content_range_total(response.headers())
        } else {
            None
        };
        let rows: Vec<Row> = response.json().await?;
        Ok(Selection { rows, count })
    }

    pub async fn insert(&self, table: Table, fields: Row) -> Result<Row, StoreError> {
        let response = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&[fields])
            .send()
            .await?;
        let rows: Vec<Row> = check_status(response).await?.json().await?;
        rows.into_iter().next().ok_or_else(|| StoreError::Status {
            status: StatusCode::OK,
            message: format!("insert into {} returned no row", table.as_str()),
        })
    }

    pub async fn update(&self, table: Table, id: &str, fields: Row) -> Result<Row, StoreError> {
        let response = self
            .request(reqwest::Method::PATCH, table)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&fields)
            .send()
            .await?;
        let rows: Vec<Row> = check_status(response).await?.json().await?;
        rows.into_iter().next().ok_or_else(|| not_found(table, id))
    }

    pub async fn delete(&self, table: Table, id: &str) -> Result<Row, StoreError> {
        let response = self
            .request(reqwest::Method::DELETE, table)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<Row> = check_status(response).await?.json().await?;
        rows.into_iter().next().ok_or_else(|| not_found(table, id))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    warn!(%status, "store rejected request");
    Err(StoreError::Status { status, message })
}

/// Total from a `Content-Range: 0-2/17` (or `*/0`) header.
fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("content-range")?
        .to_str()
        .ok()?
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Athlete, TrainingPlan};
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn plan_fields(athlete_id: &str, title: &str) -> Value {
        json!({
            "athlete_id": athlete_id,
            "title": title,
            "description": null,
            "start_date": "2026-11-01",
            "end_date": "2026-12-01",
            "status": "in_progress",
        })
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = Store::Document(DocumentStore::ephemeral(AppData::default()));
        let athlete: Athlete = store
            .insert(&json!({
                "user_id": "coach",
                "name": "Taylor Foster",
                "sport": "triathlon",
                "date_of_birth": "1996-04-12",
            }))
            .await
            .unwrap();

        assert!(!athlete.id.is_empty());
        assert_eq!(athlete.name, "Taylor Foster");
        assert_eq!(store.count(Query::from(Table::Athletes)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_leaves_other_athletes_rows_alone() {
        let store = Store::Document(DocumentStore::ephemeral(AppData::default()));
        let mine: TrainingPlan = store.insert(&plan_fields("a1", "Base block")).await.unwrap();
        let theirs: TrainingPlan = store.insert(&plan_fields("a2", "Base block")).await.unwrap();

        let removed: TrainingPlan = store.delete(&mine.id).await.unwrap();
        assert_eq!(removed.id, mine.id);

        let remaining = store
            .select::<TrainingPlan>(&Query::from(Table::TrainingPlans))
            .await
            .unwrap()
            .rows;
        assert_eq!(remaining, vec![theirs]);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let store = Store::Document(DocumentStore::ephemeral(AppData::default()));
        let err = store
            .update::<TrainingPlan>("missing", &plan_fields("a1", "Peak"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { table: "training_plans", .. }));
    }

    #[tokio::test]
    async fn update_keeps_id_and_merges_fields() {
        let store = Store::Document(DocumentStore::ephemeral(AppData::default()));
        let plan: TrainingPlan = store.insert(&plan_fields("a1", "Base block")).await.unwrap();
        let updated: TrainingPlan = store
            .update(&plan.id, &json!({ "id": "hijack", "title": "Build block" }))
            .await
            .unwrap();
        assert_eq!(updated.id, plan.id);
        assert_eq!(updated.title, "Build block");
        assert_eq!(updated.created_at, plan.created_at);
    }

    #[tokio::test]
    async fn failed_write_leaves_rows_unchanged() {
        let store = Store::Document(DocumentStore::new(std::env::temp_dir(), AppData::default()));
        let result = store
            .insert::<Athlete>(&json!({
                "user_id": "coach",
                "name": "Ciat Joyce",
                "sport": "triathlon",
                "date_of_birth": "1993-02-03",
            }))
            .await;

        assert!(matches!(result, Err(StoreError::Io(_))));
        assert_eq!(store.count(Query::from(Table::Athletes)).await.unwrap(), 0);
    }

    #[test]
    fn parses_content_range_totals() {
        let mut headers = HeaderMap::new();
        headers.insert("content-range", HeaderValue::from_static("0-2/17"));
        assert_eq!(content_range_total(&headers), Some(17));
        headers.insert("content-range", HeaderValue::from_static("*/0"));
        assert_eq!(content_range_total(&headers), Some(0));
        headers.insert("content-range", HeaderValue::from_static("0-2/*"));
        assert_eq!(content_range_total(&headers), None);
    }
}
