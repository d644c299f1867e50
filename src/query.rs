use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Athletes,
    TrainingPlans,
    PerformanceMetrics,
    Events,
    InjuryReports,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Athletes => "athletes",
            Table::TrainingPlans => "training_plans",
            Table::PerformanceMetrics => "performance_metrics",
            Table::Events => "events",
            Table::InjuryReports => "injury_reports",
        }
    }

    /// Timestamp column the store fills in on insert when the caller leaves it out.
    pub fn stamp_column(self) -> &'static str {
        match self {
            Table::Athletes | Table::TrainingPlans | Table::Events => "created_at",
            Table::PerformanceMetrics => "recorded_at",
            Table::InjuryReports => "date_reported",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Gte(String, Value),
}

impl Filter {
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::Eq(column, expected) => row
                .get(column)
                .is_some_and(|value| compare_values(value, expected) == Some(Ordering::Equal)),
            Filter::Gte(column, bound) => row.get(column).is_some_and(|value| {
                matches!(
                    compare_values(value, bound),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            }),
        }
    }

    pub fn to_param(&self) -> (String, String) {
        match self {
            Filter::Eq(column, value) => (column.clone(), format!("eq.{}", param_value(value))),
            Filter::Gte(column, value) => (column.clone(), format!("gte.{}", param_value(value))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: Table,
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<(String, Direction)>,
    pub limit: Option<usize>,
    pub count: bool,
}

impl Query {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            columns: None,
            filters: Vec::new(),
            order: None,
            limit: None,
            count: false,
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Gte(column.to_string(), value.into()));
        self
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn count_exact(mut self) -> Self {
        self.count = true;
        self
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![(
            "select".to_string(),
            self.columns.clone().unwrap_or_else(|| "*".to_string()),
        )];
        params.extend(self.filters.iter().map(Filter::to_param));
        if let Some((column, direction)) = &self.order {
            let suffix = match direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            params.push(("order".to_string(), format!("{column}.{suffix}")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Returns the projected rows and the number of rows that matched before the limit.
    pub fn apply<'a>(&self, rows: impl IntoIterator<Item = &'a Row>) -> (Vec<Row>, u64) {
        let mut matched: Vec<&Row> = rows
            .into_iter()
            .filter(|row| self.filters.iter().all(|filter| filter.matches(row)))
            .collect();
        let total = matched.len() as u64;

        if let Some((column, direction)) = &self.order {
            // Rows lacking the column sort last in either direction.
            matched.sort_by(|a, b| match (a.get(column), b.get(column)) {
                (Some(left), Some(right)) => {
                    let ordering = sort_order(left, right);
                    match direction {
                        Direction::Ascending => ordering,
                        Direction::Descending => ordering.reverse(),
                    }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }

        let limit = self.limit.unwrap_or(usize::MAX);
        let projected = matched
            .into_iter()
            .take(limit)
            .map(|row| self.project(row))
            .collect();
        (projected, total)
    }

    fn project(&self, row: &Row) -> Row {
        match self.columns.as_deref() {
            None | Some("*") => row.clone(),
            Some(columns) => columns
                .split(',')
                .map(str::trim)
                .filter_map(|column| row.get(column).map(|value| (column.to_string(), value.clone())))
                .collect(),
        }
    }
}

/// Orders two JSON values: numbers numerically, timestamps and dates chronologically,
/// everything else by string or equality. `None` when the values are not comparable.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => {
            if let (Ok(a), Ok(b)) = (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
                return Some(a.cmp(&b));
            }
            if let (Ok(a), Ok(b)) = (a.parse::<NaiveDate>(), b.parse::<NaiveDate>()) {
                return Some(a.cmp(&b));
            }
            Some(a.cmp(b))
        }
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

enum SortKey<'a> {
    Null,
    Bool(bool),
    Number(f64),
    Timestamp(DateTime<FixedOffset>),
    Date(NaiveDate),
    Text(&'a str),
    Nested,
}

impl<'a> SortKey<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => SortKey::Null,
            Value::Bool(flag) => SortKey::Bool(*flag),
            Value::Number(number) => SortKey::Number(number.as_f64().unwrap_or(f64::NAN)),
            Value::String(text) => {
                if let Ok(at) = DateTime::parse_from_rfc3339(text) {
                    SortKey::Timestamp(at)
                } else if let Ok(day) = text.parse::<NaiveDate>() {
                    SortKey::Date(day)
                } else {
                    SortKey::Text(text)
                }
            }
            Value::Array(_) | Value::Object(_) => SortKey::Nested,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Null => 0,
            SortKey::Bool(_) => 1,
            SortKey::Number(_) => 2,
            SortKey::Timestamp(_) => 3,
            SortKey::Date(_) => 4,
            SortKey::Text(_) => 5,
            SortKey::Nested => 6,
        }
    }
}

// Total order for sorting: kind first, then value within the kind.
fn sort_order(left: &Value, right: &Value) -> Ordering {
    match (SortKey::of(left), SortKey::of(right)) {
        (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(&b),
        (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(&b),
        (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(&b),
        (SortKey::Date(a), SortKey::Date(b)) => a.cmp(&b),
        (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
        (a, b) => a.rank().cmp(&b.rank()),
    }
}

fn param_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn gte_compares_timestamps_chronologically() {
        let rows = [
            row(json!({ "id": "a", "event_date": "2026-03-01T10:00:00.5Z" })),
            row(json!({ "id": "b", "event_date": "2026-03-01T10:00:00Z" })),
            row(json!({ "id": "c", "event_date": "2026-02-28T23:59:59Z" })),
        ];
        let query = Query::from(Table::Events)
            .gte("event_date", "2026-03-01T10:00:00Z")
            .order("event_date", Direction::Ascending);

        let (matched, total) = query.apply(rows.iter());
        let ids: Vec<_> = matched.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(total, 2);
    }

    #[test]
    fn limit_keeps_total_count() {
        let rows: Vec<Row> = (0..5).map(|n| row(json!({ "id": n.to_string(), "value": n }))).collect();
        let query = Query::from(Table::PerformanceMetrics)
            .order("value", Direction::Descending)
            .limit(2)
            .count_exact();

        let (matched, total) = query.apply(rows.iter());
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0]["value"], json!(4));
        assert_eq!(total, 5);
    }

    #[test]
    fn projection_keeps_requested_columns() {
        let rows = [row(json!({ "id": "1", "name": "Paula Ryder", "sport": "triathlon" }))];
        let (matched, _) = Query::from(Table::Athletes).select("id").apply(rows.iter());
        assert_eq!(matched[0], row(json!({ "id": "1" })));
    }

    #[test]
    fn eq_filter_ignores_rows_missing_the_column() {
        let rows = [
            row(json!({ "id": "1", "status": "in_progress" })),
            row(json!({ "id": "2" })),
            row(json!({ "id": "3", "status": "pending" })),
        ];
        let (matched, total) = Query::from(Table::TrainingPlans)
            .eq("status", "in_progress")
            .apply(rows.iter());
        assert_eq!(total, 1);
        assert_eq!(matched[0]["id"], json!("1"));
    }

    #[test]
    fn mixed_value_kinds_sort_by_kind_then_value() {
        let rows: Vec<Row> = [
            json!("b"),
            json!(3),
            json!(null),
            json!("2026-01-01"),
            json!(1.5),
            json!(true),
            json!("2026-01-01T00:00:00Z"),
            json!("a"),
        ]
        .into_iter()
        .enumerate()
        .map(|(n, value)| row(json!({ "id": n, "value": value })))
        .collect();

        let (matched, _) = Query::from(Table::PerformanceMetrics)
            .order("value", Direction::Ascending)
            .apply(rows.iter());
        let values: Vec<_> = matched.iter().map(|r| r["value"].clone()).collect();
        assert_eq!(
            values,
            vec![
                json!(null),
                json!(true),
                json!(1.5),
                json!(3),
                json!("2026-01-01T00:00:00Z"),
                json!("2026-01-01"),
                json!("a"),
                json!("b"),
            ]
        );
    }

    #[test]
    fn renders_postgrest_params() {
        let params = Query::from(Table::Events)
            .gte("event_date", "2026-10-19T00:00:00+00:00")
            .order("event_date", Direction::Ascending)
            .limit(3)
            .to_params();
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("event_date".to_string(), "gte.2026-10-19T00:00:00+00:00".to_string()),
                ("order".to_string(), "event_date.asc".to_string()),
                ("limit".to_string(), "3".to_string()),
            ]
        );
    }
}
