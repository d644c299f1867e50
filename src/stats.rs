use crate::models::{DashboardSummary, Event, PerformanceMetric, PlanStatus};
use crate::query::{Direction, Query, Table};
use crate::store::{Selection, Store, StoreError};
use chrono::{DateTime, Utc};

const UPCOMING_LIMIT: usize = 3;
const RECENT_LIMIT: usize = 3;

pub async fn load_summary(store: &Store) -> Result<DashboardSummary, StoreError> {
    load_summary_at(store, Utc::now()).await
}

/// Runs the four dashboard queries concurrently and waits for every one of
/// them before combining. A single failure fails the whole summary.
pub async fn load_summary_at(store: &Store, now: DateTime<Utc>) -> Result<DashboardSummary, StoreError> {
    let athletes = Query::from(Table::Athletes);
    let active_plans = Query::from(Table::TrainingPlans).eq("status", PlanStatus::InProgress.as_str());
    let metrics = Query::from(Table::PerformanceMetrics);
    let upcoming = upcoming_events_query(now);

    let (athletes, active_plans, metrics, upcoming) = tokio::join!(
        store.count(athletes),
        store.count(active_plans),
        store.select::<PerformanceMetric>(&metrics),
        store.select::<Event>(&upcoming),
    );

    Ok(build_summary(athletes?, active_plans?, metrics?.rows, upcoming?))
}

pub fn upcoming_events_query(now: DateTime<Utc>) -> Query {
    Query::from(Table::Events)
        .gte("event_date", now.to_rfc3339())
        .order("event_date", Direction::Ascending)
        .limit(UPCOMING_LIMIT)
        .count_exact()
}

pub fn build_summary(
    total_athletes: u64,
    active_training_plans: u64,
    metrics: Vec<PerformanceMetric>,
    upcoming: Selection<Event>,
) -> DashboardSummary {
    let values: Vec<f64> = metrics.iter().map(|metric| metric.value).collect();
    let total_events = upcoming.count.unwrap_or(upcoming.rows.len() as u64);

    DashboardSummary {
        total_athletes,
        active_training_plans,
        average_performance: average_value(&values),
        total_events,
        recent_activities: metrics.into_iter().take(RECENT_LIMIT).collect(),
        upcoming_events: upcoming.rows,
    }
}

pub fn average_value(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (mean * 100.0).round() / 100.0
}
