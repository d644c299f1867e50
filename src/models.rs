use crate::query::{Direction, Table};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A row type stored in one of the dashboard tables.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: Table;
    /// Column and direction a full collection listing is ordered by.
    const ORDER_BY: (&'static str, Direction);
    /// Whether rows carry an `athlete_id` that listings may filter on.
    const ATHLETE_SCOPED: bool;

    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Athlete {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub sport: String,
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl PlanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanStatus::Pending => "pending",
            PlanStatus::InProgress => "in_progress",
            PlanStatus::Completed => "completed",
            PlanStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingPlan {
    pub id: String,
    pub athlete_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceMetric {
    pub id: String,
    pub athlete_id: String,
    pub metric_type: String,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    #[default]
    Ongoing,
    Recovered,
    Rehabilitation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InjuryReport {
    pub id: String,
    pub athlete_id: String,
    pub injury_type: String,
    pub severity: String,
    pub date_reported: DateTime<Utc>,
    pub recovery_status: RecoveryStatus,
}

impl Record for Athlete {
    const TABLE: Table = Table::Athletes;
    const ORDER_BY: (&'static str, Direction) = ("created_at", Direction::Descending);
    const ATHLETE_SCOPED: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for TrainingPlan {
    const TABLE: Table = Table::TrainingPlans;
    const ORDER_BY: (&'static str, Direction) = ("created_at", Direction::Descending);
    const ATHLETE_SCOPED: bool = true;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for PerformanceMetric {
    const TABLE: Table = Table::PerformanceMetrics;
    const ORDER_BY: (&'static str, Direction) = ("recorded_at", Direction::Descending);
    const ATHLETE_SCOPED: bool = true;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Event {
    const TABLE: Table = Table::Events;
    const ORDER_BY: (&'static str, Direction) = ("event_date", Direction::Ascending);
    const ATHLETE_SCOPED: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for InjuryReport {
    const TABLE: Table = Table::InjuryReports;
    const ORDER_BY: (&'static str, Direction) = ("date_reported", Direction::Descending);
    const ATHLETE_SCOPED: bool = true;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    pub total_athletes: u64,
    pub active_training_plans: u64,
    pub average_performance: f64,
    pub total_events: u64,
    pub recent_activities: Vec<PerformanceMetric>,
    pub upcoming_events: Vec<Event>,
}

/// Race counters pulled out of an athlete statistics payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PerformanceSummary {
    pub race_starts: u64,
    pub race_finishes: u64,
    pub race_wins: u64,
    pub race_podiums: u64,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub athlete_id: Option<String>,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResultsParams {
    pub per_page: Option<u32>,
    pub elite: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Mutation<R> {
    pub record: R,
    pub items: Vec<R>,
}
