use crate::errors::AppError;
use crate::models::{Athlete, Event, InjuryReport, PerformanceMetric, PlanStatus, Record, RecoveryStatus, TrainingPlan};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Flat field set submitted from a create/update form. Validation runs before
/// any store call, so an invalid form never reaches the store.
pub trait Form: DeserializeOwned + Send + 'static {
    type Record: Record;
    type Fields: Serialize + Send + Sync;

    fn validate(self) -> Result<Self::Fields, AppError>;

    /// Row sent on insert. Forms that need server-side columns add them here.
    fn insert_payload(fields: Self::Fields, _owner_id: &str) -> Result<Value, AppError> {
        serde_json::to_value(fields).map_err(AppError::internal)
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, AppError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::required(field))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn date(field: &'static str, value: Option<String>) -> Result<NaiveDate, AppError> {
    required(field, value)?
        .parse()
        .map_err(|_| AppError::bad_request(format!("{field} must be a YYYY-MM-DD date")))
}

fn timestamp(field: &'static str, value: Option<String>) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(value) = optional(value) else {
        return Ok(None);
    };
    if let Ok(instant) = DateTime::parse_from_rfc3339(&value) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }
    value
        .parse::<NaiveDate>()
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|moment| Some(moment.and_utc()))
        .ok_or_else(|| AppError::bad_request(format!("{field} must be an RFC 3339 timestamp or a date")))
}

#[derive(Debug, Deserialize, Default)]
pub struct AthleteForm {
    pub name: Option<String>,
    pub sport: Option<String>,
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AthleteFields {
    pub name: String,
    pub sport: String,
    pub date_of_birth: NaiveDate,
}

#[derive(Serialize)]
struct NewAthlete<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    fields: AthleteFields,
}

impl Form for AthleteForm {
    type Record = Athlete;
    type Fields = AthleteFields;

    fn validate(self) -> Result<AthleteFields, AppError> {
        Ok(AthleteFields {
            name: required("name", self.name)?,
            sport: required("sport", self.sport)?,
            date_of_birth: date("date_of_birth", self.date_of_birth)?,
        })
    }

    fn insert_payload(fields: AthleteFields, owner_id: &str) -> Result<Value, AppError> {
        serde_json::to_value(NewAthlete {
            user_id: owner_id,
            fields,
        })
        .map_err(AppError::internal)
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct TrainingPlanForm {
    pub athlete_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<PlanStatus>,
}

#[derive(Debug, Serialize)]
pub struct TrainingPlanFields {
    pub athlete_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PlanStatus,
}

impl Form for TrainingPlanForm {
    type Record = TrainingPlan;
    type Fields = TrainingPlanFields;

    fn validate(self) -> Result<TrainingPlanFields, AppError> {
        Ok(TrainingPlanFields {
            athlete_id: required("athlete_id", self.athlete_id)?,
            title: required("title", self.title)?,
            description: optional(self.description),
            start_date: date("start_date", self.start_date)?,
            end_date: date("end_date", self.end_date)?,
            status: self.status.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct PerformanceMetricForm {
    pub athlete_id: Option<String>,
    pub metric_type: Option<String>,
    pub value: Option<f64>,
    pub recorded_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PerformanceMetricFields {
    pub athlete_id: String,
    pub metric_type: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl Form for PerformanceMetricForm {
    type Record = PerformanceMetric;
    type Fields = PerformanceMetricFields;

    fn validate(self) -> Result<PerformanceMetricFields, AppError> {
        let athlete_id = required("athlete_id", self.athlete_id)?;
        let metric_type = required("metric_type", self.metric_type)?;
        let value = self
            .value
            .filter(|value| value.is_finite())
            .ok_or_else(|| AppError::required("value"))?;
        Ok(PerformanceMetricFields {
            athlete_id,
            metric_type,
            value,
            recorded_at: timestamp("recorded_at", self.recorded_at)?,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct EventForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventFields {
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub location: String,
}

impl Form for EventForm {
    type Record = Event;
    type Fields = EventFields;

    fn validate(self) -> Result<EventFields, AppError> {
        let title = required("title", self.title)?;
        let event_date =
            timestamp("event_date", self.event_date)?.ok_or_else(|| AppError::required("event_date"))?;
        Ok(EventFields {
            title,
            description: optional(self.description),
            event_date,
            location: required("location", self.location)?,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct InjuryReportForm {
    pub athlete_id: Option<String>,
    pub injury_type: Option<String>,
    pub severity: Option<String>,
    pub recovery_status: Option<RecoveryStatus>,
    pub date_reported: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InjuryReportFields {
    pub athlete_id: String,
    pub injury_type: String,
    pub severity: String,
    pub recovery_status: RecoveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_reported: Option<DateTime<Utc>>,
}

impl Form for InjuryReportForm {
    type Record = InjuryReport;
    type Fields = InjuryReportFields;

    fn validate(self) -> Result<InjuryReportFields, AppError> {
        Ok(InjuryReportFields {
            athlete_id: required("athlete_id", self.athlete_id)?,
            injury_type: required("injury_type", self.injury_type)?,
            severity: optional(self.severity).unwrap_or_else(|| "mild".to_string()),
            recovery_status: self.recovery_status.unwrap_or_default(),
            date_reported: timestamp("date_reported", self.date_reported)?,
        })
    }
}
