use crate::forms::{AthleteForm, EventForm, Form, InjuryReportForm, PerformanceMetricForm, TrainingPlanForm};
use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/dashboard/stats", get(handlers::dashboard_stats))
        .nest("/api/records/athletes", records::<AthleteForm>())
        .nest("/api/records/training-plans", records::<TrainingPlanForm>())
        .nest("/api/records/performance-metrics", records::<PerformanceMetricForm>())
        .nest("/api/records/injury-reports", records::<InjuryReportForm>())
        .nest("/api/records/events", records::<EventForm>())
        .route("/api/athletes/categories", get(handlers::athlete_categories))
        .route("/api/athletes/:athlete_id", get(handlers::athlete_info))
        .route("/api/athletes/:athlete_id/results", get(handlers::athlete_results))
        .route("/api/athletes/:athlete_id/rankings", get(handlers::athlete_rankings))
        .route("/api/statistics/athletes", get(handlers::statistics_athletes))
        .route("/api/statistics/athletes/:athlete_id", get(handlers::statistics_for_athlete))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// List/create on the collection root, update/delete on `/:id`.
fn records<F: Form>() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list::<F::Record>).post(handlers::create::<F>),
        )
        .route(
            "/:id",
            axum::routing::put(handlers::update::<F>).delete(handlers::remove::<F::Record>),
        )
}
