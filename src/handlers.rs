use crate::errors::AppError;
use crate::forms::Form;
use crate::models::{DashboardSummary, ListParams, Mutation, PerformanceSummary, Record, ResultsParams};
use crate::query::Query;
use crate::state::AppState;
use crate::stats::load_summary;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query as QueryParams, State, rejection::JsonRejection},
    http::StatusCode,
    response::Html,
};
use serde_json::Value;
use tracing::{error, info};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let summary = load_summary(&state.store).await.inspect_err(|err| {
        error!("dashboard summary failed: {err}");
    });
    Html(render_index(summary.as_ref().ok()))
}

pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardSummary>, AppError> {
    Ok(Json(load_summary(&state.store).await?))
}

fn collection_query<R: Record>(params: &ListParams) -> Result<Query, AppError> {
    let (column, direction) = R::ORDER_BY;
    let mut query = Query::from(R::TABLE).order(column, direction);
    if let Some(athlete_id) = params.athlete_id.as_deref().filter(|id| !id.is_empty()) {
        if !R::ATHLETE_SCOPED {
            return Err(AppError::bad_request(format!(
                "{} cannot be filtered by athlete_id",
                R::TABLE.as_str()
            )));
        }
        query = query.eq("athlete_id", athlete_id);
    }
    Ok(query)
}

async fn fetch_collection<R: Record>(state: &AppState, params: &ListParams) -> Result<Vec<R>, AppError> {
    let query = collection_query::<R>(params)?;
    Ok(state.store.select::<R>(&query).await?.rows)
}

pub async fn list<R: Record>(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<R>>, AppError> {
    Ok(Json(fetch_collection::<R>(&state, &params).await?))
}

pub async fn create<F: Form>(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListParams>,
    body: Result<Json<F>, JsonRejection>,
) -> Result<(StatusCode, Json<Mutation<F::Record>>), AppError> {
    let Json(form) = body?;
    collection_query::<F::Record>(&params)?;
    let fields = form.validate()?;
    let payload = F::insert_payload(fields, &state.owner_id)?;
    let record: F::Record = state.store.insert(&payload).await?;
    let table = <F::Record as Record>::TABLE.as_str();
    info!(table, id = record.id(), "created record");

    let items = fetch_collection::<F::Record>(&state, &params).await?;
    Ok((StatusCode::CREATED, Json(Mutation { record, items })))
}

pub async fn update<F: Form>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(params): QueryParams<ListParams>,
    body: Result<Json<F>, JsonRejection>,
) -> Result<Json<Mutation<F::Record>>, AppError> {
    let Json(form) = body?;
    collection_query::<F::Record>(&params)?;
    let fields = form.validate()?;
    let record: F::Record = state.store.update(&id, &fields).await?;
    let table = <F::Record as Record>::TABLE.as_str();
    info!(table, id = %id, "updated record");

    let items = fetch_collection::<F::Record>(&state, &params).await?;
    Ok(Json(Mutation { record, items }))
}

/// Destructive: refused unless the caller confirms with `?confirm=true`.
pub async fn remove<R: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Mutation<R>>, AppError> {
    if !params.confirm {
        return Err(AppError::bad_request("deletion must be confirmed with confirm=true"));
    }
    collection_query::<R>(&params)?;
    let record: R = state.store.delete(&id).await?;
    info!(table = R::TABLE.as_str(), id = %id, "deleted record");

    let items = fetch_collection::<R>(&state, &params).await?;
    Ok(Json(Mutation { record, items }))
}

pub async fn athlete_categories(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.stats.athlete_categories().await?))
}

pub async fn athlete_info(
    State(state): State<AppState>,
    Path(athlete_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.stats.athlete_info(&athlete_id).await?))
}

pub async fn athlete_results(
    State(state): State<AppState>,
    Path(athlete_id): Path<String>,
    QueryParams(params): QueryParams<ResultsParams>,
) -> Result<Json<Value>, AppError> {
    let per_page = params.per_page.unwrap_or(10);
    let elite = params.elite.unwrap_or(false);
    Ok(Json(state.stats.athlete_results(&athlete_id, per_page, elite).await?))
}

pub async fn athlete_rankings(
    State(state): State<AppState>,
    Path(athlete_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.stats.athlete_rankings(&athlete_id).await?))
}

/// Third-party athlete listing; `null` when it could not be fetched.
pub async fn statistics_athletes(State(state): State<AppState>) -> Json<Option<Value>> {
    Json(state.stats.fetch_athletes().await)
}

pub async fn statistics_for_athlete(
    State(state): State<AppState>,
    Path(athlete_id): Path<String>,
) -> Json<Option<PerformanceSummary>> {
    let statistics = state.stats.fetch_athlete_statistics(&athlete_id).await;
    Json(statistics.as_ref().map(PerformanceSummary::from_statistics))
}
