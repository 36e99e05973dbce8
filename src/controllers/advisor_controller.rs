use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Path, Query, State,
    },
    Form, Json,
};

use crate::error::ApiError;
use crate::models::dataset::{City, Panel};
use crate::models::estimate::{
    EstimateInput, EstimateQuery, EstimateResponse, HealthStatus, HeatmapInput, HeatmapQuery,
    HeatmapResponse, Tier,
};
use crate::services::estimator;
use crate::services::heatmap::HeatMap;
use crate::shared_state::AppState;

async fn run_estimate(state: &AppState, query: EstimateQuery) -> Result<Json<EstimateResponse>, ApiError> {
    let input = EstimateInput::try_from(query)?;
    let dataset = state.dataset().await?;
    let estimate = estimator::estimate(&dataset, &input)?;
    tracing::info!(
        "[ESTIMATE] ({:.2}, {:.2}) → {} | {:.2} kWh of {:.2} kWh | {}",
        input.north,
        input.west,
        estimate.city,
        estimate.solar_output_kwh,
        estimate.average_usage_kwh,
        estimate.recommendation
    );
    Ok(Json(EstimateResponse {
        timestamp: chrono::Utc::now(),
        estimate,
    }))
}

async fn run_heatmap(state: &AppState, query: HeatmapQuery) -> Result<Json<HeatmapResponse>, ApiError> {
    let input = HeatmapInput::try_from(query)?;
    let dataset = state.dataset().await?;
    let map = HeatMap::build(&dataset, &input);
    let heatmap = map.summarize(&input, state.percent_denominator());

    let breakdown: Vec<String> = Tier::ALL
        .iter()
        .map(|t| format!("{}={}", t.color_name(), map.count(*t)))
        .collect();
    tracing::info!(
        "[HEATMAP] house={} sqft roof={} sqft | {}",
        input.house_size_sqft,
        input.roof_size_sqft,
        breakdown.join(" ")
    );

    Ok(Json(HeatmapResponse {
        timestamp: chrono::Utc::now(),
        heatmap,
    }))
}

/// GET /api/estimate
/// Estimate solar suitability for one household
///
/// Finds the reference city nearest to the given coordinates and compares the
/// expected monthly solar output of the roof with the household's usage.
#[utoipa::path(
    get,
    path = "/api/estimate",
    params(EstimateQuery),
    responses(
        (status = 200, description = "Estimate for the nearest reference city", body = EstimateResponse),
        (status = 400, description = "Missing, unparseable or non-positive input"),
        (status = 500, description = "Reference data unavailable")
    )
)]
pub async fn get_estimate(
    State(state): State<AppState>,
    query: Result<Query<EstimateQuery>, QueryRejection>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let Query(query) = query?;
    run_estimate(&state, query).await
}

/// POST /api/estimate
/// Same as the GET variant, for urlencoded form submissions.
#[utoipa::path(
    post,
    path = "/api/estimate",
    request_body(content = EstimateQuery, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Estimate for the nearest reference city", body = EstimateResponse),
        (status = 400, description = "Missing, unparseable or non-positive input"),
        (status = 415, description = "Body is not an urlencoded form"),
        (status = 500, description = "Reference data unavailable")
    )
)]
pub async fn post_estimate(
    State(state): State<AppState>,
    form: Result<Form<EstimateQuery>, FormRejection>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let Form(query) = form?;
    run_estimate(&state, query).await
}

/// GET /api/heatmap
/// Recommendation tier for every reference city
///
/// Applies one house and roof size to all cities and groups them by tier.
#[utoipa::path(
    get,
    path = "/api/heatmap",
    params(HeatmapQuery),
    responses(
        (status = 200, description = "Per-city tiers, colours and percentages", body = HeatmapResponse),
        (status = 400, description = "Missing, unparseable or non-positive input"),
        (status = 500, description = "Reference data unavailable")
    )
)]
pub async fn get_heatmap(
    State(state): State<AppState>,
    query: Result<Query<HeatmapQuery>, QueryRejection>,
) -> Result<Json<HeatmapResponse>, ApiError> {
    let Query(query) = query?;
    run_heatmap(&state, query).await
}

/// POST /api/heatmap
#[utoipa::path(
    post,
    path = "/api/heatmap",
    request_body(content = HeatmapQuery, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Per-city tiers, colours and percentages", body = HeatmapResponse),
        (status = 400, description = "Missing, unparseable or non-positive input"),
        (status = 415, description = "Body is not an urlencoded form"),
        (status = 500, description = "Reference data unavailable")
    )
)]
pub async fn post_heatmap(
    State(state): State<AppState>,
    form: Result<Form<HeatmapQuery>, FormRejection>,
) -> Result<Json<HeatmapResponse>, ApiError> {
    let Form(query) = form?;
    run_heatmap(&state, query).await
}

/// GET /api/cities
/// List all reference cities in table order
#[utoipa::path(
    get,
    path = "/api/cities",
    responses(
        (status = 200, description = "Reference cities", body = Vec<City>),
        (status = 500, description = "Reference data unavailable")
    )
)]
pub async fn list_cities(State(state): State<AppState>) -> Result<Json<Vec<City>>, ApiError> {
    let dataset = state.dataset().await?;
    Ok(Json(dataset.cities().to_vec()))
}

/// GET /api/cities/{name}
#[utoipa::path(
    get,
    path = "/api/cities/{name}",
    params(
        ("name" = String, Path, description = "City name as listed by /api/cities")
    ),
    responses(
        (status = 200, description = "Reference record", body = City),
        (status = 404, description = "City not found")
    )
)]
pub async fn get_city(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<City>, ApiError> {
    let dataset = state.dataset().await?;
    dataset
        .city(&name)
        .cloned()
        .map(Json)
        .ok_or(ApiError::UnknownCity(name))
}

/// GET /api/panels
/// The six quoted panel brands, in comparison order
#[utoipa::path(
    get,
    path = "/api/panels",
    responses(
        (status = 200, description = "Panel specifications", body = Vec<Panel>),
        (status = 500, description = "Panel table incomplete")
    )
)]
pub async fn list_panels(State(state): State<AppState>) -> Result<Json<Vec<Panel>>, ApiError> {
    let dataset = state.dataset().await?;
    let panels = dataset.panels()?.into_iter().cloned().collect();
    Ok(Json(panels))
}

/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service status", body = HealthStatus),
        (status = 500, description = "Reference data unavailable")
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    let dataset = state.dataset().await?;
    let panels = dataset.panels().map(|p| p.len()).unwrap_or(0);
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cities: dataset.len(),
        panels,
        reload_per_request: state.config.dataset.reload_per_request,
    }))
}
