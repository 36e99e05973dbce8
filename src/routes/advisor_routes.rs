use axum::{response::Html, routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::controllers::advisor_controller::{
    // Estimation
    get_estimate, post_estimate, get_heatmap, post_heatmap,
    // Reference data
    list_cities, get_city, list_panels, health,
};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/estimate",        get(get_estimate).post(post_estimate))
        .route("/heatmap",         get(get_heatmap).post(post_heatmap))
        .route("/cities",          get(list_cities))
        .route("/cities/{name}",   get(get_city))
        .route("/panels",          get(list_panels))
        .route("/health",          get(health))
        .with_state(state)
}

/// The whole application: API, docs UI and static files. Built once at
/// startup and not modified afterwards.
pub fn app_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    Router::new()
        .nest("/api", api_routes(state))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::services::estimator::tests::fixture;

    #[tokio::test]
    async fn test_docs_and_api_are_mounted() {
        let app = app_router(AppState::new(Config::default(), fixture()));

        let resp = app
            .clone()
            .oneshot(Request::get("/scalar").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/api/estimate", "/api/heatmap", "/api/cities", "/api/cities/{name}", "/api/panels", "/api/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
