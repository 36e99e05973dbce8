use utoipa::OpenApi;
use crate::controllers::advisor_controller;
use crate::models::{dataset, estimate};

#[derive(OpenApi)]
#[openapi(
    paths(
        advisor_controller::get_estimate,
        advisor_controller::post_estimate,
        advisor_controller::get_heatmap,
        advisor_controller::post_heatmap,
        advisor_controller::list_cities,
        advisor_controller::get_city,
        advisor_controller::list_panels,
        advisor_controller::health
    ),
    components(
        schemas(
            dataset::City,
            dataset::Panel,
            dataset::PanelBrand,
            estimate::Tier,
            estimate::EstimateResponse,
            estimate::HeatmapResponse,
            estimate::HealthStatus
        )
    ),
    tags(
        (name = "solar-advisor", description = "Household solar suitability API")
    )
)]
pub struct ApiDoc;
