use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::models::dataset::PanelBrand;

// ─── Recommendation tier ─────────────────────────────────────────────────────

/// Three-level recommendation shared by the single-city estimate and the
/// heat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    HighlyRecommended,
    Recommended,
    NotRecommended,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::HighlyRecommended, Tier::Recommended, Tier::NotRecommended];

    /// `ratio` is solar output over household usage.
    /// `>= 0.8` is the best tier, `(0.6, 0.8)` the middle one, anything else
    /// (0.6 itself and NaN included) the worst.
    pub fn classify(ratio: f64) -> Tier {
        if ratio >= 0.8 {
            Tier::HighlyRecommended
        } else if ratio > 0.6 {
            Tier::Recommended
        } else {
            Tier::NotRecommended
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::HighlyRecommended => "highly recommended",
            Tier::Recommended => "recommended",
            Tier::NotRecommended => "not recommended",
        }
    }

    pub fn color_name(self) -> &'static str {
        match self {
            Tier::HighlyRecommended => "green",
            Tier::Recommended => "yellow",
            Tier::NotRecommended => "red",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Tier::HighlyRecommended => "#008000",
            Tier::Recommended => "#FFFF00",
            Tier::NotRecommended => "#FF0000",
        }
    }
}

/// Which of a city's two radiation figures feeds the output formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiationMode {
    Horizontal,
    Optimal,
}

// ─── Request inputs ──────────────────────────────────────────────────────────

/// Raw estimate parameters, as typed by the user. Also accepts the field
/// names of the legacy HTML form.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EstimateQuery {
    /// Degrees north (sign is ignored)
    #[serde(alias = "coordinaten")]
    pub north: Option<String>,
    /// Degrees west (sign is ignored)
    #[serde(alias = "coordinatew")]
    pub west: Option<String>,
    /// House size in square feet
    #[serde(alias = "housesize")]
    pub house_size: Option<String>,
    /// Roof size in square feet
    #[serde(alias = "roofsize")]
    pub roof_size: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct HeatmapQuery {
    /// House size in square feet
    #[serde(alias = "housesizeinput", alias = "housesize")]
    pub house_size: Option<String>,
    /// Roof size in square feet
    #[serde(alias = "roofsize")]
    pub roof_size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateInput {
    pub north: f64,
    pub west: f64,
    pub house_size_sqft: f64,
    pub roof_size_sqft: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapInput {
    pub house_size_sqft: f64,
    pub roof_size_sqft: f64,
}

fn parse_number(raw: Option<&str>, field: &'static str) -> Result<f64, ApiError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let raw = raw.ok_or(ApiError::MissingField { field })?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ApiError::InvalidNumber { field }),
    }
}

fn parse_size(raw: Option<&str>, field: &'static str) -> Result<f64, ApiError> {
    let value = parse_number(raw, field)?;
    if value <= 0.0 {
        return Err(ApiError::NotPositive { field });
    }
    Ok(value)
}

impl TryFrom<EstimateQuery> for EstimateInput {
    type Error = ApiError;

    fn try_from(q: EstimateQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            north: parse_number(q.north.as_deref(), "north coordinate")?,
            west: parse_number(q.west.as_deref(), "west coordinate")?,
            house_size_sqft: parse_size(q.house_size.as_deref(), "house size")?,
            roof_size_sqft: parse_size(q.roof_size.as_deref(), "roof size")?,
        })
    }
}

impl TryFrom<HeatmapQuery> for HeatmapInput {
    type Error = ApiError;

    fn try_from(q: HeatmapQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            house_size_sqft: parse_size(q.house_size.as_deref(), "house size")?,
            roof_size_sqft: parse_size(q.roof_size.as_deref(), "roof size")?,
        })
    }
}

// ─── Engine output ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BrandQuote {
    pub brand: PanelBrand,
    pub panel_count: u32,
    /// Panels plus installation, whole currency units
    pub total_cost: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Preferences {
    pub cheapest: PanelBrand,
    pub max_output: PanelBrand,
    pub most_efficient: PanelBrand,
}

/// Everything the advisor derives for one household.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Estimate {
    pub city: String,
    /// kWh per month at the default efficiency, flat panels
    pub solar_output_kwh: f64,
    pub optimal_angle_deg: f64,
    /// kWh per month at the default efficiency, panels at the optimal angle
    pub optimal_output_kwh: f64,
    /// Household usage, kWh per month
    pub average_usage_kwh: f64,
    /// Share of usage covered by `solar_output_kwh`, truncated percent
    pub coverage_percent: i64,
    pub tier: Tier,
    pub recommendation: String,
    pub installation_cost: f64,
    pub companies: Vec<String>,
    pub brands: Vec<BrandQuote>,
    pub preferences: Preferences,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EstimateResponse {
    pub timestamp: DateTime<Utc>,
    pub estimate: Estimate,
}

// ─── Heat map ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HeatmapCity {
    pub name: String,
    pub tier: Tier,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TierPercentages {
    pub highly_recommended: f64,
    pub recommended: f64,
    pub not_recommended: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HeatmapSummary {
    pub house_size_sqft: f64,
    pub roof_size_sqft: f64,
    /// Every city in table order
    pub cities: Vec<HeatmapCity>,
    /// Hex colour per city, same order as `cities`
    pub map_colors: Vec<String>,
    pub highly_recommended: Vec<String>,
    pub recommended: Vec<String>,
    pub not_recommended: Vec<String>,
    pub percentages: TierPercentages,
    pub percent_denominator: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HeatmapResponse {
    pub timestamp: DateTime<Utc>,
    pub heatmap: HeatmapSummary,
}

// ─── Catalogue ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub cities: usize,
    pub panels: usize,
    pub reload_per_request: bool,
}
