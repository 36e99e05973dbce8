//! Household solar estimation.
//!
//! Every energy figure comes from one formula:
//!
//!   E = roof_m2 × efficiency × radiation × PR / 12
//!
//! with the roof converted from square feet, `efficiency` as a percentage-like
//! number and PR the fixed performance ratio. The division by 12 turns the
//! annual-scale product into a monthly kWh figure.

use crate::error::DatasetError;
use crate::models::dataset::{City, Dataset, Panel, PanelBrand};
use crate::models::estimate::{
    BrandQuote, Estimate, EstimateInput, Preferences, RadiationMode, Tier,
};

pub const SQFT_TO_M2: f64 = 0.092903;
pub const PERFORMANCE_RATIO: f64 = 0.75;
pub const MONTHS_PER_YEAR: f64 = 12.0;
/// Assumed efficiency when no brand is chosen.
pub const DEFAULT_EFFICIENCY: f64 = 15.0;
/// Converts a city's raw average-energy figure into kWh per square foot.
pub const USAGE_CALIBRATION: f64 = 2600.0;
pub const INSTALLATION_COST_SCALE: f64 = 5000.0;

/// Cuts a value to two decimals, toward zero.
pub fn truncate_cents(value: f64) -> f64 {
    (value * 100.0).trunc() / 100.0
}

/// Closest city in raw (north, west) degree space. Both the user's and the
/// cities' coordinates are compared by absolute value. Ties keep the city
/// that appears first in the table.
pub fn nearest_city(dataset: &Dataset, north: f64, west: f64) -> Option<&City> {
    let (north, west) = (north.abs(), west.abs());
    let mut best: Option<(&City, f64)> = None;
    for city in dataset.cities() {
        let d = (north - city.north.abs()).hypot(west - city.west.abs());
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((city, d)),
        }
    }
    best.map(|(city, _)| city)
}

/// Expected output in kWh per month.
pub fn solar_output(city: &City, mode: RadiationMode, efficiency: f64, roof_sqft: f64) -> f64 {
    let radiation = match mode {
        RadiationMode::Horizontal => city.horizontal_radiation,
        RadiationMode::Optimal => city.optimal_radiation,
    };
    let roof_m2 = roof_sqft * SQFT_TO_M2;
    roof_m2 * efficiency * radiation * PERFORMANCE_RATIO / MONTHS_PER_YEAR
}

pub fn optimal_angle(city: &City) -> f64 {
    city.optimal_angle_deg
}

/// Output with panels tilted to the city's optimal angle.
pub fn optimal_output(city: &City, efficiency: f64, roof_sqft: f64) -> f64 {
    solar_output(city, RadiationMode::Optimal, efficiency, roof_sqft)
}

/// Household usage in kWh per month.
pub fn average_usage(city: &City, house_sqft: f64) -> f64 {
    city.avg_energy / USAGE_CALIBRATION * house_sqft
}

/// Tier for a given output against a given usage.
pub fn recommend(output: f64, usage: f64) -> Tier {
    Tier::classify(output / usage)
}

pub fn installation_cost(city: &City) -> f64 {
    city.cost_factor * INSTALLATION_COST_SCALE
}

/// Panels needed to meet the city's raw average-energy figure, given the
/// per-square-metre yield implied by `output` over the whole roof.
/// Zero when the roof yields nothing.
pub fn panel_count(city: &City, output: f64, roof_sqft: f64, panel: &Panel) -> u32 {
    let roof_m2 = roof_sqft * SQFT_TO_M2;
    let per_panel = (output * MONTHS_PER_YEAR / roof_m2) * panel.area_m2;
    if !per_panel.is_finite() || per_panel <= 0.0 {
        return 0;
    }
    // `as` saturates at u32::MAX
    (city.avg_energy / per_panel).trunc() as u32
}

/// Panels plus installation, truncated to whole currency units.
pub fn panel_cost(city: &City, panel: &Panel, count: u32) -> i64 {
    (panel.price * f64::from(count) + installation_cost(city)).trunc() as i64
}

/// Count and cost for every brand, in enumeration order.
pub fn brand_quotes(
    dataset: &Dataset,
    city: &City,
    output: f64,
    roof_sqft: f64,
) -> Result<Vec<BrandQuote>, DatasetError> {
    dataset
        .panels()?
        .into_iter()
        .map(|panel| {
            let panel_count = panel_count(city, output, roof_sqft, panel);
            Ok(BrandQuote {
                brand: panel.brand,
                panel_count,
                total_cost: panel_cost(city, panel, panel_count),
            })
        })
        .collect()
}

/// Index of the first minimum. Empty input gives 0.
fn first_min_by<T: PartialOrd + Copy>(values: &[T]) -> usize {
    let mut best = 0;
    for (idx, v) in values.iter().enumerate().skip(1) {
        if *v < values[best] {
            best = idx;
        }
    }
    best
}

/// Index of the first maximum. Empty input gives 0.
fn first_max_by<T: PartialOrd + Copy>(values: &[T]) -> usize {
    let mut best = 0;
    for (idx, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = idx;
        }
    }
    best
}

/// Cheapest, highest-output and most efficient brand.
/// `quotes` must be in enumeration order, as `brand_quotes` returns them.
pub fn preferences(
    dataset: &Dataset,
    city: &City,
    quotes: &[BrandQuote],
    roof_sqft: f64,
) -> Result<Preferences, DatasetError> {
    let panels = dataset.panels()?;
    let costs: Vec<i64> = quotes.iter().map(|q| q.total_cost).collect();
    let efficiencies: Vec<f64> = panels.iter().map(|p| p.efficiency).collect();
    let outputs: Vec<f64> = panels
        .iter()
        .map(|p| solar_output(city, RadiationMode::Horizontal, p.efficiency, roof_sqft))
        .collect();

    Ok(Preferences {
        cheapest: quotes
            .get(first_min_by(&costs))
            .map(|q| q.brand)
            .unwrap_or(PanelBrand::ALL[0]),
        max_output: panels[first_max_by(&outputs)].brand,
        most_efficient: panels[first_max_by(&efficiencies)].brand,
    })
}

/// Full single-household estimate for the city nearest to the input
/// coordinates.
pub fn estimate(dataset: &Dataset, input: &EstimateInput) -> Result<Estimate, DatasetError> {
    let city = nearest_city(dataset, input.north, input.west).ok_or(DatasetError::NoCities)?;

    let output = truncate_cents(solar_output(
        city,
        RadiationMode::Horizontal,
        DEFAULT_EFFICIENCY,
        input.roof_size_sqft,
    ));
    let optimal = truncate_cents(optimal_output(city, DEFAULT_EFFICIENCY, input.roof_size_sqft));
    let usage = truncate_cents(average_usage(city, input.house_size_sqft));

    let ratio = output / usage;
    let tier = Tier::classify(ratio);
    // `as` saturates; NaN becomes 0
    let coverage_percent = (ratio * 100.0).trunc() as i64;

    let brands = brand_quotes(dataset, city, output, input.roof_size_sqft)?;
    let preferences = preferences(dataset, city, &brands, input.roof_size_sqft)?;

    tracing::debug!(
        "[ESTIMATE] City: {} | Output: {:.2} kWh | Usage: {:.2} kWh | Tier: {}",
        city.name,
        output,
        usage,
        tier.label()
    );

    Ok(Estimate {
        city: city.name.clone(),
        solar_output_kwh: output,
        optimal_angle_deg: optimal_angle(city),
        optimal_output_kwh: optimal,
        average_usage_kwh: usage,
        coverage_percent,
        tier,
        recommendation: tier.label().to_string(),
        installation_cost: truncate_cents(installation_cost(city)),
        companies: city.companies.clone(),
        brands,
        preferences,
    })
}
