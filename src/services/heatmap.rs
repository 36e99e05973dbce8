//! City-wide recommendation map.
//!
//! Runs the single-city figures for every reference city with the same
//! house and roof size, then groups the cities by tier.

use crate::models::dataset::Dataset;
use crate::models::estimate::{
    HeatmapCity, HeatmapInput, HeatmapSummary, RadiationMode, Tier, TierPercentages,
};
use crate::services::estimator::{
    average_usage, recommend, solar_output, truncate_cents, DEFAULT_EFFICIENCY,
};

/// Tier of every city, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatMap {
    entries: Vec<(String, Tier)>,
}

impl HeatMap {
    /// Classifies every city from its own horizontal radiation at the default
    /// efficiency, using the same two-decimal figures as the single-city path.
    pub fn build(dataset: &Dataset, input: &HeatmapInput) -> Self {
        let entries = dataset
            .cities()
            .iter()
            .map(|city| {
                let output = truncate_cents(solar_output(
                    city,
                    RadiationMode::Horizontal,
                    DEFAULT_EFFICIENCY,
                    input.roof_size_sqft,
                ));
                let usage = truncate_cents(average_usage(city, input.house_size_sqft));
                (city.name.clone(), recommend(output, usage))
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Cities in `tier`, table order.
    pub fn members(&self, tier: Tier) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, t)| *t == tier)
            .map(|(n, _)| n.clone())
            .collect()
    }

    pub fn count(&self, tier: Tier) -> usize {
        self.entries.iter().filter(|(_, t)| *t == tier).count()
    }

    /// Share of `denominator` cities in `tier`, one decimal place.
    pub fn percent(&self, tier: Tier, denominator: usize) -> f64 {
        if denominator == 0 {
            return 0.0;
        }
        (self.count(tier) as f64 / denominator as f64 * 1000.0).round() / 10.0
    }

    /// Hex colour per city, table order.
    pub fn colors(&self) -> Vec<String> {
        self.entries.iter().map(|(_, t)| t.hex().to_string()).collect()
    }

    /// Flattens the map into the response shape. `denominator` of `None`
    /// uses the number of classified cities.
    pub fn summarize(&self, input: &HeatmapInput, denominator: Option<usize>) -> HeatmapSummary {
        let denominator = denominator.unwrap_or(self.len());
        HeatmapSummary {
            house_size_sqft: input.house_size_sqft,
            roof_size_sqft: input.roof_size_sqft,
            // Name to tier, table order.
            cities: self
                .entries
                .iter()
                .map(|(name, tier)| HeatmapCity {
                    name: name.clone(),
                    tier: *tier,
                    color: tier.hex().to_string(),
                })
                .collect(),
            map_colors: self.colors(),
            highly_recommended: self.members(Tier::HighlyRecommended),
            recommended: self.members(Tier::Recommended),
            not_recommended: self.members(Tier::NotRecommended),
            percentages: TierPercentages {
                highly_recommended: self.percent(Tier::HighlyRecommended, denominator),
                recommended: self.percent(Tier::Recommended, denominator),
                not_recommended: self.percent(Tier::NotRecommended, denominator),
            },
            percent_denominator: denominator,
        }
    }
}

#[cfg(test)]
impl HeatMap {
    pub fn tier_of(&self, name: &str) -> Option<Tier> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, t)| *t)
    }

    pub fn tier_map(&self) -> std::collections::HashMap<&str, Tier> {
        self.entries.iter().map(|(n, t)| (n.as_str(), *t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::estimator::tests::{dataset_from, fixture, PANELS};
    use approx::assert_abs_diff_eq;

    fn input(house: f64, roof: f64) -> HeatmapInput {
        HeatmapInput { house_size_sqft: house, roof_size_sqft: roof }
    }

    #[test]
    fn test_every_city_classified_in_table_order() {
        let dataset = fixture();
        let map = HeatMap::build(&dataset, &input(1000.0, 1500.0));
        assert_eq!(map.len(), 3);
        let names: Vec<&str> = dataset.cities().iter().map(|c| c.name.as_str()).collect();
        let summary = map.summarize(&input(1000.0, 1500.0), None);
        let summary_names: Vec<&str> = summary.cities.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, summary_names);
        assert_eq!(summary.map_colors.len(), 3);
        assert_eq!(map.tier_map().len(), 3);
    }

    #[test]
    fn test_tiers_match_single_city_figures() {
        let dataset = fixture();
        // Sunville: 587.90 / 384.61 → best
        // Gloomtown: 391.93 / 346.15 → best
        // Midburg: 653.22 / 423.07 → best
        let map = HeatMap::build(&dataset, &input(1000.0, 1500.0));
        assert_eq!(map.tier_of("Sunville"), Some(Tier::HighlyRecommended));
        assert_eq!(map.tier_of("Gloomtown"), Some(Tier::HighlyRecommended));
        assert_eq!(map.tier_of("Atlantis"), None);

        // A big house on a small roof pushes everything down.
        let map = HeatMap::build(&dataset, &input(4000.0, 800.0));
        assert_eq!(map.count(Tier::NotRecommended), 3);
        assert!(map.members(Tier::HighlyRecommended).is_empty());
    }

    #[test]
    fn test_middle_tier_and_colors() {
        // usage = 2600 / 2600 × 1000 = 1000
        // output = 1000 sqft roof: 92.903 × 15 × R × 0.75 / 12 = 87.09656 × R
        // R = 9.0 → 783.86 → ratio 0.78 → middle
        let cities = "\
Yellowton,40,100,0,9.0,0,9.0,2600,1,A
Redville,41,101,0,3.0,0,3.0,2600,1,B
Greenport,42,102,0,10.0,0,10.0,2600,1,C
";
        let dataset = dataset_from(cities, PANELS);
        let map = HeatMap::build(&dataset, &input(1000.0, 1000.0));
        assert_eq!(map.tier_of("Yellowton"), Some(Tier::Recommended));
        assert_eq!(map.tier_of("Redville"), Some(Tier::NotRecommended));
        assert_eq!(map.tier_of("Greenport"), Some(Tier::HighlyRecommended));
        assert_eq!(map.colors(), ["#FFFF00", "#FF0000", "#008000"]);
        assert_eq!(map.members(Tier::Recommended), ["Yellowton"]);
    }

    #[test]
    fn test_percentages_sum_to_hundred_with_dataset_size() {
        let cities = "\
A,40,100,0,9.0,0,9.0,2600,1,X
B,41,101,0,3.0,0,3.0,2600,1,X
C,42,102,0,10.0,0,10.0,2600,1,X
";
        let dataset = dataset_from(cities, PANELS);
        let map = HeatMap::build(&dataset, &input(1000.0, 1000.0));
        let summary = map.summarize(&input(1000.0, 1000.0), None);
        let p = &summary.percentages;
        assert_eq!(summary.percent_denominator, 3);
        assert_abs_diff_eq!(p.highly_recommended, 33.3, epsilon = 1e-9);
        assert_abs_diff_eq!(p.recommended, 33.3, epsilon = 1e-9);
        assert_abs_diff_eq!(p.not_recommended, 33.3, epsilon = 1e-9);
        let total = p.highly_recommended + p.recommended + p.not_recommended;
        assert_abs_diff_eq!(total, 100.0, epsilon = 0.15);
    }

    #[test]
    fn test_fixed_denominator() {
        let dataset = fixture();
        let map = HeatMap::build(&dataset, &input(1000.0, 1500.0));
        let summary = map.summarize(&input(1000.0, 1500.0), Some(98));
        assert_eq!(summary.percent_denominator, 98);
        // 3 / 98 = 3.06 % → 3.1
        assert_abs_diff_eq!(summary.percentages.highly_recommended, 3.1, epsilon = 1e-9);
        assert_eq!(map.percent(Tier::Recommended, 0), 0.0);
    }

    #[test]
    fn test_heatmap_agrees_with_single_city_estimate() {
        use crate::config::DatasetConfig;
        use crate::models::estimate::EstimateInput;
        use crate::services::estimator::estimate;

        let root = env!("CARGO_MANIFEST_DIR");
        let cfg = DatasetConfig {
            cities_path: format!("{root}/data/energy.csv"),
            panels_path: format!("{root}/data/solar.csv"),
            reload_per_request: false,
        };
        let dataset = Dataset::load(&cfg).unwrap();

        for (house, roof) in [(1000.0, 1500.0), (2000.0, 1200.0), (2500.0, 900.0), (3200.0, 2100.0)] {
            let map = HeatMap::build(&dataset, &input(house, roof));
            for city in dataset.cities() {
                let est = estimate(
                    &dataset,
                    &EstimateInput {
                        north: city.north,
                        west: city.west,
                        house_size_sqft: house,
                        roof_size_sqft: roof,
                    },
                )
                .unwrap();
                assert_eq!(est.city, city.name);
                assert_eq!(
                    Some(est.tier),
                    map.tier_of(&city.name),
                    "{} at house={house} roof={roof}",
                    city.name
                );
            }
        }
    }

    #[test]
    fn test_shipped_dataset_percentages() {
        use crate::config::DatasetConfig;

        let root = env!("CARGO_MANIFEST_DIR");
        let cfg = DatasetConfig {
            cities_path: format!("{root}/data/energy.csv"),
            panels_path: format!("{root}/data/solar.csv"),
            reload_per_request: false,
        };
        let dataset = Dataset::load(&cfg).unwrap();
        let map = HeatMap::build(&dataset, &input(2000.0, 1200.0));
        let summary = map.summarize(&input(2000.0, 1200.0), None);
        assert_eq!(summary.cities.len(), 98);
        let counted = summary.highly_recommended.len()
            + summary.recommended.len()
            + summary.not_recommended.len();
        assert_eq!(counted, 98);
        let p = &summary.percentages;
        let total = p.highly_recommended + p.recommended + p.not_recommended;
        assert_abs_diff_eq!(total, 100.0, epsilon = 0.15);
    }
}
