use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DatasetError;

// ─── Reference city ──────────────────────────────────────────────────────────

/// One row of the city table.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct City {
    pub name: String,
    /// Degrees north as written in the table; compared by absolute value.
    pub north: f64,
    /// Degrees west as written in the table; compared by absolute value.
    pub west: f64,
    pub temperature: f64,
    /// Radiation on a flat, untilted panel
    pub horizontal_radiation: f64,
    pub optimal_angle_deg: f64,
    /// Radiation at `optimal_angle_deg`
    pub optimal_radiation: f64,
    /// Raw average-usage figure, divided by the calibration constant before use
    pub avg_energy: f64,
    /// Multiplied by the installation cost scale
    pub cost_factor: f64,
    /// Installers near the city, in table order. Never empty.
    pub companies: Vec<String>,
}

// ─── Panel brands ────────────────────────────────────────────────────────────

/// The six panel brands the advisor quotes, in their fixed comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PanelBrand {
    Suntech,
    Samsung,
    Kyocera,
    CanadianSolar,
    #[serde(rename = "grape_solar_390w")]
    GrapeSolar390W,
    #[serde(rename = "grape_solar_250")]
    GrapeSolar250,
}

impl PanelBrand {
    /// Enumeration order. Argmin/argmax ties resolve to the earlier entry.
    pub const ALL: [PanelBrand; 6] = [
        PanelBrand::Suntech,
        PanelBrand::Samsung,
        PanelBrand::Kyocera,
        PanelBrand::CanadianSolar,
        PanelBrand::GrapeSolar390W,
        PanelBrand::GrapeSolar250,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            PanelBrand::Suntech => "Suntech",
            PanelBrand::Samsung => "Samsung",
            PanelBrand::Kyocera => "Kyocera",
            PanelBrand::CanadianSolar => "Canadian Solar",
            PanelBrand::GrapeSolar390W => "Grape Solar 390W",
            PanelBrand::GrapeSolar250 => "Grape Solar 250",
        }
    }
}

impl fmt::Display for PanelBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBrand(pub String);

impl fmt::Display for UnknownBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown panel brand {:?}", self.0)
    }
}

impl std::error::Error for UnknownBrand {}

impl FromStr for PanelBrand {
    type Err = UnknownBrand;

    /// Accepts both the table spelling (`CanadianSolar`) and the display
    /// spelling (`Canadian Solar`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        PanelBrand::ALL
            .into_iter()
            .find(|brand| {
                let candidate: String = brand
                    .display_name()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .flat_map(char::to_lowercase)
                    .collect();
                candidate == key
            })
            .ok_or_else(|| UnknownBrand(s.to_string()))
    }
}

/// One row of the panel table.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Panel {
    pub brand: PanelBrand,
    /// Percentage-like figure, e.g. 16.8
    pub efficiency: f64,
    pub watts: f64,
    pub area_m2: f64,
    pub price: f64,
}

// ─── Loaded dataset ──────────────────────────────────────────────────────────

/// Both reference tables, immutable once loaded. Cities keep file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    cities: Vec<City>,
    by_name: HashMap<String, usize>,
    panels: HashMap<PanelBrand, Panel>,
}

impl Dataset {
    /// Callers are expected to have rejected duplicate names already; a later
    /// duplicate would be unreachable by name.
    pub fn new(cities: Vec<City>, panels: Vec<Panel>) -> Self {
        let mut by_name = HashMap::with_capacity(cities.len());
        for (idx, city) in cities.iter().enumerate() {
            by_name.entry(city.name.clone()).or_insert(idx);
        }
        let panels = panels.into_iter().map(|p| (p.brand, p)).collect();
        Self { cities, by_name, panels }
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn city(&self, name: &str) -> Option<&City> {
        self.by_name.get(name).map(|&idx| &self.cities[idx])
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn panel(&self, brand: PanelBrand) -> Result<&Panel, DatasetError> {
        self.panels.get(&brand).ok_or(DatasetError::MissingPanel(brand))
    }

    /// All six panels in enumeration order, or the first missing brand.
    pub fn panels(&self) -> Result<Vec<&Panel>, DatasetError> {
        PanelBrand::ALL.into_iter().map(|brand| self.panel(brand)).collect()
    }
}
