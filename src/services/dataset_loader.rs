//! Reference table loader.
//!
//! Both tables are headerless, comma separated and positional:
//!   cities: name, north, west, temperature, horizontal radiation,
//!           optimal angle, optimal radiation, average energy, cost factor,
//!           companies (`;` separated)
//!   panels: name, efficiency, watts, area, price
//!
//! Blank lines, a leading byte-order mark and city rows with an empty name
//! are skipped. Anything else that does not fit the layout is a
//! `DatasetError` carrying the source name and 1-based line number.

use std::collections::HashSet;
use std::path::Path;

use crate::config::DatasetConfig;
use crate::error::DatasetError;
use crate::models::dataset::{City, Dataset, Panel, PanelBrand};

const CITY_FIELDS: usize = 10;
const PANEL_FIELDS: usize = 5;
const FIELD_SEP: char = ',';
const COMPANY_SEP: char = ';';

impl Dataset {
    /// Read both tables from disk.
    pub fn load(cfg: &DatasetConfig) -> Result<Self, DatasetError> {
        let cities = load_cities(&cfg.cities_path)?;
        let panels = load_panels(&cfg.panels_path)?;
        tracing::info!(
            "[DATASET] Loaded {} cities from {} and {} panels from {}",
            cities.len(),
            cfg.cities_path,
            panels.len(),
            cfg.panels_path
        );
        Ok(Dataset::new(cities, panels))
    }
}

fn read_source(path: impl AsRef<Path>) -> Result<String, DatasetError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_cities(path: &str) -> Result<Vec<City>, DatasetError> {
    let contents = read_source(path)?;
    parse_cities(path, &contents)
}

pub fn load_panels(path: &str) -> Result<Vec<Panel>, DatasetError> {
    let contents = read_source(path)?;
    parse_panels(path, &contents)
}

/// Splits `contents` into (1-based line number, fields) for every non-blank line.
fn records<'a>(contents: &'a str) -> impl Iterator<Item = (usize, Vec<&'a str>)> + 'a {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line.split(FIELD_SEP).map(str::trim).collect()))
}

struct Row<'a> {
    source: &'a str,
    line: usize,
    fields: Vec<&'a str>,
}

impl<'a> Row<'a> {
    fn new(source: &'a str, line: usize, fields: Vec<&'a str>, expected: usize) -> Result<Self, DatasetError> {
        if fields.len() != expected {
            return Err(DatasetError::FieldCount {
                source_name: source.to_string(),
                line,
                expected,
                found: fields.len(),
            });
        }
        Ok(Self { source, line, fields })
    }

    fn number(&self, idx: usize, field: &'static str) -> Result<f64, DatasetError> {
        let raw = self.fields[idx];
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| DatasetError::InvalidNumber {
                source_name: self.source.to_string(),
                line: self.line,
                field,
                value: raw.to_string(),
            })
    }

    fn non_negative(&self, idx: usize, field: &'static str) -> Result<f64, DatasetError> {
        let value = self.number(idx, field)?;
        if value < 0.0 {
            return Err(DatasetError::Negative {
                source_name: self.source.to_string(),
                line: self.line,
                field,
                value,
            });
        }
        Ok(value)
    }
}

pub fn parse_cities(source: &str, contents: &str) -> Result<Vec<City>, DatasetError> {
    let mut cities = Vec::new();
    let mut seen = HashSet::new();

    for (line, fields) in records(contents) {
        let row = Row::new(source, line, fields, CITY_FIELDS)?;
        let name = row.fields[0].to_string();
        if name.is_empty() {
            tracing::warn!("[DATASET] {}:{}: skipping row with no city name", source, line);
            continue;
        }

        let companies: Vec<String> = row.fields[9]
            .split(COMPANY_SEP)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        if companies.is_empty() {
            return Err(DatasetError::NoCompanies {
                source_name: source.to_string(),
                line,
                city: name,
            });
        }

        let city = City {
            north: row.number(1, "north coordinate")?,
            west: row.number(2, "west coordinate")?,
            temperature: row.number(3, "temperature")?,
            horizontal_radiation: row.non_negative(4, "horizontal radiation")?,
            optimal_angle_deg: row.number(5, "optimal angle")?,
            optimal_radiation: row.non_negative(6, "optimal radiation")?,
            avg_energy: row.non_negative(7, "average energy")?,
            cost_factor: row.non_negative(8, "cost factor")?,
            companies,
            name,
        };

        if !seen.insert(city.name.clone()) {
            return Err(DatasetError::DuplicateCity {
                source_name: source.to_string(),
                line,
                city: city.name,
            });
        }
        cities.push(city);
    }

    Ok(cities)
}

pub fn parse_panels(source: &str, contents: &str) -> Result<Vec<Panel>, DatasetError> {
    let mut panels: Vec<Panel> = Vec::new();

    for (line, fields) in records(contents) {
        let row = Row::new(source, line, fields, PANEL_FIELDS)?;
        let brand: PanelBrand = match row.fields[0].parse() {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("[DATASET] {}:{}: skipping row, {}", source, line, e);
                continue;
            }
        };

        let panel = Panel {
            brand,
            efficiency: row.non_negative(1, "efficiency")?,
            watts: row.non_negative(2, "watts")?,
            area_m2: row.non_negative(3, "area")?,
            price: row.non_negative(4, "price")?,
        };

        // A repeated brand replaces the earlier row.
        match panels.iter_mut().find(|p| p.brand == brand) {
            Some(existing) => *existing = panel,
            None => panels.push(panel),
        }
    }

    Ok(panels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CITIES: &str = "\
Phoenix,33.45,112.07,75.0,6.3,32.2,7.1,1050,0.94,Sunrun;SunPower;Tesla Energy
Seattle,47.61,-122.33,52.0,3.6,44.5,4.2,920,1.05,Palmetto

";

    const PANELS: &str = "\
Suntech,16.8,320,1.94,255
Samsung,18.7,360,1.94,342
Kyocera,16.2,270,1.66,216
CanadianSolar,17.3,325,1.94,248
GrapeSolar390W,19.1,390,2.04,390
GrapeSolar250,15.4,250,1.63,185
";

    #[test]
    fn test_parse_cities_reproduces_source_fields() {
        let cities = parse_cities("cities", CITIES).unwrap();
        assert_eq!(cities.len(), 2);

        let phoenix = &cities[0];
        assert_eq!(phoenix.name, "Phoenix");
        assert_relative_eq!(phoenix.north, 33.45);
        assert_relative_eq!(phoenix.west, 112.07);
        assert_relative_eq!(phoenix.temperature, 75.0);
        assert_relative_eq!(phoenix.horizontal_radiation, 6.3);
        assert_relative_eq!(phoenix.optimal_angle_deg, 32.2);
        assert_relative_eq!(phoenix.optimal_radiation, 7.1);
        assert_relative_eq!(phoenix.avg_energy, 1050.0);
        assert_relative_eq!(phoenix.cost_factor, 0.94);
        assert_eq!(phoenix.companies, ["Sunrun", "SunPower", "Tesla Energy"]);

        // Signs are kept as written; distance code normalises them.
        assert_relative_eq!(cities[1].west, -122.33);
        assert_eq!(cities[1].companies, ["Palmetto"]);
    }

    #[test]
    fn test_bad_number_names_line_and_field() {
        let src = "Phoenix,33.45,112.07,75.0,sunny,32.2,7.1,1050,0.94,Sunrun\n";
        let err = parse_cities("energy.csv", src).unwrap_err();
        match err {
            DatasetError::InvalidNumber { source_name, line, field, value } => {
                assert_eq!(source_name, "energy.csv");
                assert_eq!(line, 1);
                assert_eq!(field, "horizontal radiation");
                assert_eq!(value, "sunny");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_field_count_mismatch() {
        let src = "\nPhoenix,33.45,112.07\n";
        let err = parse_cities("energy.csv", src).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::FieldCount { line: 2, expected: 10, found: 3, .. }
        ));
    }

    #[test]
    fn test_duplicate_city_rejected() {
        let src = "\
Phoenix,33.45,112.07,75.0,6.3,32.2,7.1,1050,0.94,Sunrun
Phoenix,33.45,112.07,75.0,6.3,32.2,7.1,1050,0.94,Sunrun
";
        let err = parse_cities("energy.csv", src).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateCity { line: 2, .. }));
    }

    #[test]
    fn test_empty_company_list_rejected() {
        let src = "Phoenix,33.45,112.07,75.0,6.3,32.2,7.1,1050,0.94, ; \n";
        let err = parse_cities("energy.csv", src).unwrap_err();
        assert!(matches!(err, DatasetError::NoCompanies { .. }));
    }

    #[test]
    fn test_negative_radiation_rejected() {
        let src = "Phoenix,33.45,112.07,75.0,-6.3,32.2,7.1,1050,0.94,Sunrun\n";
        let err = parse_cities("energy.csv", src).unwrap_err();
        assert!(matches!(err, DatasetError::Negative { field: "horizontal radiation", .. }));
    }

    #[test]
    fn test_byte_order_mark_and_unnamed_rows_skipped() {
        let src = format!("{}{CITIES},,,,,,,,,\n", '\u{feff}');
        let cities = parse_cities("cities", &src).unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].name, "Phoenix");

        let dataset = Dataset::new(cities, Vec::new());
        assert!(dataset.city("Phoenix").is_some());
    }

    #[test]
    fn test_parse_panels() {
        let panels = parse_panels("solar.csv", PANELS).unwrap();
        assert_eq!(panels.len(), 6);
        let canadian = panels.iter().find(|p| p.brand == PanelBrand::CanadianSolar).unwrap();
        assert_relative_eq!(canadian.efficiency, 17.3);
        assert_relative_eq!(canadian.watts, 325.0);
        assert_relative_eq!(canadian.area_m2, 1.94);
        assert_relative_eq!(canadian.price, 248.0);
    }

    #[test]
    fn test_unknown_panel_brand_skipped() {
        let src = "LG,21.0,400,1.9,420\nSuntech,16.8,320,1.94,255\n";
        let panels = parse_panels("solar.csv", src).unwrap();
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].brand, PanelBrand::Suntech);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_cities("definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("solar-advisor-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let cities_path = dir.join("energy.csv");
        let panels_path = dir.join("solar.csv");
        std::fs::write(&cities_path, CITIES).unwrap();
        std::fs::write(&panels_path, PANELS).unwrap();

        let cfg = DatasetConfig {
            cities_path: cities_path.display().to_string(),
            panels_path: panels_path.display().to_string(),
            reload_per_request: false,
        };
        let dataset = Dataset::load(&cfg).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(dataset.city("Seattle").is_some());
        assert_eq!(dataset.panels().unwrap().len(), 6);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_shipped_dataset_loads() {
        let root = env!("CARGO_MANIFEST_DIR");
        let cfg = DatasetConfig {
            cities_path: format!("{root}/data/energy.csv"),
            panels_path: format!("{root}/data/solar.csv"),
            reload_per_request: false,
        };
        let dataset = Dataset::load(&cfg).unwrap();
        assert_eq!(dataset.len(), 98);
        assert!(dataset.panels().is_ok());
        assert!(dataset.cities().iter().all(|c| !c.companies.is_empty()));
    }
}
