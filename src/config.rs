use serde::Deserialize;

fn default_port() -> u16 { 8080 }
fn default_static_dir() -> String { "static".to_string() }
fn default_cities_path() -> String { "data/energy.csv".to_string() }
fn default_panels_path() -> String { "data/solar.csv".to_string() }
fn default_reload_per_request() -> bool { false }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Where the two reference tables live and whether they are re-read on
/// every request instead of once at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    #[serde(default = "default_cities_path")]
    pub cities_path: String,
    #[serde(default = "default_panels_path")]
    pub panels_path: String,
    #[serde(default = "default_reload_per_request")]
    pub reload_per_request: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            cities_path: default_cities_path(),
            panels_path: default_panels_path(),
            reload_per_request: default_reload_per_request(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct HeatmapConfig {
    /// Divisor for tier percentages. `None` uses the number of loaded cities;
    /// the legacy deployment used a fixed 98.
    #[serde(default)]
    pub percent_denominator: Option<usize>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Listening port. A numeric `PORT` environment variable wins over the file.
    pub fn port(&self) -> u16 {
        port_override(std::env::var("PORT").ok().as_deref()).unwrap_or(self.server.port)
    }
}

fn port_override(raw: Option<&str>) -> Option<u16> {
    raw.map(str::trim)
        .filter(|p| !p.is_empty())
        .and_then(|p| p.parse().ok())
}
