use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{FilterSet, RangeFilter, UnknownYearRule};
use crate::pip::DEFAULT_BOUNDARY_TOLERANCE;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub filters: FilterDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    #[serde(default = "default_tolerance")]
    pub boundary_tolerance: f64,
    #[serde(default)]
    pub unknown_year_rule: UnknownYearRule,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            boundary_tolerance: default_tolerance(),
            unknown_year_rule: UnknownYearRule::default(),
        }
    }
}

/// Starting ranges for the attribute filters, `[lower, upper]` per
/// attribute. The defaults span the full US historical dataset.
#[derive(Debug, Deserialize, Clone)]
pub struct FilterDefaults {
    #[serde(default = "default_magnitude")]
    pub magnitude: [f64; 2],
    #[serde(default = "default_depth")]
    pub depth_km: [f64; 2],
    #[serde(default = "default_year")]
    pub year: [f64; 2],
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            magnitude: default_magnitude(),
            depth_km: default_depth(),
            year: default_year(),
        }
    }
}

impl FilterDefaults {
    pub fn to_filter_set(&self, unknown_year_rule: UnknownYearRule) -> FilterSet {
        FilterSet {
            magnitude: RangeFilter::new(self.magnitude[0], self.magnitude[1]),
            depth_km: RangeFilter::new(self.depth_km[0], self.depth_km[1]),
            year: RangeFilter::new(self.year[0], self.year[1]),
            unknown_year_rule,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

fn default_tolerance() -> f64 {
    DEFAULT_BOUNDARY_TOLERANCE
}

fn default_magnitude() -> [f64; 2] {
    [0.0, 10.0]
}

fn default_depth() -> [f64; 2] {
    [0.0, 800.0]
}

fn default_year() -> [f64; 2] {
    [1568.0, 2010.0]
}
