//! Analysis settings.

use std::path::Path;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which supply rail a net belongs to.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rail {
    /// A power net (`VCC`, `VDD`, ...).
    Power,
    /// A ground net (`VSS`, `GND`, ...).
    Ground,
}

/// Settings for a run of [`analyze`](crate::analyze).
///
/// Every field has a default, so a TOML file only needs to list the
/// settings it changes:
///
/// ```
/// # use extract::Config;
/// let config = Config::from_toml_str("power_prefixes = [\"VPWR\"]").unwrap();
/// assert_eq!(config.rail("VPWR_1"), Some(extract::config::Rail::Power));
/// assert_eq!(config.resolution, 1000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Net name prefixes that mark a power rail.
    pub power_prefixes: Vec<ArcStr>,
    /// Net name prefixes that mark a ground rail.
    pub ground_prefixes: Vec<ArcStr>,
    /// Grid units per drawing unit.
    pub resolution: f64,
    /// Largest gap, in grid units, at which a diffusion piece still counts as
    /// an electrode of an adjacent gate.
    pub touch_tolerance: i64,
    /// Number of straight segments each cubic curve is flattened into.
    pub curve_segments: usize,
    /// Join every conductor carrying the same signal name into one net.
    pub join_same_names: bool,
    /// Widest truth table that will be computed.
    pub max_table_inputs: usize,
    /// Widest truth table considered reasonable to display.
    pub max_display_inputs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            power_prefixes: vec![arcstr::literal!("VCC"), arcstr::literal!("VDD")],
            ground_prefixes: vec![arcstr::literal!("VSS"), arcstr::literal!("GND")],
            resolution: 1000.0,
            touch_tolerance: 2,
            curve_segments: 3,
            join_same_names: true,
            max_table_inputs: 10,
            max_display_inputs: 7,
        }
    }
}

impl Config {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reads a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Classifies a net name by its prefix.
    pub fn rail(&self, name: &str) -> Option<Rail> {
        if self.power_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            Some(Rail::Power)
        } else if self.ground_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            Some(Rail::Ground)
        } else {
            None
        }
    }

    /// Returns `true` if `name` is a power rail name.
    #[inline]
    pub fn is_power(&self, name: &str) -> bool {
        self.rail(name) == Some(Rail::Power)
    }

    /// Returns `true` if `name` is a ground rail name.
    #[inline]
    pub fn is_ground(&self, name: &str) -> bool {
        self.rail(name) == Some(Rail::Ground)
    }
}
