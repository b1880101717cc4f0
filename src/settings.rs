use std::{fs, path::Path};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings{
    /// [relative] Geometric tolerance used for coincidence, on-edge and
    /// simultaneity tests. It is scaled by the diagonal of the input's
    /// bounding box (but never by less than 1) before use.
    pub tolerance: f64,

    /// [int] Upper bound on the number of events the builder may fire
    /// before giving up. `None` derives the bound from the number of input
    /// vertices (16n + 64).
    pub max_events: Option<usize>,

    /// How skeleton edges are split into bisectors and inner bisectors
    pub classification: Classification,

    /// Which halfedges the exporter emits
    pub export_mode: ExportMode,

    /// Emit both halfedges of every edge (true) or only the halfedge in
    /// creation direction, pointing away from the boundary (false)
    pub both_directions: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Every skeleton edge of non zero length is an inner bisector,
    /// zero length edges between coincident skeleton vertices are bisectors
    #[default]
    Interior,
    /// Skeleton edges touching a contour vertex are bisectors, edges
    /// between two skeleton vertices are inner bisectors
    Contour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    /// only inner bisectors (typecode 2)
    #[default]
    InnerBisectors,
    /// every skeleton edge (typecode 1 and 2)
    Bisectors,
    /// skeleton edges and the input boundary (typecode 0, 1 and 2)
    All,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_events: None,
            classification: Classification::default(),
            export_mode: ExportMode::default(),
            both_directions: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tolerance {0}: must be finite and positive")]
    Tolerance(f64),
}

impl Settings {
    /// Loads settings from a json file, missing fields keep their default value
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(SettingsError::Tolerance(self.tolerance))
        }
        Ok(())
    }
    /// Event budget for an input with `vertex_count` vertices
    pub fn event_limit(&self, vertex_count: usize) -> usize {
        self.max_events.unwrap_or(16 * vertex_count + 64)
    }
}
