//! Pipeline configuration.
//!
//! Every field has a default, so an empty `cooccur.toml` (or none at all) runs
//! the pipeline with the documented settings. Lookup priority:
//! 1. explicit `--config` path (errors are fatal)
//! 2. `COOCCUR_CONFIG` env var pointing at a TOML file
//! 3. `./cooccur.toml` if present
//! 4. defaults

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::CooccurError;

pub const CONFIG_ENV: &str = "COOCCUR_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "cooccur.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoOccurrenceConfig {
    /// Edges seen in fewer documents than this are dropped.
    pub min_weight: u32,
    /// Cap on contributing document ids kept per edge.
    pub max_documents_per_edge: usize,
}

impl Default for CoOccurrenceConfig {
    fn default() -> Self {
        Self {
            min_weight: 2,
            max_documents_per_edge: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityConfig {
    /// Number of seeded Louvain trials; trial `i` uses seed `i`.
    pub trials: usize,
    /// Modularity resolution (gamma).
    pub resolution: f64,
    /// A level stops once its modularity gain falls below this.
    pub min_modularity_gain: f64,
    /// Upper bound on Louvain aggregation levels.
    pub max_levels: usize,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            trials: 10,
            resolution: 1.0,
            min_modularity_gain: 1e-7,
            max_levels: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Force-directed iterations for the shared embedding.
    pub iterations: usize,
    /// Seed for the initial random placement.
    pub seed: u64,
    /// Lower bound for the optimal node distance `k = 1/sqrt(n)`.
    pub k_floor: f64,
    /// Multiplier applied to embedding coordinates.
    pub xy_scale: f64,
    /// Vertical gap between consecutive period bands.
    pub layer_spacing: f64,
    /// How far a composite score of 1.0 lifts a node inside its band.
    pub elevation_scale: f64,
    /// Explicit per-period base offsets; periods not listed use `index * layer_spacing`.
    pub base_offsets: BTreeMap<String, f64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 200,
            seed: 42,
            k_floor: 0.01,
            xy_scale: 10.0,
            layer_spacing: 10.0,
            elevation_scale: 5.0,
            base_offsets: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Explicit period processing order. Periods missing here follow in first-seen order.
    pub periods: Vec<String>,
    pub cooccurrence: CoOccurrenceConfig,
    pub community: CommunityConfig,
    pub layout: LayoutConfig,
}

impl PipelineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, CooccurError> {
        let config: PipelineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &Path) -> Result<Self, CooccurError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CooccurError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Resolve configuration using the documented lookup priority.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CooccurError> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            info!("Loaded config from {}", path.display());
            return Ok(config);
        }

        let implicit = std::env::var(CONFIG_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                let local = Path::new(LOCAL_CONFIG_FILE);
                local.is_file().then(|| local.to_path_buf())
            });

        if let Some(path) = implicit {
            match Self::from_file(&path) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    return Ok(config);
                }
                Err(e) => {
                    warn!("{}. Using defaults.", e);
                }
            }
        }

        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), CooccurError> {
        if self.cooccurrence.min_weight == 0 {
            return Err(CooccurError::Validation(
                "cooccurrence.min_weight must be at least 1".into(),
            ));
        }
        if self.community.trials == 0 {
            return Err(CooccurError::Validation(
                "community.trials must be at least 1".into(),
            ));
        }
        if !(self.community.resolution.is_finite() && self.community.resolution > 0.0) {
            return Err(CooccurError::Validation(
                "community.resolution must be a positive number".into(),
            ));
        }
        if self.layout.iterations == 0 {
            return Err(CooccurError::Validation(
                "layout.iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
