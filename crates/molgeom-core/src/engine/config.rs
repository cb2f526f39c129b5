use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Default scale factor applied to the sum of covalent radii when deciding
/// whether two atoms are bonded. Admits slightly elongated bonds while
/// excluding van-der-Waals contacts. Empirical; exposed here rather than
/// hard-coded at the call sites.
pub const DEFAULT_BOND_TOLERANCE_FACTOR: f64 = 1.15;

/// Default Cartesian tolerance (Angstroms) for symmetry-operation matching.
pub const DEFAULT_DISTANCE_TOLERANCE: f64 = 0.3;

/// Default relative tolerance for comparing principal moments of inertia.
pub const DEFAULT_MOMENT_TOLERANCE: f64 = 0.01;

/// Default upper bound on the proper rotation order searched for.
pub const DEFAULT_MAX_ROTATION_ORDER: u32 = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Parameters for bond detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BondingConfig {
    /// Scale factor applied to the sum of covalent radii.
    pub tolerance_factor: f64,
    /// Per-symbol radius overrides (Angstroms), consulted before the static
    /// table. Also the only way to bond elements the table does not know.
    pub radius_overrides: HashMap<String, f64>,
}

impl Default for BondingConfig {
    fn default() -> Self {
        Self {
            tolerance_factor: DEFAULT_BOND_TOLERANCE_FACTOR,
            radius_overrides: HashMap::new(),
        }
    }
}

/// Parameters for point-group detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymmetryConfig {
    /// Maximum Cartesian distance (Angstroms) between a transformed atom and
    /// its nearest same-label counterpart for a candidate operation to hold.
    pub distance_tolerance: f64,
    /// Relative tolerance when classifying the degeneracy pattern of the
    /// principal moments of inertia.
    pub moment_tolerance: f64,
    /// Highest proper rotation order the axis search will test.
    pub max_rotation_order: u32,
}

impl Default for SymmetryConfig {
    fn default() -> Self {
        Self {
            distance_tolerance: DEFAULT_DISTANCE_TOLERANCE,
            moment_tolerance: DEFAULT_MOMENT_TOLERANCE,
            max_rotation_order: DEFAULT_MAX_ROTATION_ORDER,
        }
    }
}

/// Parameters for iterative symmetrization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymmetrizationConfig {
    /// Detection parameters used on each iteration.
    pub symmetry: SymmetryConfig,
    /// Sole bounded-loop guard against non-convergence.
    pub max_iterations: usize,
    /// Convergence threshold on the maximum positional shift (Angstroms)
    /// between consecutive iterations.
    pub convergence_epsilon: f64,
}

impl Default for SymmetrizationConfig {
    fn default() -> Self {
        Self {
            symmetry: SymmetryConfig::default(),
            max_iterations: 20,
            convergence_epsilon: 1e-8,
        }
    }
}

impl SymmetrizationConfig {
    /// Returns a builder initialized with the default parameters.
    pub fn builder() -> SymmetrizationConfigBuilder {
        SymmetrizationConfigBuilder::default()
    }

    /// Loads a configuration from a TOML file. Absent keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

#[derive(Debug, Default, Clone)]
pub struct SymmetrizationConfigBuilder {
    config: SymmetrizationConfig,
}

impl SymmetrizationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance_tolerance(mut self, tolerance: f64) -> Self {
        self.config.symmetry.distance_tolerance = tolerance;
        self
    }

    pub fn moment_tolerance(mut self, tolerance: f64) -> Self {
        self.config.symmetry.moment_tolerance = tolerance;
        self
    }

    pub fn max_rotation_order(mut self, order: u32) -> Self {
        self.config.symmetry.max_rotation_order = order;
        self
    }

    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.config.max_iterations = iterations;
        self
    }

    pub fn convergence_epsilon(mut self, epsilon: f64) -> Self {
        self.config.convergence_epsilon = epsilon;
        self
    }

    pub fn build(self) -> SymmetrizationConfig {
        self.config
    }
}

/// Parameters for the combined structural analysis workflow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub bonding: BondingConfig,
    pub symmetry: SymmetryConfig,
}

impl AnalysisConfig {
    /// Loads a configuration from a TOML file. Absent keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}
