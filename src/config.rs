//! JSON simulation configuration
//!
//! A config file describes a whole power analysis: dimensions, the master
//! seed, the LFC and library-size models, the parameter source and the
//! sample-size sweep. Generating functions are picked from a small set of
//! named distributions.
//!
//! ```json
//! {
//!   "ngenes": 10000,
//!   "nsims": 25,
//!   "p_de": 0.1,
//!   "seed": 42,
//!   "rnaseq_type": "bulk",
//!   "n1": [3, 6, 12],
//!   "n2": [3, 6, 12],
//!   "lfc": { "type": "normal", "mean": 0.0, "sd": 1.5 },
//!   "library_size": { "type": "log2_normal", "sd": 0.25 },
//!   "parameters": {
//!     "type": "insilico",
//!     "mean": { "type": "log2_uniform", "min": 3.0, "max": 12.0 },
//!     "dispersion": { "type": "mean_dependent", "asymptotic": 0.05, "extra_poisson": 2.0 }
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::io::read_estimated_params;
use crate::params::{DispersionFn, DispersionSpec, DropoutFn, EstimatedParams, InSilicoParams, MeanFn, ParameterBundle};
use crate::rng::RMersenneTwister;
use crate::sim::{max_group_size, LfcSpec, LibrarySizeModel, RnaSeqType, SimulationSettings};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub ngenes: usize,
    pub nsims: usize,
    pub p_de: f64,
    #[serde(default = "default_seed")]
    pub seed: u32,
    #[serde(default = "default_rnaseq_type")]
    pub rnaseq_type: RnaSeqType,
    pub n1: Vec<usize>,
    pub n2: Vec<usize>,
    pub lfc: LfcConfig,
    #[serde(default)]
    pub library_size: LibrarySizeConfig,
    pub parameters: ParameterConfig,
}

fn default_seed() -> u32 {
    1
}

fn default_rnaseq_type() -> RnaSeqType {
    RnaSeqType::Bulk
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LfcConfig {
    Constant { value: f64 },
    Values { values: Vec<f64> },
    Normal { mean: f64, sd: f64 },
    /// Gamma magnitudes with a random sign
    Gamma { shape: f64, rate: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LibrarySizeConfig {
    #[default]
    Equal,
    Values { values: Vec<f64> },
    /// `2^N(0, sd)`
    Log2Normal { sd: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeanConfig {
    Constant { value: f64 },
    /// `2^U(min, max)`
    Log2Uniform { min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispersionConfig {
    Constant { value: f64 },
    /// `asymptotic + extra_poisson / mean`
    MeanDependent { asymptotic: f64, extra_poisson: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DropoutConfig {
    Constant { value: f64 },
    Uniform { min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterConfig {
    Insilico {
        mean: MeanConfig,
        dispersion: DispersionConfig,
        #[serde(default)]
        dropout: Option<DropoutConfig>,
    },
    /// Estimated bundle stored as JSON; relative paths resolve against the config file
    Estimated { path: PathBuf },
}

impl SimulationConfig {
    /// Parse a config from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks that do not need the parameter source
    pub fn validate(&self) -> Result<()> {
        if self.n1.len() != self.n2.len() {
            return Err(SimError::Configuration {
                reason: format!(
                    "n1 and n2 must have the same length, got {} and {}",
                    self.n1.len(),
                    self.n2.len()
                ),
            });
        }
        if self.n1.is_empty() {
            return Err(SimError::Configuration {
                reason: "at least one sample-size configuration is required".to_string(),
            });
        }
        if self.n1.iter().chain(&self.n2).any(|&n| n == 0) {
            return Err(SimError::Configuration {
                reason: "every group needs at least one sample".to_string(),
            });
        }
        Ok(())
    }

    /// Per-group size of the maximal matrix, the largest size in either group
    pub fn max_group_size(&self) -> usize {
        max_group_size(&self.n1, &self.n2)
    }

    /// Build settings; `base_dir` anchors relative parameter paths
    pub fn into_settings(&self, base_dir: Option<&Path>) -> Result<SimulationSettings> {
        self.validate()?;

        let params = match &self.parameters {
            ParameterConfig::Insilico {
                mean,
                dispersion,
                dropout,
            } => ParameterBundle::InSilico(insilico_params(mean, dispersion, dropout.as_ref())?),
            ParameterConfig::Estimated { path } => {
                let path = match base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path.clone(),
                };
                log::info!("Loading estimated parameters from: {}", path.display());
                let mut estimated: EstimatedParams = read_estimated_params(&path)?;
                if self.rnaseq_type == RnaSeqType::SingleCell {
                    estimated.dropout_fit = None;
                }
                ParameterBundle::Estimated(estimated)
            }
        };

        SimulationSettings::builder()
            .ngenes(self.ngenes)
            .nsims(self.nsims)
            .p_de(self.p_de)
            .seed(self.seed)
            .rnaseq_type(self.rnaseq_type)
            .lfc(self.lfc.to_spec()?)
            .library(self.library_size.to_model()?)
            .params(params)
            .build()
    }
}

impl LfcConfig {
    /// Convert to the sampler's LFC model, checking distribution parameters
    pub fn to_spec(&self) -> Result<LfcSpec> {
        Ok(match self {
            LfcConfig::Constant { value } => LfcSpec::Constant(*value),
            LfcConfig::Values { values } => LfcSpec::Values(values.clone()),
            LfcConfig::Normal { mean, sd } => {
                require_non_negative("LFC sd", *sd)?;
                LfcSpec::normal(*mean, *sd)
            }
            LfcConfig::Gamma { shape, rate } => {
                require_positive("LFC gamma shape", *shape)?;
                require_positive("LFC gamma rate", *rate)?;
                LfcSpec::signed_gamma(*shape, *rate)
            }
        })
    }
}

impl LibrarySizeConfig {
    pub fn to_model(&self) -> Result<LibrarySizeModel> {
        Ok(match self {
            LibrarySizeConfig::Equal => LibrarySizeModel::Equal,
            LibrarySizeConfig::Values { values } => LibrarySizeModel::GivenVector(values.clone()),
            LibrarySizeConfig::Log2Normal { sd } => {
                require_non_negative("library size sd", *sd)?;
                LibrarySizeModel::log2_normal(*sd)
            }
        })
    }
}

fn insilico_params(
    mean: &MeanConfig,
    dispersion: &DispersionConfig,
    dropout: Option<&DropoutConfig>,
) -> Result<InSilicoParams> {
    let mean_fn: MeanFn = match *mean {
        MeanConfig::Constant { value } => {
            require_non_negative("mean", value)?;
            Arc::new(move |n: usize, _: &mut RMersenneTwister| vec![value; n])
        }
        MeanConfig::Log2Uniform { min, max } => {
            require_ordered("log2 mean", min, max)?;
            Arc::new(move |n: usize, rng: &mut RMersenneTwister| {
                (0..n).map(|_| rng.runif_range(min, max).exp2()).collect()
            })
        }
    };

    let dispersion = match *dispersion {
        DispersionConfig::Constant { value } => DispersionSpec::Constant(value),
        DispersionConfig::MeanDependent {
            asymptotic,
            extra_poisson,
        } => {
            require_non_negative("asymptotic dispersion", asymptotic)?;
            require_non_negative("extra-Poisson dispersion", extra_poisson)?;
            let dispersion_fn: DispersionFn = Arc::new(move |means: &[f64]| {
                means
                    .iter()
                    .map(|&m| asymptotic + extra_poisson / m.max(1e-8))
                    .collect()
            });
            DispersionSpec::Function(dispersion_fn)
        }
    };

    let dropout_fn: Option<DropoutFn> = match dropout.cloned() {
        None => None,
        Some(DropoutConfig::Constant { value }) => {
            require_probability("dropout", value)?;
            Some(Arc::new(move |n: usize, _: &mut RMersenneTwister| vec![value; n]))
        }
        Some(DropoutConfig::Uniform { min, max }) => {
            require_probability("dropout min", min)?;
            require_probability("dropout max", max)?;
            require_ordered("dropout", min, max)?;
            Some(Arc::new(move |n: usize, rng: &mut RMersenneTwister| {
                (0..n).map(|_| rng.runif_range(min, max)).collect()
            }))
        }
    };

    let params = InSilicoParams::new(mean_fn, dispersion, dropout_fn);
    params.validate()?;
    Ok(params)
}

fn require_positive(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(config_error(format!("{} must be positive, got {}", what, value)))
    }
}

fn require_non_negative(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(config_error(format!("{} must be non-negative, got {}", what, value)))
    }
}

fn require_probability(what: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(config_error(format!("{} must lie in [0, 1], got {}", what, value)))
    }
}

fn require_ordered(what: &str, min: f64, max: f64) -> Result<()> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(config_error(format!("{} range [{}, {}] is invalid", what, min, max)))
    }
}

fn config_error(reason: String) -> SimError {
    SimError::Configuration { reason }
}
