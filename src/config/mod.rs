// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reduction settings for responses and reporting.
//!
//! Settings come from TOML, e.g.
//!
//! ```toml
//! [response]
//! estimator = "robust"
//! telescope_fit = "dominant-axis"
//! gain_range = { min = 0.1, max = 10.0 }
//!
//! [reporting]
//! debug = true
//! ```
//!
//! Every field is optional. Raw arguments are first merged (so that e.g.
//! settings given by a caller can override those in a file) and only then
//! parsed into validated parameters.

mod error;

pub use error::ConfigError;

use std::{path::Path, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    constants::DEFAULT_DEGENERACY_TOLERANCE,
    motion::{
        GainEstimator, GainType, TelescopeFit, GAIN_ESTIMATORS, GAIN_TYPES, TELESCOPE_FITS,
    },
    report::set_debug,
};

/// Unvalidated settings, as they appear in a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigArgs {
    #[serde(default)]
    pub response: ResponseArgs,

    #[serde(default)]
    pub reporting: ReportingArgs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseArgs {
    /// "maximum-likelihood" or "robust".
    pub estimator: Option<String>,

    /// "independent" or "dominant-axis".
    pub telescope_fit: Option<String>,

    pub degeneracy_tolerance: Option<f64>,

    pub fixed_gains: Option<bool>,

    /// "signed" or "bidirectional".
    pub gain_type: Option<String>,

    pub gain_range: Option<GainRangeArgs>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GainRangeArgs {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportingArgs {
    pub debug: Option<bool>,
}

impl ConfigArgs {
    /// Read unvalidated settings from a TOML file.
    pub fn read<P: AsRef<Path>>(file: P) -> Result<ConfigArgs, ConfigError> {
        let file = file.as_ref();
        debug!("Reading settings from {}", file.display());
        let contents = std::fs::read_to_string(file).map_err(|err| ConfigError::Read {
            file: file.to_path_buf(),
            err,
        })?;
        ConfigArgs::from_str(&contents)
    }

    /// Combine two sets of settings, preferring `self` wherever both specify
    /// something.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub fn merge(self, other: ConfigArgs) -> ConfigArgs {
        ConfigArgs {
            response: self.response.merge(other.response),
            reporting: ReportingArgs {
                debug: self.reporting.debug.or(other.reporting.debug),
            },
        }
    }

    /// Validate the settings.
    pub fn parse(self) -> Result<Config, ConfigError> {
        debug!("{:#?}", self);

        let ConfigArgs {
            response,
            reporting,
        } = self;

        Ok(Config {
            response: response.parse()?,
            reporting: ReportingConfig {
                debug: reporting.debug.unwrap_or(false),
            },
        })
    }
}

impl FromStr for ConfigArgs {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<ConfigArgs, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}

impl ResponseArgs {
    fn merge(self, other: ResponseArgs) -> ResponseArgs {
        let gain_range = match (self.gain_range, other.gain_range) {
            (Some(a), Some(b)) => Some(GainRangeArgs {
                min: a.min.or(b.min),
                max: a.max.or(b.max),
            }),
            (a, b) => a.or(b),
        };
        ResponseArgs {
            estimator: self.estimator.or(other.estimator),
            telescope_fit: self.telescope_fit.or(other.telescope_fit),
            degeneracy_tolerance: self.degeneracy_tolerance.or(other.degeneracy_tolerance),
            fixed_gains: self.fixed_gains.or(other.fixed_gains),
            gain_type: self.gain_type.or(other.gain_type),
            gain_range,
        }
    }

    fn parse(self) -> Result<ResponseConfig, ConfigError> {
        let ResponseArgs {
            estimator,
            telescope_fit,
            degeneracy_tolerance,
            fixed_gains,
            gain_type,
            gain_range,
        } = self;

        let estimator = match estimator {
            None => GainEstimator::default(),
            Some(s) => GainEstimator::from_str(&s).map_err(|_| ConfigError::UnknownEstimator {
                got: s,
                valid: &GAIN_ESTIMATORS,
            })?,
        };
        let telescope_fit = match telescope_fit {
            None => TelescopeFit::default(),
            Some(s) => TelescopeFit::from_str(&s).map_err(|_| ConfigError::UnknownTelescopeFit {
                got: s,
                valid: &TELESCOPE_FITS,
            })?,
        };
        let gain_type = match gain_type {
            None => GainType::default(),
            Some(s) => GainType::from_str(&s).map_err(|_| ConfigError::UnknownGainType {
                got: s,
                valid: &GAIN_TYPES,
            })?,
        };

        let degeneracy_tolerance = degeneracy_tolerance.unwrap_or(DEFAULT_DEGENERACY_TOLERANCE);
        if !(degeneracy_tolerance.is_finite() && degeneracy_tolerance > 0.0) {
            return Err(ConfigError::BadTolerance(degeneracy_tolerance));
        }

        let gain_range = gain_range
            .map(|GainRangeArgs { min, max }| {
                GainRange::new(min.unwrap_or(f64::NEG_INFINITY), max.unwrap_or(f64::INFINITY))
            })
            .transpose()?;

        Ok(ResponseConfig {
            estimator,
            telescope_fit,
            degeneracy_tolerance,
            fixed_gains: fixed_gains.unwrap_or(false),
            gain_type,
            gain_range,
        })
    }
}

/// Validated settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub response: ResponseConfig,
    pub reporting: ReportingConfig,
}

impl Config {
    /// Read and validate settings from a TOML file.
    pub fn read<P: AsRef<Path>>(file: P) -> Result<Config, ConfigError> {
        ConfigArgs::read(file)?.parse()
    }

    pub fn from_toml_str(s: &str) -> Result<Config, ConfigError> {
        ConfigArgs::from_str(s)?.parse()
    }

    /// Push the process-wide parts of these settings (the debug flag) into
    /// effect.
    pub fn apply(&self) {
        set_debug(self.reporting.debug);
    }
}

/// How responses fit their gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseConfig {
    pub estimator: GainEstimator,

    pub telescope_fit: TelescopeFit,

    /// A regressor whose weighted variance is no more than this fraction of
    /// its weighted mean square is considered degenerate.
    pub degeneracy_tolerance: f64,

    /// Responses with fixed gains never estimate.
    pub fixed_gains: bool,

    pub gain_type: GainType,

    /// Channels whose gains fall outside this range are flagged.
    pub gain_range: Option<GainRange>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            estimator: GainEstimator::default(),
            telescope_fit: TelescopeFit::default(),
            degeneracy_tolerance: DEFAULT_DEGENERACY_TOLERANCE,
            fixed_gains: false,
            gain_type: GainType::default(),
            gain_range: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportingConfig {
    pub debug: bool,
}

/// An inclusive range of acceptable gains. Either end may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainRange {
    min: f64,
    max: f64,
}

impl GainRange {
    pub fn new(min: f64, max: f64) -> Result<GainRange, ConfigError> {
        if min.is_nan() || max.is_nan() || min > max || min == f64::INFINITY || max == f64::NEG_INFINITY {
            return Err(ConfigError::BadGainRange { min, max });
        }
        Ok(GainRange { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}
