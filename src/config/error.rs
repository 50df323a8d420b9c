// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Couldn't read the configuration file {file}: {err}")]
    Read { file: PathBuf, err: std::io::Error },

    #[error("Couldn't parse the configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unrecognised gain estimator '{got}'; valid estimators are: {valid}")]
    UnknownEstimator { got: String, valid: &'static str },

    #[error("Unrecognised telescope fit '{got}'; valid fits are: {valid}")]
    UnknownTelescopeFit { got: String, valid: &'static str },

    #[error("Unrecognised gain type '{got}'; valid gain types are: {valid}")]
    UnknownGainType { got: String, valid: &'static str },

    #[error("The degeneracy tolerance must be a positive number; got {0}")]
    BadTolerance(f64),

    #[error("The gain range [{min}, {max}] is invalid; min must not exceed max")]
    BadGainRange { min: f64, max: f64 },
}
