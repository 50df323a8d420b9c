// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tags for the kinds of motion a response can model, and the knobs that
//! control how gains to those motions are fitted.

use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// The physical motion a [`crate::CorrelatedResponse`] models. The tag is
/// fixed when a response is bound; it decides which reference signal the
/// response consumes.
#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKind {
    /// The chopper throwing the beam between two positions on the sky.
    #[strum(serialize = "chopper")]
    Chopper,

    /// The telescope pointing (scanning) across the sky.
    #[strum(serialize = "telescope")]
    Telescope,
}

/// One of the two axes of a telescope pointing offset.
#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq)]
pub enum PointingAxis {
    #[strum(serialize = "x")]
    X,
    #[strum(serialize = "y")]
    Y,
}

impl PointingAxis {
    /// The column of this axis in a `(sample, axis)` offset array.
    pub fn index(self) -> usize {
        match self {
            PointingAxis::X => 0,
            PointingAxis::Y => 1,
        }
    }
}

/// How telescope responses fit the 2-D pointing offset.
#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, Default, PartialEq, Eq)]
pub enum TelescopeFit {
    /// Fit an independent gain to each pointing axis.
    #[default]
    #[strum(serialize = "independent")]
    Independent,

    /// Fit a single gain to whichever axis moved the most in the window (the
    /// dominant scan direction).
    #[strum(serialize = "dominant-axis")]
    DominantAxis,
}

/// The statistic used to fit gains.
#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, Default, PartialEq, Eq)]
pub enum GainEstimator {
    /// Weighted ordinary least squares.
    #[default]
    #[strum(serialize = "maximum-likelihood")]
    MaximumLikelihood,

    /// Weighted median of the per-sample ratios; insensitive to outliers.
    #[strum(serialize = "robust")]
    Robust,
}

/// How a gain is compared against the allowed gain range.
#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, Default, PartialEq, Eq)]
pub enum GainType {
    /// The gain's sign matters.
    #[strum(serialize = "signed")]
    Signed,

    /// Only the gain's magnitude matters.
    #[default]
    #[strum(serialize = "bidirectional")]
    Bidirectional,
}

impl GainType {
    /// The value that gets checked against a gain range.
    pub fn comparable(self, gain: f64) -> f64 {
        match self {
            GainType::Signed => gain,
            GainType::Bidirectional => gain.abs(),
        }
    }
}

lazy_static::lazy_static! {
    pub(crate) static ref TELESCOPE_FITS: String = TelescopeFit::iter().join(", ");

    pub(crate) static ref GAIN_ESTIMATORS: String = GainEstimator::iter().join(", ");

    pub(crate) static ref GAIN_TYPES: String = GainType::iter().join(", ");
}
