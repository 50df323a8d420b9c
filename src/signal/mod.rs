// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Channel time-streams and the motion signals they are correlated with.

mod error;

pub use error::SignalError;

use ndarray::prelude::*;

use crate::{coord::SkyCoordinates, coord::Vec2, motion::MotionKind};

/// Time-ordered samples for every channel of an integration, with a weight
/// per sample. The first axis is the sample (time) index, the second is the
/// channel index.
///
/// A sample with a weight of zero (or a non-finite value) is flagged and is
/// never used to fit anything.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestreams {
    data: Array2<f32>,
    weights: Array2<f32>,
}

impl Timestreams {
    /// Make new timestreams where every sample has unit weight.
    pub fn new(data: Array2<f32>) -> Self {
        let weights = Array2::ones(data.dim());
        Self { data, weights }
    }

    pub fn with_weights(data: Array2<f32>, weights: Array2<f32>) -> Result<Self, SignalError> {
        if data.dim() != weights.dim() {
            return Err(SignalError::WeightShape {
                data: data.dim(),
                weights: weights.dim(),
            });
        }
        Ok(Self { data, weights })
    }

    pub fn num_samples(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn num_channels(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn data(&self) -> ArrayView2<f32> {
        self.data.view()
    }

    pub fn data_mut(&mut self) -> ArrayViewMut2<f32> {
        self.data.view_mut()
    }

    pub fn weights(&self) -> ArrayView2<f32> {
        self.weights.view()
    }

    /// Exclude a single sample of a single channel from fitting.
    pub fn flag(&mut self, sample: usize, channel: usize) -> Result<(), SignalError> {
        let dim = self.weights.dim();
        let weight = self
            .weights
            .get_mut((sample, channel))
            .ok_or(SignalError::OutOfBounds {
                sample,
                channel: Some(channel),
                dim,
            })?;
        *weight = 0.0;
        Ok(())
    }

    /// Exclude a sample from fitting for all channels.
    pub fn flag_sample(&mut self, sample: usize) -> Result<(), SignalError> {
        if sample >= self.num_samples() {
            return Err(SignalError::OutOfBounds {
                sample,
                channel: None,
                dim: self.weights.dim(),
            });
        }
        self.weights.row_mut(sample).fill(0.0);
        Ok(())
    }

    /// The channel's timestream.
    pub fn channel(&self, channel: usize) -> ArrayView1<f32> {
        self.data.column(channel)
    }

    /// The weight to use for a sample; zero if the sample is flagged or
    /// unusable.
    pub(crate) fn usable_weight(&self, sample: usize, channel: usize) -> f64 {
        let w = self.weights[(sample, channel)];
        if w > 0.0 && w.is_finite() && self.data[(sample, channel)].is_finite() {
            f64::from(w)
        } else {
            0.0
        }
    }
}

/// The motion that channel signals are correlated with, sampled at the same
/// cadence as (and aligned with) the channel timestreams.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceSignal {
    /// The chopper's displacement along its throw, and the sky position the
    /// chop geometry should be evaluated at.
    Chopper {
        displacement: Array1<f64>,
        position: SkyCoordinates,
    },

    /// Telescope pointing offsets. The first axis is the sample index, the
    /// second is x and y.
    Telescope { offsets: Array2<f64> },
}

impl ReferenceSignal {
    pub fn chopper(displacement: Array1<f64>, position: SkyCoordinates) -> Self {
        ReferenceSignal::Chopper {
            displacement,
            position,
        }
    }

    pub fn telescope(offsets: Array2<f64>) -> Result<Self, SignalError> {
        let signal = ReferenceSignal::Telescope { offsets };
        signal.validate()?;
        Ok(signal)
    }

    /// Make a telescope reference from a sequence of pointing offsets.
    pub fn telescope_from_offsets(offsets: &[Vec2]) -> Self {
        let mut array = Array2::zeros((offsets.len(), 2));
        for (mut row, offset) in array.outer_iter_mut().zip(offsets) {
            row[0] = offset.x;
            row[1] = offset.y;
        }
        ReferenceSignal::Telescope { offsets: array }
    }

    pub fn motion_kind(&self) -> MotionKind {
        match self {
            ReferenceSignal::Chopper { .. } => MotionKind::Chopper,
            ReferenceSignal::Telescope { .. } => MotionKind::Telescope,
        }
    }

    /// The number of samples.
    pub fn len(&self) -> usize {
        match self {
            ReferenceSignal::Chopper { displacement, .. } => displacement.len(),
            ReferenceSignal::Telescope { offsets } => offsets.len_of(Axis(0)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn validate(&self) -> Result<(), SignalError> {
        match self {
            ReferenceSignal::Telescope { offsets } if offsets.len_of(Axis(1)) != 2 => {
                Err(SignalError::OffsetColumns(offsets.len_of(Axis(1))))
            }
            _ => Ok(()),
        }
    }

    /// Check that this signal lines up with some timestreams.
    pub(crate) fn check_aligned(&self, timestreams: &Timestreams) -> Result<(), SignalError> {
        self.validate()?;
        if self.len() != timestreams.num_samples() {
            return Err(SignalError::LengthMismatch {
                reference: self.len(),
                timestreams: timestreams.num_samples(),
            });
        }
        Ok(())
    }
}
