// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("Timestream weights have shape {weights:?}, but the data have shape {data:?}")]
    WeightShape {
        data: (usize, usize),
        weights: (usize, usize),
    },

    #[error("The reference signal has {reference} samples, but the timestreams have {timestreams}")]
    LengthMismatch { reference: usize, timestreams: usize },

    #[error("Telescope offsets must have 2 columns (x and y); got {0}")]
    OffsetColumns(usize),

    #[error("Sample {sample} (channel {channel:?}) is outside timestreams of shape {dim:?}")]
    OutOfBounds {
        sample: usize,
        channel: Option<usize>,
        dim: (usize, usize),
    },
}
