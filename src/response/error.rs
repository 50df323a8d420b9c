// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{motion::MotionKind, signal::SignalError};

#[derive(Error, Debug, PartialEq)]
pub enum ResponseError {
    #[error("Cannot bind a {motion} response to channel group '{group}'; the group has no channels")]
    EmptyChannelGroup { group: String, motion: MotionKind },

    #[error("This response models {expected} motion, but was given a {got} reference signal")]
    MotionMismatch { expected: MotionKind, got: MotionKind },

    #[error("The gains of channel group '{0}' are fixed and cannot be estimated")]
    FixedGains(String),

    #[error("Channel {channel} is a group member, but only {num_channels} channels are available")]
    ChannelOutOfRange { channel: usize, num_channels: usize },

    #[error("The sample window {start}..{end} doesn't fit inside {num_samples} samples")]
    WindowOutOfRange {
        start: usize,
        end: usize,
        num_samples: usize,
    },

    #[error("Only chopper responses use a dual-beam geometry; this response models {0} motion")]
    NotChopper(MotionKind),

    #[error("Gain component {component} doesn't exist; this response has {num_components} components")]
    NoSuchComponent {
        component: usize,
        num_components: usize,
    },

    #[error("Gains fitted for channel group '{got}' cannot be applied to the response of group '{expected}'")]
    ForeignGains { expected: String, got: String },

    #[error("The model has shape {got:?}, but (samples, members) is {expected:?}")]
    ModelShape {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error(transparent)]
    Signal(#[from] SignalError),
}
