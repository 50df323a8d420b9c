// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Gains are fitted and stored in double
precision even though time-stream samples are single precision.
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// The gain given to channels when a response keeps its own gain storage and
/// nothing has been fitted yet.
pub const DEFAULT_GAIN: f64 = 1.0;

/// A reference signal whose weighted variance is smaller than this fraction of
/// its weighted mean square cannot constrain a gain; such windows are skipped.
pub const DEFAULT_DEGENERACY_TOLERANCE: f64 = 1e-10;

/// The fraction of values discarded from *each* tail when forming a robust
/// mean of gains.
pub const ROBUST_MEAN_TAIL_FRACTION: f64 = 0.1;

/// The number of pointing axes (X and Y) available to telescope responses.
pub const NUM_POINTING_AXES: usize = 2;
