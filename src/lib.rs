// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Correlated-response modelling for submillimetre and far-infrared time-stream
reduction.

Detector channels pick up signals that are correlated with the motions of the
instrument (the chopper wobbling between two beams, the telescope scanning
across the sky). A [`CorrelatedResponse`] ties a group of channels to one of
these motions, fits a linear gain per channel and removes the modelled signal
from the channel time-streams.

[`ShadowScan`]s stand in for a real scan wherever a scan is structurally
needed but no data may ever be read.
 */

pub mod channel;
pub mod config;
pub mod constants;
pub mod coord;
pub mod dual_beam;
mod error;
pub mod logging;
pub(crate) mod math;
pub mod motion;
pub mod report;
pub mod response;
pub mod scan;
pub mod signal;

// Re-exports.
pub use channel::{Channel, ChannelGroup, FnGainAccessor, GainAccessor, Pixel};
pub use config::{Config, GainRange, ReportingConfig, ResponseConfig};
pub use coord::{SkyCoordinates, Vec2};
pub use dual_beam::{ChopperGeometry, DualBeam};
pub use error::ReductionError;
pub use motion::{GainEstimator, GainType, MotionKind, PointingAxis, TelescopeFit};
pub use report::{OwnerCategory, Reporter};
pub use response::{CorrelatedResponse, Degeneracy, DegeneracyReason, GainFit, PendingGains};
pub use scan::{Scan, ShadowScan};
pub use signal::{ReferenceSignal, Timestreams};

use crossbeam_utils::atomic::AtomicCell;

/// Are diagnostic status messages enabled? This is process-wide and may be
/// toggled at any time; readers only need to see the latest stored value.
pub(crate) static DEBUG: AtomicCell<bool> = AtomicCell::new(false);
