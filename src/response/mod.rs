// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Linear responses of channel groups to instrument motions.
//!
//! A [`CorrelatedResponse`] models the signal in each channel of a group as a
//! gain times a reference motion signal. Gains are fitted over a window of
//! samples, and the modelled signal can then be removed from the channel
//! time-streams.
//!
//! The gains of a response are split into *components*, one per regressor:
//! chopper responses and dominant-axis telescope responses have one component,
//! independent telescope responses have one per pointing axis (x then y).

mod error;
mod fit;

pub use error::ResponseError;
pub use fit::{Degeneracy, DegeneracyReason};

use std::{ops::Range, sync::Arc};

use log::trace;
use ndarray::prelude::*;
use rayon::prelude::*;
use vec1::{vec1, Vec1};

use crate::{
    channel::{Channel, ChannelGroup, GainAccessor},
    config::ResponseConfig,
    constants::{DEFAULT_GAIN, NUM_POINTING_AXES, ROBUST_MEAN_TAIL_FRACTION},
    dual_beam::DualBeam,
    math::robust_mean,
    motion::{GainEstimator, MotionKind, PointingAxis, TelescopeFit},
    report::{Owner, OwnerCategory, Reporter},
    signal::{ReferenceSignal, Timestreams},
};
use fit::{dominant_axis, fit_member, Design, MemberFit};

/// What happened during a call to [`CorrelatedResponse::estimate_gains`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GainFit {
    /// The number of channels that had at least one gain updated.
    pub num_updated: usize,

    /// The number of flagged channels that were left alone.
    pub num_flagged: usize,

    /// The number of updated channels whose gains fell outside the allowed
    /// gain range.
    pub num_out_of_range: usize,

    /// Channels whose gains couldn't be constrained and were kept.
    pub degeneracies: Vec<Degeneracy>,

    /// The pointing axis that was fitted, for dominant-axis telescope
    /// responses.
    pub dominant_axis: Option<PointingAxis>,
}

/// Gains fitted by [`CorrelatedResponse::fit_gains`], waiting to be written
/// back by [`CorrelatedResponse::apply_gains`] of the same response.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingGains {
    group: ChannelGroup,
    fits: Vec<MemberFit>,
    dominant_axis: Option<PointingAxis>,
}

impl PendingGains {
    /// The dominant axis the gains were fitted on, if any.
    pub fn dominant_axis(&self) -> Option<PointingAxis> {
        self.dominant_axis
    }
}

/// Where one gain component is kept: with the channel (through an accessor),
/// or inside the response, one value per group member.
struct GainSlot<C> {
    accessor: Option<Arc<dyn GainAccessor<C>>>,
    stored: Vec<f64>,
}

impl<C> GainSlot<C> {
    fn new(accessor: Option<Arc<dyn GainAccessor<C>>>, num_members: usize) -> GainSlot<C> {
        GainSlot {
            accessor,
            stored: vec![DEFAULT_GAIN; num_members],
        }
    }

    fn get(&self, channels: &[C], member: usize, channel: usize) -> f64 {
        match &self.accessor {
            Some(accessor) => accessor.gain(&channels[channel]),
            None => self.stored[member],
        }
    }

    fn set(&mut self, channels: &mut [C], member: usize, channel: usize, gain: f64) {
        match &self.accessor {
            Some(accessor) => accessor.set_gain(&mut channels[channel], gain),
            None => self.stored[member] = gain,
        }
    }
}

/// The response of a group of channels to one kind of motion.
///
/// Channel lists handed to a response must be aligned with the columns of the
/// timestreams, and must contain every member of the group.
pub struct CorrelatedResponse<C> {
    motion: MotionKind,
    group: ChannelGroup,
    gains: Vec1<GainSlot<C>>,
    config: ResponseConfig,
    dual_beam: Option<Arc<dyn DualBeam>>,

    /// The axis used by the last dominant-axis fit.
    fitted_axis: Option<PointingAxis>,

    reporter: Reporter,
}

impl<C: Channel + Sync> CorrelatedResponse<C> {
    /// Bind a response to `group`. The first gain component is read from and
    /// written to the channels with `accessor`; without an accessor, the
    /// response keeps gains itself, starting at [`DEFAULT_GAIN`].
    pub fn bind(
        motion: MotionKind,
        group: ChannelGroup,
        accessor: Option<Arc<dyn GainAccessor<C>>>,
    ) -> Result<CorrelatedResponse<C>, ResponseError> {
        if group.is_empty() {
            return Err(ResponseError::EmptyChannelGroup {
                group: group.name().to_string(),
                motion,
            });
        }

        let num_members = group.len();
        let mut gains = vec1![GainSlot::new(accessor, num_members)];
        if motion == MotionKind::Telescope {
            while gains.len() < NUM_POINTING_AXES {
                gains.push(GainSlot::new(None, num_members));
            }
        }

        Ok(CorrelatedResponse {
            motion,
            group,
            gains,
            config: ResponseConfig::default(),
            dual_beam: None,
            fitted_axis: None,
            reporter: Reporter::global(),
        })
    }

    pub fn with_config(mut self, config: &ResponseConfig) -> Self {
        self.config = *config;
        self
    }

    /// Project the chop onto each channel's beam offset using `geometry`.
    pub fn with_dual_beam(mut self, geometry: Arc<dyn DualBeam>) -> Result<Self, ResponseError> {
        if self.motion != MotionKind::Chopper {
            return Err(ResponseError::NotChopper(self.motion));
        }
        self.dual_beam = Some(geometry);
        Ok(self)
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Keep gain `component` with the channels, through `accessor`.
    pub fn set_gain_accessor(
        &mut self,
        component: usize,
        accessor: Arc<dyn GainAccessor<C>>,
    ) -> Result<(), ResponseError> {
        let num_components = self.gains.len();
        let slot = self
            .gains
            .get_mut(component)
            .ok_or(ResponseError::NoSuchComponent {
                component,
                num_components,
            })?;
        slot.accessor = Some(accessor);
        Ok(())
    }

    pub fn motion_kind(&self) -> MotionKind {
        self.motion
    }

    pub fn group(&self) -> &ChannelGroup {
        &self.group
    }

    pub fn config(&self) -> &ResponseConfig {
        &self.config
    }

    /// The number of gain components that are fitted.
    pub fn num_components(&self) -> usize {
        match (self.motion, self.config.telescope_fit) {
            (MotionKind::Telescope, TelescopeFit::Independent) => NUM_POINTING_AXES,
            _ => 1,
        }
    }

    /// The axis used by the last dominant-axis fit, if there was one.
    pub fn fitted_axis(&self) -> Option<PointingAxis> {
        self.fitted_axis
    }

    /// Fit the gain of every group member against `reference` over the samples
    /// in `window`, and write the new gains back.
    ///
    /// Flagged samples don't contribute. Channels that are flagged, or whose
    /// gains can't be constrained (see [`GainFit::degeneracies`]), keep the
    /// gains they had. Fitting the same data twice gives the same gains.
    ///
    /// This is [`CorrelatedResponse::fit_gains`] followed by
    /// [`CorrelatedResponse::apply_gains`].
    pub fn estimate_gains(
        &mut self,
        channels: &mut [C],
        timestreams: &Timestreams,
        reference: &ReferenceSignal,
        window: Range<usize>,
    ) -> Result<GainFit, ResponseError> {
        let pending = self.fit_gains(channels, timestreams, reference, window)?;
        self.apply_gains(channels, pending)
    }

    /// Fit the gain of every group member without changing anything. Responses
    /// on disjoint groups can fit against the same channels and timestreams at
    /// the same time; the results are then written back one response at a
    /// time with [`CorrelatedResponse::apply_gains`].
    pub fn fit_gains(
        &self,
        channels: &[C],
        timestreams: &Timestreams,
        reference: &ReferenceSignal,
        window: Range<usize>,
    ) -> Result<PendingGains, ResponseError> {
        if self.config.fixed_gains {
            return Err(ResponseError::FixedGains(self.group.name().to_string()));
        }
        self.check_motion(reference)?;
        reference.check_aligned(timestreams)?;
        let num_samples = timestreams.num_samples();
        if window.start > window.end || window.end > num_samples {
            return Err(ResponseError::WindowOutOfRange {
                start: window.start,
                end: window.end,
                num_samples,
            });
        }
        self.check_channels(channels.len().min(timestreams.num_channels()))?;

        let axis = match reference {
            ReferenceSignal::Telescope { offsets }
                if self.config.telescope_fit == TelescopeFit::DominantAxis =>
            {
                Some(dominant_axis(offsets.slice(s![window.start..window.end, ..])))
            }
            _ => None,
        };
        let design = self.design(reference, window, axis);
        let scales = self.projections(channels, reference);
        let retained = self.retained_gains(channels, design.num_components());

        let estimator = self.config.estimator;
        if estimator == GainEstimator::Robust && design.num_components() > 1 {
            self.reporter.status(
                Some(self.owner()),
                format!(
                    "{}: independent telescope gains are always fitted by maximum likelihood",
                    self.group.name()
                ),
            );
        }

        let tolerance = self.config.degeneracy_tolerance;
        let fits: Vec<MemberFit> = self
            .group
            .members()
            .par_iter()
            .enumerate()
            .map(|(member, &channel)| {
                if channels[channel].is_flagged() {
                    return MemberFit::flagged(member, channel);
                }
                fit_member(
                    &design,
                    scales[member],
                    retained[member],
                    timestreams,
                    member,
                    channel,
                    estimator,
                    tolerance,
                )
            })
            .collect();

        Ok(PendingGains {
            group: self.group.clone(),
            fits,
            dominant_axis: axis,
        })
    }

    /// Write gains fitted by [`CorrelatedResponse::fit_gains`] back to the
    /// channels (or this response), update gain flags and report any
    /// degeneracies.
    pub fn apply_gains(
        &mut self,
        channels: &mut [C],
        pending: PendingGains,
    ) -> Result<GainFit, ResponseError> {
        if pending.group != self.group {
            return Err(ResponseError::ForeignGains {
                expected: self.group.name().to_string(),
                got: pending.group.name().to_string(),
            });
        }
        self.check_channels(channels.len())?;

        let axis = pending.dominant_axis;
        let mut result = GainFit {
            dominant_axis: axis,
            ..Default::default()
        };
        for fit in pending.fits {
            if fit.flagged {
                result.num_flagged += 1;
                continue;
            }

            if !fit.gains.is_empty() {
                for &(component, gain) in &fit.gains {
                    self.gains[component].set(channels, fit.member, fit.channel, gain);
                }
                result.num_updated += 1;

                if let Some(range) = self.config.gain_range {
                    let gain_type = self.config.gain_type;
                    let out_of_range = self.gains[..self.num_components()]
                        .iter()
                        .any(|slot| {
                            let gain = slot.get(channels, fit.member, fit.channel);
                            !range.contains(gain_type.comparable(gain))
                        });
                    channels[fit.channel].set_gain_flag(out_of_range);
                    if out_of_range {
                        result.num_out_of_range += 1;
                    }
                }
            }

            for degeneracy in fit.degeneracies {
                self.reporter.status(
                    Some(self.owner()),
                    format!("{}: {degeneracy}; keeping the previous gain", self.group.name()),
                );
                result.degeneracies.push(degeneracy);
            }
        }

        if axis.is_some() {
            self.fitted_axis = axis;
        }
        trace!(
            "{} response of '{}': {} updated, {} flagged, {} degenerate, {} out of range",
            self.motion,
            self.group.name(),
            result.num_updated,
            result.num_flagged,
            result.degeneracies.len(),
            result.num_out_of_range
        );
        Ok(result)
    }

    /// The modelled signal of every member for every sample of `reference`.
    /// The first axis is the sample, the second is the member. Samples where
    /// the reference isn't finite are modelled as zero.
    pub fn reconstruct(
        &self,
        channels: &[C],
        reference: &ReferenceSignal,
    ) -> Result<Array2<f64>, ResponseError> {
        self.check_motion(reference)?;
        reference.validate()?;
        self.check_channels(channels.len())?;

        let axis = match reference {
            ReferenceSignal::Telescope { offsets }
                if self.config.telescope_fit == TelescopeFit::DominantAxis =>
            {
                Some(self.fitted_axis.unwrap_or_else(|| dominant_axis(offsets.view())))
            }
            _ => None,
        };
        let design = self.design(reference, 0..reference.len(), axis);
        let scales = self.projections(channels, reference);

        let mut model = Array2::zeros((reference.len(), self.group.len()));
        for (member, (&channel, mut column)) in self
            .group
            .members()
            .iter()
            .zip(model.axis_iter_mut(Axis(1)))
            .enumerate()
        {
            let gains: Vec<f64> = self.gains[..design.num_components()]
                .iter()
                .map(|slot| slot.get(channels, member, channel) * scales[member])
                .collect();
            for ((m, row), &valid) in column
                .iter_mut()
                .zip(design.signals.outer_iter())
                .zip(design.valid.iter())
            {
                if valid {
                    *m = gains.iter().zip(row.iter()).map(|(g, r)| g * r).sum();
                }
            }
        }

        Ok(model)
    }

    /// Remove the modelled signal from the timestreams. Returns the power
    /// (sum of squares) removed from each member.
    pub fn subtract_from(
        &self,
        channels: &[C],
        timestreams: &mut Timestreams,
        reference: &ReferenceSignal,
    ) -> Result<Vec<f64>, ResponseError> {
        self.check_motion(reference)?;
        reference.check_aligned(timestreams)?;
        self.check_channels(timestreams.num_channels())?;
        let model = self.reconstruct(channels, reference)?;
        self.subtract_model(timestreams, &model)
    }

    /// Remove a model made by [`CorrelatedResponse::reconstruct`] from the
    /// timestreams. Returns the power removed from each member.
    ///
    /// Models of responses on disjoint groups can be reconstructed in
    /// parallel and then subtracted one after the other.
    pub fn subtract_model(
        &self,
        timestreams: &mut Timestreams,
        model: &Array2<f64>,
    ) -> Result<Vec<f64>, ResponseError> {
        self.check_channels(timestreams.num_channels())?;
        let expected = (timestreams.num_samples(), self.group.len());
        if model.dim() != expected {
            return Err(ResponseError::ModelShape {
                expected,
                got: model.dim(),
            });
        }

        let mut data = timestreams.data_mut();
        let power = self
            .group
            .members()
            .iter()
            .zip(model.axis_iter(Axis(1)))
            .map(|(&channel, model)| {
                data.column_mut(channel)
                    .iter_mut()
                    .zip(model.iter())
                    .map(|(d, &m)| {
                        *d -= m as f32;
                        m * m
                    })
                    .sum::<f64>()
            })
            .collect();
        Ok(power)
    }

    /// The gains of every member. The first axis is the member, the second is
    /// the gain component.
    pub fn gains(&self, channels: &[C]) -> Result<Array2<f64>, ResponseError> {
        self.check_channels(channels.len())?;
        let mut gains = Array2::zeros((self.group.len(), self.num_components()));
        for (member, (&channel, mut row)) in self
            .group
            .members()
            .iter()
            .zip(gains.outer_iter_mut())
            .enumerate()
        {
            for (g, slot) in row.iter_mut().zip(self.gains.iter()) {
                *g = slot.get(channels, member, channel);
            }
        }
        Ok(gains)
    }

    /// A single gain. `None` if the member or component doesn't exist.
    pub fn gain(&self, channels: &[C], member: usize, component: usize) -> Option<f64> {
        let &channel = self.group.members().get(member)?;
        if component >= self.num_components() || channel >= channels.len() {
            return None;
        }
        Some(self.gains[component].get(channels, member, channel))
    }

    /// A robust average of the magnitudes of a gain component over members
    /// that are neither flagged nor gain-flagged. [`DEFAULT_GAIN`] if there
    /// are none.
    pub fn average_gain(&self, channels: &[C], component: usize) -> Result<f64, ResponseError> {
        if component >= self.num_components() {
            return Err(ResponseError::NoSuchComponent {
                component,
                num_components: self.num_components(),
            });
        }
        self.check_channels(channels.len())?;

        let slot = &self.gains[component];
        let mut magnitudes: Vec<f64> = self
            .group
            .members()
            .iter()
            .enumerate()
            .filter(|&(_, &channel)| {
                !channels[channel].is_flagged() && !channels[channel].is_gain_flagged()
            })
            .map(|(member, &channel)| slot.get(channels, member, channel).abs())
            .collect();
        Ok(robust_mean(&mut magnitudes, ROBUST_MEAN_TAIL_FRACTION).unwrap_or(DEFAULT_GAIN))
    }

    fn owner(&self) -> &dyn Owner {
        self
    }

    /// The current gains of every member, padded with [`DEFAULT_GAIN`].
    fn retained_gains(&self, channels: &[C], num_components: usize) -> Vec<[f64; 2]> {
        self.group
            .members()
            .iter()
            .enumerate()
            .map(|(member, &channel)| {
                let mut gains = [DEFAULT_GAIN; 2];
                for (g, slot) in gains.iter_mut().zip(self.gains.iter()).take(num_components) {
                    *g = slot.get(channels, member, channel);
                }
                gains
            })
            .collect()
    }

    fn check_motion(&self, reference: &ReferenceSignal) -> Result<(), ResponseError> {
        let got = reference.motion_kind();
        if got != self.motion {
            return Err(ResponseError::MotionMismatch {
                expected: self.motion,
                got,
            });
        }
        Ok(())
    }

    fn check_channels(&self, num_channels: usize) -> Result<(), ResponseError> {
        match self.group.members().iter().find(|&&c| c >= num_channels) {
            Some(&channel) => Err(ResponseError::ChannelOutOfRange {
                channel,
                num_channels,
            }),
            None => Ok(()),
        }
    }

    /// The regressors over `window`. Telescope responses fit `axis` alone if
    /// given, or both axes otherwise.
    fn design(
        &self,
        reference: &ReferenceSignal,
        window: Range<usize>,
        axis: Option<PointingAxis>,
    ) -> Design {
        match reference {
            ReferenceSignal::Chopper { displacement, .. } => {
                Design::new(&[displacement.view()], window)
            }
            ReferenceSignal::Telescope { offsets } => match axis {
                Some(axis) => Design::new(&[offsets.column(axis.index())], window),
                None => Design::new(&[offsets.column(0), offsets.column(1)], window),
            },
        }
    }

    /// The factor projecting the reference onto each member. The chop is
    /// projected onto the direction of the channel's beam offset when a
    /// geometry is available; everything else is used as is.
    fn projections(&self, channels: &[C], reference: &ReferenceSignal) -> Vec<f64> {
        // The chop angle depends on where the telescope is pointing, so it's
        // evaluated afresh every time.
        let chop_angle = match (reference, &self.dual_beam) {
            (ReferenceSignal::Chopper { position, .. }, Some(geometry)) => {
                Some(geometry.chop_angle(position))
            }
            _ => None,
        };

        self.group
            .members()
            .iter()
            .map(|&channel| match (chop_angle, channels[channel].position()) {
                (Some(angle), Some(offset)) if offset.is_finite() && offset.length() > 0.0 => {
                    (angle - offset.angle()).cos()
                }
                _ => 1.0,
            })
            .collect()
    }
}

impl<C> Owner for CorrelatedResponse<C> {
    fn category(&self) -> OwnerCategory {
        OwnerCategory::Integration
    }
}

impl<C> std::fmt::Debug for CorrelatedResponse<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("CorrelatedResponse")
            .field("motion", &self.motion)
            .field("group", &self.group)
            .field("config", &self.config)
            .field("dual_beam", &self.dual_beam.is_some())
            .field("fitted_axis", &self.fitted_axis)
            .finish_non_exhaustive()
    }
}
