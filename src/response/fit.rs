// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fitting a single channel's gains against a response's regressors.
//!
//! Nothing in here is parallel; the caller farms members out to threads.

use std::ops::Range;

use ndarray::prelude::*;
use strum_macros::Display;

use crate::{
    math::{weighted_median, Moments},
    motion::{GainEstimator, PointingAxis},
    signal::Timestreams,
};

/// The regressors of a response over a window of samples. Each column belongs
/// to one gain component and row `i` is sample `start + i`.
pub(super) struct Design {
    pub(super) start: usize,

    /// Non-finite reference samples are stored as zero.
    pub(super) signals: Array2<f64>,

    /// Is the reference usable at this sample?
    pub(super) valid: Array1<bool>,
}

impl Design {
    /// Gather the columns of `columns` that fall in `window`.
    pub(super) fn new(columns: &[ArrayView1<f64>], window: Range<usize>) -> Design {
        let len = window.len();
        let mut signals = Array2::zeros((len, columns.len()));
        let mut valid = Array1::from_elem(len, true);
        for (column, mut signal) in columns.iter().zip(signals.axis_iter_mut(Axis(1))) {
            let column = column.slice(s![window.start..window.end]);
            for ((i, &value), s) in column.indexed_iter().zip(signal.iter_mut()) {
                if value.is_finite() {
                    *s = value;
                } else {
                    valid[i] = false;
                }
            }
        }
        // A sample is only usable if every component is.
        for (mut row, &ok) in signals.outer_iter_mut().zip(valid.iter()) {
            if !ok {
                row.fill(0.0);
            }
        }

        Design {
            start: window.start,
            signals,
            valid,
        }
    }

    pub(super) fn num_components(&self) -> usize {
        self.signals.len_of(Axis(1))
    }
}

/// The pointing axis that moved the most in these offsets. Ties go to x.
pub(super) fn dominant_axis(offsets: ArrayView2<f64>) -> PointingAxis {
    let variance = |axis: PointingAxis| {
        Moments::from_weighted(offsets.column(axis.index()).iter().map(|&v| (v, 1.0))).variance()
    };
    if variance(PointingAxis::Y) > variance(PointingAxis::X) {
        PointingAxis::Y
    } else {
        PointingAxis::X
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum DegeneracyReason {
    /// Every sample in the window was flagged.
    #[strum(serialize = "no usable samples")]
    NoValidSamples,

    /// The reference barely varied over the usable samples.
    #[strum(serialize = "reference signal has (nearly) no variance")]
    FlatReference,

    /// The two pointing axes moved together, so their gains can't be told
    /// apart.
    #[strum(serialize = "pointing axes are collinear")]
    Collinear,
}

/// A channel (and possibly a single gain component) whose gain could not be
/// constrained by a fit. Its previous gain was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Degeneracy {
    /// The position of the channel in its group.
    pub member: usize,

    /// The channel's index.
    pub channel: usize,

    /// `None` if every component of the channel was affected.
    pub component: Option<usize>,

    pub reason: DegeneracyReason,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.component {
            Some(c) => write!(f, "channel {} (gain {c}): {}", self.channel, self.reason),
            None => write!(f, "channel {}: {}", self.channel, self.reason),
        }
    }
}

/// The outcome of fitting one member of a group.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct MemberFit {
    pub(super) member: usize,
    pub(super) channel: usize,

    /// Flagged channels aren't fitted at all.
    pub(super) flagged: bool,

    /// New `(component, gain)` pairs.
    pub(super) gains: Vec<(usize, f64)>,

    pub(super) degeneracies: Vec<Degeneracy>,
}

impl MemberFit {
    pub(super) fn flagged(member: usize, channel: usize) -> MemberFit {
        MemberFit {
            member,
            channel,
            flagged: true,
            gains: vec![],
            degeneracies: vec![],
        }
    }

    fn degenerate(&mut self, component: Option<usize>, reason: DegeneracyReason) {
        self.degeneracies.push(Degeneracy {
            member: self.member,
            channel: self.channel,
            component,
            reason,
        });
    }
}

/// Weighted sums for the normal equations of up to two components.
#[derive(Debug, Default)]
struct NormalSums {
    sum_w: f64,
    wr: [f64; 2],
    wrr: [[f64; 2]; 2],
    wrd: [f64; 2],
}

impl NormalSums {
    fn moments(&self, component: usize) -> Moments {
        Moments {
            sum_w: self.sum_w,
            mean: self.wr[component] / self.sum_w,
            mean_square: self.wrr[component][component] / self.sum_w,
        }
    }
}

/// Fit the gains of a single channel. `scale` multiplies every regressor (it
/// projects the chop onto the channel). With two components, the gains are
/// always solved by maximum likelihood.
///
/// `retained` holds the channel's current gains. When only one of two
/// components can be constrained, the other keeps its retained gain and its
/// modelled signal is taken out of the data before the free one is fitted.
#[allow(clippy::too_many_arguments)]
pub(super) fn fit_member(
    design: &Design,
    scale: f64,
    retained: [f64; 2],
    timestreams: &Timestreams,
    member: usize,
    channel: usize,
    estimator: GainEstimator,
    tolerance: f64,
) -> MemberFit {
    let mut fit = MemberFit {
        member,
        channel,
        flagged: false,
        gains: vec![],
        degeneracies: vec![],
    };

    // The motion doesn't reach this channel at all (e.g. a chop perpendicular
    // to the beam offset).
    if scale.abs() < f64::EPSILON.sqrt() {
        fit.degenerate(None, DegeneracyReason::FlatReference);
        return fit;
    }

    let num_components = design.num_components().min(2);
    let robust = estimator == GainEstimator::Robust && num_components == 1;
    let data = timestreams.data();
    let mut sums = NormalSums::default();
    let mut ratios = vec![];

    for (i, (row, &valid)) in design
        .signals
        .outer_iter()
        .zip(design.valid.iter())
        .enumerate()
    {
        if !valid {
            continue;
        }
        let sample = design.start + i;
        let w = timestreams.usable_weight(sample, channel);
        if w <= 0.0 {
            continue;
        }
        let d = f64::from(data[(sample, channel)]);

        let mut r = [0.0; 2];
        for (rj, &s) in r.iter_mut().zip(row.iter()).take(num_components) {
            *rj = s * scale;
        }
        sums.sum_w += w;
        for j in 0..num_components {
            sums.wr[j] += w * r[j];
            sums.wrd[j] += w * r[j] * d;
            for k in 0..num_components {
                sums.wrr[j][k] += w * r[j] * r[k];
            }
        }
        if robust && r[0] != 0.0 {
            ratios.push((d / r[0], w * r[0] * r[0]));
        }
    }

    if sums.sum_w <= 0.0 {
        fit.degenerate(None, DegeneracyReason::NoValidSamples);
        return fit;
    }

    let constrained: Vec<usize> = (0..num_components)
        .filter(|&j| {
            let degenerate = sums.moments(j).is_degenerate(tolerance);
            if degenerate {
                fit.degenerate(Some(j), DegeneracyReason::FlatReference);
            }
            !degenerate
        })
        .collect();

    match constrained.as_slice() {
        [] => (),

        &[j] => {
            let gain = if robust {
                weighted_median(&mut ratios)
            } else {
                // Σ w r_j (d - g_k r_k) over every held component k.
                let held: f64 = (0..num_components)
                    .filter(|&k| k != j)
                    .map(|k| retained[k] * sums.wrr[j][k])
                    .sum();
                Some((sums.wrd[j] - held) / sums.wrr[j][j])
            };
            match gain {
                Some(g) if g.is_finite() => fit.gains.push((j, g)),
                _ => fit.degenerate(Some(j), DegeneracyReason::NoValidSamples),
            }
        }

        _ => {
            let [[a00, a01], [_, a11]] = sums.wrr;
            let [b0, b1] = sums.wrd;
            let det = a00 * a11 - a01 * a01;
            if det <= tolerance * a00 * a11 {
                fit.degenerate(None, DegeneracyReason::Collinear);
            } else {
                fit.gains.push((0, (b0 * a11 - b1 * a01) / det));
                fit.gains.push((1, (a00 * b1 - a01 * b0) / det));
            }
        }
    }

    fit
}
