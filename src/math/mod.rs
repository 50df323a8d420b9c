// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.

#[cfg(test)]
mod tests;

/// The weighted median of `(value, weight)` pairs. Pairs with non-positive or
/// non-finite weights (and non-finite values) are ignored. `None` is returned
/// if nothing is left. The slice is sorted in place.
///
/// When the cumulative weight lands exactly on half of the total, the two
/// straddling values are averaged, so that `[1, 2]` with equal weights gives
/// 1.5 like an ordinary median.
pub(crate) fn weighted_median(points: &mut [(f64, f64)]) -> Option<f64> {
    let mut n = 0;
    for i in 0..points.len() {
        let (v, w) = points[i];
        if v.is_finite() && w.is_finite() && w > 0.0 {
            points.swap(n, i);
            n += 1;
        }
    }
    let points = &mut points[..n];
    if points.is_empty() {
        return None;
    }

    points.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
    let half = 0.5 * points.iter().map(|&(_, w)| w).sum::<f64>();

    let mut cumulative = 0.0;
    for (i, &(v, w)) in points.iter().enumerate() {
        cumulative += w;
        if (cumulative - half).abs() <= half * f64::EPSILON * points.len() as f64 {
            return Some(match points.get(i + 1) {
                Some(&(next, _)) => 0.5 * (v + next),
                None => v,
            });
        }
        if cumulative > half {
            return Some(v);
        }
    }

    // Only reachable through rounding; the largest value is as good as any.
    points.last().map(|&(v, _)| v)
}

/// The mean of `values` after discarding `tail_fraction` of the sorted values
/// from each end. Non-finite values are ignored. `None` if there's nothing to
/// average. The slice is sorted in place.
pub(crate) fn robust_mean(values: &mut [f64], tail_fraction: f64) -> Option<f64> {
    let mut n = 0;
    for i in 0..values.len() {
        if values[i].is_finite() {
            values.swap(n, i);
            n += 1;
        }
    }
    let values = &mut values[..n];
    if values.is_empty() {
        return None;
    }

    values.sort_unstable_by(f64::total_cmp);
    let discard = (tail_fraction.clamp(0.0, 0.5) * values.len() as f64).floor() as usize;
    let kept = if 2 * discard < values.len() {
        &values[discard..values.len() - discard]
    } else {
        // Discarding would leave nothing; fall back to the middle value(s).
        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            &values[mid - 1..mid + 1]
        } else {
            &values[mid..mid + 1]
        }
    };
    Some(kept.iter().sum::<f64>() / kept.len() as f64)
}

/// Weighted first and second moments of a sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Moments {
    /// Sum of weights.
    pub(crate) sum_w: f64,
    /// Weighted mean.
    pub(crate) mean: f64,
    /// Weighted mean square.
    pub(crate) mean_square: f64,
}

impl Moments {
    pub(crate) fn from_weighted<I: IntoIterator<Item = (f64, f64)>>(values_weights: I) -> Moments {
        let (sum_w, sum_wx, sum_wx2) = values_weights
            .into_iter()
            .filter(|&(x, w)| x.is_finite() && w > 0.0)
            .fold((0.0, 0.0, 0.0), |(sw, swx, swx2), (x, w)| {
                (sw + w, swx + w * x, swx2 + w * x * x)
            });
        if sum_w > 0.0 {
            Moments {
                sum_w,
                mean: sum_wx / sum_w,
                mean_square: sum_wx2 / sum_w,
            }
        } else {
            Moments::default()
        }
    }

    /// Weighted variance about the mean. Never negative.
    pub(crate) fn variance(&self) -> f64 {
        (self.mean_square - self.mean * self.mean).max(0.0)
    }

    /// Does the sequence vary too little (relative to its own scale) to
    /// constrain anything? Sequences without any weight are degenerate too.
    pub(crate) fn is_degenerate(&self, tolerance: f64) -> bool {
        self.sum_w <= 0.0 || self.mean_square <= 0.0 || self.variance() <= tolerance * self.mean_square
    }
}
