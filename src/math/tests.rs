// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

#[test]
fn test_weighted_median_equal_weights() {
    let mut odd = [(3.0, 1.0), (1.0, 1.0), (2.0, 1.0)];
    assert_eq!(weighted_median(&mut odd), Some(2.0));

    let mut even = [(4.0, 1.0), (1.0, 1.0), (3.0, 1.0), (2.0, 1.0)];
    assert_abs_diff_eq!(weighted_median(&mut even).unwrap(), 2.5);
}

#[test]
fn test_weighted_median_heavy_point_dominates() {
    let mut points = [(1.0, 1.0), (2.0, 1.0), (10.0, 5.0)];
    assert_eq!(weighted_median(&mut points), Some(10.0));
}

#[test]
fn test_weighted_median_ignores_bad_points() {
    let mut points = [
        (f64::NAN, 1.0),
        (1.0, 0.0),
        (5.0, 1.0),
        (100.0, -3.0),
        (7.0, f64::INFINITY),
    ];
    assert_eq!(weighted_median(&mut points), Some(5.0));

    let mut nothing = [(1.0, 0.0), (f64::NAN, 1.0)];
    assert!(weighted_median(&mut nothing).is_none());
    assert!(weighted_median(&mut []).is_none());
}

#[test]
fn test_robust_mean_discards_tails() {
    // 10 values; 10% tails discards one value from each end.
    let mut values = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1000.0, -1000.0];
    assert_abs_diff_eq!(robust_mean(&mut values, 0.1).unwrap(), 1.0);

    // With fewer than 10 values nothing is discarded.
    let mut values = [1.0, 2.0, 3.0, 10.0];
    assert_abs_diff_eq!(robust_mean(&mut values, 0.1).unwrap(), 4.0);
}

#[test]
fn test_robust_mean_edge_cases() {
    assert!(robust_mean(&mut [], 0.1).is_none());
    assert!(robust_mean(&mut [f64::NAN], 0.1).is_none());

    // Absurd tails fall back to the median.
    let mut values = [5.0, 1.0, 3.0];
    assert_abs_diff_eq!(robust_mean(&mut values, 0.5).unwrap(), 3.0);
    let mut values = [4.0, 1.0, 3.0, 2.0];
    assert_abs_diff_eq!(robust_mean(&mut values, 0.5).unwrap(), 2.5);
}

#[test]
fn test_moments() {
    let m = Moments::from_weighted([(1.0, 1.0), (2.0, 1.0), (3.0, 1.0), (4.0, 1.0)]);
    assert_abs_diff_eq!(m.sum_w, 4.0);
    assert_abs_diff_eq!(m.mean, 2.5);
    assert_abs_diff_eq!(m.mean_square, 7.5);
    assert_abs_diff_eq!(m.variance(), 1.25);
    assert!(!m.is_degenerate(1e-10));

    // Zero weights and NaNs don't count.
    let m = Moments::from_weighted([(1.0, 0.0), (f64::NAN, 1.0), (3.0, 2.0)]);
    assert_abs_diff_eq!(m.sum_w, 2.0);
    assert_abs_diff_eq!(m.mean, 3.0);
}

#[test]
fn test_moments_degeneracy() {
    let constant = Moments::from_weighted([(2.0, 1.0); 4]);
    assert!(constant.is_degenerate(1e-10));

    let zeros = Moments::from_weighted([(0.0, 1.0); 4]);
    assert!(zeros.is_degenerate(1e-10));

    let empty = Moments::from_weighted(std::iter::empty());
    assert!(empty.is_degenerate(1e-10));

    // Tiny, but varying, signals are fine; the check is relative.
    let tiny = Moments::from_weighted([(1e-9, 1.0), (2e-9, 1.0), (3e-9, 1.0)]);
    assert!(!tiny.is_degenerate(1e-10));
}
