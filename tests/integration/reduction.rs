// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use indoc::indoc;
use ndarray::prelude::*;
use rayon::prelude::*;

use motion_response::{
    response::ResponseError, ChannelGroup, Config, CorrelatedResponse, MotionKind, Pixel,
    PointingAxis, ReductionError, ReferenceSignal, Scan, ShadowScan, SkyCoordinates, Timestreams,
};

use crate::TestScan;

const CHOP_GAINS: [f64; 6] = [0.5, 1.0, 1.5, 2.0, 0.25, 0.75];
const SCAN_MEMBERS: [usize; 3] = [3, 4, 5];
const SCAN_GAINS: [f64; 3] = [-0.5, 0.25, 1.0];

/// A square-wave chop.
fn chop() -> Array1<f64> {
    array![1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0]
}

/// Stepping along y only. The steps are slow compared with the chop, so the
/// two motions are uncorrelated.
fn offsets() -> Array2<f64> {
    let y = [-3.0, -3.0, -1.0, -1.0, 1.0, 1.0, 3.0, 3.0];
    Array2::from_shape_fn((8, 2), |(t, axis)| if axis == 0 { 0.0 } else { y[t] })
}

fn contaminated() -> Timestreams {
    let chop = chop();
    let offsets = offsets();
    Timestreams::new(Array2::from_shape_fn((8, 6), |(t, c)| {
        let mut value = CHOP_GAINS[c] * chop[t];
        if let Some(i) = SCAN_MEMBERS.iter().position(|&m| m == c) {
            value += SCAN_GAINS[i] * offsets[(t, 1)];
        }
        value as f32
    }))
}

#[test]
fn test_chopper_then_telescope() -> Result<(), ReductionError> {
    let config = Config::from_toml_str(indoc! {r#"
        [response]
        telescope_fit = "dominant-axis"
    "#})?;

    // Integrations of a shadow scan look just like the real thing.
    let scan = TestScan::new(6);
    let integration = ShadowScan::from_parent(std::sync::Arc::new(scan)).integration_instance();
    let mut channels: Vec<Pixel> = TestScan::new(integration.num_pixels).camera.pixels();
    let mut timestreams = contaminated();

    let all = ChannelGroup::all("all", channels.len());
    let scanned = ChannelGroup::new("scanned", SCAN_MEMBERS.to_vec())?;

    let chop_signal = ReferenceSignal::chopper(chop(), SkyCoordinates::horizontal_degrees(0.0, 45.0));
    let mut chopper = CorrelatedResponse::bind(
        MotionKind::Chopper,
        all,
        Some(Pixel::chopper_gain_accessor()),
    )?
    .with_config(&config.response);
    let fit = chopper.estimate_gains(&mut channels, &timestreams, &chop_signal, 0..8)?;
    assert_eq!(fit.num_updated, 6);
    chopper.subtract_from(&channels, &mut timestreams, &chop_signal)?;

    let scan_signal = ReferenceSignal::telescope(offsets())?;
    let mut telescope = CorrelatedResponse::bind(
        MotionKind::Telescope,
        scanned,
        Some(Pixel::pointing_gain_y_accessor()),
    )?
    .with_config(&config.response);
    let fit = telescope.estimate_gains(&mut channels, &timestreams, &scan_signal, 0..8)?;
    assert_eq!(fit.dominant_axis, Some(PointingAxis::Y));
    telescope.subtract_from(&channels, &mut timestreams, &scan_signal)?;

    for (pixel, &gain) in channels.iter().zip(CHOP_GAINS.iter()) {
        assert_abs_diff_eq!(pixel.chopper_gain, gain, epsilon = 1e-10);
    }
    for (&member, &gain) in SCAN_MEMBERS.iter().zip(SCAN_GAINS.iter()) {
        assert_abs_diff_eq!(channels[member].pointing_gain_y, gain, epsilon = 1e-10);
    }
    assert_abs_diff_eq!(timestreams.data(), Array2::<f32>::zeros((8, 6)), epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_integrations_in_parallel() {
    // Each integration has its own channels and data, so each can be reduced
    // on its own thread.
    let mut integrations: Vec<(Vec<Pixel>, Timestreams)> = (0..8)
        .map(|i| {
            let scale = f64::from(i + 1);
            let chop = chop();
            let data = Array2::from_shape_fn((8, 3), |(t, c)| {
                (scale * (c + 1) as f64 * chop[t]) as f32
            });
            (TestScan::new(3).camera.pixels(), Timestreams::new(data))
        })
        .collect();

    let results: Result<Vec<Vec<f64>>, ReductionError> = integrations
        .par_iter_mut()
        .map(|(channels, timestreams)| -> Result<Vec<f64>, ReductionError> {
            let signal =
                ReferenceSignal::chopper(chop(), SkyCoordinates::FocalPlane { x: 0.0, y: 0.0 });
            let mut response = CorrelatedResponse::bind(
                MotionKind::Chopper,
                ChannelGroup::all("row", channels.len()),
                Some(Pixel::chopper_gain_accessor()),
            )?;
            response.estimate_gains(channels, timestreams, &signal, 0..8)?;
            Ok(response.subtract_from(channels, timestreams, &signal)?)
        })
        .collect();
    let powers = results.unwrap();

    for (i, ((channels, timestreams), power)) in integrations.iter().zip(powers).enumerate() {
        let scale = (i + 1) as f64;
        for (c, pixel) in channels.iter().enumerate() {
            let gain = scale * (c + 1) as f64;
            assert_abs_diff_eq!(pixel.chopper_gain, gain, epsilon = 1e-10);
            assert_abs_diff_eq!(power[c], 8.0 * gain * gain, epsilon = 1e-8);
        }
        assert!(timestreams.data().iter().all(|&d| d.abs() < 1e-6));
    }
}

#[test]
fn test_disjoint_groups_in_parallel() -> Result<(), ReductionError> {
    let all = ChannelGroup::all("all", 6);
    let scanned = ChannelGroup::new("scanned", SCAN_MEMBERS.to_vec())?;
    let rest = ChannelGroup::new("rest", vec![0, 1, 2])?;
    assert!(!scanned.overlaps(&rest));
    assert!(all.overlaps(&scanned));

    let chop = chop();
    let mut timestreams = Timestreams::new(Array2::from_shape_fn((8, 6), |(t, c)| {
        (CHOP_GAINS[c] * chop[t]) as f32
    }));
    let signal = ReferenceSignal::chopper(chop, SkyCoordinates::FocalPlane { x: 0.0, y: 0.0 });
    let mut channels = TestScan::new(6).camera.pixels();
    let bind = |group| {
        CorrelatedResponse::bind(MotionKind::Chopper, group, Some(Pixel::chopper_gain_accessor()))
    };
    let mut left = bind(rest)?;
    let mut right = bind(scanned)?;

    // Both responses read the same channels and data at the same time.
    let (left_fit, right_fit) = rayon::join(
        || left.fit_gains(&channels, &timestreams, &signal, 0..8),
        || right.fit_gains(&channels, &timestreams, &signal, 0..8),
    );
    let (left_fit, right_fit) = (left_fit?, right_fit?);

    // Gains of one group can't be written through another group's response.
    assert!(matches!(
        left.apply_gains(&mut channels, right_fit.clone()),
        Err(ResponseError::ForeignGains { .. })
    ));
    assert_eq!(left.apply_gains(&mut channels, left_fit)?.num_updated, 3);
    assert_eq!(right.apply_gains(&mut channels, right_fit)?.num_updated, 3);
    for (pixel, &gain) in channels.iter().zip(CHOP_GAINS.iter()) {
        assert_abs_diff_eq!(pixel.chopper_gain, gain, epsilon = 1e-10);
    }

    let (left_model, right_model) = rayon::join(
        || left.reconstruct(&channels, &signal),
        || right.reconstruct(&channels, &signal),
    );
    left.subtract_model(&mut timestreams, &left_model?)?;
    right.subtract_model(&mut timestreams, &right_model?)?;
    assert_abs_diff_eq!(timestreams.data(), Array2::<f32>::zeros((8, 6)), epsilon = 1e-6);
    Ok(())
}
