// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Beam-switching geometry for instruments that chop between two beams.


use crossbeam_utils::atomic::AtomicCell;

use crate::coord::{parallactic_angle, SkyCoordinates};

/// An instrument (or scan) that switches its beam between two positions on
/// the sky.
pub trait DualBeam: Send + Sync {
    /// The throw between the two beams \[radians\]. Constant for a given
    /// instrument configuration.
    fn chop_separation(&self) -> f64;

    /// The position angle of the chop throw at the given position, in that
    /// position's frame \[radians\]. The answer depends on the current frame
    /// rotation, so it must be asked for again whenever the pointing changes;
    /// callers never keep it around.
    fn chop_angle(&self, position: &SkyCoordinates) -> f64;
}

/// A chopper on an alt-az telescope that throws along azimuth.
///
/// In horizontal coordinates the chop is always at 0°. The focal plane turns
/// with the instrument rotator, and on the sky the chop direction rotates with
/// the parallactic angle of the position being looked at.
///
/// The rotator angle and LST can be updated through a shared reference, so a
/// geometry handed to a response (as an `Arc`) keeps following the telescope.
#[derive(Debug)]
pub struct ChopperGeometry {
    /// The distance between the two beams \[radians\].
    throw: f64,

    /// The latitude of the telescope \[radians\].
    latitude: f64,

    /// The instrument rotator angle \[radians\].
    rotator_angle: AtomicCell<f64>,

    /// The current local sidereal time \[radians\].
    lst: AtomicCell<f64>,
}

impl ChopperGeometry {
    pub fn new(throw: f64, latitude: f64) -> Self {
        Self {
            throw,
            latitude,
            rotator_angle: AtomicCell::new(0.0),
            lst: AtomicCell::new(0.0),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn lst(&self) -> f64 {
        self.lst.load()
    }

    /// The LST moves with every sample; update it before asking for chop
    /// angles.
    pub fn set_lst(&self, lst: f64) {
        self.lst.store(lst);
    }

    pub fn rotator_angle(&self) -> f64 {
        self.rotator_angle.load()
    }

    pub fn set_rotator_angle(&self, angle: f64) {
        self.rotator_angle.store(angle);
    }
}

impl Clone for ChopperGeometry {
    fn clone(&self) -> Self {
        Self {
            throw: self.throw,
            latitude: self.latitude,
            rotator_angle: AtomicCell::new(self.rotator_angle()),
            lst: AtomicCell::new(self.lst()),
        }
    }
}

impl DualBeam for ChopperGeometry {
    fn chop_separation(&self) -> f64 {
        self.throw
    }

    fn chop_angle(&self, position: &SkyCoordinates) -> f64 {
        match *position {
            SkyCoordinates::Horizontal { .. } => 0.0,
            SkyCoordinates::FocalPlane { .. } => -self.rotator_angle(),
            SkyCoordinates::Equatorial { ra, dec } => {
                parallactic_angle(self.lst() - ra, dec, self.latitude)
            }
        }
    }
}
