// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Plane vectors and sky coordinates. All angles are in radians.
 */


use std::ops::{Add, Mul, Sub};

/// A vector in a plane, e.g. a beam offset in the focal plane or a telescope
/// pointing offset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Make a new `Vec2` from a length and a position angle (measured from the
    /// x axis toward the y axis).
    pub fn from_polar(length: f64, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(length * c, length * s)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// The position angle of this vector. Inverse tangent, so a zero vector
    /// gives 0.
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn dot(&self, other: &Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A position in one of the coordinate frames that beam-switching geometry
/// can be expressed in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SkyCoordinates {
    /// Azimuth and elevation \[radians\].
    Horizontal { az: f64, el: f64 },

    /// Offsets in the instrument's focal plane \[radians\].
    FocalPlane { x: f64, y: f64 },

    /// Right ascension and declination \[radians\].
    Equatorial { ra: f64, dec: f64 },
}

impl SkyCoordinates {
    /// Make new equatorial coordinates from values in degrees.
    pub fn equatorial_degrees(ra: f64, dec: f64) -> Self {
        SkyCoordinates::Equatorial {
            ra: ra.to_radians(),
            dec: dec.to_radians(),
        }
    }

    /// Make new horizontal coordinates from values in degrees.
    pub fn horizontal_degrees(az: f64, el: f64) -> Self {
        SkyCoordinates::Horizontal {
            az: az.to_radians(),
            el: el.to_radians(),
        }
    }
}

impl std::fmt::Display for SkyCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SkyCoordinates::Horizontal { az, el } => {
                write!(f, "AzEl({}°, {}°)", az.to_degrees(), el.to_degrees())
            }
            SkyCoordinates::FocalPlane { x, y } => {
                write!(f, "FocalPlane({}°, {}°)", x.to_degrees(), y.to_degrees())
            }
            SkyCoordinates::Equatorial { ra, dec } => {
                write!(f, "RADec({}°, {}°)", ra.to_degrees(), dec.to_degrees())
            }
        }
    }
}

/// The parallactic angle of a source at the given hour angle and declination,
/// as seen from the given latitude. Zero for sources on the meridian south of
/// the zenith; positive west of the meridian.
pub fn parallactic_angle(hour_angle: f64, dec: f64, latitude: f64) -> f64 {
    let (s_ha, c_ha) = hour_angle.sin_cos();
    let (s_dec, c_dec) = dec.sin_cos();
    let (s_lat, c_lat) = latitude.sin_cos();
    (s_ha * c_lat).atan2(s_lat * c_dec - c_lat * s_dec * c_ha)
}
