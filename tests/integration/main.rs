// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod reduction;
mod shadow;

use motion_response::{scan::ScanError, Pixel, Scan};

/// A camera with a row of pixels, spaced evenly in the focal plane.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Camera {
    pub(crate) num_pixels: usize,
    pub(crate) sampling_interval: f64,
}

impl Camera {
    pub(crate) fn pixels(&self) -> Vec<Pixel> {
        (0..self.num_pixels).map(Pixel::new).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Integration {
    pub(crate) num_pixels: usize,
    pub(crate) sampling_interval: f64,
}

/// A scan that can always be "read".
#[derive(Debug)]
pub(crate) struct TestScan {
    pub(crate) camera: Camera,
    pub(crate) descriptors: Vec<String>,
}

impl TestScan {
    pub(crate) fn new(num_pixels: usize) -> TestScan {
        TestScan {
            camera: Camera {
                num_pixels,
                sampling_interval: 0.1,
            },
            descriptors: vec![],
        }
    }
}

impl Scan for TestScan {
    type Instrument = Camera;
    type Integration = Integration;

    fn instrument(&self) -> &Camera {
        &self.camera
    }

    fn integration_instance(&self) -> Integration {
        Integration {
            num_pixels: self.camera.num_pixels,
            sampling_interval: self.camera.sampling_interval,
        }
    }

    fn read(&mut self, descriptor: &str, _read_fully: bool) -> Result<(), ScanError> {
        self.descriptors.push(descriptor.to_string());
        Ok(())
    }
}
