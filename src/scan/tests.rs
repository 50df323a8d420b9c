// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::*;
use crate::report::prefix;

#[derive(Debug, PartialEq)]
struct Camera {
    name: &'static str,
    sampling_interval: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum Integration {
    Chopped { sampling_interval: f64, chop_frequency: f64 },
    OnTheFly { sampling_interval: f64 },
}

/// A scan that "reads" by remembering what it was asked to read.
#[derive(Debug)]
struct MemoryScan {
    camera: Camera,
    chopped: bool,
    reads: Vec<String>,
}

impl MemoryScan {
    fn new(chopped: bool) -> Self {
        Self {
            camera: Camera {
                name: "sharc2",
                sampling_interval: 0.036,
            },
            chopped,
            reads: vec![],
        }
    }
}

impl Scan for MemoryScan {
    type Instrument = Camera;
    type Integration = Integration;

    fn instrument(&self) -> &Camera {
        &self.camera
    }

    fn integration_instance(&self) -> Integration {
        if self.chopped {
            Integration::Chopped {
                sampling_interval: self.camera.sampling_interval,
                chop_frequency: 1.1,
            }
        } else {
            Integration::OnTheFly {
                sampling_interval: self.camera.sampling_interval,
            }
        }
    }

    fn read(&mut self, descriptor: &str, _read_fully: bool) -> Result<(), ScanError> {
        if descriptor.is_empty() {
            return Err(ScanError::Read {
                descriptor: descriptor.to_string(),
                reason: "empty descriptor".to_string(),
            });
        }
        self.reads.push(descriptor.to_string());
        Ok(())
    }
}

#[test]
fn test_shadow_integration_matches_parent() {
    for chopped in [true, false] {
        let parent = Arc::new(MemoryScan::new(chopped));
        let shadow = ShadowScan::from_parent(Arc::clone(&parent));
        assert_eq!(shadow.integration_instance(), parent.integration_instance());
    }
}

#[test]
fn test_shadow_shares_parent_instrument() {
    let parent = Arc::new(MemoryScan::new(true));
    let shadow = ShadowScan::from_parent(Arc::clone(&parent));
    assert!(std::ptr::eq(shadow.instrument(), parent.instrument()));
    assert_eq!(shadow.instrument().name, "sharc2");

    // Only a reference to the parent is kept.
    assert_eq!(Arc::strong_count(&parent), 2);
    let twin = shadow.clone();
    assert_eq!(Arc::strong_count(&parent), 3);
    assert!(Arc::ptr_eq(twin.parent(), &parent));
}

#[test]
fn test_shadow_read_always_fails() {
    let parent = Arc::new(MemoryScan::new(false));
    let mut shadow = ShadowScan::from_parent(Arc::clone(&parent));
    for descriptor in ["", "10628", "/data/sharc2/scan_10628.fits", "10628-10633"] {
        for read_fully in [true, false] {
            let result = shadow.read(descriptor, read_fully);
            assert_eq!(
                result,
                Err(ScanError::ShadowRead {
                    descriptor: descriptor.to_string()
                })
            );
        }
    }
    // Nothing reached the parent.
    assert!(parent.reads.is_empty());
}

#[test]
fn test_shadow_read_message() {
    let mut shadow = ShadowScan::from_parent(Arc::new(MemoryScan::new(true)));
    let error = shadow.read("10628", true).unwrap_err();
    assert!(error.to_string().starts_with("Shadow scans cannot be read"));
}

#[test]
fn test_real_scan_still_reads() {
    let mut parent = MemoryScan::new(true);
    assert!(parent.read("10628", false).is_ok());
    assert!(matches!(parent.read("", true), Err(ScanError::Read { .. })));
    assert_eq!(parent.reads, vec!["10628".to_string()]);
}

#[test]
fn test_shadow_of_a_shadow() {
    let parent = Arc::new(MemoryScan::new(true));
    let shadow = Arc::new(ShadowScan::from_parent(Arc::clone(&parent)));
    let mut shadow2 = ShadowScan::from_parent(shadow);
    assert_eq!(shadow2.integration_instance(), parent.integration_instance());
    assert!(matches!(
        shadow2.read("x", true),
        Err(ScanError::ShadowRead { .. })
    ));
}

#[test]
fn test_shadow_reports_as_scan() {
    let shadow = ShadowScan::from_parent(Arc::new(MemoryScan::new(true)));
    assert_eq!(shadow.category(), OwnerCategory::Scan);
    assert_eq!(prefix(Some(&shadow)), "  ");
}
