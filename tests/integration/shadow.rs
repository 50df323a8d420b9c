// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use motion_response::{scan::ScanError, ReductionError, Scan, ShadowScan};

use crate::TestScan;

fn read_all<S: Scan>(scan: &mut S, descriptors: &[&str]) -> Result<usize, ReductionError> {
    for descriptor in descriptors {
        scan.read(descriptor, true)?;
    }
    Ok(descriptors.len())
}

#[test]
fn test_shadow_mirrors_parent() {
    let mut parent = TestScan::new(4);
    assert_eq!(read_all(&mut parent, &["scan-1", "scan-2"]).unwrap(), 2);

    let parent = Arc::new(parent);
    let shadow = ShadowScan::from_parent(Arc::clone(&parent));
    assert_eq!(shadow.integration_instance(), parent.integration_instance());
    assert_eq!(shadow.instrument(), parent.instrument());
    assert_eq!(shadow.parent().descriptors, ["scan-1", "scan-2"]);
}

#[test]
fn test_shadow_read_propagates() {
    let mut shadow = ShadowScan::from_parent(Arc::new(TestScan::new(1)));
    let result = read_all(&mut shadow, &["scan-1"]);
    match result {
        Err(ReductionError::Scan(ScanError::ShadowRead { descriptor })) => {
            assert_eq!(descriptor, "scan-1")
        }
        other => panic!("Expected a shadow read failure, got {other:?}"),
    }

    // Every read fails, whatever it asks for.
    let err = read_all(&mut shadow, &["scan-2"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Shadow scans cannot be read (attempted to read 'scan-2')"
    );
}
