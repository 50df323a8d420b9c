// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Scans, and the shadow scans that stand in for them.

mod error;
#[cfg(test)]
mod tests;

pub use error::ScanError;

use std::sync::Arc;

use crate::report::{Owner, OwnerCategory};

/// The part of a scan that the reduction core relies on. Reading and
/// instrument handling belong to the instrument-specific code; this only
/// exposes what responses and shadow scans need.
pub trait Scan {
    /// The instrument (with its configuration) that took the scan.
    type Instrument;

    /// The integrations this scan is made of.
    type Integration;

    fn instrument(&self) -> &Self::Instrument;

    /// Make a new, empty integration of the kind (and with the
    /// configuration) this scan uses.
    fn integration_instance(&self) -> Self::Integration;

    /// Read the scan's data described by `descriptor`. If `read_fully` is
    /// `false`, only the header information needs to be read.
    fn read(&mut self, descriptor: &str, read_fully: bool) -> Result<(), ScanError>;
}

/// A scan that mirrors a real scan's instrument and integration set-up but
/// never holds data of its own. Useful wherever something scan-shaped is
/// needed (simulations, shadow noise estimates) but reading must never
/// happen.
#[derive(Debug)]
pub struct ShadowScan<S> {
    parent: Arc<S>,
}

impl<S: Scan> ShadowScan<S> {
    pub fn from_parent(parent: Arc<S>) -> Self {
        Self { parent }
    }

    pub fn parent(&self) -> &Arc<S> {
        &self.parent
    }
}

impl<S> Clone for ShadowScan<S> {
    fn clone(&self) -> Self {
        Self {
            parent: Arc::clone(&self.parent),
        }
    }
}

impl<S: Scan> Scan for ShadowScan<S> {
    type Instrument = S::Instrument;
    type Integration = S::Integration;

    fn instrument(&self) -> &S::Instrument {
        self.parent.instrument()
    }

    fn integration_instance(&self) -> S::Integration {
        self.parent.integration_instance()
    }

    /// Always fails: shadow scans have no data to read.
    fn read(&mut self, descriptor: &str, _read_fully: bool) -> Result<(), ScanError> {
        Err(ScanError::ShadowRead {
            descriptor: descriptor.to_string(),
        })
    }
}

impl<S> Owner for ShadowScan<S> {
    fn category(&self) -> OwnerCategory {
        OwnerCategory::Scan
    }
}
