// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Something tried to read data into a shadow scan. This is always a bug
    /// in the caller.
    #[error("Shadow scans cannot be read (attempted to read '{descriptor}')")]
    ShadowRead { descriptor: String },

    #[error("Could not read scan '{descriptor}': {reason}")]
    Read { descriptor: String, reason: String },
}
