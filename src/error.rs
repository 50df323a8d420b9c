// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for everything that can go wrong in a reduction step.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReductionError {
    #[error("{0}")]
    ChannelGroup(#[from] crate::channel::ChannelGroupError),

    #[error("{0}")]
    Signal(#[from] crate::signal::SignalError),

    #[error("{0}")]
    Response(#[from] crate::response::ResponseError),

    #[error("{0}")]
    Scan(#[from] crate::scan::ScanError),

    #[error("{0}")]
    Config(#[from] crate::config::ConfigError),
}
