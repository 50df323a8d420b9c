// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Logging setup for programs that drive reductions.
//!
//! The library itself only talks to the `log` facade; status messages (see
//! [`crate::report`]) go through it at debug level.

use log::LevelFilter;

use crate::config::ReportingConfig;

/// The level shown at a given verbosity: info at 0, debug at 1, trace beyond.
pub fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Send log messages to `stdout` at the level given by [`level_filter`]. At a
/// verbosity of 3 or more each message is also stamped with its time and
/// source line. `RUST_LOG` is respected.
///
/// With `reporting.debug` set, this crate's status messages are shown even at
/// verbosity 0; other crates stay at info.
///
/// Only the first logger set in a process takes effect; later attempts fail.
pub fn setup_logging(verbosity: u8, reporting: &ReportingConfig) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder
        .target(env_logger::Target::Stdout)
        .format_target(false)
        .filter_level(level_filter(verbosity));
    if reporting.debug && verbosity == 0 {
        builder.filter_module(env!("CARGO_CRATE_NAME"), LevelFilter::Debug);
    }
    if verbosity >= 3 {
        builder.format(|buf, record| {
            use std::io::Write;

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp(),
                record.level(),
                record.module_path().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args()
            )
        });
    }
    builder.try_init()
}
