// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Diagnostic status messages.
//!
//! Status messages are only emitted when debugging is switched on; the switch
//! is a single process-wide flag unless a [`Reporter`] is given its own.
//! Messages are indented according to who is reporting them, so that
//! per-integration chatter sits underneath the scan it belongs to.


use std::sync::Arc;

use crossbeam_utils::atomic::AtomicCell;
use strum_macros::{Display, EnumIter};

use crate::DEBUG;

/// Turn process-wide status messages on or off.
pub fn set_debug(debug: bool) {
    DEBUG.store(debug);
}

pub fn is_debug() -> bool {
    DEBUG.load()
}

/// The structural role of whatever is reporting a message.
#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq)]
pub enum OwnerCategory {
    /// The reduction as a whole.
    Root,
    Scan,
    /// An integration, or anything working on one (e.g. a response).
    Integration,
    Other,
}

impl OwnerCategory {
    pub fn prefix(self) -> &'static str {
        match self {
            OwnerCategory::Root | OwnerCategory::Other => "",
            OwnerCategory::Scan => "  ",
            OwnerCategory::Integration => "    ",
        }
    }
}

/// Anything that reports status messages says what kind of thing it is.
pub trait Owner {
    fn category(&self) -> OwnerCategory;
}

/// The indentation for messages from `owner`. Unknown owners aren't indented.
pub fn prefix(owner: Option<&dyn Owner>) -> &'static str {
    owner.map_or("", |o| o.category().prefix())
}

/// Where status messages end up.
pub trait ReportSink: Send + Sync {
    fn emit(&self, category: Option<OwnerCategory>, prefix: &str, message: &str);
}

/// Send status messages to the `log` facade at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn emit(&self, _category: Option<OwnerCategory>, prefix: &str, message: &str) {
        log::debug!("{prefix}{message}");
    }
}

#[derive(Clone)]
enum Switch {
    Global,
    Shared(Arc<AtomicCell<bool>>),
}

impl Switch {
    fn is_on(&self) -> bool {
        match self {
            Switch::Global => DEBUG.load(),
            Switch::Shared(flag) => flag.load(),
        }
    }
}

/// Formats and gates status messages.
#[derive(Clone)]
pub struct Reporter {
    switch: Switch,
    sink: Arc<dyn ReportSink>,
}

impl Reporter {
    /// A reporter that follows the process-wide debug flag and logs.
    pub fn global() -> Self {
        Self::new(Arc::new(LogSink))
    }

    /// A reporter that follows the process-wide debug flag.
    pub fn new(sink: Arc<dyn ReportSink>) -> Self {
        Self {
            switch: Switch::Global,
            sink,
        }
    }

    /// A reporter with its own debug switch. The switch may be flipped from
    /// other threads at any time.
    pub fn with_switch(switch: Arc<AtomicCell<bool>>, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            switch: Switch::Shared(switch),
            sink,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.switch.is_on()
    }

    /// Emit `message` if debugging is on. The message isn't even formatted
    /// otherwise.
    pub fn status<M: std::fmt::Display>(&self, owner: Option<&dyn Owner>, message: M) {
        if !self.switch.is_on() {
            return;
        }
        self.sink.emit(
            owner.map(|o| o.category()),
            prefix(owner),
            &message.to_string(),
        );
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::global()
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}
