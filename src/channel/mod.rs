// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Detector channels, the groups they are organised into, and the slots that
//! responses store their fitted gains in.
//!
//! Channels themselves belong to the instrument; this module only describes
//! the small surface that responses need from them. A list of channels is
//! always aligned with the columns of the [`crate::Timestreams`] it describes,
//! and a [`ChannelGroup`] refers to channels by their index into that list.

mod error;

pub use error::ChannelGroupError;

use std::collections::HashSet;
use std::sync::Arc;

use crate::{constants::DEFAULT_GAIN, coord::Vec2};

/// What a response needs to know about a detector channel.
pub trait Channel {
    /// The offset of this channel's beam from the optical axis in the focal
    /// plane, if known. Chopper responses use its direction to project the
    /// chop onto the channel.
    fn position(&self) -> Option<Vec2> {
        None
    }

    /// Flagged channels are left alone by gain estimation.
    fn is_flagged(&self) -> bool {
        false
    }

    /// Called after every gain update. `true` if the new gain falls outside
    /// the allowed gain range, `false` otherwise.
    fn set_gain_flag(&mut self, _flagged: bool) {}

    /// Is the channel flagged because its last gain was out of range? Such
    /// channels are still fitted, but don't count towards average gains.
    fn is_gain_flagged(&self) -> bool {
        false
    }
}

/// Where a response reads and writes a channel's gain. This lets the same
/// response code fill in e.g. a chopper gain or a sky-noise gain on the
/// channel without knowing anything else about the channel type.
pub trait GainAccessor<C>: Send + Sync {
    fn gain(&self, channel: &C) -> f64;

    fn set_gain(&self, channel: &mut C, gain: f64);
}

/// A [`GainAccessor`] made from a getter and setter function pair.
pub struct FnGainAccessor<C> {
    get: fn(&C) -> f64,
    set: fn(&mut C, f64),
}

impl<C> FnGainAccessor<C> {
    pub fn new(get: fn(&C) -> f64, set: fn(&mut C, f64)) -> Self {
        Self { get, set }
    }
}

impl<C> GainAccessor<C> for FnGainAccessor<C> {
    fn gain(&self, channel: &C) -> f64 {
        (self.get)(channel)
    }

    fn set_gain(&self, channel: &mut C, gain: f64) {
        (self.set)(channel, gain)
    }
}

impl<C> Clone for FnGainAccessor<C> {
    fn clone(&self) -> Self {
        Self {
            get: self.get,
            set: self.set,
        }
    }
}

impl<C> std::fmt::Debug for FnGainAccessor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("FnGainAccessor").finish_non_exhaustive()
    }
}

/// An ordered, named set of channels that share a response. Members are
/// indices into the instrument's channel list. A channel may be a member of
/// any number of groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroup {
    name: String,
    members: Vec<usize>,
}

impl ChannelGroup {
    /// Make a new group. The group may be empty (e.g. after everything in it
    /// was flagged), but it may not contain the same channel twice.
    pub fn new<S: Into<String>>(name: S, members: Vec<usize>) -> Result<Self, ChannelGroupError> {
        let name = name.into();
        let mut seen = HashSet::with_capacity(members.len());
        for &channel in &members {
            if !seen.insert(channel) {
                return Err(ChannelGroupError::Duplicate {
                    group: name,
                    channel,
                });
            }
        }

        Ok(Self { name, members })
    }

    /// A group of the first `num_channels` channels.
    pub fn all<S: Into<String>>(name: S, num_channels: usize) -> Self {
        Self {
            name: name.into(),
            members: (0..num_channels).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, channel: usize) -> bool {
        self.members.contains(&channel)
    }

    /// Do the groups share any channels? Responses whose groups overlap must
    /// not be estimated concurrently.
    pub fn overlaps(&self, other: &ChannelGroup) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        let large: HashSet<usize> = large.members.iter().copied().collect();
        small.members.iter().any(|c| large.contains(c))
    }
}

/// A bolometer pixel. This is the channel type used by the instruments in this
/// crate's tests and benchmarks; instruments with richer channel types only
/// need to implement [`Channel`].
#[derive(Debug, Clone, PartialEq)]
pub struct Pixel {
    /// The pixel's fixed index in the instrument.
    pub id: usize,

    /// The beam offset in the focal plane \[radians\].
    pub position: Option<Vec2>,

    /// Is this pixel flagged for reasons other than its gains?
    pub flagged: bool,

    /// Was the last fitted gain out of range?
    pub gain_flagged: bool,

    /// Response to the chopper.
    pub chopper_gain: f64,

    /// Response to telescope motion in x.
    pub pointing_gain_x: f64,

    /// Response to telescope motion in y.
    pub pointing_gain_y: f64,
}

impl Pixel {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            position: None,
            flagged: false,
            gain_flagged: false,
            chopper_gain: DEFAULT_GAIN,
            pointing_gain_x: DEFAULT_GAIN,
            pointing_gain_y: DEFAULT_GAIN,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = Some(position);
        self
    }

    /// Store fitted gains in [`Pixel::chopper_gain`].
    pub fn chopper_gain_accessor() -> Arc<dyn GainAccessor<Pixel>> {
        Arc::new(FnGainAccessor::new(
            |p: &Pixel| p.chopper_gain,
            |p: &mut Pixel, g| p.chopper_gain = g,
        ))
    }

    /// Store fitted gains in [`Pixel::pointing_gain_x`].
    pub fn pointing_gain_x_accessor() -> Arc<dyn GainAccessor<Pixel>> {
        Arc::new(FnGainAccessor::new(
            |p: &Pixel| p.pointing_gain_x,
            |p: &mut Pixel, g| p.pointing_gain_x = g,
        ))
    }

    /// Store fitted gains in [`Pixel::pointing_gain_y`].
    pub fn pointing_gain_y_accessor() -> Arc<dyn GainAccessor<Pixel>> {
        Arc::new(FnGainAccessor::new(
            |p: &Pixel| p.pointing_gain_y,
            |p: &mut Pixel, g| p.pointing_gain_y = g,
        ))
    }
}

impl Channel for Pixel {
    fn position(&self) -> Option<Vec2> {
        self.position
    }

    fn is_flagged(&self) -> bool {
        self.flagged
    }

    fn set_gain_flag(&mut self, flagged: bool) {
        self.gain_flagged = flagged;
    }

    fn is_gain_flagged(&self) -> bool {
        self.gain_flagged
    }
}
